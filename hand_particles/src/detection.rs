//! Landmark sources: LeapMotion hardware or a mouse/keyboard-driven
//! synthetic hand.
//!
//! Every source runs on its own thread and delivers [`DetectionEvent`]s over
//! an `mpsc` channel.  Normalization and classification happen on that
//! thread, so the frame loop only ever receives finished, immutable
//! [`DetectionSnapshot`]s and doesn't need to know where they came from.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use particle_core::landmarks::{
    Handedness, RawDetection, RawLandmark, INDEX_PIP, INDEX_TIP, LANDMARK_COUNT, MIDDLE_MCP,
    THUMB_TIP, WRIST,
};
use particle_core::{DetectionSnapshot, Gesture};

// ════════════════════════════════════════════════════════════════════════════
// DetectionEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum DetectionEvent {
    /// Whether the source is able to deliver frames.  `false` means the
    /// device or model failed to start; the app keeps running without hands.
    Ready(bool),
    /// One processed detection frame (possibly with zero hands).
    Frame(DetectionSnapshot),
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`DetectionEvent`]s over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<DetectionEvent>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<DetectionEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// Each tracking frame is mapped onto the 21-point hand layout: the middle
/// metacarpal base stands in for the wrist, and each digit contributes its
/// proximal, intermediate and distal joints plus the distal tip.  Millimetre
/// coordinates are squeezed into normalized camera space assuming a
/// 400 mm-wide interaction box centred 250 mm above the device.
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<DetectionEvent>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                log::error!("LeapC connection failed: {:?}", e);
                let _ = tx.send(DetectionEvent::Ready(false));
                return;
            }
        };
        if let Err(e) = connection.open() {
            log::error!("could not open LeapMotion device: {:?}", e);
            let _ = tx.send(DetectionEvent::Ready(false));
            return;
        }
        if tx.send(DetectionEvent::Ready(true)).is_err() { return; }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<_> = frame.hands().collect();
                let raw: Vec<RawDetection> = hands.iter()
                    .map(|h| {
                        let handedness = if h.hand_type() == HandType::Left {
                            Handedness::Left
                        } else {
                            Handedness::Right
                        };
                        leap_hand_landmarks(h, handedness)
                    })
                    .collect();
                let snapshot = DetectionSnapshot::from_detections(&raw);
                if tx.send(DetectionEvent::Frame(snapshot)).is_err() { return; }
            }
        }
    }
}

/// Millimetres above the device → normalized camera space.
#[cfg(feature = "leap")]
fn leap_to_raw(x: f32, y: f32, z: f32) -> RawLandmark {
    RawLandmark::new(0.5 + x / 400.0, 0.5 - (y - 250.0) / 400.0, -z / 400.0)
}

#[cfg(feature = "leap")]
fn leap_hand_landmarks(hand: &leaprs::Hand, handedness: Handedness) -> RawDetection {
    macro_rules! joint {
        ($j:expr) => {{ let j = $j; leap_to_raw(j.x, j.y, j.z) }};
    }

    let digits: Vec<_> = hand.digits().collect();
    let mut landmarks = Vec::with_capacity(LANDMARK_COUNT);
    landmarks.push(match digits.get(2) {
        Some(middle) => joint!(middle.metacarpal().prev_joint()),
        None         => RawLandmark::new(0.5, 0.5, 0.0),
    });
    for digit in &digits {
        landmarks.push(joint!(digit.proximal().prev_joint()));
        landmarks.push(joint!(digit.intermediate().prev_joint()));
        landmarks.push(joint!(digit.distal().prev_joint()));
        landmarks.push(joint!(digit.distal().next_joint()));
    }
    RawDetection { handedness, landmarks }
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Cursor moved; coordinates in normalized camera space (`0..1`, y down).
    Move { x: f32, y: f32 },
    /// Switch the synthetic hand to another pose.
    Pose(SimPose),
    /// Show / hide the hand (no hand ⇒ no gesture).
    ToggleHand,
    /// Add / remove a mirrored second hand.
    ToggleSecondHand,
}

/// Poses the synthetic hand can take (mapped from keys 1–5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPose {
    Point,
    Pinch,
    Peace,
    Open,
    Fist,
}

impl SimPose {
    /// The gesture the classifier should report for this pose.
    pub fn gesture(self) -> Gesture {
        match self {
            SimPose::Point => Gesture::Point,
            SimPose::Pinch => Gesture::Pinch,
            SimPose::Peace => Gesture::Peace,
            SimPose::Open  => Gesture::Open,
            SimPose::Fist  => Gesture::Fist,
        }
    }

    /// Extended flags for (index, middle, ring, pinky).
    fn extended(self) -> [bool; 4] {
        match self {
            SimPose::Point | SimPose::Pinch => [true, false, false, false],
            SimPose::Peace                  => [true, true,  false, false],
            SimPose::Open                   => [true, true,  true,  true ],
            SimPose::Fist                   => [false; 4],
        }
    }
}

/// Landmark source driven by [`SimInput`] events from the visualizer window.
///
/// It keeps a tiny bit of state (where the hand is, which pose it holds) and
/// re-synthesises a full detection frame after every input, so the frame
/// loop sees exactly what a real detector would deliver.
pub struct SimLandmarkSource {
    rx:          Receiver<SimInput>,
    position:    (f32, f32),
    pose:        SimPose,
    visible:     bool,
    second_hand: bool,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimLandmarkSource {
            rx,
            position:    (0.5, 0.5),
            pose:        SimPose::Point,
            visible:     true,
            second_hand: false,
        }
    }

    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Move { x, y }     => self.position = (x, y),
            SimInput::Pose(pose)        => self.pose = pose,
            SimInput::ToggleHand        => self.visible = !self.visible,
            SimInput::ToggleSecondHand  => self.second_hand = !self.second_hand,
        }
    }

    fn detections(&self) -> Vec<RawDetection> {
        if !self.visible {
            return Vec::new();
        }
        let (x, y) = self.position;
        let mut hands = vec![synth_hand(x, y, self.pose, Handedness::Right)];
        if self.second_hand {
            hands.push(synth_hand(1.0 - x, y, self.pose, Handedness::Left));
        }
        hands
    }

    fn snapshot(&self) -> DetectionSnapshot {
        DetectionSnapshot::from_detections(&self.detections())
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn run(mut self: Box<Self>, tx: Sender<DetectionEvent>) {
        if tx.send(DetectionEvent::Ready(true)).is_err() { return; }
        if tx.send(DetectionEvent::Frame(self.snapshot())).is_err() { return; }

        while let Ok(input) = self.rx.recv() {
            self.apply(input);
            if tx.send(DetectionEvent::Frame(self.snapshot())).is_err() { return; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Synthetic hand geometry
// ────────────────────────────────────────────────────────────────────────────

// Offsets in normalized camera units relative to the palm (middle MCP).
// Fingers hang downward on screen: an "extended" finger has its tip below
// its PIP joint in image space, which is what the classifier looks for.
const FINGER_X:   [f32; 4] = [-0.03, 0.0, 0.03, 0.06];
const MCP_Y:      f32 = 0.0;
const PIP_Y:      f32 = 0.06;
const EXT_DIP_Y:  f32 = 0.10;
const EXT_TIP_Y:  f32 = 0.14;
const FOLD_DIP_Y: f32 = 0.04;
const FOLD_TIP_Y: f32 = 0.03;
const THUMB:      [(f32, f32); 4] = [(-0.04, -0.10), (-0.08, -0.07), (-0.115, -0.04), (-0.145, -0.01)];
const WRIST_OFF:  (f32, f32) = (0.01, -0.14);
/// Thumb tip offset from the index tip when pinching.
const PINCH_OFF:  (f32, f32) = (-0.03, 0.0);

/// Build a 21-landmark detection for `pose` with the palm at `(x, y)`.
/// Left hands are mirrored horizontally.
pub fn synth_hand(x: f32, y: f32, pose: SimPose, handedness: Handedness) -> RawDetection {
    let mirror = if handedness == Handedness::Left { -1.0 } else { 1.0 };
    let at = |(dx, dy): (f32, f32)| RawLandmark::new(x + dx * mirror, y + dy, 0.0);

    let mut landmarks = vec![RawLandmark::default(); LANDMARK_COUNT];
    landmarks[WRIST] = at(WRIST_OFF);
    for (j, &off) in THUMB.iter().enumerate() {
        landmarks[1 + j] = at(off);
    }
    for (k, &extended) in pose.extended().iter().enumerate() {
        let fx   = FINGER_X[k];
        let base = INDEX_PIP - 1 + 4 * k;      // MCP index of finger k
        let (dip, tip) = if extended { (EXT_DIP_Y, EXT_TIP_Y) } else { (FOLD_DIP_Y, FOLD_TIP_Y) };
        landmarks[base]     = at((fx, MCP_Y));
        landmarks[base + 1] = at((fx, PIP_Y));
        landmarks[base + 2] = at((fx, dip));
        landmarks[base + 3] = at((fx, tip));
    }
    if pose == SimPose::Pinch {
        let tip = landmarks[INDEX_TIP];
        landmarks[THUMB_TIP] = RawLandmark::new(tip.x + PINCH_OFF.0 * mirror, tip.y + PINCH_OFF.1, 0.0);
    }
    debug_assert_eq!(landmarks[MIDDLE_MCP], at((0.0, 0.0)));

    RawDetection { handedness, landmarks }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
