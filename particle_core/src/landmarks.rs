//! Raw hand detections and their conversion into [`HandPose`]s.
//!
//! A detector reports 21 landmarks per hand in normalized camera space:
//! `x` and `y` in `0..1` with `y` pointing down, `z` a relative depth.
//! [`HandPose::from_detection`] remaps them with a fixed affine transform
//!
//! ```text
//! x' = (x - 0.5) * 10
//! y' = (0.5 - y) * 10      (up-positive)
//! z' = -z * 10
//! ```
//!
//! This is a plain rescale into scene units, not a calibrated camera
//! projection.

use glam::Vec3;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP:   usize = 14;
pub const RING_TIP:   usize = 16;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_TIP:  usize = 20;

/// Landmark used as the palm reference.
pub const PALM: usize = MIDDLE_MCP;

/// Scene units per normalized camera unit.
const SCALE: f32 = 10.0;

// ════════════════════════════════════════════════════════════════════════════
// Raw detector output
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RawLandmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        RawLandmark { x, y, z }
    }

    /// Remap into scene space.
    pub fn to_scene(self) -> Vec3 {
        Vec3::new(
            (self.x - 0.5) * SCALE,
            (0.5 - self.y) * SCALE,
            -self.z * SCALE,
        )
    }

    /// Inverse of [`RawLandmark::to_scene`].
    pub fn from_scene(p: Vec3) -> Self {
        RawLandmark::new(p.x / SCALE + 0.5, 0.5 - p.y / SCALE, -p.z / SCALE)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    /// Parse a detector label; anything unrecognised is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "left"  => Handedness::Left,
            "right" => Handedness::Right,
            _       => Handedness::Unknown,
        }
    }
}

/// One hand as reported by the detector.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawDetection {
    pub handedness: Handedness,
    pub landmarks:  Vec<RawLandmark>,
}

// ════════════════════════════════════════════════════════════════════════════
// HandPose
// ════════════════════════════════════════════════════════════════════════════

/// One detected hand in scene space.
///
/// Built fresh from every detection frame and never mutated afterwards; the
/// derived points are copies of specific landmarks.
#[derive(Clone, Debug, PartialEq)]
pub struct HandPose {
    handedness:    Handedness,
    landmarks:     [Vec3; LANDMARK_COUNT],
    center:        Vec3,
    index_finger:  Vec3,
    middle_finger: Vec3,
    palm_center:   Vec3,
}

impl HandPose {
    /// Normalize one raw detection.
    ///
    /// Returns `None` if fewer than 21 landmarks were reported.  Extra
    /// landmarks past the 21st are ignored.
    pub fn from_detection(raw: &RawDetection) -> Option<Self> {
        if raw.landmarks.len() < LANDMARK_COUNT {
            return None;
        }
        let mut landmarks = [Vec3::ZERO; LANDMARK_COUNT];
        for (dst, src) in landmarks.iter_mut().zip(&raw.landmarks) {
            *dst = src.to_scene();
        }
        Some(Self::from_scene(raw.handedness, landmarks))
    }

    /// Build a pose from landmarks already in scene space.
    pub fn from_scene(handedness: Handedness, landmarks: [Vec3; LANDMARK_COUNT]) -> Self {
        let center = landmarks.iter().copied().sum::<Vec3>() / LANDMARK_COUNT as f32;
        HandPose {
            handedness,
            center,
            index_finger:  landmarks[INDEX_TIP],
            middle_finger: landmarks[MIDDLE_TIP],
            palm_center:   landmarks[PALM],
            landmarks,
        }
    }

    pub fn handedness(&self)    -> Handedness              { self.handedness }
    pub fn landmarks(&self)     -> &[Vec3; LANDMARK_COUNT] { &self.landmarks }
    /// Landmark `i`, or `None` past the 21st.
    pub fn landmark(&self, i: usize) -> Option<Vec3>       { self.landmarks.get(i).copied() }
    /// Centroid of all 21 landmarks.
    pub fn center(&self)        -> Vec3                    { self.center }
    pub fn index_finger(&self)  -> Vec3                    { self.index_finger }
    pub fn middle_finger(&self) -> Vec3                    { self.middle_finger }
    pub fn palm_center(&self)   -> Vec3                    { self.palm_center }

    /// Unit vector from the palm to the index fingertip, or zero when the two
    /// coincide.
    pub fn pointing_direction(&self) -> Vec3 {
        (self.index_finger - self.palm_center).normalize_or_zero()
    }
}

/// Normalize every hand in a detection frame, skipping malformed ones.
pub fn normalize_detections(raw: &[RawDetection]) -> Vec<HandPose> {
    raw.iter()
        .filter_map(|d| {
            let pose = HandPose::from_detection(d);
            if pose.is_none() {
                log::trace!(
                    "dropping {:?} hand with {} landmarks",
                    d.handedness, d.landmarks.len()
                );
            }
            pose
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn raw_hand(n: usize) -> RawDetection {
        RawDetection {
            handedness: Handedness::Right,
            landmarks: (0..n)
                .map(|i| RawLandmark::new(i as f32 / 20.0, 0.5, 0.0))
                .collect(),
        }
    }

    #[test]
    fn affine_remap() {
        let p = RawLandmark::new(0.75, 0.25, 0.1).to_scene();
        assert_relative_eq!(p.x, 2.5);
        assert_relative_eq!(p.y, 2.5);
        assert_relative_eq!(p.z, -1.0);

        let c = RawLandmark::new(0.5, 0.5, 0.0).to_scene();
        assert_eq!(c, Vec3::ZERO);
    }

    #[test]
    fn from_scene_inverts_remap() {
        let raw = RawLandmark::from_scene(Vec3::new(2.5, 2.5, -1.0));
        assert_relative_eq!(raw.x, 0.75);
        assert_relative_eq!(raw.y, 0.25);
        assert_relative_eq!(raw.z, 0.1);
    }

    #[test]
    fn short_detection_yields_nothing() {
        assert!(HandPose::from_detection(&raw_hand(20)).is_none());
        assert!(HandPose::from_detection(&raw_hand(0)).is_none());
    }

    #[test]
    fn derived_points_copy_landmarks() {
        let pose = HandPose::from_detection(&raw_hand(21)).unwrap();
        assert_eq!(pose.index_finger(),  pose.landmark(8).unwrap());
        assert_eq!(pose.middle_finger(), pose.landmark(12).unwrap());
        assert_eq!(pose.palm_center(),   pose.landmark(9).unwrap());
        assert_eq!(pose.handedness(),    Handedness::Right);
    }

    #[test]
    fn landmark_lookup_is_checked() {
        let pose = HandPose::from_detection(&raw_hand(21)).unwrap();
        assert_eq!(pose.landmark(20), Some(pose.landmarks()[20]));
        assert_eq!(pose.landmark(LANDMARK_COUNT), None);
        assert_eq!(pose.landmark(usize::MAX), None);
    }

    #[test]
    fn center_is_mean_of_landmarks() {
        // x runs 0/20 .. 20/20, so the mean raw x is 0.5 → scene x 0.
        let pose = HandPose::from_detection(&raw_hand(21)).unwrap();
        assert_relative_eq!(pose.center().x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(pose.center().y, 0.0);
    }

    #[test]
    fn extra_landmarks_ignored() {
        let mut raw = raw_hand(21);
        raw.landmarks.push(RawLandmark::new(100.0, 100.0, 100.0));
        let pose = HandPose::from_detection(&raw).unwrap();
        assert_eq!(pose, HandPose::from_detection(&raw_hand(21)).unwrap());
    }

    #[test]
    fn normalize_skips_malformed_hands() {
        let frame = vec![raw_hand(21), raw_hand(5), raw_hand(21)];
        assert_eq!(normalize_detections(&frame).len(), 2);
        assert!(normalize_detections(&[]).is_empty());
    }

    #[test]
    fn degenerate_direction_is_zero() {
        let pose = HandPose::from_scene(Handedness::Unknown, [Vec3::ONE; LANDMARK_COUNT]);
        assert_eq!(pose.pointing_direction(), Vec3::ZERO);
    }

    #[test]
    fn handedness_labels() {
        assert_eq!(Handedness::from_label("Left"),   Handedness::Left);
        assert_eq!(Handedness::from_label(" right"), Handedness::Right);
        assert_eq!(Handedness::from_label("Unknown"), Handedness::Unknown);
        assert_eq!(Handedness::from_label(""),       Handedness::Unknown);
    }
}
