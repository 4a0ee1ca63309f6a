//! The per-frame cycle: latest detection → dispatch → step → present.
//!
//! [`FrameDriver`] owns all simulation state and is only ever touched from the
//! frame loop.  Detection results arrive as whole [`DetectionSnapshot`]s via
//! [`FrameDriver::submit`]; the most recent one stays in effect until the next
//! arrives, so a slow detector simply repeats its last intent.

use crate::config::{ConfigUpdate, SimulationConfig};
use crate::dispatch::{DetectionSnapshot, IntentDispatcher};
use crate::gesture::Gesture;
use crate::landmarks::HandPose;
use crate::particles::{ParticleStore, RenderBuffer};

/// Upper bound on a simulated time step, in seconds.
pub const MAX_DT: f32 = 0.05;

// ════════════════════════════════════════════════════════════════════════════
// FrameSink: the rendering collaborator
// ════════════════════════════════════════════════════════════════════════════

/// What the renderer needs besides the vertex data.
#[derive(Clone, Copy, Debug)]
pub struct FrameStatus<'a> {
    /// False while the landmark source is still starting (or failed).
    pub ready:      bool,
    pub hands:      &'a [HandPose],
    pub gesture:    Gesture,
    pub particles:  usize,
    pub config:     &'a SimulationConfig,
}

/// Receives one frame of point-cloud data.
pub trait FrameSink {
    fn present(&mut self, buffer: &RenderBuffer, status: &FrameStatus<'_>);
}

// ════════════════════════════════════════════════════════════════════════════
// FrameDriver
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct FrameDriver {
    store:        ParticleStore,
    dispatcher:   IntentDispatcher,
    snapshot:     DetectionSnapshot,
    ready:        bool,
    last_gesture: Gesture,
}

impl FrameDriver {
    pub fn new(config: SimulationConfig) -> Self {
        Self::from_parts(ParticleStore::new(config), IntentDispatcher::new())
    }

    /// A driver whose randomness is fully determined by `seed`.
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Self {
        Self::from_parts(
            ParticleStore::with_seed(config, seed),
            IntentDispatcher::with_seed(seed.wrapping_add(1)),
        )
    }

    pub fn from_parts(store: ParticleStore, dispatcher: IntentDispatcher) -> Self {
        FrameDriver {
            store,
            dispatcher,
            snapshot:     DetectionSnapshot::default(),
            ready:        false,
            last_gesture: Gesture::None,
        }
    }

    // ── detection side ───────────────────────────────────────────────────

    pub fn set_ready(&mut self, ready: bool) {
        if ready != self.ready {
            log::info!("landmark source {}", if ready { "ready" } else { "unavailable" });
        }
        self.ready = ready;
    }

    /// Replace the current snapshot with a newer one.
    pub fn submit(&mut self, snapshot: DetectionSnapshot) {
        if snapshot.gesture() != self.last_gesture {
            log::debug!(
                "gesture {} → {} ({} hand(s))",
                self.last_gesture, snapshot.gesture(), snapshot.hands().len()
            );
            self.last_gesture = snapshot.gesture();
        }
        self.snapshot = snapshot;
    }

    // ── UI side ──────────────────────────────────────────────────────────

    pub fn configure(&mut self, update: &ConfigUpdate) {
        self.store.update_config(update);
    }

    pub fn clear(&mut self) {
        log::debug!("clearing {} particles", self.store.count());
        self.store.clear();
    }

    // ── per frame ────────────────────────────────────────────────────────

    /// Advance one frame.  `raw_dt` is the wall-clock time since the previous
    /// frame and is clamped to `0..=MAX_DT`.
    pub fn tick(&mut self, raw_dt: f32) {
        let dt = clamp_dt(raw_dt);
        if self.ready {
            self.dispatcher.dispatch(&self.snapshot, &mut self.store);
        }
        self.store.step(dt);
    }

    /// Hand the current frame to the renderer.
    pub fn present<S: FrameSink + ?Sized>(&self, sink: &mut S) {
        let buffer = self.store.render_buffer();
        sink.present(&buffer, &self.status());
    }

    pub fn status(&self) -> FrameStatus<'_> {
        FrameStatus {
            ready:     self.ready,
            hands:     if self.ready { self.snapshot.hands() } else { &[] },
            gesture:   if self.ready { self.snapshot.gesture() } else { Gesture::None },
            particles: self.store.count(),
            config:    self.store.config(),
        }
    }

    pub fn store(&self)    -> &ParticleStore     { &self.store }
    pub fn snapshot(&self) -> &DetectionSnapshot { &self.snapshot }
    pub fn is_ready(&self) -> bool               { self.ready }
}

/// Clamp a measured frame time; negative and NaN become zero.
pub fn clamp_dt(raw_dt: f32) -> f32 {
    if raw_dt.is_nan() { 0.0 } else { raw_dt.clamp(0.0, MAX_DT) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
