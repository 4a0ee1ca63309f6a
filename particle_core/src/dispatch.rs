//! Turning a frame's detection snapshot into emissions and impulses.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::gesture::{classify, Gesture};
use crate::landmarks::{normalize_detections, HandPose, RawDetection};
use crate::particles::ParticleStore;

/// Fraction of the per-second emission rate spawned per frame while pointing
/// (a fixed 20 ms slice, independent of the real frame time).
pub const EMISSION_SLICE: f32 = 0.02;

/// Upper bound on particles spawned by one hand in one frame.
pub const MAX_EMIT_PER_FRAME: usize = 10_000;

pub const PINCH_STRENGTH: f32 = -10.0;
pub const PINCH_RADIUS:   f32 = 4.0;
pub const OPEN_STRENGTH:  f32 = 20.0;
pub const OPEN_RADIUS:    f32 = 6.0;
/// Peace impulses are drawn uniformly from `[-PEACE_RANGE, PEACE_RANGE]³`.
pub const PEACE_RANGE:    f32 = 10.0;
pub const PEACE_RADIUS:   f32 = 8.0;

// ════════════════════════════════════════════════════════════════════════════
// DetectionSnapshot
// ════════════════════════════════════════════════════════════════════════════

/// Everything the dispatcher needs from one detection frame.
///
/// The gesture is classified from the first hand and drives every hand in
/// the frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionSnapshot {
    hands:   Vec<HandPose>,
    gesture: Gesture,
}

impl DetectionSnapshot {
    pub fn new(hands: Vec<HandPose>) -> Self {
        let gesture = hands.first().map(classify).unwrap_or_default();
        DetectionSnapshot { hands, gesture }
    }

    /// Normalize and classify a raw detection frame.
    pub fn from_detections(raw: &[RawDetection]) -> Self {
        Self::new(normalize_detections(raw))
    }

    pub fn hands(&self)   -> &[HandPose] { &self.hands }
    pub fn gesture(&self) -> Gesture     { self.gesture }
    pub fn is_empty(&self) -> bool       { self.hands.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// IntentDispatcher
// ════════════════════════════════════════════════════════════════════════════

/// Maps gesture + hand geometry onto [`ParticleStore`] calls.
#[derive(Debug)]
pub struct IntentDispatcher {
    rng: StdRng,
}

impl Default for IntentDispatcher {
    fn default() -> Self { Self::new() }
}

impl IntentDispatcher {
    pub fn new() -> Self {
        IntentDispatcher { rng: StdRng::from_os_rng() }
    }

    pub fn with_seed(seed: u64) -> Self {
        IntentDispatcher { rng: StdRng::seed_from_u64(seed) }
    }

    /// Apply one frame's intent to the store.
    pub fn dispatch(&mut self, snapshot: &DetectionSnapshot, store: &mut ParticleStore) {
        let gesture = snapshot.gesture();
        for hand in snapshot.hands() {
            self.apply(gesture, hand, store);
        }
    }

    fn apply(&mut self, gesture: Gesture, hand: &HandPose, store: &mut ParticleStore) {
        let dir = hand.pointing_direction();
        match gesture {
            Gesture::Point => {
                let count = emission_count(store.config().emission_rate);
                store.emit(hand.index_finger(), dir, count);
            }
            Gesture::Pinch => {
                store.add_force(hand.index_finger(), dir * PINCH_STRENGTH, PINCH_RADIUS);
            }
            Gesture::Open => {
                store.add_force(hand.palm_center(), dir * OPEN_STRENGTH, OPEN_RADIUS);
            }
            Gesture::Peace => {
                let kick = self.random_impulse();
                store.add_force(hand.palm_center(), kick, PEACE_RADIUS);
            }
            Gesture::Fist | Gesture::None => {}
        }
    }

    fn random_impulse(&mut self) -> Vec3 {
        Vec3::new(
            self.rng.random_range(-PEACE_RANGE..PEACE_RANGE),
            self.rng.random_range(-PEACE_RANGE..PEACE_RANGE),
            self.rng.random_range(-PEACE_RANGE..PEACE_RANGE),
        )
    }
}

/// Particles spawned per frame for a given per-second rate.  Non-positive or
/// NaN rates spawn nothing; huge or infinite rates stop at
/// [`MAX_EMIT_PER_FRAME`].
pub fn emission_count(rate: f32) -> usize {
    // float → usize casts saturate, so negatives and NaN land on 0
    ((rate * EMISSION_SLICE).ceil() as usize).min(MAX_EMIT_PER_FRAME)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigUpdate, SimulationConfig};
    use crate::landmarks::{
        Handedness, LANDMARK_COUNT, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP,
        PALM, PINKY_PIP, PINKY_TIP, RING_PIP, RING_TIP, THUMB_TIP,
    };
    use approx::assert_relative_eq;

    /// Palm at the origin, index tip at (0,-2,0) so the hand points -Y.
    fn hand(extended: [bool; 4], pinch: bool) -> HandPose {
        let mut lm = [Vec3::ZERO; LANDMARK_COUNT];
        let fingers = [
            (INDEX_TIP, INDEX_PIP), (MIDDLE_TIP, MIDDLE_PIP),
            (RING_TIP, RING_PIP),   (PINKY_TIP, PINKY_PIP),
        ];
        for (k, &(tip, pip)) in fingers.iter().enumerate() {
            let x = k as f32 * 0.5;
            lm[pip] = Vec3::new(x, -1.0, 0.0);
            lm[tip] = Vec3::new(x, if extended[k] { -2.0 } else { 0.5 }, 0.0);
        }
        lm[INDEX_TIP] = Vec3::new(0.0, lm[INDEX_TIP].y, 0.0);
        lm[PALM] = Vec3::ZERO;
        lm[THUMB_TIP] = if pinch { lm[INDEX_TIP] + Vec3::new(0.2, 0.0, 0.0) } else { Vec3::new(-5.0, 0.0, 0.0) };
        HandPose::from_scene(Handedness::Right, lm)
    }

    fn store() -> ParticleStore {
        ParticleStore::with_seed(SimulationConfig::default(), 1)
    }

    #[test]
    fn snapshot_classifies_first_hand() {
        let snap = DetectionSnapshot::new(vec![
            hand([true, true, true, true], false),
            hand([false; 4], false),
        ]);
        assert_eq!(snap.gesture(), Gesture::Open);
        assert_eq!(snap.hands().len(), 2);
        assert_eq!(DetectionSnapshot::default().gesture(), Gesture::None);
        assert!(DetectionSnapshot::from_detections(&[]).is_empty());
    }

    #[test]
    fn emission_count_rounds_up() {
        assert_eq!(emission_count(60.0), 2);   // 1.2 → 2
        assert_eq!(emission_count(25.0), 1);
        assert_eq!(emission_count(0.0), 0);
        assert_eq!(emission_count(-40.0), 0);
        assert_eq!(emission_count(f32::NAN), 0);
        assert_eq!(emission_count(f32::INFINITY), MAX_EMIT_PER_FRAME);
        assert_eq!(emission_count(1e30), MAX_EMIT_PER_FRAME);
    }

    #[test]
    fn infinite_rate_emits_bounded_batch() {
        let mut s = store();
        s.update_config(&ConfigUpdate { emission_rate: Some(f32::INFINITY), ..Default::default() });
        let mut d = IntentDispatcher::with_seed(2);
        let snap = DetectionSnapshot::new(vec![hand([true, false, false, false], false)]);
        d.dispatch(&snap, &mut s);
        assert_eq!(s.count(), MAX_EMIT_PER_FRAME);
        s.step(0.016);
        assert_eq!(s.count(), MAX_EMIT_PER_FRAME);
    }

    #[test]
    fn point_emits_from_index_tip() {
        let mut s = store();
        let mut d = IntentDispatcher::with_seed(2);
        let snap = DetectionSnapshot::new(vec![hand([true, false, false, false], false)]);
        assert_eq!(snap.gesture(), Gesture::Point);
        d.dispatch(&snap, &mut s);
        assert_eq!(s.count(), 2);
        for p in s.particles() {
            assert_eq!(p.position, Vec3::new(0.0, -2.0, 0.0));
            assert!(p.velocity.y < 0.0);
        }
    }

    #[test]
    fn point_emits_per_hand() {
        let mut s = store();
        let mut d = IntentDispatcher::with_seed(2);
        let h = hand([true, false, false, false], false);
        d.dispatch(&DetectionSnapshot::new(vec![h.clone(), h]), &mut s);
        assert_eq!(s.count(), 4);
    }

    #[test]
    fn point_follows_configured_rate() {
        let mut s = store();
        s.update_config(&ConfigUpdate { emission_rate: Some(510.0), ..Default::default() });
        let mut d = IntentDispatcher::with_seed(2);
        d.dispatch(&DetectionSnapshot::new(vec![hand([true, false, false, false], false)]), &mut s);
        assert_eq!(s.count(), 11);
    }

    #[test]
    fn pinch_pulls_toward_fingertip() {
        let mut d = IntentDispatcher::with_seed(3);
        let snap = DetectionSnapshot::new(vec![hand([true, false, false, false], true)]);
        assert_eq!(snap.gesture(), Gesture::Pinch);

        let mut s = store();
        s.update_config(&ConfigUpdate { speed: Some(0.0), ..Default::default() });
        s.emit(Vec3::new(0.0, -3.0, 0.0), Vec3::Y, 1);
        d.dispatch(&snap, &mut s);
        // dir = -Y, force = dir * -10 = +10 Y; one unit from the tip of a 4 radius → ×0.75
        let v = s.particles()[0].velocity;
        assert_relative_eq!(v.y, 7.5);
        assert_eq!(s.count(), 1);
    }

    #[test]
    fn open_pushes_from_palm() {
        let mut d = IntentDispatcher::with_seed(4);
        let snap = DetectionSnapshot::new(vec![hand([true; 4], false)]);
        assert_eq!(snap.gesture(), Gesture::Open);

        let mut s = store();
        s.update_config(&ConfigUpdate { speed: Some(0.0), ..Default::default() });
        s.emit(Vec3::new(3.0, 0.0, 0.0), Vec3::Y, 1);
        d.dispatch(&snap, &mut s);
        // dir = -Y, force 20 along it, distance 3 of radius 6 → ×0.5
        let v = s.particles()[0].velocity;
        assert_relative_eq!(v.y, -10.0);
        assert_relative_eq!(v.x, 0.0);
    }

    #[test]
    fn peace_kicks_within_range() {
        let mut d = IntentDispatcher::with_seed(5);
        let snap = DetectionSnapshot::new(vec![hand([true, true, false, false], false)]);
        assert_eq!(snap.gesture(), Gesture::Peace);

        let mut s = store();
        s.update_config(&ConfigUpdate { speed: Some(0.0), ..Default::default() });
        s.emit(Vec3::ZERO, Vec3::Y, 1);
        d.dispatch(&snap, &mut s);
        let v = s.particles()[0].velocity;
        assert!(v.abs().max_element() <= PEACE_RANGE);
        assert_ne!(v, Vec3::ZERO);
    }

    #[test]
    fn fist_and_none_do_nothing() {
        let mut d = IntentDispatcher::with_seed(6);
        let mut s = store();
        s.update_config(&ConfigUpdate { speed: Some(0.0), ..Default::default() });
        s.emit(Vec3::ZERO, Vec3::Y, 3);
        let before: Vec<_> = s.particles().to_vec();
        for ext in [[false; 4], [false, true, false, false]] {
            let snap = DetectionSnapshot::new(vec![hand(ext, false)]);
            assert!(matches!(snap.gesture(), Gesture::Fist | Gesture::None));
            d.dispatch(&snap, &mut s);
        }
        assert_eq!(s.particles(), &before[..]);
    }

    #[test]
    fn degenerate_direction_never_produces_nan() {
        let mut lm = [Vec3::ZERO; LANDMARK_COUNT];
        lm[THUMB_TIP] = Vec3::new(9.0, 9.0, 9.0);
        lm[INDEX_PIP] = Vec3::new(0.0, 1.0, 0.0);   // index "extended", tip == palm
        for (tip, pip) in [(MIDDLE_TIP, MIDDLE_PIP), (RING_TIP, RING_PIP), (PINKY_TIP, PINKY_PIP)] {
            lm[tip] = Vec3::new(0.0, 2.0, 0.0);
            lm[pip] = Vec3::new(0.0, 1.0, 0.0);
        }
        let pose = HandPose::from_scene(Handedness::Left, lm);
        assert_eq!(pose.pointing_direction(), Vec3::ZERO);

        let snap = DetectionSnapshot::new(vec![pose]);
        assert_eq!(snap.gesture(), Gesture::Point);
        let mut s = store();
        IntentDispatcher::with_seed(8).dispatch(&snap, &mut s);
        assert!(s.count() > 0);
        assert!(s.particles().iter().all(|p| p.velocity.is_finite()));
    }
}
