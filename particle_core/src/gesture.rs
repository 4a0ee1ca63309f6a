//! Heuristic gesture classifier.
//!
//! A single [`HandPose`] is reduced to a handful of features (thumb/index
//! gap and four finger-extended flags) which are then run through an ordered
//! rule table.  The first rule that matches wins.  There is no memory
//! between frames, so a hand hovering near a threshold will flicker between
//! adjacent labels.

use std::fmt;

use crate::landmarks::{
    HandPose, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP,
    RING_PIP, RING_TIP, THUMB_TIP,
};

/// Thumb-to-index distance (scene units) under which the hand is pinching.
pub const PINCH_THRESHOLD: f32 = 1.0;

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    #[default]
    None,
    Pinch,
    Point,
    Peace,
    Open,
    Fist,
}

impl Gesture {
    pub const ALL: [Gesture; 6] = [
        Gesture::None, Gesture::Pinch, Gesture::Point,
        Gesture::Peace, Gesture::Open, Gesture::Fist,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::None  => "None",
            Gesture::Pinch => "Pinch",
            Gesture::Point => "Point",
            Gesture::Peace => "Peace",
            Gesture::Open  => "Open",
            Gesture::Fist  => "Fist",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Features
// ════════════════════════════════════════════════════════════════════════════

/// The measurements the rule table looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandFeatures {
    /// Distance between thumb tip and index tip.
    pub pinch_gap: f32,
    pub index:     bool,
    pub middle:    bool,
    pub ring:      bool,
    pub pinky:     bool,
}

impl HandFeatures {
    /// A finger counts as extended when its tip's `y` is below its PIP
    /// joint's `y`.
    pub fn of(pose: &HandPose) -> Self {
        let lm = pose.landmarks();
        let extended = |tip: usize, pip: usize| lm[tip].y < lm[pip].y;
        HandFeatures {
            pinch_gap: lm[THUMB_TIP].distance(lm[INDEX_TIP]),
            index:     extended(INDEX_TIP,  INDEX_PIP),
            middle:    extended(MIDDLE_TIP, MIDDLE_PIP),
            ring:      extended(RING_TIP,   RING_PIP),
            pinky:     extended(PINKY_TIP,  PINKY_PIP),
        }
    }

    /// Extended flags as (index, middle, ring, pinky).
    pub fn fingers(&self) -> (bool, bool, bool, bool) {
        (self.index, self.middle, self.ring, self.pinky)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rule table
// ════════════════════════════════════════════════════════════════════════════

/// One rung of the decision ladder.
pub struct Rule {
    pub label:   Gesture,
    pub matches: fn(&HandFeatures) -> bool,
}

/// Evaluated top-down; the first match wins, no match means [`Gesture::None`].
pub const RULES: &[Rule] = &[
    Rule { label: Gesture::Pinch, matches: |f| f.pinch_gap < PINCH_THRESHOLD },
    Rule { label: Gesture::Point, matches: |f| f.fingers() == (true,  false, false, false) },
    Rule { label: Gesture::Peace, matches: |f| f.fingers() == (true,  true,  false, false) },
    Rule { label: Gesture::Open,  matches: |f| f.fingers() == (true,  true,  true,  true ) },
    Rule { label: Gesture::Fist,  matches: |f| f.fingers() == (false, false, false, false) },
];

/// Classify one hand.
pub fn classify(pose: &HandPose) -> Gesture {
    classify_features(&HandFeatures::of(pose))
}

pub fn classify_features(features: &HandFeatures) -> Gesture {
    RULES.iter()
        .find(|rule| (rule.matches)(features))
        .map(|rule| rule.label)
        .unwrap_or(Gesture::None)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Handedness, LANDMARK_COUNT};
    use glam::Vec3;

    const FINGERS: [(usize, usize); 4] = [
        (INDEX_TIP, INDEX_PIP), (MIDDLE_TIP, MIDDLE_PIP),
        (RING_TIP, RING_PIP),   (PINKY_TIP, PINKY_PIP),
    ];

    /// Thumb parked far away; each finger's tip one unit below (extended) or
    /// above (folded) its PIP.
    fn pose(extended: [bool; 4]) -> HandPose {
        let mut lm = [Vec3::ZERO; LANDMARK_COUNT];
        lm[THUMB_TIP] = Vec3::new(-50.0, 0.0, 0.0);
        for (k, &(tip, pip)) in FINGERS.iter().enumerate() {
            let x = k as f32 * 2.0;
            lm[pip] = Vec3::new(x, -1.0, 0.0);
            lm[tip] = Vec3::new(x, if extended[k] { -2.0 } else { 0.0 }, 0.0);
        }
        HandPose::from_scene(Handedness::Right, lm)
    }

    #[test]
    fn pinch_wins_regardless_of_fingers() {
        for ext in [[true; 4], [false; 4], [true, false, true, false]] {
            let mut lm = *pose(ext).landmarks();
            lm[THUMB_TIP] = Vec3::ZERO;
            lm[INDEX_TIP] = Vec3::new(0.3, 0.0, 0.0);
            let p = HandPose::from_scene(Handedness::Left, lm);
            assert_eq!(classify(&p), Gesture::Pinch);
        }
    }

    #[test]
    fn pinch_threshold_is_strict() {
        let mut lm = *pose([false; 4]).landmarks();
        lm[THUMB_TIP] = Vec3::ZERO;
        lm[INDEX_TIP] = Vec3::new(1.0, 0.0, 0.0);
        lm[INDEX_PIP] = Vec3::new(1.0, 5.0, 0.0);
        let p = HandPose::from_scene(Handedness::Left, lm);
        assert_eq!(HandFeatures::of(&p).pinch_gap, 1.0);
        assert_ne!(classify(&p), Gesture::Pinch);
    }

    #[test]
    fn point_when_only_index_below_pip() {
        assert_eq!(classify(&pose([true, false, false, false])), Gesture::Point);
    }

    #[test]
    fn tip_level_with_pip_counts_as_folded() {
        let mut lm = *pose([true, false, false, false]).landmarks();
        lm[MIDDLE_TIP].y = lm[MIDDLE_PIP].y;
        let p = HandPose::from_scene(Handedness::Right, lm);
        assert_eq!(classify(&p), Gesture::Point);
    }

    #[test]
    fn peace_open_fist() {
        assert_eq!(classify(&pose([true, true, false, false])), Gesture::Peace);
        assert_eq!(classify(&pose([true; 4])),                  Gesture::Open);
        assert_eq!(classify(&pose([false; 4])),                 Gesture::Fist);
    }

    #[test]
    fn other_combinations_are_none() {
        for ext in [
            [false, true, false, false],
            [true, false, true, false],
            [true, true, true, false],
            [false, false, false, true],
        ] {
            assert_eq!(classify(&pose(ext)), Gesture::None, "{:?}", ext);
        }
    }

    #[test]
    fn classification_is_pure() {
        let p = pose([true, true, false, false]);
        assert_eq!(classify(&p), classify(&p));
        assert_eq!(HandFeatures::of(&p), HandFeatures::of(&p));
    }

    #[test]
    fn rule_order_pinch_first() {
        assert_eq!(RULES[0].label, Gesture::Pinch);
        let f = HandFeatures {
            pinch_gap: 0.0, index: true, middle: false, ring: false, pinky: false,
        };
        assert_eq!(classify_features(&f), Gesture::Pinch);
    }

    #[test]
    fn display_names() {
        assert_eq!(Gesture::Open.to_string(), "Open");
        assert_eq!(Gesture::default(), Gesture::None);
        assert_eq!(Gesture::ALL.len(), 6);
    }
}
