//! Discrete gesture classification.
//!
//! A hand's shape is reduced to one [`Digit`] state per finger, read from the
//! vertical order of fingertip and knuckle (image y grows downward, so a tip
//! *above* its knuckle has the smaller y).  Gestures are then matched against
//! [`RULES`] in order; the first rule whose predicate holds wins.
//!
//! | Gesture | Four fingers | Thumb |
//! |---|---|---|
//! | Freeze (closed fist) | all folded | not extended |
//! | Release (four fingers) | all extended | folded |
//! | Reset (thumbs up) | all folded | extended |
//!
//! Every rule checks the thumb itself, so a tucked-thumb fist can only ever
//! be Freeze and a thumbs-up can only ever be Reset.

use std::fmt;

use crate::{index, Hand};

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gesture {
    None,
    Freeze,
    Release,
    Reset,
}

impl Gesture {
    pub fn name(self) -> &'static str {
        match self {
            Gesture::None    => "NONE",
            Gesture::Freeze  => "FREEZE",
            Gesture::Release => "RELEASE",
            Gesture::Reset   => "RESET",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Digit state
// ════════════════════════════════════════════════════════════════════════════

/// Vertical relation of a tip to its reference joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Digit {
    /// Tip above the joint.
    Extended,
    /// Tip below the joint.
    Folded,
    /// Tip exactly level with the joint.
    Level,
}

impl Digit {
    fn from_ys(tip_y: f32, joint_y: f32) -> Self {
        if tip_y < joint_y {
            Digit::Extended
        } else if tip_y > joint_y {
            Digit::Folded
        } else {
            Digit::Level
        }
    }

    pub fn is_extended(self) -> bool { self == Digit::Extended }
}

/// (tip, pip) pairs for index, middle, ring, pinky.
pub const FINGER_JOINTS: [(u8, u8); 4] = [
    (index::INDEX_TIP,  index::INDEX_PIP),
    (index::MIDDLE_TIP, index::MIDDLE_PIP),
    (index::RING_TIP,   index::RING_PIP),
    (index::PINKY_TIP,  index::PINKY_PIP),
];

/// The per-finger reduction of a hand that gesture rules operate on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandShape {
    /// Thumb tip (4) against the thumb IP joint (3).
    pub thumb:   Digit,
    pub fingers: [Digit; 4],
}

impl HandShape {
    /// Reduce a hand.  `None` if any consumed landmark is missing.
    pub fn of(hand: &Hand) -> Option<Self> {
        let digit = |tip: u8, joint: u8| -> Option<Digit> {
            Some(Digit::from_ys(hand.get(tip)?.y, hand.get(joint)?.y))
        };
        let thumb = digit(index::THUMB_TIP, index::THUMB_IP)?;
        let mut fingers = [Digit::Level; 4];
        for (slot, &(tip, pip)) in fingers.iter_mut().zip(FINGER_JOINTS.iter()) {
            *slot = digit(tip, pip)?;
        }
        Some(HandShape { thumb, fingers })
    }

    pub fn extended_fingers(&self) -> usize {
        self.fingers.iter().filter(|d| d.is_extended()).count()
    }

    fn all_fingers_extended(&self) -> bool { self.extended_fingers() == 4 }
    fn all_fingers_folded(&self)   -> bool { self.extended_fingers() == 0 }

    pub fn classify(&self) -> Gesture {
        RULES.iter()
            .find(|(_, matches)| matches(self))
            .map(|&(g, _)| g)
            .unwrap_or(Gesture::None)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rules
// ════════════════════════════════════════════════════════════════════════════

pub fn is_freeze(s: &HandShape) -> bool {
    s.all_fingers_folded() && !s.thumb.is_extended()
}

pub fn is_release(s: &HandShape) -> bool {
    s.all_fingers_extended() && s.thumb == Digit::Folded
}

pub fn is_reset(s: &HandShape) -> bool {
    s.all_fingers_folded() && s.thumb.is_extended()
}

pub type Rule = (Gesture, fn(&HandShape) -> bool);

/// Evaluation order.  Reordering this table changes behaviour.
pub const RULES: [Rule; 3] = [
    (Gesture::Freeze,  is_freeze),
    (Gesture::Release, is_release),
    (Gesture::Reset,   is_reset),
];

/// Classify a hand; missing landmarks classify as [`Gesture::None`].
pub fn classify(hand: &Hand) -> Gesture {
    match HandShape::of(hand) {
        Some(shape) => shape.classify(),
        None        => Gesture::None,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{HandSketch, Pose};
    use crate::Handedness;

    fn shape(thumb: Digit, fingers: Digit) -> HandShape {
        HandShape { thumb, fingers: [fingers; 4] }
    }

    #[test]
    fn synthetic_poses_classify() {
        for side in Handedness::all() {
            let g = |p| classify(&HandSketch::new(side, p).build());
            assert_eq!(g(Pose::Fist),        Gesture::Freeze);
            assert_eq!(g(Pose::FourFingers), Gesture::Release);
            assert_eq!(g(Pose::ThumbsUp),    Gesture::Reset);
            assert_eq!(g(Pose::Pinch),       Gesture::None);
        }
    }

    #[test]
    fn tucked_thumb_fist_is_freeze_not_reset() {
        let s = shape(Digit::Folded, Digit::Folded);
        assert!(is_freeze(&s));
        assert!(!is_reset(&s));
        assert_eq!(s.classify(), Gesture::Freeze);
    }

    #[test]
    fn thumbs_up_is_reset_not_freeze() {
        let s = shape(Digit::Extended, Digit::Folded);
        assert!(!is_freeze(&s));
        assert_eq!(s.classify(), Gesture::Reset);
    }

    #[test]
    fn four_fingers_with_closed_thumb() {
        let s = shape(Digit::Folded, Digit::Extended);
        assert!(!is_freeze(&s));
        assert!(!is_reset(&s));
        assert_eq!(s.classify(), Gesture::Release);
    }

    #[test]
    fn level_tips_count_as_not_extended() {
        // tip.y == pip.y is "not extended" for fingers
        let s = shape(Digit::Level, Digit::Level);
        assert_eq!(s.classify(), Gesture::Freeze);
        // ...but release wants a strictly folded thumb
        let s = shape(Digit::Level, Digit::Extended);
        assert_eq!(s.classify(), Gesture::None);
    }

    #[test]
    fn partial_extension_is_none() {
        let mut s = shape(Digit::Folded, Digit::Extended);
        s.fingers[2] = Digit::Folded;
        assert_eq!(s.extended_fingers(), 3);
        assert_eq!(s.classify(), Gesture::None);
    }

    #[test]
    fn missing_knuckle_is_none() {
        let mut hand = HandSketch::new(Handedness::Left, Pose::Fist).build();
        hand.remove(index::RING_PIP);
        assert!(HandShape::of(&hand).is_none());
        assert_eq!(classify(&hand), Gesture::None);
    }

    #[test]
    fn rule_order_is_freeze_release_reset() {
        let order: Vec<Gesture> = RULES.iter().map(|r| r.0).collect();
        assert_eq!(order, vec![Gesture::Freeze, Gesture::Release, Gesture::Reset]);
    }
}
