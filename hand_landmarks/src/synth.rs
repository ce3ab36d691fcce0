//! Synthetic hands for simulation and tests.
//!
//! [`HandSketch`] lays out a plausible 21-point hand around a centre point in
//! one of a few [`Pose`]s.  Only vertical tip/joint order matters for the
//! classifier, so the geometry is schematic.

use crate::{index, Hand, Handedness, Landmark};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pose {
    /// Thumb and all fingers extended; thumb tip and index tip spread apart
    /// horizontally by the sketch's `pinch`.  Classifies as no gesture.
    Pinch,
    /// Closed fist, thumb tucked.
    Fist,
    /// Four fingers up, thumb folded.
    FourFingers,
    /// Thumb up, fingers folded.
    ThumbsUp,
}

// Finger columns relative to the centre (index, middle, ring, pinky).
const FINGER_X:  [f32; 4] = [-0.03, 0.0, 0.03, 0.06];
const MCP_Y:     f32 = 0.02;
const THUMB_X:   f32 = -0.08;
const THUMB_MCP_Y: f32 = 0.08;

/// Builder for a synthetic hand.
#[derive(Clone, Copy, Debug)]
pub struct HandSketch {
    pub handedness: Handedness,
    pub pose: Pose,
    /// Normalised centre of the palm's knuckle line.
    pub center: (f32, f32),
    /// Normalised horizontal thumb-tip ↔ index-tip spread in [`Pose::Pinch`].
    pub pinch: f32,
}

impl HandSketch {
    pub fn new(handedness: Handedness, pose: Pose) -> Self {
        let center = match handedness {
            Handedness::Left  => (0.3, 0.5),
            Handedness::Right => (0.7, 0.5),
        };
        HandSketch { handedness, pose, center, pinch: 0.15 }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.center = (x, y);
        self
    }

    pub fn pinch(mut self, spread: f32) -> Self {
        self.pinch = spread.max(0.0);
        self
    }

    pub fn build(&self) -> Hand {
        let (cx, cy) = self.center;
        let mut pts = [(0.0f32, 0.0f32); 21];

        pts[index::WRIST as usize]     = (cx + 0.01, cy + 0.15);
        pts[index::THUMB_CMC as usize] = (cx - 0.05, cy + 0.12);
        pts[index::THUMB_MCP as usize] = (cx + THUMB_X, cy + THUMB_MCP_Y);

        let fingers_up = matches!(self.pose, Pose::Pinch | Pose::FourFingers);
        let thumb_up   = matches!(self.pose, Pose::Pinch | Pose::ThumbsUp);

        // ── four fingers ──────────────────────────────────────────────────
        for (f, &dx) in FINGER_X.iter().enumerate() {
            let mcp = 5 + 4 * f;
            let x = cx + dx;
            let y = cy + MCP_Y;
            pts[mcp] = (x, y);
            if fingers_up {
                pts[mcp + 1] = (x, y - 0.05);
                pts[mcp + 2] = (x, y - 0.08);
                pts[mcp + 3] = (x, y - 0.11);
            } else {
                pts[mcp + 1] = (x, y - 0.04);
                pts[mcp + 2] = (x, y - 0.01);
                pts[mcp + 3] = (x, y + 0.01);
            }
        }

        // ── thumb ─────────────────────────────────────────────────────────
        let (tx, ty) = pts[index::THUMB_MCP as usize];
        if thumb_up {
            pts[index::THUMB_IP as usize]  = (tx, ty - 0.05);
            pts[index::THUMB_TIP as usize] = (tx, ty - 0.09);
        } else {
            pts[index::THUMB_IP as usize]  = (tx + 0.02, ty - 0.03);
            pts[index::THUMB_TIP as usize] = (tx + 0.04, ty - 0.01);
        }

        // ── pinch: thumb tip and index tip level, `pinch` apart ───────────
        if self.pose == Pose::Pinch {
            let y = cy - 0.06;
            pts[index::THUMB_TIP as usize] = (cx - self.pinch / 2.0, y);
            pts[index::INDEX_TIP as usize] = (cx + self.pinch / 2.0, y);
            let (px, py) = pts[index::INDEX_PIP as usize];
            pts[index::INDEX_DIP as usize] = ((px + cx + self.pinch / 2.0) / 2.0, (py + y) / 2.0);
        }

        let landmarks = pts.iter().enumerate()
            .map(|(i, &(x, y))| Landmark::new(i as u8, x, y))
            .collect();
        Hand::new(self.handedness, landmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::pinch_distance;

    #[test]
    fn builds_complete_hands() {
        for pose in [Pose::Pinch, Pose::Fist, Pose::FourFingers, Pose::ThumbsUp] {
            let hand = HandSketch::new(Handedness::Right, pose).build();
            assert!(hand.is_complete(), "{:?} should carry 21 points", pose);
            assert_eq!(hand.landmarks().len(), 21);
        }
    }

    #[test]
    fn pinch_spread_sets_distance() {
        let hand = HandSketch::new(Handedness::Left, Pose::Pinch)
            .at(0.5, 0.5)
            .pinch(0.25)
            .build();
        let d = pinch_distance(&hand, 1000, 1000);
        assert!((d - 250.0).abs() <= 2.0, "got {}", d);
    }

    #[test]
    fn negative_pinch_clamps() {
        let s = HandSketch::new(Handedness::Left, Pose::Pinch).pinch(-1.0);
        assert_eq!(s.pinch, 0.0);
    }
}
