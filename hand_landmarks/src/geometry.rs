//! Pixel-space geometry: the thumb-tip ↔ index-tip "pinch" distance.

use crate::{index, Hand, Landmark};

/// A landmark projected onto the frame, in whole pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// How far outside the frame a landmark may land, in frame widths/heights.
/// Detectors extrapolate occluded joints a little past the edge; anything
/// further is pinned here.
pub const OFF_FRAME_MARGIN: f32 = 1.0;

fn to_pixels(norm: f32, extent: u32) -> i32 {
    let norm = norm.clamp(-OFF_FRAME_MARGIN, 1.0 + OFF_FRAME_MARGIN);
    (norm * extent as f32) as i32
}

impl PixelPoint {
    /// Denormalise a landmark.  Coordinates truncate toward zero, matching
    /// how capture pipelines report integer pixel positions, and are pinned
    /// to within [`OFF_FRAME_MARGIN`] of the frame.
    pub fn from_landmark(lm: &Landmark, width: u32, height: u32) -> Self {
        PixelPoint {
            x: to_pixels(lm.x, width),
            y: to_pixels(lm.y, height),
        }
    }

    pub fn distance(self, other: PixelPoint) -> f32 {
        let dx = (other.x as i64 - self.x as i64) as f32;
        let dy = (other.y as i64 - self.y as i64) as f32;
        dx.hypot(dy)
    }
}

/// Thumb tip (4) and index fingertip (8) in pixels, if both were detected.
pub fn pinch_points(hand: &Hand, width: u32, height: u32) -> Option<(PixelPoint, PixelPoint)> {
    let thumb = hand.get(index::THUMB_TIP)?;
    let tip   = hand.get(index::INDEX_TIP)?;
    Some((
        PixelPoint::from_landmark(thumb, width, height),
        PixelPoint::from_landmark(tip,   width, height),
    ))
}

/// Euclidean pixel distance between thumb tip and index fingertip.
///
/// Returns 0.0 when either point is missing; downstream mapping clamps that
/// to the low end of its range.
pub fn pinch_distance(hand: &Hand, width: u32, height: u32) -> f32 {
    match pinch_points(hand, width, height) {
        Some((a, b)) => a.distance(b),
        None         => 0.0,
    }
}
