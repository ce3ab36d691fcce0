//! # hand_landmarks
//!
//! The per-frame hand model delivered by a landmark detector, plus the two
//! pieces of geometry the controller reads from it:
//!
//! * [`geometry`]: thumb-tip ↔ index-tip pinch distance in pixels.
//! * [`gesture`]: a small ordered-rule classifier over fingertip/knuckle
//!   ordering (fist = freeze, four fingers = release, thumbs up = reset).
//!
//! Frames arrive as JSON lines (one object per video frame):
//!
//! ```text
//! {"width":640,"height":480,"hands":[
//!   {"handedness":"Left","score":0.93,"landmarks":[{"x":0.41,"y":0.62,"z":0.0}, …]}
//! ]}
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use hand_landmarks::{decode_frame, classify, pinch_distance, Gesture, Handedness};
//! use hand_landmarks::synth::{HandSketch, Pose};
//!
//! let hand = HandSketch::new(Handedness::Left, Pose::Fist).build();
//! assert_eq!(classify(&hand), Gesture::Freeze);
//!
//! let frame = decode_frame(r#"{"width":640,"height":480,"hands":[]}"#, (640, 480)).unwrap();
//! assert!(frame.hands.is_empty());
//! let _ = pinch_distance(&hand, 640, 480);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod geometry;
pub mod gesture;
pub mod synth;

pub use geometry::{pinch_distance, pinch_points, PixelPoint};
pub use gesture::{classify, Gesture, HandShape};

/// Number of skeletal points a full hand carries.
pub const LANDMARK_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices (hand-landmarker convention)
// ════════════════════════════════════════════════════════════════════════════

#[allow(dead_code)]
pub mod index {
    pub const WRIST:      u8 = 0;
    pub const THUMB_CMC:  u8 = 1;
    pub const THUMB_MCP:  u8 = 2;
    pub const THUMB_IP:   u8 = 3;
    pub const THUMB_TIP:  u8 = 4;
    pub const INDEX_MCP:  u8 = 5;
    pub const INDEX_PIP:  u8 = 6;
    pub const INDEX_DIP:  u8 = 7;
    pub const INDEX_TIP:  u8 = 8;
    pub const MIDDLE_MCP: u8 = 9;
    pub const MIDDLE_PIP: u8 = 10;
    pub const MIDDLE_DIP: u8 = 11;
    pub const MIDDLE_TIP: u8 = 12;
    pub const RING_MCP:   u8 = 13;
    pub const RING_PIP:   u8 = 14;
    pub const RING_DIP:   u8 = 15;
    pub const RING_TIP:   u8 = 16;
    pub const PINKY_MCP:  u8 = 17;
    pub const PINKY_PIP:  u8 = 18;
    pub const PINKY_DIP:  u8 = 19;
    pub const PINKY_TIP:  u8 = 20;
}

/// Bone segments of the hand skeleton, used for drawing.
pub const HAND_CONNECTIONS: [(u8, u8); 21] = [
    (0, 1),  (1, 2),   (2, 3),   (3, 4),
    (0, 5),  (5, 6),   (6, 7),   (7, 8),
    (5, 9),  (9, 10),  (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum LandmarkError {
    #[error("unknown handedness label {0:?}")]
    Handedness(String),

    #[error("hand carries {0} landmarks, at most 21 expected")]
    TooManyLandmarks(usize),

    #[error("malformed frame record: {0}")]
    Json(#[from] serde_json::Error),

    /// The detector itself flagged this frame (camera read failure etc).
    #[error("detector reported: {0}")]
    Detector(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn all() -> [Handedness; 2] { [Handedness::Left, Handedness::Right] }

    pub fn name(self) -> &'static str {
        match self {
            Handedness::Left  => "Left",
            Handedness::Right => "Right",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Handedness {
    type Err = LandmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left"  | "l" => Ok(Handedness::Left),
            "right" | "r" => Ok(Handedness::Right),
            _ => Err(LandmarkError::Handedness(s.to_string())),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark / Hand
// ════════════════════════════════════════════════════════════════════════════

/// One skeletal point, normalised to the frame (0.0–1.0, y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub index: u8,
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist; carried through but never consumed.
    pub z: f32,
}

impl Landmark {
    pub fn new(index: u8, x: f32, y: f32) -> Self {
        Landmark { index, x, y, z: 0.0 }
    }
}

/// A detected hand: up to [`LANDMARK_COUNT`] landmarks plus its handedness.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    pub handedness: Handedness,
    /// Detector confidence; 1.0 when the source does not report one.
    pub score: f32,
    landmarks: Vec<Landmark>,
}

impl Hand {
    pub fn new(handedness: Handedness, landmarks: Vec<Landmark>) -> Self {
        Hand { handedness, score: 1.0, landmarks }
    }

    /// Build a hand from positional points; point `i` becomes landmark `i`.
    pub fn from_points(handedness: Handedness, points: &[(f32, f32)]) -> Result<Self, LandmarkError> {
        if points.len() > LANDMARK_COUNT {
            return Err(LandmarkError::TooManyLandmarks(points.len()));
        }
        let landmarks = points.iter().enumerate()
            .map(|(i, &(x, y))| Landmark::new(i as u8, x, y))
            .collect();
        Ok(Hand::new(handedness, landmarks))
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Look up a landmark by skeletal index.
    pub fn get(&self, idx: u8) -> Option<&Landmark> {
        // Detectors normally emit the points in index order.
        match self.landmarks.get(idx as usize) {
            Some(lm) if lm.index == idx => Some(lm),
            _ => self.landmarks.iter().find(|lm| lm.index == idx),
        }
    }

    pub fn landmarks(&self) -> &[Landmark] { &self.landmarks }

    pub fn is_complete(&self) -> bool {
        (0..LANDMARK_COUNT as u8).all(|i| self.get(i).is_some())
    }

    /// Drop a landmark (used to model partial detections).
    pub fn remove(&mut self, idx: u8) {
        self.landmarks.retain(|lm| lm.index != idx);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// Everything the detector reported for one video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub width:  u32,
    pub height: u32,
    pub hands:  Vec<Hand>,
}

impl Frame {
    pub fn new(width: u32, height: u32, hands: Vec<Hand>) -> Self {
        Frame { width, height, hands }
    }

    pub fn empty(width: u32, height: u32) -> Self {
        Frame::new(width, height, Vec::new())
    }

    /// The hand with the given handedness.  With two detections of the same
    /// side the later one wins.
    pub fn hand(&self, side: Handedness) -> Option<&Hand> {
        self.hands.iter().rev().find(|h| h.handedness == side)
    }

    /// Sides detected more than once in this frame.
    pub fn duplicated_sides(&self) -> Vec<Handedness> {
        Handedness::all().into_iter()
            .filter(|&s| self.hands.iter().filter(|h| h.handedness == s).count() > 1)
            .collect()
    }

    /// Encode as one JSON line in the detector wire format.
    pub fn to_json_line(&self) -> String {
        let record = FrameRecord {
            width:  Some(self.width),
            height: Some(self.height),
            hands:  self.hands.iter().map(HandRecord::from_hand).collect(),
            error:  None,
        };
        // Plain structs of numbers and strings always serialise.
        serde_json::to_string(&record).unwrap_or_default()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// JSON-lines wire format
// ════════════════════════════════════════════════════════════════════════════

#[derive(Serialize, Deserialize, Debug)]
struct PointRecord {
    x: f32,
    y: f32,
    #[serde(default)]
    z: f32,
}

#[derive(Serialize, Deserialize, Debug)]
struct HandRecord {
    handedness: String,
    #[serde(default = "full_score")]
    score: f32,
    landmarks: Vec<PointRecord>,
}

#[derive(Serialize, Deserialize, Debug)]
struct FrameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(default)]
    hands: Vec<HandRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn full_score() -> f32 { 1.0 }

impl HandRecord {
    fn from_hand(hand: &Hand) -> Self {
        let mut points: Vec<&Landmark> = hand.landmarks.iter().collect();
        points.sort_by_key(|lm| lm.index);
        HandRecord {
            handedness: hand.handedness.name().to_string(),
            score:      hand.score,
            landmarks:  points.into_iter()
                .map(|lm| PointRecord { x: lm.x, y: lm.y, z: lm.z })
                .collect(),
        }
    }

    fn into_hand(self) -> Result<Hand, LandmarkError> {
        let handedness: Handedness = self.handedness.parse()?;
        if self.landmarks.len() > LANDMARK_COUNT {
            return Err(LandmarkError::TooManyLandmarks(self.landmarks.len()));
        }
        let landmarks = self.landmarks.into_iter().enumerate()
            .map(|(i, p)| Landmark { index: i as u8, x: p.x, y: p.y, z: p.z })
            .collect();
        Ok(Hand::new(handedness, landmarks).with_score(self.score))
    }
}

/// Decode one JSON line into a [`Frame`].
///
/// `default_size` fills in width/height when the record omits them.  A record
/// whose `error` field is set decodes to [`LandmarkError::Detector`].
pub fn decode_frame(line: &str, default_size: (u32, u32)) -> Result<Frame, LandmarkError> {
    let record: FrameRecord = serde_json::from_str(line.trim())?;
    if let Some(msg) = record.error {
        return Err(LandmarkError::Detector(msg));
    }
    let hands = record.hands.into_iter()
        .map(HandRecord::into_hand)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Frame::new(
        record.width.unwrap_or(default_size.0),
        record.height.unwrap_or(default_size.1),
        hands,
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
