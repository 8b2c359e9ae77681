//! Landmark and frame types delivered by the hand landmark model

use serde::{Deserialize, Serialize};

use crate::hand::Handedness;

/// Number of points in the hand skeleton
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices of the 21-point hand skeleton used for bend and
/// fingertip tracking. Each finger runs knuckle (MCP) to tip in four
/// consecutive points; the wrist is 0.
pub mod index {
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_TIP: usize = 20;
}

/// A single landmark.
///
/// Image-space landmarks are normalized to the frame (0.0 to 1.0); world
/// landmarks are in meters relative to the hand's geometric center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One detected hand in a frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandObservation {
    /// Handedness label as reported by the model (not yet mirrored)
    pub handedness: Handedness,
    /// Image-space landmarks
    pub landmarks: Vec<Landmark>,
    /// Metric world landmarks
    pub world_landmarks: Vec<Landmark>,
}

impl HandObservation {
    pub fn new(handedness: Handedness, landmarks: Vec<Landmark>, world_landmarks: Vec<Landmark>) -> Self {
        Self {
            handedness,
            landmarks,
            world_landmarks,
        }
    }

    /// Whether both landmark sequences carry the full skeleton
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= LANDMARK_COUNT && self.world_landmarks.len() >= LANDMARK_COUNT
    }
}

/// Everything the model reported for one camera frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameResult {
    /// Detected hands, in model order
    #[serde(default)]
    pub hands: Vec<HandObservation>,
    /// Inference timestamp in milliseconds
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl FrameResult {
    pub fn new(hands: Vec<HandObservation>, timestamp_ms: i64) -> Self {
        Self { hands, timestamp_ms }
    }

    /// Parse a frame from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
