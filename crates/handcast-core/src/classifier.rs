//! Finger bend classification
//!
//! Each finger is judged from the planar distance between two world
//! landmarks (fingertip to knuckle, see [`Finger::bend_pair`]), scaled by
//! 100 to roughly centimeters. A finger is bent when that distance is
//! strictly below the threshold configured for its hand side.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::distance;
use crate::hand::{Finger, HandSide};
use crate::landmark::{Landmark, LANDMARK_COUNT};

/// Scale applied to world-space distances before thresholding
pub const DISTANCE_SCALE: f32 = 100.0;

#[derive(Error, Debug, PartialEq)]
pub enum ThresholdError {
    #[error("Invalid {side} {finger} threshold: {value} (must be finite and positive)")]
    Invalid {
        side: HandSide,
        finger: Finger,
        value: f32,
    },
}

/// Bend thresholds for the five fingers of one hand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub thumb: f32,
    pub index: f32,
    pub middle: f32,
    pub ring: f32,
    pub pinky: f32,
}

impl Thresholds {
    pub fn get(&self, finger: Finger) -> f32 {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    /// Calibrated defaults for the right hand
    pub fn right_default() -> Self {
        Self {
            thumb: 3.2,
            index: 4.8,
            middle: 5.5,
            ring: 5.0,
            pinky: 3.7,
        }
    }

    /// Calibrated defaults for the left hand.
    ///
    /// These differ sharply from the right hand; they are kept as shipped
    /// until the calibration is reviewed.
    pub fn left_default() -> Self {
        Self {
            thumb: 3.2,
            index: 1.2,
            middle: 2.0,
            ring: 1.5,
            pinky: 1.2,
        }
    }
}

/// Thresholds for both hands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    #[serde(default = "Thresholds::left_default")]
    pub left: Thresholds,
    #[serde(default = "Thresholds::right_default")]
    pub right: Thresholds,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            left: Thresholds::left_default(),
            right: Thresholds::right_default(),
        }
    }
}

impl ThresholdTable {
    pub fn for_side(&self, side: HandSide) -> &Thresholds {
        match side {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }

    /// Reject thresholds that could never classify sensibly
    pub fn validate(&self) -> Result<(), ThresholdError> {
        for side in HandSide::ALL {
            let thresholds = self.for_side(side);
            for finger in Finger::ALL {
                let value = thresholds.get(finger);
                if !value.is_finite() || value <= 0.0 {
                    return Err(ThresholdError::Invalid { side, finger, value });
                }
            }
        }
        Ok(())
    }
}

/// Bent flags for one hand, indexed by [`Finger::index`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerStates(pub [bool; 5]);

impl FingerStates {
    pub fn is_bent(&self, finger: Finger) -> bool {
        self.0[finger.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Finger, bool)> + '_ {
        Finger::ALL.into_iter().map(move |f| (f, self.0[f.index()]))
    }
}

/// Strict comparison: a distance equal to the threshold is not bent
pub fn is_bent(distance: f32, threshold: f32) -> bool {
    distance < threshold
}

/// Classifies finger bend state from world landmarks
#[derive(Debug, Clone, Default)]
pub struct FingerClassifier {
    thresholds: ThresholdTable,
}

impl FingerClassifier {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Scaled openness distance for every finger.
    ///
    /// Callers must pass at least [`LANDMARK_COUNT`] world landmarks.
    pub fn finger_distances(world: &[Landmark]) -> [f32; 5] {
        debug_assert!(world.len() >= LANDMARK_COUNT);
        Finger::ALL.map(|finger| {
            let (a, b) = finger.bend_pair();
            distance(&world[a], &world[b]) * DISTANCE_SCALE
        })
    }

    /// Classify all five fingers of one hand
    pub fn classify(&self, side: HandSide, world: &[Landmark]) -> FingerStates {
        let thresholds = self.thresholds.for_side(side);
        let distances = Self::finger_distances(world);
        FingerStates(Finger::ALL.map(|finger| is_bent(distances[finger.index()], thresholds.get(finger))))
    }
}
