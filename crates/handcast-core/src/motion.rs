//! Short fingertip position history
//!
//! Keeps the last few vertical fingertip positions per finger so listeners
//! can ask whether a finger is moving and whether it moves alone. A value of
//! exactly 0.0 marks an empty slot.

use serde::Serialize;

use crate::hand::Finger;

/// Samples kept per finger
pub const HISTORY_LEN: usize = 5;

/// How far another finger may sit above this one and still count as isolated
const ISOLATION_MARGIN: f32 = 0.05;

/// Rolling per-finger position history for one hand
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionHistory {
    samples: [[f32; HISTORY_LEN]; 5],
}

impl PositionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value into the first empty slot, shifting out the oldest
    /// sample when the row is full
    pub fn push(&mut self, finger: Finger, value: f32) {
        let row = &mut self.samples[finger.index()];
        match row.iter().position(|&v| v == 0.0) {
            Some(slot) => row[slot] = value,
            None => {
                row.rotate_left(1);
                row[HISTORY_LEN - 1] = value;
            }
        }
    }

    /// Record one value per finger, thumb through pinky
    pub fn push_all(&mut self, values: &[f32; 5]) {
        for finger in Finger::ALL {
            self.push(finger, values[finger.index()]);
        }
    }

    pub fn samples(&self, finger: Finger) -> &[f32; HISTORY_LEN] {
        &self.samples[finger.index()]
    }

    /// Sum of successive differences across the whole row
    pub fn total_change(&self, finger: Finger) -> f32 {
        self.samples[finger.index()]
            .windows(2)
            .map(|w| w[1] - w[0])
            .sum()
    }

    /// True unless some other finger's latest sample sits more than the
    /// margin above this finger's latest sample
    pub fn is_isolated(&self, finger: Finger) -> bool {
        let latest = self.samples[finger.index()][HISTORY_LEN - 1];
        Finger::ALL
            .into_iter()
            .filter(|&other| other != finger)
            .all(|other| latest - self.samples[other.index()][HISTORY_LEN - 1] >= -ISOLATION_MARGIN)
    }

    pub fn summary(&self) -> MotionSummary {
        MotionSummary {
            total_change: Finger::ALL.map(|f| self.total_change(f)),
            isolated: Finger::ALL.map(|f| self.is_isolated(f)),
        }
    }
}

/// Serializable per-finger motion figures for one hand
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MotionSummary {
    pub total_change: [f32; 5],
    pub isolated: [bool; 5],
}
