//! Broadcast messages and their wire encodings
//!
//! Two message kinds leave the core: an edge-triggered [`Message::Transition`]
//! when a finger changes bend state, and a per-frame [`Message::Snapshot`]
//! of fingertip image coordinates.
//!
//! The legacy text encoding is the token-delimited format existing
//! listeners parse:
//!
//! ```text
//! 1! <hand>? <finger>? <state>
//! 0! <hand>? [x0, x1, x2, x3, x4] ? [y0, y1, y2, y3, y4]
//! ```
//!
//! with hand 0 = left / 1 = right, finger 0..4 = thumb..pinky and
//! state 0 = bent / 1 = extended.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hand::{Finger, HandSide};

const TRANSITION_MARKER: &str = "1!";
const SNAPSHOT_MARKER: &str = "0!";

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Bend state of a single finger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BendState {
    #[default]
    Extended,
    Bent,
}

impl BendState {
    pub fn from_bent(bent: bool) -> Self {
        if bent {
            BendState::Bent
        } else {
            BendState::Extended
        }
    }

    pub fn is_bent(self) -> bool {
        self == BendState::Bent
    }

    /// Wire code: 0 = bent, 1 = extended
    pub fn code(self) -> u8 {
        match self {
            BendState::Bent => 0,
            BendState::Extended => 1,
        }
    }
}

/// A message handed to the broadcast transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A finger crossed its bend threshold
    Transition {
        hand: HandSide,
        finger: Finger,
        state: BendState,
    },
    /// Fingertip image coordinates, thumb through pinky
    Snapshot {
        hand: HandSide,
        xs: [f32; 5],
        ys: [f32; 5],
    },
}

/// Wire encoding used on the broadcast socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Token-delimited text understood by existing listeners
    #[default]
    Legacy,
    /// Tagged JSON objects
    Json,
}

impl Message {
    pub fn hand(&self) -> HandSide {
        match self {
            Message::Transition { hand, .. } | Message::Snapshot { hand, .. } => *hand,
        }
    }

    pub fn is_transition(&self) -> bool {
        matches!(self, Message::Transition { .. })
    }

    /// Encode for the wire
    pub fn encode(&self, format: WireFormat) -> Result<String, WireError> {
        match format {
            WireFormat::Legacy => Ok(self.to_legacy()),
            WireFormat::Json => Ok(serde_json::to_string(self)?),
        }
    }

    fn to_legacy(&self) -> String {
        match self {
            Message::Transition { hand, finger, state } => format!(
                "{} {}? {}? {}",
                TRANSITION_MARKER,
                hand.code(),
                finger.index(),
                state.code()
            ),
            Message::Snapshot { hand, xs, ys } => format!(
                "{} {}? {} ? {}",
                SNAPSHOT_MARKER,
                hand.code(),
                legacy_list(xs),
                legacy_list(ys)
            ),
        }
    }
}

fn legacy_list(values: &[f32; 5]) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}
