//! Hand side and finger identities

use serde::{Deserialize, Serialize};

use crate::landmark::index;

/// Handedness label as reported by the landmark model.
///
/// The model labels hands as seen in the mirrored selfie image, so the label
/// is the opposite of the user's anatomical hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Resolve the user's anatomical hand from the reported label
    pub fn anatomical_side(self) -> HandSide {
        match self {
            Handedness::Right => HandSide::Left,
            Handedness::Left => HandSide::Right,
        }
    }
}

/// The user's anatomical hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub const ALL: [HandSide; 2] = [HandSide::Left, HandSide::Right];

    /// Wire code: 0 = left, 1 = right
    pub fn code(self) -> u8 {
        match self {
            HandSide::Left => 0,
            HandSide::Right => 1,
        }
    }

    pub(crate) fn slot(self) -> usize {
        self.code() as usize
    }
}

impl std::fmt::Display for HandSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandSide::Left => write!(f, "left"),
            HandSide::Right => write!(f, "right"),
        }
    }
}

/// Finger identity, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Wire index (0 = thumb .. 4 = pinky)
    pub fn index(self) -> usize {
        self as usize
    }

    /// World landmark pair whose distance measures how open this finger is
    pub fn bend_pair(self) -> (usize, usize) {
        match self {
            Finger::Thumb => (index::THUMB_TIP, index::MIDDLE_MCP),
            Finger::Index => (index::INDEX_TIP, index::INDEX_MCP),
            Finger::Middle => (index::MIDDLE_TIP, index::MIDDLE_MCP),
            Finger::Ring => (index::RING_TIP, index::RING_MCP),
            Finger::Pinky => (index::PINKY_TIP, index::PINKY_MCP),
        }
    }

    /// Image-space landmark streamed for this finger every frame
    pub fn tip(self) -> usize {
        match self {
            Finger::Thumb => index::THUMB_TIP,
            Finger::Index => index::INDEX_TIP,
            Finger::Middle => index::MIDDLE_TIP,
            Finger::Ring => index::RING_TIP,
            Finger::Pinky => index::PINKY_TIP,
        }
    }
}

impl std::fmt::Display for Finger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handedness_is_mirrored() {
        assert_eq!(Handedness::Right.anatomical_side(), HandSide::Left);
        assert_eq!(Handedness::Left.anatomical_side(), HandSide::Right);
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(HandSide::Left.code(), 0);
        assert_eq!(HandSide::Right.code(), 1);
        let indices: Vec<usize> = Finger::ALL.iter().map(|f| f.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_bend_pairs() {
        assert_eq!(Finger::Thumb.bend_pair(), (4, 9));
        assert_eq!(Finger::Index.bend_pair(), (8, 5));
        assert_eq!(Finger::Middle.bend_pair(), (12, 9));
        assert_eq!(Finger::Ring.bend_pair(), (16, 13));
        assert_eq!(Finger::Pinky.bend_pair(), (20, 17));
    }

    #[test]
    fn test_tips() {
        let tips: Vec<usize> = Finger::ALL.iter().map(|f| f.tip()).collect();
        assert_eq!(tips, vec![4, 8, 12, 16, 20]);
    }
}
