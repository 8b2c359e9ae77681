//! Edge-triggered bend state tracking
//!
//! The tracker holds one [`BendState`] cell per (hand, finger), ten in total,
//! all starting as [`BendState::Extended`]. A new classification that
//! matches the stored cell is a no-op; one that differs updates the cell and
//! yields exactly one [`Message::Transition`].
//!
//! Clients only learn about future transitions. Nothing here replays the
//! current table to a late joiner; the transport decides whether to send
//! [`BendTable::messages`] on connect.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::FingerStates;
use crate::hand::{Finger, HandSide};
use crate::message::{BendState, Message};

/// Current bend state of all ten fingers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BendTable {
    pub left: [BendState; 5],
    pub right: [BendState; 5],
}

impl BendTable {
    pub fn get(&self, side: HandSide, finger: Finger) -> BendState {
        self.row(side)[finger.index()]
    }

    fn row(&self, side: HandSide) -> &[BendState; 5] {
        match side {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }

    fn row_mut(&mut self, side: HandSide) -> &mut [BendState; 5] {
        match side {
            HandSide::Left => &mut self.left,
            HandSide::Right => &mut self.right,
        }
    }

    /// One transition message per cell describing its current state
    pub fn messages(&self) -> Vec<Message> {
        HandSide::ALL
            .into_iter()
            .flat_map(|hand| {
                Finger::ALL.into_iter().map(move |finger| (hand, finger))
            })
            .map(|(hand, finger)| Message::Transition {
                hand,
                finger,
                state: self.get(hand, finger),
            })
            .collect()
    }
}

/// Session-scoped edge tracker.
///
/// Owned by a single frame consumer; concurrent callers must serialize
/// access so no two frames interleave a read-then-write on the same cell.
#[derive(Debug, Clone, Default)]
pub struct EdgeTracker {
    table: BendTable,
}

impl EdgeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current cells
    pub fn table(&self) -> BendTable {
        self.table
    }

    /// Feed one classification; returns the transition if the cell changed
    pub fn update(&mut self, hand: HandSide, finger: Finger, bent: bool) -> Option<Message> {
        let state = BendState::from_bent(bent);
        let cell = &mut self.table.row_mut(hand)[finger.index()];
        if *cell == state {
            return None;
        }

        *cell = state;
        debug!(hand = %hand, finger = %finger, state = ?state, "Finger state changed");
        Some(Message::Transition { hand, finger, state })
    }

    /// Feed a whole hand, returning transitions in finger order
    pub fn apply(&mut self, hand: HandSide, states: &FingerStates) -> Vec<Message> {
        states
            .iter()
            .filter_map(|(finger, bent)| self.update(hand, finger, bent))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_extended() {
        let tracker = EdgeTracker::new();
        for hand in HandSide::ALL {
            for finger in Finger::ALL {
                assert_eq!(tracker.table().get(hand, finger), BendState::Extended);
            }
        }
    }

    #[test]
    fn test_repeated_state_emits_once() {
        let mut tracker = EdgeTracker::new();

        let first = tracker.update(HandSide::Right, Finger::Index, true);
        assert_eq!(
            first,
            Some(Message::Transition {
                hand: HandSide::Right,
                finger: Finger::Index,
                state: BendState::Bent,
            })
        );

        for _ in 0..10 {
            assert!(tracker.update(HandSide::Right, Finger::Index, true).is_none());
        }

        let back = tracker.update(HandSide::Right, Finger::Index, false);
        assert_eq!(
            back,
            Some(Message::Transition {
                hand: HandSide::Right,
                finger: Finger::Index,
                state: BendState::Extended,
            })
        );
    }

    #[test]
    fn test_extended_from_start_is_silent() {
        let mut tracker = EdgeTracker::new();
        assert!(tracker.update(HandSide::Left, Finger::Thumb, false).is_none());
        assert_eq!(tracker.table(), BendTable::default());
    }

    #[test]
    fn test_cells_are_independent() {
        let mut tracker = EdgeTracker::new();
        tracker.update(HandSide::Left, Finger::Ring, true);

        assert_eq!(tracker.table().get(HandSide::Left, Finger::Ring), BendState::Bent);
        assert_eq!(tracker.table().get(HandSide::Right, Finger::Ring), BendState::Extended);
        assert_eq!(tracker.table().get(HandSide::Left, Finger::Pinky), BendState::Extended);
    }

    #[test]
    fn test_apply_whole_hand() {
        let mut tracker = EdgeTracker::new();

        let messages = tracker.apply(HandSide::Left, &FingerStates([true, false, true, false, false]));
        let fingers: Vec<Finger> = messages
            .iter()
            .map(|m| match m {
                Message::Transition { finger, .. } => *finger,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(fingers, vec![Finger::Thumb, Finger::Middle]);

        let again = tracker.apply(HandSide::Left, &FingerStates([true, false, true, false, false]));
        assert!(again.is_empty());
    }

    #[test]
    fn test_table_messages() {
        let mut tracker = EdgeTracker::new();
        tracker.update(HandSide::Right, Finger::Pinky, true);

        let messages = tracker.table().messages();
        assert_eq!(messages.len(), 10);
        assert_eq!(
            messages[9],
            Message::Transition {
                hand: HandSide::Right,
                finger: Finger::Pinky,
                state: BendState::Bent,
            }
        );
        assert_eq!(messages[0].hand(), HandSide::Left);
    }
}
