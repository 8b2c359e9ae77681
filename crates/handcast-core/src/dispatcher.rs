//! Frame dispatch
//!
//! Routes each [`FrameResult`] through the classifier and edge tracker and
//! hands the resulting messages to a [`Broadcaster`]:
//!
//! 1. Only the first `max_hands` observations (at most two) are looked at.
//! 2. The model's handedness label is mirrored to the user's anatomical hand.
//! 3. Observations missing landmarks are skipped without touching state.
//! 4. Bend transitions are broadcast as they occur, then the fingertip
//!    snapshot for that hand is broadcast whether or not anything changed.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::classifier::FingerClassifier;
use crate::hand::{Finger, HandSide};
use crate::landmark::{FrameResult, HandObservation, Landmark};
use crate::message::Message;
use crate::motion::PositionHistory;
use crate::tracker::{BendTable, EdgeTracker};
use crate::transport::Broadcaster;

/// Hard cap on observations considered per frame
pub const MAX_TRACKED_HANDS: usize = 2;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("Insufficient landmarks: {image} image / {world} world (need 21)")]
    InsufficientLandmarks { image: usize, world: usize },
}

/// Dispatcher settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Observations processed per frame (clamped to two)
    pub max_hands: usize,
    /// Broadcast fingertip snapshots every frame
    pub stream_positions: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_hands: MAX_TRACKED_HANDS,
            stream_positions: true,
        }
    }
}

/// What happened to one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Observations classified
    pub hands_processed: usize,
    /// Observations dropped for missing landmarks
    pub hands_skipped: usize,
    /// Observations beyond the hand cap
    pub hands_ignored: usize,
    /// Transition messages emitted
    pub transitions: usize,
    /// Snapshot messages emitted
    pub snapshots: usize,
}

impl FrameOutcome {
    pub fn messages(&self) -> usize {
        self.transitions + self.snapshots
    }
}

/// Per-session frame pipeline; owns the ten bend state cells
#[derive(Debug, Clone)]
pub struct FrameDispatcher {
    classifier: FingerClassifier,
    tracker: EdgeTracker,
    motion: [PositionHistory; 2],
    config: DispatchConfig,
}

impl Default for FrameDispatcher {
    fn default() -> Self {
        Self::new(FingerClassifier::default(), DispatchConfig::default())
    }
}

impl FrameDispatcher {
    pub fn new(classifier: FingerClassifier, config: DispatchConfig) -> Self {
        Self {
            classifier,
            tracker: EdgeTracker::new(),
            motion: Default::default(),
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn classifier(&self) -> &FingerClassifier {
        &self.classifier
    }

    /// Current bend state of all ten fingers
    pub fn table(&self) -> BendTable {
        self.tracker.table()
    }

    /// Fingertip history for one hand
    pub fn motion(&self, side: HandSide) -> &PositionHistory {
        &self.motion[side.slot()]
    }

    /// Process one frame, broadcasting every message it produces
    pub fn process<B: Broadcaster + ?Sized>(&mut self, frame: &FrameResult, sink: &B) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        let limit = self.config.max_hands.min(MAX_TRACKED_HANDS);

        for (position, observation) in frame.hands.iter().enumerate() {
            if position >= limit {
                outcome.hands_ignored += 1;
                continue;
            }

            match self.process_hand(observation, sink, &mut outcome) {
                Ok(side) => {
                    outcome.hands_processed += 1;
                    trace!(hand = %side, timestamp_ms = frame.timestamp_ms, "Processed hand");
                }
                Err(e) => {
                    outcome.hands_skipped += 1;
                    debug!(position, error = %e, "Skipping hand observation");
                }
            }
        }

        outcome
    }

    fn process_hand<B: Broadcaster + ?Sized>(
        &mut self,
        observation: &HandObservation,
        sink: &B,
        outcome: &mut FrameOutcome,
    ) -> Result<HandSide, FrameError> {
        if !observation.is_complete() {
            return Err(FrameError::InsufficientLandmarks {
                image: observation.landmarks.len(),
                world: observation.world_landmarks.len(),
            });
        }

        let side = observation.handedness.anatomical_side();
        let states = self.classifier.classify(side, &observation.world_landmarks);
        for message in self.tracker.apply(side, &states) {
            sink.broadcast(&message);
            outcome.transitions += 1;
        }

        let (xs, ys) = fingertips(&observation.landmarks);
        self.motion[side.slot()].push_all(&ys);

        if self.config.stream_positions {
            sink.broadcast(&Message::Snapshot { hand: side, xs, ys });
            outcome.snapshots += 1;
        }

        Ok(side)
    }
}

/// Image-space fingertip coordinates, thumb through pinky
fn fingertips(landmarks: &[Landmark]) -> ([f32; 5], [f32; 5]) {
    let xs = Finger::ALL.map(|f| landmarks[f.tip()].x);
    let ys = Finger::ALL.map(|f| landmarks[f.tip()].y);
    (xs, ys)
}
