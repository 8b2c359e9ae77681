//! Handcast Core - Gesture state derivation for streamed hand landmarks
//!
//! This crate turns per-frame hand landmark estimates into a compact stream of
//! broadcast messages:
//! - Landmark and frame types produced by the inference collaborator
//! - Planar geometry helpers over landmarks
//! - Per-finger bend classification against per-hand thresholds
//! - Edge tracking so each bend state change is emitted exactly once
//! - Frame dispatch (handedness resolution, guards, raw fingertip stream)
//! - Wire messages and the broadcast transport contract

pub mod classifier;
pub mod dispatcher;
pub mod geometry;
pub mod hand;
pub mod landmark;
pub mod message;
pub mod motion;
pub mod tracker;
pub mod transport;

pub use classifier::{FingerClassifier, FingerStates, ThresholdError, ThresholdTable, Thresholds};
pub use dispatcher::{DispatchConfig, FrameDispatcher, FrameError, FrameOutcome};
pub use hand::{Finger, HandSide, Handedness};
pub use landmark::{FrameResult, HandObservation, Landmark, LANDMARK_COUNT};
pub use message::{BendState, Message, WireError, WireFormat};
pub use motion::{MotionSummary, PositionHistory};
pub use tracker::{BendTable, EdgeTracker};
pub use transport::{Broadcaster, NullBroadcaster};
