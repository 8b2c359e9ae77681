//! Frame pipeline task
//!
//! Producers hand frames to a bounded channel without ever waiting; a single
//! consumer task owns the [`FrameDispatcher`], so the ten bend state cells
//! have exactly one writer. Each frame is broadcast and published under the
//! [`FrameGate`], so a reader holding the gate never sees a view that
//! disagrees with the stream.

use handcast_core::{BendTable, Broadcaster, FrameDispatcher, FrameResult, HandSide, MotionSummary};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Frame and message counters
#[derive(Debug, Default)]
pub struct PipelineStats {
    frames_processed: AtomicU64,
    frames_dropped: AtomicU64,
    hands_skipped: AtomicU64,
}

impl PipelineStats {
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped.load(Ordering::Relaxed)
    }

    pub fn hands_skipped(&self) -> u64 {
        self.hands_skipped.load(Ordering::Relaxed)
    }
}

/// Latest state published by the pipeline after each frame
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineView {
    pub fingers: BendTable,
    pub left_motion: MotionSummary,
    pub right_motion: MotionSummary,
}

impl PipelineView {
    fn from_dispatcher(dispatcher: &FrameDispatcher) -> Self {
        Self {
            fingers: dispatcher.table(),
            left_motion: dispatcher.motion(HandSide::Left).summary(),
            right_motion: dispatcher.motion(HandSide::Right).summary(),
        }
    }
}

/// Lock held while a frame is processed and its view published
#[derive(Debug, Clone, Default)]
pub struct FrameGate(Arc<Mutex<()>>);

impl FrameGate {
    /// Run `f` with no frame in flight
    pub fn hold<T>(&self, f: impl FnOnce() -> T) -> T {
        let _guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

/// Why a frame was not queued
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Frame queue full")]
    Full,
    #[error("Frame pipeline stopped")]
    Closed,
}

/// Producer side of the pipeline
#[derive(Clone)]
pub struct FrameSender {
    tx: mpsc::Sender<FrameResult>,
    stats: Arc<PipelineStats>,
}

impl FrameSender {
    /// Queue a frame without waiting
    pub fn submit(&self, frame: FrameResult) -> Result<(), SubmitError> {
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(frame)) => {
                self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                warn!(timestamp_ms = frame.timestamp_ms, "Frame queue full, dropping frame");
                Err(SubmitError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                Err(SubmitError::Closed)
            }
        }
    }

    /// Whether the consumer task has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Queue a frame, waiting for room. Only for producers that may block,
    /// such as file replay.
    pub async fn send(&self, frame: FrameResult) -> Result<(), SubmitError> {
        self.tx.send(frame).await.map_err(|_| SubmitError::Closed)
    }
}

/// Handles to a running pipeline
pub struct Pipeline {
    pub frames: FrameSender,
    pub view: watch::Receiver<PipelineView>,
    pub stats: Arc<PipelineStats>,
    pub gate: FrameGate,
    pub task: JoinHandle<()>,
}

/// Start the consumer task
pub fn spawn<B>(dispatcher: FrameDispatcher, sink: Arc<B>, queue: usize) -> Pipeline
where
    B: Broadcaster + 'static,
{
    let (tx, mut rx) = mpsc::channel::<FrameResult>(queue);
    let (view_tx, view_rx) = watch::channel(PipelineView::from_dispatcher(&dispatcher));
    let stats = Arc::new(PipelineStats::default());
    let gate = FrameGate::default();

    let task_stats = stats.clone();
    let task_gate = gate.clone();
    let task = tokio::spawn(async move {
        let mut dispatcher = dispatcher;
        while let Some(frame) = rx.recv().await {
            let outcome = task_gate.hold(|| {
                let outcome = dispatcher.process(&frame, sink.as_ref());
                let _ = view_tx.send(PipelineView::from_dispatcher(&dispatcher));
                outcome
            });

            task_stats.frames_processed.fetch_add(1, Ordering::Relaxed);
            task_stats
                .hands_skipped
                .fetch_add(outcome.hands_skipped as u64, Ordering::Relaxed);

            if outcome.transitions > 0 {
                debug!(
                    transitions = outcome.transitions,
                    messages = outcome.messages(),
                    timestamp_ms = frame.timestamp_ms,
                    "Frame produced transitions"
                );
            }
        }
        info!("Frame pipeline stopped");
    });

    Pipeline {
        frames: FrameSender {
            tx,
            stats: stats.clone(),
        },
        view: view_rx,
        stats,
        gate,
        task,
    }
}
