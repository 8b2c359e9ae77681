//! Application state management

use anyhow::Result;
use chrono::{DateTime, Utc};
use handcast_core::FrameDispatcher;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::info;

use crate::broadcast::WsBroadcaster;
use crate::config::Config;
use crate::pipeline::{self, FrameGate, FrameSender, PipelineStats, PipelineView};

/// Shared application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// WebSocket fan-out for pipeline messages
    pub broadcaster: Arc<WsBroadcaster>,
    /// Producer side of the frame pipeline
    pub frames: FrameSender,
    /// Latest bend table and motion figures
    pub view: watch::Receiver<PipelineView>,
    /// Pipeline counters
    pub stats: Arc<PipelineStats>,
    /// Held by the pipeline for the length of each frame
    pub gate: FrameGate,
    /// When the daemon started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state and start the frame pipeline.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: Config) -> Result<Arc<Self>> {
        config.validate()?;

        let broadcaster = Arc::new(WsBroadcaster::new(
            config.server.wire_format,
            config.server.broadcast_buffer,
        ));
        let dispatcher = FrameDispatcher::new(config.classifier(), config.dispatch_config());
        let pipeline = pipeline::spawn(dispatcher, broadcaster.clone(), config.server.frame_queue);

        info!(
            wire_format = ?config.server.wire_format,
            max_hands = config.dispatch_config().max_hands,
            "Frame pipeline started"
        );

        Ok(Arc::new(Self {
            config,
            broadcaster,
            frames: pipeline.frames,
            view: pipeline.view,
            stats: pipeline.stats,
            gate: pipeline.gate,
            started_at: Utc::now(),
        }))
    }

    /// Current pipeline view
    pub fn view(&self) -> PipelineView {
        self.view.borrow().clone()
    }

    /// Subscribe a new client to the broadcast stream.
    ///
    /// With `snapshot_on_connect` set, also returns the current state of all
    /// ten fingers. Both are taken between frames, so the snapshot plus the
    /// stream that follows never skip or repeat a transition.
    pub fn connect_client(&self) -> (broadcast::Receiver<String>, Vec<String>) {
        self.gate.hold(|| {
            let messages = self.broadcaster.subscribe();
            let snapshot = if self.config.server.snapshot_on_connect {
                self.current_state_messages()
            } else {
                Vec::new()
            };
            (messages, snapshot)
        })
    }

    /// Encoded messages describing every finger's current state
    pub fn current_state_messages(&self) -> Vec<String> {
        self.view()
            .fingers
            .messages()
            .iter()
            .filter_map(|msg| self.broadcaster.encode(msg))
            .collect()
    }
}
