//! WebSocket fan-out for core messages

use handcast_core::{Broadcaster, Message, WireFormat};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Broadcast transport backed by a tokio broadcast channel.
///
/// Every connected client holds its own receiver, so each client sees
/// messages in emission order. Sending with no receivers is a silent no-op.
pub struct WsBroadcaster {
    tx: broadcast::Sender<String>,
    format: WireFormat,
    ready: AtomicBool,
    clients: AtomicUsize,
    emitted: AtomicU64,
}

impl WsBroadcaster {
    pub fn new(format: WireFormat, buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self {
            tx,
            format,
            ready: AtomicBool::new(false),
            clients: AtomicUsize::new(0),
            emitted: AtomicU64::new(0),
        }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Receiver for a newly connected client
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Encode a message for the wire, logging failures
    pub fn encode(&self, message: &Message) -> Option<String> {
        match message.encode(self.format) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Failed to encode message");
                None
            }
        }
    }

    /// Record that a client announced readiness
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Relaxed);
    }

    pub fn client_connected(&self) -> usize {
        self.clients.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn client_disconnected(&self) -> usize {
        self.clients.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }

    pub fn clients(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }

    /// Messages encoded and handed to the transport so far
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }
}

impl Broadcaster for WsBroadcaster {
    fn broadcast(&self, message: &Message) {
        let Some(text) = self.encode(message) else {
            return;
        };
        self.emitted.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.tx.send(text) {
            trace!(error = %e, "No clients connected, message dropped");
        }
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}
