//! Broadcast transport contract
//!
//! The core hands every emitted [`Message`] to a [`Broadcaster`]. Delivery is
//! fire-and-forget: implementations fan out to whatever clients are
//! connected and swallow per-client failures. With no clients or no running
//! transport, `broadcast` is a no-op.

use std::sync::Arc;

use crate::message::Message;

/// Fan-out sink for core messages
pub trait Broadcaster: Send + Sync {
    /// Deliver a message to every connected client, in emission order per
    /// client. Must not block and must not fail back into the caller.
    fn broadcast(&self, message: &Message);

    /// Advisory flag set once a downstream consumer announced readiness
    fn is_ready(&self) -> bool {
        false
    }
}

impl<T: Broadcaster + ?Sized> Broadcaster for Arc<T> {
    fn broadcast(&self, message: &Message) {
        (**self).broadcast(message)
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }
}

/// Transport that drops everything, for running without a server
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBroadcaster;

impl Broadcaster for NullBroadcaster {
    fn broadcast(&self, _message: &Message) {}
}
