//! Fan automation events out to async consumers.
//!
//! The engine delivers synchronously; `BroadcastListener` bridges that into
//! a tokio broadcast channel so any number of tasks can consume events
//! without blocking evaluation. Slow receivers lag and lose the oldest
//! events rather than applying backpressure.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

use crate::domain::errors::ListenerError;
use crate::domain::ports::{AutomationEvent, AutomationListener};

/// Listener that republishes every event on a broadcast channel.
pub struct BroadcastListener {
    sender: broadcast::Sender<AutomationEvent>,
    sent: AtomicU64,
}

impl BroadcastListener {
    /// Channel holding up to `capacity` unread events per receiver.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            sent: AtomicU64::new(0),
        }
    }

    /// New receiver; sees only events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<AutomationEvent> {
        self.sender.subscribe()
    }

    /// Live receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events handed to at least one receiver.
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for BroadcastListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastListener")
            .field("receivers", &self.sender.receiver_count())
            .field("sent", &self.sent_count())
            .finish()
    }
}

impl AutomationListener for BroadcastListener {
    fn name(&self) -> &str {
        "broadcast"
    }

    fn on_event(&self, event: &AutomationEvent) -> Result<(), ListenerError> {
        // No receivers is not a delivery failure
        if self.sender.send(event.clone()).is_ok() {
            self.sent.fetch_add(1, Ordering::Relaxed);
        } else {
            tracing::trace!(trigger_id = %event.trigger_id, "No broadcast receivers; event dropped");
        }
        Ok(())
    }
}
