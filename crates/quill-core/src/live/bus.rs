//! Broadcast bus for live notification payloads.
//!
//! Every connected transport session subscribes on connect. Publishing with
//! no subscribers drops the payload; the persisted record is the durable copy.

use quill_types::notification::NotificationPayload;
use tokio::sync::broadcast;

/// Multi-consumer notification bus.
///
/// Cloning the bus clones the sender, so the dispatcher and the transport
/// layer can share one channel.
pub struct NotificationBus {
    sender: broadcast::Sender<NotificationPayload>,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationPayload> {
        self.sender.subscribe()
    }

    /// Publish to all current subscribers. Returns how many received it.
    pub fn publish(&self, payload: NotificationPayload) -> usize {
        self.sender.send(payload).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Clone for NotificationBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
