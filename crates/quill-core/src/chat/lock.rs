//! Per-conversation exclusive locks.
//!
//! Exchanges, renames, and deletes on the same conversation queue up behind
//! one FIFO `tokio::sync::Mutex`; different conversations never contend.
//! The map only holds entries for conversations someone is currently using.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

type LockMap = DashMap<Uuid, Arc<Mutex<()>>>;

/// Shared lock table. Clones share the same table.
#[derive(Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<LockMap>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `conversation_id`.
    ///
    /// The returned guard owns everything it needs, so it can be moved into
    /// a spawned task.
    pub async fn acquire(&self, conversation_id: Uuid) -> ConversationLock {
        let lock = Arc::clone(self.locks.entry(conversation_id).or_default().value());
        let guard = lock.lock_owned().await;
        ConversationLock {
            locks: Arc::clone(&self.locks),
            conversation_id,
            _guard: guard,
        }
    }

    /// Number of conversations with a live or pending holder.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Holds a conversation's lock; drops the map entry once nobody else is
/// waiting on it.
pub struct ConversationLock {
    locks: Arc<LockMap>,
    conversation_id: Uuid,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for ConversationLock {
    fn drop(&mut self) {
        // One reference in the map, one inside our guard.
        self.locks
            .remove_if(&self.conversation_id, |_, lock| Arc::strong_count(lock) <= 2);
    }
}
