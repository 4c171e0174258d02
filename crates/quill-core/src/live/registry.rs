//! Connection registry: at most one live session per account.
//!
//! Two concurrent maps keep every operation O(1): `by_account` routes
//! targeted pushes, `by_session` lets a disconnecting transport find the
//! entry it owns. A later registration for the same account silently
//! supersedes the earlier session; the superseded session is not told.
//!
//! The registry holds routing only. Losing it (process restart) is safe;
//! clients re-register on reconnect.

use dashmap::DashMap;
use quill_types::account::AccountId;
use quill_types::notification::NotificationPayload;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Handle to one live transport session.
///
/// Cloning shares the outbound queue. Equality is by session id.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    outbox: mpsc::Sender<NotificationPayload>,
}

impl SessionHandle {
    /// Create a handle plus the receiving end the transport drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NotificationPayload>) {
        let (outbox, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: Uuid::now_v7(),
                outbox,
            },
            rx,
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a payload for this session without waiting.
    ///
    /// Returns `false` when the session is gone or its queue is full.
    pub fn emit(&self, payload: NotificationPayload) -> bool {
        match self.outbox.try_send(payload) {
            Ok(()) => true,
            Err(err) => {
                debug!(session_id = %self.id, error = %err, "Dropped live notification");
                false
            }
        }
    }
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SessionHandle {}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_account: DashMap<AccountId, SessionHandle>,
    by_session: DashMap<Uuid, AccountId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `account_id` to `session`, replacing any earlier session.
    ///
    /// Returns the superseded handle, if any. Re-registering a session under
    /// a different account releases its previous account entry.
    pub fn register(&self, account_id: AccountId, session: SessionHandle) -> Option<SessionHandle> {
        let session_id = session.id;
        if let Some(previous) = self.by_session.insert(session_id, account_id) {
            if previous != account_id {
                self.by_account
                    .remove_if(&previous, |_, handle| handle.id == session_id);
            }
        }

        let superseded = self
            .by_account
            .insert(account_id, session)
            .filter(|old| old.id != session_id);
        info!(
            account_id = %account_id,
            session_id = %session_id,
            superseded = superseded.is_some(),
            "Session registered"
        );
        superseded
    }

    /// Remove whichever entry currently holds `session_id`.
    ///
    /// A no-op when the session was superseded or never registered. Returns
    /// the account whose entry was removed.
    pub fn unregister(&self, session_id: &Uuid) -> Option<AccountId> {
        let (_, account_id) = self.by_session.remove(session_id)?;
        let removed = self
            .by_account
            .remove_if(&account_id, |_, handle| handle.id == *session_id)
            .map(|_| account_id);
        if removed.is_some() {
            info!(account_id = %account_id, session_id = %session_id, "Session unregistered");
        }
        removed
    }

    pub fn lookup(&self, account_id: &AccountId) -> Option<SessionHandle> {
        self.by_account.get(account_id).map(|entry| entry.value().clone())
    }

    /// Number of accounts with a live session.
    pub fn len(&self) -> usize {
        self.by_account.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_account.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn handle() -> SessionHandle {
        SessionHandle::new(4).0
    }

    #[test]
    fn later_registration_supersedes() {
        let registry = ConnectionRegistry::new();
        let account = AccountId::new();
        let h1 = handle();
        let h2 = handle();

        assert!(registry.register(account, h1.clone()).is_none());
        let superseded = registry.register(account, h2.clone());
        assert_eq!(superseded, Some(h1.clone()));
        assert_eq!(registry.lookup(&account), Some(h2.clone()));

        // The superseded session disconnecting changes nothing.
        assert_eq!(registry.unregister(&h1.id()), None);
        assert_eq!(registry.lookup(&account), Some(h2.clone()));

        assert_eq!(registry.unregister(&h2.id()), Some(account));
        assert!(registry.lookup(&account).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_unknown_session_is_noop() {
        let registry = ConnectionRegistry::new();
        assert!(registry.unregister(&Uuid::now_v7()).is_none());
    }

    #[test]
    fn same_session_registering_twice_is_not_a_supersede() {
        let registry = ConnectionRegistry::new();
        let account = AccountId::new();
        let h = handle();
        registry.register(account, h.clone());
        assert!(registry.register(account, h.clone()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn session_switching_accounts_releases_old_route() {
        let registry = ConnectionRegistry::new();
        let a = AccountId::new();
        let b = AccountId::new();
        let h = handle();

        registry.register(a, h.clone());
        registry.register(b, h.clone());

        assert!(registry.lookup(&a).is_none());
        assert_eq!(registry.lookup(&b), Some(h.clone()));
        assert_eq!(registry.unregister(&h.id()), Some(b));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn emit_reaches_the_receiver() {
        let (h, mut rx) = SessionHandle::new(2);
        let payload = NotificationPayload::from(&quill_types::notification::Notification::new(
            quill_types::notification::NotificationScope::Broadcast,
            "t".to_string(),
            "m".to_string(),
        ));
        assert!(h.emit(payload.clone()));
        assert_eq!(rx.recv().await, Some(payload.clone()));

        drop(rx);
        assert!(!h.emit(payload));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_register_unregister_keeps_maps_consistent() {
        let registry = Arc::new(ConnectionRegistry::new());
        let accounts: Vec<AccountId> = (0..16).map(|_| AccountId::new()).collect();

        let tasks: Vec<_> = accounts
            .iter()
            .copied()
            .map(|account| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    for _ in 0..50 {
                        let h = handle();
                        registry.register(account, h.clone());
                        tokio::task::yield_now().await;
                        registry.unregister(&h.id());
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert!(registry.is_empty());
        assert!(registry.by_session.is_empty());
    }
}
