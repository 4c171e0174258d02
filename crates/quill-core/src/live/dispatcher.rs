//! Notification dispatcher: persist first, then push to live sessions.
//!
//! Persistence is the durable guarantee. Live delivery is best-effort: a
//! broadcast reaches whoever is subscribed to the bus at that moment, and a
//! targeted notification reaches the recipient's registered session if one
//! exists. Either way the record surfaces on the next list read.

use std::sync::Arc;

use quill_types::account::AccountId;
use quill_types::error::{NotificationError, RepositoryError};
use quill_types::notification::{Notification, NotificationPayload, NotificationScope};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::bus::NotificationBus;
use super::registry::ConnectionRegistry;
use crate::repository::notification::NotificationRepository;

/// Outcome of a dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub notification: Notification,
    /// Live sessions the payload was queued for.
    pub delivered_live: usize,
}

pub struct NotificationDispatcher<N: NotificationRepository> {
    notifications: N,
    registry: Arc<ConnectionRegistry>,
    bus: NotificationBus,
}

impl<N: NotificationRepository> NotificationDispatcher<N> {
    pub fn new(notifications: N, registry: Arc<ConnectionRegistry>, bus: NotificationBus) -> Self {
        Self {
            notifications,
            registry,
            bus,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    #[tracing::instrument(skip_all, fields(scope = %scope.tag()))]
    pub async fn dispatch(
        &self,
        scope: NotificationScope,
        title: &str,
        body: &str,
    ) -> Result<DispatchReport, NotificationError> {
        let title = title.trim();
        let body = body.trim();
        if title.is_empty() {
            return Err(NotificationError::Invalid("title must not be empty".to_string()));
        }
        if body.is_empty() {
            return Err(NotificationError::Invalid("message must not be empty".to_string()));
        }

        let notification = self
            .notifications
            .insert_notification(&Notification::new(scope, title.to_string(), body.to_string()))
            .await?;
        let payload = NotificationPayload::from(&notification);

        let delivered_live = match scope {
            NotificationScope::Broadcast => self.bus.publish(payload),
            NotificationScope::Targeted { account_id } => match self.registry.lookup(&account_id) {
                Some(session) => usize::from(session.emit(payload)),
                None => {
                    debug!(account_id = %account_id, "Recipient offline, notification stored only");
                    0
                }
            },
        };

        info!(
            notification_id = %notification.id,
            delivered_live,
            "Notification dispatched"
        );
        Ok(DispatchReport {
            notification,
            delivered_live,
        })
    }

    /// Mark one notification read on behalf of `account_id`.
    ///
    /// Idempotent. Notifications the account cannot see are reported as
    /// not found.
    pub async fn mark_read(
        &self,
        notification_id: &Uuid,
        account_id: &AccountId,
    ) -> Result<Notification, NotificationError> {
        let mut notification = self
            .notifications
            .find_notification(notification_id)
            .await?
            .filter(|n| n.is_visible_to(account_id))
            .ok_or(NotificationError::NotFound)?;

        if !notification.read {
            self.notifications
                .update_notification_read(notification_id, true)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => NotificationError::NotFound,
                    other => other.into(),
                })?;
            notification.read = true;
        }
        Ok(notification)
    }

    pub async fn mark_all_read(&self, account_id: &AccountId) -> Result<u64, NotificationError> {
        let changed = self.notifications.mark_all_read_for(account_id).await?;
        debug!(account_id = %account_id, changed, "Marked all notifications read");
        Ok(changed)
    }

    pub async fn list_for(&self, account_id: &AccountId) -> Result<Vec<Notification>, NotificationError> {
        Ok(self.notifications.list_notifications_for(account_id).await?)
    }
}
