//! NotificationRepository trait definition.

use quill_types::account::AccountId;
use quill_types::error::RepositoryError;
use quill_types::notification::Notification;
use uuid::Uuid;

pub trait NotificationRepository: Send + Sync {
    fn insert_notification(
        &self,
        notification: &Notification,
    ) -> impl std::future::Future<Output = Result<Notification, RepositoryError>> + Send;

    fn find_notification(
        &self,
        notification_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Notification>, RepositoryError>> + Send;

    fn update_notification_read(
        &self,
        notification_id: &Uuid,
        read: bool,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Broadcast notifications plus those targeted at `account_id`, newest first.
    fn list_notifications_for(
        &self,
        account_id: &AccountId,
    ) -> impl std::future::Future<Output = Result<Vec<Notification>, RepositoryError>> + Send;

    /// Flip every unread notification visible to `account_id`. Returns how
    /// many rows changed.
    fn mark_all_read_for(
        &self,
        account_id: &AccountId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    fn count_unread(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
