//! SQLite notification repository implementation.

use quill_core::repository::notification::NotificationRepository;
use quill_types::account::AccountId;
use quill_types::error::RepositoryError;
use quill_types::notification::{Notification, NotificationScope, ScopeTag};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

#[derive(Clone)]
pub struct SqliteNotificationRepository {
    pool: DatabasePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct NotificationRow {
    id: String,
    scope: String,
    account_id: Option<String>,
    title: String,
    body: String,
    read: bool,
    created_at: String,
}

impl NotificationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            scope: row.try_get("scope")?,
            account_id: row.try_get("account_id")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            read: row.try_get("read")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_notification(self) -> Result<Notification, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid notification id: {e}")))?;
        let tag: ScopeTag = self.scope.parse().map_err(RepositoryError::Query)?;
        let scope = match (tag, self.account_id) {
            (ScopeTag::Global, _) => NotificationScope::Broadcast,
            (ScopeTag::User, Some(account_id)) => NotificationScope::Targeted {
                account_id: account_id
                    .parse()
                    .map_err(|e| RepositoryError::Query(format!("invalid account_id: {e}")))?,
            },
            (ScopeTag::User, None) => {
                return Err(RepositoryError::Query(format!(
                    "targeted notification {id} has no account_id"
                )));
            }
        };

        Ok(Notification {
            id,
            scope,
            title: self.title,
            body: self.body,
            read: self.read,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl NotificationRepository for SqliteNotificationRepository {
    async fn insert_notification(
        &self,
        notification: &Notification,
    ) -> Result<Notification, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO notifications (id, scope, account_id, title, body, read, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(notification.id.to_string())
        .bind(notification.scope.tag().to_string())
        .bind(notification.scope.target().map(|a| a.to_string()))
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.read)
        .bind(format_datetime(&notification.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(notification.clone())
    }

    async fn find_notification(
        &self,
        notification_id: &Uuid,
    ) -> Result<Option<Notification>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM notifications WHERE id = ?")
            .bind(notification_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|row| {
            NotificationRow::from_row(&row)
                .map_err(query_error)?
                .into_notification()
        })
        .transpose()
    }

    async fn update_notification_read(
        &self,
        notification_id: &Uuid,
        read: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE notifications SET read = ? WHERE id = ?")
            .bind(read)
            .bind(notification_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_notifications_for(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM notifications
               WHERE scope = 'global' OR account_id = ?
               ORDER BY created_at DESC, rowid DESC"#,
        )
        .bind(account_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| {
                NotificationRow::from_row(row)
                    .map_err(query_error)?
                    .into_notification()
            })
            .collect()
    }

    async fn mark_all_read_for(&self, account_id: &AccountId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE notifications SET read = 1
               WHERE read = 0 AND (scope = 'global' OR account_id = ?)"#,
        )
        .bind(account_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE read = 0")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(count as u64)
    }
}
