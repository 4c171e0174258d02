//! SQLite conversation repository implementation.
//!
//! Implements `ConversationRepository` from `quill-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, writes on the writer.

use chrono::{DateTime, Utc};
use quill_core::repository::conversation::ConversationRepository;
use quill_types::account::{AccountId, OrganizationId};
use quill_types::chat::{Conversation, DEFAULT_CONVERSATION_TITLE, Turn, TurnRole};
use quill_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ConversationRepository`.
#[derive(Clone)]
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ConversationRow {
    id: String,
    account_id: String,
    organization_id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            account_id: row.try_get("account_id")?,
            organization_id: row.try_get("organization_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;
        let account_id = Uuid::parse_str(&self.account_id)
            .map_err(|e| RepositoryError::Query(format!("invalid account_id: {e}")))?;
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|e| RepositoryError::Query(format!("invalid organization_id: {e}")))?;

        Ok(Conversation {
            id,
            account_id: AccountId::from_uuid(account_id),
            organization_id: OrganizationId::from_uuid(organization_id),
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct TurnRow {
    id: String,
    conversation_id: String,
    role: String,
    content: String,
    tokens_used: i64,
    credits_deducted: i64,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            tokens_used: row.try_get("tokens_used")?,
            credits_deducted: row.try_get("credits_deducted")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<Turn, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid turn id: {e}")))?;
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_id: {e}")))?;
        let role: TurnRole = self.role.parse().map_err(RepositoryError::Query)?;

        Ok(Turn {
            id,
            conversation_id,
            role,
            content: self.content,
            tokens_used: self.tokens_used as u32,
            credits_deducted: self.credits_deducted as u32,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn map_turns(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Turn>, RepositoryError> {
    rows.iter()
        .map(|row| TurnRow::from_row(row).map_err(query_error)?.into_turn())
        .collect()
}

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteConversationRepository {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO conversations (id, account_id, organization_id, title, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(conversation.id.to_string())
        .bind(conversation.account_id.to_string())
        .bind(conversation.organization_id.to_string())
        .bind(&conversation.title)
        .bind(format_datetime(&conversation.created_at))
        .bind(format_datetime(&conversation.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(conversation.clone())
    }

    async fn find_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(conversation_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => Ok(Some(
                ConversationRow::from_row(&row)
                    .map_err(query_error)?
                    .into_conversation()?,
            )),
            None => Ok(None),
        }
    }

    async fn list_conversations(
        &self,
        account_id: &AccountId,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM conversations
               WHERE account_id = ? AND organization_id = ?
               ORDER BY updated_at DESC"#,
        )
        .bind(account_id.to_string())
        .bind(organization_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            conversations.push(
                ConversationRow::from_row(row)
                    .map_err(query_error)?
                    .into_conversation()?,
            );
        }
        Ok(conversations)
    }

    async fn update_conversation_title(
        &self,
        conversation_id: &Uuid,
        title: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET title = ?, updated_at = ? WHERE id = ?")
            .bind(title)
            .bind(format_datetime(&Utc::now()))
            .bind(conversation_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_title_if_default(
        &self,
        conversation_id: &Uuid,
        title: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE conversations SET title = ?, updated_at = ? WHERE id = ? AND title = ?",
        )
        .bind(title)
        .bind(format_datetime(&Utc::now()))
        .bind(conversation_id.to_string())
        .bind(DEFAULT_CONVERSATION_TITLE)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn touch_conversation(
        &self,
        conversation_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&at))
            .bind(conversation_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_conversation(&self, conversation_id: &Uuid) -> Result<(), RepositoryError> {
        // Turns go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(conversation_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn insert_turn(&self, turn: &Turn) -> Result<Turn, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO turns (id, conversation_id, role, content, tokens_used, credits_deducted, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(turn.id.to_string())
        .bind(turn.conversation_id.to_string())
        .bind(turn.role.to_string())
        .bind(&turn.content)
        .bind(turn.tokens_used as i64)
        .bind(turn.credits_deducted as i64)
        .bind(format_datetime(&turn.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => RepositoryError::NotFound,
            other => query_error(other),
        })?;

        Ok(turn.clone())
    }

    async fn list_recent_turns(
        &self,
        conversation_id: &Uuid,
        limit: u32,
    ) -> Result<Vec<Turn>, RepositoryError> {
        // Newest `limit` by insertion order, flipped back to oldest first.
        let rows = sqlx::query(
            r#"SELECT * FROM (
                   SELECT rowid AS seq, * FROM turns
                   WHERE conversation_id = ?
                   ORDER BY rowid DESC
                   LIMIT ?
               ) ORDER BY seq ASC"#,
        )
        .bind(conversation_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        map_turns(&rows)
    }

    async fn list_turns(&self, conversation_id: &Uuid) -> Result<Vec<Turn>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM turns WHERE conversation_id = ? ORDER BY rowid ASC")
            .bind(conversation_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        map_turns(&rows)
    }

    async fn count_conversations(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(count as u64)
    }

    async fn count_turns(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM turns")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(count as u64)
    }
}
