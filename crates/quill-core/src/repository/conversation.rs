//! ConversationRepository trait definition.

use chrono::{DateTime, Utc};
use quill_types::account::{AccountId, OrganizationId};
use quill_types::chat::{Conversation, Turn};
use quill_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for conversation and turn persistence.
///
/// Implementations live in quill-infra (e.g., `SqliteConversationRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ConversationRepository: Send + Sync {
    fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    fn find_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// List an account's conversations within one organization, most
    /// recently updated first.
    fn list_conversations(
        &self,
        account_id: &AccountId,
        organization_id: &OrganizationId,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Replace the title and bump `updated_at`.
    fn update_conversation_title(
        &self,
        conversation_id: &Uuid,
        title: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Replace the title only while it is still the default placeholder.
    /// Returns `false` when the title had already been changed.
    fn set_title_if_default(
        &self,
        conversation_id: &Uuid,
        title: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    fn touch_conversation(
        &self,
        conversation_id: &Uuid,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a conversation and all of its turns.
    fn delete_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn insert_turn(
        &self,
        turn: &Turn,
    ) -> impl std::future::Future<Output = Result<Turn, RepositoryError>> + Send;

    /// The `limit` most recent turns of a conversation, oldest first.
    fn list_recent_turns(
        &self,
        conversation_id: &Uuid,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Every turn of a conversation, oldest first.
    fn list_turns(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    fn count_conversations(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    fn count_turns(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
