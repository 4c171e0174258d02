//! Conversation service: create, list, read, rename, and delete
//! conversations on behalf of an account.
//!
//! Ownership is checked on every operation that names a conversation; a
//! conversation owned by someone else is reported as not found. Rename and
//! delete take the same per-conversation lock as the exchange pipeline, so
//! they wait for an exchange in flight instead of racing it.

use quill_types::account::{AccountId, OrganizationId};
use quill_types::chat::{Conversation, Turn};
use quill_types::error::ConversationError;
use tracing::info;
use uuid::Uuid;

use super::lock::ConversationLocks;
use crate::repository::conversation::ConversationRepository;

pub struct ConversationService<C: ConversationRepository> {
    repo: C,
    locks: ConversationLocks,
}

impl<C: ConversationRepository> ConversationService<C> {
    pub fn new(repo: C, locks: ConversationLocks) -> Self {
        Self { repo, locks }
    }

    pub fn repo(&self) -> &C {
        &self.repo
    }

    /// Start a new conversation titled with the default placeholder.
    pub async fn create_conversation(
        &self,
        account_id: AccountId,
        organization_id: OrganizationId,
    ) -> Result<Conversation, ConversationError> {
        let conversation = self
            .repo
            .create_conversation(&Conversation::new(account_id, organization_id))
            .await?;
        info!(conversation_id = %conversation.id, account_id = %account_id, "Conversation created");
        Ok(conversation)
    }

    pub async fn list_conversations(
        &self,
        account_id: &AccountId,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Conversation>, ConversationError> {
        Ok(self
            .repo
            .list_conversations(account_id, organization_id)
            .await?)
    }

    /// Fetch a conversation the account owns.
    pub async fn get_owned(
        &self,
        account_id: &AccountId,
        conversation_id: &Uuid,
    ) -> Result<Conversation, ConversationError> {
        self.repo
            .find_conversation(conversation_id)
            .await?
            .filter(|c| c.is_owned_by(account_id))
            .ok_or(ConversationError::NotFound)
    }

    pub async fn list_turns(
        &self,
        account_id: &AccountId,
        conversation_id: &Uuid,
    ) -> Result<Vec<Turn>, ConversationError> {
        self.get_owned(account_id, conversation_id).await?;
        Ok(self.repo.list_turns(conversation_id).await?)
    }

    /// Set a title by hand. Blank titles are rejected.
    pub async fn rename_conversation(
        &self,
        account_id: &AccountId,
        conversation_id: &Uuid,
        title: &str,
    ) -> Result<Conversation, ConversationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ConversationError::InvalidTitle(
                "title is required".to_string(),
            ));
        }

        let _lock = self.locks.acquire(*conversation_id).await;
        self.get_owned(account_id, conversation_id).await?;
        self.repo
            .update_conversation_title(conversation_id, title)
            .await?;
        self.get_owned(account_id, conversation_id).await
    }

    pub async fn delete_conversation(
        &self,
        account_id: &AccountId,
        conversation_id: &Uuid,
    ) -> Result<(), ConversationError> {
        let _lock = self.locks.acquire(*conversation_id).await;
        self.get_owned(account_id, conversation_id).await?;
        self.repo.delete_conversation(conversation_id).await?;
        info!(conversation_id = %conversation_id, "Conversation deleted");
        Ok(())
    }
}
