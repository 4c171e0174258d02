//! In-memory repository doubles and scripted providers for core tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use quill_types::account::{AccountId, OrganizationId};
use quill_types::chat::{Conversation, Turn};
use quill_types::completion::{CompletionError, ProviderReply};
use quill_types::error::RepositoryError;
use quill_types::notification::Notification;
use uuid::Uuid;

use crate::llm::provider::CompletionProvider;
use crate::repository::account::AccountRepository;
use crate::repository::conversation::ConversationRepository;
use crate::repository::notification::NotificationRepository;

#[derive(Clone, Default)]
pub struct InMemoryConversations {
    conversations: Arc<Mutex<HashMap<Uuid, Conversation>>>,
    turns: Arc<Mutex<Vec<Turn>>>,
}

impl InMemoryConversations {
    pub fn turns_of(&self, conversation_id: &Uuid) -> Vec<Turn> {
        self.turns
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.conversation_id == *conversation_id)
            .cloned()
            .collect()
    }

    pub fn conversation(&self, conversation_id: &Uuid) -> Option<Conversation> {
        self.conversations.lock().unwrap().get(conversation_id).cloned()
    }

    pub fn seed(&self, conversation: Conversation) -> Conversation {
        self.conversations
            .lock()
            .unwrap()
            .insert(conversation.id, conversation.clone());
        conversation
    }
}

impl ConversationRepository for InMemoryConversations {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, RepositoryError> {
        Ok(self.seed(conversation.clone()))
    }

    async fn find_conversation(
        &self,
        conversation_id: &Uuid,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.conversation(conversation_id))
    }

    async fn list_conversations(
        &self,
        account_id: &AccountId,
        organization_id: &OrganizationId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let mut list: Vec<Conversation> = self
            .conversations
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.account_id == *account_id && c.organization_id == *organization_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(list)
    }

    async fn update_conversation_title(
        &self,
        conversation_id: &Uuid,
        title: &str,
    ) -> Result<(), RepositoryError> {
        let mut map = self.conversations.lock().unwrap();
        let conv = map.get_mut(conversation_id).ok_or(RepositoryError::NotFound)?;
        conv.title = title.to_string();
        conv.updated_at = Utc::now();
        Ok(())
    }

    async fn set_title_if_default(
        &self,
        conversation_id: &Uuid,
        title: &str,
    ) -> Result<bool, RepositoryError> {
        let mut map = self.conversations.lock().unwrap();
        let conv = map.get_mut(conversation_id).ok_or(RepositoryError::NotFound)?;
        if !conv.has_default_title() {
            return Ok(false);
        }
        conv.title = title.to_string();
        conv.updated_at = Utc::now();
        Ok(true)
    }

    async fn touch_conversation(
        &self,
        conversation_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut map = self.conversations.lock().unwrap();
        let conv = map.get_mut(conversation_id).ok_or(RepositoryError::NotFound)?;
        conv.updated_at = at;
        Ok(())
    }

    async fn delete_conversation(&self, conversation_id: &Uuid) -> Result<(), RepositoryError> {
        self.conversations
            .lock()
            .unwrap()
            .remove(conversation_id)
            .ok_or(RepositoryError::NotFound)?;
        self.turns
            .lock()
            .unwrap()
            .retain(|t| t.conversation_id != *conversation_id);
        Ok(())
    }

    async fn insert_turn(&self, turn: &Turn) -> Result<Turn, RepositoryError> {
        if !self.conversations.lock().unwrap().contains_key(&turn.conversation_id) {
            return Err(RepositoryError::Query("foreign key violation".to_string()));
        }
        self.turns.lock().unwrap().push(turn.clone());
        Ok(turn.clone())
    }

    async fn list_recent_turns(
        &self,
        conversation_id: &Uuid,
        limit: u32,
    ) -> Result<Vec<Turn>, RepositoryError> {
        let all = self.turns_of(conversation_id);
        let skip = all.len().saturating_sub(limit as usize);
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn list_turns(&self, conversation_id: &Uuid) -> Result<Vec<Turn>, RepositoryError> {
        Ok(self.turns_of(conversation_id))
    }

    async fn count_conversations(&self) -> Result<u64, RepositoryError> {
        Ok(self.conversations.lock().unwrap().len() as u64)
    }

    async fn count_turns(&self) -> Result<u64, RepositoryError> {
        Ok(self.turns.lock().unwrap().len() as u64)
    }
}

/// Accounts whose balance read yields to the scheduler, so concurrent
/// debits genuinely interleave between read and swap.
#[derive(Clone, Default)]
pub struct InMemoryAccounts {
    balances: Arc<Mutex<HashMap<AccountId, i64>>>,
    /// When set, every compare-and-swap reports a lost race.
    pub always_conflict: bool,
    pub swap_attempts: Arc<AtomicUsize>,
}

impl InMemoryAccounts {
    pub fn with_balance(account_id: AccountId, credits: i64) -> Self {
        let accounts = Self::default();
        accounts.balances.lock().unwrap().insert(account_id, credits);
        accounts
    }

    pub fn balance(&self, account_id: &AccountId) -> Option<i64> {
        self.balances.lock().unwrap().get(account_id).copied()
    }
}

impl AccountRepository for InMemoryAccounts {
    async fn ensure_account(
        &self,
        account_id: &AccountId,
        initial_credits: i64,
    ) -> Result<i64, RepositoryError> {
        let mut map = self.balances.lock().unwrap();
        Ok(*map.entry(*account_id).or_insert(initial_credits))
    }

    async fn get_balance(&self, account_id: &AccountId) -> Result<Option<i64>, RepositoryError> {
        let balance = self.balance(account_id);
        tokio::task::yield_now().await;
        Ok(balance)
    }

    async fn compare_and_swap_balance(
        &self,
        account_id: &AccountId,
        expected: i64,
        new: i64,
    ) -> Result<bool, RepositoryError> {
        self.swap_attempts.fetch_add(1, Ordering::SeqCst);
        if self.always_conflict {
            return Ok(false);
        }
        let mut map = self.balances.lock().unwrap();
        match map.get_mut(account_id) {
            Some(current) if *current == expected => {
                *current = new;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryNotifications {
    rows: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotifications {
    pub fn all(&self) -> Vec<Notification> {
        self.rows.lock().unwrap().clone()
    }
}

impl NotificationRepository for InMemoryNotifications {
    async fn insert_notification(
        &self,
        notification: &Notification,
    ) -> Result<Notification, RepositoryError> {
        self.rows.lock().unwrap().push(notification.clone());
        Ok(notification.clone())
    }

    async fn find_notification(
        &self,
        notification_id: &Uuid,
    ) -> Result<Option<Notification>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.id == *notification_id)
            .cloned())
    }

    async fn update_notification_read(
        &self,
        notification_id: &Uuid,
        read: bool,
    ) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|n| n.id == *notification_id)
            .ok_or(RepositoryError::NotFound)?;
        row.read = read;
        Ok(())
    }

    async fn list_notifications_for(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let mut list: Vec<Notification> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.is_visible_to(account_id))
            .cloned()
            .collect();
        list.reverse();
        Ok(list)
    }

    async fn mark_all_read_for(&self, account_id: &AccountId) -> Result<u64, RepositoryError> {
        let mut changed = 0;
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.is_visible_to(account_id) && !row.read {
                row.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn count_unread(&self) -> Result<u64, RepositoryError> {
        Ok(self.rows.lock().unwrap().iter().filter(|n| !n.read).count() as u64)
    }
}

/// Scripted completion provider.
#[derive(Clone)]
pub enum MockProvider {
    Reply { text: String, tokens: Option<u32> },
    Fail,
    Hang,
    /// Echoes the prompt it received back as the reply.
    Echo,
}

impl MockProvider {
    pub fn reply(text: &str) -> Self {
        MockProvider::Reply {
            text: text.to_string(),
            tokens: None,
        }
    }
}

impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, prompt: &str) -> Result<ProviderReply, CompletionError> {
        match self {
            MockProvider::Reply { text, tokens } => Ok(ProviderReply {
                text: text.clone(),
                tokens_used: *tokens,
            }),
            MockProvider::Fail => Err(CompletionError::Provider {
                message: "HTTP 503: unavailable".to_string(),
            }),
            MockProvider::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(CompletionError::Provider {
                    message: "unreachable".to_string(),
                })
            }
            MockProvider::Echo => Ok(ProviderReply {
                text: prompt.to_string(),
                tokens_used: Some(7),
            }),
        }
    }
}

pub fn org() -> OrganizationId {
    OrganizationId::from_uuid(Uuid::now_v7())
}
