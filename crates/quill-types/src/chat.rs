//! Conversation and turn types for Quill.
//!
//! A conversation is a titled, ordered sequence of turns between one account
//! and the assistant, scoped to one organization. Turns are immutable once
//! written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::account::{AccountId, OrganizationId};

/// Title given to every new conversation until it is renamed.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Chat";

/// Who authored a turn.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// A conversation owned by one account within one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub account_id: AccountId,
    pub organization_id: OrganizationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Build a fresh conversation carrying the default title.
    pub fn new(account_id: AccountId, organization_id: OrganizationId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            account_id,
            organization_id,
            title: DEFAULT_CONVERSATION_TITLE.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True while the title is still the placeholder and may be auto-derived.
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_CONVERSATION_TITLE
    }

    pub fn is_owned_by(&self, account_id: &AccountId) -> bool {
        self.account_id == *account_id
    }
}

/// A single message within a conversation.
///
/// Turns are ordered by `created_at` within a conversation. Assistant turns
/// carry the token estimate and the credits debited for the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: TurnRole,
    pub content: String,
    /// Token estimate reported for the exchange (assistant turns only).
    pub tokens_used: u32,
    /// Credits charged for the exchange (assistant turns only).
    pub credits_deducted: u32,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(conversation_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            conversation_id,
            role: TurnRole::User,
            content,
            tokens_used: 0,
            credits_deducted: 0,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(
        conversation_id: Uuid,
        content: String,
        tokens_used: u32,
        credits_deducted: u32,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            conversation_id,
            role: TurnRole::Assistant,
            content,
            tokens_used,
            credits_deducted,
            created_at: Utc::now(),
        }
    }
}

/// Result of one completed exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub user_turn: Turn,
    pub assistant_turn: Turn,
    pub remaining_credits: i64,
    /// Present when the exchange renamed the conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_title: Option<String>,
}
