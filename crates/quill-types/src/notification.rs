//! Notification types and the wire payload pushed to live sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::account::AccountId;

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum NotificationScope {
    /// Visible to, and pushed to, every account.
    Broadcast,
    /// Visible to, and pushed to, a single account.
    Targeted { account_id: AccountId },
}

impl NotificationScope {
    /// Storage and wire tag: `global` for broadcast, `user` for targeted.
    pub fn tag(&self) -> ScopeTag {
        match self {
            NotificationScope::Broadcast => ScopeTag::Global,
            NotificationScope::Targeted { .. } => ScopeTag::User,
        }
    }

    pub fn target(&self) -> Option<AccountId> {
        match self {
            NotificationScope::Broadcast => None,
            NotificationScope::Targeted { account_id } => Some(*account_id),
        }
    }
}

/// Scope discriminator as it appears in storage and over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeTag {
    Global,
    User,
}

impl fmt::Display for ScopeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeTag::Global => write!(f, "global"),
            ScopeTag::User => write!(f, "user"),
        }
    }
}

impl FromStr for ScopeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(ScopeTag::Global),
            "user" => Ok(ScopeTag::User),
            other => Err(format!("invalid notification scope: '{other}'")),
        }
    }
}

/// A persisted notification.
///
/// Created once, `read` flips false -> true, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(flatten)]
    pub scope: NotificationScope,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(scope: NotificationScope, title: String, body: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            scope,
            title,
            body,
            read: false,
            created_at: Utc::now(),
        }
    }

    /// Broadcast notifications are visible to everyone; targeted ones only
    /// to their recipient.
    pub fn is_visible_to(&self, account_id: &AccountId) -> bool {
        match self.scope {
            NotificationScope::Broadcast => true,
            NotificationScope::Targeted { account_id: target } => target == *account_id,
        }
    }
}

/// Notification fields exposed to live clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub account_id: Option<AccountId>,
    #[serde(rename = "type")]
    pub scope: ScopeTag,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationPayload {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            account_id: n.scope.target(),
            scope: n.scope.tag(),
            title: n.title.clone(),
            message: n.body.clone(),
            read: n.read,
            created_at: n.created_at,
        }
    }
}
