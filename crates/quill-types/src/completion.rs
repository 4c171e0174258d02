//! Completion provider request/response types.
//!
//! The provider contract is prompt-in/text-out. The gateway in `quill-core`
//! turns every provider outcome into a [`CompletionOutcome`], so callers never
//! see a [`CompletionError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chat::TurnRole;

/// One prior turn rendered into the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: TurnRole,
    pub text: String,
}

/// Successful reply from a completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub text: String,
    /// Usage reported by the provider, when it reports any.
    pub tokens_used: Option<u32>,
}

/// Where the assistant text of an exchange came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionSource {
    Provider,
    /// No credential configured; canned response.
    NotConfigured,
    /// Provider call failed or timed out; canned apology.
    Fallback,
}

/// What the gateway hands back to the pipeline. Always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub text: String,
    pub tokens_used: u32,
    pub source: CompletionSource,
}

/// Errors raised by provider implementations.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("response missing field: {0}")]
    MissingField(&'static str),

    #[error("rate limited")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("timed out after {0}s")]
    Timeout(u64),
}
