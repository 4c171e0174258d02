//! Configuration types for Quill.
//!
//! `QuillConfig` represents the top-level `config.toml` in the data
//! directory. All fields have defaults, so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuillConfig {
    /// Credits debited per exchange.
    #[serde(default = "default_credit_cost")]
    pub credit_cost: u32,

    /// Number of most recent turns read when assembling prompt context.
    #[serde(default = "default_context_window")]
    pub context_window: u32,

    /// Balance granted when an account is first seen.
    #[serde(default = "default_initial_credits")]
    pub initial_credits: i64,

    /// Compare-and-swap attempts before a debit is reported as a conflict.
    #[serde(default = "default_ledger_max_attempts")]
    pub ledger_max_attempts: u32,

    /// Capacity of the broadcast notification channel.
    #[serde(default = "default_notification_channel_capacity")]
    pub notification_channel_capacity: usize,

    /// Capacity of each live session's outbound queue.
    #[serde(default = "default_session_outbox_capacity")]
    pub session_outbox_capacity: usize,

    #[serde(default)]
    pub completion: CompletionConfig,
}

fn default_credit_cost() -> u32 {
    10
}

fn default_context_window() -> u32 {
    10
}

fn default_initial_credits() -> i64 {
    1000
}

fn default_ledger_max_attempts() -> u32 {
    5
}

fn default_notification_channel_capacity() -> usize {
    256
}

fn default_session_outbox_capacity() -> usize {
    64
}

impl Default for QuillConfig {
    fn default() -> Self {
        Self {
            credit_cost: default_credit_cost(),
            context_window: default_context_window(),
            initial_credits: default_initial_credits(),
            ledger_max_attempts: default_ledger_max_attempts(),
            notification_channel_capacity: default_notification_channel_capacity(),
            session_outbox_capacity: default_session_outbox_capacity(),
            completion: CompletionConfig::default(),
        }
    }
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound on a single provider call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Name of the environment variable holding the provider credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Token figure recorded when the fallback text is used.
    #[serde(default = "default_fallback_tokens")]
    pub fallback_tokens: u32,

    /// Token figure recorded when the provider does not report usage.
    #[serde(default = "default_placeholder_tokens")]
    pub placeholder_tokens: u32,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_fallback_tokens() -> u32 {
    50
}

fn default_placeholder_tokens() -> u32 {
    200
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
            fallback_tokens: default_fallback_tokens(),
            placeholder_tokens: default_placeholder_tokens(),
        }
    }
}
