//! Completion gateway.
//!
//! Wraps a [`CompletionProvider`] with a bounded timeout and a two-outcome
//! contract: either the provider's text, or a fixed fallback text. The
//! gateway never returns an error, so the exchange pipeline always ends
//! with an assistant turn.

use std::time::Duration;

use quill_types::chat::TurnRole;
use quill_types::completion::{
    CompletionError, CompletionOutcome, CompletionSource, ContextEntry,
};
use quill_types::config::CompletionConfig;
use tracing::{debug, warn};

use super::provider::CompletionProvider;

/// Text used when the provider call fails for any reason.
pub const FAILURE_FALLBACK_TEXT: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

pub struct CompletionGateway<P: CompletionProvider> {
    /// `None` when no credential is configured.
    provider: Option<P>,
    timeout: Duration,
    credential_name: String,
    fallback_tokens: u32,
    placeholder_tokens: u32,
}

impl<P: CompletionProvider> CompletionGateway<P> {
    pub fn new(provider: Option<P>, config: &CompletionConfig) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(config.timeout_secs),
            credential_name: config.api_key_env.clone(),
            fallback_tokens: config.fallback_tokens,
            placeholder_tokens: config.placeholder_tokens,
        }
    }

    /// Override the call timeout (tests use sub-second bounds).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Produce assistant text for `new_user_text` given the prior turns.
    #[tracing::instrument(name = "completion", skip_all, fields(source))]
    pub async fn complete<'a, I>(&self, context: I, new_user_text: &str) -> CompletionOutcome
    where
        I: IntoIterator<Item = &'a ContextEntry>,
    {
        let Some(provider) = &self.provider else {
            debug!("No completion credential configured, returning simulated response");
            tracing::Span::current().record("source", "not_configured");
            return CompletionOutcome {
                text: format!(
                    "This is a simulated response. Please configure your {} to enable live completions.",
                    self.credential_name
                ),
                tokens_used: self.fallback_tokens,
                source: CompletionSource::NotConfigured,
            };
        };

        let prompt = render_prompt(context, new_user_text);

        let result = match tokio::time::timeout(self.timeout, provider.complete(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout(self.timeout.as_secs())),
        };

        match result {
            Ok(reply) => {
                tracing::Span::current().record("source", "provider");
                CompletionOutcome {
                    text: reply.text,
                    tokens_used: reply.tokens_used.unwrap_or(self.placeholder_tokens),
                    source: CompletionSource::Provider,
                }
            }
            Err(err) => {
                warn!(provider = provider.name(), error = %err, "Completion failed, using fallback text");
                tracing::Span::current().record("source", "fallback");
                CompletionOutcome {
                    text: FAILURE_FALLBACK_TEXT.to_string(),
                    tokens_used: self.fallback_tokens,
                    source: CompletionSource::Fallback,
                }
            }
        }
    }
}

/// Render prior turns and the new user text into one prompt.
///
/// Each prior turn becomes `ROLE: text`; the new text is appended as a
/// `USER:` line and the prompt ends with an `ASSISTANT:` cue.
pub fn render_prompt<'a, I>(context: I, new_user_text: &str) -> String
where
    I: IntoIterator<Item = &'a ContextEntry>,
{
    let mut lines: Vec<String> = context
        .into_iter()
        .map(|entry| format!("{}: {}", role_label(entry.role), entry.text))
        .collect();
    lines.push(format!("{}: {new_user_text}", role_label(TurnRole::User)));
    lines.push(format!("{}:", role_label(TurnRole::Assistant)));
    lines.join("\n")
}

fn role_label(role: TurnRole) -> String {
    role.to_string().to_uppercase()
}
