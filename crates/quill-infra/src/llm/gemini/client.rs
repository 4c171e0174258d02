//! GeminiProvider: concrete [`CompletionProvider`] for Google Gemini.
//!
//! The API key is wrapped in [`SecretString`] and only exposed when the
//! request header is built. It never appears in logs or `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use quill_core::llm::provider::CompletionProvider;
use quill_types::completion::{CompletionError, ProviderReply};
use quill_types::config::CompletionConfig;

use super::types::{GenerateContentRequest, GenerateContentResponse};

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(
        api_key: SecretString,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    /// Build a provider from config, reading the key from the environment
    /// variable named by `api_key_env`.
    ///
    /// Returns `Ok(None)` when the variable is unset or blank.
    pub fn from_config(config: &CompletionConfig) -> Result<Option<Self>, CompletionError> {
        let key = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                tracing::info!(
                    env = %config.api_key_env,
                    "Completion credential not set, replies will be simulated"
                );
                return Ok(None);
            }
        };

        Self::new(
            SecretString::from(key),
            config.model.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<ProviderReply, CompletionError> {
        let body = GenerateContentRequest::from_prompt(prompt);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => CompletionError::AuthenticationFailed,
                429 => CompletionError::RateLimited,
                _ => CompletionError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            CompletionError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        let text = parsed
            .first_text()
            .ok_or(CompletionError::MissingField("candidates[0].content.parts[0].text"))?;

        Ok(ProviderReply {
            text: text.to_string(),
            tokens_used: parsed.total_tokens(),
        })
    }
}
