//! CompletionProvider trait definition.

use quill_types::completion::{CompletionError, ProviderReply};

/// Trait for text-generation backends.
///
/// The contract is a single prompt in, text out. Implementations live in
/// quill-infra (e.g., `GeminiProvider`).
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    fn complete(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<ProviderReply, CompletionError>> + Send;
}
