//! Completion provider implementations.
//!
//! Contains concrete implementations of the [`CompletionProvider`] trait
//! defined in `quill-core`.
//!
//! [`CompletionProvider`]: quill_core::llm::provider::CompletionProvider

pub mod gemini;

pub use gemini::GeminiProvider;
