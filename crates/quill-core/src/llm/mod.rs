//! Completion provider abstractions for Quill.
//!
//! - `CompletionProvider`: RPITIT trait for concrete provider implementations
//! - `CompletionGateway`: timeout and fallback policy around a provider

pub mod gateway;
pub mod provider;
