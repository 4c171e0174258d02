//! Google Gemini completion provider.
//!
//! [`GeminiProvider`] calls the `generateContent` endpoint with a single
//! rendered prompt and returns the first candidate's text.

pub mod client;
pub mod types;

pub use client::GeminiProvider;
