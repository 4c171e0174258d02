//! Infrastructure layer for Quill.
//!
//! Contains implementations of the repository traits defined in `quill-core`
//! (SQLite storage), the Gemini completion provider, admin API key storage,
//! and the config file loader.

pub mod config;
pub mod llm;
pub mod sqlite;
