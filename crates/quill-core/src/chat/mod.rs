//! Conversations and the credit-metered message exchange.
//!
//! - `context`: bounded prompt window assembled from persisted turns
//! - `lock`: per-conversation exclusive locks shared by pipeline and service
//! - `title`: auto-title derivation from the first message
//! - `pipeline`: validate -> debit -> persist -> complete -> persist -> title
//! - `service`: conversation CRUD around the pipeline

pub mod context;
pub mod lock;
pub mod pipeline;
pub mod service;
pub mod title;
