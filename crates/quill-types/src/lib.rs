//! Shared domain types for Quill.
//!
//! This crate contains the domain types used across the Quill platform:
//! accounts, conversations and their turns, notifications, completion
//! outcomes, configuration, and the associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod account;
pub mod chat;
pub mod completion;
pub mod config;
pub mod error;
pub mod notification;
