//! Business logic and repository trait definitions for Quill.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the credit-metered exchange pipeline and the live
//! notification fanout. It depends only on `quill-types` -- never on
//! `quill-infra` or any database/IO crate.

pub mod chat;
pub mod ledger;
pub mod live;
pub mod llm;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;
