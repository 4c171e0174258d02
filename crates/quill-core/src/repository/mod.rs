//! Repository trait definitions.
//!
//! These traits define the persistence interface the core needs from the
//! durable store. Implementations live in quill-infra.

pub mod account;
pub mod conversation;
pub mod notification;
