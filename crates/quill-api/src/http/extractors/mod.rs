//! Request extractors: admin API key and caller identity.

pub mod auth;
pub mod identity;
