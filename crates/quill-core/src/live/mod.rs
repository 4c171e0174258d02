//! Live notification fanout.
//!
//! - `registry`: account -> live session routing table
//! - `bus`: broadcast channel every connected session subscribes to
//! - `dispatcher`: persist a notification, then push it live

pub mod bus;
pub mod dispatcher;
pub mod registry;
