//! CLI command definitions for the `quill` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod notify;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Credit-metered chat exchange server with live notifications.
#[derive(Parser)]
#[command(name = "quill", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "QUILL_LOG_JSON")]
    pub log_json: bool,

    /// Export spans to stdout via OpenTelemetry.
    #[arg(long, global = true, env = "QUILL_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API and live notification server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000", env = "QUILL_PORT")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1", env = "QUILL_HOST")]
        host: String,
    },

    /// Store a notification without live delivery.
    Notify {
        #[command(subcommand)]
        target: notify::NotifyTarget,
    },

    /// Show configuration and storage counts.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
