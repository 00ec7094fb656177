pub mod lambda;
pub mod send;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A3S LogRoute - severity-routed log fan-out
#[derive(Debug, Parser)]
#[command(name = "a3s-logroute", version, about)]
pub struct Cli {
    /// TOML config file (defaults apply when absent)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP ingest server
    Serve {
        /// Host address to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run as a Lambda function handler
    Lambda,

    /// Send one log event to a running router
    Send {
        /// Router ingest URL
        #[arg(long, default_value = "http://127.0.0.1:8088/logs")]
        url: String,

        /// Severity tag (INFO, DEBUG, WARNING, ERROR, CRITICAL)
        #[arg(long, default_value = "INFO")]
        level: String,

        #[arg(long)]
        message: String,

        /// Supplementary context (defaults to the message)
        #[arg(long)]
        details: Option<String>,

        /// Originating application
        #[arg(long)]
        source: String,
    },
}
