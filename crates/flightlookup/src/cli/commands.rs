//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.addr`)
    #[arg(short, long, value_name = "ADDR")]
    pub addr: Option<SocketAddr>,
}

/// Where one-shot queries are answered.
#[derive(Debug, Clone, Args)]
pub struct BackendArgs {
    /// Query a running server instead of looking up in-process
    #[arg(short, long, value_name = "URL")]
    pub server: Option<String>,
}

/// Flights command arguments.
///
/// With `--number` an exact flight-number lookup runs; with `--date`,
/// `--from` and `--to` a route lookup runs; with neither, the mock catalog
/// is listed.
#[derive(Debug, Args)]
pub struct FlightsCommand {
    /// Flight number, e.g. AA123
    #[arg(short, long, conflicts_with_all = ["date", "from", "to"])]
    pub number: Option<String>,

    /// Flight date, YYYY-MM-DD
    #[arg(short, long)]
    pub date: Option<String>,

    /// Departure airport code
    #[arg(long)]
    pub from: Option<String>,

    /// Arrival airport code
    #[arg(long)]
    pub to: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Backend selection.
    #[command(flatten)]
    pub backend: BackendArgs,
}

/// Airports command arguments.
#[derive(Debug, Args)]
pub struct AirportsCommand {
    /// Text to match against code, name or city (at least 2 characters)
    pub query: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Backend selection.
    #[command(flatten)]
    pub backend: BackendArgs,
}

/// Lookup command arguments.
#[derive(Debug, Args)]
pub struct LookupCommand {
    /// Backend selection.
    #[command(flatten)]
    pub backend: BackendArgs,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Ask a running server instead of reading local configuration
    #[arg(short, long, value_name = "URL")]
    pub server: Option<String>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration (the access key is redacted)
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}
