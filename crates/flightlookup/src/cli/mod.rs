//! Command-line interface for flightlookup.
//!
//! This module provides the CLI structure and command handlers for the
//! `flightlookup` binary.

mod commands;
pub mod repl;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AirportsCommand, BackendArgs, ConfigCommand, FlightsCommand, LookupCommand, ServeCommand,
    StatusCommand,
};

/// flightlookup - Flight status and airport lookup
///
/// Serves flight-number and route lookups over HTTP, backed by a live flight
/// data provider or a built-in mock dataset, and offers an interactive
/// lookup session with debounced suggestions.
#[derive(Debug, Parser)]
#[command(name = "flightlookup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP lookup server
    Serve(ServeCommand),

    /// Look up flights by number or route
    Flights(FlightsCommand),

    /// Search airports
    Airports(AirportsCommand),

    /// Start an interactive lookup session
    Lookup(LookupCommand),

    /// Show provider configuration status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
