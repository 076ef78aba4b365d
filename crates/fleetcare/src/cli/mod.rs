//! Command-line interface for fleetcare.
//!
//! This module provides the CLI structure and the output formatting used by
//! the `fleetcare` binary.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, FuelCommand, HistoryCommand, OutputFormat, PriorityArg, ServiceCommand,
    ServiceListCommand, StatusCommand, VehicleCommand,
};
pub use output::Presenter;

/// fleetcare - Keep your vehicles serviced on time
///
/// Tracks vehicles, scheduled maintenance, service history and fuel use, and
/// flags services that are overdue or due soon by date or by odometer.
#[derive(Debug, Parser)]
#[command(name = "fleetcare")]
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
    /// Manage registered vehicles
    #[command(subcommand)]
    Vehicle(VehicleCommand),

    /// Schedule, list and complete maintenance
    #[command(subcommand)]
    Service(ServiceCommand),

    /// Browse the service history
    #[command(subcommand)]
    History(HistoryCommand),

    /// Record fill-ups and fuel economy
    #[command(subcommand)]
    Fuel(FuelCommand),

    /// Show fleet totals and due counts
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
