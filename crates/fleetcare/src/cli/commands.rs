//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::service::{parse_date, Priority};

/// Vehicle registry commands.
#[derive(Debug, Subcommand)]
pub enum VehicleCommand {
    /// Register a vehicle
    Add {
        /// Manufacturer, e.g. "Toyota"
        make: String,

        /// Model, e.g. "Camry"
        model: String,

        /// Model year
        year: u16,

        /// Registration plate
        rego: String,

        /// 17-character vehicle identification number
        #[arg(long)]
        vin: Option<String>,

        /// Current odometer reading in km
        #[arg(short, long, default_value = "0")]
        odometer: u32,

        /// Registered owner
        #[arg(long)]
        owner: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List registered vehicles
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one vehicle with its pending services
    Show {
        /// Vehicle registration or id
        vehicle: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Change vehicle details
    Update {
        /// Vehicle registration or id
        vehicle: String,

        /// New manufacturer
        #[arg(long)]
        make: Option<String>,

        /// New model
        #[arg(long)]
        model: Option<String>,

        /// New model year
        #[arg(long)]
        year: Option<u16>,

        /// New registration plate
        #[arg(long)]
        rego: Option<String>,

        /// New VIN
        #[arg(long)]
        vin: Option<String>,

        /// New owner
        #[arg(long)]
        owner: Option<String>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Remove a vehicle together with its services, history and fuel logs
    Remove {
        /// Vehicle registration or id
        vehicle: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Record a new odometer reading
    Odometer {
        /// Vehicle registration or id
        vehicle: String,

        /// Reading in km
        reading: u32,
    },
}

/// Scheduled service commands.
#[derive(Debug, Subcommand)]
pub enum ServiceCommand {
    /// Schedule a service
    Schedule {
        /// Vehicle registration or id
        vehicle: String,

        /// Kind of work, e.g. "Oil Change"
        service_type: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        due: NaiveDate,

        /// Odometer reading at which the service is due
        #[arg(long)]
        due_odometer: u32,

        /// Current odometer (defaults to the vehicle's recorded reading)
        #[arg(long)]
        current_odometer: Option<u32>,

        /// Priority
        #[arg(short, long, value_enum, default_value = "medium")]
        priority: PriorityArg,

        /// Estimated cost
        #[arg(long, default_value = "0")]
        cost: f64,

        /// Description of the work
        #[arg(short, long)]
        description: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List pending services, most urgent first
    List(ServiceListCommand),

    /// Change a scheduled service
    Edit {
        /// Scheduled service id
        id: i64,

        /// New kind of work
        #[arg(long)]
        service_type: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        due: Option<NaiveDate>,

        /// New due odometer
        #[arg(long)]
        due_odometer: Option<u32>,

        /// New current odometer
        #[arg(long)]
        current_odometer: Option<u32>,

        /// New priority
        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,

        /// New estimated cost
        #[arg(long)]
        cost: Option<f64>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Mark a service as done and move it to the history
    Complete {
        /// Scheduled service id
        id: i64,

        /// Completion date (YYYY-MM-DD, defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Actual cost (defaults to the estimate)
        #[arg(long)]
        cost: Option<f64>,
    },

    /// Remove a scheduled service without recording history
    Remove {
        /// Scheduled service id
        id: i64,
    },
}

/// Arguments for listing pending services.
#[derive(Debug, Args)]
pub struct ServiceListCommand {
    /// Only services for this vehicle (registration or id)
    #[arg(long)]
    pub vehicle: Option<String>,

    /// Evaluate as of this date instead of today (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub today: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Service history commands.
#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List completed services, newest first
    List {
        /// Only entries for this vehicle (registration or id)
        #[arg(long)]
        vehicle: Option<String>,

        /// Maximum number of entries
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Log a service carried out outside the schedule
    Add {
        /// Vehicle registration or id
        vehicle: String,

        /// Kind of work
        service_type: String,

        /// Date of the service (YYYY-MM-DD, defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Odometer at the time (defaults to the vehicle's recorded reading)
        #[arg(short, long)]
        odometer: Option<u32>,

        /// Amount paid
        #[arg(long, default_value = "0")]
        cost: f64,

        /// Description of the work done
        #[arg(long)]
        work_done: Option<String>,

        /// Parts that were replaced
        #[arg(long)]
        parts: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a history entry
    Remove {
        /// History entry id
        id: i64,
    },
}

/// Fuel log commands.
#[derive(Debug, Subcommand)]
pub enum FuelCommand {
    /// Record a fill-up
    Add {
        /// Vehicle registration or id
        vehicle: String,

        /// Litres purchased
        #[arg(short, long)]
        litres: f64,

        /// Amount paid
        #[arg(long)]
        cost: f64,

        /// Odometer at the pump (defaults to the vehicle's recorded reading)
        #[arg(short, long)]
        odometer: Option<u32>,

        /// Date of the fill-up (YYYY-MM-DD, defaults to today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Fuel grade
        #[arg(short = 't', long, default_value = "Regular")]
        fuel_type: String,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List fill-ups, newest first
    List {
        /// Only fill-ups for this vehicle (registration or id)
        #[arg(long)]
        vehicle: Option<String>,

        /// Maximum number of entries
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show fuel totals and average economy
    Stats {
        /// Only fill-ups for this vehicle (registration or id)
        #[arg(long)]
        vehicle: Option<String>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Evaluate as of this date instead of today (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub today: Option<NaiveDate>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Priority argument for scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    /// Can wait
    Low,
    /// Regular upkeep
    Medium,
    /// Book first
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Self::Low,
            PriorityArg::Medium => Self::Medium,
            PriorityArg::High => Self::High,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}
