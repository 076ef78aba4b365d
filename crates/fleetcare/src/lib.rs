//! `fleetcare` - Vehicle fleet maintenance tracking
//!
//! This library keeps a registry of vehicles with their scheduled services,
//! service history and fuel logs, and evaluates which services are overdue or
//! due soon.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod fuel;
pub mod logging;
pub mod repository;
pub mod service;
pub mod storage;
pub mod vehicle;

pub use config::Config;
pub use error::{Error, Result};
pub use evaluator::{DueSummary, Evaluation, Evaluator, ProgressMode, ServiceStatus};
pub use fuel::{FuelLog, FuelStats};
pub use logging::init_logging;
pub use repository::{evaluate_pending, ServiceRepository};
pub use service::{Priority, ScheduledService, ServiceRecord};
pub use storage::{FleetSummary, Storage};
pub use vehicle::Vehicle;
