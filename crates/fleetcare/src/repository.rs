//! Access to scheduled services.
//!
//! The evaluator never reads storage directly. Callers take a snapshot of the
//! pending services through [`ServiceRepository`] and hand it over.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::Result;
use crate::evaluator::{Evaluation, Evaluator};
use crate::service::ScheduledService;

/// Create, read, update and delete operations over scheduled services.
pub trait ServiceRepository {
    /// Store a new scheduled service and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is invalid, the vehicle does not exist,
    /// or the backend fails.
    fn insert_service(&self, service: &ScheduledService) -> Result<i64>;

    /// Fetch one scheduled service.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_service(&self, id: i64) -> Result<Option<ScheduledService>>;

    /// Replace a stored service with `service`, matched by its id.
    ///
    /// Returns `false` if no service has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is invalid or has no id, or the backend
    /// fails.
    fn update_service(&self, service: &ScheduledService) -> Result<bool>;

    /// Remove a scheduled service without recording any history.
    ///
    /// Returns `false` if no service has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete_service(&self, id: i64) -> Result<bool>;

    /// All pending services, optionally for one vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn pending_services(&self, vehicle_id: Option<i64>) -> Result<Vec<ScheduledService>>;
}

/// Load the pending services and evaluate them as of `today`.
///
/// # Errors
///
/// Returns an error if the repository cannot be read.
pub fn evaluate_pending<R>(
    repo: &R,
    evaluator: &Evaluator,
    vehicle_id: Option<i64>,
    today: NaiveDate,
) -> Result<Vec<Evaluation>>
where
    R: ServiceRepository + ?Sized,
{
    let snapshot = repo.pending_services(vehicle_id)?;
    debug!("Evaluating {} pending services as of {}", snapshot.len(), today);
    Ok(evaluator.evaluate(snapshot, today))
}
