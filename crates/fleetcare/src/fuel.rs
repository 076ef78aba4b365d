//! Fuel logs and fuel-economy arithmetic.
//!
//! Economy is expressed in litres per 100 km, computed from the distance
//! driven since the vehicle's previous fill-up.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::service::validate_amount;

/// Fuel consumption in litres per 100 km between two odometer readings.
///
/// Returns `None` when the distance is zero or negative, which happens for the
/// first fill-up of a vehicle or an out-of-order entry.
#[must_use]
pub fn fuel_economy(current_odometer: u32, previous_odometer: u32, litres: f64) -> Option<f64> {
    let distance = i64::from(current_odometer) - i64::from(previous_odometer);
    if distance <= 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let distance = distance as f64;
    Some(litres / distance * 100.0)
}

/// A single fill-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelLog {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// The vehicle that was filled.
    pub vehicle_id: i64,

    /// Date of the fill-up.
    pub date: NaiveDate,

    /// Odometer reading (km) at the pump.
    pub odometer: u32,

    /// Volume purchased.
    pub litres: f64,

    /// Amount paid.
    pub cost: f64,

    /// Grade of fuel, e.g. "Regular", "Premium", "Diesel".
    pub fuel_type: String,

    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Litres per 100 km since the previous fill-up, filled in by storage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub economy: Option<f64>,
}

impl FuelLog {
    /// Create a new fuel log with no notes and no economy figure.
    #[must_use]
    pub fn new(
        vehicle_id: i64,
        date: NaiveDate,
        odometer: u32,
        litres: f64,
        cost: f64,
        fuel_type: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            vehicle_id,
            date,
            odometer,
            litres,
            cost,
            fuel_type: fuel_type.into(),
            notes: None,
            economy: None,
        }
    }

    /// Price paid per litre, if any fuel was purchased.
    #[must_use]
    pub fn price_per_litre(&self) -> Option<f64> {
        (self.litres > 0.0).then(|| self.cost / self.litres)
    }

    /// Check the record before it is written.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the volume is not positive, the cost is
    /// negative, or the fuel type is blank.
    pub fn validate(&self) -> Result<()> {
        if !self.litres.is_finite() || self.litres <= 0.0 {
            return Err(Error::validation(
                "litres",
                format!("must be greater than 0, got {}", self.litres),
            ));
        }
        validate_amount("cost", self.cost)?;
        if self.fuel_type.trim().is_empty() {
            return Err(Error::validation("fuel_type", "must not be empty"));
        }
        Ok(())
    }
}

/// Totals across a set of fuel logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FuelStats {
    /// Number of fill-ups.
    pub fill_ups: usize,
    /// Total litres purchased.
    pub total_litres: f64,
    /// Total amount paid.
    pub total_cost: f64,
    /// Mean economy over the logs that have one.
    pub average_economy: Option<f64>,
}

impl FuelStats {
    /// Aggregate the given logs.
    #[must_use]
    pub fn from_logs(logs: &[FuelLog]) -> Self {
        let total_litres = logs.iter().map(|log| log.litres).sum();
        let total_cost = logs.iter().map(|log| log.cost).sum();

        let economies: Vec<f64> = logs.iter().filter_map(|log| log.economy).collect();
        #[allow(clippy::cast_precision_loss)]
        let average_economy = (!economies.is_empty())
            .then(|| economies.iter().sum::<f64>() / economies.len() as f64);

        Self {
            fill_ups: logs.len(),
            total_litres,
            total_cost,
            average_economy,
        }
    }
}
