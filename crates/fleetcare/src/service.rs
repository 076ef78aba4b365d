//! Scheduled maintenance and service history records.
//!
//! A [`ScheduledService`] is a pending maintenance task for one vehicle with a
//! target date and odometer threshold. Once carried out it becomes a
//! [`ServiceRecord`] in the vehicle's service history.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Storage and input format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the input is not a valid calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| Error::invalid_date(value))
}

/// Author-assigned importance of a scheduled service.
///
/// Ordering follows importance: `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait for a convenient slot.
    Low,
    /// Regular upkeep.
    #[default]
    Medium,
    /// Should be booked first.
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(Error::InvalidPriority(s.to_string())),
        }
    }
}

/// A pending maintenance task for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledService {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// The vehicle this service belongs to.
    pub vehicle_id: i64,

    /// Kind of work, e.g. "Oil Change". Treated as an opaque label.
    pub service_type: String,

    /// Date by which the service should be done.
    pub due_date: NaiveDate,

    /// Odometer reading (km) at which the service falls due.
    pub due_odometer: u32,

    /// Odometer reading (km) last captured for the vehicle.
    pub current_odometer: u32,

    /// Author-assigned priority.
    pub priority: Priority,

    /// Expected cost of the work. Display only.
    pub estimated_cost: f64,

    /// Short description of the work.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ScheduledService {
    /// Create a new scheduled service with no cost, description or notes.
    #[must_use]
    pub fn new(
        vehicle_id: i64,
        service_type: impl Into<String>,
        due_date: NaiveDate,
        due_odometer: u32,
        current_odometer: u32,
        priority: Priority,
    ) -> Self {
        Self {
            id: None,
            vehicle_id,
            service_type: service_type.into(),
            due_date,
            due_odometer,
            current_odometer,
            priority,
            estimated_cost: 0.0,
            description: None,
            notes: None,
        }
    }

    /// Set the estimated cost.
    #[must_use]
    pub fn with_estimated_cost(mut self, cost: f64) -> Self {
        self.estimated_cost = cost;
        self
    }

    /// Set the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Distance left before the odometer threshold; negative once exceeded.
    #[must_use]
    pub fn odometer_remaining(&self) -> i64 {
        i64::from(self.due_odometer) - i64::from(self.current_odometer)
    }

    /// Check the record before it is written.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the service type is blank or the
    /// estimated cost is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.service_type.trim().is_empty() {
            return Err(Error::validation("service_type", "must not be empty"));
        }
        validate_amount("estimated_cost", self.estimated_cost)
    }
}

/// A completed piece of work in a vehicle's service history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// The vehicle that was serviced.
    pub vehicle_id: i64,

    /// Kind of work.
    pub service_type: String,

    /// Date the work was carried out.
    pub date: NaiveDate,

    /// Odometer reading (km) at the time of service.
    pub odometer: u32,

    /// Amount paid.
    pub cost: f64,

    /// What was done.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_done: Option<String>,

    /// Parts that were replaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts_replaced: Option<String>,

    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ServiceRecord {
    /// Create a new history record.
    #[must_use]
    pub fn new(
        vehicle_id: i64,
        service_type: impl Into<String>,
        date: NaiveDate,
        odometer: u32,
        cost: f64,
    ) -> Self {
        Self {
            id: None,
            vehicle_id,
            service_type: service_type.into(),
            date,
            odometer,
            cost,
            work_done: None,
            parts_replaced: None,
            notes: None,
        }
    }

    /// Build the history entry for a scheduled service that has been carried out.
    ///
    /// The odometer is the service's last captured reading. The cost falls back
    /// to the estimate when no actual amount is given.
    #[must_use]
    pub fn from_completed(
        service: &ScheduledService,
        completed_on: NaiveDate,
        actual_cost: Option<f64>,
    ) -> Self {
        Self {
            id: None,
            vehicle_id: service.vehicle_id,
            service_type: service.service_type.clone(),
            date: completed_on,
            odometer: service.current_odometer,
            cost: actual_cost.unwrap_or(service.estimated_cost),
            work_done: service.description.clone(),
            parts_replaced: None,
            notes: service.notes.clone(),
        }
    }

    /// Check the record before it is written.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the service type is blank or the cost is
    /// negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.service_type.trim().is_empty() {
            return Err(Error::validation("service_type", "must not be empty"));
        }
        validate_amount("cost", self.cost)
    }
}

/// Reject negative, NaN and infinite amounts.
pub(crate) fn validate_amount(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(
            field,
            format!("must be a non-negative amount, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_priority_display() {
        assert_eq!(Priority::High.to_string(), "high");
        assert_eq!(Priority::Medium.to_string(), "medium");
        assert_eq!(Priority::Low.to_string(), "low");
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" LOW ".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
    }

    #[test]
    fn test_priority_rejects_unknown() {
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert!(matches!(err, Error::InvalidPriority(ref s) if s == "urgent"));
        assert!("".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_serde_lowercase() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"high\"");
        assert!(serde_json::from_str::<Priority>("\"critical\"").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-02-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
        );
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("15/02/2024").is_err());
    }

    #[test]
    fn test_odometer_remaining() {
        let service = ScheduledService::new(
            1,
            "Oil Change",
            date("2024-02-20"),
            45_000,
            43_450,
            Priority::Medium,
        );
        assert_eq!(service.odometer_remaining(), 1_550);

        let overdue = ScheduledService::new(
            1,
            "Oil Change",
            date("2024-02-20"),
            45_000,
            45_300,
            Priority::Medium,
        );
        assert_eq!(overdue.odometer_remaining(), -300);
    }

    #[test]
    fn test_validate_service() {
        let service = ScheduledService::new(
            1,
            "Tire Rotation",
            date("2024-01-25"),
            55_000,
            54_800,
            Priority::Low,
        )
        .with_estimated_cost(60.0);
        assert!(service.validate().is_ok());

        let blank = ScheduledService {
            service_type: "  ".to_string(),
            ..service.clone()
        };
        assert!(blank.validate().is_err());

        let negative = service.clone().with_estimated_cost(-1.0);
        assert!(negative.validate().is_err());

        let nan = service.with_estimated_cost(f64::NAN);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_record_from_completed_uses_estimate() {
        let service = ScheduledService::new(
            2,
            "Major Service",
            date("2024-02-15"),
            65_000,
            62_800,
            Priority::High,
        )
        .with_estimated_cost(350.0)
        .with_description("Comprehensive inspection")
        .with_notes("Includes oil change");

        let record = ServiceRecord::from_completed(&service, date("2024-02-12"), None);
        assert_eq!(record.vehicle_id, 2);
        assert_eq!(record.odometer, 62_800);
        assert!((record.cost - 350.0).abs() < f64::EPSILON);
        assert_eq!(record.work_done.as_deref(), Some("Comprehensive inspection"));
        assert_eq!(record.notes.as_deref(), Some("Includes oil change"));
    }

    #[test]
    fn test_record_from_completed_uses_actual_cost() {
        let service = ScheduledService::new(
            2,
            "Major Service",
            date("2024-02-15"),
            65_000,
            62_800,
            Priority::High,
        )
        .with_estimated_cost(350.0);

        let record = ServiceRecord::from_completed(&service, date("2024-02-12"), Some(412.5));
        assert!((record.cost - 412.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_service_serialization_skips_empty_fields() {
        let service = ScheduledService::new(
            1,
            "Oil Change",
            date("2024-02-20"),
            45_000,
            43_450,
            Priority::Medium,
        );
        let json = serde_json::to_string(&service).unwrap();
        assert!(json.contains("\"due_date\":\"2024-02-20\""));
        assert!(json.contains("\"priority\":\"medium\""));
        assert!(!json.contains("notes"));
        assert!(!json.contains("\"id\""));
    }
}
