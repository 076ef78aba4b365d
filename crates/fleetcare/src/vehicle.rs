//! Vehicle registry records.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// VIN alphabet: 17 characters, digits and capitals except I, O and Q.
const VIN_PATTERN: &str = r"^[A-HJ-NPR-Z0-9]{17}$";

fn vin_regex() -> &'static Regex {
    static VIN: OnceLock<Regex> = OnceLock::new();
    VIN.get_or_init(|| Regex::new(VIN_PATTERN).expect("VIN pattern is a valid regex"))
}

/// Check whether a string is a well-formed vehicle identification number.
#[must_use]
pub fn is_valid_vin(vin: &str) -> bool {
    vin_regex().is_match(vin)
}

/// A vehicle in the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Manufacturer, e.g. "Toyota".
    pub make: String,

    /// Model name, e.g. "Camry".
    pub model: String,

    /// Model year.
    pub year: u16,

    /// Registration plate. Unique across the fleet.
    pub rego: String,

    /// Vehicle identification number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,

    /// Last recorded odometer reading in km.
    pub odometer: u32,

    /// Name of the person responsible for the vehicle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Vehicle {
    /// Create a new vehicle with no VIN, owner or notes.
    #[must_use]
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        year: u16,
        rego: impl Into<String>,
        odometer: u32,
    ) -> Self {
        Self {
            id: None,
            make: make.into(),
            model: model.into(),
            year,
            rego: rego.into(),
            vin: None,
            odometer,
            owner: None,
            notes: None,
        }
    }

    /// Human-readable label such as "2020 Toyota Camry".
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }

    /// Check the record before it is written.
    ///
    /// VINs are upper-cased before matching; store the normalized form with
    /// [`Vehicle::normalize`].
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank make, model or registration, or a
    /// malformed VIN.
    pub fn validate(&self) -> Result<()> {
        if self.make.trim().is_empty() {
            return Err(Error::validation("make", "must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(Error::validation("model", "must not be empty"));
        }
        if self.rego.trim().is_empty() {
            return Err(Error::validation("rego", "must not be empty"));
        }
        if let Some(vin) = &self.vin {
            if !is_valid_vin(&vin.trim().to_ascii_uppercase()) {
                return Err(Error::validation(
                    "vin",
                    format!("'{vin}' is not a 17-character VIN"),
                ));
            }
        }
        Ok(())
    }

    /// Trim text fields and upper-case the registration and VIN.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.make = self.make.trim().to_string();
        self.model = self.model.trim().to_string();
        self.rego = self.rego.trim().to_ascii_uppercase();
        self.vin = self
            .vin
            .map(|v| v.trim().to_ascii_uppercase())
            .filter(|v| !v.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camry() -> Vehicle {
        Vehicle::new("Toyota", "Camry", 2020, "ABC123", 62_500)
    }

    #[test]
    fn test_display_name() {
        assert_eq!(camry().display_name(), "2020 Toyota Camry");
    }

    #[test]
    fn test_valid_vins() {
        assert!(is_valid_vin("1HGBH41JXMN109186"));
        assert!(is_valid_vin("2HGFC2F59JH123456"));
        assert!(is_valid_vin("1FTFW1ET5KFC12345"));
    }

    #[test]
    fn test_invalid_vins() {
        // Too short
        assert!(!is_valid_vin("1HGBH41JXMN10918"));
        // Contains O
        assert!(!is_valid_vin("1HGBH41JXMNO09186"));
        // Lowercase
        assert!(!is_valid_vin("1hgbh41jxmn109186"));
    }

    #[test]
    fn test_validate_ok() {
        let mut vehicle = camry();
        vehicle.vin = Some("1hgbh41jxmn109186".to_string());
        assert!(vehicle.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let mut vehicle = camry();
        vehicle.make = " ".to_string();
        assert!(matches!(
            vehicle.validate(),
            Err(Error::Validation { field: "make", .. })
        ));

        let mut vehicle = camry();
        vehicle.rego = String::new();
        assert!(matches!(
            vehicle.validate(),
            Err(Error::Validation { field: "rego", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_vin() {
        let mut vehicle = camry();
        vehicle.vin = Some("NOT-A-VIN".to_string());
        assert!(matches!(
            vehicle.validate(),
            Err(Error::Validation { field: "vin", .. })
        ));
    }

    #[test]
    fn test_normalize() {
        let mut vehicle = Vehicle::new(" Honda ", "Civic ", 2018, " xyz789", 43_200);
        vehicle.vin = Some(" 2hgfc2f59jh123456 ".to_string());
        let vehicle = vehicle.normalize();

        assert_eq!(vehicle.make, "Honda");
        assert_eq!(vehicle.model, "Civic");
        assert_eq!(vehicle.rego, "XYZ789");
        assert_eq!(vehicle.vin.as_deref(), Some("2HGFC2F59JH123456"));
    }

    #[test]
    fn test_normalize_drops_empty_vin() {
        let mut vehicle = camry();
        vehicle.vin = Some("   ".to_string());
        assert!(vehicle.normalize().vin.is_none());
    }
}
