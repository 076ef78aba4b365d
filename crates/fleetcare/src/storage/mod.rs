//! Storage layer for fleetcare.
//!
//! This module provides `SQLite`-based persistent storage for the vehicle
//! registry, scheduled services, service history and fuel logs.

mod fuel;
pub mod migrations;
pub mod schema;
mod services;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::service::DATE_FORMAT;
use crate::vehicle::Vehicle;

/// Column list shared by every vehicle query.
const VEHICLE_COLUMNS: &str = "id, make, model, year, rego, vin, odometer, owner, notes";

/// Storage engine for fleet records.
///
/// Provides persistent storage using `SQLite` with support for:
/// - Vehicle registration with unique registrations
/// - Scheduled services (see [`crate::ServiceRepository`])
/// - Completed-service history
/// - Fuel logs with economy computed on insert
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;

        migrations::initialize_schema(&conn)?;

        debug!("Database ready at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // === Vehicles ===

    /// Register a vehicle.
    ///
    /// The record is validated and normalized first; the registration must
    /// not already be in use.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or a duplicate registration,
    /// or a database error.
    pub fn insert_vehicle(&self, vehicle: &Vehicle) -> Result<i64> {
        vehicle.validate()?;
        let vehicle = vehicle.clone().normalize();

        if self.rego_in_use(&vehicle.rego, None)? {
            return Err(Error::validation(
                "rego",
                format!("{} is already registered", vehicle.rego),
            ));
        }

        self.conn.execute(
            r"
            INSERT INTO vehicles (make, model, year, rego, vin, odometer, owner, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                vehicle.make,
                vehicle.model,
                vehicle.year,
                vehicle.rego,
                vehicle.vin,
                vehicle.odometer,
                vehicle.owner,
                vehicle.notes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Registered vehicle {} ({}) as id {}", vehicle.display_name(), vehicle.rego, id);
        Ok(id)
    }

    /// Check whether a registration belongs to a vehicle other than `exclude`.
    fn rego_in_use(&self, rego: &str, exclude: Option<i64>) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM vehicles WHERE rego = ?1 AND (?2 IS NULL OR id != ?2)",
            params![rego, exclude],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get a vehicle by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_vehicle(&self, id: i64) -> Result<Option<Vehicle>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ?1"),
                [id],
                Self::row_to_vehicle,
            )
            .optional()?;
        Ok(result)
    }

    /// Get a vehicle by registration (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_vehicle_by_rego(&self, rego: &str) -> Result<Option<Vehicle>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE rego = ?1"),
                [rego.trim().to_ascii_uppercase()],
                Self::row_to_vehicle,
            )
            .optional()?;
        Ok(result)
    }

    /// Get a vehicle or fail with [`Error::VehicleNotFound`].
    ///
    /// # Errors
    ///
    /// Returns an error if the vehicle does not exist or the query fails.
    pub fn require_vehicle(&self, id: i64) -> Result<Vehicle> {
        self.get_vehicle(id)?.ok_or(Error::VehicleNotFound(id))
    }

    /// List all vehicles in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY id"))?;

        let vehicles = stmt
            .query_map([], Self::row_to_vehicle)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(vehicles)
    }

    /// Replace a stored vehicle, matched by its id.
    ///
    /// Returns `false` if no vehicle has that id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, a missing id, or a registration
    /// that belongs to another vehicle; or a database error.
    pub fn update_vehicle(&self, vehicle: &Vehicle) -> Result<bool> {
        let id = vehicle
            .id
            .ok_or_else(|| Error::validation("id", "vehicle has no id"))?;
        vehicle.validate()?;
        let vehicle = vehicle.clone().normalize();

        if self.rego_in_use(&vehicle.rego, Some(id))? {
            return Err(Error::validation(
                "rego",
                format!("{} is already registered", vehicle.rego),
            ));
        }

        let affected = self.conn.execute(
            r"
            UPDATE vehicles
            SET make = ?2, model = ?3, year = ?4, rego = ?5, vin = ?6,
                odometer = ?7, owner = ?8, notes = ?9
            WHERE id = ?1
            ",
            params![
                id,
                vehicle.make,
                vehicle.model,
                vehicle.year,
                vehicle.rego,
                vehicle.vin,
                vehicle.odometer,
                vehicle.owner,
                vehicle.notes,
            ],
        )?;
        Ok(affected > 0)
    }

    /// Delete a vehicle and everything recorded against it.
    ///
    /// Returns `true` if a vehicle was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_vehicle(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM vehicles WHERE id = ?1", [id])?;
        if affected > 0 {
            debug!("Deleted vehicle {} and its records", id);
        }
        Ok(affected > 0)
    }

    /// Record a new odometer reading for a vehicle.
    ///
    /// The reading becomes the `current_odometer` of every pending service for
    /// that vehicle. Returns the number of services updated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VehicleNotFound`] for an unknown vehicle,
    /// [`Error::OdometerRollback`] if the reading is below the recorded one, or
    /// a database error.
    pub fn record_odometer(&self, vehicle_id: i64, reading: u32) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;

        let recorded: Option<u32> = tx
            .query_row(
                "SELECT odometer FROM vehicles WHERE id = ?1",
                [vehicle_id],
                |row| row.get(0),
            )
            .optional()?;
        let recorded = recorded.ok_or(Error::VehicleNotFound(vehicle_id))?;

        if reading < recorded {
            return Err(Error::OdometerRollback {
                vehicle_id,
                recorded,
                reading,
            });
        }

        tx.execute(
            "UPDATE vehicles SET odometer = ?2 WHERE id = ?1",
            params![vehicle_id, reading],
        )?;
        let updated = tx.execute(
            "UPDATE scheduled_services SET current_odometer = ?2 WHERE vehicle_id = ?1",
            params![vehicle_id, reading],
        )?;
        tx.commit()?;

        debug!(
            "Vehicle {} odometer {} -> {} km, {} pending services updated",
            vehicle_id, recorded, reading, updated
        );
        Ok(updated)
    }

    // === Summary ===

    /// Get fleet-wide totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn fleet_summary(&self) -> Result<FleetSummary> {
        let count = |sql: &str| -> Result<i64> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };
        let total = |sql: &str| -> Result<f64> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(FleetSummary {
            vehicles: count("SELECT COUNT(*) FROM vehicles")?,
            pending_services: count("SELECT COUNT(*) FROM scheduled_services")?,
            service_records: count("SELECT COUNT(*) FROM service_records")?,
            fuel_logs: count("SELECT COUNT(*) FROM fuel_logs")?,
            total_service_cost: total("SELECT COALESCE(SUM(cost), 0.0) FROM service_records")?,
            total_fuel_cost: total("SELECT COALESCE(SUM(cost), 0.0) FROM fuel_logs")?,
            db_size_bytes,
        })
    }

    /// Convert a database row to a Vehicle struct.
    fn row_to_vehicle(row: &rusqlite::Row) -> rusqlite::Result<Vehicle> {
        Ok(Vehicle {
            id: Some(row.get(0)?),
            make: row.get(1)?,
            model: row.get(2)?,
            year: row.get(3)?,
            rego: row.get(4)?,
            vin: row.get(5)?,
            odometer: row.get(6)?,
            owner: row.get(7)?,
            notes: row.get(8)?,
        })
    }
}

/// Read a `YYYY-MM-DD` text column.
fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Format a date for storage.
fn date_param(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Fleet-wide totals, as shown on the status screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleetSummary {
    /// Registered vehicles.
    pub vehicles: i64,
    /// Scheduled services not yet completed.
    pub pending_services: i64,
    /// Entries in the service history.
    pub service_records: i64,
    /// Recorded fill-ups.
    pub fuel_logs: i64,
    /// Amount spent on completed services.
    pub total_service_cost: f64,
    /// Amount spent on fuel.
    pub total_fuel_cost: f64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
