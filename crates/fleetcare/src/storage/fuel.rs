//! Fuel log persistence.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{date_column, date_param, Storage};
use crate::error::Result;
use crate::fuel::{fuel_economy, FuelLog};

const FUEL_COLUMNS: &str =
    "id, vehicle_id, date, odometer, litres, cost, fuel_type, notes, economy";

impl Storage {
    /// Record a fill-up.
    ///
    /// The economy figure is computed against the vehicle's fill-up with the
    /// highest odometer reading below this one. Returns the stored log with
    /// its id and economy filled in.
    ///
    /// # Errors
    ///
    /// Returns an error if the log is invalid, the vehicle does not exist, or
    /// the database operation fails.
    pub fn insert_fuel_log(&self, log: &FuelLog) -> Result<FuelLog> {
        log.validate()?;
        self.require_vehicle(log.vehicle_id)?;

        let previous: Option<u32> = self
            .conn
            .query_row(
                r"
                SELECT odometer FROM fuel_logs
                WHERE vehicle_id = ?1 AND odometer < ?2
                ORDER BY odometer DESC LIMIT 1
                ",
                params![log.vehicle_id, log.odometer],
                |row| row.get(0),
            )
            .optional()?;

        let economy = previous.and_then(|prev| fuel_economy(log.odometer, prev, log.litres));

        self.conn.execute(
            r"
            INSERT INTO fuel_logs
                (vehicle_id, date, odometer, litres, cost, fuel_type, notes, economy)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                log.vehicle_id,
                date_param(log.date),
                log.odometer,
                log.litres,
                log.cost,
                log.fuel_type.trim(),
                log.notes,
                economy,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "Fuel log {} for vehicle {}: {} L at {} km, economy {:?}",
            id, log.vehicle_id, log.litres, log.odometer, economy
        );

        Ok(FuelLog {
            id: Some(id),
            fuel_type: log.fuel_type.trim().to_string(),
            economy,
            ..log.clone()
        })
    }

    /// Fuel logs, newest first, optionally for one vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn fuel_logs(&self, vehicle_id: Option<i64>, limit: usize) -> Result<Vec<FuelLog>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FUEL_COLUMNS} FROM fuel_logs \
             WHERE (?1 IS NULL OR vehicle_id = ?1) \
             ORDER BY date DESC, odometer DESC LIMIT ?2"
        ))?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let logs = stmt
            .query_map(params![vehicle_id, limit_i64], row_to_fuel_log)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(logs)
    }

    /// Delete a fuel log.
    ///
    /// Economy figures already stored on later fill-ups are left as they are.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_fuel_log(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM fuel_logs WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }
}

fn row_to_fuel_log(row: &rusqlite::Row) -> rusqlite::Result<FuelLog> {
    Ok(FuelLog {
        id: Some(row.get(0)?),
        vehicle_id: row.get(1)?,
        date: date_column(row, 2)?,
        odometer: row.get(3)?,
        litres: row.get(4)?,
        cost: row.get(5)?,
        fuel_type: row.get(6)?,
        notes: row.get(7)?,
        economy: row.get(8)?,
    })
}
