//! Scheduled services and service history.

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{date_column, date_param, Storage};
use crate::error::{Error, Result};
use crate::repository::ServiceRepository;
use crate::service::{Priority, ScheduledService, ServiceRecord};

const SERVICE_COLUMNS: &str = "id, vehicle_id, service_type, due_date, due_odometer, \
     current_odometer, priority, estimated_cost, description, notes";

const RECORD_COLUMNS: &str =
    "id, vehicle_id, service_type, date, odometer, cost, work_done, parts_replaced, notes";

impl ServiceRepository for Storage {
    fn insert_service(&self, service: &ScheduledService) -> Result<i64> {
        service.validate()?;
        self.require_vehicle(service.vehicle_id)?;

        self.conn.execute(
            r"
            INSERT INTO scheduled_services
                (vehicle_id, service_type, due_date, due_odometer, current_odometer,
                 priority, estimated_cost, description, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
            params![
                service.vehicle_id,
                service.service_type.trim(),
                date_param(service.due_date),
                service.due_odometer,
                service.current_odometer,
                service.priority.to_string(),
                service.estimated_cost,
                service.description,
                service.notes,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!(
            "Scheduled {} for vehicle {} due {} as id {}",
            service.service_type, service.vehicle_id, service.due_date, id
        );
        Ok(id)
    }

    fn get_service(&self, id: i64) -> Result<Option<ScheduledService>> {
        fetch_service(&self.conn, id)
    }

    fn update_service(&self, service: &ScheduledService) -> Result<bool> {
        let id = service
            .id
            .ok_or_else(|| Error::validation("id", "scheduled service has no id"))?;
        service.validate()?;
        self.require_vehicle(service.vehicle_id)?;

        let affected = self.conn.execute(
            r"
            UPDATE scheduled_services
            SET vehicle_id = ?2, service_type = ?3, due_date = ?4, due_odometer = ?5,
                current_odometer = ?6, priority = ?7, estimated_cost = ?8,
                description = ?9, notes = ?10
            WHERE id = ?1
            ",
            params![
                id,
                service.vehicle_id,
                service.service_type.trim(),
                date_param(service.due_date),
                service.due_odometer,
                service.current_odometer,
                service.priority.to_string(),
                service.estimated_cost,
                service.description,
                service.notes,
            ],
        )?;
        Ok(affected > 0)
    }

    fn delete_service(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM scheduled_services WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    fn pending_services(&self, vehicle_id: Option<i64>) -> Result<Vec<ScheduledService>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SERVICE_COLUMNS} FROM scheduled_services \
             WHERE (?1 IS NULL OR vehicle_id = ?1) ORDER BY id"
        ))?;

        let services = stmt
            .query_map([vehicle_id], row_to_service)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(services)
    }
}

impl Storage {
    /// Mark a scheduled service as done.
    ///
    /// Writes a [`ServiceRecord`] into the history and removes the scheduled
    /// service in one transaction. Returns the new history record id, or
    /// `None` if no scheduled service has that id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a negative `actual_cost`, or a database
    /// error.
    pub fn complete_service(
        &self,
        id: i64,
        completed_on: NaiveDate,
        actual_cost: Option<f64>,
    ) -> Result<Option<i64>> {
        let tx = self.conn.unchecked_transaction()?;

        let Some(service) = fetch_service(&tx, id)? else {
            return Ok(None);
        };

        let record = ServiceRecord::from_completed(&service, completed_on, actual_cost);
        record.validate()?;
        let record_id = insert_record(&tx, &record)?;
        tx.execute("DELETE FROM scheduled_services WHERE id = ?1", [id])?;
        tx.commit()?;

        info!(
            "Completed {} for vehicle {} on {} (history id {})",
            record.service_type, record.vehicle_id, completed_on, record_id
        );
        Ok(Some(record_id))
    }

    /// Add an entry to the service history directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is invalid, the vehicle does not exist,
    /// or the database operation fails.
    pub fn insert_service_record(&self, record: &ServiceRecord) -> Result<i64> {
        record.validate()?;
        self.require_vehicle(record.vehicle_id)?;
        insert_record(&self.conn, record)
    }

    /// Service history, newest first, optionally for one vehicle.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn service_history(
        &self,
        vehicle_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<ServiceRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM service_records \
             WHERE (?1 IS NULL OR vehicle_id = ?1) \
             ORDER BY date DESC, id DESC LIMIT ?2"
        ))?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let records = stmt
            .query_map(params![vehicle_id, limit_i64], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Delete a history entry.
    ///
    /// Returns `true` if an entry was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_service_record(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM service_records WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }
}

fn fetch_service(conn: &Connection, id: i64) -> Result<Option<ScheduledService>> {
    let result = conn
        .query_row(
            &format!("SELECT {SERVICE_COLUMNS} FROM scheduled_services WHERE id = ?1"),
            [id],
            row_to_service,
        )
        .optional()?;
    Ok(result)
}

fn insert_record(conn: &Connection, record: &ServiceRecord) -> Result<i64> {
    conn.execute(
        r"
        INSERT INTO service_records
            (vehicle_id, service_type, date, odometer, cost, work_done, parts_replaced, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ",
        params![
            record.vehicle_id,
            record.service_type.trim(),
            date_param(record.date),
            record.odometer,
            record.cost,
            record.work_done,
            record.parts_replaced,
            record.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Convert a database row to a `ScheduledService`.
///
/// Unknown priority labels are a conversion error rather than a default.
fn row_to_service(row: &rusqlite::Row) -> rusqlite::Result<ScheduledService> {
    let priority_str: String = row.get(6)?;
    let priority = priority_str.parse::<Priority>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            Type::Text,
            format!("unknown priority: {priority_str}").into(),
        )
    })?;

    Ok(ScheduledService {
        id: Some(row.get(0)?),
        vehicle_id: row.get(1)?,
        service_type: row.get(2)?,
        due_date: date_column(row, 3)?,
        due_odometer: row.get(4)?,
        current_odometer: row.get(5)?,
        priority,
        estimated_cost: row.get(7)?,
        description: row.get(8)?,
        notes: row.get(9)?,
    })
}

/// Convert a database row to a `ServiceRecord`.
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ServiceRecord> {
    Ok(ServiceRecord {
        id: Some(row.get(0)?),
        vehicle_id: row.get(1)?,
        service_type: row.get(2)?,
        date: date_column(row, 3)?,
        odometer: row.get(4)?,
        cost: row.get(5)?,
        work_done: row.get(6)?,
        parts_replaced: row.get(7)?,
        notes: row.get(8)?,
    })
}
