//! `SQLite` schema definitions for fleetcare.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema. Dates are stored as `YYYY-MM-DD` text.

/// SQL statement to create the vehicles table.
pub const CREATE_VEHICLES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS vehicles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    make TEXT NOT NULL,
    model TEXT NOT NULL,
    year INTEGER NOT NULL,
    rego TEXT NOT NULL UNIQUE,
    vin TEXT,
    odometer INTEGER NOT NULL DEFAULT 0 CHECK (odometer >= 0),
    owner TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the scheduled services table.
pub const CREATE_SCHEDULED_SERVICES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS scheduled_services (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id INTEGER NOT NULL REFERENCES vehicles(id) ON DELETE CASCADE,
    service_type TEXT NOT NULL,
    due_date TEXT NOT NULL,
    due_odometer INTEGER NOT NULL CHECK (due_odometer >= 0),
    current_odometer INTEGER NOT NULL CHECK (current_odometer >= 0),
    priority TEXT NOT NULL CHECK (priority IN ('high', 'medium', 'low')),
    estimated_cost REAL NOT NULL DEFAULT 0,
    description TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create an index on `vehicle_id` for scheduled services.
pub const CREATE_SCHEDULED_VEHICLE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_scheduled_vehicle ON scheduled_services(vehicle_id)
";

/// SQL statement to create the service history table.
pub const CREATE_SERVICE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS service_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id INTEGER NOT NULL REFERENCES vehicles(id) ON DELETE CASCADE,
    service_type TEXT NOT NULL,
    date TEXT NOT NULL,
    odometer INTEGER NOT NULL CHECK (odometer >= 0),
    cost REAL NOT NULL DEFAULT 0,
    work_done TEXT,
    parts_replaced TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create an index on history dates.
pub const CREATE_RECORDS_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_records_vehicle_date ON service_records(vehicle_id, date DESC)
";

/// SQL statement to create the fuel logs table.
pub const CREATE_FUEL_LOGS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS fuel_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id INTEGER NOT NULL REFERENCES vehicles(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    odometer INTEGER NOT NULL CHECK (odometer >= 0),
    litres REAL NOT NULL CHECK (litres > 0),
    cost REAL NOT NULL DEFAULT 0,
    fuel_type TEXT NOT NULL,
    notes TEXT,
    economy REAL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create an index for previous fill-up lookups.
pub const CREATE_FUEL_ODOMETER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_fuel_vehicle_odometer ON fuel_logs(vehicle_id, odometer DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_VEHICLES_TABLE,
    CREATE_SCHEDULED_SERVICES_TABLE,
    CREATE_SCHEDULED_VEHICLE_INDEX,
    CREATE_SERVICE_RECORDS_TABLE,
    CREATE_RECORDS_DATE_INDEX,
    CREATE_FUEL_LOGS_TABLE,
    CREATE_FUEL_ODOMETER_INDEX,
    CREATE_METADATA_TABLE,
];
