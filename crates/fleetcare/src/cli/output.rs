//! Text rendering for command output.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::NaiveDate;

use crate::config::DisplayConfig;
use crate::evaluator::{Evaluation, ServiceStatus};
use crate::fuel::FuelLog;
use crate::service::{ServiceRecord, DATE_FORMAT};
use crate::vehicle::Vehicle;

/// Width of the progress bar in plain output.
const PROGRESS_BAR_WIDTH: usize = 20;

/// Formats records for plain and table output using the display settings.
#[derive(Debug, Clone, Copy)]
pub struct Presenter<'a> {
    display: &'a DisplayConfig,
}

impl<'a> Presenter<'a> {
    /// Create a presenter for the given display settings.
    #[must_use]
    pub fn new(display: &'a DisplayConfig) -> Self {
        Self { display }
    }

    /// Format a date with the configured pattern, or as `YYYY-MM-DD` when the
    /// pattern cannot render a bare date.
    #[must_use]
    pub fn date(&self, date: NaiveDate) -> String {
        let mut rendered = String::new();
        if write!(rendered, "{}", date.format(&self.display.date_format)).is_err() {
            return date.format(DATE_FORMAT).to_string();
        }
        rendered
    }

    /// Format an amount with the currency symbol and two decimals.
    #[must_use]
    pub fn money(&self, amount: f64) -> String {
        if amount < 0.0 {
            format!("-{}{:.2}", self.display.currency_symbol, amount.abs())
        } else {
            format!("{}{:.2}", self.display.currency_symbol, amount)
        }
    }

    /// Format a distance with thousands separators and the distance unit.
    #[must_use]
    pub fn distance(&self, km: i64) -> String {
        format!("{} {}", group_thousands(km), self.display.distance_unit)
    }

    /// Multi-line description of one evaluated service.
    #[must_use]
    pub fn evaluation(&self, evaluation: &Evaluation, vehicle: &str) -> String {
        let service = &evaluation.service;
        let id = service.id.map_or_else(String::new, |id| format!("#{id} "));

        let odometer = if evaluation.odometer_remaining < 0 {
            format!(
                "{} past due odometer",
                self.distance(-evaluation.odometer_remaining)
            )
        } else {
            format!("{} to go", self.distance(evaluation.odometer_remaining))
        };

        let mut text = format!(
            "{id}[{}] {} - {vehicle} ({} priority)\n  \
             Due {} ({}) or at {}, {odometer}\n  \
             Progress {} {:.0}%  Est. {}",
            status_tag(evaluation.status),
            service.service_type,
            service.priority,
            self.date(service.due_date),
            evaluation.days_label(),
            self.distance(i64::from(service.due_odometer)),
            progress_bar(evaluation.progress_percent),
            evaluation.progress_percent,
            self.money(service.estimated_cost),
        );

        if let Some(description) = &service.description {
            text.push_str(&format!("\n  {description}"));
        }
        if let Some(notes) = &service.notes {
            text.push_str(&format!("\n  Note: {notes}"));
        }
        text
    }

    /// Table of evaluated services.
    #[must_use]
    pub fn evaluation_table(
        &self,
        evaluations: &[Evaluation],
        names: &HashMap<i64, String>,
    ) -> String {
        let rows = evaluations
            .iter()
            .map(|evaluation| {
                let service = &evaluation.service;
                vec![
                    service.id.map_or_else(String::new, |id| id.to_string()),
                    status_tag(evaluation.status).to_string(),
                    service.priority.to_string(),
                    vehicle_name(names, service.vehicle_id),
                    service.service_type.clone(),
                    self.date(service.due_date),
                    evaluation.days_label(),
                    self.distance(evaluation.odometer_remaining),
                    format!("{:.0}%", evaluation.progress_percent),
                    self.money(service.estimated_cost),
                ]
            })
            .collect();

        render_table(
            &[
                "ID", "STATUS", "PRIORITY", "VEHICLE", "SERVICE", "DUE", "DAYS", "REMAINING",
                "PROGRESS", "EST. COST",
            ],
            rows,
        )
    }

    /// Table of vehicles.
    #[must_use]
    pub fn vehicle_table(&self, vehicles: &[Vehicle]) -> String {
        let rows = vehicles
            .iter()
            .map(|vehicle| {
                vec![
                    vehicle.id.map_or_else(String::new, |id| id.to_string()),
                    vehicle.rego.clone(),
                    vehicle.display_name(),
                    self.distance(i64::from(vehicle.odometer)),
                    vehicle.owner.clone().unwrap_or_default(),
                ]
            })
            .collect();

        render_table(&["ID", "REGO", "VEHICLE", "ODOMETER", "OWNER"], rows)
    }

    /// Table of service history entries.
    #[must_use]
    pub fn history_table(
        &self,
        records: &[ServiceRecord],
        names: &HashMap<i64, String>,
    ) -> String {
        let rows = records
            .iter()
            .map(|record| {
                vec![
                    record.id.map_or_else(String::new, |id| id.to_string()),
                    self.date(record.date),
                    vehicle_name(names, record.vehicle_id),
                    record.service_type.clone(),
                    self.distance(i64::from(record.odometer)),
                    self.money(record.cost),
                    record.work_done.clone().unwrap_or_default(),
                ]
            })
            .collect();

        render_table(
            &["ID", "DATE", "VEHICLE", "SERVICE", "ODOMETER", "COST", "WORK DONE"],
            rows,
        )
    }

    /// Table of fuel logs.
    #[must_use]
    pub fn fuel_table(&self, logs: &[FuelLog], names: &HashMap<i64, String>) -> String {
        let rows = logs
            .iter()
            .map(|log| {
                vec![
                    log.id.map_or_else(String::new, |id| id.to_string()),
                    self.date(log.date),
                    vehicle_name(names, log.vehicle_id),
                    self.distance(i64::from(log.odometer)),
                    format!("{:.2} L", log.litres),
                    self.money(log.cost),
                    log.fuel_type.clone(),
                    log.economy
                        .map_or_else(|| "-".to_string(), |e| format!("{e:.1} L/100km")),
                ]
            })
            .collect();

        render_table(
            &["ID", "DATE", "VEHICLE", "ODOMETER", "LITRES", "COST", "FUEL", "ECONOMY"],
            rows,
        )
    }
}

fn vehicle_name(names: &HashMap<i64, String>, vehicle_id: i64) -> String {
    names
        .get(&vehicle_id)
        .cloned()
        .unwrap_or_else(|| format!("vehicle {vehicle_id}"))
}

fn status_tag(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Overdue => "OVERDUE",
        ServiceStatus::DueSoon => "DUE SOON",
        ServiceStatus::Scheduled => "SCHEDULED",
    }
}

/// `[#########-----------]` for a percentage in `[0, 100]`.
fn progress_bar(percent: f64) -> String {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let share = percent.clamp(0.0, 100.0) / 100.0;
    let filled = (share * PROGRESS_BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

/// `62500` -> `62,500`.
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Left-aligned columns separated by two spaces.
fn render_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers.iter().map(ToString::to_string).collect()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(rows.into_iter().map(format_row));
    lines.join("\n")
}
