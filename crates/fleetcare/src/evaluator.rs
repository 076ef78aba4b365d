//! Maintenance due evaluation and prioritization.
//!
//! Everything here is a pure function of the service records and the date
//! passed in as `today`. Nothing is cached between calls: odometer readings
//! and due thresholds are taken as they are at evaluation time.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::config::MaintenanceConfig;
use crate::service::ScheduledService;

/// Days before the due date at which a service becomes due soon.
pub const DEFAULT_DUE_SOON_DAYS: u32 = 7;

/// Remaining distance (km) at which a service becomes due soon.
pub const DEFAULT_DUE_SOON_DISTANCE_KM: u32 = 500;

/// Assumed length (km) of every maintenance interval.
pub const DEFAULT_SERVICE_INTERVAL_KM: u32 = 5_000;

/// Urgency of a scheduled service relative to `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Past the due date or the due odometer reading.
    Overdue,
    /// Within the due-soon window of either threshold.
    DueSoon,
    /// Neither threshold is close.
    Scheduled,
}

impl ServiceStatus {
    /// Short label for display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::DueSoon => "Due soon",
            Self::Scheduled => "Scheduled",
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overdue => write!(f, "overdue"),
            Self::DueSoon => write!(f, "due_soon"),
            Self::Scheduled => write!(f, "scheduled"),
        }
    }
}

/// How the progress-to-due percentage is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    /// Position of the current reading inside the fixed window
    /// `[due - interval, due]`.
    #[default]
    Window,
    /// `interval / (due - current + interval)`. Reads high early in the
    /// interval; kept so existing dashboards keep their numbers.
    Legacy,
}

/// Whole days from `today` until `due_date`; negative once the date has passed.
#[must_use]
pub fn days_until_due(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (due_date - today).num_days()
}

/// Ranking order: higher priority first, then the earliest due date.
///
/// Comparing due dates is the same as comparing `days_until_due` for any
/// fixed `today`, so the order does not depend on the current date.
#[must_use]
pub fn compare_rank(a: &ScheduledService, b: &ScheduledService) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.due_date.cmp(&b.due_date))
}

/// Sort services into ranking order.
///
/// The sort is stable: services equal on priority and due date keep their
/// input order.
#[must_use]
pub fn rank(mut services: Vec<ScheduledService>) -> Vec<ScheduledService> {
    services.sort_by(compare_rank);
    services
}

/// Evaluates scheduled services against configurable thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    due_soon_days: i64,
    due_soon_distance_km: i64,
    service_interval_km: u32,
    progress_mode: ProgressMode,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            due_soon_days: i64::from(DEFAULT_DUE_SOON_DAYS),
            due_soon_distance_km: i64::from(DEFAULT_DUE_SOON_DISTANCE_KM),
            service_interval_km: DEFAULT_SERVICE_INTERVAL_KM,
            progress_mode: ProgressMode::default(),
        }
    }
}

impl Evaluator {
    /// Build an evaluator from the maintenance section of the configuration.
    #[must_use]
    pub fn new(config: &MaintenanceConfig) -> Self {
        Self {
            due_soon_days: i64::from(config.due_soon_days),
            due_soon_distance_km: i64::from(config.due_soon_distance_km),
            service_interval_km: config.service_interval_km,
            progress_mode: config.progress_mode,
        }
    }

    /// Switch the progress formula.
    #[must_use]
    pub fn with_progress_mode(mut self, mode: ProgressMode) -> Self {
        self.progress_mode = mode;
        self
    }

    /// The progress formula in use.
    #[must_use]
    pub fn progress_mode(&self) -> ProgressMode {
        self.progress_mode
    }

    /// Classify a service as overdue, due soon or scheduled.
    ///
    /// The date and odometer triggers are OR-ed: either one alone escalates
    /// the status.
    #[must_use]
    pub fn classify(&self, service: &ScheduledService, today: NaiveDate) -> ServiceStatus {
        let days = days_until_due(service.due_date, today);
        let remaining = service.odometer_remaining();

        if days < 0 || remaining <= 0 {
            ServiceStatus::Overdue
        } else if days <= self.due_soon_days || remaining <= self.due_soon_distance_km {
            ServiceStatus::DueSoon
        } else {
            ServiceStatus::Scheduled
        }
    }

    /// How far the vehicle is through the current maintenance interval, in
    /// `[0, 100]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_percent(&self, service: &ScheduledService) -> f64 {
        let interval = i64::from(self.service_interval_km);
        let due = i64::from(service.due_odometer);
        let current = i64::from(service.current_odometer);

        let percent = match self.progress_mode {
            ProgressMode::Window => {
                let start = due - interval;
                100.0 * (current - start) as f64 / interval as f64
            }
            // A zero denominator yields +inf, which the clamp turns into 100.
            ProgressMode::Legacy => 100.0 * interval as f64 / (due - current + interval) as f64,
        };

        if percent.is_nan() {
            return 0.0;
        }
        percent.clamp(0.0, 100.0)
    }

    /// Evaluate one service.
    #[must_use]
    pub fn evaluate_one(&self, service: ScheduledService, today: NaiveDate) -> Evaluation {
        Evaluation {
            status: self.classify(&service, today),
            days_until_due: days_until_due(service.due_date, today),
            odometer_remaining: service.odometer_remaining(),
            progress_percent: self.progress_percent(&service),
            service,
        }
    }

    /// Rank services and evaluate each one.
    #[instrument(skip(self, services), fields(count = services.len()))]
    pub fn evaluate(&self, services: Vec<ScheduledService>, today: NaiveDate) -> Vec<Evaluation> {
        rank(services)
            .into_iter()
            .map(|service| {
                let evaluation = self.evaluate_one(service, today);
                trace!(
                    id = ?evaluation.service.id,
                    status = %evaluation.status,
                    days = evaluation.days_until_due,
                    "evaluated service"
                );
                evaluation
            })
            .collect()
    }
}

/// A service together with its derived due state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// The evaluated record.
    pub service: ScheduledService,
    /// Urgency classification.
    pub status: ServiceStatus,
    /// Days left until the due date (negative when overdue).
    pub days_until_due: i64,
    /// Distance left until the due odometer (negative when exceeded).
    pub odometer_remaining: i64,
    /// Progress through the current interval, `[0, 100]`.
    pub progress_percent: f64,
}

impl Evaluation {
    /// "5 days left" or "3 days overdue".
    #[must_use]
    pub fn days_label(&self) -> String {
        if self.days_until_due < 0 {
            format!("{} days overdue", self.days_until_due.unsigned_abs())
        } else {
            format!("{} days left", self.days_until_due)
        }
    }
}

/// Counts of evaluated services by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DueSummary {
    /// Services past either threshold.
    pub overdue: usize,
    /// Services close to either threshold.
    pub due_soon: usize,
    /// Everything else.
    pub scheduled: usize,
    /// Sum of estimated costs across all pending services.
    pub total_estimated_cost: f64,
}

impl DueSummary {
    /// Tally a set of evaluations.
    #[must_use]
    pub fn from_evaluations(evaluations: &[Evaluation]) -> Self {
        evaluations
            .iter()
            .fold(Self::default(), |mut summary, evaluation| {
                match evaluation.status {
                    ServiceStatus::Overdue => summary.overdue += 1,
                    ServiceStatus::DueSoon => summary.due_soon += 1,
                    ServiceStatus::Scheduled => summary.scheduled += 1,
                }
                summary.total_estimated_cost += evaluation.service.estimated_cost;
                summary
            })
    }

    /// Total number of pending services.
    #[must_use]
    pub fn total(&self) -> usize {
        self.overdue + self.due_soon + self.scheduled
    }

    /// Whether anything is overdue, by date or by odometer.
    #[must_use]
    pub fn has_overdue(&self) -> bool {
        self.overdue > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::Priority;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn service(due: &str, due_odo: u32, current_odo: u32, priority: Priority) -> ScheduledService {
        ScheduledService::new(1, "Oil Change", date(due), due_odo, current_odo, priority)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_days_until_due() {
        assert_eq!(days_until_due(date("2024-02-15"), date("2024-02-10")), 5);
        assert_eq!(days_until_due(date("2024-01-25"), date("2024-02-01")), -7);
        assert_eq!(days_until_due(date("2024-02-10"), date("2024-02-10")), 0);
    }

    #[test]
    fn test_classify_due_soon_by_date() {
        let evaluator = Evaluator::default();
        let s = service("2024-02-15", 65_000, 62_800, Priority::High);
        assert_eq!(
            evaluator.classify(&s, date("2024-02-10")),
            ServiceStatus::DueSoon
        );
    }

    #[test]
    fn test_classify_overdue_by_date() {
        let evaluator = Evaluator::default();
        let s = service("2024-01-25", 55_000, 54_800, Priority::Low);
        for today in ["2024-01-26", "2024-02-10", "2025-06-01"] {
            assert_eq!(evaluator.classify(&s, date(today)), ServiceStatus::Overdue);
        }
    }

    #[test]
    fn test_classify_overdue_by_odometer() {
        let evaluator = Evaluator::default();
        let today = date("2024-01-01");

        let reached = service("2024-06-01", 50_000, 50_000, Priority::Medium);
        assert_eq!(evaluator.classify(&reached, today), ServiceStatus::Overdue);

        let exceeded = service("2024-06-01", 50_000, 51_200, Priority::Medium);
        assert_eq!(evaluator.classify(&exceeded, today), ServiceStatus::Overdue);
    }

    #[test]
    fn test_classify_due_soon_by_odometer() {
        let evaluator = Evaluator::default();
        let s = service("2024-06-01", 50_000, 49_500, Priority::Medium);
        assert_eq!(
            evaluator.classify(&s, date("2024-01-01")),
            ServiceStatus::DueSoon
        );
    }

    #[test]
    fn test_classify_boundaries() {
        let evaluator = Evaluator::default();
        let today = date("2024-01-01");

        // Exactly 7 days out is due soon, 8 is not
        let seven = service("2024-01-08", 90_000, 10_000, Priority::Low);
        assert_eq!(evaluator.classify(&seven, today), ServiceStatus::DueSoon);
        let eight = service("2024-01-09", 90_000, 10_000, Priority::Low);
        assert_eq!(evaluator.classify(&eight, today), ServiceStatus::Scheduled);

        // Due today is not yet overdue
        let due_today = service("2024-01-01", 90_000, 10_000, Priority::Low);
        assert_eq!(evaluator.classify(&due_today, today), ServiceStatus::DueSoon);

        // 501 km left is scheduled
        let far = service("2024-06-01", 50_000, 49_499, Priority::Low);
        assert_eq!(evaluator.classify(&far, today), ServiceStatus::Scheduled);
    }

    #[test]
    fn test_classify_scheduled() {
        let evaluator = Evaluator::default();
        let s = service("2024-03-01", 82_000, 79_200, Priority::Medium);
        assert_eq!(
            evaluator.classify(&s, date("2024-02-01")),
            ServiceStatus::Scheduled
        );
    }

    #[test]
    fn test_classify_with_configured_thresholds() {
        let config = MaintenanceConfig {
            due_soon_days: 30,
            due_soon_distance_km: 3_000,
            ..MaintenanceConfig::default()
        };
        let evaluator = Evaluator::new(&config);
        let s = service("2024-03-01", 82_000, 79_200, Priority::Medium);
        assert_eq!(
            evaluator.classify(&s, date("2024-02-01")),
            ServiceStatus::DueSoon
        );
    }

    #[test]
    fn test_progress_window() {
        let evaluator = Evaluator::default();
        // Window is [60_000, 65_000]
        let s = service("2024-02-15", 65_000, 62_800, Priority::High);
        assert!(approx(evaluator.progress_percent(&s), 56.0));

        let start = service("2024-02-15", 65_000, 60_000, Priority::High);
        assert!(approx(evaluator.progress_percent(&start), 0.0));
    }

    #[test]
    fn test_progress_clamped() {
        let evaluator = Evaluator::default();

        let past_due = service("2024-02-15", 65_000, 70_000, Priority::High);
        assert!(approx(evaluator.progress_percent(&past_due), 100.0));

        let far_below = service("2024-02-15", 65_000, 10_000, Priority::High);
        assert!(approx(evaluator.progress_percent(&far_below), 0.0));

        // Due odometer smaller than the interval
        let small = service("2024-02-15", 3_000, 0, Priority::High);
        let pct = evaluator.progress_percent(&small);
        assert!((0.0..=100.0).contains(&pct));
        assert!(approx(pct, 40.0));
    }

    #[test]
    fn test_progress_legacy() {
        let evaluator = Evaluator::default().with_progress_mode(ProgressMode::Legacy);
        assert_eq!(evaluator.progress_mode(), ProgressMode::Legacy);

        // 5000 / (65000 - 62800 + 5000) = 5000 / 7200
        let s = service("2024-02-15", 65_000, 62_800, Priority::High);
        assert!(approx(evaluator.progress_percent(&s), 100.0 * 5_000.0 / 7_200.0));

        // Due reached: 5000 / 5000
        let reached = service("2024-02-15", 65_000, 65_000, Priority::High);
        assert!(approx(evaluator.progress_percent(&reached), 100.0));

        // Zero denominator
        let zero = service("2024-02-15", 65_000, 70_000, Priority::High);
        assert!(approx(evaluator.progress_percent(&zero), 100.0));

        // Negative denominator clamps to 0
        let beyond = service("2024-02-15", 65_000, 80_000, Priority::High);
        assert!(approx(evaluator.progress_percent(&beyond), 0.0));
    }

    #[test]
    fn test_rank_example() {
        // Relative to today = 2024-02-01
        let medium_5d = service("2024-02-06", 90_000, 10_000, Priority::Medium);
        let high_20d = service("2024-02-21", 90_000, 10_000, Priority::High);
        let high_3d = service("2024-02-04", 90_000, 10_000, Priority::High);

        let ranked = rank(vec![medium_5d.clone(), high_20d.clone(), high_3d.clone()]);
        assert_eq!(ranked, vec![high_3d, high_20d, medium_5d]);
    }

    #[test]
    fn test_rank_priority_beats_date() {
        let low_overdue = service("2023-12-01", 90_000, 10_000, Priority::Low);
        let high_later = service("2025-01-01", 90_000, 10_000, Priority::High);

        let ranked = rank(vec![low_overdue.clone(), high_later.clone()]);
        assert_eq!(ranked, vec![high_later, low_overdue]);
    }

    #[test]
    fn test_rank_overdue_first_within_tier() {
        let upcoming = service("2024-03-01", 90_000, 10_000, Priority::Medium);
        let overdue = service("2024-01-01", 90_000, 10_000, Priority::Medium);

        let ranked = rank(vec![upcoming.clone(), overdue.clone()]);
        assert_eq!(ranked, vec![overdue, upcoming]);
    }

    #[test]
    fn test_rank_is_stable() {
        let mut first = service("2024-03-01", 90_000, 10_000, Priority::Medium);
        first.service_type = "First".to_string();
        let mut second = first.clone();
        second.service_type = "Second".to_string();
        let mut third = first.clone();
        third.service_type = "Third".to_string();

        let ranked = rank(vec![first, second, third]);
        let names: Vec<_> = ranked.iter().map(|s| s.service_type.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(Vec::new()).is_empty());
    }

    #[test]
    fn test_evaluate_ranks_and_classifies() {
        let evaluator = Evaluator::default();
        let today = date("2024-02-10");
        let services = vec![
            service("2024-02-20", 45_000, 43_450, Priority::Medium),
            service("2024-02-15", 65_000, 62_800, Priority::High),
            service("2024-01-25", 55_000, 54_800, Priority::Low),
        ];

        let evaluations = evaluator.evaluate(services, today);
        assert_eq!(evaluations.len(), 3);

        assert_eq!(evaluations[0].service.priority, Priority::High);
        assert_eq!(evaluations[0].status, ServiceStatus::DueSoon);
        assert_eq!(evaluations[0].days_until_due, 5);
        assert_eq!(evaluations[0].odometer_remaining, 2_200);

        assert_eq!(evaluations[1].service.priority, Priority::Medium);
        assert_eq!(evaluations[1].status, ServiceStatus::Scheduled);

        assert_eq!(evaluations[2].service.priority, Priority::Low);
        assert_eq!(evaluations[2].status, ServiceStatus::Overdue);
        assert_eq!(evaluations[2].days_until_due, -16);
    }

    #[test]
    fn test_evaluate_is_repeatable() {
        let evaluator = Evaluator::default();
        let today = date("2024-02-10");
        let services = vec![
            service("2024-02-20", 45_000, 43_450, Priority::Medium),
            service("2024-02-15", 65_000, 62_800, Priority::High),
        ];

        let first = evaluator.evaluate(services.clone(), today);
        let second = evaluator.evaluate(services, today);
        assert_eq!(first, second);
    }

    #[test]
    fn test_days_label() {
        let evaluator = Evaluator::default();
        let s = service("2024-01-25", 55_000, 54_800, Priority::Low);

        let overdue = evaluator.evaluate_one(s.clone(), date("2024-01-28"));
        assert_eq!(overdue.days_label(), "3 days overdue");

        let upcoming = evaluator.evaluate_one(s, date("2024-01-20"));
        assert_eq!(upcoming.days_label(), "5 days left");
    }

    #[test]
    fn test_due_summary() {
        let evaluator = Evaluator::default();
        let today = date("2024-02-10");
        let services = vec![
            service("2024-02-20", 45_000, 43_450, Priority::Medium).with_estimated_cost(85.0),
            service("2024-02-15", 65_000, 62_800, Priority::High).with_estimated_cost(350.0),
            service("2024-01-25", 55_000, 54_800, Priority::Low).with_estimated_cost(60.0),
        ];

        let summary = DueSummary::from_evaluations(&evaluator.evaluate(services, today));
        assert_eq!(summary.overdue, 1);
        assert_eq!(summary.due_soon, 1);
        assert_eq!(summary.scheduled, 1);
        assert_eq!(summary.total(), 3);
        assert!(summary.has_overdue());
        assert!(approx(summary.total_estimated_cost, 495.0));
    }

    #[test]
    fn test_due_summary_counts_odometer_overdue() {
        let evaluator = Evaluator::default();
        let today = date("2024-02-10");
        let services = vec![service("2024-06-01", 45_000, 45_200, Priority::Medium)];

        let summary = DueSummary::from_evaluations(&evaluator.evaluate(services, today));
        assert_eq!(summary.overdue, 1);
        assert!(summary.has_overdue());
    }

    #[test]
    fn test_due_summary_empty() {
        let summary = DueSummary::from_evaluations(&[]);
        assert_eq!(summary.total(), 0);
        assert!(!summary.has_overdue());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ServiceStatus::Overdue.to_string(), "overdue");
        assert_eq!(ServiceStatus::DueSoon.to_string(), "due_soon");
        assert_eq!(ServiceStatus::Scheduled.to_string(), "scheduled");
        assert_eq!(ServiceStatus::DueSoon.label(), "Due soon");
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ServiceStatus::DueSoon).unwrap();
        assert_eq!(json, "\"due_soon\"");
    }
}
