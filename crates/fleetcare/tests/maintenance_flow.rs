//! End-to-end flow through the public API: register, schedule, evaluate,
//! drive, complete.

use chrono::NaiveDate;

use fleetcare::{
    evaluate_pending, DueSummary, Evaluator, FuelLog, FuelStats, Priority, ProgressMode,
    ScheduledService, ServiceRepository, ServiceStatus, Storage, Vehicle,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn schedule_evaluate_and_complete() {
    let storage = Storage::open_in_memory().unwrap();
    let evaluator = Evaluator::default();

    let camry = storage
        .insert_vehicle(&Vehicle::new("Toyota", "Camry", 2020, "ABC123", 62_800))
        .unwrap();
    let mazda = storage
        .insert_vehicle(&Vehicle::new("Mazda", "CX-5", 2019, "MZD555", 54_800))
        .unwrap();

    let major = storage
        .insert_service(
            &ScheduledService::new(
                camry,
                "Major Service",
                date("2024-02-15"),
                65_000,
                62_800,
                Priority::High,
            )
            .with_estimated_cost(350.0),
        )
        .unwrap();
    storage
        .insert_service(
            &ScheduledService::new(
                mazda,
                "Tire Rotation",
                date("2024-01-25"),
                55_000,
                54_800,
                Priority::Low,
            )
            .with_estimated_cost(60.0),
        )
        .unwrap();
    storage
        .insert_service(&ScheduledService::new(
            camry,
            "Brake Inspection",
            date("2024-06-01"),
            70_000,
            62_800,
            Priority::Medium,
        ))
        .unwrap();

    let today = date("2024-02-10");
    let evaluations = evaluate_pending(&storage, &evaluator, None, today).unwrap();
    let statuses: Vec<_> = evaluations.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            ServiceStatus::DueSoon,
            ServiceStatus::Scheduled,
            ServiceStatus::Overdue
        ]
    );

    let summary = DueSummary::from_evaluations(&evaluations);
    assert_eq!(summary.total(), 3);
    assert!(summary.has_overdue());
    assert!((summary.total_estimated_cost - 410.0).abs() < 1e-9);

    // New odometer readings flow into the pending services
    storage.record_odometer(camry, 64_600).unwrap();
    let camry_only = evaluate_pending(&storage, &evaluator, Some(camry), today).unwrap();
    assert_eq!(camry_only.len(), 2);
    assert_eq!(camry_only[0].odometer_remaining, 400);
    assert!((camry_only[0].progress_percent - 92.0).abs() < 1e-9);

    let legacy = evaluator.with_progress_mode(ProgressMode::Legacy);
    let legacy_eval = evaluate_pending(&storage, &legacy, Some(camry), today).unwrap();
    assert!((legacy_eval[0].progress_percent - 100.0 * 5_000.0 / 5_400.0).abs() < 1e-9);

    let record = storage
        .complete_service(major, date("2024-02-12"), None)
        .unwrap()
        .unwrap();
    let history = storage.service_history(Some(camry), 10).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, Some(record));
    assert_eq!(history[0].odometer, 64_600);
    assert!((history[0].cost - 350.0).abs() < 1e-9);

    let remaining = storage.pending_services(None).unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|s| s.id != Some(major)));

    let fleet = storage.fleet_summary().unwrap();
    assert_eq!(fleet.vehicles, 2);
    assert_eq!(fleet.pending_services, 2);
    assert_eq!(fleet.service_records, 1);
    assert!((fleet.total_service_cost - 350.0).abs() < 1e-9);
}

#[test]
fn fuel_economy_across_fill_ups() {
    let storage = Storage::open_in_memory().unwrap();
    let civic = storage
        .insert_vehicle(&Vehicle::new("Honda", "Civic", 2018, "XYZ789", 43_000))
        .unwrap();

    for (day, odometer, litres) in [
        ("2024-01-01", 43_000, 40.0),
        ("2024-01-10", 43_450, 38.5),
        ("2024-01-20", 43_950, 34.0),
    ] {
        storage
            .insert_fuel_log(&FuelLog::new(
                civic,
                date(day),
                odometer,
                litres,
                litres * 1.6,
                "Regular",
            ))
            .unwrap();
    }

    let logs = storage.fuel_logs(Some(civic), 10).unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs[2].economy.is_none());

    let stats = FuelStats::from_logs(&logs);
    assert_eq!(stats.fill_ups, 3);
    let expected = (38.5 / 450.0 * 100.0 + 34.0 / 500.0 * 100.0) / 2.0;
    assert!((stats.average_economy.unwrap() - expected).abs() < 1e-9);

    let fleet = storage.fleet_summary().unwrap();
    assert_eq!(fleet.fuel_logs, 3);
    assert!((fleet.total_fuel_cost - 112.5 * 1.6).abs() < 1e-9);
}

#[test]
fn removing_a_vehicle_clears_its_records() {
    let storage = Storage::open_in_memory().unwrap();
    let id = storage
        .insert_vehicle(&Vehicle::new("Ford", "F-150", 2021, "DEF456", 79_200))
        .unwrap();
    storage
        .insert_service(&ScheduledService::new(
            id,
            "Transmission Service",
            date("2024-03-01"),
            80_000,
            79_200,
            Priority::High,
        ))
        .unwrap();
    storage
        .insert_fuel_log(&FuelLog::new(id, date("2024-01-18"), 79_200, 85.0, 136.0, "Diesel"))
        .unwrap();

    assert!(storage.delete_vehicle(id).unwrap());
    assert!(storage.pending_services(None).unwrap().is_empty());
    assert!(storage.fuel_logs(None, 10).unwrap().is_empty());
    assert!(storage.find_vehicle_by_rego("DEF456").unwrap().is_none());
}
