//! `fleetcare` - CLI for the fleet maintenance tracker
//!
//! This binary manages the vehicle registry, scheduled services, service
//! history and fuel logs, and reports what is due.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::collections::HashMap;
use std::error::Error;

use chrono::{Local, NaiveDate};
use clap::Parser;

use fleetcare::cli::{
    Cli, Command, ConfigCommand, FuelCommand, HistoryCommand, OutputFormat, Presenter,
    ServiceCommand, ServiceListCommand, StatusCommand, VehicleCommand,
};
use fleetcare::{
    evaluate_pending, init_logging, Config, DueSummary, FuelLog, FuelStats, ScheduledService,
    ServiceRecord, ServiceRepository, Storage, Vehicle,
};

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Vehicle(cmd) => handle_vehicle(&config, cmd),
        Command::Service(cmd) => handle_service(&config, cmd),
        Command::History(cmd) => handle_history(&config, cmd),
        Command::Fuel(cmd) => handle_fuel(&config, cmd),
        Command::Status(cmd) => handle_status(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Look a vehicle up by registration, then by numeric id.
fn resolve_vehicle(storage: &Storage, reference: &str) -> Result<(i64, Vehicle), Box<dyn Error>> {
    let mut found = storage.find_vehicle_by_rego(reference)?;
    if found.is_none() {
        if let Ok(id) = reference.trim().parse::<i64>() {
            found = storage.get_vehicle(id)?;
        }
    }

    match found {
        Some(vehicle) => {
            let id = vehicle.id.ok_or("stored vehicle has no id")?;
            Ok((id, vehicle))
        }
        None => Err(format!("no vehicle with registration or id '{reference}'").into()),
    }
}

fn resolve_filter(
    storage: &Storage,
    reference: Option<&str>,
) -> Result<Option<i64>, Box<dyn Error>> {
    reference
        .map(|r| resolve_vehicle(storage, r).map(|(id, _)| id))
        .transpose()
}

fn vehicle_names(storage: &Storage) -> Result<HashMap<i64, String>, Box<dyn Error>> {
    Ok(storage
        .list_vehicles()?
        .into_iter()
        .filter_map(|v| v.id.map(|id| (id, format!("{} {}", v.rego, v.display_name()))))
        .collect())
}

/// Treat an empty string as "clear this field".
fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn handle_vehicle(config: &Config, cmd: VehicleCommand) -> Result<(), Box<dyn Error>> {
    let storage = Storage::open(config.database_path())?;
    let presenter = Presenter::new(&config.display);

    match cmd {
        VehicleCommand::Add {
            make,
            model,
            year,
            rego,
            vin,
            odometer,
            owner,
            notes,
        } => {
            let mut vehicle = Vehicle::new(make, model, year, rego, odometer);
            vehicle.vin = vin.and_then(optional_text);
            vehicle.owner = owner.and_then(optional_text);
            vehicle.notes = notes.and_then(optional_text);

            let id = storage.insert_vehicle(&vehicle)?;
            println!(
                "Registered {} ({}) as vehicle {id}",
                vehicle.display_name(),
                vehicle.rego.trim().to_ascii_uppercase()
            );
        }
        VehicleCommand::List { format } => {
            let vehicles = storage.list_vehicles()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&vehicles)?),
                OutputFormat::Table => println!("{}", presenter.vehicle_table(&vehicles)),
                OutputFormat::Plain => {
                    if vehicles.is_empty() {
                        println!("No vehicles registered.");
                    }
                    for vehicle in &vehicles {
                        println!(
                            "{}  {}  {}",
                            vehicle.rego,
                            vehicle.display_name(),
                            presenter.distance(i64::from(vehicle.odometer))
                        );
                    }
                }
            }
        }
        VehicleCommand::Show { vehicle, json } => {
            let (id, vehicle) = resolve_vehicle(&storage, &vehicle)?;
            let evaluations =
                evaluate_pending(&storage, &config.evaluator(), Some(id), today())?;

            if json {
                let output = serde_json::json!({
                    "vehicle": vehicle,
                    "services": evaluations,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            println!("{} ({})", vehicle.display_name(), vehicle.rego);
            println!("{}", "-".repeat(40));
            println!("ID:        {id}");
            println!(
                "Odometer:  {}",
                presenter.distance(i64::from(vehicle.odometer))
            );
            if let Some(vin) = &vehicle.vin {
                println!("VIN:       {vin}");
            }
            if let Some(owner) = &vehicle.owner {
                println!("Owner:     {owner}");
            }
            if let Some(notes) = &vehicle.notes {
                println!("Notes:     {notes}");
            }
            println!();
            if evaluations.is_empty() {
                println!("No pending services.");
            }
            let name = vehicle.display_name();
            for evaluation in &evaluations {
                println!("{}", presenter.evaluation(evaluation, &name));
            }
        }
        VehicleCommand::Update {
            vehicle,
            make,
            model,
            year,
            rego,
            vin,
            owner,
            notes,
        } => {
            let (id, mut vehicle) = resolve_vehicle(&storage, &vehicle)?;
            if let Some(make) = make {
                vehicle.make = make;
            }
            if let Some(model) = model {
                vehicle.model = model;
            }
            if let Some(year) = year {
                vehicle.year = year;
            }
            if let Some(rego) = rego {
                vehicle.rego = rego;
            }
            if let Some(vin) = vin {
                vehicle.vin = optional_text(vin);
            }
            if let Some(owner) = owner {
                vehicle.owner = optional_text(owner);
            }
            if let Some(notes) = notes {
                vehicle.notes = optional_text(notes);
            }

            storage.update_vehicle(&vehicle)?;
            println!("Updated vehicle {id}.");
        }
        VehicleCommand::Remove { vehicle, yes } => {
            let (id, vehicle) = resolve_vehicle(&storage, &vehicle)?;
            if !yes {
                println!(
                    "This will remove {} ({}) with all of its services, history and fuel logs.",
                    vehicle.display_name(),
                    vehicle.rego
                );
                println!("Use --yes to confirm.");
                return Ok(());
            }
            storage.delete_vehicle(id)?;
            println!("Removed vehicle {id}.");
        }
        VehicleCommand::Odometer { vehicle, reading } => {
            let (id, vehicle) = resolve_vehicle(&storage, &vehicle)?;
            let updated = storage.record_odometer(id, reading)?;
            println!(
                "{} odometer now {} ({} pending services updated).",
                vehicle.rego,
                presenter.distance(i64::from(reading)),
                updated
            );
        }
    }
    Ok(())
}

fn handle_service(config: &Config, cmd: ServiceCommand) -> Result<(), Box<dyn Error>> {
    let storage = Storage::open(config.database_path())?;

    match cmd {
        ServiceCommand::Schedule {
            vehicle,
            service_type,
            due,
            due_odometer,
            current_odometer,
            priority,
            cost,
            description,
            notes,
        } => {
            let (vehicle_id, vehicle) = resolve_vehicle(&storage, &vehicle)?;
            let mut service = ScheduledService::new(
                vehicle_id,
                service_type,
                due,
                due_odometer,
                current_odometer.unwrap_or(vehicle.odometer),
                priority.into(),
            )
            .with_estimated_cost(cost);
            service.description = description.and_then(optional_text);
            service.notes = notes.and_then(optional_text);

            let id = storage.insert_service(&service)?;
            println!(
                "Scheduled {} for {} as service {id}.",
                service.service_type, vehicle.rego
            );
        }
        ServiceCommand::List(list) => list_services(config, &storage, &list)?,
        ServiceCommand::Edit {
            id,
            service_type,
            due,
            due_odometer,
            current_odometer,
            priority,
            cost,
            description,
            notes,
        } => {
            let mut service = storage
                .get_service(id)?
                .ok_or_else(|| format!("no scheduled service with id {id}"))?;
            if let Some(service_type) = service_type {
                service.service_type = service_type;
            }
            if let Some(due) = due {
                service.due_date = due;
            }
            if let Some(due_odometer) = due_odometer {
                service.due_odometer = due_odometer;
            }
            if let Some(current_odometer) = current_odometer {
                service.current_odometer = current_odometer;
            }
            if let Some(priority) = priority {
                service.priority = priority.into();
            }
            if let Some(cost) = cost {
                service.estimated_cost = cost;
            }
            if let Some(description) = description {
                service.description = optional_text(description);
            }
            if let Some(notes) = notes {
                service.notes = optional_text(notes);
            }

            storage.update_service(&service)?;
            println!("Updated service {id}.");
        }
        ServiceCommand::Complete { id, date, cost } => {
            let completed_on = date.unwrap_or_else(today);
            match storage.complete_service(id, completed_on, cost)? {
                Some(record_id) => {
                    println!("Completed service {id}; recorded as history entry {record_id}.");
                }
                None => return Err(format!("no scheduled service with id {id}").into()),
            }
        }
        ServiceCommand::Remove { id } => {
            if !storage.delete_service(id)? {
                return Err(format!("no scheduled service with id {id}").into());
            }
            println!("Removed service {id}.");
        }
    }
    Ok(())
}

fn list_services(
    config: &Config,
    storage: &Storage,
    cmd: &ServiceListCommand,
) -> Result<(), Box<dyn Error>> {
    let presenter = Presenter::new(&config.display);
    let vehicle_id = resolve_filter(storage, cmd.vehicle.as_deref())?;
    let today = cmd.today.unwrap_or_else(today);

    let evaluations = evaluate_pending(storage, &config.evaluator(), vehicle_id, today)?;
    let summary = DueSummary::from_evaluations(&evaluations);

    if cmd.format == OutputFormat::Json {
        let output = serde_json::json!({
            "today": today,
            "summary": summary,
            "services": evaluations,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if evaluations.is_empty() {
        println!("No pending services.");
        return Ok(());
    }

    if summary.has_overdue() {
        println!(
            "! {} overdue service(s) need attention\n",
            summary.overdue
        );
    }

    let names = vehicle_names(storage)?;
    if cmd.format == OutputFormat::Table {
        println!("{}", presenter.evaluation_table(&evaluations, &names));
    } else {
        for evaluation in &evaluations {
            let name = names
                .get(&evaluation.service.vehicle_id)
                .map_or("unknown vehicle", String::as_str);
            println!("{}\n", presenter.evaluation(evaluation, name));
        }
    }

    println!(
        "{} pending: {} overdue, {} due soon, {} scheduled. Estimated cost {}.",
        summary.total(),
        summary.overdue,
        summary.due_soon,
        summary.scheduled,
        presenter.money(summary.total_estimated_cost)
    );
    Ok(())
}

fn handle_history(config: &Config, cmd: HistoryCommand) -> Result<(), Box<dyn Error>> {
    let storage = Storage::open(config.database_path())?;
    let presenter = Presenter::new(&config.display);

    match cmd {
        HistoryCommand::List {
            vehicle,
            limit,
            format,
        } => {
            let vehicle_id = resolve_filter(&storage, vehicle.as_deref())?;
            let records = storage.service_history(vehicle_id, limit)?;
            let names = vehicle_names(&storage)?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
                OutputFormat::Table => println!("{}", presenter.history_table(&records, &names)),
                OutputFormat::Plain => {
                    if records.is_empty() {
                        println!("No service history.");
                    }
                    for record in &records {
                        println!(
                            "{}  {}  {}  {}  {}",
                            presenter.date(record.date),
                            names.get(&record.vehicle_id).map_or("?", String::as_str),
                            record.service_type,
                            presenter.distance(i64::from(record.odometer)),
                            presenter.money(record.cost)
                        );
                    }
                }
            }
        }
        HistoryCommand::Add {
            vehicle,
            service_type,
            date,
            odometer,
            cost,
            work_done,
            parts,
            notes,
        } => {
            let (vehicle_id, vehicle) = resolve_vehicle(&storage, &vehicle)?;
            let mut record = ServiceRecord::new(
                vehicle_id,
                service_type,
                date.unwrap_or_else(today),
                odometer.unwrap_or(vehicle.odometer),
                cost,
            );
            record.work_done = work_done.and_then(optional_text);
            record.parts_replaced = parts.and_then(optional_text);
            record.notes = notes.and_then(optional_text);

            let id = storage.insert_service_record(&record)?;
            println!("Logged {} for {} as history entry {id}.", record.service_type, vehicle.rego);
        }
        HistoryCommand::Remove { id } => {
            if !storage.delete_service_record(id)? {
                return Err(format!("no history entry with id {id}").into());
            }
            println!("Removed history entry {id}.");
        }
    }
    Ok(())
}

fn handle_fuel(config: &Config, cmd: FuelCommand) -> Result<(), Box<dyn Error>> {
    let storage = Storage::open(config.database_path())?;
    let presenter = Presenter::new(&config.display);

    match cmd {
        FuelCommand::Add {
            vehicle,
            litres,
            cost,
            odometer,
            date,
            fuel_type,
            notes,
        } => {
            let (vehicle_id, vehicle) = resolve_vehicle(&storage, &vehicle)?;
            let mut log = FuelLog::new(
                vehicle_id,
                date.unwrap_or_else(today),
                odometer.unwrap_or(vehicle.odometer),
                litres,
                cost,
                fuel_type,
            );
            log.notes = notes.and_then(optional_text);

            let stored = storage.insert_fuel_log(&log)?;
            match stored.economy {
                Some(economy) => println!(
                    "Logged {:.2} L for {} ({economy:.1} L/100km).",
                    stored.litres, vehicle.rego
                ),
                None => println!("Logged {:.2} L for {}.", stored.litres, vehicle.rego),
            }
        }
        FuelCommand::List {
            vehicle,
            limit,
            format,
        } => {
            let vehicle_id = resolve_filter(&storage, vehicle.as_deref())?;
            let logs = storage.fuel_logs(vehicle_id, limit)?;
            let names = vehicle_names(&storage)?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&logs)?),
                OutputFormat::Table => println!("{}", presenter.fuel_table(&logs, &names)),
                OutputFormat::Plain => {
                    if logs.is_empty() {
                        println!("No fuel logs.");
                    }
                    for log in &logs {
                        println!(
                            "{}  {}  {:.2} L  {}",
                            presenter.date(log.date),
                            names.get(&log.vehicle_id).map_or("?", String::as_str),
                            log.litres,
                            presenter.money(log.cost)
                        );
                    }
                }
            }
        }
        FuelCommand::Stats { vehicle, json } => {
            let vehicle_id = resolve_filter(&storage, vehicle.as_deref())?;
            let logs = storage.fuel_logs(vehicle_id, usize::MAX)?;
            let stats = FuelStats::from_logs(&logs);

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Fill-ups:         {}", stats.fill_ups);
                println!("Total fuel:       {:.2} L", stats.total_litres);
                println!("Total cost:       {}", presenter.money(stats.total_cost));
                match stats.average_economy {
                    Some(economy) => println!("Average economy:  {economy:.1} L/100km"),
                    None => println!("Average economy:  n/a"),
                }
            }
        }
    }
    Ok(())
}

fn handle_status(config: &Config, cmd: &StatusCommand) -> Result<(), Box<dyn Error>> {
    let storage = Storage::open(config.database_path())?;
    let presenter = Presenter::new(&config.display);
    let today = cmd.today.unwrap_or_else(today);

    let fleet = storage.fleet_summary()?;
    let evaluations = evaluate_pending(&storage, &config.evaluator(), None, today)?;
    let due = DueSummary::from_evaluations(&evaluations);

    if cmd.json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "today": today,
            "fleet": fleet,
            "due": due,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("fleetcare status");
        println!("----------------");
        println!("Database:          {}", storage.path().display());
        println!("Vehicles:          {}", fleet.vehicles);
        println!("Pending services:  {}", fleet.pending_services);
        println!("  Overdue:         {}", due.overdue);
        println!("  Due soon:        {}", due.due_soon);
        println!("  Scheduled:       {}", due.scheduled);
        println!(
            "Upcoming cost:     {}",
            presenter.money(due.total_estimated_cost)
        );
        println!("Service history:   {} entries", fleet.service_records);
        println!(
            "Service spend:     {}",
            presenter.money(fleet.total_service_cost)
        );
        println!("Fuel logs:         {}", fleet.fuel_logs);
        println!("Fuel spend:        {}", presenter.money(fleet.total_fuel_cost));
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<(), Box<dyn Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Maintenance]");
                println!(
                    "  Due soon (days):    {}",
                    config.maintenance.due_soon_days
                );
                println!(
                    "  Due soon (km):      {}",
                    config.maintenance.due_soon_distance_km
                );
                println!(
                    "  Service interval:   {} km",
                    config.maintenance.service_interval_km
                );
                println!(
                    "  Progress mode:      {:?}",
                    config.maintenance.progress_mode
                );
                println!();
                println!("[Display]");
                println!("  Date format:        {}", config.display.date_format);
                println!("  Currency symbol:    {}", config.display.currency_symbol);
                println!("  Distance unit:      {}", config.display.distance_unit);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
