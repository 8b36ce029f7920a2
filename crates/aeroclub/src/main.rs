//! `aeroclub` - CLI for club aircraft reservations
//!
//! This binary books, moves and cancels reservations, logs flights and manages
//! availability windows against a local database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use chrono::{Duration, Utc};
use chrono_tz::Tz;
use clap::Parser;
use tracing::debug;

use aeroclub::cli::{
    format_availability, format_calendar_entry, format_flight, format_reservation, parse_time,
    AvailabilityCommand, CheckCommand, Cli, Command, ConfigCommand, ListCommand, MoveCommand,
    OutputFormat, ReserveCommand, SlotArgs,
};
use aeroclub::recurrence::weekly_pattern;
use aeroclub::{
    init_logging, BookingService, CalendarOwner, Candidate, Config, Error, NewAvailability,
    NewReservation, ReservationFilter, SlotType, Storage, TimeRange,
};

/// Exit status for a booking refused by the club rules.
const EXIT_REJECTED: u8 = 2;

/// Default span of `availability list` without `--to`.
const DEFAULT_CALENDAR_DAYS: i64 = 28;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(rejection) = err.downcast_ref::<Error>().and_then(Error::rejection) {
                eprintln!("Réservation refusée : {} [{}]", rejection.message, rejection.code);
                ExitCode::from(EXIT_REJECTED)
            } else {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Configuration commands never touch the database
    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        other => other,
    };

    let path = config.database_path();
    debug!("Using database {}", path.display());
    let mut storage = Storage::open(&path)?;

    if let Command::Status(status_cmd) = &command {
        return handle_status(&storage, status_cmd.json);
    }

    let mut service = BookingService::from_config(&mut storage, &config)?;
    match command {
        Command::Reserve(cmd) => handle_reserve(&mut service, cmd),
        Command::Check(cmd) => handle_check(&service, &cmd),
        Command::Move(cmd) => handle_move(&mut service, cmd),
        Command::Cancel(cmd) => {
            if service.cancel(cmd.id)? {
                println!("Cancelled {}", cmd.id);
                Ok(())
            } else {
                Err(Error::not_found("reservation", cmd.id).into())
            }
        }
        Command::List(cmd) => handle_list(&service, &cmd),
        Command::LogFlight(cmd) => {
            let flight = service.log_flight(cmd.reservation, cmd.minutes, Utc::now())?;
            println!("{}", format_flight(&flight, service.timezone()));
            Ok(())
        }
        Command::Availability(cmd) => handle_availability(&mut service, cmd),
        Command::Status(_) | Command::Config(_) => Ok(()),
    }
}

fn slot_range(slot: &SlotArgs, tz: Tz) -> anyhow::Result<TimeRange> {
    let start = parse_time(&slot.start, tz).context("--start")?;
    let end = parse_time(&slot.end, tz).context("--end")?;
    Ok(TimeRange::new(start, end))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_reserve(service: &mut BookingService<'_>, cmd: ReserveCommand) -> anyhow::Result<()> {
    let range = slot_range(&cmd.slot, service.timezone())?;
    let mut new = NewReservation::new(cmd.user, cmd.aircraft, range.start, range.end);
    new.pilot_id = cmd.pilot;
    new.instructor_id = cmd.instructor;
    new.flight_type_id = cmd.flight_type;
    new.comments = cmd.comments;

    let reservation = service.reserve(new, Utc::now())?;
    match cmd.format {
        OutputFormat::Json => print_json(&reservation),
        OutputFormat::Plain => {
            println!("{}", format_reservation(&reservation, service.timezone()));
            Ok(())
        }
    }
}

fn handle_check(service: &BookingService<'_>, cmd: &CheckCommand) -> anyhow::Result<()> {
    let range = slot_range(&cmd.slot, service.timezone())?;
    let mut candidate = Candidate::new(&cmd.aircraft, &cmd.pilot, range);
    candidate.instructor_id.clone_from(&cmd.instructor);
    candidate.reservation_id = cmd.reservation;

    service.check(&candidate, Utc::now())?;
    println!("OK: {} is free on {}", cmd.aircraft, range);
    Ok(())
}

fn handle_move(service: &mut BookingService<'_>, cmd: MoveCommand) -> anyhow::Result<()> {
    let range = slot_range(&cmd.slot, service.timezone())?;
    let moved = service.reschedule(cmd.id, range, cmd.aircraft, Utc::now())?;
    match cmd.format {
        OutputFormat::Json => print_json(&moved),
        OutputFormat::Plain => {
            println!("{}", format_reservation(&moved, service.timezone()));
            Ok(())
        }
    }
}

fn handle_list(service: &BookingService<'_>, cmd: &ListCommand) -> anyhow::Result<()> {
    let tz = service.timezone();
    let filter = ReservationFilter {
        aircraft_id: cmd.aircraft.clone(),
        pilot_id: cmd.pilot.clone(),
        after: cmd.from.as_deref().map(|t| parse_time(t, tz)).transpose()?,
        before: cmd.to.as_deref().map(|t| parse_time(t, tz)).transpose()?,
        include_cancelled: cmd.all,
        limit: cmd.limit,
    };
    let reservations = service.storage().list_reservations(&filter)?;

    match cmd.format {
        OutputFormat::Json => print_json(&reservations)?,
        OutputFormat::Plain => {
            if reservations.is_empty() {
                println!("No reservations.");
            }
            for reservation in &reservations {
                println!("{}", format_reservation(reservation, tz));
            }
        }
    }
    Ok(())
}

fn handle_availability(
    service: &mut BookingService<'_>,
    cmd: AvailabilityCommand,
) -> anyhow::Result<()> {
    let tz = service.timezone();
    match cmd {
        AvailabilityCommand::Add {
            aircraft,
            user,
            slot,
            available,
            weekly,
            until,
            reason,
        } => {
            let range = slot_range(&slot, tz)?;
            let new = NewAvailability {
                aircraft_id: aircraft,
                user_id: user,
                start_time: range.start,
                end_time: range.end,
                slot_type: if available {
                    SlotType::Availability
                } else {
                    SlotType::Unavailability
                },
                recurrence_pattern: (!weekly.is_empty()).then(|| weekly_pattern(&weekly)),
                recurrence_end_date: until,
                reason,
            };

            let record = service.add_availability(new, Utc::now())?;
            println!("{}", format_availability(&record, tz));
        }
        AvailabilityCommand::List {
            aircraft,
            user,
            from,
            to,
            format,
        } => {
            let owner = match (aircraft, user) {
                (Some(aircraft), _) => CalendarOwner::Aircraft(aircraft),
                (None, Some(user)) => CalendarOwner::User(user),
                (None, None) => anyhow::bail!("either --aircraft or --user is required"),
            };
            let start = from
                .as_deref()
                .map(|t| parse_time(t, tz))
                .transpose()?
                .unwrap_or_else(Utc::now);
            let end = to
                .as_deref()
                .map(|t| parse_time(t, tz))
                .transpose()?
                .unwrap_or(start + Duration::days(DEFAULT_CALENDAR_DAYS));

            let entries = service.calendar(&owner, TimeRange::new(start, end))?;
            match format {
                OutputFormat::Json => print_json(&entries)?,
                OutputFormat::Plain => {
                    if entries.is_empty() {
                        println!("No windows between {} and {}.", start, end);
                    }
                    for entry in &entries {
                        println!("{}", format_calendar_entry(entry, tz));
                    }
                }
            }
        }
        AvailabilityCommand::Remove { id } => {
            if !service.remove_availability(id)? {
                return Err(Error::not_found("availability", id).into());
            }
            println!("Removed {id}");
        }
    }
    Ok(())
}

fn handle_status(storage: &Storage, json: bool) -> anyhow::Result<()> {
    let stats = storage.stats()?;
    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "reservations": stats.total_reservations,
            "active_reservations": stats.active_reservations,
            "availabilities": stats.availabilities,
            "flights": stats.flights,
            "db_size_bytes": stats.db_size_bytes,
        });
        print_json(&status)
    } else {
        println!("aeroclub status");
        println!("---------------");
        println!("Database:      {}", storage.path().display());
        println!(
            "Reservations:  {} ({} active)",
            stats.total_reservations, stats.active_reservations
        );
        println!("Windows:       {}", stats.availabilities);
        println!("Flights:       {}", stats.flights);
        println!("Size:          {} bytes", stats.db_size_bytes);
        Ok(())
    }
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Club]");
                println!("  Reservation hours:  {}", config.operating_hours());
                println!("  Timezone:           {}", config.club.timezone);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
