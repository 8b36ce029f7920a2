//! Command-line interface for aeroclub.
//!
//! This module provides the CLI structure and command handlers for the
//! `aeroclub` binary.

mod commands;
mod display;
mod input;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AvailabilityCommand, CancelCommand, CheckCommand, ConfigCommand, ListCommand,
    LogFlightCommand, MoveCommand, OutputFormat, ReserveCommand, SlotArgs, StatusCommand,
};
pub use display::{
    format_availability, format_calendar_entry, format_flight, format_range, format_reservation,
};
pub use input::{parse_time, parse_weekday};

use crate::logging::Verbosity;

/// aeroclub - Aircraft reservations for a flying club
///
/// Books aircraft while enforcing the club rules: operating hours, no double
/// booking of an aircraft, pilot or instructor, and aircraft blackout windows.
#[derive(Debug, Parser)]
#[command(name = "aeroclub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Book an aircraft
    Reserve(ReserveCommand),

    /// Check whether a slot could be booked, without booking it
    Check(CheckCommand),

    /// Move a reservation to another slot or aircraft
    Move(MoveCommand),

    /// Cancel a reservation and its logged flights
    Cancel(CancelCommand),

    /// List reservations
    List(ListCommand),

    /// Log a flight flown under a reservation
    LogFlight(LogFlightCommand),

    /// Manage aircraft and member availability windows
    #[command(subcommand)]
    Availability(AvailabilityCommand),

    /// Show database statistics
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::from_occurrences(self.verbose)
        }
    }
}
