//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands. Times are taken
//! as text and resolved against the club timezone by the handlers, see
//! [`super::parse_time`].

use std::path::PathBuf;

use chrono::{NaiveDate, Weekday};
use clap::{ArgGroup, Args, Subcommand, ValueEnum};
use uuid::Uuid;

use super::input::parse_weekday;

/// Slot bounds shared by every command that books or checks a slot.
#[derive(Debug, Clone, Args)]
pub struct SlotArgs {
    /// Start of the slot (RFC 3339, or "YYYY-MM-DD HH:MM" in club time)
    #[arg(short, long)]
    pub start: String,

    /// End of the slot (RFC 3339, or "YYYY-MM-DD HH:MM" in club time)
    #[arg(short, long)]
    pub end: String,
}

/// Reserve command arguments.
#[derive(Debug, Args)]
pub struct ReserveCommand {
    /// Aircraft registration
    #[arg(short, long)]
    pub aircraft: String,

    /// Member making the booking
    #[arg(short, long)]
    pub user: String,

    /// Pilot flying, if not the booking member
    #[arg(short, long)]
    pub pilot: Option<String>,

    /// Instructor on board
    #[arg(short, long)]
    pub instructor: Option<String>,

    /// Flight category
    #[arg(long)]
    pub flight_type: Option<String>,

    /// Free-form comment
    #[arg(long)]
    pub comments: Option<String>,

    #[command(flatten)]
    pub slot: SlotArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Aircraft registration
    #[arg(short, long)]
    pub aircraft: String,

    /// Pilot flying
    #[arg(short, long)]
    pub pilot: String,

    /// Instructor on board
    #[arg(short, long)]
    pub instructor: Option<String>,

    /// Reservation being edited, excluded from conflict checks
    #[arg(short, long)]
    pub reservation: Option<Uuid>,

    #[command(flatten)]
    pub slot: SlotArgs,
}

/// Move command arguments.
#[derive(Debug, Args)]
pub struct MoveCommand {
    /// Reservation to move
    pub id: Uuid,

    #[command(flatten)]
    pub slot: SlotArgs,

    /// Move to another aircraft
    #[arg(short, long)]
    pub aircraft: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Cancel command arguments.
#[derive(Debug, Args)]
pub struct CancelCommand {
    /// Reservation to cancel
    pub id: Uuid,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only this aircraft
    #[arg(short, long)]
    pub aircraft: Option<String>,

    /// Only this pilot
    #[arg(short, long)]
    pub pilot: Option<String>,

    /// Only reservations ending after this time
    #[arg(long)]
    pub from: Option<String>,

    /// Only reservations starting before this time
    #[arg(long)]
    pub to: Option<String>,

    /// Include cancelled reservations
    #[arg(long)]
    pub all: bool,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Log-flight command arguments.
#[derive(Debug, Args)]
pub struct LogFlightCommand {
    /// Reservation the flight was flown under
    pub reservation: Uuid,

    /// Block time in minutes; defaults to the booked length
    #[arg(short, long)]
    pub minutes: Option<u32>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Availability management commands.
#[derive(Debug, Subcommand)]
pub enum AvailabilityCommand {
    /// Add an availability or blackout window
    #[command(group(ArgGroup::new("owner").required(true).args(["aircraft", "user"])))]
    Add {
        /// Aircraft the window applies to
        #[arg(short, long)]
        aircraft: Option<String>,

        /// Member the window applies to
        #[arg(short, long)]
        user: Option<String>,

        #[command(flatten)]
        slot: SlotArgs,

        /// Mark the window as available instead of blacked out
        #[arg(long)]
        available: bool,

        /// Repeat weekly on these days (e.g. MO,TH)
        #[arg(short, long, value_delimiter = ',', value_parser = parse_weekday)]
        weekly: Vec<Weekday>,

        /// Last day of the repetition (YYYY-MM-DD, inclusive)
        #[arg(long, requires = "weekly")]
        until: Option<NaiveDate>,

        /// Why the window exists
        #[arg(short, long)]
        reason: Option<String>,
    },

    /// List window occurrences in a period
    #[command(group(ArgGroup::new("owner").required(true).args(["aircraft", "user"])))]
    List {
        /// Aircraft to show
        #[arg(short, long)]
        aircraft: Option<String>,

        /// Member to show
        #[arg(short, long)]
        user: Option<String>,

        /// Start of the period; defaults to now
        #[arg(long)]
        from: Option<String>,

        /// End of the period; defaults to four weeks after the start
        #[arg(long)]
        to: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Remove a window
    Remove {
        /// Window to remove
        id: Uuid,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }

    #[test]
    fn test_cancel_command_debug() {
        let id = Uuid::nil();
        let cmd = CancelCommand { id };
        assert!(format!("{cmd:?}").contains(&id.to_string()));
    }
}
