//! Reservation validation pipeline.
//!
//! Every check is a pure function over values the caller already holds: the
//! candidate slot, the club rules, and snapshots of reservations and
//! availability records. Checks return `Ok(())` or the first rule they found
//! broken, so the composite [`validate_reservation`] is a plain `?` chain.
//!
//! The order of the chain is fixed (cheap structural checks first) and the
//! reported error is therefore deterministic for a given input:
//!
//! 1. time order and duration ([`validate_times`])
//! 2. operating hours ([`validate_hours`])
//! 3. start in the future ([`validate_in_future`])
//! 4. aircraft overlap ([`validate_aircraft_overlap`])
//! 5. pilot overlap ([`validate_pilot_overlap`])
//! 6. instructor overlap, only with an instructor ([`validate_instructor_overlap`])
//! 7. aircraft blackout windows ([`validate_aircraft_availability`])

mod blackout;
mod overlap;
mod time;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::model::{Availability, NewReservation, OperatingHours, Reservation, TimeRange};

pub use blackout::validate_aircraft_availability;
pub use overlap::{validate_aircraft_overlap, validate_instructor_overlap, validate_pilot_overlap};
pub use time::{
    validate_hours, validate_in_future, validate_times, MAX_DURATION_MINUTES,
    MIN_DURATION_MINUTES,
};

/// Closed set of reasons a reservation can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// End is not after start.
    InvalidTimeOrder,
    /// Shorter than the minimum slot.
    DurationTooShort,
    /// Longer than the maximum slot.
    DurationTooLong,
    /// Starts before opening or ends after closing.
    OutsideReservationHours,
    /// Starts now or in the past.
    PastReservation,
    /// The aircraft is already booked.
    OverlappingReservation,
    /// The pilot is already flying.
    PilotOverlap,
    /// The instructor is already flying.
    InstructorOverlap,
    /// The aircraft is blacked out.
    AircraftUnavailable,
}

impl ValidationCode {
    /// Stable string form, as exchanged with clients.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTimeOrder => "INVALID_TIME_ORDER",
            Self::DurationTooShort => "DURATION_TOO_SHORT",
            Self::DurationTooLong => "DURATION_TOO_LONG",
            Self::OutsideReservationHours => "OUTSIDE_RESERVATION_HOURS",
            Self::PastReservation => "PAST_RESERVATION",
            Self::OverlappingReservation => "OVERLAPPING_RESERVATION",
            Self::PilotOverlap => "PILOT_OVERLAP",
            Self::InstructorOverlap => "INSTRUCTOR_OVERLAP",
            Self::AircraftUnavailable => "AIRCRAFT_UNAVAILABLE",
        }
    }

    /// User-facing message for this code.
    ///
    /// [`ValidationCode::OutsideReservationHours`] gets the default opening
    /// hours here; [`ValidationError::outside_hours`] renders the configured
    /// ones.
    #[must_use]
    pub fn default_message(self) -> String {
        match self {
            Self::InvalidTimeOrder => "L'heure de fin doit être après l'heure de début".to_string(),
            Self::DurationTooShort => {
                "La durée minimale de réservation est de 15 minutes".to_string()
            }
            Self::DurationTooLong => "La durée maximale de réservation est de 12 heures".to_string(),
            Self::OutsideReservationHours => hours_message(OperatingHours::default()),
            Self::PastReservation => "La réservation doit être dans le futur".to_string(),
            Self::OverlappingReservation => {
                "Cette période chevauche une réservation existante pour cet appareil".to_string()
            }
            Self::PilotOverlap => {
                "Le pilote a déjà une réservation sur cette période".to_string()
            }
            Self::InstructorOverlap => {
                "L'instructeur a déjà une réservation sur cette période".to_string()
            }
            Self::AircraftUnavailable => "L'appareil est indisponible sur cette période".to_string(),
        }
    }
}

impl std::fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ValidationCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_CODES
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| format!("unknown validation code: {s}"))
    }
}

/// Every code, in pipeline order.
pub const ALL_CODES: [ValidationCode; 9] = [
    ValidationCode::InvalidTimeOrder,
    ValidationCode::DurationTooShort,
    ValidationCode::DurationTooLong,
    ValidationCode::OutsideReservationHours,
    ValidationCode::PastReservation,
    ValidationCode::OverlappingReservation,
    ValidationCode::PilotOverlap,
    ValidationCode::InstructorOverlap,
    ValidationCode::AircraftUnavailable,
];

/// A broken booking rule: a code for programs and a message for members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} ({code})")]
pub struct ValidationError {
    /// Machine-readable reason.
    pub code: ValidationCode,
    /// Human-readable explanation, in French.
    pub message: String,
}

impl ValidationError {
    /// Error with the standard message for `code`.
    #[must_use]
    pub fn new(code: ValidationCode) -> Self {
        Self {
            code,
            message: code.default_message(),
        }
    }

    /// Operating-hours error naming the configured hours.
    #[must_use]
    pub fn outside_hours(hours: OperatingHours) -> Self {
        Self {
            code: ValidationCode::OutsideReservationHours,
            message: hours_message(hours),
        }
    }
}

fn hours_message(hours: OperatingHours) -> String {
    format!(
        "Les réservations sont possibles uniquement entre {}h00 et {}h00",
        hours.start_hour, hours.end_hour
    )
}

/// The slot being booked or moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Reservation being edited; it never conflicts with itself.
    pub reservation_id: Option<Uuid>,
    /// Aircraft to book.
    pub aircraft_id: String,
    /// Pilot flying.
    pub pilot_id: String,
    /// Instructor on board, if any.
    pub instructor_id: Option<String>,
    /// Requested slot.
    pub range: TimeRange,
}

impl Candidate {
    /// A new booking for `pilot_id` on `aircraft_id`.
    #[must_use]
    pub fn new(aircraft_id: impl Into<String>, pilot_id: impl Into<String>, range: TimeRange) -> Self {
        Self {
            reservation_id: None,
            aircraft_id: aircraft_id.into(),
            pilot_id: pilot_id.into(),
            instructor_id: None,
            range,
        }
    }

    /// Add an instructor.
    #[must_use]
    pub fn with_instructor(mut self, instructor_id: impl Into<String>) -> Self {
        self.instructor_id = Some(instructor_id.into());
        self
    }

    /// Mark the candidate as an edit of an existing reservation.
    #[must_use]
    pub fn editing(mut self, reservation_id: Uuid) -> Self {
        self.reservation_id = Some(reservation_id);
        self
    }

    /// Candidate for an edit that keeps everything but the slot or aircraft.
    #[must_use]
    pub fn for_existing(reservation: &Reservation) -> Self {
        Self {
            reservation_id: Some(reservation.id),
            aircraft_id: reservation.aircraft_id.clone(),
            pilot_id: reservation.pilot_id.clone(),
            instructor_id: reservation.instructor_id.clone(),
            range: reservation.range(),
        }
    }
}

impl From<&NewReservation> for Candidate {
    fn from(new: &NewReservation) -> Self {
        Self {
            reservation_id: None,
            aircraft_id: new.aircraft_id.clone(),
            pilot_id: new.effective_pilot().to_string(),
            instructor_id: new.instructor_id.clone().filter(|id| !id.is_empty()),
            range: TimeRange::new(new.start_time, new.end_time),
        }
    }
}

/// Club rules and the evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationContext {
    /// Bookable hours of the day.
    pub hours: OperatingHours,
    /// Timezone in which wall-clock hours and weekdays are read.
    pub timezone: Tz,
    /// Instant against which "in the future" is judged.
    pub now: DateTime<Utc>,
}

impl ValidationContext {
    /// Build a context.
    #[must_use]
    pub fn new(hours: OperatingHours, timezone: Tz, now: DateTime<Utc>) -> Self {
        Self {
            hours,
            timezone,
            now,
        }
    }
}

/// Run the full pipeline and stop at the first broken rule.
///
/// `reservations` and `availabilities` are snapshots; they may contain records
/// for other aircraft and members, which the individual checks filter out.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the first failing check.
pub fn validate_reservation(
    candidate: &Candidate,
    context: &ValidationContext,
    reservations: &[Reservation],
    availabilities: &[Availability],
) -> Result<(), ValidationError> {
    debug!(
        "Validating {} for pilot {} on {} (editing: {:?})",
        candidate.range, candidate.pilot_id, candidate.aircraft_id, candidate.reservation_id
    );

    let outcome = run_pipeline(candidate, context, reservations, availabilities);
    if let Err(rejection) = &outcome {
        debug!("Rejected with {}", rejection.code);
    }
    outcome
}

fn run_pipeline(
    candidate: &Candidate,
    context: &ValidationContext,
    reservations: &[Reservation],
    availabilities: &[Availability],
) -> Result<(), ValidationError> {
    let range = &candidate.range;
    let exclude = candidate.reservation_id;

    validate_times(range)?;
    validate_hours(range, context.hours, context.timezone)?;
    validate_in_future(range.start, context.now)?;
    validate_aircraft_overlap(range, &candidate.aircraft_id, reservations, exclude)?;
    validate_pilot_overlap(range, &candidate.pilot_id, reservations, exclude)?;
    validate_instructor_overlap(
        range,
        candidate.instructor_id.as_deref(),
        reservations,
        exclude,
    )?;
    validate_aircraft_availability(
        range,
        &candidate.aircraft_id,
        availabilities,
        context.timezone,
    )
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Shared builders for validation tests. All times are Europe/Paris
    //! wall-clock on a fixed calendar; 2030-06-03 is a Monday.

    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::Europe::Paris;

    use super::ValidationContext;
    use crate::model::{NewReservation, OperatingHours, Reservation, TimeRange};

    pub fn paris(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Paris
            .with_ymd_and_hms(2030, 6, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    pub fn slot(day: u32, from: (u32, u32), to: (u32, u32)) -> TimeRange {
        TimeRange::new(paris(day, from.0, from.1), paris(day, to.0, to.1))
    }

    pub fn context() -> ValidationContext {
        ValidationContext::new(
            OperatingHours::default(),
            Paris,
            Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap(),
        )
    }

    pub fn booking(aircraft: &str, pilot: &str, range: TimeRange) -> Reservation {
        NewReservation::new(pilot, aircraft, range.start, range.end)
            .into_reservation(Utc.with_ymd_and_hms(2030, 5, 1, 0, 0, 0).unwrap())
    }
}
