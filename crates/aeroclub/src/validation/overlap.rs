//! Double-booking checks for aircraft, pilots and instructors.
//!
//! All three share one scan: skip the reservation being edited and anything
//! cancelled, keep the records that involve the resource, and look for a
//! half-open overlap with the requested slot.

use tracing::trace;
use uuid::Uuid;

use super::{ValidationCode, ValidationError};
use crate::model::{Reservation, TimeRange};

fn find_conflict<'a>(
    range: &TimeRange,
    reservations: &'a [Reservation],
    exclude: Option<Uuid>,
    involves: impl Fn(&Reservation) -> bool,
) -> Option<&'a Reservation> {
    reservations.iter().find(|existing| {
        exclude != Some(existing.id)
            && existing.is_active()
            && involves(existing)
            && existing.range().overlaps(range)
    })
}

fn reject_on_conflict(
    conflict: Option<&Reservation>,
    code: ValidationCode,
) -> Result<(), ValidationError> {
    match conflict {
        Some(existing) => {
            trace!("{} conflicts with reservation {}", code, existing.id);
            Err(ValidationError::new(code))
        }
        None => Ok(()),
    }
}

/// Reject a slot that overlaps another booking of the same aircraft.
///
/// # Errors
///
/// `OVERLAPPING_RESERVATION`.
pub fn validate_aircraft_overlap(
    range: &TimeRange,
    aircraft_id: &str,
    reservations: &[Reservation],
    exclude: Option<Uuid>,
) -> Result<(), ValidationError> {
    let conflict = find_conflict(range, reservations, exclude, |r| r.aircraft_id == aircraft_id);
    reject_on_conflict(conflict, ValidationCode::OverlappingReservation)
}

/// Reject a slot during which the pilot already flies, on any aircraft.
///
/// # Errors
///
/// `PILOT_OVERLAP`.
pub fn validate_pilot_overlap(
    range: &TimeRange,
    pilot_id: &str,
    reservations: &[Reservation],
    exclude: Option<Uuid>,
) -> Result<(), ValidationError> {
    let conflict = find_conflict(range, reservations, exclude, |r| r.pilot_id == pilot_id);
    reject_on_conflict(conflict, ValidationCode::PilotOverlap)
}

/// Reject a slot during which the instructor already flies, on any aircraft.
///
/// A candidate without an instructor is always accepted.
///
/// # Errors
///
/// `INSTRUCTOR_OVERLAP`.
pub fn validate_instructor_overlap(
    range: &TimeRange,
    instructor_id: Option<&str>,
    reservations: &[Reservation],
    exclude: Option<Uuid>,
) -> Result<(), ValidationError> {
    let Some(instructor_id) = instructor_id else {
        return Ok(());
    };
    let conflict = find_conflict(range, reservations, exclude, |r| {
        r.instructor_id.as_deref() == Some(instructor_id)
    });
    reject_on_conflict(conflict, ValidationCode::InstructorOverlap)
}
