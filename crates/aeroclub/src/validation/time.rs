//! Structural checks on the requested slot.

use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;

use super::{ValidationCode, ValidationError};
use crate::model::{OperatingHours, TimeRange};

/// Shortest bookable slot.
pub const MIN_DURATION_MINUTES: i64 = 15;

/// Longest bookable slot (12 hours).
pub const MAX_DURATION_MINUTES: i64 = 12 * 60;

/// Reject inverted, too short, or too long slots.
///
/// # Errors
///
/// `INVALID_TIME_ORDER`, `DURATION_TOO_SHORT` or `DURATION_TOO_LONG`.
pub fn validate_times(range: &TimeRange) -> Result<(), ValidationError> {
    if !range.is_ordered() {
        return Err(ValidationError::new(ValidationCode::InvalidTimeOrder));
    }

    let duration = range.duration();
    if duration < Duration::minutes(MIN_DURATION_MINUTES) {
        return Err(ValidationError::new(ValidationCode::DurationTooShort));
    }
    if duration > Duration::minutes(MAX_DURATION_MINUTES) {
        return Err(ValidationError::new(ValidationCode::DurationTooLong));
    }

    Ok(())
}

/// Reject slots starting before opening or ending after closing.
///
/// Only the local wall-clock components are compared, never the full
/// timestamps. The start hour must be at least `hours.start_hour`. The end
/// may fall exactly on `hours.end_hour`:00; any later wall-clock time (a later
/// hour, or minutes past the closing hour) is rejected.
///
/// # Errors
///
/// `OUTSIDE_RESERVATION_HOURS`.
pub fn validate_hours(
    range: &TimeRange,
    hours: OperatingHours,
    tz: Tz,
) -> Result<(), ValidationError> {
    let start = range.start.with_timezone(&tz);
    let end = range.end.with_timezone(&tz);

    let starts_early = start.hour() < hours.start_hour;
    let ends_late = end.hour() > hours.end_hour
        || (end.hour() == hours.end_hour && (end.minute() > 0 || end.second() > 0));

    if starts_early || ends_late {
        return Err(ValidationError::outside_hours(hours));
    }
    Ok(())
}

/// Reject slots that do not start strictly after `now`.
///
/// # Errors
///
/// `PAST_RESERVATION`.
pub fn validate_in_future(start: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if start <= now {
        return Err(ValidationError::new(ValidationCode::PastReservation));
    }
    Ok(())
}
