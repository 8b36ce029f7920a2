//! Plain-text rendering of records in club time.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::booking::CalendarEntry;
use crate::model::{Availability, Flight, Reservation, ReservationStatus, TimeRange};

fn local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string()
}

/// A range as `2030-06-03 10:00 - 12:00`, or with both dates when it spans
/// midnight.
#[must_use]
pub fn format_range(range: &TimeRange, tz: Tz) -> String {
    let start = range.start.with_timezone(&tz);
    let end = range.end.with_timezone(&tz);
    if start.date_naive() == end.date_naive() {
        format!("{} - {}", start.format("%Y-%m-%d %H:%M"), end.format("%H:%M"))
    } else {
        format!("{} - {}", local(range.start, tz), local(range.end, tz))
    }
}

/// One line per reservation.
#[must_use]
pub fn format_reservation(reservation: &Reservation, tz: Tz) -> String {
    let mut line = format!(
        "{}  {}  {}  pilot {}",
        reservation.id,
        reservation.aircraft_id,
        format_range(&reservation.range(), tz),
        reservation.pilot_id
    );
    if reservation.user_id != reservation.pilot_id {
        line.push_str(&format!(" (for {})", reservation.user_id));
    }
    if let Some(instructor) = &reservation.instructor_id {
        line.push_str(&format!(", instructor {instructor}"));
    }
    if reservation.status == ReservationStatus::Cancelled {
        line.push_str("  [CANCELLED]");
    }
    line
}

/// One line per expanded calendar occurrence.
#[must_use]
pub fn format_calendar_entry(entry: &CalendarEntry, tz: Tz) -> String {
    let mut line = format!(
        "{}  {:<14}  {}",
        entry.availability_id,
        entry.slot_type.to_string(),
        format_range(&entry.range, tz)
    );
    if entry.recurring {
        line.push_str("  weekly");
    }
    if let Some(reason) = &entry.reason {
        line.push_str(&format!("  {reason}"));
    }
    line
}

/// Confirmation line for a stored availability record.
#[must_use]
pub fn format_availability(record: &Availability, tz: Tz) -> String {
    let owner = record
        .aircraft_id
        .as_deref()
        .or(record.user_id.as_deref())
        .unwrap_or("?");
    let mut line = format!(
        "{}  {}  {}  {}",
        record.id,
        owner,
        record.slot_type,
        format_range(&record.range(), tz)
    );
    if let Some(pattern) = &record.recurrence_pattern {
        line.push_str(&format!("  {pattern}"));
        if let Some(until) = record.recurrence_end_date {
            line.push_str(&format!(" until {until}"));
        }
    }
    line
}

/// Confirmation line for a logged flight.
#[must_use]
pub fn format_flight(flight: &Flight, tz: Tz) -> String {
    format!(
        "{}  {}  {}  {} min  pilot {}",
        flight.id,
        flight.aircraft_id,
        local(flight.departure_time, tz),
        flight.duration_minutes,
        flight.pilot_id
    )
}
