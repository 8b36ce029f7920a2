//! Aircraft reservations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TimeRange;

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// The slot is booked.
    #[default]
    Active,
    /// The slot was released; it no longer blocks other bookings.
    Cancelled,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}

/// One booked slot for one aircraft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation identifier.
    pub id: Uuid,
    /// Member who owns the booking.
    pub user_id: String,
    /// Member flying the aircraft.
    pub pilot_id: String,
    /// Instructor on board, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<String>,
    /// Booked aircraft.
    pub aircraft_id: String,
    /// Club-defined flight category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_type_id: Option<String>,
    /// Inclusive start of the slot.
    pub start_time: DateTime<Utc>,
    /// Exclusive end of the slot.
    pub end_time: DateTime<Utc>,
    /// Lifecycle state.
    pub status: ReservationStatus,
    /// Free-form notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last modification instant.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// The booked slot as a half-open range.
    #[must_use]
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    /// Whether the reservation still occupies its slot.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}

/// Input for creating a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    /// Member who owns the booking.
    pub user_id: String,
    /// Member flying the aircraft. Defaults to `user_id`.
    pub pilot_id: Option<String>,
    /// Instructor on board, if any.
    pub instructor_id: Option<String>,
    /// Aircraft to book.
    pub aircraft_id: String,
    /// Club-defined flight category.
    pub flight_type_id: Option<String>,
    /// Inclusive start of the slot.
    pub start_time: DateTime<Utc>,
    /// Exclusive end of the slot.
    pub end_time: DateTime<Utc>,
    /// Free-form notes.
    pub comments: Option<String>,
}

impl NewReservation {
    /// Create a solo booking where the owner is also the pilot.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        aircraft_id: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            pilot_id: None,
            instructor_id: None,
            aircraft_id: aircraft_id.into(),
            flight_type_id: None,
            start_time,
            end_time,
            comments: None,
        }
    }

    /// Book on behalf of another pilot.
    #[must_use]
    pub fn with_pilot(mut self, pilot_id: impl Into<String>) -> Self {
        self.pilot_id = Some(pilot_id.into());
        self
    }

    /// Add an instructor.
    #[must_use]
    pub fn with_instructor(mut self, instructor_id: impl Into<String>) -> Self {
        self.instructor_id = Some(instructor_id.into());
        self
    }

    /// Attach a comment.
    #[must_use]
    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    /// The pilot, falling back to the owner.
    #[must_use]
    pub fn effective_pilot(&self) -> &str {
        self.pilot_id.as_deref().unwrap_or(&self.user_id)
    }

    /// Materialize the reservation with a fresh id, stamped at `now`.
    #[must_use]
    pub fn into_reservation(self, now: DateTime<Utc>) -> Reservation {
        let pilot_id = self.effective_pilot().to_string();
        Reservation {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            pilot_id,
            instructor_id: self.instructor_id.filter(|id| !id.is_empty()),
            aircraft_id: self.aircraft_id,
            flight_type_id: self.flight_type_id,
            start_time: self.start_time,
            end_time: self.end_time,
            status: ReservationStatus::Active,
            comments: self.comments,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2030, 6, 3, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2030, 6, 3, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [ReservationStatus::Active, ReservationStatus::Cancelled] {
            let parsed: ReservationStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("PENDING".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&ReservationStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }

    #[test]
    fn test_pilot_defaults_to_owner() {
        let (start, end) = slot();
        let new = NewReservation::new("alice", "F-GABC", start, end);
        assert_eq!(new.effective_pilot(), "alice");

        let reservation = new.into_reservation(start);
        assert_eq!(reservation.pilot_id, "alice");
        assert!(reservation.is_active());
        assert_eq!(reservation.range().duration(), chrono::Duration::hours(2));
    }

    #[test]
    fn test_explicit_pilot_and_instructor() {
        let (start, end) = slot();
        let reservation = NewReservation::new("alice", "F-GABC", start, end)
            .with_pilot("bob")
            .with_instructor("carol")
            .into_reservation(start);
        assert_eq!(reservation.user_id, "alice");
        assert_eq!(reservation.pilot_id, "bob");
        assert_eq!(reservation.instructor_id.as_deref(), Some("carol"));
    }

    #[test]
    fn test_empty_instructor_is_dropped() {
        let (start, end) = slot();
        let reservation = NewReservation::new("alice", "F-GABC", start, end)
            .with_instructor("")
            .into_reservation(start);
        assert!(reservation.instructor_id.is_none());
    }
}
