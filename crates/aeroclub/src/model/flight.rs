//! Logged flights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Reservation;

/// A flight entered in the club log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Flight identifier.
    pub id: Uuid,
    /// Reservation the flight was flown under, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<Uuid>,
    /// Pilot in command.
    pub pilot_id: String,
    /// Aircraft flown.
    pub aircraft_id: String,
    /// Block-off time.
    pub departure_time: DateTime<Utc>,
    /// Block time in minutes.
    pub duration_minutes: u32,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// Input for logging a flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFlight {
    /// Reservation the flight was flown under, if any.
    pub reservation_id: Option<Uuid>,
    /// Pilot in command.
    pub pilot_id: String,
    /// Aircraft flown.
    pub aircraft_id: String,
    /// Block-off time.
    pub departure_time: DateTime<Utc>,
    /// Block time in minutes.
    pub duration_minutes: u32,
}

impl NewFlight {
    /// Prefill a flight from the reservation it was flown under.
    ///
    /// Without an explicit duration, the booked slot length is used.
    #[must_use]
    pub fn from_reservation(reservation: &Reservation, duration_minutes: Option<u32>) -> Self {
        let booked = reservation.range().duration().num_minutes();
        Self {
            reservation_id: Some(reservation.id),
            pilot_id: reservation.pilot_id.clone(),
            aircraft_id: reservation.aircraft_id.clone(),
            departure_time: reservation.start_time,
            duration_minutes: duration_minutes
                .unwrap_or_else(|| u32::try_from(booked).unwrap_or(0)),
        }
    }

    /// Materialize the flight with a fresh id, stamped at `now`.
    #[must_use]
    pub fn into_flight(self, now: DateTime<Utc>) -> Flight {
        Flight {
            id: Uuid::new_v4(),
            reservation_id: self.reservation_id,
            pilot_id: self.pilot_id,
            aircraft_id: self.aircraft_id,
            departure_time: self.departure_time,
            duration_minutes: self.duration_minutes,
            created_at: now,
        }
    }
}
