//! Booking service: validated writes against the club database.
//!
//! Every mutation that can create a conflict (new booking, moved booking) loads
//! its snapshot, runs [`validate_reservation`] and writes inside one
//! [`Storage::immediate`] section, so two concurrent bookings of the same slot
//! cannot both pass validation.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    Availability, Flight, NewAvailability, NewFlight, NewReservation, OperatingHours,
    Reservation, SlotType, TimeRange,
};
use crate::recurrence::{self, WeeklyRecurrence};
use crate::storage::Storage;
use crate::validation::{validate_reservation, Candidate, ValidationContext};

/// Whose calendar to expand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarOwner {
    /// An aircraft, by registration.
    Aircraft(String),
    /// A member, by id.
    User(String),
}

/// One expanded occurrence of an availability record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    /// Record the occurrence was expanded from.
    pub availability_id: Uuid,
    /// Availability or blackout.
    pub slot_type: SlotType,
    /// The occurrence itself.
    pub range: TimeRange,
    /// Whether the record repeats.
    pub recurring: bool,
    /// Why the window exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Validated reservation workflow over a [`Storage`].
#[derive(Debug)]
pub struct BookingService<'a> {
    storage: &'a mut Storage,
    hours: OperatingHours,
    timezone: Tz,
}

impl<'a> BookingService<'a> {
    /// Create a service with explicit club rules.
    pub fn new(storage: &'a mut Storage, hours: OperatingHours, timezone: Tz) -> Self {
        Self {
            storage,
            hours,
            timezone,
        }
    }

    /// Create a service with the rules of a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured timezone is unknown.
    pub fn from_config(storage: &'a mut Storage, config: &Config) -> Result<Self> {
        Ok(Self::new(storage, config.operating_hours(), config.timezone()?))
    }

    /// The underlying storage, for read-only queries.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &*self.storage
    }

    /// The club timezone.
    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    fn context(&self, now: DateTime<Utc>) -> ValidationContext {
        ValidationContext::new(self.hours, self.timezone, now)
    }

    /// Validate `candidate` against the stored state without writing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] if a booking rule is broken, or a database
    /// error if the snapshot cannot be loaded.
    pub fn check(&self, candidate: &Candidate, now: DateTime<Utc>) -> Result<()> {
        validate_against(&*self.storage, candidate, &self.context(now))
    }

    /// Validate and store a new reservation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a missing owner or aircraft,
    /// [`Error::Rejected`] if a booking rule is broken, or a database error.
    pub fn reserve(&mut self, new: NewReservation, now: DateTime<Utc>) -> Result<Reservation> {
        require_non_empty("user", &new.user_id)?;
        require_non_empty("aircraft", &new.aircraft_id)?;

        let candidate = Candidate::from(&new);
        let context = self.context(now);
        let reservation = new.into_reservation(now);

        self.storage.immediate(|tx| {
            validate_against(tx, &candidate, &context)?;
            tx.insert_reservation(&reservation)
        })?;

        info!(
            "Reserved {} for {} ({})",
            reservation.aircraft_id, reservation.pilot_id, reservation.id
        );
        Ok(reservation)
    }

    /// Move a reservation to a new slot and, optionally, another aircraft.
    ///
    /// The reservation never conflicts with its own previous slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id, [`Error::InvalidInput`]
    /// for a cancelled reservation, [`Error::Rejected`] if a booking rule is
    /// broken, or a database error.
    pub fn reschedule(
        &mut self,
        id: Uuid,
        range: TimeRange,
        aircraft_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Reservation> {
        if let Some(aircraft) = &aircraft_id {
            require_non_empty("aircraft", aircraft)?;
        }
        let context = self.context(now);

        let moved = self.storage.immediate(|tx| {
            let mut reservation = tx
                .get_reservation(id)?
                .ok_or_else(|| Error::not_found("reservation", id))?;
            if !reservation.is_active() {
                return Err(Error::invalid_input(format!(
                    "reservation {id} is cancelled"
                )));
            }

            reservation.start_time = range.start;
            reservation.end_time = range.end;
            if let Some(aircraft) = aircraft_id {
                reservation.aircraft_id = aircraft;
            }

            validate_against(tx, &Candidate::for_existing(&reservation), &context)?;

            reservation.updated_at = now;
            if !tx.update_reservation(&reservation)? {
                return Err(Error::internal(format!(
                    "reservation {id} disappeared while being moved"
                )));
            }
            Ok(reservation)
        })?;

        info!("Moved reservation {} to {}", moved.id, moved.range());
        Ok(moved)
    }

    /// Delete a reservation together with its logged flights.
    ///
    /// Returns `true` if the reservation existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cancel(&mut self, id: Uuid) -> Result<bool> {
        let existed = self.storage.immediate(|tx| tx.delete_reservation(id))?;
        if !existed {
            debug!("Nothing to cancel for {}", id);
        }
        Ok(existed)
    }

    /// Log a flight flown under a reservation.
    ///
    /// Without `duration_minutes`, the booked slot length is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown reservation, or a database
    /// error.
    pub fn log_flight(
        &mut self,
        reservation_id: Uuid,
        duration_minutes: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Flight> {
        self.storage.immediate(|tx| {
            let reservation = tx
                .get_reservation(reservation_id)?
                .ok_or_else(|| Error::not_found("reservation", reservation_id))?;
            let flight = NewFlight::from_reservation(&reservation, duration_minutes).into_flight(now);
            tx.insert_flight(&flight)?;
            Ok(flight)
        })
    }

    /// Store an availability or blackout window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the record does not have exactly
    /// one owner, does not end after it starts, or carries an unusable weekly
    /// rule; otherwise a database error.
    pub fn add_availability(
        &mut self,
        mut new: NewAvailability,
        now: DateTime<Utc>,
    ) -> Result<Availability> {
        // Blank owners are stored as NULL
        new.aircraft_id = new.aircraft_id.filter(|id| !id.trim().is_empty());
        new.user_id = new.user_id.filter(|id| !id.trim().is_empty());
        if new.aircraft_id.is_some() == new.user_id.is_some() {
            return Err(Error::invalid_input(
                "an availability belongs to exactly one of an aircraft or a member",
            ));
        }

        let anchor = TimeRange::new(new.start_time, new.end_time);
        if !anchor.is_ordered() {
            return Err(Error::invalid_input(format!(
                "availability must end after it starts: {anchor}"
            )));
        }

        if let Some(pattern) = &new.recurrence_pattern {
            WeeklyRecurrence::parse(pattern, anchor, new.recurrence_end_date, self.timezone)
                .map_err(|e| Error::invalid_input(e.to_string()))?;

            let first_day = anchor.start.with_timezone(&self.timezone).date_naive();
            if new.recurrence_end_date.is_some_and(|until| until < first_day) {
                return Err(Error::invalid_input(format!(
                    "recurrence ends before its first occurrence on {first_day}"
                )));
            }
        }

        let record = new.into_availability(now);
        self.storage.immediate(|tx| tx.insert_availability(&record))?;
        Ok(record)
    }

    /// Delete an availability record.
    ///
    /// Returns `true` if the record existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_availability(&mut self, id: Uuid) -> Result<bool> {
        self.storage.immediate(|tx| tx.delete_availability(id))
    }

    /// Expanded availability occurrences for `owner` within `window`, in start
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be loaded.
    pub fn calendar(&self, owner: &CalendarOwner, window: TimeRange) -> Result<Vec<CalendarEntry>> {
        let records = match owner {
            CalendarOwner::Aircraft(id) => self.storage.availabilities_for_aircraft(id)?,
            CalendarOwner::User(id) => self.storage.availabilities_for_user(id)?,
        };

        let mut entries: Vec<CalendarEntry> = records
            .iter()
            .flat_map(|record| {
                recurrence::occurrences_overlapping(record, &window, self.timezone)
                    .into_iter()
                    .map(move |range| CalendarEntry {
                        availability_id: record.id,
                        slot_type: record.slot_type,
                        range,
                        recurring: record.is_recurring,
                        reason: record.reason.clone(),
                    })
            })
            .collect();

        entries.sort_by_key(|entry| entry.range.start);
        Ok(entries)
    }
}

/// Load the snapshot relevant to `candidate` and run the pipeline.
fn validate_against(
    storage: &Storage,
    candidate: &Candidate,
    context: &ValidationContext,
) -> Result<()> {
    let reservations = storage.reservations_in_window(&candidate.range)?;
    let availabilities = storage.availabilities_for_aircraft(&candidate.aircraft_id)?;
    debug!(
        "Snapshot: {} reservation(s), {} availability record(s)",
        reservations.len(),
        availabilities.len()
    );

    validate_reservation(candidate, context, &reservations, &availabilities)?;
    Ok(())
}

fn require_non_empty(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(format!("{what} id must not be empty")));
    }
    Ok(())
}
