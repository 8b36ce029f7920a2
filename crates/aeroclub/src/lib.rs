//! `aeroclub` - Aircraft reservations for a flying club
//!
//! This library provides the reservation validation pipeline (time sanity,
//! operating hours, future start, aircraft/pilot/instructor overlap and
//! aircraft blackout windows with weekly recurrence), a `SQLite` store for
//! reservations, availability windows and flights, and a booking service that
//! validates and writes in one transaction.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod booking;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod recurrence;
pub mod storage;
pub mod validation;

pub use booking::{BookingService, CalendarEntry, CalendarOwner};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use model::{
    Availability, Flight, NewAvailability, NewReservation, OperatingHours, Reservation,
    ReservationStatus, SlotType, TimeRange,
};
pub use storage::{ReservationFilter, Storage, StorageStats};
pub use validation::{
    validate_reservation, Candidate, ValidationCode, ValidationContext, ValidationError,
};
