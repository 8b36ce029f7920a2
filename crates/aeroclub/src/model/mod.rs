//! Domain types for the flying club.
//!
//! These are the values the validation pipeline and the booking service work
//! with. They carry no persistence concerns; the mapping to and from table rows
//! lives in [`crate::storage`].

mod availability;
mod club;
mod flight;
mod range;
mod reservation;

pub use availability::{Availability, NewAvailability, SlotType};
pub use club::OperatingHours;
pub use flight::{Flight, NewFlight};
pub use range::TimeRange;
pub use reservation::{NewReservation, Reservation, ReservationStatus};
