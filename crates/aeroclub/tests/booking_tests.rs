//! End-to-end booking scenarios against an in-memory database.
//!
//! All wall-clock times are Europe/Paris. 2030-06-03 is a Monday.

use aeroclub::recurrence::weekly_pattern;
use aeroclub::{
    BookingService, CalendarOwner, Candidate, Error, NewAvailability, NewReservation,
    OperatingHours, ReservationFilter, SlotType, Storage, TimeRange, ValidationCode,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Europe::Paris;

fn paris(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Paris
        .with_ymd_and_hms(2030, 6, day, hour, minute, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn slot(day: u32, from: (u32, u32), to: (u32, u32)) -> TimeRange {
    TimeRange::new(paris(day, from.0, from.1), paris(day, to.0, to.1))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap()
}

fn new_booking(user: &str, aircraft: &str, range: TimeRange) -> NewReservation {
    NewReservation::new(user, aircraft, range.start, range.end)
}

fn code(err: &Error) -> ValidationCode {
    err.rejection().expect("expected a rejection").code
}

fn with_service(test: impl FnOnce(&mut BookingService<'_>)) {
    let mut storage = Storage::open_in_memory().expect("in-memory storage");
    let mut service = BookingService::new(&mut storage, OperatingHours::default(), Paris);
    test(&mut service);
}

#[test]
fn adjacent_bookings_share_an_aircraft() {
    with_service(|service| {
        service
            .reserve(new_booking("alice", "F-GABC", slot(3, (10, 0), (12, 0))), now())
            .unwrap();
        service
            .reserve(new_booking("bob", "F-GABC", slot(3, (14, 0), (16, 0))), now())
            .unwrap();

        let err = service
            .reserve(new_booking("carol", "F-GABC", slot(3, (11, 0), (13, 0))), now())
            .unwrap_err();
        assert_eq!(code(&err), ValidationCode::OverlappingReservation);

        service
            .reserve(new_booking("carol", "F-GABC", slot(3, (12, 0), (14, 0))), now())
            .unwrap();

        let day = service
            .storage()
            .list_reservations(&ReservationFilter::default().aircraft("F-GABC"))
            .unwrap();
        let pilots: Vec<_> = day.iter().map(|r| r.pilot_id.as_str()).collect();
        assert_eq!(pilots, ["alice", "carol", "bob"]);
    });
}

#[test]
fn pilot_cannot_fly_two_aircraft_at_once() {
    with_service(|service| {
        service
            .reserve(new_booking("alice", "F-GABC", slot(3, (9, 0), (10, 0))), now())
            .unwrap();

        let err = service
            .reserve(new_booking("alice", "F-HXYZ", slot(3, (9, 30), (10, 30))), now())
            .unwrap_err();
        assert_eq!(code(&err), ValidationCode::PilotOverlap);
    });
}

#[test]
fn instructor_is_checked_only_when_present() {
    with_service(|service| {
        service
            .reserve(
                new_booking("alice", "F-GABC", slot(3, (9, 0), (11, 0))).with_instructor("ivan"),
                now(),
            )
            .unwrap();

        let err = service
            .reserve(
                new_booking("bob", "F-HXYZ", slot(3, (10, 0), (12, 0))).with_instructor("ivan"),
                now(),
            )
            .unwrap_err();
        assert_eq!(code(&err), ValidationCode::InstructorOverlap);

        service
            .reserve(new_booking("bob", "F-HXYZ", slot(3, (10, 0), (12, 0))), now())
            .unwrap();
    });
}

#[test]
fn first_broken_rule_wins() {
    with_service(|service| {
        // Ten minutes long and before opening: only the duration is reported
        let candidate = Candidate::new("F-GABC", "alice", slot(3, (6, 0), (6, 10)));
        let err = service.check(&candidate, now()).unwrap_err();
        assert_eq!(code(&err), ValidationCode::DurationTooShort);
        assert_eq!(
            err.rejection().unwrap().message,
            ValidationCode::DurationTooShort.default_message()
        );
    });
}

#[test]
fn operating_hours_edges() {
    with_service(|service| {
        let early = Candidate::new("F-GABC", "alice", slot(3, (6, 45), (8, 0)));
        assert_eq!(
            code(&service.check(&early, now()).unwrap_err()),
            ValidationCode::OutsideReservationHours
        );

        let late = Candidate::new("F-GABC", "alice", slot(3, (19, 0), (21, 30)));
        assert_eq!(
            code(&service.check(&late, now()).unwrap_err()),
            ValidationCode::OutsideReservationHours
        );

        let closing = Candidate::new("F-GABC", "alice", slot(3, (19, 0), (21, 0)));
        service.check(&closing, now()).unwrap();
    });
}

#[test]
fn past_slots_are_refused() {
    with_service(|service| {
        let later = paris(3, 11, 0);
        let err = service
            .reserve(new_booking("alice", "F-GABC", slot(3, (10, 0), (12, 0))), later)
            .unwrap_err();
        assert_eq!(code(&err), ValidationCode::PastReservation);
    });
}

#[test]
fn weekly_blackout_blocks_mondays_only() {
    with_service(|service| {
        let anchor = slot(3, (8, 0), (10, 0));
        service
            .add_availability(
                NewAvailability::aircraft_blackout("F-GABC", anchor.start, anchor.end)
                    .repeating(weekly_pattern(&[Weekday::Mon]), None)
                    .with_reason("entretien hebdomadaire"),
                now(),
            )
            .unwrap();

        // A Monday months later, starting before and running into the window
        let monday = TimeRange::new(
            Paris
                .with_ymd_and_hms(2030, 11, 4, 9, 30, 0)
                .unwrap()
                .with_timezone(&Utc),
            Paris
                .with_ymd_and_hms(2030, 11, 4, 11, 0, 0)
                .unwrap()
                .with_timezone(&Utc),
        );
        let err = service
            .check(&Candidate::new("F-GABC", "alice", monday), now())
            .unwrap_err();
        assert_eq!(code(&err), ValidationCode::AircraftUnavailable);

        // Tuesday, same hours
        service
            .check(
                &Candidate::new("F-GABC", "alice", slot(4, (8, 0), (10, 0))),
                now(),
            )
            .unwrap();

        // Another aircraft is unaffected
        service
            .check(
                &Candidate::new("F-HXYZ", "alice", slot(10, (8, 0), (10, 0))),
                now(),
            )
            .unwrap();
    });
}

#[test]
fn blackout_ends_with_its_recurrence() {
    with_service(|service| {
        let anchor = slot(3, (8, 0), (10, 0));
        service
            .add_availability(
                NewAvailability::aircraft_blackout("F-GABC", anchor.start, anchor.end)
                    .repeating("FREQ=WEEKLY;BYDAY=MO", NaiveDate::from_ymd_opt(2030, 6, 10)),
                now(),
            )
            .unwrap();

        let last = Candidate::new("F-GABC", "alice", slot(10, (8, 0), (9, 0)));
        assert_eq!(
            code(&service.check(&last, now()).unwrap_err()),
            ValidationCode::AircraftUnavailable
        );

        let after = Candidate::new("F-GABC", "alice", slot(17, (8, 0), (9, 0)));
        service.check(&after, now()).unwrap();
    });
}

#[test]
fn member_unavailability_never_blocks_aircraft() {
    with_service(|service| {
        let range = slot(3, (8, 0), (12, 0));
        service
            .add_availability(
                NewAvailability::for_user("alice", SlotType::Unavailability, range.start, range.end),
                now(),
            )
            .unwrap();

        service
            .reserve(new_booking("bob", "F-GABC", slot(3, (9, 0), (11, 0))), now())
            .unwrap();
    });
}

#[test]
fn moving_keeps_self_out_of_the_way() {
    with_service(|service| {
        let booked = service
            .reserve(new_booking("alice", "F-GABC", slot(3, (10, 0), (12, 0))), now())
            .unwrap();

        let unchanged = service
            .reschedule(booked.id, booked.range(), None, now())
            .unwrap();
        assert_eq!(unchanged.range(), booked.range());

        let later = service
            .reschedule(booked.id, slot(3, (11, 0), (13, 0)), None, now())
            .unwrap();
        assert_eq!(later.range(), slot(3, (11, 0), (13, 0)));
        assert_eq!(later.created_at, booked.created_at);
    });
}

#[test]
fn cancelling_removes_logged_flights() {
    with_service(|service| {
        let booked = service
            .reserve(new_booking("alice", "F-GABC", slot(3, (10, 0), (12, 0))), now())
            .unwrap();
        service.log_flight(booked.id, Some(95), now()).unwrap();
        assert_eq!(
            service.storage().flights_for_reservation(booked.id).unwrap().len(),
            1
        );

        assert!(service.cancel(booked.id).unwrap());
        assert!(service.storage().get_reservation(booked.id).unwrap().is_none());
        assert_eq!(service.storage().stats().unwrap().flights, 0);
    });
}

#[test]
fn calendar_lists_member_windows() {
    with_service(|service| {
        let range = slot(4, (14, 0), (18, 0));
        service
            .add_availability(
                NewAvailability::for_user("alice", SlotType::Availability, range.start, range.end)
                    .repeating(weekly_pattern(&[Weekday::Tue]), None),
                now(),
            )
            .unwrap();

        let entries = service
            .calendar(
                &CalendarOwner::User("alice".to_string()),
                TimeRange::new(paris(1, 0, 0), paris(19, 0, 0)),
            )
            .unwrap();
        let starts: Vec<_> = entries.iter().map(|e| e.range.start).collect();
        assert_eq!(starts, [paris(4, 14, 0), paris(11, 14, 0), paris(18, 14, 0)]);
        assert!(entries.iter().all(|e| e.slot_type == SlotType::Availability));
    });
}
