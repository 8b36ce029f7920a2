//! Aircraft blackout windows.

use chrono_tz::Tz;
use tracing::trace;

use super::{ValidationCode, ValidationError};
use crate::model::{Availability, TimeRange};
use crate::recurrence::occurrences_overlapping;

/// Reject a slot that falls inside any blackout window of the aircraft.
///
/// Only `unavailability` records scoped to the aircraft are considered;
/// member-scoped records sharing the list are ignored. Recurring records are
/// expanded in `tz`; a record whose rule cannot be parsed still blocks its
/// anchor interval.
///
/// # Errors
///
/// `AIRCRAFT_UNAVAILABLE`.
pub fn validate_aircraft_availability(
    range: &TimeRange,
    aircraft_id: &str,
    availabilities: &[Availability],
    tz: Tz,
) -> Result<(), ValidationError> {
    for record in availabilities
        .iter()
        .filter(|record| record.blacks_out_aircraft(aircraft_id))
    {
        if let Some(hit) = occurrences_overlapping(record, range, tz).first() {
            trace!("Blackout {} ({}) covers {}", record.id, hit, range);
            return Err(ValidationError::new(ValidationCode::AircraftUnavailable));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewAvailability, SlotType};
    use crate::validation::fixtures::{paris, slot};
    use chrono::NaiveDate;
    use chrono_tz::Europe::Paris;

    fn monday_blackout(until: Option<NaiveDate>) -> Availability {
        let anchor = slot(3, (8, 0), (10, 0));
        NewAvailability::aircraft_blackout("A", anchor.start, anchor.end)
            .repeating("FREQ=WEEKLY;BYDAY=MO", until)
            .into_availability(paris(1, 0, 0))
    }

    fn check(range: &TimeRange, records: &[Availability]) -> Result<(), ValidationError> {
        validate_aircraft_availability(range, "A", records, Paris)
    }

    #[test]
    fn test_one_off_blackout_blocks_overlap() {
        let window = slot(5, (9, 0), (17, 0));
        let records = vec![NewAvailability::aircraft_blackout("A", window.start, window.end)
            .into_availability(paris(1, 0, 0))];

        let err = check(&slot(5, (16, 0), (18, 0)), &records).unwrap_err();
        assert_eq!(err.code, ValidationCode::AircraftUnavailable);
        assert!(check(&slot(5, (17, 0), (18, 0)), &records).is_ok());
    }

    #[test]
    fn test_weekly_blackout_blocks_future_mondays() {
        let records = vec![monday_blackout(None)];
        for monday in [10, 17, 24] {
            assert!(check(&slot(monday, (9, 0), (11, 0)), &records).is_err());
        }
    }

    #[test]
    fn test_weekly_blackout_leaves_tuesdays_free() {
        let records = vec![monday_blackout(None)];
        assert!(check(&slot(11, (8, 0), (10, 0)), &records).is_ok());
    }

    #[test]
    fn test_weekly_blackout_leaves_rest_of_monday_free() {
        let records = vec![monday_blackout(None)];
        assert!(check(&slot(10, (10, 0), (12, 0)), &records).is_ok());
        assert!(check(&slot(10, (7, 0), (8, 0)), &records).is_ok());
    }

    #[test]
    fn test_recurrence_end_date_respected() {
        let records = vec![monday_blackout(NaiveDate::from_ymd_opt(2030, 6, 10))];
        assert!(check(&slot(10, (9, 0), (10, 0)), &records).is_err());
        assert!(check(&slot(17, (9, 0), (10, 0)), &records).is_ok());
    }

    #[test]
    fn test_unparseable_rule_blocks_anchor_only() {
        let mut record = monday_blackout(None);
        record.recurrence_pattern = Some("FREQ=WEEKLY;BYDAY=XX".to_string());
        let records = vec![record];
        assert!(check(&slot(3, (9, 0), (11, 0)), &records).is_err());
        assert!(check(&slot(10, (9, 0), (11, 0)), &records).is_ok());
    }

    #[test]
    fn test_member_scoped_records_ignored() {
        let window = slot(5, (9, 0), (17, 0));
        let mut record = NewAvailability::for_user("alice", SlotType::Unavailability, window.start, window.end)
            .into_availability(paris(1, 0, 0));
        record.aircraft_id = Some("A".to_string());
        assert!(check(&slot(5, (10, 0), (11, 0)), &[record]).is_ok());
    }

    #[test]
    fn test_other_aircraft_blackout_ignored() {
        let window = slot(5, (9, 0), (17, 0));
        let records = vec![NewAvailability::aircraft_blackout("B", window.start, window.end)
            .into_availability(paris(1, 0, 0))];
        assert!(check(&slot(5, (10, 0), (11, 0)), &records).is_ok());
    }
}
