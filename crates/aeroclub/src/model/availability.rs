//! Availability and blackout windows.
//!
//! Aircraft-level and member-level records share one shape: exactly one of
//! `aircraft_id` and `user_id` is set. Recurring records repeat weekly from
//! their anchor `[start_time, end_time)`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TimeRange;

/// Whether a window opens or closes a resource for booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    /// The resource is explicitly bookable during the window.
    Availability,
    /// The resource is blacked out during the window.
    #[default]
    Unavailability,
}

impl std::fmt::Display for SlotType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Availability => write!(f, "availability"),
            Self::Unavailability => write!(f, "unavailability"),
        }
    }
}

impl std::str::FromStr for SlotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "availability" => Ok(Self::Availability),
            "unavailability" => Ok(Self::Unavailability),
            other => Err(format!("unknown slot type: {other}")),
        }
    }
}

/// A stored availability or blackout window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// Record identifier.
    pub id: Uuid,
    /// Aircraft the window applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft_id: Option<String>,
    /// Member the window applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Start of the anchor occurrence.
    pub start_time: DateTime<Utc>,
    /// End of the anchor occurrence.
    pub end_time: DateTime<Utc>,
    /// Availability or blackout.
    pub slot_type: SlotType,
    /// Whether the window repeats.
    pub is_recurring: bool,
    /// Weekly rule, e.g. `FREQ=WEEKLY;BYDAY=MO,TH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_pattern: Option<String>,
    /// Last calendar day (club local time) on which an occurrence may start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_end_date: Option<NaiveDate>,
    /// Why the window exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

impl Availability {
    /// The anchor occurrence.
    #[must_use]
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    /// Length of every occurrence.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Whether this record blacks out the given aircraft.
    ///
    /// Member-scoped records never apply to aircraft, even when an aircraft id
    /// is also present.
    #[must_use]
    pub fn blacks_out_aircraft(&self, aircraft_id: &str) -> bool {
        self.slot_type == SlotType::Unavailability
            && self.user_id.is_none()
            && self.aircraft_id.as_deref() == Some(aircraft_id)
    }
}

/// Input for creating an availability record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAvailability {
    /// Aircraft the window applies to.
    pub aircraft_id: Option<String>,
    /// Member the window applies to.
    pub user_id: Option<String>,
    /// Start of the anchor occurrence.
    pub start_time: DateTime<Utc>,
    /// End of the anchor occurrence.
    pub end_time: DateTime<Utc>,
    /// Availability or blackout.
    pub slot_type: SlotType,
    /// Weekly rule; its presence makes the record recurring.
    pub recurrence_pattern: Option<String>,
    /// Inclusive last day of the recurrence.
    pub recurrence_end_date: Option<NaiveDate>,
    /// Why the window exists.
    pub reason: Option<String>,
}

impl NewAvailability {
    /// A one-off blackout for an aircraft.
    #[must_use]
    pub fn aircraft_blackout(
        aircraft_id: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            aircraft_id: Some(aircraft_id.into()),
            user_id: None,
            start_time,
            end_time,
            slot_type: SlotType::Unavailability,
            recurrence_pattern: None,
            recurrence_end_date: None,
            reason: None,
        }
    }

    /// A one-off window for a member.
    #[must_use]
    pub fn for_user(
        user_id: impl Into<String>,
        slot_type: SlotType,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            aircraft_id: None,
            user_id: Some(user_id.into()),
            start_time,
            end_time,
            slot_type,
            recurrence_pattern: None,
            recurrence_end_date: None,
            reason: None,
        }
    }

    /// Repeat the window weekly according to `pattern`, optionally until
    /// `until` (inclusive).
    #[must_use]
    pub fn repeating(mut self, pattern: impl Into<String>, until: Option<NaiveDate>) -> Self {
        self.recurrence_pattern = Some(pattern.into());
        self.recurrence_end_date = until;
        self
    }

    /// Attach a reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Whether the record will repeat.
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.recurrence_pattern.is_some()
    }

    /// Materialize the record with a fresh id, stamped at `now`.
    #[must_use]
    pub fn into_availability(self, now: DateTime<Utc>) -> Availability {
        let is_recurring = self.is_recurring();
        Availability {
            id: Uuid::new_v4(),
            aircraft_id: self.aircraft_id,
            user_id: self.user_id,
            start_time: self.start_time,
            end_time: self.end_time,
            slot_type: self.slot_type,
            is_recurring,
            recurrence_pattern: self.recurrence_pattern,
            recurrence_end_date: if is_recurring {
                self.recurrence_end_date
            } else {
                None
            },
            reason: self.reason,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2030, 6, 3, 8, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2030, 6, 3, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_slot_type_parse_and_display() {
        assert_eq!("availability".parse::<SlotType>(), Ok(SlotType::Availability));
        assert_eq!(
            "unavailability".parse::<SlotType>(),
            Ok(SlotType::Unavailability)
        );
        assert!("busy".parse::<SlotType>().is_err());
        assert_eq!(SlotType::Unavailability.to_string(), "unavailability");
    }

    #[test]
    fn test_aircraft_blackout_applies_only_to_its_aircraft() {
        let (start, end) = window();
        let record = NewAvailability::aircraft_blackout("F-GABC", start, end).into_availability(start);
        assert!(record.blacks_out_aircraft("F-GABC"));
        assert!(!record.blacks_out_aircraft("F-HXYZ"));
    }

    #[test]
    fn test_user_scoped_record_never_blacks_out_aircraft() {
        let (start, end) = window();
        let mut record = NewAvailability::for_user("alice", SlotType::Unavailability, start, end)
            .into_availability(start);
        record.aircraft_id = Some("F-GABC".to_string());
        assert!(!record.blacks_out_aircraft("F-GABC"));
    }

    #[test]
    fn test_availability_slot_is_not_a_blackout() {
        let (start, end) = window();
        let mut new = NewAvailability::aircraft_blackout("F-GABC", start, end);
        new.slot_type = SlotType::Availability;
        assert!(!new.into_availability(start).blacks_out_aircraft("F-GABC"));
    }

    #[test]
    fn test_repeating_sets_recurrence() {
        let (start, end) = window();
        let until = NaiveDate::from_ymd_opt(2030, 12, 31).unwrap();
        let record = NewAvailability::aircraft_blackout("F-GABC", start, end)
            .repeating("FREQ=WEEKLY;BYDAY=MO", Some(until))
            .with_reason("maintenance")
            .into_availability(start);
        assert!(record.is_recurring);
        assert_eq!(record.recurrence_end_date, Some(until));
        assert_eq!(record.duration(), Duration::hours(2));
        assert_eq!(record.reason.as_deref(), Some("maintenance"));
    }

    #[test]
    fn test_end_date_dropped_without_pattern() {
        let (start, end) = window();
        let mut new = NewAvailability::aircraft_blackout("F-GABC", start, end);
        new.recurrence_end_date = NaiveDate::from_ymd_opt(2030, 12, 31);
        let record = new.into_availability(start);
        assert!(!record.is_recurring);
        assert!(record.recurrence_end_date.is_none());
    }
}
