//! Half-open time ranges.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A time range `[start, end)`: the start instant is included, the end
/// instant is excluded.
///
/// Construction does not check ordering. An inverted range is representable so
/// that the validation pipeline can report it with a proper code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range from its bounds.
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Create a range from a start and a length.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Self {
        Self {
            start,
            end: start + length,
        }
    }

    /// Length of the range. Negative when the range is inverted.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether `end` is strictly after `start`.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.start < self.end
    }

    /// Half-open overlap test.
    ///
    /// Ranges sharing a start or an end overlap; ranges that merely touch
    /// (`a.end == b.start`) do not.
    #[must_use]
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 3, hour, minute, 0).unwrap()
    }

    fn range(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeRange {
        TimeRange::new(at(h1, m1), at(h2, m2))
    }

    /// The start-within / end-within / enclosing formulation.
    fn three_pattern(candidate: &TimeRange, existing: &TimeRange) -> bool {
        (candidate.start >= existing.start && candidate.start < existing.end)
            || (candidate.end > existing.start && candidate.end <= existing.end)
            || (candidate.start <= existing.start && candidate.end >= existing.end)
    }

    #[test]
    fn test_touching_ranges_do_not_overlap() {
        let a = range(10, 0, 12, 0);
        let b = range(12, 0, 14, 0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_equal_start_overlaps() {
        assert!(range(10, 0, 11, 0).overlaps(&range(10, 0, 12, 0)));
    }

    #[test]
    fn test_equal_end_overlaps() {
        assert!(range(9, 0, 12, 0).overlaps(&range(11, 0, 12, 0)));
    }

    #[test]
    fn test_enclosing_overlaps() {
        assert!(range(9, 0, 17, 0).overlaps(&range(10, 0, 11, 0)));
        assert!(range(10, 0, 11, 0).overlaps(&range(9, 0, 17, 0)));
    }

    #[test]
    fn test_general_test_matches_three_patterns_at_boundaries() {
        let existing = range(10, 0, 12, 0);
        let candidates = [
            range(8, 0, 10, 0),
            range(8, 0, 10, 1),
            range(10, 0, 10, 15),
            range(11, 0, 13, 0),
            range(11, 59, 12, 0),
            range(12, 0, 14, 0),
            range(9, 0, 13, 0),
            range(10, 0, 12, 0),
            range(12, 1, 13, 0),
        ];
        for candidate in candidates {
            assert_eq!(
                candidate.overlaps(&existing),
                three_pattern(&candidate, &existing),
                "mismatch for {candidate}"
            );
        }
    }

    #[test]
    fn test_duration_and_ordering() {
        let r = range(10, 0, 11, 30);
        assert_eq!(r.duration(), Duration::minutes(90));
        assert!(r.is_ordered());

        let inverted = range(11, 0, 10, 0);
        assert!(!inverted.is_ordered());
        assert!(inverted.duration() < Duration::zero());
    }

    #[test]
    fn test_starting_at() {
        let r = TimeRange::starting_at(at(8, 0), Duration::hours(2));
        assert_eq!(r, range(8, 0, 10, 0));
    }
}
