//! Parsing of user-supplied times and weekdays.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{Error, Result};
use crate::recurrence::parse_weekday_code;

/// Local formats accepted besides RFC 3339.
const LOCAL_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse a time given on the command line.
///
/// RFC 3339 input carries its own offset. Anything else is read as club
/// wall-clock time in `tz`; on a backward DST change the earlier instant wins,
/// and a time skipped by a forward change is an error.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the text matches no accepted format or
/// names a local time that does not exist.
pub fn parse_time(input: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }

    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .ok_or_else(|| {
            Error::invalid_input(format!(
                "unrecognised time '{input}', expected RFC 3339 or YYYY-MM-DD HH:MM"
            ))
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| Error::invalid_input(format!("{input} does not exist in {}", tz.name())))
}

/// `clap` value parser for two-letter weekday codes.
///
/// # Errors
///
/// Returns a message naming the accepted codes.
pub fn parse_weekday(input: &str) -> std::result::Result<Weekday, String> {
    parse_weekday_code(input)
        .ok_or_else(|| format!("unknown weekday '{input}', expected one of MO TU WE TH FR SA SU"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Paris;

    #[test]
    fn test_rfc3339_keeps_its_offset() {
        let parsed = parse_time("2030-06-03T10:00:00+02:00", Paris).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2030, 6, 3, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_local_time_uses_club_timezone() {
        let summer = parse_time("2030-06-03 10:00", Paris).unwrap();
        assert_eq!(summer, Utc.with_ymd_and_hms(2030, 6, 3, 8, 0, 0).unwrap());

        let winter = parse_time("2030-01-07T10:00", Paris).unwrap();
        assert_eq!(winter, Utc.with_ymd_and_hms(2030, 1, 7, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_skipped_local_time_is_rejected() {
        // Clocks jump from 02:00 to 03:00 on 2030-03-31 in Paris
        let err = parse_time("2030-03-31 02:30", Paris).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = parse_time("tomorrow", Paris).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("mo"), Ok(Weekday::Mon));
        assert_eq!(parse_weekday("TH"), Ok(Weekday::Thu));
        assert!(parse_weekday("Monday").is_err());
    }
}
