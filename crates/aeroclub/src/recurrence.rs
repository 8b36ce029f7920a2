//! Weekly recurrence expansion for availability records.
//!
//! Rules are RFC 5545 `RRULE` bodies such as `FREQ=WEEKLY;BYDAY=MO,TH`. The
//! anchor occurrence of the record becomes `DTSTART` in the club timezone, so
//! weekdays are evaluated on the local calendar. Expansion itself is delegated
//! to the `rrule` crate; this module only handles windowing.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use rrule::RRuleSet;
use thiserror::Error;
use tracing::{trace, warn};

use crate::model::{Availability, TimeRange};

/// Upper bound on occurrences walked for a single window.
///
/// Open-ended rules start their walk just before the window, so only rules
/// with their own `COUNT` or `UNTIL`, or very wide windows, come near it.
pub const MAX_OCCURRENCES: usize = 20_000;

/// Why a recurrence rule could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    /// The record is flagged recurring but carries no rule.
    #[error("recurring record has no recurrence pattern")]
    MissingPattern,

    /// The rule does not repeat weekly.
    #[error("only weekly rules are supported, got: {0}")]
    NotWeekly(String),

    /// The rule was rejected by the rule parser.
    #[error("invalid recurrence rule '{pattern}': {message}")]
    Invalid {
        /// The offending rule.
        pattern: String,
        /// Parser diagnostic.
        message: String,
    },
}

/// A parsed weekly rule bound to its anchor occurrence.
#[derive(Debug, Clone)]
pub struct WeeklyRecurrence {
    pattern: String,
    /// Anchor start on the club's wall clock.
    anchor: NaiveDateTime,
    tz: Tz,
    /// Weeks between repetitions (`INTERVAL`).
    period_weeks: i64,
    /// The rule carries its own `COUNT` or `UNTIL`.
    self_bounded: bool,
    duration: Duration,
    until: Option<DateTime<Utc>>,
}

impl WeeklyRecurrence {
    /// Parse `pattern` anchored at `anchor`, evaluated in `tz`.
    ///
    /// `until` is the last local calendar day on which an occurrence may start.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule is not weekly or cannot be parsed.
    pub fn parse(
        pattern: &str,
        anchor: TimeRange,
        until: Option<NaiveDate>,
        tz: Tz,
    ) -> Result<Self, RecurrenceError> {
        let pattern = pattern.trim();
        if !is_weekly(pattern) {
            return Err(RecurrenceError::NotWeekly(pattern.to_string()));
        }

        let rule = Self {
            pattern: pattern.to_string(),
            anchor: anchor.start.with_timezone(&tz).naive_local(),
            tz,
            period_weeks: rule_part(pattern, "INTERVAL")
                .and_then(|value| value.parse::<i64>().ok())
                .filter(|weeks| *weeks > 0)
                .unwrap_or(1),
            self_bounded: rule_part(pattern, "COUNT").is_some()
                || rule_part(pattern, "UNTIL").is_some(),
            duration: anchor.duration(),
            until: until.and_then(|day| end_of_local_day(day, tz)),
        };
        rule.rule_set(rule.anchor)?;
        Ok(rule)
    }

    /// Parse the rule stored on a recurring record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record has no rule or the rule is unusable.
    pub fn from_availability(record: &Availability, tz: Tz) -> Result<Self, RecurrenceError> {
        let pattern = record
            .recurrence_pattern
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or(RecurrenceError::MissingPattern)?;
        Self::parse(pattern, record.range(), record.recurrence_end_date, tz)
    }

    /// Length of each occurrence.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    fn rule_set(&self, dtstart: NaiveDateTime) -> Result<RRuleSet, RecurrenceError> {
        let text = format!(
            "DTSTART;TZID={}:{}\nRRULE:{}",
            self.tz.name(),
            dtstart.format("%Y%m%dT%H%M%S"),
            self.pattern
        );
        text.parse::<RRuleSet>().map_err(|err| RecurrenceError::Invalid {
            pattern: self.pattern.clone(),
            message: err.to_string(),
        })
    }

    /// Wall-clock start to expand from so that the walk begins shortly before
    /// `search_from` instead of at the anchor.
    ///
    /// The anchor moves by whole periods, which leaves an open-ended weekly
    /// rule's occurrences unchanged. Occurrences dropped by the move lie at
    /// least one period before `search_from`. Rules with `COUNT` or `UNTIL`
    /// depend on their real anchor and are never moved.
    fn scan_anchor(&self, search_from: DateTime<Utc>) -> NaiveDateTime {
        if self.self_bounded {
            return self.anchor;
        }
        let period_days = 7 * self.period_weeks;
        let lead_days = (search_from.with_timezone(&self.tz).date_naive() - self.anchor.date())
            .num_days();
        let periods = lead_days / period_days - 1;
        if periods <= 0 {
            return self.anchor;
        }
        self.anchor + Duration::days(periods * period_days)
    }

    /// Occurrences whose `[start, start + duration)` overlaps `window`.
    ///
    /// The scan starts one occurrence length before the window so that an
    /// occurrence beginning earlier but running into the window is caught.
    /// If the expansion cannot be completed the whole window is returned, so
    /// a blackout never silently stops blocking.
    #[must_use]
    pub fn occurrences_overlapping(&self, window: &TimeRange) -> Vec<TimeRange> {
        let search_from = window.start - self.duration;
        if self.until.is_some_and(|until| until <= search_from) {
            return Vec::new();
        }

        let scan_from = self.scan_anchor(search_from);
        let set = match self
            .rule_set(scan_from)
            .or_else(|_| self.rule_set(self.anchor))
        {
            Ok(set) => set,
            Err(err) => {
                warn!("Treating {} as fully covered: {}", window, err);
                return vec![*window];
            }
        };

        let mut hits = Vec::new();
        let mut walked = 0usize;
        for occurrence in &set {
            walked += 1;
            if walked > MAX_OCCURRENCES {
                warn!(
                    "Recurrence '{}' exceeded {} occurrences before {}; treating the window as covered",
                    self.pattern, MAX_OCCURRENCES, window
                );
                return vec![*window];
            }

            let start = occurrence.with_timezone(&Utc);
            if start >= window.end {
                break;
            }
            if self.until.is_some_and(|until| start >= until) {
                break;
            }
            if start < search_from {
                continue;
            }

            let candidate = TimeRange::starting_at(start, self.duration);
            if candidate.overlaps(window) {
                trace!("Occurrence {} overlaps {}", candidate, window);
                hits.push(candidate);
            }
        }

        hits
    }
}

/// Occurrences of `record` overlapping `window`.
///
/// One-off records yield their own range. Recurring records are expanded;
/// when the rule is unusable only the anchor occurrence is considered, so a
/// broken rule still blocks at least its literal interval.
#[must_use]
pub fn occurrences_overlapping(record: &Availability, window: &TimeRange, tz: Tz) -> Vec<TimeRange> {
    let anchor_only = || {
        let anchor = record.range();
        if anchor.overlaps(window) {
            vec![anchor]
        } else {
            Vec::new()
        }
    };

    if !record.is_recurring {
        return anchor_only();
    }

    match WeeklyRecurrence::from_availability(record, tz) {
        Ok(rule) => rule.occurrences_overlapping(window),
        Err(err) => {
            warn!(
                "Availability {} has an unusable recurrence ({}); checking anchor only",
                record.id, err
            );
            anchor_only()
        }
    }
}

/// Build a `FREQ=WEEKLY;BYDAY=..` rule from a set of weekdays.
#[must_use]
pub fn weekly_pattern(days: &[Weekday]) -> String {
    let by_day: Vec<&str> = days.iter().map(|day| weekday_code(*day)).collect();
    format!("FREQ=WEEKLY;BYDAY={}", by_day.join(","))
}

/// Two-letter RFC 5545 code for a weekday.
#[must_use]
pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Parse a two-letter RFC 5545 weekday code.
#[must_use]
pub fn parse_weekday_code(code: &str) -> Option<Weekday> {
    match code.trim().to_ascii_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

fn is_weekly(pattern: &str) -> bool {
    rule_part(pattern, "FREQ").is_some_and(|value| value.eq_ignore_ascii_case("WEEKLY"))
}

/// Value of `key` in a `KEY=VALUE;..` rule body.
fn rule_part<'a>(pattern: &'a str, key: &str) -> Option<&'a str> {
    pattern.split(';').find_map(|part| {
        part.split_once('=')
            .filter(|(k, _)| k.trim().eq_ignore_ascii_case(key))
            .map(|(_, value)| value.trim())
    })
}

/// First instant of the day after `day`, in `tz`.
fn end_of_local_day(day: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let next = day.succ_opt()?.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&next)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
