//! Exam slot calendar generation.
//!
//! Expands a date range into concrete sitting slots, skipping weekends
//! and listed holidays. Times are interpreted in the requested IANA
//! zone; unknown zone names fall back to UTC without erroring.
//!
//! Slot identifiers use the canonical form `YYYY-MM-DDThh:mmZ#N`
//! (`N` 1-based within the day, the `Z` literal regardless of zone) so
//! that allowed-slot inputs keyed on slot ids always match.

use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone, Weekday};
use chrono_tz::Tz;

use crate::models::Slot;

/// A date or time parameter could not be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotGenError {
    /// A date is not `YYYY-MM-DD`.
    InvalidDate {
        /// Which parameter carried the value.
        field: &'static str,
        /// The offending value.
        value: String,
    },
    /// A slot time is not `HH:MM`.
    InvalidTime {
        /// The offending value.
        value: String,
    },
}

impl fmt::Display for SlotGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDate { field, value } => {
                write!(f, "invalid {field}: '{value}' is not an ISO date")
            }
            Self::InvalidTime { value } => {
                write!(f, "invalid slot time '{value}'")
            }
        }
    }
}

impl std::error::Error for SlotGenError {}

/// Generates the chronological slot list for an exam period.
///
/// Explicit `slot_times` (`HH:MM`) win over the evenly-spaced default;
/// with an empty list, `slots_per_day` sittings start at 09:00 and
/// follow each other back to back at `slot_duration_minutes` intervals.
/// Saturdays, Sundays, and dates listed in `holidays` produce no slots
/// and do not advance the working-day index.
pub fn generate_slots(
    start_date: &str,
    end_date: &str,
    slots_per_day: usize,
    slot_times: &[String],
    slot_duration_minutes: i64,
    holidays: &[String],
    timezone: &str,
) -> Result<Vec<Slot>, SlotGenError> {
    let tz: Tz = timezone.parse().unwrap_or(Tz::UTC);

    let start = parse_date(start_date, "start date")?;
    let end = parse_date(end_date, "end date")?;

    let times = day_times(slots_per_day, slot_times, slot_duration_minutes)?;
    let holiday_set: HashSet<&str> = holidays.iter().map(String::as_str).collect();
    let duration = TimeDelta::minutes(slot_duration_minutes);

    let mut slots = Vec::new();
    let mut day_index = 0;
    let mut date = start;
    while date <= end {
        let skip = matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
            || holiday_set.contains(date.format("%Y-%m-%d").to_string().as_str());
        if !skip {
            for (index_in_day, offset) in times.iter().enumerate() {
                let naive = date.and_time(NaiveTime::MIN) + *offset;
                let Some(start_instant) = tz.from_local_datetime(&naive).earliest() else {
                    continue; // local time does not exist (DST gap)
                };
                let id = format!(
                    "{}T{}Z#{}",
                    date.format("%Y-%m-%d"),
                    naive.time().format("%H:%M"),
                    index_in_day + 1
                );
                slots.push(Slot::new(
                    id,
                    start_instant,
                    start_instant + duration,
                    day_index,
                    index_in_day,
                ));
            }
            day_index += 1;
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    Ok(slots)
}

/// Offsets from midnight for each sitting of one day.
fn day_times(
    slots_per_day: usize,
    slot_times: &[String],
    slot_duration_minutes: i64,
) -> Result<Vec<TimeDelta>, SlotGenError> {
    if !slot_times.is_empty() {
        slot_times
            .iter()
            .map(|value| {
                NaiveTime::parse_from_str(value, "%H:%M")
                    .map(|t| t - NaiveTime::MIN)
                    .map_err(|_| SlotGenError::InvalidTime {
                        value: value.clone(),
                    })
            })
            .collect()
    } else {
        // Evenly spaced sittings from 09:00, back to back.
        Ok((0..slots_per_day)
            .map(|i| TimeDelta::hours(9) + TimeDelta::minutes(i as i64 * slot_duration_minutes))
            .collect())
    }
}

fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, SlotGenError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| SlotGenError::InvalidDate {
        field,
        value: value.to_string(),
    })
}
