use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{EventRecord, UpcomingEvent};

/// Day offsets (relative to today) that trigger a reminder.
pub const REMINDER_WINDOW: RangeInclusive<i64> = 1..=2;

// Month-first for slashed dates. `%B` and `%A` also accept abbreviations.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%A %B %d %Y",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

pub fn parse_event_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Some(date) = parse_compact(trimmed) {
        return Ok(date);
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
    {
        return Ok(date);
    }
    if let Some(stamp) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Ok(stamp.date());
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(stamp.date_naive());
    }

    Err(DateParseError::Unrecognized(trimmed.to_owned()))
}

// `YYYYMMDD`; chrono's `%Y` would swallow the whole digit run.
fn parse_compact(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = raw[..4].parse().ok()?;
    let month = raw[4..6].parse().ok()?;
    let day = raw[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    date.signed_duration_since(today).num_days()
}

/// Keeps the records that fall inside [`REMINDER_WINDOW`], sorted by
/// `(days_until, date)`. Records with unparseable dates are logged and skipped.
pub fn upcoming_events(records: &[EventRecord], today: NaiveDate) -> Vec<UpcomingEvent> {
    let mut upcoming: Vec<UpcomingEvent> = records
        .iter()
        .filter_map(|record| match parse_event_date(&record.date) {
            Ok(date) => Some((record, date)),
            Err(err) => {
                error!(
                    error = %err,
                    date = %record.date,
                    event = %record.event,
                    "failed to process event date"
                );
                None
            }
        })
        .filter_map(|(record, date)| {
            let days_until = days_until(date, today);
            if !REMINDER_WINDOW.contains(&days_until) {
                return None;
            }
            info!(event = %record.event, days_until, "found upcoming event");
            Some(UpcomingEvent {
                date,
                raw_date: record.date.clone(),
                event: record.event.clone(),
                days_until,
            })
        })
        .collect();

    sort_upcoming(&mut upcoming);
    upcoming
}

pub fn sort_upcoming(events: &mut [UpcomingEvent]) {
    events.sort_by(|a, b| {
        a.days_until
            .cmp(&b.days_until)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.raw_date.cmp(&b.raw_date))
    });
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("event date is empty")]
    Empty,
    #[error("unrecognized event date `{0}`")]
    Unrecognized(String),
}
