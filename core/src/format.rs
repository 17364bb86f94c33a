//! Date-time display helpers.
//!
//! Inputs are whatever the server or a date-time input field hands back:
//! RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM[:SS]` values (local time)
//! or bare `YYYY-MM-DD` dates (UTC midnight). Anything else, including local
//! times skipped by a DST change, is `DateFormatError::InvalidDate`.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// `datetime-local` input layout.
const INPUT_LAYOUT: &str = "%Y-%m-%dT%H:%M";

/// `Mar 5, 2024, 09:07 AM`
const DISPLAY_LAYOUT: &str = "%b %-d, %Y, %I:%M %p";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateFormatError {
    /// Carries the rejected input.
    #[error("Invalid Date")]
    InvalidDate(String),
}

/// Human-readable local time, e.g. `Mar 5, 2024, 09:07 AM`.
pub fn format_date_time(input: &str) -> Result<String, DateFormatError> {
    format_date_time_in(input, &Local)
}

pub fn format_date_time_in<Tz>(input: &str, tz: &Tz) -> Result<String, DateFormatError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    Ok(parse_date_time_in(input, tz)?.format(DISPLAY_LAYOUT).to_string())
}

/// Zero-padded local `YYYY-MM-DDTHH:MM` for a date-time input control.
pub fn format_date_for_input(input: &str) -> Result<String, DateFormatError> {
    format_date_for_input_in(input, &Local)
}

pub fn format_date_for_input_in<Tz>(input: &str, tz: &Tz) -> Result<String, DateFormatError>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    Ok(parse_date_time_in(input, tz)?.format(INPUT_LAYOUT).to_string())
}

/// Parse `input` and express it in `tz`.
pub fn parse_date_time_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Tz>, DateFormatError> {
    let invalid = || DateFormatError::InvalidDate(input.to_string());
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(tz));
    }
    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|layout| DateTime::<FixedOffset>::parse_from_str(trimmed, layout).ok())
    {
        return Ok(parsed.with_timezone(tz));
    }
    if let Some(utc) = trimmed.strip_suffix('Z').or_else(|| trimmed.strip_suffix('z')) {
        let naive = parse_naive(utc).ok_or_else(invalid)?;
        return Ok(Utc.from_utc_datetime(&naive).with_timezone(tz));
    }
    if let Some(naive) = parse_naive(trimmed) {
        return tz.from_local_datetime(&naive).earliest().ok_or_else(invalid);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        return Ok(Utc.from_utc_datetime(&midnight).with_timezone(tz));
    }
    Err(invalid())
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
}
