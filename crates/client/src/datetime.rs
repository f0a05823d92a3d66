//! Datetime normalization for the API wire format
//!
//! Every timestamp sent to the API is the fixed-width
//! `YYYY-MM-DD HH:MM:SS` form. Callers hand over either a native chrono
//! value or a string in one of a few common shapes; anything else needs an
//! explicit strftime hint.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use floorlink_domain::{FloorLinkError, Result};

/// Output format for every timestamp on the wire. Example: `2021-04-24 15:30:05`.
pub const API_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// String shapes tried in order when no hint is given: ISO with seconds,
/// space-separated with fractional seconds, named-month offset form, and
/// date-only (normalized to midnight).
const COMMON_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%B-%dT%H:%M:%S%z",
    "%Y-%m-%d",
];

/// A timestamp heading for the API: either already parsed or still text.
#[derive(Debug, Clone)]
pub enum DateTimeInput {
    Timestamp(NaiveDateTime),
    Text(String),
}

impl From<NaiveDateTime> for DateTimeInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl From<DateTime<Local>> for DateTimeInput {
    fn from(value: DateTime<Local>) -> Self {
        Self::Timestamp(value.naive_local())
    }
}

impl From<DateTime<Utc>> for DateTimeInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value.naive_utc())
    }
}

impl From<&str> for DateTimeInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DateTimeInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Normalize a datetime value to [`API_DATETIME_FORMAT`].
///
/// Resolution order: a text value with a `hint` is parsed with that format
/// alone; a native timestamp is formatted directly (the hint does not apply);
/// remaining text values are tried against [`COMMON_FORMATS`] until one
/// parses. Fails with [`FloorLinkError::Format`] when no strategy succeeds.
pub fn normalize(value: impl Into<DateTimeInput>, hint: Option<&str>) -> Result<String> {
    let value = value.into();
    match value {
        DateTimeInput::Timestamp(dt) => Ok(dt.format(API_DATETIME_FORMAT).to_string()),
        DateTimeInput::Text(text) => {
            if let Some(format) = hint {
                let dt = parse_with_format(&text, format).ok_or_else(|| {
                    FloorLinkError::Format(format!(
                        "datetime value {text:?} does not match the hinted format {format:?}"
                    ))
                })?;
                return Ok(dt.format(API_DATETIME_FORMAT).to_string());
            }

            COMMON_FORMATS
                .iter()
                .copied()
                .find_map(|format| parse_with_format(&text, format))
                .map(|dt| dt.format(API_DATETIME_FORMAT).to_string())
                .ok_or_else(|| {
                    FloorLinkError::Format(format!("invalid datetime value {text:?}"))
                })
        }
    }
}

/// Parse `text` with one strftime format. A format that carries no time
/// fields (e.g. `%Y-%m-%d`) resolves to midnight of the parsed date; a
/// parsed UTC offset is dropped, the wall-clock fields go on the wire as-is.
fn parse_with_format(text: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, format).ok().map(|date| date.and_time(NaiveTime::MIN))
}
