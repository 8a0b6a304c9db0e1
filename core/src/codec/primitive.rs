//! Text-level readers shared by the XML and JSON codecs.
//!
//! XML hands these the element text or attribute value; JSON hands them the
//! string form when the legacy dialect quotes a number or a boolean.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::{RedmineError, Result};

pub fn read_int(key: &str, text: &str) -> Result<i32> {
    text.trim().parse().map_err(|_| {
        RedmineError::format(format!("`{key}` is not an integer: {text:?}"))
    })
}

pub fn read_bool(key: &str, text: &str) -> Result<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(RedmineError::format(format!(
            "`{key}` is not a boolean: {text:?}"
        ))),
    }
}

/// Empty text means "no value"; anything else must be a timestamp.
pub fn read_nullable_datetime(key: &str, text: &str) -> Result<Option<DateTime<Utc>>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(midnight.and_utc()));
    }
    Err(RedmineError::format(format!(
        "`{key}` is not a date: {text:?}"
    )))
}

/// Redmine's own timestamp shape, e.g. `2012-06-17T15:30:00Z`.
pub fn write_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
