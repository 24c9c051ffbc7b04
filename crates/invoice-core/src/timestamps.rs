use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::warn;

/// A calendar event timestamp, resolved once at the normalizer boundary.
///
/// Calendar exports carry either a bare date (all-day events) or a full
/// date-time. Downstream duration and weekday logic always goes through
/// [`EventTimestamp::as_datetime`], so it never has to re-inspect which
/// variant it was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTimestamp {
    /// A date with no time component.
    DateOnly(NaiveDate),
    /// A full wall-clock date-time.
    DateTime(NaiveDateTime),
}

impl EventTimestamp {
    /// Attempt to parse a timestamp string from a calendar export.
    ///
    /// Handles, in order:
    /// * RFC 3339 with a UTC offset or `Z` suffix (the offset is dropped;
    ///   lesson times are wall-clock values).
    /// * Naive date-times (`2024-03-04T16:00:00`, with or without fractional
    ///   seconds, `T` or space separator).
    /// * Bare dates (`2024-03-04`).
    ///
    /// Returns `None` for empty or unrecognised strings.
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }

        // Replace trailing 'Z' with '+00:00' for RFC 3339 compatibility.
        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&normalised) {
            return Some(Self::DateTime(dt.naive_local()));
        }

        const DATETIME_FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
        ];
        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Self::DateTime(naive));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(Self::DateOnly(date));
        }

        warn!("EventTimestamp: could not parse timestamp string \"{}\"", s);
        None
    }

    /// The timestamp as a full date-time; date-only values resolve to
    /// midnight of that date.
    pub fn as_datetime(&self) -> NaiveDateTime {
        match self {
            Self::DateOnly(date) => date.and_time(NaiveTime::MIN),
            Self::DateTime(dt) => *dt,
        }
    }

    /// The calendar date of the timestamp.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateOnly(date) => *date,
            Self::DateTime(dt) => dt.date(),
        }
    }
}
