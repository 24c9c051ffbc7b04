//! Raw-event normalization.
//!
//! Converts [`RawEvent`] records into canonical [`Lesson`] values: student
//! extraction via the configured control string, date/weekday derivation,
//! duration from true datetime subtraction, and the earned amount.

use chrono::Datelike;
use tracing::{debug, warn};

use crate::error::{InvoiceError, Result};
use crate::models::{Lesson, RawEvent};
use crate::settings::{BillingConfig, MissingControlPolicy};
use crate::timestamps::EventTimestamp;

/// A record excluded from a batch, with the error that excluded it.
#[derive(Debug)]
pub struct SkippedEvent {
    pub id: String,
    pub error: InvoiceError,
}

/// The outcome of normalizing a whole batch of raw events.
///
/// Per-record failures never abort the batch; they are collected in
/// `skipped` so the caller can report them next to the invoice.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub lessons: Vec<Lesson>,
    pub skipped: Vec<SkippedEvent>,
}

/// Normalize a single raw event into a [`Lesson`].
///
/// The caller is expected to have validated `config` already; per-event
/// failures come back as [`InvoiceError::MalformedEvent`] or
/// [`InvoiceError::MissingControlString`].
pub fn normalize(event: &RawEvent, config: &BillingConfig) -> Result<Lesson> {
    let student = extract_student(event, config)?;

    let start = EventTimestamp::parse(&event.start)
        .ok_or_else(|| malformed(event, "unparsable start timestamp"))?;
    let end = EventTimestamp::parse(&event.end)
        .ok_or_else(|| malformed(event, "unparsable end timestamp"))?;

    // Full datetime subtraction; field-wise hour/minute arithmetic would
    // break across midnight.
    let elapsed = end.as_datetime() - start.as_datetime();
    let duration = elapsed.num_seconds() as f64 / 3600.0;
    if duration < 0.0 {
        return Err(malformed(event, "end precedes start"));
    }

    let date = start.date();
    let weekday = date.weekday().num_days_from_monday() as u8;

    Ok(Lesson {
        event_id: event.id.clone(),
        date,
        weekday,
        student,
        duration,
        hourly_rate: config.hourly_rate,
        earned: duration * config.hourly_rate,
    })
}

/// Normalize a batch of raw events, skipping and reporting bad records.
///
/// Validates `config` up front; an invalid configuration is fatal since it
/// would poison every lesson's earned amount.
pub fn normalize_all(events: &[RawEvent], config: &BillingConfig) -> Result<NormalizedBatch> {
    config.validate()?;

    let mut batch = NormalizedBatch::default();
    for event in events {
        match normalize(event, config) {
            Ok(lesson) => batch.lessons.push(lesson),
            Err(error) => {
                warn!("Skipping event {}: {}", event.id, error);
                batch.skipped.push(SkippedEvent {
                    id: event.id.clone(),
                    error,
                });
            }
        }
    }

    debug!(
        "Normalized {} lessons, skipped {} events",
        batch.lessons.len(),
        batch.skipped.len()
    );
    Ok(batch)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Extract the student name from the event summary.
///
/// Removes exactly one occurrence of the control string, trims, and takes
/// the first whitespace-delimited token of the remainder. Absence of the
/// control string is resolved by the configured policy.
fn extract_student(event: &RawEvent, config: &BillingConfig) -> Result<String> {
    let summary = event.summary.as_str();

    let stripped = if config.control_str.is_empty() {
        summary.trim().to_string()
    } else if let Some(pos) = summary.find(&config.control_str) {
        let mut remainder = String::with_capacity(summary.len() - config.control_str.len());
        remainder.push_str(&summary[..pos]);
        remainder.push_str(&summary[pos + config.control_str.len()..]);
        remainder.trim().to_string()
    } else {
        match config.missing_control {
            MissingControlPolicy::Exclude => {
                return Err(InvoiceError::MissingControlString {
                    id: event.id.clone(),
                })
            }
            MissingControlPolicy::IncludeFullSummary => summary.trim().to_string(),
        }
    };

    match stripped.split_whitespace().next() {
        Some(token) => Ok(token.to_string()),
        None => Err(malformed(event, "no student name in summary")),
    }
}

fn malformed(event: &RawEvent, reason: &str) -> InvoiceError {
    InvoiceError::MalformedEvent {
        id: event.id.clone(),
        reason: reason.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
