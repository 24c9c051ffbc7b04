use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::formatting::{format_currency, format_hours};

/// A raw calendar event record as handed over by the events source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    /// Stable identifier assigned by the calendar provider.
    pub id: String,
    /// Free-text event title, e.g. "Lesson with Alice GCSE maths".
    pub summary: String,
    /// Start timestamp, date-only or full date-time (ISO 8601 string).
    pub start: String,
    /// End timestamp, same formats as `start`.
    pub end: String,
}

/// A single billable lesson, normalized from a raw calendar event.
///
/// Immutable once constructed; `earned` stays numeric until the terminal
/// [`render_invoice`] projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// External event identifier; the lesson store keys on this.
    pub event_id: String,
    /// Calendar date the lesson occurred.
    pub date: NaiveDate,
    /// Weekday index 0-6, Monday = 0.
    pub weekday: u8,
    /// Student name extracted from the event summary.
    pub student: String,
    /// Lesson length in fractional hours.
    pub duration: f64,
    /// Hourly rate in effect when the lesson was normalized.
    pub hourly_rate: f64,
    /// `duration × hourly_rate`.
    pub earned: f64,
}

/// A contiguous run of lessons judged to belong to one calendar week.
#[derive(Debug, Clone)]
pub struct WeekGroup {
    /// Chronologically ordered lessons; never empty.
    pub lessons: Vec<Lesson>,
    /// Sum of `earned` over the group.
    pub total: f64,
}

/// Ordered week groups and totals for one billing month.
#[derive(Debug, Clone, Default)]
pub struct MonthlyInvoiceResult {
    /// Week groups in chronological order of their first lesson.
    pub weeks: Vec<WeekGroup>,
    /// Numeric weekly totals, index-aligned with `weeks`.
    pub weekly_totals: Vec<f64>,
    /// Sum of the weekly totals.
    pub grand_total: f64,
}

impl MonthlyInvoiceResult {
    /// Total number of lessons across all week groups.
    pub fn lesson_count(&self) -> usize {
        self.weeks.iter().map(|w| w.lessons.len()).sum()
    }
}

// ── Rendered (display-string) projection ──────────────────────────────────────

/// Display form of one lesson row.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedLesson {
    /// `DD/MM/YYYY`.
    pub date: String,
    pub student: String,
    /// Hourly rate as a currency string, e.g. `"£20.00"`.
    pub rate: String,
    /// Fractional hours, e.g. `"1.5"`.
    pub hours: String,
    /// Currency string with two decimals, e.g. `"£37.50"`.
    pub earned: String,
}

/// Display form of one week group.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedWeek {
    pub lessons: Vec<RenderedLesson>,
    /// Week subtotal as a currency string.
    pub total: String,
}

/// Display form of a whole monthly invoice.
///
/// Produced from a finished [`MonthlyInvoiceResult`] by [`render_invoice`].
/// There is deliberately no path from these strings back to numbers: all
/// aggregation happens before this type exists.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedInvoice {
    pub weeks: Vec<RenderedWeek>,
    /// Monthly grand total as a currency string.
    pub grand_total: String,
}

/// One-way projection of a numeric invoice result into display strings.
///
/// `currency` is the marker prefixed to every amount. Must only be called
/// once all totals are final; the renderer consumes the output verbatim and
/// re-derives nothing.
pub fn render_invoice(result: &MonthlyInvoiceResult, currency: &str) -> RenderedInvoice {
    let weeks = result
        .weeks
        .iter()
        .map(|week| RenderedWeek {
            lessons: week
                .lessons
                .iter()
                .map(|lesson| RenderedLesson {
                    date: lesson.date.format("%d/%m/%Y").to_string(),
                    student: lesson.student.clone(),
                    rate: format_currency(lesson.hourly_rate, currency),
                    hours: format_hours(lesson.duration),
                    earned: format_currency(lesson.earned, currency),
                })
                .collect(),
            total: format_currency(week.total, currency),
        })
        .collect();

    RenderedInvoice {
        weeks,
        grand_total: format_currency(result.grand_total, currency),
    }
}
