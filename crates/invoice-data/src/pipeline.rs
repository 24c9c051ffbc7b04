//! End-to-end invoice assembly.
//!
//! Ties the collaborators together: sync the events export into the store,
//! fetch one billing month, hand it to the core grouper, and package the
//! numeric result, its rendered projection and run metadata for the caller.

use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use invoice_core::error::Result;
use invoice_core::grouper::group_by_week;
use invoice_core::models::{render_invoice, MonthlyInvoiceResult, RenderedInvoice};
use invoice_core::normalizer::normalize_all;
use invoice_core::settings::BillingConfig;

use crate::events::read_events;
use crate::store::LessonStore;

// ── Public types ──────────────────────────────────────────────────────────────

/// Counters describing one sync of the events file into the store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SyncReport {
    /// Lessons normalized and upserted.
    pub synced: usize,
    /// Events excluded during normalization.
    pub skipped: usize,
    /// Identifiers of the excluded events.
    pub skipped_ids: Vec<String>,
}

/// Metadata produced alongside an invoice.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InvoiceMetadata {
    /// ISO-8601 timestamp when this invoice was generated.
    pub generated_at: String,
    pub month: u32,
    pub year: i32,
    /// Lessons included in the invoice.
    pub lessons_count: usize,
    /// Week groups produced.
    pub weeks_count: usize,
    /// Numeric monthly total.
    pub grand_total: f64,
}

/// The complete output of [`build_invoice`].
#[derive(Debug, Clone)]
pub struct InvoiceRun {
    /// Numeric result; the source of truth for every total.
    pub result: MonthlyInvoiceResult,
    /// Display-string projection for the renderer.
    pub rendered: RenderedInvoice,
    /// Metadata about this run.
    pub metadata: InvoiceMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Normalize every event in the export file and upsert the results.
///
/// Per-event normalization failures are skipped and reported in the
/// [`SyncReport`]; an invalid billing configuration aborts the sync before
/// anything is written.
pub fn sync_events(
    events_path: &Path,
    config: &BillingConfig,
    store: &mut LessonStore,
) -> Result<SyncReport> {
    let events = read_events(events_path)?;
    let batch = normalize_all(&events, config)?;

    store.upsert_lessons(&batch.lessons)?;

    let skipped_ids: Vec<String> = batch.skipped.iter().map(|s| s.id.clone()).collect();
    for skipped in &batch.skipped {
        warn!("Event {} excluded from sync: {}", skipped.id, skipped.error);
    }
    info!(
        "Synced {} lessons ({} events skipped)",
        batch.lessons.len(),
        skipped_ids.len()
    );

    Ok(SyncReport {
        synced: batch.lessons.len(),
        skipped: skipped_ids.len(),
        skipped_ids,
    })
}

/// Fetch, group and render the invoice for one billing month.
///
/// The store is the single source of lessons; callers wanting fresh data
/// run [`sync_events`] first. An empty month produces an empty (zero-total)
/// invoice, not an error.
pub fn build_invoice(
    month: u32,
    year: i32,
    config: &BillingConfig,
    store: &LessonStore,
) -> Result<InvoiceRun> {
    config.validate()?;

    let lessons = store.fetch_month(month, year)?;
    let lessons_count = lessons.len();

    let result = group_by_week(lessons);
    let rendered = render_invoice(&result, &config.currency);

    let metadata = InvoiceMetadata {
        generated_at: Utc::now().to_rfc3339(),
        month,
        year,
        lessons_count,
        weeks_count: result.weeks.len(),
        grand_total: result.grand_total,
    };

    info!(
        "Invoice {}/{}: {} lessons in {} week(s), total {:.2}",
        month, year, lessons_count, metadata.weeks_count, metadata.grand_total
    );

    Ok(InvoiceRun {
        result,
        rendered,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
