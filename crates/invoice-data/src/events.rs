//! Raw calendar-event loading.
//!
//! The calendar provider is out of scope; events arrive as a local JSON
//! Lines export, one event object per line. Unparsable lines are skipped
//! with a warning so one corrupt line never loses the rest of the export.

use std::io::BufRead;
use std::path::Path;

use tracing::{debug, warn};

use invoice_core::error::{InvoiceError, Result};
use invoice_core::models::RawEvent;

/// Read all raw events from a JSON Lines export file.
///
/// Blank lines are ignored; lines that fail to parse are skipped with a
/// `warn!`. A missing or unreadable file is an error.
pub fn read_events(path: &Path) -> Result<Vec<RawEvent>> {
    let file = std::fs::File::open(path).map_err(|source| InvoiceError::EventsFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let reader = std::io::BufReader::new(file);
    let mut events: Vec<RawEvent> = Vec::new();
    let mut skipped_lines = 0u64;

    for line_result in reader.lines() {
        let line = match line_result {
            Ok(l) => l,
            Err(_) => {
                skipped_lines += 1;
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<RawEvent>(trimmed) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!("Skipping unparsable event line in {}: {}", path.display(), e);
                skipped_lines += 1;
            }
        }
    }

    debug!(
        "Read {} events from {} ({} lines skipped)",
        events.len(),
        path.display(),
        skipped_lines
    );
    Ok(events)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
