use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.lesson-invoice/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.lesson-invoice/`
/// - `~/.lesson-invoice/logs/`
/// - `~/.lesson-invoice/invoices/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let base_dir = home.join(".lesson-invoice");
    std::fs::create_dir_all(&base_dir)?;
    std::fs::create_dir_all(base_dir.join("logs"))?;
    std::fs::create_dir_all(base_dir.join("invoices"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Default paths ──────────────────────────────────────────────────────────────

/// Default location of the lesson database.
pub fn default_db_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".lesson-invoice").join("lessons.db")
}

/// Default output path for a month's HTML invoice: `invoices/YYYYMM.html`.
pub fn default_invoice_path(year: i32, month: u32) -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".lesson-invoice")
        .join("invoices")
        .join(format!("{}{:02}.html", year, month))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
