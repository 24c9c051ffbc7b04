use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{InvoiceError, Result};

// ── BillingConfig ──────────────────────────────────────────────────────────────

/// How to treat an event whose summary lacks the configured control string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingControlPolicy {
    /// The event is not a lesson; skip it and report it.
    Exclude,
    /// Treat the whole summary as the student field.
    IncludeFullSummary,
}

impl Default for MissingControlPolicy {
    fn default() -> Self {
        Self::Exclude
    }
}

/// Billing parameters handed explicitly to the normalizer and the renderer.
///
/// Passed by value into every entry point; nothing in the core reads
/// process-wide state.
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Substring marking an event as a billable lesson; stripped from the
    /// summary to recover the student name.
    pub control_str: String,
    /// Hourly rate applied to every normalized lesson.
    pub hourly_rate: f64,
    /// Currency marker prefixed to rendered amounts.
    pub currency: String,
    /// Policy for events without the control string.
    pub missing_control: MissingControlPolicy,
}

impl BillingConfig {
    /// Convenience constructor with the default currency and policy.
    pub fn new(control_str: impl Into<String>, hourly_rate: f64) -> Self {
        Self {
            control_str: control_str.into(),
            hourly_rate,
            currency: "£".to_string(),
            missing_control: MissingControlPolicy::default(),
        }
    }

    /// Reject configurations that would poison every lesson's `earned`.
    ///
    /// Must pass before any normalization starts; a failure here is fatal
    /// for the whole invocation.
    pub fn validate(&self) -> Result<()> {
        if !self.hourly_rate.is_finite() || self.hourly_rate < 0.0 {
            return Err(InvoiceError::InvalidConfiguration(format!(
                "hourly rate must be a non-negative number, got {}",
                self.hourly_rate
            )));
        }
        Ok(())
    }
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Generate tutoring invoices from exported calendar events
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lesson-invoice",
    about = "Generate tutoring invoices from exported calendar events",
    version
)]
pub struct Settings {
    /// Invoice month as a number (e.g. March = 3); defaults to the current month
    #[arg(long)]
    pub month: Option<u32>,

    /// Invoice year (e.g. 2024); defaults to the current year
    #[arg(long)]
    pub year: Option<i32>,

    /// Path to the exported calendar events file (JSON Lines)
    #[arg(long, default_value = "events.jsonl")]
    pub events: PathBuf,

    /// Path to the lesson database (defaults to ~/.lesson-invoice/lessons.db)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Output mode
    #[arg(long, default_value = "html", value_parser = ["html", "text"])]
    pub view: String,

    /// Write the HTML invoice to this path instead of the default location
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Do not re-sync the events file into the database before grouping
    #[arg(long)]
    pub skip_sync: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Delete the saved user profile
    #[arg(long)]
    pub clear: bool,
}

impl Settings {
    /// The billing month, defaulting to the current local month and year.
    pub fn billing_month(&self) -> (u32, i32) {
        use chrono::Datelike;
        let now = chrono::Local::now();
        (
            self.month.unwrap_or_else(|| now.month()),
            self.year.unwrap_or_else(|| now.year()),
        )
    }

    /// The log level with the `--debug` override applied.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}

// ── UserProfile ────────────────────────────────────────────────────────────────

/// Payee details persisted to `~/.lesson-invoice/profile.json`.
///
/// The profile supplies both the invoice letterhead (name, address, bank
/// details) and the billing parameters (`control_str`, `hourly_rate`).
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub town: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub control_str: String,
    #[serde(default)]
    pub hourly_rate: f64,
    #[serde(default)]
    pub account_no: String,
    #[serde(default)]
    pub sort_code: String,
    /// Currency marker used on rendered amounts.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// What to do with events whose summary lacks the control string.
    #[serde(default)]
    pub missing_control: MissingControlPolicy,
}

fn default_currency() -> String {
    "£".to_string()
}

impl UserProfile {
    /// Return the default path to the persisted profile file.
    /// Uses `~/.lesson-invoice/profile.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the profile path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".lesson-invoice").join("profile.json")
    }

    /// Load the profile from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load the profile from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write the profile to the default path, creating parent
    /// directories if needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write the profile to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the default profile file if it exists.
    pub fn clear() -> Result<()> {
        Self::clear_at(&Self::config_path())
    }

    /// Delete the profile file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Build the billing configuration handed to the core entry points.
    pub fn billing_config(&self) -> BillingConfig {
        BillingConfig {
            control_str: self.control_str.clone(),
            hourly_rate: self.hourly_rate,
            currency: self.currency.clone(),
            missing_control: self.missing_control,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
