use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the invoice crates.
#[derive(Error, Debug)]
pub enum InvoiceError {
    /// A raw event's timestamp fields are missing or unparsable, or the
    /// record would violate a lesson invariant (e.g. end before start).
    #[error("Malformed event {id}: {reason}")]
    MalformedEvent { id: String, reason: String },

    /// The configured control string does not appear in the event summary.
    #[error("Control string not found in summary of event {id}")]
    MissingControlString { id: String },

    /// A configuration value is missing or invalid; fatal for the whole run.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The events export file could not be opened or read.
    #[error("Failed to read events file {path}: {source}")]
    EventsFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An error raised by the lesson store layer.
    #[error("Lesson store error: {0}")]
    Store(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the invoice crates.
pub type Result<T> = std::result::Result<T, InvoiceError>;
