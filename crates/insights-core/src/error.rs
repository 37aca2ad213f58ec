use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Missing required columns for one input file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MissingColumns {
    /// Display name of the file (the upload's file name).
    pub file: String,
    /// Required column headers absent from the file, in catalogue order.
    pub columns: Vec<String>,
}

impl fmt::Display for MissingColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "file '{}' looks wrong or has an unexpected format; missing key columns: {}",
            self.file,
            self.columns.join(", ")
        )
    }
}

/// All errors produced by Agent Insights.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An export could not be parsed as delimited text at all.
    #[error("Failed to read file '{file}': {message}")]
    Parse { file: String, message: String },

    /// One or more exports lack required columns.
    #[error("{}", join_reports(.0))]
    MissingColumns(Vec<MissingColumns>),

    /// The selected date range ends before it starts.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange {
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    },

    /// A date string did not match `YYYY-MM-DD`.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// No export files could be located in the given directory.
    #[error("No export files found in {0}")]
    NoInputFiles(PathBuf),

    /// CSV serialisation failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialisation failed.
    #[error("Failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn join_reports(reports: &[MissingColumns]) -> String {
    reports
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias used throughout the insights crates.
pub type Result<T> = std::result::Result<T, InsightsError>;
