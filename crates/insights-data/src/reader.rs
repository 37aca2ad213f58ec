//! Export discovery and tab-separated parsing for Agent Insights.
//!
//! Turns the raw bytes of the two platform exports into [`RawTable`]s: a
//! trimmed header plus rows of optional text cells. No type coercion happens
//! here; that is the cleaner's job.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use insights_core::columns::{CLOSE_TIMESTAMP, SESSION_END};
use insights_core::error::{InsightsError, Result};
use insights_core::models::Feed;
use regex::Regex;
use tracing::{debug, warn};

/// Cell texts treated as "no value" in addition to the empty string.
const MISSING_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Rows skipped after the header of the sessions export (its sub-header).
const SESSIONS_SUBHEADER_ROWS: usize = 1;

// ── Upload ────────────────────────────────────────────────────────────────────

/// An export file held in memory, as handed over by the presentation shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// File name used in reports (no directory part).
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk into an upload named after its file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|source| InsightsError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

// ── RawTable ──────────────────────────────────────────────────────────────────

/// A parsed but untyped export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
    malformed_lines: usize,
}

impl RawTable {
    /// Trimmed column headers in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Position of the first column called `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Number of data rows kept.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lines dropped because they had more fields than the header.
    pub fn malformed_lines(&self) -> usize {
        self.malformed_lines
    }

    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(|cells| RawRow { cells })
    }

    fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(idx) = self.column_index(from) {
            self.columns[idx] = to.to_string();
        }
    }
}

/// Borrowed view of one row, addressed by column index.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    cells: &'a [Option<String>],
}

impl<'a> RawRow<'a> {
    /// Cell text at `index`, `None` when the column is absent or the cell is
    /// missing.
    pub fn get(&self, index: Option<usize>) -> Option<&'a str> {
        index
            .and_then(|i| self.cells.get(i))
            .and_then(|cell| cell.as_deref())
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse the agent sessions export.
///
/// The row right after the header is a descriptive sub-header in platform
/// exports and is always skipped. A legacy close-timestamp column is renamed
/// to the canonical end-timestamp name when the latter is absent.
pub fn parse_sessions(upload: &Upload) -> Result<RawTable> {
    let mut table = parse_table(upload, Feed::Sessions, SESSIONS_SUBHEADER_ROWS)?;
    if table.has_column(CLOSE_TIMESTAMP) && !table.has_column(SESSION_END) {
        debug!(
            "{}: renaming '{}' to '{}'",
            upload.name, CLOSE_TIMESTAMP, SESSION_END
        );
        table.rename_column(CLOSE_TIMESTAMP, SESSION_END);
    }
    Ok(table)
}

/// Parse the user conversations export.
pub fn parse_users(upload: &Upload) -> Result<RawTable> {
    parse_table(upload, Feed::Users, 0)
}

/// Shared tab-separated parser.
///
/// Lines with more fields than the header are skipped; short lines are padded
/// with missing cells.
fn parse_table(upload: &Upload, feed: Feed, skip_rows: usize) -> Result<RawTable> {
    let text = std::str::from_utf8(&upload.bytes).map_err(|e| parse_error(upload, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(|e| parse_error(upload, e))?,
        None => return Err(parse_error(upload, "no columns to parse from file")),
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let name = if i == 0 {
                name.trim_start_matches('\u{feff}')
            } else {
                name
            };
            name.trim().to_string()
        })
        .collect();

    if columns.iter().all(String::is_empty) {
        return Err(parse_error(upload, "no columns to parse from file"));
    }

    let mut rows = Vec::new();
    let mut malformed_lines = 0usize;

    for (n, record) in records.enumerate() {
        let record = record.map_err(|e| parse_error(upload, e))?;
        if n < skip_rows {
            continue;
        }
        if record.len() > columns.len() {
            malformed_lines += 1;
            debug!(
                "{}: skipping line {} ({} fields, expected {})",
                upload.name,
                n + 2,
                record.len(),
                columns.len()
            );
            continue;
        }
        let row = (0..columns.len())
            .map(|i| record.get(i).and_then(cell_value))
            .collect();
        rows.push(row);
    }

    debug!(
        "{} ({}): {} columns, {} rows, {} malformed lines skipped",
        upload.name,
        feed,
        columns.len(),
        rows.len(),
        malformed_lines
    );

    Ok(RawTable {
        columns,
        rows,
        malformed_lines,
    })
}

fn cell_value(raw: &str) -> Option<String> {
    if raw.is_empty() || MISSING_MARKERS.contains(&raw) {
        None
    } else {
        Some(raw.to_string())
    }
}

fn parse_error(upload: &Upload, err: impl std::fmt::Display) -> InsightsError {
    InsightsError::Parse {
        file: upload.name.clone(),
        message: err.to_string(),
    }
}

// ── Discovery ─────────────────────────────────────────────────────────────────

fn export_pattern(feed: Feed) -> Regex {
    let pattern = match feed {
        Feed::Sessions => r"(?i)^operatorsSessions.*\.(tsv|csv)$",
        Feed::Users => r"(?i)^users.*\.(tsv|csv)$",
    };
    Regex::new(pattern).expect("regex is valid")
}

/// Find every export of `feed` under `dir` (recursively), newest first.
///
/// Files are matched by the platform's download names: `operatorsSessions…`
/// for sessions and `users…` for conversations, with a `.tsv` or `.csv`
/// extension. Ties on modification time are broken by path.
pub fn find_export_files(dir: &Path, feed: Feed) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Export directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let pattern = export_pattern(feed);

    let mut files: Vec<(SystemTime, PathBuf)> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .map(|name| pattern.is_match(name))
                    .unwrap_or(false)
        })
        .map(|entry| {
            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, entry.into_path())
        })
        .collect();

    files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    files.into_iter().map(|(_, path)| path).collect()
}

/// The most recent export of `feed` under `dir`.
pub fn latest_export(dir: &Path, feed: Feed) -> Option<PathBuf> {
    find_export_files(dir, feed).into_iter().next()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
