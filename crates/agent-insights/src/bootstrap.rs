use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use insights_core::error::{InsightsError, Result};
use insights_core::models::Feed;
use insights_core::settings::Settings;
use insights_data::reader::latest_export;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name onto an [`EnvFilter`] directive.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to `log_file` when given (appending), otherwise to stderr.
/// Unknown level names fall back to `"info"`.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

// ── Input discovery ────────────────────────────────────────────────────────────

/// Directory searched for exports when a path is not given explicitly:
/// `--dir`, then the user's downloads folder, then the working directory.
pub fn search_dir(settings: &Settings) -> PathBuf {
    settings
        .dir
        .clone()
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_one(explicit: Option<&PathBuf>, dir: &Path, feed: Feed) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }
    let found = latest_export(dir, feed)
        .ok_or_else(|| InsightsError::NoInputFiles(dir.to_path_buf()))?;
    tracing::info!("Using latest {} export: {}", feed, found.display());
    Ok(found)
}

/// Sessions and users export paths for this run.
///
/// Explicit `--sessions` / `--users` win; a missing one is replaced by the
/// most recent matching export in [`search_dir`].
pub fn resolve_inputs(settings: &Settings) -> Result<(PathBuf, PathBuf)> {
    let dir = search_dir(settings);
    let sessions = resolve_one(settings.sessions.as_ref(), &dir, Feed::Sessions)?;
    let users = resolve_one(settings.users.as_ref(), &dir, Feed::Users)?;
    Ok((sessions, users))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
