//! Main analysis pipeline for Agent Insights.
//!
//! [`prepare`] runs parse, validate, clean and join over the two uploads once;
//! [`DashboardReport::build`] then derives every figure for a filter
//! selection from the prepared rows.

use chrono::Utc;
use insights_core::error::{InsightsError, Result};
use insights_core::models::MergedRecord;
use serde::Serialize;
use tracing::{debug, error};

use crate::aggregator::{
    agent_performance, compute_kpis, daily_sessions_by_end, daily_sessions_by_start,
    daily_volume, smooth, typification_by_agent, typification_counts, AgentPerformance,
    AgentTypification, DailyCount, DailyVolume, Kpis, TypificationCount,
};
use crate::cleaner::{clean_sessions, clean_users, CleaningStats};
use crate::filter::Filters;
use crate::joiner::merge_sessions;
use crate::reader::{parse_sessions, parse_users, Upload};
use crate::validator::validate_tables;

// ── PreparedData ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the merged rows.
#[derive(Debug, Clone, Serialize)]
pub struct PrepareMetadata {
    /// RFC 3339 timestamp of when the uploads were processed.
    pub generated_at: String,
    pub sessions_file: String,
    pub users_file: String,
    /// Cleaning counters for the sessions export.
    pub cleaning: CleaningStats,
    /// User rows kept after cleaning.
    pub user_rows: usize,
    /// Lines skipped across both files for having too many fields.
    pub malformed_lines: usize,
    pub merged_rows: usize,
    /// Wall-clock seconds spent in [`prepare`].
    pub prepare_time_seconds: f64,
}

/// Output of [`prepare`]: the merged table ready for filtering.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub records: Vec<MergedRecord>,
    pub metadata: PrepareMetadata,
}

/// Parse, validate, clean and join the two exports.
///
/// Stops at the first parse failure. Validation checks both files before
/// failing so the error lists every missing column of each.
pub fn prepare(sessions: &Upload, users: &Upload) -> Result<PreparedData> {
    let started = std::time::Instant::now();

    let session_table = parse_sessions(sessions).map_err(logged)?;
    let user_table = parse_users(users).map_err(logged)?;

    let validation = validate_tables(&session_table, &sessions.name, &user_table, &users.name);
    if !validation.is_valid() {
        return Err(logged(InsightsError::MissingColumns(validation.failures())));
    }

    let (session_records, cleaning) = clean_sessions(&session_table);
    let user_records = clean_users(&user_table);
    let records = merge_sessions(&session_records, &user_records);

    let metadata = PrepareMetadata {
        generated_at: Utc::now().to_rfc3339(),
        sessions_file: sessions.name.clone(),
        users_file: users.name.clone(),
        cleaning,
        user_rows: user_records.len(),
        malformed_lines: session_table.malformed_lines() + user_table.malformed_lines(),
        merged_rows: records.len(),
        prepare_time_seconds: started.elapsed().as_secs_f64(),
    };
    debug!(
        "prepared {} merged rows from {} and {} in {:.3}s",
        metadata.merged_rows,
        metadata.sessions_file,
        metadata.users_file,
        metadata.prepare_time_seconds
    );

    Ok(PreparedData { records, metadata })
}

fn logged(err: InsightsError) -> InsightsError {
    error!("{}", err);
    err
}

// ── DashboardReport ───────────────────────────────────────────────────────────

/// Every figure shown for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub filters: Filters,
    pub kpis: Kpis,
    pub sessions_by_start: Vec<DailyCount>,
    pub sessions_by_end: Vec<DailyCount>,
    pub daily_volume: Vec<DailyVolume>,
    pub agents: Vec<AgentPerformance>,
    pub typifications: Vec<TypificationCount>,
    pub typification_by_agent: Vec<AgentTypification>,
}

impl DashboardReport {
    /// Filter `records` and aggregate the remaining rows.
    pub fn build(records: &[MergedRecord], filters: &Filters) -> Self {
        let rows = filters.apply(records);
        debug!("{} of {} rows match the filters", rows.len(), records.len());

        Self {
            filters: filters.clone(),
            kpis: compute_kpis(&rows),
            sessions_by_start: daily_sessions_by_start(&rows),
            sessions_by_end: daily_sessions_by_end(&rows),
            daily_volume: daily_volume(&rows),
            agents: agent_performance(&rows),
            typifications: typification_counts(&rows),
            typification_by_agent: typification_by_agent(&rows),
        }
    }

    /// Add trailing moving averages to both daily session series.
    pub fn smoothed(mut self) -> Self {
        smooth(&mut self.sessions_by_start);
        smooth(&mut self.sessions_by_end);
        self
    }

    /// `true` when no row matched the filters.
    pub fn is_empty(&self) -> bool {
        self.kpis.rows == 0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
