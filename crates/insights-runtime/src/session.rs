//! Dashboard session state.
//!
//! [`DashboardSession`] holds the analysis the presentation layer is currently
//! showing. A context exists only after a pair of uploads has been prepared
//! successfully; starting a new upload or calling [`DashboardSession::clear`]
//! discards it, so a failed upload never leaves stale figures on screen.

use std::sync::Arc;

use chrono::{DateTime, Local};
use insights_core::error::Result;
use insights_data::analysis::{DashboardReport, PreparedData};
use insights_data::filter::Filters;
use insights_data::reader::Upload;

use crate::cache::{AnalysisCache, Fingerprint};

// ── AnalysisContext ───────────────────────────────────────────────────────────

/// The prepared analysis of one pair of uploads.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub fingerprint: Fingerprint,
    pub data: Arc<PreparedData>,
    pub sessions_file: String,
    pub users_file: String,
    pub created_at: DateTime<Local>,
}

impl AnalysisContext {
    /// Filters selecting every row of this analysis.
    pub fn default_filters(&self) -> Filters {
        Filters::all(&self.data.records)
    }

    pub fn report(&self, filters: &Filters) -> DashboardReport {
        DashboardReport::build(&self.data.records, filters)
    }
}

// ── DashboardSession ──────────────────────────────────────────────────────────

/// Owns the current [`AnalysisContext`] and the cache behind it.
#[derive(Default)]
pub struct DashboardSession {
    cache: AnalysisCache,
    context: Option<AnalysisContext>,
}

impl DashboardSession {
    pub fn new(cache: AnalysisCache) -> Self {
        Self {
            cache,
            context: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Process a new pair of uploads.
    ///
    /// The previous context is dropped first. On success the new context is
    /// stored and returned; on failure the session is left empty and the
    /// error (parse or missing columns) is returned.
    pub fn upload(&mut self, sessions: &Upload, users: &Upload) -> Result<&AnalysisContext> {
        self.context = None;

        let fingerprint = Fingerprint::of(sessions, users);
        let data = self.cache.get_or_prepare_keyed(fingerprint, sessions, users)?;
        tracing::debug!(
            sessions = %sessions.name,
            users = %users.name,
            rows = data.records.len(),
            "analysis context created"
        );

        Ok(self.context.insert(AnalysisContext {
            fingerprint,
            data,
            sessions_file: sessions.name.clone(),
            users_file: users.name.clone(),
            created_at: Local::now(),
        }))
    }

    pub fn context(&self) -> Option<&AnalysisContext> {
        self.context.as_ref()
    }

    /// Report for `filters` over the current context, if any.
    pub fn report(&self, filters: &Filters) -> Option<DashboardReport> {
        self.context.as_ref().map(|ctx| ctx.report(filters))
    }

    /// Forget the current context. Cached analyses are kept.
    pub fn clear(&mut self) {
        if self.context.take().is_some() {
            tracing::debug!("analysis context cleared");
        }
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
