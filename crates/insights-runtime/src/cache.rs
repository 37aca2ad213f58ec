//! Content-keyed cache of prepared analyses.
//!
//! Re-running the dashboard over the same two files is common (changing
//! filters, switching views, reloading after a typo in a flag). Preparing is
//! the expensive part, so [`AnalysisCache`] memoizes [`prepare`] by a SHA-256
//! fingerprint of both uploads and hands out shared [`Arc`]s.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use insights_core::error::Result;
use insights_data::analysis::{prepare, PreparedData};
use insights_data::reader::Upload;
use sha2::{Digest, Sha256};

/// Entries kept by [`AnalysisCache::default`].
pub const DEFAULT_CACHE_CAPACITY: usize = 8;

// ── Fingerprint ───────────────────────────────────────────────────────────────

/// SHA-256 over the sessions then users upload contents, each prefixed with
/// its length. Swapping the two files gives a different fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(sessions: &Upload, users: &Upload) -> Self {
        let mut hasher = Sha256::new();
        for upload in [sessions, users] {
            hasher.update((upload.bytes.len() as u64).to_le_bytes());
            hasher.update(&upload.bytes);
        }
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 12 hex digits, for log lines.
    pub fn short(&self) -> String {
        self.0[..6].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

// ── AnalysisCache ─────────────────────────────────────────────────────────────

struct CacheEntry {
    fingerprint: Fingerprint,
    data: Arc<PreparedData>,
    inserted_at: Instant,
}

/// Least-recently-used cache of [`PreparedData`] keyed by [`Fingerprint`].
///
/// Capacity 0 disables caching: every call prepares afresh. Failed
/// preparations are never stored.
///
/// # Example
/// ```no_run
/// use insights_data::reader::Upload;
/// use insights_runtime::cache::AnalysisCache;
///
/// let mut cache = AnalysisCache::default();
/// let sessions = Upload::from_path("operatorsSessions.tsv".as_ref()).unwrap();
/// let users = Upload::from_path("users.tsv".as_ref()).unwrap();
/// let data = cache.get_or_prepare(&sessions, &users).unwrap();
/// println!("{} merged rows", data.records.len());
/// ```
pub struct AnalysisCache {
    capacity: usize,
    /// Most recently used last.
    entries: VecDeque<CacheEntry>,
    hits: u64,
    misses: u64,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl AnalysisCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the prepared data for these uploads, preparing on a miss.
    pub fn get_or_prepare(
        &mut self,
        sessions: &Upload,
        users: &Upload,
    ) -> Result<Arc<PreparedData>> {
        self.get_or_prepare_keyed(Fingerprint::of(sessions, users), sessions, users)
    }

    /// Same as [`AnalysisCache::get_or_prepare`] for callers that already
    /// hold the uploads' fingerprint.
    pub fn get_or_prepare_keyed(
        &mut self,
        fingerprint: Fingerprint,
        sessions: &Upload,
        users: &Upload,
    ) -> Result<Arc<PreparedData>> {
        if let Some(data) = self.touch(&fingerprint) {
            self.hits += 1;
            tracing::debug!(fingerprint = %fingerprint.short(), "analysis cache hit");
            return Ok(data);
        }

        self.misses += 1;
        tracing::debug!(fingerprint = %fingerprint.short(), "analysis cache miss");
        let data = Arc::new(prepare(sessions, users)?);
        self.insert(fingerprint, Arc::clone(&data));
        Ok(data)
    }

    /// Cached data for `fingerprint` without preparing or updating recency.
    pub fn peek(&self, fingerprint: &Fingerprint) -> Option<Arc<PreparedData>> {
        self.entries
            .iter()
            .find(|e| e.fingerprint == *fingerprint)
            .map(|e| Arc::clone(&e.data))
    }

    /// Drop every entry.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        tracing::debug!("analysis cache invalidated");
    }

    /// Age of the entry for `fingerprint`, or `None` if not cached.
    pub fn entry_age(&self, fingerprint: &Fingerprint) -> Option<Duration> {
        self.entries
            .iter()
            .find(|e| e.fingerprint == *fingerprint)
            .map(|e| e.inserted_at.elapsed())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Move the entry for `fingerprint` to the most-recent end.
    fn touch(&mut self, fingerprint: &Fingerprint) -> Option<Arc<PreparedData>> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.fingerprint == *fingerprint)?;
        let entry = self.entries.remove(pos)?;
        let data = Arc::clone(&entry.data);
        self.entries.push_back(entry);
        Some(data)
    }

    fn insert(&mut self, fingerprint: Fingerprint, data: Arc<PreparedData>) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                tracing::debug!(fingerprint = %evicted.fingerprint.short(), "evicted from analysis cache");
            }
        }
        self.entries.push_back(CacheEntry {
            fingerprint,
            data,
            inserted_at: Instant::now(),
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
