//! Row selection by agent, queue and start-date range.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use insights_core::error::{InsightsError, Result};
use insights_core::models::MergedRecord;
use insights_core::settings::DateBounds;
use serde::Serialize;

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive range of calendar days. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(InsightsError::InvalidDateRange {
                from: start,
                to: end,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ── Filters ───────────────────────────────────────────────────────────────────

/// Selection applied before aggregation.
///
/// A row passes when its agent and queue are both selected and its start date
/// lies in the range. An empty agent or queue set selects nothing; use
/// [`Filters::all`] for the unfiltered view. A missing range means the data
/// set had no rows to observe one from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub agents: BTreeSet<String>,
    pub queues: BTreeSet<String>,
    pub date_range: Option<DateRange>,
}

impl Filters {
    /// Every observed agent and queue, and the observed start-date span.
    pub fn all(records: &[MergedRecord]) -> Self {
        let agents = records
            .iter()
            .map(|r| r.session.agent_name.clone())
            .collect();
        let queues = records.iter().map(|r| r.session.queue.clone()).collect();
        let date_range = observed_range(records);
        Self {
            agents,
            queues,
            date_range,
        }
    }

    /// Start from [`Filters::all`] and narrow by the requested selection.
    ///
    /// Empty `agents` / `queues` keep every observed value. Missing date
    /// bounds default to the observed minimum or maximum. Only a range whose
    /// both bounds were requested can be rejected as inverted.
    pub fn from_selection(
        records: &[MergedRecord],
        agents: &[String],
        queues: &[String],
        bounds: DateBounds,
    ) -> Result<Self> {
        let mut filters = Self::all(records);
        if !agents.is_empty() {
            filters.agents = agents.iter().cloned().collect();
        }
        if !queues.is_empty() {
            filters.queues = queues.iter().cloned().collect();
        }

        let observed = filters.date_range;
        filters.date_range = match (bounds.from, bounds.to) {
            (Some(from), Some(to)) => Some(DateRange::new(from, to)?),
            // A defaulted side never inverts the range: it collapses onto the
            // requested bound, which selects nothing outside the data.
            (Some(from), None) => {
                let end = observed.map_or(from, |r| r.end.max(from));
                Some(DateRange::new(from, end)?)
            }
            (None, Some(to)) => {
                let start = observed.map_or(to, |r| r.start.min(to));
                Some(DateRange::new(start, to)?)
            }
            (None, None) => observed,
        };
        Ok(filters)
    }

    pub fn matches(&self, record: &MergedRecord) -> bool {
        self.agents.contains(&record.session.agent_name)
            && self.queues.contains(&record.session.queue)
            && self
                .date_range
                .map(|range| range.contains(record.session.start_date()))
                .unwrap_or(false)
    }

    /// Rows passing the filters, in input order.
    pub fn apply<'a>(&self, records: &'a [MergedRecord]) -> Vec<&'a MergedRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

fn observed_range(records: &[MergedRecord]) -> Option<DateRange> {
    let mut dates = records.iter().map(|r| r.session.start_date());
    let first = dates.next()?;
    let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some(DateRange { start, end })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use insights_core::models::SessionRecord;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn record(agent: &str, queue: &str, d: u32) -> MergedRecord {
        MergedRecord {
            session: SessionRecord {
                session_id: format!("{agent}-{d}"),
                agent_name: agent.to_string(),
                started_at: day(d).and_hms_opt(9, 30, 0).unwrap(),
                ended_at: None,
                queue: queue.to_string(),
                closed_conversations: 1,
                agent_conversation_secs: 60.0,
                agent_wait_secs: 0.0,
                replies: 0,
                transfers: 0,
                abandoned: 0,
                mean_response_secs: None,
            },
            conversation: None,
        }
    }

    fn sample() -> Vec<MergedRecord> {
        vec![
            record("Ana", "Default Queue", 3),
            record("Luis", "Default Queue", 1),
            record("Ana", "ventas", 5),
        ]
    }

    // ── DateRange ─────────────────────────────────────────────────────────────

    #[test]
    fn test_date_range_rejects_reversed_bounds() {
        let err = DateRange::new(day(5), day(1)).unwrap_err();
        assert!(matches!(err, InsightsError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = DateRange::new(day(2), day(4)).unwrap();
        assert!(range.contains(day(2)));
        assert!(range.contains(day(4)));
        assert!(!range.contains(day(1)));
        assert!(!range.contains(day(5)));
    }

    #[test]
    fn test_date_range_single_day() {
        let range = DateRange::new(day(2), day(2)).unwrap();
        assert!(range.contains(day(2)));
    }

    // ── Filters ───────────────────────────────────────────────────────────────

    #[test]
    fn test_all_filters_keep_every_row() {
        let records = sample();
        let filters = Filters::all(&records);
        assert_eq!(filters.apply(&records).len(), records.len());
        assert_eq!(filters.date_range.unwrap().start(), day(1));
        assert_eq!(filters.date_range.unwrap().end(), day(5));
        assert_eq!(filters.agents.len(), 2);
        assert_eq!(filters.queues.len(), 2);
    }

    #[test]
    fn test_all_filters_on_empty_data() {
        let filters = Filters::all(&[]);
        assert!(filters.agents.is_empty());
        assert!(filters.date_range.is_none());
    }

    #[test]
    fn test_agent_filter() {
        let records = sample();
        let filters =
            Filters::from_selection(&records, &["Ana".to_string()], &[], DateBounds::default())
                .unwrap();
        let kept = filters.apply(&records);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.session.agent_name == "Ana"));
    }

    #[test]
    fn test_queue_filter() {
        let records = sample();
        let filters =
            Filters::from_selection(&records, &[], &["ventas".to_string()], DateBounds::default())
                .unwrap();
        assert_eq!(filters.apply(&records).len(), 1);
    }

    #[test]
    fn test_date_filter_defaults_missing_side() {
        let records = sample();
        let bounds = DateBounds {
            from: Some(day(2)),
            to: None,
        };
        let filters = Filters::from_selection(&records, &[], &[], bounds).unwrap();
        assert_eq!(filters.date_range.unwrap().end(), day(5));
        assert_eq!(filters.apply(&records).len(), 2);
    }

    #[test]
    fn test_date_filter_reversed_is_error() {
        let records = sample();
        let bounds = DateBounds {
            from: Some(day(5)),
            to: Some(day(1)),
        };
        assert!(matches!(
            Filters::from_selection(&records, &[], &[], bounds),
            Err(InsightsError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_date_filter_from_after_data_is_empty_selection() {
        let records = sample();
        let bounds = DateBounds {
            from: Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            to: None,
        };
        let filters = Filters::from_selection(&records, &[], &[], bounds).unwrap();
        let range = filters.date_range.unwrap();
        assert_eq!(range.start(), range.end());
        assert!(filters.apply(&records).is_empty());
        assert!(crate::analysis::DashboardReport::build(&records, &filters).is_empty());
    }

    #[test]
    fn test_date_filter_to_before_data_is_empty_selection() {
        let records = sample();
        let bounds = DateBounds {
            from: None,
            to: Some(NaiveDate::from_ymd_opt(2023, 12, 1).unwrap()),
        };
        let filters = Filters::from_selection(&records, &[], &[], bounds).unwrap();
        assert!(filters.apply(&records).is_empty());
    }

    #[test]
    fn test_unknown_agent_selects_nothing() {
        let records = sample();
        let filters =
            Filters::from_selection(&records, &["Nadie".to_string()], &[], DateBounds::default())
                .unwrap();
        assert!(filters.apply(&records).is_empty());
    }

    #[test]
    fn test_empty_agent_set_selects_nothing() {
        let records = sample();
        let mut filters = Filters::all(&records);
        filters.agents.clear();
        assert!(filters.apply(&records).is_empty());
    }
}
