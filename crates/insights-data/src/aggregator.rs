//! KPI and grouped rollups over filtered merged rows.
//!
//! Every function takes the rows that passed the filters and is total over
//! the empty slice: sums are 0, means are `None`, groupings are empty.
//!
//! Session-level fields repeat once per joined conversation, so a session
//! with several conversations is counted once per conversation in the sums
//! below.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use insights_core::models::MergedRecord;
use serde::Serialize;

/// Rows in the trailing moving-average window.
pub const MOVING_AVERAGE_WINDOW: usize = 7;

const SECONDS_PER_HOUR: f64 = 3600.0;

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

// ── KPIs ──────────────────────────────────────────────────────────────────────

/// Headline figures for the selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub total_closed: u64,
    pub total_abandoned: u64,
    /// Abandons per 100 closed conversations, in `[0, 100]`.
    pub abandon_rate: f64,
    pub total_transfers: u64,
    /// Mean agent-conversation seconds per row.
    pub mean_handle_secs: Option<f64>,
    /// Mean of the present response times, in hours. `None` when no row has
    /// one or the mean is not positive.
    pub mean_response_hours: Option<f64>,
    pub rows: usize,
    pub distinct_sessions: usize,
}

/// Sum that stops at `u64::MAX` instead of overflowing.
pub fn saturating_total(values: impl IntoIterator<Item = u64>) -> u64 {
    values.into_iter().fold(0, u64::saturating_add)
}

pub fn compute_kpis(rows: &[&MergedRecord]) -> Kpis {
    let total_closed = saturating_total(rows.iter().map(|r| r.session.closed_conversations));
    let total_abandoned = saturating_total(rows.iter().map(|r| r.session.abandoned));
    let total_transfers = saturating_total(rows.iter().map(|r| r.session.transfers));

    let abandon_rate = if total_closed > 0 {
        (total_abandoned as f64 / total_closed as f64 * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let mean_response_hours = mean(rows.iter().filter_map(|r| r.session.mean_response_secs))
        .map(|secs| secs / SECONDS_PER_HOUR)
        .filter(|hours| *hours > 0.0);

    let distinct_sessions = rows
        .iter()
        .map(|r| r.session.session_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    Kpis {
        total_closed,
        total_abandoned,
        abandon_rate,
        total_transfers,
        mean_handle_secs: mean(rows.iter().map(|r| r.session.agent_conversation_secs)),
        mean_response_hours,
        rows: rows.len(),
        distinct_sessions,
    }
}

// ── Daily series ──────────────────────────────────────────────────────────────

/// Distinct sessions on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub sessions: usize,
    /// Trailing moving average, filled by [`smooth`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_average: Option<f64>,
}

fn count_distinct_by_day<'a>(
    pairs: impl Iterator<Item = (NaiveDate, &'a str)>,
) -> Vec<DailyCount> {
    let mut days: BTreeMap<NaiveDate, BTreeSet<&str>> = BTreeMap::new();
    for (date, id) in pairs {
        days.entry(date).or_default().insert(id);
    }
    days.into_iter()
        .map(|(date, ids)| DailyCount {
            date,
            sessions: ids.len(),
            moving_average: None,
        })
        .collect()
}

/// Distinct session ids per start date, ascending.
pub fn daily_sessions_by_start(rows: &[&MergedRecord]) -> Vec<DailyCount> {
    count_distinct_by_day(
        rows.iter()
            .map(|r| (r.session.start_date(), r.session.session_id.as_str())),
    )
}

/// Distinct session ids per end date, ascending. Rows without an end
/// timestamp are left out.
pub fn daily_sessions_by_end(rows: &[&MergedRecord]) -> Vec<DailyCount> {
    count_distinct_by_day(rows.iter().filter_map(|r| {
        r.session
            .end_date()
            .map(|date| (date, r.session.session_id.as_str()))
    }))
}

/// Trailing moving average over `values` with a minimum window of one row.
///
/// The window counts rows, not calendar days, so gaps between dates are not
/// filled.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Fill [`DailyCount::moving_average`] with the 7-row trailing average.
pub fn smooth(series: &mut [DailyCount]) {
    let values: Vec<f64> = series.iter().map(|d| d.sessions as f64).collect();
    for (point, avg) in series
        .iter_mut()
        .zip(moving_average(&values, MOVING_AVERAGE_WINDOW))
    {
        point.moving_average = Some(avg);
    }
}

/// Conversation volume on one start date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyVolume {
    pub date: NaiveDate,
    pub closed_conversations: u64,
    pub mean_handle_secs: f64,
}

/// Closed conversations and mean handle time per start date, ascending.
pub fn daily_volume(rows: &[&MergedRecord]) -> Vec<DailyVolume> {
    let mut days: BTreeMap<NaiveDate, (u64, f64, usize)> = BTreeMap::new();
    for r in rows {
        let entry = days.entry(r.session.start_date()).or_default();
        entry.0 = entry.0.saturating_add(r.session.closed_conversations);
        entry.1 += r.session.agent_conversation_secs;
        entry.2 += 1;
    }
    days.into_iter()
        .map(|(date, (closed, handle, n))| DailyVolume {
            date,
            closed_conversations: closed,
            mean_handle_secs: handle / n as f64,
        })
        .collect()
}

// ── Per agent ─────────────────────────────────────────────────────────────────

/// Rollup for one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentPerformance {
    pub agent_name: String,
    pub closed_conversations: u64,
    pub mean_handle_secs: f64,
    /// `None` when none of the agent's rows has a response time.
    pub mean_response_secs: Option<f64>,
    pub transfers: u64,
    pub agent_messages: u64,
}

#[derive(Default)]
struct AgentAccumulator {
    closed: u64,
    handle_sum: f64,
    rows: usize,
    response_sum: f64,
    responses: usize,
    transfers: u64,
    messages: u64,
}

/// One entry per agent, most closed conversations first. Ties keep ascending
/// name order.
pub fn agent_performance(rows: &[&MergedRecord]) -> Vec<AgentPerformance> {
    let mut agents: BTreeMap<&str, AgentAccumulator> = BTreeMap::new();
    for r in rows {
        let acc = agents.entry(r.session.agent_name.as_str()).or_default();
        acc.closed = acc.closed.saturating_add(r.session.closed_conversations);
        acc.handle_sum += r.session.agent_conversation_secs;
        acc.rows += 1;
        if let Some(secs) = r.session.mean_response_secs {
            acc.response_sum += secs;
            acc.responses += 1;
        }
        acc.transfers = acc.transfers.saturating_add(r.session.transfers);
        acc.messages = acc.messages.saturating_add(r.agent_messages());
    }

    let mut result: Vec<AgentPerformance> = agents
        .into_iter()
        .map(|(name, acc)| AgentPerformance {
            agent_name: name.to_string(),
            closed_conversations: acc.closed,
            mean_handle_secs: acc.handle_sum / acc.rows as f64,
            mean_response_secs: (acc.responses > 0)
                .then(|| acc.response_sum / acc.responses as f64),
            transfers: acc.transfers,
            agent_messages: acc.messages,
        })
        .collect();

    result.sort_by(|a, b| b.closed_conversations.cmp(&a.closed_conversations));
    result
}

// ── Typifications ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypificationCount {
    pub typification: String,
    pub count: usize,
}

/// Rows per typification for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentTypification {
    pub agent_name: String,
    pub typification: String,
    pub count: usize,
}

/// Counts of non-missing typifications, largest first, ties by label.
pub fn typification_counts(rows: &[&MergedRecord]) -> Vec<TypificationCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in rows.iter().filter_map(|r| r.typification()) {
        *counts.entry(label).or_default() += 1;
    }
    let mut result: Vec<TypificationCount> = counts
        .into_iter()
        .map(|(label, count)| TypificationCount {
            typification: label.to_string(),
            count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

/// Cross-tab of (agent, typification) counts, ordered by agent then label.
/// Rows without a typification are left out.
pub fn typification_by_agent(rows: &[&MergedRecord]) -> Vec<AgentTypification> {
    let mut cells: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for r in rows {
        if let Some(label) = r.typification() {
            *cells
                .entry((r.session.agent_name.as_str(), label))
                .or_default() += 1;
        }
    }
    cells
        .into_iter()
        .map(|((agent, label), count)| AgentTypification {
            agent_name: agent.to_string(),
            typification: label.to_string(),
            count,
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
