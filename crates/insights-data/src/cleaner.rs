//! Type coercion and label canonicalisation for validated exports.
//!
//! Data-quality problems never surface as errors here: bad counts become 0,
//! bad response times become `None`, and rows that cannot be placed on a
//! timeline (no start timestamp) or joined (no session id) are dropped.

use insights_core::columns::{
    ABANDONED, AGENT_CONVERSATION, AGENT_MESSAGES, AGENT_NAME, AGENT_WAIT, BOT_MESSAGES,
    CLOSED_CONVERSATIONS, MEAN_RESPONSE, QUEUE, REPLIES, SESSION_END, SESSION_ID, SESSION_START,
    TRANSFERS, TYPIFICATION, USER_MESSAGES,
};
use insights_core::models::{SessionRecord, UserConversationRecord};
use insights_core::time_utils::parse_timestamp;
use insights_core::translations::{canonical_queue, canonical_typification};
use serde::Serialize;
use tracing::debug;

use crate::reader::{RawRow, RawTable};

/// Placeholder some exports write instead of a number.
const DASH: &str = "-";

/// Largest value a count or duration cell may hold. Anything above it is
/// treated as a failed coercion.
pub const MAX_CELL_VALUE: f64 = 1e12;

/// Row counts observed while cleaning the sessions export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    /// Data rows handed to the cleaner.
    pub rows_read: usize,
    /// Rows dropped because the start timestamp was missing or unparseable.
    pub dropped_invalid_start: usize,
    /// Rows dropped because they carried no session id.
    pub dropped_missing_id: usize,
    /// Rows kept.
    pub rows_kept: usize,
}

// ── Coercion ──────────────────────────────────────────────────────────────────

/// Coerce a cell to a non-negative finite number no larger than
/// [`MAX_CELL_VALUE`]; `None` for `-`, missing or anything that does not parse.
pub fn coerce_number(cell: Option<&str>) -> Option<f64> {
    let text = cell?.trim();
    if text == DASH {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && (0.0..=MAX_CELL_VALUE).contains(v))
}

/// Zero-filled duration in seconds.
pub fn coerce_seconds(cell: Option<&str>) -> f64 {
    coerce_number(cell).unwrap_or(0.0)
}

/// Zero-filled count. Fractional values are truncated.
pub fn coerce_count(cell: Option<&str>) -> u64 {
    coerce_number(cell).map(|v| v.trunc() as u64).unwrap_or(0)
}

fn non_blank(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

// ── Column positions ──────────────────────────────────────────────────────────

struct SessionColumns {
    id: Option<usize>,
    agent: Option<usize>,
    start: Option<usize>,
    end: Option<usize>,
    queue: Option<usize>,
    closed: Option<usize>,
    conversation: Option<usize>,
    wait: Option<usize>,
    replies: Option<usize>,
    transfers: Option<usize>,
    abandoned: Option<usize>,
    response: Option<usize>,
}

impl SessionColumns {
    fn locate(table: &RawTable) -> Self {
        Self {
            id: table.column_index(SESSION_ID),
            agent: table.column_index(AGENT_NAME),
            start: table.column_index(SESSION_START),
            end: table.column_index(SESSION_END),
            queue: table.column_index(QUEUE),
            closed: table.column_index(CLOSED_CONVERSATIONS),
            conversation: table.column_index(AGENT_CONVERSATION),
            wait: table.column_index(AGENT_WAIT),
            replies: table.column_index(REPLIES),
            transfers: table.column_index(TRANSFERS),
            abandoned: table.column_index(ABANDONED),
            response: table.column_index(MEAN_RESPONSE),
        }
    }
}

struct UserColumns {
    id: Option<usize>,
    typification: Option<usize>,
    agent_messages: Option<usize>,
    user_messages: Option<usize>,
    bot_messages: Option<usize>,
}

impl UserColumns {
    fn locate(table: &RawTable) -> Self {
        Self {
            id: table.column_index(SESSION_ID),
            typification: table.column_index(TYPIFICATION),
            agent_messages: table.column_index(AGENT_MESSAGES),
            user_messages: table.column_index(USER_MESSAGES),
            bot_messages: table.column_index(BOT_MESSAGES),
        }
    }
}

// ── Sessions ──────────────────────────────────────────────────────────────────

/// Clean the validated sessions export.
///
/// Returns the kept records in file order together with row statistics.
pub fn clean_sessions(table: &RawTable) -> (Vec<SessionRecord>, CleaningStats) {
    let cols = SessionColumns::locate(table);
    let mut stats = CleaningStats {
        rows_read: table.len(),
        ..CleaningStats::default()
    };

    let mut records = Vec::with_capacity(table.len());
    for row in table.rows() {
        let Some(started_at) = row.get(cols.start).and_then(parse_timestamp) else {
            stats.dropped_invalid_start += 1;
            continue;
        };
        let Some(session_id) = non_blank(row.get(cols.id)) else {
            stats.dropped_missing_id += 1;
            continue;
        };
        records.push(session_from_row(&row, &cols, session_id, started_at));
    }
    stats.rows_kept = records.len();

    debug!(
        "cleaned sessions: {} read, {} kept, {} without start, {} without id",
        stats.rows_read, stats.rows_kept, stats.dropped_invalid_start, stats.dropped_missing_id
    );

    (records, stats)
}

fn session_from_row(
    row: &RawRow<'_>,
    cols: &SessionColumns,
    session_id: &str,
    started_at: chrono::NaiveDateTime,
) -> SessionRecord {
    SessionRecord {
        session_id: session_id.to_string(),
        agent_name: row.get(cols.agent).map(str::trim).unwrap_or_default().to_string(),
        started_at,
        ended_at: row.get(cols.end).and_then(parse_timestamp),
        queue: canonical_queue(row.get(cols.queue)),
        closed_conversations: coerce_count(row.get(cols.closed)),
        agent_conversation_secs: coerce_seconds(row.get(cols.conversation)),
        agent_wait_secs: coerce_seconds(row.get(cols.wait)),
        replies: coerce_count(row.get(cols.replies)),
        transfers: coerce_count(row.get(cols.transfers)),
        abandoned: coerce_count(row.get(cols.abandoned)),
        mean_response_secs: coerce_number(row.get(cols.response)),
    }
}

// ── Users ─────────────────────────────────────────────────────────────────────

/// Clean the validated users export. Rows without a session id cannot join
/// and are dropped.
pub fn clean_users(table: &RawTable) -> Vec<UserConversationRecord> {
    let cols = UserColumns::locate(table);

    let records: Vec<UserConversationRecord> = table
        .rows()
        .filter_map(|row| {
            let session_id = non_blank(row.get(cols.id))?;
            Some(UserConversationRecord {
                session_id: session_id.to_string(),
                typification: canonical_typification(row.get(cols.typification)),
                agent_messages: coerce_count(row.get(cols.agent_messages)),
                user_messages: coerce_count(row.get(cols.user_messages)),
                bot_messages: coerce_count(row.get(cols.bot_messages)),
            })
        })
        .collect();

    debug!(
        "cleaned users: {} read, {} kept",
        table.len(),
        records.len()
    );
    records
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{parse_sessions, parse_users, Upload};
    use insights_core::columns::REQUIRED_SESSION_COLUMNS;

    /// Sessions export with the full required header, a sub-header line and
    /// the given data lines (tab-separated, in catalogue order).
    fn sessions(lines: &[&str]) -> RawTable {
        let mut text = REQUIRED_SESSION_COLUMNS.join("\t");
        text.push('\n');
        text.push_str("descripción\n");
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        parse_sessions(&Upload::new("operatorsSessions.tsv", text)).unwrap()
    }

    fn users(header: &str, lines: &[&str]) -> RawTable {
        let mut text = format!("{header}\n");
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        parse_users(&Upload::new("users.tsv", text)).unwrap()
    }

    // ── coercion ──────────────────────────────────────────────────────────────

    #[test]
    fn test_coerce_number_rules() {
        assert_eq!(coerce_number(Some("12")), Some(12.0));
        assert_eq!(coerce_number(Some(" 3.5 ")), Some(3.5));
        assert_eq!(coerce_number(Some("-")), None);
        assert_eq!(coerce_number(Some("abc")), None);
        assert_eq!(coerce_number(Some("-4")), None);
        assert_eq!(coerce_number(Some("inf")), None);
        assert_eq!(coerce_number(None), None);
    }

    #[test]
    fn test_coerce_count_zero_fills_and_truncates() {
        assert_eq!(coerce_count(Some("-")), 0);
        assert_eq!(coerce_count(Some("n/a?")), 0);
        assert_eq!(coerce_count(None), 0);
        assert_eq!(coerce_count(Some("2.0")), 2);
        assert_eq!(coerce_count(Some("2.9")), 2);
    }

    #[test]
    fn test_coerce_rejects_absurd_magnitudes() {
        assert_eq!(coerce_number(Some("1e30")), None);
        assert_eq!(coerce_count(Some("1e30")), 0);
        assert_eq!(coerce_seconds(Some("1e300")), 0.0);
        assert_eq!(coerce_number(Some("1e12")), Some(MAX_CELL_VALUE));
    }

    #[test]
    fn test_clean_sessions_huge_counts_zero_filled() {
        let table = sessions(&[
            "1\tAna\t2024-01-01 10:00\t-\tdefault\t1e30\t120\t0\t0\t0\t0\t600",
            "2\tAna\t2024-01-01 11:00\t-\tdefault\t1e30\t120\t0\t0\t0\t0\t600",
        ]);
        let (records, _) = clean_sessions(&table);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.closed_conversations == 0));
    }

    #[test]
    fn test_coerce_seconds_zero_fills() {
        assert_eq!(coerce_seconds(Some("-")), 0.0);
        assert_eq!(coerce_seconds(Some("120.5")), 120.5);
    }

    // ── clean_sessions ────────────────────────────────────────────────────────

    #[test]
    fn test_clean_sessions_numeric_columns() {
        let table = sessions(&[
            "1\tAna\t2024-01-01 10:00\t2024-01-01 10:30\tdefault\t2\t120\t30\t3\t0\t0\t600",
        ]);
        let (records, stats) = clean_sessions(&table);

        assert_eq!(stats.rows_kept, 1);
        let r = &records[0];
        assert_eq!(r.session_id, "1");
        assert_eq!(r.agent_name, "Ana");
        assert_eq!(r.queue, "Default Queue");
        assert_eq!(r.closed_conversations, 2);
        assert_eq!(r.agent_conversation_secs, 120.0);
        assert_eq!(r.agent_wait_secs, 30.0);
        assert_eq!(r.replies, 3);
        assert_eq!(r.transfers, 0);
        assert_eq!(r.abandoned, 0);
        assert_eq!(r.mean_response_secs, Some(600.0));
        assert!(r.ended_at.is_some());
    }

    #[test]
    fn test_clean_sessions_dash_becomes_zero_but_response_missing() {
        let table = sessions(&["1\tAna\t2024-01-01 10:00\t-\tdefault\t-\t-\t-\t-\t-\t-\t-"]);
        let (records, _) = clean_sessions(&table);

        let r = &records[0];
        assert_eq!(r.closed_conversations, 0);
        assert_eq!(r.agent_conversation_secs, 0.0);
        assert_eq!(r.agent_wait_secs, 0.0);
        assert_eq!(r.replies, 0);
        assert_eq!(r.transfers, 0);
        assert_eq!(r.abandoned, 0);
        assert_eq!(r.mean_response_secs, None);
        assert!(r.ended_at.is_none());
        assert!(r.end_date().is_none());
    }

    #[test]
    fn test_clean_sessions_drops_unparseable_start() {
        let table = sessions(&[
            "1\tAna\tnot-a-date\t\tdefault\t1\t1\t1\t1\t1\t1\t1",
            "2\tAna\t\t\tdefault\t1\t1\t1\t1\t1\t1\t1",
            "3\tAna\t2024-01-02 09:00\t\tdefault\t1\t1\t1\t1\t1\t1\t1",
        ]);
        let (records, stats) = clean_sessions(&table);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].session_id, "3");
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.dropped_invalid_start, 2);
    }

    #[test]
    fn test_clean_sessions_drops_missing_id() {
        let table = sessions(&["\tAna\t2024-01-02 09:00\t\tdefault\t1\t1\t1\t1\t1\t1\t1"]);
        let (records, stats) = clean_sessions(&table);
        assert!(records.is_empty());
        assert_eq!(stats.dropped_missing_id, 1);
    }

    #[test]
    fn test_clean_sessions_queue_defaults_and_trims() {
        let table = sessions(&[
            "1\tAna\t2024-01-01 10:00\t\t\t1\t1\t1\t1\t1\t1\t1",
            "2\tAna\t2024-01-01 10:00\t\t  ventas  \t1\t1\t1\t1\t1\t1\t1",
            "3\tAna\t2024-01-01 10:00\t\t_default_\t1\t1\t1\t1\t1\t1\t1",
        ]);
        let (records, _) = clean_sessions(&table);
        let queues: Vec<&str> = records.iter().map(|r| r.queue.as_str()).collect();
        assert_eq!(queues, vec!["Sin Cola", "ventas", "Default Queue"]);
    }

    #[test]
    fn test_clean_sessions_values_never_negative() {
        let table = sessions(&[
            "1\tAna\t2024-01-01 10:00\t\tdefault\t-3\t-1.5\t-2\t-1\t-1\t-1\t-10",
        ]);
        let (records, _) = clean_sessions(&table);
        let r = &records[0];
        assert_eq!(r.closed_conversations, 0);
        assert_eq!(r.agent_conversation_secs, 0.0);
        assert_eq!(r.agent_wait_secs, 0.0);
        assert_eq!(r.mean_response_secs, None);
    }

    // ── clean_users ───────────────────────────────────────────────────────────

    #[test]
    fn test_clean_users_translates_and_zero_fills() {
        let table = users(
            "Id Sesión\tTipificación\tMensajes Agente\tMensajes Usuario\tMensajes Bot",
            &[
                "1\tfinished\t5\t4\t-",
                "2\t\t-\tx\t1",
                "3\tcustom\t2\t2\t2",
            ],
        );
        let records = clean_users(&table);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].typification.as_deref(), Some("Finalizado"));
        assert_eq!(records[0].agent_messages, 5);
        assert_eq!(records[0].bot_messages, 0);
        assert!(records[1].typification.is_none());
        assert_eq!(records[1].agent_messages, 0);
        assert_eq!(records[1].user_messages, 0);
        assert_eq!(records[2].typification.as_deref(), Some("custom"));
    }

    #[test]
    fn test_clean_users_optional_message_columns_absent() {
        let table = users("Id Sesión\tTipificación\tMensajes Agente", &["1\tfinished\t5"]);
        let records = clean_users(&table);
        assert_eq!(records[0].user_messages, 0);
        assert_eq!(records[0].bot_messages, 0);
    }

    #[test]
    fn test_clean_users_drops_rows_without_id() {
        let table = users(
            "Id Sesión\tTipificación\tMensajes Agente",
            &["\tfinished\t5", "2\tfinished\t1"],
        );
        let records = clean_users(&table);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].session_id, "2");
    }
}
