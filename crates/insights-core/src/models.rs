use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Which of the two platform exports a table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    /// Agent session export from the real-time operator dashboard.
    Sessions,
    /// User/conversation export from the users and sessions dashboard.
    Users,
}

impl Feed {
    /// Human-readable label used in log lines and error reports.
    pub fn label(self) -> &'static str {
        match self {
            Feed::Sessions => "agent sessions",
            Feed::Users => "user conversations",
        }
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One cleaned row of the agent sessions export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Platform session identifier (join key).
    pub session_id: String,
    /// Agent who handled the session. Empty when the export left it blank.
    pub agent_name: String,
    /// When the session started (export wall-clock time).
    pub started_at: NaiveDateTime,
    /// When the session ended, if the export carried a parseable value.
    pub ended_at: Option<NaiveDateTime>,
    /// Canonical queue label (never empty of meaning: defaults to "Sin Cola").
    pub queue: String,
    /// Conversations the agent closed during the session.
    pub closed_conversations: u64,
    /// Seconds the agent spent in conversation.
    pub agent_conversation_secs: f64,
    /// Seconds the user waited for the agent.
    pub agent_wait_secs: f64,
    /// Replies sent by the agent.
    pub replies: u64,
    /// Transfers to another queue or agent.
    pub transfers: u64,
    /// Conversations abandoned by the user.
    pub abandoned: u64,
    /// Mean first-response time in seconds; `None` when the export had no value.
    pub mean_response_secs: Option<f64>,
}

impl SessionRecord {
    /// Calendar day the session started on.
    pub fn start_date(&self) -> NaiveDate {
        self.started_at.date()
    }

    /// Calendar day the session ended on, when known.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.ended_at.map(|ts| ts.date())
    }
}

/// One cleaned row of the user conversations export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConversationRecord {
    /// Session the conversation belongs to. Not unique.
    pub session_id: String,
    /// Canonical outcome label, if the conversation was typified.
    pub typification: Option<String>,
    pub agent_messages: u64,
    pub user_messages: u64,
    pub bot_messages: u64,
}

/// Conversation fields carried into the merged table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationProjection {
    pub typification: Option<String>,
    pub agent_messages: u64,
    pub user_messages: u64,
    pub bot_messages: u64,
}

impl From<&UserConversationRecord> for ConversationProjection {
    fn from(record: &UserConversationRecord) -> Self {
        Self {
            typification: record.typification.clone(),
            agent_messages: record.agent_messages,
            user_messages: record.user_messages,
            bot_messages: record.bot_messages,
        }
    }
}

/// A session joined with at most one of its conversations.
///
/// A session with several conversations appears once per conversation, so
/// session-level fields repeat across those rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub session: SessionRecord,
    /// `None` when the users export had no row for this session.
    pub conversation: Option<ConversationProjection>,
}

impl MergedRecord {
    pub fn typification(&self) -> Option<&str> {
        self.conversation
            .as_ref()
            .and_then(|c| c.typification.as_deref())
    }

    /// Agent messages from the joined conversation, 0 when unmatched.
    pub fn agent_messages(&self) -> u64 {
        self.conversation
            .as_ref()
            .map(|c| c.agent_messages)
            .unwrap_or(0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session(start: &str, end: Option<&str>) -> SessionRecord {
        let parse = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        SessionRecord {
            session_id: "1".to_string(),
            agent_name: "Ana".to_string(),
            started_at: parse(start),
            ended_at: end.map(parse),
            queue: "Default Queue".to_string(),
            closed_conversations: 1,
            agent_conversation_secs: 60.0,
            agent_wait_secs: 5.0,
            replies: 2,
            transfers: 0,
            abandoned: 0,
            mean_response_secs: Some(30.0),
        }
    }

    #[test]
    fn test_start_and_end_dates() {
        let session = make_session("2024-01-01 23:50:00", Some("2024-01-02 00:10:00"));
        assert_eq!(
            session.start_date(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            session.end_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }

    #[test]
    fn test_end_date_missing() {
        let session = make_session("2024-01-01 10:00:00", None);
        assert!(session.end_date().is_none());
    }

    #[test]
    fn test_merged_record_unmatched_defaults() {
        let merged = MergedRecord {
            session: make_session("2024-01-01 10:00:00", None),
            conversation: None,
        };
        assert!(merged.typification().is_none());
        assert_eq!(merged.agent_messages(), 0);
    }

    #[test]
    fn test_projection_from_user_record() {
        let user = UserConversationRecord {
            session_id: "1".to_string(),
            typification: Some("Finalizado".to_string()),
            agent_messages: 5,
            user_messages: 4,
            bot_messages: 1,
        };
        let merged = MergedRecord {
            session: make_session("2024-01-01 10:00:00", None),
            conversation: Some(ConversationProjection::from(&user)),
        };
        assert_eq!(merged.typification(), Some("Finalizado"));
        assert_eq!(merged.agent_messages(), 5);
    }

    #[test]
    fn test_feed_labels() {
        assert_eq!(Feed::Sessions.to_string(), "agent sessions");
        assert_eq!(Feed::Users.label(), "user conversations");
    }
}
