//! Left join of cleaned sessions with their user conversations.

use std::collections::HashMap;

use insights_core::models::{
    ConversationProjection, MergedRecord, SessionRecord, UserConversationRecord,
};
use tracing::debug;

/// Join every session with the conversations sharing its session id.
///
/// A session with `n` matching conversations yields `n` rows (session fields
/// repeated), a session with none yields one row without a conversation.
/// Output follows session order, then users-file order within a session.
///
/// Session-level sums over the result count a session once per matching
/// conversation.
pub fn merge_sessions(
    sessions: &[SessionRecord],
    users: &[UserConversationRecord],
) -> Vec<MergedRecord> {
    let mut by_session: HashMap<&str, Vec<ConversationProjection>> = HashMap::new();
    for user in users {
        by_session
            .entry(user.session_id.as_str())
            .or_default()
            .push(ConversationProjection::from(user));
    }

    let mut merged = Vec::with_capacity(sessions.len().max(users.len()));
    let mut unmatched = 0usize;
    for session in sessions {
        match by_session.get(session.session_id.as_str()) {
            Some(conversations) => {
                merged.extend(conversations.iter().map(|c| MergedRecord {
                    session: session.clone(),
                    conversation: Some(c.clone()),
                }));
            }
            None => {
                unmatched += 1;
                merged.push(MergedRecord {
                    session: session.clone(),
                    conversation: None,
                });
            }
        }
    }

    debug!(
        "merged {} sessions with {} conversations into {} rows ({} sessions unmatched)",
        sessions.len(),
        users.len(),
        merged.len(),
        unmatched
    );
    merged
}

// ── Tests ─────────────────────────────────────────────────────────────────────
