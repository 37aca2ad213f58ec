//! CSV export of merged rows.

use std::io::Write;
use std::path::Path;

use csv::Writer;
use insights_core::columns;
use insights_core::error::{InsightsError, Result};
use insights_core::models::MergedRecord;
use serde::Serialize;
use tracing::debug;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One merged row flattened for CSV. Conversation fields carry a `_user`
/// suffix and are empty for unmatched sessions.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Id Sesión")]
    session_id: &'a str,
    #[serde(rename = "Nombre Agente")]
    agent_name: &'a str,
    #[serde(rename = "Fecha/tiempo Inicio Sesión")]
    started_at: String,
    #[serde(rename = "Fecha/tiempo Fin Sesión")]
    ended_at: Option<String>,
    #[serde(rename = "Cola")]
    queue: &'a str,
    #[serde(rename = "Conversaciones cerradas")]
    closed_conversations: u64,
    #[serde(rename = "Conversación con agente")]
    agent_conversation_secs: f64,
    #[serde(rename = "Espera agente")]
    agent_wait_secs: f64,
    #[serde(rename = "Cantidad de respuestas")]
    replies: u64,
    #[serde(rename = "Transferencias realizadas")]
    transfers: u64,
    #[serde(rename = "Abandonada por usuario")]
    abandoned: u64,
    #[serde(rename = "Tiempo medio de respuesta")]
    mean_response_secs: Option<f64>,
    #[serde(rename = "Tipificación_user")]
    typification: Option<&'a str>,
    #[serde(rename = "Mensajes Agente_user")]
    agent_messages: Option<u64>,
    #[serde(rename = "Mensajes Usuario_user")]
    user_messages: Option<u64>,
    #[serde(rename = "Mensajes Bot_user")]
    bot_messages: Option<u64>,
}

impl<'a> From<&'a MergedRecord> for ExportRow<'a> {
    fn from(record: &'a MergedRecord) -> Self {
        let s = &record.session;
        let c = record.conversation.as_ref();
        Self {
            session_id: &s.session_id,
            agent_name: &s.agent_name,
            started_at: s.started_at.format(TIMESTAMP_FORMAT).to_string(),
            ended_at: s.ended_at.map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
            queue: &s.queue,
            closed_conversations: s.closed_conversations,
            agent_conversation_secs: s.agent_conversation_secs,
            agent_wait_secs: s.agent_wait_secs,
            replies: s.replies,
            transfers: s.transfers,
            abandoned: s.abandoned,
            mean_response_secs: s.mean_response_secs,
            typification: c.and_then(|c| c.typification.as_deref()),
            agent_messages: c.map(|c| c.agent_messages),
            user_messages: c.map(|c| c.user_messages),
            bot_messages: c.map(|c| c.bot_messages),
        }
    }
}

/// Header row written by [`write_merged_csv`].
pub fn export_headers() -> Vec<String> {
    let mut headers: Vec<String> = [
        columns::SESSION_ID,
        columns::AGENT_NAME,
        columns::SESSION_START,
        columns::SESSION_END,
        columns::QUEUE,
        columns::CLOSED_CONVERSATIONS,
        columns::AGENT_CONVERSATION,
        columns::AGENT_WAIT,
        columns::REPLIES,
        columns::TRANSFERS,
        columns::ABANDONED,
        columns::MEAN_RESPONSE,
    ]
    .iter()
    .map(|c| (*c).to_string())
    .collect();
    headers.extend(
        [
            columns::TYPIFICATION,
            columns::AGENT_MESSAGES,
            columns::USER_MESSAGES,
            columns::BOT_MESSAGES,
        ]
        .iter()
        .map(|c| format!("{c}_user")),
    );
    headers
}

/// Write `rows` as CSV to `writer`, header first. Missing values are empty.
pub fn write_merged_csv<'a, W, I>(writer: W, rows: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a MergedRecord>,
{
    let mut csv = Writer::from_writer(writer);
    let mut written = 0usize;
    for record in rows {
        csv.serialize(ExportRow::from(record))?;
        written += 1;
    }
    if written == 0 {
        csv.write_record(export_headers())?;
    }
    csv.flush()?;
    Ok(written)
}

/// Create `path` and write `rows` into it.
pub fn export_to_path<'a>(
    path: &Path,
    rows: impl IntoIterator<Item = &'a MergedRecord>,
) -> Result<usize> {
    let file = std::fs::File::create(path).map_err(|source| InsightsError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let written = write_merged_csv(file, rows)?;
    debug!("exported {} rows to {}", written, path.display());
    Ok(written)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insights_core::models::{ConversationProjection, SessionRecord};
    use tempfile::TempDir;

    fn record(conversation: Option<ConversationProjection>) -> MergedRecord {
        MergedRecord {
            session: SessionRecord {
                session_id: "1".to_string(),
                agent_name: "Ana".to_string(),
                started_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
                ended_at: None,
                queue: "Default Queue".to_string(),
                closed_conversations: 2,
                agent_conversation_secs: 120.0,
                agent_wait_secs: 30.5,
                replies: 3,
                transfers: 0,
                abandoned: 0,
                mean_response_secs: None,
            },
            conversation,
        }
    }

    fn to_string(rows: &[MergedRecord]) -> String {
        let mut buf = Vec::new();
        write_merged_csv(&mut buf, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_matches_serialised_row() {
        let text = to_string(&[record(None)]);
        let header = text.lines().next().unwrap();
        assert_eq!(header, export_headers().join(","));
        assert!(header.ends_with(
            "Tipificación_user,Mensajes Agente_user,Mensajes Usuario_user,Mensajes Bot_user"
        ));
    }

    #[test]
    fn test_unmatched_row_has_empty_user_columns() {
        let text = to_string(&[record(None)]);
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "1,Ana,2024-01-01 10:00:00,,Default Queue,2,120.0,30.5,3,0,0,,,,,"
        );
    }

    #[test]
    fn test_matched_row_values() {
        let text = to_string(&[record(Some(ConversationProjection {
            typification: Some("Finalizado".to_string()),
            agent_messages: 5,
            user_messages: 4,
            bot_messages: 1,
        }))]);
        let row = text.lines().nth(1).unwrap();
        assert!(row.ends_with(",Finalizado,5,4,1"));
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let text = to_string(&[]);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("Id Sesión,"));
    }

    #[test]
    fn test_export_to_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("merged.csv");
        let written = export_to_path(&path, &[record(None), record(None)]).unwrap();
        assert_eq!(written, 2);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_export_to_missing_directory_is_write_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("merged.csv");
        let err = export_to_path(&path, &[record(None)]).unwrap_err();
        assert!(matches!(&err, InsightsError::FileWrite { path: p, .. } if *p == path));
        assert!(err.to_string().starts_with("Failed to write file"));
    }
}
