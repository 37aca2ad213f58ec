//! Column catalogue for the platform's two tab-separated exports.
//!
//! Headers are matched exactly (after whitespace trimming) against the
//! Spanish labels the platform writes.

// ── Sessions feed (operatorsSessions…) ───────────────────────────────────────

pub const SESSION_ID: &str = "Id Sesión";
pub const AGENT_NAME: &str = "Nombre Agente";
pub const SESSION_START: &str = "Fecha/tiempo Inicio Sesión";
pub const SESSION_END: &str = "Fecha/tiempo Fin Sesión";
/// Older exports label the end timestamp as the close timestamp.
pub const CLOSE_TIMESTAMP: &str = "Fecha/tiempo Cierre";
pub const QUEUE: &str = "Cola";
pub const CLOSED_CONVERSATIONS: &str = "Conversaciones cerradas";
pub const AGENT_CONVERSATION: &str = "Conversación con agente";
pub const AGENT_WAIT: &str = "Espera agente";
pub const REPLIES: &str = "Cantidad de respuestas";
pub const TRANSFERS: &str = "Transferencias realizadas";
pub const ABANDONED: &str = "Abandonada por usuario";
pub const MEAN_RESPONSE: &str = "Tiempo medio de respuesta";

// ── Users feed (users…) ──────────────────────────────────────────────────────

pub const TYPIFICATION: &str = "Tipificación";
pub const AGENT_MESSAGES: &str = "Mensajes Agente";
pub const USER_MESSAGES: &str = "Mensajes Usuario";
pub const BOT_MESSAGES: &str = "Mensajes Bot";

/// Columns the sessions export must carry before it can be cleaned.
pub const REQUIRED_SESSION_COLUMNS: &[&str] = &[
    SESSION_ID,
    AGENT_NAME,
    SESSION_START,
    SESSION_END,
    QUEUE,
    CLOSED_CONVERSATIONS,
    AGENT_CONVERSATION,
    AGENT_WAIT,
    REPLIES,
    TRANSFERS,
    ABANDONED,
    MEAN_RESPONSE,
];

/// Columns the users export must carry before it can be cleaned.
pub const REQUIRED_USER_COLUMNS: &[&str] = &[SESSION_ID, TYPIFICATION, AGENT_MESSAGES];

/// Session columns coerced with the "`-` or garbage means zero" rule.
pub const SESSION_ZERO_FILLED_COLUMNS: &[&str] = &[
    CLOSED_CONVERSATIONS,
    AGENT_CONVERSATION,
    AGENT_WAIT,
    REPLIES,
    TRANSFERS,
    ABANDONED,
];

/// User message-count columns, coerced with the same zero-fill rule.
pub const USER_MESSAGE_COLUMNS: &[&str] = &[AGENT_MESSAGES, USER_MESSAGES, BOT_MESSAGES];
