//! Static label tables mapping raw platform codes to display strings.
//!
//! Lookups are exact and case-sensitive; anything not in a table passes
//! through unchanged.

/// Label given to sessions exported without a queue.
pub const NO_QUEUE: &str = "Sin Cola";

const QUEUE_TRANSLATIONS: &[(&str, &str)] = &[
    ("_default_", "Default Queue"),
    ("default", "Default Queue"),
    ("atencionAlCliente", "Atención al cliente"),
];

const TYPIFICATION_TRANSLATIONS: &[(&str, &str)] = &[
    ("abandoned-by-user", "Sin respuesta del cliente"),
    ("finished", "Finalizado"),
    ("order-placed", "Venta finalizada"),
    ("inactividad-agente", "Sin respuesta asesor"),
    ("order-booked", "Reserva Realizada"),
];

fn lookup(table: &[(&str, &str)], raw: &str) -> String {
    table
        .iter()
        .find(|(code, _)| *code == raw)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Canonical queue label: default missing queues, trim, then translate.
pub fn canonical_queue(raw: Option<&str>) -> String {
    let trimmed = raw.unwrap_or(NO_QUEUE).trim();
    lookup(QUEUE_TRANSLATIONS, trimmed)
}

/// Canonical typification label. Missing typifications stay missing.
pub fn canonical_typification(raw: Option<&str>) -> Option<String> {
    raw.map(|value| lookup(TYPIFICATION_TRANSLATIONS, value))
}
