//! Required-column checks run before any cleaning.

use insights_core::columns::{REQUIRED_SESSION_COLUMNS, REQUIRED_USER_COLUMNS};
use insights_core::error::MissingColumns;
use tracing::warn;

use crate::reader::RawTable;

/// Outcome of checking one file against its required column set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileValidation {
    pub file: String,
    /// Required columns the file lacks, in catalogue order.
    pub missing: Vec<String>,
}

impl FileValidation {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Validation of both exports. Valid only when both files are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub sessions: FileValidation,
    pub users: FileValidation,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.sessions.is_valid() && self.users.is_valid()
    }

    /// Per-file reports for every file that failed, sessions first.
    pub fn failures(&self) -> Vec<MissingColumns> {
        [&self.sessions, &self.users]
            .into_iter()
            .filter(|v| !v.is_valid())
            .map(|v| MissingColumns {
                file: v.file.clone(),
                columns: v.missing.clone(),
            })
            .collect()
    }
}

/// Check `table` for every column in `required`.
pub fn check_columns(table: &RawTable, required: &[&str], file: &str) -> FileValidation {
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !table.has_column(col))
        .map(|col| (*col).to_string())
        .collect();

    if !missing.is_empty() {
        warn!(
            "file '{}' is missing required columns: {}",
            file,
            missing.join(", ")
        );
    }

    FileValidation {
        file: file.to_string(),
        missing,
    }
}

/// Validate both parsed exports against their required column sets.
pub fn validate_tables(
    sessions: &RawTable,
    sessions_file: &str,
    users: &RawTable,
    users_file: &str,
) -> Validation {
    Validation {
        sessions: check_columns(sessions, REQUIRED_SESSION_COLUMNS, sessions_file),
        users: check_columns(users, REQUIRED_USER_COLUMNS, users_file),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{parse_sessions, parse_users, Upload};

    fn sessions_table(columns: &[&str]) -> RawTable {
        let header = columns.join("\t");
        parse_sessions(&Upload::new("sessions.tsv", format!("{header}\n"))).unwrap()
    }

    fn users_table(columns: &[&str]) -> RawTable {
        let header = columns.join("\t");
        parse_users(&Upload::new("users.tsv", format!("{header}\n"))).unwrap()
    }

    #[test]
    fn test_complete_tables_are_valid() {
        let validation = validate_tables(
            &sessions_table(REQUIRED_SESSION_COLUMNS),
            "sessions.tsv",
            &users_table(REQUIRED_USER_COLUMNS),
            "users.tsv",
        );
        assert!(validation.is_valid());
        assert!(validation.failures().is_empty());
    }

    #[test]
    fn test_missing_columns_reported_in_catalogue_order() {
        let present: Vec<&str> = REQUIRED_SESSION_COLUMNS
            .iter()
            .copied()
            .filter(|c| *c != "Cola" && *c != "Tiempo medio de respuesta")
            .collect();
        let result = check_columns(
            &sessions_table(&present),
            REQUIRED_SESSION_COLUMNS,
            "sessions.tsv",
        );
        assert!(!result.is_valid());
        assert_eq!(result.missing, vec!["Cola", "Tiempo medio de respuesta"]);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let mut columns = REQUIRED_USER_COLUMNS.to_vec();
        columns.push("Canal");
        let result = check_columns(&users_table(&columns), REQUIRED_USER_COLUMNS, "users.tsv");
        assert!(result.is_valid());
    }

    #[test]
    fn test_overall_validity_is_conjunction() {
        let validation = validate_tables(
            &sessions_table(REQUIRED_SESSION_COLUMNS),
            "sessions.tsv",
            &users_table(&["Id Sesión"]),
            "users.tsv",
        );
        assert!(validation.sessions.is_valid());
        assert!(!validation.users.is_valid());
        assert!(!validation.is_valid());

        let failures = validation.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].file, "users.tsv");
        assert_eq!(failures[0].columns, vec!["Tipificación", "Mensajes Agente"]);
    }

    #[test]
    fn test_both_files_reported() {
        let validation = validate_tables(
            &sessions_table(&["Id Sesión"]),
            "sessions.tsv",
            &users_table(&["Id Sesión"]),
            "users.tsv",
        );
        let files: Vec<String> = validation.failures().into_iter().map(|f| f.file).collect();
        assert_eq!(files, vec!["sessions.tsv", "users.tsv"]);
    }
}
