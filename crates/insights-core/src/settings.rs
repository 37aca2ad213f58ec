use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::time_utils::parse_date_arg;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Agent productivity dashboard for customer-support platform exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "agent-insights",
    about = "Agent productivity dashboard for customer-support platform exports",
    version
)]
pub struct Settings {
    /// Agent sessions export (operatorsSessions…)
    #[arg(long)]
    pub sessions: Option<PathBuf>,

    /// User conversations export (users…)
    #[arg(long)]
    pub users: Option<PathBuf>,

    /// Directory searched for exports when --sessions/--users are omitted
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Only include these agents (repeatable; default: all)
    #[arg(long = "agent")]
    pub agents: Vec<String>,

    /// Only include these queues (repeatable; default: all)
    #[arg(long = "queue")]
    pub queues: Vec<String>,

    /// First day of the analysed range, YYYY-MM-DD (default: earliest session)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day of the analysed range, YYYY-MM-DD (default: latest session)
    #[arg(long)]
    pub to: Option<String>,

    /// Output mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "summary", "json"])]
    pub view: String,

    /// Add 7-row moving averages to the daily series
    #[arg(long)]
    pub smooth: bool,

    /// Write the filtered merged table to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Date bounds requested on the command line, either side optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateBounds {
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments from the process environment.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(args).apply_debug()
    }

    /// `--debug` overrides log level.
    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// Parse `--from` / `--to` into dates.
    pub fn date_bounds(&self) -> Result<DateBounds> {
        Ok(DateBounds {
            from: self.from.as_deref().map(parse_date_arg).transpose()?,
            to: self.to.as_deref().map(parse_date_arg).transpose()?,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InsightsError;
    use chrono::NaiveDate;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["agent-insights"]);

        assert!(settings.sessions.is_none());
        assert!(settings.users.is_none());
        assert!(settings.dir.is_none());
        assert!(settings.agents.is_empty());
        assert!(settings.queues.is_empty());
        assert!(settings.from.is_none());
        assert!(settings.to.is_none());
        assert_eq!(settings.view, "dashboard");
        assert!(!settings.smooth);
        assert!(settings.export.is_none());
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_cli_inputs() {
        let settings = Settings::parse_from([
            "agent-insights",
            "--sessions",
            "/tmp/operatorsSessions.tsv",
            "--users",
            "/tmp/users.tsv",
        ]);
        assert_eq!(
            settings.sessions,
            Some(PathBuf::from("/tmp/operatorsSessions.tsv"))
        );
        assert_eq!(settings.users, Some(PathBuf::from("/tmp/users.tsv")));
    }

    #[test]
    fn test_settings_repeatable_filters() {
        let settings = Settings::parse_from([
            "agent-insights",
            "--agent",
            "Ana",
            "--agent",
            "Luis",
            "--queue",
            "Default Queue",
        ]);
        assert_eq!(settings.agents, vec!["Ana", "Luis"]);
        assert_eq!(settings.queues, vec!["Default Queue"]);
    }

    #[test]
    fn test_settings_rejects_unknown_view() {
        let result = Settings::try_parse_from(["agent-insights", "--view", "chart"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings = Settings::load_from_args(["agent-insights", "--debug"]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_date_bounds_parsed() {
        let settings = Settings::parse_from([
            "agent-insights",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
        ]);
        let bounds = settings.date_bounds().unwrap();
        assert_eq!(bounds.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(bounds.to, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn test_date_bounds_default_open() {
        let settings = Settings::parse_from(["agent-insights"]);
        assert_eq!(settings.date_bounds().unwrap(), DateBounds::default());
    }

    #[test]
    fn test_date_bounds_invalid() {
        let settings = Settings::parse_from(["agent-insights", "--from", "January"]);
        assert!(matches!(
            settings.date_bounds(),
            Err(InsightsError::InvalidDate(_))
        ));
    }
}
