use crate::themes::Theme;
use insights_data::filter::DateRange;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const ACCENT: &str = "◆ ◇ ◆";

/// Width of the `=` separator under the title.
const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. Application title with accent decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. Source files in `[ sessions | users ]` format.
/// 4. The analysed date range, or a dim placeholder when there is none.
pub struct Header<'a> {
    pub sessions_file: &'a str,
    pub users_file: &'a str,
    pub date_range: Option<DateRange>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        sessions_file: &'a str,
        users_file: &'a str,
        date_range: Option<DateRange>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            sessions_file,
            users_file,
            date_range,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let range = match self.date_range {
            Some(range) => Line::from(vec![
                Span::styled("Period: ", self.theme.label),
                Span::styled(
                    format!("{} → {}", range.start(), range.end()),
                    self.theme.value,
                ),
            ]),
            None => Line::from(Span::styled("Period: none", self.theme.dim)),
        };

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(" AGENT INSIGHTS ", self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.sessions_file, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.users_file, self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            range,
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
