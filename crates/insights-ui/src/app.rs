//! Application state and TUI event loop for Agent Insights.
//!
//! [`App`] owns the theme, the active view and the report being shown. The
//! report is computed once before the loop starts; the loop only redraws and
//! reacts to keys.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame, Terminal,
};

use insights_data::analysis::DashboardReport;

use crate::components::header::Header;
use crate::overview_view;
use crate::table_view;
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which dashboard tab is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// KPIs and daily series.
    Overview,
    /// Per-agent performance table.
    Agents,
    /// Typification counts and cross-tab.
    Typifications,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Overview, ViewMode::Agents, ViewMode::Typifications];

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Overview => "Overview",
            ViewMode::Agents => "Agents",
            ViewMode::Typifications => "Typifications",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ViewMode::Overview => ViewMode::Agents,
            ViewMode::Agents => ViewMode::Typifications,
            ViewMode::Typifications => ViewMode::Overview,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            ViewMode::Overview => ViewMode::Typifications,
            ViewMode::Agents => ViewMode::Overview,
            ViewMode::Typifications => ViewMode::Agents,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub view_mode: ViewMode,
    pub report: DashboardReport,
    pub sessions_file: String,
    pub users_file: String,
    /// Set to `true` to leave the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(
        theme_name: &str,
        report: DashboardReport,
        sessions_file: String,
        users_file: String,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            view_mode: ViewMode::Overview,
            report,
            sessions_file,
            users_file,
            should_quit: false,
        }
    }

    /// Apply one key press. Returns `true` when the screen needs a redraw.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                false
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                false
            }
            KeyCode::Tab | KeyCode::Right => self.switch_to(self.view_mode.next()),
            KeyCode::BackTab | KeyCode::Left => self.switch_to(self.view_mode.previous()),
            KeyCode::Char('1') => self.switch_to(ViewMode::Overview),
            KeyCode::Char('2') => self.switch_to(ViewMode::Agents),
            KeyCode::Char('3') => self.switch_to(ViewMode::Typifications),
            _ => false,
        }
    }

    fn switch_to(&mut self, mode: ViewMode) -> bool {
        let changed = self.view_mode != mode;
        self.view_mode = mode;
        changed
    }

    /// Run the dashboard until the user quits with `q`, `Esc` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so the loop stays on
    /// the current thread.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(err) = terminal.draw(|frame| self.render(frame)) {
                break Err(err);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => {
                        self.handle_key(key);
                    }
                    Ok(_) => {}
                    Err(err) => break Err(err),
                },
                Ok(false) => {}
                Err(err) => break Err(err),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Render the header, the tab strip and the active view into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(area);

        let header = Header::new(
            &self.sessions_file,
            &self.users_file,
            self.report.filters.date_range,
            &self.theme,
        );
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), chunks[0]);
        frame.render_widget(Paragraph::new(self.tabs_line()), chunks[1]);

        if self.report.is_empty() {
            table_view::render_no_data(frame, chunks[2], &self.theme);
            return;
        }

        match self.view_mode {
            ViewMode::Overview => {
                overview_view::render_overview(frame, chunks[2], &self.report, &self.theme)
            }
            ViewMode::Agents => table_view::render_agent_table(
                frame,
                chunks[2],
                &self.report.agents,
                &self.report.kpis,
                &self.theme,
            ),
            ViewMode::Typifications => table_view::render_typification_tables(
                frame,
                chunks[2],
                &self.report.typifications,
                &self.report.typification_by_agent,
                &self.theme,
            ),
        }
    }

    fn tabs_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, mode) in ViewMode::ALL.iter().enumerate() {
            let style = if *mode == self.view_mode {
                self.theme.tab_active
            } else {
                self.theme.tab_inactive
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, mode.title()), style));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled("Tab: switch · q: quit", self.theme.dim));
        Line::from(spans)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insights_data::aggregator::{AgentPerformance, Kpis};
    use insights_data::filter::{DateRange, Filters};
    use ratatui::backend::TestBackend;

    fn report(rows: usize) -> DashboardReport {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut filters = Filters::all(&[]);
        filters.date_range = Some(DateRange::new(day, day).unwrap());
        DashboardReport {
            filters,
            kpis: Kpis {
                total_closed: 3,
                rows,
                ..Kpis::default()
            },
            sessions_by_start: vec![],
            sessions_by_end: vec![],
            daily_volume: vec![],
            agents: vec![AgentPerformance {
                agent_name: "Ana".to_string(),
                closed_conversations: 3,
                mean_handle_secs: 90.0,
                mean_response_secs: None,
                transfers: 1,
                agent_messages: 7,
            }],
            typifications: vec![],
            typification_by_agent: vec![],
        }
    }

    fn app(rows: usize) -> App {
        App::new("dark", report(rows), "s.tsv".into(), "u.tsv".into())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── ViewMode ──────────────────────────────────────────────────────────────

    #[test]
    fn test_view_mode_cycles() {
        let mut mode = ViewMode::Overview;
        for _ in 0..3 {
            mode = mode.next();
        }
        assert_eq!(mode, ViewMode::Overview);
        assert_eq!(ViewMode::Overview.previous(), ViewMode::Typifications);
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_app_starts_on_overview() {
        let app = app(2);
        assert_eq!(app.view_mode, ViewMode::Overview);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_tab_and_digits_switch_views() {
        let mut app = app(2);
        assert!(app.handle_key(press(KeyCode::Tab)));
        assert_eq!(app.view_mode, ViewMode::Agents);
        assert!(app.handle_key(press(KeyCode::BackTab)));
        assert_eq!(app.view_mode, ViewMode::Overview);
        assert!(app.handle_key(press(KeyCode::Char('3'))));
        assert_eq!(app.view_mode, ViewMode::Typifications);
        assert!(!app.handle_key(press(KeyCode::Char('3'))));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app(2);
        app.handle_key(press(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = self::app(2);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_plain_c_does_not_quit() {
        let mut app = app(2);
        assert!(!app.handle_key(press(KeyCode::Char('c'))));
        assert!(!app.should_quit);
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_overview_with_header() {
        let content = screen(&app(2));
        assert!(content.contains("AGENT INSIGHTS"));
        assert!(content.contains("Period: 2024-01-01 → 2024-01-01"));
        assert!(content.contains("Key metrics"));
    }

    #[test]
    fn test_render_agents_tab() {
        let mut app = app(2);
        app.handle_key(press(KeyCode::Char('2')));
        let content = screen(&app);
        assert!(content.contains("Agent performance"));
        assert!(content.contains("Ana"));
    }

    #[test]
    fn test_render_empty_report_shows_placeholder() {
        let content = screen(&app(0));
        assert!(content.contains("No data for this selection"));
        assert!(!content.contains("Key metrics"));
    }
}
