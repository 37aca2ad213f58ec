//! Overview screen: headline KPIs plus the daily series.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use insights_core::formatting::{format_count, format_minutes, format_number};
use insights_data::aggregator::{DailyCount, DailyVolume};
use insights_data::analysis::DashboardReport;

use crate::components::bars::{bar_lines, BarConfig};
use crate::components::kpi::kpi_lines;
use crate::themes::Theme;

/// Date labels are `YYYY-MM-DD`.
const DATE_LABEL_WIDTH: usize = 10;

/// `(label, value, text)` items for a daily session series. With smoothing,
/// the text carries the moving average as well.
pub fn daily_items(series: &[DailyCount]) -> Vec<(String, f64, String)> {
    series
        .iter()
        .map(|day| {
            let text = match day.moving_average {
                Some(avg) => format!("{} (avg {})", day.sessions, format_number(avg, 1)),
                None => day.sessions.to_string(),
            };
            (day.date.to_string(), day.sessions as f64, text)
        })
        .collect()
}

/// Items for the daily volume chart: closed conversations with the day's
/// mean handle time.
pub fn volume_items(volume: &[DailyVolume]) -> Vec<(String, f64, String)> {
    volume
        .iter()
        .map(|day| {
            (
                day.date.to_string(),
                day.closed_conversations as f64,
                format!(
                    "{} · {}",
                    format_count(day.closed_conversations),
                    format_minutes(Some(day.mean_handle_secs))
                ),
            )
        })
        .collect()
}

fn chart_config(area: Rect) -> BarConfig {
    // Label, two spaces and room for the value text.
    let reserved = DATE_LABEL_WIDTH as u16 + 2 + 22;
    BarConfig {
        width: area.width.saturating_sub(reserved + 2).max(5),
        label_width: DATE_LABEL_WIDTH,
        ..BarConfig::default()
    }
}

/// Render the overview into `area`.
pub fn render_overview(frame: &mut Frame, area: Rect, report: &DashboardReport, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(4),
            Constraint::Min(4),
        ])
        .split(area);

    let kpis = Paragraph::new(Text::from(kpi_lines(&report.kpis, theme))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.table_border)
            .title(" Key metrics "),
    );
    frame.render_widget(kpis, chunks[0]);

    let sessions = daily_items(&report.sessions_by_start);
    let ended = daily_items(&report.sessions_by_end);
    let mut lines = bar_lines(&sessions, chart_config(chunks[1]), theme.bar, theme);
    if !ended.is_empty() {
        lines.push(Line::from(Span::styled("Closed sessions by end date", theme.dim)));
        lines.extend(bar_lines(
            &ended,
            chart_config(chunks[1]),
            theme.bar_secondary,
            theme,
        ));
    }
    frame.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Sessions per day (by start date) "),
        ),
        chunks[1],
    );

    let volume = volume_items(&report.daily_volume);
    frame.render_widget(
        Paragraph::new(Text::from(bar_lines(
            &volume,
            chart_config(chunks[2]),
            theme.bar,
            theme,
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Closed conversations per day · avg handle time "),
        ),
        chunks[2],
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
