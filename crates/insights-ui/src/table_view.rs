//! Grouped tables for the Agent Insights TUI.
//!
//! Per-agent performance with a team totals row, typification counts with
//! their share, and the agent × typification cross-tab.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use insights_core::formatting::{
    format_count, format_hours, format_minutes, format_percent, percentage,
};
use insights_data::aggregator::{
    saturating_total, AgentPerformance, AgentTypification, Kpis, TypificationCount,
};

use crate::themes::Theme;

fn bordered(title: &str, theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(format!(" {} ", title))
}

fn header_row(labels: &[&'static str], theme: &Theme) -> Row<'static> {
    Row::new(
        labels
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header))
            .collect::<Vec<_>>(),
    )
    .height(1)
}

// ── Agents ────────────────────────────────────────────────────────────────────

/// Render per-agent performance followed by a team totals row taken from the
/// KPIs.
pub fn render_agent_table(
    frame: &mut Frame,
    area: Rect,
    agents: &[AgentPerformance],
    kpis: &Kpis,
    theme: &Theme,
) {
    let header = header_row(
        &[
            "Agent",
            "Closed",
            "Avg handle",
            "Avg response",
            "Transfers",
            "Agent msgs",
        ],
        theme,
    );

    let mut rows: Vec<Row> = agents
        .iter()
        .enumerate()
        .map(|(i, agent)| {
            Row::new(vec![
                Cell::from(agent.agent_name.clone()),
                Cell::from(format_count(agent.closed_conversations)),
                Cell::from(format_minutes(Some(agent.mean_handle_secs))),
                Cell::from(format_hours(agent.mean_response_secs.map(|s| s / 3600.0))),
                Cell::from(format_count(agent.transfers)),
                Cell::from(format_count(agent.agent_messages)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let total_messages = saturating_total(agents.iter().map(|a| a.agent_messages));
    rows.push(
        Row::new(vec![
            Cell::from(format!("TEAM ({} agents)", agents.len())),
            Cell::from(format_count(kpis.total_closed)),
            Cell::from(format_minutes(kpis.mean_handle_secs)),
            Cell::from(format_hours(kpis.mean_response_hours)),
            Cell::from(format_count(kpis.total_transfers)),
            Cell::from(format_count(total_messages)),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(11),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered("Agent performance", theme))
        .style(theme.text);
    frame.render_widget(table, area);
}

// ── Typifications ─────────────────────────────────────────────────────────────

/// `(label, count, share)` rows for the typification table. Shares are
/// percentages of all typified rows.
pub fn typification_rows(counts: &[TypificationCount]) -> Vec<(String, usize, f64)> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    counts
        .iter()
        .map(|c| {
            (
                c.typification.clone(),
                c.count,
                percentage(c.count as f64, total as f64, 1),
            )
        })
        .collect()
}

/// Render typification counts on the left and the per-agent cross-tab on the
/// right.
pub fn render_typification_tables(
    frame: &mut Frame,
    area: Rect,
    counts: &[TypificationCount],
    by_agent: &[AgentTypification],
    theme: &Theme,
) {
    if counts.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No typification data for this selection",
                theme.warning,
            )),
        ];
        frame.render_widget(
            Paragraph::new(text).block(bordered("Typifications", theme)),
            area,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let rows: Vec<Row> = typification_rows(counts)
        .into_iter()
        .enumerate()
        .map(|(i, (label, count, share))| {
            Row::new(vec![
                Cell::from(label),
                Cell::from(format_count(count as u64)),
                Cell::from(format_percent(share)),
            ])
            .style(theme.row_style(i))
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(header_row(&["Typification", "Count", "Share"], theme))
    .block(bordered("Typifications", theme))
    .style(theme.text);
    frame.render_widget(table, chunks[0]);

    let rows: Vec<Row> = by_agent
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            Row::new(vec![
                Cell::from(cell.agent_name.clone()),
                Cell::from(cell.typification.clone()),
                Cell::from(format_count(cell.count as u64)),
            ])
            .style(theme.row_style(i))
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Min(20),
            Constraint::Length(8),
        ],
    )
    .header(header_row(&["Agent", "Typification", "Count"], theme))
    .block(bordered("Typifications by agent", theme))
    .style(theme.text);
    frame.render_widget(table, chunks[1]);
}

// ── No data ───────────────────────────────────────────────────────────────────

/// Placeholder shown when no row matches the filters.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No data for this selection", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Adjust --agent, --queue, --from or --to and try again.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(bordered("Agent Insights", theme)),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
