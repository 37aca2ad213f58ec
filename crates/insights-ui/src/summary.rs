//! Plain-text report for non-interactive output.

use std::fmt::Write;

use insights_core::formatting::{
    format_count, format_hours, format_minutes, format_number, format_percent,
};
use insights_data::analysis::DashboardReport;

/// Render `report` as aligned plain text, one section per dashboard panel.
pub fn render_summary(report: &DashboardReport, sessions_file: &str, users_file: &str) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_summary(&mut out, report, sessions_file, users_file);
    out
}

fn write_summary(
    out: &mut String,
    report: &DashboardReport,
    sessions_file: &str,
    users_file: &str,
) -> std::fmt::Result {
    writeln!(out, "AGENT INSIGHTS")?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "[ {sessions_file} | {users_file} ]")?;
    match report.filters.date_range {
        Some(range) => writeln!(out, "Period: {} → {}", range.start(), range.end())?,
        None => writeln!(out, "Period: none")?,
    }
    writeln!(out)?;

    if report.is_empty() {
        writeln!(out, "No data for this selection.")?;
        return Ok(());
    }

    let k = &report.kpis;
    writeln!(out, "Key metrics")?;
    writeln!(out, "  {:<22}{}", "Closed conversations", format_count(k.total_closed))?;
    writeln!(out, "  {:<22}{}", "Abandon rate", format_percent(k.abandon_rate))?;
    writeln!(out, "  {:<22}{}", "Transfers", format_count(k.total_transfers))?;
    writeln!(out, "  {:<22}{}", "Avg handle time", format_minutes(k.mean_handle_secs))?;
    writeln!(out, "  {:<22}{}", "Avg response time", format_hours(k.mean_response_hours))?;
    writeln!(
        out,
        "  {:<22}{} rows, {} sessions",
        "Selection",
        format_count(k.rows as u64),
        format_count(k.distinct_sessions as u64)
    )?;
    writeln!(out)?;

    writeln!(out, "Sessions per day (by start date)")?;
    for day in &report.sessions_by_start {
        match day.moving_average {
            Some(avg) => writeln!(
                out,
                "  {}  {:>6}  avg {}",
                day.date,
                day.sessions,
                format_number(avg, 1)
            )?,
            None => writeln!(out, "  {}  {:>6}", day.date, day.sessions)?,
        }
    }
    writeln!(out)?;

    writeln!(out, "Agents")?;
    for agent in &report.agents {
        writeln!(
            out,
            "  {:<24}{:>8} closed  {:>10}  {:>10}  {:>4} transfers  {:>6} msgs",
            agent.agent_name,
            format_count(agent.closed_conversations),
            format_minutes(Some(agent.mean_handle_secs)),
            format_hours(agent.mean_response_secs.map(|s| s / 3600.0)),
            agent.transfers,
            format_count(agent.agent_messages)
        )?;
    }

    if !report.typifications.is_empty() {
        writeln!(out)?;
        writeln!(out, "Typifications")?;
        for t in &report.typifications {
            writeln!(out, "  {:<32}{:>6}", t.typification, t.count)?;
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
