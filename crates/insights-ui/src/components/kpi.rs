use crate::themes::Theme;
use insights_core::formatting::{format_count, format_hours, format_minutes, format_percent};
use insights_data::aggregator::Kpis;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// One labelled headline figure.
pub struct KpiCard<'a> {
    pub label: &'static str,
    pub value: String,
    pub style: Style,
    pub theme: &'a Theme,
}

impl<'a> KpiCard<'a> {
    /// Format: `"Closed conversations: 1,234"`
    pub fn to_line(&self) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("{}: ", self.label), self.theme.label),
            Span::styled(self.value.clone(), self.style),
        ])
    }
}

/// The five headline KPIs in display order.
pub fn kpi_cards<'a>(kpis: &Kpis, theme: &'a Theme) -> Vec<KpiCard<'a>> {
    vec![
        KpiCard {
            label: "Closed conversations",
            value: format_count(kpis.total_closed),
            style: theme.value,
            theme,
        },
        KpiCard {
            label: "Abandon rate",
            value: format_percent(kpis.abandon_rate),
            style: theme.abandon_style(kpis.abandon_rate),
            theme,
        },
        KpiCard {
            label: "Transfers",
            value: format_count(kpis.total_transfers),
            style: theme.value,
            theme,
        },
        KpiCard {
            label: "Avg handle time",
            value: format_minutes(kpis.mean_handle_secs),
            style: theme.value,
            theme,
        },
        KpiCard {
            label: "Avg response time",
            value: format_hours(kpis.mean_response_hours),
            style: theme.value,
            theme,
        },
    ]
}

pub fn kpi_lines<'a>(kpis: &Kpis, theme: &'a Theme) -> Vec<Line<'a>> {
    kpi_cards(kpis, theme)
        .iter()
        .map(KpiCard::to_line)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn scenario_kpis() -> Kpis {
        Kpis {
            total_closed: 3,
            total_abandoned: 1,
            abandon_rate: 100.0 / 3.0,
            total_transfers: 1,
            mean_handle_secs: Some(90.0),
            mean_response_hours: Some(600.0 / 3600.0),
            rows: 2,
            distinct_sessions: 2,
        }
    }

    #[test]
    fn test_kpi_lines_scenario() {
        let theme = Theme::dark();
        let lines: Vec<String> = kpi_lines(&scenario_kpis(), &theme)
            .iter()
            .map(text)
            .collect();
        assert_eq!(
            lines,
            vec![
                "Closed conversations: 3",
                "Abandon rate: 33.3%",
                "Transfers: 1",
                "Avg handle time: 1.5 min",
                "Avg response time: 0.17 hrs",
            ]
        );
    }

    #[test]
    fn test_kpi_lines_empty_selection() {
        let theme = Theme::dark();
        let lines: Vec<String> = kpi_lines(&Kpis::default(), &theme)
            .iter()
            .map(text)
            .collect();
        assert_eq!(lines[1], "Abandon rate: 0.0%");
        assert_eq!(lines[3], "Avg handle time: N/A");
        assert_eq!(lines[4], "Avg response time: N/A");
    }

    #[test]
    fn test_abandon_card_uses_threshold_style() {
        let theme = Theme::dark();
        let cards = kpi_cards(&scenario_kpis(), &theme);
        assert_eq!(cards[1].style, theme.error);
    }
}
