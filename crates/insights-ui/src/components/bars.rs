use crate::themes::Theme;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Visual settings shared by every bar in a chart.
#[derive(Debug, Clone, Copy)]
pub struct BarConfig {
    /// Columns used by the bar itself (label and value excluded).
    pub width: u16,
    /// Columns reserved for the label; longer labels are cut with `…`.
    pub label_width: usize,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            label_width: 20,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

/// One labelled horizontal bar scaled against `max`.
pub struct HorizontalBar<'a> {
    pub label: &'a str,
    pub value: f64,
    pub max: f64,
    /// Text printed after the bar, typically the formatted value.
    pub value_text: String,
    pub style: Style,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> HorizontalBar<'a> {
    pub fn new(label: &'a str, value: f64, max: f64, value_text: String, theme: &'a Theme) -> Self {
        Self {
            label,
            value,
            max,
            value_text,
            style: theme.bar,
            theme,
            config: BarConfig::default(),
        }
    }

    /// Filled columns for the current value, never more than the bar width.
    pub fn filled_columns(&self) -> u16 {
        if self.max <= 0.0 || self.value <= 0.0 {
            return 0;
        }
        let ratio = (self.value / self.max).min(1.0);
        let filled = (ratio * self.config.width as f64).round() as u16;
        // Any positive value gets at least one column.
        filled.max(1)
    }

    pub fn to_line(&self) -> Line<'a> {
        let filled = self.filled_columns();
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String = std::iter::repeat(self.config.filled_char)
            .take(filled as usize)
            .collect();
        let empty_str: String = std::iter::repeat(self.config.empty_char)
            .take(empty as usize)
            .collect();

        Line::from(vec![
            Span::styled(fit_label(self.label, self.config.label_width), self.theme.label),
            Span::raw(" "),
            Span::styled(filled_str, self.style),
            Span::styled(empty_str, self.theme.bar_empty),
            Span::raw(" "),
            Span::styled(self.value_text.clone(), self.theme.value),
        ])
    }
}

/// Build one bar per `(label, value, value_text)` item, all scaled against the
/// largest value.
pub fn bar_lines<'a>(
    items: &'a [(String, f64, String)],
    config: BarConfig,
    style: Style,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let max = items.iter().map(|(_, v, _)| *v).fold(0.0_f64, f64::max);
    items
        .iter()
        .map(|(label, value, text)| {
            let mut bar = HorizontalBar::new(label, *value, max, text.clone(), theme);
            bar.config = config;
            bar.style = style;
            bar.to_line()
        })
        .collect()
}

/// Pad or cut `label` to exactly `width` terminal columns.
pub fn fit_label(label: &str, width: usize) -> String {
    let label_width = UnicodeWidthStr::width(label);
    if label_width <= width {
        return format!("{}{}", label, " ".repeat(width - label_width));
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0usize;
    for ch in label.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
