/// Placeholder shown for KPIs that are undefined for the current selection.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use insights_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Half-ULP nudge so exact decimal midpoints round away from zero.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        // `frac_str` starts with "0.", e.g. "0.50".
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an integer count with thousands separators.
///
/// ```
/// use insights_core::formatting::format_count;
///
/// assert_eq!(format_count(1_234), "1,234");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a percentage with one decimal place, e.g. `"33.3%"`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value, 1))
}

/// Format a duration given in seconds as minutes with one decimal place.
///
/// `None` renders as [`NOT_AVAILABLE`].
///
/// ```
/// use insights_core::formatting::format_minutes;
///
/// assert_eq!(format_minutes(Some(90.0)), "1.5 min");
/// assert_eq!(format_minutes(None), "N/A");
/// ```
pub fn format_minutes(seconds: Option<f64>) -> String {
    match seconds {
        Some(secs) => format!("{} min", format_number(secs / 60.0, 1)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Format a duration already expressed in hours with two decimal places.
///
/// `None` renders as [`NOT_AVAILABLE`].
///
/// ```
/// use insights_core::formatting::format_hours;
///
/// assert_eq!(format_hours(Some(600.0 / 3600.0)), "0.17 hrs");
/// assert_eq!(format_hours(None), "N/A");
/// ```
pub fn format_hours(hours: Option<f64>) -> String {
    match hours {
        Some(h) => format!("{} hrs", format_number(h, 2)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// ```
/// use insights_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
