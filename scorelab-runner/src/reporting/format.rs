//! Shared number formatting for console and Markdown reports.

/// Placeholder for values that are missing or not finite.
pub const MISSING: &str = "—";

/// Fraction as a percentage with `decimals` places, `—` when not finite.
pub fn fmt_pct(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }
    format!("{:.*}%", decimals, value * 100.0)
}

pub fn fmt_pct_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| fmt_pct(v, decimals))
}

pub fn fmt_num(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }
    format!("{:.*}", decimals, value)
}

/// Signed win-rate lift: `+` prefix when non-negative, `—` when undefined.
pub fn fmt_lift(lift: Option<f64>) -> String {
    match lift {
        Some(l) if l >= 0.0 => format!("+{}", fmt_pct(l, 1)),
        Some(l) => fmt_pct(l, 1),
        None => MISSING.to_string(),
    }
}

/// Excursion level as a short percentage label: `0.00618` → `0.618%`, `0.01` → `1.0%`.
pub fn fmt_level(level: f64) -> String {
    let mut s = format!("{:.3}", level * 100.0);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.push('0');
    }
    format!("{s}%")
}
