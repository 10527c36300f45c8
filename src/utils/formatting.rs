//! Formatting utilities used for CLI and export outputs.

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Two-decimals rendering of a meter/number.
pub fn fmt_meter(v: f64) -> String {
    format!("{:.2}", v)
}

/// Two-decimals rendering of an optional value, `--` when absent.
pub fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) => fmt_meter(x),
        None => "--".to_string(),
    }
}
