/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Returns GREY when the field is empty ("" or "--"), RESET otherwise.
pub fn color_for_optional_field(value: &str) -> &'static str {
    let v = value.trim();
    if v.is_empty() || v == "--" { GREY } else { RESET }
}

/// Delta color: a derived chain never goes backwards, so a negative
/// delta comes from stored values that disagree with each other.
pub fn color_for_delta(value: f64) -> &'static str {
    if value < 0.0 { RED } else { RESET }
}

pub fn colorize_optional(value: &str) -> String {
    format!("{}{value}{RESET}", color_for_optional_field(value))
}
