//! Time utilities: parsing and formatting HH:MM.

use crate::errors::{AppError, AppResult};
use chrono::NaiveTime;

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").ok()
}

/// Empty input means "now"; anything else must be a valid HH:MM.
pub fn parse_time_or_now(input: &str, now: NaiveTime) -> AppResult<NaiveTime> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(now);
    }
    parse_time(s).ok_or_else(|| AppError::InvalidTime(s.to_string()))
}
