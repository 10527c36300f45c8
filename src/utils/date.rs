//! Date utilities: flexible entry parsing, month tokens, calendar helpers.

use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};
use regex::Regex;

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Last calendar day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_next.pred_opt().map(|d| d.day())
}

/// Parse a date as typed by the operator, relative to `today`:
/// - empty          → today
/// - `D` or `DD`    → that day of today's month (checked against the month length)
/// - `YYYY-MM-DD`   → that exact date
pub fn parse_flexible_date(input: &str, today: NaiveDate) -> AppResult<NaiveDate> {
    let s = input.trim();

    if s.is_empty() {
        return Ok(today);
    }

    if s.len() <= 2 && s.chars().all(|c| c.is_ascii_digit()) {
        let day: u32 = s
            .parse()
            .map_err(|_| AppError::InvalidDate(s.to_string()))?;
        let last = last_day_of_month(today.year(), today.month())
            .ok_or_else(|| AppError::InvalidDate(s.to_string()))?;

        if !(1..=last).contains(&day) {
            return Err(AppError::InvalidDate(format!(
                "day {} is not valid for {}-{:02} (1..{})",
                day,
                today.year(),
                today.month(),
                last
            )));
        }

        return NaiveDate::from_ymd_opt(today.year(), today.month(), day)
            .ok_or_else(|| AppError::InvalidDate(s.to_string()));
    }

    let full = Regex::new(r"^\d{4}-\d{2}-\d{2}$").map_err(|e| AppError::Other(e.to_string()))?;
    if full.is_match(s) {
        return parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string()));
    }

    Err(AppError::InvalidDate(format!(
        "{} (use YYYY-MM-DD or just the day DD)",
        s
    )))
}

/// Validate a `YYYY-MM` month token.
pub fn parse_month(s: &str) -> AppResult<(i32, u32)> {
    let t = s.trim();
    let re = Regex::new(r"^(\d{4})-(\d{2})$").map_err(|e| AppError::Other(e.to_string()))?;

    let caps = re
        .captures(t)
        .ok_or_else(|| AppError::InvalidMonth(t.to_string()))?;

    let year: i32 = caps[1]
        .parse()
        .map_err(|_| AppError::InvalidMonth(t.to_string()))?;
    let month: u32 = caps[2]
        .parse()
        .map_err(|_| AppError::InvalidMonth(t.to_string()))?;

    if !(1..=12).contains(&month) {
        return Err(AppError::InvalidMonth(t.to_string()));
    }

    Ok((year, month))
}
