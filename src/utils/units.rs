//! Unit conversion and rounding shared by entry, edit and reports.

pub const GALLONS_PER_LITER: f64 = 0.264172;

/// Round half away from zero to two decimals.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn liters_to_gallons(liters: f64) -> f64 {
    round2(liters * GALLONS_PER_LITER)
}

/// Parse a user-typed number; commas are accepted as decimal separator.
pub fn parse_number(s: &str) -> Option<f64> {
    let v: f64 = s.trim().replace(',', ".").parse().ok()?;
    v.is_finite().then_some(v)
}
