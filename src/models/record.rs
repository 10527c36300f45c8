use super::record_kind::RecordKind;
use crate::errors::{AppError, AppResult};
use crate::utils::units::{liters_to_gallons, round2};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// Equipment identifiers are compared and stored trimmed and uppercase.
pub fn normalize_equipment(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Hour-meter readings of one fueling, with the values derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourMeter {
    pub start: f64,
    pub end: f64,
    pub hours_worked: f64,
    /// gal/hour
    pub consumption_rate: f64,
}

impl HourMeter {
    /// `hours_worked = end - start` must be strictly positive.
    pub fn new(start: f64, end: f64, gallons: f64) -> AppResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(AppError::InvalidNumber(format!(
                "hour meter {} → {}",
                start, end
            )));
        }

        let hours_worked = round2(end - start);
        if hours_worked <= 0.0 {
            return Err(AppError::InvalidHours { start, end });
        }

        Ok(Self {
            start,
            end,
            hours_worked,
            consumption_rate: round2(gallons / hours_worked),
        })
    }
}

/// Stored meter columns that held something unusable (text, blob, NaN).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeterQuality {
    pub start_malformed: bool,
    pub end_malformed: bool,
}

/// One fueling event from the central tank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRecord {
    pub id: i64,
    pub date: String, // YYYY-MM-DD
    pub time: String, // HH:MM
    pub equipment: String,
    pub operator: String,
    pub liters: f64,
    pub gallons: f64,
    pub meter_start: Option<f64>,
    pub meter_end: Option<f64>,
    pub hour_meter: Option<HourMeter>,
    pub diesel_price: Option<f64>, // USD/gal
    pub estimated_cost: Option<f64>,
    pub kind: RecordKind,
    /// Raw `horometro_final` column, kept even when the row has no usable
    /// hour-meter pair (legacy rows).
    #[serde(skip)]
    pub stored_hour_end: Option<f64>,
    #[serde(skip)]
    pub meter_quality: MeterQuality,
}

impl DistributionRecord {
    pub fn hours_worked(&self) -> Option<f64> {
        self.hour_meter.map(|h| h.hours_worked)
    }

    pub fn consumption_rate(&self) -> Option<f64> {
        self.hour_meter.map(|h| h.consumption_rate)
    }

    /// Last hour-meter reading known for this fueling, paired or not.
    pub fn hour_meter_end(&self) -> Option<f64> {
        self.hour_meter.map(|h| h.end).or(self.stored_hour_end)
    }

    /// Short one-line description used in confirmations and messages.
    pub fn summary(&self) -> String {
        format!(
            "ID={} | {} {} | {} | {:.2} L | {}",
            self.id, self.date, self.time, self.equipment, self.liters, self.operator
        )
    }
}

/// Fully collected input for a new record, before derived fields exist.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub kind: RecordKind,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub equipment: String,
    pub operator: String,
    pub liters: f64,
    pub meter_start: f64,
    pub meter_end: f64,
    pub hour_meter_start: Option<f64>,
    pub hour_meter_end: Option<f64>,
    pub diesel_price: Option<f64>,
}

impl RecordDraft {
    /// Validate the draft and compute gallons, hours, consumption and cost.
    /// The returned record has `id = 0` until the store assigns one.
    pub fn build(self) -> AppResult<DistributionRecord> {
        if !self.liters.is_finite() || self.liters < 0.0 {
            return Err(AppError::InvalidNumber(format!(
                "liters must be a non-negative number, got {}",
                self.liters
            )));
        }

        let equipment = normalize_equipment(&self.equipment);
        if equipment.is_empty() {
            return Err(AppError::EmptySelection("equipment".into()));
        }

        let operator = self.operator.trim().to_string();
        if operator.is_empty() {
            return Err(AppError::EmptySelection("operator".into()));
        }

        let gallons = liters_to_gallons(self.liters);

        let hour_meter = if self.kind.uses_hour_meter() {
            let start = self.hour_meter_start.unwrap_or(0.0);
            let end = self.hour_meter_end.ok_or_else(|| {
                AppError::Validation("hour meter end is required for WITH_HOUR_METER".into())
            })?;
            Some(HourMeter::new(start, end, gallons)?)
        } else {
            None
        };

        let diesel_price = self.diesel_price.filter(|p| p.is_finite());
        let estimated_cost = diesel_price.map(|p| round2(gallons * p));

        Ok(DistributionRecord {
            id: 0,
            date: self.date.format("%Y-%m-%d").to_string(),
            time: self.time.format("%H:%M").to_string(),
            equipment,
            operator,
            liters: self.liters,
            gallons,
            meter_start: Some(round2(self.meter_start)),
            meter_end: Some(round2(self.meter_end)),
            hour_meter,
            diesel_price,
            estimated_cost,
            kind: self.kind,
            stored_hour_end: hour_meter.map(|h| h.end),
            meter_quality: MeterQuality::default(),
        })
    }
}
