// src/export/model.rs

use crate::core::list::ReconciledRecord;
use serde::Serialize;

/// One spreadsheet cell value, shared by the listing export and the report.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn opt(v: Option<f64>) -> Self {
        match v {
            Some(x) if x.is_finite() => Cell::Number(x),
            _ => Cell::Empty,
        }
    }

    pub fn text(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Flat shape of a reconciled record for export.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RecordExport {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub equipment: String,
    pub operator: String,
    pub liters: f64,
    pub gallons: f64,
    pub meter_start: f64,
    pub meter_end: f64,
    pub sequence: String,
    pub delta: f64,
    pub kind: String,
    pub hour_meter_start: Option<f64>,
    pub hour_meter_end: Option<f64>,
    pub hours_worked: Option<f64>,
    pub consumption_rate: Option<f64>,
    pub diesel_price: Option<f64>,
    pub estimated_cost: Option<f64>,
}

impl From<&ReconciledRecord> for RecordExport {
    fn from(r: &ReconciledRecord) -> Self {
        let rec = &r.record;
        Self {
            id: rec.id,
            date: rec.date.clone(),
            time: rec.time.clone(),
            equipment: rec.equipment.clone(),
            operator: rec.operator.clone(),
            liters: rec.liters,
            gallons: rec.gallons,
            meter_start: r.counter.display_start,
            meter_end: r.counter.display_end,
            sequence: r.counter.label.clone(),
            delta: r.counter.delta,
            kind: rec.kind.as_str().to_string(),
            hour_meter_start: rec.hour_meter.map(|h| h.start),
            hour_meter_end: rec.hour_meter.map(|h| h.end),
            hours_worked: rec.hours_worked(),
            consumption_rate: rec.consumption_rate(),
            diesel_price: rec.diesel_price,
            estimated_cost: rec.estimated_cost,
        }
    }
}

/// Header per CSV / XLSX
pub(crate) fn get_headers() -> Vec<&'static str> {
    vec![
        "id",
        "date",
        "time",
        "equipment",
        "operator",
        "liters",
        "gallons",
        "meter_start",
        "meter_end",
        "sequence",
        "delta",
        "kind",
        "hour_meter_start",
        "hour_meter_end",
        "hours_worked",
        "consumption_rate",
        "diesel_price",
        "estimated_cost",
    ]
}

/// Same order as [`get_headers`].
pub(crate) fn record_to_cells(e: &RecordExport) -> Vec<Cell> {
    vec![
        Cell::Number(e.id as f64),
        Cell::text(&e.date),
        Cell::text(&e.time),
        Cell::text(&e.equipment),
        Cell::text(&e.operator),
        Cell::Number(e.liters),
        Cell::Number(e.gallons),
        Cell::Number(e.meter_start),
        Cell::Number(e.meter_end),
        Cell::text(&e.sequence),
        Cell::Number(e.delta),
        Cell::text(&e.kind),
        Cell::opt(e.hour_meter_start),
        Cell::opt(e.hour_meter_end),
        Cell::opt(e.hours_worked),
        Cell::opt(e.consumption_rate),
        Cell::opt(e.diesel_price),
        Cell::opt(e.estimated_cost),
    ]
}
