// src/export/report.rs

use crate::core::list::{ListLogic, ReconciledRecord};
use crate::db::log::audit_or_warn;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::model::Cell;
use crate::export::template::{REPORT_HEADERS, render_template};
use crate::models::{RecordFilter, SortOrder};
use crate::utils::date::parse_month;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Written { path: PathBuf, rows: usize },
    NoRecords,
}

/// Which values fill the two tank meter columns of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MeterSource {
    stored_start: bool,
    stored_end: bool,
}

impl MeterSource {
    /// Stored values, unless the month has none at all in that column.
    fn for_month(rows: &[ReconciledRecord]) -> Self {
        Self {
            stored_start: rows.iter().any(|r| r.record.meter_start.is_some()),
            stored_end: rows.iter().any(|r| r.record.meter_end.is_some()),
        }
    }
}

fn report_row(r: &ReconciledRecord, source: MeterSource) -> Vec<Cell> {
    let rec = &r.record;

    let meter_start = if source.stored_start {
        Cell::opt(rec.meter_start)
    } else {
        Cell::Number(r.counter.resolved_start)
    };
    let meter_end = if source.stored_end {
        Cell::opt(rec.meter_end)
    } else {
        Cell::Number(r.counter.resolved_end)
    };

    vec![
        Cell::text(&rec.date),
        Cell::text(&rec.equipment),
        Cell::Number(rec.gallons),
        Cell::text(&rec.operator),
        Cell::Number(rec.liters),
        Cell::opt(rec.hours_worked()),
        Cell::opt(rec.hour_meter.map(|h| h.start)),
        Cell::opt(rec.hour_meter.map(|h| h.end)),
        meter_start,
        meter_end,
        Cell::opt(rec.consumption_rate()),
        Cell::opt(rec.diesel_price),
        Cell::opt(rec.estimated_cost),
    ]
}

/// Project a month's reconciled records onto the report columns.
pub fn report_rows(rows: &[ReconciledRecord]) -> Vec<Vec<Cell>> {
    let source = MeterSource::for_month(rows);
    rows.iter().map(|r| report_row(r, source)).collect()
}

pub struct ReportLogic;

impl ReportLogic {
    /// Write the report of `month` (`YYYY-MM`) into a copy of `template`.
    ///
    /// No file is produced for a month without records. A missing template
    /// or sheet aborts before anything is written.
    pub fn generate(
        pool: &DbPool,
        month: &str,
        template: &Path,
        sheet: &str,
        out: &Path,
    ) -> AppResult<ReportOutcome> {
        // 1️⃣ month token
        let (year, mon) = parse_month(month)?;
        let token = format!("{:04}-{:02}", year, mon);

        // 2️⃣ the month, reconciled against the whole chain
        let listing = ListLogic::load(pool, &RecordFilter::month(&token), SortOrder::Ascending)?;
        if listing.is_empty() {
            return Ok(ReportOutcome::NoRecords);
        }

        // 3️⃣ fill the template in memory
        let rows = report_rows(&listing.rows);
        let bytes = render_template(template, sheet, &rows, REPORT_HEADERS.len())?;

        // 4️⃣ single write
        if let Some(parent) = out.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(out, bytes)?;

        audit_or_warn(
            &pool.conn,
            "report",
            &out.to_string_lossy(),
            &format!("Monthly report {} ({} records)", token, rows.len()),
        );

        Ok(ReportOutcome::Written {
            path: out.to_path_buf(),
            rows: rows.len(),
        })
    }
}
