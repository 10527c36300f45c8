//! Tank meter chain reconciliation.
//!
//! Records are folded in `(date, time, id)` order. Each record starts where
//! the previous one ended unless a start is stored, and ends at
//! `start + liters` unless an end is stored. The fold is pure: the same
//! ordered input always gives the same rows, and it never fails on bad data.

use crate::db::store::RecordStore;
use crate::errors::AppResult;
use crate::models::{DistributionRecord, RecordPatch, normalize_equipment};
use crate::utils::units::round2;
use std::collections::HashMap;
use std::fmt;

/// Meter values of one record after reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterRow {
    pub id: i64,
    /// Chain values (stored when present, derived otherwise).
    pub resolved_start: f64,
    pub resolved_end: f64,
    /// Values to show the user.
    pub display_start: f64,
    pub display_end: f64,
    pub delta: f64,
    pub label: String,
    /// Whether start/end were actually stored (and usable).
    pub stored_start: bool,
    pub stored_end: bool,
}

impl CounterRow {
    /// True when the row had to derive at least one of its meters.
    pub fn needs_backfill(&self) -> bool {
        !self.stored_start || !self.stored_end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterField {
    Start,
    End,
}

impl fmt::Display for MeterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeterField::Start => write!(f, "meter start"),
            MeterField::End => write!(f, "meter end"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterIssue {
    Missing,
    Malformed,
}

/// A stored meter value that could not be used and was derived instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQualityWarning {
    pub id: i64,
    pub field: MeterField,
    pub issue: MeterIssue,
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.issue {
            MeterIssue::Missing => "missing",
            MeterIssue::Malformed => "not a number",
        };
        write!(f, "record {}: {} is {}, derived from the chain", self.id, self.field, what)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub rows: Vec<CounterRow>,
    pub warnings: Vec<DataQualityWarning>,
    /// `previousEnd` after the last record (0.0 for an empty input).
    pub last_end: f64,
}

impl Reconciliation {
    pub fn missing_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.issue == MeterIssue::Missing)
            .count()
    }

    pub fn malformed_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.issue == MeterIssue::Malformed)
            .count()
    }
}

fn warn_for(
    warnings: &mut Vec<DataQualityWarning>,
    id: i64,
    field: MeterField,
    value: Option<f64>,
    malformed: bool,
) {
    if value.is_some() {
        return;
    }
    let issue = if malformed {
        MeterIssue::Malformed
    } else {
        MeterIssue::Missing
    };
    warnings.push(DataQualityWarning { id, field, issue });
}

/// Run the fold over records already sorted ascending by `(date, time, id)`.
pub fn reconcile(records: &[DistributionRecord]) -> Reconciliation {
    let mut previous_end = 0.0;
    let mut rows = Vec::with_capacity(records.len());
    let mut warnings = Vec::new();

    for rec in records {
        let stored_start = rec.meter_start.filter(|v| v.is_finite());
        let stored_end = rec.meter_end.filter(|v| v.is_finite());
        let liters = if rec.liters.is_finite() { rec.liters } else { 0.0 };

        let resolved_start = round2(stored_start.unwrap_or(previous_end));
        let resolved_end = round2(stored_end.unwrap_or(resolved_start + liters));

        previous_end = resolved_end;

        let display_start = stored_start.unwrap_or(resolved_start);
        let display_end = stored_end.unwrap_or(resolved_end);

        warn_for(
            &mut warnings,
            rec.id,
            MeterField::Start,
            stored_start,
            rec.meter_quality.start_malformed,
        );
        warn_for(
            &mut warnings,
            rec.id,
            MeterField::End,
            stored_end,
            rec.meter_quality.end_malformed,
        );

        rows.push(CounterRow {
            id: rec.id,
            resolved_start,
            resolved_end,
            display_start,
            display_end,
            delta: round2(display_end - display_start),
            label: format!("{:.2} → {:.2}", display_start, display_end),
            stored_start: stored_start.is_some(),
            stored_end: stored_end.is_some(),
        });
    }

    Reconciliation {
        rows,
        warnings,
        last_end: previous_end,
    }
}

/// Copy of the records with every meter replaced by its resolved value.
pub fn resolve_records(records: &[DistributionRecord]) -> Vec<DistributionRecord> {
    let rec = reconcile(records);
    records
        .iter()
        .zip(rec.rows.iter())
        .map(|(r, row)| {
            let mut out = r.clone();
            out.meter_start = Some(row.resolved_start);
            out.meter_end = Some(row.resolved_end);
            out.meter_quality = Default::default();
            out
        })
        .collect()
}

/// Default meter start for a new record: where the chain currently ends.
pub fn last_meter_end(records: &[DistributionRecord]) -> f64 {
    reconcile(records).last_end
}

/// Most recent non-null hour-meter end for exactly this equipment, 0.0 if none.
/// `records` must be ascending.
pub fn last_hour_meter_end(records: &[DistributionRecord], equipment: &str) -> f64 {
    let wanted = normalize_equipment(equipment);
    records
        .iter()
        .rev()
        .filter(|r| normalize_equipment(&r.equipment) == wanted)
        .find_map(DistributionRecord::hour_meter_end)
        .unwrap_or(0.0)
}

/// Reconciliation of the whole store, looked up by record id.
///
/// Filtered listings use this so that a record shows the values derived
/// from the full chain, not from the filtered subset.
#[derive(Debug, Clone, Default)]
pub struct ReconciledView {
    rows: HashMap<i64, CounterRow>,
    pub warnings: Vec<DataQualityWarning>,
    pub last_end: f64,
}

impl ReconciledView {
    pub fn build(all_ascending: &[DistributionRecord]) -> Self {
        let rec = reconcile(all_ascending);
        Self {
            rows: rec.rows.into_iter().map(|r| (r.id, r)).collect(),
            warnings: rec.warnings,
            last_end: rec.last_end,
        }
    }

    pub fn load<S: RecordStore>(store: &S) -> AppResult<Self> {
        Ok(Self::build(&store.scan_all()?))
    }

    pub fn row(&self, id: i64) -> Option<&CounterRow> {
        self.rows.get(&id)
    }

    /// Warnings restricted to the given records.
    pub fn warnings_for(&self, records: &[DistributionRecord]) -> Vec<&DataQualityWarning> {
        self.warnings
            .iter()
            .filter(|w| records.iter().any(|r| r.id == w.id))
            .collect()
    }
}

/// Meter-only patches for every record lacking a usable stored meter.
/// Records with both meters stored are never touched.
pub fn backfill_patches(records: &[DistributionRecord]) -> Vec<(i64, RecordPatch)> {
    reconcile(records)
        .rows
        .into_iter()
        .filter(CounterRow::needs_backfill)
        .map(|row| (row.id, RecordPatch::meters(row.resolved_start, row.resolved_end)))
        .collect()
}

/// Persist the derived meters. Returns the number of rows updated; a
/// second run right after returns 0.
pub fn backfill<S: RecordStore>(store: &mut S) -> AppResult<usize> {
    let records = store.scan_all()?;
    let mut updated = 0;

    for (id, patch) in backfill_patches(&records) {
        if store.update(id, &patch)? {
            updated += 1;
        }
    }

    Ok(updated)
}
