use crate::db::log::audit_or_warn;
use crate::db::pool::DbPool;
use crate::db::store::RecordStore;
use crate::errors::{AppError, AppResult};
use crate::models::{DistributionRecord, HourMeter, RecordKind, RecordPatch, normalize_equipment};
use crate::utils::date::parse_date;
use crate::utils::time::parse_time;
use crate::utils::units::{liters_to_gallons, round2};

/// Field corrections requested for one record. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    pub equipment: Option<String>,
    pub operator: Option<String>,
    pub liters: Option<f64>,
    pub meter_start: Option<f64>,
    pub meter_end: Option<f64>,
    pub clear_meters: bool,
    pub hour_start: Option<f64>,
    pub hour_end: Option<f64>,
    pub price: Option<f64>,
    pub kind: Option<RecordKind>,
}

fn non_negative(what: &str, v: f64) -> AppResult<f64> {
    if !v.is_finite() || v < 0.0 {
        return Err(AppError::InvalidNumber(format!("{} = {}", what, v)));
    }
    Ok(v)
}

/// Turn a request into a patch against the current record, recomputing
/// every derived field. Meters are written only when explicitly given.
pub fn build_patch(current: &DistributionRecord, req: &EditRequest) -> AppResult<RecordPatch> {
    let mut patch = RecordPatch::default();

    // 1️⃣ plain fields
    if let Some(d) = &req.date {
        let date = parse_date(d.trim()).ok_or_else(|| AppError::InvalidDate(d.clone()))?;
        patch.date = Some(date.format("%Y-%m-%d").to_string());
    }

    if let Some(t) = &req.time {
        let time = parse_time(t).ok_or_else(|| AppError::InvalidTime(t.clone()))?;
        patch.time = Some(time.format("%H:%M").to_string());
    }

    if let Some(e) = &req.equipment {
        let eq = normalize_equipment(e);
        if eq.is_empty() {
            return Err(AppError::EmptySelection("equipment".into()));
        }
        patch.equipment = Some(eq);
    }

    if let Some(o) = &req.operator {
        let op = o.trim();
        if op.is_empty() {
            return Err(AppError::EmptySelection("operator".into()));
        }
        patch.operator = Some(op.to_string());
    }

    // 2️⃣ volume and price → gallons and cost
    let gallons = match req.liters {
        Some(l) => {
            let l = non_negative("liters", l)?;
            let g = liters_to_gallons(l);
            patch.liters = Some(l);
            patch.gallons = Some(g);
            g
        }
        None => current.gallons,
    };

    let price = match req.price {
        Some(p) => {
            let p = non_negative("price", p)?;
            patch.diesel_price = Some(Some(p));
            Some(p)
        }
        None => current.diesel_price,
    };

    if req.liters.is_some() || req.price.is_some() {
        patch.estimated_cost = Some(price.map(|p| round2(gallons * p)));
    }

    // 3️⃣ tank meters (stored truth, never recomputed)
    if req.clear_meters {
        if req.meter_start.is_some() || req.meter_end.is_some() {
            return Err(AppError::Validation(
                "--clear-meters cannot be combined with meter values".into(),
            ));
        }
        patch.meter_start = Some(None);
        patch.meter_end = Some(None);
    } else {
        if let Some(v) = req.meter_start {
            patch.meter_start = Some(Some(round2(non_negative("meter start", v)?)));
        }
        if let Some(v) = req.meter_end {
            patch.meter_end = Some(Some(round2(non_negative("meter end", v)?)));
        }
    }

    // 4️⃣ kind and hour meter
    let kind = req.kind.unwrap_or(current.kind);
    if req.kind.is_some_and(|k| k != current.kind) {
        patch.kind = Some(kind);
    }

    let hours_given = req.hour_start.is_some() || req.hour_end.is_some();

    if kind.uses_hour_meter() {
        let changed = hours_given
            || patch.kind.is_some()
            || (req.liters.is_some() && current.hour_meter.is_some());
        if changed {
            let start = req
                .hour_start
                .or(current.hour_meter.map(|h| h.start))
                .unwrap_or(0.0);
            let end = req
                .hour_end
                .or(current.hour_meter.map(|h| h.end))
                .ok_or_else(|| {
                    AppError::Validation("hour meter end is required for WITH_HOUR_METER".into())
                })?;

            let hm = HourMeter::new(start, end, gallons)?;
            patch.hour_meter_start = Some(Some(hm.start));
            patch.hour_meter_end = Some(Some(hm.end));
            patch.hours_worked = Some(Some(hm.hours_worked));
            patch.consumption_rate = Some(Some(hm.consumption_rate));
        }
    } else {
        if hours_given {
            return Err(AppError::Validation(
                "hour meter values need a WITH_HOUR_METER record (use --kind with)".into(),
            ));
        }
        if current.hour_meter.is_some() || patch.kind.is_some() {
            patch.clear_hour_meter();
        }
    }

    Ok(patch)
}

pub struct EditLogic;

impl EditLogic {
    /// Apply the request. `None` when the id does not exist.
    pub fn apply(
        pool: &mut DbPool,
        id: i64,
        req: &EditRequest,
    ) -> AppResult<Option<DistributionRecord>> {
        let Some(current) = pool.get_by_id(id)? else {
            return Ok(None);
        };

        let patch = build_patch(&current, req)?;
        if patch.is_empty() {
            return Err(AppError::Validation("nothing to change".into()));
        }

        if !pool.update(id, &patch)? {
            return Ok(None);
        }

        audit_or_warn(
            &pool.conn,
            "edit",
            &id.to_string(),
            &format!("Updated record {}", current.summary()),
        );

        pool.get_by_id(id)
    }
}
