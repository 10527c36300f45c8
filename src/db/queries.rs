use crate::db::schema::{Column, TABLE, select_list};
use crate::errors::AppResult;
use crate::models::{
    DistributionRecord, HourMeter, MeterQuality, RecordFilter, RecordKind, RecordPatch, SortOrder,
};
use crate::utils::units::{liters_to_gallons, round2};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, OptionalExtension, Result, Row, params_from_iter};

/// A numeric cell as found in storage. SQLite lets any column hold any
/// type, so a REAL column can come back as text or blob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Missing,
    Malformed,
    Number(f64),
}

impl Reading {
    pub fn from_sql(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Reading::Missing,
            ValueRef::Integer(i) => Reading::Number(i as f64),
            ValueRef::Real(f) if f.is_finite() => Reading::Number(f),
            ValueRef::Real(_) => Reading::Malformed,
            ValueRef::Text(t) => {
                let s = String::from_utf8_lossy(t);
                let s = s.trim();
                if s.is_empty() {
                    return Reading::Missing;
                }
                match s.parse::<f64>() {
                    Ok(f) if f.is_finite() => Reading::Number(f),
                    _ => Reading::Malformed,
                }
            }
            ValueRef::Blob(_) => Reading::Malformed,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Reading::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Reading::Malformed)
    }
}

fn reading(row: &Row, col: Column) -> Result<Reading> {
    Ok(Reading::from_sql(row.get_ref(col.name())?))
}

fn text(row: &Row, col: Column) -> Result<String> {
    let v: Option<String> = match row.get_ref(col.name())? {
        ValueRef::Null => None,
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).to_string()),
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Blob(_) => None,
    };
    Ok(v.unwrap_or_default().trim().to_string())
}

/// Mapping DB row → DistributionRecord (used by every query).
pub fn map_row(row: &Row) -> Result<DistributionRecord> {
    let liters = reading(row, Column::Liters)?.value().unwrap_or(0.0);
    let gallons = reading(row, Column::Gallons)?
        .value()
        .unwrap_or_else(|| liters_to_gallons(liters));

    let meter_start = reading(row, Column::MeterStart)?;
    let meter_end = reading(row, Column::MeterEnd)?;

    let hour_start = reading(row, Column::HourMeterStart)?.value();
    let hour_end = reading(row, Column::HourMeterEnd)?.value();
    let hours = reading(row, Column::HoursWorked)?.value();
    let consumption = reading(row, Column::ConsumptionRate)?.value();

    let kind = RecordKind::from_db_str(&text(row, Column::Kind)?).unwrap_or(
        if hour_start.is_some() && hour_end.is_some() {
            RecordKind::WithHourMeter
        } else {
            RecordKind::WithoutHourMeter
        },
    );

    let hour_meter = match (kind, hour_start, hour_end) {
        (RecordKind::WithHourMeter, Some(start), Some(end)) => {
            let hours_worked = hours.unwrap_or_else(|| round2(end - start));
            let consumption_rate = consumption.unwrap_or(if hours_worked > 0.0 {
                round2(gallons / hours_worked)
            } else {
                0.0
            });
            Some(HourMeter {
                start,
                end,
                hours_worked,
                consumption_rate,
            })
        }
        _ => None,
    };

    Ok(DistributionRecord {
        id: row.get(Column::Id.name())?,
        date: text(row, Column::Date)?,
        time: text(row, Column::Time)?,
        equipment: text(row, Column::Equipment)?,
        operator: text(row, Column::Operator)?,
        liters,
        gallons,
        meter_start: meter_start.value(),
        meter_end: meter_end.value(),
        hour_meter,
        diesel_price: reading(row, Column::DieselPrice)?.value(),
        estimated_cost: reading(row, Column::EstimatedCost)?.value(),
        kind,
        stored_hour_end: hour_end,
        meter_quality: MeterQuality {
            start_malformed: meter_start.is_malformed(),
            end_malformed: meter_end.is_malformed(),
        },
    })
}

fn opt(v: Option<f64>) -> Value {
    v.map(Value::Real).unwrap_or(Value::Null)
}

/// Column/value pairs for every field of a record except `id`.
fn record_values(rec: &DistributionRecord) -> Vec<(Column, Value)> {
    let hm = rec.hour_meter;
    vec![
        (Column::Date, Value::Text(rec.date.clone())),
        (Column::Time, Value::Text(rec.time.clone())),
        (Column::Equipment, Value::Text(rec.equipment.clone())),
        (Column::Gallons, Value::Real(rec.gallons)),
        (Column::Operator, Value::Text(rec.operator.clone())),
        (Column::Liters, Value::Real(rec.liters)),
        (Column::HourMeterStart, opt(hm.map(|h| h.start))),
        (Column::HourMeterEnd, opt(hm.map(|h| h.end))),
        (Column::HoursWorked, opt(hm.map(|h| h.hours_worked))),
        (Column::ConsumptionRate, opt(hm.map(|h| h.consumption_rate))),
        (Column::DieselPrice, opt(rec.diesel_price)),
        (Column::EstimatedCost, opt(rec.estimated_cost)),
        (Column::MeterStart, opt(rec.meter_start)),
        (Column::MeterEnd, opt(rec.meter_end)),
        (Column::Kind, Value::Text(rec.kind.to_db_str().to_string())),
    ]
}

/// Column/value pairs for the fields a patch actually sets.
pub fn patch_values(patch: &RecordPatch) -> Vec<(Column, Value)> {
    let mut out = Vec::new();

    let texts = [
        (Column::Date, &patch.date),
        (Column::Time, &patch.time),
        (Column::Equipment, &patch.equipment),
        (Column::Operator, &patch.operator),
    ];
    for (col, v) in texts {
        if let Some(s) = v {
            out.push((col, Value::Text(s.clone())));
        }
    }

    if let Some(v) = patch.liters {
        out.push((Column::Liters, Value::Real(v)));
    }
    if let Some(v) = patch.gallons {
        out.push((Column::Gallons, Value::Real(v)));
    }

    let nullable = [
        (Column::MeterStart, patch.meter_start),
        (Column::MeterEnd, patch.meter_end),
        (Column::HourMeterStart, patch.hour_meter_start),
        (Column::HourMeterEnd, patch.hour_meter_end),
        (Column::HoursWorked, patch.hours_worked),
        (Column::ConsumptionRate, patch.consumption_rate),
        (Column::DieselPrice, patch.diesel_price),
        (Column::EstimatedCost, patch.estimated_cost),
    ];
    for (col, v) in nullable {
        if let Some(inner) = v {
            out.push((col, opt(inner)));
        }
    }

    if let Some(kind) = patch.kind {
        out.push((Column::Kind, Value::Text(kind.to_db_str().to_string())));
    }

    out
}

pub fn insert_record(conn: &Connection, rec: &DistributionRecord) -> AppResult<i64> {
    let values = record_values(rec);

    let names = values
        .iter()
        .map(|(c, _)| c.name())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=values.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("INSERT INTO {TABLE} ({names}) VALUES ({placeholders})");
    conn.execute(&sql, params_from_iter(values.into_iter().map(|(_, v)| v)))?;

    Ok(conn.last_insert_rowid())
}

/// Apply a partial update. Returns `false` when no record has that id.
pub fn update_record(conn: &Connection, id: i64, patch: &RecordPatch) -> AppResult<bool> {
    let values = patch_values(patch);

    if values.is_empty() {
        return Ok(get_record_by_id(conn, id)?.is_some());
    }

    let sets = values
        .iter()
        .enumerate()
        .map(|(i, (c, _))| format!("{} = ?{}", c.name(), i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let id_pos = values.len() + 1;

    let sql = format!("UPDATE {TABLE} SET {sets} WHERE id = ?{id_pos}");

    let mut params: Vec<Value> = values.into_iter().map(|(_, v)| v).collect();
    params.push(Value::Integer(id));

    let changed = conn.execute(&sql, params_from_iter(params))?;
    Ok(changed > 0)
}

pub fn delete_record(conn: &Connection, id: i64) -> AppResult<bool> {
    let changed = conn.execute(&format!("DELETE FROM {TABLE} WHERE id = ?1"), [id])?;
    Ok(changed > 0)
}

pub fn get_record_by_id(conn: &Connection, id: i64) -> AppResult<Option<DistributionRecord>> {
    let sql = format!("SELECT {} FROM {TABLE} WHERE id = ?1", select_list());
    let rec = conn.query_row(&sql, [id], map_row).optional()?;
    Ok(rec)
}

/// Build the WHERE clause (possibly empty) and its parameters.
///
/// Equipment and operator are matched after mapping, see
/// [`RecordFilter::matches_names`]; SQLite `UPPER`/`LIKE` fold ASCII only.
pub fn filter_clause(filter: &RecordFilter) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(from) = filter.from.as_ref().filter(|s| !s.trim().is_empty()) {
        params.push(Value::Text(from.trim().to_string()));
        clauses.push(format!("{} >= ?{}", Column::Date.name(), params.len()));
    }
    if let Some(to) = filter.to.as_ref().filter(|s| !s.trim().is_empty()) {
        params.push(Value::Text(to.trim().to_string()));
        clauses.push(format!("{} <= ?{}", Column::Date.name(), params.len()));
    }
    if let Some(kind) = filter.kind.kind() {
        params.push(Value::Text(kind.to_db_str().to_string()));
        let legacy = params.len();
        params.push(Value::Text(kind.as_str().to_string()));
        clauses.push(format!(
            "UPPER({}) IN (?{}, ?{})",
            Column::Kind.name(),
            legacy,
            params.len()
        ));
    }
    if let Some(month) = filter.month.as_ref().filter(|s| !s.trim().is_empty()) {
        params.push(Value::Text(format!("{}-%", month.trim())));
        clauses.push(format!("{} LIKE ?{}", Column::Date.name(), params.len()));
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

pub fn scan_records(
    conn: &Connection,
    filter: &RecordFilter,
    order: SortOrder,
) -> AppResult<Vec<DistributionRecord>> {
    let (where_sql, params) = filter_clause(filter);

    let dir = match order {
        SortOrder::Ascending => "ASC",
        SortOrder::Descending => "DESC",
    };

    let sql = format!(
        "SELECT {} FROM {TABLE}{where_sql} ORDER BY fecha {dir}, hora {dir}, id {dir}",
        select_list()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        let rec = r?;
        if filter.matches_names(&rec.equipment, &rec.operator) {
            out.push(rec);
        }
    }
    Ok(out)
}
