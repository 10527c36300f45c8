use crate::core::counter::{last_hour_meter_end, last_meter_end};
use crate::core::workflow::{EntryContext, EntryPrompt, EntryWorkflow};
use crate::db::log::audit_or_warn;
use crate::db::pool::DbPool;
use crate::db::store::RecordStore;
use crate::errors::AppResult;
use crate::models::{DistributionRecord, RecordKind};
use chrono::{NaiveDate, NaiveTime};

/// Catalogs and clock used to drive one entry.
pub struct AddOptions<'a> {
    pub equipment: &'a [String],
    pub operators: &'a [String],
    pub today: NaiveDate,
    pub now: NaiveTime,
    pub default_price: f64,
    pub kind: Option<RecordKind>,
}

/// High-level business logic for the `add` command.
pub struct AddLogic;

impl AddLogic {
    /// Run the entry workflow and persist the result.
    /// Returns `None` when the user cancelled; nothing is written then.
    pub fn apply<P: EntryPrompt>(
        pool: &mut DbPool,
        opts: AddOptions<'_>,
        prompt: &mut P,
    ) -> AppResult<Option<DistributionRecord>> {
        // 1️⃣ the chain as it is now
        let records = pool.scan_all()?;

        // 2️⃣ collect and validate
        let ctx = EntryContext {
            records: &records,
            equipment: opts.equipment,
            operators: opts.operators,
            today: opts.today,
            now: opts.now,
            default_price: opts.default_price,
        };

        let Some(mut record) = EntryWorkflow::new(ctx, opts.kind).run(prompt)? else {
            return Ok(None);
        };

        // 3️⃣ persist
        record.id = Self::insert(pool, &record)?;
        Ok(Some(record))
    }

    /// Insert an already validated record and audit it.
    pub fn insert(pool: &mut DbPool, record: &DistributionRecord) -> AppResult<i64> {
        let id = pool.insert(record)?;

        audit_or_warn(
            &pool.conn,
            "add",
            &id.to_string(),
            &format!(
                "{} {} {} {:.2} L ({:.2} → {:.2})",
                record.date,
                record.time,
                record.equipment,
                record.liters,
                record.meter_start.unwrap_or(0.0),
                record.meter_end.unwrap_or(0.0)
            ),
        );

        Ok(id)
    }

    /// Defaults shown before an entry starts.
    pub fn defaults(pool: &DbPool, equipment: Option<&str>) -> AppResult<(f64, f64)> {
        let records = pool.scan_all()?;
        let hour = equipment
            .map(|e| last_hour_meter_end(&records, e))
            .unwrap_or(0.0);
        Ok((last_meter_end(&records), hour))
    }
}
