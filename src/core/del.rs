use crate::db::log::audit_or_warn;
use crate::db::pool::DbPool;
use crate::db::store::RecordStore;
use crate::errors::AppResult;
use crate::models::DistributionRecord;

pub struct DeleteLogic;

impl DeleteLogic {
    /// Permanently remove one record. Returns the deleted record, or `None`
    /// when the id does not exist.
    pub fn apply(pool: &mut DbPool, id: i64) -> AppResult<Option<DistributionRecord>> {
        let Some(record) = pool.get_by_id(id)? else {
            return Ok(None);
        };

        if !pool.delete(id)? {
            return Ok(None);
        }

        audit_or_warn(
            &pool.conn,
            "del",
            &id.to_string(),
            &format!("Deleted record {}", record.summary()),
        );

        Ok(Some(record))
    }
}
