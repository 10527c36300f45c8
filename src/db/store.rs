//! The record store contract consumed by the core.
//!
//! Each call commits on its own; nothing here spans several records
//! atomically, and a single writer is assumed.

use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::AppResult;
use crate::models::{DistributionRecord, RecordFilter, RecordPatch, SortOrder};

pub trait RecordStore {
    /// Persist a new record and return the id assigned by the store.
    fn insert(&mut self, record: &DistributionRecord) -> AppResult<i64>;

    /// Apply a partial update; `false` when the id does not exist.
    fn update(&mut self, id: i64, patch: &RecordPatch) -> AppResult<bool>;

    /// Permanently delete; `false` when the id does not exist.
    fn delete(&mut self, id: i64) -> AppResult<bool>;

    fn get_by_id(&self, id: i64) -> AppResult<Option<DistributionRecord>>;

    /// Filtered scan, ordered by `(date, time, id)`.
    fn scan(&self, filter: &RecordFilter, order: SortOrder) -> AppResult<Vec<DistributionRecord>>;

    /// Every record in event order.
    fn scan_all(&self) -> AppResult<Vec<DistributionRecord>> {
        self.scan(&RecordFilter::all(), SortOrder::Ascending)
    }
}

impl RecordStore for DbPool {
    fn insert(&mut self, record: &DistributionRecord) -> AppResult<i64> {
        queries::insert_record(&self.conn, record)
    }

    fn update(&mut self, id: i64, patch: &RecordPatch) -> AppResult<bool> {
        queries::update_record(&self.conn, id, patch)
    }

    fn delete(&mut self, id: i64) -> AppResult<bool> {
        queries::delete_record(&self.conn, id)
    }

    fn get_by_id(&self, id: i64) -> AppResult<Option<DistributionRecord>> {
        queries::get_record_by_id(&self.conn, id)
    }

    fn scan(&self, filter: &RecordFilter, order: SortOrder) -> AppResult<Vec<DistributionRecord>> {
        queries::scan_records(&self.conn, filter, order)
    }
}
