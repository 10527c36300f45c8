use crate::core::counter::{CounterRow, DataQualityWarning, ReconciledView, reconcile};
use crate::db::store::RecordStore;
use crate::errors::AppResult;
use crate::models::{DistributionRecord, RecordFilter, SortOrder};

/// A stored record together with its meter values from the full chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledRecord {
    pub record: DistributionRecord,
    pub counter: CounterRow,
}

#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub rows: Vec<ReconciledRecord>,
    pub warnings: Vec<DataQualityWarning>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct ListLogic;

impl ListLogic {
    /// Filtered records, each carrying the meter values the whole store
    /// derives for it.
    pub fn load<S: RecordStore>(
        store: &S,
        filter: &RecordFilter,
        order: SortOrder,
    ) -> AppResult<Listing> {
        let view = ReconciledView::load(store)?;
        let records = store.scan(filter, order)?;
        let warnings = view.warnings_for(&records).into_iter().cloned().collect();

        let rows = records
            .into_iter()
            .map(|record| {
                let counter = match view.row(record.id) {
                    Some(row) => row.clone(),
                    // written after the view was built; chain it on its own
                    None => reconcile(std::slice::from_ref(&record))
                        .rows
                        .remove(0),
                };
                ReconciledRecord { record, counter }
            })
            .collect();

        Ok(Listing { rows, warnings })
    }
}
