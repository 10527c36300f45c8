// src/export/logic.rs

use crate::core::list::ListLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::RecordExport;
use crate::export::xlsx::export_xlsx;
use crate::models::{RecordFilter, SortOrder};
use crate::ui::messages::warning;
use std::path::Path;

/// High-level export of the reconciled listing.
pub struct ExportLogic;

impl ExportLogic {
    /// Export the records matching `filter`, oldest first.
    ///
    /// - `format`: csv | json | xlsx
    /// - `file`: absolute path of the output file
    ///
    /// Returns the number of exported records (0 → no file written).
    pub fn export(
        pool: &DbPool,
        format: ExportFormat,
        file: &str,
        filter: &RecordFilter,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "Output file path must be absolute: {file}"
            )));
        }

        let listing = ListLogic::load(pool, filter, SortOrder::Ascending)?;

        if listing.is_empty() {
            warning("No records found for the selected filters.");
            return Ok(0);
        }

        ensure_writable(path, force)?;

        let records: Vec<RecordExport> = listing.rows.iter().map(RecordExport::from).collect();

        match format {
            ExportFormat::Csv => export_csv(&records, path)?,
            ExportFormat::Json => export_json(&records, path)?,
            ExportFormat::Xlsx => export_xlsx(&records, path)?,
        }

        Ok(records.len())
    }
}
