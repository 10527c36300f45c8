// src/export/mod.rs

mod fs_utils;
mod json_csv;
pub mod logic;
pub mod model;
pub mod report;
pub mod template;
mod xlsx;

pub use logic::ExportLogic;
pub use model::{Cell, RecordExport};
pub use report::{ReportLogic, ReportOutcome};

use crate::ui::messages::success;
use clap::ValueEnum;
use std::path::Path;

/// Shared completion message for exports.
pub(crate) fn notify_export_success(label: &str, path: &Path) {
    success(format!("{label} export completed: {}", path.display()));
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}
