//! Unified application error type.
//! All modules (db, core, cli, export, utils) return AppError to keep the
//! error handling consistent. The counter reconciler never produces one:
//! bad stored meters are reported as `DataQualityWarning` values instead.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Validation errors
    // ---------------------------
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0} (expected HH:MM)")]
    InvalidTime(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Hours worked must be greater than 0 (hour meter {start} → {end})")]
    InvalidHours { start: f64, end: f64 },

    #[error("Invalid month: {0} (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("Empty selection: {0}")]
    EmptySelection(String),

    #[error("Invalid record: {0}")]
    Validation(String),

    // ---------------------------
    // Lookup errors
    // ---------------------------
    #[error("No record found with id {0}")]
    RecordNotFound(i64),

    // ---------------------------
    // Missing resources
    // ---------------------------
    #[error("Report template not found: {0}")]
    MissingTemplate(String),

    #[error("Report template has no sheet named '{0}'")]
    MissingSheet(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// True for the errors raised by input validation (the operation was not
    /// performed and can simply be retried with corrected input).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::InvalidDate(_)
                | AppError::InvalidTime(_)
                | AppError::InvalidNumber(_)
                | AppError::InvalidHours { .. }
                | AppError::InvalidMonth(_)
                | AppError::EmptySelection(_)
                | AppError::Validation(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
