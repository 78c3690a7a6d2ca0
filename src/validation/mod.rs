//! Input validation.
//!
//! Reports how trade histories decoded without failing the run:
//! - Required columns present
//! - Malformed or non-list histories
//! - Skipped non-mapping trade entries
//! - Blank or duplicated account identifiers

pub mod history_integrity;

pub use history_integrity::{
    CheckResult, HistoryCounts, HistoryIntegrityReport, HistoryIntegrityValidator,
    ValidationError, ValidationResult,
};
