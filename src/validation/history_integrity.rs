//! Trade-history integrity validation.
//!
//! Validates:
//! - Schema (required columns present)
//! - History decoding (no malformed or non-list histories)
//! - Trade entries (no non-mapping elements skipped)
//! - Account identifiers (present and unique)
//!
//! Decoding problems never stop a ranking run; this report is how they
//! surface.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::data::loader::{accounts_from_frame, check_required_columns};
use crate::data::{AccountLoader, AccountRecord, HistoryStatus, LoaderError, REQUIRED_COLUMNS};

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result of a single validation check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Counts of how each account's trade history decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryCounts {
    pub parsed: usize,
    pub missing: usize,
    pub malformed: usize,
    pub not_a_sequence: usize,
    pub skipped_entries: usize,
    pub total_trades: usize,
}

impl HistoryCounts {
    pub fn from_accounts(accounts: &[AccountRecord]) -> Self {
        let mut counts = Self::default();
        for account in accounts {
            counts.total_trades += account.trade_count();
            match account.history_status {
                HistoryStatus::Parsed { skipped } => {
                    counts.parsed += 1;
                    counts.skipped_entries += skipped;
                }
                HistoryStatus::Missing => counts.missing += 1,
                HistoryStatus::Malformed => counts.malformed += 1,
                HistoryStatus::NotASequence => counts.not_a_sequence += 1,
            }
        }
        counts
    }

    /// Accounts whose history was recovered as empty because it failed to decode.
    pub fn recovered(&self) -> usize {
        self.malformed + self.not_a_sequence
    }
}

/// Integrity report for one account table.
#[derive(Debug)]
pub struct HistoryIntegrityReport {
    pub source: String,
    pub row_count: usize,
    pub counts: HistoryCounts,
    pub checks: Vec<CheckResult>,
}

impl HistoryIntegrityReport {
    /// Build a report from already-parsed accounts.
    pub fn from_accounts(source: &str, accounts: &[AccountRecord]) -> Self {
        let counts = HistoryCounts::from_accounts(accounts);
        let checks = vec![
            CheckResult::pass(
                "schema",
                &format!("All {} required columns present", REQUIRED_COLUMNS.len()),
            ),
            check_decoding(accounts, &counts),
            check_entries(accounts, &counts),
            check_account_ids(accounts),
        ];

        Self {
            source: source.to_string(),
            row_count: accounts.len(),
            counts,
            checks,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        let total = self.checks.len();
        format!(
            "{} ({} accounts, {} trades): {}/{} checks passed",
            self.source, self.row_count, self.counts.total_trades, passed, total
        )
    }
}

/// Validator for an account table on disk.
pub struct HistoryIntegrityValidator {
    loader: AccountLoader,
}

impl HistoryIntegrityValidator {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            loader: AccountLoader::new(path),
        }
    }

    /// Run all validation checks.
    ///
    /// A missing required column is reported as a failed schema check
    /// rather than an error.
    pub fn validate(&self) -> ValidationResult<HistoryIntegrityReport> {
        let source = self.loader.path().display().to_string();
        let df = self.loader.load_dataframe()?;

        if let Err(LoaderError::MissingColumn(column)) = check_required_columns(&df) {
            return Ok(HistoryIntegrityReport {
                source,
                row_count: df.height(),
                counts: HistoryCounts::default(),
                checks: vec![CheckResult::fail(
                    "schema",
                    "Required column missing",
                    Some(format!("Missing: {}", column)),
                )],
            });
        }

        let accounts = accounts_from_frame(&df)?;
        Ok(HistoryIntegrityReport::from_accounts(&source, &accounts))
    }
}

fn check_decoding(accounts: &[AccountRecord], counts: &HistoryCounts) -> CheckResult {
    if counts.recovered() == 0 {
        return CheckResult::pass(
            "history_decoding",
            &format!(
                "{} histories decoded, {} empty",
                counts.parsed, counts.missing
            ),
        );
    }

    let rows: Vec<String> = accounts
        .iter()
        .filter(|a| {
            matches!(
                a.history_status,
                HistoryStatus::Malformed | HistoryStatus::NotASequence
            )
        })
        .take(10)
        .map(|a| format!("row {} ({})", a.row_index, a.port_id))
        .collect();

    CheckResult::fail(
        "history_decoding",
        &format!(
            "{} malformed, {} not a list; treated as no trades",
            counts.malformed, counts.not_a_sequence
        ),
        Some(format!("First affected: {}", rows.join(", "))),
    )
}

fn check_entries(accounts: &[AccountRecord], counts: &HistoryCounts) -> CheckResult {
    if counts.skipped_entries == 0 {
        return CheckResult::pass(
            "trade_entries",
            &format!("{} trade entries normalized", counts.total_trades),
        );
    }

    let affected = accounts
        .iter()
        .filter(|a| a.history_status.skipped() > 0)
        .count();

    CheckResult::fail(
        "trade_entries",
        &format!("{} non-mapping entries skipped", counts.skipped_entries),
        Some(format!("{} accounts affected", affected)),
    )
}

fn check_account_ids(accounts: &[AccountRecord]) -> CheckResult {
    let blank = accounts.iter().filter(|a| a.port_id.trim().is_empty()).count();

    let mut seen = HashSet::new();
    let mut duplicates: Vec<&str> = accounts
        .iter()
        .map(|a| a.port_id.as_str())
        .filter(|id| !id.trim().is_empty() && !seen.insert(*id))
        .collect();
    duplicates.sort_unstable();
    duplicates.dedup();

    if blank == 0 && duplicates.is_empty() {
        return CheckResult::pass("account_ids", "All account identifiers present and unique");
    }

    let mut details = String::new();
    if blank > 0 {
        details.push_str(&format!("Blank: {}", blank));
    }
    if !duplicates.is_empty() {
        if !details.is_empty() {
            details.push_str("; ");
        }
        details.push_str(&format!("Duplicated: {:?}", duplicates));
    }

    CheckResult::fail("account_ids", "Account identifier problems", Some(details))
}
