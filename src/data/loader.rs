//! Account table loader.
//!
//! Reads the account CSV into a polars `DataFrame` with every column kept
//! as text, so columns this crate does not understand pass through to the
//! output unchanged. Two columns are required:
//! - `Port_IDs`: account identifier
//! - `Trade_History`: literal-encoded list of trades (may be empty)

use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;

use super::history::parse_trade_history;
use super::types::AccountRecord;

pub const ACCOUNT_ID_COLUMN: &str = "Port_IDs";
pub const TRADE_HISTORY_COLUMN: &str = "Trade_History";

/// Columns that must be present in the input table.
pub const REQUIRED_COLUMNS: &[&str] = &[ACCOUNT_ID_COLUMN, TRADE_HISTORY_COLUMN];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The loaded table plus one parsed record per row.
#[derive(Debug, Clone)]
pub struct AccountTable {
    /// Source rows, all columns as text.
    pub frame: DataFrame,
    /// Parsed accounts, in row order.
    pub accounts: Vec<AccountRecord>,
}

impl AccountTable {
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// CSV loader for the account table.
pub struct AccountLoader {
    path: PathBuf,
}

impl AccountLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw table. Every column is read as a string column.
    pub fn load_dataframe(&self) -> Result<DataFrame, LoaderError> {
        if !self.path.exists() {
            return Err(LoaderError::FileNotFound(self.path.display().to_string()));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(self.path.clone()))?
            .finish()?;

        Ok(df)
    }

    /// Read the table and parse every account's trade history.
    pub fn load(&self) -> Result<AccountTable, LoaderError> {
        let frame = self.load_dataframe()?;
        let accounts = accounts_from_frame(&frame)?;
        Ok(AccountTable { frame, accounts })
    }
}

/// Check that every required column is present.
pub fn check_required_columns(df: &DataFrame) -> Result<(), LoaderError> {
    let names = df.get_column_names();
    for required in REQUIRED_COLUMNS {
        if !names.iter().any(|name| name.as_str() == *required) {
            return Err(LoaderError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

/// Build one `AccountRecord` per row of a text-typed frame.
pub fn accounts_from_frame(df: &DataFrame) -> Result<Vec<AccountRecord>, LoaderError> {
    check_required_columns(df)?;

    let ids = df.column(ACCOUNT_ID_COLUMN)?.str()?;
    let histories = df.column(TRADE_HISTORY_COLUMN)?.str()?;

    let accounts = ids
        .into_iter()
        .zip(histories.into_iter())
        .enumerate()
        .map(|(row_index, (id, history))| {
            let parsed = parse_trade_history(history);
            AccountRecord::new(
                id.unwrap_or_default(),
                row_index,
                parsed.trades,
                parsed.status,
            )
        })
        .collect();

    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoryStatus;

    fn frame(ids: &[Option<&str>], histories: &[Option<&str>]) -> DataFrame {
        DataFrame::new(vec![
            Series::new(ACCOUNT_ID_COLUMN.into(), ids.to_vec()).into(),
            Series::new(TRADE_HISTORY_COLUMN.into(), histories.to_vec()).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_loader_creation() {
        let loader = AccountLoader::new("Trade.csv");
        assert_eq!(loader.path(), Path::new("Trade.csv"));
    }

    #[test]
    fn test_missing_file() {
        let loader = AccountLoader::new("does/not/exist.csv");
        assert!(matches!(
            loader.load_dataframe(),
            Err(LoaderError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_required_columns() {
        assert_eq!(REQUIRED_COLUMNS.len(), 2);

        let df = DataFrame::new(vec![
            Series::new(ACCOUNT_ID_COLUMN.into(), vec!["a"]).into(),
        ])
        .unwrap();
        match check_required_columns(&df) {
            Err(LoaderError::MissingColumn(name)) => assert_eq!(name, TRADE_HISTORY_COLUMN),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn test_accounts_from_frame() {
        let df = frame(
            &[Some("acc-1"), Some("acc-2"), None],
            &[Some("[{'qty': 1, 'realizedProfit': 2}]"), None, Some("garbage")],
        );
        let accounts = accounts_from_frame(&df).unwrap();

        assert_eq!(accounts.len(), 3);
        assert_eq!(accounts[0].port_id, "acc-1");
        assert_eq!(accounts[0].trade_count(), 1);
        assert_eq!(accounts[1].history_status, HistoryStatus::Missing);
        assert_eq!(accounts[2].port_id, "");
        assert_eq!(accounts[2].row_index, 2);
        assert_eq!(accounts[2].history_status, HistoryStatus::Malformed);
    }
}
