//! Ranking pipeline driver.
//!
//! Runs the batch in a single pass:
//! 1. Load the account table and parse every trade history
//! 2. Compute metrics per account
//! 3. Rank all accounts
//! 4. Keep the top N
//! 5. Write the leaderboard CSV

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{AccountLoader, LoaderError};
use crate::ranking::{MeasuredAccount, RankedAccount, Ranker};
use crate::report::{write_leaderboard, ReportError};
use crate::validation::HistoryIntegrityReport;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to load accounts: {0}")]
    Loader(#[from] LoaderError),

    #[error("Failed to write leaderboard: {0}")]
    Report(#[from] ReportError),
}

/// Configuration for a ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Account table to read.
    pub input_path: PathBuf,

    /// Leaderboard CSV to write. Replaced if it exists.
    pub output_path: PathBuf,

    /// Number of accounts kept in the leaderboard.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    20
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("Trade.csv"),
            output_path: PathBuf::from("top_20_accounts.csv"),
            top_n: default_top_n(),
        }
    }
}

/// Outcome of a ranking run.
#[derive(Debug)]
pub struct PipelineReport {
    /// Accounts in the input table.
    pub total_accounts: usize,

    /// The leaderboard, highest rank first.
    pub top: Vec<RankedAccount>,

    /// How the trade histories decoded.
    pub integrity: HistoryIntegrityReport,
}

/// Ranking pipeline.
pub struct RankingPipeline {
    config: PipelineConfig,
}

impl RankingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline and write the leaderboard.
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let loader = AccountLoader::new(&self.config.input_path);
        let table = loader.load()?;
        let total_accounts = table.len();
        info!(
            "Loaded {} accounts from {}",
            total_accounts,
            self.config.input_path.display()
        );

        let source = loader.path().display().to_string();
        let integrity = HistoryIntegrityReport::from_accounts(&source, &table.accounts);
        if integrity.counts.recovered() > 0 {
            warn!(
                "{} trade histories could not be decoded and were treated as empty",
                integrity.counts.recovered()
            );
        }
        if integrity.counts.skipped_entries > 0 {
            warn!(
                "Skipped {} trade entries that were not mappings",
                integrity.counts.skipped_entries
            );
        }

        let measured: Vec<MeasuredAccount> = table
            .accounts
            .into_iter()
            .map(MeasuredAccount::measure)
            .collect();
        debug!("Computed metrics for {} accounts", measured.len());

        let ranked = Ranker::rank(measured);
        let top = Ranker::top_n(&ranked, self.config.top_n).to_vec();

        write_leaderboard(&self.config.output_path, &table.frame, &top)?;
        info!(
            "Wrote top {} of {} accounts to {}",
            top.len(),
            total_accounts,
            self.config.output_path.display()
        );

        Ok(PipelineReport {
            total_accounts,
            top,
            integrity,
        })
    }
}
