//! Composite ranking of accounts.
//!
//! The composite rank is the arithmetic mean of ROI, PnL and win rate.
//! Sharpe ratio is carried along for the report but never scored.

use crate::data::AccountRecord;
use crate::metrics::{AccountMetrics, MetricsCalculator};

/// An account with its metrics computed, ready to be ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredAccount {
    account: AccountRecord,
    metrics: AccountMetrics,
}

impl MeasuredAccount {
    /// Compute metrics for an account.
    pub fn measure(account: AccountRecord) -> Self {
        let metrics = MetricsCalculator::calculate(&account.trades);
        Self { account, metrics }
    }

    pub fn account(&self) -> &AccountRecord {
        &self.account
    }

    pub fn metrics(&self) -> &AccountMetrics {
        &self.metrics
    }
}

/// A ranked account. Fields are read-only once ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedAccount {
    account: AccountRecord,
    metrics: AccountMetrics,
    rank: f64,
}

impl RankedAccount {
    pub fn account(&self) -> &AccountRecord {
        &self.account
    }

    pub fn port_id(&self) -> &str {
        &self.account.port_id
    }

    pub fn metrics(&self) -> &AccountMetrics {
        &self.metrics
    }

    /// Composite score.
    pub fn rank(&self) -> f64 {
        self.rank
    }

    pub fn row(&self) -> RankedRow<'_> {
        RankedRow {
            port_id: self.port_id(),
            rank: self.rank,
            roi: self.metrics.roi,
            pnl: self.metrics.pnl,
            win_rate: self.metrics.win_rate,
            sharpe_ratio: self.metrics.sharpe_ratio,
        }
    }
}

/// Flat view of a ranked account for display and export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedRow<'a> {
    pub port_id: &'a str,
    pub rank: f64,
    pub roi: f64,
    pub pnl: f64,
    pub win_rate: f64,
    pub sharpe_ratio: f64,
}

/// Composite score from ROI, PnL and win rate.
pub fn composite_rank(metrics: &AccountMetrics) -> f64 {
    (metrics.roi + metrics.pnl + metrics.win_rate) / 3.0
}

/// Account ranker.
pub struct Ranker;

impl Ranker {
    /// Score every account and order them by rank, highest first.
    ///
    /// The sort is stable: accounts with equal rank keep their input order.
    pub fn rank(accounts: Vec<MeasuredAccount>) -> Vec<RankedAccount> {
        let mut ranked: Vec<RankedAccount> = accounts
            .into_iter()
            .map(|measured| RankedAccount {
                rank: composite_rank(&measured.metrics),
                account: measured.account,
                metrics: measured.metrics,
            })
            .collect();

        ranked.sort_by(|a, b| b.rank.total_cmp(&a.rank));
        ranked
    }

    /// Measure and rank raw accounts in one pass.
    pub fn rank_accounts(accounts: Vec<AccountRecord>) -> Vec<RankedAccount> {
        Self::rank(accounts.into_iter().map(MeasuredAccount::measure).collect())
    }

    /// The first `n` accounts of a ranked list.
    pub fn top_n(ranked: &[RankedAccount], n: usize) -> &[RankedAccount] {
        &ranked[..n.min(ranked.len())]
    }
}
