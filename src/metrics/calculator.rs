//! Per-account performance metrics calculator.
//!
//! Every metric is an independent pure function of the trade list, so
//! trade order never changes a result.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data::NormalizedTrade;

/// Minimum number of positioned trades for a Sharpe ratio.
pub const MIN_SHARPE_SAMPLES: usize = 2;

/// Performance metrics for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountMetrics {
    // Basic statistics
    pub total_trades: usize,
    pub winning_trades: usize,
    /// Trades with a positive quantity.
    pub positioned_trades: usize,

    // Scored metrics
    pub roi: f64,
    pub pnl: f64,
    pub win_rate: f64,

    /// Informational only, not part of the composite rank.
    pub sharpe_ratio: f64,
}

impl AccountMetrics {
    /// Generate a summary report.
    pub fn summary(&self) -> String {
        format!(
            "Account Metrics\n\
             ===============\n\
             \n\
             Trades: {} (W: {}, positioned: {})\n\
             Win Rate: {:.1}%\n\
             \n\
             ROI: {:.4}\n\
             PnL: {:.2}\n\
             Sharpe Ratio: {:.2}",
            self.total_trades,
            self.winning_trades,
            self.positioned_trades,
            self.win_rate * 100.0,
            self.roi,
            self.pnl,
            self.sharpe_ratio,
        )
    }
}

/// Metrics calculator.
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Calculate all metrics from a normalized trade list.
    pub fn calculate(trades: &[NormalizedTrade]) -> AccountMetrics {
        AccountMetrics {
            total_trades: trades.len(),
            winning_trades: trades.iter().filter(|t| t.is_winner()).count(),
            positioned_trades: trades.iter().filter(|t| t.has_position()).count(),
            roi: Self::roi(trades),
            pnl: Self::pnl(trades),
            win_rate: Self::win_rate(trades),
            sharpe_ratio: Self::sharpe_ratio(trades),
        }
    }

    /// Sum of profit per unit over trades with a positive quantity.
    pub fn roi(trades: &[NormalizedTrade]) -> f64 {
        trades
            .iter()
            .filter_map(|t| t.return_per_unit())
            .fold(0.0, |acc, r| acc + r)
    }

    /// Sum of realized profit over all trades.
    ///
    /// Folds from `0.0` so an empty list reports `0.0` rather than `-0.0`.
    pub fn pnl(trades: &[NormalizedTrade]) -> f64 {
        trades.iter().fold(0.0, |acc, t| acc + t.realized_profit)
    }

    /// Share of trades with positive realized profit.
    pub fn win_rate(trades: &[NormalizedTrade]) -> f64 {
        if trades.is_empty() {
            return 0.0;
        }
        let winners = trades.iter().filter(|t| t.is_winner()).count();
        winners as f64 / trades.len() as f64
    }

    /// Mean over population standard deviation of positioned-trade profits.
    ///
    /// Zero with fewer than two positioned trades or zero variance.
    pub fn sharpe_ratio(trades: &[NormalizedTrade]) -> f64 {
        let profits: Vec<f64> = trades
            .iter()
            .filter(|t| t.has_position())
            .map(|t| t.realized_profit)
            .collect();

        if profits.len() < MIN_SHARPE_SAMPLES {
            return 0.0;
        }

        // The running-sum variance leaves a residue for identical values
        // that are not exact in binary (0.1, 1.1), so test equality directly.
        if profits.iter().all(|p| *p == profits[0]) {
            return 0.0;
        }

        let mean = profits.iter().mean();
        let std_dev = profits.iter().population_std_dev();

        if std_dev == 0.0 || !std_dev.is_finite() {
            return 0.0;
        }

        mean / std_dev
    }
}
