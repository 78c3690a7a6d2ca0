//! Performance metrics module.
//!
//! Per-account calculations over a normalized trade list:
//! - ROI (profit per unit of quantity)
//! - PnL (total realized profit)
//! - Win rate
//! - Sharpe ratio (population standard deviation)

pub mod calculator;

pub use calculator::{AccountMetrics, MetricsCalculator, MIN_SHARPE_SAMPLES};
