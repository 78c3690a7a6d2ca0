//! Account ranking.
//!
//! Scores measured accounts by the mean of ROI, PnL and win rate and
//! produces a stable, descending total order.

pub mod ranker;

pub use ranker::{composite_rank, MeasuredAccount, RankedAccount, RankedRow, Ranker};
