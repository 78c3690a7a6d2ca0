//! Leaderboard output: the top-N CSV and the console listing.

pub mod leaderboard;

pub use leaderboard::{
    build_output_frame, render_leaderboard, write_leaderboard, ReportError, ReportResult,
    COMPUTED_COLUMNS, PNL_COLUMN, RANK_COLUMN, ROI_COLUMN, SHARPE_RATIO_COLUMN, WIN_RATE_COLUMN,
};
