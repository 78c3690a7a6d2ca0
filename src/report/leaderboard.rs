//! Top-N leaderboard output.
//!
//! The output table keeps every source column of the selected rows, in
//! rank order, and appends the computed columns. The console view lists
//! only the headline columns.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use thiserror::Error;

use crate::data::ACCOUNT_ID_COLUMN;
use crate::ranking::RankedAccount;

pub const ROI_COLUMN: &str = "ROI";
pub const PNL_COLUMN: &str = "PnL";
pub const WIN_RATE_COLUMN: &str = "Win_Rate";
pub const SHARPE_RATIO_COLUMN: &str = "Sharpe_Ratio";
pub const RANK_COLUMN: &str = "Rank";

/// Computed columns, in output order.
pub const COMPUTED_COLUMNS: &[&str] = &[
    ROI_COLUMN,
    PNL_COLUMN,
    WIN_RATE_COLUMN,
    SHARPE_RATIO_COLUMN,
    RANK_COLUMN,
];

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Row {row} is out of range for a table of {height} rows")]
    RowOutOfRange { row: usize, height: usize },
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Select the ranked rows from the source frame and append computed columns.
pub fn build_output_frame(source: &DataFrame, ranked: &[RankedAccount]) -> ReportResult<DataFrame> {
    let height = source.height();
    let mut rows: Vec<IdxSize> = Vec::with_capacity(ranked.len());
    for account in ranked {
        let row = account.account().row_index;
        if row >= height {
            return Err(ReportError::RowOutOfRange { row, height });
        }
        rows.push(row as IdxSize);
    }

    let indices = IdxCa::from_vec("rows".into(), rows);
    let mut out = source.take(&indices)?;

    let columns: [(&str, Vec<f64>); 5] = [
        (ROI_COLUMN, ranked.iter().map(|r| r.metrics().roi).collect()),
        (PNL_COLUMN, ranked.iter().map(|r| r.metrics().pnl).collect()),
        (WIN_RATE_COLUMN, ranked.iter().map(|r| r.metrics().win_rate).collect()),
        (
            SHARPE_RATIO_COLUMN,
            ranked.iter().map(|r| r.metrics().sharpe_ratio).collect(),
        ),
        (RANK_COLUMN, ranked.iter().map(|r| r.rank()).collect()),
    ];

    for (name, values) in columns {
        out.with_column(Series::new(name.into(), values))?;
    }

    Ok(out)
}

/// Write the leaderboard CSV, replacing any existing file.
pub fn write_leaderboard(
    path: &Path,
    source: &DataFrame,
    ranked: &[RankedAccount],
) -> ReportResult<DataFrame> {
    let mut out = build_output_frame(source, ranked)?;

    let io_err = |source| ReportError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    // File::create truncates, so a previous leaderboard is replaced.
    let mut file = File::create(path).map_err(io_err)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut out)?;

    Ok(out)
}

/// Render the console listing: account id, rank, ROI, PnL and win rate.
pub fn render_leaderboard(ranked: &[RankedAccount]) -> String {
    let rows: Vec<_> = ranked.iter().map(|r| r.row()).collect();

    let position_width = rows.len().saturating_sub(1).to_string().len();
    let id_width = rows
        .iter()
        .map(|r| r.port_id.chars().count())
        .chain(std::iter::once(ACCOUNT_ID_COLUMN.len()))
        .max()
        .unwrap_or_default();

    let mut out = format!(
        "{:>pw$}  {:<iw$}  {:>14}  {:>14}  {:>14}  {:>8}\n",
        "",
        ACCOUNT_ID_COLUMN,
        RANK_COLUMN,
        ROI_COLUMN,
        PNL_COLUMN,
        WIN_RATE_COLUMN,
        pw = position_width,
        iw = id_width,
    );

    for (position, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>pw$}  {:<iw$}  {:>14.6}  {:>14.6}  {:>14.6}  {:>8.4}\n",
            position,
            row.port_id,
            row.rank,
            row.roi,
            row.pnl,
            row.win_rate,
            pw = position_width,
            iw = id_width,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_trade_history, AccountRecord, TRADE_HISTORY_COLUMN};
    use crate::ranking::Ranker;

    fn source() -> DataFrame {
        DataFrame::new(vec![
            Series::new(ACCOUNT_ID_COLUMN.into(), vec!["a", "b", "c"]).into(),
            Series::new(
                TRADE_HISTORY_COLUMN.into(),
                vec![
                    "[{'qty': 1, 'realizedProfit': 1}]",
                    "[{'qty': 1, 'realizedProfit': 9}]",
                    "[]",
                ],
            )
            .into(),
            Series::new("Region".into(), vec!["eu", "us", "apac"]).into(),
        ])
        .unwrap()
    }

    fn ranked(df: &DataFrame) -> Vec<RankedAccount> {
        let ids = df.column(ACCOUNT_ID_COLUMN).unwrap().str().unwrap();
        let histories = df.column(TRADE_HISTORY_COLUMN).unwrap().str().unwrap();
        let accounts = ids
            .into_iter()
            .zip(histories.into_iter())
            .enumerate()
            .map(|(i, (id, h))| {
                let parsed = parse_trade_history(h);
                AccountRecord::new(id.unwrap(), i, parsed.trades, parsed.status)
            })
            .collect();
        Ranker::rank_accounts(accounts)
    }

    #[test]
    fn test_output_frame_columns_and_order() {
        let df = source();
        let ranked = ranked(&df);
        let out = build_output_frame(&df, Ranker::top_n(&ranked, 2)).unwrap();

        let names: Vec<String> = out
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Port_IDs",
                "Trade_History",
                "Region",
                "ROI",
                "PnL",
                "Win_Rate",
                "Sharpe_Ratio",
                "Rank"
            ]
        );
        assert_eq!(out.height(), 2);

        let ids: Vec<_> = out
            .column(ACCOUNT_ID_COLUMN)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);

        let regions: Vec<_> = out
            .column("Region")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        assert_eq!(regions, vec!["us", "eu"]);

        let rank = out.column(RANK_COLUMN).unwrap().f64().unwrap();
        assert_eq!(rank.get(0), Some((1.0 * 9.0 + 9.0 + 1.0) / 3.0));
    }

    #[test]
    fn test_row_out_of_range() {
        let df = source();
        let ranked = ranked(&df);
        let small = df.slice(0, 1);
        assert!(matches!(
            build_output_frame(&small, &ranked),
            Err(ReportError::RowOutOfRange { .. })
        ));
    }

    #[test]
    fn test_render_leaderboard() {
        let df = source();
        let ranked = ranked(&df);
        let text = render_leaderboard(&ranked);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Port_IDs"));
        assert!(lines[0].contains("Win_Rate"));
        assert!(!lines[0].contains("Sharpe_Ratio"));
        assert!(lines[1].trim_start().starts_with("0  b"));
        assert!(lines[3].contains("0.000000"));
    }
}
