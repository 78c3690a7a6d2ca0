//! Trade-history parsing.
//!
//! Turns the raw `Trade_History` text of one account into normalized
//! trades. Decoding has an explicit error type, but the parser recovers
//! from every decode error by treating the account as having no trades.
//! The recovered error is kept as a [`HistoryStatus`] so the integrity
//! report can tell "no trades" apart from "malformed input".

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::literal::{self, LiteralError};
use super::types::{NormalizedTrade, RawTradeRecord};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("trade history is missing")]
    Missing,

    #[error("trade history is malformed: {0}")]
    Syntax(#[from] LiteralError),

    #[error("trade history decoded to {0}, expected a list")]
    NotASequence(&'static str),
}

/// Outcome of parsing one account's trade history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStatus {
    /// Decoded into a list. `skipped` counts elements that were not mappings.
    Parsed { skipped: usize },
    /// Null, absent or blank.
    Missing,
    /// Failed to decode.
    Malformed,
    /// Decoded, but into something other than a list.
    NotASequence,
}

impl HistoryStatus {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Parsed { skipped: 0 } | Self::Missing)
    }

    pub fn skipped(&self) -> usize {
        match self {
            Self::Parsed { skipped } => *skipped,
            _ => 0,
        }
    }
}

impl From<&HistoryError> for HistoryStatus {
    fn from(err: &HistoryError) -> Self {
        match err {
            HistoryError::Missing => Self::Missing,
            HistoryError::Syntax(_) => Self::Malformed,
            HistoryError::NotASequence(_) => Self::NotASequence,
        }
    }
}

/// Parsed trades together with how they were obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeHistory {
    pub trades: Vec<NormalizedTrade>,
    pub status: HistoryStatus,
}

impl TradeHistory {
    fn empty(status: HistoryStatus) -> Self {
        Self {
            trades: Vec::new(),
            status,
        }
    }
}

/// Decode raw history text into its list of elements.
pub fn decode_history(raw: Option<&str>) -> Result<Vec<Value>, HistoryError> {
    let text = raw.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(HistoryError::Missing);
    }

    match literal::decode(text)? {
        Value::Array(items) => Ok(items),
        other => Err(HistoryError::NotASequence(kind_name(&other))),
    }
}

/// Normalize an already-decoded list of trade records.
///
/// Elements that are not mappings are skipped. Returns the trades in input
/// order and the number of skipped elements.
pub fn from_values(values: &[Value]) -> (Vec<NormalizedTrade>, usize) {
    let mut trades = Vec::with_capacity(values.len());
    let mut skipped = 0;

    for value in values {
        if !value.is_object() {
            skipped += 1;
            continue;
        }
        match serde_json::from_value::<RawTradeRecord>(value.clone()) {
            Ok(record) => trades.push(record.normalize()),
            Err(_) => skipped += 1,
        }
    }

    (trades, skipped)
}

/// Parse one account's history, recovering from decode errors.
pub fn parse_trade_history(raw: Option<&str>) -> TradeHistory {
    match decode_history(raw) {
        Ok(values) => {
            let (trades, skipped) = from_values(&values);
            if skipped > 0 {
                debug!("Skipped {} non-mapping trade entries", skipped);
            }
            TradeHistory {
                trades,
                status: HistoryStatus::Parsed { skipped },
            }
        }
        Err(err) => {
            if !matches!(err, HistoryError::Missing) {
                debug!("Treating trade history as empty: {}", err);
            }
            TradeHistory::empty(HistoryStatus::from(&err))
        }
    }
}

/// Parse raw history text into normalized trades. Never fails.
pub fn parse(raw: Option<&str>) -> Vec<NormalizedTrade> {
    parse_trade_history(raw).trades
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
