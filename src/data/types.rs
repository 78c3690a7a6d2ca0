//! Core data types for trade-history ranking.
//!
//! A raw trade record is whatever the exchange export wrote into the
//! `Trade_History` column. These types give it a fixed shape so the
//! metrics code never has to reason about missing keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::history::HistoryStatus;

/// A single trade as it appears in the source, before normalization.
///
/// Every field is optional. Present values are kept as loosely-typed
/// JSON values because exports mix numbers, numeric strings and nulls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTradeRecord {
    #[serde(default)]
    pub time: Option<Value>,

    #[serde(default)]
    pub symbol: Option<Value>,

    #[serde(default)]
    pub side: Option<Value>,

    #[serde(default)]
    pub price: Option<Value>,

    /// Filled quantity. Normalized into `NormalizedTrade::quantity`.
    #[serde(default)]
    pub qty: Option<Value>,

    #[serde(default, rename = "realizedProfit")]
    pub realized_profit: Option<Value>,
}

impl RawTradeRecord {
    /// Normalize into a trade with every field populated.
    pub fn normalize(&self) -> NormalizedTrade {
        NormalizedTrade {
            time: text_field(self.time.as_ref()),
            symbol: text_field(self.symbol.as_ref()),
            side: text_field(self.side.as_ref()),
            price: numeric_field(self.price.as_ref()),
            quantity: numeric_field(self.qty.as_ref()),
            realized_profit: numeric_field(self.realized_profit.as_ref()),
        }
    }
}

/// The canonical per-trade unit used by the metrics engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTrade {
    /// Opaque execution time (usually epoch milliseconds).
    pub time: Option<String>,

    /// Instrument symbol (e.g., "BTCUSDT").
    pub symbol: Option<String>,

    /// Order side (e.g., "BUY").
    pub side: Option<String>,

    /// Fill price. 0.0 when missing or unparsable.
    pub price: f64,

    /// Filled quantity. 0.0 when missing or unparsable.
    pub quantity: f64,

    /// Realized profit of the fill. 0.0 when missing or unparsable.
    pub realized_profit: f64,
}

impl NormalizedTrade {
    /// Trades with a positive quantity count towards ROI and Sharpe.
    pub fn has_position(&self) -> bool {
        self.quantity > 0.0
    }

    pub fn is_winner(&self) -> bool {
        self.realized_profit > 0.0
    }

    /// Realized profit per unit of quantity.
    pub fn return_per_unit(&self) -> Option<f64> {
        if self.has_position() {
            Some(self.realized_profit / self.quantity)
        } else {
            None
        }
    }
}

/// One row of the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    /// Account identifier from the `Port_IDs` column.
    pub port_id: String,

    /// Row position in the source table, used to carry the original
    /// columns through to the output.
    pub row_index: usize,

    /// Trades in source order.
    pub trades: Vec<NormalizedTrade>,

    /// How the trade history decoded.
    pub history_status: HistoryStatus,
}

impl AccountRecord {
    pub fn new(
        port_id: impl Into<String>,
        row_index: usize,
        trades: Vec<NormalizedTrade>,
        history_status: HistoryStatus,
    ) -> Self {
        Self {
            port_id: port_id.into(),
            row_index,
            trades,
            history_status,
        }
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

/// Render an identifier-like value as text. Null and missing become `None`.
fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Convert a value the way a float conversion would, falling back to 0.0
/// for anything missing, non-numeric or non-finite.
fn numeric_field(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::String(s)) => s.trim().replace('_', "").parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawTradeRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_full_record() {
        let trade = raw(json!({
            "time": 1718899656695_i64,
            "symbol": "SOLUSDT",
            "side": "BUY",
            "price": 132.537,
            "qty": 11.0,
            "realizedProfit": -2.5,
        }))
        .normalize();

        assert_eq!(trade.time.as_deref(), Some("1718899656695"));
        assert_eq!(trade.symbol.as_deref(), Some("SOLUSDT"));
        assert_eq!(trade.side.as_deref(), Some("BUY"));
        assert_eq!(trade.price, 132.537);
        assert_eq!(trade.quantity, 11.0);
        assert_eq!(trade.realized_profit, -2.5);
    }

    #[test]
    fn test_missing_fields_default() {
        let trade = raw(json!({})).normalize();
        assert_eq!(trade, NormalizedTrade::default());
    }

    #[test]
    fn test_null_values_default() {
        let trade = raw(json!({"symbol": null, "qty": null, "realizedProfit": null})).normalize();
        assert_eq!(trade.symbol, None);
        assert_eq!(trade.quantity, 0.0);
        assert_eq!(trade.realized_profit, 0.0);
    }

    #[test]
    fn test_numeric_strings_and_bools() {
        let trade = raw(json!({"price": " 12.5 ", "qty": true, "realizedProfit": "1_000"})).normalize();
        assert_eq!(trade.price, 12.5);
        assert_eq!(trade.quantity, 1.0);
        assert_eq!(trade.realized_profit, 1000.0);
    }

    #[test]
    fn test_unparsable_numbers_default_to_zero() {
        let trade = raw(json!({"price": "abc", "qty": [1], "realizedProfit": "nan"})).normalize();
        assert_eq!(trade.price, 0.0);
        assert_eq!(trade.quantity, 0.0);
        assert_eq!(trade.realized_profit, 0.0);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let trade = raw(json!({"fee": -0.9, "feeAsset": "USDT", "qty": 2})).normalize();
        assert_eq!(trade.quantity, 2.0);
    }

    #[test]
    fn test_return_per_unit() {
        let trade = NormalizedTrade {
            quantity: 2.0,
            realized_profit: 10.0,
            ..Default::default()
        };
        assert_eq!(trade.return_per_unit(), Some(5.0));

        let flat = NormalizedTrade {
            quantity: 0.0,
            realized_profit: 10.0,
            ..Default::default()
        };
        assert_eq!(flat.return_per_unit(), None);
    }
}
