pub mod history;
pub mod literal;
pub mod loader;
pub mod types;

pub use history::{parse, parse_trade_history, HistoryError, HistoryStatus, TradeHistory};
pub use literal::LiteralError;
pub use loader::{
    AccountLoader, AccountTable, LoaderError, ACCOUNT_ID_COLUMN, REQUIRED_COLUMNS,
    TRADE_HISTORY_COLUMN,
};
pub use types::{AccountRecord, NormalizedTrade, RawTradeRecord};
