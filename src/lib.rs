pub mod data;
pub mod metrics;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod validation;

// Re-export commonly used types
pub use data::{AccountLoader, AccountRecord, NormalizedTrade, RawTradeRecord, TradeHistory};
pub use metrics::{AccountMetrics, MetricsCalculator};
pub use pipeline::{PipelineConfig, PipelineError, PipelineReport, RankingPipeline};
pub use ranking::{MeasuredAccount, RankedAccount, Ranker};
pub use validation::{HistoryIntegrityReport, HistoryIntegrityValidator};
