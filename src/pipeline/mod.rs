//! Batch ranking pipeline: load, measure, rank, truncate, write.

pub mod runner;

pub use runner::{PipelineConfig, PipelineError, PipelineReport, RankingPipeline};
