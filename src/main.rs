//! # Rank accounts with the default paths (Trade.csv -> top_20_accounts.csv)
//! trade-ranker
//!
//! # Rank with explicit paths and leaderboard size
//! trade-ranker rank --input data/Trade.csv --output results/top.csv --top 50
//!
//! # Check how trade histories decode without writing anything
//! trade-ranker validate --input data/Trade.csv

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use trade_ranker::report::render_leaderboard;
use trade_ranker::{HistoryIntegrityValidator, PipelineConfig, RankingPipeline};

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "trade-ranker")]
#[command(about = "Rank trading accounts by ROI, PnL and win rate")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute metrics, rank accounts and write the leaderboard
    Rank {
        /// Path to the account table
        #[arg(short, long, default_value = "Trade.csv")]
        input: PathBuf,

        /// Path of the leaderboard CSV (replaced if it exists)
        #[arg(short, long, default_value = "top_20_accounts.csv")]
        output: PathBuf,

        /// Number of accounts to keep
        #[arg(short, long, default_value_t = 20)]
        top: usize,
    },

    /// Report how trade histories decode
    Validate {
        /// Path to the account table
        #[arg(short, long, default_value = "Trade.csv")]
        input: PathBuf,
    },
}

fn cmd_rank(config: PipelineConfig) -> Result<()> {
    let pipeline = RankingPipeline::new(config);
    let report = pipeline.run().with_context(|| {
        format!(
            "Ranking {} failed",
            pipeline.config().input_path.display()
        )
    })?;

    if !report.integrity.all_passed() {
        for check in report.integrity.failed_checks() {
            println!("[{}] {}", check.name, check.message);
        }
        println!();
    }

    println!(
        "Top {} of {} accounts",
        report.top.len(),
        report.total_accounts
    );
    println!("{}", SEPARATOR);
    print!("{}", render_leaderboard(&report.top));

    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<bool> {
    let validator = HistoryIntegrityValidator::new(&input);
    let report = validator
        .validate()
        .with_context(|| format!("Validating {} failed", input.display()))?;

    println!("{}", report.summary());
    println!("{}", SEPARATOR);
    for check in &report.checks {
        let status = if check.passed { "PASS" } else { "FAIL" };
        println!("[{}] {}: {}", status, check.name, check.message);
        if let Some(details) = &check.details {
            println!("       {}", details);
        }
    }

    Ok(report.all_passed())
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trade_ranker=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => cmd_rank(PipelineConfig::default())?,
        Some(Commands::Rank { input, output, top }) => cmd_rank(PipelineConfig {
            input_path: input,
            output_path: output,
            top_n: top,
        })?,
        Some(Commands::Validate { input }) => {
            if !cmd_validate(input)? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
