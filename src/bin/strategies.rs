//! Gather per-stack solver solutions into one strategy book.
//!
//! Usage: strategies "solutions/stack_{}.json" --output book.json
//!
//! `{}` in the pattern is replaced by each effective stack.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use royal_icm::strategy::{log_summary, SolverSolution};
use royal_icm::{SolverConfig, StrategyBook};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "strategies")]
#[command(about = "Merge solver solution files into a strategy book")]
struct Args {
    /// Solution path with `{}` standing for the effective stack
    pattern: String,
    /// Smallest stack (defaults to the configured smallest enumerated stack)
    #[arg(long)]
    min: Option<u32>,
    /// Largest stack (defaults to the configured tractable bound)
    #[arg(long)]
    max: Option<u32>,
    /// Skip stacks without a solution file instead of failing
    #[arg(long)]
    skip_missing: bool,
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output book file
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    anyhow::ensure!(args.pattern.contains("{}"), "pattern must contain {{}}");

    let config = SolverConfig::load(args.config.as_deref()).context("loading configuration")?;
    let min = args.min.unwrap_or(config.min_enumerated_stack);
    let max = args.max.unwrap_or(config.icm.tractable_bound);

    let mut book = StrategyBook::new();
    for stack in min..=max {
        let path = PathBuf::from(args.pattern.replace("{}", &stack.to_string()));
        if args.skip_missing && !path.exists() {
            warn!("No solution for stack {} at {}", stack, path.display());
            continue;
        }
        let solution = SolverSolution::from_json_file(&path).with_context(|| format!("reading {}", path.display()))?;
        book.insert_solution(stack, solution)?;
    }

    log_summary(&book);
    book.save_json(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(())
}
