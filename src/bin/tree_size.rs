//! Node counts of the compiled game tree for a range of starting stacks.
//!
//! With `--no-signals` every card ordering is its own branch; otherwise deals
//! are collapsed to signals.

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use royal_icm::compiler::count_nodes_without_signals;
use royal_icm::{Compiler, RoyalRhodeIsland, SignalTree, SolverConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tree_size")]
#[command(about = "Count game-tree nodes per starting stack")]
struct Args {
    /// Smallest starting stack
    #[arg(long, default_value_t = 1)]
    min: u64,
    /// Largest starting stack
    #[arg(long, default_value_t = 10)]
    max: u64,
    /// Count raw card orderings instead of signals
    #[arg(long)]
    no_signals: bool,
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    anyhow::ensure!(args.min >= 1 && args.min <= args.max, "need 1 <= min <= max");

    let config = SolverConfig::load(args.config.as_deref()).context("loading configuration")?;
    let stacks: Vec<u64> = (args.min..=args.max).collect();

    let sizes: Vec<(u64, u128)> = if args.no_signals {
        let deck_size = config.deck.deck().len() as u64;
        stacks
            .par_iter()
            .map(|&stack| -> Result<(u64, u128)> {
                let mut engine = RoyalRhodeIsland::new(&config.engine, stack)?;
                Ok((stack, count_nodes_without_signals(&mut engine, deck_size)?))
            })
            .collect::<Result<_>>()?
    } else {
        let tree = SignalTree::build_with_progress(&config.deck.deck(), config.progress);
        let compiler = Compiler::new(&tree, config.engine.clone());
        stacks
            .par_iter()
            .map(|&stack| -> Result<(u64, u128)> { Ok((stack, compiler.tree_size(stack)? as u128)) })
            .collect::<Result<_>>()?
    };

    println!("{:>8}  {:>24}", "stack", "nodes");
    for (stack, nodes) in sizes {
        println!("{:>8}  {:>24}", stack, nodes);
    }
    Ok(())
}
