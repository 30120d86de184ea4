//! Chip-swing distributions per effective stack.
//!
//! Replays every stack of a strategy book (or a uniform strategy over a range
//! of stacks) and writes the row seat's distribution of chips won or lost in
//! one hand. `--bootstrap` fills the stacks below the smallest enumerated one
//! with all-in showdown distributions.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rayon::prelude::*;
use royal_icm::abstraction::ShowdownOdds;
use royal_icm::{ChipSwing, Compiler, SignalTree, SolverConfig, Strategy, StrategyBook, Transitions};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "transitions")]
#[command(about = "Compute per-stack chip-swing distributions under solved strategies")]
struct Args {
    /// Strategy book produced by `strategies`
    #[arg(short, long, conflicts_with = "uniform", required_unless_present = "uniform")]
    book: Option<PathBuf>,
    /// Use a uniform strategy over the configured stacks instead of a book
    #[arg(long)]
    uniform: bool,
    /// Fill small stacks with showdown distributions
    #[arg(long)]
    bootstrap: bool,
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output transitions file
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = SolverConfig::load(args.config.as_deref()).context("loading configuration")?;
    let deck = config.deck.deck();
    let tree = SignalTree::build_with_progress(&deck, config.progress);
    let compiler = Compiler::new(&tree, config.engine.clone());

    let strategies: BTreeMap<u64, Strategy> = match &args.book {
        Some(path) => {
            let book = StrategyBook::from_json_file(path).with_context(|| format!("reading {}", path.display()))?;
            royal_icm::strategy::log_summary(&book);
            book.strategies()
                .iter()
                .map(|(&stack, strategy)| (stack as u64, strategy.clone()))
                .collect()
        }
        None => {
            // only the strategies outlive each compile
            let stacks: Vec<u64> = config.enumerated_stacks().map(u64::from).collect();
            stacks
                .par_iter()
                .map(|&stack| -> Result<(u64, Strategy)> { Ok((stack, Strategy::uniform(&compiler.compile(stack)?))) })
                .collect::<Result<_>>()?
        }
    };

    let swings = compiler.transitions_all(&strategies)?;
    let mut transitions = Transitions::from_map(
        swings
            .into_iter()
            .map(|(stack, swing)| -> Result<(u32, ChipSwing)> { Ok((u32::try_from(stack)?, swing)) })
            .collect::<Result<_>>()?,
    );

    if args.bootstrap {
        let odds = ShowdownOdds::enumerate(&deck);
        let added = transitions.bootstrap_below(&odds, config.min_enumerated_stack);
        info!(
            "Showdown odds {}/{}/{} (win/tie/loss); bootstrapped {} stacks",
            odds.wins, odds.ties, odds.losses, added
        );
    }

    transitions.validate()?;
    transitions
        .save_json(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("Saved {} stacks to {}", transitions.len(), args.output.display());
    Ok(())
}
