//! Compile one starting stack into the equilibrium solver's JSON input.
//!
//! Usage: build_tree 6 --output stack_6.json

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use royal_icm::{Compiler, SignalTree, SolverConfig};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "build_tree")]
#[command(about = "Compile a starting stack into per-seat tree-form decision processes")]
struct Args {
    /// Starting stack of each player
    stack: u64,
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Show progress bars (overrides config)
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = SolverConfig::load(args.config.as_deref()).context("loading configuration")?;
    let progress = args.progress || config.progress;

    let tree = SignalTree::build_with_progress(&config.deck.deck(), progress);
    let compiler = Compiler::new(&tree, config.engine.clone()).with_progress(progress);
    let game = compiler
        .compile(args.stack)
        .with_context(|| format!("compiling stack {}", args.stack))?;

    match &args.output {
        Some(path) => {
            game.save_json(path)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Saved {}", path.display());
        }
        None => {
            let mut out = BufWriter::new(io::stdout().lock());
            serde_json::to_writer(&mut out, &game)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
