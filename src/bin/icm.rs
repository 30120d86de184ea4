//! Tournament win probabilities from a transitions file.
//!
//! Usage: icm transitions.json 20 40 80 --output icm.json
//!
//! For each chip count `C` the output holds `2(C+1)` probabilities, indexed
//! by `2·stack + seat`.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use royal_icm::{IcmSolver, SolverConfig, Transitions};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "icm")]
#[command(about = "Solve the absorbing chip-count chain for tournament win probabilities")]
struct Args {
    /// Transitions file produced by `transitions`
    transitions: PathBuf,
    /// Total chips in play, one chain per value
    #[arg(required = true)]
    chips: Vec<u32>,
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = SolverConfig::load(args.config.as_deref()).context("loading configuration")?;
    let transitions = Transitions::from_json_file(&args.transitions)
        .with_context(|| format!("reading {}", args.transitions.display()))?;
    transitions.validate()?;

    if let Some(max) = transitions.max_stack() {
        if max < config.icm.tractable_bound {
            warn!(
                "Transitions stop at stack {} below the tractable bound {}",
                max, config.icm.tractable_bound
            );
        }
    }

    let solver = IcmSolver::new(&transitions, config.icm.clone());
    let solved = solver.solve_all(&args.chips)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &solved)?;
            info!("Saved {} chip counts to {}", solved.len(), path.display());
        }
        None => {
            let mut out = BufWriter::new(io::stdout().lock());
            serde_json::to_writer_pretty(&mut out, &solved)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
