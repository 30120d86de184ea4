//! Look up the strategy at one infoset.
//!
//! Usage: query book.json 12 "rc:;(AK)"

use anyhow::{Context, Result};
use clap::Parser;
use royal_icm::StrategyBook;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "query")]
#[command(about = "Print the action weights of an infoset at an effective stack")]
struct Args {
    /// Strategy book produced by `strategies`
    book: PathBuf,
    /// Effective stack
    stack: u32,
    /// Infoset identifier
    infoset: String,
    /// Normalize the weights into action probabilities
    #[arg(long)]
    behavioral: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let book = StrategyBook::from_json_file(&args.book).with_context(|| format!("reading {}", args.book.display()))?;
    let weights = if args.behavioral {
        book.behavioral(args.stack, &args.infoset)?
    } else {
        book.query(args.stack, &args.infoset)?
    };

    if weights.is_empty() {
        println!("no entries for {:?} at stack {}", args.infoset, args.stack);
    }
    for (action, weight) in weights {
        println!("{}  {:.6}", action, weight);
    }
    Ok(())
}
