//! # Royal ICM
//!
//! Tooling for heads-up Royal Rhode Island Hold'em tournaments: a suit-isomorphic
//! signal abstraction of the deal, a compiler from the betting tree to per-seat
//! tree-form sequential decision processes (TFSDPs), and an independent chip model
//! that turns solved per-hand strategies into tournament win probabilities.
//!
//! ## Pipeline
//!
//! 1. Enumerate every deal of the deck into a [`abstraction::SignalTree`].
//! 2. For each effective stack, walk the rules engine and the signal tree together
//!    and emit a [`compiler::CompiledGame`] for an external equilibrium solver.
//! 3. Gather the solver's average strategies into a [`strategy::StrategyBook`].
//! 4. Replay every stack under its strategy to get chip-swing distributions
//!    ([`icm::Transitions`]), bootstrapping stacks too small to enumerate.
//! 5. Solve the absorbing chain per chip count with [`icm::IcmSolver`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use royal_icm::abstraction::SignalTree;
//! use royal_icm::cards::Deck;
//! use royal_icm::compiler::Compiler;
//! use royal_icm::engine::EngineConfig;
//!
//! let tree = SignalTree::build(&Deck::royal());
//! let compiler = Compiler::new(&tree, EngineConfig::default());
//! let game = compiler.compile(6)?;
//! game.save_json("stack_6.json")?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐      ┌────────────────────────────────────────────┐
//! │    cards     │─────▶│ abstraction: SignalTree, ShowdownOdds      │
//! └──────────────┘      └────────────────────────────────────────────┘
//!                                          │ borrowed by
//!                                          ▼
//! ┌──────────────┐      ┌────────────────────────────────────────────┐
//! │    engine    │─────▶│ compiler: Walker + visitors                │
//! │ RulesEngine  │      │  TreeBuilder │ NodeCounter │ Recorder      │
//! └──────────────┘      └────────────────────────────────────────────┘
//!                            │ CompiledGame              ▲ Strategy
//!                            ▼                           │
//!                   external solver ──────────▶ strategy: StrategyBook
//!                                                        │ ChipSwing
//!                                                        ▼
//!                                     ┌────────────────────────────────┐
//!                                     │ icm: Transitions, IcmSolver    │
//!                                     └────────────────────────────────┘
//! ```

#![warn(missing_docs)]

/// Cards, decks and three-card hand evaluation.
pub mod cards;

/// Suit-isomorphic signal abstraction of the deal.
pub mod abstraction;

/// Rules-engine trait and the fixed-limit Royal Rhode Island engine.
pub mod engine;

/// Compiler from the betting tree to per-seat decision processes.
pub mod compiler;

/// Independent chip model over chip-swing distributions.
pub mod icm;

/// Solved strategies keyed by effective stack.
pub mod strategy;

/// Pipeline configuration.
pub mod config;

/// Progress bars.
pub mod progress;

// Re-export commonly used types at crate root for convenience
pub use abstraction::{ShowdownOdds, Signal, SignalPair, SignalTree};
pub use cards::{Deck, DeckKind};
pub use compiler::{ChipSwing, CompileError, CompiledGame, Compiler, Sequence, Strategy};
pub use config::{ConfigError, SolverConfig};
pub use engine::{Action, EngineConfig, RoyalRhodeIsland, RulesEngine, Seat};
pub use icm::{IcmConfig, IcmError, IcmSolver, Transitions};
pub use strategy::{StrategyBook, StrategyError};
