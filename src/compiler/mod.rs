//! Game-tree to decision-process compiler.
//!
//! Walks the rules engine's betting and dealing tree in lockstep with the
//! signal tree. One traversal skeleton ([`traverse::Walker`]) drives three
//! visitors:
//!
//! - [`tfsdp::TreeBuilder`]: per-seat TFSDPs plus terminal utilities
//! - [`size::NodeCounter`]: node count of the signal-collapsed tree
//! - [`transitions::TransitionRecorder`]: chip-swing distribution under a strategy
//!
//! [`size::count_nodes_without_signals`] counts the uncollapsed tree.
//!
//! Every starting stack is an independent traversal root, so the `*_all`
//! methods fan stacks out with rayon.

pub mod equity;
pub mod sequence;
pub mod size;
pub mod tfsdp;
pub mod transitions;
pub mod traverse;

pub use equity::TerminalEvaluator;
pub use sequence::{infoset_id, ParentEdge, Sequence};
pub use size::{count_nodes_without_signals, NodeCounter};
pub use tfsdp::{CompiledGame, NodeKind, TfsdpNode, TfsdpRecord, TreeBuilder, UtilityRecord};
pub use transitions::{ChipSwing, Strategy, TransitionRecorder};
pub use traverse::{Visitor, Walker};

use crate::abstraction::SignalTree;
use crate::engine::{EngineConfig, EngineError, RoyalRhodeIsland, RulesEngine, Seat};
use log::{debug, info};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

/// Errors raised while compiling or replaying a game tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The rules engine rejected an operation or its configuration.
    Engine(EngineError),
    /// A strategy has no weight for a sequence the walk reached.
    MissingSequence {
        /// Seat owning the sequence.
        seat: Seat,
        /// The sequence.
        sequence: String,
    },
    /// A hand ended by a fold without a payoff.
    MissingPayoff,
    /// A live state with nothing to deal and nobody to act.
    Stalled,
    /// File system error.
    Io(String),
    /// Malformed JSON.
    Parse(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Engine(e) => write!(f, "Engine error: {}", e),
            CompileError::MissingSequence { seat, sequence } => {
                write!(f, "No strategy weight for {} sequence {}", seat, sequence)
            }
            CompileError::MissingPayoff => write!(f, "Folded hand has no payoff"),
            CompileError::Stalled => write!(f, "State has no pending dealing and no actor"),
            CompileError::Io(msg) => write!(f, "IO error: {}", msg),
            CompileError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for CompileError {
    fn from(e: EngineError) -> Self {
        CompileError::Engine(e)
    }
}

/// Compiles starting stacks of the bundled Royal Rhode Island engine.
///
/// The `*_with` methods accept any [`RulesEngine`] positioned at the start of
/// a hand.
#[derive(Debug, Clone)]
pub struct Compiler<'t> {
    tree: &'t SignalTree,
    engine: EngineConfig,
    progress: bool,
}

impl<'t> Compiler<'t> {
    /// Create a compiler over `tree`.
    pub fn new(tree: &'t SignalTree, engine: EngineConfig) -> Self {
        Self {
            tree,
            engine,
            progress: false,
        }
    }

    /// Show a progress bar across the first dealing.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// The signal tree.
    pub fn tree(&self) -> &'t SignalTree {
        self.tree
    }

    fn engine(&self, starting_stack: u64) -> Result<RoyalRhodeIsland, CompileError> {
        Ok(RoyalRhodeIsland::new(&self.engine, starting_stack)?)
    }

    /// Compile one starting stack.
    pub fn compile(&self, starting_stack: u64) -> Result<CompiledGame, CompileError> {
        let mut engine = self.engine(starting_stack)?;
        self.compile_with(&mut engine, starting_stack)
    }

    /// Compile from an arbitrary engine.
    pub fn compile_with<E: RulesEngine>(&self, engine: &mut E, starting_stack: u64) -> Result<CompiledGame, CompileError> {
        let start = Instant::now();
        let mut builder = TreeBuilder::new(self.tree, starting_stack);
        let nodes = Walker::new(self.tree)
            .with_progress(self.progress)
            .walk(engine, &mut builder)?;
        let game = builder.finish();
        info!(
            "Stack {}: {} nodes, {}/{} TFSDP records, {} utilities in {:.2?}",
            starting_stack,
            nodes,
            game.tfsdps[0].len(),
            game.tfsdps[1].len(),
            game.utilities.len(),
            start.elapsed()
        );
        Ok(game)
    }

    /// Compile several starting stacks in parallel, in input order.
    pub fn compile_all(&self, stacks: &[u64]) -> Result<Vec<(u64, CompiledGame)>, CompileError> {
        stacks
            .par_iter()
            .map(|&stack| self.compile(stack).map(|game| (stack, game)))
            .collect()
    }

    /// Node count of the signal-collapsed tree.
    pub fn tree_size(&self, starting_stack: u64) -> Result<u64, CompileError> {
        let mut engine = self.engine(starting_stack)?;
        let mut counter = NodeCounter::new();
        let nodes = Walker::new(self.tree).walk(&mut engine, &mut counter)?;
        debug!("Stack {}: {} nodes, {} terminal", starting_stack, nodes, counter.leaves());
        Ok(nodes)
    }

    /// Node count of the tree over raw card orderings.
    pub fn tree_size_without_signals(&self, starting_stack: u64) -> Result<u128, CompileError> {
        let mut engine = self.engine(starting_stack)?;
        count_nodes_without_signals(&mut engine, self.tree.deck_size() as u64)
    }

    /// Row seat's chip-swing distribution when both seats follow `strategy`.
    pub fn transitions(&self, starting_stack: u64, strategy: &Strategy) -> Result<ChipSwing, CompileError> {
        let mut engine = self.engine(starting_stack)?;
        self.transitions_with(&mut engine, strategy)
    }

    /// Chip-swing distribution from an arbitrary engine.
    pub fn transitions_with<E: RulesEngine>(&self, engine: &mut E, strategy: &Strategy) -> Result<ChipSwing, CompileError> {
        let mut recorder = TransitionRecorder::new(self.tree, strategy);
        Walker::new(self.tree).walk(engine, &mut recorder)?;
        Ok(recorder.finish())
    }

    /// Chip-swing distributions for several stacks in parallel.
    pub fn transitions_all(&self, strategies: &BTreeMap<u64, Strategy>) -> Result<BTreeMap<u64, ChipSwing>, CompileError> {
        strategies
            .par_iter()
            .map(|(&stack, strategy)| self.transitions(stack, strategy).map(|swing| (stack, swing)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstraction::SignalId;
    use crate::cards::Deck;
    use crate::engine::Action;
    use rustc_hash::{FxHashMap, FxHashSet};
    use std::sync::OnceLock;

    fn tree() -> &'static SignalTree {
        static TREE: OnceLock<SignalTree> = OnceLock::new();
        TREE.get_or_init(|| SignalTree::build(&Deck::royal()))
    }

    fn compiler() -> Compiler<'static> {
        Compiler::new(tree(), EngineConfig::default())
    }

    fn street_count(infoset: &str) -> usize {
        infoset.split(';').next().map(|h| h.split(':').count()).unwrap_or(0)
    }

    /// Action letters of the street the infoset was reached on.
    fn current_street(infoset: &str) -> &str {
        infoset.split(';').next().and_then(|h| h.rsplit(':').next()).unwrap_or("")
    }

    /// Records each terminal's signal and unweighted value.
    struct TerminalLog {
        evaluator: TerminalEvaluator,
        terminals: FxHashMap<[Sequence; 2], (SignalId, f64)>,
    }

    impl Visitor for TerminalLog {
        fn leaf<E: RulesEngine>(
            &mut self,
            engine: &E,
            signal: SignalId,
            sequences: &[Sequence; 2],
        ) -> Result<(), CompileError> {
            let value = match engine.payoff(Seat::Row) {
                Some(payoff) => payoff as f64,
                None => self.evaluator.evaluate(engine.total_pushed_amount(), tree().equity(signal)),
            };
            self.terminals.insert(sequences.clone(), (signal, value));
            Ok(())
        }
    }

    #[test]
    fn test_one_chip_stack_is_a_single_terminal() {
        let game = compiler().compile(1).unwrap();
        assert_eq!(game.utilities.len(), 1);
        assert_eq!(game.utilities[0].sequences, [Sequence::Empty, Sequence::Empty]);
        assert_eq!(game.utilities[0].value, 0.0);
        for seat in Seat::ALL {
            assert_eq!(game.tfsdp(seat).len(), 1);
            assert_eq!(game.tfsdp(seat)[0].node.kind, NodeKind::EndOfTheDecisionProcess);
        }
    }

    #[test]
    fn test_two_chip_stack_decision_structure() {
        let game = compiler().compile(2).unwrap();
        for seat in Seat::ALL {
            let streets: FxHashSet<usize> = game
                .decision_points(seat)
                .map(|r| street_count(&r.node.id))
                .collect();
            assert_eq!(streets, [1, 2, 3].into_iter().collect(), "{} seat", seat);
        }

        // the column seat decides exactly once per street: facing a check or the all-in bet
        for record in game.decision_points(Seat::Column) {
            let street = current_street(&record.node.id);
            assert!(street == "c" || street == "r", "column decides at {}", record.node.id);
        }

        // the row seat opens every street and decides again only when a check met the all-in bet
        let mut reopened = 0;
        for record in game.decision_points(Seat::Row) {
            match current_street(&record.node.id) {
                "" => {}
                "cr" => reopened += 1,
                _ => panic!("row decides at {}", record.node.id),
            }
        }
        assert!(reopened > 0);
        assert!(reopened < game.decision_points(Seat::Row).count());

        // first decision of the row seat is one per preflop signal
        let first = &game.tfsdp(Seat::Row)[0];
        assert_eq!(first.parent_edge, ParentEdge::Sequence(Sequence::Empty));
        assert_eq!(first.node.kind, NodeKind::ObservationPoint);
        assert_eq!(first.node.id, "o0");
    }

    #[test]
    fn test_utility_keys_are_unique_and_chance_weighted() {
        let game = compiler().compile(2).unwrap();
        let keys: FxHashSet<&[Sequence; 2]> = game.utilities.iter().map(|u| &u.sequences).collect();
        assert_eq!(keys.len(), game.utilities.len());

        let mut engine = RoyalRhodeIsland::new(&EngineConfig::default(), 2).unwrap();
        let mut log = TerminalLog {
            evaluator: TerminalEvaluator::new(2),
            terminals: FxHashMap::default(),
        };
        Walker::new(tree()).walk(&mut engine, &mut log).unwrap();
        assert_eq!(log.terminals.len(), game.utilities.len());

        let mut weighted_by_equity = 0;
        for utility in &game.utilities {
            let (signal, value) = log.terminals[&utility.sequences];
            // no terminal moves more than the two chips behind
            assert!(value.abs() <= 2.0);
            assert_eq!(utility.value, tree().chance_probability(signal) * value);
            if value.fract() != 0.0 {
                weighted_by_equity += 1;
            }
        }
        assert!(weighted_by_equity > 0);
    }

    #[test]
    fn test_uniform_strategy_reaches_terminals_with_total_mass_one() {
        let compiler = compiler();
        let game = compiler.compile(2).unwrap();
        let strategy = Strategy::uniform(&game);
        let swing = compiler.transitions(2, &strategy).unwrap();
        let total: f64 = swing.values().sum();
        assert!((total - 1.0).abs() < 1e-9, "total mass {}", total);
        assert!(swing.keys().all(|&delta| (-2..=2).contains(&delta)));
        // the row seat never moves more than it started with
        assert!(!swing.contains_key(&3));
    }

    #[test]
    fn test_missing_sequence_fails_fast() {
        let err = compiler().transitions(2, &Strategy::new()).unwrap_err();
        assert!(matches!(err, CompileError::MissingSequence { .. }));
    }

    #[test]
    fn test_json_round_trip_matches_compiled_game() {
        let game = compiler().compile(2).unwrap();
        let json = serde_json::to_string(&game).unwrap();
        let back: CompiledGame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tfsdps, game.tfsdps);
        assert_eq!(back.utilities.len(), game.utilities.len());

        let path = std::env::temp_dir().join(format!("royal_icm_stack_2_{}.json", std::process::id()));
        game.save_json(&path).unwrap();
        let loaded = CompiledGame::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.tfsdps, game.tfsdps);
        assert_eq!(loaded.utilities.len(), game.utilities.len());

        assert!(matches!(
            CompiledGame::from_json_file(std::env::temp_dir().join("royal_icm_missing.json")),
            Err(CompileError::Io(_))
        ));
    }

    #[test]
    fn test_sizes() {
        let compiler = compiler();
        let small = compiler.tree_size(2).unwrap();
        let large = compiler.tree_size(6).unwrap();
        assert!(large > small);
        let raw = compiler.tree_size_without_signals(2).unwrap();
        assert!(raw > small as u128);
    }

    #[test]
    fn test_compile_all_keeps_order() {
        let games = compiler().compile_all(&[3, 1, 2]).unwrap();
        let stacks: Vec<u64> = games.iter().map(|(s, _)| *s).collect();
        assert_eq!(stacks, vec![3, 1, 2]);
    }

    #[test]
    fn test_decision_actions_follow_fold_call_raise_order() {
        let game = compiler().compile(3).unwrap();
        let mut last: FxHashMap<String, Action> = FxHashMap::default();
        for record in game.tfsdp(Seat::Row) {
            if let ParentEdge::Sequence(sequence) = &record.parent_edge {
                if let (Some(infoset), Some(action)) = (sequence.infoset(), sequence.action()) {
                    if let Some(previous) = last.insert(infoset.to_string(), action) {
                        assert!(previous < action);
                    }
                }
            }
        }
    }
}
