//! Chip-swing distributions under a fixed strategy.
//!
//! Walking the tree with both seats' realization weights gives, for every
//! terminal, the probability of reaching it. Folds move the fold payoff;
//! showdowns split their probability over winning, splitting and losing half
//! the pot.

use super::sequence::{ParentEdge, Sequence};
use super::tfsdp::{CompiledGame, NodeKind};
use super::traverse::Visitor;
use super::CompileError;
use crate::abstraction::{SignalId, SignalTree};
use crate::engine::{RulesEngine, Seat};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Distribution over the row seat's signed chip result for one hand.
pub type ChipSwing = BTreeMap<i64, f64>;

/// Sequence-form strategy: realization weight of every sequence of both seats.
///
/// Serialized as a list of `[sequence, weight]` pairs in sequence order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(Sequence, f64)>", into = "Vec<(Sequence, f64)>")]
pub struct Strategy {
    weights: FxHashMap<Sequence, f64>,
}

impl Strategy {
    /// Create an empty strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight of a sequence.
    pub fn insert(&mut self, sequence: Sequence, weight: f64) {
        self.weights.insert(sequence, weight);
    }

    /// Realization weight of `sequence`. The empty sequence always has weight 1.
    pub fn weight(&self, sequence: &Sequence) -> Option<f64> {
        match sequence {
            Sequence::Empty => Some(1.0),
            _ => self.weights.get(sequence).copied(),
        }
    }

    /// Number of weighted sequences.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Check if no sequence is weighted.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Iterate over weighted sequences.
    pub fn iter(&self) -> impl Iterator<Item = (&Sequence, &f64)> {
        self.weights.iter()
    }

    /// Both seats pick uniformly among their legal actions everywhere.
    pub fn uniform(game: &CompiledGame) -> Self {
        let mut strategy = Self::new();
        for seat in Seat::ALL {
            let records = game.tfsdp(seat);

            let mut actions: FxHashMap<&str, Vec<&Sequence>> = FxHashMap::default();
            let mut observed: FxHashMap<&str, &Sequence> = FxHashMap::default();
            for record in records {
                if let ParentEdge::Sequence(sequence) = &record.parent_edge {
                    if let Some(infoset) = sequence.infoset() {
                        actions.entry(infoset).or_default().push(sequence);
                    }
                    if record.node.kind == NodeKind::ObservationPoint {
                        observed.insert(record.node.id.as_str(), sequence);
                    }
                }
            }

            // parents are always emitted before their children
            for record in records.iter().filter(|r| r.node.kind == NodeKind::DecisionPoint) {
                let parent = match &record.parent_edge {
                    ParentEdge::Sequence(sequence) => Some(sequence),
                    ParentEdge::Observation { point, .. } => observed.get(point.as_str()).copied(),
                };
                let reach = parent.and_then(|p| strategy.weight(p)).unwrap_or(0.0);
                if let Some(sequences) = actions.get(record.node.id.as_str()) {
                    let share = reach / sequences.len() as f64;
                    for &sequence in sequences {
                        strategy.insert(sequence.clone(), share);
                    }
                }
            }
        }
        strategy
    }
}

impl From<Vec<(Sequence, f64)>> for Strategy {
    fn from(entries: Vec<(Sequence, f64)>) -> Self {
        Self {
            weights: entries.into_iter().collect(),
        }
    }
}

impl From<Strategy> for Vec<(Sequence, f64)> {
    fn from(strategy: Strategy) -> Self {
        let mut entries: Vec<(Sequence, f64)> = strategy.weights.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

/// Visitor accumulating the row seat's chip-swing distribution.
pub struct TransitionRecorder<'a> {
    tree: &'a SignalTree,
    strategy: &'a Strategy,
    distribution: ChipSwing,
}

impl<'a> TransitionRecorder<'a> {
    /// Create a recorder for `strategy`.
    pub fn new(tree: &'a SignalTree, strategy: &'a Strategy) -> Self {
        Self {
            tree,
            strategy,
            distribution: ChipSwing::new(),
        }
    }

    /// The accumulated distribution.
    pub fn finish(self) -> ChipSwing {
        self.distribution
    }

    fn weight(&self, seat: Seat, sequence: &Sequence) -> Result<f64, CompileError> {
        self.strategy.weight(sequence).ok_or_else(|| CompileError::MissingSequence {
            seat,
            sequence: sequence.to_string(),
        })
    }
}

impl Visitor for TransitionRecorder<'_> {
    fn leaf<E: RulesEngine>(
        &mut self,
        engine: &E,
        signal: SignalId,
        sequences: &[Sequence; 2],
    ) -> Result<(), CompileError> {
        let probability = self.tree.chance_probability(signal)
            * self.weight(Seat::Row, &sequences[0])?
            * self.weight(Seat::Column, &sequences[1])?;

        if engine.folded_status() {
            let payoff = engine.payoff(Seat::Row).ok_or(CompileError::MissingPayoff)?;
            *self.distribution.entry(payoff).or_insert(0.0) += probability;
            return Ok(());
        }

        let pot = engine.total_pushed_amount();
        assert!(pot % 2 == 0, "showdown pot {} is not split evenly", pot);
        let half = (pot / 2) as i64;
        let (win, tie, loss) = (
            self.tree.win_probability(signal),
            self.tree.tie_probability(signal),
            self.tree.loss_probability(signal),
        );
        assert!((win + tie + loss - 1.0).abs() < 1e-9, "outcome probabilities sum to {}", win + tie + loss);

        *self.distribution.entry(half).or_insert(0.0) += win * probability;
        *self.distribution.entry(0).or_insert(0.0) += tie * probability;
        *self.distribution.entry(-half).or_insert(0.0) += loss * probability;
        Ok(())
    }
}
