//! Solved strategies per effective stack.
//!
//! The equilibrium solver writes one solution per effective stack: the
//! sequences of each seat and their average realization weights. The book
//! merges both seats of every solution into one [`Strategy`] and answers
//! lookups of the form (effective stack, infoset) → action letter → weight.

use crate::compiler::{Sequence, Strategy};
use crate::engine::{Action, Seat};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Average strategies of one solved game, as written by the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSolution {
    /// Row seat sequences, the empty sequence included.
    pub row_sequences: Vec<Sequence>,
    /// Row seat realization weights, aligned with `row_sequences`.
    pub average_row_strategy: Vec<f64>,
    /// Column seat sequences, the empty sequence included.
    pub column_sequences: Vec<Sequence>,
    /// Column seat realization weights, aligned with `column_sequences`.
    pub average_column_strategy: Vec<f64>,
}

impl SolverSolution {
    /// Load from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| StrategyError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| StrategyError::Parse(e.to_string()))
    }
}

/// Strategies keyed by effective stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyBook {
    by_stack: BTreeMap<u32, Strategy>,
}

impl StrategyBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, StrategyError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| StrategyError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| StrategyError::Parse(e.to_string()))
    }

    /// Save as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), StrategyError> {
        let file = File::create(path.as_ref()).map_err(|e| StrategyError::Io(e.to_string()))?;
        serde_json::to_writer(BufWriter::new(file), self).map_err(|e| StrategyError::Io(e.to_string()))
    }

    /// Merge both seats of a solution as the strategy for `stack`.
    ///
    /// The empty sequence is dropped; every other sequence must appear once.
    pub fn insert_solution(&mut self, stack: u32, solution: SolverSolution) -> Result<(), StrategyError> {
        let seats = [
            (Seat::Row, solution.row_sequences, solution.average_row_strategy),
            (Seat::Column, solution.column_sequences, solution.average_column_strategy),
        ];

        let mut strategy = Strategy::new();
        let mut expected = 0;
        for (seat, sequences, weights) in seats {
            if sequences.len() != weights.len() {
                return Err(StrategyError::LengthMismatch {
                    stack,
                    seat,
                    sequences: sequences.len(),
                    weights: weights.len(),
                });
            }
            expected += sequences.iter().filter(|s| !s.is_empty()).count();
            for (sequence, weight) in sequences.into_iter().zip(weights) {
                if !sequence.is_empty() {
                    strategy.insert(sequence, weight);
                }
            }
        }

        if strategy.len() != expected {
            return Err(StrategyError::DuplicateSequences { stack });
        }
        self.by_stack.insert(stack, strategy);
        Ok(())
    }

    /// Set the strategy of one stack.
    pub fn insert(&mut self, stack: u32, strategy: Strategy) {
        self.by_stack.insert(stack, strategy);
    }

    /// Strategy of one stack.
    pub fn strategy(&self, stack: u32) -> Option<&Strategy> {
        self.by_stack.get(&stack)
    }

    /// All strategies in stack order.
    pub fn strategies(&self) -> &BTreeMap<u32, Strategy> {
        &self.by_stack
    }

    /// Stacks present, ascending.
    pub fn stacks(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_stack.keys().copied()
    }

    /// Number of stacks.
    pub fn len(&self) -> usize {
        self.by_stack.len()
    }

    /// Check if the book is empty.
    pub fn is_empty(&self) -> bool {
        self.by_stack.is_empty()
    }

    /// Stored weight of every action of `infoset` at `stack`. Actions the
    /// strategy has no entry for are omitted.
    pub fn query(&self, stack: u32, infoset: &str) -> Result<BTreeMap<char, f64>, StrategyError> {
        let strategy = self.strategy(stack).ok_or(StrategyError::UnknownStack(stack))?;
        Ok(Action::ALL
            .iter()
            .filter_map(|&action| {
                strategy
                    .weight(&Sequence::new(infoset, action))
                    .map(|weight| (action.letter(), weight))
            })
            .collect())
    }

    /// Like [`StrategyBook::query`], scaled so the actions sum to 1.
    pub fn behavioral(&self, stack: u32, infoset: &str) -> Result<BTreeMap<char, f64>, StrategyError> {
        let mut weights = self.query(stack, infoset)?;
        let total: f64 = weights.values().sum();
        if total > 0.0 {
            for weight in weights.values_mut() {
                *weight /= total;
            }
        }
        Ok(weights)
    }
}

impl FromIterator<(u32, Strategy)> for StrategyBook {
    fn from_iter<I: IntoIterator<Item = (u32, Strategy)>>(iter: I) -> Self {
        Self {
            by_stack: iter.into_iter().collect(),
        }
    }
}

/// Strategy book errors.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyError {
    /// No strategy for this effective stack.
    UnknownStack(u32),
    /// Sequences and weights of a seat differ in length.
    LengthMismatch {
        /// Effective stack.
        stack: u32,
        /// Seat.
        seat: Seat,
        /// Number of sequences.
        sequences: usize,
        /// Number of weights.
        weights: usize,
    },
    /// A sequence appears more than once in a solution.
    DuplicateSequences {
        /// Effective stack.
        stack: u32,
    },
    /// File system error.
    Io(String),
    /// Malformed JSON.
    Parse(String),
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyError::UnknownStack(stack) => write!(f, "No strategy for effective stack {}", stack),
            StrategyError::LengthMismatch {
                stack,
                seat,
                sequences,
                weights,
            } => write!(
                f,
                "Stack {} {} seat: {} sequences but {} weights",
                stack, seat, sequences, weights
            ),
            StrategyError::DuplicateSequences { stack } => {
                write!(f, "Stack {} solution repeats a sequence", stack)
            }
            StrategyError::Io(msg) => write!(f, "IO error: {}", msg),
            StrategyError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for StrategyError {}

/// Log a short summary of a book.
pub fn log_summary(book: &StrategyBook) {
    let sequences: usize = book.strategies().values().map(Strategy::len).sum();
    match (book.stacks().next(), book.stacks().last()) {
        (Some(first), Some(last)) => info!(
            "Strategy book: stacks {}..={} ({} stacks), {} sequences",
            first,
            last,
            book.len(),
            sequences
        ),
        _ => info!("Strategy book is empty"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution() -> SolverSolution {
        SolverSolution {
            row_sequences: vec![
                Sequence::Empty,
                Sequence::new(";A", Action::CheckOrCall),
                Sequence::new(";A", Action::CompleteBetOrRaiseTo),
            ],
            average_row_strategy: vec![1.0, 0.25, 0.75],
            column_sequences: vec![Sequence::Empty, Sequence::new("r;K", Action::Fold)],
            average_column_strategy: vec![1.0, 0.5],
        }
    }

    #[test]
    fn test_insert_and_query() {
        let mut book = StrategyBook::new();
        book.insert_solution(6, solution()).unwrap();
        assert_eq!(book.strategy(6).unwrap().len(), 3);

        let row = book.query(6, ";A").unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row[&'c'], 0.25);
        assert_eq!(row[&'r'], 0.75);
        assert!(!row.contains_key(&'f'));

        assert_eq!(book.query(6, "r;K").unwrap()[&'f'], 0.5);
        assert!(book.query(6, "nowhere;A").unwrap().is_empty());
        assert_eq!(book.query(7, ";A").unwrap_err(), StrategyError::UnknownStack(7));
    }

    #[test]
    fn test_behavioral() {
        let mut book = StrategyBook::new();
        let mut solution = solution();
        solution.average_row_strategy = vec![1.0, 0.1, 0.3];
        book.insert_solution(6, solution).unwrap();
        let probs = book.behavioral(6, ";A").unwrap();
        assert!((probs[&'c'] - 0.25).abs() < 1e-12);
        assert!((probs[&'r'] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_malformed_solutions() {
        let mut bad = solution();
        bad.average_column_strategy.pop();
        let err = StrategyBook::new().insert_solution(6, bad).unwrap_err();
        assert!(matches!(err, StrategyError::LengthMismatch { seat: Seat::Column, .. }));

        let mut dup = solution();
        dup.row_sequences[2] = Sequence::new(";A", Action::CheckOrCall);
        let err = StrategyBook::new().insert_solution(6, dup).unwrap_err();
        assert_eq!(err, StrategyError::DuplicateSequences { stack: 6 });
    }

    #[test]
    fn test_solution_json() {
        let json = r#"{
            "row_sequences": [[], [";A", "c"]],
            "average_row_strategy": [1.0, 1.0],
            "column_sequences": [[]],
            "average_column_strategy": [1.0]
        }"#;
        let solution: SolverSolution = serde_json::from_str(json).unwrap();
        assert_eq!(solution.row_sequences[1], Sequence::new(";A", Action::CheckOrCall));

        let mut book = StrategyBook::new();
        book.insert_solution(9, solution).unwrap();
        let text = serde_json::to_string(&book).unwrap();
        let back: StrategyBook = serde_json::from_str(&text).unwrap();
        assert_eq!(back, book);
    }
}
