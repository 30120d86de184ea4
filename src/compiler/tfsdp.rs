//! Tree-form sequential decision processes.
//!
//! The walk records, per seat, which infosets become reachable from each of
//! the seat's sequences. Assembly then turns every sequence into one node:
//!
//! | infosets under the sequence | emitted                                          |
//! |-----------------------------|--------------------------------------------------|
//! | none                        | `END_OF_THE_DECISION_PROCESS` with id `""`       |
//! | one                         | `DECISION_POINT`                                 |
//! | several                     | `OBSERVATION_POINT` `o<k>`, then one `DECISION_POINT` per infoset under `(o<k>, e<n>)` |
//!
//! Observation ids are numbered across both seats.

use super::equity::TerminalEvaluator;
use super::sequence::{ParentEdge, Sequence};
use super::traverse::Visitor;
use super::CompileError;
use crate::abstraction::{SignalId, SignalTree};
use crate::engine::{RulesEngine, Seat};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

/// Kind of a TFSDP node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// The seat chooses an action.
    DecisionPoint,
    /// The seat observes which of several infosets it is in.
    ObservationPoint,
    /// Nothing further for this seat.
    EndOfTheDecisionProcess,
}

/// A TFSDP node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfsdpNode {
    /// Infoset id, observation id, or `""` for an end node.
    pub id: String,
    /// Node kind.
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

/// One `(parent_edge, node)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TfsdpRecord {
    /// Edge the node hangs from.
    pub parent_edge: ParentEdge,
    /// The node.
    pub node: TfsdpNode,
}

/// Chance-weighted terminal value for a pair of sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityRecord {
    /// Row and column sequences leading to the terminal.
    pub sequences: [Sequence; 2],
    /// `chance_probability × value` for the row seat.
    pub value: f64,
}

/// Compiled game handed to the equilibrium solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledGame {
    /// One TFSDP per seat.
    #[serde(rename = "tree_form_sequential_decision_processes")]
    pub tfsdps: [Vec<TfsdpRecord>; 2],
    /// Terminal utilities, unique per sequence pair.
    pub utilities: Vec<UtilityRecord>,
}

impl CompiledGame {
    /// Load from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CompileError> {
        let file = File::open(path.as_ref()).map_err(|e| CompileError::Io(e.to_string()))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| CompileError::Parse(e.to_string()))
    }

    /// Save as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), CompileError> {
        let file = File::create(path.as_ref()).map_err(|e| CompileError::Io(e.to_string()))?;
        serde_json::to_writer(BufWriter::new(file), self).map_err(|e| CompileError::Io(e.to_string()))
    }

    /// Records of one seat.
    pub fn tfsdp(&self, seat: Seat) -> &[TfsdpRecord] {
        &self.tfsdps[seat.index()]
    }

    /// Decision points of one seat, in emission order.
    pub fn decision_points(&self, seat: Seat) -> impl Iterator<Item = &TfsdpRecord> {
        self.tfsdp(seat)
            .iter()
            .filter(|r| r.node.kind == NodeKind::DecisionPoint)
    }
}

/// Infosets reachable from each sequence of one seat, in insertion order.
#[derive(Debug, Default)]
struct SequenceChildren {
    entries: Vec<(Sequence, Vec<Arc<str>>)>,
    index: FxHashMap<Sequence, usize>,
    members: FxHashSet<(usize, Arc<str>)>,
}

impl SequenceChildren {
    fn with_root() -> Self {
        let mut children = Self::default();
        children.ensure(&Sequence::Empty);
        children
    }

    fn ensure(&mut self, sequence: &Sequence) -> usize {
        if let Some(&i) = self.index.get(sequence) {
            return i;
        }
        let i = self.entries.len();
        self.entries.push((sequence.clone(), Vec::new()));
        self.index.insert(sequence.clone(), i);
        i
    }

    fn add(&mut self, parent: &Sequence, infoset: &Arc<str>) {
        let i = self.ensure(parent);
        if self.members.insert((i, infoset.clone())) {
            self.entries[i].1.push(infoset.clone());
        }
    }
}

/// Visitor collecting per-seat children and terminal utilities.
pub struct TreeBuilder<'t> {
    tree: &'t SignalTree,
    evaluator: TerminalEvaluator,
    children: [SequenceChildren; 2],
    utilities: Vec<UtilityRecord>,
    seen: FxHashSet<[Sequence; 2]>,
}

impl<'t> TreeBuilder<'t> {
    /// Create a builder for hands started with `starting_stack` chips each.
    pub fn new(tree: &'t SignalTree, starting_stack: u64) -> Self {
        Self {
            tree,
            evaluator: TerminalEvaluator::new(starting_stack),
            children: [SequenceChildren::with_root(), SequenceChildren::with_root()],
            utilities: Vec::new(),
            seen: FxHashSet::default(),
        }
    }

    /// Assemble both TFSDPs.
    pub fn finish(self) -> CompiledGame {
        let mut observations = 0usize;
        let [row, column] = self.children;
        let tfsdps = [
            assemble(row, &mut observations),
            assemble(column, &mut observations),
        ];
        CompiledGame {
            tfsdps,
            utilities: self.utilities,
        }
    }
}

fn assemble(children: SequenceChildren, observations: &mut usize) -> Vec<TfsdpRecord> {
    let mut records = Vec::with_capacity(children.entries.len());
    for (sequence, infosets) in children.entries {
        let parent_edge = ParentEdge::Sequence(sequence);
        match infosets.as_slice() {
            [] => records.push(TfsdpRecord {
                parent_edge,
                node: TfsdpNode {
                    id: String::new(),
                    kind: NodeKind::EndOfTheDecisionProcess,
                },
            }),
            [only] => records.push(TfsdpRecord {
                parent_edge,
                node: TfsdpNode {
                    id: only.to_string(),
                    kind: NodeKind::DecisionPoint,
                },
            }),
            many => {
                let point = format!("o{}", *observations);
                *observations += 1;
                records.push(TfsdpRecord {
                    parent_edge,
                    node: TfsdpNode {
                        id: point.clone(),
                        kind: NodeKind::ObservationPoint,
                    },
                });
                for (e, infoset) in many.iter().enumerate() {
                    records.push(TfsdpRecord {
                        parent_edge: ParentEdge::Observation {
                            point: point.clone(),
                            edge: format!("e{}", e),
                        },
                        node: TfsdpNode {
                            id: infoset.to_string(),
                            kind: NodeKind::DecisionPoint,
                        },
                    });
                }
            }
        }
    }
    records
}

impl Visitor for TreeBuilder<'_> {
    fn leaf<E: RulesEngine>(
        &mut self,
        engine: &E,
        signal: SignalId,
        sequences: &[Sequence; 2],
    ) -> Result<(), CompileError> {
        let value = if engine.folded_status() {
            engine.payoff(Seat::Row).ok_or(CompileError::MissingPayoff)? as f64
        } else {
            self.evaluator.evaluate(engine.total_pushed_amount(), self.tree.equity(signal))
        };

        assert!(
            self.seen.insert(sequences.clone()),
            "utility for ({}, {}) recorded twice",
            sequences[0],
            sequences[1]
        );
        self.utilities.push(UtilityRecord {
            sequences: sequences.clone(),
            value: self.tree.chance_probability(signal) * value,
        });
        Ok(())
    }

    fn decision(&mut self, seat: Seat, infoset: &Arc<str>, parent: &Sequence) {
        self.children[seat.index()].add(parent, infoset);
    }

    fn branch(&mut self, seat: Seat, sequence: &Sequence) {
        self.children[seat.index()].ensure(sequence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Action;

    #[test]
    fn test_assembly_rules() {
        let mut children = SequenceChildren::with_root();
        let a: Arc<str> = ";A".into();
        let k: Arc<str> = ";K".into();
        children.add(&Sequence::Empty, &a);
        children.add(&Sequence::Empty, &k);
        children.add(&Sequence::Empty, &a);
        let check = Sequence::new(a.clone(), Action::CheckOrCall);
        children.ensure(&check);
        let raise = Sequence::new(k.clone(), Action::CompleteBetOrRaiseTo);
        let after: Arc<str> = "rc:;AK".into();
        children.add(&raise, &after);

        let mut observations = 3;
        let records = assemble(children, &mut observations);
        assert_eq!(observations, 4);
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].node.kind, NodeKind::ObservationPoint);
        assert_eq!(records[0].node.id, "o3");
        assert_eq!(
            records[2].parent_edge,
            ParentEdge::Observation {
                point: "o3".to_string(),
                edge: "e1".to_string()
            }
        );
        assert_eq!(records[2].node.id, ";K");
        assert_eq!(records[3].node.kind, NodeKind::EndOfTheDecisionProcess);
        assert_eq!(records[3].node.id, "");
        assert_eq!(records[4].node.kind, NodeKind::DecisionPoint);
        assert_eq!(records[4].parent_edge, ParentEdge::Sequence(raise));
    }

    #[test]
    fn test_json_layout() {
        let game = CompiledGame {
            tfsdps: [
                vec![TfsdpRecord {
                    parent_edge: ParentEdge::Sequence(Sequence::Empty),
                    node: TfsdpNode {
                        id: ";A".to_string(),
                        kind: NodeKind::DecisionPoint,
                    },
                }],
                Vec::new(),
            ],
            utilities: vec![UtilityRecord {
                sequences: [Sequence::new(";A", Action::CheckOrCall), Sequence::Empty],
                value: 0.5,
            }],
        };
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(
            json["tree_form_sequential_decision_processes"][0][0]["node"]["type"],
            "DECISION_POINT"
        );
        assert_eq!(json["utilities"][0]["sequences"][0][1], "c");
        assert_eq!(json["utilities"][0]["sequences"][1], serde_json::json!([]));
        let back: CompiledGame = serde_json::from_value(json).unwrap();
        assert_eq!(back, game);
    }
}
