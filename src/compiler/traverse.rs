//! Lockstep walk over the betting tree and the signal tree.
//!
//! Nodes are classified in priority order:
//! 1. leaf (the visitor decides; by default a settled hand),
//! 2. chance (private or board cards pending): deal, then branch once per
//!    deeper signal pair,
//! 3. decision: record the infoset, then branch on fold, check-or-call and
//!    bet/raise in that order, whichever are legal.
//!
//! Every operation is undone once its subtree returns, so siblings always see
//! the same engine state.

use super::sequence::{infoset_id, Sequence};
use super::CompileError;
use crate::abstraction::{SignalId, SignalTree};
use crate::engine::{Action, Operation, RulesEngine, Seat};
use crate::progress;
use std::sync::Arc;

/// Callbacks driven by [`Walker`].
pub trait Visitor {
    /// Whether the walk stops at this state.
    fn is_leaf<E: RulesEngine>(&self, engine: &E) -> bool {
        engine.is_settled()
    }

    /// Called at every leaf with the signal pair reached and both seats'
    /// active sequences.
    fn leaf<E: RulesEngine>(
        &mut self,
        engine: &E,
        signal: SignalId,
        sequences: &[Sequence; 2],
    ) -> Result<(), CompileError>;

    /// Called when `seat` reaches `infoset` with `parent` as its active sequence.
    fn decision(&mut self, _seat: Seat, _infoset: &Arc<str>, _parent: &Sequence) {}

    /// Called before `seat` extends its active sequence to `sequence`.
    fn branch(&mut self, _seat: Seat, _sequence: &Sequence) {}
}

/// Depth-first walker. Returns the number of nodes visited.
pub struct Walker<'t> {
    tree: &'t SignalTree,
    progress: bool,
}

impl<'t> Walker<'t> {
    /// Create a walker over `tree`.
    pub fn new(tree: &'t SignalTree) -> Self {
        Self { tree, progress: false }
    }

    /// Report progress across the first chance node's branches.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Walk from the engine's current state.
    ///
    /// The engine is left in the state it started in.
    pub fn walk<E: RulesEngine, V: Visitor>(&self, engine: &mut E, visitor: &mut V) -> Result<u64, CompileError> {
        let mut sequences = [Sequence::Empty, Sequence::Empty];
        self.visit(engine, visitor, self.tree.root(), &mut sequences)
    }

    fn visit<E: RulesEngine, V: Visitor>(
        &self,
        engine: &mut E,
        visitor: &mut V,
        signal: SignalId,
        sequences: &mut [Sequence; 2],
    ) -> Result<u64, CompileError> {
        if visitor.is_leaf(engine) {
            visitor.leaf(engine, signal, sequences)?;
            return Ok(1);
        }

        if engine.can_deal_hole() || engine.can_burn_card() {
            return self.chance(engine, visitor, signal, sequences);
        }

        let seat = engine.actor().ok_or(CompileError::Stalled)?;
        let infoset: Arc<str> =
            infoset_id(engine.events(), seat, self.tree.pair(signal).signal(seat.index())).into();
        visitor.decision(seat, &infoset, &sequences[seat.index()]);

        let mut count = 1;
        for action in Action::ALL {
            let operation = action.operation();
            if !engine.can(operation) {
                continue;
            }
            let sequence = Sequence::new(infoset.clone(), action);
            visitor.branch(seat, &sequence);

            let checkpoint = engine.apply(operation)?;
            let parent = std::mem::replace(&mut sequences[seat.index()], sequence);
            count += self.visit(engine, visitor, signal, sequences)?;
            sequences[seat.index()] = parent;
            engine.rewind(checkpoint);
        }
        Ok(count)
    }

    fn chance<E: RulesEngine, V: Visitor>(
        &self,
        engine: &mut E,
        visitor: &mut V,
        signal: SignalId,
        sequences: &mut [Sequence; 2],
    ) -> Result<u64, CompileError> {
        let checkpoint = if engine.can_deal_hole() {
            let checkpoint = engine.apply(Operation::DealHole)?;
            while engine.can_deal_hole() {
                engine.apply(Operation::DealHole)?;
            }
            checkpoint
        } else {
            let checkpoint = engine.apply(Operation::BurnCard)?;
            engine.apply(Operation::DealBoard)?;
            checkpoint
        };

        let children = self.tree.next(signal);
        let pb = (self.progress && signal == self.tree.root())
            .then(|| progress::bar(children.len() as u64, true, "Dealing"));
        let mut count = 1;
        for &child in children {
            count += self.visit(engine, visitor, child, sequences)?;
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        engine.rewind(checkpoint);
        Ok(count)
    }
}
