//! Game-tree size counters.
//!
//! Two counts of the same betting tree: one where chance nodes branch over
//! signal pairs (the tree actually compiled), one over raw card orderings.
//! Both stop only when the hand is over, so all-in run-outs are counted too.

use super::sequence::Sequence;
use super::traverse::Visitor;
use super::CompileError;
use crate::abstraction::SignalId;
use crate::cards::permutations;
use crate::engine::{Action, Operation, RulesEngine};

/// Visitor counting nodes of the signal-collapsed tree.
#[derive(Debug, Default)]
pub struct NodeCounter {
    leaves: u64,
}

impl NodeCounter {
    /// Create a counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of terminal nodes seen.
    pub fn leaves(&self) -> u64 {
        self.leaves
    }
}

impl Visitor for NodeCounter {
    fn is_leaf<E: RulesEngine>(&self, engine: &E) -> bool {
        !engine.status()
    }

    fn leaf<E: RulesEngine>(&mut self, _: &E, _: SignalId, _: &[Sequence; 2]) -> Result<(), CompileError> {
        self.leaves += 1;
        Ok(())
    }
}

/// Count nodes of the uncollapsed tree, where every chance node branches over
/// every ordering of the cards it deals.
///
/// A chance node dealing `k` cards out of `n` remaining counts as
/// `1 + perm(n, k) × (nodes below one deal)`. Burned cards are not counted as
/// leaving the deck.
pub fn count_nodes_without_signals<E: RulesEngine>(engine: &mut E, deck_size: u64) -> Result<u128, CompileError> {
    if !engine.status() {
        return Ok(1);
    }

    if engine.can_deal_hole() || engine.can_burn_card() {
        let (checkpoint, dealt) = if engine.can_deal_hole() {
            let checkpoint = engine.apply(Operation::DealHole)?;
            let mut dealt = 1;
            while engine.can_deal_hole() {
                engine.apply(Operation::DealHole)?;
                dealt += 1;
            }
            (checkpoint, dealt)
        } else {
            let checkpoint = engine.apply(Operation::BurnCard)?;
            engine.apply(Operation::DealBoard)?;
            (checkpoint, 1)
        };
        let below = count_nodes_without_signals(engine, deck_size.saturating_sub(dealt))?;
        engine.rewind(checkpoint);
        return Ok(1 + permutations(deck_size, dealt) as u128 * below);
    }

    if engine.actor().is_none() {
        return Err(CompileError::Stalled);
    }
    let mut count = 1;
    for action in Action::ALL {
        let operation = action.operation();
        if !engine.can(operation) {
            continue;
        }
        let checkpoint = engine.apply(operation)?;
        count += count_nodes_without_signals(engine, deck_size)?;
        engine.rewind(checkpoint);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineConfig, RoyalRhodeIsland};

    #[test]
    fn test_one_chip_stack() {
        // antes put both seats all in: root, hole deal, two board deals, showdown
        let mut engine = RoyalRhodeIsland::new(&EngineConfig::default(), 1).unwrap();
        let count = count_nodes_without_signals(&mut engine, 20).unwrap();
        assert_eq!(count, 1 + 380 * (1 + 18 * (1 + 17)));
    }

    #[test]
    fn test_engine_restored() {
        let mut engine = RoyalRhodeIsland::new(&EngineConfig::default(), 3).unwrap();
        let before = engine.events().len();
        count_nodes_without_signals(&mut engine, 20).unwrap();
        assert_eq!(engine.events().len(), before);
        assert!(engine.can_deal_hole());
    }
}
