//! Signal abstraction tree.
//!
//! Every ordered deal of four distinct cards (row private, column private,
//! flop, turn) is enumerated once. Each deal touches four signal pairs (root,
//! preflop, flop, turn); every touched pair counts the deal and the row seat's
//! showdown outcome, and remembers which deeper pairs it leads to.
//!
//! Counts stay integral until a probability is asked for, so two builds over
//! the same deck are identical.

use super::signal::{Signal, SignalPair};
use crate::cards::{Card, Deck, HandEvaluator};
use crate::progress;
use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::time::Instant;

/// Index of a signal pair inside a [`SignalTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(u32);

impl SignalId {
    /// The root pair `("", "")`.
    pub const ROOT: SignalId = SignalId(0);

    /// Position in the node table.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Showdown results of the row seat over a set of deals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcomes {
    /// Deals the row seat wins.
    pub wins: u64,
    /// Deals that split.
    pub ties: u64,
    /// Deals the row seat loses.
    pub losses: u64,
}

impl Outcomes {
    /// Number of deals counted.
    #[inline]
    pub fn total(&self) -> u64 {
        self.wins + self.ties + self.losses
    }

    /// Count one deal from the row seat's point of view.
    #[inline]
    pub fn record(&mut self, row_vs_column: Ordering) {
        match row_vs_column {
            Ordering::Greater => self.wins += 1,
            Ordering::Equal => self.ties += 1,
            Ordering::Less => self.losses += 1,
        }
    }

    /// Add another set of counts.
    pub fn merge(&mut self, other: &Outcomes) {
        self.wins += other.wins;
        self.ties += other.ties;
        self.losses += other.losses;
    }

    /// Expected showdown share: `(wins + ties / 2) / total`.
    pub fn equity(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.wins as f64 + self.ties as f64 / 2.0) / total as f64
    }
}

/// One signal pair and everything counted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalNode {
    /// The signal pair.
    pub pair: SignalPair,
    /// 0 for the root, then 1 (preflop), 2 (flop), 3 (turn).
    pub depth: u8,
    /// Outcomes of every deal reaching this pair.
    pub outcomes: Outcomes,
    /// Deeper pairs, in the order the enumeration first reached them.
    pub children: Vec<SignalId>,
}

/// Accumulator for a slice of the enumeration.
struct Tally {
    nodes: Vec<SignalNode>,
    index: FxHashMap<SignalPair, SignalId>,
    linked: Vec<FxHashSet<SignalId>>,
}

impl Tally {
    fn new() -> Self {
        let mut tally = Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
            linked: Vec::new(),
        };
        tally.intern(SignalPair::root(), 0);
        tally
    }

    fn intern(&mut self, pair: SignalPair, depth: u8) -> SignalId {
        if let Some(&id) = self.index.get(&pair) {
            return id;
        }
        let id = SignalId(self.nodes.len() as u32);
        self.index.insert(pair.clone(), id);
        self.nodes.push(SignalNode {
            pair,
            depth,
            outcomes: Outcomes::default(),
            children: Vec::new(),
        });
        self.linked.push(FxHashSet::default());
        id
    }

    fn link(&mut self, parent: SignalId, child: SignalId) {
        if self.linked[parent.index()].insert(child) {
            self.nodes[parent.index()].children.push(child);
        }
    }

    /// Enumerate every deal whose row card is `deck[first]`, in deck order.
    fn enumerate_from(&mut self, cards: &[Card], first: usize, evaluator: &HandEvaluator) {
        let c0 = cards[first];
        let preflop_row = Signal::preflop(c0);
        for (j, &c1) in cards.iter().enumerate() {
            if j == first {
                continue;
            }
            let preflop_column = Signal::preflop(c1);
            for (k, &flop) in cards.iter().enumerate() {
                if k == first || k == j {
                    continue;
                }
                let flop_pair = SignalPair(Signal::flop(c0, flop), Signal::flop(c1, flop));
                for (l, &turn) in cards.iter().enumerate() {
                    if l == first || l == j || l == k {
                        continue;
                    }
                    let turn_pair = SignalPair(Signal::turn(c0, flop, turn), Signal::turn(c1, flop, turn));
                    let outcome = evaluator.compare(c0, c1, flop, turn);
                    self.record_deal(
                        SignalPair(preflop_row.clone(), preflop_column.clone()),
                        flop_pair.clone(),
                        turn_pair,
                        outcome,
                    );
                }
            }
        }
    }

    fn record_deal(&mut self, preflop: SignalPair, flop: SignalPair, turn: SignalPair, outcome: Ordering) {
        let preflop = self.intern(preflop, 1);
        let flop = self.intern(flop, 2);
        let turn = self.intern(turn, 3);
        self.link(SignalId::ROOT, preflop);
        self.link(preflop, flop);
        self.link(flop, turn);
        for id in [SignalId::ROOT, preflop, flop, turn] {
            self.nodes[id.index()].outcomes.record(outcome);
        }
    }

    /// Fold a later slice of the enumeration into this one.
    ///
    /// Absorbing slices in enumeration order reproduces the node and child
    /// order of a single sequential pass.
    fn absorb(&mut self, other: Tally) {
        let remap: Vec<SignalId> = other
            .nodes
            .iter()
            .map(|node| {
                let id = self.intern(node.pair.clone(), node.depth);
                self.nodes[id.index()].outcomes.merge(&node.outcomes);
                id
            })
            .collect();
        for (i, node) in other.nodes.iter().enumerate() {
            for child in &node.children {
                self.link(remap[i], remap[child.index()]);
            }
        }
    }
}

/// The signal abstraction tree. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalTree {
    nodes: Vec<SignalNode>,
    index: FxHashMap<SignalPair, SignalId>,
    deck_size: usize,
}

impl SignalTree {
    /// Enumerate every ordered four-card deal of `deck`.
    pub fn build(deck: &Deck) -> Self {
        Self::build_with_progress(deck, false)
    }

    /// Build, optionally reporting progress per private row card.
    pub fn build_with_progress(deck: &Deck, show_progress: bool) -> Self {
        let start = Instant::now();
        let cards = deck.cards();
        let evaluator = HandEvaluator::new();
        let pb = progress::bar(cards.len() as u64, show_progress, "Enumerating deals");

        let shards: Vec<Tally> = (0..cards.len())
            .into_par_iter()
            .map(|first| {
                let mut tally = Tally::new();
                tally.enumerate_from(cards, first, &evaluator);
                pb.inc(1);
                tally
            })
            .collect();
        pb.finish_and_clear();

        let mut merged = Tally::new();
        for shard in shards {
            merged.absorb(shard);
        }

        let tree = Self::from_tally(merged, cards.len());
        info!(
            "Signal tree: {} deals, {} signal pairs in {:.2?}",
            tree.total_deals(),
            tree.len(),
            start.elapsed()
        );
        debug!(
            "Signal pairs per street: preflop {}, flop {}, turn {}",
            tree.count_at_depth(1),
            tree.count_at_depth(2),
            tree.count_at_depth(3)
        );
        tree
    }

    fn from_tally(tally: Tally, deck_size: usize) -> Self {
        Self {
            nodes: tally.nodes,
            index: tally.index,
            deck_size,
        }
    }

    /// The root pair.
    #[inline]
    pub fn root(&self) -> SignalId {
        SignalId::ROOT
    }

    /// Number of cards in the enumerated deck.
    pub fn deck_size(&self) -> usize {
        self.deck_size
    }

    /// Number of distinct signal pairs, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of ordered deals enumerated.
    pub fn total_deals(&self) -> u64 {
        self.nodes[SignalId::ROOT.index()].outcomes.total()
    }

    /// Look up a pair.
    pub fn get(&self, pair: &SignalPair) -> Option<SignalId> {
        self.index.get(pair).copied()
    }

    /// The node for an id.
    #[inline]
    pub fn node(&self, id: SignalId) -> &SignalNode {
        &self.nodes[id.index()]
    }

    /// The pair for an id.
    #[inline]
    pub fn pair(&self, id: SignalId) -> &SignalPair {
        &self.nodes[id.index()].pair
    }

    /// Deeper pairs reachable from `id`, in first-seen order.
    #[inline]
    pub fn next(&self, id: SignalId) -> &[SignalId] {
        &self.nodes[id.index()].children
    }

    /// Unconditional probability of a deal reaching `id`.
    pub fn chance_probability(&self, id: SignalId) -> f64 {
        self.node(id).outcomes.total() as f64 / self.total_deals() as f64
    }

    /// Row seat's showdown equity given `id` was reached.
    pub fn equity(&self, id: SignalId) -> f64 {
        self.node(id).outcomes.equity()
    }

    /// Probability the row seat wins given `id`.
    pub fn win_probability(&self, id: SignalId) -> f64 {
        let o = self.node(id).outcomes;
        o.wins as f64 / o.total() as f64
    }

    /// Probability of a split given `id`.
    pub fn tie_probability(&self, id: SignalId) -> f64 {
        let o = self.node(id).outcomes;
        o.ties as f64 / o.total() as f64
    }

    /// Probability the row seat loses given `id`.
    pub fn loss_probability(&self, id: SignalId) -> f64 {
        let o = self.node(id).outcomes;
        o.losses as f64 / o.total() as f64
    }

    /// Iterate over all nodes in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalId, &SignalNode)> {
        self.nodes.iter().enumerate().map(|(i, node)| (SignalId(i as u32), node))
    }

    fn count_at_depth(&self, depth: u8) -> usize {
        self.nodes.iter().filter(|n| n.depth == depth).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn royal_tree() -> &'static SignalTree {
        static TREE: OnceLock<SignalTree> = OnceLock::new();
        TREE.get_or_init(|| SignalTree::build(&Deck::royal()))
    }

    #[test]
    fn test_root_counts() {
        let tree = royal_tree();
        assert_eq!(tree.total_deals(), 20 * 19 * 18 * 17);
        assert_eq!(tree.pair(tree.root()), &SignalPair::root());
        assert!((tree.chance_probability(tree.root()) - 1.0).abs() < 1e-12);
        // five ranks for each seat
        assert_eq!(tree.next(tree.root()).len(), 25);
        let first = tree.next(tree.root())[0];
        assert_eq!(tree.pair(first), &SignalPair::new("T", "T"));
    }

    #[test]
    fn test_outcome_probabilities_sum_to_one() {
        let tree = royal_tree();
        for (id, _) in tree.iter() {
            let sum = tree.win_probability(id) + tree.tie_probability(id) + tree.loss_probability(id);
            assert!((sum - 1.0).abs() < 1e-9, "{} sums to {}", tree.pair(id), sum);
            let equity = tree.equity(id);
            assert!((0.0..=1.0).contains(&equity));
        }
    }

    #[test]
    fn test_children_mass_matches_parent() {
        let tree = royal_tree();
        for (id, node) in tree.iter() {
            if node.depth == 3 {
                assert!(node.children.is_empty());
                continue;
            }
            let children: u64 = tree.next(id).iter().map(|&c| tree.node(c).outcomes.total()).sum();
            assert_eq!(children, node.outcomes.total());
            for &child in tree.next(id) {
                assert_eq!(tree.node(child).depth, node.depth + 1);
            }
        }
    }

    #[test]
    fn test_symmetric_equity() {
        let tree = royal_tree();
        let ak = tree.get(&SignalPair::new("A", "K")).unwrap();
        let ka = tree.get(&SignalPair::new("K", "A")).unwrap();
        assert!((tree.equity(ak) + tree.equity(ka) - 1.0).abs() < 1e-12);
        assert!(tree.equity(ak) > 0.5);
        let root = tree.root();
        assert!((tree.equity(root) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_pairs_are_reachable_only_from_shallower() {
        let tree = royal_tree();
        let flop = tree.get(&SignalPair::new("(AK)", "QK")).unwrap();
        assert_eq!(tree.node(flop).depth, 2);
        let preflop = tree.get(&SignalPair::new("A", "Q")).unwrap();
        assert!(tree.next(preflop).contains(&flop));
        assert!(!tree.next(tree.root()).contains(&flop));
        // a private card cannot share rank and suit with the flop
        assert!(tree.get(&SignalPair::new("(AA)", "KA")).is_none());
    }

    #[test]
    fn test_sharded_build_matches_sequential_pass() {
        let deck = Deck::royal();
        let evaluator = HandEvaluator::new();
        let mut sequential = Tally::new();
        for first in 0..deck.len() {
            sequential.enumerate_from(deck.cards(), first, &evaluator);
        }
        let sequential = SignalTree::from_tally(sequential, deck.len());
        assert_eq!(&sequential, royal_tree());
    }

    #[test]
    fn test_deterministic_rebuild() {
        let again = SignalTree::build(&Deck::royal());
        assert_eq!(&again, royal_tree());
    }
}
