//! Signal-free showdown odds.
//!
//! The degenerate one-street game: both seats see every card at once and go
//! straight to showdown. Used to seed chip-swing distributions for stacks too
//! small to be enumerated through the full betting tree.

use super::tree::Outcomes;
use crate::cards::{Deck, HandEvaluator};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Exact row-seat showdown counts over every ordered four-card deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowdownOdds {
    /// Deals the row seat wins.
    pub wins: u64,
    /// Deals that split.
    pub ties: u64,
    /// Deals the row seat loses.
    pub losses: u64,
}

impl ShowdownOdds {
    /// Enumerate every ordered deal of `deck`.
    pub fn enumerate(deck: &Deck) -> Self {
        let cards = deck.cards();
        let evaluator = HandEvaluator::new();
        let outcomes = (0..cards.len())
            .into_par_iter()
            .map(|first| {
                let mut outcomes = Outcomes::default();
                for (j, &column) in cards.iter().enumerate() {
                    if j == first {
                        continue;
                    }
                    for (k, &flop) in cards.iter().enumerate() {
                        if k == first || k == j {
                            continue;
                        }
                        for (l, &turn) in cards.iter().enumerate() {
                            if l == first || l == j || l == k {
                                continue;
                            }
                            outcomes.record(evaluator.compare(cards[first], column, flop, turn));
                        }
                    }
                }
                outcomes
            })
            .reduce(Outcomes::default, |mut a, b| {
                a.merge(&b);
                a
            });
        Self {
            wins: outcomes.wins,
            ties: outcomes.ties,
            losses: outcomes.losses,
        }
    }

    /// Number of deals.
    pub fn total(&self) -> u64 {
        self.wins + self.ties + self.losses
    }

    /// Probability the row seat wins.
    pub fn win_probability(&self) -> f64 {
        self.wins as f64 / self.total() as f64
    }

    /// Probability of a split.
    pub fn tie_probability(&self) -> f64 {
        self.ties as f64 / self.total() as f64
    }

    /// Probability the row seat loses.
    pub fn loss_probability(&self) -> f64 {
        self.losses as f64 / self.total() as f64
    }
}
