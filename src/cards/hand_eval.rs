//! Rhode Island hand evaluation.
//!
//! A Rhode Island hand is one private card plus the two board cards. With only
//! three cards a straight is harder to make than a flush, so the category order
//! differs from five-card poker.

use super::card::{Card, ACE, THREE, TWO};
use std::cmp::Ordering;

/// Hand categories, worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    /// Three unpaired, unconnected cards of mixed suits.
    HighCard,
    /// Two cards of one rank.
    OnePair,
    /// Three cards of one suit.
    Flush,
    /// Three consecutive ranks.
    Straight,
    /// Three cards of one rank.
    ThreeOfAKind,
    /// Three consecutive ranks of one suit.
    StraightFlush,
}

impl HandCategory {
    const BY_CODE: [HandCategory; 6] = [
        HandCategory::HighCard,
        HandCategory::OnePair,
        HandCategory::Flush,
        HandCategory::Straight,
        HandCategory::ThreeOfAKind,
        HandCategory::StraightFlush,
    ];
}

/// Comparable strength of a three-card hand.
///
/// Packed as category in bits 12..16 and up to three ranks, most significant
/// first, in the nibbles below. Greater is stronger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandRank(u32);

impl HandRank {
    fn new(category: HandCategory, ranks: &[u8]) -> Self {
        let packed = ranks
            .iter()
            .take(3)
            .zip([8u32, 4, 0])
            .fold((category as u32) << 12, |acc, (&rank, shift)| acc | (rank as u32) << shift);
        Self(packed)
    }

    /// The hand's category.
    pub fn category(&self) -> HandCategory {
        HandCategory::BY_CODE[(self.0 >> 12) as usize]
    }
}

/// Hand evaluator for Rhode Island hands.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandEvaluator;

impl HandEvaluator {
    /// Create a new hand evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a private card against the flop and turn.
    #[inline]
    pub fn evaluate(&self, hole: Card, flop: Card, turn: Card) -> HandRank {
        self.evaluate_3(&[hole, flop, turn])
    }

    /// Evaluate a 3-card hand.
    pub fn evaluate_3(&self, cards: &[Card; 3]) -> HandRank {
        let mut ranks = [cards[0].rank(), cards[1].rank(), cards[2].rank()];
        ranks.sort_unstable_by(|a, b| b.cmp(a));

        let is_flush = cards[0].suit() == cards[1].suit() && cards[1].suit() == cards[2].suit();
        let straight_high = self.find_straight(&ranks);

        match (straight_high, is_flush) {
            (Some(high), true) => return HandRank::new(HandCategory::StraightFlush, &[high]),
            _ if ranks[0] == ranks[2] => {
                return HandRank::new(HandCategory::ThreeOfAKind, &[ranks[0]]);
            }
            (Some(high), false) => return HandRank::new(HandCategory::Straight, &[high]),
            (None, true) => return HandRank::new(HandCategory::Flush, &ranks),
            (None, false) => {}
        }

        if ranks[0] == ranks[1] {
            HandRank::new(HandCategory::OnePair, &[ranks[0], ranks[2]])
        } else if ranks[1] == ranks[2] {
            HandRank::new(HandCategory::OnePair, &[ranks[1], ranks[0]])
        } else {
            HandRank::new(HandCategory::HighCard, &ranks)
        }
    }

    /// Compare two private cards on a shared board.
    pub fn compare(&self, first: Card, second: Card, flop: Card, turn: Card) -> Ordering {
        self.evaluate(first, flop, turn).cmp(&self.evaluate(second, flop, turn))
    }

    /// High card of a straight in descending-sorted ranks, if any.
    /// A-2-3 plays as a three-high straight.
    fn find_straight(&self, ranks: &[u8; 3]) -> Option<u8> {
        if ranks[0] == ranks[1] + 1 && ranks[1] == ranks[2] + 1 {
            Some(ranks[0])
        } else if ranks == &[ACE, THREE, TWO] {
            Some(THREE)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(s: &str) -> [Card; 3] {
        [
            s[0..2].parse::<Card>().unwrap(),
            s[2..4].parse::<Card>().unwrap(),
            s[4..6].parse::<Card>().unwrap(),
        ]
    }

    fn rank(s: &str) -> HandRank {
        HandEvaluator::new().evaluate_3(&hand(s))
    }

    #[test]
    fn test_categories() {
        assert_eq!(rank("AsKsQs").category(), HandCategory::StraightFlush);
        assert_eq!(rank("AsAhAd").category(), HandCategory::ThreeOfAKind);
        assert_eq!(rank("AsKhQd").category(), HandCategory::Straight);
        assert_eq!(rank("AsKsTs").category(), HandCategory::Flush);
        assert_eq!(rank("AsAhTd").category(), HandCategory::OnePair);
        assert_eq!(rank("AsKhTd").category(), HandCategory::HighCard);
        assert_eq!(rank("As2h3d").category(), HandCategory::Straight);
    }

    #[test]
    fn test_category_order() {
        assert!(rank("JsTsQs") > rank("AsAhAd"));
        assert!(rank("TsThTd") > rank("AsKhQd"));
        assert!(rank("JsQhTd") > rank("AsKsTs"));
        assert!(rank("AsKsTs") > rank("AsAhKd"));
        assert!(rank("TsTh2d") > rank("AsKhJd"));
    }

    #[test]
    fn test_kickers() {
        assert!(rank("KsKhAd") > rank("KsKdQd"));
        assert!(rank("AsAhTd") > rank("KsKhAd"));
        assert!(rank("AsKhJd") > rank("AsQhJd"));
        assert_eq!(rank("AsKhJd"), rank("AdKcJh"));
        assert!(rank("AsKhQd") > rank("2s3hAd"));
    }

    #[test]
    fn test_compare() {
        let eval = HandEvaluator::new();
        let flop = "Ks".parse::<Card>().unwrap();
        let turn = "Qh".parse::<Card>().unwrap();
        let ace = "Ad".parse::<Card>().unwrap();
        let king = "Kd".parse::<Card>().unwrap();
        let queen = "Qd".parse::<Card>().unwrap();
        // A-K-Q straight beats a pair of kings
        assert_eq!(eval.compare(ace, king, flop, turn), Ordering::Greater);
        assert_eq!(eval.compare(king, queen, flop, turn), Ordering::Greater);
        assert_eq!(eval.compare(king, "Kc".parse::<Card>().unwrap(), flop, turn), Ordering::Equal);
    }
}
