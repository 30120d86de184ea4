//! Signal labels.
//!
//! A signal names a private card relative to the public cards revealed so far.
//! Ranks are concatenated in dealing order and runs of cards sharing a suit are
//! wrapped in parentheses, so suit-isomorphic deals collapse onto one label.
//!
//! | street  | example labels                          |
//! |---------|-----------------------------------------|
//! | preflop | `A`                                     |
//! | flop    | `AK`, `(AK)`                            |
//! | turn    | `AKQ`, `(AKQ)`, `(AK)Q`, `A)K(Q`, `A(KQ)` |

use crate::cards::Card;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical label for one seat's private card on one street.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signal(String);

impl Signal {
    /// The empty signal held by both seats before any card is dealt.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Wrap an existing label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this is the root signal.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Preflop signal: the private card's rank.
    pub fn preflop(card: Card) -> Self {
        Self(card.rank_char().to_string())
    }

    /// Flop signal: private rank then flop rank, parenthesized when suited.
    pub fn flop(card: Card, flop: Card) -> Self {
        let (c, f) = (card.rank_char(), flop.rank_char());
        if card.suited_with(flop) {
            Self(format!("({}{})", c, f))
        } else {
            Self(format!("{}{}", c, f))
        }
    }

    /// Turn signal: private, flop and turn ranks with suit runs parenthesized.
    pub fn turn(card: Card, flop: Card, turn: Card) -> Self {
        let (c, f, t) = (card.rank_char(), flop.rank_char(), turn.rank_char());
        let label = if card.suited_with(flop) && flop.suited_with(turn) {
            format!("({}{}{})", c, f, t)
        } else if card.suited_with(flop) {
            format!("({}{}){}", c, f, t)
        } else if card.suited_with(turn) {
            format!("{}){}({}", c, f, t)
        } else if flop.suited_with(turn) {
            format!("{}({}{})", c, f, t)
        } else {
            format!("{}{}{}", c, f, t)
        };
        Self(label)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signals of both seats, row seat first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SignalPair(pub Signal, pub Signal);

impl SignalPair {
    /// The pair `("", "")` every deal starts from.
    pub fn root() -> Self {
        Self(Signal::root(), Signal::root())
    }

    /// Build a pair from two labels.
    pub fn new(row: impl Into<String>, column: impl Into<String>) -> Self {
        Self(Signal::new(row), Signal::new(column))
    }

    /// Signal seen by seat `index` (0 = row, 1 = column).
    #[inline]
    pub fn signal(&self, index: usize) -> &Signal {
        if index == 0 {
            &self.0
        } else {
            &self.1
        }
    }

    /// Check whether this is the root pair.
    pub fn is_root(&self) -> bool {
        self.0.is_root() && self.1.is_root()
    }
}

impl fmt::Display for SignalPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', '{}')", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    #[test]
    fn test_preflop_signal() {
        assert_eq!(Signal::preflop(card("As")).as_str(), "A");
        assert_eq!(Signal::preflop(card("Td")).as_str(), "T");
    }

    #[test]
    fn test_flop_signal() {
        assert_eq!(Signal::flop(card("As"), card("Ks")).as_str(), "(AK)");
        assert_eq!(Signal::flop(card("As"), card("Kh")).as_str(), "AK");
        assert_eq!(Signal::flop(card("Ts"), card("Th")).as_str(), "TT");
    }

    #[test]
    fn test_turn_signal_cases() {
        assert_eq!(Signal::turn(card("As"), card("Ks"), card("Qs")).as_str(), "(AKQ)");
        assert_eq!(Signal::turn(card("As"), card("Ks"), card("Qh")).as_str(), "(AK)Q");
        assert_eq!(Signal::turn(card("As"), card("Kh"), card("Qs")).as_str(), "A)K(Q");
        assert_eq!(Signal::turn(card("As"), card("Kh"), card("Qh")).as_str(), "A(KQ)");
        assert_eq!(Signal::turn(card("As"), card("Kh"), card("Qd")).as_str(), "AKQ");
    }

    #[test]
    fn test_suit_isomorphism() {
        // Relabelling suits never changes a signal
        let a = Signal::turn(card("Jc"), card("Jd"), card("Qc"));
        let b = Signal::turn(card("Jh"), card("Js"), card("Qh"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "J)J(Q");
    }

    #[test]
    fn test_pair() {
        let root = SignalPair::root();
        assert!(root.is_root());
        let pair = SignalPair::new("A", "K");
        assert_eq!(pair.signal(0).as_str(), "A");
        assert_eq!(pair.signal(1).as_str(), "K");
        assert!(!pair.is_root());
        assert_eq!(serde_json::to_string(&pair).unwrap(), "[\"A\",\"K\"]");
    }
}
