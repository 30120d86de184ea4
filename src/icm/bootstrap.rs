//! Chip swings for stacks too small to enumerate.
//!
//! A hand at such a stack is modelled as an immediate all-in showdown: the row
//! seat loses the stack, splits, or wins the stack with the signal-free
//! showdown odds.

use crate::abstraction::ShowdownOdds;
use crate::compiler::ChipSwing;

/// `{-stack: loss, 0: tie, +stack: win}`.
pub fn showdown_swing(odds: &ShowdownOdds, stack: u32) -> ChipSwing {
    let stack = stack as i64;
    let mut swing = ChipSwing::new();
    swing.insert(-stack, odds.loss_probability());
    swing.insert(0, odds.tie_probability());
    swing.insert(stack, odds.win_probability());
    swing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Deck;

    #[test]
    fn test_royal_showdown_swing() {
        let deck = Deck::royal();
        let odds = ShowdownOdds::enumerate(&deck);
        // exact before normalisation
        assert_eq!(odds.wins + odds.ties + odds.losses, deck.dealing_count());

        let swing = showdown_swing(&odds, 5);
        assert_eq!(swing.len(), 3);
        assert_eq!(swing[&5], swing[&-5]);
        let total: f64 = swing.values().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
