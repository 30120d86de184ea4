//! Cards, decks and Rhode Island hand ranking.
//!
//! ## Module Structure
//!
//! - [`card`]: `Card`, `Deck` and `DeckKind`
//! - [`hand_eval`]: three-card hand evaluation (one private card plus two board cards)

pub mod card;
pub mod hand_eval;

pub use card::{permutations, Card, Deck, DeckKind, ParseCardError};
pub use hand_eval::{HandCategory, HandEvaluator, HandRank};
