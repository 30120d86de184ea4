//! Cards and decks.
//!
//! Signals only look at ranks and at which cards share a suit, so a card is a
//! packed byte and a deck is a fixed ordering of cards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rank characters, lowest first.
const RANKS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];

/// Suit characters: clubs, diamonds, hearts, spades.
const SUITS: [char; 4] = ['c', 'd', 'h', 's'];

/// Rank of a deuce.
pub const TWO: u8 = 0;
/// Rank of a trey.
pub const THREE: u8 = 1;
/// Rank of a ten, the lowest card of the royal deck.
pub const TEN: u8 = 8;
/// Rank of an ace.
pub const ACE: u8 = 12;

/// A playing card, packed as `rank * 4 + suit`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card(u8);

impl Card {
    /// Card of `rank` (0 = deuce .. 12 = ace) and `suit` (0..4).
    #[inline]
    pub fn new(rank: u8, suit: u8) -> Self {
        debug_assert!(rank < 13 && suit < 4, "no card with rank {} suit {}", rank, suit);
        Self(rank * 4 + suit)
    }

    /// Rank, 0 (deuce) to 12 (ace).
    #[inline]
    pub fn rank(&self) -> u8 {
        self.0 >> 2
    }

    /// Suit, 0 to 3.
    #[inline]
    pub fn suit(&self) -> u8 {
        self.0 & 3
    }

    /// Rank letter, as used in signals.
    #[inline]
    pub fn rank_char(&self) -> char {
        RANKS[self.rank() as usize]
    }

    /// Whether both cards share a suit.
    #[inline]
    pub fn suited_with(&self, other: Card) -> bool {
        self.suit() == other.suit()
    }
}

/// Error for text that is not a two-letter card such as `"Qh"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCardError(pub String);

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a card: {:?}", self.0)
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(r), Some(u), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseCardError(s.to_string()));
        };
        let rank = RANKS.iter().position(|&c| c == r.to_ascii_uppercase());
        let suit = SUITS.iter().position(|&c| c == u.to_ascii_lowercase());
        match (rank, suit) {
            (Some(rank), Some(suit)) => Ok(Self::new(rank as u8, suit as u8)),
            _ => Err(ParseCardError(s.to_string())),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank_char(), SUITS[self.suit() as usize])
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Which deck a run is dealt from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeckKind {
    /// Ten through ace in four suits (20 cards).
    #[default]
    Royal,
    /// The full 52-card deck.
    Standard,
}

impl DeckKind {
    /// Lowest rank present in this deck.
    pub fn lowest_rank(&self) -> u8 {
        match self {
            DeckKind::Royal => TEN,
            DeckKind::Standard => TWO,
        }
    }

    /// Build the deck.
    pub fn deck(&self) -> Deck {
        Deck::with_lowest_rank(self.lowest_rank())
    }
}

impl fmt::Display for DeckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckKind::Royal => write!(f, "royal"),
            DeckKind::Standard => write!(f, "standard"),
        }
    }
}

/// An ordered deck of cards.
///
/// The order is fixed (rank-major, then suit) so that every enumeration over
/// the deck visits deals in the same sequence.
#[derive(Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The 20-card royal deck.
    pub fn royal() -> Self {
        DeckKind::Royal.deck()
    }

    /// The 52-card standard deck.
    pub fn standard() -> Self {
        DeckKind::Standard.deck()
    }

    fn with_lowest_rank(lowest: u8) -> Self {
        Self {
            cards: (lowest * 4..52).map(Card).collect(),
        }
    }

    /// Number of cards in the deck.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the deck is empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards in deck order.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Number of ordered 4-card deals: `n·(n−1)·(n−2)·(n−3)`.
    pub fn dealing_count(&self) -> u64 {
        permutations(self.cards.len() as u64, 4)
    }
}

impl fmt::Debug for Deck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deck({} cards)", self.cards.len())
    }
}

/// Number of ordered selections of `k` items out of `n`.
pub fn permutations(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    ((n - k + 1)..=n).product()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    #[test]
    fn test_card_layout() {
        let ace = Card::new(ACE, 3);
        assert_eq!(ace.rank(), ACE);
        assert_eq!(ace.suit(), 3);
        assert_eq!(ace.to_string(), "As");
        assert_eq!(Card::new(TEN, 0), card("Tc"));
        assert!(!card("Tc").suited_with(ace));
        assert!(card("Ks").suited_with(ace));
    }

    #[test]
    fn test_card_parsing() {
        assert_eq!(card("kh").to_string(), "Kh");
        assert_eq!(card("Td").rank_char(), 'T');
        assert!("XX".parse::<Card>().is_err());
        assert!("A".parse::<Card>().is_err());
        assert_eq!("Asd".parse::<Card>(), Err(ParseCardError("Asd".to_string())));
    }

    #[test]
    fn test_deck_sizes() {
        let royal = Deck::royal();
        assert_eq!(royal.len(), 20);
        assert_eq!(royal.cards()[0], card("Tc"));
        assert_eq!(royal.cards()[19], card("As"));
        assert_eq!(royal.dealing_count(), 20 * 19 * 18 * 17);

        let standard = Deck::standard();
        assert_eq!(standard.len(), 52);
        assert_eq!(standard.dealing_count(), 6_497_400);
    }

    #[test]
    fn test_permutations() {
        assert_eq!(permutations(20, 2), 380);
        assert_eq!(permutations(18, 1), 18);
        assert_eq!(permutations(5, 0), 1);
        assert_eq!(permutations(2, 3), 0);
    }

    #[test]
    fn test_deck_kind_serde() {
        let kind: DeckKind = serde_json::from_str("\"standard\"").unwrap();
        assert_eq!(kind, DeckKind::Standard);
        assert_eq!(serde_json::to_string(&DeckKind::Royal).unwrap(), "\"royal\"");
    }
}
