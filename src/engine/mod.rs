//! Rules-engine seam.
//!
//! The compiler drives a poker rules engine through the [`RulesEngine`] trait
//! and never names a concrete type. The engine is a mutable state machine with
//! a fixed operation vocabulary; every applied operation returns a checkpoint
//! that [`RulesEngine::rewind`] restores, so a traversal explores sibling
//! branches over one state instead of cloning it.
//!
//! [`royal::RoyalRhodeIsland`] is the bundled fixed-limit implementation.

pub mod royal;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use royal::RoyalRhodeIsland;

/// A seat at the heads-up table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Seat {
    /// Seat 0, first to act on every street.
    Row,
    /// Seat 1.
    Column,
}

impl Seat {
    /// Both seats in index order.
    pub const ALL: [Seat; 2] = [Seat::Row, Seat::Column];

    /// Seat index (0 or 1).
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Seat::Row => 0,
            Seat::Column => 1,
        }
    }

    /// The other seat.
    #[inline]
    pub fn opponent(&self) -> Seat {
        match self {
            Seat::Row => Seat::Column,
            Seat::Column => Seat::Row,
        }
    }

    /// Seat from index.
    pub fn from_index(index: usize) -> Option<Seat> {
        match index {
            0 => Some(Seat::Row),
            1 => Some(Seat::Column),
            _ => None,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::Row => write!(f, "row"),
            Seat::Column => write!(f, "column"),
        }
    }
}

/// A player decision, in the order decision nodes enumerate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Give up the pot.
    Fold,
    /// Check, or call the outstanding bet.
    CheckOrCall,
    /// Bet, raise, or complete to the next limit.
    CompleteBetOrRaiseTo,
}

impl Action {
    /// Actions in enumeration order: fold, check-or-call, bet/raise.
    pub const ALL: [Action; 3] = [Action::Fold, Action::CheckOrCall, Action::CompleteBetOrRaiseTo];

    /// One-letter code used in histories and sequences.
    #[inline]
    pub fn letter(&self) -> char {
        match self {
            Action::Fold => 'f',
            Action::CheckOrCall => 'c',
            Action::CompleteBetOrRaiseTo => 'r',
        }
    }

    /// Parse a one-letter code.
    pub fn from_letter(letter: char) -> Option<Action> {
        match letter {
            'f' => Some(Action::Fold),
            'c' => Some(Action::CheckOrCall),
            'r' => Some(Action::CompleteBetOrRaiseTo),
            _ => None,
        }
    }

    /// The engine operation performing this action.
    pub fn operation(&self) -> Operation {
        match self {
            Action::Fold => Operation::Fold,
            Action::CheckOrCall => Operation::CheckOrCall,
            Action::CompleteBetOrRaiseTo => Operation::CompleteBetOrRaiseTo,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// The operation vocabulary of a rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Deal a private card to the next seat.
    DealHole,
    /// Burn a card before a board card.
    BurnCard,
    /// Deal one board card.
    DealBoard,
    /// Fold.
    Fold,
    /// Check or call.
    CheckOrCall,
    /// Bet or raise to the next limit.
    CompleteBetOrRaiseTo,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::DealHole => "deal hole",
            Operation::BurnCard => "burn card",
            Operation::DealBoard => "deal board",
            Operation::Fold => "fold",
            Operation::CheckOrCall => "check or call",
            Operation::CompleteBetOrRaiseTo => "complete, bet or raise to",
        };
        f.write_str(name)
    }
}

/// What happened at the table, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A private card was dealt to a seat.
    HoleDealing(Seat),
    /// A card was burned.
    CardBurning,
    /// A board card was dealt.
    BoardDealing,
    /// A seat folded.
    Folding(Seat),
    /// A seat checked or called.
    CheckingOrCalling(Seat),
    /// A seat bet or raised to the given amount.
    CompletionBettingOrRaisingTo(Seat, u64),
}

/// Engine bookkeeping that is applied automatically instead of being
/// exposed as an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Automation {
    /// Antes are posted on construction.
    AntePosting,
    /// Bets are collected into the pot when a round closes.
    BetCollection,
    /// Blinds and straddles are posted (a no-op for ante-only games).
    BlindOrStraddlePosting,
    /// Hole cards are shown or mucked at showdown.
    HoleCardsShowingOrMucking,
    /// Losing hands are killed at showdown.
    HandKilling,
    /// The pot is pushed to the winner.
    ChipsPushing,
    /// The winner pulls the pushed chips.
    ChipsPulling,
}

impl Automation {
    /// Every automation; the bundled engine needs all of them.
    pub const ALL: [Automation; 7] = [
        Automation::AntePosting,
        Automation::BetCollection,
        Automation::BlindOrStraddlePosting,
        Automation::HoleCardsShowingOrMucking,
        Automation::HandKilling,
        Automation::ChipsPushing,
        Automation::ChipsPulling,
    ];
}

/// Fixed-limit betting structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettingStructure {
    /// Ante posted by each seat.
    pub ante: u64,
    /// Bet size per street (preflop, flop, turn).
    pub bets: Vec<u64>,
    /// Maximum number of bets and raises per street.
    pub max_completions: u32,
}

impl Default for BettingStructure {
    fn default() -> Self {
        Self {
            ante: 1,
            bets: vec![2, 4, 4],
            max_completions: 3,
        }
    }
}

/// Rules-engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Automations enabled on every state.
    pub automations: Vec<Automation>,
    /// Betting structure.
    pub betting: BettingStructure,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            automations: Automation::ALL.to_vec(),
            betting: BettingStructure::default(),
        }
    }
}

impl EngineConfig {
    /// Replace the betting structure.
    pub fn with_betting(mut self, betting: BettingStructure) -> Self {
        self.betting = betting;
        self
    }

    /// Replace the automation set.
    pub fn with_automations(mut self, automations: Vec<Automation>) -> Self {
        self.automations = automations;
        self
    }

    /// Check the configuration is one the bundled engine can run.
    pub fn validate(&self) -> Result<(), EngineError> {
        for automation in Automation::ALL {
            if !self.automations.contains(&automation) {
                return Err(EngineError::MissingAutomation(automation));
            }
        }
        let betting = &self.betting;
        if betting.ante == 0 {
            return Err(EngineError::InvalidBetting("ante must be positive".to_string()));
        }
        if betting.bets.len() != 3 {
            return Err(EngineError::InvalidBetting(format!(
                "expected 3 bet sizes (preflop, flop, turn), got {}",
                betting.bets.len()
            )));
        }
        if betting.bets.iter().any(|&b| b == 0) {
            return Err(EngineError::InvalidBetting("bet sizes must be positive".to_string()));
        }
        Ok(())
    }
}

/// Rules-engine errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A required automation was not enabled.
    MissingAutomation(Automation),
    /// The betting structure is unusable.
    InvalidBetting(String),
    /// The starting stack cannot cover a hand.
    InvalidStartingStack(u64),
    /// The operation is not legal in the current state.
    IllegalOperation(Operation),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::MissingAutomation(a) => write!(f, "Automation {:?} is required", a),
            EngineError::InvalidBetting(msg) => write!(f, "Invalid betting structure: {}", msg),
            EngineError::InvalidStartingStack(s) => write!(f, "Invalid starting stack: {}", s),
            EngineError::IllegalOperation(op) => write!(f, "Illegal operation: {}", op),
        }
    }
}

impl std::error::Error for EngineError {}

/// A heads-up poker state machine.
///
/// Implementations must be deterministic: applying the same operations from
/// the same state always yields the same state.
pub trait RulesEngine {
    /// Opaque snapshot restored by [`RulesEngine::rewind`].
    type Checkpoint;

    /// Whether the hand is still in progress.
    fn status(&self) -> bool;

    /// Whether the hand is in progress but no further betting is possible.
    fn all_in_status(&self) -> bool;

    /// Whether a seat folded.
    fn folded_status(&self) -> bool;

    /// Chips behind for each seat.
    fn stacks(&self) -> [u64; 2];

    /// Chips committed by both seats, antes included.
    fn total_pushed_amount(&self) -> u64;

    /// Chip result for `seat` once the hand ended by a fold.
    fn payoff(&self, seat: Seat) -> Option<i64>;

    /// Seat to act, if a decision is pending.
    fn actor(&self) -> Option<Seat>;

    /// Everything that happened so far.
    fn events(&self) -> &[Event];

    /// Whether `operation` is legal now.
    fn can(&self, operation: Operation) -> bool;

    /// Apply `operation`, returning the checkpoint that undoes it.
    fn apply(&mut self, operation: Operation) -> Result<Self::Checkpoint, EngineError>;

    /// Restore the state captured by `checkpoint`.
    fn rewind(&mut self, checkpoint: Self::Checkpoint);

    /// Whether a hole card can be dealt.
    fn can_deal_hole(&self) -> bool {
        self.can(Operation::DealHole)
    }

    /// Whether a card can be burned.
    fn can_burn_card(&self) -> bool {
        self.can(Operation::BurnCard)
    }

    /// Whether a board card can be dealt.
    fn can_deal_board(&self) -> bool {
        self.can(Operation::DealBoard)
    }

    /// Whether the hand is decided from here on: over, all in, or no chips
    /// left behind.
    fn is_settled(&self) -> bool {
        !self.status() || self.all_in_status() || self.stacks().iter().all(|&s| s == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat() {
        assert_eq!(Seat::Row.index(), 0);
        assert_eq!(Seat::Column.opponent(), Seat::Row);
        assert_eq!(Seat::from_index(1), Some(Seat::Column));
        assert_eq!(Seat::from_index(2), None);
    }

    #[test]
    fn test_action_letters() {
        let letters: String = Action::ALL.iter().map(|a| a.letter()).collect();
        assert_eq!(letters, "fcr");
        assert_eq!(Action::from_letter('r'), Some(Action::CompleteBetOrRaiseTo));
        assert_eq!(Action::from_letter('x'), None);
    }

    #[test]
    fn test_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());

        let missing = EngineConfig::default().with_automations(vec![Automation::AntePosting]);
        assert_eq!(
            missing.validate(),
            Err(EngineError::MissingAutomation(Automation::BetCollection))
        );

        let bad = EngineConfig::default().with_betting(BettingStructure {
            ante: 1,
            bets: vec![2, 4],
            max_completions: 3,
        });
        assert!(matches!(bad.validate(), Err(EngineError::InvalidBetting(_))));
    }

    #[test]
    fn test_automation_serde() {
        let json = serde_json::to_string(&Automation::HoleCardsShowingOrMucking).unwrap();
        assert_eq!(json, "\"HOLE_CARDS_SHOWING_OR_MUCKING\"");
    }
}
