//! Fixed-limit Royal Rhode Island Hold'em.
//!
//! Each seat antes, receives one private card, and three betting rounds
//! (preflop, flop, turn) are separated by a burn and one board card. The row
//! seat acts first on every street. Bets are capped per street and every bet
//! is capped by the chips either seat has left.
//!
//! Dealing is card-free: the engine tracks *that* cards were dealt, while the
//! caller tracks *which* (the signal abstraction does this). Antes, bet
//! collection, showdown and pot distribution are automatic.

use super::{BettingStructure, EngineConfig, EngineError, Event, Operation, RulesEngine, Seat};

/// Where the hand stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Private cards are being dealt.
    HoleDealing,
    /// A betting round is open.
    Betting,
    /// A card must be burned before the next board card.
    CardBurning,
    /// A board card must be dealt.
    BoardDealing,
    /// The hand ended by a fold or at showdown.
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Table {
    phase: Phase,
    street: usize,
    holes_dealt: usize,
    stacks: [u64; 2],
    bets: [u64; 2],
    committed: [u64; 2],
    acted: [bool; 2],
    completions: u32,
    actor: Option<Seat>,
    folded: Option<Seat>,
}

/// Undo point for [`RoyalRhodeIsland`].
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    table: Table,
    events: usize,
}

/// A Royal Rhode Island Hold'em hand in progress.
#[derive(Debug, Clone)]
pub struct RoyalRhodeIsland {
    betting: BettingStructure,
    starting_stack: u64,
    table: Table,
    events: Vec<Event>,
}

impl RoyalRhodeIsland {
    /// Start a hand with both seats holding `starting_stack` chips.
    /// Antes are posted immediately.
    pub fn new(config: &EngineConfig, starting_stack: u64) -> Result<Self, EngineError> {
        config.validate()?;
        if starting_stack == 0 {
            return Err(EngineError::InvalidStartingStack(starting_stack));
        }

        let ante = config.betting.ante.min(starting_stack);
        let table = Table {
            phase: Phase::HoleDealing,
            street: 0,
            holes_dealt: 0,
            stacks: [starting_stack - ante; 2],
            bets: [0; 2],
            committed: [ante; 2],
            acted: [false; 2],
            completions: 0,
            actor: None,
            folded: None,
        };

        Ok(Self {
            betting: config.betting.clone(),
            starting_stack,
            table,
            events: Vec::with_capacity(32),
        })
    }

    /// Chips each seat started with.
    pub fn starting_stack(&self) -> u64 {
        self.starting_stack
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.table.phase
    }

    /// Current street (0 preflop, 1 flop, 2 turn).
    pub fn street(&self) -> usize {
        self.table.street
    }

    #[inline]
    fn max_bet(&self) -> u64 {
        self.table.bets[0].max(self.table.bets[1])
    }

    #[inline]
    fn to_call(&self, seat: Seat) -> u64 {
        self.max_bet() - self.table.bets[seat.index()]
    }

    fn needs_action(&self, seat: Seat) -> bool {
        let t = &self.table;
        let (s, o) = (seat.index(), seat.opponent().index());
        t.folded.is_none()
            && t.stacks[s] > 0
            && (t.bets[s] < self.max_bet() || (!t.acted[s] && t.stacks[o] > 0))
    }

    fn raise_target(&self, seat: Seat) -> u64 {
        let t = &self.table;
        let (s, o) = (seat.index(), seat.opponent().index());
        (self.max_bet() + self.betting.bets[t.street])
            .min(t.bets[s] + t.stacks[s])
            .min(t.bets[o] + t.stacks[o])
    }

    fn put_in(&mut self, seat: Seat, amount: u64) {
        let i = seat.index();
        self.table.stacks[i] -= amount;
        self.table.bets[i] += amount;
        self.table.committed[i] += amount;
    }

    fn start_round(&mut self) {
        self.table.phase = Phase::Betting;
        self.table.bets = [0; 2];
        self.table.acted = [false; 2];
        self.table.completions = 0;
        self.table.actor = Seat::ALL.into_iter().find(|&seat| self.needs_action(seat));
        if self.table.actor.is_none() {
            self.close_round();
        }
    }

    fn pass_action(&mut self, from: Seat) {
        let next = from.opponent();
        if self.needs_action(next) {
            self.table.actor = Some(next);
        } else if self.needs_action(from) {
            self.table.actor = Some(from);
        } else {
            self.close_round();
        }
    }

    fn close_round(&mut self) {
        self.table.bets = [0; 2];
        self.table.actor = None;
        self.table.phase = if self.table.street + 1 >= self.betting.bets.len() {
            Phase::Over
        } else {
            Phase::CardBurning
        };
    }
}

impl RulesEngine for RoyalRhodeIsland {
    type Checkpoint = Checkpoint;

    fn status(&self) -> bool {
        self.table.phase != Phase::Over
    }

    fn all_in_status(&self) -> bool {
        let t = &self.table;
        self.status()
            && t.folded.is_none()
            && t.actor.is_none()
            && t.holes_dealt == 2
            && t.stacks.iter().filter(|&&s| s > 0).count() <= 1
    }

    fn folded_status(&self) -> bool {
        self.table.folded.is_some()
    }

    fn stacks(&self) -> [u64; 2] {
        self.table.stacks
    }

    fn total_pushed_amount(&self) -> u64 {
        self.table.committed.iter().sum()
    }

    fn payoff(&self, seat: Seat) -> Option<i64> {
        if self.table.phase != Phase::Over {
            return None;
        }
        let folder = self.table.folded?;
        let lost = self.table.committed[folder.index()] as i64;
        Some(if seat == folder { -lost } else { lost })
    }

    fn actor(&self) -> Option<Seat> {
        self.table.actor
    }

    fn events(&self) -> &[Event] {
        &self.events
    }

    fn can(&self, operation: Operation) -> bool {
        let t = &self.table;
        match operation {
            Operation::DealHole => t.phase == Phase::HoleDealing,
            Operation::BurnCard => t.phase == Phase::CardBurning,
            Operation::DealBoard => t.phase == Phase::BoardDealing,
            Operation::Fold => match t.actor {
                Some(seat) => self.to_call(seat) > 0,
                None => false,
            },
            Operation::CheckOrCall => t.actor.is_some(),
            Operation::CompleteBetOrRaiseTo => match t.actor {
                Some(seat) => {
                    t.completions < self.betting.max_completions
                        && t.stacks[seat.index()] > self.to_call(seat)
                        && t.stacks[seat.opponent().index()] > 0
                }
                None => false,
            },
        }
    }

    fn apply(&mut self, operation: Operation) -> Result<Checkpoint, EngineError> {
        if !self.can(operation) {
            return Err(EngineError::IllegalOperation(operation));
        }
        let checkpoint = Checkpoint {
            table: self.table,
            events: self.events.len(),
        };

        match operation {
            Operation::DealHole => {
                let seat = if self.table.holes_dealt == 0 { Seat::Row } else { Seat::Column };
                self.events.push(Event::HoleDealing(seat));
                self.table.holes_dealt += 1;
                if self.table.holes_dealt == 2 {
                    self.table.street = 0;
                    self.start_round();
                }
            }
            Operation::BurnCard => {
                self.events.push(Event::CardBurning);
                self.table.phase = Phase::BoardDealing;
            }
            Operation::DealBoard => {
                self.events.push(Event::BoardDealing);
                self.table.street += 1;
                self.start_round();
            }
            Operation::Fold => {
                if let Some(seat) = self.table.actor {
                    self.events.push(Event::Folding(seat));
                    self.table.folded = Some(seat);
                    self.table.actor = None;
                    self.table.bets = [0; 2];
                    self.table.phase = Phase::Over;
                }
            }
            Operation::CheckOrCall => {
                if let Some(seat) = self.table.actor {
                    let amount = self.to_call(seat).min(self.table.stacks[seat.index()]);
                    self.put_in(seat, amount);
                    self.table.acted[seat.index()] = true;
                    self.events.push(Event::CheckingOrCalling(seat));
                    self.pass_action(seat);
                }
            }
            Operation::CompleteBetOrRaiseTo => {
                if let Some(seat) = self.table.actor {
                    let target = self.raise_target(seat);
                    let amount = target - self.table.bets[seat.index()];
                    self.put_in(seat, amount);
                    self.table.completions += 1;
                    self.table.acted[seat.index()] = true;
                    self.events.push(Event::CompletionBettingOrRaisingTo(seat, target));
                    self.pass_action(seat);
                }
            }
        }

        Ok(checkpoint)
    }

    fn rewind(&mut self, checkpoint: Checkpoint) {
        self.table = checkpoint.table;
        self.events.truncate(checkpoint.events);
    }
}
