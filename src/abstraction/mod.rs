//! Signal abstraction of the card-dealing space.
//!
//! Deals are grouped into suit-isomorphism classes per street ("signals").
//! The [`SignalTree`] holds, for every reachable pair of signals, the deeper
//! pairs it leads to, how likely it is to be reached and how the row seat fares
//! at showdown from it.
//!
//! ## Module Structure
//!
//! - [`signal`]: `Signal` and `SignalPair` labels
//! - [`tree`]: the enumerated `SignalTree`
//! - [`showdown`]: signal-free showdown odds for the small-stack bootstrap

pub mod showdown;
pub mod signal;
pub mod tree;

pub use showdown::ShowdownOdds;
pub use signal::{Signal, SignalPair};
pub use tree::{Outcomes, SignalId, SignalNode, SignalTree};
