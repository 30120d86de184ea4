//! Independent chip model.
//!
//! Turns one-hand chip-swing distributions into the probability of winning
//! every chip in play, by solving an absorbing Markov chain per chip count.
//!
//! ## Module Structure
//!
//! - [`transitions`]: per-effective-stack distributions, with validation and I/O
//! - [`bootstrap`]: showdown distributions for stacks too small to enumerate
//! - [`matrix`]: dense matrices with a parallel product
//! - [`solver`]: chain construction and repeated squaring

pub mod bootstrap;
pub mod matrix;
pub mod solver;
pub mod transitions;

pub use bootstrap::showdown_swing;
pub use matrix::Matrix;
pub use solver::{IcmConfig, IcmSolver, WinProbabilities};
pub use transitions::Transitions;

use std::fmt;

/// ICM errors.
#[derive(Debug, Clone, PartialEq)]
pub enum IcmError {
    /// No distribution for a required effective stack.
    MissingTransition(u32),
    /// A distribution is not a probability distribution.
    InvalidDistribution {
        /// Effective stack.
        stack: u32,
        /// What is wrong.
        reason: String,
    },
    /// A move would leave `[0, chips]`.
    OutOfRange {
        /// Chips in play.
        chips: u32,
        /// Stack moved from.
        stack: u32,
        /// Offending delta, from the moving player's point of view.
        delta: i64,
    },
    /// No chain exists for this chip count.
    InvalidChipCount(u32),
    /// The chain did not absorb within the squaring budget.
    NotConverged {
        /// Chips in play.
        chips: u32,
        /// Squarings performed.
        squarings: u32,
    },
    /// File system error.
    Io(String),
    /// Malformed JSON.
    Parse(String),
}

impl fmt::Display for IcmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcmError::MissingTransition(stack) => {
                write!(f, "No transition distribution for effective stack {}", stack)
            }
            IcmError::InvalidDistribution { stack, reason } => {
                write!(f, "Invalid distribution for stack {}: {}", stack, reason)
            }
            IcmError::OutOfRange { chips, stack, delta } => write!(
                f,
                "Delta {} from stack {} leaves [0, {}]",
                delta, stack, chips
            ),
            IcmError::InvalidChipCount(chips) => write!(f, "Invalid chip count: {}", chips),
            IcmError::NotConverged { chips, squarings } => write!(
                f,
                "{}-chip chain not absorbed after {} squarings",
                chips, squarings
            ),
            IcmError::Io(msg) => write!(f, "IO error: {}", msg),
            IcmError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for IcmError {}
