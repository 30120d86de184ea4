//! Per-stack chip-swing tables.

use super::IcmError;
use crate::abstraction::ShowdownOdds;
use crate::compiler::ChipSwing;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Allowed distance of a distribution's total mass from 1.
const MASS_TOLERANCE: f64 = 1e-6;

/// One-hand chip-swing distribution per effective stack.
///
/// Deltas are from the row seat's point of view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transitions {
    by_stack: BTreeMap<u32, ChipSwing>,
}

impl Transitions {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from per-stack distributions.
    pub fn from_map(by_stack: BTreeMap<u32, ChipSwing>) -> Self {
        Self { by_stack }
    }

    /// Load from a JSON file (`{"<stack>": {"<delta>": probability}}`).
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, IcmError> {
        let file = File::open(path.as_ref()).map_err(|e| IcmError::Io(e.to_string()))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| IcmError::Parse(e.to_string()))
    }

    /// Parse from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, IcmError> {
        serde_json::from_str(json).map_err(|e| IcmError::Parse(e.to_string()))
    }

    /// Save as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), IcmError> {
        let file = File::create(path.as_ref()).map_err(|e| IcmError::Io(e.to_string()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| IcmError::Io(e.to_string()))
    }

    /// Set the distribution of one effective stack.
    pub fn insert(&mut self, stack: u32, swing: ChipSwing) {
        self.by_stack.insert(stack, swing);
    }

    /// Distribution of one effective stack.
    pub fn get(&self, stack: u32) -> Option<&ChipSwing> {
        self.by_stack.get(&stack)
    }

    /// Smallest stack present.
    pub fn min_stack(&self) -> Option<u32> {
        self.by_stack.keys().next().copied()
    }

    /// Largest stack present.
    pub fn max_stack(&self) -> Option<u32> {
        self.by_stack.keys().next_back().copied()
    }

    /// Number of stacks present.
    pub fn len(&self) -> usize {
        self.by_stack.len()
    }

    /// Check if no stack is present.
    pub fn is_empty(&self) -> bool {
        self.by_stack.is_empty()
    }

    /// Iterate in stack order.
    pub fn iter(&self) -> impl Iterator<Item = (&u32, &ChipSwing)> {
        self.by_stack.iter()
    }

    /// Fill every stack below the smallest present one with the showdown
    /// bootstrap. Returns how many stacks were added.
    pub fn bootstrap_small_stacks(&mut self, odds: &ShowdownOdds) -> usize {
        let Some(below) = self.min_stack() else {
            return 0;
        };
        self.bootstrap_below(odds, below)
    }

    /// Fill stacks `1..below` that are missing with the showdown bootstrap.
    pub fn bootstrap_below(&mut self, odds: &ShowdownOdds, below: u32) -> usize {
        let mut added = 0;
        for stack in 1..below {
            if !self.by_stack.contains_key(&stack) {
                self.by_stack.insert(stack, super::bootstrap::showdown_swing(odds, stack));
                added += 1;
            }
        }
        debug!("Bootstrapped {} stacks below {}", added, below);
        added
    }

    /// Check every distribution is a probability distribution.
    pub fn validate(&self) -> Result<(), IcmError> {
        for (&stack, swing) in &self.by_stack {
            if stack == 0 {
                return Err(IcmError::InvalidDistribution {
                    stack,
                    reason: "effective stacks start at 1".to_string(),
                });
            }
            if let Some((&delta, &p)) = swing.iter().find(|(_, &p)| !(p >= 0.0) || !p.is_finite()) {
                return Err(IcmError::InvalidDistribution {
                    stack,
                    reason: format!("probability {} for delta {}", p, delta),
                });
            }
            let total: f64 = swing.values().sum();
            if (total - 1.0).abs() > MASS_TOLERANCE {
                return Err(IcmError::InvalidDistribution {
                    stack,
                    reason: format!("probabilities sum to {}", total),
                });
            }
            if let Some((&delta, _)) = swing.iter().find(|(&d, &p)| d.unsigned_abs() > stack as u64 && p > 0.0) {
                return Err(IcmError::InvalidDistribution {
                    stack,
                    reason: format!("delta {} exceeds the stack", delta),
                });
            }
            if swing.get(&0).is_some_and(|&p| (p - 1.0).abs() <= MASS_TOLERANCE) {
                warn!("Stack {} never moves chips; chains through it cannot absorb", stack);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swing(pairs: &[(i64, f64)]) -> ChipSwing {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_json_integer_keys() {
        let t = Transitions::from_json_str(r#"{"1": {"-1": 0.4, "0": 0.2, "1": 0.4}}"#).unwrap();
        assert_eq!(t.get(1), Some(&swing(&[(-1, 0.4), (0, 0.2), (1, 0.4)])));
        assert!(t.validate().is_ok());
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(Transitions::from_json_str(&json).unwrap(), t);
    }

    #[test]
    fn test_validation_errors() {
        let mut t = Transitions::new();
        t.insert(2, swing(&[(-2, 0.5), (2, 0.4)]));
        assert!(matches!(t.validate(), Err(IcmError::InvalidDistribution { stack: 2, .. })));

        let mut t = Transitions::new();
        t.insert(2, swing(&[(-3, 0.5), (2, 0.5)]));
        assert!(matches!(t.validate(), Err(IcmError::InvalidDistribution { stack: 2, .. })));

        let mut t = Transitions::new();
        t.insert(1, swing(&[(-1, -0.5), (1, 1.5)]));
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_bootstrap_fills_below_minimum() {
        let odds = ShowdownOdds {
            wins: 3,
            ties: 2,
            losses: 3,
        };
        let mut t = Transitions::new();
        t.insert(4, swing(&[(-4, 0.5), (4, 0.5)]));
        assert_eq!(t.bootstrap_small_stacks(&odds), 3);
        assert_eq!(t.min_stack(), Some(1));
        assert_eq!(t.get(3), Some(&swing(&[(-3, 0.375), (0, 0.25), (3, 0.375)])));
        assert!(t.validate().is_ok());
        assert_eq!(Transitions::new().bootstrap_small_stacks(&odds), 0);
    }
}
