//! Absorbing Markov chain over (stack, seat) states.
//!
//! For `C` chips in play, state `2·stack + seat` tracks one player's stack
//! and seat. After every hand the seat flips and the stack moves by the
//! distribution of the effective stack `min(stack, C − stack, bound)`, mirrored
//! for the column seat. Stacks 0 and `C` absorb.
//!
//! The column-stochastic matrix (`P[to, from]`) is squared until the four
//! absorbing rows hold all mass in every column; the two "won" rows then give
//! each state's probability of winning every chip.

use super::matrix::Matrix;
use super::transitions::Transitions;
use super::IcmError;
use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmConfig {
    /// Effective stacks above this reuse its distribution.
    pub tractable_bound: u32,
    /// Relative tolerance of the absorption test.
    pub rtol: f64,
    /// Absolute tolerance of the absorption test.
    pub atol: f64,
    /// Squarings attempted before giving up.
    pub max_squarings: u32,
}

impl Default for IcmConfig {
    fn default() -> Self {
        Self {
            tractable_bound: 155,
            rtol: 1e-5,
            atol: 1e-8,
            max_squarings: 64,
        }
    }
}

impl IcmConfig {
    /// Set the tractable bound.
    pub fn with_tractable_bound(mut self, bound: u32) -> Self {
        self.tractable_bound = bound;
        self
    }

    /// Set the squaring budget.
    pub fn with_max_squarings(mut self, max_squarings: u32) -> Self {
        self.max_squarings = max_squarings;
        self
    }

    #[inline]
    fn is_close(&self, x: f64, target: f64) -> bool {
        (x - target).abs() <= self.atol + self.rtol * target.abs()
    }
}

/// Win probabilities per state for one chip count: index `2·stack + seat`.
pub type WinProbabilities = Vec<f64>;

/// ICM solver over a fixed transition table.
#[derive(Debug, Clone)]
pub struct IcmSolver<'a> {
    transitions: &'a Transitions,
    config: IcmConfig,
}

impl<'a> IcmSolver<'a> {
    /// Create a solver.
    pub fn new(transitions: &'a Transitions, config: IcmConfig) -> Self {
        Self { transitions, config }
    }

    /// Build the transition matrix for `chips` in play.
    pub fn build_matrix(&self, chips: u32) -> Result<Matrix, IcmError> {
        if chips == 0 {
            return Err(IcmError::InvalidChipCount(chips));
        }
        let c = chips as i64;
        let n = 2 * (chips as usize + 1);
        let mut p = Matrix::zeros(n);
        for state in [0, 1, n - 2, n - 1] {
            p[(state, state)] = 1.0;
        }

        for stack in 1..chips {
            let effective = stack.min(chips - stack).min(self.config.tractable_bound);
            let swing = self
                .transitions
                .get(effective)
                .ok_or(IcmError::MissingTransition(effective))?;
            for seat in 0..2usize {
                let from = 2 * stack as usize + seat;
                for (&delta, &probability) in swing {
                    let delta = if seat == 0 { delta } else { -delta };
                    let to_stack = stack as i64 + delta;
                    if !(0..=c).contains(&to_stack) {
                        if probability == 0.0 {
                            continue;
                        }
                        return Err(IcmError::OutOfRange { chips, stack, delta });
                    }
                    let to = 2 * to_stack as usize + (1 - seat);
                    p[(to, from)] += probability;
                }
            }
        }

        for (column, sum) in p.column_sums().into_iter().enumerate() {
            assert!(
                self.config.is_close(sum, 1.0),
                "column {} of the {}-chip chain sums to {}",
                column,
                chips,
                sum
            );
        }
        Ok(p)
    }

    /// Win probability of every state with `chips` in play.
    pub fn solve(&self, chips: u32) -> Result<WinProbabilities, IcmError> {
        let start = Instant::now();
        let mut p = self.build_matrix(chips)?;
        let n = p.size();
        let absorbing = [0, 1, n - 2, n - 1];

        let mut squarings = 0;
        while !self.is_absorbed(&p, &absorbing) {
            if squarings == self.config.max_squarings {
                return Err(IcmError::NotConverged { chips, squarings });
            }
            p = p.square();
            squarings += 1;
        }

        let won: WinProbabilities = p.row(n - 2).iter().zip(p.row(n - 1)).map(|(a, b)| a + b).collect();
        debug!(
            "{} chips: absorbed after {} squarings in {:.2?}",
            chips,
            squarings,
            start.elapsed()
        );
        Ok(won)
    }

    fn is_absorbed(&self, p: &Matrix, absorbing: &[usize; 4]) -> bool {
        (0..p.size()).all(|column| {
            let mass: f64 = absorbing.iter().map(|&r| p[(r, column)]).sum();
            self.config.is_close(mass, 1.0)
        })
    }

    /// Solve several chip counts in parallel.
    pub fn solve_all(&self, chip_counts: &[u32]) -> Result<BTreeMap<u32, WinProbabilities>, IcmError> {
        let start = Instant::now();
        let solved = chip_counts
            .par_iter()
            .map(|&chips| self.solve(chips).map(|won| (chips, won)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        info!("Solved {} chip counts in {:.2?}", solved.len(), start.elapsed());
        Ok(solved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ChipSwing;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn fair_walk(bound: u32, step_all_in: bool) -> Transitions {
        let mut t = Transitions::new();
        for stack in 1..=bound {
            let step = if step_all_in { stack as i64 } else { 1 };
            let swing: ChipSwing = [(-step, 0.5), (step, 0.5)].into_iter().collect();
            t.insert(stack, swing);
        }
        t
    }

    fn assert_linear(won: &[f64], chips: u32) {
        for stack in 0..=chips {
            for seat in 0..2 {
                let expected = stack as f64 / chips as f64;
                let actual = won[2 * stack as usize + seat];
                assert!((actual - expected).abs() < 1e-4, "stack {} seat {}: {}", stack, seat, actual);
            }
        }
    }

    #[test]
    fn test_fair_unit_walk_is_linear() {
        let t = fair_walk(10, false);
        let solver = IcmSolver::new(&t, IcmConfig::default().with_tractable_bound(10));
        let won = solver.solve(12).unwrap();
        assert_eq!(won.len(), 26);
        assert_linear(&won, 12);
    }

    #[test]
    fn test_fair_all_in_walk_is_linear() {
        let t = fair_walk(5, true);
        let solver = IcmSolver::new(&t, IcmConfig::default().with_tractable_bound(5));
        assert_linear(&solver.solve(9).unwrap(), 9);
    }

    #[test]
    fn test_boundary_states() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut t = Transitions::new();
        for stack in 1..=6u32 {
            let s = stack as i64;
            let (a, b, c): (f64, f64, f64) = (rng.gen_range(0.1..1.0), rng.gen_range(0.0..1.0), rng.gen_range(0.1..1.0));
            let total = a + b + c;
            let swing: ChipSwing = [(-s, a / total), (0, b / total), (s, c / total)].into_iter().collect();
            t.insert(stack, swing);
        }
        assert!(t.validate().is_ok());
        let solver = IcmSolver::new(&t, IcmConfig::default().with_tractable_bound(6));
        for (chips, won) in solver.solve_all(&[1, 2, 7, 10, 13]).unwrap() {
            let n = won.len();
            assert_eq!(n, 2 * (chips as usize + 1));
            assert_eq!(won[0], 0.0);
            assert_eq!(won[1], 0.0);
            assert_eq!(won[n - 2], 1.0);
            assert_eq!(won[n - 1], 1.0);
            assert!(won.iter().all(|&w| (-1e-12..=1.0 + 1e-9).contains(&w)));
        }
    }

    #[test]
    fn test_symmetry_between_seats() {
        // a biased game: the row seat wins more often
        let mut t = Transitions::new();
        for stack in 1..=4u32 {
            let s = stack as i64;
            t.insert(stack, [(-s, 0.4), (s, 0.6)].into_iter().collect());
        }
        let solver = IcmSolver::new(&t, IcmConfig::default().with_tractable_bound(4));
        let won = solver.solve(8).unwrap();
        for stack in 1..8usize {
            // my chance as seat 0 with s chips equals one minus the
            // opponent's chance as seat 1 with C - s chips
            let mine = won[2 * stack];
            let theirs = won[2 * (8 - stack) + 1];
            assert!((mine + theirs - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_errors() {
        let t = fair_walk(2, false);
        let solver = IcmSolver::new(&t, IcmConfig::default());
        assert!(matches!(solver.solve(7), Err(IcmError::MissingTransition(3))));
        assert!(matches!(solver.solve(0), Err(IcmError::InvalidChipCount(0))));

        let mut t = Transitions::new();
        t.insert(1, [(-2, 0.5), (2, 0.5)].into_iter().collect());
        let solver = IcmSolver::new(&t, IcmConfig::default());
        assert!(matches!(solver.solve(3), Err(IcmError::OutOfRange { chips: 3, stack: 1, delta: -2 })));

        let mut t = Transitions::new();
        t.insert(1, [(0, 1.0)].into_iter().collect());
        let solver = IcmSolver::new(&t, IcmConfig::default().with_max_squarings(8));
        assert!(matches!(solver.solve(2), Err(IcmError::NotConverged { chips: 2, squarings: 8 })));
    }
}
