//! Terminal equity evaluation.

/// Relative distance under which a value is snapped to the nearest integer.
const SNAP_TOLERANCE: f64 = 1e-9;

/// Expected chip result of a showdown for the row seat.
///
/// Both seats start with the same stack and have each put half the pot in, so
/// the row seat's expected result is `(S - pot/2) + pot * equity - S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalEvaluator {
    starting_stack: u64,
}

impl TerminalEvaluator {
    /// Create an evaluator for hands started with `starting_stack` chips each.
    pub fn new(starting_stack: u64) -> Self {
        Self { starting_stack }
    }

    /// Starting stack of both seats.
    pub fn starting_stack(&self) -> u64 {
        self.starting_stack
    }

    /// Row seat's expected result with `pot` in the middle and showdown
    /// `equity`.
    ///
    /// Results within floating noise of an integer are snapped to it; genuine
    /// fractions are kept.
    pub fn evaluate(&self, pot: u64, equity: f64) -> f64 {
        let start = self.starting_stack as f64;
        let pot = pot as f64;
        let stack = start - pot / 2.0;
        let value = stack + pot * equity - start;
        snap(value)
    }
}

/// Snap `value` to the nearest integer when they agree to within relative
/// floating noise.
pub fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (rounded - value).abs() <= SNAP_TOLERANCE * value.abs().max(1.0) {
        rounded
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_equity_breaks_even() {
        let eval = TerminalEvaluator::new(10);
        assert_eq!(eval.evaluate(2, 0.5), 0.0);
        assert_eq!(eval.evaluate(20, 0.5), 0.0);
    }

    #[test]
    fn test_extremes() {
        let eval = TerminalEvaluator::new(10);
        assert_eq!(eval.evaluate(8, 1.0), 4.0);
        assert_eq!(eval.evaluate(8, 0.0), -4.0);
    }

    #[test]
    fn test_snapping() {
        let eval = TerminalEvaluator::new(3);
        // 0.1 + 0.2 + 0.2 is not exactly 0.5
        assert_eq!(eval.evaluate(4, 0.1 + 0.2 + 0.2), 0.0);
        assert_eq!(snap(2.0000000000001), 2.0);
        assert_eq!(snap(-0.9999999999999), -1.0);
        // genuine fractions survive
        assert_eq!(snap(0.25), 0.25);
        assert!((eval.evaluate(6, 0.6) - 0.6).abs() < 1e-12);
    }
}
