//! Result types produced by the individual tests.

use serde::Serialize;

/// Fixed significance level: a p-value at or above it passes.
pub const SIGNIFICANCE_LEVEL: f64 = 0.01;

/// Walk states reported by the random excursion test, in report order.
pub const EXCURSION_STATES: [i32; 9] = [-4, -3, -2, -1, 0, 1, 2, 3, 4];

/// Walk states reported by the random excursion variant test, in report order.
pub const VARIANT_STATES: [i32; 18] = [
    -9, -8, -7, -6, -5, -4, -3, -2, -1, 1, 2, 3, 4, 5, 6, 7, 8, 9,
];

/// A p-value and the verdict at [`SIGNIFICANCE_LEVEL`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestOutcome {
    pub p_value: f64,
    pub passes: bool,
}

impl TestOutcome {
    /// Build an outcome from a raw p-value, clamping it into `[0, 1]`.
    ///
    /// NaN maps to 0 so that a numerically broken statistic fails closed.
    pub fn from_p_value(p: f64) -> Self {
        let p_value = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        Self {
            p_value,
            passes: p_value >= SIGNIFICANCE_LEVEL,
        }
    }

    /// The fixed `(0.0, false)` result for unmet length preconditions.
    pub const fn degenerate() -> Self {
        Self {
            p_value: 0.0,
            passes: false,
        }
    }
}

/// Degenerate outcome for a test whose length precondition is unmet.
pub(crate) fn insufficient(test: &str, needed: usize, got: usize) -> TestOutcome {
    log::debug!("{test}: insufficient data, need {needed} bits, got {got}");
    TestOutcome::degenerate()
}

/// Per-state outcomes of the random excursion test (states -4..=4).
///
/// The slot for state 0 is never evaluated and always holds the degenerate outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExcursionReport {
    pub outcomes: [TestOutcome; 9],
}

impl ExcursionReport {
    pub const fn degenerate() -> Self {
        Self {
            outcomes: [TestOutcome::degenerate(); 9],
        }
    }

    /// Outcome for a walk state, `None` outside -4..=4.
    pub fn state(&self, x: i32) -> Option<&TestOutcome> {
        EXCURSION_STATES
            .iter()
            .position(|&s| s == x)
            .map(|i| &self.outcomes[i])
    }

    /// `(state, outcome)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &TestOutcome)> {
        EXCURSION_STATES.iter().copied().zip(self.outcomes.iter())
    }
}

/// Per-state outcomes of the random excursion variant test (states -9..=9 except 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariantReport {
    pub outcomes: [TestOutcome; 18],
}

impl VariantReport {
    pub const fn degenerate() -> Self {
        Self {
            outcomes: [TestOutcome::degenerate(); 18],
        }
    }

    /// Outcome for a walk state, `None` for 0 or outside -9..=9.
    pub fn state(&self, x: i32) -> Option<&TestOutcome> {
        VARIANT_STATES
            .iter()
            .position(|&s| s == x)
            .map(|i| &self.outcomes[i])
    }

    /// `(state, outcome)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &TestOutcome)> {
        VARIANT_STATES.iter().copied().zip(self.outcomes.iter())
    }
}
