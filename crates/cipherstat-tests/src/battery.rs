//! Battery orchestrator: runs every test against one sequence and assembles a
//! fixed-shape report.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;

use crate::bits::BitSequence;
use crate::frequency::{DEFAULT_BLOCK_SIZE, block_frequency_with, longest_run, monobit, runs};
use crate::matrix::binary_matrix_rank;
use crate::outcome::{ExcursionReport, TestOutcome, VariantReport};
use crate::profile::SequenceProfile;
use crate::spectral::spectral;
use crate::universal::universal;
use crate::walk::{CusumMode, cumulative_sums_with, random_excursion, random_excursion_variant};

/// Names of the battery entries, in report order.
pub const TEST_NAMES: [&str; 10] = [
    "monobit",
    "block_frequency",
    "runs",
    "longest_run",
    "matrix_rank",
    "spectral",
    "universal",
    "cumulative_sums",
    "excursion",
    "excursion_variant",
];

/// Tunable parameters of the battery. The significance level is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatteryConfig {
    /// Block length `M` of the block frequency test.
    pub block_frequency_block_size: usize,
    /// Direction of the cumulative sums walk.
    pub cusum_mode: CusumMode,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            block_frequency_block_size: DEFAULT_BLOCK_SIZE,
            cusum_mode: CusumMode::Forward,
        }
    }
}

/// Result of one named battery entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TestResult {
    Outcome(TestOutcome),
    Excursion(ExcursionReport),
    ExcursionVariant(VariantReport),
}

/// Every battery result for one sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryReport {
    /// Number of bits tested.
    pub length: usize,
    pub monobit: TestOutcome,
    pub block_frequency: TestOutcome,
    pub runs: TestOutcome,
    pub longest_run: TestOutcome,
    pub matrix_rank: TestOutcome,
    pub spectral: TestOutcome,
    pub universal: TestOutcome,
    pub cumulative_sums: TestOutcome,
    pub excursion: ExcursionReport,
    pub excursion_variant: VariantReport,
    pub profile: SequenceProfile,
}

impl BatteryReport {
    /// Named entries in [`TEST_NAMES`] order.
    pub fn entries(&self) -> [(&'static str, TestResult); 10] {
        use TestResult::{Excursion, ExcursionVariant, Outcome};
        [
            (TEST_NAMES[0], Outcome(self.monobit)),
            (TEST_NAMES[1], Outcome(self.block_frequency)),
            (TEST_NAMES[2], Outcome(self.runs)),
            (TEST_NAMES[3], Outcome(self.longest_run)),
            (TEST_NAMES[4], Outcome(self.matrix_rank)),
            (TEST_NAMES[5], Outcome(self.spectral)),
            (TEST_NAMES[6], Outcome(self.universal)),
            (TEST_NAMES[7], Outcome(self.cumulative_sums)),
            (TEST_NAMES[8], Excursion(self.excursion)),
            (TEST_NAMES[9], ExcursionVariant(self.excursion_variant)),
        ]
    }

    /// Every outcome slot with a stable flat label, e.g. `runs`,
    /// `excursion[-4]`, `excursion_variant[9]`. Always 35 entries.
    pub fn labelled_outcomes(&self) -> Vec<(String, TestOutcome)> {
        let mut out = Vec::with_capacity(35);
        for (name, result) in self.entries() {
            match result {
                TestResult::Outcome(o) => out.push((name.to_string(), o)),
                TestResult::Excursion(report) => {
                    out.extend(report.iter().map(|(x, o)| (format!("{name}[{x}]"), *o)));
                }
                TestResult::ExcursionVariant(report) => {
                    out.extend(report.iter().map(|(x, o)| (format!("{name}[{x}]"), *o)));
                }
            }
        }
        out
    }

    /// Labelled outcomes that carry a verdict: every slot except the
    /// unevaluated excursion state 0 placeholder. Always 34 entries.
    pub fn scored_outcomes(&self) -> Vec<(String, TestOutcome)> {
        let mut out = self.labelled_outcomes();
        out.retain(|(label, _)| label != "excursion[0]");
        out
    }

    /// Number of scored slots that pass.
    pub fn passed_count(&self) -> usize {
        self.scored_outcomes()
            .iter()
            .filter(|(_, o)| o.passes)
            .count()
    }

    /// Number of scored slots (34).
    pub fn total_count(&self) -> usize {
        self.scored_outcomes().len()
    }
}

/// Run `test`, turning a panic into the degenerate result so one broken test
/// never takes the rest of the report with it.
fn guarded<T>(name: &str, fallback: T, test: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(test)) {
        Ok(result) => result,
        Err(_) => {
            log::error!("{name}: test panicked, reporting degenerate result");
            fallback
        }
    }
}

/// Run the complete battery with the default configuration.
pub fn run_battery(seq: &BitSequence) -> BatteryReport {
    run_battery_with(seq, &BatteryConfig::default())
}

/// Run the complete battery. Every entry is present whatever the length of
/// `seq`; tests whose preconditions are unmet report `(0.0, false)`.
pub fn run_battery_with(seq: &BitSequence, config: &BatteryConfig) -> BatteryReport {
    let degenerate = TestOutcome::degenerate();
    let report = BatteryReport {
        length: seq.len(),
        monobit: guarded("monobit", degenerate, || monobit(seq)),
        block_frequency: guarded("block_frequency", degenerate, || {
            block_frequency_with(seq, config.block_frequency_block_size)
        }),
        runs: guarded("runs", degenerate, || runs(seq)),
        longest_run: guarded("longest_run", degenerate, || longest_run(seq)),
        matrix_rank: guarded("matrix_rank", degenerate, || binary_matrix_rank(seq)),
        spectral: guarded("spectral", degenerate, || spectral(seq)),
        universal: guarded("universal", degenerate, || universal(seq)),
        cumulative_sums: guarded("cumulative_sums", degenerate, || {
            cumulative_sums_with(seq, config.cusum_mode)
        }),
        excursion: guarded("excursion", ExcursionReport::degenerate(), || {
            random_excursion(seq)
        }),
        excursion_variant: guarded("excursion_variant", VariantReport::degenerate(), || {
            random_excursion_variant(seq)
        }),
        profile: SequenceProfile::of(seq),
    };
    log::debug!(
        "battery: n={}, passed {}/{}",
        report.length,
        report.passed_count(),
        report.total_count()
    );
    report
}
