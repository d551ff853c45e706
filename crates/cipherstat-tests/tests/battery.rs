use cipherstat_tests::{
    BatteryConfig, BitSequence, ParsePolicy, PoolConfig, SIGNIFICANCE_LEVEL, SequenceError,
    TestOutcome, run_batch, run_batch_strings, run_battery,
};
use cipherstat_tests::universal::UNIVERSAL_MIN_BITS;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_sequence(seed: u64, len: usize, p_one: f64) -> BitSequence {
    let mut rng = StdRng::seed_from_u64(seed);
    BitSequence::from_bits((0..len).map(|_| rng.random_bool(p_one)))
}

fn assert_well_formed(outcome: &TestOutcome, label: &str) {
    assert!(
        (0.0..=1.0).contains(&outcome.p_value),
        "{label}: p-value {} out of range",
        outcome.p_value
    );
    assert_eq!(
        outcome.passes,
        outcome.p_value >= SIGNIFICANCE_LEVEL,
        "{label}: verdict disagrees with p-value"
    );
}

#[test]
fn every_length_gives_a_complete_report() {
    for (seed, len) in [0, 1, 2, 50, 99, 100, 127, 128, 999, 1000, 6272, 10_000, 50_000]
        .into_iter()
        .enumerate()
    {
        let report = run_battery(&random_sequence(seed as u64, len, 0.5));
        assert_eq!(report.length, len);
        let labelled = report.labelled_outcomes();
        assert_eq!(labelled.len(), 35);
        for (label, outcome) in &labelled {
            assert_well_formed(outcome, &format!("n={len} {label}"));
        }
        assert_eq!(report.total_count(), 34);
        assert!(report.passed_count() <= 34);
    }
}

#[test]
fn short_sequences_skip_length_bound_tests() {
    let report = run_battery(&random_sequence(7, 99, 0.5));
    let degenerate = TestOutcome::degenerate();
    assert_eq!(report.block_frequency, degenerate);
    assert_eq!(report.longest_run, degenerate);
    assert_eq!(report.matrix_rank, degenerate);
    assert_eq!(report.spectral, degenerate);
    assert_eq!(report.universal, degenerate);
    assert_eq!(report.cumulative_sums, degenerate);
    assert!(report.excursion.iter().all(|(_, o)| *o == degenerate));
    assert!(report.excursion_variant.iter().all(|(_, o)| *o == degenerate));
}

#[test]
fn long_random_sequence_mostly_passes() {
    let report = run_battery(&random_sequence(0x5eed, 1_000_000, 0.5));
    let scalar = [
        report.monobit,
        report.block_frequency,
        report.runs,
        report.longest_run,
        report.matrix_rank,
        report.spectral,
        report.universal,
        report.cumulative_sums,
    ];
    let passed = scalar.iter().filter(|o| o.passes).count();
    assert!(passed >= 6, "only {passed}/8 scalar tests passed");
    assert!(report.universal.p_value > 0.0);
    assert!(report.length >= UNIVERSAL_MIN_BITS);
}

#[test]
fn biased_sequence_fails_frequency_tests() {
    let report = run_battery(&random_sequence(42, 20_000, 0.6));
    assert!(!report.monobit.passes);
    assert!(!report.cumulative_sums.passes);
    // Runs pre-test rejects before computing the statistic.
    assert!(!report.runs.passes);
}

#[test]
fn constant_sequence_fails_everything_it_can_run() {
    let report = run_battery(&BitSequence::from_bits(std::iter::repeat_n(true, 10_000)));
    assert!(!report.monobit.passes);
    assert!(!report.block_frequency.passes);
    assert!(!report.runs.passes);
    assert!(!report.longest_run.passes);
    assert!(!report.matrix_rank.passes);
    assert!(!report.cumulative_sums.passes);
    assert_eq!(report.passed_count(), 0);
}

#[test]
fn batch_preserves_input_order() {
    let samples: Vec<BitSequence> = (0..16)
        .map(|seed| random_sequence(seed, 500 + 250 * seed as usize, 0.5))
        .collect();
    let reports = run_batch(
        &samples,
        &BatteryConfig::default(),
        &PoolConfig::with_workers(3),
    );
    assert_eq!(reports.len(), samples.len());
    for (seq, report) in samples.iter().zip(&reports) {
        assert_eq!(report.length, seq.len());
        assert_eq!(report, &run_battery(seq));
    }
}

#[test]
fn strict_batch_reports_parse_errors_per_sample() {
    let good = random_sequence(3, 2_000, 0.5).to_string();
    let samples = vec![good.clone(), format!("{good}2"), good];
    let results = run_batch_strings(
        &samples,
        ParsePolicy::Strict,
        &BatteryConfig::default(),
        &PoolConfig::default(),
    );
    assert!(results[0].is_ok());
    assert_eq!(
        results[1].as_ref().err(),
        Some(&SequenceError::InvalidCharacter {
            position: 2_000,
            found: '2'
        })
    );
    assert_eq!(
        results[0].as_ref().ok(),
        results[2].as_ref().ok(),
        "identical samples must give identical reports"
    );
}
