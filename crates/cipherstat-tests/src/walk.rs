//! Tests built on the partial-sum random walk of the sequence (0 → -1, 1 → +1):
//! cumulative sums, random excursions and the random excursion variant.

use serde::Serialize;

use crate::bits::BitSequence;
use crate::outcome::{
    EXCURSION_STATES, ExcursionReport, TestOutcome, VARIANT_STATES, VariantReport, insufficient,
};
use crate::stats::{erfc, igamc, normal_cdf};

/// Minimum length for the cumulative sums test.
pub const CUSUM_MIN_BITS: usize = 100;

/// Minimum number of excursion cycles `J` for both excursion tests.
pub const EXCURSION_MIN_CYCLES: usize = 500;

/// Direction in which the cumulative sums walk is accumulated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CusumMode {
    #[default]
    Forward,
    Backward,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Cumulative sums
// ═══════════════════════════════════════════════════════════════════════════════

/// Cumulative sums test, forward direction.
pub fn cumulative_sums(seq: &BitSequence) -> TestOutcome {
    cumulative_sums_with(seq, CusumMode::Forward)
}

/// Cumulative sums test: the largest excursion of the walk from zero should be
/// small for a random sequence.
pub fn cumulative_sums_with(seq: &BitSequence, mode: CusumMode) -> TestOutcome {
    let n = seq.len();
    if n < CUSUM_MIN_BITS {
        return insufficient("cumulative_sums", CUSUM_MIN_BITS, n);
    }
    let z = match mode {
        CusumMode::Forward => seq
            .partial_sums()
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0),
        CusumMode::Backward => {
            let mut sum = 0i64;
            let mut z = 0u64;
            for &b in seq.bits().iter().rev() {
                sum += if b == 1 { 1 } else { -1 };
                z = z.max(sum.unsigned_abs());
            }
            z
        }
    };
    let p = cusum_p_value(n, z);
    log::trace!("cumulative_sums: mode={mode:?}, z={z}, p={p:.6}");
    TestOutcome::from_p_value(p)
}

/// P-value for a walk of `n` steps whose maximum absolute partial sum is `z`.
///
/// A walk that never leaves zero is maximally consistent with randomness.
fn cusum_p_value(n: usize, z: u64) -> f64 {
    if z == 0 {
        return 1.0;
    }
    let nf = n as f64;
    let zf = z as f64;
    let sqrt_n = nf.sqrt();
    let ratio = nf / zf;
    // Summation bounds truncate toward zero.
    let start1 = ((-ratio + 1.0) / 4.0) as i64;
    let start2 = ((-ratio - 3.0) / 4.0) as i64;
    let end = ((ratio - 1.0) / 4.0) as i64;
    let term = |k: i64, hi: f64, lo: f64| {
        let kf = k as f64;
        normal_cdf((4.0 * kf + hi) * zf / sqrt_n) - normal_cdf((4.0 * kf + lo) * zf / sqrt_n)
    };
    let s1: f64 = (start1..=end).map(|k| term(k, 1.0, -1.0)).sum();
    let s2: f64 = (start2..=end).map(|k| term(k, 3.0, 1.0)).sum();
    (1.0 - s1 + s2).clamp(0.0, 1.0)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Random excursions
// ═══════════════════════════════════════════════════════════════════════════════

/// Probability that a cycle visits state `x` (given as `|x| >= 1`) exactly `k`
/// times, `k = 5` meaning five or more.
fn visit_probability(x: u32, k: usize) -> f64 {
    let x = x as f64;
    let stay = 1.0 - 1.0 / (2.0 * x);
    match k {
        0 => stay,
        k if k >= 5 => stay.powi(4) / (2.0 * x),
        _ => stay.powi(k as i32 - 1) / (4.0 * x * x),
    }
}

/// Pad the walk with a zero at each end and return it with the indices of its
/// zeros; consecutive indices bound one cycle.
fn excursion_cycles(walk: &[i64]) -> (Vec<i64>, Vec<usize>) {
    let mut extended = Vec::with_capacity(walk.len() + 2);
    extended.push(0i64);
    extended.extend_from_slice(walk);
    extended.push(0);

    let zeros = extended
        .iter()
        .enumerate()
        .filter_map(|(i, &s)| (s == 0).then_some(i))
        .collect();
    (extended, zeros)
}

/// Random excursion test over states -4..=4.
///
/// The walk is padded with a zero at each end and cut into cycles at every
/// return to zero. For each state the number of cycles visiting it 0, 1, ..., 4
/// and 5+ times is compared with its theoretical distribution; only bins whose
/// expected count reaches 5 enter the chi-square.
///
/// The trailing pad is always appended, so a walk that already ends at zero
/// gets one extra empty cycle: `J` grows by one and every state records one
/// more "0 visits" cycle.
pub fn random_excursion(seq: &BitSequence) -> ExcursionReport {
    let (extended, zeros) = excursion_cycles(seq.partial_sums());
    if zeros.len() < 2 {
        return ExcursionReport::degenerate();
    }
    let cycles = zeros.len() - 1;
    if cycles < EXCURSION_MIN_CYCLES {
        log::debug!("random_excursion: J={cycles}, need {EXCURSION_MIN_CYCLES} cycles");
        return ExcursionReport::degenerate();
    }

    // histogram[state index][visits capped at 5]
    let mut histogram = [[0u64; 6]; 9];
    for bounds in zeros.windows(2) {
        let mut visits = [0usize; 9];
        for &s in &extended[bounds[0]..=bounds[1]] {
            if (-4..=4).contains(&s) {
                visits[(s + 4) as usize] += 1;
            }
        }
        for (row, &v) in histogram.iter_mut().zip(visits.iter()) {
            row[v.min(5)] += 1;
        }
    }

    let j = cycles as f64;
    let mut report = ExcursionReport::degenerate();
    for (slot, &state) in EXCURSION_STATES.iter().enumerate() {
        if state == 0 {
            continue;
        }
        let chi2: f64 = histogram[slot]
            .iter()
            .enumerate()
            .filter_map(|(k, &observed)| {
                let expected = j * visit_probability(state.unsigned_abs(), k);
                (expected >= 5.0).then(|| (observed as f64 - expected).powi(2) / expected)
            })
            .sum();
        report.outcomes[slot] = TestOutcome::from_p_value(igamc(2.5, chi2 / 2.0));
    }
    log::trace!("random_excursion: J={cycles}, histogram={histogram:?}");
    report
}

/// Random excursion variant over states -9..=9 (0 excluded).
///
/// Counts every visit to each state across the whole walk and compares it with
/// `J`, the number of returns to zero plus one.
pub fn random_excursion_variant(seq: &BitSequence) -> VariantReport {
    let walk = seq.partial_sums();
    let j = walk.iter().filter(|&&s| s == 0).count() + 1;
    if j < EXCURSION_MIN_CYCLES {
        log::debug!("random_excursion_variant: J={j}, need {EXCURSION_MIN_CYCLES} cycles");
        return VariantReport::degenerate();
    }

    let mut visits = [0u64; 19];
    for &s in walk {
        if (-9..=9).contains(&s) {
            visits[(s + 9) as usize] += 1;
        }
    }

    let jf = j as f64;
    let mut report = VariantReport::degenerate();
    for (slot, &state) in VARIANT_STATES.iter().enumerate() {
        let variance = 2.0 * jf * (4.0 * state.unsigned_abs() as f64 - 2.0);
        if variance <= 0.0 {
            continue;
        }
        let count = visits[(state + 9) as usize] as f64;
        report.outcomes[slot] = TestOutcome::from_p_value(erfc((count - jf).abs() / variance.sqrt()));
    }
    log::trace!("random_excursion_variant: J={j}");
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const NIST_100: &str = "1100100100001111110110101010001000100001011010001100001000110100110001001100011001100010100010111000";

    #[test]
    fn cusum_matches_published_example() {
        let seq = BitSequence::parse(NIST_100).unwrap();
        let forward = cumulative_sums(&seq);
        assert!((forward.p_value - 0.219_194).abs() < 1e-6);
        let backward = cumulative_sums_with(&seq, CusumMode::Backward);
        assert!((backward.p_value - 0.114_866).abs() < 1e-6);
    }

    #[test]
    fn cusum_small_walk_p_value() {
        // NIST 2.13.4: epsilon = 1011010111, z = 4, p = 0.411658
        assert!((cusum_p_value(10, 4) - 0.411_658).abs() < 1e-5);
    }

    #[test]
    fn cusum_flat_walk_is_perfect() {
        assert_eq!(cusum_p_value(500, 0), 1.0);
    }

    #[test]
    fn cusum_short_input_is_degenerate() {
        let seq = BitSequence::parse(&NIST_100[..99]).unwrap();
        assert_eq!(cumulative_sums(&seq), TestOutcome::degenerate());
    }

    #[test]
    fn cusum_drifting_walk_fails() {
        let seq = BitSequence::parse(&"1".repeat(400)).unwrap();
        assert!(!cumulative_sums(&seq).passes);
    }

    #[test]
    fn visit_probabilities_sum_to_one() {
        for x in 1..=4 {
            let total: f64 = (0..=5).map(|k| visit_probability(x, k)).sum();
            assert!((total - 1.0).abs() < 1e-12, "state {x}: {total}");
        }
    }

    #[test]
    fn walk_ending_at_zero_gets_an_empty_cycle() {
        // Walk 1,0,1,0 -> 0,1,0,1,0,0: cycles [0..2], [2..4] and the empty [4..5].
        let seq = BitSequence::parse("1010").unwrap();
        let (extended, zeros) = excursion_cycles(seq.partial_sums());
        assert_eq!(extended, vec![0, 1, 0, 1, 0, 0]);
        assert_eq!(zeros, vec![0, 2, 4, 5]);

        // Ending away from zero: the pad closes the last cycle only.
        let seq = BitSequence::parse("101").unwrap();
        let (_, zeros) = excursion_cycles(seq.partial_sums());
        assert_eq!(zeros, vec![0, 2, 4]);
    }

    #[test]
    fn excursion_too_few_cycles_is_degenerate() {
        let seq = BitSequence::parse(&"10".repeat(400)).unwrap();
        assert_eq!(random_excursion(&seq), ExcursionReport::degenerate());
        assert_eq!(random_excursion(&BitSequence::default()), ExcursionReport::degenerate());
    }

    #[test]
    fn excursion_on_bouncing_walk() {
        // Walk 1,0,1,0,...: every cycle visits +1 exactly once and nothing else.
        let seq = BitSequence::parse(&"10".repeat(600)).unwrap();
        let report = random_excursion(&seq);
        assert_eq!(report.state(0), Some(&TestOutcome::degenerate()));
        for (state, outcome) in report.iter() {
            assert!((0.0..=1.0).contains(&outcome.p_value));
            assert!(!outcome.passes, "state {state} unexpectedly passed");
        }
    }

    #[test]
    fn variant_too_few_cycles_is_degenerate() {
        let seq = BitSequence::parse(&"01".repeat(498)).unwrap();
        assert_eq!(random_excursion_variant(&seq), VariantReport::degenerate());
    }

    #[test]
    fn variant_on_bouncing_walk() {
        // J = 601; state +1 is visited 600 times, every other state never.
        let seq = BitSequence::parse(&"10".repeat(600)).unwrap();
        let report = random_excursion_variant(&seq);
        assert!(report.state(1).is_some_and(|o| o.passes));
        for (state, outcome) in report.iter().filter(|&(s, _)| s != 1) {
            assert!(!outcome.passes, "state {state} unexpectedly passed");
        }
    }
}
