//! Frequency and run-structure tests: monobit, block frequency, runs and
//! longest run of ones in a block.

use crate::bits::BitSequence;
use crate::outcome::{TestOutcome, insufficient};
use crate::stats::{chi_square, erfc, igamc};

/// Default block length `M` for [`block_frequency`].
pub const DEFAULT_BLOCK_SIZE: usize = 128;

// ═══════════════════════════════════════════════════════════════════════════════
// Frequency
// ═══════════════════════════════════════════════════════════════════════════════

/// Monobit frequency: the proportion of ones should be close to 1/2.
pub fn monobit(seq: &BitSequence) -> TestOutcome {
    let n = seq.len();
    if n == 0 {
        return insufficient("monobit", 1, 0);
    }
    let s_obs = (2.0 * seq.ones_count() as f64 - n as f64).abs() / (n as f64).sqrt();
    let p = erfc(s_obs / std::f64::consts::SQRT_2);
    log::trace!("monobit: s_obs={s_obs:.6}, p={p:.6}");
    TestOutcome::from_p_value(p)
}

/// Block frequency with the default block length of 128 bits.
pub fn block_frequency(seq: &BitSequence) -> TestOutcome {
    block_frequency_with(seq, DEFAULT_BLOCK_SIZE)
}

/// Block frequency: proportion of ones inside each `block_size`-bit block.
///
/// Trailing bits that do not fill a block are ignored.
pub fn block_frequency_with(seq: &BitSequence, block_size: usize) -> TestOutcome {
    let n = seq.len();
    if block_size == 0 || n < block_size {
        return insufficient("block_frequency", block_size.max(1), n);
    }
    let m = block_size as f64;
    let num_blocks = n / block_size;
    let chi2: f64 = seq
        .bits()
        .chunks_exact(block_size)
        .map(|block| {
            let ones: usize = block.iter().map(|&b| b as usize).sum();
            let pi = ones as f64 / m;
            4.0 * m * (pi - 0.5) * (pi - 0.5)
        })
        .sum();
    let p = igamc(num_blocks as f64 / 2.0, chi2 / 2.0);
    log::trace!("block_frequency: N={num_blocks}, M={block_size}, chi2={chi2:.6}");
    TestOutcome::from_p_value(p)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runs
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs test: total number of maximal runs of identical bits.
///
/// Fails outright when the proportion of ones is already too far from 1/2 for
/// the run count to be meaningful.
pub fn runs(seq: &BitSequence) -> TestOutcome {
    let n = seq.len();
    if n < 2 {
        return insufficient("runs", 2, n);
    }
    let nf = n as f64;
    let ones = seq.ones_count();
    let pi = ones as f64 / nf;
    // |pi - 1/2| >= 2/sqrt(n), squared and scaled to integers.
    let excess = (2 * ones as i128 - n as i128).unsigned_abs();
    if excess * excess >= 16 * n as u128 {
        log::trace!("runs: frequency pre-test failed, pi={pi:.4}");
        return TestOutcome::degenerate();
    }
    let spread = pi * (1.0 - pi);
    if spread <= 0.0 {
        return TestOutcome::degenerate();
    }
    let bits = seq.bits();
    let v_obs = 1 + bits.windows(2).filter(|w| w[0] != w[1]).count();
    let p = erfc((v_obs as f64 - 2.0 * nf * spread).abs() / (2.0 * (2.0 * nf).sqrt() * spread));
    log::trace!("runs: V={v_obs}, pi={pi:.4}, p={p:.6}");
    TestOutcome::from_p_value(p)
}

/// Block length, smallest tallied run length and category probabilities for one
/// length regime of the longest-run test.
struct RunRegime {
    block_size: usize,
    min_run: usize,
    probabilities: &'static [f64],
}

const SHORT_REGIME: RunRegime = RunRegime {
    block_size: 8,
    min_run: 1,
    probabilities: &[0.2148, 0.3672, 0.2305, 0.1875],
};

const MEDIUM_REGIME: RunRegime = RunRegime {
    block_size: 128,
    min_run: 4,
    probabilities: &[0.1174, 0.2430, 0.2493, 0.1752, 0.1027, 0.1124],
};

const LONG_REGIME: RunRegime = RunRegime {
    block_size: 10_000,
    min_run: 10,
    probabilities: &[0.0882, 0.2092, 0.2483, 0.1933, 0.1208, 0.0675, 0.0727],
};

/// Minimum length for the longest-run test.
pub const LONGEST_RUN_MIN_BITS: usize = 128;

fn run_regime(n: usize) -> &'static RunRegime {
    if n <= 6272 {
        &SHORT_REGIME
    } else if n <= 750_000 {
        &MEDIUM_REGIME
    } else {
        &LONG_REGIME
    }
}

fn longest_run_of_ones(block: &[u8]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for &bit in block {
        if bit == 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Longest run of ones within fixed-size blocks.
///
/// Block length and categories depend on `n`: M = 8 up to 6272 bits, M = 128 up
/// to 750 000 bits, M = 10 000 beyond. The first and last categories absorb all
/// shorter and longer runs respectively.
pub fn longest_run(seq: &BitSequence) -> TestOutcome {
    let n = seq.len();
    if n < LONGEST_RUN_MIN_BITS {
        return insufficient("longest_run", LONGEST_RUN_MIN_BITS, n);
    }
    let regime = run_regime(n);
    let k = regime.probabilities.len() - 1;
    let mut observed = vec![0u64; k + 1];
    let mut num_blocks = 0usize;
    for block in seq.bits().chunks_exact(regime.block_size) {
        let run = longest_run_of_ones(block).clamp(regime.min_run, regime.min_run + k);
        observed[run - regime.min_run] += 1;
        num_blocks += 1;
    }
    let expected: Vec<f64> = regime
        .probabilities
        .iter()
        .map(|&p| p * num_blocks as f64)
        .collect();
    let chi2 = chi_square(&observed, &expected);
    let p = igamc(k as f64 / 2.0, chi2 / 2.0);
    log::trace!(
        "longest_run: M={}, N={num_blocks}, observed={observed:?}, chi2={chi2:.6}",
        regime.block_size
    );
    TestOutcome::from_p_value(p)
}
