//! Maurer's universal statistical test.
//!
//! The sequence is cut into non-overlapping `L`-bit blocks. The first
//! `Q = 10 * 2^L` blocks only seed a table of last positions; for each of the
//! remaining `K` blocks the log2 distance to the previous occurrence of the same
//! value is accumulated. A compressible sequence has short distances and a mean
//! well below the tabulated expectation for its `L`.

use crate::bits::BitSequence;
use crate::outcome::{TestOutcome, insufficient};
use crate::stats::erfc;

/// `(minimum n, L)` pairs, ascending. Below the first entry the test does not run.
const BLOCK_LENGTHS: [(usize, usize); 11] = [
    (387_840, 6),
    (904_960, 7),
    (2_068_480, 8),
    (4_654_080, 9),
    (10_342_400, 10),
    (22_753_280, 11),
    (49_643_520, 12),
    (107_560_960, 13),
    (231_669_760, 14),
    (496_435_200, 15),
    (1_059_061_760, 16),
];

/// Expected value of the statistic for L = 6..=16.
const EXPECTED: [f64; 11] = [
    5.2177052, 6.1962507, 7.1836656, 8.1764248, 9.1723243, 10.170032, 11.168765, 12.168070,
    13.167693, 14.167488, 15.167379,
];

/// Variance of a single log-distance for L = 6..=16.
const VARIANCE: [f64; 11] = [
    2.954, 3.125, 3.238, 3.311, 3.356, 3.384, 3.401, 3.410, 3.416, 3.419, 3.421,
];

/// Minimum length for the universal test.
pub const UNIVERSAL_MIN_BITS: usize = BLOCK_LENGTHS[0].0;

/// Block length `L` chosen for a sequence of `n` bits.
pub fn block_length(n: usize) -> Option<usize> {
    BLOCK_LENGTHS
        .iter()
        .rev()
        .find(|&&(min_n, _)| n >= min_n)
        .map(|&(_, l)| l)
}

/// Maurer's universal statistical test.
pub fn universal(seq: &BitSequence) -> TestOutcome {
    let n = seq.len();
    let Some(l) = block_length(n) else {
        return insufficient("universal", UNIVERSAL_MIN_BITS, n);
    };
    let q = 10 * (1usize << l);
    let total_blocks = n / l;
    if total_blocks <= q {
        return insufficient("universal", (q + 1) * l, n);
    }
    let k = total_blocks - q;

    let bits = seq.bits();
    let block_value = |i: usize| {
        bits[i * l..(i + 1) * l]
            .iter()
            .fold(0usize, |acc, &b| (acc << 1) | b as usize)
    };

    // Positions are 1-based so that 0 means "not seen yet".
    let mut last_seen = vec![0usize; 1 << l];
    for i in 0..q {
        last_seen[block_value(i)] = i + 1;
    }

    let mut log_sum = 0.0f64;
    let mut distances = 0usize;
    for i in q..q + k {
        let value = block_value(i);
        let previous = last_seen[value];
        if previous > 0 {
            log_sum += ((i + 1 - previous) as f64).log2();
            distances += 1;
        }
        last_seen[value] = i + 1;
    }
    if distances == 0 {
        return TestOutcome::degenerate();
    }

    let fn_value = log_sum / distances as f64;
    let lf = l as f64;
    let kf = k as f64;
    let c = 0.7 - 0.8 / lf + (4.0 + 32.0 / lf) * kf.powf(-3.0 / lf) / 15.0;
    let sigma = c * (VARIANCE[l - 6] / kf).sqrt();
    if sigma <= 0.0 {
        return TestOutcome::degenerate();
    }
    let stat = (fn_value - EXPECTED[l - 6]).abs() / (std::f64::consts::SQRT_2 * sigma);
    log::trace!("universal: L={l}, Q={q}, K={k}, fn={fn_value:.6}");
    TestOutcome::from_p_value(erfc(stat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_length_table() {
        assert_eq!(block_length(0), None);
        assert_eq!(block_length(387_839), None);
        assert_eq!(block_length(387_840), Some(6));
        assert_eq!(block_length(904_959), Some(6));
        assert_eq!(block_length(904_960), Some(7));
        assert_eq!(block_length(1_059_061_760), Some(16));
        assert_eq!(block_length(usize::MAX), Some(16));
    }

    #[test]
    fn short_input_is_degenerate() {
        let seq = BitSequence::from_bits((0..100_000).map(|i| i % 3 == 1));
        assert_eq!(universal(&seq), TestOutcome::degenerate());
    }

    #[test]
    fn constant_input_fails() {
        // Every block repeats its predecessor: all distances are 1, fn = 0.
        let seq = BitSequence::from_bits(std::iter::repeat_n(false, UNIVERSAL_MIN_BITS));
        let outcome = universal(&seq);
        assert!(!outcome.passes);
        assert!(outcome.p_value < 1e-10);
    }

    #[test]
    fn short_period_fails() {
        let seq = BitSequence::from_bits((0..UNIVERSAL_MIN_BITS + 17).map(|i| i % 5 < 2));
        assert!(!universal(&seq).passes);
    }
}
