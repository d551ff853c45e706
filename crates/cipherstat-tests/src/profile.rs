//! Descriptive statistics over the bit and byte views of a sequence.
//!
//! These carry no pass/fail verdict; they sit next to the battery results so a
//! report shows how biased the raw material was.

use serde::Serialize;

use crate::bits::BitSequence;

/// Entropy and byte-distribution summary of one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SequenceProfile {
    /// Shannon entropy of the bit distribution (max 1.0).
    pub bit_entropy: f64,
    /// Shannon entropy of the packed byte distribution (max 8.0).
    pub byte_entropy: f64,
    /// Chi-square of the byte histogram against a uniform distribution.
    pub byte_chi_square: f64,
    /// Relative frequency of the most common byte value.
    pub max_byte_probability: f64,
}

fn shannon(counts: impl Iterator<Item = u64>, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    counts
        .filter(|&c| c > 0)
        .map(|c| {
            let p = c as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

impl SequenceProfile {
    /// Profile a sequence. The byte statistics include the zero padding of the
    /// final partial byte.
    pub fn of(seq: &BitSequence) -> Self {
        let ones = seq.ones_count() as u64;
        let n = seq.len() as u64;
        let bit_entropy = shannon([n - ones, ones].into_iter(), n);

        let hist = seq.byte_counts();
        let bytes = seq.packed().len() as u64;
        if bytes == 0 {
            return Self {
                bit_entropy,
                byte_entropy: 0.0,
                byte_chi_square: 0.0,
                max_byte_probability: 0.0,
            };
        }
        let expected = bytes as f64 / 256.0;
        let byte_chi_square = hist
            .iter()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff / expected
            })
            .sum();
        let max_count = hist.iter().copied().max().unwrap_or(0);
        Self {
            bit_entropy,
            byte_entropy: shannon(hist.iter().copied(), bytes),
            byte_chi_square,
            max_byte_probability: max_count as f64 / bytes as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_profile() {
        let profile = SequenceProfile::of(&BitSequence::default());
        assert_eq!(profile.bit_entropy, 0.0);
        assert_eq!(profile.byte_entropy, 0.0);
        assert_eq!(profile.max_byte_probability, 0.0);
    }

    #[test]
    fn constant_bytes() {
        let profile = SequenceProfile::of(&BitSequence::from_bytes(&[0xAA; 64]));
        assert!((profile.bit_entropy - 1.0).abs() < 1e-12);
        assert_eq!(profile.byte_entropy, 0.0);
        assert_eq!(profile.max_byte_probability, 1.0);
        // 64 in one bin, 255 empty bins, expectation 0.25 each.
        let expected = (64.0f64 - 0.25).powi(2) / 0.25 + 255.0 * 0.25;
        assert!((profile.byte_chi_square - expected).abs() < 1e-9);
    }

    #[test]
    fn every_byte_once() {
        let data: Vec<u8> = (0..=255).collect();
        let profile = SequenceProfile::of(&BitSequence::from_bytes(&data));
        assert!((profile.byte_entropy - 8.0).abs() < 1e-12);
        assert_eq!(profile.byte_chi_square, 0.0);
        assert!((profile.bit_entropy - 1.0).abs() < 1e-12);
    }
}
