//! Discrete Fourier transform (spectral) test.

use rustfft::{FftPlanner, num_complex::Complex};

use crate::bits::BitSequence;
use crate::outcome::{TestOutcome, insufficient};
use crate::stats::erfc;

/// Minimum length for the spectral test.
pub const SPECTRAL_MIN_BITS: usize = 1000;

/// Spectral test: detect periodic features through the share of DFT peaks
/// below the 95 % threshold `sqrt(ln(1/0.05) * n)` in the first half of the
/// spectrum.
pub fn spectral(seq: &BitSequence) -> TestOutcome {
    let n = seq.len();
    if n < SPECTRAL_MIN_BITS {
        return insufficient("spectral", SPECTRAL_MIN_BITS, n);
    }

    let mut buffer: Vec<Complex<f64>> = seq
        .bits()
        .iter()
        .map(|&b| Complex {
            re: if b == 1 { 1.0 } else { -1.0 },
            im: 0.0,
        })
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let nf = n as f64;
    let threshold = ((1.0f64 / 0.05).ln() * nf).sqrt();
    let n0 = 0.95 * nf / 2.0;
    let n1 = buffer[..n / 2]
        .iter()
        .filter(|c| c.norm() < threshold)
        .count() as f64;
    let d = (n1 - n0) / (nf * 0.95 * 0.05 / 4.0).sqrt();
    let p = erfc(d.abs() / std::f64::consts::SQRT_2);
    log::trace!("spectral: N1={n1}, N0={n0:.1}, d={d:.6}");
    TestOutcome::from_p_value(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_1000_bits() {
        let seq = BitSequence::from_bits((0..999).map(|i| i % 2 == 0));
        assert_eq!(spectral(&seq), TestOutcome::degenerate());
    }

    #[test]
    fn periodic_input_fails() {
        // A strong period concentrates energy in a handful of bins.
        let seq = BitSequence::from_bits((0..4096).map(|i| (i / 4) % 2 == 0));
        let outcome = spectral(&seq);
        assert!(!outcome.passes);
    }

    #[test]
    fn constant_input_fails() {
        let seq = BitSequence::from_bits(std::iter::repeat_n(true, 2048));
        assert!(!spectral(&seq).passes);
    }

    #[test]
    fn p_value_in_range_for_odd_length() {
        let seq = BitSequence::from_bits((0..1001u64).map(|i| (i * i + 3 * i) % 7 < 3));
        let outcome = spectral(&seq);
        assert!((0.0..=1.0).contains(&outcome.p_value));
    }
}
