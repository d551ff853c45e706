//! Special functions shared by the tests.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

pub use statrs::function::erf::erfc;

/// Regularized upper incomplete gamma function `Q(a, x)`.
///
/// Evaluated as the survival function of a chi-square distribution with `2a`
/// degrees of freedom at `2x`. `Q(a, x) = 1` for `x <= 0`.
pub fn igamc(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    match ChiSquared::new(2.0 * a) {
        Ok(dist) => dist.sf(2.0 * x),
        Err(_) => 0.0,
    }
}

/// Standard normal cumulative distribution function.
pub fn normal_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Pearson chi-square of `observed` counts against `expected` counts.
///
/// Bins with a non-positive expectation are skipped.
pub fn chi_square(observed: &[u64], expected: &[f64]) -> f64 {
    observed
        .iter()
        .zip(expected)
        .filter(|&(_, &e)| e > 0.0)
        .map(|(&o, &e)| {
            let diff = o as f64 - e;
            diff * diff / e
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn igamc_matches_closed_forms() {
        // Q(1, x) = exp(-x)
        assert!((igamc(1.0, 2.0) - (-2.0f64).exp()).abs() < 1e-12);
        // Q(1/2, x) = erfc(sqrt(x))
        assert!((igamc(0.5, 0.7) - erfc(0.7f64.sqrt())).abs() < 1e-10);
    }

    #[test]
    fn igamc_at_zero_is_one() {
        assert_eq!(igamc(2.5, 0.0), 1.0);
        assert_eq!(igamc(5.0, -3.0), 1.0);
    }

    #[test]
    fn normal_cdf_is_symmetric() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-15);
        assert!((normal_cdf(1.3) + normal_cdf(-1.3) - 1.0).abs() < 1e-12);
        assert!((normal_cdf(1.959_963_985) - 0.975).abs() < 1e-8);
    }

    #[test]
    fn chi_square_skips_empty_bins() {
        let chi2 = chi_square(&[12, 8, 3], &[10.0, 10.0, 0.0]);
        assert!((chi2 - 0.8).abs() < 1e-12);
    }
}
