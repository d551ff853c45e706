use cipherstat_tests::{
    BitSequence, CusumMode, SequenceError, TestOutcome, block_frequency_with, cumulative_sums_with,
    longest_run, monobit, runs,
};

/// 100-bit worked example (binary expansion of e).
const E_100: &str = "1100100100001111110110101010001000100001011010001100001000110100110001001100011001100010100010111000";

/// 128-bit worked example of the longest-run test.
const LONGEST_RUN_128: &str = "11001100000101010110110001001100111000000000001001001101010100010001001111010110100000001101011111001100111001101101100010110010";

/// A published p-value next to the one the battery computes.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCheck {
    pub name: &'static str,
    pub published: f64,
    pub observed: f64,
    pub tolerance: f64,
}

impl ReferenceCheck {
    pub fn matches(&self) -> bool {
        (self.observed - self.published).abs() <= self.tolerance
    }
}

fn check(
    name: &'static str,
    input: &str,
    published: f64,
    tolerance: f64,
    test: impl Fn(&BitSequence) -> TestOutcome,
) -> Result<ReferenceCheck, SequenceError> {
    let seq = BitSequence::parse(input)?;
    Ok(ReferenceCheck {
        name,
        published,
        observed: test(&seq).p_value,
        tolerance,
    })
}

/// Every worked example, evaluated.
pub fn reference_checks() -> Result<Vec<ReferenceCheck>, SequenceError> {
    // The published longest-run value carries table rounding.
    Ok(vec![
        check("monobit", E_100, 0.109_599, 1e-6, monobit)?,
        check("block_frequency (M=10)", E_100, 0.706_438, 1e-6, |s| {
            block_frequency_with(s, 10)
        })?,
        check("runs", E_100, 0.500_798, 1e-6, runs)?,
        check("longest_run", LONGEST_RUN_128, 0.180_609, 1e-4, longest_run)?,
        check("cumulative_sums (forward)", E_100, 0.219_194, 1e-6, |s| {
            cumulative_sums_with(s, CusumMode::Forward)
        })?,
        check("cumulative_sums (backward)", E_100, 0.114_866, 1e-6, |s| {
            cumulative_sums_with(s, CusumMode::Backward)
        })?,
    ])
}

pub fn run() {
    let checks = match reference_checks() {
        Ok(checks) => checks,
        Err(e) => {
            eprintln!("Reference vector is malformed: {e}");
            std::process::exit(1);
        }
    };

    println!("NIST SP 800-22 worked examples\n");
    println!(
        "{:<30} {:>10} {:>10} {:>10}",
        "Test", "Published", "Observed", "Match"
    );
    println!("{}", "-".repeat(64));
    for c in &checks {
        println!(
            "  {:<28} {:>10.6} {:>10.6} {:>10}",
            c.name,
            c.published,
            c.observed,
            if c.matches() { "ok" } else { "MISMATCH" }
        );
    }

    let failed = checks.iter().filter(|c| !c.matches()).count();
    if failed > 0 {
        eprintln!("\n{failed} reference value(s) not reproduced");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vectors_reproduce() {
        let checks = reference_checks().unwrap();
        assert_eq!(checks.len(), 6);
        for c in &checks {
            assert!(c.matches(), "{}: observed {} vs {}", c.name, c.observed, c.published);
        }
    }

    #[test]
    fn test_mismatch_detected() {
        let c = ReferenceCheck {
            name: "x",
            published: 0.5,
            observed: 0.4,
            tolerance: 1e-6,
        };
        assert!(!c.matches());
    }
}
