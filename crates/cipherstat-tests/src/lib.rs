//! # cipherstat-tests
//!
//! NIST SP 800-22 randomness test battery over arbitrary-length bit sequences.
//!
//! Ten tests are run against a [`BitSequence`]; each yields a p-value in
//! `[0, 1]` and a verdict at the fixed significance level of 0.01. The two
//! random excursion tests report one outcome per walk state (9 and 18 slots).
//! A test whose preconditions are not met (sequence too short, too few
//! excursion cycles) reports the degenerate outcome `(0.0, false)` instead of
//! failing, so a [`BatteryReport`] is always complete.
//!
//! ## Quick Start
//!
//! ```
//! use cipherstat_tests::{BitSequence, run_battery};
//!
//! let seq: BitSequence = "1100100100001111110110101010001000100001011010001100001000110100110001001100011001100010100010111000"
//!     .parse()
//!     .unwrap();
//! let report = run_battery(&seq);
//! assert!(report.monobit.passes);
//! assert!(!report.spectral.passes); // needs 1000 bits
//! ```
//!
//! Many samples are tested in parallel with [`run_batch`] or
//! [`run_batch_strings`]; reports come back in input order.

pub mod battery;
pub mod bits;
pub mod error;
pub mod frequency;
pub mod matrix;
pub mod outcome;
pub mod pool;
pub mod profile;
pub mod spectral;
pub mod stats;
pub mod universal;
pub mod walk;

pub use battery::{
    BatteryConfig, BatteryReport, TEST_NAMES, TestResult, run_battery, run_battery_with,
};
pub use bits::BitSequence;
pub use error::SequenceError;
pub use frequency::{block_frequency, block_frequency_with, longest_run, monobit, runs};
pub use matrix::binary_matrix_rank;
pub use outcome::{
    EXCURSION_STATES, ExcursionReport, SIGNIFICANCE_LEVEL, TestOutcome, VARIANT_STATES,
    VariantReport,
};
pub use pool::{ParsePolicy, PoolConfig, run_batch, run_batch_strings};
pub use profile::SequenceProfile;
pub use spectral::spectral;
pub use universal::universal;
pub use walk::{
    CusumMode, cumulative_sums, cumulative_sums_with, random_excursion, random_excursion_variant,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
