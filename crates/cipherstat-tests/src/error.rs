//! Input malformation errors.
//!
//! Short input is never an error: every test degrades to
//! [`TestOutcome::degenerate`](crate::TestOutcome::degenerate) instead. The only
//! failure the battery reports is a source string that is not a bit string.

use thiserror::Error;

/// Failure to build a [`BitSequence`](crate::BitSequence) from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// A character other than '0' or '1' appeared under strict parsing.
    #[error("invalid character {found:?} at position {position}: expected '0' or '1'")]
    InvalidCharacter { position: usize, found: char },
}
