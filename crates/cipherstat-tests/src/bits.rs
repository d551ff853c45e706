//! Canonical bit sequence shared by every test in the battery.
//!
//! A [`BitSequence`] owns the unpacked bits (one `u8` per bit, values 0 or 1) as
//! the source of truth. The byte-packed view, the ones count, the byte histogram
//! and the ±1 partial-sum walk are derived on first use and memoised inside the
//! value, so a sequence can be handed to many threads at once
//! without any locking beyond the one-time initialisation.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::SequenceError;

/// Immutable binary sequence with bit-addressable and byte-packed views.
#[derive(Debug, Clone, Default)]
pub struct BitSequence {
    bits: Vec<u8>,
    packed: OnceLock<Vec<u8>>,
    ones: OnceLock<usize>,
    byte_counts: OnceLock<[u64; 256]>,
    walk: OnceLock<Vec<i64>>,
}

impl BitSequence {
    /// Parse a string over {'0', '1'}, rejecting any other character.
    pub fn parse(input: &str) -> Result<Self, SequenceError> {
        let mut bits = Vec::with_capacity(input.len());
        for (position, c) in input.chars().enumerate() {
            match c {
                '0' => bits.push(0),
                '1' => bits.push(1),
                found => return Err(SequenceError::InvalidCharacter { position, found }),
            }
        }
        Ok(Self::from_raw(bits))
    }

    /// Parse a string, silently dropping every character that is not '0' or '1'.
    pub fn parse_lenient(input: &str) -> Self {
        let mut dropped = 0usize;
        let bits: Vec<u8> = input
            .chars()
            .filter_map(|c| match c {
                '0' => Some(0),
                '1' => Some(1),
                _ => {
                    dropped += 1;
                    None
                }
            })
            .collect();
        if dropped > 0 {
            log::debug!("dropped {dropped} non-binary characters while parsing");
        }
        Self::from_raw(bits)
    }

    /// Build from booleans, `true` meaning a 1 bit.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        Self::from_raw(bits.into_iter().map(u8::from).collect())
    }

    /// Unpack bytes into bits, most significant bit first.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut bits = Vec::with_capacity(data.len() * 8);
        for &byte in data {
            for shift in (0..8).rev() {
                bits.push((byte >> shift) & 1);
            }
        }
        Self::from_raw(bits)
    }

    fn from_raw(bits: Vec<u8>) -> Self {
        Self {
            bits,
            ..Self::default()
        }
    }

    /// Number of logical bits `n`.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The bits in original order, one byte per bit.
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// Byte-packed view, zero-padded on the right to a byte boundary.
    pub fn packed(&self) -> &[u8] {
        self.packed.get_or_init(|| {
            self.bits
                .chunks(8)
                .map(|chunk| {
                    chunk
                        .iter()
                        .enumerate()
                        .fold(0u8, |acc, (i, &bit)| acc | (bit << (7 - i)))
                })
                .collect()
        })
    }

    /// Expand the packed view back into bits, padding included.
    ///
    /// Truncating the result to [`len`](Self::len) reproduces [`bits`](Self::bits).
    pub fn unpack(&self) -> Vec<u8> {
        Self::from_bytes(self.packed()).bits
    }

    /// Number of 1 bits.
    pub fn ones_count(&self) -> usize {
        *self
            .ones
            .get_or_init(|| self.bits.iter().map(|&b| b as usize).sum())
    }

    /// Histogram of byte values over the packed view.
    pub fn byte_counts(&self) -> &[u64; 256] {
        self.byte_counts.get_or_init(|| {
            let mut hist = [0u64; 256];
            for &byte in self.packed() {
                hist[byte as usize] += 1;
            }
            hist
        })
    }

    /// Partial sums of the walk obtained by mapping 0 to -1 and 1 to +1.
    ///
    /// Element `k` is the position of the walk after `k + 1` steps.
    pub fn partial_sums(&self) -> &[i64] {
        self.walk.get_or_init(|| {
            let mut sum = 0i64;
            self.bits
                .iter()
                .map(|&b| {
                    sum += if b == 1 { 1 } else { -1 };
                    sum
                })
                .collect()
        })
    }
}

impl PartialEq for BitSequence {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl Eq for BitSequence {}

impl FromStr for BitSequence {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}
