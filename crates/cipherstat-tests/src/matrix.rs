//! Binary matrix rank test over GF(2).

use crate::bits::BitSequence;
use crate::outcome::{TestOutcome, insufficient};

/// Matrix side length (32 x 32 bits per matrix).
pub const MATRIX_SIZE: usize = 32;

const P_FULL_RANK: f64 = 0.2888;
const P_RANK_MINUS_ONE: f64 = 0.5776;
const P_LOWER_RANK: f64 = 0.1336;

/// Rank over GF(2) of a matrix whose rows are bit masks `cols` wide, most
/// significant column first. `rows` is reduced in place.
pub(crate) fn gf2_rank(rows: &mut [u64], cols: usize) -> usize {
    let mut rank = 0;
    for col in 0..cols {
        if rank == rows.len() {
            break;
        }
        let mask = 1u64 << (cols - 1 - col);
        let Some(pivot) = (rank..rows.len()).find(|&r| rows[r] & mask != 0) else {
            continue;
        };
        rows.swap(rank, pivot);
        let pivot_row = rows[rank];
        for (r, row) in rows.iter_mut().enumerate() {
            if r != rank && *row & mask != 0 {
                *row ^= pivot_row;
            }
        }
        rank += 1;
    }
    rank
}

/// Binary matrix rank: split the sequence into 32 x 32 matrices (row-major) and
/// compare how many reach full rank, rank 31, or lower against their
/// theoretical proportions. Bits beyond the last complete matrix are unused.
pub fn binary_matrix_rank(seq: &BitSequence) -> TestOutcome {
    let n = seq.len();
    let bits_per_matrix = MATRIX_SIZE * MATRIX_SIZE;
    let num_matrices = n / bits_per_matrix;
    if num_matrices == 0 {
        return insufficient("matrix_rank", bits_per_matrix, n);
    }

    let mut full_rank = 0u64;
    let mut rank_minus_one = 0u64;
    let mut rows = [0u64; MATRIX_SIZE];
    for matrix in seq.bits().chunks_exact(bits_per_matrix) {
        for (row, chunk) in rows.iter_mut().zip(matrix.chunks_exact(MATRIX_SIZE)) {
            *row = chunk.iter().fold(0u64, |acc, &b| (acc << 1) | b as u64);
        }
        match gf2_rank(&mut rows, MATRIX_SIZE) {
            MATRIX_SIZE => full_rank += 1,
            r if r == MATRIX_SIZE - 1 => rank_minus_one += 1,
            _ => {}
        }
    }
    let lower = num_matrices as u64 - full_rank - rank_minus_one;

    let nf = num_matrices as f64;
    let chi2 = [
        (full_rank, P_FULL_RANK),
        (rank_minus_one, P_RANK_MINUS_ONE),
        (lower, P_LOWER_RANK),
    ]
    .iter()
    .map(|&(observed, p)| {
        let expected = nf * p;
        (observed as f64 - expected).powi(2) / expected
    })
    .sum::<f64>();
    let p = (-chi2 / 2.0).exp();
    log::trace!(
        "matrix_rank: N={num_matrices}, full={full_rank}, full-1={rank_minus_one}, chi2={chi2:.6}"
    );
    TestOutcome::from_p_value(p)
}
