//! Random construction of LDPC parity-check matrices
//!
//! The [`gallager`] function returns a regular code built from randomly permuted bands, the
//! [`lift_protograph`] function returns a code obtained by lifting a small base graph with random
//! permutations, and the [`remove_duplicate_rows`] function drops repeated checks (which add
//! nothing to a code but short cycles to its Tanner graph).
//!
//! # Examples
//!
//! ```
//! use ldpc_bp::construction;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let h = construction::gallager(24, 3, 6, &mut rng)?;
//! assert_eq!(h.num_checks(), 12);
//! assert_eq!(h.num_edges(), 72);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashSet;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Error, ParityCheckMatrix};

/// Returns random regular parity-check matrix from Gallager's construction.
///
/// # Parameters
///
/// - `num_vars`: Code length (number of columns). Must be a multiple of `row_weight`.
///
/// - `col_weight`: Number of `1` entries in each column (at least `1`).
///
/// - `row_weight`: Number of `1` entries in each row (at least `2`).
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `matrix`: Parity-check matrix with `num_vars * col_weight / row_weight` rows, made of
///   `col_weight` bands of `num_vars / row_weight` rows each. In the first band, row `i` covers
///   columns `i * row_weight` through `(i + 1) * row_weight - 1`; every other band is the first
///   one with its columns randomly permuted. Every column thus has exactly one `1` entry in each
///   band.
///
/// # Errors
///
/// Returns an error if `num_vars` is `0` or not a multiple of `row_weight`, if `col_weight` is
/// `0`, or if `row_weight` is less than `2`.
pub fn gallager<R: Rng + ?Sized>(
    num_vars: usize,
    col_weight: usize,
    row_weight: usize,
    rng: &mut R,
) -> Result<ParityCheckMatrix, Error> {
    if col_weight == 0 || row_weight < 2 {
        return Err(Error::InvalidInput(format!(
            "Expected column weight of at least 1 and row weight of at least 2, found \
             {col_weight} and {row_weight}"
        )));
    }
    if num_vars == 0 || num_vars % row_weight != 0 {
        return Err(Error::InvalidInput(format!(
            "Code length {num_vars} is not a positive multiple of row weight {row_weight}"
        )));
    }
    let num_rows_per_band = num_vars / row_weight;
    let mut rows: Vec<Vec<usize>> = (0 .. num_rows_per_band)
        .map(|i| (i * row_weight .. (i + 1) * row_weight).collect())
        .collect();
    let mut perm: Vec<usize> = (0 .. num_vars).collect();
    for _ in 1 .. col_weight {
        perm.shuffle(rng);
        for i in 0 .. num_rows_per_band {
            let row = (i * row_weight .. (i + 1) * row_weight)
                .map(|var| perm[var])
                .sorted_unstable()
                .collect();
            rows.push(row);
        }
    }
    ParityCheckMatrix::new(num_vars, &rows)
}

/// Returns parity-check matrix obtained by lifting a protograph.
///
/// # Parameters
///
/// - `protograph`: For each variable node of the base graph, the base check nodes it connects to.
///   A base check may be listed more than once for the same variable (parallel edges).
///
/// - `num_proto_checks`: Number of check nodes of the base graph.
///
/// - `lifting`: Number of copies of the base graph (at least `1`).
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `matrix`: Parity-check matrix with `lifting * num_proto_checks` rows and
///   `lifting * protograph.len()` columns. Copy `j` of base variable `v` is column
///   `j * protograph.len() + v`. For the `k`th edge of `v`, a random permutation `p` of the copies
///   is drawn, and copy `j` of `v` is connected to row `p[j] * num_proto_checks + c`, where `c` is
///   the base check of the edge. Parallel edges that land on the same row are merged.
///
/// # Errors
///
/// Returns an error if `lifting` is `0`, if `protograph` is empty, if any base check index is not
/// in `[0, num_proto_checks)`, or if some base check has no edges.
///
/// # Examples
///
/// ```
/// use ldpc_bp::construction;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let protograph = [vec![0, 1], vec![0, 1], vec![0, 1]];
/// let h = construction::lift_protograph(&protograph, 2, 4, &mut StdRng::seed_from_u64(3))?;
/// assert_eq!(h.num_vars(), 12);
/// assert_eq!(h.num_checks(), 8);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn lift_protograph<R: Rng + ?Sized>(
    protograph: &[Vec<usize>],
    num_proto_checks: usize,
    lifting: usize,
    rng: &mut R,
) -> Result<ParityCheckMatrix, Error> {
    if lifting == 0 || protograph.is_empty() {
        return Err(Error::InvalidInput(
            "Protograph and lifting factor must both be nonempty".to_string(),
        ));
    }
    if let Some(&check) = protograph
        .iter()
        .flatten()
        .find(|&&check| check >= num_proto_checks)
    {
        return Err(Error::InvalidInput(format!(
            "Base check index {check} is not in [0, {num_proto_checks})"
        )));
    }
    let num_proto_vars = protograph.len();
    let mut columns = vec![Vec::new(); lifting * num_proto_vars];
    let mut perm: Vec<usize> = (0 .. lifting).collect();
    for (proto_var, proto_checks) in protograph.iter().enumerate() {
        for &proto_check in proto_checks {
            perm.shuffle(rng);
            for (copy, &target) in perm.iter().enumerate() {
                columns[copy * num_proto_vars + proto_var]
                    .push(target * num_proto_checks + proto_check);
            }
        }
    }
    for column in &mut columns {
        column.sort_unstable();
        column.dedup();
    }
    ParityCheckMatrix::from_columns(lifting * num_proto_checks, &columns)
}

/// Returns parity-check matrix with repeated rows removed, and the indices of the removed rows.
///
/// Two rows are repeats if they have `1` entries in the same columns, whatever the order in
/// which those columns are listed. The first occurrence of each row is kept.
///
/// # Examples
///
/// ```
/// use ldpc_bp::{construction, ParityCheckMatrix};
///
/// let h = ParityCheckMatrix::new(4, &[vec![0, 1], vec![2, 3], vec![1, 0], vec![0, 1]])?;
/// let (reduced, removed) = construction::remove_duplicate_rows(&h);
/// assert_eq!(reduced.rows(), [vec![0, 1], vec![2, 3]]);
/// assert_eq!(removed, [2, 3]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn remove_duplicate_rows(matrix: &ParityCheckMatrix) -> (ParityCheckMatrix, Vec<usize>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut removed = Vec::new();
    for (check, row) in matrix.rows().iter().enumerate() {
        if seen.insert(row.iter().copied().sorted_unstable().collect::<Vec<usize>>()) {
            kept.push(row.clone());
        } else {
            removed.push(check);
        }
    }
    // OK to unwrap: the kept rows are a nonempty subset of the rows of a valid matrix.
    let reduced = ParityCheckMatrix::new(matrix.num_vars(), &kept).unwrap();
    (reduced, removed)
}
