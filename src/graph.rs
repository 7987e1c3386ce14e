//! Parity-check matrix and the Tanner graph derived from it

use std::ops::Range;

use crate::{Bit, Error};

/// Binary parity-check matrix stored as the list of `1` positions in each row
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParityCheckMatrix {
    /// Number of columns (variable nodes)
    num_vars: usize,
    /// Column indices of the `1` entries in each row, in insertion order
    rows: Vec<Vec<usize>>,
}

impl ParityCheckMatrix {
    /// Returns parity-check matrix with given number of columns and given rows.
    ///
    /// # Parameters
    ///
    /// - `num_vars`: Number of columns of the matrix, i.e., the code length `N`.
    ///
    /// - `rows`: For each row (check), the 0-based column indices of its `1` entries. The order
    ///   of the indices is preserved, and fixes the order in which the neighbors of the check are
    ///   visited during decoding.
    ///
    /// # Errors
    ///
    /// Returns an error if `num_vars` is `0`, if `rows` is empty, if any row is empty, if any
    /// column index is not in `[0, num_vars)`, or if any row lists a column index more than once.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpc_bp::ParityCheckMatrix;
    ///
    /// // (7,4) Hamming code
    /// let rows = [vec![0, 1, 2, 4], vec![1, 2, 3, 5], vec![2, 3, 4, 6]];
    /// let h = ParityCheckMatrix::new(7, &rows)?;
    /// assert_eq!(h.num_checks(), 3);
    /// assert_eq!(h.num_edges(), 12);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(num_vars: usize, rows: &[Vec<usize>]) -> Result<Self, Error> {
        if num_vars == 0 {
            return Err(Error::MalformedMatrix(
                "Number of columns must be a positive integer".to_string(),
            ));
        }
        if rows.is_empty() {
            return Err(Error::MalformedMatrix(
                "Expected at least one row".to_string(),
            ));
        }
        let mut seen = vec![usize::MAX; num_vars];
        for (check, row) in rows.iter().enumerate() {
            if row.is_empty() {
                return Err(Error::MalformedMatrix(format!(
                    "Row {check} has no nonzero entries"
                )));
            }
            for &var in row {
                if var >= num_vars {
                    return Err(Error::MalformedMatrix(format!(
                        "Row {check} has column index {var}, expected a value in [0, {num_vars})"
                    )));
                }
                if seen[var] == check {
                    return Err(Error::MalformedMatrix(format!(
                        "Row {check} lists column index {var} more than once"
                    )));
                }
                seen[var] = check;
            }
        }
        Ok(Self {
            num_vars,
            rows: rows.to_vec(),
        })
    }

    /// Returns parity-check matrix corresponding to a dense 0/1 matrix.
    ///
    /// # Parameters
    ///
    /// - `dense`: Matrix given row by row, with every entry either `0` or `1`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows are not all of the same length, if any entry is other than
    /// `0` or `1`, or if the resulting matrix violates any condition checked by [`Self::new`].
    pub fn from_dense(dense: &[Vec<u8>]) -> Result<Self, Error> {
        let num_vars = dense.first().map_or(0, Vec::len);
        let mut rows = Vec::with_capacity(dense.len());
        for (check, dense_row) in dense.iter().enumerate() {
            if dense_row.len() != num_vars {
                return Err(Error::MalformedMatrix(format!(
                    "Row {} has {} entries, expected {}",
                    check,
                    dense_row.len(),
                    num_vars
                )));
            }
            let mut row = Vec::new();
            for (var, &entry) in dense_row.iter().enumerate() {
                match entry {
                    0 => (),
                    1 => row.push(var),
                    _ => {
                        return Err(Error::MalformedMatrix(format!(
                            "Entry ({check}, {var}) is {entry}, expected 0 or 1"
                        )))
                    }
                }
            }
            rows.push(row);
        }
        Self::new(num_vars, &rows)
    }

    /// Returns parity-check matrix with given columns.
    ///
    /// # Parameters
    ///
    /// - `num_checks`: Number of rows of the matrix.
    ///
    /// - `columns`: For each column (variable), the 0-based row indices of its `1` entries.
    ///
    /// # Returns
    ///
    /// - `matrix`: Parity-check matrix whose rows list their column indices in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if any row index is not in `[0, num_checks)`, if any column lists a row
    /// index more than once, or if the resulting matrix violates any condition checked by
    /// [`Self::new`].
    pub fn from_columns(num_checks: usize, columns: &[Vec<usize>]) -> Result<Self, Error> {
        let mut rows = vec![Vec::new(); num_checks];
        for (var, column) in columns.iter().enumerate() {
            for &check in column {
                let row: &mut Vec<usize> = rows.get_mut(check).ok_or_else(|| {
                    Error::MalformedMatrix(format!(
                        "Column {var} has row index {check}, expected a value in [0, {num_checks})"
                    ))
                })?;
                if row.last() == Some(&var) {
                    return Err(Error::MalformedMatrix(format!(
                        "Column {var} lists row index {check} more than once"
                    )));
                }
                row.push(var);
            }
        }
        Self::new(columns.len(), &rows)
    }

    /// Returns number of rows (check nodes).
    #[must_use]
    pub fn num_checks(&self) -> usize {
        self.rows.len()
    }

    /// Returns number of columns (variable nodes).
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Returns number of `1` entries (Tanner graph edges).
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Returns column indices of the `1` entries in a row.
    ///
    /// # Panics
    ///
    /// Panics if `check` is not less than the number of rows.
    #[must_use]
    pub fn row(&self, check: usize) -> &[usize] {
        &self.rows[check]
    }

    /// Returns column indices of the `1` entries in all rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// Returns dense 0/1 representation of the matrix.
    #[must_use]
    pub fn to_dense(&self) -> Vec<Vec<u8>> {
        self.rows
            .iter()
            .map(|row| {
                let mut dense_row = vec![0; self.num_vars];
                row.iter().for_each(|&var| dense_row[var] = 1);
                dense_row
            })
            .collect()
    }

    /// Returns syndrome (product of this matrix with the given word, modulo 2).
    ///
    /// # Errors
    ///
    /// Returns an error if `word.len()` is not equal to the number of columns.
    pub fn syndrome(&self, word: &[Bit]) -> Result<Vec<Bit>, Error> {
        if word.len() != self.num_vars {
            return Err(Error::DimensionMismatch {
                expected: self.num_vars,
                found: word.len(),
            });
        }
        Ok(self
            .rows
            .iter()
            .map(|row| Bit::from_parity(row.iter().filter(|&&var| word[var] == Bit::One).count()))
            .collect())
    }

    /// Returns `true` if the given word has an all-zero syndrome.
    ///
    /// # Errors
    ///
    /// Returns an error if `word.len()` is not equal to the number of columns.
    pub fn is_codeword(&self, word: &[Bit]) -> Result<bool, Error> {
        Ok(self.syndrome(word)?.iter().all(|&b| b == Bit::Zero))
    }
}

/// Bipartite graph of check nodes and variable nodes derived from a parity-check matrix
///
/// Edges are numbered in check-major order: the edges of check `0` come first, in the order in
/// which its variables are listed in the matrix, followed by the edges of check `1`, and so on.
/// Message arrays used in decoding are indexed by these edge numbers.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TannerGraph {
    /// Number of variable nodes
    num_vars: usize,
    /// Edge range of each check (length `num_checks + 1`)
    check_offsets: Vec<usize>,
    /// Variable at the end of each edge
    edge_vars: Vec<usize>,
    /// Start of the edge list of each variable in `var_edges` (length `num_vars + 1`)
    var_offsets: Vec<usize>,
    /// Edge numbers grouped by variable, in ascending check order within each group
    var_edges: Vec<usize>,
    /// Check at the end of each entry of `var_edges`
    var_checks: Vec<usize>,
}

impl TannerGraph {
    /// Returns Tanner graph for the given parity-check matrix.
    ///
    /// Construction takes time and space proportional to the number of edges.
    ///
    /// # Errors
    ///
    /// Returns an error if some column of the matrix has no `1` entries, since the corresponding
    /// variable node would be isolated.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpc_bp::{ParityCheckMatrix, TannerGraph};
    ///
    /// let rows = [vec![0, 1, 2, 4], vec![1, 2, 3, 5], vec![2, 3, 4, 6]];
    /// let graph = TannerGraph::new(&ParityCheckMatrix::new(7, &rows)?)?;
    /// assert_eq!(graph.neighbors_of_check(1), [1, 2, 3, 5]);
    /// assert_eq!(graph.neighbors_of_variable(2), [0, 1, 2]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(matrix: &ParityCheckMatrix) -> Result<Self, Error> {
        let num_vars = matrix.num_vars();
        let num_edges = matrix.num_edges();
        let mut check_offsets = Vec::with_capacity(matrix.num_checks() + 1);
        let mut edge_vars = Vec::with_capacity(num_edges);
        check_offsets.push(0);
        for row in matrix.rows() {
            edge_vars.extend_from_slice(row);
            check_offsets.push(edge_vars.len());
        }
        // Counting sort of the edges by variable
        let mut var_offsets = vec![0; num_vars + 1];
        for &var in &edge_vars {
            var_offsets[var + 1] += 1;
        }
        if let Some(var) = (0 .. num_vars).find(|&var| var_offsets[var + 1] == 0) {
            return Err(Error::MalformedMatrix(format!(
                "Column {var} has no nonzero entries"
            )));
        }
        for var in 0 .. num_vars {
            var_offsets[var + 1] += var_offsets[var];
        }
        let mut next_slot = var_offsets[.. num_vars].to_vec();
        let mut var_edges = vec![0; num_edges];
        let mut var_checks = vec![0; num_edges];
        for check in 0 .. matrix.num_checks() {
            for edge in check_offsets[check] .. check_offsets[check + 1] {
                let slot = &mut next_slot[edge_vars[edge]];
                var_edges[*slot] = edge;
                var_checks[*slot] = check;
                *slot += 1;
            }
        }
        Ok(Self {
            num_vars,
            check_offsets,
            edge_vars,
            var_offsets,
            var_edges,
            var_checks,
        })
    }

    /// Returns number of check nodes.
    #[must_use]
    pub fn num_checks(&self) -> usize {
        self.check_offsets.len() - 1
    }

    /// Returns number of variable nodes.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// Returns number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edge_vars.len()
    }

    /// Returns variables connected to a check, in matrix order.
    #[must_use]
    pub fn neighbors_of_check(&self, check: usize) -> &[usize] {
        &self.edge_vars[self.check_edges(check)]
    }

    /// Returns checks connected to a variable, in ascending order.
    #[must_use]
    pub fn neighbors_of_variable(&self, var: usize) -> &[usize] {
        &self.var_checks[self.var_offsets[var] .. self.var_offsets[var + 1]]
    }

    /// Returns range of edge numbers belonging to a check.
    #[must_use]
    pub fn check_edges(&self, check: usize) -> Range<usize> {
        self.check_offsets[check] .. self.check_offsets[check + 1]
    }

    /// Returns edge numbers belonging to a variable, in ascending check order.
    #[must_use]
    pub fn variable_edges(&self, var: usize) -> &[usize] {
        &self.var_edges[self.var_offsets[var] .. self.var_offsets[var + 1]]
    }

    /// Returns variable at the end of each edge, in edge order.
    #[must_use]
    pub fn edge_vars(&self) -> &[usize] {
        &self.edge_vars
    }

    /// Returns number of the edge joining a check and a variable, if there is one.
    #[must_use]
    pub fn edge_index(&self, check: usize, var: usize) -> Option<usize> {
        self.check_edges(check)
            .find(|&edge| self.edge_vars[edge] == var)
    }

    /// Returns syndrome of the given word, one bit per check.
    ///
    /// # Errors
    ///
    /// Returns an error if `word.len()` is not equal to the number of variables.
    pub fn syndrome(&self, word: &[Bit]) -> Result<Vec<Bit>, Error> {
        if word.len() != self.num_vars {
            return Err(Error::DimensionMismatch {
                expected: self.num_vars,
                found: word.len(),
            });
        }
        Ok((0 .. self.num_checks())
            .map(|check| self.check_parity(check, word))
            .collect())
    }

    /// Returns parity of the bits of `word` on the variables connected to a check.
    pub(crate) fn check_parity(&self, check: usize, word: &[Bit]) -> Bit {
        Bit::from_parity(
            self.neighbors_of_check(check)
                .iter()
                .filter(|&&var| word[var] == Bit::One)
                .count(),
        )
    }
}
