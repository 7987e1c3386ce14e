//! Reading and writing parity-check matrices in text formats
//!
//! Two formats are supported, both with 1-based indices:
//!
//! - The alist format of MacKay's code archive: a line with the numbers of columns and rows, a
//!   line with the largest column and row weights, a line with all column weights, a line with
//!   all row weights, then one line per column listing its rows, and one line per row listing its
//!   columns. Index lists may be padded with zeros up to the largest weight.
//!
//! - The column-list format, in which line `i` lists the rows of the `1` entries of column `i`.
//!
//! Indices are separated by any whitespace.

use std::fs;
use std::path::Path;

use itertools::Itertools;

use crate::{Error, ParityCheckMatrix};

/// Returns parity-check matrix from text in alist format.
///
/// # Errors
///
/// Returns an error if the text is not in alist format, if the column lists and row lists
/// disagree, or if the matrix is invalid (see [`ParityCheckMatrix::new`]).
///
/// # Examples
///
/// ```
/// use ldpc_bp::alist;
///
/// let text = "7 3\n3 4\n1 2 3 2 2 1 1\n4 4 4\n\
///             1 0 0\n1 2 0\n1 2 3\n2 3 0\n1 3 0\n2 0 0\n3 0 0\n\
///             1 2 3 5\n2 3 4 6\n3 4 5 7\n";
/// let h = alist::parse_alist(text)?;
/// assert_eq!(h.row(0), [0, 1, 2, 4]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_alist(text: &str) -> Result<ParityCheckMatrix, Error> {
    let mut tokens = Tokens::new(text);
    let num_vars = tokens.next_count("number of columns")?;
    let num_checks = tokens.next_count("number of rows")?;
    let max_col_weight = tokens.next_count("largest column weight")?;
    let max_row_weight = tokens.next_count("largest row weight")?;
    let col_weights = tokens.next_counts(num_vars, "column weight")?;
    let row_weights = tokens.next_counts(num_checks, "row weight")?;
    let columns = read_index_lists(
        &mut tokens,
        &col_weights,
        max_col_weight,
        num_checks,
        "column",
    )?;
    let rows = read_index_lists(&mut tokens, &row_weights, max_row_weight, num_vars, "row")?;
    let matrix = ParityCheckMatrix::new(num_vars, &rows)?;
    let sorted_rows: Vec<Vec<usize>> = rows
        .iter()
        .map(|row| row.iter().copied().sorted_unstable().collect())
        .collect();
    if ParityCheckMatrix::from_columns(num_checks, &columns)?.rows() != sorted_rows.as_slice() {
        return Err(Error::MalformedMatrix(
            "Column lists and row lists describe different matrices".to_string(),
        ));
    }
    Ok(matrix)
}

/// Returns parity-check matrix read from a file in alist format.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or if its contents are invalid (see
/// [`parse_alist`]).
pub fn read_alist<P: AsRef<Path>>(path: P) -> Result<ParityCheckMatrix, Error> {
    parse_alist(&fs::read_to_string(path)?)
}

/// Returns alist representation of a parity-check matrix (without zero padding).
///
/// Rows are listed with their columns in ascending order.
#[must_use]
pub fn to_alist(matrix: &ParityCheckMatrix) -> String {
    let mut columns = vec![Vec::new(); matrix.num_vars()];
    for (check, row) in matrix.rows().iter().enumerate() {
        for &var in row {
            columns[var].push(check);
        }
    }
    let rows: Vec<Vec<usize>> = matrix
        .rows()
        .iter()
        .map(|row| row.iter().copied().sorted_unstable().collect())
        .collect();
    let one_based = |list: &Vec<usize>| list.iter().map(|&index| index + 1).join(" ");
    let mut lines = vec![
        format!("{} {}", matrix.num_vars(), matrix.num_checks()),
        format!(
            "{} {}",
            columns.iter().map(Vec::len).max().unwrap_or(0),
            rows.iter().map(Vec::len).max().unwrap_or(0)
        ),
        columns.iter().map(Vec::len).join(" "),
        rows.iter().map(Vec::len).join(" "),
    ];
    lines.extend(columns.iter().map(one_based));
    lines.extend(rows.iter().map(one_based));
    lines.join("\n") + "\n"
}

/// Writes parity-check matrix to a file in alist format.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_alist<P: AsRef<Path>>(matrix: &ParityCheckMatrix, path: P) -> Result<(), Error> {
    fs::write(path, to_alist(matrix))?;
    Ok(())
}

/// Returns parity-check matrix from text in column-list format.
///
/// # Parameters
///
/// - `text`: One nonempty line per column, listing the 1-based rows of its `1` entries.
///
/// - `num_checks`: Number of rows of the matrix.
///
/// # Errors
///
/// Returns an error if any index is not an integer in `[1, num_checks]`, or if the matrix is
/// invalid (see [`ParityCheckMatrix::from_columns`]).
///
/// # Examples
///
/// ```
/// use ldpc_bp::alist;
///
/// let h = alist::parse_column_lists("1\n1\t2\n1\t2\t3\n2\t3\n1\t3\n2\n3\n", 3)?;
/// assert_eq!(h.row(1), [1, 2, 3, 5]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_column_lists(text: &str, num_checks: usize) -> Result<ParityCheckMatrix, Error> {
    let columns = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(var, line)| {
            line.split_whitespace()
                .map(|token| parse_one_based(token, num_checks, &format!("column {var}")))
                .collect::<Result<Vec<usize>, Error>>()
        })
        .collect::<Result<Vec<Vec<usize>>, Error>>()?;
    ParityCheckMatrix::from_columns(num_checks, &columns)
}

/// Reads one index list per entry of `weights`, dropping zero padding.
fn read_index_lists(
    tokens: &mut Tokens<'_>,
    weights: &[usize],
    max_weight: usize,
    upper: usize,
    what: &str,
) -> Result<Vec<Vec<usize>>, Error> {
    let mut lists = Vec::with_capacity(weights.len());
    for (index, &weight) in weights.iter().enumerate() {
        if weight > max_weight {
            return Err(Error::MalformedMatrix(format!(
                "Weight {weight} of {what} {index} exceeds largest weight {max_weight}"
            )));
        }
        if weight > upper {
            return Err(Error::MalformedMatrix(format!(
                "Weight {weight} of {what} {index} exceeds the {upper} available indices"
            )));
        }
        let mut list = Vec::with_capacity(weight);
        while list.len() < weight {
            let token = tokens.next_token(what)?;
            if token != "0" {
                list.push(parse_one_based(token, upper, &format!("{what} {index}"))?);
            }
        }
        lists.push(list);
    }
    Ok(lists)
}

/// Returns 0-based index from a 1-based index token that must be in `[1, upper]`.
fn parse_one_based(token: &str, upper: usize, context: &str) -> Result<usize, Error> {
    match token.parse::<usize>() {
        Ok(index) if (1 ..= upper).contains(&index) => Ok(index - 1),
        _ => Err(Error::MalformedMatrix(format!(
            "Invalid index '{token}' in {context}, expected an integer in [1, {upper}]"
        ))),
    }
}

/// Whitespace-separated tokens of a text
struct Tokens<'a> {
    iter: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            iter: text.split_whitespace(),
        }
    }

    fn next_token(&mut self, what: &str) -> Result<&'a str, Error> {
        self.iter.next().ok_or_else(|| {
            Error::MalformedMatrix(format!("Unexpected end of input while reading {what}"))
        })
    }

    fn next_count(&mut self, what: &str) -> Result<usize, Error> {
        let token = self.next_token(what)?;
        token.parse().map_err(|_| {
            Error::MalformedMatrix(format!("Expected {what}, found '{token}'"))
        })
    }

    fn next_counts(&mut self, num: usize, what: &str) -> Result<Vec<usize>, Error> {
        (0 .. num).map(|_| self.next_count(what)).collect()
    }
}
