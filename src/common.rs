//! Types needed in multiple modules

use serde::{Deserialize, Serialize};

/// Enumeration of binary symbol values
#[derive(Clone, Eq, Hash, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum Bit {
    /// Binary symbol `0`
    Zero = 0,
    /// Binary symbol `1`
    One = 1,
}

impl Bit {
    /// Returns the bit equal to the parity of the given count (`Zero` for even, `One` for odd).
    #[must_use]
    pub fn from_parity(count: usize) -> Self {
        match count % 2 {
            0 => Bit::Zero,
            _ => Bit::One,
        }
    }

    /// Returns the complementary bit.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
        }
    }
}

impl From<Bit> for u8 {
    fn from(bit: Bit) -> Self {
        bit as u8
    }
}

/// Custom error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Invalid input error
    #[error("{0}")]
    InvalidInput(String),
    /// Structural defect in a parity-check matrix (isolated node, inconsistent dimensions)
    #[error("Malformed parity-check matrix: {0}")]
    MalformedMatrix(String),
    /// Length of an input vector disagrees with the size of the Tanner graph
    #[error("Dimension mismatch: expected {expected} values, found {found}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Length found
        found: usize,
    },
    /// File read/write error
    #[error("{0}")]
    FileReadWriteError(#[from] std::io::Error),
    /// Serde read/write error
    #[error("{0}")]
    SerdeReadWriteError(#[from] serde_json::Error),
}
