//! Saturating fixed-point numbers, and the `tanh` lookup table used in fixed-point decoding
//!
//! A [`FixedFormat`] with `I` integer bits and `F` fractional bits represents the multiples of
//! `2^-F` in `[-2^(I-1), 2^(I-1) - 2^-F]` (the integer bits include the sign bit). Every
//! operation rounds its exact result to the nearest representable value and then saturates it
//! to this range, so that results never wrap around.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Number in a fixed-point format, stored as an integer multiple of the format resolution
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Debug)]
pub struct Fixed(i32);

impl Fixed {
    /// Returns the underlying integer (the value divided by the format resolution).
    #[must_use]
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Returns `true` if the value is negative.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

/// Fixed-point format with given numbers of integer and fractional bits
#[derive(Clone, Eq, Hash, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct FixedFormat {
    /// Number of integer bits, including the sign bit
    int_bits: u32,
    /// Number of fractional bits
    frac_bits: u32,
}

impl FixedFormat {
    /// Format for decoder messages (16 integer bits, 4 fractional bits)
    pub const MESSAGE: FixedFormat = FixedFormat {
        int_bits: 16,
        frac_bits: 4,
    };

    /// Format for the `tanh` lookup table (7 integer bits, 4 fractional bits)
    pub const TANH_TABLE: FixedFormat = FixedFormat {
        int_bits: 7,
        frac_bits: 4,
    };

    /// Returns fixed-point format with given numbers of integer and fractional bits.
    ///
    /// # Parameters
    ///
    /// - `int_bits`: Number of integer bits, including the sign bit.
    ///
    /// - `frac_bits`: Number of fractional bits.
    ///
    /// # Errors
    ///
    /// Returns an error if `int_bits` is `0` or if `int_bits + frac_bits` exceeds `32`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpc_bp::FixedFormat;
    ///
    /// let format = FixedFormat::new(16, 4)?;
    /// assert_eq!(format.to_f64(format.quantize(1.3)), 1.3125);
    /// assert_eq!(format.to_f64(format.quantize(1e9)), 32767.9375);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(int_bits: u32, frac_bits: u32) -> Result<Self, Error> {
        if int_bits == 0 || int_bits.checked_add(frac_bits).map_or(true, |total| total > 32) {
            return Err(Error::InvalidInput(format!(
                "Fixed-point format needs 1 or more integer bits and at most 32 bits in all \
                (found {int_bits} integer and {frac_bits} fractional bits)"
            )));
        }
        Ok(Self {
            int_bits,
            frac_bits,
        })
    }

    /// Returns number of integer bits (including the sign bit).
    #[must_use]
    pub fn int_bits(&self) -> u32 {
        self.int_bits
    }

    /// Returns number of fractional bits.
    #[must_use]
    pub fn frac_bits(&self) -> u32 {
        self.frac_bits
    }

    /// Returns the number of representable values per unit (`2^frac_bits`).
    #[must_use]
    pub fn scale(&self) -> f64 {
        f64::from(1u32 << self.frac_bits)
    }

    /// Returns largest representable value.
    #[must_use]
    pub fn max(&self) -> Fixed {
        self.saturate(i64::MAX)
    }

    /// Returns smallest representable value.
    #[must_use]
    pub fn min(&self) -> Fixed {
        self.saturate(i64::MIN)
    }

    /// Returns the representable value nearest to `x` (`NaN` maps to zero).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn quantize(&self, x: f64) -> Fixed {
        if x.is_nan() {
            return Fixed(0);
        }
        // Float-to-integer casts saturate, so huge and infinite inputs end up at the range ends.
        self.saturate((x * self.scale()).round() as i64)
    }

    /// Returns real value of a fixed-point number in this format.
    #[must_use]
    pub fn to_f64(&self, x: Fixed) -> f64 {
        f64::from(x.0) / self.scale()
    }

    /// Returns saturated sum.
    #[must_use]
    pub fn add(&self, x: Fixed, y: Fixed) -> Fixed {
        self.saturate(i64::from(x.0) + i64::from(y.0))
    }

    /// Returns saturated difference.
    #[must_use]
    pub fn sub(&self, x: Fixed, y: Fixed) -> Fixed {
        self.saturate(i64::from(x.0) - i64::from(y.0))
    }

    /// Returns rounded and saturated product.
    #[must_use]
    pub fn mul(&self, x: Fixed, y: Fixed) -> Fixed {
        let product = i64::from(x.0) * i64::from(y.0);
        if self.frac_bits == 0 {
            self.saturate(product)
        } else {
            self.saturate((product + (1 << (self.frac_bits - 1))) >> self.frac_bits)
        }
    }

    /// Returns saturated absolute value.
    #[must_use]
    pub fn abs(&self, x: Fixed) -> Fixed {
        self.saturate(i64::from(x.0).abs())
    }

    /// Returns saturated negation.
    #[must_use]
    pub fn neg(&self, x: Fixed) -> Fixed {
        self.saturate(-i64::from(x.0))
    }

    /// Returns `x` clamped to `[-limit, limit]`.
    #[must_use]
    pub fn clamp_abs(&self, x: Fixed, limit: Fixed) -> Fixed {
        Fixed(x.0.clamp(-limit.0, limit.0))
    }

    /// Returns value with given raw integer, saturated to the representable range.
    #[must_use]
    pub fn from_raw(&self, raw: i64) -> Fixed {
        self.saturate(raw)
    }

    /// Returns largest raw integer.
    fn max_raw(&self) -> i64 {
        (1i64 << (self.int_bits + self.frac_bits - 1)) - 1
    }

    /// Returns smallest raw integer.
    fn min_raw(&self) -> i64 {
        -(1i64 << (self.int_bits + self.frac_bits - 1))
    }

    /// Saturates raw integer to the representable range.
    #[allow(clippy::cast_possible_truncation)]
    fn saturate(&self, raw: i64) -> Fixed {
        // OK to cast: the clamped value fits in 32 bits.
        Fixed(raw.clamp(self.min_raw(), self.max_raw()) as i32)
    }
}

/// Lookup table of `tanh` over every value representable in a fixed-point format
///
/// The table is computed once and can be saved to and loaded from a JSON file, so that the exact
/// table used by a hardware decoder can be versioned alongside it.
#[derive(Clone, Eq, PartialEq, Debug, Deserialize, Serialize)]
pub struct TanhTable {
    /// Format of table inputs and outputs
    format: FixedFormat,
    /// Raw `tanh` output for each raw input, starting from the smallest representable input
    values: Vec<i32>,
}

impl TanhTable {
    /// Largest number of bits supported for the table format
    const MAX_TOTAL_BITS: u32 = 16;

    /// Returns `tanh` lookup table for given format.
    ///
    /// # Errors
    ///
    /// Returns an error if the format has no fractional bits, or more than `16` bits in all.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpc_bp::{FixedFormat, TanhTable};
    ///
    /// let table = TanhTable::new(FixedFormat::TANH_TABLE)?;
    /// assert_eq!(table.len(), 2048);
    /// let one = FixedFormat::TANH_TABLE.quantize(1.0);
    /// assert_eq!(FixedFormat::TANH_TABLE.to_f64(table.lookup(one)), 0.75);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(format: FixedFormat) -> Result<Self, Error> {
        check_table_format(format)?;
        let values = (format.min_raw() ..= format.max_raw())
            .map(|raw| {
                let x = format.from_raw(raw);
                format.quantize(format.to_f64(x).tanh()).raw()
            })
            .collect();
        Ok(Self { format, values })
    }

    /// Reads table from a JSON file written by [`Self::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if its contents are not a
    /// valid table.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let table: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        check_table_format(table.format)?;
        let expected_len = usize::try_from(table.format.max_raw() - table.format.min_raw() + 1)
            .map_err(|_| Error::InvalidInput("Table format is too large".to_string()))?;
        if table.values.len() != expected_len {
            return Err(Error::InvalidInput(format!(
                "Expected {} table entries, found {}",
                expected_len,
                table.values.len()
            )));
        }
        let one = 1i64 << table.format.frac_bits;
        if table.values.iter().any(|&v| i64::from(v).abs() > one) {
            return Err(Error::InvalidInput(
                "Table entries must lie in [-1, 1]".to_string(),
            ));
        }
        Ok(table)
    }

    /// Writes table to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        serde_json::to_writer(BufWriter::new(File::create(path)?), self)?;
        Ok(())
    }

    /// Returns format of table inputs and outputs.
    #[must_use]
    pub fn format(&self) -> FixedFormat {
        self.format
    }

    /// Returns number of table entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the table has no entries (never the case for a valid table).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `tanh(x)` for `x` in the table format.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn lookup(&self, x: Fixed) -> Fixed {
        // OK to cast: `x` lies in the table format, so the offset is in `[0, self.len())`.
        Fixed(self.values[(i64::from(x.0) - self.format.min_raw()) as usize])
    }

    /// Returns the largest table value whose magnitude is less than `1`.
    #[must_use]
    pub fn max_below_one(&self) -> Fixed {
        self.format.from_raw((1i64 << self.format.frac_bits) - 1)
    }
}

/// Checks that a format is usable for a `tanh` lookup table.
fn check_table_format(format: FixedFormat) -> Result<(), Error> {
    let total_bits = format.int_bits.checked_add(format.frac_bits);
    if format.int_bits == 0
        || format.frac_bits == 0
        || total_bits.map_or(true, |total| total > TanhTable::MAX_TOTAL_BITS)
    {
        return Err(Error::InvalidInput(format!(
            "Table format needs 1 or more fractional bits and at most {} bits in all",
            TanhTable::MAX_TOTAL_BITS
        )));
    }
    Ok(())
}
