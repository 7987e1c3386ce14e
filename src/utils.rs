//! # Channel models and other functions for simulating code performance
//!
//! The [`bpsk_awgn_channel`], [`bsc_channel`] and [`bec_channel`] functions return the LLR values
//! at the output of a BPSK-AWGN channel, a binary symmetric channel and a binary erasure channel,
//! respectively, corresponding to given input bits. The [`bpsk_slicer`] function slices symbols
//! or LLR values to bits, and the [`error_count`] function returns the number of errors in a
//! sequence with respect to a reference sequence.
//!
//! # Examples
//!
//! The code below illustrates the usage of the functions in this module.
//! ```
//! use ldpc_bp::{utils, Bit};
//!
//! let mut rng = rand::rng();
//! let bits = [Bit::Zero, Bit::One, Bit::One, Bit::Zero, Bit::Zero, Bit::One, Bit::Zero];
//! let bits_llr = utils::bpsk_awgn_channel(&bits, 10.0, &mut rng);
//! let bits_hat = utils::bpsk_slicer(&bits_llr);
//! let err_count = utils::error_count(&bits_hat, &bits);
//! let bits_llr = utils::bsc_channel(&bits, 0.05, &mut rng)?;
//! let bits_llr = utils::bec_channel(&bits, 0.2, &mut rng)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use rand::Rng;
use rand_distr::StandardNormal;

use crate::{Bit, Error};

/// Magnitude of the LLR value of a bit that the binary erasure channel delivers unerased
pub const BEC_KNOWN_LLR: f64 = 1e4;

/// Returns LLR values at BPSK-AWGN channel output corresponding to given input bits.
///
/// # Parameters
///
/// - `bits`: Bits to be transmitted over the BPSK-AWGN channel.
///
/// - `es_over_n0_db`: Ratio (dB) of symbol energy to noise power spectral density at the BPSK-AWGN
///   channel output (if the BPSK symbols are `+1.0` and `-1.0`, then the noise variance is
///   `0.5 / 10f64.powf(0.1 * es_over_n0_db)`).
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `bits_llr`: Log-likelihood-ratio (LLR) values at the BPSK-AWGN channel output corresponding
///   to the transmitted bits, with positive values indicating that `Zero` is more likely.
#[must_use]
pub fn bpsk_awgn_channel<R: Rng + ?Sized>(
    bits: &[Bit],
    es_over_n0_db: f64,
    rng: &mut R,
) -> Vec<f64> {
    let es_over_n0 = 10f64.powf(0.1 * es_over_n0_db);
    let noise_std = (0.5 / es_over_n0).sqrt();
    bits.iter()
        .map(|b| match b {
            Bit::Zero => 1f64,
            Bit::One => -1f64,
        })
        .map(|x| 4.0 * es_over_n0 * (x + noise_std * rng.sample::<f64, _>(StandardNormal)))
        .collect()
}

/// Returns LLR value of a bit received over a binary symmetric channel as `Zero`.
///
/// # Errors
///
/// Returns an error if `crossover_prob` is not in `(0, 0.5)`.
pub fn bsc_llr(crossover_prob: f64) -> Result<f64, Error> {
    if !(crossover_prob > 0.0 && crossover_prob < 0.5) {
        return Err(Error::InvalidInput(format!(
            "Crossover probability {crossover_prob} is not in (0, 0.5)"
        )));
    }
    Ok(((1.0 - crossover_prob) / crossover_prob).ln())
}

/// Returns LLR values at binary symmetric channel output corresponding to given input bits.
///
/// # Parameters
///
/// - `bits`: Bits to be transmitted over the channel.
///
/// - `crossover_prob`: Probability that the channel flips a bit. Must be in `(0, 0.5)`.
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `bits_llr`: LLR values `+L` (bit received as `Zero`) and `-L` (bit received as `One`), where
///   `L = ln((1 - crossover_prob) / crossover_prob)`.
///
/// # Errors
///
/// Returns an error if `crossover_prob` is not in `(0, 0.5)`.
pub fn bsc_channel<R: Rng + ?Sized>(
    bits: &[Bit],
    crossover_prob: f64,
    rng: &mut R,
) -> Result<Vec<f64>, Error> {
    let llr = bsc_llr(crossover_prob)?;
    Ok(bits
        .iter()
        .map(|&b| {
            let received = if rng.random_bool(crossover_prob) {
                b.flipped()
            } else {
                b
            };
            match received {
                Bit::Zero => llr,
                Bit::One => -llr,
            }
        })
        .collect())
}

/// Returns LLR values at binary erasure channel output corresponding to given input bits.
///
/// # Parameters
///
/// - `bits`: Bits to be transmitted over the channel.
///
/// - `erasure_prob`: Probability that the channel erases a bit. Must be in `[0, 1]`.
///
/// - `rng`: Random number generator to be used.
///
/// # Returns
///
/// - `bits_llr`: LLR value `0.0` for each erased bit, and `+BEC_KNOWN_LLR` (for `Zero`) or
///   `-BEC_KNOWN_LLR` (for `One`) for each bit received intact.
///
/// # Errors
///
/// Returns an error if `erasure_prob` is not in `[0, 1]`.
pub fn bec_channel<R: Rng + ?Sized>(
    bits: &[Bit],
    erasure_prob: f64,
    rng: &mut R,
) -> Result<Vec<f64>, Error> {
    if !(0.0 ..= 1.0).contains(&erasure_prob) {
        return Err(Error::InvalidInput(format!(
            "Erasure probability {erasure_prob} is not in [0, 1]"
        )));
    }
    Ok(bits
        .iter()
        .map(|&b| {
            if rng.random_bool(erasure_prob) {
                0.0
            } else {
                match b {
                    Bit::Zero => BEC_KNOWN_LLR,
                    Bit::One => -BEC_KNOWN_LLR,
                }
            }
        })
        .collect())
}

/// Returns BPSK slicer output.
///
/// # Parameters
///
/// - `syms`: Symbols to be sliced. Nonnegative values are mapped to `Zero`, and negative values to
///   `One`.
///
/// # Returns
///
/// - `bits_hat`: Bits obtained by slicing the given symbols.
#[must_use]
pub fn bpsk_slicer(syms: &[f64]) -> Vec<Bit> {
    crate::hard_decision(syms)
}

/// Returns number of errors in a sequence with respect to a reference sequence.
///
/// # Parameters
///
/// - `seq`: Sequence in which errors must be counted.
///
/// - `ref_seq`: Reference sequence to which the given sequence is compared.
///
/// # Returns
///
/// - `err_count`: Number of positions in which the two sequences differ. If they are of different
///   lengths, then the longer sequence is effectively truncated to the length of the shorter one.
pub fn error_count<T: PartialEq>(seq: &[T], ref_seq: &[T]) -> usize {
    ref_seq
        .iter()
        .zip(seq.iter())
        .filter(|&(x, y)| x != y)
        .count()
}
