//! Simulator to evaluate the performance of an LDPC code under belief-propagation decoding
//!
//! Every simulated block is the all-zero codeword. For a linear code, a symmetric channel and a
//! decoder that treats `Zero` and `One` alike, the error rates do not depend on the codeword
//! sent, so no encoder is needed. A decoded block is in error if it is not all-zero; the error is
//! undetected if the decoder nevertheless converged (to another codeword).

use std::fs::File;
use std::io::BufWriter;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{utils, Bit, DecodeOutcome, Decoder, Error, ParityCheckMatrix, Strategy, TannerGraph};

/// Enumeration of channel models, with each variant holding the noise parameter
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum Channel {
    /// Binary symmetric channel with given crossover probability
    Bsc(f64),
    /// Binary erasure channel with given erasure probability
    Bec(f64),
    /// BPSK-AWGN channel with given Es/N0 (dB)
    BpskAwgn(f64),
}

impl Channel {
    /// Returns channel LLR values for given transmitted bits.
    fn llr<R: Rng + ?Sized>(self, bits: &[Bit], rng: &mut R) -> Result<Vec<f64>, Error> {
        match self {
            Channel::Bsc(crossover_prob) => utils::bsc_channel(bits, crossover_prob, rng),
            Channel::Bec(erasure_prob) => utils::bec_channel(bits, erasure_prob, rng),
            Channel::BpskAwgn(es_over_n0_db) => {
                Ok(utils::bpsk_awgn_channel(bits, es_over_n0_db, rng))
            }
        }
    }

    /// Checks validity of the noise parameter.
    fn check(self) -> Result<(), Error> {
        match self {
            Channel::Bsc(crossover_prob) => utils::bsc_llr(crossover_prob).map(|_| ()),
            Channel::Bec(erasure_prob) if !(0.0 ..= 1.0).contains(&erasure_prob) => Err(
                Error::InvalidInput(format!("Erasure probability {erasure_prob} is not in [0, 1]")),
            ),
            Channel::BpskAwgn(es_over_n0_db) if !es_over_n0_db.is_finite() => Err(
                Error::InvalidInput(format!("Es/N0 of {es_over_n0_db} dB is not finite")),
            ),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Bsc(p) => write!(f, "BSC (crossover probability {p})"),
            Channel::Bec(p) => write!(f, "BEC (erasure probability {p})"),
            Channel::BpskAwgn(snr) => write!(f, "BPSK-AWGN (Es/N0 {snr:.2} dB)"),
        }
    }
}

/// Parameters for LDPC code simulation
#[derive(Clone, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub struct SimParams {
    /// Channel model
    pub channel: Channel,
    /// Decoding strategy
    pub strategy: Strategy,
    /// Maximum number of decoder iterations per block
    pub max_iterations: u32,
    /// Desired minimum number of block errors
    pub num_block_errors_min: u32,
    /// Number of blocks to be transmitted per run
    pub num_blocks_per_run: u32,
    /// Minimum number of runs of blocks to be simulated
    pub num_runs_min: u32,
    /// Maximum number of runs of blocks to be simulated
    pub num_runs_max: u32,
}

/// Results from LDPC code simulation
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct SimResults {
    /// Simulation parameters
    pub params: SimParams,
    /// Code length (bits per block)
    pub code_length: usize,
    /// Number of blocks transmitted
    pub num_blocks: u32,
    /// Number of bits in error after decoding
    pub num_bit_errors: u64,
    /// Number of bits in error in the hard decision on the channel LLR values
    pub num_channel_bit_errors: u64,
    /// Number of blocks in error
    pub num_block_errors: u32,
    /// Number of blocks in error for which the decoder converged to a wrong codeword
    pub num_undetected_block_errors: u32,
    /// Number of blocks for which the decoder did not find a codeword
    pub num_decoder_failures: u32,
    /// Total number of decoder iterations
    pub num_iterations: u64,
}

impl SimResults {
    /// Returns initialized simulation results.
    #[must_use]
    fn new(params: &SimParams, code_length: usize) -> Self {
        Self {
            params: *params,
            code_length,
            num_blocks: 0,
            num_bit_errors: 0,
            num_channel_bit_errors: 0,
            num_block_errors: 0,
            num_undetected_block_errors: 0,
            num_decoder_failures: 0,
            num_iterations: 0,
        }
    }

    /// Returns bit error rate after decoding.
    #[must_use]
    pub fn ber(&self) -> f64 {
        self.bit_rate(self.num_bit_errors)
    }

    /// Returns bit error rate of the hard decision on the channel LLR values.
    #[must_use]
    pub fn channel_ber(&self) -> f64 {
        self.bit_rate(self.num_channel_bit_errors)
    }

    /// Returns given bit count divided by the number of bits.
    #[allow(clippy::cast_precision_loss)]
    fn bit_rate(&self, count: u64) -> f64 {
        if self.num_blocks == 0 {
            return 0.0;
        }
        count as f64 / (self.code_length as f64 * f64::from(self.num_blocks))
    }

    /// Returns block error rate.
    #[must_use]
    pub fn bler(&self) -> f64 {
        self.rate(self.num_block_errors)
    }

    /// Returns undetected block error rate.
    #[must_use]
    pub fn undetected_bler(&self) -> f64 {
        self.rate(self.num_undetected_block_errors)
    }

    /// Returns mean number of decoder iterations per block.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_iterations(&self) -> f64 {
        if self.num_blocks == 0 {
            return 0.0;
        }
        self.num_iterations as f64 / f64::from(self.num_blocks)
    }

    /// Returns given count divided by the number of blocks.
    fn rate(&self, count: u32) -> f64 {
        if self.num_blocks == 0 {
            0.0
        } else {
            f64::from(count) / f64::from(self.num_blocks)
        }
    }

    /// Returns number of runs completed.
    fn num_runs(&self) -> u32 {
        self.num_blocks / self.params.num_blocks_per_run
    }

    /// Returns `true` iff no more runs are needed.
    fn run_complete(&self) -> bool {
        let num_runs = self.num_runs();
        num_runs >= self.params.num_runs_max
            || (num_runs >= self.params.num_runs_min
                && self.num_block_errors >= self.params.num_block_errors_min)
    }

    /// Updates results for a block, given the codeword sent, the hard decision on the channel
    /// LLR values, and the decoding outcome.
    fn update_after_block(
        &mut self,
        codeword: &[Bit],
        channel_bits: &[Bit],
        outcome: &DecodeOutcome,
    ) {
        let num_bit_errors = utils::error_count(&outcome.codeword, codeword);
        self.num_blocks += 1;
        self.num_bit_errors += num_bit_errors as u64;
        self.num_channel_bit_errors += utils::error_count(channel_bits, codeword) as u64;
        self.num_iterations += u64::from(outcome.iterations);
        if !outcome.is_converged() {
            self.num_decoder_failures += 1;
        }
        if num_bit_errors > 0 {
            self.num_block_errors += 1;
            if outcome.is_converged() {
                self.num_undetected_block_errors += 1;
            }
        }
    }
}

/// Runs simulations of an LDPC code and saves results to a JSON file.
///
/// # Parameters
///
/// - `matrix`: Parity-check matrix of the code.
///
/// - `all_params`: Parameters for each simulation scenario of interest.
///
/// - `rng`: Random number generator from which each block's channel noise is seeded.
///
/// - `json_filename`: Name of the JSON file to which all simulation results must be written.
///
/// # Errors
///
/// Returns an error if the matrix has an isolated column, if any parameters are invalid, or if
/// the results cannot be written to the JSON file.
pub fn run_sims<R: Rng + ?Sized>(
    matrix: &ParityCheckMatrix,
    all_params: &[SimParams],
    rng: &mut R,
    json_filename: &str,
) -> Result<(), Error> {
    let graph = TannerGraph::new(matrix)?;
    let mut all_results = Vec::with_capacity(all_params.len());
    for params in all_params {
        let results = sim(&graph, params, rng)?;
        info!(
            "{}, {}: channel BER = {:.2e}, BER = {:.2e}, BLER = {:.2e} ({} of {} blocks), \
            undetected BLER = {:.2e}, mean iterations = {:.2}",
            params.channel,
            params.strategy,
            results.channel_ber(),
            results.ber(),
            results.bler(),
            results.num_block_errors,
            results.num_blocks,
            results.undetected_bler(),
            results.mean_iterations()
        );
        all_results.push(results);
    }
    save_all_results(&all_results, json_filename)
}

/// Returns results from simulating an LDPC code under given parameters.
///
/// # Errors
///
/// Returns an error if any parameters are invalid.
///
/// # Examples
///
/// ```
/// use ldpc_bp::sim::{self, Channel, SimParams};
/// use ldpc_bp::{ParityCheckMatrix, Strategy, TannerGraph};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let rows = [vec![0, 1, 2, 4], vec![1, 2, 3, 5], vec![2, 3, 4, 6]];
/// let graph = TannerGraph::new(&ParityCheckMatrix::new(7, &rows)?)?;
/// let params = SimParams {
///     channel: Channel::Bec(0.1),
///     strategy: Strategy::SumProduct,
///     max_iterations: 20,
///     num_block_errors_min: 10,
///     num_blocks_per_run: 100,
///     num_runs_min: 1,
///     num_runs_max: 5,
/// };
/// let results = sim::sim(&graph, &params, &mut StdRng::seed_from_u64(0))?;
/// assert!(results.num_blocks >= 100 && results.num_blocks <= 500);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn sim<R: Rng + ?Sized>(
    graph: &TannerGraph,
    params: &SimParams,
    rng: &mut R,
) -> Result<SimResults, Error> {
    check_sim_params(params)?;
    let decoder = Decoder::new(graph, params.strategy)?;
    let codeword = vec![Bit::Zero; graph.num_vars()];
    let mut results = SimResults::new(params, graph.num_vars());
    while !results.run_complete() {
        let seeds: Vec<u64> = (0 .. params.num_blocks_per_run)
            .map(|_| rng.random())
            .collect();
        let blocks = seeds
            .par_iter()
            .map(|&seed| {
                let llr = params
                    .channel
                    .llr(&codeword, &mut StdRng::seed_from_u64(seed))?;
                let outcome = decoder.decode(&llr, params.max_iterations)?;
                Ok((utils::bpsk_slicer(&llr), outcome))
            })
            .collect::<Result<Vec<(Vec<Bit>, DecodeOutcome)>, Error>>()?;
        for (channel_bits, outcome) in &blocks {
            results.update_after_block(&codeword, channel_bits, outcome);
        }
        debug!(
            "Run {}: {} block errors in {} blocks",
            results.num_runs(),
            results.num_block_errors,
            results.num_blocks
        );
    }
    Ok(results)
}

/// Checks validity of simulation parameters.
fn check_sim_params(params: &SimParams) -> Result<(), Error> {
    if params.num_blocks_per_run == 0 {
        return Err(Error::InvalidInput(
            "Number of blocks per run cannot be zero".to_string(),
        ));
    }
    if params.num_runs_min > params.num_runs_max {
        return Err(Error::InvalidInput(format!(
            "Minimum number of runs ({}) exceeds maximum number of runs ({})",
            params.num_runs_min, params.num_runs_max
        )));
    }
    if params.max_iterations == 0 {
        return Err(Error::InvalidInput(
            "Maximum number of iterations must be at least 1".to_string(),
        ));
    }
    params.channel.check()
}

/// Saves simulation results to a JSON file.
fn save_all_results(all_results: &[SimResults], json_filename: &str) -> Result<(), Error> {
    let writer = BufWriter::new(File::create(json_filename)?);
    serde_json::to_writer_pretty(writer, all_results)?;
    Ok(())
}
