//! This crate simulates the BER and BLER performance of an LDPC code under belief-propagation
//! decoding over a binary symmetric channel, a binary erasure channel, or a BPSK-AWGN channel. The
//! code is read from an alist file or constructed at random with Gallager's method. Simulation
//! parameters are specified on the command line, and simulation results are saved to a JSON file.
//!
//! Build the executable with `cargo build --release` and then run `./target/release/ldpc-bp -h`
//! for help on the command-line interface. Set `RUST_LOG=info` (or `debug`) to see progress.

#![warn(
    clippy::complexity,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_allocation,
    unused_import_braces,
    unused_qualifications
)]

use anyhow::Result;
use clap::parser::ValueSource;
use clap::{crate_name, crate_version, value_parser, Arg, ArgMatches, Command};
use ldpc_bp::sim::{self, Channel};
use ldpc_bp::{alist, construction, CheckRule, ParityCheckMatrix, Strategy};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Main function
fn main() -> Result<()> {
    env_logger::init();
    let timer = Instant::now();
    let matches = command_line_parser().get_matches();
    let seed = seed_from_matches(&matches).unwrap_or_else(|| rand::rng().random());
    info!("Random seed: {seed}");
    let mut rng = StdRng::seed_from_u64(seed);
    let matrix = parity_check_matrix_from_matches(&matches, &mut rng)?;
    info!(
        "Code with {} bits and {} parity checks ({} edges)",
        matrix.num_vars(),
        matrix.num_checks(),
        matrix.num_edges()
    );
    let json_filename = &json_filename_from_matches(&matches);
    sim::run_sims(&matrix, &all_sim_params(&matches), &mut rng, json_filename)?;
    eprintln!("Elapsed time: {:.3?}", timer.elapsed());
    Ok(())
}

/// Returns command line parser.
fn command_line_parser() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about("Evaluates the performance of an LDPC code under belief-propagation decoding")
        .arg(matrix_filename())
        .arg(code_length())
        .arg(column_weight())
        .arg(row_weight())
        .arg(decoding_algo_name())
        .arg(num_int_bits())
        .arg(num_frac_bits())
        .arg(max_iterations())
        .arg(channel_name())
        .arg(first_noise_param())
        .arg(noise_param_step())
        .arg(num_noise_params())
        .arg(num_block_errors_min())
        .arg(num_blocks_per_run())
        .arg(num_runs_min())
        .arg(num_runs_max())
        .arg(json_filename())
        .arg(seed())
}

/// Returns argument for name of alist file holding the parity-check matrix.
fn matrix_filename() -> Arg {
    Arg::new("matrix_filename")
        .short('m')
        .help(
            "Name of alist file holding the parity-check matrix \
             (if absent, a Gallager code is constructed)",
        )
}

/// Returns argument for code length of a Gallager code.
fn code_length() -> Arg {
    Arg::new("code_length")
        .short('l')
        .value_parser(value_parser!(usize))
        .default_value("96")
        .help("Code length of Gallager code")
}

/// Returns argument for column weight of a Gallager code.
fn column_weight() -> Arg {
    Arg::new("column_weight")
        .short('c')
        .value_parser(value_parser!(usize))
        .default_value("3")
        .help("Column weight of Gallager code")
}

/// Returns argument for row weight of a Gallager code.
fn row_weight() -> Arg {
    Arg::new("row_weight")
        .short('w')
        .value_parser(value_parser!(usize))
        .default_value("6")
        .help("Row weight of Gallager code")
}

/// Returns argument for decoding algorithm name.
fn decoding_algo_name() -> Arg {
    Arg::new("decoding_algo_name")
        .short('a')
        .value_parser(["SumProduct", "MinSum", "FixedMinSum", "FixedSumProduct"])
        .default_value("SumProduct")
        .help("Decoding algorithm name")
}

/// Returns argument for number of integer bits in fixed-point messages.
fn num_int_bits() -> Arg {
    Arg::new("num_int_bits")
        .short('i')
        .value_parser(value_parser!(u32))
        .default_value("16")
        .help("Number of integer bits in fixed-point messages")
}

/// Returns argument for number of fractional bits in fixed-point messages.
fn num_frac_bits() -> Arg {
    Arg::new("num_frac_bits")
        .short('q')
        .value_parser(value_parser!(u32))
        .default_value("4")
        .help("Number of fractional bits in fixed-point messages")
}

/// Returns argument for maximum number of decoder iterations.
fn max_iterations() -> Arg {
    Arg::new("max_iterations")
        .short('t')
        .value_parser(value_parser!(u32))
        .default_value("50")
        .help("Maximum number of decoder iterations")
}

/// Returns argument for channel name.
fn channel_name() -> Arg {
    Arg::new("channel_name")
        .short('k')
        .value_parser(["BpskAwgn", "Bsc", "Bec"])
        .default_value("BpskAwgn")
        .help("Channel name")
}

/// Returns argument for first noise parameter.
fn first_noise_param() -> Arg {
    Arg::new("first_noise_param")
        .short('r')
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .default_value("1.0")
        .help(
            "First noise parameter \
             (Es/N0 in dB for BpskAwgn, crossover or erasure probability for Bsc or Bec)",
        )
}

/// Returns argument for noise parameter step.
fn noise_param_step() -> Arg {
    Arg::new("noise_param_step")
        .short('p')
        .value_parser(value_parser!(f64))
        .allow_negative_numbers(true)
        .default_value("0.5")
        .help("Noise parameter step")
}

/// Returns argument for number of noise parameter values.
fn num_noise_params() -> Arg {
    Arg::new("num_noise_params")
        .short('s')
        .value_parser(value_parser!(u32))
        .default_value("4")
        .help("Number of noise parameter values")
}

/// Returns argument for desired minimum number of block errors.
fn num_block_errors_min() -> Arg {
    Arg::new("num_block_errors_min")
        .short('e')
        .value_parser(value_parser!(u32))
        .default_value("100")
        .help("Desired minimum number of block errors")
}

/// Returns argument for number of blocks to be transmitted per run.
fn num_blocks_per_run() -> Arg {
    Arg::new("num_blocks_per_run")
        .short('b')
        .value_parser(value_parser!(u32))
        .default_value("1000")
        .help("Number of blocks to be transmitted per run")
}

/// Returns argument for minimum number of runs of blocks to be simulated.
fn num_runs_min() -> Arg {
    Arg::new("num_runs_min")
        .short('n')
        .value_parser(value_parser!(u32))
        .default_value("1")
        .help("Minimum number of runs of blocks to be simulated")
}

/// Returns argument for maximum number of runs of blocks to be simulated.
fn num_runs_max() -> Arg {
    Arg::new("num_runs_max")
        .short('x')
        .value_parser(value_parser!(u32))
        .default_value("100")
        .help("Maximum number of runs of blocks to be simulated")
}

/// Returns argument for name of JSON file to which results must be saved.
fn json_filename() -> Arg {
    Arg::new("json_filename")
        .short('f')
        .default_value("results.json")
        .help("Name of JSON file to which results must be saved")
}

/// Returns argument for seed of the random number generator.
fn seed() -> Arg {
    Arg::new("seed")
        .short('d')
        .value_parser(value_parser!(u64))
        .help("Seed of the random number generator (if absent, a random seed is used)")
}

/// Returns parity-check matrix read from file or constructed with Gallager's method.
fn parity_check_matrix_from_matches<R: Rng>(
    matches: &ArgMatches,
    rng: &mut R,
) -> Result<ParityCheckMatrix> {
    if let Some(filename) = matches.get_one::<String>("matrix_filename") {
        return Ok(alist::read_alist(filename)?);
    }
    // OK to unwrap: These arguments have default values.
    let code_length = *matches.get_one("code_length").unwrap();
    let column_weight = *matches.get_one("column_weight").unwrap();
    let row_weight = *matches.get_one("row_weight").unwrap();
    Ok(construction::gallager(code_length, column_weight, row_weight, rng)?)
}

/// Returns simulation parameters based on command-line arguments.
fn all_sim_params(matches: &ArgMatches) -> Vec<sim::SimParams> {
    let mut num_runs_min = num_runs_min_from_matches(matches);
    let mut num_runs_max = num_runs_max_from_matches(matches);
    if num_runs_min > num_runs_max {
        if let Some(ValueSource::DefaultValue) = matches.value_source("num_runs_min") {
            num_runs_min = num_runs_max;
        }
        if let Some(ValueSource::DefaultValue) = matches.value_source("num_runs_max") {
            num_runs_max = num_runs_min;
        }
    }
    all_channels_from_matches(matches)
        .into_iter()
        .map(|channel| sim::SimParams {
            channel,
            strategy: strategy_from_matches(matches),
            max_iterations: max_iterations_from_matches(matches),
            num_block_errors_min: num_block_errors_min_from_matches(matches),
            num_blocks_per_run: num_blocks_per_run_from_matches(matches),
            num_runs_min,
            num_runs_max,
        })
        .collect()
}

// OK to unwrap in the functions below: All the command-line arguments they read have default
// values, so an error cannot occur.

/// Returns decoding strategy.
fn strategy_from_matches(matches: &ArgMatches) -> Strategy {
    let int_bits = *matches.get_one("num_int_bits").unwrap();
    let frac_bits = *matches.get_one("num_frac_bits").unwrap();
    match matches
        .get_one::<String>("decoding_algo_name")
        .unwrap()
        .as_str()
    {
        "SumProduct" => Strategy::SumProduct,
        "MinSum" => Strategy::MinSum,
        "FixedMinSum" => Strategy::FixedPoint {
            int_bits,
            frac_bits,
            check_rule: CheckRule::MinSum,
        },
        "FixedSumProduct" => Strategy::FixedPoint {
            int_bits,
            frac_bits,
            check_rule: CheckRule::SumProduct,
        },
        _ => panic!("Invalid decoding algorithm name"),
    }
}

/// Returns all channels, one per noise parameter value.
fn all_channels_from_matches(matches: &ArgMatches) -> Vec<Channel> {
    let first: f64 = *matches.get_one("first_noise_param").unwrap();
    let step: f64 = *matches.get_one("noise_param_step").unwrap();
    let num: u32 = *matches.get_one("num_noise_params").unwrap();
    let channel_name = matches.get_one::<String>("channel_name").unwrap().as_str();
    (0 .. num)
        .map(|n| {
            let noise_param = first + step * f64::from(n);
            match channel_name {
                "Bsc" => Channel::Bsc(noise_param),
                "Bec" => Channel::Bec(noise_param),
                "BpskAwgn" => Channel::BpskAwgn(noise_param),
                _ => panic!("Invalid channel name"),
            }
        })
        .collect()
}

/// Returns maximum number of decoder iterations.
fn max_iterations_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("max_iterations").unwrap()
}

/// Returns desired minimum number of block errors.
fn num_block_errors_min_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("num_block_errors_min").unwrap()
}

/// Returns number of blocks to be transmitted per run.
fn num_blocks_per_run_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("num_blocks_per_run").unwrap()
}

/// Returns minimum number of runs of blocks to be simulated.
fn num_runs_min_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("num_runs_min").unwrap()
}

/// Returns maximum number of runs of blocks to be simulated.
fn num_runs_max_from_matches(matches: &ArgMatches) -> u32 {
    *matches.get_one("num_runs_max").unwrap()
}

/// Returns name of JSON file to which simulation results must be saved.
fn json_filename_from_matches(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>("json_filename")
        .unwrap()
        .to_string()
}

/// Returns seed of the random number generator, if given.
fn seed_from_matches(matches: &ArgMatches) -> Option<u64> {
    matches.get_one("seed").copied()
}
