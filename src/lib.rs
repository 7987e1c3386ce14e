//! This crate implements belief-propagation (BP) decoding of binary low-density parity-check
//! (LDPC) codes. A code is specified by a sparse parity-check matrix, whose bipartite Tanner graph
//! has a variable node per code bit and a check node per parity check. The decoder starts from
//! channel log-likelihood ratio (LLR) values and exchanges messages along the edges of the graph
//! until the hard decisions form a codeword or an iteration limit is reached.
//!
//! Check nodes can be updated with the sum-product (tanh) rule or the min-sum approximation, in
//! double-precision floating point or in saturating fixed-point arithmetic. The crate also
//! includes code constructions, alist file support, channel models, and a Monte Carlo simulator.
//!
//! LLR values follow the convention `ln(P(bit = 0) / P(bit = 1))`, so that a positive value
//! favors `Zero`.
//!
//! # Examples
//!
//! ```
//! use ldpc_bp::{decode, Bit, DecodeStatus, ParityCheckMatrix, Strategy, TannerGraph};
//!
//! // (7, 4) Hamming code
//! let rows = [vec![0, 1, 2, 4], vec![1, 2, 3, 5], vec![2, 3, 4, 6]];
//! let graph = TannerGraph::new(&ParityCheckMatrix::new(7, &rows)?)?;
//! // All-zero codeword received over a binary symmetric channel, with bit 2 flipped
//! let a = (0.85f64 / 0.15).ln();
//! let llr = [a, a, -a, a, a, a, a];
//! let outcome = decode(&graph, &llr, 20, Strategy::MinSum)?;
//! assert_eq!(outcome.status, DecodeStatus::Converged);
//! assert!(graph.syndrome(&outcome.codeword)?.iter().all(|&b| b == Bit::Zero));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

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

mod common;
mod decision;
mod decoder;
mod fixed;
mod graph;

pub mod alist;
pub mod construction;
pub mod messages;
pub mod rules;
pub mod sim;
pub mod utils;

pub use common::{Bit, Error};
pub use decision::{bit_from_llr, hard_decision, num_unsatisfied_checks, DecodeState};
pub use decoder::{
    decode, CheckRule, DecodeOutcome, DecodeStatus, Decoder, HistoryRecorder, IterationObserver,
    IterationRecord, IterationSnapshot, Strategy,
};
pub use fixed::{Fixed, FixedFormat, TanhTable};
pub use graph::{ParityCheckMatrix, TannerGraph};
pub use messages::MessageStore;
