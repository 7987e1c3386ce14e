//! Hard decisions, syndrome checks and the termination state machine of the decoder

use serde::{Deserialize, Serialize};

use crate::{Bit, TannerGraph};

/// Returns hard decision on a bit from its LLR value (`One` if negative, `Zero` otherwise).
///
/// # Examples
///
/// ```
/// use ldpc_bp::{bit_from_llr, Bit};
///
/// assert_eq!(bit_from_llr(-0.5), Bit::One);
/// assert_eq!(bit_from_llr(0.0), Bit::Zero);
/// ```
#[must_use]
pub fn bit_from_llr(llr: f64) -> Bit {
    if llr < 0.0 {
        Bit::One
    } else {
        Bit::Zero
    }
}

/// Returns hard decisions on bits from their LLR values.
#[must_use]
pub fn hard_decision(beliefs: &[f64]) -> Vec<Bit> {
    beliefs.iter().map(|&x| bit_from_llr(x)).collect()
}

/// Returns number of checks whose parity is not satisfied by a word.
///
/// # Panics
///
/// Panics if `word` has fewer bits than the graph has variable nodes.
#[must_use]
pub fn num_unsatisfied_checks(graph: &TannerGraph, word: &[Bit]) -> usize {
    (0 .. graph.num_checks())
        .filter(|&check| graph.check_parity(check, word) == Bit::One)
        .count()
}

/// State of a decoding attempt
#[derive(Clone, Copy, Eq, Hash, PartialEq, Debug, Deserialize, Serialize)]
pub enum DecodeState {
    /// Decoding continues after the given iteration
    Running(u32),
    /// Hard decision after the given iteration is a codeword
    Converged(u32),
    /// No codeword found within the iteration limit
    Exhausted,
}

impl DecodeState {
    /// Returns state reached at the end of an iteration.
    ///
    /// # Parameters
    ///
    /// - `iteration`: Number of the iteration just completed (`0` for the check made on the
    ///   channel LLR values before any message passing).
    ///
    /// - `num_unsatisfied_checks`: Number of unsatisfied checks for the hard decision made in
    ///   this iteration.
    ///
    /// - `max_iterations`: Iteration limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpc_bp::DecodeState;
    ///
    /// assert_eq!(DecodeState::after_iteration(3, 0, 5), DecodeState::Converged(3));
    /// assert_eq!(DecodeState::after_iteration(3, 2, 5), DecodeState::Running(3));
    /// assert_eq!(DecodeState::after_iteration(5, 2, 5), DecodeState::Exhausted);
    /// ```
    #[must_use]
    pub fn after_iteration(
        iteration: u32,
        num_unsatisfied_checks: usize,
        max_iterations: u32,
    ) -> Self {
        if num_unsatisfied_checks == 0 {
            DecodeState::Converged(iteration)
        } else if iteration >= max_iterations {
            DecodeState::Exhausted
        } else {
            DecodeState::Running(iteration)
        }
    }

    /// Returns `true` if no further iterations follow this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, DecodeState::Running(_))
    }
}
