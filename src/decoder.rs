//! Belief-propagation decoder for LDPC codes
//!
//! One decoding attempt alternates between a check-node phase and a variable-node phase. After
//! each check-node phase, the belief of every variable is recomputed and a hard decision is made
//! on it. Decoding stops as soon as the hard decision satisfies every check, or when the
//! iteration limit is reached.

use std::ops::ControlFlow;

use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::decision::{num_unsatisfied_checks, DecodeState};
use crate::fixed::{FixedFormat, TanhTable};
use crate::messages::MessageStore;
use crate::rules::{
    compute_beliefs, update_check_nodes, update_variable_nodes, Arithmetic, FixedMinSum,
    FixedSumProduct, MinSum, SumProduct,
};
use crate::{Bit, Error, TannerGraph};

/// Enumeration of check-node update rules
#[derive(Clone, Eq, Hash, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum CheckRule {
    /// Exact sum-product (`tanh`/`atanh`) rule
    SumProduct,
    /// Min-sum approximation
    MinSum,
}

/// Enumeration of decoding strategies
#[derive(Clone, Eq, Hash, PartialEq, Debug, Copy, Deserialize, Serialize)]
pub enum Strategy {
    /// Floating-point sum-product decoding
    SumProduct,
    /// Floating-point min-sum decoding
    MinSum,
    /// Decoding with saturating fixed-point messages
    FixedPoint {
        /// Number of integer bits of a message, including the sign bit
        int_bits: u32,
        /// Number of fractional bits of a message
        frac_bits: u32,
        /// Check-node update rule
        check_rule: CheckRule,
    },
}

impl Strategy {
    /// Returns fixed-point min-sum strategy with given message format.
    #[must_use]
    pub fn fixed_point(int_bits: u32, frac_bits: u32) -> Self {
        Strategy::FixedPoint {
            int_bits,
            frac_bits,
            check_rule: CheckRule::MinSum,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::SumProduct => write!(f, "Sum-product decoding"),
            Strategy::MinSum => write!(f, "Min-sum decoding"),
            Strategy::FixedPoint {
                int_bits,
                frac_bits,
                check_rule,
            } => write!(
                f,
                "Fixed-point {} decoding ({int_bits} integer bits, {frac_bits} fractional bits)",
                match check_rule {
                    CheckRule::SumProduct => "sum-product",
                    CheckRule::MinSum => "min-sum",
                },
            ),
        }
    }
}

/// Enumeration of ways in which a decoding attempt can end
#[derive(Clone, Copy, Eq, Hash, PartialEq, Debug, Deserialize, Serialize)]
pub enum DecodeStatus {
    /// Hard decision is a codeword
    Converged,
    /// Iteration limit reached without finding a codeword
    Exhausted,
    /// Stopped by an observer before the iteration limit
    Cancelled,
}

/// Result of a decoding attempt
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct DecodeOutcome {
    /// How decoding ended
    pub status: DecodeStatus,
    /// Number of message-passing iterations performed (`0` if the channel LLR values alone
    /// gave a codeword)
    pub iterations: u32,
    /// Hard decision after the last iteration (a best effort unless `status` is `Converged`)
    pub codeword: Vec<Bit>,
    /// Variable beliefs after the last iteration
    pub beliefs: Vec<f64>,
}

impl DecodeOutcome {
    /// Returns `true` if decoding produced a codeword.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.status == DecodeStatus::Converged
    }
}

/// Decoder state visible to an observer at the end of an iteration
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct IterationSnapshot<'a> {
    /// Iteration number (`0` for the check made before any message passing)
    pub iteration: u32,
    /// Variable beliefs
    pub beliefs: &'a [f64],
    /// Hard decision on the beliefs
    pub codeword: &'a [Bit],
    /// Number of checks not satisfied by the hard decision
    pub num_unsatisfied_checks: usize,
}

/// Hook called by the decoder at the end of every iteration
///
/// Returning [`ControlFlow::Break`] cancels decoding before the next iteration starts. A
/// decoding attempt is never interrupted partway through an update phase.
pub trait IterationObserver {
    /// Observes decoder state at the end of an iteration.
    fn observe(&mut self, snapshot: &IterationSnapshot<'_>) -> ControlFlow<()>;
}

impl<F> IterationObserver for F
where
    F: FnMut(&IterationSnapshot<'_>) -> ControlFlow<()>,
{
    fn observe(&mut self, snapshot: &IterationSnapshot<'_>) -> ControlFlow<()> {
        self(snapshot)
    }
}

/// Observer that never cancels decoding
#[derive(Clone, Copy, Debug, Default)]
struct NoObserver;

impl IterationObserver for NoObserver {
    fn observe(&mut self, _snapshot: &IterationSnapshot<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Decoder state recorded at the end of an iteration
#[derive(Clone, PartialEq, Debug, Deserialize, Serialize)]
pub struct IterationRecord {
    /// Iteration number
    pub iteration: u32,
    /// Variable beliefs
    pub beliefs: Vec<f64>,
    /// Hard decision on the beliefs
    pub codeword: Vec<Bit>,
    /// Number of checks not satisfied by the hard decision
    pub num_unsatisfied_checks: usize,
}

/// Observer that records the decoder state at every iteration
#[derive(Clone, PartialEq, Debug, Default, Deserialize, Serialize)]
pub struct HistoryRecorder {
    /// Records, in iteration order
    pub records: Vec<IterationRecord>,
}

impl HistoryRecorder {
    /// Returns empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IterationObserver for HistoryRecorder {
    fn observe(&mut self, snapshot: &IterationSnapshot<'_>) -> ControlFlow<()> {
        self.records.push(IterationRecord {
            iteration: snapshot.iteration,
            beliefs: snapshot.beliefs.to_vec(),
            codeword: snapshot.codeword.to_vec(),
            num_unsatisfied_checks: snapshot.num_unsatisfied_checks,
        });
        ControlFlow::Continue(())
    }
}

/// Arithmetic selected by a strategy, with any precomputed tables it needs
#[derive(Clone, Debug)]
enum Engine {
    SumProduct,
    MinSum,
    FixedMinSum(FixedFormat),
    FixedSumProduct(FixedFormat, TanhTable),
}

/// Belief-propagation decoder for the code of a given Tanner graph
///
/// The decoder holds only read-only data (the graph, the strategy and any lookup table), so one
/// decoder can serve many decoding attempts, including concurrent ones.
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    /// Tanner graph of the code
    graph: &'a TannerGraph,
    /// Decoding strategy
    strategy: Strategy,
    /// Arithmetic for the strategy
    engine: Engine,
    /// Whether to check the hard decision on the channel LLR values before message passing
    zero_iteration_check: bool,
}

impl<'a> Decoder<'a> {
    /// Returns decoder for given Tanner graph and strategy.
    ///
    /// The `tanh` lookup table needed by fixed-point sum-product decoding is computed here,
    /// once, in the [`FixedFormat::TANH_TABLE`] format. A table saved earlier can be used
    /// instead with [`Self::with_tanh_table`].
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy has an invalid fixed-point format.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpc_bp::{Decoder, ParityCheckMatrix, Strategy, TannerGraph};
    ///
    /// let rows = [vec![0, 1, 2, 4], vec![1, 2, 3, 5], vec![2, 3, 4, 6]];
    /// let graph = TannerGraph::new(&ParityCheckMatrix::new(7, &rows)?)?;
    /// let decoder = Decoder::new(&graph, Strategy::MinSum)?;
    /// let outcome = decoder.decode(&[1.7, -1.7, 1.7, 1.7, 1.7, 1.7, 1.7], 20)?;
    /// assert!(outcome.is_converged());
    /// assert_eq!(outcome.iterations, 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(graph: &'a TannerGraph, strategy: Strategy) -> Result<Self, Error> {
        let engine = match strategy {
            Strategy::SumProduct => Engine::SumProduct,
            Strategy::MinSum => Engine::MinSum,
            Strategy::FixedPoint {
                int_bits,
                frac_bits,
                check_rule: CheckRule::MinSum,
            } => Engine::FixedMinSum(FixedFormat::new(int_bits, frac_bits)?),
            Strategy::FixedPoint {
                int_bits,
                frac_bits,
                check_rule: CheckRule::SumProduct,
            } => Engine::FixedSumProduct(
                FixedFormat::new(int_bits, frac_bits)?,
                TanhTable::new(FixedFormat::TANH_TABLE)?,
            ),
        };
        debug!(
            "{strategy}: {} variables, {} checks, {} edges",
            graph.num_vars(),
            graph.num_checks(),
            graph.num_edges()
        );
        Ok(Self {
            graph,
            strategy,
            engine,
            zero_iteration_check: true,
        })
    }

    /// Returns decoder that uses the given `tanh` lookup table.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy is not fixed-point sum-product decoding.
    pub fn with_tanh_table(mut self, table: TanhTable) -> Result<Self, Error> {
        match self.engine {
            Engine::FixedSumProduct(format, _) => {
                self.engine = Engine::FixedSumProduct(format, table);
                Ok(self)
            }
            _ => Err(Error::InvalidInput(format!(
                "{} does not use a tanh lookup table",
                self.strategy
            ))),
        }
    }

    /// Returns decoder that does (`true`, the default) or does not (`false`) check the hard
    /// decision on the channel LLR values before the first iteration.
    ///
    /// Without this check, decoding always performs at least one iteration.
    #[must_use]
    pub fn zero_iteration_check(mut self, enabled: bool) -> Self {
        self.zero_iteration_check = enabled;
        self
    }

    /// Returns Tanner graph of the code.
    #[must_use]
    pub fn graph(&self) -> &'a TannerGraph {
        self.graph
    }

    /// Returns decoding strategy.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns outcome of decoding given channel LLR values.
    ///
    /// # Parameters
    ///
    /// - `llr`: Channel LLR values, one per variable, with positive values indicating that
    ///   `Zero` is more likely.
    ///
    /// - `max_iterations`: Maximum number of message-passing iterations (at least `1`).
    ///
    /// # Returns
    ///
    /// - `outcome`: Decoding outcome. Non-convergence is reported through its status, not as an
    ///   error.
    ///
    /// # Errors
    ///
    /// Returns an error if `llr.len()` is not equal to the number of variables, if any LLR value
    /// is `NaN`, or if `max_iterations` is `0`.
    pub fn decode(&self, llr: &[f64], max_iterations: u32) -> Result<DecodeOutcome, Error> {
        self.decode_observed(llr, max_iterations, &mut NoObserver)
    }

    /// Returns outcome of decoding given channel LLR values, calling an observer at the end of
    /// every iteration.
    ///
    /// # Parameters
    ///
    /// - `llr`: Channel LLR values, one per variable, with positive values indicating that
    ///   `Zero` is more likely.
    ///
    /// - `max_iterations`: Maximum number of message-passing iterations (at least `1`).
    ///
    /// - `observer`: Observer of the decoder state. Decoding ends with status `Cancelled` if the
    ///   observer breaks at an iteration that neither converged nor reached the limit.
    ///
    /// # Errors
    ///
    /// Returns an error if `llr.len()` is not equal to the number of variables, if any LLR value
    /// is `NaN`, or if `max_iterations` is `0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ldpc_bp::{Decoder, HistoryRecorder, ParityCheckMatrix, Strategy, TannerGraph};
    ///
    /// let rows = [vec![0, 1, 2, 4], vec![1, 2, 3, 5], vec![2, 3, 4, 6]];
    /// let graph = TannerGraph::new(&ParityCheckMatrix::new(7, &rows)?)?;
    /// let decoder = Decoder::new(&graph, Strategy::SumProduct)?;
    /// let a = (0.85_f64 / 0.15).ln(); // BSC with crossover probability 0.15
    /// let llr = [a, -a, a, a, a, a, a];
    /// let mut history = HistoryRecorder::new();
    /// let outcome = decoder.decode_observed(&llr, 20, &mut history)?;
    /// assert_eq!(outcome.iterations, 2);
    /// assert_eq!(history.records.len(), 3);
    /// assert_eq!(history.records[2].num_unsatisfied_checks, 0);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn decode_observed<O: IterationObserver + ?Sized>(
        &self,
        llr: &[f64],
        max_iterations: u32,
        observer: &mut O,
    ) -> Result<DecodeOutcome, Error> {
        self.check_decode_inputs(llr, max_iterations)?;
        let outcome = match &self.engine {
            Engine::SumProduct => self.run(&SumProduct, llr, max_iterations, observer),
            Engine::MinSum => self.run(&MinSum, llr, max_iterations, observer),
            Engine::FixedMinSum(format) => {
                self.run(&FixedMinSum { format: *format }, llr, max_iterations, observer)
            }
            Engine::FixedSumProduct(format, table) => self.run(
                &FixedSumProduct {
                    format: *format,
                    table,
                },
                llr,
                max_iterations,
                observer,
            ),
        };
        debug!(
            "{:?} after {} iterations",
            outcome.status, outcome.iterations
        );
        Ok(outcome)
    }

    /// Returns outcomes of decoding several words, decoded in parallel.
    ///
    /// # Errors
    ///
    /// Returns an error if any word fails the input checks of [`Self::decode`].
    pub fn decode_batch(
        &self,
        llrs: &[Vec<f64>],
        max_iterations: u32,
    ) -> Result<Vec<DecodeOutcome>, Error> {
        llrs.par_iter()
            .map(|llr| self.decode(llr, max_iterations))
            .collect()
    }

    /// Checks inputs to a decoding attempt.
    fn check_decode_inputs(&self, llr: &[f64], max_iterations: u32) -> Result<(), Error> {
        if llr.len() != self.graph.num_vars() {
            return Err(Error::DimensionMismatch {
                expected: self.graph.num_vars(),
                found: llr.len(),
            });
        }
        if llr.iter().any(|x| x.is_nan()) {
            return Err(Error::InvalidInput(
                "LLR values must not be NaN".to_string(),
            ));
        }
        if max_iterations == 0 {
            return Err(Error::InvalidInput(
                "Maximum number of iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Runs the decoding state machine with the given arithmetic.
    fn run<A: Arithmetic, O: IterationObserver + ?Sized>(
        &self,
        arithmetic: &A,
        llr: &[f64],
        max_iterations: u32,
        observer: &mut O,
    ) -> DecodeOutcome {
        let mut ws = Workspace::new(self.graph, arithmetic, llr);
        let mut iteration = 0;
        if !self.zero_iteration_check {
            ws.check_phase();
            iteration = 1;
        }
        loop {
            let num_unsatisfied = ws.decide();
            let beliefs = ws.beliefs();
            trace!("Iteration {iteration}: {num_unsatisfied} unsatisfied checks");
            let flow = observer.observe(&IterationSnapshot {
                iteration,
                beliefs: &beliefs,
                codeword: &ws.codeword,
                num_unsatisfied_checks: num_unsatisfied,
            });
            let state = DecodeState::after_iteration(iteration, num_unsatisfied, max_iterations);
            if state.is_terminal() || flow.is_break() {
                let status = match state {
                    DecodeState::Converged(_) => DecodeStatus::Converged,
                    DecodeState::Exhausted => DecodeStatus::Exhausted,
                    DecodeState::Running(_) => DecodeStatus::Cancelled,
                };
                return DecodeOutcome {
                    status,
                    iterations: iteration,
                    codeword: ws.codeword,
                    beliefs,
                };
            }
            ws.variable_phase();
            ws.check_phase();
            iteration += 1;
        }
    }
}

/// Returns outcome of decoding given channel LLR values.
///
/// This builds a [`Decoder`] for a single decoding attempt. Build the decoder once instead when
/// decoding many words with the same code and strategy.
///
/// # Parameters
///
/// - `graph`: Tanner graph of the code.
///
/// - `llr`: Channel LLR values, one per variable, with positive values indicating that `Zero` is
///   more likely.
///
/// - `max_iterations`: Maximum number of message-passing iterations (at least `1`).
///
/// - `strategy`: Decoding strategy.
///
/// # Errors
///
/// Returns an error if the strategy has an invalid fixed-point format, if `llr.len()` is not
/// equal to the number of variables, if any LLR value is `NaN`, or if `max_iterations` is `0`.
///
/// # Examples
///
/// ```
/// use ldpc_bp::{decode, Bit, DecodeStatus, ParityCheckMatrix, Strategy, TannerGraph};
/// use Bit::{One, Zero};
///
/// // Single parity check on six bits
/// let graph = TannerGraph::new(&ParityCheckMatrix::new(6, &[vec![0, 1, 2, 3, 4, 5]])?)?;
/// let outcome = decode(&graph, &[-2.0, -2.0, -1.0, 2.0, -2.0, 0.0], 10, Strategy::SumProduct)?;
/// assert_eq!(outcome.status, DecodeStatus::Converged);
/// assert_eq!(outcome.iterations, 0);
/// assert_eq!(outcome.codeword, [One, One, One, Zero, One, Zero]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode(
    graph: &TannerGraph,
    llr: &[f64],
    max_iterations: u32,
    strategy: Strategy,
) -> Result<DecodeOutcome, Error> {
    Decoder::new(graph, strategy)?.decode(llr, max_iterations)
}

/// Per-attempt decoder state
struct Workspace<'g, 'a, A: Arithmetic> {
    /// Tanner graph of the code
    graph: &'g TannerGraph,
    /// Message arithmetic
    arithmetic: &'a A,
    /// Channel LLR values in the message representation
    llr: Vec<A::Msg>,
    /// Edge messages
    store: MessageStore<A::Msg>,
    /// Variable beliefs in the message representation
    beliefs: Vec<A::Msg>,
    /// Hard decision on the beliefs
    codeword: Vec<Bit>,
}

impl<'g, 'a, A: Arithmetic> Workspace<'g, 'a, A> {
    /// Returns workspace with beliefs equal to the channel LLR values.
    fn new(graph: &'g TannerGraph, arithmetic: &'a A, llr: &[f64]) -> Self {
        let llr: Vec<A::Msg> = llr.iter().map(|&x| arithmetic.quantize(x)).collect();
        Self {
            graph,
            arithmetic,
            store: MessageStore::new(graph, &llr),
            beliefs: llr.clone(),
            llr,
            codeword: vec![Bit::Zero; graph.num_vars()],
        }
    }

    /// Updates check-to-variable messages, and then the beliefs.
    fn check_phase(&mut self) {
        let (var_to_check, check_to_var) = self.store.for_check_phase();
        update_check_nodes(self.graph, self.arithmetic, var_to_check, check_to_var);
        compute_beliefs(
            self.graph,
            self.arithmetic,
            &self.llr,
            self.store.check_to_var(),
            &mut self.beliefs,
        );
    }

    /// Updates variable-to-check messages.
    fn variable_phase(&mut self) {
        let (check_to_var, var_to_check) = self.store.for_variable_phase();
        update_variable_nodes(
            self.graph,
            self.arithmetic,
            &self.beliefs,
            check_to_var,
            var_to_check,
        );
    }

    /// Makes hard decision on the beliefs, and returns number of unsatisfied checks.
    fn decide(&mut self) -> usize {
        for (bit, &belief) in self.codeword.iter_mut().zip(&self.beliefs) {
            *bit = if self.arithmetic.is_negative(belief) {
                Bit::One
            } else {
                Bit::Zero
            };
        }
        num_unsatisfied_checks(self.graph, &self.codeword)
    }

    /// Returns beliefs as real numbers.
    fn beliefs(&self) -> Vec<f64> {
        self.beliefs
            .iter()
            .map(|&x| self.arithmetic.value(x))
            .collect()
    }
}

#[cfg(test)]
mod tests_of_decoder {
    use super::*;
    use crate::decision::hard_decision;
    use crate::graph::tests_of_parity_check_matrix::hamming_rows;
    use crate::ParityCheckMatrix;
    use float_eq::assert_float_eq;
    use Bit::{One, Zero};

    /// Returns beliefs after a fixed number of iterations, without stopping at a codeword.
    fn beliefs_after(graph: &TannerGraph, llr: &[f64], iterations: u32) -> Vec<f64> {
        let mut ws = Workspace::new(graph, &SumProduct, llr);
        ws.check_phase();
        for _ in 1 .. iterations {
            ws.variable_phase();
            ws.check_phase();
        }
        ws.beliefs()
    }

    fn graph_from_rows(num_vars: usize, rows: &[Vec<usize>]) -> TannerGraph {
        TannerGraph::new(&ParityCheckMatrix::new(num_vars, rows).unwrap()).unwrap()
    }

    fn single_parity_check(num_vars: usize) -> TannerGraph {
        graph_from_rows(num_vars, &[(0 .. num_vars).collect()])
    }

    /// LLR magnitude for a binary symmetric channel with crossover probability 0.15
    fn bsc_llr() -> f64 {
        (0.85_f64 / 0.15).ln()
    }

    /// Returns LLR values for the all-zero codeword with the given bits flipped by the channel.
    fn received_all_zero(num_vars: usize, flipped: &[usize]) -> Vec<f64> {
        let mut llr = vec![bsc_llr(); num_vars];
        for &var in flipped {
            llr[var] = -bsc_llr();
        }
        llr
    }

    /// Returns a-posteriori LLR values by enumerating all codewords.
    fn brute_force_app(graph: &TannerGraph, llr: &[f64]) -> Vec<f64> {
        let num_vars = graph.num_vars();
        let mut prob_zero = vec![0.0; num_vars];
        let mut prob_one = vec![0.0; num_vars];
        for index in 0 .. 1usize << num_vars {
            let word: Vec<Bit> = (0 .. num_vars)
                .map(|var| Bit::from_parity(index >> var))
                .collect();
            if num_unsatisfied_checks(graph, &word) > 0 {
                continue;
            }
            let weight = word
                .iter()
                .zip(llr)
                .map(|(&bit, &x)| if bit == One { (-x).exp() } else { 1.0 })
                .product::<f64>();
            for (var, &bit) in word.iter().enumerate() {
                match bit {
                    Zero => prob_zero[var] += weight,
                    One => prob_one[var] += weight,
                }
            }
        }
        prob_zero
            .iter()
            .zip(&prob_one)
            .map(|(p0, p1)| (p0 / p1).ln())
            .collect()
    }

    #[test]
    fn test_new() {
        let graph = single_parity_check(4);
        assert!(Decoder::new(&graph, Strategy::fixed_point(0, 4)).is_err());
        assert!(Decoder::new(&graph, Strategy::fixed_point(30, 4)).is_err());
        // Strategy deserialized with absurd bit counts
        let strategy: Strategy = serde_json::from_str(
            r#"{"FixedPoint":{"int_bits":4294967295,"frac_bits":4,"check_rule":"MinSum"}}"#,
        )
        .unwrap();
        assert!(Decoder::new(&graph, strategy).is_err());
        let decoder = Decoder::new(&graph, Strategy::fixed_point(16, 4)).unwrap();
        assert_eq!(decoder.strategy(), Strategy::fixed_point(16, 4));
        assert_eq!(decoder.graph().num_vars(), 4);
    }

    #[test]
    fn test_with_tanh_table() {
        let graph = single_parity_check(4);
        let table = TanhTable::new(FixedFormat::TANH_TABLE).unwrap();
        assert!(Decoder::new(&graph, Strategy::MinSum)
            .unwrap()
            .with_tanh_table(table.clone())
            .is_err());
        let strategy = Strategy::FixedPoint {
            int_bits: 16,
            frac_bits: 4,
            check_rule: CheckRule::SumProduct,
        };
        assert!(Decoder::new(&graph, strategy)
            .unwrap()
            .with_tanh_table(table)
            .is_ok());
    }

    #[test]
    fn test_invalid_inputs() {
        let graph = graph_from_rows(7, &hamming_rows());
        let decoder = Decoder::new(&graph, Strategy::SumProduct).unwrap();
        assert!(matches!(
            decoder.decode(&[1.0; 6], 10),
            Err(Error::DimensionMismatch {
                expected: 7,
                found: 6
            })
        ));
        assert!(matches!(
            decoder.decode(&[1.0; 8], 10),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            decoder.decode(&[1.0; 7], 0),
            Err(Error::InvalidInput(_))
        ));
        let mut llr = [1.0; 7];
        llr[3] = f64::NAN;
        assert!(decoder.decode(&llr, 10).is_err());
    }

    #[test]
    fn test_noiseless_codeword() {
        let graph = graph_from_rows(7, &hamming_rows());
        let codeword = [One, Zero, Zero, Zero, One, Zero, One];
        let llr: Vec<f64> = codeword
            .iter()
            .map(|&bit| if bit == One { -10.0 } else { 10.0 })
            .collect();
        for strategy in [
            Strategy::SumProduct,
            Strategy::MinSum,
            Strategy::fixed_point(16, 4),
            Strategy::FixedPoint {
                int_bits: 16,
                frac_bits: 4,
                check_rule: CheckRule::SumProduct,
            },
        ] {
            let decoder = Decoder::new(&graph, strategy).unwrap();
            let outcome = decoder.decode(&llr, 20).unwrap();
            assert_eq!(outcome.status, DecodeStatus::Converged);
            assert_eq!(outcome.iterations, 0);
            assert_eq!(outcome.codeword, codeword);
            assert_float_eq!(outcome.beliefs, llr.clone(), abs_all <= 1e-12);
            let outcome = decoder
                .zero_iteration_check(false)
                .decode(&llr, 20)
                .unwrap();
            assert_eq!(outcome.status, DecodeStatus::Converged);
            assert_eq!(outcome.iterations, 1);
            assert_eq!(outcome.codeword, codeword);
        }
    }

    #[test]
    fn test_single_parity_check_scenario() {
        let graph = single_parity_check(6);
        let llr = [-2.0, -2.0, -1.0, 2.0, -2.0, 0.0];
        let app = brute_force_app(&graph, &llr);
        let app_decision = hard_decision(&app);
        // Hard decision on the channel LLR values is already a codeword.
        let outcome = decode(&graph, &llr, 10, Strategy::SumProduct).unwrap();
        assert_eq!(outcome.status, DecodeStatus::Converged);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.codeword, [One, One, One, Zero, One, Zero]);
        assert_eq!(outcome.codeword, app_decision);
        // One iteration on a single check gives the exact a-posteriori LLR values.
        let outcome = Decoder::new(&graph, Strategy::SumProduct)
            .unwrap()
            .zero_iteration_check(false)
            .decode(&llr, 10)
            .unwrap();
        assert_eq!(outcome.status, DecodeStatus::Converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.codeword, app_decision);
        assert_float_eq!(outcome.beliefs, app, abs_all <= 1e-9);
        assert_float_eq!(outcome.beliefs[5], 0.313_482_137_998_946_5, abs <= 1e-9);
    }

    #[test]
    fn test_single_parity_check_scenario_fixed_point() {
        let graph = single_parity_check(6);
        let llr = [-2.0, -2.0, -1.0, 2.0, -2.0, 0.0];
        let fixed_sum_product = Strategy::FixedPoint {
            int_bits: 16,
            frac_bits: 4,
            check_rule: CheckRule::SumProduct,
        };
        let outcome = Decoder::new(&graph, fixed_sum_product)
            .unwrap()
            .zero_iteration_check(false)
            .decode(&llr, 10)
            .unwrap();
        assert_eq!(outcome.status, DecodeStatus::Converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.codeword, [One, One, One, Zero, One, Zero]);
        assert_float_eq!(outcome.beliefs[5], 0.25, abs <= 0.0);
        let outcome = Decoder::new(&graph, Strategy::fixed_point(16, 4))
            .unwrap()
            .zero_iteration_check(false)
            .decode(&llr, 10)
            .unwrap();
        assert_eq!(outcome.iterations, 1);
        assert_float_eq!(outcome.beliefs[5], 1.0, abs <= 0.0);
    }

    #[test]
    fn test_exact_app_on_trees() {
        // Cycle-free Tanner graphs, with the number of iterations needed for exact results
        let codes = [
            (7, vec![(0 .. 7).collect::<Vec<usize>>()], 1),
            (5, vec![vec![0, 1, 2], vec![2, 3, 4]], 2),
            (7, vec![vec![0, 1, 2], vec![2, 3, 4], vec![4, 5, 6]], 3),
        ];
        for (num_vars, rows, depth) in codes {
            let graph = graph_from_rows(num_vars, &rows);
            for pattern in 0 .. 1usize << num_vars {
                let flipped: Vec<usize> = (0 .. num_vars)
                    .filter(|&var| (pattern >> var) & 1 == 1)
                    .collect();
                let llr = received_all_zero(num_vars, &flipped);
                let app = brute_force_app(&graph, &llr);
                for iterations in [depth, depth + 2] {
                    let beliefs = beliefs_after(&graph, &llr, iterations);
                    assert_float_eq!(beliefs, app.clone(), abs_all <= 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_hamming_scenario_sum_product() {
        let graph = graph_from_rows(7, &hamming_rows());
        let decoder = Decoder::new(&graph, Strategy::SumProduct).unwrap();
        for flipped in 0 .. 7 {
            let llr = received_all_zero(7, &[flipped]);
            let mut history = HistoryRecorder::new();
            let outcome = decoder.decode_observed(&llr, 20, &mut history).unwrap();
            match flipped {
                2 => {
                    assert_eq!(outcome.status, DecodeStatus::Converged);
                    assert_eq!(outcome.iterations, 1);
                    assert_eq!(outcome.codeword, [Zero; 7]);
                }
                1 | 3 | 4 => {
                    assert_eq!(outcome.status, DecodeStatus::Converged);
                    assert_eq!(outcome.iterations, 2);
                    assert_eq!(outcome.codeword, [Zero; 7]);
                }
                _ => {
                    assert_eq!(outcome.status, DecodeStatus::Exhausted);
                    assert_eq!(outcome.iterations, 20);
                    assert_eq!(outcome.codeword, hard_decision(&llr));
                }
            }
            // One record per iteration, and only the last can have a zero syndrome.
            assert_eq!(history.records.len(), outcome.iterations as usize + 1);
            for (k, record) in history.records.iter().enumerate() {
                assert_eq!(record.iteration as usize, k);
                assert_eq!(
                    record.num_unsatisfied_checks,
                    num_unsatisfied_checks(&graph, &record.codeword)
                );
                let is_last = k == history.records.len() - 1;
                assert_eq!(
                    record.num_unsatisfied_checks == 0,
                    is_last && outcome.is_converged()
                );
            }
            let last = &history.records[history.records.len() - 1];
            assert_eq!(last.codeword, outcome.codeword);
            assert_float_eq!(last.beliefs, outcome.beliefs.clone(), abs_all <= 0.0);
        }
    }

    #[test]
    fn test_hamming_scenario_min_sum() {
        let graph = graph_from_rows(7, &hamming_rows());
        for strategy in [Strategy::MinSum, Strategy::fixed_point(16, 4)] {
            let decoder = Decoder::new(&graph, strategy).unwrap();
            for flipped in 0 .. 7 {
                let outcome = decoder
                    .decode(&received_all_zero(7, &[flipped]), 20)
                    .unwrap();
                assert_eq!(outcome.status, DecodeStatus::Converged);
                assert_eq!(outcome.iterations, 1);
                // A flip of the bit shared by all checks leads to a different codeword.
                if flipped == 2 {
                    assert_eq!(outcome.codeword, [Zero, One, Zero, One, One, Zero, Zero]);
                } else {
                    assert_eq!(outcome.codeword, [Zero; 7]);
                }
            }
        }
    }

    #[test]
    fn test_hamming_scenario_fixed_sum_product() {
        let graph = graph_from_rows(7, &hamming_rows());
        let strategy = Strategy::FixedPoint {
            int_bits: 16,
            frac_bits: 4,
            check_rule: CheckRule::SumProduct,
        };
        let fixed = Decoder::new(&graph, strategy).unwrap();
        let float = Decoder::new(&graph, Strategy::SumProduct).unwrap();
        for flipped in 0 .. 7 {
            let llr = received_all_zero(7, &[flipped]);
            let fixed_outcome = fixed.decode(&llr, 20).unwrap();
            let float_outcome = float.decode(&llr, 20).unwrap();
            assert_eq!(fixed_outcome.status, float_outcome.status);
            assert_eq!(fixed_outcome.iterations, float_outcome.iterations);
            assert_eq!(fixed_outcome.codeword, float_outcome.codeword);
        }
    }

    #[test]
    fn test_converged_codeword_satisfies_every_check() {
        let rows = hamming_rows();
        let matrix = ParityCheckMatrix::new(7, &rows).unwrap();
        let graph = TannerGraph::new(&matrix).unwrap();
        for strategy in [Strategy::SumProduct, Strategy::MinSum, Strategy::fixed_point(16, 4)] {
            let decoder = Decoder::new(&graph, strategy).unwrap();
            for pattern in 0 .. 1usize << 7 {
                let flipped: Vec<usize> =
                    (0 .. 7).filter(|&var| (pattern >> var) & 1 == 1).collect();
                let outcome = decoder.decode(&received_all_zero(7, &flipped), 20).unwrap();
                if outcome.is_converged() {
                    assert!(matrix.is_codeword(&outcome.codeword).unwrap());
                    // Direct check of H * c = 0 (mod 2)
                    for row in &rows {
                        let ones = row.iter().filter(|&&var| outcome.codeword[var] == One).count();
                        assert_eq!(ones % 2, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_cancellation() {
        let graph = graph_from_rows(7, &hamming_rows());
        let decoder = Decoder::new(&graph, Strategy::SumProduct).unwrap();
        let llr = received_all_zero(7, &[0]);
        let mut calls = 0;
        let mut stop_after_three = |snapshot: &IterationSnapshot<'_>| {
            calls += 1;
            if snapshot.iteration == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        };
        let outcome = decoder
            .decode_observed(&llr, 20, &mut stop_after_three)
            .unwrap();
        assert_eq!(outcome.status, DecodeStatus::Cancelled);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(calls, 4);
        let mut stop_at_once = |_: &IterationSnapshot<'_>| ControlFlow::Break(());
        let outcome = decoder
            .decode_observed(&received_all_zero(7, &[2]), 20, &mut stop_at_once)
            .unwrap();
        assert_eq!(outcome.status, DecodeStatus::Cancelled);
        assert_eq!(outcome.iterations, 0);
        // Breaking at a converged iteration still reports convergence.
        let outcome = decoder
            .decode_observed(&received_all_zero(7, &[]), 20, &mut stop_at_once)
            .unwrap();
        assert_eq!(outcome.status, DecodeStatus::Converged);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_decode_batch() {
        let graph = graph_from_rows(7, &hamming_rows());
        let decoder = Decoder::new(&graph, Strategy::MinSum).unwrap();
        let llrs: Vec<Vec<f64>> = (0 .. 7).map(|var| received_all_zero(7, &[var])).collect();
        let outcomes = decoder.decode_batch(&llrs, 20).unwrap();
        assert_eq!(outcomes.len(), 7);
        for (llr, outcome) in llrs.iter().zip(&outcomes) {
            assert_eq!(outcome, &decoder.decode(llr, 20).unwrap());
        }
        let mut llrs = llrs;
        llrs[4].pop();
        assert!(decoder.decode_batch(&llrs, 20).is_err());
    }

    #[test]
    fn test_saturated_channel() {
        // Huge channel LLR values must not produce NaN or infinite beliefs.
        let graph = graph_from_rows(7, &hamming_rows());
        let mut llr = vec![1e30; 7];
        llr[1] = -1e30;
        for strategy in [Strategy::SumProduct, Strategy::MinSum] {
            let outcome = Decoder::new(&graph, strategy)
                .unwrap()
                .zero_iteration_check(false)
                .decode(&llr, 5)
                .unwrap();
            assert!(outcome.beliefs.iter().all(|x| !x.is_nan()));
        }
        let outcome = decode(&graph, &llr, 5, Strategy::fixed_point(16, 4)).unwrap();
        let format = FixedFormat::MESSAGE;
        for &belief in &outcome.beliefs {
            assert!(belief <= format.to_f64(format.max()));
            assert!(belief >= format.to_f64(format.min()));
        }
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::SumProduct.to_string(), "Sum-product decoding");
        assert_eq!(
            Strategy::fixed_point(16, 4).to_string(),
            "Fixed-point min-sum decoding (16 integer bits, 4 fractional bits)"
        );
    }
}
