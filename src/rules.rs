//! Check-node and variable-node update rules
//!
//! Messages live in arrays indexed by Tanner graph edge number. Each update phase reads one
//! array and writes the other, so that every message computed in a phase depends only on
//! messages completed in the previous phase.
//!
//! The sum-product rule for a check computes, for each neighbor, the message
//! `2 * atanh(prod tanh(m / 2))` over the incoming messages `m` from all other neighbors. The
//! magnitude of the product is clamped to `MAX_TANH_PRODUCT` before `atanh` is applied, and the
//! sign is restored afterwards, so every message is finite and bounded in magnitude by
//! [`max_check_message`]. Saturation is silent and deterministic, and negating an incoming
//! message only flips the signs of the outgoing ones.
//!
//! The min-sum rule replaces the above by the product of the signs and the minimum of the
//! magnitudes of the other incoming messages. The sign of a zero message is taken to be `+1`.

use std::fmt::Debug;

use crate::fixed::{Fixed, FixedFormat, TanhTable};
use crate::TannerGraph;

/// Largest magnitude allowed for a product of `tanh` values before applying `atanh`
pub const MAX_TANH_PRODUCT: f64 = 1.0 - f64::EPSILON / 2.0;

/// Returns largest magnitude of a check-to-variable message (`2 * atanh(MAX_TANH_PRODUCT)`).
///
/// This is also the magnitude sent by a check with a single neighbor under the min-sum rule.
#[must_use]
pub fn max_check_message() -> f64 {
    2.0 * MAX_TANH_PRODUCT.atanh()
}

/// Returns sign of a message (`+1.0` for zero).
#[must_use]
pub fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Computes outgoing check-to-variable messages of a check by the sum-product rule.
///
/// # Parameters
///
/// - `incoming`: Variable-to-check messages received by the check, one per neighbor.
///
/// - `outgoing`: Buffer for check-to-variable messages, one per neighbor (same order as
///   `incoming`).
///
/// # Notes
///
/// The product excluding each neighbor is obtained as the product of a prefix and a suffix of
/// the `tanh` values, which avoids division and takes time linear in the check degree.
pub fn sum_product_check(incoming: &[f64], outgoing: &mut [f64]) {
    // Suffix products
    let mut running = 1.0;
    for (out, &x) in outgoing.iter_mut().zip(incoming).rev() {
        *out = running;
        running *= (x / 2.0).tanh();
    }
    // Prefix products, and messages
    let mut prefix = 1.0;
    for (out, &x) in outgoing.iter_mut().zip(incoming) {
        let product = prefix * *out;
        prefix *= (x / 2.0).tanh();
        // `atanh` loses precision near -1, so it is applied to the magnitude only.
        *out = sign(product) * 2.0 * product.abs().min(MAX_TANH_PRODUCT).atanh();
    }
}

/// Computes outgoing check-to-variable messages of a check by the min-sum rule.
///
/// # Parameters
///
/// - `incoming`: Variable-to-check messages received by the check, one per neighbor.
///
/// - `outgoing`: Buffer for check-to-variable messages, one per neighbor (same order as
///   `incoming`).
pub fn min_sum_check(incoming: &[f64], outgoing: &mut [f64]) {
    let mut total_sign = 1.0;
    let mut min1 = f64::INFINITY;
    let mut min2 = f64::INFINITY;
    let mut argmin = usize::MAX;
    for (k, &x) in incoming.iter().enumerate() {
        total_sign *= sign(x);
        let magnitude = x.abs();
        if magnitude < min1 {
            min2 = min1;
            min1 = magnitude;
            argmin = k;
        } else if magnitude < min2 {
            min2 = magnitude;
        }
    }
    for (p, (out, &x)) in outgoing.iter_mut().zip(incoming).enumerate() {
        let magnitude = if p == argmin { min2 } else { min1 };
        let magnitude = if magnitude.is_infinite() {
            max_check_message()
        } else {
            magnitude
        };
        *out = total_sign * sign(x) * magnitude;
    }
}

/// Number system and check-node rule used by the decoder
pub(crate) trait Arithmetic: Sync {
    /// Message type
    type Msg: Copy + Default + Send + Sync + Debug;

    /// Converts a channel LLR value to a message.
    fn quantize(&self, llr: f64) -> Self::Msg;

    /// Returns real value of a message.
    fn value(&self, msg: Self::Msg) -> f64;

    /// Returns sum of two messages.
    fn add(&self, x: Self::Msg, y: Self::Msg) -> Self::Msg;

    /// Returns difference of two messages.
    fn sub(&self, x: Self::Msg, y: Self::Msg) -> Self::Msg;

    /// Returns `true` if the message favors bit `One`.
    fn is_negative(&self, msg: Self::Msg) -> bool;

    /// Computes outgoing messages of a check from its incoming messages.
    fn check_node(&self, incoming: &[Self::Msg], outgoing: &mut [Self::Msg]);
}

/// Floating-point sum-product arithmetic
#[derive(Clone, Copy, Debug)]
pub(crate) struct SumProduct;

/// Floating-point min-sum arithmetic
#[derive(Clone, Copy, Debug)]
pub(crate) struct MinSum;

/// Fixed-point min-sum arithmetic
#[derive(Clone, Copy, Debug)]
pub(crate) struct FixedMinSum {
    /// Message format
    pub(crate) format: FixedFormat,
}

/// Fixed-point sum-product arithmetic based on a `tanh` lookup table
#[derive(Clone, Copy, Debug)]
pub(crate) struct FixedSumProduct<'a> {
    /// Message format
    pub(crate) format: FixedFormat,
    /// Lookup table for `tanh`
    pub(crate) table: &'a TanhTable,
}

impl Arithmetic for SumProduct {
    type Msg = f64;

    fn quantize(&self, llr: f64) -> f64 {
        llr
    }

    fn value(&self, msg: f64) -> f64 {
        msg
    }

    fn add(&self, x: f64, y: f64) -> f64 {
        x + y
    }

    fn sub(&self, x: f64, y: f64) -> f64 {
        x - y
    }

    fn is_negative(&self, msg: f64) -> bool {
        msg < 0.0
    }

    fn check_node(&self, incoming: &[f64], outgoing: &mut [f64]) {
        sum_product_check(incoming, outgoing);
    }
}

impl Arithmetic for MinSum {
    type Msg = f64;

    fn quantize(&self, llr: f64) -> f64 {
        llr
    }

    fn value(&self, msg: f64) -> f64 {
        msg
    }

    fn add(&self, x: f64, y: f64) -> f64 {
        x + y
    }

    fn sub(&self, x: f64, y: f64) -> f64 {
        x - y
    }

    fn is_negative(&self, msg: f64) -> bool {
        msg < 0.0
    }

    fn check_node(&self, incoming: &[f64], outgoing: &mut [f64]) {
        min_sum_check(incoming, outgoing);
    }
}

impl Arithmetic for FixedMinSum {
    type Msg = Fixed;

    fn quantize(&self, llr: f64) -> Fixed {
        self.format.quantize(llr)
    }

    fn value(&self, msg: Fixed) -> f64 {
        self.format.to_f64(msg)
    }

    fn add(&self, x: Fixed, y: Fixed) -> Fixed {
        self.format.add(x, y)
    }

    fn sub(&self, x: Fixed, y: Fixed) -> Fixed {
        self.format.sub(x, y)
    }

    fn is_negative(&self, msg: Fixed) -> bool {
        msg.is_negative()
    }

    fn check_node(&self, incoming: &[Fixed], outgoing: &mut [Fixed]) {
        let mut negative = false;
        let mut min1: Option<Fixed> = None;
        let mut min2: Option<Fixed> = None;
        let mut argmin = usize::MAX;
        for (k, &x) in incoming.iter().enumerate() {
            negative ^= x.is_negative();
            let magnitude = self.format.abs(x);
            if min1.map_or(true, |m| magnitude < m) {
                min2 = min1;
                min1 = Some(magnitude);
                argmin = k;
            } else if min2.map_or(true, |m| magnitude < m) {
                min2 = Some(magnitude);
            }
        }
        let cap = self.format.quantize(max_check_message());
        for (p, (out, &x)) in outgoing.iter_mut().zip(incoming).enumerate() {
            let magnitude = if p == argmin { min2 } else { min1 }.unwrap_or(cap);
            *out = if negative ^ x.is_negative() {
                self.format.neg(magnitude)
            } else {
                magnitude
            };
        }
    }
}

impl Arithmetic for FixedSumProduct<'_> {
    type Msg = Fixed;

    fn quantize(&self, llr: f64) -> Fixed {
        self.format.quantize(llr)
    }

    fn value(&self, msg: Fixed) -> f64 {
        self.format.to_f64(msg)
    }

    fn add(&self, x: Fixed, y: Fixed) -> Fixed {
        self.format.add(x, y)
    }

    fn sub(&self, x: Fixed, y: Fixed) -> Fixed {
        self.format.sub(x, y)
    }

    fn is_negative(&self, msg: Fixed) -> bool {
        msg.is_negative()
    }

    /// Computes the product excluding each neighbor term by term, in neighbor order. Rounding
    /// after every multiplication makes the result depend on the order of the factors.
    fn check_node(&self, incoming: &[Fixed], outgoing: &mut [Fixed]) {
        let table_format = self.table.format();
        let one = table_format.quantize(1.0);
        let limit = self.table.max_below_one();
        for (p, out) in outgoing.iter_mut().enumerate() {
            let mut product = one;
            for (k, &x) in incoming.iter().enumerate() {
                if k != p {
                    let half = table_format.quantize(self.format.to_f64(x) / 2.0);
                    product = table_format.mul(product, self.table.lookup(half));
                }
            }
            let product = table_format.clamp_abs(product, limit);
            *out = self
                .format
                .quantize(2.0 * table_format.to_f64(product).atanh());
        }
    }
}

/// Computes check-to-variable messages of all checks from variable-to-check messages.
pub(crate) fn update_check_nodes<A: Arithmetic>(
    graph: &TannerGraph,
    arithmetic: &A,
    var_to_check: &[A::Msg],
    check_to_var: &mut [A::Msg],
) {
    for check in 0 .. graph.num_checks() {
        let edges = graph.check_edges(check);
        arithmetic.check_node(&var_to_check[edges.clone()], &mut check_to_var[edges]);
    }
}

/// Computes belief of every variable from channel LLR values and check-to-variable messages.
pub(crate) fn compute_beliefs<A: Arithmetic>(
    graph: &TannerGraph,
    arithmetic: &A,
    llr: &[A::Msg],
    check_to_var: &[A::Msg],
    beliefs: &mut [A::Msg],
) {
    for (var, belief) in beliefs.iter_mut().enumerate() {
        *belief = graph
            .variable_edges(var)
            .iter()
            .fold(llr[var], |acc, &edge| arithmetic.add(acc, check_to_var[edge]));
    }
}

/// Computes variable-to-check messages of all variables from their beliefs and the
/// check-to-variable messages that produced those beliefs.
pub(crate) fn update_variable_nodes<A: Arithmetic>(
    graph: &TannerGraph,
    arithmetic: &A,
    beliefs: &[A::Msg],
    check_to_var: &[A::Msg],
    var_to_check: &mut [A::Msg],
) {
    for (var, &belief) in beliefs.iter().enumerate() {
        for &edge in graph.variable_edges(var) {
            var_to_check[edge] = arithmetic.sub(belief, check_to_var[edge]);
        }
    }
}

#[cfg(test)]
mod tests_of_functions {
    use super::*;
    use crate::graph::tests_of_tanner_graph::hamming_graph;
    use float_eq::assert_float_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Sum-product rule exactly as defined, one product per excluded neighbor.
    fn sum_product_check_by_definition(incoming: &[f64]) -> Vec<f64> {
        (0 .. incoming.len())
            .map(|p| {
                let product: f64 = incoming
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != p)
                    .map(|(_, &x)| (x / 2.0).tanh())
                    .product();
                sign(product) * 2.0 * product.abs().min(MAX_TANH_PRODUCT).atanh()
            })
            .collect()
    }

    /// Min-sum rule exactly as defined, one minimum per excluded neighbor.
    fn min_sum_check_by_definition(incoming: &[f64]) -> Vec<f64> {
        (0 .. incoming.len())
            .map(|p| {
                let others = incoming
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != p)
                    .map(|(_, &x)| x);
                let sign_product: f64 = others.clone().map(sign).product();
                let magnitude = others.map(f64::abs).fold(f64::INFINITY, f64::min);
                sign_product * magnitude
            })
            .collect()
    }

    #[test]
    fn test_max_check_message() {
        assert_float_eq!(max_check_message(), 37.429_947_750_237_05, abs <= 1e-9);
        assert!(max_check_message().is_finite());
    }

    #[test]
    fn test_sign() {
        assert_float_eq!(sign(2.5), 1.0, abs <= 0.0);
        assert_float_eq!(sign(-0.1), -1.0, abs <= 0.0);
        assert_float_eq!(sign(0.0), 1.0, abs <= 0.0);
        assert_float_eq!(sign(-0.0), 1.0, abs <= 0.0);
    }

    #[test]
    fn test_sum_product_check() {
        let mut outgoing = [0.0; 3];
        sum_product_check(&[1.0, -2.0, 3.0], &mut outgoing);
        assert_float_eq!(
            outgoing.to_vec(),
            [-1.693_453_660_970_895, 0.891_221_916_874_837_1, -0.735_325_664_055_519].to_vec(),
            abs_all <= 1e-12
        );
        // Neighbor with zero message silences all other neighbors
        let mut outgoing = [1.0; 4];
        sum_product_check(&[0.0, -2.0, 3.0, 1.5], &mut outgoing);
        assert_float_eq!(outgoing[1 ..].to_vec(), [0.0, 0.0, 0.0].to_vec(), abs_all <= 1e-15);
        assert!(outgoing[0] < 0.0);
    }

    #[test]
    fn test_sum_product_check_matches_definition() {
        let mut rng = StdRng::seed_from_u64(7);
        for degree in 2 .. 10 {
            for _ in 0 .. 50 {
                let incoming: Vec<f64> = (0 .. degree)
                    .map(|_| rng.random_range(-6.0 .. 6.0))
                    .collect();
                let mut outgoing = vec![0.0; degree];
                sum_product_check(&incoming, &mut outgoing);
                assert_float_eq!(
                    outgoing,
                    sum_product_check_by_definition(&incoming),
                    abs_all <= 1e-9
                );
            }
        }
    }

    #[test]
    fn test_sum_product_check_saturation() {
        let bound = max_check_message();
        for incoming in [
            vec![50.0, 50.0, 50.0, 50.0],
            vec![1e6, -1e6, 1e6],
            vec![1e300, 1e300, -1e300, 1e300, 1e300, 1e300],
            vec![f64::INFINITY, f64::INFINITY],
            vec![40.0],
        ] {
            let mut outgoing = vec![0.0; incoming.len()];
            sum_product_check(&incoming, &mut outgoing);
            for (&out, expected) in outgoing
                .iter()
                .zip(sum_product_check_by_definition(&incoming))
            {
                assert!(out.is_finite());
                assert!(out.abs() <= bound);
                assert_float_eq!(out.abs(), bound, abs <= 1e-9);
                assert_float_eq!(out, expected, abs <= 1e-9);
            }
        }
        // Signs survive saturation
        let mut outgoing = [0.0; 4];
        sum_product_check(&[50.0, -50.0, 50.0, 50.0], &mut outgoing);
        assert!(outgoing[1] > 0.0);
        assert!(outgoing[0] < 0.0 && outgoing[2] < 0.0 && outgoing[3] < 0.0);
    }

    #[test]
    fn test_sum_product_check_sign_symmetry() {
        let mut outgoing = [0.0; 3];
        sum_product_check(&[1e6, -1e6, 1e6], &mut outgoing);
        let bound = max_check_message();
        assert_float_eq!(outgoing.to_vec(), [-bound, bound, -bound].to_vec(), abs_all <= 0.0);
        for incoming in [vec![0.3, -2.0, 5.0, 40.0], vec![1e6, 1e6, 7.5], vec![-60.0, 60.0]] {
            let mut outgoing = vec![0.0; incoming.len()];
            sum_product_check(&incoming, &mut outgoing);
            let negated: Vec<f64> = incoming.iter().map(|&x| -x).collect();
            let mut outgoing_negated = vec![0.0; incoming.len()];
            sum_product_check(&negated, &mut outgoing_negated);
            // An odd number of negated neighbors besides the recipient flips the message.
            let flip = if incoming.len() % 2 == 0 { -1.0 } else { 1.0 };
            for (&out, &out_negated) in outgoing.iter().zip(&outgoing_negated) {
                assert_float_eq!(out_negated, flip * out, abs <= 1e-12);
            }
        }
    }

    #[test]
    fn test_min_sum_check() {
        let mut outgoing = [0.0; 3];
        min_sum_check(&[1.0, -2.0, 3.0], &mut outgoing);
        assert_float_eq!(outgoing.to_vec(), [-2.0, 1.0, -1.0].to_vec(), abs_all <= 0.0);
        // Repeated minimum
        let mut outgoing = [0.0; 4];
        min_sum_check(&[-1.5, 4.0, 1.5, 2.0], &mut outgoing);
        assert_float_eq!(outgoing.to_vec(), [1.5, -1.5, -1.5, -1.5].to_vec(), abs_all <= 0.0);
        // Single neighbor
        let mut outgoing = [0.0; 1];
        min_sum_check(&[-3.0], &mut outgoing);
        assert_float_eq!(outgoing[0], max_check_message(), abs <= 0.0);
    }

    #[test]
    fn test_min_sum_check_zero_sign() {
        // Zero counts as positive, so the message to neighbor 1 has sign (+1)(+1)(-1) = -1.
        let mut outgoing = [0.0; 4];
        min_sum_check(&[0.0, -2.0, 3.0, -1.0], &mut outgoing);
        assert_float_eq!(outgoing[0], 1.0, abs <= 0.0);
        assert!(outgoing[1].is_sign_negative());
        assert!(outgoing[2].is_sign_positive());
        assert!(outgoing[3].is_sign_negative());
        assert_float_eq!(outgoing[1 ..].to_vec(), [0.0, 0.0, 0.0].to_vec(), abs_all <= 0.0);
        // Negative zero also counts as positive
        min_sum_check(&[-0.0, -2.0, 3.0, -1.0], &mut outgoing);
        assert!(outgoing[1].is_sign_negative());
    }

    #[test]
    fn test_min_sum_check_matches_definition() {
        let mut rng = StdRng::seed_from_u64(11);
        for degree in 2 .. 10 {
            for _ in 0 .. 50 {
                let incoming: Vec<f64> = (0 .. degree)
                    .map(|_| f64::from(rng.random_range(-8 .. 8_i32)) / 2.0)
                    .collect();
                let mut outgoing = vec![0.0; degree];
                min_sum_check(&incoming, &mut outgoing);
                assert_float_eq!(
                    outgoing,
                    min_sum_check_by_definition(&incoming),
                    abs_all <= 0.0
                );
            }
        }
    }

    #[test]
    fn test_fixed_min_sum_check() {
        let format = FixedFormat::MESSAGE;
        let arithmetic = FixedMinSum { format };
        let incoming: Vec<Fixed> = [1.0, -2.0, 3.0].iter().map(|&x| format.quantize(x)).collect();
        let mut outgoing = [Fixed::default(); 3];
        arithmetic.check_node(&incoming, &mut outgoing);
        let values: Vec<f64> = outgoing.iter().map(|&x| format.to_f64(x)).collect();
        assert_float_eq!(values, [-2.0, 1.0, -1.0].to_vec(), abs_all <= 0.0);
        // Magnitudes saturate instead of overflowing
        let incoming = [format.min(), format.min(), format.max()];
        arithmetic.check_node(&incoming, &mut outgoing);
        let most_negative = format.neg(format.max());
        assert_eq!(outgoing, [most_negative, most_negative, format.max()]);
    }

    #[test]
    fn test_fixed_sum_product_check() {
        let format = FixedFormat::MESSAGE;
        let table = TanhTable::new(FixedFormat::TANH_TABLE).unwrap();
        let arithmetic = FixedSumProduct {
            format,
            table: &table,
        };
        let incoming: Vec<Fixed> = [1.0, -2.0, 3.0].iter().map(|&x| format.quantize(x)).collect();
        let mut outgoing = [Fixed::default(); 3];
        arithmetic.check_node(&incoming, &mut outgoing);
        let raw: Vec<i32> = outgoing.iter().map(|x| x.raw()).collect();
        assert_eq!(raw, [-23, 13, -10]);
        // Product clamped below one, so messages stay bounded
        let incoming = [format.quantize(100.0); 3];
        arithmetic.check_node(&incoming, &mut outgoing);
        assert_eq!(outgoing, [format.from_raw(55); 3]);
        let incoming = [format.max(), format.min(), format.max()];
        arithmetic.check_node(&incoming, &mut outgoing);
        assert_eq!(
            outgoing,
            [format.from_raw(-55), format.from_raw(55), format.from_raw(-55)]
        );
    }

    #[test]
    fn test_phases() {
        let graph = hamming_graph();
        let llr = [1.0, -2.0, 0.5, 3.0, -1.5, 2.5, 1.0];
        let mut var_to_check: Vec<f64> = graph.edge_vars().iter().map(|&var| llr[var]).collect();
        let mut check_to_var = vec![0.0; graph.num_edges()];
        let mut beliefs = vec![0.0; graph.num_vars()];
        update_check_nodes(&graph, &MinSum, &var_to_check, &mut check_to_var);
        // Check 0 has neighbors 0, 1, 2, 4 with messages 1.0, -2.0, 0.5, -1.5
        assert_float_eq!(
            check_to_var[.. 4].to_vec(),
            [0.5, -0.5, 1.0, -0.5].to_vec(),
            abs_all <= 0.0
        );
        compute_beliefs(&graph, &MinSum, &llr, &check_to_var, &mut beliefs);
        update_variable_nodes(&graph, &MinSum, &beliefs, &check_to_var, &mut var_to_check);
        // Each message equals the channel LLR value plus the messages from all other checks.
        for var in 0 .. graph.num_vars() {
            let edges = graph.variable_edges(var);
            let total: f64 = edges.iter().map(|&edge| check_to_var[edge]).sum();
            assert_float_eq!(beliefs[var], llr[var] + total, abs <= 1e-12);
            for &edge in edges {
                let others: f64 = edges
                    .iter()
                    .filter(|&&other| other != edge)
                    .map(|&other| check_to_var[other])
                    .sum();
                assert_float_eq!(var_to_check[edge], llr[var] + others, abs <= 1e-12);
            }
        }
    }
}
