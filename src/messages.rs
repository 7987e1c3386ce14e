//! Storage for messages passed along the edges of a Tanner graph

use crate::TannerGraph;

/// Variable-to-check and check-to-variable messages, one of each per edge
///
/// Messages are indexed by edge number as assigned by [`TannerGraph`], so storage is
/// proportional to the number of edges. The check-node phase reads only `var_to_check` and
/// writes only `check_to_var`, and the variable-node phase does the opposite.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MessageStore<T> {
    /// Variable-to-check messages
    var_to_check: Vec<T>,
    /// Check-to-variable messages
    check_to_var: Vec<T>,
}

impl<T: Copy + Default> MessageStore<T> {
    /// Returns message store initialized for a decoding attempt.
    ///
    /// # Parameters
    ///
    /// - `graph`: Tanner graph of the code.
    ///
    /// - `llr`: Channel LLR values (one per variable node) in the message representation.
    ///
    /// # Returns
    ///
    /// - `store`: Message store in which every variable-to-check message equals the channel LLR
    ///   value of its variable, and every check-to-variable message is zero.
    ///
    /// # Panics
    ///
    /// Panics if `llr` has fewer values than the graph has variable nodes.
    #[must_use]
    pub fn new(graph: &TannerGraph, llr: &[T]) -> Self {
        let mut store = Self {
            var_to_check: Vec::with_capacity(graph.num_edges()),
            check_to_var: Vec::with_capacity(graph.num_edges()),
        };
        store.reset(graph, llr);
        store
    }

    /// Reinitializes message store for a new decoding attempt, reusing its allocations.
    ///
    /// # Panics
    ///
    /// Panics if `llr` has fewer values than the graph has variable nodes.
    pub fn reset(&mut self, graph: &TannerGraph, llr: &[T]) {
        self.var_to_check.clear();
        self.var_to_check
            .extend(graph.edge_vars().iter().map(|&var| llr[var]));
        self.check_to_var.clear();
        self.check_to_var.resize(graph.num_edges(), T::default());
    }

    /// Returns number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.var_to_check.len()
    }

    /// Returns variable-to-check messages, indexed by edge.
    #[must_use]
    pub fn var_to_check(&self) -> &[T] {
        &self.var_to_check
    }

    /// Returns check-to-variable messages, indexed by edge.
    #[must_use]
    pub fn check_to_var(&self) -> &[T] {
        &self.check_to_var
    }

    /// Returns message from a variable node to a check node, if they are adjacent.
    #[must_use]
    pub fn var_to_check_message(
        &self,
        graph: &TannerGraph,
        var: usize,
        check: usize,
    ) -> Option<T> {
        graph
            .edge_index(check, var)
            .map(|edge| self.var_to_check[edge])
    }

    /// Returns message from a check node to a variable node, if they are adjacent.
    #[must_use]
    pub fn check_to_var_message(
        &self,
        graph: &TannerGraph,
        check: usize,
        var: usize,
    ) -> Option<T> {
        graph
            .edge_index(check, var)
            .map(|edge| self.check_to_var[edge])
    }

    /// Splits store into variable-to-check messages (read) and check-to-variable messages
    /// (written), as needed by the check-node phase.
    pub(crate) fn for_check_phase(&mut self) -> (&[T], &mut [T]) {
        (&self.var_to_check, &mut self.check_to_var)
    }

    /// Splits store into check-to-variable messages (read) and variable-to-check messages
    /// (written), as needed by the variable-node phase.
    pub(crate) fn for_variable_phase(&mut self) -> (&[T], &mut [T]) {
        (&self.check_to_var, &mut self.var_to_check)
    }
}
