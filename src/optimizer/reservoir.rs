//! Stage-transition optimizer for reservoir operation
//!
//! Maximizes total release benefit across an ordered sequence of months
//! where a single scalar state (carried storage) evolves forward:
//!
//! - feasibility: `0 <= release <= inflow + storage`
//! - transition: `next = min(storage + inflow - release, capacity)`,
//!   quantized onto the spec's grid
//!
//! Overflow above capacity is clamped away with no benefit penalty (spill
//! is silent). Solved by memoized recursion over `(storage, month)`; the
//! recursion depth is bounded by the number of stages.

use log::debug;

use crate::error::SolveError;
use crate::problem::{Amount, ProblemSpec};

use super::memo::{Memo, MemoEntry};
use super::types::{ResultSet, SolveConfig, TraceRow};

/// Dynamic-programming optimizer for reservoir release schedules
pub struct ReservoirOptimizer {
    spec: ProblemSpec,
    config: SolveConfig,
}

impl ReservoirOptimizer {
    /// Create an optimizer with the reservoir-variant policy
    pub fn new(spec: ProblemSpec) -> Self {
        Self {
            spec,
            config: SolveConfig::reservoir(),
        }
    }

    /// Create an optimizer with an explicit policy.
    ///
    /// Setting `allow_zero_default` makes a dead-end state stop releasing
    /// with benefit 0 instead of propagating infeasibility, yielding a
    /// truncated schedule rather than an `Infeasible` error.
    pub fn with_config(spec: ProblemSpec, config: SolveConfig) -> Self {
        Self { spec, config }
    }

    /// Get reference to the problem spec
    pub fn spec(&self) -> &ProblemSpec {
        &self.spec
    }

    // ========================================================================
    // MAIN SOLVE
    // ========================================================================

    /// Find the optimal release schedule from empty initial storage.
    ///
    /// Fails with `SolveError::Infeasible` when no sequence of releases
    /// satisfies every month's feasibility constraint; a partial trace is
    /// never returned.
    pub fn solve(&self) -> Result<ResultSet, SolveError> {
        let mut memo = Memo::new();
        let mut dead_end = None;

        let total = self.best_benefit(0.0, 0, &mut memo, &mut dead_end);

        if self.config.log_memo_stats {
            debug!(
                "reservoir solve: {} memo entries, {} hits / {} misses ({:.1}% hit rate)",
                memo.len(),
                memo.hits,
                memo.misses,
                memo.hit_rate() * 100.0
            );
        }

        if total == f64::NEG_INFINITY {
            let (stage, state) = dead_end.unwrap_or((0, 0.0));
            return Err(SolveError::Infeasible { stage, state });
        }

        let trace = self.reconstruct_trace(&memo);
        Ok(ResultSet::single(total, trace))
    }

    // ========================================================================
    // RECURSION
    // ========================================================================

    /// Best achievable benefit from `(state, stage)` onward.
    ///
    /// Candidates are scanned in declared choice order and replaced only on
    /// a strictly greater total, so the first-seen choice wins ties and two
    /// identical solves produce identical schedules. Under the reservoir
    /// policy a state with no selectable choice yields `NEG_INFINITY`,
    /// which a parent's strict comparison can never pick; with
    /// `allow_zero_default` set, such a state instead stops releasing and
    /// scores 0 from here on.
    fn best_benefit(
        &self,
        state: Amount,
        stage: usize,
        memo: &mut Memo,
        dead_end: &mut Option<(usize, Amount)>,
    ) -> f64 {
        if stage == self.spec.num_stages() {
            return 0.0;
        }

        let key = (self.spec.state_ticks(state), stage);
        if let Some(entry) = memo.lookup(key) {
            return entry.best_benefit;
        }

        let mut best = if self.config.allow_zero_default {
            0.0
        } else {
            f64::NEG_INFINITY
        };
        let mut best_choice = None;

        for (idx, &choice) in self.spec.choices().iter().enumerate() {
            if !self.feasible(state, stage, choice) {
                continue;
            }

            let next_state = self.transition(state, stage, choice);
            let future = self.best_benefit(next_state, stage + 1, memo, dead_end);
            let total = self.spec.benefit(idx, stage) + future;

            if total > best {
                best = total;
                best_choice = Some(idx);
            }
        }

        if best_choice.is_none() && dead_end.is_none() {
            *dead_end = Some((stage, state));
        }

        memo.insert(
            key,
            MemoEntry {
                best_benefit: best,
                best_choice,
            },
        );
        best
    }

    /// Choice-level admissibility at a given storage and month
    pub fn feasible(&self, state: Amount, stage: usize, choice: Amount) -> bool {
        choice >= 0.0 && choice <= self.spec.stages()[stage].inflow + state
    }

    /// Storage carried into the next month after releasing `choice`.
    ///
    /// Clamped into `[0, capacity]` and snapped onto the quantization grid
    /// before it is ever used as a memo key.
    pub fn transition(&self, state: Amount, stage: usize, choice: Amount) -> Amount {
        let next = (state + self.spec.stages()[stage].inflow - choice)
            .min(self.spec.capacity())
            .max(0.0);
        self.spec.quantize(next)
    }

    // ========================================================================
    // TRACE RECONSTRUCTION
    // ========================================================================

    /// Forward-chain the stored best choices from the root state
    fn reconstruct_trace(&self, memo: &Memo) -> Vec<TraceRow> {
        let mut trace = Vec::with_capacity(self.spec.num_stages());
        let mut state = 0.0;

        for stage in 0..self.spec.num_stages() {
            let key = (self.spec.state_ticks(state), stage);
            // A feasible root guarantees a stored choice at every state
            // along the optimal path.
            let choice_idx = match memo.get(key).and_then(|e| e.best_choice) {
                Some(idx) => idx,
                None => break,
            };

            let choice = self.spec.choices()[choice_idx];
            let next_state = self.transition(state, stage, choice);
            trace.push(TraceRow {
                stage_index: stage,
                chosen_amount: choice,
                resulting_state: next_state,
                stage_benefit: self.spec.benefit(choice_idx, stage),
            });
            state = next_state;
        }

        trace
    }
}
