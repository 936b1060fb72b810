//! Core types for optimization results

use serde::{Deserialize, Serialize};

use crate::problem::Amount;

/// One step of an optimal schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceRow {
    /// Stage (month or user) this row belongs to, 0-indexed
    pub stage_index: usize,

    /// Amount released/allocated at this stage
    pub chosen_amount: Amount,

    /// State after applying the choice (storage carried forward, or
    /// remaining unallocated water)
    pub resulting_state: Amount,

    /// Benefit earned at this stage
    pub stage_benefit: f64,
}

/// One point of a benefit-vs-budget curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Budget this point was solved for
    pub budget: Amount,

    /// Optimal total benefit at this budget
    pub total_benefit: f64,

    /// Schedule achieving `total_benefit`
    pub trace: Vec<TraceRow>,
}

/// Result of an optimization run
///
/// `curve` is populated only by the budget sweep driver; single solves
/// leave it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Maximum achievable total benefit
    pub total_benefit: f64,

    /// Schedule achieving `total_benefit`, one row per stage
    pub trace: Vec<TraceRow>,

    /// Benefit curve across swept budgets, ordered by budget
    pub curve: Vec<CurvePoint>,
}

impl ResultSet {
    /// Result of a single solve, with no curve
    pub fn single(total_benefit: f64, trace: Vec<TraceRow>) -> Self {
        Self {
            total_benefit,
            trace,
            curve: Vec::new(),
        }
    }

    /// Chosen amounts in stage order
    pub fn amounts(&self) -> Vec<Amount> {
        self.trace.iter().map(|row| row.chosen_amount).collect()
    }

    /// Sum of per-stage benefits along the trace
    ///
    /// Equals `total_benefit` for any consistent result.
    pub fn trace_benefit_sum(&self) -> f64 {
        self.trace.iter().map(|row| row.stage_benefit).sum()
    }
}

/// Per-variant solve policy
#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    /// Whether a stage with no improving choice defaults to receiving
    /// nothing (benefit 0) instead of being a dead end.
    ///
    /// The allocation variant treats "give nothing" as always admissible
    /// and never fails; the reservoir variant does not, and a dead end
    /// propagates upward as infeasible. This asymmetry is deliberate.
    pub allow_zero_default: bool,

    /// Emit memo hit/miss statistics at debug level after each solve
    pub log_memo_stats: bool,
}

impl SolveConfig {
    /// Policy for the stage-transition (reservoir) variant
    pub fn reservoir() -> Self {
        Self {
            allow_zero_default: false,
            log_memo_stats: false,
        }
    }

    /// Policy for the multi-consumer allocation variant
    pub fn allocation() -> Self {
        Self {
            allow_zero_default: true,
            log_memo_stats: false,
        }
    }

    /// Enable memo statistics logging
    pub fn with_memo_stats(mut self) -> Self {
        self.log_memo_stats = true;
        self
    }
}
