//! Error taxonomy for spec construction and solving
//!
//! Structural problems are rejected when a `ProblemSpec` is built, before any
//! recursion runs. Solve-time errors (`Infeasible`, `InvalidBudget`) are kept
//! separate so callers can tell a malformed instance from an unsolvable one.

use thiserror::Error;

/// A structurally invalid problem description.
///
/// Raised at `ProblemSpec` construction time. A missing benefit entry is
/// always an error here, never treated as benefit 0.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    /// No stages declared
    #[error("problem has no stages")]
    NoStages,

    /// No choice levels declared
    #[error("problem has no choice levels")]
    NoChoices,

    /// A benefit row has the wrong number of per-stage entries
    #[error("benefit row for choice {choice} has {actual} entries, expected {expected}")]
    BenefitRowMismatch {
        /// Choice level whose row is malformed
        choice: f64,
        /// Number of stages declared
        expected: usize,
        /// Number of entries actually supplied
        actual: usize,
    },

    /// A declared choice has no benefit row at all
    #[error("no benefit row for choice {choice}")]
    MissingBenefitRow {
        /// Choice level without a row
        choice: f64,
    },

    /// More benefit rows than declared choices
    #[error("{actual} benefit rows supplied for {expected} declared choices")]
    ExtraBenefitRows {
        /// Number of choices declared
        expected: usize,
        /// Number of rows supplied
        actual: usize,
    },

    /// The same choice level was declared twice
    #[error("duplicate choice level {choice}")]
    DuplicateChoice {
        /// The repeated level
        choice: f64,
    },

    /// Capacity must be non-negative
    #[error("capacity {capacity} is negative")]
    NegativeCapacity {
        /// The offending capacity
        capacity: f64,
    },

    /// A NaN or infinite value where a finite number is required
    #[error("non-finite value in {context}")]
    NonFiniteValue {
        /// Which field held the value
        context: &'static str,
    },
}

/// A solve that cannot produce a result for the given instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// No sequence of choices satisfies every stage's feasibility constraint.
    ///
    /// Only the stage-transition (reservoir) variant can fail this way; the
    /// allocation variant always admits the give-nothing schedule.
    #[error("no feasible schedule: dead end at stage {stage} with state {state}")]
    Infeasible {
        /// First stage at which every choice was inadmissible
        stage: usize,
        /// Carried state at that stage
        state: f64,
    },

    /// A requested budget is negative
    #[error("invalid budget {budget}: must be non-negative")]
    InvalidBudget {
        /// The offending budget
        budget: f64,
    },
}
