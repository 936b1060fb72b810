//! Hydro System - Dynamic-programming optimizer for water resource problems
//!
//! This library provides:
//! - Validated problem descriptions (stages, choice levels, benefit table, capacity)
//! - Stage-transition optimization for reservoir release schedules
//! - Knapsack-style optimization for multi-user water allocation
//! - Budget sweeps producing benefit-vs-water curves

pub mod error;
pub mod optimizer;
pub mod problem;

// Re-export commonly used types
pub use error::{SolveError, SpecError};
pub use optimizer::{
    AllocationOptimizer, CurveDriver, CurvePoint, ReservoirOptimizer, ResultSet, SolveConfig,
    TraceRow,
};
pub use problem::{Amount, ProblemSpec, Stage};
