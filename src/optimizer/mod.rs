//! Dynamic-programming optimizers for stage-indexed water problems
//!
//! Two variants share one algorithmic shape:
//! - **Reservoir operation** (`ReservoirOptimizer`): a carried storage
//!   state evolves forward through months with inflows; a dead end is
//!   infeasible.
//! - **Multi-user allocation** (`AllocationOptimizer`): a fixed budget only
//!   decreases across users; giving nothing is always admissible.
//!
//! Both are memoized recursions over `(quantized state, stage)` with a
//! stable first-seen tie-break in declared choice order. `CurveDriver`
//! sweeps allocation budgets to produce a benefit curve.

mod allocation;
mod memo;
mod reservoir;
mod sweep;
mod types;

pub use allocation::AllocationOptimizer;
pub use memo::{Memo, MemoEntry, MemoKey};
pub use reservoir::ReservoirOptimizer;
pub use sweep::CurveDriver;
pub use types::{CurvePoint, ResultSet, SolveConfig, TraceRow};
