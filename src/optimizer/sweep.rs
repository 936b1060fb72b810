//! Budget sweep driver for benefit-vs-water curves
//!
//! Runs the allocation optimizer once per budget across the full range of
//! relevant budgets, so callers can tabulate or plot how the optimal total
//! benefit grows with available water. Pure orchestration; every decision
//! belongs to the allocation optimizer.

use log::info;
use rayon::prelude::*;

use crate::error::SolveError;
use crate::problem::{Amount, ProblemSpec};

use super::allocation::AllocationOptimizer;
use super::memo::Memo;
use super::types::{CurvePoint, ResultSet};

/// Driver sweeping allocation budgets from zero to the largest choice level
pub struct CurveDriver {
    optimizer: AllocationOptimizer,
}

impl CurveDriver {
    /// Create a driver for the given problem
    pub fn new(spec: ProblemSpec) -> Self {
        Self {
            optimizer: AllocationOptimizer::new(spec),
        }
    }

    /// Create a driver around an existing optimizer
    pub fn with_optimizer(optimizer: AllocationOptimizer) -> Self {
        Self { optimizer }
    }

    /// Get reference to the underlying optimizer
    pub fn optimizer(&self) -> &AllocationOptimizer {
        &self.optimizer
    }

    /// Budgets the sweep will visit: `0, step, 2*step, ...` up to the
    /// first multiple of the step at or above the largest declared choice
    /// level, so the full-supply optimum is always part of the curve. The
    /// step is the smallest positive gap between sorted choice levels
    /// (1 when a single level exists).
    pub fn budgets(&self) -> Vec<Amount> {
        let spec = self.optimizer.spec();
        let step = spec.choice_step();
        let max = spec.max_choice().max(0.0);

        // Round up, with a guard against float noise pushing an exact
        // multiple one step too far.
        let count = (max / step - 1e-9).ceil().max(0.0) as usize;
        (0..=count).map(|i| i as f64 * step).collect()
    }

    /// Sweep all budgets serially, sharing one memo across the whole run.
    ///
    /// Memo entries depend only on `(remaining, user)`, so later budgets
    /// reuse sub-results computed for earlier ones.
    pub fn run(&self) -> Result<ResultSet, SolveError> {
        let mut memo = Memo::new();
        let mut curve = Vec::new();

        for budget in self.budgets() {
            let result = self.optimizer.solve_with_memo(budget, &mut memo)?;
            curve.push(CurvePoint {
                budget,
                total_benefit: result.total_benefit,
                trace: result.trace,
            });
        }

        info!(
            "budget sweep: {} points, memo reuse rate {:.1}%",
            curve.len(),
            memo.hit_rate() * 100.0
        );

        Ok(Self::assemble(curve))
    }

    /// Sweep all budgets in parallel, one isolated memo per solve.
    ///
    /// Produces the same curve as `run`: each solve is independent and the
    /// tie-break rule is deterministic.
    pub fn run_parallel(&self) -> Result<ResultSet, SolveError> {
        let curve = self
            .budgets()
            .into_par_iter()
            .map(|budget| {
                let result = self.optimizer.solve(budget)?;
                Ok(CurvePoint {
                    budget,
                    total_benefit: result.total_benefit,
                    trace: result.trace,
                })
            })
            .collect::<Result<Vec<_>, SolveError>>()?;

        Ok(Self::assemble(curve))
    }

    /// Top-level result: the curve, plus the largest-budget point's benefit
    /// and trace as the headline solution.
    fn assemble(curve: Vec<CurvePoint>) -> ResultSet {
        let (total_benefit, trace) = match curve.last() {
            Some(point) => (point.total_benefit, point.trace.clone()),
            None => (0.0, Vec::new()),
        };

        ResultSet {
            total_benefit,
            trace,
            curve,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Stage;
    use approx::assert_relative_eq;

    fn sample_spec() -> ProblemSpec {
        ProblemSpec::new(
            vec![Stage::user(), Stage::user(), Stage::user()],
            vec![10.0, 20.0, 30.0],
            vec![
                vec![5.0, 8.0, 6.0],
                vec![12.0, 15.0, 10.0],
                vec![18.0, 20.0, 16.0],
            ],
            30.0,
        )
        .expect("valid spec")
    }

    #[test]
    fn test_budget_enumeration() {
        let driver = CurveDriver::new(sample_spec());
        assert_eq!(driver.budgets(), vec![0.0, 10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_single_choice_level_steps_by_one() {
        let spec = ProblemSpec::new(
            vec![Stage::user()],
            vec![3.0],
            vec![vec![9.0]],
            3.0,
        )
        .expect("valid spec");

        let driver = CurveDriver::new(spec);
        assert_eq!(driver.budgets(), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_budgets_cover_largest_choice() {
        // Step is the 15 between 10 and 25; the sweep must still reach a
        // budget that can afford the 25.
        let spec = ProblemSpec::new(
            vec![Stage::user(), Stage::user()],
            vec![10.0, 25.0],
            vec![vec![3.0, 4.0], vec![9.0, 11.0]],
            25.0,
        )
        .expect("valid spec");

        let driver = CurveDriver::new(spec);
        let budgets = driver.budgets();
        assert_eq!(budgets, vec![0.0, 15.0, 30.0]);

        let result = driver.run().expect("all budgets valid");
        let last = result.curve.last().expect("non-empty curve");
        // Budget 30 affords 25 to user 1: benefit 9 beats 10-to-each (7).
        assert_relative_eq!(last.total_benefit, 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_curve_is_ordered_and_monotone() {
        let driver = CurveDriver::new(sample_spec());
        let result = driver.run().expect("all budgets valid");

        assert_eq!(result.curve.len(), 4);
        for pair in result.curve.windows(2) {
            assert!(pair[1].budget > pair[0].budget);
            assert!(pair[1].total_benefit >= pair[0].total_benefit);
        }

        // Headline solution is the largest-budget point.
        let last = result.curve.last().expect("non-empty curve");
        assert_relative_eq!(result.total_benefit, last.total_benefit, epsilon = 1e-12);
        assert_eq!(result.trace, last.trace);
    }

    #[test]
    fn test_curve_values() {
        let driver = CurveDriver::new(sample_spec());
        let result = driver.run().expect("all budgets valid");

        let benefits: Vec<f64> = result.curve.iter().map(|p| p.total_benefit).collect();
        // budget 0 -> nothing; 10 -> 10 to user 1; 20 -> 10 each to users
        // 1 and 2; 30 -> 10 to user 1 plus 20 to user 2.
        assert_eq!(benefits, vec![0.0, 5.0, 13.0, 20.0]);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let driver = CurveDriver::new(sample_spec());
        let serial = driver.run().expect("all budgets valid");
        let parallel = driver.run_parallel().expect("all budgets valid");
        assert_eq!(serial, parallel);
    }
}
