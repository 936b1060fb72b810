//! Multi-user allocation optimizer
//!
//! Splits a fixed water budget across an ordered sequence of users to
//! maximize summed benefit. The state is the remaining unallocated amount;
//! it only decreases, and giving a user nothing is always admissible, so
//! this variant never fails with `Infeasible`. That asymmetry with the
//! reservoir variant is intentional (`SolveConfig::allow_zero_default`).
//!
//! The state here is exact arithmetic (`remaining - choice`, never
//! clamped), so the memo is keyed on the exact remaining amount rather
//! than the quantization grid: with irregular choice gaps, two distinct
//! reachable remainings can sit closer together than the grid step, and
//! rounding them onto one key would let one state reuse the other's
//! sub-result.

use log::debug;

use crate::error::SolveError;
use crate::problem::{Amount, ProblemSpec};

use super::memo::{Memo, MemoEntry};
use super::types::{ResultSet, SolveConfig, TraceRow};

/// Dynamic-programming optimizer for multi-user water allocation
pub struct AllocationOptimizer {
    spec: ProblemSpec,
    config: SolveConfig,
}

impl AllocationOptimizer {
    /// Create an optimizer with the allocation-variant policy
    pub fn new(spec: ProblemSpec) -> Self {
        Self {
            spec,
            config: SolveConfig::allocation(),
        }
    }

    /// Create an optimizer with an explicit policy
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

    /// Find the optimal split of `budget` across all users
    pub fn solve(&self, budget: Amount) -> Result<ResultSet, SolveError> {
        let mut memo = Memo::new();
        self.solve_with_memo(budget, &mut memo)
    }

    /// Solve reusing a caller-held memo.
    ///
    /// Entries depend only on `(remaining, user)`, never on the budget the
    /// solve started from, so one memo can safely serve a whole budget
    /// sweep.
    pub fn solve_with_memo(&self, budget: Amount, memo: &mut Memo) -> Result<ResultSet, SolveError> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(SolveError::InvalidBudget { budget });
        }

        let total = self.best_benefit(budget, 0, memo);

        if self.config.log_memo_stats {
            debug!(
                "allocation solve at budget {}: {} memo entries, {} hits / {} misses",
                budget,
                memo.len(),
                memo.hits,
                memo.misses
            );
        }

        let trace = self.reconstruct_trace(budget, memo);
        Ok(ResultSet::single(total, trace))
    }

    // ========================================================================
    // RECURSION
    // ========================================================================

    /// Best achievable benefit from `(remaining, user)` onward.
    ///
    /// The running best starts at 0 with no chosen amount, so a user whose
    /// every affordable choice fails to improve on nothing simply receives
    /// nothing. Candidates are scanned in declared choice order with a
    /// strictly-greater comparison, keeping the tie-break stable.
    ///
    /// The memo key is the exact bit pattern of `remaining`: every state
    /// is an exact difference of the budget and declared amounts, so equal
    /// remainings always collide and distinct ones never do.
    fn best_benefit(&self, remaining: Amount, user: usize, memo: &mut Memo) -> f64 {
        if user == self.spec.num_stages() {
            return 0.0;
        }

        let key = (remaining.to_bits(), user);
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
            if !self.feasible(remaining, choice) {
                continue;
            }

            let future = self.best_benefit(remaining - choice, user + 1, memo);
            let total = self.spec.benefit(idx, user) + future;

            if total > best {
                best = total;
                best_choice = Some(idx);
            }
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

    /// A user may receive any declared non-negative amount still available
    pub fn feasible(&self, remaining: Amount, choice: Amount) -> bool {
        choice >= 0.0 && choice <= remaining
    }

    // ========================================================================
    // TRACE RECONSTRUCTION
    // ========================================================================

    /// Forward-chain stored best choices. A `None` choice means the
    /// zero-default won: that user and everyone after it receives nothing.
    fn reconstruct_trace(&self, budget: Amount, memo: &Memo) -> Vec<TraceRow> {
        let mut trace = Vec::with_capacity(self.spec.num_stages());
        let mut remaining = budget;

        for user in 0..self.spec.num_stages() {
            let key = (remaining.to_bits(), user);
            match memo.get(key).and_then(|e| e.best_choice) {
                Some(idx) => {
                    let choice = self.spec.choices()[idx];
                    remaining -= choice;
                    trace.push(TraceRow {
                        stage_index: user,
                        chosen_amount: choice,
                        resulting_state: remaining,
                        stage_benefit: self.spec.benefit(idx, user),
                    });
                }
                None => {
                    // Empty sub-allocation from here on.
                    for rest in user..self.spec.num_stages() {
                        trace.push(TraceRow {
                            stage_index: rest,
                            chosen_amount: 0.0,
                            resulting_state: remaining,
                            stage_benefit: 0.0,
                        });
                    }
                    break;
                }
            }
        }

        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Stage;
    use approx::assert_relative_eq;

    /// The allocation instance from the spreadsheet example: three users,
    /// allocations 10/20/30.
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

    /// Exhaustive search over every served prefix of users and every
    /// combination of declared amounts for that prefix, keeping those whose
    /// total stays within the budget. Users past the prefix receive
    /// nothing, matching the empty-sub-allocation default.
    fn brute_force_best(spec: &ProblemSpec, budget: f64) -> f64 {
        let num_users = spec.num_stages();
        let num_choices = spec.choices().len();
        let mut best = 0.0_f64;

        for served in 1..=num_users {
            let mut idx = vec![0usize; served];
            loop {
                let amount: f64 = idx.iter().map(|&i| spec.choices()[i]).sum();
                if amount <= budget {
                    let value: f64 = idx
                        .iter()
                        .enumerate()
                        .map(|(user, &i)| spec.benefit(i, user))
                        .sum();
                    if value > best {
                        best = value;
                    }
                }

                // Odometer increment over choice indices.
                let mut pos = 0;
                loop {
                    if pos == served {
                        break;
                    }
                    idx[pos] += 1;
                    if idx[pos] < num_choices {
                        break;
                    }
                    idx[pos] = 0;
                    pos += 1;
                }
                if pos == served {
                    break;
                }
            }
        }

        best
    }

    #[test]
    fn test_matches_brute_force_at_budget_30() {
        let optimizer = AllocationOptimizer::new(sample_spec());
        let result = optimizer.solve(30.0).expect("valid budget");

        assert_relative_eq!(
            result.total_benefit,
            brute_force_best(optimizer.spec(), 30.0),
            epsilon = 1e-9
        );
        // Best split of 30 is 10 to the first user and 20 to the second.
        assert_relative_eq!(result.total_benefit, 20.0, epsilon = 1e-9);
        assert_eq!(result.amounts(), vec![10.0, 20.0, 0.0]);
    }

    #[test]
    fn test_matches_brute_force_across_budgets() {
        let optimizer = AllocationOptimizer::new(sample_spec());
        for budget in [0.0, 10.0, 20.0, 30.0, 40.0, 60.0] {
            let result = optimizer.solve(budget).expect("valid budget");
            assert_relative_eq!(
                result.total_benefit,
                brute_force_best(optimizer.spec(), budget),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_irregular_choice_gaps_memoize_exactly() {
        // Gaps of 6 and 9 between sorted levels: remainings like 23 and 26
        // differ by less than the coarser gap, so only exact memo keys keep
        // them apart. The optimum needs the large amount for the last user.
        let spec = ProblemSpec::new(
            vec![Stage::user(), Stage::user(), Stage::user()],
            vec![25.0, 16.0, 10.0],
            vec![
                vec![2.0, 2.0, 90.0],
                vec![5.0, 5.0, 1.0],
                vec![1.0, 1.0, 1.0],
            ],
            58.0,
        )
        .expect("valid spec");

        let optimizer = AllocationOptimizer::new(spec);
        let result = optimizer.solve(58.0).expect("valid budget");

        assert_relative_eq!(
            result.total_benefit,
            brute_force_best(optimizer.spec(), 58.0),
            epsilon = 1e-9
        );
        assert_relative_eq!(result.total_benefit, 100.0, epsilon = 1e-9);
        assert_eq!(result.amounts(), vec![16.0, 16.0, 25.0]);
    }

    #[test]
    fn test_trace_is_consistent() {
        let optimizer = AllocationOptimizer::new(sample_spec());
        let result = optimizer.solve(30.0).expect("valid budget");

        assert_eq!(result.trace.len(), 3);
        assert_relative_eq!(result.trace_benefit_sum(), result.total_benefit, epsilon = 1e-9);

        let mut remaining = 30.0;
        for row in &result.trace {
            remaining -= row.chosen_amount;
            assert_relative_eq!(remaining, row.resulting_state, epsilon = 1e-9);
            assert!(remaining >= 0.0);
        }
    }

    #[test]
    fn test_zero_budget_allocates_nothing() {
        let optimizer = AllocationOptimizer::new(sample_spec());
        let result = optimizer.solve(0.0).expect("zero budget is valid");

        assert_eq!(result.total_benefit, 0.0);
        assert_eq!(result.amounts(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_never_infeasible_even_with_negative_benefits() {
        let spec = ProblemSpec::new(
            vec![Stage::user(), Stage::user()],
            vec![10.0, 20.0],
            vec![vec![-5.0, -3.0], vec![-8.0, -1.0]],
            20.0,
        )
        .expect("valid spec");

        let result = AllocationOptimizer::new(spec).solve(20.0).expect("valid budget");
        assert_eq!(result.total_benefit, 0.0);
        assert_eq!(result.amounts(), vec![0.0, 0.0]);
        assert_eq!(result.trace_benefit_sum(), 0.0);
    }

    #[test]
    fn test_negative_budget_rejected() {
        let optimizer = AllocationOptimizer::new(sample_spec());
        let err = optimizer.solve(-10.0).unwrap_err();
        assert_eq!(err, SolveError::InvalidBudget { budget: -10.0 });
    }

    #[test]
    fn test_budget_monotonicity() {
        let optimizer = AllocationOptimizer::new(sample_spec());
        let mut previous = 0.0;
        for budget in [0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0] {
            let result = optimizer.solve(budget).expect("valid budget");
            assert!(result.total_benefit >= previous);
            previous = result.total_benefit;
        }
    }

    #[test]
    fn test_deterministic_trace() {
        let optimizer = AllocationOptimizer::new(sample_spec());
        let a = optimizer.solve(30.0).expect("valid budget");
        let b = optimizer.solve(30.0).expect("valid budget");
        assert_eq!(a, b);
    }

    #[test]
    fn test_shared_memo_matches_fresh_memo() {
        let optimizer = AllocationOptimizer::new(sample_spec());

        let mut shared = Memo::new();
        for budget in [0.0, 10.0, 20.0, 30.0] {
            let with_shared = optimizer
                .solve_with_memo(budget, &mut shared)
                .expect("valid budget");
            let fresh = optimizer.solve(budget).expect("valid budget");
            assert_eq!(with_shared, fresh);
        }
        assert!(shared.hits > 0);
    }
}
