//! Problem description for stage-indexed water optimization

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// A water quantity (inflow, release, allocation, storage)
pub type Amount = f64;

/// One decision point in the stage sequence
///
/// For reservoir operation a stage is a month carrying its inflow; for
/// multi-user allocation a stage is a user and the inflow is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Water entering the system during this stage
    pub inflow: Amount,
}

impl Stage {
    /// Stage with a given inflow (reservoir operation)
    pub fn with_inflow(inflow: Amount) -> Self {
        Self { inflow }
    }

    /// Stage with no inflow of its own (allocation user)
    pub fn user() -> Self {
        Self { inflow: 0.0 }
    }
}

/// Immutable description of a decision problem
///
/// Holds the ordered stages, the discretized choice levels (in declared
/// order, which is also the tie-break order during optimization), the full
/// benefit table, the storage capacity bound, and the state quantization
/// grid. Construction validates the whole structure up front; a spec that
/// builds successfully can always be solved without structural surprises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSpec {
    /// Ordered decision points
    stages: Vec<Stage>,

    /// Discretized choice levels, in declared order
    choices: Vec<Amount>,

    /// Benefit rows parallel to `choices`; each row has one entry per stage
    benefit_rows: Vec<Vec<f64>>,

    /// Upper bound on carried/available water at any point
    capacity: Amount,

    /// State quantization grid for memoization (see `resolution`)
    resolution: Amount,
}

impl ProblemSpec {
    /// Build a validated spec.
    ///
    /// `benefit_rows` is parallel to `choices`: row `i` holds the per-stage
    /// benefits of applying `choices[i]`. Every structural defect is
    /// rejected here, before any optimization runs.
    pub fn new(
        stages: Vec<Stage>,
        choices: Vec<Amount>,
        benefit_rows: Vec<Vec<f64>>,
        capacity: Amount,
    ) -> Result<Self, SpecError> {
        if stages.is_empty() {
            return Err(SpecError::NoStages);
        }
        if choices.is_empty() {
            return Err(SpecError::NoChoices);
        }
        if !capacity.is_finite() {
            return Err(SpecError::NonFiniteValue { context: "capacity" });
        }
        if capacity < 0.0 {
            return Err(SpecError::NegativeCapacity { capacity });
        }

        for stage in &stages {
            if !stage.inflow.is_finite() {
                return Err(SpecError::NonFiniteValue { context: "inflow" });
            }
        }

        for (i, &choice) in choices.iter().enumerate() {
            if !choice.is_finite() {
                return Err(SpecError::NonFiniteValue { context: "choice" });
            }
            if choices[..i].iter().any(|&c| c == choice) {
                return Err(SpecError::DuplicateChoice { choice });
            }
        }

        // Every declared choice needs a complete benefit row. A missing or
        // short row must never degrade to benefit 0.
        if benefit_rows.len() < choices.len() {
            return Err(SpecError::MissingBenefitRow {
                choice: choices[benefit_rows.len()],
            });
        }
        if benefit_rows.len() > choices.len() {
            return Err(SpecError::ExtraBenefitRows {
                expected: choices.len(),
                actual: benefit_rows.len(),
            });
        }
        for (&choice, row) in choices.iter().zip(&benefit_rows) {
            if row.len() != stages.len() {
                return Err(SpecError::BenefitRowMismatch {
                    choice,
                    expected: stages.len(),
                    actual: row.len(),
                });
            }
            if row.iter().any(|b| !b.is_finite()) {
                return Err(SpecError::NonFiniteValue { context: "benefit" });
            }
        }

        let resolution = min_positive_gap(&choices);

        Ok(Self {
            stages,
            choices,
            benefit_rows,
            capacity,
            resolution,
        })
    }

    /// Override the state quantization grid.
    ///
    /// The default is the smallest positive gap between sorted choice
    /// levels. A non-positive or non-finite override is ignored.
    pub fn with_resolution(mut self, resolution: Amount) -> Self {
        if resolution.is_finite() && resolution > 0.0 {
            self.resolution = resolution;
        }
        self
    }

    /// Ordered stages
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages
    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    /// Choice levels in declared (tie-break) order
    pub fn choices(&self) -> &[Amount] {
        &self.choices
    }

    /// Storage capacity bound
    pub fn capacity(&self) -> Amount {
        self.capacity
    }

    /// State quantization grid
    ///
    /// States are rounded to multiples of this value before being used as
    /// memo keys, turning float equality into exact tick equality.
    pub fn resolution(&self) -> Amount {
        self.resolution
    }

    /// Sweep step: minimum positive gap between sorted distinct choice
    /// levels, defaulting to 1 when only one level exists.
    ///
    /// Unlike `resolution`, this is always derived from the declared
    /// choices and is not affected by `with_resolution`.
    pub fn choice_step(&self) -> Amount {
        min_positive_gap(&self.choices)
    }

    /// Benefit of applying choice `choice_idx` at stage `stage_idx`
    pub fn benefit(&self, choice_idx: usize, stage_idx: usize) -> f64 {
        self.benefit_rows[choice_idx][stage_idx]
    }

    /// Largest declared choice level
    pub fn max_choice(&self) -> Amount {
        self.choices
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Snap a state onto the quantization grid
    pub fn quantize(&self, state: Amount) -> Amount {
        (state / self.resolution).round() * self.resolution
    }

    /// Integer tick index of a quantized state, for memo keying
    pub fn state_ticks(&self, state: Amount) -> u64 {
        (state / self.resolution).round().max(0.0) as u64
    }
}

/// Minimum positive gap between sorted distinct values, defaulting to 1
/// when fewer than two distinct levels exist.
fn min_positive_gap(choices: &[Amount]) -> Amount {
    let mut sorted = choices.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut gap = f64::INFINITY;
    for pair in sorted.windows(2) {
        let d = pair[1] - pair[0];
        if d > 0.0 && d < gap {
            gap = d;
        }
    }

    if gap.is_finite() {
        gap
    } else {
        1.0
    }
}
