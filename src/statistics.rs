//! Per-step statistics of a run.
//!
//! Every step group is the complete cohort of simulated stream replicas at that checkpoint,
//! so the standard deviation is the population one (divide by `n`).

#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::grouping::StepGroups;
use crate::observation::Observation;
use crate::projection::{Estimate, Projection, ProjectionTrait, RelativeError};

/// Mean and population standard deviation of a group
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct Moments {
    pub mean: f64,
    pub stdev: f64,
}

impl Moments {
    /// Compute moments of given values, `None` when there are no values
    pub fn of(values: &[f64]) -> Option<Self> {
        let &origin = values.first()?;
        let n = values.len() as f64;
        // deviations from the first value, so identical values give exactly zero spread
        let shift = values.iter().map(|v| v - origin).sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|v| {
                let d = v - origin - shift;
                d * d
            })
            .sum::<f64>()
            / n;
        Some(Self {
            mean: origin + shift,
            stdev: variance.sqrt(),
        })
    }
}

/// Statistics of one step of a run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct StepSummary {
    pub step: u64,
    pub fraction: f64,
    pub mean_estimate: f64,
    pub stdev_estimate: f64,
    pub mean_rel_error: f64,
    pub stdev_rel_error: f64,
}

impl StepSummary {
    /// Summarize one step group
    pub fn of_group(step: u64, group: &[&Observation]) -> Result<Self> {
        let first = group.first().ok_or(AnalysisError::EmptyGroup { step })?;
        let estimate = project_moments(step, group, Estimate.into())?;
        let rel_error = project_moments(step, group, RelativeError.into())?;
        Ok(Self {
            step,
            fraction: first.fraction,
            mean_estimate: estimate.mean,
            stdev_estimate: estimate.stdev,
            mean_rel_error: rel_error.mean,
            stdev_rel_error: rel_error.stdev,
        })
    }

    /// Lower and upper edge of the `mean ± σ` band of estimates
    #[inline]
    pub fn estimate_band(&self) -> (f64, f64) {
        (
            self.mean_estimate - self.stdev_estimate,
            self.mean_estimate + self.stdev_estimate,
        )
    }
}

/// Compute moments of a projection over a step group
pub fn project_moments(
    step: u64,
    group: &[&Observation],
    projection: Projection,
) -> Result<Moments> {
    let values: Vec<f64> = group.iter().map(|o| projection.project(o)).collect();
    Moments::of(&values).ok_or(AnalysisError::EmptyGroup { step })
}

/// Summarize every step, ordered by ascending step
pub fn summarize_steps(groups: &StepGroups<'_>) -> Result<Vec<StepSummary>> {
    groups
        .ascending()
        .into_iter()
        .map(|(step, group)| StepSummary::of_group(step, group))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::tests::obs;
    use crate::observation::ObservationStore;
    use test_case::test_case;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_concrete_step() {
        let store: ObservationStore = [98.0, 100.0, 102.0]
            .into_iter()
            .enumerate()
            .map(|(i, e)| obs(i as u32, 0, 100, e))
            .collect();

        let summaries = summarize_steps(&StepGroups::new(&store)).unwrap();
        assert_eq!(summaries.len(), 1);

        let s = summaries[0];
        assert_eq!(s.step, 0);
        assert_eq!(s.fraction, 0.1);
        assert_close(s.mean_estimate, 100.0, 1e-12);
        assert_close(s.stdev_estimate, 1.633, 1e-3);
        assert_close(s.mean_rel_error, 0.0, 1e-12);
        assert_close(s.stdev_rel_error, 0.01633, 1e-5);
    }

    #[test_case(&[5.0] => (5.0, 0.0); "single value")]
    #[test_case(&[3.0, 3.0, 3.0] => (3.0, 0.0); "identical values")]
    #[test_case(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] => (5.0, 2.0); "population stdev")]
    #[test_case(&[1.0, 3.0] => (2.0, 1.0); "divides by n")]
    fn test_moments(values: &[f64]) -> (f64, f64) {
        let m = Moments::of(values).unwrap();
        (m.mean, m.stdev)
    }

    #[test]
    fn test_moments_empty() {
        assert_eq!(Moments::of(&[]), None);
    }

    #[test_case(0.1; "one tenth")]
    #[test_case(98.7; "inexact estimate")]
    #[test_case(1234.567; "large inexact")]
    #[test_case(7.25; "exact")]
    fn test_stdev_zero_iff_identical(value: f64) {
        let equal = Moments::of(&[value; 10]).unwrap();
        assert_eq!(equal.stdev, 0.0);
        assert_eq!(equal.mean, value);

        let mut values = [value; 10];
        values[4] = value * 1.5;
        let distinct = Moments::of(&values).unwrap();
        assert!(distinct.stdev > 0.0);
    }

    #[test]
    fn test_identical_inexact_estimates_have_zero_spread() {
        let store: ObservationStore = (0..10u32).map(|i| obs(i, 0, 3, 0.1)).collect();
        let s = summarize_steps(&StepGroups::new(&store)).unwrap()[0];
        assert_eq!(s.mean_estimate, 0.1);
        assert_eq!(s.stdev_estimate, 0.0);
        assert_eq!(s.stdev_rel_error, 0.0);
    }

    #[test]
    fn test_duplicate_rows_weigh_in_averages() {
        let distinct: ObservationStore = [obs(0, 0, 100, 90.0), obs(1, 0, 100, 110.0)]
            .into_iter()
            .collect();
        let with_duplicate: ObservationStore = [
            obs(0, 0, 100, 90.0),
            obs(1, 0, 100, 110.0),
            obs(1, 0, 100, 110.0),
        ]
        .into_iter()
        .collect();

        let once = summarize_steps(&StepGroups::new(&distinct)).unwrap()[0];
        let twice = summarize_steps(&StepGroups::new(&with_duplicate)).unwrap()[0];

        assert_eq!(once.mean_estimate, 100.0);
        assert_eq!(once.stdev_estimate, 10.0);
        assert_close(twice.mean_estimate, 310.0 / 3.0, 1e-12);
        assert_close(twice.stdev_estimate, 200.0_f64.sqrt() * 2.0 / 3.0, 1e-9);
        assert_close(twice.mean_rel_error, 0.1 / 3.0, 1e-12);
    }

    #[test]
    fn test_empty_group_is_invariant_violation() {
        let err = StepSummary::of_group(42, &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyGroup { step: 42 }));
    }

    #[test]
    fn test_zero_truth_counts_as_zero_error() {
        let store: ObservationStore = [obs(0, 0, 0, 3.0), obs(1, 0, 0, 9.0)]
            .into_iter()
            .collect();
        let s = summarize_steps(&StepGroups::new(&store)).unwrap()[0];
        assert_eq!(s.mean_rel_error, 0.0);
        assert_eq!(s.stdev_rel_error, 0.0);
        assert_eq!(s.mean_estimate, 6.0);
        assert_eq!(s.stdev_estimate, 3.0);
    }

    #[test]
    fn test_summaries_are_idempotent_over_regrouping() {
        let store: ObservationStore = (0..5u32)
            .flat_map(|stream| {
                (0..4u64).map(move |step| {
                    let truth = (step + 1) * 100;
                    obs(stream, step, truth, truth as f64 + f64::from(stream) - 2.0)
                })
            })
            .collect();

        let groups = StepGroups::new(&store);
        let first = summarize_steps(&groups).unwrap();

        let flattened: ObservationStore = groups.flatten().into_iter().collect();
        let second = summarize_steps(&StepGroups::new(&flattened)).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_estimate_band() {
        let s = StepSummary {
            step: 3,
            fraction: 0.4,
            mean_estimate: 10.0,
            stdev_estimate: 1.5,
            mean_rel_error: 0.0,
            stdev_rel_error: 0.0,
        };
        assert_eq!(s.estimate_band(), (8.5, 11.5));
    }
}
