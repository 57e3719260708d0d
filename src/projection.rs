//! Numeric projections of an observation fed into per-step statistics.
use enum_dispatch::enum_dispatch;

use crate::accuracy::relative_error;
use crate::observation::Observation;

/// Projection trait which must be implemented by all projections.
#[enum_dispatch(Projection)]
pub trait ProjectionTrait {
    fn project(&self, observation: &Observation) -> f64;
    fn name(&self) -> &'static str;
}

/// Quantities summarized per step
#[derive(Debug, Clone, Copy, PartialEq)]
#[enum_dispatch]
pub enum Projection {
    Estimate(Estimate),
    RelativeError(RelativeError),
}

/// Raw estimator output
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Estimate;

/// Signed relative error against the ground truth
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RelativeError;

impl ProjectionTrait for Estimate {
    #[inline]
    fn project(&self, observation: &Observation) -> f64 {
        observation.estimate
    }

    fn name(&self) -> &'static str {
        "estimate"
    }
}

impl ProjectionTrait for RelativeError {
    #[inline]
    fn project(&self, observation: &Observation) -> f64 {
        relative_error(observation.estimate, observation.true_f0)
    }

    fn name(&self) -> &'static str {
        "relative_error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::tests::obs;
    use test_case::test_case;

    #[test_case(Estimate.into(), 120, 123.0 => 123.0)]
    #[test_case(RelativeError.into(), 100, 125.0 => 0.25)]
    #[test_case(RelativeError.into(), 0, 7.0 => 0.0; "zero truth")]
    fn test_project(projection: Projection, true_f0: u64, estimate: f64) -> f64 {
        projection.project(&obs(0, 0, true_f0, estimate))
    }

    #[test]
    fn test_names() {
        assert_eq!(Projection::from(Estimate).name(), "estimate");
        assert_eq!(Projection::from(RelativeError).name(), "relative_error");
    }
}
