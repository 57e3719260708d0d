//! Comparison of a baseline estimator against its median-of-k variant at the same precision.
//!
//! The error statistics of each variant's own last step are set side by side, and the ratio of
//! their standard deviations gives the improvement factor. Alignment of the two series only
//! reports how many points have no counterpart. A missing or empty series produces
//! [`Comparison::NoData`] instead of zeros.

#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::warn;

use crate::accuracy::{register_count, theoretical_rse};
use crate::error::{AnalysisError, Result};
use crate::statistics::StepSummary;

/// Estimator configuration being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub enum Variant {
    Baseline,
    Improved,
}

/// How the points of both series are paired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub enum Alignment {
    /// Pair by position, truncating to the shorter series
    #[default]
    Positional,
    /// Pair points with equal step values
    ByStep,
}

/// Points left out by the alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct Dropped {
    pub baseline: usize,
    pub improved: usize,
}

impl Dropped {
    #[inline]
    pub fn total(&self) -> usize {
        self.baseline + self.improved
    }
}

/// Baseline and improved series paired point by point
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries<'a> {
    pub pairs: Vec<(&'a StepSummary, &'a StepSummary)>,
    pub dropped: Dropped,
}

/// Comparison at one precision when both series have data
#[derive(Debug, Clone, Copy, PartialEq, Tabled)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct ComparisonSummary {
    pub p: u8,
    pub m: u64,
    #[tabled(display_with = "crate::report::fmt_ratio")]
    pub theory_rse_base: f64,
    #[tabled(display_with = "crate::report::fmt_ratio")]
    pub base_mean_err_last: f64,
    #[tabled(display_with = "crate::report::fmt_ratio")]
    pub base_std_err_last: f64,
    #[tabled(display_with = "crate::report::fmt_ratio")]
    pub imp_mean_err_last: f64,
    #[tabled(display_with = "crate::report::fmt_ratio")]
    pub imp_std_err_last: f64,
    #[tabled(display_with = "crate::report::fmt_factor")]
    pub std_improvement_factor: f64,
    #[tabled(skip)]
    pub aligned: usize,
    #[tabled(skip)]
    pub dropped: Dropped,
}

/// Why a comparison could not be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub enum NoDataReason {
    /// The variant has no series or an empty one
    MissingSeries(Variant),
    /// Step-based alignment found no step present in both series
    NoCommonSteps,
}

/// Outcome of comparing two variants at one precision
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub enum Comparison {
    Computed(ComparisonSummary),
    NoData { p: u8, reason: NoDataReason },
}

impl Comparison {
    #[inline]
    pub fn p(&self) -> u8 {
        match self {
            Comparison::Computed(summary) => summary.p,
            Comparison::NoData { p, .. } => *p,
        }
    }

    #[inline]
    pub fn computed(&self) -> Option<&ComparisonSummary> {
        match self {
            Comparison::Computed(summary) => Some(summary),
            Comparison::NoData { .. } => None,
        }
    }
}

/// Ratio of baseline to improved standard deviation, `0.0` when the improved one is exactly zero
#[inline]
pub fn std_improvement_factor(base_stdev: f64, improved_stdev: f64) -> f64 {
    if improved_stdev == 0.0 {
        return 0.0;
    }
    base_stdev / improved_stdev
}

/// Pair the points of both ascending series
pub fn align<'a>(
    baseline: &'a [StepSummary],
    improved: &'a [StepSummary],
    alignment: Alignment,
) -> AlignedSeries<'a> {
    match alignment {
        Alignment::Positional => {
            let pairs: Vec<_> = baseline.iter().zip(improved.iter()).collect();
            let dropped = Dropped {
                baseline: baseline.len() - pairs.len(),
                improved: improved.len() - pairs.len(),
            };
            AlignedSeries { pairs, dropped }
        }
        Alignment::ByStep => {
            // both series are ascending by step, merge-join them
            let mut pairs = Vec::with_capacity(baseline.len().min(improved.len()));
            let (mut i, mut j) = (0, 0);
            while i < baseline.len() && j < improved.len() {
                let (b, s) = (&baseline[i], &improved[j]);
                match b.step.cmp(&s.step) {
                    std::cmp::Ordering::Less => i += 1,
                    std::cmp::Ordering::Greater => j += 1,
                    std::cmp::Ordering::Equal => {
                        pairs.push((b, s));
                        i += 1;
                        j += 1;
                    }
                }
            }
            let dropped = Dropped {
                baseline: baseline.len() - pairs.len(),
                improved: improved.len() - pairs.len(),
            };
            AlignedSeries { pairs, dropped }
        }
    }
}

/// Compare baseline and improved step series of precision `p`.
///
/// `None` stands for a variant that has no series at all.
pub fn compare(
    p: u8,
    baseline: Option<&[StepSummary]>,
    improved: Option<&[StepSummary]>,
    alignment: Alignment,
) -> Result<Comparison> {
    let m = register_count(p).ok_or(AnalysisError::InvalidPrecision { p })?;
    let (baseline, base_last) = match baseline {
        Some(series @ [.., last]) => (series, last),
        _ => return Ok(no_data(p, NoDataReason::MissingSeries(Variant::Baseline))),
    };
    let (improved, imp_last) = match improved {
        Some(series @ [.., last]) => (series, last),
        _ => return Ok(no_data(p, NoDataReason::MissingSeries(Variant::Improved))),
    };

    let aligned = align(baseline, improved, alignment);
    if aligned.dropped.total() > 0 {
        warn!(
            p,
            ?alignment,
            dropped_baseline = aligned.dropped.baseline,
            dropped_improved = aligned.dropped.improved,
            "series do not align, unmatched points dropped"
        );
    }
    if aligned.pairs.is_empty() {
        return Ok(no_data(p, NoDataReason::NoCommonSteps));
    }

    Ok(Comparison::Computed(ComparisonSummary {
        p,
        m,
        theory_rse_base: theoretical_rse(p),
        base_mean_err_last: base_last.mean_rel_error,
        base_std_err_last: base_last.stdev_rel_error,
        imp_mean_err_last: imp_last.mean_rel_error,
        imp_std_err_last: imp_last.stdev_rel_error,
        std_improvement_factor: std_improvement_factor(
            base_last.stdev_rel_error,
            imp_last.stdev_rel_error,
        ),
        aligned: aligned.pairs.len(),
        dropped: aligned.dropped,
    }))
}

fn no_data(p: u8, reason: NoDataReason) -> Comparison {
    warn!(p, ?reason, "no comparison available");
    Comparison::NoData { p, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn point(step: u64, stdev_rel_error: f64) -> StepSummary {
        StepSummary {
            step,
            fraction: (step + 1) as f64 / 10.0,
            mean_estimate: 100.0,
            stdev_estimate: 100.0 * stdev_rel_error,
            mean_rel_error: 0.001 * step as f64,
            stdev_rel_error,
        }
    }

    fn series(steps: &[u64], stdev: f64) -> Vec<StepSummary> {
        steps.iter().map(|&s| point(s, stdev)).collect()
    }

    #[test_case(0.02, 0.01 => 2.0)]
    #[test_case(0.03, 0.03 => 1.0)]
    #[test_case(0.01, 0.0 => 0.0; "zero improved stdev")]
    #[test_case(0.0, 0.01 => 0.0; "zero baseline stdev")]
    fn test_std_improvement_factor(base: f64, improved: f64) -> f64 {
        std_improvement_factor(base, improved)
    }

    #[test]
    fn test_compare_computed() {
        let base = series(&[0, 1, 2], 0.02);
        let imp = series(&[0, 1, 2], 0.01);

        let comparison = compare(
            10,
            Some(base.as_slice()),
            Some(imp.as_slice()),
            Alignment::Positional,
        )
        .unwrap();
        let summary = comparison.computed().unwrap();
        assert_eq!(summary.p, 10);
        assert_eq!(summary.m, 1024);
        assert_eq!(summary.std_improvement_factor, 2.0);
        assert_eq!(summary.base_std_err_last, 0.02);
        assert_eq!(summary.imp_std_err_last, 0.01);
        assert_eq!(summary.base_mean_err_last, 0.002);
        assert_eq!(summary.aligned, 3);
        assert_eq!(summary.dropped, Dropped::default());
        assert!((summary.theory_rse_base - 0.0325).abs() < 1e-12);
    }

    #[test_case(None, Some(vec![point(0, 0.01)]) => Variant::Baseline; "absent baseline")]
    #[test_case(Some(vec![]), Some(vec![point(0, 0.01)]) => Variant::Baseline; "empty baseline")]
    #[test_case(Some(vec![point(0, 0.01)]), None => Variant::Improved; "absent improved")]
    #[test_case(Some(vec![point(0, 0.01)]), Some(vec![]) => Variant::Improved; "empty improved")]
    fn test_compare_no_data(
        base: Option<Vec<StepSummary>>,
        imp: Option<Vec<StepSummary>>,
    ) -> Variant {
        let comparison =
            compare(12, base.as_deref(), imp.as_deref(), Alignment::Positional).unwrap();
        assert_eq!(comparison.p(), 12);
        assert!(comparison.computed().is_none());
        match comparison {
            Comparison::NoData {
                reason: NoDataReason::MissingSeries(missing),
                ..
            } => missing,
            Comparison::NoData { .. } => panic!("expected missing series"),
            Comparison::Computed(_) => panic!("expected no data"),
        }
    }

    #[test]
    fn test_positional_truncation_is_reported() {
        let mut base = series(&[0, 1, 2, 3, 4], 0.02);
        base[2].stdev_rel_error = 0.04;
        let imp = series(&[0, 1, 2], 0.01);

        let comparison = compare(
            8,
            Some(base.as_slice()),
            Some(imp.as_slice()),
            Alignment::Positional,
        )
        .unwrap();
        let summary = comparison.computed().unwrap();
        assert_eq!(summary.aligned, 3);
        assert_eq!(
            summary.dropped,
            Dropped {
                baseline: 2,
                improved: 0
            }
        );
        assert_eq!(summary.base_std_err_last, 0.02);
        assert_eq!(summary.base_mean_err_last, 0.004);
        assert_eq!(summary.imp_mean_err_last, 0.002);
        assert_eq!(summary.std_improvement_factor, 2.0);
    }

    #[test]
    fn test_last_step_of_each_variant_by_step() {
        let base = series(&[0, 2, 4, 6], 0.02);
        let mut imp = series(&[0, 1, 2, 3, 4], 0.01);
        imp[4].stdev_rel_error = 0.005;

        let comparison = compare(
            9,
            Some(base.as_slice()),
            Some(imp.as_slice()),
            Alignment::ByStep,
        )
        .unwrap();
        let summary = comparison.computed().unwrap();
        assert_eq!(summary.aligned, 3);
        assert_eq!(summary.base_mean_err_last, base[3].mean_rel_error);
        assert_eq!(summary.imp_std_err_last, 0.005);
        assert_eq!(summary.std_improvement_factor, 4.0);
    }

    #[test]
    fn test_align_by_step() {
        let base = series(&[0, 2, 4, 6], 0.02);
        let imp = series(&[0, 1, 2, 3, 4], 0.01);

        let aligned = align(&base, &imp, Alignment::ByStep);
        let steps: Vec<(u64, u64)> = aligned.pairs.iter().map(|(b, i)| (b.step, i.step)).collect();
        assert_eq!(steps, vec![(0, 0), (2, 2), (4, 4)]);
        assert_eq!(
            aligned.dropped,
            Dropped {
                baseline: 1,
                improved: 2
            }
        );
    }

    #[test]
    fn test_align_by_step_without_common_steps() {
        let base = series(&[0, 2], 0.02);
        let imp = series(&[1, 3], 0.01);

        let comparison = compare(
            8,
            Some(base.as_slice()),
            Some(imp.as_slice()),
            Alignment::ByStep,
        )
        .unwrap();
        assert_eq!(
            comparison,
            Comparison::NoData {
                p: 8,
                reason: NoDataReason::NoCommonSteps
            }
        );
    }

    #[test]
    fn test_compare_invalid_precision() {
        let base = series(&[0], 0.02);
        let err = compare(
            70,
            Some(base.as_slice()),
            Some(base.as_slice()),
            Alignment::Positional,
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidPrecision { p: 70 }));
    }
}
