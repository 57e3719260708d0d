//! Single-run analysis: the step series of one precision parameter and its summary snapshot.

#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::debug;

use crate::accuracy::{register_count, theoretical_rse};
use crate::error::{AnalysisError, Result};
use crate::grouping::StepGroups;
use crate::observation::{ObservationStore, TrajectoryPoint};
use crate::statistics::{summarize_steps, StepSummary};

/// Stream whose trajectory is reported next to the aggregated series
pub const REFERENCE_STREAM: u32 = 0;

/// Error profile of one run at stream completion
#[derive(Debug, Clone, Copy, PartialEq, Tabled)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct RunSummary {
    pub p: u8,
    pub m: u64,
    #[tabled(display_with = "crate::report::fmt_ratio")]
    pub theory_rse: f64,
    #[tabled(display_with = "crate::report::fmt_ratio")]
    pub mean_err_last: f64,
    #[tabled(display_with = "crate::report::fmt_ratio")]
    pub std_err_last: f64,
}

/// Complete analysis of one run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct RunAnalysis {
    pub summary: RunSummary,
    /// Step series ordered by ascending step
    pub series: Vec<StepSummary>,
    /// Trajectory of the reference stream ordered by ascending fraction
    pub reference_trajectory: Vec<TrajectoryPoint>,
}

/// Compute the ascending step series of a run
pub fn step_series(store: &ObservationStore) -> Result<Vec<StepSummary>> {
    summarize_steps(&StepGroups::new(store))
}

/// Analyze all observations of the run with precision `p`
pub fn analyze_run(p: u8, store: &ObservationStore) -> Result<RunAnalysis> {
    let m = register_count(p).ok_or(AnalysisError::InvalidPrecision { p })?;
    let series = step_series(store)?;
    let last = series.last().ok_or(AnalysisError::NoObservations { p })?;
    debug!(p, observations = store.len(), steps = series.len(), "analyzed run");

    let summary = RunSummary {
        p,
        m,
        theory_rse: theoretical_rse(p),
        mean_err_last: last.mean_rel_error,
        std_err_last: last.stdev_rel_error,
    };

    Ok(RunAnalysis {
        summary,
        series,
        reference_trajectory: store.trajectory(REFERENCE_STREAM),
    })
}
