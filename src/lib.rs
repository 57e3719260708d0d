//! `estimator-accuracy` evaluates how accurate a distinct-count estimator is, given recorded
//! simulation results: true and estimated cardinality of many replicated streams at a sequence
//! of checkpoints ("steps").
//!
//! Observations of a run are grouped by step and summarized by the mean and population
//! standard deviation of the estimate and of its relative error. The final error profile is set
//! against the HyperLogLog bound `1.04 / sqrt(2^p)`, and a baseline estimator can be compared
//! with a median-of-k variant through the ratio of their error standard deviations.
pub mod accuracy;
pub mod cli;
pub mod comparison;
pub mod dataset;
pub mod error;
pub mod grouping;
pub mod observation;
pub mod pipeline;
pub mod projection;
pub mod report;
pub mod run;
pub mod statistics;

pub use comparison::{compare, Alignment, Comparison, ComparisonSummary};
pub use error::{AnalysisError, Result};
pub use grouping::StepGroups;
pub use observation::{Observation, ObservationStore};
pub use run::{analyze_run, RunAnalysis, RunSummary};
pub use statistics::StepSummary;
