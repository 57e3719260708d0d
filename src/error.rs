//! Error taxonomy of the accuracy analysis.
//!
//! Zero ground truth is recovered locally (see [`crate::accuracy::relative_error`]) and a missing
//! comparison variant is a regular [`crate::comparison::Comparison::NoData`] value, so neither shows
//! up here.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A step group without observations reached the statistics stage.
    /// Grouping never produces one, so this is an internal invariant violation.
    #[error("internal invariant violated: empty observation group at step {step}")]
    EmptyGroup { step: u64 },

    #[error("no observations for p={p}")]
    NoObservations { p: u8 },

    #[error("precision p={p} is out of range (max {max})", max = crate::accuracy::MAX_PRECISION)]
    InvalidPrecision { p: u8 },

    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data directory not found: {}", .0.display())]
    MissingDataDir(PathBuf),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }
}
