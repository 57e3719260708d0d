//! Observations of an estimator at a point of a simulated stream's progress
//! and the in-memory store holding all observations of one run.

#[cfg(feature = "with_serde")]
use serde::{Deserialize, Serialize};

/// One measurement of an estimator at a checkpoint of one stream
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Stream replica identifier within the run
    pub stream_id: u32,
    /// Measurement checkpoint, shared by all streams measured at the same time
    pub step: u64,
    /// Processed fraction of the stream in `[0, 1]`, a property of the step
    pub fraction: f64,
    /// Raw elements processed so far
    pub processed: u64,
    /// Exact number of distinct elements so far
    pub true_f0: u64,
    /// Estimator output
    pub estimate: f64,
}

/// Point of a single stream's trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(Serialize, Deserialize))]
pub struct TrajectoryPoint {
    pub fraction: f64,
    pub true_f0: u64,
    pub estimate: f64,
}

/// Ordered, append-only collection of the observations of one run.
///
/// Rows are kept as encountered, duplicates included: replicated `(stream_id, step)` pairs
/// take part in the averages like any other observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationStore {
    observations: Vec<Observation>,
}

impl ObservationStore {
    /// Creates empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append observation at the end of the store
    #[inline]
    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Return observations in insertion order
    #[inline]
    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// Return trajectory of a single stream sorted by ascending fraction
    pub fn trajectory(&self, stream_id: u32) -> Vec<TrajectoryPoint> {
        let mut points: Vec<TrajectoryPoint> = self
            .observations
            .iter()
            .filter(|o| o.stream_id == stream_id)
            .map(|o| TrajectoryPoint {
                fraction: o.fraction,
                true_f0: o.true_f0,
                estimate: o.estimate,
            })
            .collect();
        // stable sort keeps encounter order for equal fractions
        points.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));
        points
    }
}

impl FromIterator<Observation> for ObservationStore {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            observations: iter.into_iter().collect(),
        }
    }
}

impl Extend<Observation> for ObservationStore {
    fn extend<I: IntoIterator<Item = Observation>>(&mut self, iter: I) {
        self.observations.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ObservationStore {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
