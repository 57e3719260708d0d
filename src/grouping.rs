//! Partitioning of a run's observations by measurement step.
//!
//! The map itself is unordered. Consumers that need a series go through
//! [`StepGroups::ascending`], which is the only place the step order is established.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use wyhash::WyHash;

use crate::observation::Observation;

type StepMap<'a> = HashMap<u64, Vec<&'a Observation>, BuildHasherDefault<WyHash>>;

/// Observations of one run keyed by `step`, each group in encounter order
#[derive(Debug, Clone, Default)]
pub struct StepGroups<'a> {
    groups: StepMap<'a>,
}

impl<'a> StepGroups<'a> {
    /// Group observations by step
    pub fn new<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        let mut groups = StepMap::default();
        for o in observations {
            groups.entry(o.step).or_default().push(o);
        }
        Self { groups }
    }

    /// Number of distinct steps
    #[inline]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Return observations of given step
    #[inline]
    pub fn get(&self, step: u64) -> Option<&[&'a Observation]> {
        self.groups.get(&step).map(Vec::as_slice)
    }

    /// Return groups ordered by ascending step
    pub fn ascending(&self) -> Vec<(u64, &[&'a Observation])> {
        let mut ordered: Vec<(u64, &[&'a Observation])> = self
            .groups
            .iter()
            .map(|(&step, group)| (step, group.as_slice()))
            .collect();
        ordered.sort_unstable_by_key(|&(step, _)| step);
        ordered
    }

    /// Return all grouped observations, step by step in ascending order
    pub fn flatten(&self) -> Vec<Observation> {
        self.ascending()
            .into_iter()
            .flat_map(|(_, group)| group.iter().map(|&o| *o))
            .collect()
    }
}
