#![no_main]

use estimator_accuracy::comparison::{compare, Alignment, Comparison};
use estimator_accuracy::observation::{Observation, ObservationStore};
use estimator_accuracy::run::step_series;
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fn store(chunk: &[u8]) -> ObservationStore {
    chunk
        .chunks(4)
        .enumerate()
        .map(|(i, c)| {
            let true_f0 = u64::from(c[0]);
            Observation {
                stream_id: u32::from(c.get(1).copied().unwrap_or_default() % 8),
                step: u64::from(c.get(2).copied().unwrap_or_default() % 16),
                fraction: 0.5,
                processed: i as u64,
                true_f0,
                estimate: f64::from(c.get(3).copied().unwrap_or_default()),
            }
        })
        .collect()
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let base = step_series(&store(first_half)).unwrap();
    let imp = step_series(&store(second_half)).unwrap();

    for alignment in [Alignment::Positional, Alignment::ByStep] {
        match compare(10, Some(base.as_slice()), Some(imp.as_slice()), alignment).unwrap() {
            Comparison::Computed(summary) => {
                assert!(summary.aligned > 0);
                assert!(summary.std_improvement_factor >= 0.0);
                assert_eq!(summary.aligned + summary.dropped.baseline, base.len());
                assert_eq!(summary.aligned + summary.dropped.improved, imp.len());
                let (base_last, imp_last) = (base[base.len() - 1], imp[imp.len() - 1]);
                assert_eq!(
                    summary.base_std_err_last.to_bits(),
                    base_last.stdev_rel_error.to_bits()
                );
                assert_eq!(
                    summary.imp_std_err_last.to_bits(),
                    imp_last.stdev_rel_error.to_bits()
                );
            }
            Comparison::NoData { .. } => {
                assert!(base.is_empty() || imp.is_empty() || alignment == Alignment::ByStep)
            }
        }
    }
});
