#![no_main]

use std::path::Path;

use estimator_accuracy::dataset::parse_observations;
use estimator_accuracy::run::analyze_run;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(store) = parse_observations(Path::new("fuzz.csv"), data) {
        if let Ok(analysis) = analyze_run(12, &store) {
            assert!(!analysis.series.is_empty());
            assert!(analysis.series.windows(2).all(|w| w[0].step < w[1].step));
        }
    }
});
