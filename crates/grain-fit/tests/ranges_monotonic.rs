use grain_core::config::GradingConfig;
use grain_core::types::{Distribution, RANGE_SENTINEL};
use grain_fit::derive_boundaries;
use proptest::prelude::*;

proptest! {
    #[test]
    fn ranges_never_decrease(base in 0.05f64..0.5, spread in 0.05f64..0.3, ratio in 0.0f64..1.0) {
        let distributions: Vec<Distribution> = (0..6)
            .map(|i| {
                let mean = base * 2f64.powi(i);
                Distribution { mean, std_dev: spread * mean, count: 50 }
            })
            .collect();
        let mut config = GradingConfig::default();
        config.extension_ratio = ratio;
        let report = derive_boundaries(&distributions, &config).unwrap();
        prop_assert_eq!(report.ranges[0].lower, 0.0);
        prop_assert_eq!(report.ranges[5].upper, RANGE_SENTINEL);
        for pair in report.ranges.windows(2) {
            prop_assert!(pair[1].lower >= pair[0].lower);
            prop_assert!(pair[1].upper >= pair[0].upper);
        }
    }
}
