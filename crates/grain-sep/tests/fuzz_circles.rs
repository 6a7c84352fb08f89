use grain_core::config::GradingConfig;
use grain_core::types::AcquisitionMode;
use grain_geom::shapes::disc;
use grain_sep::{Separator, SeparatorSettings};
use proptest::prelude::*;

proptest! {
    #[test]
    fn circles_above_minimum_size_are_always_accepted(
        radius in 12.0f64..1500.0,
        vertices in 24usize..200,
        wide in any::<bool>(),
    ) {
        let mode = if wide { AcquisitionMode::Wide } else { AcquisitionMode::Narrow };
        let settings = SeparatorSettings::from_config(&GradingConfig::default(), mode).unwrap();
        let outcome = Separator::new(settings).separate(&disc(2000.0, 2000.0, radius, vertices));
        prop_assert_eq!(outcome.accepted.len(), 1);
        prop_assert_eq!(outcome.splits, 0);
        let m = outcome.accepted[0].measurement;
        prop_assert!(m.short_axis <= m.long_axis);
        prop_assert!(m.area > 0.0);
    }
}
