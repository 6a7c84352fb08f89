use std::f64::consts::PI;

use grain_core::config::AxisMethod;
use grain_core::types::{Point, Polygon};
use grain_geom::{describe, FeatureExtractor};
use proptest::prelude::*;

fn star_polygon(radii: &[f64]) -> Polygon {
    let n = radii.len();
    Polygon::new(
        radii
            .iter()
            .enumerate()
            .map(|(k, r)| {
                let t = 2.0 * PI * k as f64 / n as f64;
                Point::new(500.0 + r * t.cos(), 500.0 + r * t.sin())
            })
            .collect(),
    )
}

proptest! {
    #[test]
    fn measurements_respect_axis_order(radii in prop::collection::vec(20.0f64..200.0, 8..64), ellipse in any::<bool>()) {
        let polygon = star_polygon(&radii);
        let method = if ellipse { AxisMethod::MomentEllipse } else { AxisMethod::MinAreaRect };
        let m = FeatureExtractor::new(0.005, method).measure(&polygon).unwrap();
        prop_assert!(m.short_axis <= m.long_axis);
        prop_assert!(m.area > 0.0);
        prop_assert!(m.volume > 0.0);
    }

    #[test]
    fn shape_ratios_stay_in_unit_interval(radii in prop::collection::vec(20.0f64..200.0, 8..64)) {
        let shape = describe(&star_polygon(&radii)).unwrap();
        prop_assert!(shape.shape_factor > 0.0 && shape.shape_factor <= 1.0 + 1e-9);
        prop_assert!(shape.solidity > 0.0 && shape.solidity <= 1.0 + 1e-9);
    }
}
