use std::f64::consts::PI;

use grain_core::config::AxisMethod;
use grain_core::errors::GrainError;
use grain_core::types::{Point, Polygon};
use grain_geom::{
    area, centroid, convex_hull_indices, describe, expanded_area, min_area_rect,
    moment_ellipse_axes, perimeter, shape_factor, solidity, touches_border, FeatureExtractor,
};

fn circle(cx: f64, cy: f64, r: f64, n: usize) -> Polygon {
    Polygon::new(
        (0..n)
            .map(|k| {
                let t = 2.0 * PI * k as f64 / n as f64;
                Point::new(cx + r * t.cos(), cy + r * t.sin())
            })
            .collect(),
    )
}

#[test]
fn square_basics() {
    let square = Polygon::from_xy(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
    assert_eq!(area(square.points()), 16.0);
    assert_eq!(perimeter(square.points()), 16.0);
    let c = centroid(square.points()).expect("centroid");
    assert!((c.x - 2.0).abs() < 1e-12 && (c.y - 2.0).abs() < 1e-12);
}

#[test]
fn hull_skips_interior_and_collinear_points() {
    let points = Polygon::from_xy(&[
        (0.0, 0.0),
        (2.0, 0.0),
        (4.0, 0.0),
        (4.0, 4.0),
        (2.0, 2.0),
        (0.0, 4.0),
    ]);
    let mut hull = convex_hull_indices(points.points());
    hull.sort_unstable();
    assert_eq!(hull, vec![0, 2, 3, 5]);
}

#[test]
fn min_area_rect_recovers_rotated_rectangle() {
    let angle = 30f64.to_radians();
    let (c, s) = (angle.cos(), angle.sin());
    let corners = [(0.0, 0.0), (10.0, 0.0), (10.0, 2.0), (0.0, 2.0)];
    let rotated: Vec<(f64, f64)> = corners
        .iter()
        .map(|&(x, y)| (x * c - y * s + 50.0, x * s + y * c + 50.0))
        .collect();
    let rect = min_area_rect(Polygon::from_xy(&rotated).points()).expect("rect");
    let (long, short) = rect.long_short();
    assert!((long - 10.0).abs() < 1e-9);
    assert!((short - 2.0).abs() < 1e-9);
}

#[test]
fn circle_is_round_and_solid() {
    let disc = circle(100.0, 100.0, 40.0, 256);
    let shape = describe(&disc).expect("describe");
    assert!(shape.shape_factor > 0.99 && shape.shape_factor <= 1.0);
    assert!(shape.solidity > 0.999 && shape.solidity <= 1.0 + 1e-12);
}

#[test]
fn ellipse_axes_of_disc_match_diameter() {
    let disc = circle(0.0, 0.0, 25.0, 512);
    let (major, minor) = moment_ellipse_axes(disc.points()).expect("axes");
    assert!((major - 50.0).abs() < 0.1);
    assert!((minor - 50.0).abs() < 0.1);
}

#[test]
fn expanded_area_adds_half_pixel_ring() {
    let disc = circle(0.0, 0.0, 20.0, 720);
    let expanded = expanded_area(&disc).expect("area");
    let expected = PI * 20.5 * 20.5;
    assert!((expanded - expected).abs() / expected < 1e-3);
}

#[test]
fn degenerate_inputs_are_reported_as_values() {
    assert!(matches!(
        shape_factor(10.0, 0.0),
        Err(GrainError::DegenerateGeometry(_))
    ));
    assert!(matches!(
        solidity(10.0, 0.0),
        Err(GrainError::DegenerateGeometry(_))
    ));
    let line = Polygon::from_xy(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0), (4.0, 4.0)]);
    assert!(describe(&line).is_err());
    assert!(expanded_area(&Polygon::from_xy(&[(0.0, 0.0), (1.0, 0.0)])).is_err());
}

#[test]
fn extractor_converts_to_physical_units() {
    let disc = circle(200.0, 200.0, 50.0, 360);
    let extractor = FeatureExtractor::new(0.01, AxisMethod::MinAreaRect);
    let m = extractor.measure(&disc).expect("measure");
    assert!((m.long_axis - 1.0).abs() < 0.01);
    assert!(m.short_axis <= m.long_axis);
    assert!((m.area - PI * 0.505 * 0.505).abs() < 1e-3);
    assert!((m.volume - m.short_axis * m.area).abs() < 1e-15);
}

#[test]
fn extractor_needs_five_points() {
    let quad = Polygon::from_xy(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
    let extractor = FeatureExtractor::new(0.01, AxisMethod::MomentEllipse);
    let err = extractor.measure(&quad).unwrap_err();
    assert_eq!(err.info().code, "too_few_points");
}

#[test]
fn border_touching_boxes() {
    let inner = Polygon::from_xy(&[(5.0, 5.0), (10.0, 5.0), (10.0, 10.0)]);
    let edge = Polygon::from_xy(&[(0.0, 5.0), (10.0, 5.0), (10.0, 10.0)]);
    assert!(!touches_border(&inner, 100.0, 100.0));
    assert!(touches_border(&edge, 100.0, 100.0));
    let far = Polygon::from_xy(&[(50.0, 5.0), (99.0, 5.0), (60.0, 10.0)]);
    assert!(touches_border(&far, 100.0, 100.0));
}
