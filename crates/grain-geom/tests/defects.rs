use grain_core::errors::GrainError;
use grain_core::types::Polygon;
use grain_geom::{convexity_defects, interior_angle};

#[test]
fn notch_produces_single_defect() {
    let notched = Polygon::from_xy(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 10.0),
        (5.0, 5.0),
        (0.0, 10.0),
    ]);
    let defects = convexity_defects(notched.points()).expect("defects");
    assert_eq!(defects.len(), 1);
    let defect = defects[0];
    assert_eq!((defect.start, defect.far, defect.end), (2, 3, 4));
    assert!((defect.depth - 5.0).abs() < 1e-12);
    assert!((defect.angle(notched.points()) - 90.0).abs() < 1e-9);
    assert!((defect.span(notched.points()) - 10.0).abs() < 1e-12);
}

#[test]
fn convex_polygon_has_no_defects() {
    let square = Polygon::from_xy(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
    assert!(convexity_defects(square.points()).expect("defects").is_empty());
}

#[test]
fn defect_wrapping_past_index_zero() {
    let notched = Polygon::from_xy(&[
        (5.0, 5.0),
        (0.0, 10.0),
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 10.0),
    ]);
    let defects = convexity_defects(notched.points()).expect("defects");
    assert_eq!(defects.len(), 1);
    assert_eq!((defects[0].start, defects[0].far, defects[0].end), (4, 0, 1));
}

#[test]
fn scrambled_order_is_a_split_error() {
    let bowtie = Polygon::from_xy(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)]);
    let err = convexity_defects(bowtie.points()).unwrap_err();
    assert!(matches!(err, GrainError::Split(_)));
    assert_eq!(err.info().code, "hull_order");
}

#[test]
fn interior_angle_of_right_angle() {
    use grain_core::types::Point;
    let angle = interior_angle(
        &Point::new(1.0, 0.0),
        &Point::new(0.0, 0.0),
        &Point::new(0.0, 1.0),
    );
    assert!((angle - 90.0).abs() < 1e-12);
    let zero = interior_angle(
        &Point::new(0.0, 0.0),
        &Point::new(0.0, 0.0),
        &Point::new(0.0, 1.0),
    );
    assert_eq!(zero, 180.0);
}
