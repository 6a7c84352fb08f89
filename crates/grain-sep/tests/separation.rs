use grain_core::config::{AxisMethod, GradingConfig};
use grain_core::errors::{FailureKind, FailureTally};
use grain_core::types::{AcquisitionMode, Point, Polygon};
use grain_geom::expanded_area;
use grain_core::errors::GrainError;
use grain_geom::shapes::{disc, dumbbell, ellipse, lobe_chain};
use grain_sep::{
    divide, AdaptiveThresholds, RejectReason, Separator, SeparatorSettings, Verdict,
};

fn narrow_settings() -> SeparatorSettings {
    SeparatorSettings::from_config(&GradingConfig::default(), AcquisitionMode::Narrow)
        .expect("settings")
}

fn narrow() -> Separator {
    Separator::new(narrow_settings())
}

#[test]
fn settings_follow_mode() {
    let config = GradingConfig::default();
    let wide = SeparatorSettings::from_config(&config, AcquisitionMode::Wide).expect("wide");
    let narrow = narrow_settings();
    assert_eq!(wide.angle_threshold, 130.0);
    assert_eq!(narrow.angle_threshold, 110.0);
    assert_eq!(narrow.scale, 0.00351);
    assert_eq!(narrow.max_depth, 20);
}

#[test]
fn thresholds_fall_with_size_down_to_floors() {
    let small = AdaptiveThresholds::for_size(0.1);
    assert!((small.shape_factor - 0.795).abs() < 1e-12);
    assert!((small.solidity - 0.945).abs() < 1e-12);
    let medium = AdaptiveThresholds::for_size(1.5);
    assert!((medium.shape_factor - 0.725).abs() < 1e-12);
    assert!((medium.solidity - 0.875).abs() < 1e-12);
    let large = AdaptiveThresholds::for_size(6.0);
    assert!((large.shape_factor - 0.55).abs() < 1e-12);
    assert!((large.solidity - 0.8).abs() < 1e-12);
    assert!(!small.admits(0.79, 0.99));
    assert!(small.admits(0.8, 0.95));
}

#[test]
fn circle_is_accepted_without_split() {
    let outcome = narrow().separate(&disc(500.0, 500.0, 60.0, 180));
    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(outcome.splits, 0);
    assert!(outcome.failures.is_empty());
    let m = outcome.accepted[0].measurement;
    assert!(m.short_axis <= m.long_axis && m.area > 0.0);
}

#[test]
fn dumbbell_splits_into_two_lobes() {
    let polygon = dumbbell(500.0, 500.0, 40.0, 39.0, 200);
    let separator = narrow();
    let outcome = separator.separate(&polygon);
    assert_eq!(outcome.splits, 1);
    assert_eq!(outcome.accepted.len(), 2);
    assert!(outcome.failures.is_empty());
    for particle in &outcome.accepted {
        assert_eq!(particle.depth, 1);
        assert!(particle.measurement.short_axis <= particle.measurement.long_axis);
    }

    let parent = expanded_area(&polygon).expect("parent area");
    let children: f64 = outcome
        .accepted
        .iter()
        .map(|p| expanded_area(&p.polygon).expect("child area"))
        .sum();
    assert!((children - parent).abs() / parent < 0.01);
}

#[test]
fn dumbbell_first_evaluation_cuts_at_the_pinches() {
    let polygon = dumbbell(500.0, 500.0, 40.0, 39.0, 200);
    let mut failures = FailureTally::new();
    match narrow().evaluate(&polygon, 0, &mut failures) {
        Verdict::Split(first, second) => {
            assert_eq!(first.len(), 201);
            assert_eq!(second.len(), 201);
            assert_eq!(first.points()[0], polygon.points()[0]);
            assert_eq!(first.points()[200], polygon.points()[200]);
        }
        other => panic!("expected split, got {other:?}"),
    }
}

#[test]
fn touching_particles_rejected_when_splitting_disabled() {
    let mut settings = narrow_settings();
    settings.split_overlapping = false;
    let outcome = Separator::new(settings).separate(&dumbbell(500.0, 500.0, 40.0, 39.0, 200));
    assert!(outcome.accepted.is_empty());
    assert_eq!(outcome.rejections.get(&RejectReason::Touching), Some(&1));
}

#[test]
fn depth_limit_accepts_and_counts() {
    let mut settings = narrow_settings();
    settings.max_depth = 0;
    let outcome = Separator::new(settings).separate(&dumbbell(500.0, 500.0, 40.0, 39.0, 200));
    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(outcome.splits, 0);
    assert_eq!(outcome.failures.get(FailureKind::DepthLimit), 1);
}

#[test]
fn screening_rejections() {
    let separator = narrow();
    let quad = Polygon::from_xy(&[(0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (0.0, 40.0)]);
    let needle = ellipse(500.0, 500.0, 100.0, 10.0, 0.3, 64);
    let speck = disc(500.0, 500.0, 5.0, 32);
    let outcome = separator.separate_all([&quad, &needle, &speck]);
    assert!(outcome.accepted.is_empty());
    assert_eq!(outcome.rejections.get(&RejectReason::TooFewPoints), Some(&1));
    assert_eq!(outcome.rejections.get(&RejectReason::AspectRatio), Some(&1));
    assert_eq!(outcome.rejections.get(&RejectReason::BelowMinimumSize), Some(&1));
    assert_eq!(outcome.rejected(), 3);
}

#[test]
fn collinear_polygon_is_dropped_not_fatal() {
    let line = Polygon::from_xy(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0), (40.0, 0.0)]);
    let outcome = narrow().separate(&line);
    assert!(outcome.accepted.is_empty());
    assert_eq!(outcome.rejected(), 1);
}

#[test]
fn moment_axes_also_accept_discs() {
    let mut settings = narrow_settings();
    settings.axis_method = AxisMethod::MomentEllipse;
    let outcome = Separator::new(settings).separate(&disc(300.0, 300.0, 80.0, 120));
    assert_eq!(outcome.accepted.len(), 1);
}

#[test]
fn outcomes_merge() {
    let separator = narrow();
    let mut total = separator.separate(&disc(500.0, 500.0, 60.0, 90));
    total.merge(separator.separate(&dumbbell(500.0, 500.0, 40.0, 39.0, 120)));
    assert_eq!(total.accepted.len(), 3);
    assert_eq!(total.splits, 1);
    assert_eq!(total.measurements().len(), 3);
}

#[test]
fn self_intersecting_outline_is_kept_whole() {
    // Pentagon corners visited every second vertex.
    let star: Vec<Point> = [0usize, 2, 4, 1, 3]
        .iter()
        .map(|&k| {
            let t = std::f64::consts::FRAC_PI_2 + 2.0 * std::f64::consts::PI * k as f64 / 5.0;
            Point::new(500.0 + 100.0 * t.cos(), 500.0 + 100.0 * t.sin())
        })
        .collect();
    let outcome = narrow().separate(&Polygon::new(star));
    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(outcome.splits, 0);
    assert_eq!(outcome.failures.get(FailureKind::SplitError), 1);
    assert_eq!(outcome.rejected(), 0);
}

#[test]
fn three_lobes_split_recursively() {
    let chain = lobe_chain(500.0, 500.0, 40.0, 39.0, 3, 120);
    let outcome = narrow().separate(&chain);
    assert_eq!(outcome.accepted.len(), 3);
    assert_eq!(outcome.splits, 2);
    assert!(outcome.failures.is_empty());
    let mut depths: Vec<usize> = outcome.accepted.iter().map(|p| p.depth).collect();
    depths.sort_unstable();
    assert_eq!(depths, vec![1, 2, 2]);
}

#[test]
fn invalid_cuts_are_refused() {
    let round = disc(500.0, 500.0, 60.0, 90);
    let same = divide(&round, 3, 3).unwrap_err();
    assert!(matches!(same, GrainError::Split(_)));
    assert_eq!(same.info().code, "cut_indices");

    let adjacent = divide(&round, 10, 11).unwrap_err();
    assert_eq!(adjacent.info().code, "empty_child");

    let (first, second) = divide(&round, 0, 45).expect("halves");
    assert_eq!(first.len() + second.len(), round.len() + 2);
}
