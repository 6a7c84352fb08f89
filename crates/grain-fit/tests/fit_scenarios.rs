use grain_core::config::{BoundaryMode, GradingConfig, RootFindOptions};
use grain_core::errors::{FailureKind, GrainError};
use grain_core::types::{Distribution, RANGE_SENTINEL};
use grain_fit::{
    calibrate, derive_boundaries, fit_class, intersect, mean_and_std, peak_normalized_density,
    Intersection,
};

fn dist(mean: f64, std_dev: f64) -> Distribution {
    Distribution {
        mean,
        std_dev,
        count: 100,
    }
}

fn doubling_classes() -> Vec<Distribution> {
    [0.1, 0.2, 0.4, 0.8, 1.6, 3.2]
        .iter()
        .map(|&m| dist(m, 0.1 * m))
        .collect()
}

#[test]
fn population_statistics() {
    let (mean, std) = mean_and_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).expect("stats");
    assert_eq!(mean, 5.0);
    assert_eq!(std, 2.0);
    assert!(mean_and_std(&[]).is_none());
}

#[test]
fn second_pass_trims_outliers() {
    let mut samples = vec![1.0; 9];
    samples.push(100.0);
    let d = fit_class(&samples).expect("fit");
    assert_eq!(d.count, 9);
    assert_eq!(d.mean, 1.0);
    assert_eq!(d.std_dev, 0.0);

    let d = fit_class(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).expect("fit");
    assert_eq!(d.count, 7);
    assert!((d.mean - 31.0 / 7.0).abs() < 1e-12);
}

#[test]
fn empty_class_is_reported() {
    let err = fit_class(&[f64::NAN]).unwrap_err();
    assert!(matches!(err, GrainError::EmptyClass(_)));
}

#[test]
fn symmetric_pair_meets_halfway_with_equal_tails() {
    let (left, right) = (dist(10.0, 2.0), dist(20.0, 2.0));
    let x = intersect(&left, &right, &RootFindOptions::default()).expect("root");
    assert!((x - 15.0).abs() < 1e-9);
    let meeting = Intersection::at(0, &left, &right, x, false);
    assert!((meeting.left_upper_tail - meeting.right_lower_tail).abs() < 1e-12);
    assert!((meeting.left_upper_tail - 0.00620966532577613).abs() < 1e-9);
}

#[test]
fn unequal_spreads_meet_at_equal_z_scores() {
    let (left, right) = (dist(10.0, 1.0), dist(20.0, 3.0));
    let x = intersect(&left, &right, &RootFindOptions::default()).expect("root");
    assert!((x - 12.5).abs() < 1e-8);
    let gap = peak_normalized_density(x, &left) - peak_normalized_density(x, &right);
    assert!(gap.abs() < 1e-9);
}

#[test]
fn coincident_means_meet_at_the_mean() {
    let x = intersect(&dist(5.0, 1.0), &dist(5.0, 2.0), &RootFindOptions::default()).expect("root");
    assert_eq!(x, 5.0);
}

#[test]
fn solver_failures_are_root_find_errors() {
    let zero_spread = Distribution {
        mean: 4.0,
        std_dev: 0.0,
        count: 3,
    };
    let err = intersect(&zero_spread, &dist(8.0, 1.0), &RootFindOptions::default()).unwrap_err();
    assert!(matches!(err, GrainError::RootFind(_)));

    let starved = RootFindOptions {
        max_iters: 1,
        tolerance: 1e-15,
    };
    let err = intersect(&dist(1.0, 0.3), &dist(9.0, 2.5), &starved).unwrap_err();
    assert_eq!(err.info().code, "no_convergence");
}

#[test]
fn intersection_ranges_are_contiguous_without_extension() {
    let report = derive_boundaries(&doubling_classes(), &GradingConfig::default()).expect("ranges");
    assert_eq!(report.ranges.len(), 6);
    assert_eq!(report.intersections.len(), 5);
    assert_eq!(report.ranges[0].lower, 0.0);
    assert_eq!(report.ranges[5].upper, RANGE_SENTINEL);
    for i in 0..5 {
        assert_eq!(report.ranges[i].upper, report.ranges[i + 1].lower);
        assert!((report.intersections[i].x - 4.0 * report.distributions[i].mean / 3.0).abs() < 1e-9);
    }
    assert!(report.failures.is_empty());
}

#[test]
fn extension_ratio_makes_ranges_overlap() {
    let mut config = GradingConfig::default();
    config.extension_ratio = 0.5;
    let report = derive_boundaries(&doubling_classes(), &config).expect("ranges");
    for i in 0..5 {
        assert!(report.ranges[i].upper > report.ranges[i + 1].lower);
    }
    let x0 = report.intersections[0].x;
    assert!((report.ranges[0].upper - (x0 + 0.5 * 0.01)).abs() < 1e-12);
}

#[test]
fn empty_class_falls_back_to_sieve_opening() {
    let mut classes = doubling_classes();
    classes[3] = Distribution::empty();
    let report = derive_boundaries(&classes, &GradingConfig::default()).expect("ranges");
    assert_eq!(report.failures.get(FailureKind::RootFind), 2);
    assert!(report.intersections[2].fallback);
    assert_eq!(report.intersections[2].x, 0.6);
    assert_eq!(report.intersections[3].x, 1.18);
    assert!(!report.intersections[4].fallback);
}

#[test]
fn std_multiple_mode() {
    let mut config = GradingConfig::default();
    config.grade_boundaries = BoundaryMode::StdMultiple { multiple: 2.0 };
    let report = derive_boundaries(&doubling_classes(), &config).expect("ranges");
    assert!(report.intersections.is_empty());
    assert_eq!(report.ranges[0].lower, 0.0);
    assert!((report.ranges[0].upper - 0.12).abs() < 1e-12);
    assert!((report.ranges[2].lower - 0.32).abs() < 1e-12);
    assert!((report.ranges[2].upper - 0.48).abs() < 1e-12);
    assert_eq!(report.ranges[5].upper, RANGE_SENTINEL);
}

#[test]
fn wrong_class_count_is_systemic() {
    let err = derive_boundaries(&doubling_classes()[..4], &GradingConfig::default()).unwrap_err();
    assert!(matches!(err, GrainError::Config(_)));
}

#[test]
fn calibrate_counts_empty_classes() {
    let classes = vec![
        vec![0.1, 0.11, 0.09],
        vec![0.2, 0.22, 0.18],
        vec![0.4, 0.44, 0.36],
        vec![],
        vec![1.6, 1.7, 1.5],
        vec![3.2, 3.3, 3.1],
    ];
    let report = calibrate(&classes, &GradingConfig::default()).expect("calibrate");
    assert_eq!(report.failures.get(FailureKind::EmptyClass), 1);
    assert_eq!(report.distributions[3].count, 0);
    let json = serde_json::to_string(&report).expect("serialize");
    assert!(json.contains("left_upper_tail"));
}
