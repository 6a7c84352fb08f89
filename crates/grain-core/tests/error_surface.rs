use grain_core::errors::{ErrorInfo, FailureKind, FailureTally, GrainError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("points", 3)
        .with_context("mode", "narrow")
}

#[test]
fn degenerate_geometry_surface() {
    let err = GrainError::DegenerateGeometry(sample_info("G001", "zero perimeter"));
    assert_eq!(err.info().code, "G001");
    assert_eq!(err.info().context.get("points").map(String::as_str), Some("3"));
    assert_eq!(err.kind(), FailureKind::DegenerateGeometry);
}

#[test]
fn split_and_root_find_map_to_their_buckets() {
    let split = GrainError::Split(sample_info("S001", "hull order"));
    let root = GrainError::RootFind(sample_info("R001", "no convergence"));
    assert_eq!(split.kind(), FailureKind::SplitError);
    assert_eq!(root.kind(), FailureKind::RootFind);
}

#[test]
fn display_includes_context_and_hint() {
    let err = GrainError::Config(
        ErrorInfo::new("C001", "bad batch")
            .with_context("batch_size", 0)
            .with_hint("use 1"),
    );
    let text = err.to_string();
    assert!(text.contains("config error"));
    assert!(text.contains("batch_size=0"));
    assert!(text.contains("hint: use 1"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = GrainError::EmptyClass(ErrorInfo::new("E001", "no particles"));
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "EmptyClass");
    assert_eq!(json["detail"]["code"], "E001");
}

#[test]
fn tallies_merge_by_addition() {
    let mut left = FailureTally::new();
    left.record(FailureKind::SplitError);
    left.record(FailureKind::SplitError);
    let mut right = FailureTally::new();
    right.record(FailureKind::SplitError);
    right.record_error(&GrainError::degenerate("G002", "collinear"));

    left.merge(&right);
    assert_eq!(left.get(FailureKind::SplitError), 3);
    assert_eq!(left.get(FailureKind::DegenerateGeometry), 1);
    assert_eq!(left.get(FailureKind::RootFind), 0);
    assert_eq!(left.total(), 4);
    assert!(!left.is_empty());
}
