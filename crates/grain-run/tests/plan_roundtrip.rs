use std::fs;
use std::sync::atomic::AtomicBool;

use grain_core::types::AcquisitionMode;
use grain_geom::shapes::{disc, dumbbell};
use grain_run::{
    load_plan, load_report, run_plan, run_plan_from_path, write_report, SegmentedImage,
    WorkerOpts, REPORT_FILE,
};
use tempfile::tempdir;

fn image(id: &str, radius: f64) -> SegmentedImage {
    SegmentedImage {
        id: id.to_string(),
        width: 2000.0,
        height: 2000.0,
        mode: AcquisitionMode::Narrow,
        polygons: vec![
            disc(400.0, 400.0, radius, 96),
            disc(1200.0, 400.0, radius * 1.1, 96),
            dumbbell(1000.0, 1200.0, radius, 0.975 * radius, 120),
        ],
    }
}

const PLAN: &str = r#"
concurrency: 2
config:
  batch_size: 2
  grade_boundaries:
    type: explicit
    ranges:
      - { lower: 0.0, upper: 0.15 }
      - { lower: 0.15, upper: 0.3 }
      - { lower: 0.3, upper: 0.6 }
      - { lower: 0.6, upper: 1.18 }
      - { lower: 1.18, upper: 2.36 }
      - { lower: 2.36, upper: 1000000000000.0 }
samples:
  - id: sample-a
    label: [0.0, 0.0, 0.5, 0.5, 0.0, 0.0]
    segments: segments/sample-a.json
"#;

#[test]
fn plan_runs_from_disk_and_report_round_trips() {
    let dir = tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("segments")).expect("segments dir");
    // 0.4 mm and 0.9 mm short axes at 0.00351 mm/px.
    let images = vec![
        image("img-1", 57.0),
        image("img-2", 128.0),
        image("img-3", 57.0),
    ];
    fs::write(
        dir.path().join("segments/sample-a.json"),
        serde_json::to_vec(&images).expect("encode"),
    )
    .expect("write segments");
    let plan_path = dir.path().join("plan.yaml");
    fs::write(&plan_path, PLAN).expect("write plan");

    let plan = load_plan(&plan_path).expect("plan");
    assert_eq!(plan.concurrency, 2);
    assert_eq!(plan.config.batch_size, 2);
    assert_eq!(plan.base_dir, dir.path());
    let reparsed: grain_run::Plan =
        serde_yaml::from_str(&plan.to_yaml_string().expect("yaml")).expect("reparse");
    assert_eq!(reparsed.samples, plan.samples);

    let cancel = AtomicBool::new(false);
    let report = run_plan(&plan, &WorkerOpts { concurrency: 2 }, &cancel).expect("run");
    let rows = &report.run.grading.rows;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].counts[2], 8);
    assert_eq!(rows[1].counts[3], 4);
    assert_eq!(report.provenance.input_hash, plan.plan_hash().expect("hash"));

    let out = dir.path().join("out");
    let path = write_report(&report, &out).expect("write report");
    assert_eq!(path, out.join(REPORT_FILE));
    let loaded = load_report(&path).expect("load report");
    assert_eq!(loaded.provenance, report.provenance);
    assert_eq!(loaded.run.grading.rows.len(), 2);
    assert_eq!(loaded.run.separation, report.run.separation);

    let again = run_plan_from_path(&plan_path, &cancel).expect("rerun");
    assert_eq!(again.run, report.run);
}

#[test]
fn plan_without_samples_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let plan_path = dir.path().join("plan.yaml");
    fs::write(&plan_path, "samples: []\n").expect("write plan");
    let err = load_plan(&plan_path).expect_err("empty plan");
    assert_eq!(err.info().code, "no_samples");
}
