use criterion::{criterion_group, criterion_main, Criterion};
use grain_core::config::GradingConfig;
use grain_core::types::{GradingRange, ParticleMeasurement, RANGE_SENTINEL, SIEVE_OPENINGS};
use grain_grade::{aggregate, SampleMeasurements};

fn ranges() -> Vec<GradingRange> {
    (0..6)
        .map(|c| {
            let lower = if c == 0 { 0.0 } else { SIEVE_OPENINGS[c] };
            let upper = if c == 5 { RANGE_SENTINEL } else { SIEVE_OPENINGS[c + 1] };
            GradingRange::new(lower, upper)
        })
        .collect()
}

fn samples() -> Vec<SampleMeasurements> {
    (0..8)
        .map(|s| {
            let mut sample = SampleMeasurements::new(format!("s{s}"), [0.05, 0.1, 0.2, 0.3, 0.25, 0.1]);
            for image in 0..50 {
                let particles = (0..200)
                    .map(|p| {
                        let short = 0.08 + ((s * 7 + image * 13 + p) % 400) as f64 * 0.01;
                        ParticleMeasurement::from_axes(short, short * 1.4, short * short)
                    })
                    .collect();
                sample.images.push(particles);
            }
            sample
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let config = GradingConfig {
        batch_size: 5,
        ..GradingConfig::default()
    };
    let ranges = ranges();
    let samples = samples();
    c.bench_function("aggregate_throughput", |b| {
        b.iter(|| {
            let report = aggregate(&samples, &ranges, &config).expect("aggregate");
            assert_eq!(report.rows.len(), 40);
        });
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
