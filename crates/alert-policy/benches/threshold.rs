use alert_policy::ThresholdPolicy;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_decide(c: &mut Criterion) {
    let policy = ThresholdPolicy::default();
    let speeds: Vec<f64> = (0..=120).map(f64::from).collect();

    c.bench_function("threshold_decide_sweep", |b| {
        b.iter(|| {
            for &speed in &speeds {
                black_box(policy.decide(black_box(speed)));
            }
        })
    });
}

criterion_group!(benches, bench_decide);
criterion_main!(benches);
