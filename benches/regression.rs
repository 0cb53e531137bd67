use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;

use ta_regression::{Method, Regressor, RollingRegression};

fn random_series(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.r#gen::<f64>()).collect()
}

fn benchmark_methods(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1000);
    let x = random_series(&mut rng, 10_000);
    let y = random_series(&mut rng, 10_000);

    let mut group = c.benchmark_group("Rolling Regression");
    group.measurement_time(Duration::new(5, 0));
    group.warm_up_time(Duration::new(2, 0));

    for window in [30, 250] {
        group.bench_with_input(BenchmarkId::new("Direct", window), &window, |b, &w| {
            let reg = Regressor::new(w).method(Method::Direct);
            b.iter(|| reg.apply(black_box(&x), black_box(&y)).expect("valid inputs"))
        });

        group.bench_with_input(BenchmarkId::new("Incremental", window), &window, |b, &w| {
            let reg = Regressor::new(w);
            b.iter(|| reg.apply(black_box(&x), black_box(&y)).expect("valid inputs"))
        });

        group.bench_with_input(BenchmarkId::new("Streaming", window), &window, |b, &w| {
            b.iter(|| {
                let mut reg = RollingRegression::try_new(w).expect("valid window");
                x.iter()
                    .zip(&y)
                    .filter_map(|(&xi, &yi)| reg.next((xi, yi)).slope())
                    .fold(0.0, |acc, s| acc + s)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_methods);
criterion_main!(benches);
