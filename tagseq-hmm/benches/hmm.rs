use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tagseq_hmm::{fit, FitConfig, LatticeViterbi, Observations, TableViterbi};

/// Deterministic pseudo-random count matrix: `n * d` values in [0, 4).
fn random_counts(n: usize, d: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n * d)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 11) % 4) as f64
        })
        .collect()
}

/// Deterministic pseudo-random label sequence over `k` states.
fn random_labels(n: usize, k: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 11) as usize) % k
        })
        .collect()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");

    for (n, d, k) in [(1_000, 20, 5), (10_000, 50, 10)] {
        let obs = Observations::dense(random_counts(n, d, 42), d).unwrap();
        let labels = random_labels(n, k, 7);
        let lengths = vec![100; n / 100];
        group.bench_function(format!("n{n}_d{d}_k{k}"), |b| {
            b.iter(|| {
                fit(
                    black_box(&obs),
                    black_box(&labels),
                    black_box(&lengths),
                    &FitConfig::default(),
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let (n, d, k) = (5_000, 30, 8);
    let obs = Observations::dense(random_counts(n, d, 42), d).unwrap();
    let labels = random_labels(n, k, 7);
    let model = fit(&obs, &labels, &[n], &FitConfig::default()).unwrap();

    let test = Observations::dense(random_counts(1_000, d, 99), d).unwrap();

    group.bench_function("lattice", |b| {
        b.iter(|| model.decode_with(&LatticeViterbi, black_box(&test)).unwrap())
    });
    group.bench_function("table", |b| {
        b.iter(|| model.decode_with(&TableViterbi, black_box(&test)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_fit, bench_decode);
criterion_main!(benches);
