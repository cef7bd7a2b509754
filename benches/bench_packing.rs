use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use binpack_ga::{
    chromosome::crossover::order_crossover,
    packing::{evaluate, pack, unpack},
    rng::RandomNumberGenerator,
};

fn instance(size: usize, rng: &mut RandomNumberGenerator) -> (Vec<f64>, Vec<usize>) {
    let weights: Vec<f64> = (0..size).map(|_| 20.0 + rng.index(81) as f64).collect();
    let mut permutation: Vec<usize> = (0..size).collect();
    for i in (1..size).rev() {
        permutation.swap(i, rng.index(i + 1));
    }
    (weights, permutation)
}

fn bench_first_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_fit");
    let mut rng = RandomNumberGenerator::from_seed(1);

    for size in [120, 250, 500, 1000].iter() {
        let (weights, permutation) = instance(*size, &mut rng);

        group.bench_with_input(BenchmarkId::new("pack", size), &permutation, |b, permutation| {
            b.iter(|| pack(black_box(&weights), black_box(permutation), black_box(150.0)))
        });

        let solution = pack(&weights, &permutation, 150.0);
        group.bench_with_input(BenchmarkId::new("unpack_pack", size), &solution, |b, solution| {
            b.iter(|| pack(black_box(&weights), &unpack(black_box(solution)), black_box(150.0)))
        });

        group.bench_with_input(BenchmarkId::new("evaluate", size), &solution, |b, solution| {
            b.iter(|| evaluate(black_box(solution), black_box(150.0)))
        });
    }

    group.finish();
}

fn bench_order_crossover(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_crossover");
    let mut rng = RandomNumberGenerator::from_seed(2);

    for size in [120, 500, 1000].iter() {
        let (_, parent_a) = instance(*size, &mut rng);
        let (_, parent_b) = instance(*size, &mut rng);

        group.bench_with_input(BenchmarkId::new("ox", size), &(parent_a, parent_b), |b, (pa, pb)| {
            b.iter(|| order_crossover(black_box(pa), black_box(pb), &mut rng))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_first_fit, bench_order_crossover);
criterion_main!(benches);
