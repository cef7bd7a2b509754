use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use binpack_ga::{
    evolution::{options::Adaptation, EvolutionLauncher, EvolutionOptions},
    local_search::{LocalSearch, NeighborStrategy},
    parallel::ParallelExecutor,
    population::{InitStrategy, Population},
    problem::Problem,
    rng::RandomNumberGenerator,
};

fn problem(size: usize) -> Problem {
    let mut rng = RandomNumberGenerator::from_seed(11);
    let weights: Vec<f64> = (0..size).map(|_| 20.0 + rng.index(81) as f64).collect();
    Problem::new(150.0, weights).unwrap()
}

fn bench_population_phases(c: &mut Criterion) {
    let mut group = c.benchmark_group("population_phases");
    let problem = problem(250);
    let search = LocalSearch::greedy(100).unwrap();

    for threads in [1, 2, 4, 8].iter() {
        let executor = ParallelExecutor::new(*threads).unwrap();

        group.bench_with_input(BenchmarkId::new("evaluate_all", threads), &executor, |b, executor| {
            b.iter(|| {
                let mut population =
                    Population::new(&problem, 100, Adaptation::Lamarckian, *executor, Some(3)).unwrap();
                population
                    .initialize(InitStrategy::SuccessiveMutation, &NeighborStrategy::SwapRandom, Vec::new(), 20)
                    .unwrap();
                population.evaluate_all().unwrap();
                black_box(population.average_fitness().unwrap())
            })
        });

        group.bench_with_input(BenchmarkId::new("local_search_all", threads), &executor, |b, executor| {
            b.iter(|| {
                let mut population =
                    Population::new(&problem, 100, Adaptation::Baldwinian, *executor, Some(3)).unwrap();
                population
                    .initialize(InitStrategy::SuccessiveMutation, &NeighborStrategy::SwapRandom, Vec::new(), 20)
                    .unwrap();
                population.evaluate_all().unwrap();
                black_box(population.local_search_all(&search, &NeighborStrategy::SwapRandom).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_evolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolution");
    group.sample_size(10);
    let problem = problem(120);

    for (name, use_local_search) in [("mutation", false), ("local_search", true)] {
        let options = EvolutionOptions::builder()
            .max_generations(Some(20))
            .use_local_search(use_local_search)
            .seed(5)
            .build()
            .unwrap();
        let launcher = EvolutionLauncher::new(options).unwrap();

        group.bench_function(name, |b| {
            b.iter(|| {
                let result = launcher
                    .evolve(black_box(&problem), None, &mut std::io::sink())
                    .unwrap();
                black_box(result.best_fitness)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_population_phases, bench_evolution);
criterion_main!(benches);
