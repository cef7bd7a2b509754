use std::time::Duration;

use binpack_ga::{
    error::GeneticError,
    evolution::{
        options::{Adaptation, InitStrategy, NeighborStrategy},
        EvolutionLauncher, EvolutionOptions, StopReason,
    },
    packing::{evaluate, pack, unpack},
    problem::{parse_instances, Problem},
};

const INSTANCES: &str = "\
2
t_small 100 12 4
 42 38 27 61 19 55 33 46 24 71 29 30
t_tight 50 8 4
 25 25 20 30 10 40 35 15
";

fn options() -> binpack_ga::evolution::EvolutionOptionsBuilder {
    EvolutionOptions::builder()
        .population_size(24)
        .num_threads(3)
        .max_generations(Some(30))
        .search_iterations(20)
        .seed(2024)
}

#[test]
fn test_stops_at_generation_one_when_optimal() {
    let problem = Problem::new(10.0, vec![5.0, 5.0, 5.0, 5.0]).unwrap();
    let launcher = EvolutionLauncher::new(options().build().unwrap()).unwrap();

    let mut out = Vec::new();
    let result = launcher.evolve(&problem, None, &mut out).unwrap();

    assert_eq!(result.theoretical_min_bins, 2);
    assert_eq!(result.generations.len(), 1);
    assert_eq!(result.generations[0].generation, 1);
    assert_eq!(result.generations[0].best_bins, 2);
    assert_eq!(result.stop_reason, StopReason::MinimumReached);

    let report = String::from_utf8(out).unwrap();
    let mut lines = report.lines();
    assert_eq!(lines.next(), Some("theoretical minimum bins: 2"));
    assert_eq!(
        lines.next(),
        Some("gen\tcum time\tbest bins\tbest fit\tavrg fit\tsearches")
    );
    let record: Vec<&str> = lines.next().unwrap().split('\t').collect();
    assert_eq!(record.len(), 6);
    assert_eq!(record[0], "1");
    assert_eq!(record[2], "2");
    assert_eq!(record[3], "1.000000");
    assert!(lines.next().is_none());
}

#[test]
fn test_every_configuration_produces_valid_packings() {
    let problems = parse_instances(INSTANCES).unwrap();
    let configurations = [
        (InitStrategy::SuccessiveMutation, true, NeighborStrategy::SwapRandom, Adaptation::Lamarckian),
        (InitStrategy::SuccessiveMutation, false, NeighborStrategy::SwapRandom, Adaptation::Lamarckian),
        (InitStrategy::HillClimb, true, NeighborStrategy::ShuffleGroups, Adaptation::Lamarckian),
        (InitStrategy::HillClimb, true, NeighborStrategy::SwapRandom, Adaptation::Baldwinian),
        (InitStrategy::SuccessiveMutation, true, NeighborStrategy::ShuffleGroups, Adaptation::Baldwinian),
    ];

    for problem in &problems {
        for (init, local_search, neighbor, adaptation) in configurations {
            let launcher = EvolutionLauncher::new(
                options()
                    .init_strategy(init)
                    .use_local_search(local_search)
                    .neighbor(neighbor)
                    .adaptation(adaptation)
                    .build()
                    .unwrap(),
            )
            .unwrap();
            let result = launcher.evolve(problem, None, &mut std::io::sink()).unwrap();

            assert!(result.best_bins() >= result.theoretical_min_bins);
            assert_eq!(result.best.num_items(), problem.len());
            for bin in result.best.bins() {
                assert!(bin.sum() <= problem.capacity());
            }
            let rescored = evaluate(&result.best, problem.capacity());
            assert!((rescored - result.best_fitness).abs() < 1e-12);
            // The reported best is reproducible from its own unpacked order.
            assert_eq!(
                pack(problem.weights(), &unpack(&result.best), problem.capacity()),
                result.best
            );

            for pair in result.generations.windows(2) {
                assert!(pair[1].best_fitness >= pair[0].best_fitness - 1e-12);
            }
            if !local_search && init == InitStrategy::SuccessiveMutation {
                assert!(result.generations.iter().all(|g| g.searches == 0));
            }
        }
    }
}

#[test]
fn test_baldwinian_without_local_search_is_rejected() {
    let result = options()
        .adaptation(Adaptation::Baldwinian)
        .use_local_search(false)
        .build();
    assert!(matches!(result, Err(GeneticError::Configuration(_))));
}

#[test]
fn test_dominance_neighbor_fails_loudly() {
    // Five items that each need their own bin never reach the minimum of 3,
    // so the run always reaches its first local search.
    let problem = Problem::new(10.0, vec![6.0; 5]).unwrap();
    let launcher = EvolutionLauncher::new(
        options()
            .neighbor(NeighborStrategy::Dominance)
            .build()
            .unwrap(),
    )
    .unwrap();
    let result = launcher.evolve(&problem, None, &mut std::io::sink());
    assert!(matches!(result, Err(GeneticError::Unsupported(_))));
}

#[test]
fn test_hill_climb_init_counts_initial_searches() {
    let problems = parse_instances(INSTANCES).unwrap();
    let launcher = EvolutionLauncher::new(
        options()
            .init_strategy(InitStrategy::HillClimb)
            .use_local_search(false)
            .max_generations(Some(3))
            .build()
            .unwrap(),
    )
    .unwrap();
    let result = launcher.evolve(&problems[0], None, &mut std::io::sink()).unwrap();
    let first = result.generations[0].searches;
    assert!(first >= 23);
    assert!(result.generations.iter().all(|g| g.searches == first));
}

#[test]
fn test_time_budget_with_unbounded_generations() {
    let problem = Problem::new(10.0, vec![6.0; 7]).unwrap();
    let launcher = EvolutionLauncher::new(
        options()
            .max_generations(None)
            .max_time(Some(Duration::from_millis(50)))
            .build()
            .unwrap(),
    )
    .unwrap();
    let result = launcher.evolve(&problem, None, &mut std::io::sink()).unwrap();
    assert_eq!(result.stop_reason, StopReason::TimeLimit);
    assert_eq!(result.best_bins(), 7);
}
