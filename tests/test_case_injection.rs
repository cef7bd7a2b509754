use std::env;
use std::fs;

use binpack_ga::{
    case_injection::CaseInjectionStore,
    error::GeneticError,
    evolution::{EvolutionLauncher, EvolutionOptions},
    packing::unpack,
    problem::Problem,
};

fn problem() -> Problem {
    Problem::new(
        100.0,
        vec![42.0, 38.0, 27.0, 61.0, 19.0, 55.0, 33.0, 46.0, 24.0, 71.0, 29.0, 30.0],
    )
    .unwrap()
}

fn launcher() -> EvolutionLauncher {
    let options = EvolutionOptions::builder()
        .population_size(12)
        .num_threads(2)
        .max_generations(Some(5))
        .search_iterations(10)
        .use_case_injection(true)
        .seed(77)
        .build()
        .unwrap();
    EvolutionLauncher::new(options).unwrap()
}

#[test]
fn test_store_persists_across_handles() {
    let path = env::temp_dir().join(format!("binpack-ga-persist-{}.cases", std::process::id()));

    let mut store = CaseInjectionStore::create(&path, 3).unwrap();
    store.append(&[2, 0, 1]).unwrap();
    store.close().unwrap();

    let mut reopened = CaseInjectionStore::open(&path, 3).unwrap();
    assert_eq!(reopened.load(5).unwrap(), vec![vec![2, 0, 1]]);
    reopened.append(&[0, 1, 2]).unwrap();
    assert_eq!(reopened.load(5).unwrap(), vec![vec![2, 0, 1], vec![0, 1, 2]]);
    reopened.close().unwrap();

    // Raw format: three little-endian u64 per record.
    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 2 * 3 * 8);
    assert_eq!(&bytes[0..8], &2u64.to_le_bytes());

    let truncated = CaseInjectionStore::create(&path, 3).unwrap();
    drop(truncated);
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_runs_append_their_best_permutation() {
    let problem = problem();
    let launcher = launcher();
    let mut store = CaseInjectionStore::temporary(problem.len()).unwrap();

    let first = launcher
        .evolve(&problem, Some(&mut store), &mut std::io::sink())
        .unwrap();
    assert_eq!(store.load(10).unwrap(), vec![unpack(&first.best)]);

    let second = launcher
        .evolve(&problem, Some(&mut store), &mut std::io::sink())
        .unwrap();
    let stored = store.load(10).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1], unpack(&second.best));

    // The second run was seeded with the first run's best, which elitism keeps.
    assert!(second.generations[0].best_fitness >= first.best_fitness - 1e-12);
    store.close().unwrap();
}

#[test]
fn test_store_length_must_match_problem() {
    let problem = problem();
    let mut store = CaseInjectionStore::temporary(problem.len() + 1).unwrap();
    let result = launcher().evolve(&problem, Some(&mut store), &mut std::io::sink());
    assert!(matches!(result, Err(GeneticError::Configuration(_))));
}

#[test]
fn test_disabled_case_injection_leaves_store_untouched() {
    let problem = problem();
    let options = EvolutionOptions::builder()
        .population_size(8)
        .max_generations(Some(2))
        .seed(1)
        .build()
        .unwrap();
    let launcher = EvolutionLauncher::new(options).unwrap();
    let mut store = CaseInjectionStore::temporary(problem.len()).unwrap();
    launcher
        .evolve(&problem, Some(&mut store), &mut std::io::sink())
        .unwrap();
    assert!(store.load(10).unwrap().is_empty());
}
