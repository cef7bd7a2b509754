use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use super::options::EvolutionOptions;
use super::stats::{write_header, GenerationStats};
use crate::{
    case_injection::CaseInjectionStore,
    error::{GeneticError, Result},
    local_search::LocalSearch,
    packing::{unpack, Solution},
    parallel::ParallelExecutor,
    population::Population,
    problem::Problem,
    selection::TournamentSelection,
};

/// Why a run stopped.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The best solution uses the theoretical minimum number of bins.
    MinimumReached,
    /// The generation cap was hit.
    GenerationLimit,
    /// The wall-clock budget ran out.
    TimeLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::MinimumReached => "theoretical minimum reached",
            StopReason::GenerationLimit => "generation limit",
            StopReason::TimeLimit => "time limit",
        };
        f.write_str(text)
    }
}

/// The outcome of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionResult {
    /// The best solution of the final generation.
    pub best: Solution,
    /// The fitness of `best`.
    pub best_fitness: f64,
    pub theoretical_min_bins: usize,
    /// One record per generation, starting with the initialized population.
    pub generations: Vec<GenerationStats>,
    pub stop_reason: StopReason,
}

impl EvolutionResult {
    pub fn best_bins(&self) -> usize {
        self.best.num_bins()
    }
}

/// Drives the generational loop for one problem at a time.
#[derive(Debug, Clone)]
pub struct EvolutionLauncher {
    options: EvolutionOptions,
}

impl EvolutionLauncher {
    /// Creates a launcher after validating `options`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for any invalid tunable combination,
    /// see [`EvolutionOptions::validate`].
    pub fn new(options: EvolutionOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &EvolutionOptions {
        &self.options
    }

    /// Evolves a packing for `problem`, writing the report to `out`.
    ///
    /// The report starts with the theoretical minimum and a column header,
    /// followed by one record per generation. Generation 1 is the freshly
    /// initialized population. Before each further generation the run stops
    /// if the generation cap or the time budget is exceeded, or if the best
    /// solution already uses the theoretical minimum number of bins.
    ///
    /// With case injection enabled, `store` seeds the initial population and
    /// receives the best permutation when the run ends.
    ///
    /// # Errors
    ///
    /// - `Configuration` if case injection is enabled without a store, or the
    ///   store's permutation length differs from the problem size.
    /// - Any error from the population operators, the store or `out`.
    #[instrument(skip_all, fields(problem = %problem.name(), items = problem.len()))]
    pub fn evolve<W>(
        &self,
        problem: &Problem,
        mut store: Option<&mut CaseInjectionStore>,
        out: &mut W,
    ) -> Result<EvolutionResult>
    where
        W: Write + ?Sized,
    {
        let options = &self.options;
        if options.get_use_case_injection() {
            match store.as_deref() {
                None => {
                    return Err(GeneticError::Configuration(
                        "Case injection is enabled but no store was provided".to_string(),
                    ))
                }
                Some(store) if store.permutation_len() != problem.len() => {
                    return Err(GeneticError::Configuration(format!(
                        "Case injection store holds {} items, problem has {}",
                        store.permutation_len(),
                        problem.len()
                    )))
                }
                Some(_) => {}
            }
        }

        let start = Instant::now();
        let min_bins = problem.theoretical_min_bins();
        info!(min_bins, population = options.get_population_size(), "starting evolution");
        write_header(out, min_bins)?;

        let executor = ParallelExecutor::new(options.get_num_threads())?;
        let mut population = Population::new(
            problem,
            options.get_population_size(),
            options.get_adaptation(),
            executor,
            options.get_seed(),
        )?;

        let warm_start = match store.as_deref_mut() {
            Some(store) if options.get_use_case_injection() => {
                store.load(options.get_population_size())?
            }
            _ => Vec::new(),
        };

        let neighbor = options.get_neighbor();
        let search = LocalSearch::greedy(options.get_search_iterations())?;
        let selection = TournamentSelection::default();

        let mut searches = population.initialize(
            options.get_init_strategy(),
            &neighbor,
            warm_start,
            options.get_max_init_mutations(),
        )?;
        population.evaluate_all()?;

        let mut generation = 1;
        let mut generations = Vec::new();
        let (mut best_fitness, mut best) = record(&population, generation, start, searches, &mut generations, out)?;

        let stop_reason = loop {
            if let Some(reason) = self.stop_reason(generation + 1, start.elapsed(), best.num_bins(), min_bins) {
                break reason;
            }
            generation += 1;

            let winners = population.select(&selection)?;
            let next = population.reproduce(&winners)?;
            population.replace(next)?;

            if options.get_use_local_search() {
                population.evaluate_all()?;
                searches += population.local_search_all(&search, &neighbor)?;
            } else {
                population.mutate_all(options.get_mutation_rate())?;
            }
            population.evaluate_all()?;

            (best_fitness, best) = record(&population, generation, start, searches, &mut generations, out)?;
        };

        info!(
            generations = generation,
            best_bins = best.num_bins(),
            best_fitness,
            %stop_reason,
            "evolution finished"
        );

        if options.get_use_case_injection() {
            if let Some(store) = store.as_deref_mut() {
                store.append(&unpack(&best))?;
            }
        }

        Ok(EvolutionResult {
            best,
            best_fitness,
            theoretical_min_bins: min_bins,
            generations,
            stop_reason,
        })
    }

    fn stop_reason(
        &self,
        next_generation: usize,
        elapsed: Duration,
        best_bins: usize,
        min_bins: usize,
    ) -> Option<StopReason> {
        if best_bins <= min_bins {
            return Some(StopReason::MinimumReached);
        }
        if let Some(max) = self.options.get_max_generations() {
            if next_generation > max {
                return Some(StopReason::GenerationLimit);
            }
        }
        if let Some(max) = self.options.get_max_time() {
            if elapsed > max {
                return Some(StopReason::TimeLimit);
            }
        }
        None
    }
}

/// Appends and prints the statistics of the current generation and returns
/// its best fitness and solution.
fn record<W>(
    population: &Population<'_>,
    generation: usize,
    start: Instant,
    searches: usize,
    generations: &mut Vec<GenerationStats>,
    out: &mut W,
) -> Result<(f64, Solution)>
where
    W: Write + ?Sized,
{
    let (best_fitness, best) = population.best()?;
    let stats = GenerationStats {
        generation,
        elapsed: start.elapsed(),
        best_bins: best.num_bins(),
        best_fitness,
        average_fitness: population.average_fitness()?,
        searches,
    };
    debug!(
        generation,
        best_bins = stats.best_bins,
        best_fitness,
        average_fitness = stats.average_fitness,
        searches,
        "generation complete"
    );
    writeln!(out, "{}", stats)?;
    generations.push(stats);
    Ok((best_fitness, best))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::options::{Adaptation, NeighborStrategy};

    fn problem() -> Problem {
        Problem::new(
            20.0,
            vec![10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 7.0, 13.0, 11.0, 9.0],
        )
        .unwrap()
    }

    fn launcher(builder: crate::evolution::options::EvolutionOptionsBuilder) -> EvolutionLauncher {
        EvolutionLauncher::new(builder.build().unwrap()).unwrap()
    }

    #[test]
    fn test_optimal_start_stops_after_first_generation() {
        let problem = Problem::new(10.0, vec![5.0; 4]).unwrap();
        let launcher = launcher(EvolutionOptions::builder().population_size(10).seed(1));
        let mut out = Vec::new();
        let result = launcher.evolve(&problem, None, &mut out).unwrap();

        assert_eq!(result.generations.len(), 1);
        assert_eq!(result.best_bins(), 2);
        assert_eq!(result.best_fitness, 1.0);
        assert_eq!(result.stop_reason, StopReason::MinimumReached);

        let report = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "theoretical minimum bins: 2");
        assert!(lines[2].starts_with("1\t"));
    }

    #[test]
    fn test_generation_limit_bounds_records() {
        // Weights that cannot fill bins exactly never reach the minimum.
        let problem = Problem::new(10.0, vec![6.0; 5]).unwrap();
        let launcher = launcher(
            EvolutionOptions::builder()
                .population_size(8)
                .num_threads(2)
                .max_generations(Some(4))
                .use_local_search(false)
                .seed(5),
        );
        let result = launcher.evolve(&problem, None, &mut std::io::sink()).unwrap();
        assert_eq!(result.generations.len(), 4);
        assert_eq!(result.stop_reason, StopReason::GenerationLimit);
        let indices: Vec<usize> = result.generations.iter().map(|g| g.generation).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_time_limit() {
        let problem = Problem::new(10.0, vec![6.0; 5]).unwrap();
        let launcher = launcher(
            EvolutionOptions::builder()
                .population_size(4)
                .max_generations(None)
                .max_time(Some(Duration::from_millis(20)))
                .seed(2),
        );
        let result = launcher.evolve(&problem, None, &mut std::io::sink()).unwrap();
        assert_eq!(result.stop_reason, StopReason::TimeLimit);
        assert!(result.generations.len() >= 1);
    }

    #[test]
    fn test_best_fitness_never_decreases() {
        let problem = problem();
        for adaptation in [Adaptation::Lamarckian, Adaptation::Baldwinian] {
            let launcher = launcher(
                EvolutionOptions::builder()
                    .population_size(20)
                    .num_threads(3)
                    .max_generations(Some(15))
                    .search_iterations(10)
                    .adaptation(adaptation)
                    .seed(8),
            );
            let result = launcher.evolve(&problem, None, &mut std::io::sink()).unwrap();
            for pair in result.generations.windows(2) {
                assert!(pair[1].best_fitness >= pair[0].best_fitness - 1e-12);
                assert!(pair[1].searches >= pair[0].searches);
            }
            assert_eq!(result.best.num_items(), problem.len());
        }
    }

    #[test]
    fn test_case_injection_without_store_is_rejected() {
        let launcher = launcher(EvolutionOptions::builder().use_case_injection(true));
        let result = launcher.evolve(&problem(), None, &mut std::io::sink());
        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }

    #[test]
    fn test_dominance_fails_the_run() {
        let launcher = launcher(
            EvolutionOptions::builder()
                .population_size(4)
                .neighbor(NeighborStrategy::Dominance)
                .seed(3),
        );
        // Five items of 6 in bins of 10 need five bins against a minimum of three,
        // so the run always reaches local search.
        let unreachable = Problem::new(10.0, vec![6.0; 5]).unwrap();
        let result = launcher.evolve(&unreachable, None, &mut std::io::sink());
        assert!(matches!(result, Err(GeneticError::Unsupported(_))));
    }
}
