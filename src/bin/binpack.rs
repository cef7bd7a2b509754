use std::error::Error;
use std::io::{self, BufWriter, Read, Write};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use binpack_ga::case_injection::CaseInjectionStore;
use binpack_ga::evolution::options::{Adaptation, InitStrategy, NeighborStrategy};
use binpack_ga::evolution::{EvolutionLauncher, EvolutionOptions};
use binpack_ga::problem::parse_instances;

/// Packs every bin-packing instance read from stdin with a hybrid genetic
/// algorithm and prints one report per instance.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed each run with the best permutations of the previous runs
    #[arg(long)]
    case_injection: bool,

    /// How the initial population is built
    #[arg(long, value_enum, default_value_t = InitArg::SuccessiveMutation)]
    init: InitArg,

    /// Mutate instead of running local search each generation
    #[arg(long)]
    no_local_search: bool,

    /// Neighbor move used by local search
    #[arg(long, value_enum, default_value_t = NeighborArg::SwapRandom)]
    neighbor: NeighborArg,

    /// Whether local-search improvements are inherited
    #[arg(long, value_enum, default_value_t = AdaptationArg::Lamarckian)]
    adaptation: AdaptationArg,

    #[arg(long, default_value_t = 4)]
    threads: usize,

    #[arg(long, default_value_t = 100)]
    population: usize,

    #[arg(long, default_value_t = 0.1)]
    mutation_rate: f64,

    /// Generation cap
    #[arg(long, default_value_t = 1000)]
    generations: usize,

    /// Wall-clock budget per instance, in seconds
    #[arg(long)]
    time: Option<f64>,

    /// No generation cap and a 3 second budget per instance
    #[arg(long, conflicts_with_all = ["generations", "time"])]
    timed: bool,

    /// Iteration cap of each local search
    #[arg(long, default_value_t = 100)]
    search_iterations: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Print the bins of the best solution after each report
    #[arg(long)]
    print_solution: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum InitArg {
    SuccessiveMutation,
    HillClimb,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum NeighborArg {
    SwapRandom,
    ShuffleGroups,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AdaptationArg {
    Lamarckian,
    Baldwinian,
}

impl From<InitArg> for InitStrategy {
    fn from(value: InitArg) -> Self {
        match value {
            InitArg::SuccessiveMutation => InitStrategy::SuccessiveMutation,
            InitArg::HillClimb => InitStrategy::HillClimb,
        }
    }
}

impl From<NeighborArg> for NeighborStrategy {
    fn from(value: NeighborArg) -> Self {
        match value {
            NeighborArg::SwapRandom => NeighborStrategy::SwapRandom,
            NeighborArg::ShuffleGroups => NeighborStrategy::ShuffleGroups,
        }
    }
}

impl From<AdaptationArg> for Adaptation {
    fn from(value: AdaptationArg) -> Self {
        match value {
            AdaptationArg::Lamarckian => Adaptation::Lamarckian,
            AdaptationArg::Baldwinian => Adaptation::Baldwinian,
        }
    }
}

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

fn build_options(args: &Args) -> Result<EvolutionOptions, Box<dyn Error>> {
    let (max_generations, max_time) = if args.timed {
        (None, Some(Duration::from_secs(3)))
    } else {
        let max_time = match args.time {
            Some(seconds) => Some(Duration::try_from_secs_f64(seconds)?),
            None => None,
        };
        (Some(args.generations), max_time)
    };

    let mut builder = EvolutionOptions::builder()
        .use_case_injection(args.case_injection)
        .init_strategy(args.init.into())
        .use_local_search(!args.no_local_search)
        .neighbor(args.neighbor.into())
        .adaptation(args.adaptation.into())
        .num_threads(args.threads)
        .population_size(args.population)
        .mutation_rate(args.mutation_rate)
        .max_generations(max_generations)
        .max_time(max_time)
        .search_iterations(args.search_iterations);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    Ok(builder.build()?)
}

fn main() -> Result<(), Box<dyn Error>> {
    enable_tracing();

    let args = Args::parse();
    let launcher = EvolutionLauncher::new(build_options(&args)?)?;

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let problems = parse_instances(&input)?;
    info!(count = problems.len(), "read problem instances");

    let mut store = match (args.case_injection, problems.first()) {
        (true, Some(first)) => Some(CaseInjectionStore::temporary(first.len())?),
        _ => None,
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for (index, problem) in problems.iter().enumerate() {
        writeln!(out, "PROBLEM #{}:", index)?;
        let result = launcher.evolve(problem, store.as_mut(), &mut out)?;
        if args.print_solution {
            write!(out, "{}", result.best)?;
        }
        out.flush()?;
    }

    if let Some(store) = store {
        store.close()?;
    }
    Ok(())
}
