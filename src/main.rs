//! ACO-TSP Solver - Command Line Interface
//!
//! Runs the ant colony on a random instance and times it over a range of
//! iteration counts.

use clap::{Args, Parser, Subcommand};
use aco_tsp::benchmark::{
    compare_modes, format_speedup_table, read_report, speedup, BenchmarkConfig, TimingBenchmark,
};
use aco_tsp::colony::{run_colony, ColonyConfig, ExecutionMode};
use aco_tsp::instance::InstanceConfig;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "aco-tsp")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Parallel Ant Colony Optimization for the TSP")]
struct Cli {
    /// JSON file with colony parameters; command-line flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ColonyArgs {
    /// Number of cities
    #[arg(long, default_value = "25")]
    cities: usize,

    /// Seed for the distance matrix
    #[arg(long, default_value = "42")]
    instance_seed: u64,

    /// Number of ants
    #[arg(long)]
    ants: Option<usize>,

    /// Pheromone importance
    #[arg(long)]
    alpha: Option<f64>,

    /// Heuristic importance
    #[arg(long)]
    beta: Option<f64>,

    /// Evaporation rate in [0, 1]
    #[arg(long)]
    rho: Option<f64>,

    /// Master seed of the ant random streams
    #[arg(long)]
    seed: Option<u64>,

    /// Build tours on the calling thread instead of the rayon pool
    #[arg(long)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the colony once and report the final pheromone matrix
    Run {
        #[command(flatten)]
        colony: ColonyArgs,

        /// Number of iterations
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Write the final pheromone matrix as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the final pheromone matrix
        #[arg(short, long)]
        verbose: bool,
    },

    /// Time the colony over several iteration counts
    Benchmark {
        #[command(flatten)]
        colony: ColonyArgs,

        /// Iteration counts to time
        #[arg(long, value_delimiter = ',', default_value = "1000,5000,10000,50000,100000")]
        iterations: Vec<usize>,

        /// Timed runs per iteration count
        #[arg(short, long, default_value = "1")]
        repeats: usize,

        /// Duration report file
        #[arg(short, long, default_value = "execution_times.txt")]
        output: PathBuf,

        /// Also export the timings as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Compare parallel and sequential execution times
    Compare {
        #[command(flatten)]
        colony: ColonyArgs,

        /// Iteration counts to time
        #[arg(long, value_delimiter = ',', default_value = "1000,5000,10000")]
        iterations: Vec<usize>,

        /// Timed runs per iteration count
        #[arg(short, long, default_value = "1")]
        repeats: usize,

        /// Use an existing sequential duration report instead of timing
        #[arg(long, requires = "parallel_report")]
        sequential_report: Option<PathBuf>,

        /// Use an existing parallel duration report instead of timing
        #[arg(long, requires = "sequential_report")]
        parallel_report: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct RunOutput<'a> {
    num_cities: usize,
    instance_seed: u64,
    config: &'a ColonyConfig,
    seconds: f64,
    pheromone: Vec<Vec<f64>>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => match ColonyConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        },
        None => ColonyConfig::default(),
    };

    match cli.command {
        Commands::Run { colony, iterations, output, verbose } => {
            run_once(&base, &colony, iterations, output, verbose);
        }

        Commands::Benchmark { colony, iterations, repeats, output, csv } => {
            run_benchmark(&base, &colony, iterations, repeats, &output, csv);
        }

        Commands::Compare { colony, iterations, repeats, sequential_report, parallel_report } => {
            compare(&base, &colony, iterations, repeats, sequential_report, parallel_report);
        }
    }
}

fn colony_config(base: &ColonyConfig, args: &ColonyArgs) -> ColonyConfig {
    let mut config = base.clone();
    if let Some(ants) = args.ants {
        config.num_ants = ants;
    }
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    if let Some(beta) = args.beta {
        config.beta = beta;
    }
    if let Some(rho) = args.rho {
        config.rho = rho;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.sequential {
        config.mode = ExecutionMode::Sequential;
    }
    config
}

fn load_instance(args: &ColonyArgs) -> aco_tsp::ProblemInstance {
    let instance_config = InstanceConfig {
        num_cities: args.cities,
        seed: args.instance_seed,
    };

    match instance_config.build() {
        Ok((instance, _)) => instance,
        Err(e) => {
            eprintln!("Error creating instance: {}", e);
            std::process::exit(1);
        }
    }
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} iterations")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

fn run_once(
    base: &ColonyConfig,
    args: &ColonyArgs,
    iterations: Option<usize>,
    output: Option<PathBuf>,
    verbose: bool,
) {
    let mut config = colony_config(base, args);
    if let Some(n) = iterations {
        config.num_iterations = n;
    }

    let instance = load_instance(args);
    println!(
        "Running {} ants for {} iterations on {} cities ({} mode)...",
        config.num_ants, config.num_iterations, args.cities, config.mode
    );

    let bar = progress_bar(config.num_iterations);
    let start = Instant::now();

    let result = run_colony(&instance, instance.initial_pheromone(), &config, |p| {
        bar.set_position(p.iteration as u64);
    });
    bar.finish_and_clear();
    let elapsed = start.elapsed().as_secs_f64();

    let pheromone = match result {
        Ok(pheromone) => pheromone,
        Err(e) => {
            eprintln!("Colony run failed: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n========== Results ==========");
    println!("Iterations: {}", config.num_iterations);
    println!("Time: {:.6}s", elapsed);

    if verbose {
        println!("\nPheromone matrix:\n{}", pheromone);
    }

    if let Some(out_path) = output {
        let run = RunOutput {
            num_cities: args.cities,
            instance_seed: args.instance_seed,
            config: &config,
            seconds: elapsed,
            pheromone: pheromone.to_rows(),
        };
        let written = serde_json::to_string_pretty(&run)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&out_path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("\nPheromone matrix saved to {:?}", out_path),
            Err(e) => {
                eprintln!("Failed to write output: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run_benchmark(
    base: &ColonyConfig,
    args: &ColonyArgs,
    iterations: Vec<usize>,
    repeats: usize,
    output: &PathBuf,
    csv: Option<PathBuf>,
) {
    let config = colony_config(base, args);
    let instance = load_instance(args);

    let mut bench = TimingBenchmark::new(BenchmarkConfig {
        iteration_counts: iterations,
        repeats,
        mode: config.mode,
    });

    if let Err(e) = bench.run(&instance, &config) {
        eprintln!("Benchmark failed: {}", e);
        std::process::exit(1);
    }

    for line in bench.report_lines() {
        println!("{}", line);
    }

    if let Err(e) = bench.write_report(output) {
        eprintln!("Failed to write report: {}", e);
        std::process::exit(1);
    }
    println!("\nReport saved to {:?}", output);

    if let Some(csv_path) = csv {
        if let Err(e) = bench.export_csv(&csv_path) {
            eprintln!("Failed to export CSV: {}", e);
            std::process::exit(1);
        }
        println!("Timings exported to {:?}", csv_path);
    }
}

fn compare(
    base: &ColonyConfig,
    args: &ColonyArgs,
    iterations: Vec<usize>,
    repeats: usize,
    sequential_report: Option<PathBuf>,
    parallel_report: Option<PathBuf>,
) {
    let points = match (sequential_report, parallel_report) {
        (Some(seq_path), Some(par_path)) => {
            let timings = read_report(&seq_path).and_then(|seq| Ok((seq, read_report(&par_path)?)));
            match timings {
                Ok((seq, par)) => speedup(&seq, &par),
                Err(e) => {
                    eprintln!("Error reading reports: {}", e);
                    std::process::exit(1);
                }
            }
        }
        _ => {
            let config = colony_config(base, args);
            let instance = load_instance(args);
            let bench_config = BenchmarkConfig {
                iteration_counts: iterations,
                repeats,
                mode: ExecutionMode::Parallel,
            };

            match compare_modes(&instance, &config, &bench_config) {
                Ok(points) => points,
                Err(e) => {
                    eprintln!("Comparison failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    println!("{}", format_speedup_table(&points));
}
