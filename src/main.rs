//! Delivery Route Solver - Command Line Interface
//!
//! Solves single-vehicle delivery routes from JSON request files.

use clap::{Parser, Subcommand, ValueEnum};
use delivery_route_solver::benchmark::{Benchmark, BenchmarkConfig};
use delivery_route_solver::instance::RouteInstance;
use delivery_route_solver::request::{RouteRequest, RouteResponse};
use delivery_route_solver::solver::{RouteSolver, SolverConfig};
use delivery_route_solver::visualization::Visualizer;

use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "delivery-route-solver")]
#[command(version = "1.0")]
#[command(about = "A single-vehicle delivery route optimizer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a route request
    Solve {
        /// Path to the JSON request file (source_point + deliveries)
        #[arg(short, long)]
        request: PathBuf,

        /// Time limit in seconds (0 runs to the local optimum)
        #[arg(short, long, default_value = "30")]
        time_limit: f64,

        /// 2-opt pivoting strategy
        #[arg(long, value_enum, default_value = "first")]
        strategy: Strategy,

        /// Write the JSON response to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a GeoJSON FeatureCollection of the route
        #[arg(long)]
        geojson: Option<PathBuf>,

        /// Write an SVG plot of the route
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Write an HTML report of the route
        #[arg(long)]
        html: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print statistics about a request without solving it
    Analyze {
        /// Path to the JSON request file
        #[arg(short, long)]
        request: PathBuf,
    },

    /// Benchmark the solver on generated instances
    Benchmark {
        /// Delivery counts to generate
        #[arg(short, long, num_args = 1.., default_values = ["10", "25", "50", "100"])]
        sizes: Vec<usize>,

        /// Number of runs per size
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Time limit per local search run
        #[arg(short, long, default_value = "30")]
        time_limit: f64,

        /// Output directory for CSV results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Base seed for instance generation
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Strategy {
    /// Apply the first improving move found, then rescan
    First,
    /// Scan all moves, apply the best one per pass
    Best,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            request,
            time_limit,
            strategy,
            output,
            geojson,
            svg,
            html,
            verbose,
        } => {
            solve_request(&request, time_limit, strategy, output, geojson, svg, html, verbose);
        }

        Commands::Analyze { request } => {
            analyze_request(&request);
        }

        Commands::Benchmark {
            sizes,
            runs,
            time_limit,
            output,
            seed,
        } => {
            run_benchmark(sizes, runs, time_limit, &output, seed);
        }
    }
}

fn load_request(path: &Path) -> RouteRequest {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading request file {:?}: {}", path, e);
            std::process::exit(1);
        }
    };

    match serde_json::from_str(&text) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("Error parsing request file {:?}: {}", path, e);
            std::process::exit(1);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn solve_request(
    path: &Path,
    time_limit: f64,
    strategy: Strategy,
    output: Option<PathBuf>,
    geojson: Option<PathBuf>,
    svg: Option<PathBuf>,
    html: Option<PathBuf>,
    verbose: bool,
) {
    let request = load_request(path);
    let stops = request.to_stops();

    let config = SolverConfig {
        time_limit: if time_limit > 0.0 {
            Some(Duration::from_secs_f64(time_limit))
        } else {
            None
        },
        first_improvement: strategy == Strategy::First,
    };

    println!("Solving route over {} deliveries...", stops.len().saturating_sub(1));

    let solver = RouteSolver::with_config(config);
    let solution = match solver.solve(stops.clone()) {
        Ok(solution) => solution,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let response = RouteResponse::from_solution(&stops, &solution);

    println!("Total distance: {:.2} km", response.total_distance);
    println!("Points on route: {}", response.total_points);
    if verbose {
        println!("{}", solution);
    }

    match output {
        Some(path) => {
            if let Err(e) = write_json(&response, &path) {
                eprintln!("Error writing response to {:?}: {}", path, e);
                std::process::exit(1);
            }
            println!("Response written to {:?}", path);
        }
        None => match serde_json::to_string_pretty(&response) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing response: {}", e);
                std::process::exit(1);
            }
        },
    }

    if geojson.is_none() && svg.is_none() && html.is_none() {
        return;
    }

    // Artifacts need the instance again for coordinates and bounds
    let instance = match RouteInstance::new(stops) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error rebuilding instance for artifacts: {}", e);
            std::process::exit(1);
        }
    };
    let visualizer = Visualizer::new();

    if let Some(path) = geojson {
        let feature_collection = visualizer.generate_geojson(&instance, &solution);
        if let Err(e) = visualizer.save_geojson(&feature_collection, &path) {
            eprintln!("Error writing GeoJSON to {:?}: {}", path, e);
            std::process::exit(1);
        }
        println!("GeoJSON written to {:?}", path);
    }

    if let Some(path) = svg {
        let plot = visualizer.generate_svg(&instance, &solution);
        if let Err(e) = visualizer.save_text(&plot, &path) {
            eprintln!("Error writing SVG to {:?}: {}", path, e);
            std::process::exit(1);
        }
        println!("SVG written to {:?}", path);
    }

    if let Some(path) = html {
        let report = visualizer.generate_html(&instance, &solution);
        if let Err(e) = visualizer.save_text(&report, &path) {
            eprintln!("Error writing HTML to {:?}: {}", path, e);
            std::process::exit(1);
        }
        println!("HTML report written to {:?}", path);
    }
}

fn analyze_request(path: &Path) {
    let request = load_request(path);
    let stops = request.to_stops();

    let instance = match RouteInstance::new(stops) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", instance.statistics());
}

fn run_benchmark(sizes: Vec<usize>, runs: usize, time_limit: f64, output: &Path, seed: u64) {
    if let Err(e) = std::fs::create_dir_all(output) {
        eprintln!("Error creating output directory {:?}: {}", output, e);
        std::process::exit(1);
    }

    let mut benchmark = Benchmark::new(BenchmarkConfig {
        num_runs: runs,
        time_limit,
        sizes,
        seed,
    });

    benchmark.run();

    print!("{}", benchmark.generate_report());

    let results_path = output.join("results.csv");
    let stats_path = output.join("statistics.csv");

    if let Err(e) = benchmark.export_to_csv(&results_path) {
        eprintln!("Error writing {:?}: {}", results_path, e);
        std::process::exit(1);
    }
    if let Err(e) = benchmark.export_statistics_csv(&stats_path) {
        eprintln!("Error writing {:?}: {}", stats_path, e);
        std::process::exit(1);
    }

    println!("Results written to {:?} and {:?}", results_path, stats_path);
}

fn write_json(response: &RouteResponse, path: &Path) -> std::io::Result<()> {
    let text = serde_json::to_string_pretty(response)?;
    std::fs::write(path, text)
}
