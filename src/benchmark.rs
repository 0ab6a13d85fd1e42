//! Benchmarking and experimentation module.
//!
//! Provides tools for running the solver on generated instances, collecting
//! statistics and comparing construction against the 2-opt variants.

use crate::heuristics::construction::{ConstructionHeuristic, NearestNeighborHeuristic};
use crate::heuristics::local_search::{LocalSearch, TwoOptSearch};
use crate::instance::{RouteInstance, Stop};
use crate::solver::Deadline;
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Number of stops (including depot)
    pub dimension: usize,
    /// Tour cost in kilometers
    pub cost: f64,
    /// Computation time in seconds
    pub time: f64,
    /// Number of improving moves (if applicable)
    pub iterations: Option<usize>,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    /// Algorithm name
    pub algorithm: String,
    /// Number of runs
    pub num_runs: usize,
    /// Average cost
    pub avg_cost: f64,
    /// Best cost
    pub best_cost: f64,
    /// Worst cost
    pub worst_cost: f64,
    /// Standard deviation of cost
    pub std_cost: f64,
    /// Average time
    pub avg_time: f64,
    /// Total time
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs per instance size
    pub num_runs: usize,
    /// Time limit per local search run in seconds
    pub time_limit: f64,
    /// Instance sizes (delivery counts) to generate
    pub sizes: Vec<usize>,
    /// Base seed for instance generation
    pub seed: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            time_limit: 30.0,
            sizes: vec![10, 25, 50, 100],
            seed: 42,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Generate a random instance: depot plus uniformly placed deliveries
    /// in a box around it. Deterministic for a given size and seed.
    pub fn generate_instance(num_deliveries: usize, seed: u64) -> RouteInstance {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut stops = Vec::with_capacity(num_deliveries + 1);
        stops.push(Stop::new(0, 22.5, 88.4));

        for i in 0..num_deliveries {
            let lat = 22.5 + rng.gen_range(-0.25..0.25);
            let lon = 88.4 + rng.gen_range(-0.25..0.25);
            stops.push(Stop::new(i + 1, lat, lon));
        }

        RouteInstance::new(stops).expect("generated coordinates are finite")
    }

    /// Run construction and both 2-opt variants on one instance
    pub fn run_algorithms(&mut self, instance: &RouteInstance, instance_name: &str) {
        let initial = NearestNeighborHeuristic::new().construct(instance);
        self.results.push(AlgorithmResult {
            algorithm: "NearestNeighbor".to_string(),
            instance: instance_name.to_string(),
            dimension: instance.dimension,
            cost: initial.cost,
            time: initial.computation_time,
            iterations: None,
        });

        let improvers = [TwoOptSearch::new(), TwoOptSearch::best_improvement()];
        for improver in improvers {
            let mut solution = initial.clone();
            let deadline = Deadline::new(Duration::from_secs_f64(self.config.time_limit));
            let start = Instant::now();
            improver.improve(instance, &mut solution, &deadline);

            self.results.push(AlgorithmResult {
                algorithm: format!("NN+{}", improver.name()),
                instance: instance_name.to_string(),
                dimension: instance.dimension,
                cost: solution.cost,
                time: start.elapsed().as_secs_f64(),
                iterations: solution.iterations,
            });
        }
    }

    /// Run the configured sweep: every size, `num_runs` seeds each
    pub fn run(&mut self) {
        let sizes = self.config.sizes.clone();
        let total = (sizes.len() * self.config.num_runs) as u64;

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for size in sizes {
            for run in 0..self.config.num_runs {
                pb.set_message(format!("size {} run {}", size, run + 1));
                let instance = Self::generate_instance(size, self.config.seed + run as u64);
                self.run_algorithms(&instance, &format!("random-{}-{}", size, run));
                pb.inc(1);
            }
        }

        pb.finish_with_message("done");
    }

    /// Compute statistics for each algorithm
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut by_algorithm: HashMap<String, Vec<&AlgorithmResult>> = HashMap::new();
        for result in &self.results {
            by_algorithm
                .entry(result.algorithm.clone())
                .or_default()
                .push(result);
        }

        let mut statistics = Vec::new();

        for (algorithm, results) in by_algorithm {
            let costs: Vec<f64> = results.iter().map(|r| r.cost).collect();
            let times: Vec<f64> = results.iter().map(|r| r.time).collect();

            let std_cost = if costs.len() > 1 {
                Statistics::std_dev(&costs)
            } else {
                0.0
            };

            statistics.push(AlgorithmStatistics {
                algorithm,
                num_runs: results.len(),
                avg_cost: Statistics::mean(&costs),
                best_cost: Statistics::min(&costs),
                worst_cost: Statistics::max(&costs),
                std_cost,
                avg_time: Statistics::mean(&times),
                total_time: times.iter().sum(),
            });
        }

        statistics.sort_by(|a, b| a.avg_cost.partial_cmp(&b.avg_cost).unwrap());

        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("     Route Solver Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!("Generated: {}\n\n", Local::now().format("%Y-%m-%d %H:%M:%S")));

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str("-".repeat(80).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<20} {:>8} {:>12} {:>12} {:>12} {:>10}\n",
            "Algorithm", "Runs", "Avg Cost", "Best Cost", "Std Cost", "Avg Time"
        ));
        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:<20} {:>8} {:>12.2} {:>12.2} {:>12.2} {:>10.4}\n",
                stat.algorithm, stat.num_runs, stat.avg_cost, stat.best_cost, stat.std_cost, stat.avg_time
            ));
        }

        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_instance_is_reproducible() {
        let a = Benchmark::generate_instance(8, 7);
        let b = Benchmark::generate_instance(8, 7);

        assert_eq!(a.dimension, 9);
        for i in 0..a.dimension {
            assert_eq!(a.stops[i].lat, b.stops[i].lat);
            assert_eq!(a.stops[i].lon, b.stops[i].lon);
        }
    }

    #[test]
    fn test_run_collects_results_for_each_algorithm() {
        let mut benchmark = Benchmark::new(BenchmarkConfig {
            num_runs: 2,
            time_limit: 1.0,
            sizes: vec![6],
            seed: 1,
        });

        benchmark.run();

        // 3 algorithms per run
        assert_eq!(benchmark.results().len(), 6);

        let stats = benchmark.compute_statistics();
        assert_eq!(stats.len(), 3);
        for stat in &stats {
            assert_eq!(stat.num_runs, 2);
            assert!(stat.best_cost <= stat.worst_cost);
        }
    }

    #[test]
    fn test_improvement_never_worse_than_construction() {
        let mut benchmark = Benchmark::new(BenchmarkConfig {
            num_runs: 1,
            time_limit: 1.0,
            sizes: vec![12],
            seed: 3,
        });
        benchmark.run();

        let nn = benchmark
            .results()
            .iter()
            .find(|r| r.algorithm == "NearestNeighbor")
            .unwrap();
        for improved in benchmark
            .results()
            .iter()
            .filter(|r| r.algorithm.starts_with("NN+"))
        {
            assert!(improved.cost <= nn.cost + 1e-9);
        }
    }
}
