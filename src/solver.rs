//! Solver orchestration.
//!
//! The entry point of the crate: validates input, builds the distance matrix,
//! constructs an initial tour and improves it under a wall-clock budget.
//! Every solve call owns its instance and solution exclusively; nothing is
//! shared or cached across calls.

use crate::heuristics::construction::{ConstructionHeuristic, NearestNeighborHeuristic};
use crate::heuristics::local_search::{LocalSearch, TwoOptSearch};
use crate::instance::{RouteInstance, Stop};
use crate::solution::Solution;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors a solve call can surface. All of them describe unusable input;
/// running out of time budget is normal termination, not an error.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("no deliveries provided: a route requires at least one delivery point")]
    NoDeliveries,
    #[error("non-finite coordinate on stop {index}")]
    NonFiniteCoordinate { index: usize },
    #[error("non-finite distance between stops {from} and {to}")]
    NonFiniteDistance { from: usize, to: usize },
}

pub type SolveResult = Result<Solution, SolveError>;

/// Wall-clock budget for a solve call, optionally cancellable from outside.
///
/// Local search polls this between scan passes; it is monotonic
/// (`Instant`-based) and cheap to check.
#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Deadline {
    /// A deadline expiring after the given budget
    pub fn new(budget: Duration) -> Self {
        Deadline {
            started: Instant::now(),
            budget: Some(budget),
            cancel: None,
        }
    }

    /// A deadline that never expires
    pub fn unbounded() -> Self {
        Deadline {
            started: Instant::now(),
            budget: None,
            cancel: None,
        }
    }

    /// Attach an external cancellation flag; setting it to true expires the
    /// deadline immediately, regardless of remaining budget
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// True once the budget is spent or cancellation was requested
    pub fn expired(&self) -> bool {
        if let Some(cancel) = &self.cancel {
            if cancel.load(Ordering::Relaxed) {
                return true;
            }
        }

        match self.budget {
            Some(budget) => self.started.elapsed() >= budget,
            None => false,
        }
    }

    /// Time elapsed since the deadline was created
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Solver configuration
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Wall-clock budget for local search; `None` runs to the local optimum
    pub time_limit: Option<Duration>,
    /// First-improvement 2-opt (true) or best-improvement (false)
    pub first_improvement: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            time_limit: Some(Duration::from_secs(30)),
            first_improvement: true,
        }
    }
}

/// Route solver: builds an instance, constructs a tour, improves it
pub struct RouteSolver {
    config: SolverConfig,
}

impl RouteSolver {
    pub fn new() -> Self {
        RouteSolver {
            config: SolverConfig::default(),
        }
    }

    pub fn with_config(config: SolverConfig) -> Self {
        RouteSolver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve a route over the given stops (index 0 = depot).
    ///
    /// Returns the best closed tour found within the configured budget, or a
    /// [`SolveError`] when the input admits no tour at all.
    pub fn solve(&self, stops: Vec<Stop>) -> SolveResult {
        let deadline = match self.config.time_limit {
            Some(budget) => Deadline::new(budget),
            None => Deadline::unbounded(),
        };
        self.solve_inner(stops, deadline)
    }

    /// Like [`solve`](Self::solve), but abortable through an external flag.
    ///
    /// When the flag flips to true mid-search, the best tour found so far is
    /// returned rather than nothing.
    pub fn solve_with_cancel(&self, stops: Vec<Stop>, cancel: Arc<AtomicBool>) -> SolveResult {
        let deadline = match self.config.time_limit {
            Some(budget) => Deadline::new(budget),
            None => Deadline::unbounded(),
        }
        .with_cancel(cancel);
        self.solve_inner(stops, deadline)
    }

    fn solve_inner(&self, stops: Vec<Stop>, deadline: Deadline) -> SolveResult {
        // A route needs the depot plus at least one delivery
        if stops.len() < 2 {
            return Err(SolveError::NoDeliveries);
        }

        let instance = RouteInstance::new(stops)?;
        debug!("distance matrix built for {} stops", instance.dimension);

        let construction = NearestNeighborHeuristic::new();
        let mut solution = construction.construct(&instance);
        debug!(
            "initial tour ({}) cost {:.3} km",
            construction.name(),
            solution.cost
        );

        let improver = if self.config.first_improvement {
            TwoOptSearch::new()
        } else {
            TwoOptSearch::best_improvement()
        };
        improver.improve(&instance, &mut solution, &deadline);

        solution.computation_time = deadline.elapsed().as_secs_f64();
        info!(
            "solved route over {} stops: {:.2} km in {:.3}s ({})",
            instance.dimension,
            solution.cost,
            solution.computation_time,
            improver.name()
        );

        Ok(solution)
    }
}

impl Default for RouteSolver {
    fn default() -> Self {
        Self::new()
    }
}
