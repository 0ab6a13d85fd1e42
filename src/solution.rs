//! Solution representation and manipulation.
//!
//! This module provides the data structure for a solved route: a closed tour
//! over stop indices together with its cost, plus the 2-opt move primitives
//! used by local search.

use crate::instance::RouteInstance;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Represents a solved (or in-progress) route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a closed sequence of stop indices: starts and ends at the
    /// depot (index 0), visits every other stop exactly once
    pub tour: Vec<usize>,
    /// Total tour length in kilometers
    pub cost: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of improving moves applied (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            cost: f64::INFINITY,
            algorithm: String::new(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Create a solution from a closed tour
    pub fn from_tour(instance: &RouteInstance, tour: Vec<usize>, algorithm: &str) -> Self {
        let cost = instance.tour_length(&tour);

        Solution {
            tour,
            cost,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Recompute the cost from the tour
    pub fn validate(&mut self, instance: &RouteInstance) {
        self.cost = instance.tour_length(&self.tour);
    }

    /// Check that the tour is a Hamiltonian cycle rooted at the depot:
    /// length N+1, first and last entries 0, every stop visited exactly once
    pub fn is_complete(&self, instance: &RouteInstance) -> bool {
        if self.tour.len() != instance.dimension + 1 {
            return false;
        }
        if self.tour[0] != 0 || *self.tour.last().unwrap() != 0 {
            return false;
        }

        let unique: HashSet<usize> = self.tour[..self.tour.len() - 1].iter().cloned().collect();
        unique.len() == instance.dimension && unique.iter().all(|&n| n < instance.dimension)
    }

    /// Calculate the cost delta of reversing the segment between positions
    /// i+1 and j, i.e. exchanging edges (i, i+1) and (j, j+1).
    ///
    /// Constant time: only the four boundary edges change.
    pub fn two_opt_delta(&self, instance: &RouteInstance, i: usize, j: usize) -> f64 {
        let n = self.tour.len();
        if i >= j || j + 1 >= n {
            return 0.0;
        }

        let removed = instance.distance(self.tour[i], self.tour[i + 1])
            + instance.distance(self.tour[j], self.tour[j + 1]);
        let added = instance.distance(self.tour[i], self.tour[j])
            + instance.distance(self.tour[i + 1], self.tour[j + 1]);

        added - removed
    }

    /// Apply a 2-opt move (reverse segment between i+1 and j)
    pub fn apply_two_opt(&mut self, i: usize, j: usize) {
        self.tour[i + 1..=j].reverse();
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.2} km", self.cost)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Improving moves: {}", iter)?;
        }
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Stop;

    fn square_instance() -> RouteInstance {
        RouteInstance::new(vec![
            Stop::new(0, 0.0, 0.0),
            Stop::new(1, 0.0, 0.001),
            Stop::new(2, 0.001, 0.001),
            Stop::new(3, 0.001, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_solution_creation() {
        let sol = Solution::new();
        assert!(sol.tour.is_empty());
        assert_eq!(sol.cost, f64::INFINITY);
    }

    #[test]
    fn test_is_complete() {
        let instance = square_instance();

        let good = Solution::from_tour(&instance, vec![0, 1, 2, 3, 0], "test");
        assert!(good.is_complete(&instance));

        let open = Solution::from_tour(&instance, vec![0, 1, 2, 3], "test");
        assert!(!open.is_complete(&instance));

        let repeated = Solution::from_tour(&instance, vec![0, 1, 1, 3, 0], "test");
        assert!(!repeated.is_complete(&instance));

        let wrong_root = Solution::from_tour(&instance, vec![1, 0, 2, 3, 1], "test");
        assert!(!wrong_root.is_complete(&instance));
    }

    #[test]
    fn test_two_opt_delta_matches_recomputation() {
        let instance = square_instance();
        // Crossing tour over the square
        let mut sol = Solution::from_tour(&instance, vec![0, 2, 1, 3, 0], "test");

        for i in 0..sol.tour.len() - 2 {
            for j in i + 2..sol.tour.len() - 1 {
                let delta = sol.two_opt_delta(&instance, i, j);

                let mut moved = sol.clone();
                moved.apply_two_opt(i, j);
                moved.validate(&instance);

                assert!(
                    ((moved.cost - sol.cost) - delta).abs() < 1e-12,
                    "delta mismatch at ({i}, {j})"
                );
            }
        }

        // Applying an improving move keeps the tour complete
        sol.apply_two_opt(0, 2);
        sol.validate(&instance);
        assert!(sol.is_complete(&instance));
    }

    #[test]
    fn test_two_opt_delta_degenerate_indices() {
        let instance = square_instance();
        let sol = Solution::from_tour(&instance, vec![0, 1, 2, 3, 0], "test");

        assert_eq!(sol.two_opt_delta(&instance, 2, 2), 0.0);
        assert_eq!(sol.two_opt_delta(&instance, 3, 1), 0.0);
        assert_eq!(sol.two_opt_delta(&instance, 1, 4), 0.0);
    }
}
