//! Tour construction heuristics.
//!
//! Builds an initial closed tour from a route instance. The default strategy
//! is cheapest-arc greedy insertion ("nearest unvisited next"), which is
//! deterministic and gives local search a reasonable seed.

use crate::instance::RouteInstance;
use crate::solution::Solution;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &RouteInstance) -> Solution;
    fn name(&self) -> &str;
}

/// Cheapest-arc greedy construction.
///
/// Starts at the depot and repeatedly extends the path by the unvisited stop
/// closest to the current end, breaking ties by lowest stop index, then
/// closes the cycle back to the depot. The randomized variant picks among
/// the closest candidates instead, seeded for reproducibility.
pub struct NearestNeighborHeuristic {
    pub randomized: bool,
    pub seed: u64,
}

impl NearestNeighborHeuristic {
    pub fn new() -> Self {
        NearestNeighborHeuristic {
            randomized: false,
            seed: 42,
        }
    }

    pub fn randomized(seed: u64) -> Self {
        NearestNeighborHeuristic {
            randomized: true,
            seed,
        }
    }

    fn find_nearest(
        &self,
        instance: &RouteInstance,
        current: usize,
        visited: &HashSet<usize>,
        rng: &mut ChaCha8Rng,
    ) -> Option<usize> {
        let mut candidates: Vec<(usize, f64)> = (0..instance.dimension)
            .filter(|&n| !visited.contains(&n))
            .map(|n| (n, instance.distance(current, n)))
            .collect();

        if candidates.is_empty() {
            return None;
        }

        // Ties broken by lowest stop index
        candidates.sort_by_key(|&(n, d)| (OrderedFloat(d), n));

        if self.randomized && candidates.len() > 1 {
            let top_k = candidates.len().min(3);
            let idx = rng.gen_range(0..top_k);
            Some(candidates[idx].0)
        } else {
            Some(candidates[0].0)
        }
    }
}

impl Default for NearestNeighborHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for NearestNeighborHeuristic {
    fn construct(&self, instance: &RouteInstance) -> Solution {
        let start = std::time::Instant::now();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut tour = vec![0]; // Start at depot
        let mut visited = HashSet::new();
        visited.insert(0);

        let mut current = 0;

        while visited.len() < instance.dimension {
            if let Some(next) = self.find_nearest(instance, current, &visited, &mut rng) {
                tour.push(next);
                visited.insert(next);
                current = next;
            } else {
                break;
            }
        }

        // Close the cycle back to the depot
        tour.push(0);

        let mut solution = Solution::from_tour(instance, tour, self.name());
        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }

    fn name(&self) -> &str {
        if self.randomized {
            "NearestNeighbor-Randomized"
        } else {
            "NearestNeighbor"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Stop;

    #[test]
    fn test_single_delivery_tour() {
        let instance = RouteInstance::new(vec![
            Stop::new(0, 22.5, 88.4),
            Stop::new(1, 22.6, 88.5),
        ])
        .unwrap();

        let nn = NearestNeighborHeuristic::new();
        let solution = nn.construct(&instance);

        assert_eq!(solution.tour, vec![0, 1, 0]);
        let expected = 2.0 * instance.distance(0, 1);
        assert!((solution.cost - expected).abs() < 1e-9);
    }

    #[test]
    fn test_constructs_complete_tour() {
        let instance = RouteInstance::new(vec![
            Stop::new(0, 22.50, 88.40),
            Stop::new(1, 22.52, 88.43),
            Stop::new(2, 22.48, 88.38),
            Stop::new(3, 22.55, 88.41),
            Stop::new(4, 22.49, 88.45),
        ])
        .unwrap();

        let solution = NearestNeighborHeuristic::new().construct(&instance);
        assert!(solution.is_complete(&instance));
        assert!(solution.cost > 0.0);
    }

    #[test]
    fn test_deterministic() {
        let stops = vec![
            Stop::new(0, 22.50, 88.40),
            Stop::new(1, 22.52, 88.43),
            Stop::new(2, 22.48, 88.38),
            Stop::new(3, 22.55, 88.41),
        ];
        let instance = RouteInstance::new(stops).unwrap();

        let a = NearestNeighborHeuristic::new().construct(&instance);
        let b = NearestNeighborHeuristic::new().construct(&instance);
        assert_eq!(a.tour, b.tour);
        assert_eq!(a.cost, b.cost);
    }

    #[test]
    fn test_ties_broken_by_lowest_index() {
        // Stops 1 and 2 share coordinates, both nearest to the depot
        let instance = RouteInstance::new(vec![
            Stop::new(0, 22.5, 88.4),
            Stop::new(1, 22.6, 88.5),
            Stop::new(2, 22.6, 88.5),
        ])
        .unwrap();

        let solution = NearestNeighborHeuristic::new().construct(&instance);
        assert_eq!(solution.tour, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_randomized_is_seed_reproducible() {
        let instance = RouteInstance::new(vec![
            Stop::new(0, 22.50, 88.40),
            Stop::new(1, 22.52, 88.43),
            Stop::new(2, 22.48, 88.38),
            Stop::new(3, 22.55, 88.41),
            Stop::new(4, 22.49, 88.45),
        ])
        .unwrap();

        let a = NearestNeighborHeuristic::randomized(7).construct(&instance);
        let b = NearestNeighborHeuristic::randomized(7).construct(&instance);
        assert_eq!(a.tour, b.tour);
        assert!(a.is_complete(&instance));
    }
}
