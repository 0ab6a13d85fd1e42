//! Local search improvement for solved routes.
//!
//! Implements 2-opt edge exchange: reversing the tour segment between two
//! edges to remove crossings. Runs until a full scan finds no improving move
//! or the solve deadline expires, whichever comes first.

use crate::instance::RouteInstance;
use crate::solution::Solution;
use crate::solver::Deadline;
use log::debug;

/// Improvement threshold: deltas closer to zero than this are noise
const IMPROVEMENT_EPSILON: f64 = -1e-9;

/// Trait for local search improvement methods
pub trait LocalSearch {
    /// Improve the solution in place. Returns true if the cost decreased.
    ///
    /// The deadline is checked between scan passes, never mid-pass, so the
    /// solution is always a complete tour when this returns.
    fn improve(
        &self,
        instance: &RouteInstance,
        solution: &mut Solution,
        deadline: &Deadline,
    ) -> bool;

    fn name(&self) -> &str;
}

/// 2-opt local search.
///
/// First-improvement applies the first negative-delta move found and restarts
/// the scan; best-improvement scans all pairs and applies the single best
/// move per pass.
pub struct TwoOptSearch {
    /// Use first improvement instead of best improvement
    pub first_improvement: bool,
}

impl TwoOptSearch {
    pub fn new() -> Self {
        TwoOptSearch {
            first_improvement: true,
        }
    }

    pub fn best_improvement() -> Self {
        TwoOptSearch {
            first_improvement: false,
        }
    }
}

impl Default for TwoOptSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for TwoOptSearch {
    fn improve(
        &self,
        instance: &RouteInstance,
        solution: &mut Solution,
        deadline: &Deadline,
    ) -> bool {
        let n = solution.tour.len();
        // A closed tour over fewer than 2 deliveries has no exchangeable edges
        if n < 5 {
            return false;
        }

        let mut moves = 0usize;
        let mut improved = true;

        while improved {
            if deadline.expired() {
                debug!(
                    "2-opt deadline reached after {} improving moves, returning best-so-far",
                    moves
                );
                break;
            }

            improved = false;

            if self.first_improvement {
                'scan: for i in 0..n - 2 {
                    for j in i + 2..n - 1 {
                        if i == 0 && j == n - 2 {
                            continue; // Would just reverse the entire tour
                        }

                        let delta = solution.two_opt_delta(instance, i, j);
                        if delta < IMPROVEMENT_EPSILON {
                            solution.apply_two_opt(i, j);
                            solution.cost += delta;
                            moves += 1;
                            improved = true;
                            break 'scan;
                        }
                    }
                }
            } else {
                let mut best_delta = 0.0;
                let mut best_i = 0;
                let mut best_j = 0;

                for i in 0..n - 2 {
                    for j in i + 2..n - 1 {
                        if i == 0 && j == n - 2 {
                            continue;
                        }

                        let delta = solution.two_opt_delta(instance, i, j);
                        if delta < best_delta {
                            best_delta = delta;
                            best_i = i;
                            best_j = j;
                        }
                    }
                }

                if best_delta < IMPROVEMENT_EPSILON {
                    solution.apply_two_opt(best_i, best_j);
                    solution.cost += best_delta;
                    moves += 1;
                    improved = true;
                }
            }
        }

        // Recompute from the tour to shed accumulated floating drift
        solution.validate(instance);
        solution.iterations = Some(moves);
        moves > 0
    }

    fn name(&self) -> &str {
        if self.first_improvement {
            "2-Opt-FI"
        } else {
            "2-Opt-BI"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::construction::{ConstructionHeuristic, NearestNeighborHeuristic};
    use crate::instance::Stop;
    use std::time::Duration;

    // A near-planar square: deltas small enough that curvature is negligible
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
    fn test_removes_crossing_on_square() {
        let instance = square_instance();
        let side = instance.distance(0, 1);

        // Both diagonals crossed
        let mut sol = Solution::from_tour(&instance, vec![0, 2, 1, 3, 0], "test");
        let initial = sol.cost;
        assert!(initial > 4.0 * side);

        let improved = TwoOptSearch::new().improve(&instance, &mut sol, &Deadline::unbounded());

        assert!(improved);
        assert!(sol.is_complete(&instance));
        assert!(sol.cost < initial);
        // Perimeter tour, not the crossing one
        assert!((sol.cost - 4.0 * side).abs() < 0.01 * side);
    }

    #[test]
    fn test_best_improvement_reaches_same_optimum() {
        let instance = square_instance();
        let side = instance.distance(0, 1);

        let mut sol = Solution::from_tour(&instance, vec![0, 2, 1, 3, 0], "test");
        TwoOptSearch::best_improvement().improve(&instance, &mut sol, &Deadline::unbounded());

        assert!((sol.cost - 4.0 * side).abs() < 0.01 * side);
    }

    #[test]
    fn test_never_increases_cost() {
        let instance = RouteInstance::new(vec![
            Stop::new(0, 22.50, 88.40),
            Stop::new(1, 22.52, 88.43),
            Stop::new(2, 22.48, 88.38),
            Stop::new(3, 22.55, 88.41),
            Stop::new(4, 22.49, 88.45),
            Stop::new(5, 22.53, 88.37),
        ])
        .unwrap();

        let mut sol = NearestNeighborHeuristic::new().construct(&instance);
        let initial = sol.cost;

        TwoOptSearch::new().improve(&instance, &mut sol, &Deadline::unbounded());

        assert!(sol.cost <= initial + 1e-9);
        assert!(sol.is_complete(&instance));
    }

    #[test]
    fn test_expired_deadline_returns_valid_tour() {
        let instance = square_instance();
        let mut sol = Solution::from_tour(&instance, vec![0, 2, 1, 3, 0], "test");
        let before = sol.tour.clone();

        let improved = TwoOptSearch::new().improve(
            &instance,
            &mut sol,
            &Deadline::new(Duration::ZERO),
        );

        // Budget was already spent: no moves applied, tour untouched and legal
        assert!(!improved);
        assert_eq!(sol.tour, before);
        assert!(sol.is_complete(&instance));
    }

    #[test]
    fn test_deterministic_without_time_pressure() {
        let instance = RouteInstance::new(vec![
            Stop::new(0, 22.50, 88.40),
            Stop::new(1, 22.52, 88.43),
            Stop::new(2, 22.48, 88.38),
            Stop::new(3, 22.55, 88.41),
            Stop::new(4, 22.49, 88.45),
        ])
        .unwrap();

        let seed = NearestNeighborHeuristic::new().construct(&instance);

        let mut a = seed.clone();
        let mut b = seed.clone();
        TwoOptSearch::new().improve(&instance, &mut a, &Deadline::unbounded());
        TwoOptSearch::new().improve(&instance, &mut b, &Deadline::unbounded());

        assert_eq!(a.tour, b.tour);
        assert_eq!(a.cost, b.cost);
    }

    #[test]
    fn test_single_delivery_is_a_noop() {
        let instance = RouteInstance::new(vec![
            Stop::new(0, 22.5, 88.4),
            Stop::new(1, 22.6, 88.5),
        ])
        .unwrap();

        let mut sol = Solution::from_tour(&instance, vec![0, 1, 0], "test");
        let improved = TwoOptSearch::new().improve(&instance, &mut sol, &Deadline::unbounded());

        assert!(!improved);
        assert_eq!(sol.tour, vec![0, 1, 0]);
    }
}
