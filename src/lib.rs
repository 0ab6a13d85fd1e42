//! Delivery Route Solver Library
//!
//! A single-vehicle route optimizer for last-mile delivery: given a depot
//! and a set of delivery points, it produces a closed tour that
//! approximately minimizes total travel distance.
//!
//! # Features
//!
//! - Haversine great-circle distances (kilometers)
//! - Cheapest-arc greedy tour construction
//! - Time-bounded 2-opt local search (first- or best-improvement)
//! - JSON request/response adaptation with coordinate-field fallback
//! - GeoJSON / SVG / HTML route artifacts
//! - Benchmarking tools
//!
//! # Example
//!
//! ```no_run
//! use delivery_route_solver::instance::Stop;
//! use delivery_route_solver::solver::RouteSolver;
//!
//! let stops = vec![
//!     Stop::new(0, 22.5, 88.4),   // depot
//!     Stop::new(1, 22.6, 88.5),
//!     Stop::new(2, 22.4, 88.3),
//! ];
//!
//! let solution = RouteSolver::new().solve(stops).unwrap();
//!
//! println!("Route: {:?}", solution.tour);
//! println!("Total distance: {:.2} km", solution.cost);
//! ```

pub mod benchmark;
pub mod geo;
pub mod heuristics;
pub mod instance;
pub mod request;
pub mod solution;
pub mod solver;
pub mod visualization;

pub use instance::{RouteInstance, Stop};
pub use solution::Solution;
pub use solver::{RouteSolver, SolveError, SolverConfig};
