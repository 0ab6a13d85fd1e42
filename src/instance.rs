//! Module for representing route instances.
//!
//! A route instance holds the ordered list of stops (depot first) together
//! with the precomputed haversine distance matrix. Instances are built once
//! per solve call and never mutated afterwards.

use crate::geo::haversine_distance;
use crate::solver::SolveError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A stop on the route: the depot or a delivery point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    /// Stop identifier (index into the input sequence, 0 = depot)
    pub id: usize,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Opaque caller-supplied attributes, echoed back in output
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Stop {
    pub fn new(id: usize, lat: f64, lon: f64) -> Self {
        Stop {
            id,
            lat,
            lon,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(id: usize, lat: f64, lon: f64, payload: serde_json::Value) -> Self {
        Stop { id, lat, lon, payload }
    }

    /// Check if this stop is the depot
    pub fn is_depot(&self) -> bool {
        self.id == 0
    }
}

/// A complete route instance: stops plus their distance matrix
#[derive(Debug, Clone)]
pub struct RouteInstance {
    /// Number of stops (including depot)
    pub dimension: usize,
    /// List of all stops, depot at index 0
    pub stops: Vec<Stop>,
    /// Precomputed distance matrix in kilometers
    distance_matrix: Vec<Vec<f64>>,
}

impl RouteInstance {
    /// Build an instance from an ordered list of stops (index 0 = depot).
    ///
    /// Computes the full N x N haversine matrix. Fails on non-finite
    /// coordinates or distances; duplicate coordinates are legal and simply
    /// yield zero-distance edges.
    pub fn new(stops: Vec<Stop>) -> Result<Self, SolveError> {
        for stop in &stops {
            if !stop.lat.is_finite() || !stop.lon.is_finite() {
                return Err(SolveError::NonFiniteCoordinate { index: stop.id });
            }
        }

        let dimension = stops.len();
        let distance_matrix = Self::compute_distance_matrix(&stops);

        for (i, row) in distance_matrix.iter().enumerate() {
            for (j, &d) in row.iter().enumerate() {
                if !d.is_finite() {
                    return Err(SolveError::NonFiniteDistance { from: i, to: j });
                }
            }
        }

        Ok(RouteInstance {
            dimension,
            stops,
            distance_matrix,
        })
    }

    /// Compute the haversine distance matrix, one row per stop
    fn compute_distance_matrix(stops: &[Stop]) -> Vec<Vec<f64>> {
        let n = stops.len();

        (0..n)
            .into_par_iter()
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            0.0
                        } else {
                            haversine_distance(stops[i].lat, stops[i].lon, stops[j].lat, stops[j].lon)
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Get the distance between two stops in kilometers
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_matrix[i][j]
    }

    /// Get the number of delivery stops (excluding depot)
    pub fn num_deliveries(&self) -> usize {
        self.dimension.saturating_sub(1)
    }

    /// Calculate total length of a tour given as a closed index sequence.
    ///
    /// The sequence is expected to already start and end at the depot; only
    /// consecutive-pair distances are summed, there is no implicit wrap.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let mut length = 0.0;
        for i in 0..tour.len() - 1 {
            length += self.distance(tour[i], tour[i + 1]);
        }

        length
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut distances: Vec<f64> = Vec::new();
        for i in 0..self.dimension {
            for j in i + 1..self.dimension {
                distances.push(self.distance(i, j));
            }
        }

        let (avg_distance, max_distance) = if distances.is_empty() {
            (0.0, 0.0)
        } else {
            let avg = distances.iter().sum::<f64>() / distances.len() as f64;
            let max = distances.iter().cloned().fold(0.0, f64::max);
            (avg, max)
        };

        let min_lat = self.stops.iter().map(|s| s.lat).fold(f64::INFINITY, f64::min);
        let max_lat = self.stops.iter().map(|s| s.lat).fold(f64::NEG_INFINITY, f64::max);
        let min_lon = self.stops.iter().map(|s| s.lon).fold(f64::INFINITY, f64::min);
        let max_lon = self.stops.iter().map(|s| s.lon).fold(f64::NEG_INFINITY, f64::max);

        InstanceStatistics {
            dimension: self.dimension,
            num_deliveries: self.num_deliveries(),
            avg_distance,
            max_distance,
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }
}

/// Statistics about a route instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub dimension: usize,
    pub num_deliveries: usize,
    pub avg_distance: f64,
    pub max_distance: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance:")?;
        writeln!(f, "  Stops: {} (1 depot + {} deliveries)", self.dimension, self.num_deliveries)?;
        writeln!(f, "  Avg distance: {:.2} km", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2} km", self.max_distance)?;
        writeln!(f, "  Latitude range: {:.4} .. {:.4}", self.min_lat, self.max_lat)?;
        writeln!(f, "  Longitude range: {:.4} .. {:.4}", self.min_lon, self.max_lon)
    }
}
