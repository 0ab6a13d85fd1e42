//! JSON request and response adaptation.
//!
//! The boundary an HTTP layer (or the CLI) talks to. Delivery points arrive
//! as arbitrary JSON objects; coordinates are read with a field-name
//! fallback (`lat`/`lng`, then `latitude`/`longitude`, defaulting to 0.0).
//! The fallback lives here so the solver core only ever sees clean floats.

use crate::instance::Stop;
use crate::solution::Solution;
use crate::solver::{RouteSolver, SolveError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

fn default_source_point() -> Value {
    json!({ "lat": 22.5, "lng": 88.4 })
}

/// An inbound route optimization request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Depot location; defaults to the service's home depot when absent
    #[serde(default = "default_source_point")]
    pub source_point: Value,
    /// Delivery point objects, each carrying coordinates plus arbitrary
    /// extra fields that are echoed back in the response
    #[serde(default)]
    pub deliveries: Vec<Value>,
}

impl RouteRequest {
    /// Turn the request into the solver's stop list, depot prepended as
    /// stop 0 and deliveries numbered from 1 in input order
    pub fn to_stops(&self) -> Vec<Stop> {
        let mut stops = Vec::with_capacity(self.deliveries.len() + 1);

        let (lat, lon) = extract_coordinates(&self.source_point);
        stops.push(Stop::with_payload(0, lat, lon, self.source_point.clone()));

        for (i, delivery) in self.deliveries.iter().enumerate() {
            let (lat, lon) = extract_coordinates(delivery);
            stops.push(Stop::with_payload(i + 1, lat, lon, delivery.clone()));
        }

        stops
    }
}

/// The shaped response for a solved route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Total tour length in kilometers, rounded to 2 decimals
    pub total_distance: f64,
    /// Length of the index sequence (closing depot included)
    pub total_points: usize,
    /// The closed tour as stop indices
    pub route: Vec<usize>,
    /// Delivery objects in visit order, annotated with their 1-based
    /// `route_order`; the depot is not part of this list
    pub ordered_deliveries: Vec<Value>,
}

impl RouteResponse {
    pub fn from_solution(stops: &[Stop], solution: &Solution) -> Self {
        let total_distance = (solution.cost * 100.0).round() / 100.0;

        let interior = if solution.tour.len() >= 2 {
            &solution.tour[1..solution.tour.len() - 1]
        } else {
            &[][..]
        };

        let mut ordered_deliveries = Vec::with_capacity(interior.len());
        for (pos, &idx) in interior.iter().enumerate() {
            let stop = &stops[idx];
            let mut fields = match &stop.payload {
                Value::Object(map) => map.clone(),
                _ => {
                    let mut map = Map::new();
                    map.insert("lat".to_string(), json!(stop.lat));
                    map.insert("lng".to_string(), json!(stop.lon));
                    map
                }
            };
            fields.insert("route_order".to_string(), json!(pos + 1));
            ordered_deliveries.push(Value::Object(fields));
        }

        RouteResponse {
            total_distance,
            total_points: solution.tour.len(),
            route: solution.tour.clone(),
            ordered_deliveries,
        }
    }
}

/// Extract (latitude, longitude) from a JSON point object.
///
/// Prefers `lat`/`lng`, falls back to `latitude`/`longitude`, defaults each
/// missing coordinate to 0.0.
pub fn extract_coordinates(value: &Value) -> (f64, f64) {
    let lat = field_as_f64(value, "lat")
        .or_else(|| field_as_f64(value, "latitude"))
        .unwrap_or(0.0);
    let lon = field_as_f64(value, "lng")
        .or_else(|| field_as_f64(value, "longitude"))
        .unwrap_or(0.0);
    (lat, lon)
}

fn field_as_f64(value: &Value, key: &str) -> Option<f64> {
    value.get(key)?.as_f64()
}

/// Solve a request end to end: adapt, solve, shape the response.
///
/// An empty delivery list surfaces as [`SolveError::NoDeliveries`], the
/// "no deliveries provided" client error at the HTTP boundary.
pub fn optimize_route(request: &RouteRequest, solver: &RouteSolver) -> Result<RouteResponse, SolveError> {
    let stops = request.to_stops();
    let solution = solver.solve(stops.clone())?;
    Ok(RouteResponse::from_solution(&stops, &solution))
}
