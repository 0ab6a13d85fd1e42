//! Visualization utilities for solved routes.
//!
//! Generates the static artifacts a report layer consumes: a GeoJSON
//! FeatureCollection, an SVG plot of the tour, and a simple HTML summary.

use crate::instance::RouteInstance;
use crate::solution::Solution;
use serde_json::{json, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// SVG/report generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Stop marker radius
    pub node_radius: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 6.0,
        }
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate an SVG plot of the solved tour.
    ///
    /// Longitude maps to x and latitude to y (north up); the depot is drawn
    /// in its own color and stops are labelled with their visit order.
    pub fn generate_svg(&self, instance: &RouteInstance, solution: &Solution) -> String {
        let mut svg = String::new();

        let (min_lon, max_lon, min_lat, max_lat) = self.get_bounds(instance);

        let scale_x = (self.width - 2.0 * self.margin) / (max_lon - min_lon).max(1e-9);
        let scale_y = (self.height - 2.0 * self.margin) / (max_lat - min_lat).max(1e-9);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .stop {{ fill: #3498db; stroke: #2c3e50; stroke-width: 2; }}
    .depot {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 2; }}
    .edge {{ stroke: #34495e; stroke-width: 2; fill: none; }}
    .label {{ font-family: Arial; font-size: 10px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Route: {} stops | {:.2} km</text>
"##,
            self.margin, instance.dimension, solution.cost
        ));

        let transform = |lon: f64, lat: f64| -> (f64, f64) {
            let tx = self.margin + (lon - min_lon) * scale;
            let ty = self.height - self.margin - (lat - min_lat) * scale;
            (tx, ty)
        };

        for w in solution.tour.windows(2) {
            let from = &instance.stops[w[0]];
            let to = &instance.stops[w[1]];

            let (x1, y1) = transform(from.lon, from.lat);
            let (x2, y2) = transform(to.lon, to.lat);

            svg.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" class="edge" marker-end="url(#arrow)"/>
"#,
                x1, y1, x2, y2
            ));
        }

        svg.push_str(
            r##"<defs>
<marker id="arrow" markerWidth="10" markerHeight="10" refX="9" refY="3" orient="auto" markerUnits="strokeWidth">
<path d="M0,0 L0,6 L9,3 z" fill="#34495e"/>
</marker>
</defs>
"##,
        );

        for (pos, &idx) in solution.tour[..solution.tour.len().saturating_sub(1)]
            .iter()
            .enumerate()
        {
            let stop = &instance.stops[idx];
            let (x, y) = transform(stop.lon, stop.lat);

            let class = if stop.is_depot() { "depot" } else { "stop" };

            svg.push_str(&format!(
                r##"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"##,
                x, y, self.node_radius, class
            ));

            svg.push_str(&format!(
                r##"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"##,
                x,
                y - self.node_radius - 3.0,
                pos
            ));
        }

        let legend_y = self.height - 30.0;
        svg.push_str(&format!(
            r##"
<rect x="{}" y="{}" width="15" height="15" class="depot"/>
<text x="{}" y="{}" class="label">Depot</text>
<rect x="{}" y="{}" width="15" height="15" class="stop"/>
<text x="{}" y="{}" class="label">Delivery</text>
"##,
            self.margin,
            legend_y,
            self.margin + 20.0,
            legend_y + 12.0,
            self.margin + 80.0,
            legend_y,
            self.margin + 100.0,
            legend_y + 12.0
        ));

        svg.push_str("</svg>");

        svg
    }

    /// Generate a GeoJSON FeatureCollection for the solved route: one point
    /// feature per visited stop (payload fields plus visit order) and a
    /// closing LineString carrying the total distance
    pub fn generate_geojson(&self, instance: &RouteInstance, solution: &Solution) -> Value {
        let mut features = Vec::new();
        let mut line_coordinates = Vec::new();

        for (pos, &idx) in solution.tour[..solution.tour.len().saturating_sub(1)]
            .iter()
            .enumerate()
        {
            let stop = &instance.stops[idx];

            let mut properties = match &stop.payload {
                Value::Object(map) => map.clone(),
                _ => serde_json::Map::new(),
            };
            properties.insert("route_order".to_string(), json!(pos));

            features.push(json!({
                "type": "Feature",
                "properties": Value::Object(properties),
                "geometry": {
                    "type": "Point",
                    "coordinates": [stop.lon, stop.lat]
                }
            }));
        }

        for &idx in &solution.tour {
            let stop = &instance.stops[idx];
            line_coordinates.push(json!([stop.lon, stop.lat]));
        }

        features.push(json!({
            "type": "Feature",
            "properties": {
                "RouteType": "OptimalPath",
                "TotalDistance": solution.cost
            },
            "geometry": {
                "type": "LineString",
                "coordinates": line_coordinates
            }
        }));

        json!({
            "type": "FeatureCollection",
            "features": features
        })
    }

    /// Generate a self-contained HTML report: route summary, stop table and
    /// the embedded SVG plot
    pub fn generate_html(&self, instance: &RouteInstance, solution: &Solution) -> String {
        let mut rows = String::new();
        for (pos, &idx) in solution.tour[..solution.tour.len().saturating_sub(1)]
            .iter()
            .enumerate()
        {
            let stop = &instance.stops[idx];
            rows.push_str(&format!(
                "            <tr><td>{}</td><td>{:.6}</td><td>{:.6}</td><td>{}</td></tr>\n",
                pos,
                stop.lat,
                stop.lon,
                if stop.is_depot() { "depot" } else { "delivery" }
            ));
        }

        let route_order: Vec<String> = solution.tour.iter().map(|i| i.to_string()).collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Route Visualization</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; }}
        .container {{ max-width: 900px; margin: 0 auto; }}
        table {{ border-collapse: collapse; width: 100%; margin-top: 20px; }}
        th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
        th {{ background-color: #f2f2f2; }}
        .route-info {{ background-color: #e9f7ef; padding: 15px; border-radius: 5px; }}
        svg {{ max-width: 100%; height: auto; border: 1px solid #ddd; margin: 20px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Route Visualization</h1>
        <div class="route-info">
            <h3>Route Summary</h3>
            <p><strong>Total Distance:</strong> {:.2} km</p>
            <p><strong>Number of Points:</strong> {}</p>
            <p><strong>Route Order:</strong> {}</p>
        </div>
        <h3>Route Points</h3>
        <table>
            <tr><th>Stop #</th><th>Latitude</th><th>Longitude</th><th>Type</th></tr>
{}        </table>
        {}
    </div>
</body>
</html>
"#,
            solution.cost,
            instance.dimension,
            route_order.join(" → "),
            rows,
            self.generate_svg(instance, solution)
        )
    }

    /// Save an already generated artifact string
    pub fn save_text<P: AsRef<Path>>(&self, content: &str, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Save a GeoJSON value with pretty formatting
    pub fn save_geojson<P: AsRef<Path>>(&self, geojson: &Value, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        let text = serde_json::to_string_pretty(geojson)?;
        file.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Get coordinate bounds as (min_lon, max_lon, min_lat, max_lat)
    fn get_bounds(&self, instance: &RouteInstance) -> (f64, f64, f64, f64) {
        let mut min_lon = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;
        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;

        for stop in &instance.stops {
            min_lon = min_lon.min(stop.lon);
            max_lon = max_lon.max(stop.lon);
            min_lat = min_lat.min(stop.lat);
            max_lat = max_lat.max(stop.lat);
        }

        (min_lon, max_lon, min_lat, max_lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Stop;

    fn solved_route() -> (RouteInstance, Solution) {
        let instance = RouteInstance::new(vec![
            Stop::with_payload(0, 22.5, 88.4, serde_json::json!({"lat": 22.5, "lng": 88.4})),
            Stop::with_payload(1, 22.6, 88.5, serde_json::json!({"order_id": 42})),
            Stop::with_payload(2, 22.4, 88.3, serde_json::json!({"order_id": 43})),
        ])
        .unwrap();
        let solution = Solution::from_tour(&instance, vec![0, 1, 2, 0], "test");
        (instance, solution)
    }

    #[test]
    fn test_geojson_structure() {
        let (instance, solution) = solved_route();
        let geojson = Visualizer::new().generate_geojson(&instance, &solution);

        assert_eq!(geojson["type"], "FeatureCollection");
        let features = geojson["features"].as_array().unwrap();
        // One point per visited stop plus the route line
        assert_eq!(features.len(), 4);

        assert_eq!(features[0]["geometry"]["type"], "Point");
        assert_eq!(features[0]["properties"]["route_order"], 0);
        assert_eq!(features[1]["properties"]["order_id"], 42);

        let line = &features[3];
        assert_eq!(line["geometry"]["type"], "LineString");
        // Closed ring: 4 tour entries
        assert_eq!(line["geometry"]["coordinates"].as_array().unwrap().len(), 4);
        assert!(line["properties"]["TotalDistance"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_svg_contains_all_stops() {
        let (instance, solution) = solved_route();
        let svg = Visualizer::new().generate_svg(&instance, &solution);

        assert!(svg.starts_with("<?xml"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("class=\"depot\"").count(), 2); // marker + legend
    }

    #[test]
    fn test_html_report_summary() {
        let (instance, solution) = solved_route();
        let html = Visualizer::new().generate_html(&instance, &solution);

        assert!(html.contains("Route Summary"));
        assert!(html.contains(&format!("{:.2} km", solution.cost)));
        assert!(html.contains("<svg"));
    }
}
