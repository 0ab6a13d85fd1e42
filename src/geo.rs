//! Great-circle distance computation.
//!
//! Distances between stops are measured along the Earth's surface using the
//! haversine formula. All distances in this crate are kilometers.

/// Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two coordinates, in kilometers.
///
/// Inputs are latitudes and longitudes in degrees. The result is always
/// non-negative and finite for finite inputs, and zero when both points
/// coincide (up to floating precision).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lon1_rad = lon1.to_radians();
    let lat2_rad = lat2.to_radians();
    let lon2_rad = lon2.to_radians();

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_for_coincident_points() {
        let d = haversine_distance(22.5, 88.4, 22.5, 88.4);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        // One degree of arc on a great circle is R * pi / 180
        let expected = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
        let d = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((d - expected).abs() < 1e-6);
    }

    #[test]
    fn test_symmetry() {
        let d1 = haversine_distance(22.5, 88.4, 19.1, 72.9);
        let d2 = haversine_distance(19.1, 72.9, 22.5, 88.4);
        assert!((d1 - d2).abs() < 1e-9);
        assert!(d1 > 0.0);
    }

    #[test]
    fn test_quarter_circumference() {
        // Equator to pole is a quarter of the great circle
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        let d = haversine_distance(0.0, 0.0, 90.0, 0.0);
        assert!((d - expected).abs() < 1e-6);
    }
}
