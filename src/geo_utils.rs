//! # Geographic Utilities
//!
//! Core geographic computation utilities for trail analysis.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of a point sequence in meters |
//! | [`bounding_region`] | Bounding rectangle of a point set |
//! | [`compute_center`] | Centroid of a point set |
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees),
//! the standard used by GPS receivers and mapping services.

use crate::{BoundingRegion, GeoPoint};

/// Mean Earth radius in meters, as used by the haversine formula.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the
/// haversine formula.
///
/// Returns the distance in meters along the Earth's surface, assuming a
/// spherical Earth with radius 6,371 km. Pure and deterministic; elevation is
/// not considered.
///
/// # Example
///
/// ```rust
/// use trail_engine::{GeoPoint, geo_utils};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1_rad = p1.latitude.to_radians();
    let lat2_rad = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lon = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Calculate the total length of a point sequence in meters.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point sequences return 0.0.
pub fn polyline_length(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Bounding Region Functions
// =============================================================================

/// Compute the bounding region of a point set.
///
/// Min/max reduction over latitude and longitude; elevation is ignored. An
/// empty set returns [`BoundingRegion::default`], the fallback map frame —
/// a sentinel, not an error.
pub fn bounding_region(points: &[GeoPoint]) -> BoundingRegion {
    if points.is_empty() {
        return BoundingRegion::default();
    }

    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lon = f64::MAX;
    let mut max_lon = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lon = min_lon.min(p.longitude);
        max_lon = max_lon.max(p.longitude);
    }

    BoundingRegion {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

// =============================================================================
// Center/Centroid Functions
// =============================================================================

/// Compute the geographic center (centroid) of a point set.
///
/// Arithmetic mean of latitude and longitude, suitable for framing a map view
/// over the small areas a trail covers. Returns (0, 0) for empty input.
pub fn compute_center(points: &[GeoPoint]) -> GeoPoint {
    if points.is_empty() {
        return GeoPoint::new(0.0, 0.0);
    }

    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lon: f64 = points.iter().map(|p| p.longitude).sum();
    let n = points.len() as f64;

    GeoPoint::new(sum_lat / n, sum_lon / n)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = GeoPoint::new(45.4168, 25.4539);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_symmetry() {
        let a = GeoPoint::new(45.40, 25.45);
        let b = GeoPoint::new(45.52, 25.51);
        assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // London to Paris is approximately 344 km
        let london = GeoPoint::new(51.5074, -0.1278);
        let paris = GeoPoint::new(48.8566, 2.3522);
        let dist = haversine_distance(&london, &paris);
        assert!(approx_eq(dist, 343_560.0, 5000.0)); // Within 5km
    }

    #[test]
    fn test_haversine_triangle_inequality() {
        let a = GeoPoint::new(45.40, 25.45);
        let b = GeoPoint::new(45.45, 25.50);
        let c = GeoPoint::new(45.52, 25.42);
        let direct = haversine_distance(&a, &c);
        let detour = haversine_distance(&a, &b) + haversine_distance(&b, &c);
        assert!(direct <= detour + 1e-9);
    }

    #[test]
    fn test_haversine_ignores_elevation() {
        let low = GeoPoint::with_elevation(45.40, 25.45, 800.0);
        let high = GeoPoint::with_elevation(45.40, 25.45, 2500.0);
        assert_eq!(haversine_distance(&low, &high), 0.0);
    }

    #[test]
    fn test_polyline_length_empty() {
        let empty: Vec<GeoPoint> = vec![];
        assert_eq!(polyline_length(&empty), 0.0);
    }

    #[test]
    fn test_polyline_length_single_point() {
        let single = vec![GeoPoint::new(45.40, 25.45)];
        assert_eq!(polyline_length(&single), 0.0);
    }

    #[test]
    fn test_polyline_length_two_points() {
        // 0.01 degrees of latitude is roughly 1112 m
        let track = vec![GeoPoint::new(45.0, 25.0), GeoPoint::new(45.01, 25.0)];
        let length = polyline_length(&track);
        assert!(approx_eq(length, 1111.9, 1.0));
    }

    #[test]
    fn test_bounding_region_empty_returns_default() {
        let empty: Vec<GeoPoint> = vec![];
        assert_eq!(bounding_region(&empty), BoundingRegion::default());
    }

    #[test]
    fn test_bounding_region_reduction() {
        let track = vec![
            GeoPoint::new(45.50, 25.13),
            GeoPoint::new(45.51, 25.12),
            GeoPoint::new(45.505, 25.125),
        ];
        let region = bounding_region(&track);
        assert_eq!(region.min_lat, 45.50);
        assert_eq!(region.max_lat, 45.51);
        assert_eq!(region.min_lon, 25.12);
        assert_eq!(region.max_lon, 25.13);
    }

    #[test]
    fn test_compute_center() {
        let track = vec![GeoPoint::new(45.50, 25.10), GeoPoint::new(45.52, 25.12)];
        let center = compute_center(&track);
        assert!(approx_eq(center.latitude, 45.51, 0.001));
        assert!(approx_eq(center.longitude, 25.11, 0.001));
    }

    #[test]
    fn test_compute_center_empty() {
        let empty: Vec<GeoPoint> = vec![];
        let center = compute_center(&empty);
        assert_eq!(center.latitude, 0.0);
        assert_eq!(center.longitude, 0.0);
    }
}
