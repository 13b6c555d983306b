//! # Trail Engine
//!
//! Trail geometry engine for a hiking companion app.
//!
//! This library is the Rust core behind the app's trail and navigation screens.
//! It provides:
//! - Streaming GPX parsing into validated point sequences
//! - Trail metrics (distance, elevation gain, duration, bounding region)
//! - Live hike progress tracking against a planned route
//!
//! The engine consumes parsed coordinate sequences and position fixes and
//! produces metrics and progress snapshots. Fetching, storage, and rendering
//! are the caller's concern; the mobile layer interacts through the types
//! re-exported here, all of which serialize to camelCase JSON.
//!
//! ## Quick Start
//!
//! ```rust
//! use trail_engine::{compute_metrics, parse_gpx_str};
//!
//! let xml = r#"<?xml version="1.0"?>
//! <gpx version="1.1">
//!   <trk>
//!     <name>Omu Peak</name>
//!     <trkseg>
//!       <trkpt lat="45.40" lon="25.45"><ele>2200.0</ele></trkpt>
//!       <trkpt lat="45.41" lon="25.45"><ele>2300.0</ele></trkpt>
//!     </trkseg>
//!   </trk>
//! </gpx>"#;
//!
//! let trail = parse_gpx_str(xml, "omu-peak").unwrap();
//! assert_eq!(trail.name, "Omu Peak");
//! assert_eq!(trail.points.len(), 2);
//!
//! let metrics = compute_metrics(&trail);
//! assert!(metrics.total_distance_m > 1000.0);
//! assert_eq!(metrics.elevation_gain_m, 100.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TrailError};

// Geographic utilities (distance, bounds, center calculations)
pub mod geo_utils;
pub use geo_utils::{bounding_region, compute_center, haversine_distance, polyline_length};

// Streaming GPX parsing
pub mod gpx;
pub use gpx::{parse_gpx, parse_gpx_str};

// Trail metrics derivation
pub mod metrics;
pub use metrics::{compute_metrics, compute_track_metrics, TrailMetrics};

// Trail store adapter (record mapping, zone filtering)
pub mod store;
pub use store::{filter_by_zone, SaveHikePayload, TrailRecord};

// Live navigation session tracking
pub mod navigation;
pub use navigation::{
    HikeSummary, PositionFix, ProgressSnapshot, RouteProgressTracker, SessionState,
};

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude, longitude, and elevation.
///
/// Elevation defaults to 0.0 m when a source carries none.
///
/// # Example
/// ```
/// use trail_engine::GeoPoint;
/// let point = GeoPoint::new(45.4168, 25.4539); // Omu Peak
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters above sea level
    #[serde(default)]
    pub elevation: f64,
}

impl GeoPoint {
    /// Create a new point at sea level.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: 0.0,
        }
    }

    /// Create a new point with an elevation reading.
    pub fn with_elevation(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    /// Whether the coordinates are within WGS84 bounds
    /// (latitude in [-90, 90], longitude in [-180, 180]).
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One GPS sample of a recorded track: a position plus an optional timestamp.
///
/// Produced only by the GPX parser. Sequence order is temporal and significant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    #[serde(flatten)]
    pub point: GeoPoint,
    pub time: Option<DateTime<Utc>>,
}

impl TrackPoint {
    pub fn new(point: GeoPoint, time: Option<DateTime<Utc>>) -> Self {
        Self { point, time }
    }
}

/// Minimal lat/lon rectangle enclosing a point set. Used to frame a map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRegion {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for BoundingRegion {
    /// Default map frame shown when there are no points to fit
    /// (the Bucegi area, where most of the app's trails live).
    fn default() -> Self {
        Self {
            min_lat: 45.0,
            max_lat: 46.0,
            min_lon: 25.0,
            max_lon: 26.0,
        }
    }
}

/// Placeholder when a GPX document carries no trail name.
pub const DEFAULT_TRAIL_NAME: &str = "Unnamed trail";

/// Placeholder when a GPX document carries no description.
pub const DEFAULT_TRAIL_DESCRIPTION: &str = "No description";

/// A parsed trail: named, ordered point sequence plus document metadata.
///
/// Created once per GPX document and immutable thereafter. `points` may
/// legitimately be empty — a trail with zero valid points is a valid result,
/// distinct from a failed parse (which is a [`TrailError::UnreadableDocument`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTrail {
    pub name: String,
    pub description: String,
    pub points: Vec<TrackPoint>,
    /// Opaque identifier of the source document
    pub source_id: String,
    /// Timestamp of the first timestamped point
    pub start_time: Option<DateTime<Utc>>,
    /// Timestamp of the last timestamped point
    pub end_time: Option<DateTime<Utc>>,
}

impl ParsedTrail {
    /// The trail's coordinates without timestamps, in track order.
    ///
    /// This is the planned-route representation consumed by
    /// [`RouteProgressTracker::start_session`].
    pub fn geo_points(&self) -> Vec<GeoPoint> {
        self.points.iter().map(|tp| tp.point).collect()
    }

    /// Bounding region enclosing the trail, or the default frame when empty.
    pub fn bounding_region(&self) -> BoundingRegion {
        bounding_region(&self.geo_points())
    }
}
