//! # Trail Metrics
//!
//! Pure derivation of trail metrics from a parsed point sequence.
//!
//! Metrics are recomputable at any time and are always replaced wholesale —
//! never mutated in place. Missing data degrades gracefully to zeros; there
//! are no error conditions here.

use serde::{Deserialize, Serialize};

use crate::geo_utils::haversine_distance;
use crate::{ParsedTrail, TrackPoint};

/// Derived metrics for one trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailMetrics {
    /// Cumulative distance along the point sequence in meters
    pub total_distance_m: f64,
    /// Sum of positive elevation deltas only; descents are ignored
    pub elevation_gain_m: f64,
    /// Highest elevation reading, 0 when none recorded
    pub max_elevation_m: f64,
    /// End minus start timestamp in seconds, 0 when either is missing
    pub duration_secs: i64,
}

impl TrailMetrics {
    /// All-zero metrics, the result for an empty trail.
    pub fn zero() -> Self {
        Self {
            total_distance_m: 0.0,
            elevation_gain_m: 0.0,
            max_elevation_m: 0.0,
            duration_secs: 0,
        }
    }

    /// Distance in kilometers, the unit the trail store records.
    pub fn distance_km(&self) -> f64 {
        self.total_distance_m / 1000.0
    }
}

/// Compute metrics for a parsed trail.
///
/// Duration comes from the trail's document-level start/end timestamps, so a
/// trail whose points lost their individual timestamps still reports one.
pub fn compute_metrics(trail: &ParsedTrail) -> TrailMetrics {
    let mut metrics = compute_track_metrics(&trail.points);
    if let (Some(start), Some(end)) = (trail.start_time, trail.end_time) {
        metrics.duration_secs = (end - start).num_seconds();
    }
    metrics
}

/// Compute metrics from a raw point sequence.
///
/// Distance is the consecutive-pair haversine sum, so it is order-dependent:
/// reversing the sequence gives the same total but is a different trail.
/// Duration uses the first and last timestamped points.
pub fn compute_track_metrics(points: &[TrackPoint]) -> TrailMetrics {
    if points.is_empty() {
        return TrailMetrics::zero();
    }

    let mut total_distance = 0.0;
    let mut elevation_gain = 0.0;

    for pair in points.windows(2) {
        total_distance += haversine_distance(&pair[0].point, &pair[1].point);

        let delta = pair[1].point.elevation - pair[0].point.elevation;
        if delta > 0.0 {
            elevation_gain += delta;
        }
    }

    let max_elevation = points
        .iter()
        .map(|tp| tp.point.elevation)
        .fold(None, |max: Option<f64>, e| {
            Some(max.map_or(e, |m| m.max(e)))
        })
        .unwrap_or(0.0);

    let duration_secs = match (
        points.iter().find_map(|tp| tp.time),
        points.iter().rev().find_map(|tp| tp.time),
    ) {
        (Some(start), Some(end)) => (end - start).num_seconds(),
        _ => 0,
    };

    TrailMetrics {
        total_distance_m: total_distance,
        elevation_gain_m: elevation_gain,
        max_elevation_m: max_elevation,
        duration_secs,
    }
}
