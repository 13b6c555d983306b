//! # Trail Store Adapter
//!
//! Mapping between the engine's types and the external trail store's record
//! shape, plus the save-hike payload handed to the external API.
//!
//! This is a pure mapping layer: the point sequence round-trips exactly
//! (order and precision preserved), nothing is invented, and fields the
//! engine does not compute (zone labels, resource ids) pass through
//! unchanged. Absent identifiers stay absent inside the model — `None` and 0
//! are different things — and only convert to 0 at the outward edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::TrailMetrics;
use crate::navigation::HikeSummary;
use crate::{GeoPoint, ParsedTrail};

/// A trail as the external store represents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailRecord {
    /// Store-assigned identifier; `None` until the record is first persisted
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub points: Vec<GeoPoint>,
    pub distance_km: f64,
    pub elevation_gain_m: f64,
    pub max_elevation_m: f64,
    pub date: Option<DateTime<Utc>>,
    pub duration_secs: i64,
    /// Externally supplied zone label, passed through unchanged
    pub zone: Option<String>,
    pub resource_id: Option<i64>,
    pub image_resource_id: Option<i64>,
}

impl TrailRecord {
    /// Build an outward record from a parsed trail and its metrics.
    ///
    /// Engine-computed fields are filled; external fields (`zone`, resource
    /// ids) are left for the caller. Points keep their parse order and
    /// precision, and no timestamps are invented: `date` is the trail's
    /// recorded start time or nothing.
    pub fn from_parsed(trail: &ParsedTrail, metrics: &TrailMetrics) -> Self {
        Self {
            id: None,
            name: trail.name.clone(),
            description: Some(trail.description.clone()),
            points: trail.geo_points(),
            distance_km: metrics.distance_km(),
            elevation_gain_m: metrics.elevation_gain_m,
            max_elevation_m: metrics.max_elevation_m,
            date: trail.start_time,
            duration_secs: metrics.duration_secs,
            zone: None,
            resource_id: None,
            image_resource_id: None,
        }
    }

    /// Identifier for outward conversion; a record not yet persisted maps
    /// to 0.
    pub fn record_id(&self) -> i64 {
        self.id.unwrap_or(0)
    }

    /// The stored point sequence as a planned route for navigation.
    pub fn planned_route(&self) -> Vec<GeoPoint> {
        self.points.clone()
    }
}

/// Select the trails belonging to a zone.
///
/// Zone labels match case-insensitively. A `None` filter selects the records
/// that carry no zone label.
pub fn filter_by_zone<'a>(records: &'a [TrailRecord], zone: Option<&str>) -> Vec<&'a TrailRecord> {
    records
        .iter()
        .filter(|r| match (&r.zone, zone) {
            (Some(have), Some(want)) => have.eq_ignore_ascii_case(want),
            (None, None) => true,
            _ => false,
        })
        .collect()
}

/// The hike-summary record sent to the external save-hike API when a
/// navigation session finishes.
///
/// The engine fills the distance/duration/elevation fields and the start/end
/// coordinates and times; the remaining fields come from contextual UI state
/// and stay empty here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveHikePayload {
    pub user_id: Option<i64>,
    pub date: DateTime<Utc>,
    pub distance_km: f64,
    pub duration_minutes: i64,
    pub elevation_gain_m: f64,
    pub start_position: Option<GeoPoint>,
    pub end_position: Option<GeoPoint>,
    pub weather_condition: Option<String>,
    pub difficulty: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_location_name: Option<String>,
    pub end_location_name: Option<String>,
}

impl SaveHikePayload {
    /// Build the payload from a finished session's summary.
    ///
    /// Elevation gain is not tracked live; callers pass it from the planned
    /// trail's metrics.
    pub fn from_summary(summary: &HikeSummary, elevation_gain_m: f64) -> Self {
        let end_time = summary.started_at + chrono::Duration::seconds(summary.duration_secs);
        Self {
            user_id: None,
            date: summary.started_at,
            distance_km: summary.distance_traveled_m / 1000.0,
            duration_minutes: summary.duration_secs / 60,
            elevation_gain_m,
            start_position: summary.start_position,
            end_position: summary.end_position,
            weather_condition: None,
            difficulty: None,
            start_time: summary.started_at,
            end_time,
            start_location_name: None,
            end_location_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute_metrics;
    use crate::TrackPoint;

    fn sample_trail() -> ParsedTrail {
        ParsedTrail {
            name: "Cabana Omu".to_string(),
            description: "Ridge ascent".to_string(),
            points: vec![
                TrackPoint::new(GeoPoint::with_elevation(45.4001, 25.4502, 1800.0), None),
                TrackPoint::new(GeoPoint::with_elevation(45.4103, 25.4504, 2100.0), None),
            ],
            source_id: "omu".to_string(),
            start_time: None,
            end_time: None,
        }
    }

    #[test]
    fn test_points_round_trip_exactly() {
        let trail = sample_trail();
        let metrics = compute_metrics(&trail);
        let record = TrailRecord::from_parsed(&trail, &metrics);

        assert_eq!(record.points.len(), trail.points.len());
        for (stored, parsed) in record.points.iter().zip(&trail.points) {
            assert_eq!(stored, &parsed.point);
        }
        assert_eq!(record.planned_route(), record.points);
    }

    #[test]
    fn test_missing_id_converts_outward_as_zero() {
        let trail = sample_trail();
        let metrics = compute_metrics(&trail);
        let mut record = TrailRecord::from_parsed(&trail, &metrics);

        assert_eq!(record.id, None);
        assert_eq!(record.record_id(), 0);

        record.id = Some(42);
        assert_eq!(record.record_id(), 42);
    }

    #[test]
    fn test_no_invented_date() {
        let trail = sample_trail();
        let metrics = compute_metrics(&trail);
        let record = TrailRecord::from_parsed(&trail, &metrics);
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_record_json_round_trip_with_date() {
        use chrono::TimeZone;

        let trail = sample_trail();
        let metrics = compute_metrics(&trail);
        let mut record = TrailRecord::from_parsed(&trail, &metrics);
        record.id = Some(7);
        record.date = Some(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
        record.zone = Some("Bucegi".to_string());

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"distanceKm\""));
        let back: TrailRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_filter_by_zone() {
        let trail = sample_trail();
        let metrics = compute_metrics(&trail);
        let mut a = TrailRecord::from_parsed(&trail, &metrics);
        a.zone = Some("Bucegi".to_string());
        let mut b = a.clone();
        b.zone = Some("Fagaras".to_string());
        let mut c = a.clone();
        c.zone = None;
        let records = vec![a, b, c];

        let bucegi = filter_by_zone(&records, Some("bucegi"));
        assert_eq!(bucegi.len(), 1);
        assert_eq!(bucegi[0].zone.as_deref(), Some("Bucegi"));

        let unzoned = filter_by_zone(&records, None);
        assert_eq!(unzoned.len(), 1);
        assert_eq!(unzoned[0].zone, None);
    }
}
