//! Full engine pipeline: GPX document -> metrics -> stored record -> navigation

use chrono::{Duration, Utc};
use trail_engine::{
    compute_metrics, filter_by_zone, parse_gpx_str, PositionFix, RouteProgressTracker,
    SaveHikePayload, TrailRecord,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const GPX: &str = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="hiking-app">
  <trk>
    <name>Jepii Mici</name>
    <desc>Steep ascent from Busteni</desc>
    <trkseg>
      <trkpt lat="45.40" lon="25.53"><ele>900.0</ele><time>2024-06-01T08:00:00Z</time></trkpt>
      <trkpt lat="45.41" lon="25.52"><ele>1250.0</ele><time>2024-06-01T09:00:00Z</time></trkpt>
      <trkpt lat="45.42" lon="25.51"><ele>1180.0</ele><time>2024-06-01T09:40:00Z</time></trkpt>
      <trkpt lat="45.43" lon="25.50"><ele>1950.0</ele><time>2024-06-01T11:00:00Z</time></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

#[test]
fn test_parse_to_record() {
    init();
    let trail = parse_gpx_str(GPX, "jepii-mici").unwrap();
    assert_eq!(trail.points.len(), 4);

    let metrics = compute_metrics(&trail);
    // +350 and +770; the 70 m descent is ignored
    assert_eq!(metrics.elevation_gain_m, 1120.0);
    assert_eq!(metrics.max_elevation_m, 1950.0);
    assert_eq!(metrics.duration_secs, 3 * 3600);
    assert!(metrics.total_distance_m > 3000.0);

    let mut record = TrailRecord::from_parsed(&trail, &metrics);
    assert_eq!(record.name, "Jepii Mici");
    assert_eq!(record.description.as_deref(), Some("Steep ascent from Busteni"));
    assert_eq!(record.points.len(), 4);
    assert!((record.distance_km * 1000.0 - metrics.total_distance_m).abs() < 1e-9);
    assert_eq!(record.record_id(), 0);

    record.zone = Some("Bucegi".to_string());
    let records = vec![record];
    assert_eq!(filter_by_zone(&records, Some("BUCEGI")).len(), 1);
    assert_eq!(filter_by_zone(&records, Some("Fagaras")).len(), 0);
}

#[test]
fn test_record_to_navigation_to_payload() {
    init();
    let trail = parse_gpx_str(GPX, "jepii-mici").unwrap();
    let metrics = compute_metrics(&trail);
    let record = TrailRecord::from_parsed(&trail, &metrics);

    let route = record.planned_route();
    let started_at = Utc::now();

    let mut tracker = RouteProgressTracker::new();
    tracker.start_session(route.clone(), started_at).unwrap();
    assert!((tracker.total_route_length_m() - metrics.total_distance_m).abs() < 1e-9);

    for (i, point) in route.iter().enumerate() {
        let fix = PositionFix::with_elevation(
            point.latitude,
            point.longitude,
            point.elevation,
            started_at + Duration::seconds(i as i64 * 600),
        );
        tracker.on_position_update(&fix).unwrap();
    }

    let summary = tracker.finish_session().unwrap();
    assert_eq!(summary.duration_secs, 1800);
    assert_eq!(summary.final_elevation_m, 1950.0);

    let payload = SaveHikePayload::from_summary(&summary, metrics.elevation_gain_m);
    assert_eq!(payload.duration_minutes, 30);
    assert_eq!(payload.elevation_gain_m, 1120.0);
    assert_eq!(payload.start_time, started_at);
    assert_eq!(payload.end_time, started_at + Duration::seconds(1800));
    assert!(payload.user_id.is_none());

    // Boundary types serialize to camelCase JSON for the app layer
    let json = serde_json::to_string(&payload).unwrap();
    assert!(json.contains("\"distanceKm\""));
    assert!(json.contains("\"durationMinutes\""));
}
