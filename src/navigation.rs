//! # Navigation Session Tracking
//!
//! Live progress state machine for one active hike.
//!
//! A [`RouteProgressTracker`] owns the state of a single navigation session:
//! `Idle → Active → Finished`. Position fixes arrive at irregular intervals
//! from the platform's location source; each update is pure arithmetic on
//! in-memory state and never blocks. The tracker is not internally locked —
//! exactly one session is active at a time and callers serialize lifecycle
//! calls (one mutex around the tracker, or confinement to one event thread).
//!
//! The presentation layer consumes the [`ProgressSnapshot`] returned by each
//! update (or polls [`RouteProgressTracker::snapshot`]); on finish, the
//! [`HikeSummary`] is packaged by the caller into a save-hike payload.

use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrailError};
use crate::geo_utils::haversine_distance;
use crate::GeoPoint;

/// Lifecycle state of a navigation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    Active,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Active => write!(f, "active"),
            SessionState::Finished => write!(f, "finished"),
        }
    }
}

/// One live position fix from the location source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters, when the fix carries one
    pub elevation: Option<f64>,
    pub time: DateTime<Utc>,
}

impl PositionFix {
    pub fn new(latitude: f64, longitude: f64, time: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
            time,
        }
    }

    pub fn with_elevation(latitude: f64, longitude: f64, elevation: f64, time: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            elevation: Some(elevation),
            time,
        }
    }

    fn geo_point(&self) -> GeoPoint {
        GeoPoint::with_elevation(self.latitude, self.longitude, self.elevation.unwrap_or(0.0))
    }
}

/// Progress of the active session, rendered by the live map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Monotonically non-decreasing; GPS jitter is accepted as measurement
    /// noise rather than filtered
    pub distance_traveled_m: f64,
    /// Monotonically non-increasing, never below 0
    pub distance_remaining_m: f64,
    /// 0-100, derived from remaining distance against the planned length
    pub progress_percent: f64,
    pub current_elevation_m: f64,
    pub elapsed_ms: i64,
}

/// Final summary of a finished session, for external persistence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HikeSummary {
    pub distance_traveled_m: f64,
    pub duration_secs: i64,
    /// 0 when the session had no measurable duration
    pub average_speed_mps: f64,
    pub final_elevation_m: f64,
    pub started_at: DateTime<Utc>,
    /// First point of the planned route
    pub start_position: Option<GeoPoint>,
    /// Last position fix received
    pub end_position: Option<GeoPoint>,
}

/// Stateful tracker for one navigation session.
///
/// # Example
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use trail_engine::{GeoPoint, PositionFix, RouteProgressTracker};
///
/// let route = vec![GeoPoint::new(45.0, 25.0), GeoPoint::new(45.01, 25.0)];
/// let start = Utc::now();
///
/// let mut tracker = RouteProgressTracker::new();
/// tracker.start_session(route, start).unwrap();
///
/// let fix = PositionFix::new(45.0, 25.0, start + Duration::seconds(5));
/// let snapshot = tracker.on_position_update(&fix).unwrap();
/// assert_eq!(snapshot.distance_traveled_m, 0.0);
///
/// let summary = tracker.finish_session().unwrap();
/// assert_eq!(summary.duration_secs, 5);
/// ```
#[derive(Debug)]
pub struct RouteProgressTracker {
    state: SessionState,
    route: Vec<GeoPoint>,
    /// suffix_lengths[i] = planned length from route[i] to the route end
    suffix_lengths: Vec<f64>,
    /// Index of the nearest upcoming route point; only moves forward
    cursor: usize,
    total_route_length_m: f64,
    distance_traveled_m: f64,
    distance_remaining_m: f64,
    current_elevation_m: f64,
    elapsed_ms: i64,
    last_position: Option<GeoPoint>,
    started_at: Option<DateTime<Utc>>,
}

impl RouteProgressTracker {
    /// Create a tracker with no session (`Idle`).
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            route: Vec::new(),
            suffix_lengths: Vec::new(),
            cursor: 0,
            total_route_length_m: 0.0,
            distance_traveled_m: 0.0,
            distance_remaining_m: 0.0,
            current_elevation_m: 0.0,
            elapsed_ms: 0,
            last_position: None,
            started_at: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn total_route_length_m(&self) -> f64 {
        self.total_route_length_m
    }

    /// Start a session against a planned route: `Idle → Active`.
    ///
    /// Captures the route and the session start time, and resets progress to
    /// (traveled 0, remaining = total route length).
    pub fn start_session(&mut self, route: Vec<GeoPoint>, started_at: DateTime<Utc>) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(TrailError::InvalidSessionState {
                operation: "start a session",
                state: self.state.to_string(),
            });
        }
        if route.is_empty() {
            return Err(TrailError::EmptyRoute);
        }

        let suffix_lengths = suffix_lengths(&route);
        let total = suffix_lengths[0];

        info!(
            "[Navigation] Session started: {} route points, {:.0} m planned",
            route.len(),
            total
        );

        self.route = route;
        self.suffix_lengths = suffix_lengths;
        self.cursor = 0;
        self.total_route_length_m = total;
        self.distance_traveled_m = 0.0;
        self.distance_remaining_m = total;
        self.current_elevation_m = 0.0;
        self.elapsed_ms = 0;
        self.last_position = None;
        self.started_at = Some(started_at);
        self.state = SessionState::Active;
        Ok(())
    }

    /// Start a session with the current wall-clock time.
    pub fn start_session_now(&mut self, route: Vec<GeoPoint>) -> Result<()> {
        self.start_session(route, Utc::now())
    }

    /// Process one position fix: `Active` only.
    ///
    /// Remaining distance is route-aware: the haversine distance from the fix
    /// to the nearest upcoming route point plus the planned length beyond it.
    /// The upcoming-point cursor only moves forward, and remaining distance
    /// never increases and never drops below zero.
    pub fn on_position_update(&mut self, fix: &PositionFix) -> Result<ProgressSnapshot> {
        if self.state != SessionState::Active {
            return Err(TrailError::InvalidSessionState {
                operation: "update position",
                state: self.state.to_string(),
            });
        }

        let position = fix.geo_point();

        if let Some(last) = self.last_position {
            self.distance_traveled_m += haversine_distance(&last, &position);
        }

        self.advance_cursor(&position);
        let to_route = haversine_distance(&position, &self.route[self.cursor]);
        let remaining = to_route + self.suffix_lengths[self.cursor];
        self.distance_remaining_m = remaining.min(self.distance_remaining_m).max(0.0);

        if let Some(elevation) = fix.elevation {
            self.current_elevation_m = elevation;
        }

        if let Some(started_at) = self.started_at {
            self.elapsed_ms = (fix.time - started_at).num_milliseconds().max(0);
        }

        self.last_position = Some(position);

        let snapshot = self.snapshot();
        debug!(
            "[Navigation] Fix processed: {:.0} m traveled, {:.0} m remaining ({:.1}%)",
            snapshot.distance_traveled_m, snapshot.distance_remaining_m, snapshot.progress_percent
        );
        Ok(snapshot)
    }

    /// Current progress numbers, regardless of state.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            distance_traveled_m: self.distance_traveled_m,
            distance_remaining_m: self.distance_remaining_m,
            progress_percent: self.progress_percent(),
            current_elevation_m: self.current_elevation_m,
            elapsed_ms: self.elapsed_ms,
        }
    }

    /// Finish the session: `Active → Finished`, returning the final summary.
    ///
    /// Calling this again — or before a session started — is a usage error.
    pub fn finish_session(&mut self) -> Result<HikeSummary> {
        if self.state != SessionState::Active {
            return Err(TrailError::InvalidSessionState {
                operation: "finish a session",
                state: self.state.to_string(),
            });
        }

        let duration_secs = self.elapsed_ms / 1000;
        let average_speed_mps = if duration_secs > 0 {
            self.distance_traveled_m / duration_secs as f64
        } else {
            0.0
        };

        self.state = SessionState::Finished;

        let summary = HikeSummary {
            distance_traveled_m: self.distance_traveled_m,
            duration_secs,
            average_speed_mps,
            final_elevation_m: self.current_elevation_m,
            started_at: self.started_at.unwrap_or_else(Utc::now),
            start_position: self.route.first().copied(),
            end_position: self.last_position,
        };

        info!(
            "[Navigation] Session finished: {:.0} m in {} s",
            summary.distance_traveled_m, summary.duration_secs
        );
        Ok(summary)
    }

    /// Abandon whatever the tracker holds and return to `Idle`.
    pub fn reset(&mut self) {
        if self.state != SessionState::Idle {
            info!("[Navigation] Session reset from {}", self.state);
        }
        *self = Self::new();
    }

    /// Percentage of the planned route completed, 0-100.
    fn progress_percent(&self) -> f64 {
        if self.total_route_length_m <= 0.0 {
            return 0.0;
        }
        let done = self.total_route_length_m - self.distance_remaining_m;
        (done / self.total_route_length_m * 100.0).clamp(0.0, 100.0)
    }

    /// Move the cursor to the nearest route point at or after its current
    /// position. Never moves backwards, so a fix drifting behind the route
    /// cannot un-complete progress.
    fn advance_cursor(&mut self, position: &GeoPoint) {
        let mut best = self.cursor;
        let mut best_dist = haversine_distance(position, &self.route[self.cursor]);
        for (offset, point) in self.route[self.cursor..].iter().enumerate().skip(1) {
            let d = haversine_distance(position, point);
            if d < best_dist {
                best_dist = d;
                best = self.cursor + offset;
            }
        }
        self.cursor = best;
    }
}

impl Default for RouteProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Planned length from each route point to the route end.
/// The first entry is the total route length.
fn suffix_lengths(route: &[GeoPoint]) -> Vec<f64> {
    let mut lengths = vec![0.0; route.len()];
    for i in (0..route.len().saturating_sub(1)).rev() {
        lengths[i] = lengths[i + 1] + haversine_distance(&route[i], &route[i + 1]);
    }
    lengths
}
