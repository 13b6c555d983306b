//! # GPX Parsing
//!
//! Streaming single-pass GPX parser producing a [`ParsedTrail`].
//!
//! The parser reads `trkpt` elements (falling back to `wpt` waypoints when a
//! document carries no track points), requiring numeric `lat`/`lon` attributes
//! and honoring optional `ele`/`time` children. Malformed individual points
//! are dropped and parsing continues; only a document that cannot be read as
//! GPX at all fails the parse. Callers must treat that failure as distinct
//! from a successfully parsed trail with zero points.
//!
//! The input reader is consumed by value and dropped on every exit path,
//! success or failure.

use std::io::BufRead;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, TrailError};
use crate::{GeoPoint, ParsedTrail, TrackPoint, DEFAULT_TRAIL_DESCRIPTION, DEFAULT_TRAIL_NAME};

/// Timestamp format used by GPX `<time>` elements.
const GPX_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Which point element a scratch state belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PointKind {
    Track,
    Waypoint,
}

impl PointKind {
    fn tag(self) -> &'static [u8] {
        match self {
            PointKind::Track => b"trkpt",
            PointKind::Waypoint => b"wpt",
        }
    }
}

/// Pending state while inside a point element.
struct Scratch {
    kind: PointKind,
    /// Captured lat/lon attributes; `None` means the point is already
    /// condemned (missing or non-numeric coordinates) but its children still
    /// have to be consumed.
    coords: Option<(f64, f64)>,
    elevation: f64,
    time: Option<DateTime<Utc>>,
}

/// Which text-bearing element is currently being captured.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Capture {
    Elevation,
    Time,
    Name,
    Description,
}

impl Capture {
    fn tag(self) -> &'static [u8] {
        match self {
            Capture::Elevation => b"ele",
            Capture::Time => b"time",
            Capture::Name => b"name",
            Capture::Description => b"desc",
        }
    }
}

/// Parse a GPX document from a string.
///
/// See [`parse_gpx`] for the parsing contract.
pub fn parse_gpx_str(xml: &str, source_id: &str) -> Result<ParsedTrail> {
    parse_gpx(xml.as_bytes(), source_id)
}

/// Parse a GPX document from a reader into a [`ParsedTrail`].
///
/// Single streaming pass. `trkpt` points are the primary kind; when a document
/// yields none, its `wpt` waypoints are used instead (a document commonly
/// carries one or the other). Points missing a numeric `lat`/`lon` or lying
/// outside WGS84 bounds are dropped individually. Trail-level `name`/`desc`
/// elements are only honored outside a point context, first occurrence wins.
///
/// # Errors
///
/// [`TrailError::UnreadableDocument`] when the input is not XML, is truncated
/// mid-structure, or has no `gpx` root element. A readable document with zero
/// valid points is *not* an error.
pub fn parse_gpx<R: BufRead>(reader: R, source_id: &str) -> Result<ParsedTrail> {
    let mut xml = Reader::from_reader(reader);
    let mut buf = Vec::new();

    let mut saw_root = false;
    let mut track_points: Vec<TrackPoint> = Vec::new();
    let mut waypoints: Vec<TrackPoint> = Vec::new();
    let mut dropped = 0usize;

    let mut name: Option<String> = None;
    let mut description: Option<String> = None;

    let mut scratch: Option<Scratch> = None;
    let mut capture: Option<Capture> = None;
    let mut text = String::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"gpx" => saw_root = true,
                b"trkpt" if scratch.is_none() => {
                    scratch = Some(open_point(&e, PointKind::Track));
                }
                b"wpt" if scratch.is_none() => {
                    scratch = Some(open_point(&e, PointKind::Waypoint));
                }
                b"ele" if scratch.is_some() => {
                    capture = Some(Capture::Elevation);
                    text.clear();
                }
                b"time" if scratch.is_some() => {
                    capture = Some(Capture::Time);
                    text.clear();
                }
                // Trail metadata is only honored outside a point context;
                // a label nested inside a point is not the trail's name.
                b"name" if scratch.is_none() && name.is_none() => {
                    capture = Some(Capture::Name);
                    text.clear();
                }
                b"desc" if scratch.is_none() && description.is_none() => {
                    capture = Some(Capture::Description);
                    text.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"gpx" => saw_root = true,
                b"trkpt" => {
                    commit_point(open_point(&e, PointKind::Track), &mut track_points, &mut dropped)
                }
                b"wpt" => {
                    commit_point(open_point(&e, PointKind::Waypoint), &mut waypoints, &mut dropped)
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if capture.is_some() {
                    text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
                }
            }
            Ok(Event::CData(e)) => {
                if capture.is_some() {
                    text.push_str(std::str::from_utf8(e.as_ref()).unwrap_or_default());
                }
            }
            Ok(Event::GeneralRef(e)) => {
                // Character references and predefined entities inside names
                if capture.is_some() {
                    if let Ok(Some(ch)) = e.resolve_char_ref() {
                        text.push(ch);
                    } else {
                        match std::str::from_utf8(e.as_ref()).unwrap_or_default() {
                            "amp" => text.push('&'),
                            "lt" => text.push('<'),
                            "gt" => text.push('>'),
                            "quot" => text.push('"'),
                            "apos" => text.push('\''),
                            _ => {}
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                if let Some(c) = capture {
                    if e.local_name().as_ref() == c.tag() {
                        match c {
                            Capture::Elevation => {
                                if let Some(s) = scratch.as_mut() {
                                    // Malformed elevation defaults to 0
                                    s.elevation = text.trim().parse::<f64>().unwrap_or(0.0);
                                }
                            }
                            Capture::Time => {
                                if let Some(s) = scratch.as_mut() {
                                    s.time = parse_gpx_time(&text);
                                }
                            }
                            Capture::Name => name = Some(text.trim().to_string()),
                            Capture::Description => description = Some(text.trim().to_string()),
                        }
                        capture = None;
                        text.clear();
                    }
                }

                if let Some(s) = scratch.take() {
                    if e.local_name().as_ref() == s.kind.tag() {
                        let out = match s.kind {
                            PointKind::Track => &mut track_points,
                            PointKind::Waypoint => &mut waypoints,
                        };
                        commit_point(s, out, &mut dropped);
                    } else {
                        scratch = Some(s);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!("[Gpx] Unreadable document '{}': {}", source_id, e);
                return Err(TrailError::UnreadableDocument {
                    source_id: source_id.to_string(),
                    message: e.to_string(),
                });
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(TrailError::UnreadableDocument {
            source_id: source_id.to_string(),
            message: "no <gpx> root element".to_string(),
        });
    }

    let points = if !track_points.is_empty() {
        track_points
    } else {
        if !waypoints.is_empty() {
            debug!(
                "[Gpx] '{}' has no track points, using {} waypoints",
                source_id,
                waypoints.len()
            );
        }
        waypoints
    };

    let start_time = points.iter().find_map(|tp| tp.time);
    let end_time = points.iter().rev().find_map(|tp| tp.time);

    info!(
        "[Gpx] Parsed '{}': {} points, {} dropped",
        source_id,
        points.len(),
        dropped
    );

    Ok(ParsedTrail {
        name: non_empty_or(name, DEFAULT_TRAIL_NAME),
        description: non_empty_or(description, DEFAULT_TRAIL_DESCRIPTION),
        points,
        source_id: source_id.to_string(),
        start_time,
        end_time,
    })
}

/// Begin scratch state for a point element, capturing its lat/lon attributes.
fn open_point(e: &BytesStart<'_>, kind: PointKind) -> Scratch {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr in e.attributes().flatten() {
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = val.trim().parse::<f64>().ok(),
            b"lon" => lon = val.trim().parse::<f64>().ok(),
            _ => {}
        }
    }

    Scratch {
        kind,
        coords: lat.zip(lon),
        elevation: 0.0,
        time: None,
    }
}

/// Append the scratch point to the output, or drop it when its coordinates
/// are missing or out of WGS84 range.
fn commit_point(scratch: Scratch, out: &mut Vec<TrackPoint>, dropped: &mut usize) {
    match scratch.coords {
        Some((lat, lon)) => {
            let point = GeoPoint::with_elevation(lat, lon, scratch.elevation);
            if point.is_valid() {
                out.push(TrackPoint::new(point, scratch.time));
            } else {
                debug!("[Gpx] Dropping point out of range: ({}, {})", lat, lon);
                *dropped += 1;
            }
        }
        None => {
            debug!("[Gpx] Dropping point with missing coordinates");
            *dropped += 1;
        }
    }
}

/// Parse a GPX `<time>` value (`yyyy-MM-dd'T'HH:mm:ss'Z'`, with RFC3339
/// accepted as a fallback). Malformed timestamps are ignored.
fn parse_gpx_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = NaiveDateTime::parse_from_str(s, GPX_TIME_FORMAT) {
        return Some(t.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(s) if !s.is_empty() => s,
        _ => default.to_string(),
    }
}
