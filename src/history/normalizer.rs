use chrono::NaiveDateTime;

use super::record::{ActivitySegment, Location, PlaceVisit, RawSubRecord, RecordError};

pub const UNKNOWN: &str = "Unknown";
pub const ACTIVITY_START: &str = "Start of activity";
pub const ACTIVITY_END: &str = "End of activity";

// Tried in order after the trailing 'Z' is stripped.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A single normalized point of the location history.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub place_name: String,
    pub address: String,
}

/// Parses an export timestamp as an offset-naive local date-time.
///
/// A single trailing `Z` is dropped rather than interpreted, so every point
/// lives on the same naive timeline regardless of its original offset.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, RecordError> {
    let trimmed = raw.strip_suffix('Z').unwrap_or(raw);

    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            RecordError::invalid("timestamp", format!("invalid isoformat string: '{raw}'"))
        })
}

/// Converts one classified timeline item into zero, one or two points.
///
/// Any condition raised while building a point discards the whole item.
pub fn normalize(record: &RawSubRecord) -> Result<Vec<GeoPoint>, RecordError> {
    match record {
        RawSubRecord::PlaceVisit(visit) => normalize_visit(visit),
        RawSubRecord::ActivitySegment(segment) => normalize_segment(segment),
    }
}

fn normalize_visit(visit: &PlaceVisit) -> Result<Vec<GeoPoint>, RecordError> {
    let location = visit
        .location
        .as_ref()
        .ok_or_else(|| RecordError::MissingKey("location".to_string()))?;
    let Some(timestamp) = visit.start_timestamp() else {
        return Ok(Vec::new());
    };

    Ok(vec![GeoPoint {
        timestamp: parse_timestamp(timestamp)?,
        latitude: location.latitude()?,
        longitude: location.longitude()?,
        place_name: location.name.as_deref().unwrap_or(UNKNOWN).to_string(),
        address: location.address.as_deref().unwrap_or(UNKNOWN).to_string(),
    }])
}

fn normalize_segment(segment: &ActivitySegment) -> Result<Vec<GeoPoint>, RecordError> {
    let sides = [
        (segment.start_timestamp(), &segment.start_location, ACTIVITY_START),
        (segment.end_timestamp(), &segment.end_location, ACTIVITY_END),
    ];

    let mut points = Vec::with_capacity(2);
    for (timestamp, location, label) in sides {
        if let Some(point) = endpoint(timestamp, location.as_ref(), label)? {
            points.push(point);
        }
    }

    Ok(points)
}

fn endpoint(
    timestamp: Option<&str>,
    location: Option<&Location>,
    label: &str,
) -> Result<Option<GeoPoint>, RecordError> {
    let (Some(timestamp), Some(location)) = (timestamp, location) else {
        return Ok(None);
    };
    if location.is_empty() {
        return Ok(None);
    }

    Ok(Some(GeoPoint {
        timestamp: parse_timestamp(timestamp)?,
        latitude: location.latitude()?,
        longitude: location.longitude()?,
        place_name: label.to_string(),
        address: UNKNOWN.to_string(),
    }))
}
