// Timeline Record Module
// Decodes the `timelineObjects` entries of a Semantic Location History month
// file into place visits and activity segments.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Fixed-point scale of the `latitudeE7` / `longitudeE7` fields.
pub const E7_SCALE: f64 = 10_000_000.0;

/// Reasons a single timeline item is skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("missing key '{0}'")]
    MissingKey(String),

    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

impl RecordError {
    pub fn invalid(key: &str, reason: impl Into<String>) -> Self {
        RecordError::InvalidValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// A location object as found in the export. Coordinates stay optional so
/// that their absence is only reported when a point is built from it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude_e7: Option<i64>,
    pub longitude_e7: Option<i64>,
    pub name: Option<String>,
    pub address: Option<String>,
    // placeId, sourceInfo, ... only matter for the emptiness check
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Location {
    pub fn is_empty(&self) -> bool {
        self.latitude_e7.is_none()
            && self.longitude_e7.is_none()
            && self.name.is_none()
            && self.address.is_none()
            && self.other.is_empty()
    }

    pub fn latitude(&self) -> Result<f64, RecordError> {
        e7_degrees(self.latitude_e7, "latitudeE7")
    }

    pub fn longitude(&self) -> Result<f64, RecordError> {
        e7_degrees(self.longitude_e7, "longitudeE7")
    }
}

fn e7_degrees(fixed: Option<i64>, key: &str) -> Result<f64, RecordError> {
    fixed
        .map(|fixed| fixed as f64 / E7_SCALE)
        .ok_or_else(|| RecordError::MissingKey(key.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duration {
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
}

impl Duration {
    // Empty strings count as absent, the export occasionally carries them.
    pub fn start(&self) -> Option<&str> {
        self.start_timestamp.as_deref().filter(|s| !s.is_empty())
    }

    pub fn end(&self) -> Option<&str> {
        self.end_timestamp.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceVisit {
    pub location: Option<Location>,
    pub duration: Option<Duration>,
}

impl PlaceVisit {
    pub fn start_timestamp(&self) -> Option<&str> {
        self.duration.as_ref().and_then(Duration::start)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySegment {
    pub start_location: Option<Location>,
    pub end_location: Option<Location>,
    pub duration: Option<Duration>,
}

impl ActivitySegment {
    pub fn start_timestamp(&self) -> Option<&str> {
        self.duration.as_ref().and_then(Duration::start)
    }

    pub fn end_timestamp(&self) -> Option<&str> {
        self.duration.as_ref().and_then(Duration::end)
    }
}

/// One classified entry of `timelineObjects`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSubRecord {
    PlaceVisit(PlaceVisit),
    ActivitySegment(ActivitySegment),
}

impl RawSubRecord {
    /// Classifies a timeline item. Items that are neither a place visit nor an
    /// activity segment yield `Ok(None)`.
    pub fn from_value(item: &Value) -> Result<Option<Self>, RecordError> {
        if let Some(visit) = item.get("placeVisit") {
            return Ok(Some(RawSubRecord::PlaceVisit(decode(visit, "placeVisit")?)));
        }

        if let Some(segment) = item.get("activitySegment") {
            return Ok(Some(RawSubRecord::ActivitySegment(decode(
                segment,
                "activitySegment",
            )?)));
        }

        Ok(None)
    }
}

fn decode<T: DeserializeOwned>(value: &Value, key: &str) -> Result<T, RecordError> {
    serde_json::from_value(value.clone()).map_err(|e| RecordError::invalid(key, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_place_visit() {
        let item = json!({
            "placeVisit": {
                "location": {"latitudeE7": 407128000, "longitudeE7": -740060000, "name": "Office"},
                "duration": {"startTimestamp": "2023-06-01T12:00:00Z"}
            }
        });

        let Some(RawSubRecord::PlaceVisit(visit)) = RawSubRecord::from_value(&item).unwrap() else {
            panic!("expected a place visit");
        };
        assert_eq!(visit.start_timestamp(), Some("2023-06-01T12:00:00Z"));
        let location = visit.location.unwrap();
        assert_eq!(location.latitude().unwrap(), 40.7128);
        assert_eq!(location.longitude().unwrap(), -74.006);
        assert_eq!(location.name.as_deref(), Some("Office"));
        assert_eq!(location.address, None);
    }

    #[test]
    fn test_classify_activity_segment() {
        let item = json!({
            "activitySegment": {
                "startLocation": {"latitudeE7": 1, "longitudeE7": 2},
                "endLocation": {},
                "duration": {"startTimestamp": "2023-06-01T13:00:00Z"},
                "activityType": "WALKING"
            }
        });

        let Some(RawSubRecord::ActivitySegment(segment)) =
            RawSubRecord::from_value(&item).unwrap()
        else {
            panic!("expected an activity segment");
        };
        assert!(!segment.start_location.as_ref().unwrap().is_empty());
        assert!(segment.end_location.as_ref().unwrap().is_empty());
        assert_eq!(segment.end_timestamp(), None);
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(RawSubRecord::from_value(&json!({"other": {}})).unwrap(), None);
        assert_eq!(RawSubRecord::from_value(&json!(42)).unwrap(), None);
    }

    #[test]
    fn test_empty_and_null_timestamps_are_absent() {
        let item = json!({
            "activitySegment": {
                "startLocation": null,
                "duration": {"startTimestamp": "", "endTimestamp": null}
            }
        });

        let Some(RawSubRecord::ActivitySegment(segment)) =
            RawSubRecord::from_value(&item).unwrap()
        else {
            panic!("expected an activity segment");
        };
        assert_eq!(segment.start_location, None);
        assert_eq!(segment.start_timestamp(), None);
        assert_eq!(segment.end_timestamp(), None);
    }

    #[test]
    fn test_non_string_timestamp_is_invalid() {
        let item = json!({
            "placeVisit": {"location": {}, "duration": {"startTimestamp": 1685620800}}
        });
        assert!(matches!(
            RawSubRecord::from_value(&item),
            Err(RecordError::InvalidValue { key, .. }) if key == "placeVisit"
        ));
    }

    #[test]
    fn test_non_numeric_coordinate_is_invalid() {
        let item = json!({
            "activitySegment": {"startLocation": {"latitudeE7": "north", "longitudeE7": 2}}
        });
        assert!(matches!(
            RawSubRecord::from_value(&item),
            Err(RecordError::InvalidValue { key, .. }) if key == "activitySegment"
        ));
    }

    #[test]
    fn test_location_emptiness_counts_unknown_fields() {
        let location: Location = serde_json::from_value(json!({"placeId": "abc"})).unwrap();
        assert!(!location.is_empty());
        assert_eq!(
            location.latitude(),
            Err(RecordError::MissingKey("latitudeE7".to_string()))
        );
        assert!(Location::default().is_empty());
    }
}
