//! Terrestrial disaster and near-Earth-object approach records.
//!
//! Records are validated when constructed or deserialized, so the
//! correlation and matching engines never see NaN magnitudes or
//! out-of-range coordinates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::geo::GeoPoint;

/// Category of a terrestrial event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Earthquake,
    Volcano,
    Tsunami,
    Hurricane,
    Flood,
    Wildfire,
    Tornado,
    Landslide,
}

/// All event types in declaration order.
pub const ALL_EVENT_TYPES: [EventType; 8] = [
    EventType::Earthquake,
    EventType::Volcano,
    EventType::Tsunami,
    EventType::Hurricane,
    EventType::Flood,
    EventType::Wildfire,
    EventType::Tornado,
    EventType::Landslide,
];

impl EventType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Earthquake => "earthquake",
            Self::Volcano => "volcano",
            Self::Tsunami => "tsunami",
            Self::Hurricane => "hurricane",
            Self::Flood => "flood",
            Self::Wildfire => "wildfire",
            Self::Tornado => "tornado",
            Self::Landslide => "landslide",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A terrestrial disaster event (earthquake, eruption, storm...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDisasterEvent")]
pub struct DisasterEvent {
    pub id: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    /// Magnitude or severity on the source's scale (Richter, VEI, category).
    pub magnitude: f64,
    pub location: Option<GeoPoint>,
}

#[derive(Deserialize)]
struct RawDisasterEvent {
    id: String,
    event_type: EventType,
    timestamp: DateTime<Utc>,
    magnitude: f64,
    #[serde(default)]
    location: Option<GeoPoint>,
}

impl TryFrom<RawDisasterEvent> for DisasterEvent {
    type Error = EventError;

    fn try_from(raw: RawDisasterEvent) -> Result<Self, Self::Error> {
        let event = Self::new(raw.id, raw.event_type, raw.timestamp, raw.magnitude)?;
        Ok(match raw.location {
            Some(loc) => event.with_location(loc),
            None => event,
        })
    }
}

impl DisasterEvent {
    pub fn new(
        id: impl Into<String>,
        event_type: EventType,
        timestamp: DateTime<Utc>,
        magnitude: f64,
    ) -> Result<Self, EventError> {
        let id = id.into();
        if id.is_empty() {
            return Err(EventError::EmptyId);
        }
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(EventError::InvalidMagnitude(magnitude));
        }
        Ok(Self {
            id,
            event_type,
            timestamp,
            magnitude,
            location: None,
        })
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }
}

/// A near-Earth-object close approach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCloseApproach")]
pub struct CloseApproach {
    pub id: String,
    pub object_name: String,
    pub timestamp: DateTime<Utc>,
    /// Nominal miss distance in astronomical units.
    pub miss_distance_au: f64,
    pub relative_velocity_km_s: Option<f64>,
}

#[derive(Deserialize)]
struct RawCloseApproach {
    id: String,
    object_name: String,
    timestamp: DateTime<Utc>,
    miss_distance_au: f64,
    #[serde(default)]
    relative_velocity_km_s: Option<f64>,
}

impl TryFrom<RawCloseApproach> for CloseApproach {
    type Error = EventError;

    fn try_from(raw: RawCloseApproach) -> Result<Self, Self::Error> {
        let approach = Self::new(raw.id, raw.object_name, raw.timestamp, raw.miss_distance_au)?;
        Ok(Self {
            relative_velocity_km_s: raw.relative_velocity_km_s,
            ..approach
        })
    }
}

impl CloseApproach {
    pub fn new(
        id: impl Into<String>,
        object_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        miss_distance_au: f64,
    ) -> Result<Self, EventError> {
        let id = id.into();
        if id.is_empty() {
            return Err(EventError::EmptyId);
        }
        if !miss_distance_au.is_finite() || miss_distance_au < 0.0 {
            return Err(EventError::InvalidDistance(miss_distance_au));
        }
        Ok(Self {
            id,
            object_name: object_name.into(),
            timestamp,
            miss_distance_au,
            relative_velocity_km_s: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 7, 10, 0).unwrap()
    }

    #[test]
    fn disaster_rejects_bad_magnitude() {
        assert_eq!(
            DisasterEvent::new("q1", EventType::Earthquake, ts(), -1.0),
            Err(EventError::InvalidMagnitude(-1.0))
        );
        assert!(DisasterEvent::new("q1", EventType::Earthquake, ts(), f64::INFINITY).is_err());
        assert_eq!(
            DisasterEvent::new("", EventType::Earthquake, ts(), 5.0),
            Err(EventError::EmptyId)
        );
    }

    #[test]
    fn approach_rejects_negative_distance() {
        assert_eq!(
            CloseApproach::new("a1", "2024 AB", ts(), -0.01),
            Err(EventError::InvalidDistance(-0.01))
        );
    }

    #[test]
    fn disaster_from_json() {
        let json = r#"{
            "id": "us7000lsze",
            "event_type": "earthquake",
            "timestamp": "2024-01-01T07:10:09Z",
            "magnitude": 7.5,
            "location": {"latitude_deg": 37.49, "longitude_deg": 137.27}
        }"#;
        let event: DisasterEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, EventType::Earthquake);
        assert_eq!(event.magnitude, 7.5);
        assert!(event.location.is_some());
    }

    #[test]
    fn disaster_json_is_validated() {
        let json = r#"{
            "id": "x",
            "event_type": "flood",
            "timestamp": "2024-01-01T00:00:00Z",
            "magnitude": -3.0
        }"#;
        assert!(serde_json::from_str::<DisasterEvent>(json).is_err());
    }

    #[test]
    fn approach_from_json_keeps_velocity() {
        let json = r#"{
            "id": "54509",
            "object_name": "2024 MK",
            "timestamp": "2024-06-29T13:46:00Z",
            "miss_distance_au": 0.00197,
            "relative_velocity_km_s": 9.3
        }"#;
        let approach: CloseApproach = serde_json::from_str(json).unwrap();
        assert_eq!(approach.relative_velocity_km_s, Some(9.3));
    }
}
