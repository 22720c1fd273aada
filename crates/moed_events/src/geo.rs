//! Geographic points and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// IUGG mean Earth radius in km.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0088;

/// A validated geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    /// Latitude in degrees, north positive. Range: [-90, 90].
    pub latitude_deg: f64,
    /// Longitude in degrees, east positive. Range: [-180, 180].
    pub longitude_deg: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    latitude_deg: f64,
    longitude_deg: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = EventError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.latitude_deg, raw.longitude_deg)
    }
}

impl GeoPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Result<Self, EventError> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(EventError::InvalidLatitude(latitude_deg));
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(EventError::InvalidLongitude(longitude_deg));
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
        })
    }

    /// Great-circle distance to `other` in km (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.latitude_deg.to_radians();
        let phi2 = other.latitude_deg.to_radians();
        let dphi = phi2 - phi1;
        let dlambda = (other.longitude_deg - self.longitude_deg).to_radians();
        let a = (dphi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        2.0 * EARTH_MEAN_RADIUS_KM * a.sqrt().clamp(0.0, 1.0).asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            GeoPoint::new(91.0, 0.0),
            Err(EventError::InvalidLatitude(91.0))
        );
        assert_eq!(
            GeoPoint::new(0.0, -181.0),
            Err(EventError::InvalidLongitude(-181.0))
        );
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn quarter_meridian() {
        let pole = GeoPoint::new(90.0, 0.0).unwrap();
        let equator = GeoPoint::new(0.0, 0.0).unwrap();
        let expected = EARTH_MEAN_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((pole.distance_km(&equator) - expected).abs() < 1e-6);
    }

    #[test]
    fn jerusalem_to_tokyo() {
        let jerusalem = GeoPoint::new(31.7683, 35.2137).unwrap();
        let tokyo = GeoPoint::new(35.6762, 139.6503).unwrap();
        let d = jerusalem.distance_km(&tokyo);
        assert!((d - 9145.7).abs() < 1.0, "distance = {d}");
    }

    #[test]
    fn deserialize_validates() {
        let bad =
            serde_json::from_str::<GeoPoint>(r#"{"latitude_deg": 120.0, "longitude_deg": 0.0}"#);
        assert!(bad.is_err());
    }
}
