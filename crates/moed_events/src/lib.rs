//! Boundary event records consumed by the correlation engines.
//!
//! Collaborators parse source feeds into these types; validation happens
//! here so the engines can assume finite magnitudes and legal coordinates.

pub mod error;
pub mod event_types;
pub mod geo;

pub use error::EventError;
pub use event_types::{ALL_EVENT_TYPES, CloseApproach, DisasterEvent, EventType};
pub use geo::{EARTH_MEAN_RADIUS_KM, GeoPoint};
