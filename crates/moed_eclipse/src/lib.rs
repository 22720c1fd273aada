//! Eclipse engine: classification, observer visibility, blood-moon tetrads
//! and feast alignment.
//!
//! This crate provides:
//! - Collaborator traits for eclipse contact markers ([`EclipseSource`]) and
//!   body altitudes ([`AltitudeSource`]), with recorded implementations
//! - [`EclipseEngine`] for lunar/solar/merged eclipse queries over date ranges
//! - Tetrad detection over consecutive total lunar eclipses
//! - Alignment of eclipse dates with annual feasts

pub mod alignment;
pub mod eclipse;
pub mod eclipse_types;
pub mod error;
pub mod source;
pub mod tetrad;

pub use alignment::{align_with_feast, feast_alignments};
pub use eclipse::{EclipseEngine, classify};
pub use eclipse_types::{
    CelestialBody, ContactPhase, EclipseClass, EclipseContact, EclipseEvent, EclipseKind,
    FeastAlignment, TetradConfig, TetradSequence, days_between,
};
pub use error::EclipseError;
pub use source::{
    AltitudeSource, EclipseSource, RecordedAltitude, RecordedAltitudes, RecordedContact,
    RecordedEclipses,
};
pub use tetrad::find_tetrads;
