//! Error taxonomy for drawing, importing and geocoding.
//!
//! Validation errors are recovered locally (session and store untouched) and
//! surfaced to the user as a notice. Import and geocode errors leave the store
//! at its prior state. Stale async results are not errors at all; they are
//! dropped where they arrive.

use thiserror::Error;

use super::feature::GeometryKind;

/// A drawing or geometry-construction input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} needs at least {required} points (got {actual})")]
    InsufficientPoints {
        kind: GeometryKind,
        required: usize,
        actual: usize,
    },

    #[error("polygon ring {ring} is malformed: {reason}")]
    MalformedRing { ring: usize, reason: &'static str },

    #[error(
        "cannot switch to {requested} drawing while {pending} unfinished {current} point(s) exist; finish or cancel first"
    )]
    ModeSwitchBlocked {
        current: GeometryKind,
        requested: GeometryKind,
        pending: usize,
    },
}

/// A remote or local GeoJSON payload could not be imported.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to fetch GeoJSON: {0}")]
    Fetch(String),

    #[error("response is not valid JSON: {0}")]
    Parse(String),

    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
}

/// A location search failed.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no geocoding access token configured (set MAPBOX_TOKEN)")]
    MissingToken,

    #[error("geocoding request failed: {0}")]
    Network(String),

    #[error("no location found for \"{0}\"")]
    NotFound(String),

    #[error("unexpected geocoding response: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_points_message() {
        let err = ValidationError::InsufficientPoints {
            kind: GeometryKind::Polygon,
            required: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Polygon needs at least 3 points (got 2)");
    }

    #[test]
    fn test_mode_switch_message_mentions_both_modes() {
        let err = ValidationError::ModeSwitchBlocked {
            current: GeometryKind::Polygon,
            requested: GeometryKind::LineString,
            pending: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("Polygon"));
        assert!(msg.contains("LineString"));
    }

    #[test]
    fn test_geocode_not_found_includes_query() {
        let err = GeocodeError::NotFound("Atlantis".to_string());
        assert!(err.to_string().contains("Atlantis"));
    }
}
