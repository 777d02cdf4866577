//! Feature records and their geometry.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::coord::LngLat;
use super::error::ValidationError;

/// Stable feature identifier, generated once at creation time.
pub type FeatureId = String;

/// Open key/value metadata attached to a feature.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Where a feature came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Drawn,
    Imported,
}

impl Provenance {
    pub fn display_name(&self) -> &'static str {
        match self {
            Provenance::Drawn => "Drawn",
            Provenance::Imported => "Imported",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Polygon,
    LineString,
    Point,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GeometryKind::Polygon => "Polygon",
            GeometryKind::LineString => "LineString",
            GeometryKind::Point => "Point",
        })
    }
}

/// Supported geometries, in GeoJSON shape (`{"type": ..., "coordinates": ...}`).
///
/// A polygon holds one or more rings; the first is the exterior boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(Vec<Vec<LngLat>>),
    LineString(Vec<LngLat>),
    Point(LngLat),
}

/// Minimum positions in a closed ring (three distinct vertices + closing point).
pub const MIN_RING_POSITIONS: usize = 4;

/// Minimum positions in a line.
pub const MIN_LINE_POSITIONS: usize = 2;

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Point(_) => GeometryKind::Point,
        }
    }

    /// Exterior ring of a polygon.
    pub fn exterior(&self) -> Option<&[LngLat]> {
        match self {
            Geometry::Polygon(rings) => rings.first().map(Vec::as_slice),
            _ => None,
        }
    }

    /// Number of positions across all parts of the geometry.
    pub fn position_count(&self) -> usize {
        match self {
            Geometry::Polygon(rings) => rings.iter().map(Vec::len).sum(),
            Geometry::LineString(coords) => coords.len(),
            Geometry::Point(_) => 1,
        }
    }

    /// Check the structural invariants: closed rings of at least four
    /// positions, lines of at least two, finite coordinates everywhere.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Geometry::Polygon(rings) => {
                if rings.is_empty() {
                    return Err(ValidationError::MalformedRing {
                        ring: 0,
                        reason: "polygon has no rings",
                    });
                }
                for (index, ring) in rings.iter().enumerate() {
                    validate_ring(index, ring)?;
                }
                Ok(())
            }
            Geometry::LineString(coords) => {
                if coords.len() < MIN_LINE_POSITIONS {
                    return Err(ValidationError::InsufficientPoints {
                        kind: GeometryKind::LineString,
                        required: MIN_LINE_POSITIONS,
                        actual: coords.len(),
                    });
                }
                if !coords.iter().all(LngLat::is_finite) {
                    return Err(ValidationError::MalformedRing {
                        ring: 0,
                        reason: "line contains a non-finite coordinate",
                    });
                }
                Ok(())
            }
            Geometry::Point(pos) => {
                if pos.is_finite() {
                    Ok(())
                } else {
                    Err(ValidationError::MalformedRing {
                        ring: 0,
                        reason: "point is not finite",
                    })
                }
            }
        }
    }
}

fn validate_ring(index: usize, ring: &[LngLat]) -> Result<(), ValidationError> {
    if ring.len() < MIN_RING_POSITIONS {
        return Err(ValidationError::MalformedRing {
            ring: index,
            reason: "ring needs at least 4 positions",
        });
    }
    if ring.first() != ring.last() {
        return Err(ValidationError::MalformedRing {
            ring: index,
            reason: "ring is not closed",
        });
    }
    if !ring.iter().all(LngLat::is_finite) {
        return Err(ValidationError::MalformedRing {
            ring: index,
            reason: "ring contains a non-finite coordinate",
        });
    }
    Ok(())
}

/// A committed feature: geometry plus metadata, owned by the feature store.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub id: FeatureId,
    pub provenance: Provenance,
    pub geometry: Geometry,
    pub properties: Properties,
}

impl FeatureRecord {
    /// Human readable label for lists: the `name` property when it is a
    /// string, otherwise the geometry kind.
    pub fn label(&self) -> String {
        match self.properties.get("name").and_then(|v| v.as_str()) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.geometry.kind().to_string(),
        }
    }
}
