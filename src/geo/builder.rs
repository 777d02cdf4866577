//! Conversion of clicked point sequences into feature records.
//!
//! Both builders generate a fresh id and stamp creation metadata; neither
//! touches any shared state.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use super::coord::LngLat;
use super::error::ValidationError;
use super::feature::{FeatureId, FeatureRecord, Geometry, GeometryKind, Properties, Provenance};

/// Shape produced by a drawing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    #[default]
    Polygon,
    Line,
}

impl DrawMode {
    /// Clicked points required before the shape can be finished.
    pub fn min_points(&self) -> usize {
        match self {
            DrawMode::Polygon => 3,
            DrawMode::Line => 2,
        }
    }

    pub fn geometry_kind(&self) -> GeometryKind {
        match self {
            DrawMode::Polygon => GeometryKind::Polygon,
            DrawMode::Line => GeometryKind::LineString,
        }
    }

    /// Value of the `type` metadata property.
    pub fn type_tag(&self) -> &'static str {
        match self {
            DrawMode::Polygon => "POLYGON",
            DrawMode::Line => "LINE",
        }
    }

    fn default_name(&self) -> &'static str {
        match self {
            DrawMode::Polygon => "User drawn",
            DrawMode::Line => "User drawn line",
        }
    }
}

/// Generate a new opaque feature id.
pub fn new_feature_id() -> FeatureId {
    uuid::Uuid::new_v4().to_string()
}

/// Build a closed polygon from at least three clicked points.
///
/// The first point is appended when the last one differs from it (exact
/// comparison, no tolerance).
pub fn build_polygon(points: &[LngLat]) -> Result<FeatureRecord, ValidationError> {
    let mode = DrawMode::Polygon;
    check_point_count(mode, points)?;

    let mut ring = points.to_vec();
    if ring.first() != ring.last() {
        ring.push(points[0]);
    }
    let geometry = Geometry::Polygon(vec![ring]);
    // A ring like [a, b, a] closes to three positions, which is not a polygon
    geometry.validate()?;

    Ok(drawn_record(mode, geometry))
}

/// Build a line from at least two clicked points.
pub fn build_line(points: &[LngLat]) -> Result<FeatureRecord, ValidationError> {
    let mode = DrawMode::Line;
    check_point_count(mode, points)?;
    Ok(drawn_record(mode, Geometry::LineString(points.to_vec())))
}

/// Build the shape for `mode`.
pub fn build_feature(mode: DrawMode, points: &[LngLat]) -> Result<FeatureRecord, ValidationError> {
    match mode {
        DrawMode::Polygon => build_polygon(points),
        DrawMode::Line => build_line(points),
    }
}

fn check_point_count(mode: DrawMode, points: &[LngLat]) -> Result<(), ValidationError> {
    if points.len() < mode.min_points() {
        return Err(ValidationError::InsufficientPoints {
            kind: mode.geometry_kind(),
            required: mode.min_points(),
            actual: points.len(),
        });
    }
    Ok(())
}

fn drawn_record(mode: DrawMode, geometry: Geometry) -> FeatureRecord {
    let id = new_feature_id();
    let mut properties = Properties::new();
    properties.insert("id".into(), Value::String(id.clone()));
    properties.insert("name".into(), mode.default_name().into());
    properties.insert(
        "createdAt".into(),
        Utc::now()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .into(),
    );
    properties.insert("pointsCount".into(), geometry.position_count().into());
    properties.insert("type".into(), mode.type_tag().into());

    FeatureRecord {
        id,
        provenance: Provenance::Drawn,
        geometry,
        properties,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<LngLat> {
        raw.iter().copied().map(LngLat::from).collect()
    }

    #[test]
    fn test_polygon_ring_is_closed() {
        let feature = build_polygon(&pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])).unwrap();
        let ring = feature.geometry.exterior().unwrap();
        assert_eq!(ring, pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]).as_slice());
    }

    #[test]
    fn test_polygon_closed_for_many_lengths() {
        for n in 3..12 {
            let points: Vec<LngLat> = (0..n)
                .map(|i| {
                    let angle = i as f64 / n as f64 * std::f64::consts::TAU;
                    LngLat::new(angle.cos(), angle.sin())
                })
                .collect();
            let feature = build_polygon(&points).unwrap();
            let ring = feature.geometry.exterior().unwrap();
            assert_eq!(ring.first(), ring.last(), "ring of {} points not closed", n);
            assert_eq!(ring.len(), n + 1);
        }
    }

    #[test]
    fn test_polygon_already_closed_is_not_closed_twice() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let feature = build_polygon(&points).unwrap();
        assert_eq!(feature.geometry.exterior().unwrap().len(), 4);
    }

    #[test]
    fn test_polygon_closing_uses_exact_equality() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1e-12)]);
        let feature = build_polygon(&points).unwrap();
        assert_eq!(feature.geometry.exterior().unwrap().len(), 5);
    }

    #[test]
    fn test_polygon_needs_three_points() {
        for n in 0..3 {
            let points = pts(&[(0.0, 0.0), (1.0, 0.0)][..n.min(2)]);
            let err = build_polygon(&points).unwrap_err();
            assert_eq!(
                err,
                ValidationError::InsufficientPoints {
                    kind: GeometryKind::Polygon,
                    required: 3,
                    actual: points.len(),
                }
            );
        }
    }

    #[test]
    fn test_polygon_degenerate_closed_triangle_rejected() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        assert!(matches!(
            build_polygon(&points),
            Err(ValidationError::MalformedRing { .. })
        ));
    }

    #[test]
    fn test_polygon_metadata() {
        let feature = build_polygon(&pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])).unwrap();
        assert_eq!(feature.provenance, Provenance::Drawn);
        assert_eq!(feature.properties["type"], "POLYGON");
        assert_eq!(feature.properties["name"], "User drawn");
        assert_eq!(feature.properties["pointsCount"], 4);
        assert_eq!(feature.properties["id"], feature.id.as_str());
        assert!(feature.properties["createdAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_line_is_not_closed() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 2.0)]);
        let feature = build_line(&points).unwrap();
        assert_eq!(feature.geometry, Geometry::LineString(points));
        assert_eq!(feature.properties["type"], "LINE");
        assert_eq!(feature.properties["name"], "User drawn line");
        assert_eq!(feature.properties["pointsCount"], 3);
    }

    #[test]
    fn test_line_needs_two_points() {
        let err = build_line(&pts(&[(0.0, 0.0)])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientPoints {
                kind: GeometryKind::LineString,
                required: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0)]);
        let a = build_line(&points).unwrap();
        let b = build_line(&points).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_build_feature_dispatches_by_mode() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let polygon = build_feature(DrawMode::Polygon, &points).unwrap();
        let line = build_feature(DrawMode::Line, &points).unwrap();
        assert_eq!(polygon.geometry.kind(), GeometryKind::Polygon);
        assert_eq!(line.geometry.kind(), GeometryKind::LineString);
    }

    #[test]
    fn test_min_points() {
        assert_eq!(DrawMode::Polygon.min_points(), 3);
        assert_eq!(DrawMode::Line.min_points(), 2);
    }
}
