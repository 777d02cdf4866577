//! Hit testing for map clicks on committed features.
//!
//! All math is in degrees. The caller converts its pixel tolerance into
//! degrees for the current zoom.

use crate::geo::{FeatureRecord, Geometry, LngLat};

/// Check if a point is within a given distance of a line segment
fn point_near_segment(point: LngLat, seg_start: LngLat, seg_end: LngLat, threshold: f64) -> bool {
    let (dx, dy) = (seg_end.lng - seg_start.lng, seg_end.lat - seg_start.lat);
    let len_sq = dx * dx + dy * dy;

    let (px, py) = (point.lng - seg_start.lng, point.lat - seg_start.lat);
    if len_sq < 1e-18 {
        // Segment is essentially a point
        return (px * px + py * py).sqrt() <= threshold;
    }

    // Project point onto line, clamped to segment
    let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
    let (ex, ey) = (px - dx * t, py - dy * t);
    (ex * ex + ey * ey).sqrt() <= threshold
}

fn point_near_path(point: LngLat, path: &[LngLat], threshold: f64) -> bool {
    path.windows(2)
        .any(|w| point_near_segment(point, w[0], w[1], threshold))
}

/// Even-odd ray cast against a single ring
fn point_in_ring(point: LngLat, ring: &[LngLat]) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.lat > point.lat) != (b.lat > point.lat)
            && point.lng < (b.lng - a.lng) * (point.lat - a.lat) / (b.lat - a.lat) + a.lng
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Inside the exterior ring and outside every hole
pub fn point_in_polygon(point: LngLat, rings: &[Vec<LngLat>]) -> bool {
    let Some((exterior, holes)) = rings.split_first() else {
        return false;
    };
    point_in_ring(point, exterior) && !holes.iter().any(|hole| point_in_ring(point, hole))
}

pub fn hits_geometry(point: LngLat, geometry: &Geometry, tolerance: f64) -> bool {
    match geometry {
        Geometry::Point(position) => point_near_segment(point, *position, *position, tolerance),
        Geometry::LineString(path) => point_near_path(point, path, tolerance),
        Geometry::Polygon(rings) => {
            point_in_polygon(point, rings)
                || rings.iter().any(|ring| point_near_path(point, ring, tolerance))
        }
    }
}

fn is_area(feature: &FeatureRecord) -> bool {
    feature.geometry.exterior().is_some()
}

/// Topmost feature under `point`, given features in bottom-to-top order.
///
/// Points and lines are checked before polygons so a small shape sitting on
/// top of a large area stays clickable.
pub fn pick_topmost<'a>(
    features: &'a [&'a FeatureRecord],
    point: LngLat,
    tolerance: f64,
) -> Option<&'a FeatureRecord> {
    let thin = features
        .iter()
        .rev()
        .filter(|f| !is_area(f))
        .find(|f| hits_geometry(point, &f.geometry, tolerance));

    thin.or_else(|| {
        features
            .iter()
            .rev()
            .filter(|f| is_area(f))
            .find(|f| hits_geometry(point, &f.geometry, tolerance))
    })
    .copied()
}
