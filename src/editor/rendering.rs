//! Render surface: draws the projected layer list with gizmos every frame.
//!
//! Runs in `PostUpdate` after `LayerSync`, so it always draws the list
//! computed from the current frame's state. Polygons are filled with a dense
//! scanline hatch since gizmos only draw lines.

use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::geo::{Geometry, GeometryKind, LayerData, LayerList, LngLat, Paint};
use crate::theme;

use super::camera::{lnglat_to_world, MapCamera, MapZoom, WORLD_UNITS_PER_DEGREE};

/// Gizmo group for regular strokes and fills
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct MapGizmos;

/// Gizmo group for heavy strokes (highlights, lines)
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct EmphasisGizmos;

/// Screen pixels between fill scanlines
const FILL_SPACING_PX: f32 = 2.0;

/// Upper bound on scanlines per filled polygon per frame
const MAX_FILL_ROWS: usize = 4096;

/// Strokes at least this wide go to the emphasis group
const HEAVY_STROKE_WIDTH: f32 = 3.0;

pub fn configure_map_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<MapGizmos>();
    config.line.width = 1.5;
    let (config, _) = config_store.config_mut::<EmphasisGizmos>();
    config.line.width = 4.0;
}

/// Visible world rectangle of the map camera.
fn visible_rect(window: &Window, transform: &Transform, zoom: &MapZoom) -> Rect {
    let half = Vec2::new(window.width(), window.height()) * zoom.world_units_per_pixel() / 2.0;
    let center = transform.translation.truncate();
    Rect::from_center_half_size(center, half)
}

/// X ranges inside the rings along the horizontal line at `y` (even-odd).
pub fn scanline_spans(rings: &[Vec<Vec2>], y: f32) -> Vec<(f32, f32)> {
    let mut crossings: Vec<f32> = Vec::new();
    for ring in rings {
        for edge in ring.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            if (a.y > y) != (b.y > y) {
                crossings.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
    }
    crossings.sort_by(f32::total_cmp);
    crossings.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

/// Distance from `value` to the next larger f32.
fn f32_step(value: f32) -> f32 {
    let value = value.abs();
    f32::from_bits(value.to_bits() + 1) - value
}

/// Scanline heights from `min_y` to `max_y`. The row count is computed up
/// front and capped, and the spacing never drops below one f32 step at the
/// far edge, so every row lands on a distinct height.
pub fn fill_rows(min_y: f32, max_y: f32, spacing: f32) -> impl Iterator<Item = f32> {
    let span = (max_y - min_y).max(0.0);
    let spacing = spacing
        .max(f32_step(min_y))
        .max(f32_step(max_y))
        .max(span / MAX_FILL_ROWS as f32);
    let rows = if span.is_finite() && spacing > 0.0 {
        ((span / spacing).floor() as usize).min(MAX_FILL_ROWS)
    } else {
        0
    };
    (0..=rows).map(move |i| min_y + i as f32 * spacing)
}

/// Graticule spacing in degrees so lines sit at least `min_px` apart.
pub fn graticule_step(world_units_per_pixel: f32, min_px: f32) -> f32 {
    const STEPS: [f32; 9] = [0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 15.0, 30.0];
    let min_degrees = min_px * world_units_per_pixel / WORLD_UNITS_PER_DEGREE;
    STEPS
        .into_iter()
        .find(|step| *step >= min_degrees)
        .unwrap_or(30.0)
}

fn to_world(points: &[LngLat]) -> Vec<Vec2> {
    points.iter().copied().map(lnglat_to_world).collect()
}

struct Painter<'a, 'w, 's, 'hw, 'hs> {
    normal: &'a mut Gizmos<'w, 's, MapGizmos>,
    heavy: &'a mut Gizmos<'hw, 'hs, EmphasisGizmos>,
    view: Rect,
    px: f32,
}

impl Painter<'_, '_, '_, '_, '_> {
    fn stroke(&mut self, points: &[Vec2], paint: &Paint) {
        let color = theme::rgba_to_bevy(paint.stroke);
        if paint.stroke_width >= HEAVY_STROKE_WIDTH {
            self.heavy.linestrip_2d(points.iter().copied(), color);
        } else {
            self.normal.linestrip_2d(points.iter().copied(), color);
        }
    }

    fn fill(&mut self, rings: &[Vec<Vec2>], paint: &Paint) {
        if paint.fill[3] == 0 {
            return;
        }
        let Some((first, rest)) = rings.first().and_then(|ring| ring.split_first()) else {
            return;
        };
        let bounds = rest
            .iter()
            .fold(Rect::from_corners(*first, *first), |rect, p| rect.union_point(*p));
        let clipped = bounds.intersect(self.view);
        if clipped.is_empty() {
            return;
        }

        let color = theme::rgba_to_bevy(paint.fill);
        for y in fill_rows(clipped.min.y, clipped.max.y, FILL_SPACING_PX * self.px) {
            for (x0, x1) in scanline_spans(rings, y) {
                self.normal
                    .line_2d(Vec2::new(x0, y), Vec2::new(x1, y), color);
            }
        }
    }

    fn marker(&mut self, at: Vec2, paint: &Paint) {
        let radius = paint.point_radius * self.px;
        self.normal
            .circle_2d(at, radius, theme::rgba_to_bevy(paint.stroke));
        self.normal
            .circle_2d(at, radius * 0.5, theme::rgba_to_bevy(paint.fill));
    }

    fn geometry(&mut self, geometry: &Geometry, paint: &Paint) {
        match geometry {
            Geometry::Polygon(rings) => {
                let rings: Vec<Vec<Vec2>> = rings.iter().map(|r| to_world(r)).collect();
                self.fill(&rings, paint);
                for ring in &rings {
                    self.stroke(ring, paint);
                }
            }
            Geometry::LineString(path) => self.stroke(&to_world(path), paint),
            Geometry::Point(position) => self.marker(lnglat_to_world(*position), paint),
        }
    }
}

pub fn render_layers(
    mut normal: Gizmos<MapGizmos>,
    mut heavy: Gizmos<EmphasisGizmos>,
    layer_list: Res<LayerList>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Transform, &MapZoom), With<MapCamera>>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((transform, zoom)) = camera_query.single() else {
        return;
    };

    let mut painter = Painter {
        normal: &mut normal,
        heavy: &mut heavy,
        view: visible_rect(window, transform, zoom),
        px: zoom.world_units_per_pixel(),
    };

    for layer in layer_list.layers() {
        match &layer.data {
            LayerData::Features(features) => {
                for feature in features {
                    let paint = layer.style.paint_for(feature.geometry.kind());
                    painter.geometry(&feature.geometry, &paint);
                }
            }
            LayerData::Markers(points) => {
                let paint = layer.style.paint_for(GeometryKind::Point);
                for point in points {
                    painter.marker(lnglat_to_world(*point), &paint);
                }
            }
            LayerData::Path(points) => {
                let paint = layer.style.paint_for(GeometryKind::LineString);
                painter.stroke(&to_world(points), &paint);
            }
        }
    }
}

/// Longitude/latitude lines and the world outline, for orientation.
pub fn draw_graticule(
    mut gizmos: Gizmos<MapGizmos>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Transform, &MapZoom), With<MapCamera>>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((transform, zoom)) = camera_query.single() else {
        return;
    };

    let world = Rect::new(
        -180.0 * WORLD_UNITS_PER_DEGREE,
        -90.0 * WORLD_UNITS_PER_DEGREE,
        180.0 * WORLD_UNITS_PER_DEGREE,
        90.0 * WORLD_UNITS_PER_DEGREE,
    );
    gizmos.rect_2d(
        Isometry2d::from_translation(world.center()),
        world.size(),
        theme::WORLD_BOUNDS_COLOR,
    );

    let view = visible_rect(window, transform, zoom).intersect(world);
    if view.is_empty() {
        return;
    }

    let step = graticule_step(zoom.world_units_per_pixel(), 80.0) * WORLD_UNITS_PER_DEGREE;
    let mut x = (view.min.x / step).ceil() * step;
    while x <= view.max.x {
        gizmos.line_2d(
            Vec2::new(x, view.min.y),
            Vec2::new(x, view.max.y),
            theme::GRATICULE_COLOR,
        );
        x += step;
    }
    let mut y = (view.min.y / step).ceil() * step;
    while y <= view.max.y {
        gizmos.line_2d(
            Vec2::new(view.min.x, y),
            Vec2::new(view.max.x, y),
            theme::GRATICULE_COLOR,
        );
        y += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f32, max: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(min, min),
            Vec2::new(max, min),
            Vec2::new(max, max),
            Vec2::new(min, max),
            Vec2::new(min, min),
        ]
    }

    #[test]
    fn test_scanline_through_square() {
        let spans = scanline_spans(&[square(0.0, 10.0)], 5.0);
        assert_eq!(spans, vec![(0.0, 10.0)]);
    }

    #[test]
    fn test_scanline_outside_square() {
        assert!(scanline_spans(&[square(0.0, 10.0)], 20.0).is_empty());
    }

    #[test]
    fn test_scanline_skips_hole() {
        let spans = scanline_spans(&[square(0.0, 10.0), square(4.0, 6.0)], 5.0);
        assert_eq!(spans, vec![(0.0, 4.0), (6.0, 10.0)]);
    }

    fn assert_rows_distinct(rows: &[f32]) {
        assert!(rows.len() <= MAX_FILL_ROWS + 1);
        assert!(rows.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn test_fill_rows_cover_span_at_spacing() {
        let rows: Vec<f32> = fill_rows(0.0, 10.0, 2.0).collect();
        assert_eq!(rows, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_fill_rows_terminate_at_deepest_zoom() {
        use crate::constants::{DEFAULT_CENTER, MAX_ZOOM};
        use super::super::camera::zoom_to_scale;

        let y = lnglat_to_world(LngLat::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1)).y;
        let spacing = FILL_SPACING_PX * zoom_to_scale(MAX_ZOOM);
        let rows: Vec<f32> = fill_rows(y - 1.0, y + 1.0, spacing).collect();
        assert!(!rows.is_empty());
        assert_rows_distinct(&rows);
    }

    #[test]
    fn test_fill_rows_survive_spacing_below_float_step() {
        // Far below the f32 resolution around latitude 50
        let rows: Vec<f32> = fill_rows(5004.0, 5006.0, 1.0e-4).collect();
        assert!(rows.len() > 1);
        assert_rows_distinct(&rows);

        let rows: Vec<f32> = fill_rows(8500.0, 8500.0, 0.0).collect();
        assert_eq!(rows, vec![8500.0]);
    }

    #[test]
    fn test_fill_rows_are_capped() {
        let rows: Vec<f32> = fill_rows(-9000.0, 9000.0, 0.01).collect();
        assert!(rows.len() <= MAX_FILL_ROWS + 1);
        assert!(*rows.last().unwrap() <= 9000.0 + 1.0);
    }

    #[test]
    fn test_graticule_step_grows_when_zoomed_out() {
        let near = graticule_step(0.01, 80.0);
        let far = graticule_step(10.0, 80.0);
        assert!(near < far);
        assert_eq!(graticule_step(1000.0, 80.0), 30.0);
    }
}
