//! Map camera: world/geographic conversions, pan, zoom and fly-to.
//!
//! The canvas is a plain equirectangular plane: one degree of longitude or
//! latitude is [`WORLD_UNITS_PER_DEGREE`] world units. Zoom levels follow the
//! web-map convention where each level doubles the on-screen size.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::config::AppConfig;
use crate::constants::{FLY_TO_DURATION_SECS, MAX_ZOOM, MIN_ZOOM};
use crate::geo::LngLat;

use super::params::is_cursor_over_ui;

pub const WORLD_UNITS_PER_DEGREE: f32 = 100.0;

/// World units per screen pixel at zoom 0 (a 512px-wide world).
const WORLD_UNITS_PER_PIXEL_AT_ZOOM_0: f32 = WORLD_UNITS_PER_DEGREE * 360.0 / 512.0;

#[derive(Component)]
pub struct MapCamera;

#[derive(Component)]
pub struct MapZoom {
    pub level: f32,
}

impl MapZoom {
    /// World units covered by one screen pixel at this zoom.
    pub fn world_units_per_pixel(&self) -> f32 {
        zoom_to_scale(self.level)
    }
}

/// An in-progress animated move of the camera.
#[derive(Component, Debug, Clone)]
pub struct CameraFlight {
    from: Vec2,
    to: Vec2,
    from_zoom: f32,
    to_zoom: f32,
    elapsed: f32,
    duration: f32,
}

/// Move the view to `center` at `zoom` (geocode results).
#[derive(Message)]
pub struct FlyToRequest {
    pub center: LngLat,
    pub zoom: f32,
}

pub fn lnglat_to_world(coord: LngLat) -> Vec2 {
    Vec2::new(
        (coord.lng * WORLD_UNITS_PER_DEGREE as f64) as f32,
        (coord.lat * WORLD_UNITS_PER_DEGREE as f64) as f32,
    )
}

pub fn world_to_lnglat(position: Vec2) -> LngLat {
    LngLat::new(
        position.x as f64 / WORLD_UNITS_PER_DEGREE as f64,
        position.y as f64 / WORLD_UNITS_PER_DEGREE as f64,
    )
}

/// Orthographic projection scale for a zoom level.
pub fn zoom_to_scale(zoom: f32) -> f32 {
    WORLD_UNITS_PER_PIXEL_AT_ZOOM_0 / 2f32.powf(zoom.clamp(MIN_ZOOM, MAX_ZOOM))
}

/// Smoothstep-eased position and zoom `t` of the way through a flight.
fn flight_sample(flight: &CameraFlight, t: f32) -> (Vec2, f32) {
    let t = t.clamp(0.0, 1.0);
    let eased = t * t * (3.0 - 2.0 * t);
    (
        flight.from.lerp(flight.to, eased),
        flight.from_zoom + (flight.to_zoom - flight.from_zoom) * eased,
    )
}

pub fn spawn_camera(mut commands: Commands, config: Res<AppConfig>) {
    let view = config.data.initial_view;
    let center = lnglat_to_world(LngLat::new(view.lng, view.lat));
    commands.spawn((
        Camera2d,
        MapCamera,
        MapZoom {
            level: view.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        },
        Transform::from_translation(center.extend(1000.0)),
    ));
}

pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut camera_query: Query<(&mut Transform, &MapZoom), (With<MapCamera>, Without<CameraFlight>)>,
) {
    if !mouse_button.pressed(MouseButton::Middle) {
        mouse_motion.clear();
        return;
    }

    let Ok((mut transform, zoom)) = camera_query.single_mut() else {
        return;
    };

    let scale = zoom.world_units_per_pixel();
    for event in mouse_motion.read() {
        let delta = event.delta * scale;
        transform.translation.x -= delta.x;
        transform.translation.y += delta.y;
    }
}

pub fn camera_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    mut camera_query: Query<&mut MapZoom, (With<MapCamera>, Without<CameraFlight>)>,
    mut contexts: EguiContexts,
) {
    // Scrolling over panels (the feature table) must not zoom the map
    if is_cursor_over_ui(&mut contexts) {
        scroll_events.clear();
        return;
    }

    let Ok(mut zoom) = camera_query.single_mut() else {
        return;
    };

    for event in scroll_events.read() {
        let scroll_amount = match event.unit {
            MouseScrollUnit::Line => event.y * 0.25,
            MouseScrollUnit::Pixel => event.y * 0.005,
        };

        zoom.level = (zoom.level + scroll_amount).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

pub fn apply_camera_zoom(
    mut camera_query: Query<(&MapZoom, &mut Projection), (With<MapCamera>, Changed<MapZoom>)>,
) {
    for (zoom, mut projection) in camera_query.iter_mut() {
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = zoom_to_scale(zoom.level);
        }
    }
}

/// Start a flight for the latest fly-to request.
pub fn handle_fly_to(
    mut commands: Commands,
    mut events: MessageReader<FlyToRequest>,
    camera_query: Query<(Entity, &Transform, &MapZoom), With<MapCamera>>,
) {
    let Some(event) = events.read().last() else {
        return;
    };
    let Ok((entity, transform, zoom)) = camera_query.single() else {
        return;
    };

    debug!("Flying to {} at zoom {}", event.center, event.zoom);
    commands.entity(entity).insert(CameraFlight {
        from: transform.translation.truncate(),
        to: lnglat_to_world(event.center),
        from_zoom: zoom.level,
        to_zoom: event.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        elapsed: 0.0,
        duration: FLY_TO_DURATION_SECS,
    });
}

pub fn advance_camera_flight(
    mut commands: Commands,
    time: Res<Time>,
    mut camera_query: Query<(Entity, &mut Transform, &mut MapZoom, &mut CameraFlight), With<MapCamera>>,
) {
    for (entity, mut transform, mut zoom, mut flight) in camera_query.iter_mut() {
        flight.elapsed += time.delta_secs();
        let t = if flight.duration > 0.0 {
            flight.elapsed / flight.duration
        } else {
            1.0
        };

        let (position, level) = flight_sample(&flight, t);
        transform.translation.x = position.x;
        transform.translation.y = position.y;
        zoom.level = level;

        if t >= 1.0 {
            commands.entity(entity).remove::<CameraFlight>();
        }
    }
}
