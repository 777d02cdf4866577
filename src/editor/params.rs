//! Common SystemParam bundles to reduce parameter counts in editor systems.
//!
//! ## Available Bundles
//!
//! - [`MapCursor`]: Camera and window access for cursor-to-map conversion
//!
//! ## Helper Functions
//!
//! - [`is_cursor_over_ui`]: Check if cursor is over egui UI (for input gating)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::geo::LngLat;

use super::camera::{world_to_lnglat, MapCamera, MapZoom};

/// Bundled camera and window queries for cursor-to-map calculations
#[derive(SystemParam)]
pub struct MapCursor<'w, 's> {
    pub window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    pub camera: Query<'w, 's, (&'static Camera, &'static GlobalTransform, &'static MapZoom), With<MapCamera>>,
}

impl MapCursor<'_, '_> {
    /// Get the world position of the cursor, if available
    pub fn world_pos(&self) -> Option<Vec2> {
        let window = self.window.single().ok()?;
        let (camera, transform, _) = self.camera.single().ok()?;
        let cursor_pos = window.cursor_position()?;
        camera.viewport_to_world_2d(transform, cursor_pos).ok()
    }

    /// Geographic position under the cursor
    pub fn lnglat(&self) -> Option<LngLat> {
        self.world_pos().map(world_to_lnglat)
    }

    /// World units per screen pixel at the current zoom
    pub fn world_units_per_pixel(&self) -> f32 {
        self.camera
            .single()
            .map(|(_, _, zoom)| zoom.world_units_per_pixel())
            .unwrap_or(1.0)
    }
}

/// Check if the cursor is over egui UI
pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}

/// Check if egui has keyboard focus (a text field is being edited)
pub fn is_typing_in_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false)
}
