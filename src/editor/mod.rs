mod camera;
mod conditions;
pub mod drawing;
pub mod params;
mod picking;
mod rendering;
pub mod tools;

pub use camera::FlyToRequest;
pub use drawing::{CancelDrawingRequest, FinishDrawingRequest, SelectToolRequest, UndoPointRequest};
pub use tools::MapTool;

use bevy::prelude::*;

use crate::config::ConfigLoaded;
use crate::geo::LayerSync;

use conditions::no_dialog_open;

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SelectToolRequest>()
            .add_message::<FinishDrawingRequest>()
            .add_message::<UndoPointRequest>()
            .add_message::<CancelDrawingRequest>()
            .add_message::<FlyToRequest>()
            .init_gizmo_group::<rendering::MapGizmos>()
            .init_gizmo_group::<rendering::EmphasisGizmos>()
            .add_systems(
                Startup,
                (
                    camera::spawn_camera.after(ConfigLoaded),
                    rendering::configure_map_gizmos,
                ),
            )
            .add_systems(
                Update,
                (
                    camera::camera_pan,
                    camera::camera_zoom,
                    camera::handle_fly_to.run_if(on_message::<FlyToRequest>),
                    camera::advance_camera_flight,
                    camera::apply_camera_zoom,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    (drawing::handle_drawing_shortcuts, drawing::handle_map_clicks)
                        .run_if(no_dialog_open),
                    drawing::apply_tool_requests.run_if(on_message::<SelectToolRequest>),
                    drawing::apply_undo_requests.run_if(on_message::<UndoPointRequest>),
                    drawing::apply_finish_requests.run_if(on_message::<FinishDrawingRequest>),
                    drawing::apply_cancel_requests.run_if(on_message::<CancelDrawingRequest>),
                    tools::update_cursor_icon,
                )
                    .chain(),
            )
            .add_systems(
                PostUpdate,
                (rendering::draw_graticule, rendering::render_layers)
                    .chain()
                    .after(LayerSync),
            );
    }
}
