//! Map input: turns clicks and shortcuts into drawing session operations and
//! feature picks.
//!
//! Keyboard and toolbar actions go through messages so both paths share one
//! handler. Map clicks are applied directly since only the map produces them.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::constants::PICK_TOLERANCE_PX;
use crate::geo::{
    DeleteFeaturesRequest, DrawingSession, FeatureContext, FeatureRecord, FeatureStore,
    SelectionSet,
};
use crate::ui::Notices;

use super::camera::WORLD_UNITS_PER_DEGREE;
use super::params::{is_cursor_over_ui, is_typing_in_ui, MapCursor};
use super::picking::pick_topmost;
use super::tools::MapTool;

#[derive(Message)]
pub struct SelectToolRequest {
    pub tool: MapTool,
}

#[derive(Message)]
pub struct FinishDrawingRequest;

#[derive(Message)]
pub struct UndoPointRequest;

#[derive(Message)]
pub struct CancelDrawingRequest;

#[allow(clippy::too_many_arguments)]
pub fn handle_drawing_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    selection: Res<SelectionSet>,
    mut contexts: EguiContexts,
    mut tool_events: MessageWriter<SelectToolRequest>,
    mut finish_events: MessageWriter<FinishDrawingRequest>,
    mut undo_events: MessageWriter<UndoPointRequest>,
    mut cancel_events: MessageWriter<CancelDrawingRequest>,
    mut delete_events: MessageWriter<DeleteFeaturesRequest>,
) {
    // Don't react to keys typed into a text field
    if is_typing_in_ui(&mut contexts) {
        return;
    }

    let tool = if keyboard.just_pressed(KeyCode::KeyN) {
        Some(MapTool::Navigate)
    } else if keyboard.just_pressed(KeyCode::KeyP) {
        Some(MapTool::Polygon)
    } else if keyboard.just_pressed(KeyCode::KeyL) {
        Some(MapTool::Line)
    } else {
        None
    };
    if let Some(tool) = tool {
        tool_events.write(SelectToolRequest { tool });
    }

    if keyboard.any_just_pressed([KeyCode::Enter, KeyCode::NumpadEnter]) {
        finish_events.write(FinishDrawingRequest);
    }
    if keyboard.just_pressed(KeyCode::Backspace) {
        undo_events.write(UndoPointRequest);
    }
    if keyboard.just_pressed(KeyCode::Escape) {
        cancel_events.write(CancelDrawingRequest);
    }
    if keyboard.just_pressed(KeyCode::Delete) && !selection.selected().is_empty() {
        delete_events.write(DeleteFeaturesRequest {
            ids: selection.selected().to_vec(),
        });
    }
}

/// Left click adds a point while drawing and picks a feature otherwise.
/// Right click removes the last point while drawing.
pub fn handle_map_clicks(
    mouse_button: Res<ButtonInput<MouseButton>>,
    cursor: MapCursor,
    mut contexts: EguiContexts,
    mut session: ResMut<DrawingSession>,
    mut features: FeatureContext,
) {
    let left = mouse_button.just_pressed(MouseButton::Left);
    let right = mouse_button.just_pressed(MouseButton::Right);
    if !left && !right {
        return;
    }
    if is_cursor_over_ui(&mut contexts) {
        return;
    }

    if session.is_collecting() {
        if right {
            session.undo_last_point();
        } else if let Some(point) = cursor.lnglat() {
            session.add_point(point);
        }
        return;
    }

    if !left {
        return;
    }
    let Some(point) = cursor.lnglat() else {
        return;
    };

    let tolerance =
        (PICK_TOLERANCE_PX * cursor.world_units_per_pixel() / WORLD_UNITS_PER_DEGREE) as f64;
    let hit = {
        let candidates: Vec<&FeatureRecord> = features.store.all_features().collect();
        pick_topmost(&candidates, point, tolerance).map(|f| (f.id.clone(), f.label()))
    };

    match hit {
        Some((id, label)) => {
            let on = features.toggle_highlight_on_click(&id);
            debug!(
                "Map click on {} [{}] (highlight {})",
                label,
                id,
                if on { "on" } else { "off" }
            );
        }
        None if !features.selection.highlighted().is_empty() => {
            features.selection.clear_highlights();
        }
        None => {}
    }
}

pub fn apply_tool_requests(
    mut events: MessageReader<SelectToolRequest>,
    mut session: ResMut<DrawingSession>,
    mut notices: ResMut<Notices>,
) {
    for event in events.read() {
        match event.tool.draw_mode() {
            None => {
                if session.is_collecting() {
                    session.deactivate();
                    debug!("Drawing session reset (navigate)");
                }
            }
            Some(mode) => {
                if session.is_collecting_mode(mode) {
                    continue;
                }
                if let Err(e) = session.activate(mode) {
                    warn!("Tool switch refused: {}", e);
                    notices.error(e.to_string());
                }
            }
        }
    }
}

pub fn apply_finish_requests(
    mut events: MessageReader<FinishDrawingRequest>,
    mut session: ResMut<DrawingSession>,
    mut store: ResMut<FeatureStore>,
    mut notices: ResMut<Notices>,
) {
    for _ in events.read() {
        if !session.is_collecting() {
            continue;
        }
        let mode = session.mode();
        match session.finish(&mut store) {
            Ok(_) => notices.success(format!("{} saved", mode.geometry_kind())),
            Err(e) => {
                warn!("Finish rejected: {}", e);
                notices.error(e.to_string());
            }
        }
    }
}

pub fn apply_undo_requests(
    mut events: MessageReader<UndoPointRequest>,
    mut session: ResMut<DrawingSession>,
) {
    for _ in events.read() {
        if !session.points().is_empty() {
            session.undo_last_point();
        }
    }
}

pub fn apply_cancel_requests(
    mut events: MessageReader<CancelDrawingRequest>,
    mut session: ResMut<DrawingSession>,
) {
    for _ in events.read() {
        if session.is_collecting() {
            session.cancel();
            debug!("Drawing cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{DrawMode, GeometryKind, LngLat};

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<DrawingSession>()
            .init_resource::<FeatureStore>()
            .init_resource::<Notices>()
            .add_message::<SelectToolRequest>()
            .add_message::<FinishDrawingRequest>()
            .add_message::<UndoPointRequest>()
            .add_message::<CancelDrawingRequest>()
            .add_systems(
                Update,
                (
                    apply_tool_requests,
                    apply_undo_requests,
                    apply_finish_requests,
                    apply_cancel_requests,
                )
                    .chain(),
            );
        app
    }

    fn add_points(app: &mut App, points: &[(f64, f64)]) {
        let mut session = app.world_mut().resource_mut::<DrawingSession>();
        for &(lng, lat) in points {
            session.add_point(LngLat::new(lng, lat));
        }
    }

    fn tool(app: &App) -> MapTool {
        MapTool::from_session(app.world().resource::<DrawingSession>())
    }

    #[test]
    fn test_select_tool_activates_session() {
        let mut app = test_app();
        app.world_mut()
            .write_message(SelectToolRequest { tool: MapTool::Line });
        app.update();
        assert_eq!(tool(&app), MapTool::Line);
    }

    #[test]
    fn test_finish_commits_line_and_keeps_tool() {
        let mut app = test_app();
        app.world_mut()
            .write_message(SelectToolRequest { tool: MapTool::Line });
        app.update();
        add_points(&mut app, &[(0.0, 0.0), (1.0, 1.0)]);

        app.world_mut().write_message(FinishDrawingRequest);
        app.update();

        let store = app.world().resource::<FeatureStore>();
        assert_eq!(store.drawn().len(), 1);
        assert_eq!(store.drawn()[0].geometry.kind(), GeometryKind::LineString);
        assert_eq!(tool(&app), MapTool::Line);
        assert!(app.world().resource::<DrawingSession>().points().is_empty());
    }

    #[test]
    fn test_failed_finish_reports_error() {
        let mut app = test_app();
        app.world_mut()
            .write_message(SelectToolRequest { tool: MapTool::Polygon });
        app.update();
        add_points(&mut app, &[(0.0, 0.0), (1.0, 1.0)]);

        app.world_mut().write_message(FinishDrawingRequest);
        app.update();

        assert!(app.world().resource::<FeatureStore>().is_empty());
        assert_eq!(app.world().resource::<DrawingSession>().points().len(), 2);
        let notices = app.world().resource::<Notices>();
        assert_eq!(notices.items().len(), 1);
    }

    #[test]
    fn test_blocked_switch_keeps_points_and_notifies() {
        let mut app = test_app();
        app.world_mut()
            .write_message(SelectToolRequest { tool: MapTool::Polygon });
        app.update();
        add_points(&mut app, &[(0.0, 0.0)]);

        app.world_mut()
            .write_message(SelectToolRequest { tool: MapTool::Line });
        app.update();

        assert_eq!(tool(&app), MapTool::Polygon);
        assert_eq!(app.world().resource::<DrawingSession>().points().len(), 1);
        assert_eq!(app.world().resource::<Notices>().items().len(), 1);
    }

    #[test]
    fn test_navigate_resets_session() {
        let mut app = test_app();
        app.world_mut()
            .write_message(SelectToolRequest { tool: MapTool::Polygon });
        app.update();
        add_points(&mut app, &[(0.0, 0.0), (1.0, 0.0)]);

        app.world_mut()
            .write_message(SelectToolRequest { tool: MapTool::Navigate });
        app.update();
        assert_eq!(tool(&app), MapTool::Navigate);

        // Reactivation starts fresh
        app.world_mut()
            .write_message(SelectToolRequest { tool: MapTool::Polygon });
        app.update();
        let session = app.world().resource::<DrawingSession>();
        assert!(session.is_collecting_mode(DrawMode::Polygon));
        assert!(session.points().is_empty());
    }

    #[test]
    fn test_undo_and_cancel_requests() {
        let mut app = test_app();
        app.world_mut()
            .write_message(SelectToolRequest { tool: MapTool::Line });
        app.update();
        add_points(&mut app, &[(0.0, 0.0), (1.0, 1.0)]);

        app.world_mut().write_message(UndoPointRequest);
        app.update();
        assert_eq!(app.world().resource::<DrawingSession>().points().len(), 1);

        app.world_mut().write_message(CancelDrawingRequest);
        app.update();
        assert_eq!(tool(&app), MapTool::Navigate);
        assert!(app.world().resource::<FeatureStore>().is_empty());
    }
}
