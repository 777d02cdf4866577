use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

use crate::geo::{DrawMode, DrawingSession};

use super::params::is_cursor_over_ui;

/// The active map tool. Derived from the drawing session rather than stored,
/// so the toolbar can never disagree with what clicks actually do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapTool {
    #[default]
    Navigate,
    Polygon,
    Line,
}

impl MapTool {
    pub fn from_session(session: &DrawingSession) -> Self {
        if !session.is_collecting() {
            return MapTool::Navigate;
        }
        match session.mode() {
            DrawMode::Polygon => MapTool::Polygon,
            DrawMode::Line => MapTool::Line,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MapTool::Navigate => "Navigate (N)",
            MapTool::Polygon => "Polygon (P)",
            MapTool::Line => "Line (L)",
        }
    }

    /// Drawing mode backing this tool, `None` for Navigate.
    pub fn draw_mode(&self) -> Option<DrawMode> {
        match self {
            MapTool::Navigate => None,
            MapTool::Polygon => Some(DrawMode::Polygon),
            MapTool::Line => Some(DrawMode::Line),
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            MapTool::Navigate => CursorIcon::System(SystemCursorIcon::Default),
            MapTool::Polygon | MapTool::Line => CursorIcon::System(SystemCursorIcon::Crosshair),
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            MapTool::Navigate => "Click a feature to highlight it. Middle-drag to pan, scroll to zoom.",
            MapTool::Polygon => {
                "Click to add vertices (3+). Enter to finish, Backspace/right-click to undo, Esc to cancel."
            }
            MapTool::Line => {
                "Click to add points (2+). Enter to finish, Backspace/right-click to undo, Esc to cancel."
            }
        }
    }

    pub fn all() -> &'static [MapTool] {
        &[MapTool::Navigate, MapTool::Polygon, MapTool::Line]
    }
}

pub fn update_cursor_icon(
    session: Res<DrawingSession>,
    mut window_query: Query<Entity, With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok(entity) = window_query.single_mut() else {
        return;
    };

    // Use default cursor over UI, tool cursor over the map
    if is_cursor_over_ui(&mut contexts) {
        commands
            .entity(entity)
            .insert(CursorIcon::System(SystemCursorIcon::Default));
        return;
    }

    commands
        .entity(entity)
        .insert(MapTool::from_session(&session).cursor_icon());
}
