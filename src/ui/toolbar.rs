use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::AppConfig;
use crate::editor::{
    CancelDrawingRequest, FinishDrawingRequest, MapTool, SelectToolRequest, UndoPointRequest,
};
use crate::geo::{ClearFeaturesRequest, ClearScope, DrawingSession, FeatureStore, SearchMarker};
use crate::services::{ExportRequest, ExportState, GeocodeState, ImportState};
use crate::theme;

use super::table::TableState;

/// Message writers for every toolbar action
#[derive(SystemParam)]
pub struct ToolbarActions<'w> {
    pub tool: MessageWriter<'w, SelectToolRequest>,
    pub finish: MessageWriter<'w, FinishDrawingRequest>,
    pub undo: MessageWriter<'w, UndoPointRequest>,
    pub cancel: MessageWriter<'w, CancelDrawingRequest>,
    pub clear: MessageWriter<'w, ClearFeaturesRequest>,
    pub export: MessageWriter<'w, ExportRequest>,
}

/// Dialog and panel toggles opened from the toolbar
#[derive(SystemParam)]
pub struct ToolbarDialogs<'w> {
    pub import: ResMut<'w, ImportState>,
    pub geocode: ResMut<'w, GeocodeState>,
    pub table: ResMut<'w, TableState>,
    pub export: Res<'w, ExportState>,
}

fn tool_button_label(tool: &MapTool) -> &'static str {
    match tool {
        MapTool::Navigate => "Navigate",
        MapTool::Polygon => "Polygon",
        MapTool::Line => "Line",
    }
}

/// Main toolbar: tools, drawing actions, data actions
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    session: Res<DrawingSession>,
    store: Res<FeatureStore>,
    mut marker: ResMut<SearchMarker>,
    config: Res<AppConfig>,
    mut dialogs: ToolbarDialogs,
    mut actions: ToolbarActions,
) -> Result {
    let current_tool = MapTool::from_session(&session);

    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                // Tool buttons with keyboard shortcuts
                for tool in MapTool::all() {
                    let button = egui::Button::new(
                        egui::RichText::new(tool_button_label(tool)).size(14.0).strong(),
                    )
                    .min_size(egui::vec2(0.0, 28.0))
                    .selected(current_tool == *tool);

                    let response = ui.add(button);
                    if response.clicked() {
                        actions.tool.write(SelectToolRequest { tool: *tool });
                    }
                    response.on_hover_text(tool.display_name());
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui
                    .add_enabled(session.can_finish(), egui::Button::new("Finish"))
                    .on_hover_text("Enter")
                    .clicked()
                {
                    actions.finish.write(FinishDrawingRequest);
                }
                if ui
                    .add_enabled(!session.points().is_empty(), egui::Button::new("Undo"))
                    .on_hover_text("Backspace / right click")
                    .clicked()
                {
                    actions.undo.write(UndoPointRequest);
                }
                if ui
                    .add_enabled(session.is_collecting(), egui::Button::new("Cancel"))
                    .on_hover_text("Esc")
                    .clicked()
                {
                    actions.cancel.write(CancelDrawingRequest);
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                if ui.button("Import…").clicked() {
                    dialogs.import.open(&config.data.last_import_url);
                }
                if ui.button("Search…").clicked() {
                    dialogs.geocode.open();
                }
                let table_open = dialogs.table.open;
                if ui.add(egui::Button::new("Table").selected(table_open)).clicked() {
                    dialogs.table.open = !table_open;
                }
                if ui
                    .add_enabled(
                        !store.is_empty() && !dialogs.export.in_progress,
                        egui::Button::new("Export"),
                    )
                    .clicked()
                {
                    actions.export.write(ExportRequest);
                }

                ui.menu_button("Clear", |ui| {
                    for scope in [ClearScope::Drawn, ClearScope::Imported, ClearScope::All] {
                        if ui.button(scope.display_name()).clicked() {
                            actions.clear.write(ClearFeaturesRequest { scope });
                            ui.close();
                        }
                    }
                    ui.separator();
                    if ui
                        .add_enabled(
                            marker.position.is_some(),
                            egui::Button::new("Clear search pin"),
                        )
                        .clicked()
                    {
                        marker.position = None;
                        ui.close();
                    }
                });

                // Right-aligned feature counts
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} drawn · {} imported",
                            store.drawn().len(),
                            store.imported().len()
                        ))
                        .color(theme::ui::HINT_TEXT),
                    );
                });
            });
        });
    Ok(())
}

/// Secondary bar with the active tool's hint and draft progress
pub fn tool_hint_ui(mut contexts: EguiContexts, session: Res<DrawingSession>) -> Result {
    let tool = MapTool::from_session(&session);

    egui::TopBottomPanel::top("tool_hint")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 6))
                .fill(theme::ui::PANEL_BACKGROUND),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(tool.hint()).color(theme::ui::HINT_TEXT).size(12.0));

                if let Some(mode) = tool.draw_mode() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "{} / {} points",
                                session.points().len(),
                                mode.min_points()
                            ))
                            .color(theme::ui::HINT_TEXT)
                            .size(12.0),
                        );
                    });
                }
            });
        });
    Ok(())
}
