use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::services::{GeocodeRequest, GeocodeState, ImportRequest, ImportState};
use crate::theme;

fn error_line(ui: &mut egui::Ui, error: &Option<String>) {
    if let Some(error) = error {
        ui.add_space(4.0);
        ui.label(egui::RichText::new(error).color(theme::ui::ERROR_TEXT));
    }
}

/// Modal for importing a remote GeoJSON FeatureCollection.
pub fn import_dialog_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<ImportState>,
    mut requests: MessageWriter<ImportRequest>,
) -> Result {
    if !state.dialog_open {
        return Ok(());
    }

    let mut submit = false;
    let mut close = false;
    let loading = state.is_loading();

    egui::Window::new("Import GeoJSON")
        .collapsible(false)
        .resizable(false)
        .min_width(480.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("FeatureCollection URL:");
            let response = ui.add_enabled(
                !loading,
                egui::TextEdit::singleline(&mut state.url).desired_width(460.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }

            ui.add_space(4.0);
            ui.label(
                egui::RichText::new("Imported features replace the previous import.")
                    .small()
                    .color(theme::ui::HINT_TEXT),
            );
            error_line(ui, &state.last_error);

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let can_submit = !loading && !state.url.trim().is_empty();
                if ui.add_enabled(can_submit, egui::Button::new("Import")).clicked() {
                    submit = true;
                }
                if ui.button("Close").clicked() {
                    close = true;
                }
                if loading {
                    ui.spinner();
                    ui.label("Loading…");
                }
            });

            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                close = true;
            }
        });

    if close {
        state.close();
    } else if submit && !loading {
        requests.write(ImportRequest {
            url: state.url.clone(),
        });
    }
    Ok(())
}

/// Modal for searching a place name.
pub fn search_dialog_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<GeocodeState>,
    mut requests: MessageWriter<GeocodeRequest>,
) -> Result {
    if !state.dialog_open {
        return Ok(());
    }

    let mut submit = false;
    let mut close = false;
    let searching = state.is_searching();

    egui::Window::new("Search location")
        .collapsible(false)
        .resizable(false)
        .min_width(360.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut state.query)
                    .hint_text("City, address or place")
                    .desired_width(340.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            error_line(ui, &state.last_error);

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let can_submit = !searching && !state.query.trim().is_empty();
                if ui.add_enabled(can_submit, egui::Button::new("Search")).clicked() {
                    submit = true;
                }
                if ui.button("Close").clicked() {
                    close = true;
                }
                if searching {
                    ui.spinner();
                }
            });

            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                close = true;
            }
        });

    if close {
        state.close();
    } else if submit && !searching {
        requests.write(GeocodeRequest {
            query: state.query.clone(),
        });
    }
    Ok(())
}
