//! Paginated attribute table over every committed feature.
//!
//! Row identity is the feature id, never the row index, so a checkbox or
//! delete button always refers to the feature it was drawn next to.

use std::ops::Range;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use serde_json::Value;

use crate::constants::{MAX_TABLE_COLUMNS, TABLE_PAGE_SIZES};
use crate::geo::{DeleteFeaturesRequest, FeatureContext, FeatureId, FeatureRecord, LayerStyle};
use crate::theme;

#[derive(Resource)]
pub struct TableState {
    pub open: bool,
    /// Zero-based page index
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            open: false,
            page: 0,
            page_size: TABLE_PAGE_SIZES[0],
        }
    }
}

/// A data column of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableColumn {
    Property(String),
    GeometryType,
    Id,
}

impl TableColumn {
    pub fn header(&self) -> &str {
        match self {
            TableColumn::Property(key) => key,
            TableColumn::GeometryType => "Geometry Type",
            TableColumn::Id => "ID",
        }
    }

    pub fn cell(&self, feature: &FeatureRecord) -> String {
        match self {
            TableColumn::Property(key) => match feature.properties.get(key) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            },
            TableColumn::GeometryType => feature.geometry.kind().to_string(),
            TableColumn::Id => feature.id.clone(),
        }
    }
}

/// Union of property keys in first-seen order, capped. Without any keys the
/// table falls back to geometry type and id.
pub fn table_columns<'a>(features: impl IntoIterator<Item = &'a FeatureRecord>) -> Vec<TableColumn> {
    let mut keys: Vec<&str> = Vec::new();
    for feature in features {
        for key in feature.properties.keys() {
            if keys.len() >= MAX_TABLE_COLUMNS {
                break;
            }
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }

    if keys.is_empty() {
        return vec![TableColumn::GeometryType, TableColumn::Id];
    }
    keys.into_iter()
        .map(|key| TableColumn::Property(key.to_string()))
        .collect()
}

/// Number of pages; an empty table still has one.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.min(page_count(total, page_size) - 1)
}

/// Row indices shown on `page`.
pub fn page_slice(total: usize, page: usize, page_size: usize) -> Range<usize> {
    let page = clamp_page(page, total, page_size);
    let start = (page * page_size).min(total);
    let end = (start + page_size).min(total);
    start..end
}

struct TableRow {
    id: FeatureId,
    cells: Vec<String>,
    /// Map color of the feature's geometry kind
    swatch: egui::Color32,
    selected: bool,
    highlighted: bool,
}

enum RowAction {
    ToggleSelected(FeatureId),
    Click(FeatureId),
    Delete(FeatureId),
}

pub fn table_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<TableState>,
    mut features: FeatureContext,
    mut delete: MessageWriter<DeleteFeaturesRequest>,
) -> Result {
    if !state.open {
        return Ok(());
    }

    let total = features.store.len();
    let page = clamp_page(state.page, total, state.page_size);
    if page != state.page {
        state.page = page;
    }

    let columns = table_columns(features.store.all_features());
    let style = LayerStyle::base();
    let range = page_slice(total, state.page, state.page_size);
    let rows: Vec<TableRow> = features
        .store
        .all_features()
        .skip(range.start)
        .take(range.len())
        .map(|feature| TableRow {
            id: feature.id.clone(),
            cells: columns.iter().map(|column| column.cell(feature)).collect(),
            swatch: theme::rgba_to_egui(style.paint_for(feature.geometry.kind()).stroke),
            selected: features.selection.is_selected(&feature.id),
            highlighted: features.selection.is_highlighted(&feature.id),
        })
        .collect();

    let mut action = None;
    let mut open = state.open;

    egui::Window::new("Features")
        .open(&mut open)
        .default_width(720.0)
        .default_height(420.0)
        .show(contexts.ctx_mut()?, |ui| {
            if total == 0 {
                ui.label(
                    egui::RichText::new("No features yet. Draw or import some.")
                        .color(theme::ui::HINT_TEXT),
                );
                return;
            }

            egui::ScrollArea::both()
                .max_height(340.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    egui::Grid::new("feature_table")
                        .striped(true)
                        .num_columns(columns.len() + 3)
                        .spacing([12.0, 4.0])
                        .show(ui, |ui| {
                            ui.label("");
                            ui.label("");
                            for column in &columns {
                                ui.label(egui::RichText::new(column.header()).strong());
                            }
                            ui.label("");
                            ui.end_row();

                            for row in &rows {
                                let mut checked = row.selected;
                                if ui.checkbox(&mut checked, "").changed() {
                                    action = Some(RowAction::ToggleSelected(row.id.clone()));
                                }
                                ui.label(egui::RichText::new("●").color(row.swatch));
                                for cell in &row.cells {
                                    let mut text = egui::RichText::new(cell);
                                    if row.highlighted {
                                        text = text.background_color(theme::ui::HIGHLIGHT_ROW);
                                    }
                                    let response =
                                        ui.add(egui::Label::new(text).sense(egui::Sense::click()));
                                    if response.clicked() {
                                        action = Some(RowAction::Click(row.id.clone()));
                                    }
                                }
                                if ui.small_button("Delete").clicked() {
                                    action = Some(RowAction::Delete(row.id.clone()));
                                }
                                ui.end_row();
                            }
                        });
                });

            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Rows per page:");
                egui::ComboBox::from_id_salt("table_page_size")
                    .selected_text(state.page_size.to_string())
                    .show_ui(ui, |ui| {
                        for size in TABLE_PAGE_SIZES {
                            if ui
                                .selectable_value(&mut state.page_size, size, size.to_string())
                                .clicked()
                            {
                                state.page = 0;
                            }
                        }
                    });

                let pages = page_count(total, state.page_size);
                if ui
                    .add_enabled(state.page > 0, egui::Button::new("◀"))
                    .clicked()
                {
                    state.page -= 1;
                }
                ui.label(format!("Page {} of {}", state.page + 1, pages));
                if ui
                    .add_enabled(state.page + 1 < pages, egui::Button::new("▶"))
                    .clicked()
                {
                    state.page += 1;
                }

                ui.label(
                    egui::RichText::new(format!(
                        "{} feature(s), {} selected",
                        total,
                        features.selection.selected().len()
                    ))
                    .color(theme::ui::HINT_TEXT),
                );
            });
        });

    if !open {
        state.open = false;
    }

    match action {
        Some(RowAction::ToggleSelected(id)) => features.toggle_selected(&id),
        Some(RowAction::Click(id)) => features.click_row(&id),
        Some(RowAction::Delete(id)) => {
            delete.write(DeleteFeaturesRequest { ids: vec![id] });
        }
        None => {}
    }
    Ok(())
}
