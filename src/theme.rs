//! Centralized color theme for the application.
//!
//! Layer paints live with the projector (`geo::projector`); this module holds
//! the canvas and egui colors plus the conversions between color types.

use bevy::prelude::Color;
use bevy_egui::egui;

use crate::geo::Rgba;

// ============================================================================
// Canvas Colors
// ============================================================================

/// Clear color behind the map
pub const MAP_BACKGROUND: Color = Color::srgb(0.89, 0.91, 0.93);

/// Graticule lines
pub const GRATICULE_COLOR: Color = Color::srgba(0.45, 0.5, 0.55, 0.35);

/// Outline of the valid longitude/latitude range
pub const WORLD_BOUNDS_COLOR: Color = Color::srgba(0.3, 0.35, 0.4, 0.8);

// ============================================================================
// UI Colors (egui)
// ============================================================================

pub mod ui {
    use bevy_egui::egui;

    /// Dark grey panel background (tool hint bar)
    pub const PANEL_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(45, 45, 48);

    /// Grey for help/hint text
    pub const HINT_TEXT: egui::Color32 = egui::Color32::GRAY;

    /// Red for error messages
    pub const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(230, 90, 90);

    /// Light green for success notices
    pub const SUCCESS_TEXT: egui::Color32 = egui::Color32::from_rgb(120, 200, 120);

    pub const INFO_TEXT: egui::Color32 = egui::Color32::LIGHT_GRAY;

    /// Background of highlighted table rows
    pub const HIGHLIGHT_ROW: egui::Color32 = egui::Color32::from_rgb(40, 80, 40);
}

// ============================================================================
// Color Conversion Utilities
// ============================================================================

/// Convert a layer paint color to a Bevy Color
pub fn rgba_to_bevy(rgba: Rgba) -> Color {
    Color::srgba_u8(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Convert a layer paint color to egui (table swatches)
pub fn rgba_to_egui(rgba: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}
