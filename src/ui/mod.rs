mod dialogs;
mod notifications;
mod table;
mod toolbar;

pub use notifications::Notices;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::ConfigResetNotification;
use crate::services::{ExportState, GeocodeState, ImportState};

/// Resource that tracks whether any modal dialog is currently open.
/// Map input handlers check this so typing in a dialog never draws.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block editor input
    pub any_modal_open: bool,
}

/// Aggregate dialog open states into [`DialogState`].
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    import: Res<ImportState>,
    geocode: Res<GeocodeState>,
    export: Res<ExportState>,
    config_reset: Res<ConfigResetNotification>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open =
        import.dialog_open || geocode.dialog_open || export.in_progress || config_reset.show;
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<Notices>()
            .init_resource::<table::TableState>()
            .add_systems(
                EguiPrimaryContextPass,
                // Top panels first so windows are laid out around them
                (toolbar::toolbar_ui, toolbar::tool_hint_ui).chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    table::table_ui,
                    dialogs::import_dialog_ui,
                    dialogs::search_dialog_ui,
                    notifications::notices_ui,
                    notifications::config_reset_notification_ui,
                )
                    .after(toolbar::tool_hint_ui),
            )
            .add_systems(Update, notifications::expire_notices)
            // Update dialog state at the start of each frame
            .add_systems(First, update_dialog_state);
    }
}
