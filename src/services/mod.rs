//! Background I/O adapters: remote GeoJSON import, location search and
//! file export.
//!
//! Each adapter spawns its blocking work on a Bevy task pool, polls the task
//! on the main schedule and applies the result through the geo resources.

pub mod export;
pub mod geocode;
pub mod import;
mod request;

pub use export::{ExportRequest, ExportState};
pub use geocode::{GeocodeRequest, GeocodeState};
pub use import::{ImportRequest, ImportState};

use bevy::prelude::*;

use crate::config::ConfigLoaded;

/// User-Agent sent with every HTTP request
pub(crate) const USER_AGENT: &str = concat!("mapsketch/", env!("CARGO_PKG_VERSION"));

pub struct ServicesPlugin;

impl Plugin for ServicesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ImportState>()
            .init_resource::<GeocodeState>()
            .init_resource::<ExportState>()
            .add_message::<ImportRequest>()
            .add_message::<import::ImportFinished>()
            .add_message::<GeocodeRequest>()
            .add_message::<geocode::GeocodeFinished>()
            .add_message::<ExportRequest>()
            .add_systems(Startup, import::init_import_url.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    import::start_import.run_if(on_message::<ImportRequest>),
                    import::poll_import_tasks,
                    import::apply_import_results.run_if(on_message::<import::ImportFinished>),
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    geocode::start_geocode.run_if(on_message::<GeocodeRequest>),
                    geocode::poll_geocode_tasks,
                    geocode::apply_geocode_results
                        .run_if(on_message::<geocode::GeocodeFinished>),
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    export::start_export.run_if(on_message::<ExportRequest>),
                    export::poll_export_tasks,
                )
                    .chain(),
            );
    }
}
