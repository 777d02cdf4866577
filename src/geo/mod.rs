//! Feature model, drawing session and layer projection.
//!
//! This is the state core of the app; the editor, services and UI modules
//! only feed it input and read its output.
//!
//! ## Module Structure
//!
//! - [`coord`] - Geographic positions
//! - [`feature`] - Feature records and tagged geometries
//! - [`builder`] - Point sequences to polygon/line features
//! - [`geojson`] - FeatureCollection parsing and serialization
//! - [`store`] - Drawn and imported feature partitions
//! - [`session`] - Drawing session state machine
//! - [`selection`] - Table selection and map highlights
//! - [`projector`] - Pure state-to-layers projection
//! - [`sync`] - Change-driven reprojection and the `FeatureContext` param
//! - [`requests`] - Delete/clear messages
//! - [`error`] - Validation, import and geocode errors

mod builder;
mod coord;
mod error;
mod feature;
pub mod geojson;
mod projector;
mod requests;
mod selection;
mod session;
mod store;
mod sync;

#[cfg(test)]
mod tests;

// Re-exports - Model
pub use builder::{build_line, build_polygon, DrawMode};
pub use coord::LngLat;
pub use error::{GeocodeError, ImportError};
pub use feature::{FeatureId, FeatureRecord, Geometry, GeometryKind, Provenance};

// Re-exports - State
pub use selection::SelectionSet;
pub use session::DrawingSession;
pub use store::{ClearScope, FeatureStore};

// Re-exports - Projection
pub use projector::{LayerData, LayerStyle, Paint, Rgba};
pub use sync::{FeatureContext, LayerList, LayerSync, SearchMarker};

// Re-exports - Messages
pub use requests::{ClearFeaturesRequest, DeleteFeaturesRequest};

use bevy::prelude::*;

pub struct GeoPlugin;

impl Plugin for GeoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FeatureStore>()
            .init_resource::<DrawingSession>()
            .init_resource::<SelectionSet>()
            .init_resource::<SearchMarker>()
            .init_resource::<LayerList>()
            .add_message::<DeleteFeaturesRequest>()
            .add_message::<ClearFeaturesRequest>()
            .add_systems(
                Update,
                (
                    requests::handle_delete_requests.run_if(on_message::<DeleteFeaturesRequest>),
                    requests::handle_clear_requests.run_if(on_message::<ClearFeaturesRequest>),
                ),
            )
            .add_systems(
                PostUpdate,
                (sync::prune_selection, sync::reproject_layers)
                    .chain()
                    .in_set(LayerSync),
            );
    }
}
