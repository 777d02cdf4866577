//! Keeps the derived layer list in step with the core resources.
//!
//! Everything that mutates the feature store, drawing session, selection or
//! search marker runs in `Update`. The projection runs once in `PostUpdate`
//! (in [`LayerSync`]) if any input changed this frame, and the render surface
//! runs after that set, so it only ever sees a list computed from the latest
//! state.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde_json::Value;

use super::coord::LngLat;
use super::error::ImportError;
use super::projector::{project_layers, LayerDescriptor, ProjectionInputs};
use super::selection::SelectionSet;
use super::session::DrawingSession;
use super::store::{ClearScope, FeatureStore};

/// System set that recomputes the layer list.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerSync;

/// Latest location search result, drawn as a pin above the highlights.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct SearchMarker {
    pub position: Option<LngLat>,
}

/// The projected layer list handed to the render surface.
#[derive(Resource, Debug, Default)]
pub struct LayerList {
    layers: Vec<LayerDescriptor>,
    revision: u64,
}

impl LayerList {
    pub fn layers(&self) -> &[LayerDescriptor] {
        &self.layers
    }

    /// Incremented on every recomputation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn replace(&mut self, layers: Vec<LayerDescriptor>) {
        self.layers = layers;
        self.revision += 1;
    }
}

/// Store and selection together, for operations that must update both in
/// the same step so no highlight ever outlives its feature.
#[derive(SystemParam)]
pub struct FeatureContext<'w> {
    pub store: ResMut<'w, FeatureStore>,
    pub selection: ResMut<'w, SelectionSet>,
}

impl FeatureContext<'_> {
    pub fn delete(&mut self, id: &str) -> bool {
        let removed = self.store.delete_by_id(id);
        if removed {
            self.selection.retain_present(&self.store);
        }
        removed
    }

    pub fn clear(&mut self, scope: ClearScope) {
        self.store.clear(scope);
        self.selection.retain_present(&self.store);
    }

    pub fn import_replace(&mut self, payload: &Value) -> Result<usize, ImportError> {
        let count = self.store.import_replace(payload)?;
        self.selection.retain_present(&self.store);
        Ok(count)
    }

    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let store = &*self.store;
        self.selection.select(ids, store);
    }

    pub fn toggle_highlight_on_click(&mut self, id: &str) -> bool {
        let store = &*self.store;
        self.selection.toggle_highlight_on_click(id, store)
    }

    pub fn toggle_selected(&mut self, id: &str) {
        let store = &*self.store;
        self.selection.toggle_selected(id, store);
    }

    pub fn click_row(&mut self, id: &str) {
        let store = &*self.store;
        self.selection.click_row(id, store);
    }
}

/// Drop selection entries for features that vanished from the store by any
/// path that bypassed [`FeatureContext`].
pub fn prune_selection(store: Res<FeatureStore>, mut selection: ResMut<SelectionSet>) {
    if !store.is_changed() {
        return;
    }
    // Only take the mutable borrow when needed so change detection stays quiet
    if selection.has_stale(&store) {
        selection.retain_present(&store);
        debug!("Pruned stale ids from selection");
    }
}

/// Recompute the layer list when any projector input changed.
pub fn reproject_layers(
    store: Res<FeatureStore>,
    session: Res<DrawingSession>,
    selection: Res<SelectionSet>,
    marker: Res<SearchMarker>,
    mut layer_list: ResMut<LayerList>,
) {
    let dirty = store.is_changed()
        || session.is_changed()
        || selection.is_changed()
        || marker.is_changed();
    if !dirty {
        return;
    }

    let layers = project_layers(ProjectionInputs {
        store: &store,
        session: &session,
        selection: &selection,
        search_marker: marker.position,
    });
    layer_list.replace(layers);
}
