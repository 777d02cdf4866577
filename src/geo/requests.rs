//! Message types for store mutations requested by the UI, and their handlers.

use bevy::prelude::*;

use super::feature::FeatureId;
use super::store::ClearScope;
use super::sync::FeatureContext;

/// Remove features (table delete button, Delete key on the selection).
#[derive(Message)]
pub struct DeleteFeaturesRequest {
    pub ids: Vec<FeatureId>,
}

#[derive(Message)]
pub struct ClearFeaturesRequest {
    pub scope: ClearScope,
}

pub fn handle_delete_requests(
    mut events: MessageReader<DeleteFeaturesRequest>,
    mut features: FeatureContext,
) {
    for event in events.read() {
        let removed = event.ids.iter().filter(|id| features.delete(id)).count();
        if removed > 0 {
            info!("Deleted {} feature(s)", removed);
        }
    }
}

pub fn handle_clear_requests(
    mut events: MessageReader<ClearFeaturesRequest>,
    mut features: FeatureContext,
) {
    for event in events.read() {
        features.clear(event.scope);
        info!("{}", event.scope.display_name());
    }
}
