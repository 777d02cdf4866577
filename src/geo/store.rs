//! The canonical collection of committed features.

use std::collections::HashSet;

use bevy::prelude::*;
use serde_json::Value;

use super::builder::new_feature_id;
use super::error::ImportError;
use super::feature::{FeatureId, FeatureRecord, Provenance};
use super::geojson::parse_feature_collection;

/// Which partitions a clear operation empties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    Drawn,
    Imported,
    All,
}

impl ClearScope {
    pub fn display_name(&self) -> &'static str {
        match self {
            ClearScope::Drawn => "Clear drawn",
            ClearScope::Imported => "Clear imported",
            ClearScope::All => "Clear all",
        }
    }
}

/// Drawn and imported features, each in insertion order. Ids are unique
/// across both partitions.
#[derive(Resource, Debug, Default, Clone)]
pub struct FeatureStore {
    drawn: Vec<FeatureRecord>,
    imported: Vec<FeatureRecord>,
}

impl FeatureStore {
    /// Replace the imported partition with the features of a GeoJSON
    /// FeatureCollection. On error the store is left exactly as it was.
    pub fn import_replace(&mut self, payload: &Value) -> Result<usize, ImportError> {
        let taken: HashSet<FeatureId> = self.drawn.iter().map(|f| f.id.clone()).collect();
        let records = parse_feature_collection(payload, &taken)?;
        let count = records.len();
        self.imported = records;
        info!("Imported {} feature(s), replacing previous import", count);
        Ok(count)
    }

    /// Append a drawn feature. A colliding id is replaced with a fresh one;
    /// the id actually stored is returned.
    pub fn add_drawn(&mut self, mut feature: FeatureRecord) -> FeatureId {
        if self.contains(&feature.id) {
            let fresh = new_feature_id();
            warn!("Feature id {} already in use, reassigning to {}", feature.id, fresh);
            feature.id = fresh;
            feature
                .properties
                .insert("id".into(), Value::String(feature.id.clone()));
        }
        feature.provenance = Provenance::Drawn;
        let id = feature.id.clone();
        self.drawn.push(feature);
        debug!("Committed drawn feature {}", id);
        id
    }

    /// Remove a feature from whichever partition holds it. Missing ids are
    /// not an error; returns whether anything was removed.
    pub fn delete_by_id(&mut self, id: &str) -> bool {
        let before = self.len();
        self.drawn.retain(|f| f.id != id);
        self.imported.retain(|f| f.id != id);
        let removed = self.len() != before;
        if removed {
            debug!("Deleted feature {}", id);
        }
        removed
    }

    pub fn clear(&mut self, scope: ClearScope) {
        match scope {
            ClearScope::Drawn => self.drawn.clear(),
            ClearScope::Imported => self.imported.clear(),
            ClearScope::All => {
                self.drawn.clear();
                self.imported.clear();
            }
        }
        debug!("Cleared features ({:?})", scope);
    }

    /// Drawn features followed by imported ones, each in insertion order.
    pub fn all_features(&self) -> impl Iterator<Item = &FeatureRecord> + '_ {
        self.drawn.iter().chain(self.imported.iter())
    }

    pub fn drawn(&self) -> &[FeatureRecord] {
        &self.drawn
    }

    pub fn imported(&self) -> &[FeatureRecord] {
        &self.imported
    }

    pub fn get(&self, id: &str) -> Option<&FeatureRecord> {
        self.all_features().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.drawn.len() + self.imported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty() && self.imported.is_empty()
    }
}
