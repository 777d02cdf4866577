//! Selection shared between the table view and the map.
//!
//! Two ordered id sets are tracked:
//! - the table selection (checkbox state, also highlighted on the map)
//! - transient map highlights from clicking features directly
//!
//! Map clicks only touch the transient set; table row clicks touch both.
//! Both sets only ever hold ids present in the feature store.

use bevy::prelude::*;

use super::feature::FeatureId;
use super::store::FeatureStore;

#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    selected: Vec<FeatureId>,
    highlighted: Vec<FeatureId>,
}

impl SelectionSet {
    /// Replace the table selection. Ids not present in the store are dropped
    /// silently; duplicates keep their first position.
    pub fn select<I, S>(&mut self, ids: I, store: &FeatureStore)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next: Vec<FeatureId> = Vec::new();
        for id in ids {
            let id = id.as_ref();
            if store.contains(id) && !next.iter().any(|existing| existing == id) {
                next.push(id.to_string());
            }
        }
        self.selected = next;
    }

    /// Toggle the transient highlight of a feature clicked on the map.
    /// Returns whether the feature is highlighted afterwards.
    pub fn toggle_highlight_on_click(&mut self, id: &str, store: &FeatureStore) -> bool {
        if let Some(index) = self.highlighted.iter().position(|h| h == id) {
            self.highlighted.remove(index);
            return false;
        }
        if !store.contains(id) {
            return false;
        }
        self.highlighted.push(id.to_string());
        true
    }

    /// A table row was clicked: highlight it and add it to the selection.
    pub fn click_row(&mut self, id: &str, store: &FeatureStore) {
        if !store.contains(id) {
            return;
        }
        if !self.selected.iter().any(|s| s == id) {
            self.selected.push(id.to_string());
        }
        if !self.highlighted.iter().any(|h| h == id) {
            self.highlighted.push(id.to_string());
        }
    }

    /// Toggle table-selection membership of one row (checkbox).
    pub fn toggle_selected(&mut self, id: &str, store: &FeatureStore) {
        let mut ids = self.selected.clone();
        if let Some(index) = ids.iter().position(|s| s == id) {
            ids.remove(index);
        } else {
            ids.push(id.to_string());
        }
        self.select(ids, store);
    }

    pub fn clear_highlights(&mut self) {
        self.highlighted.clear();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.highlighted.clear();
    }

    /// Drop every id no longer present in the store. Returns whether
    /// anything was removed.
    pub fn retain_present(&mut self, store: &FeatureStore) -> bool {
        let before = self.selected.len() + self.highlighted.len();
        self.selected.retain(|id| store.contains(id));
        self.highlighted.retain(|id| store.contains(id));
        before != self.selected.len() + self.highlighted.len()
    }

    /// Whether `retain_present` would change anything.
    pub fn has_stale(&self, store: &FeatureStore) -> bool {
        self.selected
            .iter()
            .chain(self.highlighted.iter())
            .any(|id| !store.contains(id))
    }

    pub fn selected(&self) -> &[FeatureId] {
        &self.selected
    }

    pub fn highlighted(&self) -> &[FeatureId] {
        &self.highlighted
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn is_highlighted(&self, id: &str) -> bool {
        self.is_selected(id) || self.highlighted.iter().any(|h| h == id)
    }

    /// Ids to draw highlight layers for: table selection first, then
    /// transient highlights that are not also selected.
    pub fn highlight_order(&self) -> impl Iterator<Item = &FeatureId> + '_ {
        self.selected.iter().chain(
            self.highlighted
                .iter()
                .filter(|id| !self.selected.contains(id)),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.highlighted.is_empty()
    }
}
