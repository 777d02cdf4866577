//! The drawing session state machine.
//!
//! ```text
//!   Idle --activate(mode)--> Collecting --finish (ok)--> Collecting (empty)
//!    ^                           |  ^
//!    +--------cancel-------------+  +-- add_point / undo_last_point
//! ```
//!
//! Points only exist while collecting. Switching to a different mode while
//! points are pending is refused so a point sequence never mixes modes.

use bevy::prelude::*;

use super::builder::{build_feature, DrawMode};
use super::coord::LngLat;
use super::error::ValidationError;
use super::feature::FeatureId;
use super::store::FeatureStore;

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct DrawingSession {
    mode: DrawMode,
    points: Vec<LngLat>,
    active: bool,
}

impl DrawingSession {
    /// Enter collecting state for `mode`.
    ///
    /// Already collecting in the same mode: nothing happens, pending points
    /// are kept. Collecting in another mode with no points: the mode switches.
    /// Collecting in another mode with points pending: refused.
    pub fn activate(&mut self, mode: DrawMode) -> Result<(), ValidationError> {
        if self.active {
            if self.mode == mode {
                return Ok(());
            }
            if !self.points.is_empty() {
                return Err(ValidationError::ModeSwitchBlocked {
                    current: self.mode.geometry_kind(),
                    requested: mode.geometry_kind(),
                    pending: self.points.len(),
                });
            }
        }
        self.mode = mode;
        self.points.clear();
        self.active = true;
        debug!("Drawing session collecting {:?}", mode);
        Ok(())
    }

    /// Record a clicked point. Ignored (returns false) unless collecting.
    pub fn add_point(&mut self, coord: LngLat) -> bool {
        if !self.active || !coord.is_finite() {
            return false;
        }
        self.points.push(coord);
        true
    }

    /// Remove the most recent point, if any.
    pub fn undo_last_point(&mut self) -> Option<LngLat> {
        self.points.pop()
    }

    /// Build the shape and commit it to `store` as a drawn feature.
    ///
    /// On success the points are cleared and the session keeps collecting in
    /// the same mode. On failure neither the session nor the store changes.
    pub fn finish(&mut self, store: &mut FeatureStore) -> Result<FeatureId, ValidationError> {
        let feature = build_feature(self.mode, &self.points)?;
        let id = store.add_drawn(feature);
        self.points.clear();
        info!("Finished {:?} drawing as feature {}", self.mode, id);
        Ok(id)
    }

    /// Discard pending points and stop collecting.
    pub fn cancel(&mut self) {
        self.points.clear();
        self.active = false;
    }

    /// Leave drawing (switching to another tool). Pending points are dropped,
    /// so reactivating always starts a fresh session.
    pub fn deactivate(&mut self) {
        self.cancel();
    }

    /// Finish-button predicate: enough points for the current mode.
    pub fn can_finish(&self) -> bool {
        self.active && self.points.len() >= self.mode.min_points()
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn points(&self) -> &[LngLat] {
        &self.points
    }

    pub fn is_collecting(&self) -> bool {
        self.active
    }

    /// Whether collecting in `mode` specifically.
    pub fn is_collecting_mode(&self, mode: DrawMode) -> bool {
        self.active && self.mode == mode
    }
}
