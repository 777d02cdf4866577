//! GeoJSON export through a native save dialog.

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::geo::{geojson::to_feature_collection, FeatureStore};
use crate::ui::Notices;

#[derive(Resource, Default)]
pub struct ExportState {
    /// A save dialog is open or the file is being written
    pub in_progress: bool,
}

#[derive(Message)]
pub struct ExportRequest;

/// How an export attempt ended
#[derive(Debug)]
pub enum ExportOutcome {
    Saved { path: PathBuf, count: usize },
    Cancelled,
    Failed(String),
}

#[derive(Component)]
pub struct ExportTask(Task<ExportOutcome>);

/// Pretty-printed FeatureCollection of every committed feature.
pub fn export_document(store: &FeatureStore) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_feature_collection(store.all_features()))
}

/// Snapshot the store and open the save dialog in the background.
pub fn start_export(
    mut commands: Commands,
    mut events: MessageReader<ExportRequest>,
    mut state: ResMut<ExportState>,
    store: Res<FeatureStore>,
    config: Res<AppConfig>,
    mut notices: ResMut<Notices>,
) {
    if events.read().last().is_none() || state.in_progress {
        return;
    }

    if store.is_empty() {
        notices.info("Nothing to export yet");
        return;
    }

    let count = store.len();
    let document = match export_document(&store) {
        Ok(document) => document,
        Err(e) => {
            error!("Failed to serialize features: {}", e);
            notices.error(format!("Export failed: {}", e));
            return;
        }
    };

    let file_name = config.data.export_file_name.clone();
    state.in_progress = true;

    let task = AsyncComputeTaskPool::get().spawn(async move {
        let Some(handle) = rfd::AsyncFileDialog::new()
            .set_title("Export GeoJSON")
            .set_file_name(&file_name)
            .add_filter("GeoJSON", &["geojson", "json"])
            .save_file()
            .await
        else {
            return ExportOutcome::Cancelled;
        };

        let path = handle.path().to_path_buf();
        match std::fs::write(&path, document) {
            Ok(()) => ExportOutcome::Saved { path, count },
            Err(e) => ExportOutcome::Failed(format!("Could not write {}: {}", path.display(), e)),
        }
    });

    commands.spawn(ExportTask(task));
}

pub fn poll_export_tasks(
    mut commands: Commands,
    mut state: ResMut<ExportState>,
    mut tasks: Query<(Entity, &mut ExportTask)>,
    mut notices: ResMut<Notices>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        let Some(outcome) = future::block_on(future::poll_once(&mut task.0)) else {
            continue;
        };

        state.in_progress = false;
        match outcome {
            ExportOutcome::Saved { path, count } => {
                info!("Exported {} feature(s) to {:?}", count, path);
                notices.success(format!("Exported {} feature(s) to {}", count, path.display()));
            }
            ExportOutcome::Cancelled => debug!("Export cancelled"),
            ExportOutcome::Failed(message) => {
                error!("{}", message);
                notices.error(message);
            }
        }

        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{build_polygon, LngLat};
    use serde_json::{json, Value};

    #[test]
    fn test_document_contains_drawn_and_imported() {
        let mut store = FeatureStore::default();
        store
            .import_replace(&json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "id": "imp",
                    "properties": {"mag": 1.0},
                    "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
                }],
            }))
            .unwrap();
        let drawn = build_polygon(&[
            LngLat::new(0.0, 0.0),
            LngLat::new(1.0, 0.0),
            LngLat::new(1.0, 1.0),
        ])
        .unwrap();
        let drawn_id = store.add_drawn(drawn);

        let text = export_document(&store).unwrap();
        assert!(text.contains('\n'), "export should be pretty-printed");

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["type"], "FeatureCollection");
        let features = parsed["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        // Drawn features come first
        assert_eq!(features[0]["id"], json!(drawn_id));
        assert_eq!(features[0]["properties"]["id"], json!(drawn_id));
        assert_eq!(features[0]["geometry"]["type"], "Polygon");
        assert_eq!(features[1]["id"], "imp");
    }

    #[test]
    fn test_empty_store_exports_empty_collection() {
        let text = export_document(&FeatureStore::default()).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["features"], json!([]));
    }
}
