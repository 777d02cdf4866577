//! Remote GeoJSON import.
//!
//! The fetch runs on the IO task pool; the finished task is turned into an
//! [`ImportFinished`] message and applied to the store on the main schedule.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task};
use futures_lite::future;
use serde_json::Value;

use crate::config::{AppConfig, RememberImportUrlRequest};
use crate::geo::{FeatureContext, ImportError};
use crate::ui::Notices;

use super::request::{RequestToken, RequestTracker};
use super::USER_AGENT;

/// Import dialog state
#[derive(Resource, Default)]
pub struct ImportState {
    pub dialog_open: bool,
    /// URL being edited in the dialog
    pub url: String,
    pub last_error: Option<String>,
    tracker: RequestTracker,
}

impl ImportState {
    pub fn open(&mut self, default_url: &str) {
        self.dialog_open = true;
        self.last_error = None;
        if self.url.trim().is_empty() {
            self.url = default_url.to_string();
        }
    }

    /// Close the dialog; a fetch still in flight will be ignored.
    pub fn close(&mut self) {
        self.dialog_open = false;
        self.last_error = None;
        self.tracker.invalidate();
    }

    pub fn is_loading(&self) -> bool {
        self.tracker.is_pending()
    }
}

/// Fetch and import the collection at `url`.
#[derive(Message)]
pub struct ImportRequest {
    pub url: String,
}

/// A fetch completed (successfully or not).
#[derive(Message)]
pub struct ImportFinished {
    pub token: RequestToken,
    pub url: String,
    pub result: Result<Value, ImportError>,
}

#[derive(Component)]
pub struct ImportTask {
    token: RequestToken,
    url: String,
    task: Task<Result<Value, ImportError>>,
}

/// Download a URL and parse the body as JSON.
pub fn fetch_feature_collection(url: &str) -> Result<Value, ImportError> {
    let response = ureq::get(url).set("User-Agent", USER_AGENT).call();

    match response {
        Ok(resp) => resp
            .into_json::<Value>()
            .map_err(|e| ImportError::Parse(e.to_string())),
        Err(ureq::Error::Status(code, _)) => {
            Err(ImportError::Fetch(format!("server responded with HTTP {}", code)))
        }
        Err(e) => Err(ImportError::Fetch(e.to_string())),
    }
}

/// Spawn a fetch for the latest import request.
pub fn start_import(
    mut commands: Commands,
    mut events: MessageReader<ImportRequest>,
    mut state: ResMut<ImportState>,
    mut notices: ResMut<Notices>,
) {
    let Some(request) = events.read().last() else {
        return;
    };

    let url = request.url.trim().to_string();
    if url.is_empty() {
        notices.error("Enter a GeoJSON URL to import");
        return;
    }

    let token = state.tracker.begin();
    state.last_error = None;
    info!("Fetching GeoJSON from {}", url);

    let task_pool = IoTaskPool::get();
    let fetch_url = url.clone();
    let task = task_pool.spawn(async move { fetch_feature_collection(&fetch_url) });

    commands.spawn(ImportTask { token, url, task });
}

/// Poll running fetches and forward finished ones as messages.
pub fn poll_import_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ImportTask)>,
    mut finished: MessageWriter<ImportFinished>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.task)) {
            finished.write(ImportFinished {
                token: task.token,
                url: task.url.clone(),
                result,
            });
            commands.entity(entity).despawn();
        }
    }
}

pub fn apply_import_results(
    mut events: MessageReader<ImportFinished>,
    mut state: ResMut<ImportState>,
    mut features: FeatureContext,
    mut notices: ResMut<Notices>,
    mut remember: MessageWriter<RememberImportUrlRequest>,
) {
    for event in events.read() {
        if !state.tracker.accept(event.token) {
            debug!("Dropping stale import result for {}", event.url);
            continue;
        }

        let outcome = match &event.result {
            Ok(payload) => features.import_replace(payload).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(count) => {
                notices.success(format!("Imported {} feature(s)", count));
                remember.write(RememberImportUrlRequest {
                    url: event.url.clone(),
                });
                state.dialog_open = false;
                state.last_error = None;
            }
            Err(message) => {
                warn!("Import from {} failed: {}", event.url, message);
                notices.error(message.clone());
                state.last_error = Some(message);
            }
        }
    }
}

/// Prefill the dialog URL from config once it is loaded.
pub fn init_import_url(config: Res<AppConfig>, mut state: ResMut<ImportState>) {
    state.url = config.data.last_import_url.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{FeatureStore, SelectionSet};
    use serde_json::json;

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<ImportState>()
            .init_resource::<FeatureStore>()
            .init_resource::<SelectionSet>()
            .init_resource::<Notices>()
            .add_message::<ImportFinished>()
            .add_message::<RememberImportUrlRequest>()
            .add_systems(Update, apply_import_results);
        app
    }

    fn payload() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "id": "q1",
                "properties": {"mag": 2.1},
                "geometry": {"type": "Point", "coordinates": [-120.5, 36.2, 5.0]},
            }],
        })
    }

    fn begin(app: &mut App) -> RequestToken {
        let mut state = app.world_mut().resource_mut::<ImportState>();
        state.dialog_open = true;
        state.tracker.begin()
    }

    #[test]
    fn test_current_result_replaces_imports_and_closes_dialog() {
        let mut app = test_app();
        let token = begin(&mut app);
        app.world_mut().write_message(ImportFinished {
            token,
            url: "https://example.com/q.geojson".to_string(),
            result: Ok(payload()),
        });
        app.update();

        assert!(app.world().resource::<FeatureStore>().contains("q1"));
        let state = app.world().resource::<ImportState>();
        assert!(!state.dialog_open);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_result_after_close_is_dropped() {
        let mut app = test_app();
        let token = begin(&mut app);
        app.world_mut().resource_mut::<ImportState>().close();

        app.world_mut().write_message(ImportFinished {
            token,
            url: "https://example.com/q.geojson".to_string(),
            result: Ok(payload()),
        });
        app.update();

        assert!(app.world().resource::<FeatureStore>().is_empty());
        assert!(app.world().resource::<Notices>().items().is_empty());
    }

    #[test]
    fn test_superseded_result_is_dropped() {
        let mut app = test_app();
        let old = begin(&mut app);
        let _new = begin(&mut app);

        app.world_mut().write_message(ImportFinished {
            token: old,
            url: "https://example.com/old.geojson".to_string(),
            result: Ok(payload()),
        });
        app.update();

        assert!(app.world().resource::<FeatureStore>().is_empty());
        assert!(app.world().resource::<ImportState>().is_loading());
    }

    #[test]
    fn test_invalid_payload_leaves_store_and_reports() {
        let mut app = test_app();
        let token = begin(&mut app);
        app.world_mut().write_message(ImportFinished {
            token,
            url: "https://example.com/bad.geojson".to_string(),
            result: Ok(json!({"type": "Feature"})),
        });
        app.update();

        assert!(app.world().resource::<FeatureStore>().is_empty());
        let state = app.world().resource::<ImportState>();
        assert!(state.dialog_open);
        assert!(state.last_error.is_some());
        assert_eq!(app.world().resource::<Notices>().items().len(), 1);
    }

    #[test]
    fn test_fetch_error_is_reported() {
        let mut app = test_app();
        let token = begin(&mut app);
        app.world_mut().write_message(ImportFinished {
            token,
            url: "https://example.com/missing.geojson".to_string(),
            result: Err(ImportError::Fetch("server responded with HTTP 404".to_string())),
        });
        app.update();

        let state = app.world().resource::<ImportState>();
        assert!(state
            .last_error
            .as_deref()
            .is_some_and(|e| e.contains("HTTP 404")));
    }

    #[test]
    fn test_open_prefills_default_url_only_when_empty() {
        let mut state = ImportState::default();
        state.open("https://a");
        assert_eq!(state.url, "https://a");
        state.url = "https://b".to_string();
        state.open("https://a");
        assert_eq!(state.url, "https://b");
    }
}
