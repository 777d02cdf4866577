//! Location search through the Mapbox forward geocoding API.

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task};
use futures_lite::future;
use serde_json::Value;

use crate::config::AppConfig;
use crate::constants::SEARCH_RESULT_ZOOM;
use crate::editor::FlyToRequest;
use crate::geo::{GeocodeError, LngLat, SearchMarker};
use crate::ui::Notices;

use super::request::{RequestToken, RequestTracker};
use super::USER_AGENT;

/// Search dialog state
#[derive(Resource, Default)]
pub struct GeocodeState {
    pub dialog_open: bool,
    pub query: String,
    pub last_error: Option<String>,
    tracker: RequestTracker,
}

impl GeocodeState {
    pub fn open(&mut self) {
        self.dialog_open = true;
        self.last_error = None;
    }

    /// Close the dialog; a search still in flight will be ignored.
    pub fn close(&mut self) {
        self.dialog_open = false;
        self.last_error = None;
        self.tracker.invalidate();
    }

    pub fn is_searching(&self) -> bool {
        self.tracker.is_pending()
    }
}

#[derive(Message)]
pub struct GeocodeRequest {
    pub query: String,
}

#[derive(Message)]
pub struct GeocodeFinished {
    pub token: RequestToken,
    pub query: String,
    pub result: Result<LngLat, GeocodeError>,
}

#[derive(Component)]
pub struct GeocodeTask {
    token: RequestToken,
    query: String,
    task: Task<Result<LngLat, GeocodeError>>,
}

/// Percent-encode a string for use as one URL path segment.
fn encode_path_segment(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// `{endpoint}/{query}.json`; the token is added as a query parameter.
pub fn geocode_url(endpoint: &str, query: &str) -> String {
    format!(
        "{}/{}.json",
        endpoint.trim_end_matches('/'),
        encode_path_segment(query)
    )
}

/// First feature's `center` as a coordinate.
pub fn parse_geocode_response(body: &Value, query: &str) -> Result<LngLat, GeocodeError> {
    let first = body
        .get("features")
        .and_then(Value::as_array)
        .and_then(|features| features.first())
        .ok_or_else(|| GeocodeError::NotFound(query.to_string()))?;

    let center = first
        .get("center")
        .and_then(Value::as_array)
        .ok_or_else(|| GeocodeError::Parse("feature has no center".to_string()))?;

    match center.as_slice() {
        [lng, lat, ..] => match (lng.as_f64(), lat.as_f64()) {
            (Some(lng), Some(lat)) => Ok(LngLat::new(lng, lat)),
            _ => Err(GeocodeError::Parse("center is not numeric".to_string())),
        },
        _ => Err(GeocodeError::Parse("center needs two numbers".to_string())),
    }
}

/// Resolve `query` to a coordinate.
pub fn geocode(query: &str, endpoint: &str, token: Option<&str>) -> Result<LngLat, GeocodeError> {
    let token = token.ok_or(GeocodeError::MissingToken)?;

    let response = ureq::get(&geocode_url(endpoint, query))
        .set("User-Agent", USER_AGENT)
        .query("access_token", token)
        .query("limit", "1")
        .call();

    match response {
        Ok(resp) => {
            let body = resp
                .into_json::<Value>()
                .map_err(|e| GeocodeError::Parse(e.to_string()))?;
            parse_geocode_response(&body, query)
        }
        Err(ureq::Error::Status(code, _)) => {
            Err(GeocodeError::Network(format!("server responded with HTTP {}", code)))
        }
        Err(e) => Err(GeocodeError::Network(e.to_string())),
    }
}

/// Spawn a lookup for the latest search request. Blank queries are ignored.
pub fn start_geocode(
    mut commands: Commands,
    mut events: MessageReader<GeocodeRequest>,
    mut state: ResMut<GeocodeState>,
    config: Res<AppConfig>,
) {
    let Some(request) = events.read().last() else {
        return;
    };

    let query = request.query.trim().to_string();
    if query.is_empty() {
        return;
    }

    let token = state.tracker.begin();
    state.last_error = None;
    debug!("Geocoding \"{}\"", query);

    let endpoint = config.data.geocode_endpoint.clone();
    let access_token = config.mapbox_token();
    let lookup_query = query.clone();
    let task = IoTaskPool::get()
        .spawn(async move { geocode(&lookup_query, &endpoint, access_token.as_deref()) });

    commands.spawn(GeocodeTask { token, query, task });
}

pub fn poll_geocode_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut GeocodeTask)>,
    mut finished: MessageWriter<GeocodeFinished>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.task)) {
            finished.write(GeocodeFinished {
                token: task.token,
                query: task.query.clone(),
                result,
            });
            commands.entity(entity).despawn();
        }
    }
}

pub fn apply_geocode_results(
    mut events: MessageReader<GeocodeFinished>,
    mut state: ResMut<GeocodeState>,
    mut marker: ResMut<SearchMarker>,
    mut notices: ResMut<Notices>,
    mut fly_to: MessageWriter<FlyToRequest>,
) {
    for event in events.read() {
        if !state.tracker.accept(event.token) {
            debug!("Dropping stale geocode result for \"{}\"", event.query);
            continue;
        }

        match &event.result {
            Ok(position) => {
                info!("Found \"{}\" at {}", event.query, position);
                marker.position = Some(*position);
                fly_to.write(FlyToRequest {
                    center: *position,
                    zoom: SEARCH_RESULT_ZOOM,
                });
                state.dialog_open = false;
                state.last_error = None;
            }
            Err(e) => {
                warn!("Geocoding \"{}\" failed: {}", event.query, e);
                notices.error(e.to_string());
                state.last_error = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_encodes_query() {
        assert_eq!(
            geocode_url("https://api.mapbox.com/geocoding/v5/mapbox.places/", "Kraków, PL"),
            "https://api.mapbox.com/geocoding/v5/mapbox.places/Krak%C3%B3w%2C%20PL.json"
        );
    }

    #[test]
    fn test_parse_takes_first_center() {
        let body = json!({
            "features": [
                {"center": [19.94, 50.06], "place_name": "Kraków"},
                {"center": [0.0, 0.0]},
            ]
        });
        assert_eq!(
            parse_geocode_response(&body, "krakow").unwrap(),
            LngLat::new(19.94, 50.06)
        );
    }

    #[test]
    fn test_parse_empty_features_is_not_found() {
        let body = json!({"features": []});
        let err = parse_geocode_response(&body, "nowhere").unwrap_err();
        assert!(matches!(err, GeocodeError::NotFound(q) if q == "nowhere"));
    }

    #[test]
    fn test_parse_bad_center_is_parse_error() {
        let body = json!({"features": [{"center": ["a", "b"]}]});
        assert!(matches!(
            parse_geocode_response(&body, "x"),
            Err(GeocodeError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_token_fails_before_network() {
        assert!(matches!(
            geocode("anything", "http://127.0.0.1:9", None),
            Err(GeocodeError::MissingToken)
        ));
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.init_resource::<GeocodeState>()
            .init_resource::<SearchMarker>()
            .init_resource::<Notices>()
            .add_message::<GeocodeFinished>()
            .add_message::<FlyToRequest>()
            .add_systems(Update, apply_geocode_results);
        app
    }

    #[test]
    fn test_success_sets_marker_and_flies() {
        let mut app = test_app();
        let token = {
            let mut state = app.world_mut().resource_mut::<GeocodeState>();
            state.open();
            state.tracker.begin()
        };
        app.world_mut().write_message(GeocodeFinished {
            token,
            query: "Rzeszów".to_string(),
            result: Ok(LngLat::new(21.999121, 50.041187)),
        });
        app.update();

        assert_eq!(
            app.world().resource::<SearchMarker>().position,
            Some(LngLat::new(21.999121, 50.041187))
        );
        assert!(!app.world().resource::<GeocodeState>().dialog_open);
        let fly_to = app.world().resource::<Messages<FlyToRequest>>();
        assert_eq!(fly_to.len(), 1);
    }

    #[test]
    fn test_stale_result_keeps_marker() {
        let mut app = test_app();
        let token = {
            let mut state = app.world_mut().resource_mut::<GeocodeState>();
            let token = state.tracker.begin();
            state.close();
            token
        };
        app.world_mut().write_message(GeocodeFinished {
            token,
            query: "late".to_string(),
            result: Ok(LngLat::new(1.0, 1.0)),
        });
        app.update();

        assert_eq!(app.world().resource::<SearchMarker>().position, None);
    }

    #[test]
    fn test_not_found_reports_without_moving() {
        let mut app = test_app();
        let token = app
            .world_mut()
            .resource_mut::<GeocodeState>()
            .tracker
            .begin();
        app.world_mut().write_message(GeocodeFinished {
            token,
            query: "qwertyuiop".to_string(),
            result: Err(GeocodeError::NotFound("qwertyuiop".to_string())),
        });
        app.update();

        assert_eq!(app.world().resource::<SearchMarker>().position, None);
        assert!(app.world().resource::<GeocodeState>().last_error.is_some());
        assert_eq!(app.world().resource::<Notices>().items().len(), 1);
    }
}
