use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_CENTER, DEFAULT_EXPORT_FILE_NAME, DEFAULT_GEOCODE_ENDPOINT, DEFAULT_IMPORT_URL,
    DEFAULT_ZOOM, MAPBOX_TOKEN_ENV,
};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Map view shown at startup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialView {
    pub lng: f64,
    pub lat: f64,
    pub zoom: f32,
}

impl Default for InitialView {
    fn default() -> Self {
        Self {
            lng: DEFAULT_CENTER.0,
            lat: DEFAULT_CENTER.1,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfigData {
    /// Last successfully imported URL, prefilled in the import dialog
    #[serde(default = "default_import_url")]
    pub last_import_url: String,

    #[serde(default = "default_geocode_endpoint")]
    pub geocode_endpoint: String,

    /// Mapbox access token (the environment variable wins when set)
    #[serde(default)]
    pub mapbox_token: Option<String>,

    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,

    #[serde(default)]
    pub initial_view: InitialView,
}

fn default_import_url() -> String {
    DEFAULT_IMPORT_URL.to_string()
}

fn default_geocode_endpoint() -> String {
    DEFAULT_GEOCODE_ENDPOINT.to_string()
}

fn default_export_file_name() -> String {
    DEFAULT_EXPORT_FILE_NAME.to_string()
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            last_import_url: default_import_url(),
            geocode_endpoint: default_geocode_endpoint(),
            mapbox_token: None,
            export_file_name: default_export_file_name(),
            initial_view: InitialView::default(),
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: get_config_path(),
            dirty: false,
        }
    }
}

impl AppConfig {
    /// Token used for geocoding requests.
    pub fn mapbox_token(&self) -> Option<String> {
        resolve_token(
            std::env::var(MAPBOX_TOKEN_ENV).ok(),
            self.data.mapbox_token.as_deref(),
        )
    }
}

/// Environment token first, then the stored one. Blank values count as unset.
fn resolve_token(env: Option<String>, stored: Option<&str>) -> Option<String> {
    env.filter(|t| !t.trim().is_empty())
        .or_else(|| stored.filter(|t| !t.trim().is_empty()).map(str::to_string))
        .map(|t| t.trim().to_string())
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to remember the URL of a successful import
#[derive(Message)]
pub struct RememberImportUrlRequest {
    pub url: String,
}

/// Get the path to the config file (platform-appropriate location)
fn get_config_path() -> PathBuf {
    crate::paths::config_file()
}

/// Parse config file contents. Returns the reset reason on failure.
fn parse_config(json: &str) -> Result<AppConfigData, String> {
    serde_json::from_str(json).map_err(|e| format!("Configuration file was corrupted: {}", e))
}

/// Result of loading config from disk
struct LoadConfigResult {
    data: AppConfigData,
    config_path: PathBuf,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

/// Load configuration from disk
fn load_config() -> LoadConfigResult {
    let config_path = get_config_path();

    let (data, reset_reason) = if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(json) => match parse_config(&json) {
                Ok(data) => {
                    info!("Loaded config from {:?}", config_path);
                    (data, None)
                }
                Err(reason) => {
                    warn!("{}", reason);
                    (AppConfigData::default(), Some(reason))
                }
            },
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    LoadConfigResult {
        data,
        config_path,
        reset_reason,
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config();
    config.data = result.data;
    config.config_path = result.config_path;
    config.dirty = false;

    if config.mapbox_token().is_none() {
        info!(
            "No Mapbox token configured; set {} to enable location search",
            MAPBOX_TOKEN_ENV
        );
    }

    // Set notification if config was reset due to an error
    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to remember the last imported URL
fn remember_import_url_system(
    mut events: MessageReader<RememberImportUrlRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.last_import_url == event.url {
            continue;
        }
        config.data.last_import_url = event.url.clone();
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<RememberImportUrlRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    remember_import_url_system.run_if(on_message::<RememberImportUrlRequest>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert_eq!(data.last_import_url, DEFAULT_IMPORT_URL);
        assert_eq!(data.geocode_endpoint, DEFAULT_GEOCODE_ENDPOINT);
        assert!(data.mapbox_token.is_none());
        assert_eq!(data.export_file_name, DEFAULT_EXPORT_FILE_NAME);
        assert_eq!(data.initial_view, InitialView::default());
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let data = parse_config(r#"{"export_file_name": "mine.geojson"}"#).unwrap();
        assert_eq!(data.export_file_name, "mine.geojson");
        assert_eq!(data.last_import_url, DEFAULT_IMPORT_URL);
        assert_eq!(data.initial_view.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn test_corrupt_config_reports_reason() {
        let reason = parse_config("{not json").unwrap_err();
        assert!(reason.starts_with("Configuration file was corrupted"));
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            last_import_url: "https://example.com/a.geojson".to_string(),
            mapbox_token: Some("pk.test".to_string()),
            initial_view: InitialView {
                lng: 1.0,
                lat: 2.0,
                zoom: 3.0,
            },
            ..AppConfigData::default()
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.last_import_url, data.last_import_url);
        assert_eq!(parsed.mapbox_token, data.mapbox_token);
        assert_eq!(parsed.initial_view, data.initial_view);
    }

    #[test]
    fn test_env_token_overrides_stored() {
        assert_eq!(
            resolve_token(Some("pk.env".to_string()), Some("pk.file")),
            Some("pk.env".to_string())
        );
    }

    #[test]
    fn test_blank_env_token_falls_back_to_stored() {
        assert_eq!(
            resolve_token(Some("  ".to_string()), Some("pk.file")),
            Some("pk.file".to_string())
        );
        assert_eq!(resolve_token(None, Some("")), None);
        assert_eq!(resolve_token(None, None), None);
    }

    #[test]
    fn test_remember_import_url_marks_dirty() {
        let mut app = App::new();
        app.insert_resource(AppConfig {
            data: AppConfigData::default(),
            config_path: PathBuf::from("unused-config.json"),
            dirty: false,
        })
        .add_message::<RememberImportUrlRequest>()
        .add_message::<SaveConfigRequest>()
        .add_systems(Update, remember_import_url_system);

        app.world_mut().write_message(RememberImportUrlRequest {
            url: "https://example.com/quakes.geojson".to_string(),
        });
        app.update();

        let config = app.world().resource::<AppConfig>();
        assert_eq!(config.data.last_import_url, "https://example.com/quakes.geojson");
        assert!(config.dirty);
    }
}
