//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration defaults that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// USGS "all earthquakes, past month" feed, prefilled in the import dialog
pub const DEFAULT_IMPORT_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_month.geojson";

/// Mapbox forward geocoding endpoint (query and `.json` are appended)
pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

/// Environment variable that overrides the configured Mapbox token
pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_TOKEN";

pub const DEFAULT_EXPORT_FILE_NAME: &str = "features.geojson";

/// Initial map center (longitude, latitude)
pub const DEFAULT_CENTER: (f64, f64) = (21.999121, 50.041187);

pub const DEFAULT_ZOOM: f32 = 4.0;

/// Zoom level the view flies to after a successful location search
pub const SEARCH_RESULT_ZOOM: f32 = 12.0;

pub const MIN_ZOOM: f32 = 0.0;
/// Deepest zoom at which one screen pixel still spans more than one f32 step
/// of world coordinates anywhere on the canvas
pub const MAX_ZOOM: f32 = 15.0;

/// Seconds a flight to a search result takes
pub const FLY_TO_DURATION_SECS: f32 = 1.2;

/// Page size choices offered by the feature table
pub const TABLE_PAGE_SIZES: [usize; 3] = [10, 50, 100];

/// Maximum number of property columns shown in the feature table
pub const MAX_TABLE_COLUMNS: usize = 8;

/// Seconds a notice stays in the notice area
pub const NOTICE_DURATION_SECS: f32 = 6.0;

/// Pick tolerance around points and lines, in screen pixels
pub const PICK_TOLERANCE_PX: f32 = 6.0;
