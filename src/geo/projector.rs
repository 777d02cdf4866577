//! Projection of editor state into an ordered list of render layers.
//!
//! Layer order, bottom to top:
//! 1. `base-features` - every committed feature, styled by geometry type
//! 2. `highlight-<id>` - one per highlighted feature still in the store
//! 3. `search-pin` - the latest location search result, if any
//! 4. `draft-points` / `draft-path` - the in-progress drawing, if collecting
//!
//! [`project_layers`] is a pure function of its inputs.

use super::coord::LngLat;
use super::feature::{FeatureId, FeatureRecord, GeometryKind};
use super::selection::SelectionSet;
use super::session::DrawingSession;
use super::store::FeatureStore;

pub type Rgba = [u8; 4];

pub const BASE_LAYER_ID: &str = "base-features";
pub const SEARCH_PIN_LAYER_ID: &str = "search-pin";
pub const DRAFT_POINTS_LAYER_ID: &str = "draft-points";
pub const DRAFT_PATH_LAYER_ID: &str = "draft-path";

/// Fill, stroke and point size for one kind of shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub fill: Rgba,
    pub stroke: Rgba,
    pub stroke_width: f32,
    pub point_radius: f32,
}

pub const POLYGON_PAINT: Paint = Paint {
    fill: [255, 0, 0, 100],
    stroke: [0, 0, 0, 255],
    stroke_width: 2.0,
    point_radius: 0.0,
};

pub const LINE_PAINT: Paint = Paint {
    fill: [0, 0, 0, 0],
    stroke: [13, 19, 28, 255],
    stroke_width: 3.0,
    point_radius: 0.0,
};

pub const POINT_PAINT: Paint = Paint {
    fill: [200, 0, 80, 180],
    stroke: [200, 0, 80, 255],
    stroke_width: 1.0,
    point_radius: 5.0,
};

pub const HIGHLIGHT_PAINT: Paint = Paint {
    fill: [0, 255, 0, 80],
    stroke: [0, 255, 0, 255],
    stroke_width: 4.0,
    point_radius: 8.0,
};

pub const SEARCH_PIN_PAINT: Paint = Paint {
    fill: [0, 0, 255, 200],
    stroke: [0, 0, 255, 255],
    stroke_width: 1.0,
    point_radius: 10.0,
};

pub const DRAFT_POINT_PAINT: Paint = Paint {
    fill: [0, 0, 255, 255],
    stroke: [0, 0, 255, 255],
    stroke_width: 1.0,
    point_radius: 6.0,
};

pub const DRAFT_PATH_PAINT: Paint = Paint {
    fill: [0, 0, 0, 0],
    stroke: [13, 19, 28, 255],
    stroke_width: 2.0,
    point_radius: 0.0,
};

/// How a layer picks its paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerStyle {
    /// Paint chosen per feature from its geometry type.
    ByGeometry {
        polygon: Paint,
        line: Paint,
        point: Paint,
    },
    /// Same paint for everything in the layer.
    Uniform(Paint),
}

impl LayerStyle {
    pub fn base() -> Self {
        LayerStyle::ByGeometry {
            polygon: POLYGON_PAINT,
            line: LINE_PAINT,
            point: POINT_PAINT,
        }
    }

    pub fn paint_for(&self, kind: GeometryKind) -> Paint {
        match *self {
            LayerStyle::ByGeometry {
                polygon,
                line,
                point,
            } => match kind {
                GeometryKind::Polygon => polygon,
                GeometryKind::LineString => line,
                GeometryKind::Point => point,
            },
            LayerStyle::Uniform(paint) => paint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Base,
    Highlight,
    SearchPin,
    DraftPoints,
    DraftPath,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerData {
    Features(Vec<FeatureRecord>),
    /// Individual markers.
    Markers(Vec<LngLat>),
    /// One connected polyline.
    Path(Vec<LngLat>),
}

impl LayerData {
    pub fn len(&self) -> usize {
        match self {
            LayerData::Features(features) => features.len(),
            LayerData::Markers(points) | LayerData::Path(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One renderable overlay handed to the render surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub id: String,
    pub kind: LayerKind,
    pub style: LayerStyle,
    pub data: LayerData,
    /// Whether map clicks may pick features from this layer.
    pub pickable: bool,
}

/// Everything the projector reads, borrowed for one projection.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionInputs<'a> {
    pub store: &'a FeatureStore,
    pub session: &'a DrawingSession,
    pub selection: &'a SelectionSet,
    pub search_marker: Option<LngLat>,
}

pub fn highlight_layer_id(id: &FeatureId) -> String {
    format!("highlight-{}", id)
}

/// Compute the full ordered layer list for the given state.
pub fn project_layers(inputs: ProjectionInputs<'_>) -> Vec<LayerDescriptor> {
    let ProjectionInputs {
        store,
        session,
        selection,
        search_marker,
    } = inputs;

    let mut layers = Vec::with_capacity(3 + selection.selected().len());

    layers.push(LayerDescriptor {
        id: BASE_LAYER_ID.to_string(),
        kind: LayerKind::Base,
        style: LayerStyle::base(),
        data: LayerData::Features(store.all_features().cloned().collect()),
        pickable: true,
    });

    for id in selection.highlight_order() {
        let Some(feature) = store.get(id) else {
            continue;
        };
        layers.push(LayerDescriptor {
            id: highlight_layer_id(id),
            kind: LayerKind::Highlight,
            style: LayerStyle::Uniform(HIGHLIGHT_PAINT),
            data: LayerData::Features(vec![feature.clone()]),
            pickable: false,
        });
    }

    if let Some(position) = search_marker {
        layers.push(LayerDescriptor {
            id: SEARCH_PIN_LAYER_ID.to_string(),
            kind: LayerKind::SearchPin,
            style: LayerStyle::Uniform(SEARCH_PIN_PAINT),
            data: LayerData::Markers(vec![position]),
            pickable: false,
        });
    }

    if session.is_collecting() {
        let points = session.points();
        layers.push(LayerDescriptor {
            id: DRAFT_POINTS_LAYER_ID.to_string(),
            kind: LayerKind::DraftPoints,
            style: LayerStyle::Uniform(DRAFT_POINT_PAINT),
            data: LayerData::Markers(points.to_vec()),
            pickable: false,
        });
        if points.len() >= 2 {
            layers.push(LayerDescriptor {
                id: DRAFT_PATH_LAYER_ID.to_string(),
                kind: LayerKind::DraftPath,
                style: LayerStyle::Uniform(DRAFT_PATH_PAINT),
                data: LayerData::Path(points.to_vec()),
                pickable: false,
            });
        }
    }

    layers
}
