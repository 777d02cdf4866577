//! GeoJSON feature-collection parsing and serialization.
//!
//! Import is all-or-nothing: the whole payload is validated into records
//! before anything touches the store.

use std::collections::HashSet;

use serde_json::{json, Value};

use super::builder::new_feature_id;
use super::error::ImportError;
use super::feature::{FeatureId, FeatureRecord, Geometry, Properties, Provenance};

/// Parse a FeatureCollection payload into imported records.
///
/// `taken` holds ids already in use elsewhere in the store; a feature whose
/// own id is missing, empty, or already taken (including by an earlier
/// feature in the same payload) receives a freshly generated one. The final id
/// is mirrored into `properties.id` so table rows and exports agree on it.
pub fn parse_feature_collection(
    payload: &Value,
    taken: &HashSet<FeatureId>,
) -> Result<Vec<FeatureRecord>, ImportError> {
    let object = payload
        .as_object()
        .ok_or_else(|| invalid("payload is not a JSON object"))?;

    match object.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(invalid(format!(
                "expected a FeatureCollection, found {}",
                other
            )));
        }
        None => return Err(invalid("payload has no \"type\" member")),
    }

    let features = object
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("FeatureCollection has no \"features\" array"))?;

    if features.is_empty() {
        return Err(invalid("FeatureCollection contains no features"));
    }

    let mut used: HashSet<FeatureId> = HashSet::with_capacity(features.len());
    let mut records = Vec::with_capacity(features.len());

    for (index, feature) in features.iter().enumerate() {
        let record = parse_feature(index, feature, |candidate| {
            !taken.contains(candidate) && !used.contains(candidate)
        })?;
        used.insert(record.id.clone());
        records.push(record);
    }

    Ok(records)
}

fn parse_feature(
    index: usize,
    feature: &Value,
    is_free: impl Fn(&str) -> bool,
) -> Result<FeatureRecord, ImportError> {
    let object = feature
        .as_object()
        .ok_or_else(|| invalid(format!("feature {} is not an object", index)))?;

    if object.get("type").and_then(Value::as_str) != Some("Feature") {
        return Err(invalid(format!("feature {} is not of type Feature", index)));
    }

    let raw_geometry = object
        .get("geometry")
        .filter(|g| !g.is_null())
        .ok_or_else(|| invalid(format!("feature {} has no geometry", index)))?;

    let geometry: Geometry = serde_json::from_value(raw_geometry.clone())
        .map_err(|e| invalid(format!("feature {}: {}", index, e)))?;
    geometry
        .validate()
        .map_err(|e| invalid(format!("feature {}: {}", index, e)))?;

    let mut properties = match object.get("properties") {
        None | Some(Value::Null) => Properties::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(invalid(format!(
                "feature {} has non-object properties",
                index
            )));
        }
    };

    let id = declared_id(object.get("id"))
        .or_else(|| declared_id(properties.get("id")))
        .filter(|candidate| is_free(candidate.as_str()))
        .unwrap_or_else(new_feature_id);
    properties.insert("id".into(), Value::String(id.clone()));

    Ok(FeatureRecord {
        id,
        provenance: Provenance::Imported,
        geometry,
        properties,
    })
}

/// GeoJSON allows string or number feature ids.
fn declared_id(value: Option<&Value>) -> Option<FeatureId> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn invalid(reason: impl Into<String>) -> ImportError {
    ImportError::InvalidGeoJson(reason.into())
}

/// Serialize one record as a GeoJSON Feature.
pub fn feature_to_geojson(record: &FeatureRecord) -> Value {
    let mut properties = record.properties.clone();
    properties.insert("id".into(), Value::String(record.id.clone()));
    json!({
        "type": "Feature",
        "id": record.id,
        "geometry": record.geometry,
        "properties": properties,
    })
}

/// Serialize records as a GeoJSON FeatureCollection.
pub fn to_feature_collection<'a>(records: impl IntoIterator<Item = &'a FeatureRecord>) -> Value {
    let features: Vec<Value> = records.into_iter().map(feature_to_geojson).collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
