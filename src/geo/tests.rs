//! End-to-end behavior of the geo plugin: messages in, layers out.

use bevy::prelude::*;
use serde_json::{json, Value};

use super::projector::{BASE_LAYER_ID, DRAFT_PATH_LAYER_ID, DRAFT_POINTS_LAYER_ID};
use super::*;

fn geo_app() -> App {
    let mut app = App::new();
    app.add_plugins(GeoPlugin);
    app
}

fn collection(features: Vec<Value>) -> Value {
    json!({"type": "FeatureCollection", "features": features})
}

fn point(id: &str, lng: f64, lat: f64) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "properties": {"mag": 1.5},
        "geometry": {"type": "Point", "coordinates": [lng, lat, 10.0]},
    })
}

fn layer_ids(app: &App) -> Vec<String> {
    app.world()
        .resource::<LayerList>()
        .layers()
        .iter()
        .map(|l| l.id.clone())
        .collect()
}

fn import(app: &mut App, payload: &Value) -> usize {
    app.world_mut()
        .resource_mut::<FeatureStore>()
        .import_replace(payload)
        .unwrap()
}

#[test]
fn test_import_then_select_projects_highlight_layers() {
    let mut app = geo_app();
    import(&mut app, &collection(vec![point("a", 1.0, 2.0), point("b", 3.0, 4.0)]));
    let store = app.world().resource::<FeatureStore>().clone();
    app.world_mut()
        .resource_mut::<SelectionSet>()
        .select(["b"], &store);
    app.update();

    assert_eq!(
        layer_ids(&app),
        vec![BASE_LAYER_ID.to_string(), "highlight-b".to_string()]
    );
    let base = &app.world().resource::<LayerList>().layers()[0];
    assert_eq!(base.data.len(), 2);
    assert!(base.pickable);
}

#[test]
fn test_delete_request_removes_feature_and_highlight() {
    let mut app = geo_app();
    import(&mut app, &collection(vec![point("a", 1.0, 2.0), point("b", 3.0, 4.0)]));
    let store = app.world().resource::<FeatureStore>().clone();
    app.world_mut()
        .resource_mut::<SelectionSet>()
        .select(["a", "b"], &store);
    app.update();

    app.world_mut().write_message(DeleteFeaturesRequest {
        ids: vec!["a".to_string()],
    });
    app.update();

    assert!(!app.world().resource::<FeatureStore>().contains("a"));
    assert_eq!(
        app.world().resource::<SelectionSet>().selected(),
        ["b".to_string()]
    );
    assert_eq!(
        layer_ids(&app),
        vec![BASE_LAYER_ID.to_string(), "highlight-b".to_string()]
    );
}

#[test]
fn test_delete_unknown_id_changes_nothing() {
    let mut app = geo_app();
    import(&mut app, &collection(vec![point("a", 1.0, 2.0)]));
    app.update();

    app.world_mut().write_message(DeleteFeaturesRequest {
        ids: vec!["zzz".to_string()],
    });
    app.update();

    assert_eq!(app.world().resource::<FeatureStore>().len(), 1);
}

#[test]
fn test_clear_imported_keeps_drawn() {
    let mut app = geo_app();
    import(&mut app, &collection(vec![point("a", 1.0, 2.0)]));
    {
        let world = app.world_mut();
        world.resource_scope(|world, mut session: Mut<DrawingSession>| {
            let mut store = world.resource_mut::<FeatureStore>();
            session.activate(DrawMode::Line).unwrap();
            session.add_point(LngLat::new(0.0, 0.0));
            session.add_point(LngLat::new(1.0, 1.0));
            session.finish(&mut store).unwrap();
        });
    }
    app.update();

    app.world_mut().write_message(ClearFeaturesRequest {
        scope: ClearScope::Imported,
    });
    app.update();

    let store = app.world().resource::<FeatureStore>();
    assert!(store.imported().is_empty());
    assert_eq!(store.drawn().len(), 1);
}

#[test]
fn test_clear_all_empties_store_and_selection() {
    let mut app = geo_app();
    import(&mut app, &collection(vec![point("a", 1.0, 2.0)]));
    let store = app.world().resource::<FeatureStore>().clone();
    app.world_mut()
        .resource_mut::<SelectionSet>()
        .select(["a"], &store);
    app.update();

    app.world_mut().write_message(ClearFeaturesRequest {
        scope: ClearScope::All,
    });
    app.update();

    assert!(app.world().resource::<FeatureStore>().is_empty());
    assert!(app.world().resource::<SelectionSet>().is_empty());
    assert_eq!(layer_ids(&app), vec![BASE_LAYER_ID.to_string()]);
}

#[test]
fn test_drafting_layers_sit_above_everything() {
    let mut app = geo_app();
    import(&mut app, &collection(vec![point("a", 1.0, 2.0)]));
    let store = app.world().resource::<FeatureStore>().clone();
    app.world_mut()
        .resource_mut::<SelectionSet>()
        .select(["a"], &store);
    app.world_mut().resource_mut::<SearchMarker>().position = Some(LngLat::new(5.0, 5.0));
    {
        let mut session = app.world_mut().resource_mut::<DrawingSession>();
        session.activate(DrawMode::Polygon).unwrap();
        session.add_point(LngLat::new(0.0, 0.0));
        session.add_point(LngLat::new(1.0, 0.0));
    }
    app.update();

    let ids = layer_ids(&app);
    assert_eq!(ids.first().map(String::as_str), Some(BASE_LAYER_ID));
    assert_eq!(ids[ids.len() - 2], DRAFT_POINTS_LAYER_ID);
    assert_eq!(ids[ids.len() - 1], DRAFT_PATH_LAYER_ID);
    assert!(ids.contains(&"highlight-a".to_string()));
}

#[test]
fn test_reimport_replaces_imported_partition() {
    let mut app = geo_app();
    import(&mut app, &collection(vec![point("a", 1.0, 2.0), point("b", 3.0, 4.0)]));
    let count = import(&mut app, &collection(vec![point("c", 0.0, 0.0)]));
    app.update();

    assert_eq!(count, 1);
    let store = app.world().resource::<FeatureStore>();
    assert_eq!(store.imported().len(), 1);
    assert!(store.contains("c"));
}
