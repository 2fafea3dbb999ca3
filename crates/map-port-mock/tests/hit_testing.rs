// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pixel hit-testing through the public engine surface.
#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use map_port::{
    Element, Geometry, MapEngine, MapEventKind, MapOptions, MapWidget, TileSource,
    VectorLayerOptions, ViewOptions, WidgetEvent,
};
use map_port_mock::MockEngine;
use serde_json::Value;

#[test]
fn topmost_layer_wins_and_polygons_hit_by_containment() {
    let engine = MockEngine::new();
    let view = engine.create_view(ViewOptions {
        center: [0.0, 0.0],
        zoom: 18.0,
        ..ViewOptions::default()
    });
    let lower = engine.create_vector_source();
    let upper = engine.create_vector_source();
    let map = engine
        .create_map(MapOptions {
            target: Element::new(1, "#map"),
            layers: vec![
                engine.create_tile_layer(TileSource::Osm),
                engine.create_vector_layer(VectorLayerOptions {
                    source: Some(lower.clone()),
                    styles: vec![],
                }),
                engine.create_vector_layer(VectorLayerOptions {
                    source: Some(upper.clone()),
                    styles: vec![],
                }),
            ],
            controls: engine.default_controls(),
            overlays: vec![],
            view,
        })
        .unwrap();

    let square = engine.create_feature(
        Geometry::Polygon(vec![vec![
            [-50.0, -50.0],
            [50.0, -50.0],
            [50.0, 50.0],
            [-50.0, 50.0],
            [-50.0, -50.0],
        ]]),
        Value::Null,
    );
    let pin = engine.create_feature(Geometry::Point([0.0, 0.0]), Value::Null);
    lower.add_feature(square.clone());
    upper.add_feature(pin.clone());

    let mock = engine.last_map().unwrap();
    let center = mock.pixel_from_coordinate([0.0, 0.0]);
    assert_eq!(map.features_at_pixel(center), vec![pin, square]);
    assert!(!map.has_feature_at_pixel([0.0, 0.0]));
}

#[test]
fn emitted_events_reach_only_matching_listeners() {
    let engine = MockEngine::new();
    let map = engine
        .create_map(MapOptions {
            target: Element::new(1, "#map"),
            layers: vec![],
            controls: vec![],
            overlays: vec![],
            view: engine.create_view(ViewOptions::default()),
        })
        .unwrap();
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = clicks.clone();
    map.on(
        MapEventKind::SingleClick,
        Arc::new(move |_: &WidgetEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    let mock = engine.last_map().unwrap();
    mock.click([1.0, 1.0]);
    mock.double_click([1.0, 1.0]);
    mock.load_end();
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
    assert_eq!(mock.listener_count(MapEventKind::SingleClick), 1);
    assert_eq!(mock.listener_count(MapEventKind::LoadEnd), 0);
}
