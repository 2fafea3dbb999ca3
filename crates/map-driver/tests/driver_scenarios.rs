// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end driver behavior on the mock engine and document.
#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used, clippy::panic)]

mod common;

use std::sync::Arc;

use common::{channel_stream, eventually, next, Harness};
use futures_util::stream;
use map_driver::{
    Action, ConfigError, DriverOptions, EventSelector, FeatureOptions, InitState, LayerConfig,
    LocationFix, MapDriver, MapEvent,
};
use map_port::{
    Geometry, Layer, LayerKind, MapEventKind, MapWidget, Overlay, VectorSource, View,
};
use map_port_mock::proj::lon_lat_to_mercator;
use map_port_mock::{MockDocument, MockEngine};
use tokio::sync::mpsc;

fn pins_and_popup() -> DriverOptions {
    DriverOptions::new("#map")
        .with_layer("pins", LayerConfig::vector(vec![]))
        .with_overlay("#popup")
}

fn location_dot(map: &dyn MapWidget) -> Arc<dyn VectorSource> {
    map.layers()[1].source().expect("location dot layer has a source")
}

#[tokio::test]
async fn mounts_once_and_publishes_handles_to_early_subscribers() {
    let h = Harness::start(pins_and_popup());
    let mut states = h.driver.state();
    assert_eq!(next(&mut states).await, InitState::AwaitingMount);
    let mut pins = h.driver.source().layer("pins").unwrap();
    let mut popup = h.driver.source().overlay("#popup").unwrap();

    h.doc.insert("#popup");
    let map = h.mount("#map").await;
    assert_eq!(next(&mut states).await, InitState::Ready);

    let layer = next(&mut pins).await;
    assert!(Arc::ptr_eq(&layer, &map.layers()[2]));
    let overlay = next(&mut popup).await;
    assert_eq!(overlay.element().name(), "#popup");

    for _ in 0..5 {
        h.doc.touch();
        h.doc.insert("#other");
    }
    tokio::task::yield_now().await;
    assert_eq!(h.engine.maps_created(), 1);
    assert_eq!(h.engine.overlays_created(), 1);
    assert_eq!(h.doc.active_watchers(), 0);
    assert_eq!(h.driver.current_state(), InitState::Ready);
    assert!(states.try_recv().is_none());
}

#[tokio::test]
async fn roads_layer_emits_exactly_once_after_the_target_appears() {
    let options: DriverOptions = serde_json::from_value(serde_json::json!({
        "target": "#map",
        "layers": [["roads", {"vector": {"source": "vector-source"}}]]
    }))
    .unwrap();
    let h = Harness::start(options);
    let mut roads = h.driver.source().layer("roads").unwrap();

    h.doc.touch();
    h.doc.insert("#sidebar");
    tokio::task::yield_now().await;
    assert_eq!(h.engine.maps_created(), 0);
    assert!(roads.try_recv().is_none());

    let map = h.mount("#map").await;
    let layer = next(&mut roads).await;
    let layers = map.layers();
    assert_eq!(layers.len(), 3);
    assert_eq!(layers[0].kind(), LayerKind::Tile);
    assert!(Arc::ptr_eq(&layer, &layers[2]));
    assert!(layer.source().is_some());

    for _ in 0..3 {
        h.doc.touch();
        h.doc.insert("#late");
    }
    tokio::task::yield_now().await;
    assert!(roads.try_recv().is_none());
    assert_eq!(h.engine.maps_created(), 1);
    assert_eq!(h.engine.views_created(), 1);
}

#[tokio::test]
async fn late_subscriber_gets_the_same_layer_handle() {
    let h = Harness::start(pins_and_popup());
    let map = h.mount("#map").await;
    eventually(|| h.driver.current_state() == InitState::Ready).await;

    let mut first = h.driver.source().layer("pins").unwrap();
    let mut second = h.driver.source().layer("pins").unwrap();
    let a = next(&mut first).await;
    let b = next(&mut second).await;
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a, &map.layers()[2]));
    assert!(h.driver.source().layer("roads").is_none());
}

#[tokio::test]
async fn view_action_fits_and_updates_tracked_point() {
    let h = Harness::start(DriverOptions::new("#map"));
    let map = h.mount("#map").await;
    h.send(Action::view([1000.0, 2000.0]));

    eventually(|| h.driver.tracked_point() == Some([1000.0, 2000.0])).await;
    let view = map.view();
    assert_eq!(view.center(), [1000.0, 2000.0]);
    assert!(view.resolution() >= map_driver::dispatch::VIEW_MIN_RESOLUTION);
}

#[tokio::test]
async fn commands_sent_before_mount_are_applied_after_it_in_order() {
    let h = Harness::start(DriverOptions::new("#map"));
    h.send(Action::view([1.0, 1.0]));
    h.send(Action::view([2.0, 2.0]));
    tokio::task::yield_now().await;
    assert_eq!(h.driver.tracked_point(), None);

    let map = h.mount("#map").await;
    eventually(|| h.driver.tracked_point() == Some([2.0, 2.0])).await;
    assert_eq!(map.view().center(), [2.0, 2.0]);
}

#[tokio::test]
async fn feature_lists_follow_add_and_remove() {
    let h = Harness::start(pins_and_popup());
    let mut lists = h.driver.source().features("pins").unwrap();
    h.mount("#map").await;
    let layer: Arc<dyn Layer> = next(&mut h.driver.source().layer("pins").unwrap()).await;
    assert!(next(&mut lists).await.is_empty());

    let a = h.driver.source().create_feature(FeatureOptions::at([0.0, 0.0]));
    let b = h.driver.source().create_feature(FeatureOptions::at([10.0, 10.0]));
    h.send(Action::add_feature(layer.clone(), a.clone()));
    h.send(Action::add_feature(layer.clone(), b.clone()));
    assert_eq!(next(&mut lists).await, vec![a.clone()]);
    assert_eq!(next(&mut lists).await, vec![a.clone(), b.clone()]);

    h.send(Action::remove_feature(layer.clone(), a));
    assert_eq!(next(&mut lists).await, vec![b]);
    h.send(Action::remove_all_features(layer));
    assert!(next(&mut lists).await.is_empty());
}

#[tokio::test]
async fn click_reports_raw_event_then_topmost_feature() {
    let h = Harness::start(pins_and_popup());
    let mut clicks = h.driver.source().events(EventSelector::SingleClick);
    let mut hits = h.driver.source().events(EventSelector::FeatureAtPixel);
    let map = h.mount("#map").await;
    let layer = next(&mut h.driver.source().layer("pins").unwrap()).await;

    let pin = h.driver.source().create_feature(FeatureOptions::at([1000.0, 1000.0]));
    h.send(Action::add_feature(layer, pin.clone()));
    eventually(|| !map.features_at_pixel(map.pixel_from_coordinate([1000.0, 1000.0])).is_empty())
        .await;

    let pixel = map.pixel_from_coordinate([1000.0, 1000.0]);
    map.click(pixel);
    let MapEvent::SingleClick(pointer) = next(&mut clicks).await else {
        panic!("expected a single click");
    };
    assert_eq!(pointer.pixel, pixel);
    assert_eq!(next(&mut hits).await, MapEvent::FeatureAtPixel(Some(pin)));
}

#[tokio::test]
async fn clicks_on_empty_map_report_no_feature_each_time() {
    let h = Harness::start(DriverOptions::new("#map"));
    let mut hits = h.driver.source().events(EventSelector::FeatureAtPixel);
    let map = h.mount("#map").await;
    assert_eq!(map.listener_count(MapEventKind::SingleClick), 1);

    map.click([10.0, 10.0]);
    map.click([20.0, 20.0]);
    assert_eq!(next(&mut hits).await, MapEvent::FeatureAtPixel(None));
    assert_eq!(next(&mut hits).await, MapEvent::FeatureAtPixel(None));
}

#[tokio::test]
async fn double_click_and_load_end_are_forwarded() {
    let h = Harness::start(DriverOptions::new("#map"));
    let mut all = h.driver.source().all_events();
    let map = h.mount("#map").await;

    map.double_click([5.0, 5.0]);
    map.load_end();
    assert!(matches!(next(&mut all).await, MapEvent::DoubleClick(_)));
    assert_eq!(next(&mut all).await, MapEvent::FeatureAtPixel(None));
    assert_eq!(next(&mut all).await, MapEvent::LoadEnd);
    assert!(all.try_recv().is_none());
}

#[tokio::test]
async fn overlay_show_and_hide() {
    let h = Harness::start(pins_and_popup());
    h.doc.insert("#popup");
    h.mount("#map").await;
    let overlay: Arc<dyn Overlay> = next(&mut h.driver.source().overlay("#popup").unwrap()).await;

    h.send(Action::show_overlay(overlay.clone(), [3.0, 4.0]));
    eventually(|| overlay.position() == Some([3.0, 4.0])).await;
    h.send(Action::hide_overlay(overlay.clone()));
    eventually(|| overlay.position().is_none()).await;
}

#[tokio::test]
async fn track_location_draws_point_and_accuracy_circle() {
    let h = Harness::start(DriverOptions::new("#map"));
    let map = h.mount("#map").await;
    let (fixes, rx) = mpsc::unbounded_channel();
    h.send(Action::track_location(channel_stream(rx)));

    fixes.send(LocationFix::new(13.4, 52.5, 40.0)).unwrap();
    let dot = location_dot(map.as_ref());
    eventually(|| dot.features().len() == 2).await;
    fixes.send(LocationFix::new(2.35, 48.85, 25.0)).unwrap();
    let expected = lon_lat_to_mercator([2.35, 48.85]);
    eventually(|| h.driver.tracked_point() == Some(expected)).await;

    let features = dot.features();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0].geometry(), &Geometry::Point(expected));
    assert!(matches!(features[1].geometry(), Geometry::Polygon(_)));
}

#[tokio::test]
async fn newer_location_stream_replaces_the_old_one() {
    let h = Harness::start(DriverOptions::new("#map"));
    let map = h.mount("#map").await;
    let dot = location_dot(map.as_ref());

    let (old, old_rx) = mpsc::unbounded_channel();
    h.send(Action::track_location(channel_stream(old_rx)));
    old.send(LocationFix::new(0.0, 0.0, 10.0)).unwrap();
    eventually(|| dot.features().len() == 2).await;

    let (new, new_rx) = mpsc::unbounded_channel();
    h.send(Action::track_location(channel_stream(new_rx)));
    new.send(LocationFix::new(10.0, 10.0, 10.0)).unwrap();
    let expected = lon_lat_to_mercator([10.0, 10.0]);
    eventually(|| h.driver.tracked_point() == Some(expected)).await;

    eventually(|| old.is_closed()).await;
    assert!(old.send(LocationFix::new(-50.0, -50.0, 10.0)).is_err());
}

#[tokio::test]
async fn track_location_is_ignored_when_location_dot_disabled() {
    let h = Harness::start(DriverOptions::new("#map").with_location_dot(false));
    let map = h.mount("#map").await;
    h.send(Action::track_location(stream::iter(vec![LocationFix::new(
        1.0, 1.0, 5.0,
    )])));
    h.send(Action::view([7.0, 7.0]));

    eventually(|| h.driver.tracked_point() == Some([7.0, 7.0])).await;
    assert!(location_dot(map.as_ref()).features().is_empty());
}

#[tokio::test]
async fn unrecognized_records_have_no_effect() {
    let h = Harness::start(DriverOptions::new("#map"));
    let map = h.mount("#map").await;
    h.send(map_driver::Inbound::unrecognized("zoom-to"));
    h.send(Action::view([9.0, 9.0]));
    eventually(|| h.driver.tracked_point() == Some([9.0, 9.0])).await;
    assert_eq!(map.view().center(), [9.0, 9.0]);
    assert!(location_dot(map.as_ref()).features().is_empty());
}

#[tokio::test]
async fn driver_finishes_when_commands_end_without_tracking() {
    let engine = Arc::new(MockEngine::new());
    let doc = MockDocument::new();
    doc.insert("#map");
    let driver = MapDriver::start(
        DriverOptions::new("#map"),
        engine.clone(),
        Arc::new(doc),
        stream::iter(vec![Action::view([1.0, 2.0])]),
    )
    .unwrap();
    eventually(|| driver.is_finished()).await;
    assert_eq!(driver.tracked_point(), Some([1.0, 2.0]));
    assert_eq!(engine.maps_created(), 1);
}

#[tokio::test]
async fn invalid_options_are_rejected_before_start() {
    let engine = Arc::new(MockEngine::new());
    let result = MapDriver::start(
        DriverOptions::new(""),
        engine,
        Arc::new(MockDocument::new()),
        stream::empty::<Action>(),
    );
    assert!(matches!(result, Err(ConfigError::MissingTarget)));
}
