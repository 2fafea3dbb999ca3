// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scripted session: mount late, add features, click them, follow a location.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use futures_util::{stream, StreamExt};
use map_driver::{
    Action, DriverOptions, FeatureOptions, InitState, LocationFix, MapDriver, MapEvent,
    MapSource,
};
use map_port::{Coordinate, Layer, MapWidget, VectorSource, View};
use map_port_mock::{MockDocument, MockEngine};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info};

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Knobs for one demo session.
#[derive(Clone, Copy, Debug)]
pub struct DemoPlan {
    pub mount_delay: Duration,
    pub features: usize,
    pub fixes: usize,
}

/// What the session observed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DemoReport {
    pub maps_created: usize,
    pub features: usize,
    pub events: usize,
    pub feature_hits: usize,
    pub empty_hits: usize,
    pub location_features: usize,
    pub tracked_point: Option<Coordinate>,
}

fn feature_position(index: usize) -> Coordinate {
    let i = index as f64;
    [i * 500.0, i * 250.0]
}

fn send(commands: &mpsc::UnboundedSender<Action>, action: Action) -> Result<()> {
    commands
        .send(action)
        .map_err(|_| anyhow!("driver stopped accepting commands"))
}

async fn wait_for(what: &str, mut cond: impl FnMut() -> bool + Send) -> Result<()> {
    tokio::time::timeout(STEP_TIMEOUT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .map_err(|_| anyhow!("timed out waiting for {what}"))
}

/// First configured layer that was mounted with a vector source.
///
/// Handles are published before `Ready` is announced, so this never waits.
fn feature_layer(
    source: &MapSource,
    options: &DriverOptions,
) -> Option<(String, Arc<dyn Layer>)> {
    options.layers.iter().find_map(|(name, _)| {
        let layer = source.layer(name)?.try_recv()?;
        layer.source().is_some().then(|| (name.clone(), layer))
    })
}

pub async fn run(options: DriverOptions, plan: DemoPlan) -> Result<DemoReport> {
    let engine = Arc::new(MockEngine::new());
    let doc = MockDocument::new();
    let (commands, rx) = mpsc::unbounded_channel::<Action>();
    let command_stream =
        stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|a| (a, rx)) });
    let driver = MapDriver::start(
        options.clone(),
        engine.clone(),
        Arc::new(doc.clone()),
        command_stream,
    )
    .context("starting driver")?;
    let source = driver.source().clone();
    let mut events = source.all_events();
    let mut states = driver.state();

    tokio::time::sleep(plan.mount_delay).await;
    for selector in options.overlays.iter().chain(&options.control_elements) {
        doc.insert(selector);
    }
    doc.insert(&options.target);
    tokio::time::timeout(STEP_TIMEOUT, async {
        while let Some(state) = states.next().await {
            if state == InitState::Ready {
                break;
            }
        }
    })
    .await
    .context("waiting for mount")?;
    let map = engine.last_map().context("mounted without a widget")?;
    info!(target = %options.target, "map ready");

    let mut positions = Vec::new();
    if let Some((name, layer)) = feature_layer(&source, &options) {
        for i in 0..plan.features {
            let position = feature_position(i);
            let feature = source.create_feature(FeatureOptions {
                geometry: position,
                attributes: json!({ "index": i }),
                styles: None,
            });
            send(&commands, Action::add_feature(layer.clone(), feature))?;
            positions.push(position);
        }
        let mut lists = source.features(&name).context("feature list not registered")?;
        tokio::time::timeout(STEP_TIMEOUT, async {
            while let Some(list) = lists.next().await {
                debug!(layer = %name, count = list.len(), "features changed");
                if list.len() == plan.features {
                    break;
                }
            }
        })
        .await
        .context("waiting for features")?;
    } else {
        info!("no configured layer has a vector source; skipping features");
    }

    if let Some(&first) = positions.first() {
        send(&commands, Action::view(first))?;
        if let Some(selector) = options.overlays.first() {
            let mut handle = source.overlay(selector).context("overlay not registered")?;
            if let Ok(Some(overlay)) = tokio::time::timeout(STEP_TIMEOUT, handle.next()).await {
                send(&commands, Action::show_overlay(overlay, first))?;
            }
        }
    }

    let dot = map
        .layers()
        .get(1)
        .and_then(|layer| layer.source())
        .context("location dot layer has no source")?;
    if plan.fixes > 0 {
        let fixes: Vec<LocationFix> = (0..plan.fixes)
            .map(|i| LocationFix::new((i as f64).mul_add(0.001, 13.405), 52.52, 25.0))
            .collect();
        send(&commands, Action::track_location(stream::iter(fixes)))?;
        if options.show_location_dot {
            wait_for("location dot", || dot.features().len() == 2).await?;
        }
    }

    // Settle: a final view proves every earlier command has been applied.
    let marker = [-1.0, -1.0];
    send(&commands, Action::view(marker))?;
    wait_for("command queue to drain", || {
        let [x, y] = map.view().center();
        (x - marker[0]).abs() < f64::EPSILON && (y - marker[1]).abs() < f64::EPSILON
    })
    .await?;

    for &position in &positions {
        map.click(map.pixel_from_coordinate(position));
    }
    map.click([5.0, 5.0]);
    map.load_end();

    let mut report = DemoReport {
        maps_created: engine.maps_created(),
        features: positions.len(),
        location_features: dot.features().len(),
        tracked_point: driver.tracked_point(),
        ..DemoReport::default()
    };
    while let Some(event) = events.try_recv() {
        report.events += 1;
        match &event {
            MapEvent::FeatureAtPixel(Some(feature)) => {
                report.feature_hits += 1;
                info!(
                    feature = feature.id().0,
                    attributes = %feature.attributes(),
                    "feature at pixel"
                );
            }
            MapEvent::FeatureAtPixel(None) => report.empty_hits += 1,
            other => debug!(event = %other.selector(), "map event"),
        }
    }
    Ok(report)
}
