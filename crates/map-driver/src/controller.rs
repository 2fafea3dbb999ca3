// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mount lifecycle: wait for the target element, then realize the widget.
//!
//! The controller re-evaluates on every structural change of the document.
//! Overlay anchors are resolved as they appear. Once the target element
//! resolves the widget is constructed exactly once, the event proxy is
//! attached, layers are published and the document watch is disconnected.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use map_port::{
    AutoPan, Control, Document, Layer, MapEngine, MapOptions, MapWidget, Overlay, OverlayOptions,
    Projection, TileSource, VectorLayerOptions, VectorSource, View, ViewOptions,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::events::EventProxy;
use crate::factory;
use crate::options::DriverOptions;
use crate::registry::OutputRegistry;
use crate::stream::MemoryStream;

/// Pan animation length for overlays brought into view.
pub const OVERLAY_PAN_DURATION: Duration = Duration::from_millis(250);

/// Lifecycle of one driver instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InitState {
    /// The target element has not resolved yet.
    AwaitingMount,
    /// The widget exists and actions are being applied.
    Ready,
}

/// Handles the dispatcher needs from a realized widget.
#[derive(Clone, Debug)]
pub struct Realized {
    /// The widget.
    pub map: Arc<dyn MapWidget>,
    /// Shared view.
    pub view: Arc<dyn View>,
    /// Source behind the location-dot layer.
    pub location_dot: Arc<dyn VectorSource>,
}

/// Drives one widget from `AwaitingMount` to `Ready`.
pub struct InitController {
    options: DriverOptions,
    engine: Arc<dyn MapEngine>,
    document: Arc<dyn Document>,
    registry: Arc<OutputRegistry>,
    proxy: EventProxy,
    state: MemoryStream<InitState>,
    view: Arc<dyn View>,
    location_dot: Arc<dyn VectorSource>,
    base_layers: Vec<Arc<dyn Layer>>,
    layers: Vec<(String, Arc<dyn Layer>)>,
    overlays: Vec<Arc<dyn Overlay>>,
    anchored: HashSet<String>,
    ready: bool,
}

impl core::fmt::Debug for InitController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InitController")
            .field("target", &self.options.target)
            .field("ready", &self.ready)
            .field("overlays", &self.overlays.len())
            .finish_non_exhaustive()
    }
}

impl InitController {
    /// Build the view, the location-dot source and every configured layer.
    /// Nothing is mounted yet.
    pub fn new(
        options: DriverOptions,
        engine: Arc<dyn MapEngine>,
        document: Arc<dyn Document>,
        registry: Arc<OutputRegistry>,
        proxy: EventProxy,
        state: MemoryStream<InitState>,
    ) -> Self {
        let view = engine.create_view(ViewOptions {
            center: options.view.center,
            zoom: options.view.zoom,
            projection: Projection::WebMercator,
        });
        let location_dot = engine.create_vector_source();
        let base_layers = vec![
            engine.create_tile_layer(TileSource::Osm),
            engine.create_vector_layer(VectorLayerOptions {
                source: Some(location_dot.clone()),
                styles: Vec::new(),
            }),
        ];
        let layers = options
            .layers
            .iter()
            .filter_map(|(name, config)| {
                factory::build_layer(engine.as_ref(), config).map(|layer| (name.clone(), layer))
            })
            .collect();
        if state.emissions() == 0 {
            state.send(InitState::AwaitingMount);
        }
        Self {
            options,
            engine,
            document,
            registry,
            proxy,
            state,
            view,
            location_dot,
            base_layers,
            layers,
            overlays: Vec::new(),
            anchored: HashSet::new(),
            ready: false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> InitState {
        if self.ready {
            InitState::Ready
        } else {
            InitState::AwaitingMount
        }
    }

    /// Re-examine the document. Returns the realized widget on the single
    /// `AwaitingMount → Ready` transition and `None` otherwise.
    pub fn evaluate(&mut self) -> Option<Realized> {
        if self.ready {
            trace!("already mounted; change ignored");
            return None;
        }
        self.anchor_overlays();

        let Some(target) = self.document.query_selector(&self.options.target) else {
            trace!(target = %self.options.target, "target not in document yet");
            return None;
        };

        let mut layers = self.base_layers.clone();
        layers.extend(self.layers.iter().map(|(_, layer)| layer.clone()));
        let map = match self.engine.create_map(MapOptions {
            target,
            layers,
            controls: self.controls(),
            overlays: self.overlays.clone(),
            view: self.view.clone(),
        }) {
            Ok(map) => map,
            Err(err) => {
                warn!(%err, "widget construction failed; waiting for the next change");
                return None;
            }
        };

        self.proxy.attach(&map);
        for (name, layer) in &self.layers {
            self.registry.publish_layer(name, layer.clone());
        }
        self.ready = true;
        self.state.send(InitState::Ready);
        info!(
            target = %self.options.target,
            layers = self.layers.len(),
            overlays = self.overlays.len(),
            "map mounted"
        );
        Some(Realized {
            map,
            view: self.view.clone(),
            location_dot: self.location_dot.clone(),
        })
    }

    /// Watch the document until the widget is realized.
    ///
    /// Evaluates once before the first change arrives. Returns `None` if the
    /// document goes away first.
    #[instrument(skip_all, fields(target = %self.options.target))]
    pub async fn run(mut self) -> Option<Realized> {
        let mut watch = self.document.observe();
        loop {
            if let Some(realized) = self.evaluate() {
                watch.disconnect();
                debug!("document watch disconnected");
                return Some(realized);
            }
            if !watch.changed().await {
                debug!("document closed before mount");
                return None;
            }
        }
    }

    fn anchor_overlays(&mut self) {
        for selector in &self.options.overlays {
            if self.anchored.contains(selector) {
                continue;
            }
            let Some(element) = self.document.query_selector(selector) else {
                continue;
            };
            let overlay = self.engine.create_overlay(OverlayOptions {
                element,
                auto_pan: Some(AutoPan {
                    animation_duration: OVERLAY_PAN_DURATION,
                }),
            });
            self.registry.publish_overlay(selector, overlay.clone());
            self.overlays.push(overlay);
            self.anchored.insert(selector.clone());
            debug!(overlay = %selector, "overlay anchored");
        }
    }

    fn controls(&self) -> Vec<Control> {
        let mut controls = self.engine.default_controls();
        for selector in &self.options.control_elements {
            match self.document.query_selector(selector) {
                Some(element) => controls.push(self.engine.create_control(element)),
                None => warn!(control = %selector, "control element not found; skipped"),
            }
        }
        controls
    }
}
