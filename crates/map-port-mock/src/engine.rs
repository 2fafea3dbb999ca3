// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mock engine: builds in-memory widget objects and records what it built.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use map_port::{
    Control, ControlKind, Coordinate, Element, Feature, FeatureId, Geometry, Layer, LayerKind,
    MapEngine, MapOptions, MapWidget, Overlay, OverlayOptions, PortError, Projection, TileSource,
    VectorLayerOptions, VectorSource, View, ViewOptions,
};
use serde_json::Value;

use crate::proj;
use crate::widget::{lock, MockLayer, MockMap, MockOverlay, MockVectorSource, MockView};

/// Headless [`MapEngine`].
///
/// Every constructed map is kept so tests can reach the concrete
/// [`MockMap`] and simulate user interaction on it.
#[derive(Default)]
pub struct MockEngine {
    maps: Mutex<Vec<Arc<MockMap>>>,
    overlays: Mutex<Vec<Arc<MockOverlay>>>,
    next_feature: AtomicU64,
    views_created: AtomicUsize,
    sources_created: AtomicUsize,
    fail_create_map: Mutex<Option<String>>,
}

impl MockEngine {
    /// Create an engine that has built nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of widgets constructed so far.
    pub fn maps_created(&self) -> usize {
        lock(&self.maps).len()
    }

    /// The most recently constructed widget.
    pub fn last_map(&self) -> Option<Arc<MockMap>> {
        lock(&self.maps).last().cloned()
    }

    /// Number of overlays constructed so far.
    pub fn overlays_created(&self) -> usize {
        lock(&self.overlays).len()
    }

    /// Concrete overlay objects, in creation order.
    pub fn overlays(&self) -> Vec<Arc<MockOverlay>> {
        lock(&self.overlays).clone()
    }

    /// Number of views constructed so far.
    pub fn views_created(&self) -> usize {
        self.views_created.load(Ordering::SeqCst)
    }

    /// Number of vector sources constructed so far.
    pub fn sources_created(&self) -> usize {
        self.sources_created.load(Ordering::SeqCst)
    }

    /// Make the next `create_map` calls fail with a backend error until
    /// cleared with `None`.
    pub fn set_fail_create_map(&self, reason: Option<String>) {
        *lock(&self.fail_create_map) = reason;
    }
}

impl MapEngine for MockEngine {
    fn create_view(&self, options: ViewOptions) -> Arc<dyn View> {
        self.views_created.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockView::new(options))
    }

    fn create_vector_source(&self) -> Arc<dyn VectorSource> {
        self.sources_created.fetch_add(1, Ordering::SeqCst);
        Arc::new(MockVectorSource::new())
    }

    fn create_tile_layer(&self, _source: TileSource) -> Arc<dyn Layer> {
        Arc::new(MockLayer::new(LayerKind::Tile, None, Vec::new()))
    }

    fn create_vector_layer(&self, options: VectorLayerOptions) -> Arc<dyn Layer> {
        Arc::new(MockLayer::new(
            LayerKind::Vector,
            options.source,
            options.styles,
        ))
    }

    fn create_overlay(&self, options: OverlayOptions) -> Arc<dyn Overlay> {
        let overlay = Arc::new(MockOverlay::new(options.element, options.auto_pan));
        lock(&self.overlays).push(overlay.clone());
        overlay
    }

    fn create_feature(&self, geometry: Geometry, attributes: Value) -> Feature {
        let id = FeatureId(self.next_feature.fetch_add(1, Ordering::Relaxed));
        Feature::new(id, geometry, attributes)
    }

    fn default_controls(&self) -> Vec<Control> {
        ["zoom", "rotate", "attribution"]
            .into_iter()
            .map(|name| Control {
                kind: ControlKind::Builtin(name.to_string()),
            })
            .collect()
    }

    fn create_control(&self, element: Element) -> Control {
        Control {
            kind: ControlKind::Custom(element),
        }
    }

    fn create_map(&self, options: MapOptions) -> Result<Arc<dyn MapWidget>, PortError> {
        if let Some(reason) = lock(&self.fail_create_map).clone() {
            return Err(PortError::Backend(reason));
        }
        tracing::debug!(
            target_element = options.target.name(),
            layers = options.layers.len(),
            overlays = options.overlays.len(),
            "mock map constructed"
        );
        let map = Arc::new(MockMap::new(options));
        lock(&self.maps).push(map.clone());
        Ok(map)
    }

    fn circular(&self, center: Coordinate, radius_m: f64, vertices: usize) -> Geometry {
        proj::circular(center, radius_m, vertices)
    }

    fn transform(
        &self,
        geometry: &Geometry,
        from: Projection,
        to: Projection,
    ) -> Result<Geometry, PortError> {
        proj::transform(geometry, from, to)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn features_get_fresh_ids() {
        let engine = MockEngine::new();
        let a = engine.create_feature(Geometry::Point([0.0, 0.0]), json!(null));
        let b = engine.create_feature(Geometry::Point([0.0, 0.0]), json!(null));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn create_map_failure_is_reported_and_not_recorded() {
        let engine = MockEngine::new();
        engine.set_fail_create_map(Some("no gl context".into()));
        let view = engine.create_view(ViewOptions::default());
        let err = engine
            .create_map(MapOptions {
                target: Element::new(1, "#map"),
                layers: vec![],
                controls: vec![],
                overlays: vec![],
                view,
            })
            .unwrap_err();
        assert_eq!(err, PortError::Backend("no gl context".into()));
        assert_eq!(engine.maps_created(), 0);
    }
}
