// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rendering-engine port: object construction and the widget handle traits.

use core::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::{
    ChangeHandler, Coordinate, Element, EventHandler, Feature, Geometry, ListenerKey,
    MapEventKind, Pixel, PortError, Projection, Style,
};

/// Mutable feature collection backing a vector layer.
pub trait VectorSource: Send + Sync + Debug {
    /// Add a feature. Adding a feature that is already present is a no-op.
    fn add_feature(&self, feature: Feature);

    /// Remove a feature by identity. Returns whether it was present.
    fn remove_feature(&self, feature: &Feature) -> bool;

    /// Remove every feature.
    fn clear(&self);

    /// Snapshot of the current features, in insertion order.
    fn features(&self) -> Vec<Feature>;

    /// Register a callback fired after every content change.
    fn on_change(&self, handler: ChangeHandler) -> ListenerKey;
}

/// Kind of a layer in the widget's layer stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Raster tiles.
    Tile,
    /// Vector features from a [`VectorSource`].
    Vector,
}

/// A layer in the widget's layer stack.
pub trait Layer: Send + Sync + Debug {
    /// Layer kind.
    fn kind(&self) -> LayerKind;

    /// Backing vector source, if this layer has one.
    fn source(&self) -> Option<Arc<dyn VectorSource>>;

    /// Layer-level styles.
    fn styles(&self) -> Vec<Style>;
}

/// A positioned element overlaying the map.
pub trait Overlay: Send + Sync + Debug {
    /// Anchor element the overlay displays.
    fn element(&self) -> Element;

    /// Place the overlay at a coordinate, or hide it with `None`.
    fn set_position(&self, position: Option<Coordinate>);

    /// Current position; `None` while hidden.
    fn position(&self) -> Option<Coordinate>;
}

/// Options for [`View::fit`].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FitOptions {
    /// Lower bound for the resulting resolution (map units per pixel).
    pub min_resolution: Option<f64>,
}

/// The widget's view state (center, resolution, projection).
pub trait View: Send + Sync + Debug {
    /// Display projection.
    fn projection(&self) -> Projection;

    /// Current center.
    fn center(&self) -> Coordinate;

    /// Current resolution (map units per pixel).
    fn resolution(&self) -> f64;

    /// Center and zoom so that `geometry` is fully visible.
    fn fit(&self, geometry: &Geometry, options: FitOptions);
}

/// Built-in or element-backed map control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlKind {
    /// Engine default control, by name (zoom, attribution, ...).
    Builtin(String),
    /// Control rendered from a caller-provided element.
    Custom(Element),
}

/// A map control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Control {
    /// What the control is.
    pub kind: ControlKind,
}

/// Raster tile sources the engine can construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TileSource {
    /// OpenStreetMap standard tiles.
    #[default]
    Osm,
}

/// Options for [`MapEngine::create_vector_layer`].
#[derive(Clone, Debug, Default)]
pub struct VectorLayerOptions {
    /// Backing source; a layer without one ignores feature mutations.
    pub source: Option<Arc<dyn VectorSource>>,
    /// Layer-level styles, in draw order.
    pub styles: Vec<Style>,
}

/// Auto-pan behavior for overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoPan {
    /// Length of the pan animation.
    pub animation_duration: Duration,
}

/// Options for [`MapEngine::create_overlay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayOptions {
    /// Anchor element.
    pub element: Element,
    /// Pan the map so the overlay is visible when positioned.
    pub auto_pan: Option<AutoPan>,
}

/// Options for [`MapEngine::create_view`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewOptions {
    /// Initial center in `projection`.
    pub center: Coordinate,
    /// Initial zoom level.
    pub zoom: f64,
    /// Display projection.
    pub projection: Projection,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: 0.0,
            projection: Projection::WebMercator,
        }
    }
}

/// Everything the engine needs to construct a widget.
#[derive(Clone, Debug)]
pub struct MapOptions {
    /// Mount element.
    pub target: Element,
    /// Layer stack, bottom to top.
    pub layers: Vec<Arc<dyn Layer>>,
    /// Controls.
    pub controls: Vec<Control>,
    /// Overlays.
    pub overlays: Vec<Arc<dyn Overlay>>,
    /// Shared view.
    pub view: Arc<dyn View>,
}

/// A constructed, mounted map widget.
pub trait MapWidget: Send + Sync + Debug {
    /// The widget's view.
    fn view(&self) -> Arc<dyn View>;

    /// Layer stack, bottom to top.
    fn layers(&self) -> Vec<Arc<dyn Layer>>;

    /// Overlays attached to the widget.
    fn overlays(&self) -> Vec<Arc<dyn Overlay>>;

    /// Controls attached to the widget.
    fn controls(&self) -> Vec<Control>;

    /// Register a listener for one event kind.
    fn on(&self, kind: MapEventKind, handler: EventHandler) -> ListenerKey;

    /// Rendered features under a pixel, topmost first.
    fn features_at_pixel(&self, pixel: Pixel) -> Vec<Feature>;

    /// Whether any rendered feature lies under a pixel.
    fn has_feature_at_pixel(&self, pixel: Pixel) -> bool {
        !self.features_at_pixel(pixel).is_empty()
    }
}

/// Factory for every engine-side object the driver uses.
pub trait MapEngine: Send + Sync {
    /// Build a view.
    fn create_view(&self, options: ViewOptions) -> Arc<dyn View>;

    /// Build an empty vector source.
    fn create_vector_source(&self) -> Arc<dyn VectorSource>;

    /// Build a raster tile layer.
    fn create_tile_layer(&self, source: TileSource) -> Arc<dyn Layer>;

    /// Build a vector layer.
    fn create_vector_layer(&self, options: VectorLayerOptions) -> Arc<dyn Layer>;

    /// Build an overlay bound to an anchor element.
    fn create_overlay(&self, options: OverlayOptions) -> Arc<dyn Overlay>;

    /// Build a feature with a fresh identity.
    fn create_feature(&self, geometry: Geometry, attributes: Value) -> Feature;

    /// The engine's default control set.
    fn default_controls(&self) -> Vec<Control>;

    /// Wrap an element as a custom control.
    fn create_control(&self, element: Element) -> Control;

    /// Construct and mount the widget.
    fn create_map(&self, options: MapOptions) -> Result<Arc<dyn MapWidget>, PortError>;

    /// Geodesic circle around a lon/lat center, as an EPSG:4326 polygon.
    fn circular(&self, center: Coordinate, radius_m: f64, vertices: usize) -> Geometry;

    /// Reproject a geometry.
    fn transform(
        &self,
        geometry: &Geometry,
        from: Projection,
        to: Projection,
    ) -> Result<Geometry, PortError>;
}
