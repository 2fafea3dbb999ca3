// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mock widget objects: sources, layers, overlays, view and the map itself.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use map_port::{
    AutoPan, ChangeHandler, Control, Coordinate, Element, EventHandler, Feature, FitOptions,
    Geometry, Layer, LayerKind, ListenerKey, MapEventKind, MapOptions, MapWidget, Overlay, Pixel,
    PointerEvent, Projection, Style, VectorSource, View, ViewOptions, WidgetEvent,
};

/// Size of the simulated map surface in pixels (width, height).
pub const VIEWPORT_SIZE: [f64; 2] = [800.0, 600.0];

/// Resolution at zoom 0: one 256 px tile spans the Web Mercator world.
const MAX_RESOLUTION: f64 = 40_075_016.685_578_49 / 256.0;

/// Pick radius for point features.
const HIT_TOLERANCE_PX: f64 = 5.0;

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
struct SourceState {
    features: Vec<Feature>,
    handlers: Vec<(ListenerKey, ChangeHandler)>,
}

/// In-memory [`VectorSource`].
#[derive(Default)]
pub struct MockVectorSource {
    state: Mutex<SourceState>,
    next_key: AtomicU64,
}

impl MockVectorSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of features currently held.
    pub fn len(&self) -> usize {
        lock(&self.state).features.len()
    }

    /// Whether the source holds no features.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn notify(&self) {
        let handlers: Vec<ChangeHandler> = lock(&self.state)
            .handlers
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for handler in handlers {
            handler();
        }
    }
}

impl core::fmt::Debug for MockVectorSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockVectorSource")
            .field("features", &self.len())
            .finish_non_exhaustive()
    }
}

impl VectorSource for MockVectorSource {
    fn add_feature(&self, feature: Feature) {
        {
            let mut state = lock(&self.state);
            if state.features.contains(&feature) {
                return;
            }
            state.features.push(feature);
        }
        self.notify();
    }

    fn remove_feature(&self, feature: &Feature) -> bool {
        let removed = {
            let mut state = lock(&self.state);
            let before = state.features.len();
            state.features.retain(|f| f != feature);
            state.features.len() != before
        };
        if removed {
            self.notify();
        }
        removed
    }

    fn clear(&self) {
        lock(&self.state).features.clear();
        self.notify();
    }

    fn features(&self) -> Vec<Feature> {
        lock(&self.state).features.clone()
    }

    fn on_change(&self, handler: ChangeHandler) -> ListenerKey {
        let key = ListenerKey(self.next_key.fetch_add(1, Ordering::Relaxed));
        lock(&self.state).handlers.push((key, handler));
        key
    }
}

/// In-memory [`Layer`].
#[derive(Debug)]
pub struct MockLayer {
    kind: LayerKind,
    source: Option<Arc<dyn VectorSource>>,
    styles: Vec<Style>,
}

impl MockLayer {
    pub(crate) fn new(
        kind: LayerKind,
        source: Option<Arc<dyn VectorSource>>,
        styles: Vec<Style>,
    ) -> Self {
        Self {
            kind,
            source,
            styles,
        }
    }
}

impl Layer for MockLayer {
    fn kind(&self) -> LayerKind {
        self.kind
    }

    fn source(&self) -> Option<Arc<dyn VectorSource>> {
        self.source.clone()
    }

    fn styles(&self) -> Vec<Style> {
        self.styles.clone()
    }
}

/// In-memory [`Overlay`].
#[derive(Debug)]
pub struct MockOverlay {
    element: Element,
    auto_pan: Option<AutoPan>,
    position: Mutex<Option<Coordinate>>,
}

impl MockOverlay {
    pub(crate) fn new(element: Element, auto_pan: Option<AutoPan>) -> Self {
        Self {
            element,
            auto_pan,
            position: Mutex::new(None),
        }
    }

    /// Auto-pan settings the overlay was built with.
    pub fn auto_pan(&self) -> Option<AutoPan> {
        self.auto_pan
    }
}

impl Overlay for MockOverlay {
    fn element(&self) -> Element {
        self.element.clone()
    }

    fn set_position(&self, position: Option<Coordinate>) {
        *lock(&self.position) = position;
    }

    fn position(&self) -> Option<Coordinate> {
        *lock(&self.position)
    }
}

#[derive(Debug, Clone, Copy)]
struct ViewState {
    center: Coordinate,
    resolution: f64,
    fits: usize,
}

/// In-memory [`View`] with a fixed [`VIEWPORT_SIZE`].
#[derive(Debug)]
pub struct MockView {
    projection: Projection,
    state: Mutex<ViewState>,
}

impl MockView {
    pub(crate) fn new(options: ViewOptions) -> Self {
        Self {
            projection: options.projection,
            state: Mutex::new(ViewState {
                center: options.center,
                resolution: MAX_RESOLUTION / 2f64.powf(options.zoom),
                fits: 0,
            }),
        }
    }

    /// How many times [`View::fit`] has been called.
    pub fn fit_count(&self) -> usize {
        lock(&self.state).fits
    }
}

impl View for MockView {
    fn projection(&self) -> Projection {
        self.projection
    }

    fn center(&self) -> Coordinate {
        lock(&self.state).center
    }

    fn resolution(&self) -> f64 {
        lock(&self.state).resolution
    }

    fn fit(&self, geometry: &Geometry, options: FitOptions) {
        let [min_x, min_y, max_x, max_y] = geometry.extent();
        let mut state = lock(&self.state);
        state.center = [(min_x + max_x) / 2.0, (min_y + max_y) / 2.0];
        let needed = ((max_x - min_x) / VIEWPORT_SIZE[0]).max((max_y - min_y) / VIEWPORT_SIZE[1]);
        let resolution = match options.min_resolution {
            Some(min) => needed.max(min),
            None if needed > 0.0 => needed,
            None => state.resolution,
        };
        state.resolution = resolution;
        state.fits += 1;
    }
}

/// In-memory [`MapWidget`].
pub struct MockMap {
    target: Element,
    layers: Vec<Arc<dyn Layer>>,
    controls: Vec<Control>,
    overlays: Vec<Arc<dyn Overlay>>,
    view: Arc<dyn View>,
    listeners: Mutex<HashMap<MapEventKind, Vec<(ListenerKey, EventHandler)>>>,
    next_key: AtomicU64,
}

impl MockMap {
    pub(crate) fn new(options: MapOptions) -> Self {
        Self {
            target: options.target,
            layers: options.layers,
            controls: options.controls,
            overlays: options.overlays,
            view: options.view,
            listeners: Mutex::new(HashMap::new()),
            next_key: AtomicU64::new(0),
        }
    }

    /// Element the widget is mounted on.
    pub fn target(&self) -> &Element {
        &self.target
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: MapEventKind) -> usize {
        lock(&self.listeners).get(&kind).map_or(0, Vec::len)
    }

    /// Convert a pixel to a view coordinate.
    pub fn coordinate_from_pixel(&self, [px, py]: Pixel) -> Coordinate {
        let [cx, cy] = self.view.center();
        let res = self.view.resolution();
        [
            cx + (px - VIEWPORT_SIZE[0] / 2.0) * res,
            cy - (py - VIEWPORT_SIZE[1] / 2.0) * res,
        ]
    }

    /// Convert a view coordinate to a pixel.
    pub fn pixel_from_coordinate(&self, [x, y]: Coordinate) -> Pixel {
        let [cx, cy] = self.view.center();
        let res = self.view.resolution();
        [
            (x - cx) / res + VIEWPORT_SIZE[0] / 2.0,
            (cy - y) / res + VIEWPORT_SIZE[1] / 2.0,
        ]
    }

    /// Simulate a single click.
    pub fn click(&self, pixel: Pixel) {
        let event = PointerEvent {
            pixel,
            coordinate: self.coordinate_from_pixel(pixel),
        };
        self.emit(&WidgetEvent::SingleClick(event));
    }

    /// Simulate a double click.
    pub fn double_click(&self, pixel: Pixel) {
        let event = PointerEvent {
            pixel,
            coordinate: self.coordinate_from_pixel(pixel),
        };
        self.emit(&WidgetEvent::DoubleClick(event));
    }

    /// Simulate tile loading completing.
    pub fn load_end(&self) {
        self.emit(&WidgetEvent::LoadEnd);
    }

    /// Deliver an event to every listener of its kind, in registration order.
    pub fn emit(&self, event: &WidgetEvent) {
        let handlers: Vec<EventHandler> = lock(&self.listeners)
            .get(&event.kind())
            .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();
        tracing::trace!(kind = ?event.kind(), listeners = handlers.len(), "mock map event");
        for handler in handlers {
            handler(event);
        }
    }

    fn hits(&self, feature: &Feature, pixel: Pixel) -> bool {
        match feature.geometry() {
            Geometry::Point(c) => {
                let [fx, fy] = self.pixel_from_coordinate(*c);
                (fx - pixel[0]).hypot(fy - pixel[1]) <= HIT_TOLERANCE_PX
            }
            Geometry::Polygon(rings) => rings
                .first()
                .is_some_and(|ring| ring_contains(ring, self.coordinate_from_pixel(pixel))),
        }
    }
}

/// Even-odd ray casting.
fn ring_contains(ring: &[Coordinate], [x, y]: Coordinate) -> bool {
    let Some(&last) = ring.last() else {
        return false;
    };
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut prev = last;
    for &[xi, yi] in ring {
        let [xj, yj] = prev;
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        prev = [xi, yi];
    }
    inside
}

impl core::fmt::Debug for MockMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockMap")
            .field("target", &self.target)
            .field("layers", &self.layers.len())
            .field("overlays", &self.overlays.len())
            .finish_non_exhaustive()
    }
}

impl MapWidget for MockMap {
    fn view(&self) -> Arc<dyn View> {
        self.view.clone()
    }

    fn layers(&self) -> Vec<Arc<dyn Layer>> {
        self.layers.clone()
    }

    fn overlays(&self) -> Vec<Arc<dyn Overlay>> {
        self.overlays.clone()
    }

    fn controls(&self) -> Vec<Control> {
        self.controls.clone()
    }

    fn on(&self, kind: MapEventKind, handler: EventHandler) -> ListenerKey {
        let key = ListenerKey(self.next_key.fetch_add(1, Ordering::Relaxed));
        lock(&self.listeners)
            .entry(kind)
            .or_default()
            .push((key, handler));
        key
    }

    fn features_at_pixel(&self, pixel: Pixel) -> Vec<Feature> {
        let mut out = Vec::new();
        for layer in self.layers.iter().rev() {
            if layer.kind() != LayerKind::Vector {
                continue;
            }
            let Some(source) = layer.source() else {
                continue;
            };
            out.extend(
                source
                    .features()
                    .into_iter()
                    .rev()
                    .filter(|f| self.hits(f, pixel)),
            );
        }
        out
    }
}
