// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Output registry: named handles to realized layers and overlays.
//!
//! Every key is allocated from configuration before the widget exists, so
//! consumers can subscribe immediately and receive the handle once it is
//! realized. Each handle entry is written at most once; a feature list entry
//! re-emits whenever its layer's source changes.

use std::collections::HashMap;
use std::sync::Arc;

use map_port::{Feature, Layer, Overlay};
use tracing::{debug, warn};

use crate::options::DriverOptions;
use crate::stream::{MemoryStream, Subscription};

/// Keyed output streams for one driver instance.
#[derive(Debug, Default)]
pub struct OutputRegistry {
    layers: HashMap<String, MemoryStream<Arc<dyn Layer>>>,
    features: HashMap<String, MemoryStream<Vec<Feature>>>,
    overlays: HashMap<String, MemoryStream<Arc<dyn Overlay>>>,
}

impl OutputRegistry {
    /// Allocate one entry per configured layer name and overlay selector.
    pub fn allocate(options: &DriverOptions) -> Self {
        let mut registry = Self::default();
        for (name, _) in &options.layers {
            registry.layers.insert(name.clone(), MemoryStream::new());
            registry.features.insert(name.clone(), MemoryStream::new());
        }
        for selector in &options.overlays {
            registry
                .overlays
                .insert(selector.clone(), MemoryStream::new());
        }
        registry
    }

    /// Handle stream for a configured layer.
    pub fn layer(&self, name: &str) -> Option<Subscription<Arc<dyn Layer>>> {
        self.layers.get(name).map(MemoryStream::subscribe)
    }

    /// Feature list stream for a configured layer.
    pub fn features(&self, name: &str) -> Option<Subscription<Vec<Feature>>> {
        self.features.get(name).map(MemoryStream::subscribe)
    }

    /// Handle stream for a configured overlay selector.
    pub fn overlay(&self, selector: &str) -> Option<Subscription<Arc<dyn Overlay>>> {
        self.overlays.get(selector).map(MemoryStream::subscribe)
    }

    /// Publish a realized layer and start mirroring its source contents.
    ///
    /// Returns `false` (and changes nothing) if the name is unknown or the
    /// layer was already published.
    pub(crate) fn publish_layer(&self, name: &str, layer: Arc<dyn Layer>) -> bool {
        let Some(slot) = self.layers.get(name) else {
            warn!(layer = name, "publish for unconfigured layer ignored");
            return false;
        };
        if slot.emissions() > 0 {
            warn!(layer = name, "layer already published; keeping the first handle");
            return false;
        }
        if let Some(list) = self.features.get(name) {
            match layer.source() {
                Some(source) => {
                    list.send(source.features());
                    let mirror = list.clone();
                    let weak = Arc::downgrade(&source);
                    source.on_change(Arc::new(move || {
                        if let Some(source) = weak.upgrade() {
                            mirror.send(source.features());
                        }
                    }));
                }
                None => list.send(Vec::new()),
            }
        }
        slot.send(layer);
        debug!(layer = name, "layer published");
        true
    }

    /// Publish a realized overlay. Same at-most-once rule as layers.
    pub(crate) fn publish_overlay(&self, selector: &str, overlay: Arc<dyn Overlay>) -> bool {
        let Some(slot) = self.overlays.get(selector) else {
            warn!(overlay = selector, "publish for unconfigured overlay ignored");
            return false;
        };
        if slot.emissions() > 0 {
            warn!(overlay = selector, "overlay already published; keeping the first handle");
            return false;
        }
        slot.send(overlay);
        debug!(overlay = selector, "overlay published");
        true
    }
}
