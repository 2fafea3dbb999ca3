// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Widget event proxy.
//!
//! The proxy exists before the widget does so consumers can subscribe early.
//! Once the widget is realized the proxy listens for clicks, double clicks
//! and load completion. Each click is followed by a synthesized
//! `feature-at-pixel` event carrying the topmost feature under the pointer.

use core::fmt;
use core::str::FromStr;
use std::sync::{Arc, Weak};

use futures_util::future::ready;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use map_port::{Feature, MapEventKind, MapWidget, PointerEvent, WidgetEvent};
use tracing::trace;

use crate::stream::{MemoryStream, Subscription};

/// Names consumers use to select an event stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventSelector {
    /// `"singleclick"`
    SingleClick,
    /// `"dblclick"`
    DoubleClick,
    /// `"feature-at-pixel"`
    FeatureAtPixel,
    /// `"loadend"`
    LoadEnd,
}

impl EventSelector {
    /// All selectors.
    pub const ALL: [Self; 4] = [
        Self::SingleClick,
        Self::DoubleClick,
        Self::FeatureAtPixel,
        Self::LoadEnd,
    ];

    /// Selector string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::SingleClick => "singleclick",
            Self::DoubleClick => "dblclick",
            Self::FeatureAtPixel => "feature-at-pixel",
            Self::LoadEnd => "loadend",
        }
    }
}

impl fmt::Display for EventSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Selector string that names no event stream.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown event selector: {0}")]
pub struct UnknownSelector(pub String);

impl FromStr for EventSelector {
    type Err = UnknownSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sel| sel.name() == s)
            .ok_or_else(|| UnknownSelector(s.to_string()))
    }
}

/// An event as seen by consumers.
#[derive(Clone, Debug, PartialEq)]
pub enum MapEvent {
    /// Raw single click.
    SingleClick(PointerEvent),
    /// Raw double click.
    DoubleClick(PointerEvent),
    /// Topmost feature under the last click, if any.
    FeatureAtPixel(Option<Feature>),
    /// Tile loading finished.
    LoadEnd,
}

impl MapEvent {
    /// Selector this event is delivered under.
    pub const fn selector(&self) -> EventSelector {
        match self {
            Self::SingleClick(_) => EventSelector::SingleClick,
            Self::DoubleClick(_) => EventSelector::DoubleClick,
            Self::FeatureAtPixel(_) => EventSelector::FeatureAtPixel,
            Self::LoadEnd => EventSelector::LoadEnd,
        }
    }
}

/// Memoized multicast of every event the widget produces.
#[derive(Clone, Debug, Default)]
pub struct EventProxy {
    out: MemoryStream<MapEvent>,
}

impl EventProxy {
    /// Create a detached proxy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register listeners on a realized widget.
    pub fn attach(&self, map: &Arc<dyn MapWidget>) {
        for kind in [
            MapEventKind::SingleClick,
            MapEventKind::DoubleClick,
            MapEventKind::LoadEnd,
        ] {
            let out = self.out.clone();
            let widget: Weak<dyn MapWidget> = Arc::downgrade(map);
            map.on(
                kind,
                Arc::new(move |event: &WidgetEvent| forward(&out, &widget, event)),
            );
        }
    }

    /// Every event, in emission order. The last event is replayed first.
    pub fn subscribe_all(&self) -> Subscription<MapEvent> {
        self.out.subscribe()
    }

    /// Events delivered under one selector.
    ///
    /// The replayed event is only seen if it matches `selector`.
    pub fn subscribe(&self, selector: EventSelector) -> BoxStream<'static, MapEvent> {
        self.out
            .subscribe()
            .filter(move |event| ready(event.selector() == selector))
            .boxed()
    }
}

fn forward(out: &MemoryStream<MapEvent>, widget: &Weak<dyn MapWidget>, event: &WidgetEvent) {
    trace!(kind = ?event.kind(), "widget event");
    match event {
        WidgetEvent::SingleClick(pointer) => {
            out.send(MapEvent::SingleClick(*pointer));
            out.send(MapEvent::FeatureAtPixel(topmost(widget, pointer)));
        }
        WidgetEvent::DoubleClick(pointer) => {
            out.send(MapEvent::DoubleClick(*pointer));
            out.send(MapEvent::FeatureAtPixel(topmost(widget, pointer)));
        }
        WidgetEvent::LoadEnd => out.send(MapEvent::LoadEnd),
    }
}

fn topmost(widget: &Weak<dyn MapWidget>, pointer: &PointerEvent) -> Option<Feature> {
    let map = widget.upgrade()?;
    if !map.has_feature_at_pixel(pointer.pixel) {
        return None;
    }
    map.features_at_pixel(pointer.pixel).into_iter().next()
}
