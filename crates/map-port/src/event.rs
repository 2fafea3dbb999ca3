// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Widget-originated events and listener callbacks.

use std::sync::Arc;

use crate::{Coordinate, Pixel};

/// Events a map widget can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    /// A click that was not part of a double click.
    SingleClick,
    /// A double click.
    DoubleClick,
    /// All pending tiles finished loading.
    LoadEnd,
}

/// Pointer position attached to click events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Position on the map surface.
    pub pixel: Pixel,
    /// The same position in view projection.
    pub coordinate: Coordinate,
}

/// A widget event as delivered to listeners.
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetEvent {
    /// Single click at a position.
    SingleClick(PointerEvent),
    /// Double click at a position.
    DoubleClick(PointerEvent),
    /// Load completion.
    LoadEnd,
}

impl WidgetEvent {
    /// Kind used for listener routing.
    pub const fn kind(&self) -> MapEventKind {
        match self {
            Self::SingleClick(_) => MapEventKind::SingleClick,
            Self::DoubleClick(_) => MapEventKind::DoubleClick,
            Self::LoadEnd => MapEventKind::LoadEnd,
        }
    }
}

/// Handle returned when registering a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerKey(pub u64);

/// Callback for widget events. Invoked synchronously on the emitting thread.
pub type EventHandler = Arc<dyn Fn(&WidgetEvent) + Send + Sync>;

/// Callback for source content changes.
pub type ChangeHandler = Arc<dyn Fn() + Send + Sync>;
