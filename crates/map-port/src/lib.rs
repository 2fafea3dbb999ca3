// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Port contract between the map driver and its external collaborators.
//!
//! The driver never renders anything itself. It talks to two ports:
//!
//! - [`MapEngine`] builds views, layers, sources, overlays, features and
//!   the map widget, and owns projection math and hit-testing.
//! - [`Document`] resolves selectors to mount elements and reports
//!   structural changes of the surrounding tree.
//!
//! # Design Principles
//!
//! - **Engines are dumb.** They build objects and emit events. No driver logic.
//! - **Handles are shared.** Every realized object is an `Arc<dyn Trait>`, so
//!   the driver, the registry and consumers all point at the same instance.
//! - **Drawables are values.** Styles, geometries and features are plain data.

use thiserror::Error;

/// Error type for engine operations that can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// The engine has no transform between the two projections.
    #[error("unsupported projection transform: {from} -> {to}")]
    UnsupportedTransform {
        /// Source projection code.
        from: &'static str,
        /// Destination projection code.
        to: &'static str,
    },
    /// A backend-specific error occurred.
    #[error("backend error: {0}")]
    Backend(String),
}

mod document;
mod engine;
mod event;
mod feature;
mod geom;
mod style;

pub use document::{Document, Element, MutationWatch};
pub use engine::{
    AutoPan, Control, ControlKind, FitOptions, Layer, LayerKind, MapEngine, MapOptions, MapWidget,
    Overlay, OverlayOptions, TileSource, VectorLayerOptions, VectorSource, View, ViewOptions,
};
pub use event::{ChangeHandler, EventHandler, ListenerKey, MapEventKind, PointerEvent, WidgetEvent};
pub use feature::{Feature, FeatureId};
pub use geom::{Coordinate, Extent, Geometry, Pixel, Projection};
pub use style::{CircleStyle, Fill, IconStyle, ImageStyle, Stroke, Style, TextStyle};
