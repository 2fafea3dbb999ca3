// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Headless in-memory implementations of the `map-port` traits.
//!
//! - [`MockEngine`] builds real, mutable objects (sources, layers, overlays,
//!   views, widgets) without drawing anything, and counts what it built.
//! - [`MockMap`] can simulate clicks and load completion and performs pixel
//!   hit-testing against the features of its vector layers.
//! - [`MockDocument`] is a selector → element table that notifies watchers on
//!   every insertion or removal.
//!
//! Use them to drive the map driver end-to-end in tests and demos.

mod document;
mod engine;
pub mod proj;
mod widget;

pub use document::MockDocument;
pub use engine::MockEngine;
pub use widget::{MockLayer, MockMap, MockOverlay, MockVectorSource, MockView, VIEWPORT_SIZE};
