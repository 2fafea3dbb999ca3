// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reactive driver for interactive map widgets.
//!
//! A [`MapDriver`] turns a stream of declarative [`Action`]s into mutations
//! of a map widget built through a [`map_port::MapEngine`], and exposes what
//! the widget produces (click events, feature lists, layer and overlay
//! handles) as memoized streams on a [`MapSource`].
//!
//! The widget is constructed lazily: the driver watches a
//! [`map_port::Document`] until the configured target element appears,
//! mounts exactly once, then stops watching. Commands that arrive earlier
//! wait in their stream.
//!
//! ```no_run
//! use std::sync::Arc;
//! use map_driver::{Action, DriverOptions, LayerConfig, MapDriver};
//! # async fn demo(engine: Arc<dyn map_port::MapEngine>, document: Arc<dyn map_port::Document>) {
//! let options = DriverOptions::new("#map").with_layer("pins", LayerConfig::vector(vec![]));
//! let commands = futures_util::stream::iter(vec![Action::view([0.0, 0.0])]);
//! let driver = MapDriver::start(options, engine, document, commands).unwrap();
//! let _pins = driver.source().layer("pins");
//! # }
//! ```

pub mod action;
pub mod config;
pub mod controller;
pub mod dispatch;
mod driver;
pub mod events;
pub mod factory;
pub mod options;
pub mod registry;
pub mod stream;

pub use action::{Action, ActionKind, Inbound, LocationFix, LocationStream};
pub use config::{ConfigError, ConfigService, ConfigStore, MemoryConfigStore};
pub use controller::InitState;
pub use driver::{MapDriver, MapSource};
pub use events::{EventSelector, MapEvent};
pub use options::{
    DriverOptions, FeatureOptions, FillConfig, ImageConfig, KnownLayerConfig, LayerConfig,
    StrokeConfig, StyleConfig, TextConfig, VectorLayerConfig, ViewConfig,
};
pub use stream::{MemoryStream, Subscription};
