// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Driver entry point and the consumer-facing output API.

use std::sync::Arc;

use futures_util::future::ready;
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use map_port::{Coordinate, Document, Feature, Layer, MapEngine, Overlay};
use tokio::task::JoinHandle;
use tracing::{debug, info_span, Instrument};

use crate::action::{Action, Inbound};
use crate::config::ConfigError;
use crate::controller::{InitController, InitState};
use crate::dispatch::{admits, Dispatcher, TrackedPoint};
use crate::events::{EventProxy, EventSelector, MapEvent};
use crate::factory;
use crate::options::{DriverOptions, FeatureOptions};
use crate::registry::OutputRegistry;
use crate::stream::{MemoryStream, Subscription};

/// Read side of a running driver. Cheap to clone.
#[derive(Clone)]
pub struct MapSource {
    engine: Arc<dyn MapEngine>,
    registry: Arc<OutputRegistry>,
    proxy: EventProxy,
}

impl core::fmt::Debug for MapSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MapSource")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl MapSource {
    /// Events delivered under `selector`. Available before the widget exists.
    pub fn events(&self, selector: EventSelector) -> BoxStream<'static, MapEvent> {
        self.proxy.subscribe(selector)
    }

    /// Every event, in emission order.
    pub fn all_events(&self) -> Subscription<MapEvent> {
        self.proxy.subscribe_all()
    }

    /// Feature list of a configured layer, re-emitted on every change of
    /// its source. `None` for names that were not configured.
    pub fn features(&self, layer: &str) -> Option<Subscription<Vec<Feature>>> {
        self.registry.features(layer)
    }

    /// Build a point feature with a fresh identity.
    pub fn create_feature(&self, options: FeatureOptions) -> Feature {
        factory::build_feature(self.engine.as_ref(), options)
    }

    /// Handle of a configured layer, delivered once the widget is realized.
    pub fn layer(&self, name: &str) -> Option<Subscription<Arc<dyn Layer>>> {
        self.registry.layer(name)
    }

    /// Handle of a configured overlay, delivered once its anchor resolves.
    pub fn overlay(&self, selector: &str) -> Option<Subscription<Arc<dyn Overlay>>> {
        self.registry.overlay(selector)
    }
}

/// A running driver: one widget fed by one command stream.
///
/// Dropping the driver stops command processing and any location tracking.
pub struct MapDriver {
    source: MapSource,
    state: MemoryStream<InitState>,
    tracked: TrackedPoint,
    task: JoinHandle<()>,
}

impl core::fmt::Debug for MapDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MapDriver")
            .field("state", &self.current_state())
            .field("tracked", &self.tracked.get())
            .finish_non_exhaustive()
    }
}

impl MapDriver {
    /// Validate `options`, then start waiting for the mount target and
    /// applying `commands`.
    ///
    /// Commands that arrive before the widget is realized stay queued in the
    /// stream and are applied in order afterwards. `track-location` commands
    /// are dropped when `show_location_dot` is off. Unrecognized records are
    /// dropped.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<S, I>(
        options: DriverOptions,
        engine: Arc<dyn MapEngine>,
        document: Arc<dyn Document>,
        commands: S,
    ) -> Result<Self, ConfigError>
    where
        S: Stream<Item = I> + Send + 'static,
        I: Into<Inbound> + Send + 'static,
    {
        options.validate()?;
        let registry = Arc::new(OutputRegistry::allocate(&options));
        let proxy = EventProxy::new();
        let state = MemoryStream::new();
        let tracked = TrackedPoint::default();
        let show_location_dot = options.show_location_dot;
        let span = info_span!("map_driver", target = %options.target);

        let controller = InitController::new(
            options,
            engine.clone(),
            document,
            registry.clone(),
            proxy.clone(),
            state.clone(),
        );
        let actions = admitted(commands, show_location_dot);
        let dispatch_engine = engine.clone();
        let dispatch_tracked = tracked.clone();
        let task = tokio::spawn(
            async move {
                let Some(realized) = controller.run().await else {
                    return;
                };
                Dispatcher::new(dispatch_engine, realized, dispatch_tracked)
                    .run(actions)
                    .await;
            }
            .instrument(span),
        );

        Ok(Self {
            source: MapSource {
                engine,
                registry,
                proxy,
            },
            state,
            tracked,
            task,
        })
    }

    /// Consumer-facing outputs.
    pub fn source(&self) -> &MapSource {
        &self.source
    }

    /// Lifecycle transitions, starting with the current state.
    pub fn state(&self) -> Subscription<InitState> {
        self.state.subscribe()
    }

    /// Current lifecycle state.
    pub fn current_state(&self) -> InitState {
        self.state.last().unwrap_or(InitState::AwaitingMount)
    }

    /// Last point the view was fitted to or the location dot was placed at.
    pub fn tracked_point(&self) -> Option<Coordinate> {
        self.tracked.get()
    }

    /// Whether the driver task has stopped (document gone, or commands and
    /// location tracking both finished).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for MapDriver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn admitted<S, I>(commands: S, show_location_dot: bool) -> BoxStream<'static, Action>
where
    S: Stream<Item = I> + Send + 'static,
    I: Into<Inbound> + Send + 'static,
{
    commands
        .filter_map(|item| {
            let inbound: Inbound = item.into();
            ready(match inbound {
                Inbound::Action(action) => Some(action),
                Inbound::Unrecognized(tag) => {
                    debug!(%tag, "unrecognized action ignored");
                    None
                }
            })
        })
        .filter(move |action| {
            let pass = admits(show_location_dot, action);
            if !pass {
                debug!("track-location ignored: location dot disabled");
            }
            ready(pass)
        })
        .boxed()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    #[tokio::test]
    async fn unrecognized_and_gated_records_are_dropped_upstream() {
        let input = futures_util::stream::iter(vec![
            Inbound::unrecognized("zoom-to"),
            Inbound::from(Action::track_location(futures_util::stream::empty())),
            Inbound::from(Action::view([1.0, 1.0])),
        ]);
        let kinds: Vec<ActionKind> = admitted(input, false)
            .map(|a| a.kind())
            .collect()
            .await;
        assert_eq!(kinds, vec![ActionKind::View]);
    }

    #[tokio::test]
    async fn track_location_passes_when_dot_enabled() {
        let input = futures_util::stream::iter(vec![Action::track_location(
            futures_util::stream::empty(),
        )]);
        let kinds: Vec<ActionKind> = admitted(input, true).map(|a| a.kind()).collect().await;
        assert_eq!(kinds, vec![ActionKind::TrackLocation]);
    }
}
