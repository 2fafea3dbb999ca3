// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Action dispatch against a realized widget.
//!
//! Actions are applied one at a time, in arrival order. `track-location`
//! starts a background task that follows the fix stream; a newer
//! `track-location` replaces it, so at most one location stream is followed.

use std::sync::{Arc, Mutex};

use futures_util::{Stream, StreamExt};
use map_port::{
    Coordinate, FitOptions, Geometry, Layer, MapEngine, Overlay, Projection, VectorSource, View,
};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::action::{Action, ActionKind, LocationFix, LocationStream};
use crate::controller::Realized;

/// Floor for the view resolution when fitting to a point.
pub const VIEW_MIN_RESOLUTION: f64 = 15.0;

/// Vertex count of the accuracy circle drawn around a location fix.
pub const ACCURACY_RING_VERTICES: usize = 32;

/// Last point the view was fitted to or the location dot was placed at, in
/// view projection. Shared between the dispatcher and the driver handle.
#[derive(Clone, Debug, Default)]
pub struct TrackedPoint(Arc<Mutex<Option<Coordinate>>>);

impl TrackedPoint {
    /// Current value; `None` until the first `view` or location fix.
    pub fn get(&self) -> Option<Coordinate> {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set(&self, point: Coordinate) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = Some(point);
    }
}

/// Whether an action passes the location-dot gate.
///
/// `track-location` is admitted only when the location dot is enabled;
/// every other kind always passes.
pub fn admits(show_location_dot: bool, action: &Action) -> bool {
    show_location_dot || action.kind() != ActionKind::TrackLocation
}

/// Applies actions to one realized widget.
pub struct Dispatcher {
    engine: Arc<dyn MapEngine>,
    realized: Realized,
    tracked: TrackedPoint,
    tracking: Option<JoinHandle<()>>,
}

impl core::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("realized", &self.realized)
            .field("tracking", &self.tracking.is_some())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Dispatcher for a freshly realized widget.
    pub fn new(engine: Arc<dyn MapEngine>, realized: Realized, tracked: TrackedPoint) -> Self {
        Self {
            engine,
            realized,
            tracked,
            tracking: None,
        }
    }

    /// Apply one action.
    ///
    /// Must run inside a Tokio runtime: `track-location` spawns a task.
    pub fn dispatch(&mut self, action: Action) {
        debug!(action = %action.kind(), "dispatch");
        match action {
            Action::View { coordinates } => {
                self.tracked.set(coordinates);
                self.realized.view.fit(
                    &Geometry::Point(coordinates),
                    FitOptions {
                        min_resolution: Some(VIEW_MIN_RESOLUTION),
                    },
                );
            }
            Action::TrackLocation { fixes } => self.track(fixes),
            Action::AddFeature { layer, feature } => {
                if let Some(source) = source_of(&layer) {
                    source.add_feature(feature);
                }
            }
            Action::RemoveFeature { layer, feature } => {
                if let Some(source) = source_of(&layer) {
                    if !source.remove_feature(&feature) {
                        debug!(feature = feature.id().0, "feature not in layer; nothing removed");
                    }
                }
            }
            Action::RemoveAllFeatures { layer } => {
                if let Some(source) = source_of(&layer) {
                    source.clear();
                }
            }
            Action::ShowOverlay {
                overlay,
                coordinates,
            } => overlay.set_position(Some(coordinates)),
            Action::HideOverlay { overlay } => overlay.set_position(None),
        }
    }

    /// Whether a location stream is currently being followed.
    pub fn is_tracking(&self) -> bool {
        self.tracking.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn track(&mut self, mut fixes: LocationStream) {
        if let Some(previous) = self.tracking.take() {
            debug!("replacing active location stream");
            previous.abort();
        }
        let engine = self.engine.clone();
        let realized = self.realized.clone();
        let tracked = self.tracked.clone();
        self.tracking = Some(tokio::spawn(async move {
            while let Some(fix) = fixes.next().await {
                apply_fix(engine.as_ref(), &realized, &tracked, fix);
            }
            debug!("location stream ended");
        }));
    }

    /// Apply every action from `actions`, then keep following the active
    /// location stream until it ends.
    pub async fn run<S>(mut self, mut actions: S)
    where
        S: Stream<Item = Action> + Send + Unpin,
    {
        while let Some(action) = actions.next().await {
            self.dispatch(action);
        }
        debug!("command stream ended");
        if let Some(tracking) = self.tracking.as_mut() {
            match tracking.await {
                Ok(()) => {}
                Err(err) if err.is_panic() => warn!(%err, "location task panicked"),
                Err(err) => debug!(%err, "location task cancelled"),
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if let Some(tracking) = self.tracking.take() {
            tracking.abort();
        }
    }
}

fn source_of(layer: &Arc<dyn Layer>) -> Option<Arc<dyn VectorSource>> {
    let source = layer.source();
    if source.is_none() {
        warn!(kind = ?layer.kind(), "layer has no vector source; action ignored");
    }
    source
}

/// Replace the location dot with a point and an accuracy circle for `fix`.
pub(crate) fn apply_fix(
    engine: &dyn MapEngine,
    realized: &Realized,
    tracked: &TrackedPoint,
    fix: LocationFix,
) {
    let projection = realized.view.projection();
    let position = fix.position();
    let point = match engine.transform(&Geometry::Point(position), Projection::Geographic, projection)
    {
        Ok(point) => point,
        Err(err) => {
            warn!(%err, "cannot project location fix; skipped");
            return;
        }
    };
    let ring = engine.circular(position, fix.accuracy, ACCURACY_RING_VERTICES);
    let ring = match engine.transform(&ring, Projection::Geographic, projection) {
        Ok(ring) => ring,
        Err(err) => {
            warn!(%err, "cannot project accuracy circle; skipped");
            return;
        }
    };
    let dot = &realized.location_dot;
    dot.clear();
    if let Geometry::Point(projected) = point {
        tracked.set(projected);
    }
    dot.add_feature(engine.create_feature(point, Value::Null));
    dot.add_feature(engine.create_feature(ring, Value::Null));
}
