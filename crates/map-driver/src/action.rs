// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Commands accepted by the driver.
//!
//! Seven action kinds are recognized. Anything else a producer wants to pass
//! through is wrapped as [`Inbound::Unrecognized`] and dropped by the driver
//! without side effects.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;

use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use map_port::{Coordinate, Feature, Layer, Overlay};

/// One reading from a location provider, in EPSG:4326.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocationFix {
    /// Degrees east.
    pub longitude: f64,
    /// Degrees north.
    pub latitude: f64,
    /// Horizontal accuracy radius in meters.
    pub accuracy: f64,
}

impl LocationFix {
    /// Build a fix.
    pub const fn new(longitude: f64, latitude: f64, accuracy: f64) -> Self {
        Self {
            longitude,
            latitude,
            accuracy,
        }
    }

    /// Longitude/latitude pair.
    pub const fn position(&self) -> Coordinate {
        [self.longitude, self.latitude]
    }
}

/// Stream of location fixes carried by [`Action::TrackLocation`].
pub type LocationStream = BoxStream<'static, LocationFix>;

/// A recognized command.
pub enum Action {
    /// Fit the view to a point.
    View {
        /// Point in view projection.
        coordinates: Coordinate,
    },
    /// Follow a location stream with the location dot.
    TrackLocation {
        /// Successive fixes.
        fixes: LocationStream,
    },
    /// Add a feature to a layer's source.
    AddFeature {
        /// Target layer.
        layer: Arc<dyn Layer>,
        /// Feature to add.
        feature: Feature,
    },
    /// Remove a feature from a layer's source.
    RemoveFeature {
        /// Target layer.
        layer: Arc<dyn Layer>,
        /// Feature to remove.
        feature: Feature,
    },
    /// Clear a layer's source.
    RemoveAllFeatures {
        /// Target layer.
        layer: Arc<dyn Layer>,
    },
    /// Position an overlay.
    ShowOverlay {
        /// Overlay to show.
        overlay: Arc<dyn Overlay>,
        /// Position in view projection.
        coordinates: Coordinate,
    },
    /// Hide an overlay.
    HideOverlay {
        /// Overlay to hide.
        overlay: Arc<dyn Overlay>,
    },
}

impl Action {
    /// `View` action.
    pub const fn view(coordinates: Coordinate) -> Self {
        Self::View { coordinates }
    }

    /// `TrackLocation` action from any sendable stream of fixes.
    pub fn track_location<S>(fixes: S) -> Self
    where
        S: Stream<Item = LocationFix> + Send + 'static,
    {
        Self::TrackLocation {
            fixes: fixes.boxed(),
        }
    }

    /// `AddFeature` action.
    pub fn add_feature(layer: Arc<dyn Layer>, feature: Feature) -> Self {
        Self::AddFeature { layer, feature }
    }

    /// `RemoveFeature` action.
    pub fn remove_feature(layer: Arc<dyn Layer>, feature: Feature) -> Self {
        Self::RemoveFeature { layer, feature }
    }

    /// `RemoveAllFeatures` action.
    pub fn remove_all_features(layer: Arc<dyn Layer>) -> Self {
        Self::RemoveAllFeatures { layer }
    }

    /// `ShowOverlay` action.
    pub fn show_overlay(overlay: Arc<dyn Overlay>, coordinates: Coordinate) -> Self {
        Self::ShowOverlay {
            overlay,
            coordinates,
        }
    }

    /// `HideOverlay` action.
    pub fn hide_overlay(overlay: Arc<dyn Overlay>) -> Self {
        Self::HideOverlay { overlay }
    }

    /// Kind tag of this action.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::View { .. } => ActionKind::View,
            Self::TrackLocation { .. } => ActionKind::TrackLocation,
            Self::AddFeature { .. } => ActionKind::AddFeature,
            Self::RemoveFeature { .. } => ActionKind::RemoveFeature,
            Self::RemoveAllFeatures { .. } => ActionKind::RemoveAllFeatures,
            Self::ShowOverlay { .. } => ActionKind::ShowOverlay,
            Self::HideOverlay { .. } => ActionKind::HideOverlay,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View { coordinates } => f
                .debug_struct("View")
                .field("coordinates", coordinates)
                .finish(),
            Self::TrackLocation { .. } => f.debug_struct("TrackLocation").finish_non_exhaustive(),
            Self::AddFeature { feature, .. } => f
                .debug_struct("AddFeature")
                .field("feature", &feature.id())
                .finish_non_exhaustive(),
            Self::RemoveFeature { feature, .. } => f
                .debug_struct("RemoveFeature")
                .field("feature", &feature.id())
                .finish_non_exhaustive(),
            Self::RemoveAllFeatures { .. } => {
                f.debug_struct("RemoveAllFeatures").finish_non_exhaustive()
            }
            Self::ShowOverlay {
                overlay,
                coordinates,
            } => f
                .debug_struct("ShowOverlay")
                .field("overlay", &overlay.element().name())
                .field("coordinates", coordinates)
                .finish(),
            Self::HideOverlay { overlay } => f
                .debug_struct("HideOverlay")
                .field("overlay", &overlay.element().name())
                .finish(),
        }
    }
}

/// Wire tags of the recognized action kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// `"view"`
    View,
    /// `"track-location"`
    TrackLocation,
    /// `"add-feature"`
    AddFeature,
    /// `"remove-feature"`
    RemoveFeature,
    /// `"remove-all-features"`
    RemoveAllFeatures,
    /// `"show-overlay"`
    ShowOverlay,
    /// `"hide-overlay"`
    HideOverlay,
}

impl ActionKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::View,
        Self::TrackLocation,
        Self::AddFeature,
        Self::RemoveFeature,
        Self::RemoveAllFeatures,
        Self::ShowOverlay,
        Self::HideOverlay,
    ];

    /// Wire tag.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::TrackLocation => "track-location",
            Self::AddFeature => "add-feature",
            Self::RemoveFeature => "remove-feature",
            Self::RemoveAllFeatures => "remove-all-features",
            Self::ShowOverlay => "show-overlay",
            Self::HideOverlay => "hide-overlay",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Tag that names no recognized action kind.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized action tag: {0}")]
pub struct UnknownActionTag(pub String);

impl FromStr for ActionKind {
    type Err = UnknownActionTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.tag() == s)
            .ok_or_else(|| UnknownActionTag(s.to_string()))
    }
}

/// Anything that can arrive on the command stream.
#[derive(Debug)]
pub enum Inbound {
    /// A recognized action.
    Action(Action),
    /// A record whose tag matched no action kind; ignored.
    Unrecognized(String),
}

impl Inbound {
    /// Wrap a record that carries an unknown tag.
    pub fn unrecognized(tag: impl Into<String>) -> Self {
        Self::Unrecognized(tag.into())
    }
}

impl From<Action> for Inbound {
    fn from(action: Action) -> Self {
        Self::Action(action)
    }
}
