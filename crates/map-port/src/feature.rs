// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Features: engine-created drawables with a stable identity.

use serde_json::Value;

use crate::{Geometry, Style};

/// Identity of a feature, allocated by the engine that created it.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(pub u64);

/// A drawable feature.
///
/// Equality is identity: two features compare equal iff they share a
/// [`FeatureId`], regardless of geometry or attributes. Sources rely on this
/// to remove exactly the feature that was added.
#[derive(Clone, Debug)]
pub struct Feature {
    id: FeatureId,
    geometry: Geometry,
    attributes: Value,
    styles: Option<Vec<Style>>,
}

impl Feature {
    /// Build a feature. Engines call this; consumers go through the driver's
    /// factory instead.
    pub fn new(id: FeatureId, geometry: Geometry, attributes: Value) -> Self {
        Self {
            id,
            geometry,
            attributes,
            styles: None,
        }
    }

    /// Feature identity.
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Feature geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Arbitrary attribute payload.
    pub fn attributes(&self) -> &Value {
        &self.attributes
    }

    /// Per-feature styles overriding the layer style.
    pub fn styles(&self) -> Option<&[Style]> {
        self.styles.as_deref()
    }

    /// Replace the per-feature styles.
    pub fn set_styles(&mut self, styles: Vec<Style>) {
        self.styles = Some(styles);
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Feature {}
