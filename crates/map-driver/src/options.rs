// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Driver configuration and the descriptor types the factory consumes.
//!
//! Everything here is plain serde data so a configuration can live in a JSON
//! file next to the host application. Field names follow the camelCase used
//! by map style descriptors (`textBaseline`, `showLocationDot`, ...).

use std::collections::HashSet;

use map_port::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ConfigError;

/// Descriptor kind string that selects a fresh vector source.
pub const VECTOR_SOURCE: &str = "vector-source";

/// Solid fill descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FillConfig {
    /// CSS color. Defaults to the engine's standard translucent white.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Outline stroke descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeConfig {
    /// CSS color. Defaults to the engine's standard blue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

/// Point image descriptor. `type: "circle"` draws a circle; any other value,
/// or none, produces an icon.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image kind discriminator.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Icon URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Circle radius in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    /// Icon scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Circle fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillConfig>,
    /// Circle outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<StrokeConfig>,
}

/// Text label descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    /// Label text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// CSS font shorthand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Canvas text baseline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_baseline: Option<String>,
    /// Text fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillConfig>,
    /// Text halo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<StrokeConfig>,
}

/// One style descriptor: optional image and optional text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Point image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageConfig>,
    /// Text label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextConfig>,
}

/// Vector layer descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorLayerConfig {
    /// Source kind; [`VECTOR_SOURCE`] builds a fresh empty source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Layer styles, in draw order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style: Vec<StyleConfig>,
}

/// Layer kinds the factory knows how to build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KnownLayerConfig {
    /// `{"vector": {...}}`
    Vector(VectorLayerConfig),
}

/// Layer descriptor. Unknown kinds are kept verbatim and skipped at build
/// time with a warning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerConfig {
    /// A kind the factory can build.
    Known(KnownLayerConfig),
    /// Anything else.
    Unrecognized(Value),
}

impl LayerConfig {
    /// Vector layer with a fresh source and the given styles.
    pub fn vector(style: Vec<StyleConfig>) -> Self {
        Self::Known(KnownLayerConfig::Vector(VectorLayerConfig {
            source: Some(VECTOR_SOURCE.to_string()),
            style,
        }))
    }
}

/// Initial view state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Center in view projection.
    #[serde(default)]
    pub center: Coordinate,
    /// Zoom level.
    #[serde(default)]
    pub zoom: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: 0.0,
        }
    }
}

/// Feature descriptor accepted by [`MapSource::create_feature`](crate::MapSource::create_feature).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureOptions {
    /// Point position in view projection.
    pub geometry: Coordinate,
    /// Arbitrary caller attributes.
    #[serde(default)]
    pub attributes: Value,
    /// Feature-level styles; `None` leaves the layer style in effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Vec<StyleConfig>>,
}

impl FeatureOptions {
    /// Point feature without attributes or styles.
    pub fn at(geometry: Coordinate) -> Self {
        Self {
            geometry,
            attributes: Value::Null,
            styles: None,
        }
    }
}

const fn default_show_location_dot() -> bool {
    true
}

/// Everything the driver needs at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverOptions {
    /// Selector of the mount element.
    pub target: String,
    /// Whether `track-location` actions are honored.
    #[serde(default = "default_show_location_dot")]
    pub show_location_dot: bool,
    /// Selectors of elements to mount as custom controls.
    #[serde(default)]
    pub control_elements: Vec<String>,
    /// Selectors of overlay anchor elements.
    #[serde(default)]
    pub overlays: Vec<String>,
    /// Named layer descriptors, in stacking order.
    #[serde(default)]
    pub layers: Vec<(String, LayerConfig)>,
    /// Initial view.
    #[serde(default)]
    pub view: ViewConfig,
}

impl DriverOptions {
    /// Options mounting on `target` with everything else defaulted.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            show_location_dot: true,
            control_elements: Vec::new(),
            overlays: Vec::new(),
            layers: Vec::new(),
            view: ViewConfig::default(),
        }
    }

    /// Append a named layer.
    #[must_use]
    pub fn with_layer(mut self, name: impl Into<String>, layer: LayerConfig) -> Self {
        self.layers.push((name.into(), layer));
        self
    }

    /// Append an overlay anchor selector.
    #[must_use]
    pub fn with_overlay(mut self, selector: impl Into<String>) -> Self {
        self.overlays.push(selector.into());
        self
    }

    /// Append a custom control element selector.
    #[must_use]
    pub fn with_control(mut self, selector: impl Into<String>) -> Self {
        self.control_elements.push(selector.into());
        self
    }

    /// Set whether `track-location` actions are honored.
    #[must_use]
    pub fn with_location_dot(mut self, show: bool) -> Self {
        self.show_location_dot = show;
        self
    }

    /// Set the initial view.
    #[must_use]
    pub fn with_view(mut self, center: Coordinate, zoom: f64) -> Self {
        self.view = ViewConfig { center, zoom };
        self
    }

    /// Parse JSON and validate.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_slice(bytes)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject configurations the driver cannot honor unambiguously.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.trim().is_empty() {
            return Err(ConfigError::MissingTarget);
        }
        let mut seen = HashSet::new();
        for (name, _) in &self.layers {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateLayer(name.clone()));
            }
        }
        let mut seen = HashSet::new();
        for selector in &self.overlays {
            if !seen.insert(selector.as_str()) {
                return Err(ConfigError::DuplicateOverlay(selector.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_camel_case_document_with_defaults() {
        let raw = json!({
            "target": "#map",
            "overlays": ["#popup"],
            "layers": [
                ["pins", {"vector": {"source": "vector-source", "style": [
                    {"image": {"type": "circle", "radius": 6, "fill": {"color": "red"}}},
                    {"text": {"text": "hi", "textBaseline": "bottom"}}
                ]}}],
                ["heat", {"heatmap": {"blur": 15}}]
            ]
        });
        let options = DriverOptions::from_json(raw.to_string().as_bytes()).unwrap();
        assert!(options.show_location_dot);
        assert_eq!(options.view, ViewConfig::default());
        assert_eq!(options.layers.len(), 2);

        let LayerConfig::Known(KnownLayerConfig::Vector(pins)) = &options.layers[0].1 else {
            panic!("expected vector layer");
        };
        assert_eq!(pins.source.as_deref(), Some(VECTOR_SOURCE));
        assert_eq!(pins.style[0].image.as_ref().unwrap().kind.as_deref(), Some("circle"));
        assert_eq!(
            pins.style[1].text.as_ref().unwrap().text_baseline.as_deref(),
            Some("bottom")
        );
        assert!(matches!(options.layers[1].1, LayerConfig::Unrecognized(_)));
    }

    #[test]
    fn validation_rejects_ambiguous_configs() {
        assert!(matches!(
            DriverOptions::new("  ").validate(),
            Err(ConfigError::MissingTarget)
        ));
        let dup = DriverOptions::new("#map")
            .with_layer("a", LayerConfig::vector(vec![]))
            .with_layer("a", LayerConfig::vector(vec![]));
        assert!(matches!(dup.validate(), Err(ConfigError::DuplicateLayer(n)) if n == "a"));
        let dup = DriverOptions::new("#map").with_overlay("#p").with_overlay("#p");
        assert!(matches!(dup.validate(), Err(ConfigError::DuplicateOverlay(s)) if s == "#p"));
    }

    #[test]
    fn show_location_dot_false_survives_serialization() {
        let options = DriverOptions::new("#map").with_location_dot(false);
        let text = serde_json::to_string(&options).unwrap();
        assert!(text.contains("\"showLocationDot\":false"));
        let back: DriverOptions = serde_json::from_str(&text).unwrap();
        assert_eq!(back, options);
    }
}
