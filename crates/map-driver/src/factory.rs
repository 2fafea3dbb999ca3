// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Descriptor → engine object translation.
//!
//! Styles are pure values and need no engine. Layers and features are
//! engine objects, so those builders take a [`MapEngine`].

use std::sync::Arc;

use map_port::{
    CircleStyle, Fill, Geometry, IconStyle, ImageStyle, Layer, MapEngine, Stroke, Style,
    TextStyle, VectorLayerOptions, VectorSource,
};
use tracing::warn;

use crate::options::{
    FeatureOptions, FillConfig, ImageConfig, KnownLayerConfig, LayerConfig, StrokeConfig,
    StyleConfig, TextConfig, VectorLayerConfig, VECTOR_SOURCE,
};

/// Image `type` that selects a circle marker.
pub const CIRCLE_IMAGE: &str = "circle";

/// Fill color used when a descriptor names none.
pub const DEFAULT_FILL_COLOR: &str = "rgba(255,255,255,0.4)";

/// Stroke color used when a descriptor names none.
pub const DEFAULT_STROKE_COLOR: &str = "#3399CC";

/// Stroke width used when a descriptor names none.
pub const DEFAULT_STROKE_WIDTH: f64 = 1.25;

/// Circle radius used when a descriptor names none.
pub const DEFAULT_CIRCLE_RADIUS: f64 = 5.0;

fn build_fill(config: &FillConfig) -> Fill {
    Fill {
        color: config
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_FILL_COLOR.to_string()),
    }
}

fn build_stroke(config: &StrokeConfig) -> Stroke {
    Stroke {
        color: config
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_STROKE_COLOR.to_string()),
        width: config.width.unwrap_or(DEFAULT_STROKE_WIDTH),
    }
}

/// Build a point image. Only `type: "circle"` yields a circle.
pub fn build_image(config: &ImageConfig) -> ImageStyle {
    if config.kind.as_deref() == Some(CIRCLE_IMAGE) {
        ImageStyle::Circle(CircleStyle {
            radius: config.radius.unwrap_or(DEFAULT_CIRCLE_RADIUS),
            fill: config.fill.as_ref().map(build_fill),
            stroke: config.stroke.as_ref().map(build_stroke),
        })
    } else {
        ImageStyle::Icon(IconStyle {
            src: config.src.clone(),
            scale: config.scale,
        })
    }
}

/// Build a text label.
pub fn build_text(config: &TextConfig) -> TextStyle {
    TextStyle {
        text: config.text.clone(),
        font: config.font.clone(),
        text_baseline: config.text_baseline.clone(),
        fill: config.fill.as_ref().map(build_fill),
        stroke: config.stroke.as_ref().map(build_stroke),
    }
}

/// Build one style. Absent parts stay absent.
pub fn build_style(config: &StyleConfig) -> Style {
    Style {
        image: config.image.as_ref().map(build_image),
        text: config.text.as_ref().map(build_text),
    }
}

/// Build a style list, preserving order.
pub fn build_styles(configs: &[StyleConfig]) -> Vec<Style> {
    configs.iter().map(build_style).collect()
}

fn build_source(engine: &dyn MapEngine, kind: Option<&str>) -> Option<Arc<dyn VectorSource>> {
    match kind {
        Some(VECTOR_SOURCE) => Some(engine.create_vector_source()),
        Some(other) => {
            warn!(source = other, "unrecognized source kind; layer has no source");
            None
        }
        None => None,
    }
}

fn build_vector_layer(engine: &dyn MapEngine, config: &VectorLayerConfig) -> Arc<dyn Layer> {
    engine.create_vector_layer(VectorLayerOptions {
        source: build_source(engine, config.source.as_deref()),
        styles: build_styles(&config.style),
    })
}

/// Build a layer, or `None` for an unrecognized layer kind.
pub fn build_layer(engine: &dyn MapEngine, config: &LayerConfig) -> Option<Arc<dyn Layer>> {
    match config {
        LayerConfig::Known(KnownLayerConfig::Vector(vector)) => {
            Some(build_vector_layer(engine, vector))
        }
        LayerConfig::Unrecognized(raw) => {
            warn!(descriptor = %raw, "unrecognized layer kind; skipped");
            None
        }
    }
}

/// Build a point feature with a fresh identity.
pub fn build_feature(engine: &dyn MapEngine, options: FeatureOptions) -> map_port::Feature {
    let mut feature = engine.create_feature(Geometry::Point(options.geometry), options.attributes);
    if let Some(styles) = options.styles {
        feature.set_styles(build_styles(&styles));
    }
    feature
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use map_port::LayerKind;
    use map_port_mock::MockEngine;
    use serde_json::json;

    #[test]
    fn only_circle_type_builds_a_circle() {
        let circle = build_image(&ImageConfig {
            kind: Some("circle".into()),
            radius: Some(7.0),
            fill: Some(FillConfig {
                color: Some("red".into()),
            }),
            ..ImageConfig::default()
        });
        assert_eq!(
            circle,
            ImageStyle::Circle(CircleStyle {
                radius: 7.0,
                fill: Some(Fill {
                    color: "red".into()
                }),
                stroke: None,
            })
        );

        for kind in [None, Some("icon".to_string()), Some("square".to_string())] {
            let image = build_image(&ImageConfig {
                kind,
                src: Some("pin.png".into()),
                scale: Some(0.5),
                ..ImageConfig::default()
            });
            assert_eq!(
                image,
                ImageStyle::Icon(IconStyle {
                    src: Some("pin.png".into()),
                    scale: Some(0.5),
                })
            );
        }
    }

    #[test]
    fn stroke_and_fill_fall_back_to_engine_defaults() {
        let style = build_style(&StyleConfig {
            image: None,
            text: Some(TextConfig {
                text: Some("A".into()),
                fill: Some(FillConfig::default()),
                stroke: Some(StrokeConfig::default()),
                ..TextConfig::default()
            }),
        });
        assert!(style.image.is_none());
        let text = style.text.unwrap();
        assert_eq!(text.fill.unwrap().color, DEFAULT_FILL_COLOR);
        let stroke = text.stroke.unwrap();
        assert_eq!(stroke.color, DEFAULT_STROKE_COLOR);
        assert!((stroke.width - DEFAULT_STROKE_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn vector_layer_gets_a_fresh_source_per_descriptor() {
        let engine = MockEngine::new();
        let config = LayerConfig::vector(vec![StyleConfig::default()]);
        let a = build_layer(&engine, &config).unwrap();
        let b = build_layer(&engine, &config).unwrap();
        assert_eq!(a.kind(), LayerKind::Vector);
        assert_eq!(a.styles().len(), 1);
        assert_eq!(engine.sources_created(), 2);
        assert!(!Arc::ptr_eq(&a.source().unwrap(), &b.source().unwrap()));
    }

    #[test]
    fn unknown_layer_and_source_kinds_degrade() {
        let engine = MockEngine::new();
        assert!(build_layer(&engine, &LayerConfig::Unrecognized(json!({"heatmap": {}}))).is_none());

        let layer = build_layer(
            &engine,
            &LayerConfig::Known(KnownLayerConfig::Vector(VectorLayerConfig {
                source: Some("cluster-source".into()),
                style: vec![],
            })),
        )
        .unwrap();
        assert!(layer.source().is_none());
    }

    #[test]
    fn feature_styles_are_optional() {
        let engine = MockEngine::new();
        let plain = build_feature(&engine, FeatureOptions::at([1.0, 2.0]));
        assert!(plain.styles().is_none());
        assert_eq!(plain.geometry(), &Geometry::Point([1.0, 2.0]));

        let styled = build_feature(
            &engine,
            FeatureOptions {
                geometry: [0.0, 0.0],
                attributes: json!({"name": "home"}),
                styles: Some(vec![StyleConfig::default(), StyleConfig::default()]),
            },
        );
        assert_eq!(styled.styles().map(<[Style]>::len), Some(2));
        assert_eq!(styled.attributes()["name"], "home");
        assert_ne!(plain.id(), styled.id());
    }
}
