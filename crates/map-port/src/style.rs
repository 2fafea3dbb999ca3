// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Drawable style values handed to the engine.
//!
//! These are resolved objects, not configuration: every optional field that
//! the engine must not guess about has already been decided by the driver's
//! factory.

/// Solid fill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fill {
    /// CSS color string.
    pub color: String,
}

/// Outline stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    /// CSS color string.
    pub color: String,
    /// Line width in pixels.
    pub width: f64,
}

/// Circle marker image.
#[derive(Clone, Debug, PartialEq)]
pub struct CircleStyle {
    /// Radius in pixels.
    pub radius: f64,
    /// Interior fill.
    pub fill: Option<Fill>,
    /// Outline.
    pub stroke: Option<Stroke>,
}

/// Icon marker image.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct IconStyle {
    /// Image URL.
    pub src: Option<String>,
    /// Scale factor applied to the image.
    pub scale: Option<f64>,
}

/// Point image, either a drawn circle or an icon.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageStyle {
    /// Vector circle marker.
    Circle(CircleStyle),
    /// Raster icon marker.
    Icon(IconStyle),
}

/// Text label rendering.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TextStyle {
    /// Label text.
    pub text: Option<String>,
    /// CSS font shorthand.
    pub font: Option<String>,
    /// Canvas text baseline (`"middle"`, `"bottom"`, ...).
    pub text_baseline: Option<String>,
    /// Text fill.
    pub fill: Option<Fill>,
    /// Text halo.
    pub stroke: Option<Stroke>,
}

/// A complete style: optional image and optional text.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Style {
    /// Point image.
    pub image: Option<ImageStyle>,
    /// Text label.
    pub text: Option<TextStyle>,
}
