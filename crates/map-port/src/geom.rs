// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Coordinates, projections and geometries.

use core::fmt;
use core::str::FromStr;

use crate::PortError;

/// A 2D coordinate `[x, y]` in some projection (lon/lat for EPSG:4326).
pub type Coordinate = [f64; 2];

/// A pixel position `[x, y]` on the rendered map surface.
pub type Pixel = [f64; 2];

/// Bounding box `[min_x, min_y, max_x, max_y]`.
pub type Extent = [f64; 4];

/// Coordinate reference systems understood by the port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Projection {
    /// Geographic longitude/latitude (EPSG:4326).
    Geographic,
    /// Spherical Web Mercator (EPSG:3857), the default display projection.
    #[default]
    WebMercator,
}

impl Projection {
    /// EPSG code string for this projection.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Geographic => "EPSG:4326",
            Self::WebMercator => "EPSG:3857",
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Projection {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EPSG:4326" => Ok(Self::Geographic),
            "EPSG:3857" | "EPSG:900913" => Ok(Self::WebMercator),
            other => Err(PortError::Backend(format!("unknown projection {other}"))),
        }
    }
}

/// Geometry carried by features and used for view fitting.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A single position.
    Point(Coordinate),
    /// A polygon as a list of linear rings; the first ring is the exterior.
    Polygon(Vec<Vec<Coordinate>>),
}

impl Geometry {
    /// All coordinates of the geometry in ring order.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        match self {
            Self::Point(c) => vec![*c],
            Self::Polygon(rings) => rings.iter().flatten().copied().collect(),
        }
    }

    /// Bounding box of the geometry. A point has a zero-area extent.
    pub fn extent(&self) -> Extent {
        let mut extent = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        for [x, y] in self.coordinates() {
            extent[0] = extent[0].min(x);
            extent[1] = extent[1].min(y);
            extent[2] = extent[2].max(x);
            extent[3] = extent[3].max(y);
        }
        extent
    }

    /// Apply `f` to every coordinate, keeping the shape.
    pub fn map_coordinates<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Coordinate) -> Coordinate,
    {
        match self {
            Self::Point(c) => Self::Point(f(*c)),
            Self::Polygon(rings) => Self::Polygon(
                rings
                    .iter()
                    .map(|ring| ring.iter().map(|c| f(*c)).collect())
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn projection_codes_round_trip_through_from_str() {
        for p in [Projection::Geographic, Projection::WebMercator] {
            assert_eq!(p.code().parse::<Projection>().unwrap(), p);
        }
        assert!("EPSG:27700".parse::<Projection>().is_err());
    }

    #[test]
    fn polygon_extent_covers_all_rings() {
        let g = Geometry::Polygon(vec![vec![[0.0, 0.0], [4.0, -1.0], [2.0, 3.0], [0.0, 0.0]]]);
        assert_eq!(g.extent(), [0.0, -1.0, 4.0, 3.0]);
    }

    #[test]
    fn point_extent_is_degenerate() {
        assert_eq!(Geometry::Point([1.5, 2.5]).extent(), [1.5, 2.5, 1.5, 2.5]);
    }
}
