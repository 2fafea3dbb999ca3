// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Spherical projection math used by the mock engine.

use std::f64::consts::PI;

use map_port::{Coordinate, Geometry, PortError, Projection};

/// Mean Earth radius used for geodesic circles (meters).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Web Mercator sphere radius (meters).
pub const MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Latitude limit of the square Web Mercator world.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_6;

/// Longitude/latitude in degrees to EPSG:3857 meters.
pub fn lon_lat_to_mercator([lon, lat]: Coordinate) -> Coordinate {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = MERCATOR_RADIUS_M * lon.to_radians();
    let y = MERCATOR_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();
    [x, y]
}

/// EPSG:3857 meters to longitude/latitude in degrees.
pub fn mercator_to_lon_lat([x, y]: Coordinate) -> Coordinate {
    let lon = (x / MERCATOR_RADIUS_M).to_degrees();
    let lat = (y / MERCATOR_RADIUS_M).sinh().atan().to_degrees();
    [lon, lat]
}

/// Destination point given a start, distance and bearing on the sphere.
fn offset([lon, lat]: Coordinate, distance_m: f64, bearing: f64) -> Coordinate {
    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let dr = distance_m / EARTH_RADIUS_M;
    let lat2 = (lat1.sin() * dr.cos() + lat1.cos() * dr.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * dr.sin() * lat1.cos()).atan2(dr.cos() - lat1.sin() * lat2.sin());
    [lon2.to_degrees(), lat2.to_degrees()]
}

/// Closed EPSG:4326 ring approximating a circle of `radius_m` around `center`.
pub fn circular(center: Coordinate, radius_m: f64, vertices: usize) -> Geometry {
    let n = vertices.max(3);
    let mut ring: Vec<Coordinate> = (0..n)
        .map(|i| offset(center, radius_m, 2.0 * PI * i as f64 / n as f64))
        .collect();
    ring.push(ring[0]);
    Geometry::Polygon(vec![ring])
}

/// Reproject between the two supported projections.
pub fn transform(
    geometry: &Geometry,
    from: Projection,
    to: Projection,
) -> Result<Geometry, PortError> {
    match (from, to) {
        (a, b) if a == b => Ok(geometry.clone()),
        (Projection::Geographic, Projection::WebMercator) => {
            Ok(geometry.map_coordinates(lon_lat_to_mercator))
        }
        (Projection::WebMercator, Projection::Geographic) => {
            Ok(geometry.map_coordinates(mercator_to_lon_lat))
        }
        (from, to) => Err(PortError::UnsupportedTransform {
            from: from.code(),
            to: to.code(),
        }),
    }
}
