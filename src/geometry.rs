//! Geometry codec
//!
//! Converts points and polygons to and from the well-known-text forms the
//! store understands. One axis convention applies everywhere in this crate:
//! x is longitude and y is latitude, for points and polygon vertices alike.
//!
//! No numeric validation happens here. Range checks belong to the inbound
//! boundary (see [`crate::models`]) and the store is the final arbiter of
//! what it accepts.

use std::str::FromStr;

use geo::Area;
use serde::{Deserialize, Serialize};

use crate::error::{GeofenceError, Result, ValidationError};

/// SRID of the single reference frame (longitude/latitude in degrees)
pub const SRID: i32 = 4326;

/// A location in the fixed longitude/latitude reference frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point from an `[x, y]` pair, i.e. `[longitude, latitude]`
    pub fn from_xy([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }

    pub fn x(&self) -> f64 {
        self.longitude
    }

    pub fn y(&self) -> f64 {
        self.latitude
    }
}

impl From<Point> for geo_types::Point<f64> {
    fn from(point: Point) -> Self {
        geo_types::Point::new(point.x(), point.y())
    }
}

/// A simple polygon given as an ordered ring of at least three distinct
/// vertices enclosing a non-zero area.
///
/// The ring does not have to repeat its first vertex; [`Polygon::closed`]
/// produces the explicitly closed form stores need. A repeated closing vertex
/// is not counted towards the minimum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub const MIN_VERTICES: usize = 3;

    pub fn new(vertices: Vec<Point>) -> std::result::Result<Self, ValidationError> {
        if distinct_vertices(&vertices) < Self::MIN_VERTICES {
            return Err(ValidationError::single("vertices", "min"));
        }

        let polygon = Self { vertices };
        // Collinear rings enclose nothing
        if geo_types::Polygon::from(&polygon).unsigned_area() == 0.0 {
            return Err(ValidationError::single("vertices", "area"));
        }
        Ok(polygon)
    }

    /// Build from `[longitude, latitude]` pairs
    pub fn from_xy_pairs(pairs: &[[f64; 2]]) -> std::result::Result<Self, ValidationError> {
        Self::new(pairs.iter().copied().map(Point::from_xy).collect())
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The ring with its first vertex repeated at the end, unless it already is
    pub fn closed(&self) -> Vec<Point> {
        let mut ring = self.vertices.clone();
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if first != last {
                ring.push(first);
            }
        }
        ring
    }
}

impl From<&Polygon> for geo_types::Polygon<f64> {
    fn from(polygon: &Polygon) -> Self {
        let ring: Vec<(f64, f64)> = polygon.vertices.iter().map(|v| (v.x(), v.y())).collect();
        geo_types::Polygon::new(geo_types::LineString::from(ring), vec![])
    }
}

fn distinct_vertices(vertices: &[Point]) -> usize {
    let mut seen: Vec<Point> = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        if !seen.contains(vertex) {
            seen.push(*vertex);
        }
    }
    seen.len()
}

/// Encode a point as `POINT(x y)` with x = longitude and y = latitude
pub fn encode_point(point: &Point) -> String {
    format!("POINT({} {})", point.x(), point.y())
}

/// Decode the store's textual `x,y` rendering of a location
pub fn decode_point(text: &str) -> Result<Point> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 2 {
        return Err(GeofenceError::format(
            text,
            format!("expected 2 comma-separated fields, found {}", parts.len()),
        ));
    }

    let x = parse_coordinate(text, parts[0])?;
    let y = parse_coordinate(text, parts[1])?;
    Ok(Point::new(x, y))
}

fn parse_coordinate(text: &str, field: &str) -> Result<f64> {
    f64::from_str(field.trim()).map_err(|e| {
        GeofenceError::format(text, format!("'{}' is not a number: {}", field.trim(), e))
    })
}

/// Encode vertices as `POLYGON((x1 y1,x2 y2,...))`.
///
/// The ring is written exactly as given; closing it is the caller's choice.
pub fn encode_polygon(vertices: &[Point]) -> Result<String> {
    if vertices.is_empty() {
        return Err(GeofenceError::format(
            "POLYGON(())",
            "a polygon needs at least one vertex",
        ));
    }

    let ring = vertices
        .iter()
        .map(|v| format!("{} {}", v.x(), v.y()))
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!("POLYGON(({}))", ring))
}

/// Parse polygon WKT into a `geo_types` polygon
pub fn parse_polygon_wkt(text: &str) -> Result<geo_types::Polygon<f64>> {
    let parsed = wkt::Wkt::<f64>::from_str(text)
        .map_err(|e| GeofenceError::format(text, format!("{:?}", e)))?;
    let geometry: geo_types::Geometry<f64> = parsed
        .try_into()
        .map_err(|e: wkt::conversion::Error| GeofenceError::format(text, format!("{:?}", e)))?;

    match geometry {
        geo_types::Geometry::Polygon(polygon) => Ok(polygon),
        _ => Err(GeofenceError::format(text, "not a POLYGON geometry")),
    }
}
