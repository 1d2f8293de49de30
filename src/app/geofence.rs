//! Geofenced trade region
//!
//! Point-in-quadrilateral test by area decomposition: a point lies inside the
//! box when the four triangles it forms with consecutive corners cover exactly
//! the box area. Products are rounded to a fixed step before summing so that
//! floating point drift does not push boundary points outside.

use serde::{Deserialize, Serialize};

use crate::constants::geofence;

/// Fixed bounding box of the trade region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min_lon: geofence::MIN_LON,
            min_lat: geofence::MIN_LAT,
            max_lon: geofence::MAX_LON,
            max_lat: geofence::MAX_LAT,
        }
    }
}

/// A corner as (lat, lon)
type Point = (f64, f64);

/// Quadrilateral region built from a bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFence {
    corners: [Point; 4],
    area: f64,
}

impl GeoFence {
    /// Build the fence from a bounding box
    ///
    /// Corners go around the box: (maxLat, minLon), (maxLat, maxLon),
    /// (minLat, maxLon), (minLat, minLon).
    pub fn new(bounds: BoundingBox) -> Self {
        Self::from_corners([
            (bounds.max_lat, bounds.min_lon),
            (bounds.max_lat, bounds.max_lon),
            (bounds.min_lat, bounds.max_lon),
            (bounds.min_lat, bounds.min_lon),
        ])
    }

    /// Build the fence from four corners given in order around the shape
    pub fn from_corners(corners: [Point; 4]) -> Self {
        let [c1, c2, c3, c4] = corners;
        let area = triangle_area(c1, c2, c3) + triangle_area(c1, c4, c3);
        Self { corners, area }
    }

    /// Total area of the quadrilateral, in squared degrees
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Check whether a point lies inside the fence, boundary included
    ///
    /// A zero-area fence contains nothing.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        if self.area <= 0.0 {
            return false;
        }

        let p = (lat, lon);
        let [c1, c2, c3, c4] = self.corners;
        let covered = triangle_area(p, c1, c2)
            + triangle_area(p, c2, c3)
            + triangle_area(p, c3, c4)
            + triangle_area(p, c1, c4);

        (covered - self.area).abs() <= geofence::AREA_TOLERANCE
    }
}

impl Default for GeoFence {
    fn default() -> Self {
        Self::new(BoundingBox::default())
    }
}

/// Shoelace area of a triangle with every product rounded
fn triangle_area(a: Point, b: Point, c: Point) -> f64 {
    let (x1, y1) = a;
    let (x2, y2) = b;
    let (x3, y3) = c;
    let doubled = round_step(x1 * (y2 - y3)) + round_step(x2 * (y3 - y1)) + round_step(x3 * (y1 - y2));
    round_step(doubled / 2.0).abs()
}

/// Round to the nearest multiple of the rounding step
fn round_step(value: f64) -> f64 {
    (value / geofence::ROUNDING_STEP).round() * geofence::ROUNDING_STEP
}
