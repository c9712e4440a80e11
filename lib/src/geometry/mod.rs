//! Geometry primitives for the slicer.
//!
//! This module provides the real-valued 2D algebra everything else is built on:
//! - [`Point2D`] and [`Point3D`] - points and vectors in millimetres
//! - [`Interval`] and [`Rectangle`] - interval arithmetic and boxes
//! - [`Line`] and [`LineSegment`] - infinite lines and material-tagged segments
//! - [`HalfPlane`] - the oriented leaf primitive of CSG expressions
//! - [`Polygon`] and [`PolygonList`] - paths and loops handed to the G-code layer
//!
//! ## Conventions
//!
//! Anticlockwise polygons enclose solid, clockwise ones are holes. A half-plane
//! is solid where its value is `<= 0`.

mod half_plane;
mod interval;
mod line;
mod point;
mod polygon;
mod polygon_list;
pub mod simplify;
mod rectangle;

pub use half_plane::HalfPlane;
pub use interval::Interval;
pub use line::{Line, LineSegment};
pub use point::{Point2D, Point3D};
pub use polygon::Polygon;
pub use polygon_list::PolygonList;
pub use rectangle::Rectangle;
pub use simplify::{remove_duplicate_points, simplify_points};

use crate::CoordF;
use std::f64::consts::PI;

/// Check if two undirected directions (angles in radians) are parallel
/// within `tolerance`.
pub fn directions_parallel(a: CoordF, b: CoordF, tolerance: CoordF) -> bool {
    let mut diff = (a - b).abs() % PI;
    if diff > PI / 2.0 {
        diff = PI - diff;
    }
    diff <= tolerance
}

/// Normalise an angle to `[0, 2 * PI)`.
pub fn normalize_angle(angle: CoordF) -> CoordF {
    let a = angle % (2.0 * PI);
    if a < 0.0 {
        a + 2.0 * PI
    } else {
        a
    }
}
