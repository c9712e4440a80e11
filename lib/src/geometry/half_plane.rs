//! Oriented half-planes, the leaves of every CSG expression.
//!
//! A half-plane is stored as a unit `normal` and an `offset`. Its value at a
//! point is `normal · p + offset`; points with value `<= 0` are solid. The
//! normal therefore points out of the solid side.

use super::{Interval, Line, Point2D, Rectangle};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Determinants smaller than this are treated as parallel lines.
const PARALLEL_TOLERANCE: CoordF = 1e-12;

#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfPlane {
    normal: Point2D,
    offset: CoordF,
}

impl HalfPlane {
    /// Half-plane from an arbitrary (non-zero) normal and offset.
    ///
    /// The pair is rescaled so that the normal has unit length.
    pub fn new(normal: Point2D, offset: CoordF) -> Self {
        let len = normal.length();
        if len < CoordF::EPSILON {
            return Self { normal, offset };
        }
        Self {
            normal: normal * (1.0 / len),
            offset: offset / len,
        }
    }

    /// Half-plane bounded by the directed line `a -> b`, solid on the left.
    ///
    /// Walking an anticlockwise polygon edge by edge, every interior point is
    /// on the solid side.
    pub fn from_points(a: Point2D, b: Point2D) -> Self {
        let d = (b - a).normalize();
        let normal = Point2D::new(d.y, -d.x);
        Self {
            normal,
            offset: -normal.dot(&a),
        }
    }

    /// Half-plane bounded by `line`, solid on its left.
    pub fn from_line(line: &Line) -> Self {
        Self::from_points(line.origin, line.origin + line.direction)
    }

    #[inline]
    pub fn normal(&self) -> Point2D {
        self.normal
    }

    #[inline]
    pub fn offset(&self) -> CoordF {
        self.offset
    }

    /// Signed distance of `p` from the boundary; `<= 0` is solid.
    #[inline]
    pub fn value(&self, p: &Point2D) -> CoordF {
        self.normal.dot(p) + self.offset
    }

    /// Conservative bound of [`HalfPlane::value`] over a rectangle.
    pub fn value_over(&self, r: &Rectangle) -> Interval {
        r.x.mul_scalar(self.normal.x)
            .add(&r.y.mul_scalar(self.normal.y))
            .add_scalar(self.offset)
    }

    /// The same boundary with the solid side swapped.
    pub fn complement(&self) -> HalfPlane {
        HalfPlane {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Boundary direction, keeping the solid side on the left.
    #[inline]
    pub fn direction(&self) -> Point2D {
        Point2D::new(-self.normal.y, self.normal.x)
    }

    /// The boundary as a parametric line, solid side on the left.
    pub fn line(&self) -> Line {
        Line {
            origin: self.normal * (-self.offset),
            direction: self.direction(),
        }
    }

    /// Point where the two boundaries cross.
    ///
    /// Parallel (or coincident) boundaries are an ordinary outcome on
    /// axis-aligned geometry and give `None`.
    pub fn cross_point(&self, other: &HalfPlane) -> Option<Point2D> {
        let det = self.normal.cross(&other.normal);
        if det.abs() < PARALLEL_TOLERANCE {
            return None;
        }
        let x = (self.normal.y * other.offset - other.normal.y * self.offset) / det;
        let y = (other.normal.x * self.offset - self.normal.x * other.offset) / det;
        Some(Point2D::new(x, y))
    }

    /// Check whether two half-planes describe the same region within `tolerance`.
    pub fn coincides_with(&self, other: &HalfPlane, tolerance: CoordF) -> bool {
        self.normal.coincides_with(&other.normal, tolerance)
            && (self.offset - other.offset).abs() <= tolerance
    }
}

impl fmt::Debug for HalfPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HalfPlane({:.4}x + {:.4}y + {:.4} <= 0)",
            self.normal.x, self.normal.y, self.offset
        )
    }
}
