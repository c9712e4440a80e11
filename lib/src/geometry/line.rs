//! Lines and line segments.
//!
//! [`Line`] is an infinite parametric line `origin + t * direction`, used for
//! half-plane boundaries and hatch directions. [`LineSegment`] is a material
//! tagged segment produced by cutting a triangle with a slicing plane.

use super::Point2D;
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// An infinite line through `origin` with direction `direction`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub origin: Point2D,
    pub direction: Point2D,
}

impl Line {
    /// Line through two points, directed from `a` to `b`.
    #[inline]
    pub fn through(a: Point2D, b: Point2D) -> Self {
        Self {
            origin: a,
            direction: b - a,
        }
    }

    /// Line through `origin` at `angle` radians from the x axis.
    #[inline]
    pub fn at_angle(origin: Point2D, angle: CoordF) -> Self {
        Self {
            origin,
            direction: Point2D::from_angle(angle),
        }
    }

    /// Point at parameter `t`.
    #[inline]
    pub fn point(&self, t: CoordF) -> Point2D {
        self.origin + self.direction * t
    }

    /// Parameter of the orthogonal projection of `p` onto the line.
    pub fn project(&self, p: &Point2D) -> CoordF {
        let len_sq = self.direction.length_squared();
        if len_sq < CoordF::EPSILON {
            return 0.0;
        }
        (*p - self.origin).dot(&self.direction) / len_sq
    }

    /// Distance from `p` to the infinite line.
    pub fn distance_to_point(&self, p: &Point2D) -> CoordF {
        let len = self.direction.length();
        if len < CoordF::EPSILON {
            return p.distance(&self.origin);
        }
        self.direction.cross(&(*p - self.origin)).abs() / len
    }

    /// Direction angle normalised to `[0, PI)`.
    pub fn direction_angle(&self) -> CoordF {
        let mut angle = self.direction.y.atan2(self.direction.x);
        if angle < 0.0 {
            angle += PI;
        }
        if angle >= PI {
            angle -= PI;
        }
        angle
    }

    /// Intersection of two infinite lines, `None` when they are parallel.
    pub fn intersection(&self, other: &Line) -> Option<Point2D> {
        let cross = self.direction.cross(&other.direction);
        if cross.abs() < 1e-12 {
            return None;
        }
        let t = (other.origin - self.origin).cross(&other.direction) / cross;
        Some(self.point(t))
    }
}

/// A line segment between two points, tagged with the material of the part
/// it was cut from.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub a: Point2D,
    pub b: Point2D,
    pub material: String,
}

impl LineSegment {
    /// Create a new segment.
    pub fn new(a: Point2D, b: Point2D, material: impl Into<String>) -> Self {
        Self {
            a,
            b,
            material: material.into(),
        }
    }

    #[inline]
    pub fn length_squared(&self) -> CoordF {
        self.a.distance_squared(&self.b)
    }

    #[inline]
    pub fn length(&self) -> CoordF {
        self.a.distance(&self.b)
    }

    /// Swap the endpoints.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.a, &mut self.b);
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        self.a == self.b
    }

    /// Infinite line through the segment, directed from `a` to `b`.
    pub fn line(&self) -> Line {
        Line::through(self.a, self.b)
    }
}

impl fmt::Debug for LineSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineSegment({:?} -> {:?}, {})", self.a, self.b, self.material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_intersection() {
        let a = Line::through(Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0));
        let b = Line::through(Point2D::new(0.0, 2.0), Point2D::new(2.0, 0.0));
        let p = a.intersection(&b).unwrap();
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_lines() {
        let a = Line::through(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0));
        let b = Line::through(Point2D::new(0.0, 1.0), Point2D::new(5.0, 1.0));
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_direction_angle() {
        let l = Line::through(Point2D::new(0.0, 0.0), Point2D::new(-1.0, 0.0));
        assert!(l.direction_angle().abs() < 1e-12);
        let l = Line::through(Point2D::new(0.0, 0.0), Point2D::new(0.0, -1.0));
        assert!((l.direction_angle() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_project_and_distance() {
        let l = Line::through(Point2D::new(0.0, 0.0), Point2D::new(2.0, 0.0));
        assert!((l.project(&Point2D::new(1.0, 3.0)) - 0.5).abs() < 1e-12);
        assert!((l.distance_to_point(&Point2D::new(1.0, 3.0)) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_reverse() {
        let mut s = LineSegment::new(Point2D::new(0.0, 0.0), Point2D::new(3.0, 4.0), "PLA");
        assert!((s.length() - 5.0).abs() < 1e-12);
        s.reverse();
        assert_eq!(s.a, Point2D::new(3.0, 4.0));
        assert_eq!(s.material, "PLA");
    }
}
