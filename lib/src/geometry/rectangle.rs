//! Axis-aligned real rectangles.

use super::{Interval, Point2D};
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An axis-aligned rectangle given by an x and a y interval.
///
/// A rectangle with an empty interval in either axis is empty; the empty
/// rectangle is the identity for [`Rectangle::union`].
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: Interval,
    pub y: Interval,
}

impl Rectangle {
    /// Rectangle spanning two corner points (in any order).
    pub fn new(a: Point2D, b: Point2D) -> Self {
        Self {
            x: Interval::new(a.x, b.x),
            y: Interval::new(a.y, b.y),
        }
    }

    pub fn from_intervals(x: Interval, y: Interval) -> Self {
        Self { x, y }
    }

    pub const fn empty() -> Self {
        Self {
            x: Interval::empty(),
            y: Interval::empty(),
        }
    }

    /// Bounding rectangle of a set of points.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point2D>,
    {
        let mut r = Rectangle::empty();
        for p in points {
            r.expand_to(p);
        }
        r
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }

    /// South-west (minimum) corner.
    #[inline]
    pub fn sw(&self) -> Point2D {
        Point2D::new(self.x.low, self.y.low)
    }

    /// North-east (maximum) corner.
    #[inline]
    pub fn ne(&self) -> Point2D {
        Point2D::new(self.x.high, self.y.high)
    }

    #[inline]
    pub fn width(&self) -> CoordF {
        self.x.length()
    }

    #[inline]
    pub fn height(&self) -> CoordF {
        self.y.length()
    }

    pub fn centre(&self) -> Point2D {
        Point2D::new(self.x.centre(), self.y.centre())
    }

    /// The four corners, anticlockwise from south-west.
    pub fn corners(&self) -> [Point2D; 4] {
        [
            Point2D::new(self.x.low, self.y.low),
            Point2D::new(self.x.high, self.y.low),
            Point2D::new(self.x.high, self.y.high),
            Point2D::new(self.x.low, self.y.high),
        ]
    }

    pub fn expand_to(&mut self, p: &Point2D) {
        self.x.expand_to(p.x);
        self.y.expand_to(p.y);
    }

    /// Grow (or shrink, for negative `d`) by `d` on every side.
    pub fn offset(&self, d: CoordF) -> Rectangle {
        if self.is_empty() {
            return *self;
        }
        Rectangle {
            x: self.x.offset(d),
            y: self.y.offset(d),
        }
    }

    pub fn union(&self, other: &Rectangle) -> Rectangle {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rectangle {
            x: self.x.union(&other.x),
            y: self.y.union(&other.y),
        }
    }

    pub fn intersection(&self, other: &Rectangle) -> Rectangle {
        Rectangle {
            x: self.x.intersection(&other.x),
            y: self.y.intersection(&other.y),
        }
    }

    #[inline]
    pub fn contains(&self, p: &Point2D) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    /// Check whether `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        other.is_empty()
            || (!self.is_empty()
                && other.x.low >= self.x.low
                && other.x.high <= self.x.high
                && other.y.low >= self.y.low
                && other.y.high <= self.y.high)
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Rectangle::empty()
    }
}

impl fmt::Debug for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Rectangle(empty)")
        } else {
            write!(f, "Rectangle({:?} - {:?})", self.sw(), self.ne())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_identity() {
        let r = Rectangle::new(Point2D::new(0.0, 0.0), Point2D::new(2.0, 1.0));
        assert_eq!(Rectangle::empty().union(&r), r);
        assert_eq!(r.union(&Rectangle::empty()), r);
    }

    #[test]
    fn test_from_points() {
        let pts = [
            Point2D::new(1.0, 5.0),
            Point2D::new(-1.0, 2.0),
            Point2D::new(3.0, 0.0),
        ];
        let r = Rectangle::from_points(pts.iter());
        assert_eq!(r.sw(), Point2D::new(-1.0, 0.0));
        assert_eq!(r.ne(), Point2D::new(3.0, 5.0));
    }

    #[test]
    fn test_intersection_disjoint() {
        let a = Rectangle::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0));
        let b = Rectangle::new(Point2D::new(2.0, 2.0), Point2D::new(3.0, 3.0));
        assert!(a.intersection(&b).is_empty());
        assert!(a.union(&b).contains_rect(&b));
    }
}
