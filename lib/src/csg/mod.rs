//! Exact 2D constructive solid geometry.
//!
//! A [`Csg2D`] is a boolean expression tree whose leaves are half-planes.
//! There is no explicit "not" node: complements are pushed down to the
//! leaves with De Morgan's laws, flipping each half-plane.
//!
//! # Evaluation
//!
//! The value of an expression at a point is the signed value of the half-plane
//! that decides it: unions take the minimum of their operands, intersections
//! the maximum. Points with value `<= 0` are inside. Evaluating over a
//! [`Rectangle`] gives a conservative [`Interval`]; if that interval does not
//! straddle zero, the whole rectangle is uniformly inside or outside, which
//! lets [`Csg2D::prune`] replace subtrees with constants.

mod convert;
mod solid;

pub use convert::{polygon_to_csg, polygons_to_csg};
pub use solid::{Csg3D, HalfSpace};

use crate::geometry::{HalfPlane, Interval, Point2D, Rectangle};
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// Value reported by the constant nodes.
const CONSTANT_MAGNITUDE: CoordF = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Csg2D {
    /// The empty set.
    Nothing,
    /// The whole plane.
    Universe,
    /// A single half-plane.
    Leaf(HalfPlane),
    Union(Box<Csg2D>, Box<Csg2D>),
    Intersection(Box<Csg2D>, Box<Csg2D>),
}

impl Csg2D {
    pub fn leaf(hp: HalfPlane) -> Csg2D {
        Csg2D::Leaf(hp)
    }

    /// Union, folding away constant operands.
    pub fn union(a: Csg2D, b: Csg2D) -> Csg2D {
        match (a, b) {
            (Csg2D::Universe, _) | (_, Csg2D::Universe) => Csg2D::Universe,
            (Csg2D::Nothing, x) | (x, Csg2D::Nothing) => x,
            (a, b) => Csg2D::Union(Box::new(a), Box::new(b)),
        }
    }

    /// Intersection, folding away constant operands.
    pub fn intersection(a: Csg2D, b: Csg2D) -> Csg2D {
        match (a, b) {
            (Csg2D::Nothing, _) | (_, Csg2D::Nothing) => Csg2D::Nothing,
            (Csg2D::Universe, x) | (x, Csg2D::Universe) => x,
            (a, b) => Csg2D::Intersection(Box::new(a), Box::new(b)),
        }
    }

    /// `a` minus `b`.
    pub fn difference(a: Csg2D, b: Csg2D) -> Csg2D {
        Csg2D::intersection(a, b.complement())
    }

    /// Union of any number of expressions (`Nothing` for none).
    pub fn union_all<I: IntoIterator<Item = Csg2D>>(items: I) -> Csg2D {
        items.into_iter().fold(Csg2D::Nothing, Csg2D::union)
    }

    /// Intersection of any number of expressions (`Universe` for none).
    pub fn intersection_all<I: IntoIterator<Item = Csg2D>>(items: I) -> Csg2D {
        items.into_iter().fold(Csg2D::Universe, Csg2D::intersection)
    }

    /// Convex region bounded by an anticlockwise point loop.
    pub fn convex_polygon(points: &[Point2D]) -> Csg2D {
        let n = points.len();
        Csg2D::intersection_all(
            (0..n).map(|i| Csg2D::Leaf(HalfPlane::from_points(points[i], points[(i + 1) % n]))),
        )
    }

    /// Axis-aligned rectangle.
    pub fn rectangle(r: &Rectangle) -> Csg2D {
        if r.is_empty() {
            return Csg2D::Nothing;
        }
        Csg2D::convex_polygon(&r.corners())
    }

    /// Set complement, by De Morgan.
    pub fn complement(&self) -> Csg2D {
        match self {
            Csg2D::Nothing => Csg2D::Universe,
            Csg2D::Universe => Csg2D::Nothing,
            Csg2D::Leaf(hp) => Csg2D::Leaf(hp.complement()),
            Csg2D::Union(a, b) => Csg2D::intersection(a.complement(), b.complement()),
            Csg2D::Intersection(a, b) => Csg2D::union(a.complement(), b.complement()),
        }
    }

    /// Signed value at `p`; `<= 0` is inside.
    pub fn value(&self, p: &Point2D) -> CoordF {
        match self {
            Csg2D::Nothing => CONSTANT_MAGNITUDE,
            Csg2D::Universe => -CONSTANT_MAGNITUDE,
            Csg2D::Leaf(hp) => hp.value(p),
            Csg2D::Union(a, b) => a.value(p).min(b.value(p)),
            Csg2D::Intersection(a, b) => a.value(p).max(b.value(p)),
        }
    }

    /// Check whether `p` is inside the shape.
    #[inline]
    pub fn inside(&self, p: &Point2D) -> bool {
        self.value(p) <= 0.0
    }

    /// Conservative bound of [`Csg2D::value`] over a rectangle.
    pub fn value_over(&self, r: &Rectangle) -> Interval {
        match self {
            Csg2D::Nothing => Interval::point(CONSTANT_MAGNITUDE),
            Csg2D::Universe => Interval::point(-CONSTANT_MAGNITUDE),
            Csg2D::Leaf(hp) => hp.value_over(r),
            Csg2D::Union(a, b) => a.value_over(r).min(&b.value_over(r)),
            Csg2D::Intersection(a, b) => a.value_over(r).max(&b.value_over(r)),
        }
    }

    /// Simplify the expression for use inside `r` only.
    ///
    /// Leaves that are uniformly solid or empty over `r` become constants,
    /// which then fold away through their parents.
    pub fn prune(&self, r: &Rectangle) -> Csg2D {
        match self {
            Csg2D::Nothing | Csg2D::Universe => self.clone(),
            Csg2D::Leaf(hp) => {
                let i = hp.value_over(r);
                if i.high <= 0.0 {
                    Csg2D::Universe
                } else if i.low > 0.0 {
                    Csg2D::Nothing
                } else {
                    self.clone()
                }
            }
            Csg2D::Union(a, b) => Csg2D::union(a.prune(r), b.prune(r)),
            Csg2D::Intersection(a, b) => Csg2D::intersection(a.prune(r), b.prune(r)),
        }
    }

    /// Number of half-plane leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            Csg2D::Nothing | Csg2D::Universe => 0,
            Csg2D::Leaf(_) => 1,
            Csg2D::Union(a, b) | Csg2D::Intersection(a, b) => a.leaf_count() + b.leaf_count(),
        }
    }

    #[inline]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Csg2D::Nothing)
    }

    #[inline]
    pub fn is_universe(&self) -> bool {
        matches!(self, Csg2D::Universe)
    }
}

impl Default for Csg2D {
    fn default() -> Self {
        Csg2D::Nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Csg2D {
        Csg2D::rectangle(&Rectangle::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 1.0),
        ))
    }

    #[test]
    fn test_rectangle_membership() {
        let sq = unit_square();
        assert!(sq.inside(&Point2D::new(0.5, 0.5)));
        assert!(!sq.inside(&Point2D::new(1.5, 0.5)));
        assert!(!sq.inside(&Point2D::new(0.5, -0.5)));
        assert_eq!(sq.leaf_count(), 4);
    }

    #[test]
    fn test_complement_and_difference() {
        let sq = unit_square();
        let not_sq = sq.complement();
        assert!(!not_sq.inside(&Point2D::new(0.5, 0.5)));
        assert!(not_sq.inside(&Point2D::new(2.0, 2.0)));

        let big = Csg2D::rectangle(&Rectangle::new(
            Point2D::new(-1.0, -1.0),
            Point2D::new(2.0, 2.0),
        ));
        let ring = Csg2D::difference(big, sq);
        assert!(ring.inside(&Point2D::new(-0.5, 0.5)));
        assert!(!ring.inside(&Point2D::new(0.5, 0.5)));
    }

    #[test]
    fn test_constant_folding() {
        let sq = unit_square();
        assert_eq!(Csg2D::union(Csg2D::Nothing, sq.clone()), sq);
        assert_eq!(Csg2D::union(Csg2D::Universe, sq.clone()), Csg2D::Universe);
        assert_eq!(Csg2D::intersection(Csg2D::Universe, sq.clone()), sq);
        assert_eq!(Csg2D::intersection(Csg2D::Nothing, sq), Csg2D::Nothing);
    }

    #[test]
    fn test_prune() {
        let sq = unit_square();
        let inside = Rectangle::new(Point2D::new(0.2, 0.2), Point2D::new(0.8, 0.8));
        assert!(sq.prune(&inside).is_universe());
        let outside = Rectangle::new(Point2D::new(3.0, 3.0), Point2D::new(4.0, 4.0));
        assert!(sq.prune(&outside).is_nothing());
        // Straddling the right edge only keeps that edge
        let right = Rectangle::new(Point2D::new(0.8, 0.2), Point2D::new(1.2, 0.8));
        assert_eq!(sq.prune(&right).leaf_count(), 1);
    }

    #[test]
    fn test_value_over_is_conservative() {
        let sq = unit_square();
        let r = Rectangle::new(Point2D::new(0.5, 0.5), Point2D::new(1.5, 1.5));
        let i = sq.value_over(&r);
        for p in r.corners() {
            let v = sq.value(&p);
            assert!(v >= i.low - 1e-12 && v <= i.high + 1e-12);
        }
    }
}
