//! 3D constructive solid geometry.
//!
//! Objects can be described as boolean combinations of half-spaces instead of
//! triangle meshes. Slicing such an object at height `z` substitutes `z` into
//! every leaf, which turns each half-space into a half-plane (or a constant
//! when the boundary plane is horizontal) and the whole tree into a
//! [`Csg2D`].

use super::Csg2D;
use crate::geometry::{HalfPlane, Point2D, Point3D};
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// Horizontal components below this make a leaf plane horizontal.
const HORIZONTAL_TOLERANCE: CoordF = 1e-12;

/// An oriented half-space; solid where `normal · p + offset <= 0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HalfSpace {
    pub normal: Point3D,
    pub offset: CoordF,
}

impl HalfSpace {
    pub fn new(normal: Point3D, offset: CoordF) -> Self {
        Self { normal, offset }
    }

    /// Half-space through `point` whose outward normal is `normal`.
    pub fn through(point: Point3D, normal: Point3D) -> Self {
        let offset = -(normal.x * point.x + normal.y * point.y + normal.z * point.z);
        Self { normal, offset }
    }

    #[inline]
    pub fn value(&self, p: &Point3D) -> CoordF {
        self.normal.x * p.x + self.normal.y * p.y + self.normal.z * p.z + self.offset
    }

    pub fn complement(&self) -> HalfSpace {
        HalfSpace {
            normal: Point3D::new(-self.normal.x, -self.normal.y, -self.normal.z),
            offset: -self.offset,
        }
    }

    /// Cross-section at height `z`.
    pub fn slice(&self, z: CoordF) -> Csg2D {
        let n = Point2D::new(self.normal.x, self.normal.y);
        let offset = self.normal.z * z + self.offset;
        if n.length() < HORIZONTAL_TOLERANCE {
            return if offset <= 0.0 {
                Csg2D::Universe
            } else {
                Csg2D::Nothing
            };
        }
        Csg2D::Leaf(HalfPlane::new(n, offset))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Csg3D {
    Nothing,
    Universe,
    Leaf(HalfSpace),
    Union(Box<Csg3D>, Box<Csg3D>),
    Intersection(Box<Csg3D>, Box<Csg3D>),
}

impl Csg3D {
    /// Axis-aligned box between two opposite corners.
    pub fn cuboid(a: Point3D, b: Point3D) -> Csg3D {
        let lo = Point3D::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z));
        let hi = Point3D::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z));
        let faces = [
            HalfSpace::through(lo, Point3D::new(-1.0, 0.0, 0.0)),
            HalfSpace::through(hi, Point3D::new(1.0, 0.0, 0.0)),
            HalfSpace::through(lo, Point3D::new(0.0, -1.0, 0.0)),
            HalfSpace::through(hi, Point3D::new(0.0, 1.0, 0.0)),
            HalfSpace::through(lo, Point3D::new(0.0, 0.0, -1.0)),
            HalfSpace::through(hi, Point3D::new(0.0, 0.0, 1.0)),
        ];
        faces
            .into_iter()
            .map(Csg3D::Leaf)
            .fold(Csg3D::Universe, Csg3D::intersection)
    }

    pub fn union(a: Csg3D, b: Csg3D) -> Csg3D {
        match (a, b) {
            (Csg3D::Universe, _) | (_, Csg3D::Universe) => Csg3D::Universe,
            (Csg3D::Nothing, x) | (x, Csg3D::Nothing) => x,
            (a, b) => Csg3D::Union(Box::new(a), Box::new(b)),
        }
    }

    pub fn intersection(a: Csg3D, b: Csg3D) -> Csg3D {
        match (a, b) {
            (Csg3D::Nothing, _) | (_, Csg3D::Nothing) => Csg3D::Nothing,
            (Csg3D::Universe, x) | (x, Csg3D::Universe) => x,
            (a, b) => Csg3D::Intersection(Box::new(a), Box::new(b)),
        }
    }

    pub fn difference(a: Csg3D, b: Csg3D) -> Csg3D {
        Csg3D::intersection(a, b.complement())
    }

    pub fn complement(&self) -> Csg3D {
        match self {
            Csg3D::Nothing => Csg3D::Universe,
            Csg3D::Universe => Csg3D::Nothing,
            Csg3D::Leaf(h) => Csg3D::Leaf(h.complement()),
            Csg3D::Union(a, b) => Csg3D::intersection(a.complement(), b.complement()),
            Csg3D::Intersection(a, b) => Csg3D::union(a.complement(), b.complement()),
        }
    }

    pub fn value(&self, p: &Point3D) -> CoordF {
        match self {
            Csg3D::Nothing => 1.0,
            Csg3D::Universe => -1.0,
            Csg3D::Leaf(h) => h.value(p),
            Csg3D::Union(a, b) => a.value(p).min(b.value(p)),
            Csg3D::Intersection(a, b) => a.value(p).max(b.value(p)),
        }
    }

    /// Cross-section at height `z`.
    pub fn slice(&self, z: CoordF) -> Csg2D {
        match self {
            Csg3D::Nothing => Csg2D::Nothing,
            Csg3D::Universe => Csg2D::Universe,
            Csg3D::Leaf(h) => h.slice(z),
            Csg3D::Union(a, b) => Csg2D::union(a.slice(z), b.slice(z)),
            Csg3D::Intersection(a, b) => Csg2D::intersection(a.slice(z), b.slice(z)),
        }
    }
}

impl Default for Csg3D {
    fn default() -> Self {
        Csg3D::Nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Csg3D {
        Csg3D::cuboid(Point3D::new(0.0, 0.0, 0.0), Point3D::new(10.0, 10.0, 10.0))
    }

    #[test]
    fn test_cuboid_membership() {
        let c = cube();
        assert!(c.value(&Point3D::new(5.0, 5.0, 5.0)) <= 0.0);
        assert!(c.value(&Point3D::new(5.0, 5.0, 11.0)) > 0.0);
    }

    #[test]
    fn test_slice_through_cube() {
        let s = cube().slice(5.0);
        assert!(s.inside(&Point2D::new(5.0, 5.0)));
        assert!(!s.inside(&Point2D::new(-1.0, 5.0)));
        // Top and bottom faces fold to constants
        assert_eq!(s.leaf_count(), 4);
    }

    #[test]
    fn test_slice_above_cube_is_nothing() {
        assert!(cube().slice(12.0).is_nothing());
    }

    #[test]
    fn test_difference() {
        let hole = Csg3D::cuboid(Point3D::new(3.0, 3.0, -1.0), Point3D::new(7.0, 7.0, 11.0));
        let tube = Csg3D::difference(cube(), hole);
        let s = tube.slice(5.0);
        assert!(!s.inside(&Point2D::new(5.0, 5.0)));
        assert!(s.inside(&Point2D::new(1.0, 5.0)));
    }
}
