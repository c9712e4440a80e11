//! Real-valued 2D and 3D points.
//!
//! Points are plain values with no identity: every operation returns a new
//! point. All lengths are in millimetres.

use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A 2D point (or vector) with floating-point coordinates.
#[derive(Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: CoordF,
    pub y: CoordF,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub const fn new(x: CoordF, y: CoordF) -> Self {
        Self { x, y }
    }

    /// The origin.
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Unit vector at `angle` radians from the positive x axis.
    #[inline]
    pub fn from_angle(angle: CoordF) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Point2D) -> CoordF {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross product).
    #[inline]
    pub fn cross(&self, other: &Point2D) -> CoordF {
        self.x * other.y - self.y * other.x
    }

    /// Squared length.
    #[inline]
    pub fn length_squared(&self) -> CoordF {
        self.dot(self)
    }

    /// Euclidean length.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.length_squared().sqrt()
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> CoordF {
        (*self - *other).length_squared()
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> CoordF {
        self.distance_squared(other).sqrt()
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(&self) -> Point2D {
        let len = self.length();
        if len < CoordF::EPSILON {
            *self
        } else {
            Point2D::new(self.x / len, self.y / len)
        }
    }

    /// Rotate 90° counter-clockwise.
    #[inline]
    pub fn perp(&self) -> Point2D {
        Point2D::new(-self.y, self.x)
    }

    /// Rotate about the origin by `angle` radians.
    pub fn rotate(&self, angle: CoordF) -> Point2D {
        let (s, c) = angle.sin_cos();
        Point2D::new(c * self.x - s * self.y, s * self.x + c * self.y)
    }

    /// Midpoint between two points.
    #[inline]
    pub fn midpoint(&self, other: &Point2D) -> Point2D {
        Point2D::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }

    /// Linear interpolation, `t = 0` gives `self`.
    #[inline]
    pub fn lerp(&self, other: &Point2D, t: CoordF) -> Point2D {
        Point2D::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Squared distance from this point to the segment `a`-`b`.
    ///
    /// A zero-length segment degenerates to the distance to `a`.
    pub fn distance_to_segment_squared(&self, a: &Point2D, b: &Point2D) -> CoordF {
        let ab = *b - *a;
        let len_sq = ab.length_squared();
        if len_sq < CoordF::EPSILON {
            return self.distance_squared(a);
        }
        let t = ((*self - *a).dot(&ab) / len_sq).clamp(0.0, 1.0);
        self.distance_squared(&a.lerp(b, t))
    }

    /// Check whether two points coincide within `tolerance`.
    #[inline]
    pub fn coincides_with(&self, other: &Point2D, tolerance: CoordF) -> bool {
        self.distance_squared(other) <= tolerance * tolerance
    }
}

impl Add for Point2D {
    type Output = Point2D;

    #[inline]
    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    #[inline]
    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<CoordF> for Point2D {
    type Output = Point2D;

    #[inline]
    fn mul(self, rhs: CoordF) -> Point2D {
        Point2D::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point2D {
    type Output = Point2D;

    #[inline]
    fn neg(self) -> Point2D {
        Point2D::new(-self.x, -self.y)
    }
}

impl fmt::Debug for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl From<(CoordF, CoordF)> for Point2D {
    fn from((x, y): (CoordF, CoordF)) -> Self {
        Point2D::new(x, y)
    }
}

/// A 3D point with floating-point coordinates, used for mesh vertices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: CoordF,
    pub y: CoordF,
    pub z: CoordF,
}

impl Point3D {
    /// Create a new 3D point.
    #[inline]
    pub const fn new(x: CoordF, y: CoordF, z: CoordF) -> Self {
        Self { x, y, z }
    }

    /// Drop the z coordinate.
    #[inline]
    pub fn xy(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Interpolate along the segment `self`-`other` to the point at height `z`.
    ///
    /// The caller guarantees the two endpoints straddle `z`.
    pub fn at_z(&self, other: &Point3D, z: CoordF) -> Point2D {
        let t = (z - self.z) / (other.z - self.z);
        self.xy().lerp(&other.xy(), t)
    }
}

impl From<[CoordF; 3]> for Point3D {
    fn from(v: [CoordF; 3]) -> Self {
        Point3D::new(v[0], v[1], v[2])
    }
}
