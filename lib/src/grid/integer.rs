//! Integer pixel-space points, rectangles and polygons.
//!
//! All grids share one lattice anchored at the world origin: pixel `(ix, iy)`
//! covers `[ix·p, (ix+1)·p] × [iy·p, (iy+1)·p]` and its centre is
//! `((ix + 0.5)·p, (iy + 0.5)·p)`. Lattice vertex `(ix, iy)` is the pixel's
//! south-west corner.

use crate::geometry::{Point2D, Polygon, Rectangle};
use crate::CoordF;
use std::ops::{Add, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

impl IntPoint {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Pixel containing the real point `p`.
    #[inline]
    pub fn pixel_at(p: &Point2D, pixel_size: CoordF) -> Self {
        Self::new(
            (p.x / pixel_size).floor() as i64,
            (p.y / pixel_size).floor() as i64,
        )
    }

    /// Centre of this pixel in world coordinates.
    #[inline]
    pub fn centre(&self, pixel_size: CoordF) -> Point2D {
        Point2D::new(
            (self.x as CoordF + 0.5) * pixel_size,
            (self.y as CoordF + 0.5) * pixel_size,
        )
    }

    /// This point taken as a lattice vertex, in world coordinates.
    #[inline]
    pub fn vertex(&self, pixel_size: CoordF) -> Point2D {
        Point2D::new(self.x as CoordF * pixel_size, self.y as CoordF * pixel_size)
    }
}

impl Add for IntPoint {
    type Output = IntPoint;
    fn add(self, o: IntPoint) -> IntPoint {
        IntPoint::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for IntPoint {
    type Output = IntPoint;
    fn sub(self, o: IntPoint) -> IntPoint {
        IntPoint::new(self.x - o.x, self.y - o.y)
    }
}

/// A rectangle of pixels: `width × height` pixels starting at `sw`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IntRectangle {
    pub sw: IntPoint,
    pub width: i64,
    pub height: i64,
}

impl IntRectangle {
    pub fn new(sw: IntPoint, width: i64, height: i64) -> Self {
        Self {
            sw,
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub const fn empty() -> Self {
        Self {
            sw: IntPoint::new(0, 0),
            width: 0,
            height: 0,
        }
    }

    /// Smallest pixel rectangle covering the real rectangle `r`.
    pub fn covering(r: &Rectangle, pixel_size: CoordF) -> Self {
        if r.is_empty() {
            return Self::empty();
        }
        let sw = IntPoint::pixel_at(&r.sw(), pixel_size);
        let ne = IntPoint::pixel_at(&r.ne(), pixel_size);
        Self::new(sw, ne.x - sw.x + 1, ne.y - sw.y + 1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.width * self.height) as usize
        }
    }

    /// One past the north-east pixel.
    #[inline]
    pub fn ne(&self) -> IntPoint {
        IntPoint::new(self.sw.x + self.width, self.sw.y + self.height)
    }

    #[inline]
    pub fn contains(&self, p: IntPoint) -> bool {
        p.x >= self.sw.x && p.y >= self.sw.y && p.x < self.sw.x + self.width && p.y < self.sw.y + self.height
    }

    /// Row-major index of `p`, which must be inside.
    #[inline]
    pub fn index(&self, p: IntPoint) -> usize {
        ((p.y - self.sw.y) * self.width + (p.x - self.sw.x)) as usize
    }

    pub fn union(&self, other: &IntRectangle) -> IntRectangle {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let sw = IntPoint::new(self.sw.x.min(other.sw.x), self.sw.y.min(other.sw.y));
        let ne = IntPoint::new(self.ne().x.max(other.ne().x), self.ne().y.max(other.ne().y));
        IntRectangle::new(sw, ne.x - sw.x, ne.y - sw.y)
    }

    pub fn intersection(&self, other: &IntRectangle) -> IntRectangle {
        if self.is_empty() || other.is_empty() {
            return IntRectangle::empty();
        }
        let sw = IntPoint::new(self.sw.x.max(other.sw.x), self.sw.y.max(other.sw.y));
        let ne = IntPoint::new(self.ne().x.min(other.ne().x), self.ne().y.min(other.ne().y));
        if ne.x <= sw.x || ne.y <= sw.y {
            return IntRectangle::empty();
        }
        IntRectangle::new(sw, ne.x - sw.x, ne.y - sw.y)
    }

    /// Grow by `d` pixels on every side (shrink for negative `d`).
    pub fn offset(&self, d: i64) -> IntRectangle {
        if self.is_empty() {
            return *self;
        }
        IntRectangle::new(
            IntPoint::new(self.sw.x - d, self.sw.y - d),
            self.width + 2 * d,
            self.height + 2 * d,
        )
    }

    /// Real rectangle spanned by the pixel centres.
    pub fn centres(&self, pixel_size: CoordF) -> Rectangle {
        if self.is_empty() {
            return Rectangle::empty();
        }
        let ne = IntPoint::new(self.sw.x + self.width - 1, self.sw.y + self.height - 1);
        Rectangle::new(self.sw.centre(pixel_size), ne.centre(pixel_size))
    }

    /// Real rectangle covered by the pixels.
    pub fn bounds(&self, pixel_size: CoordF) -> Rectangle {
        if self.is_empty() {
            return Rectangle::empty();
        }
        Rectangle::new(self.sw.vertex(pixel_size), self.ne().vertex(pixel_size))
    }

    /// Iterate the pixels row by row from the south-west.
    pub fn pixels(&self) -> impl Iterator<Item = IntPoint> + '_ {
        let (w, h) = if self.is_empty() { (0, 0) } else { (self.width, self.height) };
        (0..h).flat_map(move |j| (0..w).map(move |i| IntPoint::new(self.sw.x + i, self.sw.y + j)))
    }
}

/// A closed loop of lattice vertices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntPolygon {
    pub points: Vec<IntPoint>,
}

impl IntPolygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, p: IntPoint) {
        self.points.push(p);
    }

    /// Twice the signed area in pixel units.
    pub fn double_area(&self) -> i64 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum()
    }

    /// Edges as pairs of consecutive vertices, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (IntPoint, IntPoint)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// World-coordinate closed polygon.
    pub fn to_polygon(&self, pixel_size: CoordF, material: &str) -> Polygon {
        Polygon::from_points(
            self.points.iter().map(|p| p.vertex(pixel_size)).collect(),
            material,
            true,
        )
    }
}
