//! Morphological offsetting by stamping along the outline.
//!
//! The offset distance is rounded to a whole number of pixels `r`. Every
//! contour edge is stamped with a rectangle of half-width `|r|` and every
//! contour vertex with a disc of radius `|r|`; together they cover exactly the
//! pixels whose centres lie within `|r|` of the outline. Growing writes `true`
//! into an enlarged copy, shrinking writes `false`.

use super::boolean_grid::BooleanGrid;
use super::integer::{IntPoint, IntRectangle};
use super::walker::SaddlePolicy;
use crate::geometry::Point2D;
use crate::CoordF;

impl BooleanGrid {
    /// Grid grown (positive `dist`) or shrunk (negative `dist`) by `dist`
    /// millimetres.
    pub fn create_offset_grid(&self, dist: CoordF, policy: SaddlePolicy) -> BooleanGrid {
        let r = (dist / self.pixel_size()).round() as i64;
        if r == 0 || self.rect().is_empty() {
            return self.clone();
        }

        let contours = self.contours(policy);
        let grow = r > 0;
        let radius = r.abs() as CoordF;
        let mut out = if grow {
            self.resized(self.rect().offset(r + 1))
        } else {
            self.clone()
        };

        for contour in &contours {
            for (a, b) in contour.edges() {
                let a = lattice(a);
                let b = lattice(b);
                stamp_rectangle(&mut out, a, b, radius, grow);
                stamp_disc(&mut out, a, radius, grow);
            }
        }
        out
    }
}

#[inline]
fn lattice(p: IntPoint) -> Point2D {
    Point2D::new(p.x as CoordF, p.y as CoordF)
}

#[inline]
fn centre(p: IntPoint) -> Point2D {
    Point2D::new(p.x as CoordF + 0.5, p.y as CoordF + 0.5)
}

/// Pixels (in lattice units) whose centres might be within `radius` of the
/// points.
fn candidate_pixels(points: &[Point2D], radius: CoordF) -> IntRectangle {
    let mut lo = Point2D::new(CoordF::MAX, CoordF::MAX);
    let mut hi = Point2D::new(CoordF::MIN, CoordF::MIN);
    for p in points {
        lo = Point2D::new(lo.x.min(p.x), lo.y.min(p.y));
        hi = Point2D::new(hi.x.max(p.x), hi.y.max(p.y));
    }
    let sw = IntPoint::new((lo.x - radius).floor() as i64 - 1, (lo.y - radius).floor() as i64 - 1);
    let ne = IntPoint::new((hi.x + radius).ceil() as i64 + 1, (hi.y + radius).ceil() as i64 + 1);
    IntRectangle::new(sw, ne.x - sw.x, ne.y - sw.y)
}

/// Write `v` into the pixels within `radius` of the segment `a-b`, measured
/// perpendicular to it.
fn stamp_rectangle(grid: &mut BooleanGrid, a: Point2D, b: Point2D, radius: CoordF, v: bool) {
    let d = b - a;
    let len = d.length();
    if len < CoordF::EPSILON {
        return;
    }
    let u = d * (1.0 / len);
    let n = u.perp();
    let corners = [a + n * radius, b + n * radius, b - n * radius, a - n * radius];
    let area = candidate_pixels(&corners, 0.0).intersection(grid.rect());
    for p in area.pixels() {
        let c = centre(p) - a;
        let t = c.dot(&u);
        if t >= 0.0 && t <= len && c.dot(&n).abs() <= radius {
            grid.set(p, v);
        }
    }
}

/// Write `v` into the pixels whose centres are within `radius` of `c`.
fn stamp_disc(grid: &mut BooleanGrid, c: Point2D, radius: CoordF, v: bool) {
    let area = candidate_pixels(&[c], radius).intersection(grid.rect());
    let r2 = radius * radius;
    for p in area.pixels() {
        if centre(p).distance_squared(&c) <= r2 {
            grid.set(p, v);
        }
    }
}
