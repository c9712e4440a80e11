//! Material-tagged polygons and open paths.
//!
//! A [`Polygon`] is an ordered list of points with a `closed` flag. Closed
//! polygons implicitly join the last point back to the first; open ones are
//! paths (hatch lines, brims joined into a single stroke, and so on).
//!
//! Area, centroid and containment queries go through the `geo` crate.

use super::simplify::simplify_points;
use super::{Point2D, Rectangle};
use crate::CoordF;
use geo::{Area, Centroid, Contains, LineString};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPolygon")]
pub struct Polygon {
    points: Vec<Point2D>,
    closed: bool,
    material: String,
    #[serde(skip)]
    bbox: Rectangle,
}

/// Serialised form; the bounding box is rebuilt on load.
#[derive(Deserialize)]
struct RawPolygon {
    points: Vec<Point2D>,
    closed: bool,
    material: String,
}

impl From<RawPolygon> for Polygon {
    fn from(raw: RawPolygon) -> Self {
        Polygon::from_points(raw.points, raw.material, raw.closed)
    }
}

impl Polygon {
    /// Create an empty polygon.
    pub fn new(material: impl Into<String>, closed: bool) -> Self {
        Self {
            points: Vec::new(),
            closed,
            material: material.into(),
            bbox: Rectangle::empty(),
        }
    }

    /// Create a polygon from a list of points.
    pub fn from_points(points: Vec<Point2D>, material: impl Into<String>, closed: bool) -> Self {
        let bbox = Rectangle::from_points(points.iter());
        Self {
            points,
            closed,
            material: material.into(),
            bbox,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Consume the polygon, returning its points.
    pub fn into_points(self) -> Vec<Point2D> {
        self.points
    }

    /// Point `i`, wrapping around for closed polygons.
    #[inline]
    pub fn point(&self, i: usize) -> Point2D {
        self.points[i % self.points.len()]
    }

    pub fn first_point(&self) -> Option<Point2D> {
        self.points.first().copied()
    }

    pub fn last_point(&self) -> Option<Point2D> {
        self.points.last().copied()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    #[inline]
    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn set_material(&mut self, material: impl Into<String>) {
        self.material = material.into();
    }

    /// Bounding rectangle of the vertices.
    ///
    /// Recomputed if the cached box was lost (e.g. after deserialisation).
    pub fn bbox(&self) -> Rectangle {
        if self.bbox.is_empty() && !self.points.is_empty() {
            Rectangle::from_points(self.points.iter())
        } else {
            self.bbox
        }
    }

    /// Append a vertex.
    pub fn push(&mut self, p: Point2D) {
        if self.bbox.is_empty() && !self.points.is_empty() {
            self.bbox = Rectangle::from_points(self.points.iter());
        }
        self.bbox.expand_to(&p);
        self.points.push(p);
    }

    /// Append all vertices of another point list.
    pub fn extend<I: IntoIterator<Item = Point2D>>(&mut self, points: I) {
        for p in points {
            self.push(p);
        }
    }

    /// Replace vertex `i`.
    pub fn set_point(&mut self, i: usize, p: Point2D) {
        self.points[i] = p;
        self.bbox = Rectangle::from_points(self.points.iter());
    }

    /// Number of edges: `len` for closed polygons, `len - 1` for paths.
    pub fn edge_count(&self) -> usize {
        match (self.closed, self.points.len()) {
            (_, 0) | (_, 1) => 0,
            (true, n) => n,
            (false, n) => n - 1,
        }
    }

    /// Edge `i` as a pair of endpoints.
    pub fn edge(&self, i: usize) -> (Point2D, Point2D) {
        (self.point(i), self.point(i + 1))
    }

    /// Total length of all edges.
    pub fn length(&self) -> CoordF {
        (0..self.edge_count())
            .map(|i| {
                let (a, b) = self.edge(i);
                a.distance(&b)
            })
            .sum()
    }

    /// Reverse the vertex order in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Copy with the vertex order reversed, turning solid into hole and
    /// vice versa.
    pub fn negate(&self) -> Polygon {
        let mut result = self.clone();
        result.reverse();
        result
    }

    /// Convert to a `geo` polygon (the ring is closed implicitly).
    pub fn to_geo(&self) -> geo::Polygon<CoordF> {
        let ring: Vec<(CoordF, CoordF)> = self.points.iter().map(|p| (p.x, p.y)).collect();
        geo::Polygon::new(LineString::from(ring), vec![])
    }

    /// Signed area: positive for anticlockwise polygons.
    pub fn signed_area(&self) -> CoordF {
        if self.points.len() < 3 {
            return 0.0;
        }
        self.to_geo().signed_area()
    }

    /// Absolute enclosed area.
    pub fn area(&self) -> CoordF {
        self.signed_area().abs()
    }

    /// Centroid of the enclosed area, falling back to the vertex mean for
    /// degenerate polygons.
    pub fn centroid(&self) -> Option<Point2D> {
        if self.points.is_empty() {
            return None;
        }
        if self.points.len() >= 3 {
            if let Some(c) = self.to_geo().centroid() {
                if c.x().is_finite() && c.y().is_finite() {
                    return Some(Point2D::new(c.x(), c.y()));
                }
            }
        }
        let n = self.points.len() as CoordF;
        let sum = self
            .points
            .iter()
            .fold(Point2D::zero(), |acc, p| acc + *p);
        Some(sum * (1.0 / n))
    }

    /// Strict point-in-polygon test (points on the boundary are outside).
    pub fn contains_point(&self, p: &Point2D) -> bool {
        if self.points.len() < 3 || !self.bbox().contains(p) {
            return false;
        }
        self.to_geo().contains(&geo::Point::new(p.x, p.y))
    }

    /// Index and squared distance of the vertex nearest to `p`.
    pub fn nearest_vertex(&self, p: &Point2D) -> Option<(usize, CoordF)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, q)| (i, q.distance_squared(p)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Rotate a closed polygon so that vertex `i` comes first.
    pub fn rotate_to(&mut self, i: usize) {
        let n = self.points.len();
        if n > 0 {
            self.points.rotate_left(i % n);
        }
    }

    /// Remove vertices that deviate less than `d` from the chord between the
    /// vertices kept around them.
    ///
    /// Never increases the vertex count. A polygon that lies within `d` of a
    /// straight line collapses to its two extreme points.
    pub fn simplify(&self, d: CoordF) -> Polygon {
        let points = simplify_points(&self.points, self.closed, d);
        let mut result = Polygon::from_points(points, self.material.clone(), self.closed);
        if result.points.len() < 3 {
            // A two-point "loop" is just a line
            result.closed = false;
        }
        result
    }

    /// Push vertices on curved runs of short sides outwards to compensate for
    /// the extruded bead being dragged inside tight arcs.
    ///
    /// A vertex qualifies when both adjoining sides are shorter than
    /// `short_sides`. It is moved away from the centre of the circle through
    /// it and its two neighbours by `factor * width^2 / (4 * radius)`.
    pub fn arc_compensate(&self, factor: CoordF, width: CoordF, short_sides: CoordF) -> Polygon {
        let n = self.points.len();
        if !self.closed || n < 3 || factor <= 0.0 {
            return self.clone();
        }

        let short_sq = short_sides * short_sides;
        let mut result = Polygon::new(self.material.clone(), true);
        for i in 0..n {
            let prev = self.points[(i + n - 1) % n];
            let here = self.points[i];
            let next = self.points[(i + 1) % n];

            if here.distance_squared(&prev) >= short_sq || here.distance_squared(&next) >= short_sq
            {
                result.push(here);
                continue;
            }

            match circumcentre(&prev, &here, &next) {
                Some(centre) => {
                    let radial = here - centre;
                    let radius = radial.length();
                    if radius < CoordF::EPSILON {
                        result.push(here);
                    } else {
                        let shift = factor * width * width / (4.0 * radius);
                        result.push(here + radial.normalize() * shift);
                    }
                }
                None => result.push(here),
            }
        }
        result
    }
}

/// Centre of the circle through three points, `None` if they are collinear.
fn circumcentre(a: &Point2D, b: &Point2D, c: &Point2D) -> Option<Point2D> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let a2 = a.length_squared();
    let b2 = b.length_squared();
    let c2 = c.length_squared();
    Some(Point2D::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    ))
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Polygon({} points, {}, {})",
            self.points.len(),
            if self.closed { "closed" } else { "open" },
            self.material
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_to_wraps() {
        let mut p = square(1.0);
        let third = p.point(2);
        p.rotate_to(6);
        assert_eq!(p.first_point(), Some(third));
        assert_eq!(p.len(), 4);
        assert!((p.area() - 1.0).abs() < 1e-12);
    }

    fn square(size: CoordF) -> Polygon {
        Polygon::from_points(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(size, 0.0),
                Point2D::new(size, size),
                Point2D::new(0.0, size),
            ],
            "PLA",
            true,
        )
    }

    #[test]
    fn test_signed_area() {
        let sq = square(2.0);
        assert!((sq.signed_area() - 4.0).abs() < 1e-9);
        assert!((sq.negate().signed_area() + 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_bbox_follows_push() {
        let mut p = Polygon::new("PLA", false);
        p.push(Point2D::new(1.0, 1.0));
        p.push(Point2D::new(-1.0, 3.0));
        let b = p.bbox();
        assert_eq!(b.sw(), Point2D::new(-1.0, 1.0));
        assert_eq!(b.ne(), Point2D::new(1.0, 3.0));
    }

    #[test]
    fn test_contains_point() {
        let sq = square(2.0);
        assert!(sq.contains_point(&Point2D::new(1.0, 1.0)));
        assert!(!sq.contains_point(&Point2D::new(3.0, 1.0)));
    }

    #[test]
    fn test_length_open_and_closed() {
        let sq = square(1.0);
        assert!((sq.length() - 4.0).abs() < 1e-12);
        let mut open = sq.clone();
        open.set_closed(false);
        assert!((open.length() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid() {
        let c = square(2.0).centroid().unwrap();
        assert!((c.x - 1.0).abs() < 1e-9);
        assert!((c.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_compensate_moves_outwards() {
        // A small regular 12-gon: all sides short
        let r = 1.0;
        let pts: Vec<Point2D> = (0..12)
            .map(|i| Point2D::from_angle(i as CoordF * std::f64::consts::PI / 6.0) * r)
            .collect();
        let poly = Polygon::from_points(pts, "PLA", true);
        let comp = poly.arc_compensate(1.0, 0.4, 1.0);
        for p in comp.points() {
            assert!(p.length() > r);
            assert!((p.length() - (r + 0.04)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_arc_compensate_ignores_long_sides() {
        let sq = square(10.0);
        let comp = sq.arc_compensate(1.0, 0.4, 1.0);
        assert_eq!(comp.points(), sq.points());
    }
}
