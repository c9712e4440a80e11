//! Vertex reduction for polygons and paths.
//!
//! A forward-scanning variant of Douglas-Peucker: starting from an anchor
//! vertex, the chord is stretched one vertex at a time until some vertex in
//! between deviates from it by more than the tolerance. The last vertex that
//! still gave a valid chord becomes the next anchor.

use super::Point2D;
use crate::CoordF;

/// Simplify a list of points with tolerance `d`.
///
/// For closed lists the wrap-around edge back to the first point is part of
/// the scan, and the first point is always kept. The result never has more
/// points than the input.
pub fn simplify_points(points: &[Point2D], closed: bool, d: CoordF) -> Vec<Point2D> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let d2 = d * d;
    // For closed polygons scan the ring as a path that returns to point 0
    let last = if closed { n } else { n - 1 };
    let at = |i: usize| points[i % n];

    let mut result = Vec::with_capacity(n);
    result.push(points[0]);

    let mut anchor = 0;
    let mut end = anchor + 2;
    while end <= last {
        let a = at(anchor);
        let b = at(end);
        let deviates = (anchor + 1..end).any(|k| at(k).distance_to_segment_squared(&a, &b) > d2);
        if deviates {
            anchor = end - 1;
            result.push(at(anchor));
            end = anchor + 2;
        } else {
            end += 1;
        }
    }

    if !closed {
        result.push(points[n - 1]);
    }

    result
}

/// Remove consecutive duplicate points (within `tolerance`).
pub fn remove_duplicate_points(points: &[Point2D], tolerance: CoordF) -> Vec<Point2D> {
    let mut result: Vec<Point2D> = Vec::with_capacity(points.len());
    for p in points {
        match result.last() {
            Some(q) if q.coincides_with(p, tolerance) => {}
            _ => result.push(*p),
        }
    }
    result
}
