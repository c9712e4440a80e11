//! Reassembling cut segments into polygons.
//!
//! The segments cut from a mesh arrive in no particular order or direction.
//! Each polygon is grown greedily from a seed segment: the remaining segment
//! endpoint nearest the chain's end is appended (flipping the segment when
//! its far end is the nearer one) as long as it is closer than the chain's own
//! start. When the start is closer, the loop has closed.

use crate::geometry::{LineSegment, Point2D, Polygon};
use crate::CoordF;
use log::debug;

/// Segments longer than this are preferred as seeds.
const LONG_EDGE: CoordF = 1.5;

/// Joined points closer than this to the chain start close the loop exactly.
const CLOSE_TOLERANCE: CoordF = 1e-6;

/// Stitch segments into closed polygons. Polygons with fewer than three
/// points are discarded.
pub fn stitch_segments(segments: &[LineSegment]) -> Vec<Polygon> {
    let mut used = vec![false; segments.len()];
    let mut polygons = Vec::new();
    while let Some(poly) = next_polygon(segments, &mut used) {
        if poly.len() >= 3 {
            polygons.push(poly);
        } else {
            debug!("Discarding {}-point fragment", poly.len());
        }
    }
    polygons
}

/// Seed: the first unused edge longer than [`LONG_EDGE`], else the longest.
fn seed(segments: &[LineSegment], used: &[bool]) -> Option<usize> {
    let unused = || (0..segments.len()).filter(|&i| !used[i]);
    if let Some(i) = unused().find(|&i| segments[i].length() > LONG_EDGE) {
        return Some(i);
    }
    unused().max_by(|&a, &b| {
        segments[a]
            .length_squared()
            .partial_cmp(&segments[b].length_squared())
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Nearest unused endpoint to `p`: segment index, whether it is the far end
/// (so the segment must be flipped) and the squared distance.
fn nearest_end(segments: &[LineSegment], used: &[bool], p: &Point2D) -> Option<(usize, bool, CoordF)> {
    let mut best: Option<(usize, bool, CoordF)> = None;
    for (i, s) in segments.iter().enumerate() {
        if used[i] {
            continue;
        }
        for (flip, end) in [(false, &s.a), (true, &s.b)] {
            let d2 = end.distance_squared(p);
            if best.map_or(true, |(_, _, b)| d2 < b) {
                best = Some((i, flip, d2));
            }
        }
    }
    best
}

fn next_polygon(segments: &[LineSegment], used: &mut [bool]) -> Option<Polygon> {
    let first = seed(segments, used)?;
    used[first] = true;
    let material = segments[first].material.clone();
    let start = segments[first].a;
    let mut points = vec![start, segments[first].b];

    loop {
        let end = points[points.len() - 1];
        let Some((i, flip, d2)) = nearest_end(segments, used, &end) else {
            break;
        };
        // The first link may go anywhere; later links must beat closing the loop
        let threshold = if points.len() == 2 {
            CoordF::INFINITY
        } else {
            end.distance_squared(&start)
        };
        if d2 >= threshold {
            break;
        }
        used[i] = true;
        let mut s = segments[i].clone();
        if flip {
            s.reverse();
        }
        let last = points.len() - 1;
        points[last] = end.midpoint(&s.a);
        points.push(s.b);
    }

    // The closing segment ends where the chain began
    let last = points[points.len() - 1];
    if points.len() > 2 && last.distance(&start) < CLOSE_TOLERANCE {
        points.pop();
        points[0] = start.midpoint(&last);
    } else {
        debug!(
            "Edge list exhausted leaving a {}-point polygon open by {:.4}mm",
            points.len(),
            last.distance(&start)
        );
    }

    Some(Polygon::from_points(points, material, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: (CoordF, CoordF), b: (CoordF, CoordF)) -> LineSegment {
        LineSegment::new(Point2D::new(a.0, a.1), Point2D::new(b.0, b.1), "PLA")
    }

    #[test]
    fn test_square_from_shuffled_segments() {
        // Out of order and with mixed directions
        let segments = vec![
            seg((2.0, 2.0), (2.0, 0.0)),
            seg((0.0, 0.0), (2.0, 0.0)),
            seg((0.0, 2.0), (0.0, 0.0)),
            seg((0.0, 2.0), (2.0, 2.0)),
        ];
        let polys = stitch_segments(&segments);
        assert_eq!(polys.len(), 1);
        let p = &polys[0];
        assert_eq!(p.len(), 4);
        assert!(p.is_closed());
        assert!((p.area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_loops() {
        let mut segments = Vec::new();
        for (ox, oy) in [(0.0, 0.0), (10.0, 0.0)] {
            segments.push(seg((ox, oy), (ox + 2.0, oy)));
            segments.push(seg((ox + 2.0, oy), (ox + 2.0, oy + 2.0)));
            segments.push(seg((ox + 2.0, oy + 2.0), (ox, oy + 2.0)));
            segments.push(seg((ox, oy + 2.0), (ox, oy)));
        }
        let polys = stitch_segments(&segments);
        assert_eq!(polys.len(), 2);
        assert!(polys.iter().all(|p| p.len() == 4));
    }

    #[test]
    fn test_short_edges_use_longest_seed() {
        let segments = vec![
            seg((0.0, 0.0), (0.1, 0.0)),
            seg((0.1, 0.0), (0.1, 0.5)),
            seg((0.1, 0.5), (0.0, 0.0)),
        ];
        assert_eq!(seed(&segments, &[false; 3]), Some(2));
        let polys = stitch_segments(&segments);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 3);
    }

    #[test]
    fn test_lone_segment_discarded() {
        assert!(stitch_segments(&[seg((0.0, 0.0), (1.0, 0.0))]).is_empty());
    }

    #[test]
    fn test_open_chain_is_best_effort() {
        let segments = vec![
            seg((0.0, 0.0), (2.0, 0.0)),
            seg((2.0, 0.0), (2.0, 2.0)),
            seg((2.0, 2.0), (1.0, 3.0)),
        ];
        let polys = stitch_segments(&segments);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 4);
    }
}
