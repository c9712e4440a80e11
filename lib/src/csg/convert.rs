//! Polygon to CSG conversion.
//!
//! A simple polygon is described exactly by its convex hull minus the
//! "pockets" between each hull edge and the stretch of polygon it bridges.
//! Each pocket is itself a simple polygon, so the decomposition recurses,
//! alternating intersection and subtraction layer by layer like the skins of
//! an onion.
//!
//! Several polygons are first arranged into a containment forest. A polygon
//! at even depth is solid and one at odd depth is a hole, whatever its
//! winding: every polygon is normalised to anticlockwise before conversion
//! and the tree decides what gets subtracted from what.

use super::Csg2D;
use crate::geometry::{remove_duplicate_points, HalfPlane, Point2D, Polygon, Rectangle};
use crate::{CoordF, Error, Result};
use log::debug;

/// Pockets with less area than this are collinear slivers and are ignored.
const MIN_POCKET_AREA: CoordF = 1e-10;

/// Points closer than this are merged before conversion.
const DUPLICATE_TOLERANCE: CoordF = 1e-9;

/// Distance a pocket reaches past its hull chord, so that points on the chord
/// fall inside the subtracted pocket rather than on the solid hull boundary.
const CHORD_CLEARANCE: CoordF = 1e-9;

/// CSG expression for the area enclosed by one closed polygon.
///
/// The winding of the input does not matter.
pub fn polygon_to_csg(polygon: &Polygon) -> Result<Csg2D> {
    let points = normalised_points(polygon.points());
    solid_csg(&points, None)
}

/// CSG expression for the region described by a set of polygons, with nested
/// polygons alternating between solid and hole.
///
/// Open polygons are ignored. A closed polygon with fewer than three distinct
/// points is an error.
pub fn polygons_to_csg(polygons: &[Polygon]) -> Result<Csg2D> {
    let mut loops: Vec<(Vec<Point2D>, CoordF)> = Vec::new();
    for p in polygons.iter().filter(|p| p.is_closed()) {
        let points = normalised_points(p.points());
        if points.len() < 3 {
            return Err(Error::Geometry(format!(
                "closed polygon with {} distinct points cannot enclose an area",
                points.len()
            )));
        }
        let area = signed_area(&points);
        if area < MIN_POCKET_AREA {
            debug!("Skipping zero-area polygon with {} points", points.len());
            continue;
        }
        loops.push((points, area));
    }

    if loops.is_empty() {
        return Ok(Csg2D::Nothing);
    }

    let parents = containment_parents(&loops);
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); loops.len()];
    let mut roots = Vec::new();
    for (i, parent) in parents.iter().enumerate() {
        match parent {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    let regions = roots
        .into_iter()
        .map(|r| region_csg(r, &loops, &children))
        .collect::<Result<Vec<_>>>()?;
    Ok(Csg2D::union_all(regions))
}

/// Region of a node of the containment forest: its own area minus the
/// regions of its children.
fn region_csg(
    node: usize,
    loops: &[(Vec<Point2D>, CoordF)],
    children: &[Vec<usize>],
) -> Result<Csg2D> {
    let mut csg = solid_csg(&loops[node].0, None)?;
    for &c in &children[node] {
        csg = Csg2D::difference(csg, region_csg(c, loops, children)?);
    }
    Ok(csg)
}

/// For each loop, the smallest larger loop that contains it.
fn containment_parents(loops: &[(Vec<Point2D>, CoordF)]) -> Vec<Option<usize>> {
    let polygons: Vec<Polygon> = loops
        .iter()
        .map(|(pts, _)| Polygon::from_points(pts.clone(), "", true))
        .collect();

    (0..loops.len())
        .map(|i| {
            let mut parent: Option<usize> = None;
            for j in 0..loops.len() {
                if i == j || loops[j].1 <= loops[i].1 {
                    continue;
                }
                if !contains_loop(&polygons[j], &loops[i].0) {
                    continue;
                }
                if parent.map_or(true, |p| loops[j].1 < loops[p].1) {
                    parent = Some(j);
                }
            }
            parent
        })
        .collect()
}

/// A loop counts as inside when most of its vertices are strictly inside;
/// shared boundary vertices do not decide either way.
fn contains_loop(outer: &Polygon, inner: &[Point2D]) -> bool {
    if !outer.bbox().contains_rect(&Rectangle::from_points(inner.iter())) {
        return false;
    }
    let inside = inner.iter().filter(|p| outer.contains_point(p)).count();
    2 * inside > inner.len()
}

/// Deduplicate and orient anticlockwise.
fn normalised_points(points: &[Point2D]) -> Vec<Point2D> {
    let mut pts = remove_duplicate_points(points, DUPLICATE_TOLERANCE);
    while pts.len() > 1 && pts[0].coincides_with(&pts[pts.len() - 1], DUPLICATE_TOLERANCE) {
        pts.pop();
    }
    if signed_area(&pts) < 0.0 {
        pts.reverse();
    }
    pts
}

fn signed_area(points: &[Point2D]) -> CoordF {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    0.5 * (0..n)
        .map(|i| points[i].cross(&points[(i + 1) % n]))
        .sum::<CoordF>()
}

/// Hull-and-pockets decomposition of an anticlockwise simple loop.
///
/// `chord` is the hull edge of the parent a pocket was cut from; its leaf is
/// pushed outward by [`CHORD_CLEARANCE`].
fn solid_csg(points: &[Point2D], chord: Option<(Point2D, Point2D)>) -> Result<Csg2D> {
    let n = points.len();
    let hull = convex_hull_indices(points);
    if hull.len() < 3 {
        return Err(Error::Geometry(format!(
            "convex hull of {} points has only {} vertices",
            n,
            hull.len()
        )));
    }

    let h = hull.len();
    let mut csg = Csg2D::Universe;
    for k in 0..h {
        let a = points[hull[k]];
        let b = points[hull[(k + 1) % h]];
        let mut hp = HalfPlane::from_points(a, b);
        if chord.is_some_and(|c| is_chord(&c, &a, &b)) {
            hp = HalfPlane::new(hp.normal(), hp.offset() - CHORD_CLEARANCE);
        }
        csg = Csg2D::intersection(csg, Csg2D::Leaf(hp));
    }

    for k in 0..h {
        let i = hull[k];
        let j = hull[(k + 1) % h];
        let span = (j + n - i) % n;
        if span < 2 {
            continue;
        }
        // The chain i..j runs along the solid; walking it backwards and
        // closing along the hull edge gives the pocket anticlockwise
        let mut pocket: Vec<Point2D> = (0..=span).map(|s| points[(j + n - s) % n]).collect();
        let area = signed_area(&pocket);
        if area.abs() < MIN_POCKET_AREA {
            continue;
        }
        if area < 0.0 {
            pocket.reverse();
        }
        csg = Csg2D::difference(csg, solid_csg(&pocket, Some((points[i], points[j])))?);
    }

    Ok(csg)
}

/// Edge `a-b` joins the chord ends, in either direction.
fn is_chord(chord: &(Point2D, Point2D), a: &Point2D, b: &Point2D) -> bool {
    let (p, q) = chord;
    (a.coincides_with(p, DUPLICATE_TOLERANCE) && b.coincides_with(q, DUPLICATE_TOLERANCE))
        || (a.coincides_with(q, DUPLICATE_TOLERANCE) && b.coincides_with(p, DUPLICATE_TOLERANCE))
}

/// Indices of the convex hull vertices (collinear points excluded), in
/// anticlockwise order starting from the lowest index.
fn convex_hull_indices(points: &[Point2D]) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        return (0..n).collect();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .x
            .partial_cmp(&points[b].x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                points[a]
                    .y
                    .partial_cmp(&points[b].y)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    let turn = |o: usize, a: usize, b: usize| (points[a] - points[o]).cross(&(points[b] - points[o]));

    // Andrew's monotone chain
    let mut hull: Vec<usize> = Vec::with_capacity(2 * n);
    for &i in &order {
        while hull.len() >= 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], i) <= 0.0 {
            hull.pop();
        }
        hull.push(i);
    }
    let lower_len = hull.len() + 1;
    for &i in order.iter().rev().skip(1) {
        while hull.len() >= lower_len && turn(hull[hull.len() - 2], hull[hull.len() - 1], i) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }
    hull.pop();

    if let Some(start) = hull.iter().enumerate().min_by_key(|(_, &v)| v).map(|(k, _)| k) {
        hull.rotate_left(start);
    }
    hull
}
