//! Ordered collections of polygons.
//!
//! A [`PolygonList`] is what the geometry core hands to the G-code layer:
//! perimeters, hatches and support paths for one layer, in print order.
//! The aggregate bounding box always contains every member's box.

use super::{Point2D, Polygon, Rectangle};
use crate::csg::{polygons_to_csg, Csg2D};
use crate::{CoordF, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Polygon>", into = "Vec<Polygon>")]
pub struct PolygonList {
    polygons: Vec<Polygon>,
    bbox: Rectangle,
}

impl From<Vec<Polygon>> for PolygonList {
    fn from(polygons: Vec<Polygon>) -> Self {
        PolygonList::from_polygons(polygons)
    }
}

impl From<PolygonList> for Vec<Polygon> {
    fn from(list: PolygonList) -> Self {
        list.polygons
    }
}

impl PolygonList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        let bbox = polygons
            .iter()
            .fold(Rectangle::empty(), |acc, p| acc.union(&p.bbox()));
        Self { polygons, bbox }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> &Polygon {
        &self.polygons[i]
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.polygons.iter()
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        self.polygons
    }

    pub fn bbox(&self) -> Rectangle {
        if self.bbox.is_empty() && !self.polygons.is_empty() {
            self.polygons
                .iter()
                .fold(Rectangle::empty(), |acc, p| acc.union(&p.bbox()))
        } else {
            self.bbox
        }
    }

    /// Append a polygon. Empty polygons are ignored.
    pub fn push(&mut self, polygon: Polygon) {
        if polygon.is_empty() {
            return;
        }
        self.bbox = self.bbox().union(&polygon.bbox());
        self.polygons.push(polygon);
    }

    /// Append every polygon of another list.
    pub fn append(&mut self, other: PolygonList) {
        for p in other.polygons {
            self.push(p);
        }
    }

    /// Reverse the print order (not the polygons themselves).
    pub fn reverse_order(&mut self) {
        self.polygons.reverse();
    }

    /// Total path length of all members.
    pub fn length(&self) -> CoordF {
        self.polygons.iter().map(|p| p.length()).sum()
    }

    /// Total number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.polygons.iter().map(|p| p.len()).sum()
    }

    /// Members of one material.
    pub fn filter_material(&self, material: &str) -> PolygonList {
        PolygonList::from_polygons(
            self.polygons
                .iter()
                .filter(|p| p.material() == material)
                .cloned()
                .collect(),
        )
    }

    /// Simplify every member, dropping those that collapse below two points.
    pub fn simplify(&self, d: CoordF) -> PolygonList {
        let mut result = PolygonList::new();
        for p in &self.polygons {
            let s = p.simplify(d);
            if s.len() >= 2 {
                result.push(s);
            }
        }
        result
    }

    /// Arc-compensate every closed member.
    pub fn arc_compensate(&self, factor: CoordF, width: CoordF, short_sides: CoordF) -> PolygonList {
        PolygonList::from_polygons(
            self.polygons
                .iter()
                .map(|p| p.arc_compensate(factor, width, short_sides))
                .collect(),
        )
    }

    /// Build an exact CSG expression for the region enclosed by the closed
    /// members, regardless of their winding.
    pub fn to_csg(&self) -> Result<Csg2D> {
        polygons_to_csg(&self.polygons)
    }

    /// Merge polygons of the same material whose accessible endpoints lie
    /// within `link_up` of each other, so the extruder can keep printing
    /// instead of travelling.
    ///
    /// - two open paths join end to end at the closest of four pairings;
    /// - an open path and a loop: the loop is spliced into the path at its
    ///   nearest vertex and the result is open;
    /// - two loops: one is spliced into the other at the nearest vertex pair
    ///   and the result stays closed.
    ///
    /// Distances are compared squared throughout.
    pub fn radical_reorder(&mut self, link_up: CoordF) {
        let link_sq = link_up * link_up;
        let mut i = 0;
        while i < self.polygons.len() {
            let mut best: Option<(usize, Join, CoordF)> = None;
            for j in 0..self.polygons.len() {
                if j == i || self.polygons[i].material() != self.polygons[j].material() {
                    continue;
                }
                if let Some((join, d2)) = best_join(&self.polygons[i], &self.polygons[j]) {
                    if d2 < link_sq && best.as_ref().map_or(true, |b| d2 < b.2) {
                        best = Some((j, join, d2));
                    }
                }
            }

            match best {
                Some((j, join, _)) => {
                    let other = self.polygons.remove(j);
                    let target = if j < i { i - 1 } else { i };
                    let merged = merge(&self.polygons[target], &other, join);
                    self.polygons[target] = merged;
                    i = target;
                }
                None => i += 1,
            }
        }
        self.bbox = self
            .polygons
            .iter()
            .fold(Rectangle::empty(), |acc, p| acc.union(&p.bbox()));
    }
}

/// How two polygons get joined by [`PolygonList::radical_reorder`].
#[derive(Clone, Copy, Debug, PartialEq)]
enum Join {
    /// Open/open: a's end to b's start.
    EndStart,
    /// Open/open: a's end to b's end (b reversed).
    EndEnd,
    /// Open/open: b's end to a's start (b first).
    StartEnd,
    /// Open/open: a's start to b's start (b reversed, first).
    StartStart,
    /// Open a, closed b: loop spliced after a's end at vertex `k`.
    LoopAfter(usize),
    /// Open a, closed b: loop spliced before a's start at vertex `k`.
    LoopBefore(usize),
    /// Closed a, open b: path attached via a's vertex `k` to b's start.
    PathFromLoop(usize),
    /// Closed a, open b: b ends at a's vertex `k`.
    PathIntoLoop(usize),
    /// Closed/closed: a's vertex `ka` spliced with b's vertex `kb`.
    Loops(usize, usize),
}

/// Cheapest way to join `a` and `b`, with its squared gap.
fn best_join(a: &Polygon, b: &Polygon) -> Option<(Join, CoordF)> {
    let (a_first, a_last) = (a.first_point()?, a.last_point()?);
    let (b_first, b_last) = (b.first_point()?, b.last_point()?);

    match (a.is_closed(), b.is_closed()) {
        (false, false) => [
            (Join::EndStart, a_last.distance_squared(&b_first)),
            (Join::EndEnd, a_last.distance_squared(&b_last)),
            (Join::StartEnd, a_first.distance_squared(&b_last)),
            (Join::StartStart, a_first.distance_squared(&b_first)),
        ]
        .into_iter()
        .min_by(|x, y| x.1.partial_cmp(&y.1).unwrap_or(std::cmp::Ordering::Equal)),
        (false, true) => {
            let (k_end, d_end) = b.nearest_vertex(&a_last)?;
            let (k_start, d_start) = b.nearest_vertex(&a_first)?;
            if d_end <= d_start {
                Some((Join::LoopAfter(k_end), d_end))
            } else {
                Some((Join::LoopBefore(k_start), d_start))
            }
        }
        (true, false) => {
            let (k_start, d_start) = a.nearest_vertex(&b_first)?;
            let (k_end, d_end) = a.nearest_vertex(&b_last)?;
            if d_start <= d_end {
                Some((Join::PathFromLoop(k_start), d_start))
            } else {
                Some((Join::PathIntoLoop(k_end), d_end))
            }
        }
        (true, true) => {
            let mut best: Option<(Join, CoordF)> = None;
            for (ka, p) in a.points().iter().enumerate() {
                if let Some((kb, d2)) = b.nearest_vertex(p) {
                    if best.as_ref().map_or(true, |x| d2 < x.1) {
                        best = Some((Join::Loops(ka, kb), d2));
                    }
                }
            }
            best
        }
    }
}

/// Vertices of a closed polygon starting and ending at vertex `k`.
fn loop_from(p: &Polygon, k: usize) -> Vec<Point2D> {
    let mut rotated = p.clone();
    rotated.rotate_to(k);
    let mut points = rotated.into_points();
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

fn merge(a: &Polygon, b: &Polygon, join: Join) -> Polygon {
    let mut points: Vec<Point2D> = Vec::with_capacity(a.len() + b.len() + 2);
    let mut closed = false;
    match join {
        Join::EndStart => {
            points.extend_from_slice(a.points());
            points.extend_from_slice(b.points());
        }
        Join::EndEnd => {
            points.extend_from_slice(a.points());
            points.extend(b.points().iter().rev());
        }
        Join::StartEnd => {
            points.extend_from_slice(b.points());
            points.extend_from_slice(a.points());
        }
        Join::StartStart => {
            points.extend(b.points().iter().rev());
            points.extend_from_slice(a.points());
        }
        Join::LoopAfter(k) => {
            points.extend_from_slice(a.points());
            points.extend(loop_from(b, k));
        }
        Join::LoopBefore(k) => {
            points.extend(loop_from(b, k));
            points.extend_from_slice(a.points());
        }
        Join::PathFromLoop(k) => {
            points.extend(loop_from(a, k));
            points.extend_from_slice(b.points());
        }
        Join::PathIntoLoop(k) => {
            points.extend_from_slice(b.points());
            points.extend(loop_from(a, k));
        }
        Join::Loops(ka, kb) => {
            closed = true;
            points.extend_from_slice(&a.points()[..=ka]);
            points.extend(loop_from(b, kb));
            points.extend_from_slice(&a.points()[ka..]);
        }
    }
    Polygon::from_points(points, a.material().to_string(), closed)
}

impl FromIterator<Polygon> for PolygonList {
    fn from_iter<I: IntoIterator<Item = Polygon>>(iter: I) -> Self {
        let mut list = PolygonList::new();
        for p in iter {
            list.push(p);
        }
        list
    }
}

impl<'a> IntoIterator for &'a PolygonList {
    type Item = &'a Polygon;
    type IntoIter = std::slice::Iter<'a, Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}

impl fmt::Debug for PolygonList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PolygonList({} polygons)", self.polygons.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(points: &[(CoordF, CoordF)], material: &str) -> Polygon {
        Polygon::from_points(
            points.iter().map(|&(x, y)| Point2D::new(x, y)).collect(),
            material,
            false,
        )
    }

    fn loop_poly(points: &[(CoordF, CoordF)]) -> Polygon {
        let mut p = path(points, "PLA");
        p.set_closed(true);
        p
    }

    #[test]
    fn test_bbox_contains_members() {
        let list: PolygonList = vec![
            path(&[(0.0, 0.0), (1.0, 1.0)], "PLA"),
            path(&[(5.0, -2.0), (6.0, 0.0)], "PLA"),
        ]
        .into_iter()
        .collect();
        let b = list.bbox();
        for p in &list {
            assert!(b.contains_rect(&p.bbox()));
        }
    }

    #[test]
    fn test_bbox_rebuilt_after_deserialize() {
        let list = PolygonList::from_polygons(vec![loop_poly(&[(0.0, 0.0), (4.0, 0.0), (4.0, 3.0)])]);
        let json = serde_json::to_string(&list).unwrap();
        let back: PolygonList = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert!((back.bbox().width() - 4.0).abs() < 1e-12);
        assert!((back.get(0).bbox().height() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_reorder_joins_open_paths() {
        let mut list = PolygonList::from_polygons(vec![
            path(&[(0.0, 0.0), (10.0, 0.0)], "PLA"),
            path(&[(10.0, 1.0), (0.0, 1.0)], "PLA"),
            path(&[(0.0, 2.0), (10.0, 2.0)], "PLA"),
        ]);
        list.radical_reorder(1.5);
        assert_eq!(list.len(), 1);
        let p = list.get(0);
        assert!(!p.is_closed());
        assert_eq!(p.len(), 6);
        assert_eq!(p.first_point().unwrap(), Point2D::new(0.0, 0.0));
        assert_eq!(p.last_point().unwrap(), Point2D::new(10.0, 2.0));
    }

    #[test]
    fn test_reorder_respects_link_up() {
        let mut list = PolygonList::from_polygons(vec![
            path(&[(0.0, 0.0), (10.0, 0.0)], "PLA"),
            path(&[(10.0, 5.0), (0.0, 5.0)], "PLA"),
        ]);
        list.radical_reorder(1.0);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_reorder_respects_material() {
        let mut list = PolygonList::from_polygons(vec![
            path(&[(0.0, 0.0), (10.0, 0.0)], "PLA"),
            path(&[(10.0, 0.5), (0.0, 0.5)], "ABS"),
        ]);
        list.radical_reorder(2.0);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_reorder_splices_loop_into_path() {
        let mut list = PolygonList::from_polygons(vec![
            path(&[(-5.0, 0.0), (0.0, 0.0)], "PLA"),
            loop_poly(&[(0.5, 0.0), (2.0, 0.0), (2.0, 2.0), (0.5, 2.0)]),
        ]);
        list.radical_reorder(1.0);
        assert_eq!(list.len(), 1);
        let p = list.get(0);
        assert!(!p.is_closed());
        // Path (2) + loop vertices returning to the entry vertex (5)
        assert_eq!(p.len(), 7);
        assert_eq!(p.last_point().unwrap(), Point2D::new(0.5, 0.0));
    }

    #[test]
    fn test_reorder_splices_two_loops() {
        let mut list = PolygonList::from_polygons(vec![
            loop_poly(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
            loop_poly(&[(1.2, 0.0), (2.0, 0.0), (2.0, 1.0), (1.2, 1.0)]),
        ]);
        list.radical_reorder(0.5);
        assert_eq!(list.len(), 1);
        let p = list.get(0);
        assert!(p.is_closed());
        assert_eq!(p.len(), 4 + 5 + 1);
    }
}
