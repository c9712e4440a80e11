//! Per-material collections of grids.
//!
//! A [`BooleanGridList`] holds the shapes of one region on one layer, usually
//! one grid per material. Binary operations pair grids by material: a grid
//! with no partner in the other list is carried through unchanged by union and
//! difference and dropped by intersection.

use super::boolean_grid::BooleanGrid;
use super::walker::SaddlePolicy;
use crate::geometry::{PolygonList, Rectangle};
use crate::CoordF;

#[derive(Clone, Debug, Default)]
pub struct BooleanGridList {
    grids: Vec<BooleanGrid>,
}

impl BooleanGridList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_grids(grids: Vec<BooleanGrid>) -> Self {
        Self { grids }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn get(&self, i: usize) -> &BooleanGrid {
        &self.grids[i]
    }

    pub fn grids(&self) -> &[BooleanGrid] {
        &self.grids
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BooleanGrid> {
        self.grids.iter()
    }

    pub fn into_grids(self) -> Vec<BooleanGrid> {
        self.grids
    }

    /// Add a grid; empty grids are ignored.
    pub fn push(&mut self, grid: BooleanGrid) {
        if !grid.is_empty() {
            self.grids.push(grid);
        }
    }

    /// Add a grid, merging it into an existing grid of the same material.
    pub fn merge(&mut self, grid: BooleanGrid) {
        if grid.is_empty() {
            return;
        }
        match self.grids.iter_mut().find(|g| g.material() == grid.material()) {
            Some(g) => *g = g.union(&grid),
            None => self.grids.push(grid),
        }
    }

    /// Keep only the grids `f` accepts.
    pub fn retain<F: FnMut(&BooleanGrid) -> bool>(&mut self, f: F) {
        self.grids.retain(f);
    }

    /// Grid for `material`, if any.
    pub fn find(&self, material: &str) -> Option<&BooleanGrid> {
        self.grids.iter().find(|g| g.material() == material)
    }

    /// Materials present, in list order.
    pub fn materials(&self) -> Vec<&str> {
        self.grids.iter().map(|g| g.material()).collect()
    }

    /// Drop grids with no pixels set.
    pub fn reduce(self) -> Self {
        Self {
            grids: self.grids.into_iter().filter(|g| !g.is_empty()).collect(),
        }
    }

    pub fn union(&self, other: &BooleanGridList) -> BooleanGridList {
        let mut result = self.clone();
        for g in &other.grids {
            result.merge(g.clone());
        }
        result
    }

    pub fn intersection(&self, other: &BooleanGridList) -> BooleanGridList {
        let mut result = BooleanGridList::new();
        for g in &self.grids {
            if let Some(o) = other.find(g.material()) {
                result.push(g.intersection(o));
            }
        }
        result
    }

    pub fn difference(&self, other: &BooleanGridList) -> BooleanGridList {
        let mut result = BooleanGridList::new();
        for g in &self.grids {
            match other.find(g.material()) {
                Some(o) => result.push(g.difference(o)),
                None => result.push(g.clone()),
            }
        }
        result
    }

    /// Offset every grid by the distance `dist` returns for its material.
    pub fn offset<F>(&self, dist: F, policy: SaddlePolicy) -> BooleanGridList
    where
        F: Fn(&str) -> CoordF,
    {
        let mut result = BooleanGridList::new();
        for g in &self.grids {
            result.push(g.create_offset_grid(dist(g.material()), policy));
        }
        result
    }

    /// Split every grid into its connected components.
    pub fn components(&self) -> BooleanGridList {
        Self {
            grids: self.grids.iter().flat_map(|g| g.components()).collect(),
        }
    }

    pub fn all_perimeters(&self, policy: SaddlePolicy) -> PolygonList {
        let mut result = PolygonList::new();
        for g in &self.grids {
            result.append(g.all_perimeters(policy));
        }
        result
    }

    /// Hatch every grid; `params` gives `(angle, spacing)` for each material.
    pub fn hatch<F>(&self, params: F, stagger: bool) -> PolygonList
    where
        F: Fn(&str) -> Option<(CoordF, CoordF)>,
    {
        let mut result = PolygonList::new();
        for g in &self.grids {
            if let Some((angle, spacing)) = params(g.material()) {
                result.append(g.hatch(angle, spacing, stagger));
            }
        }
        result
    }

    pub fn pixel_count(&self) -> usize {
        self.grids.iter().map(|g| g.pixel_count()).sum()
    }

    /// Real rectangle covering every set pixel.
    pub fn bounds(&self) -> Rectangle {
        self.grids
            .iter()
            .fold(Rectangle::empty(), |r, g| r.union(&g.bounds()))
    }
}

impl FromIterator<BooleanGrid> for BooleanGridList {
    fn from_iter<I: IntoIterator<Item = BooleanGrid>>(iter: I) -> Self {
        let mut list = BooleanGridList::new();
        for g in iter {
            list.push(g);
        }
        list
    }
}

impl<'a> IntoIterator for &'a BooleanGridList {
    type Item = &'a BooleanGrid;
    type IntoIter = std::slice::Iter<'a, BooleanGrid>;

    fn into_iter(self) -> Self::IntoIter {
        self.grids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csg::Csg2D;
    use crate::geometry::Point2D;

    fn rect_grid(x0: CoordF, x1: CoordF, material: &str) -> BooleanGrid {
        let r = Rectangle::new(Point2D::new(x0, 0.0), Point2D::new(x1, 1.0));
        BooleanGrid::from_csg(&Csg2D::rectangle(&r), &r, 0.1, material)
    }

    #[test]
    fn test_push_ignores_empty() {
        let mut list = BooleanGridList::new();
        list.push(BooleanGrid::nothing_there(0.1, "PLA"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_pairing_by_material() {
        let a: BooleanGridList = vec![rect_grid(0.0, 1.0, "PLA"), rect_grid(0.0, 1.0, "ABS")]
            .into_iter()
            .collect();
        let b: BooleanGridList = vec![rect_grid(0.5, 2.0, "PLA")].into_iter().collect();

        let u = a.union(&b);
        assert_eq!(u.len(), 2);
        assert_eq!(u.find("PLA").unwrap().pixel_count(), 200);

        let i = a.intersection(&b);
        assert_eq!(i.materials(), vec!["PLA"]);
        assert_eq!(i.pixel_count(), 50);

        let d = a.difference(&b);
        assert_eq!(d.find("PLA").unwrap().pixel_count(), 50);
        assert_eq!(d.find("ABS").unwrap().pixel_count(), 100);
    }

    #[test]
    fn test_hatch_skips_unknown_material() {
        let a: BooleanGridList = vec![rect_grid(0.0, 1.0, "PLA"), rect_grid(2.0, 3.0, "ABS")]
            .into_iter()
            .collect();
        let h = a.hatch(|m| if m == "PLA" { Some((0.0, 0.25)) } else { None }, false);
        assert!(!h.is_empty());
        assert!(h.iter().all(|p| p.material() == "PLA"));
    }

    #[test]
    fn test_bounds() {
        let a: BooleanGridList = vec![rect_grid(0.0, 1.0, "PLA"), rect_grid(2.0, 3.0, "ABS")]
            .into_iter()
            .collect();
        let b = a.bounds();
        assert!((b.x.low - 0.0).abs() < 1e-9);
        assert!((b.x.high - 3.0).abs() < 1e-9);
    }
}
