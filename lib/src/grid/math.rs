//! Boolean algebra on grids.
//!
//! All operations return new grids. When both operands share a rectangle the
//! bitsets are combined a word at a time; otherwise the result rectangle is
//! chosen first (union for union, intersection for intersection, the left
//! operand's for difference) and pixels are combined individually.
//!
//! The result carries the left operand's material. Combining grids of
//! different materials is logged as an error but still performed.

use super::boolean_grid::BooleanGrid;
use log::error;

impl BooleanGrid {
    fn check_material(&self, other: &BooleanGrid, op: &str) {
        if self.material() != other.material() && !self.rect().is_empty() && !other.rect().is_empty() {
            error!(
                "{} of grids with different materials: {} and {}",
                op,
                self.material(),
                other.material()
            );
        }
    }

    /// Pixels set in either grid.
    pub fn union(&self, other: &BooleanGrid) -> BooleanGrid {
        if self.rect().is_empty() {
            return other.clone();
        }
        if other.rect().is_empty() {
            return self.clone();
        }
        self.check_material(other, "Union");

        if self.rect() == other.rect() {
            let mut out = self.clone();
            for (w, o) in out.words_mut().iter_mut().zip(other.words()) {
                *w |= *o;
            }
            return out;
        }

        let mut out = self.resized(self.rect().union(other.rect()));
        for p in other.set_pixels() {
            out.set(p, true);
        }
        out
    }

    /// Pixels set in both grids.
    pub fn intersection(&self, other: &BooleanGrid) -> BooleanGrid {
        self.check_material(other, "Intersection");
        let rect = self.rect().intersection(other.rect());
        if rect.is_empty() {
            return BooleanGrid::nothing_there(self.pixel_size(), self.material());
        }

        if self.rect() == other.rect() {
            let mut out = self.clone();
            for (w, o) in out.words_mut().iter_mut().zip(other.words()) {
                *w &= *o;
            }
            return out;
        }

        let mut out = self.resized(rect);
        for p in rect.pixels() {
            if !other.get(p) {
                out.set(p, false);
            }
        }
        out
    }

    /// Pixels set in `self` but not in `other`.
    pub fn difference(&self, other: &BooleanGrid) -> BooleanGrid {
        if self.rect().is_empty() || other.rect().is_empty() {
            return self.clone();
        }
        self.check_material(other, "Difference");

        if self.rect() == other.rect() {
            let mut out = self.clone();
            for (w, o) in out.words_mut().iter_mut().zip(other.words()) {
                *w &= !*o;
            }
            return out;
        }

        let mut out = self.clone();
        for p in self.rect().intersection(other.rect()).pixels() {
            if other.get(p) {
                out.set(p, false);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::csg::Csg2D;
    use crate::geometry::{Point2D, Rectangle};
    use crate::grid::BooleanGrid;

    fn rect_grid(x0: f64, y0: f64, x1: f64, y1: f64, material: &str) -> BooleanGrid {
        let r = Rectangle::new(Point2D::new(x0, y0), Point2D::new(x1, y1));
        BooleanGrid::from_csg(&Csg2D::rectangle(&r), &r, 0.1, material)
    }

    #[test]
    fn test_union_superset() {
        let a = rect_grid(0.0, 0.0, 1.0, 1.0, "PLA");
        let b = rect_grid(0.5, 0.5, 2.0, 2.0, "PLA");
        let u = a.union(&b);
        assert!(a.set_pixels().all(|p| u.get(p)));
        assert!(b.set_pixels().all(|p| u.get(p)));
        assert_eq!(u.pixel_count(), 100 + 225 - 25);
    }

    #[test]
    fn test_intersection_subset() {
        let a = rect_grid(0.0, 0.0, 1.0, 1.0, "PLA");
        let b = rect_grid(0.5, 0.5, 2.0, 2.0, "PLA");
        let i = a.intersection(&b);
        assert!(i.set_pixels().all(|p| a.get(p) && b.get(p)));
        assert_eq!(i.pixel_count(), 25);
    }

    #[test]
    fn test_difference_excludes_other() {
        let a = rect_grid(0.0, 0.0, 1.0, 1.0, "PLA");
        let b = rect_grid(0.5, 0.5, 2.0, 2.0, "PLA");
        let d = a.difference(&b);
        assert!(d.set_pixels().all(|p| !b.get(p)));
        assert_eq!(d.pixel_count(), 75);
        assert_eq!(d.rect(), a.rect());
    }

    #[test]
    fn test_same_rectangle_fast_path() {
        let a = rect_grid(0.0, 0.0, 1.0, 1.0, "PLA");
        assert_eq!(a.union(&a).pixel_count(), 100);
        assert_eq!(a.intersection(&a).pixel_count(), 100);
        assert!(a.difference(&a).is_empty());
    }

    #[test]
    fn test_nothing_there_identity() {
        let a = rect_grid(0.0, 0.0, 1.0, 1.0, "PLA");
        let n = BooleanGrid::nothing_there(0.1, "PLA");
        assert_eq!(a.union(&n).pixel_count(), a.pixel_count());
        assert_eq!(n.union(&a).pixel_count(), a.pixel_count());
        assert_eq!(a.difference(&n).pixel_count(), a.pixel_count());
        assert!(a.intersection(&n).is_empty());
    }

    #[test]
    fn test_material_mismatch_proceeds() {
        let a = rect_grid(0.0, 0.0, 1.0, 1.0, "PLA");
        let b = rect_grid(0.0, 0.0, 1.0, 1.0, "ABS");
        let u = a.union(&b);
        assert_eq!(u.material(), "PLA");
        assert_eq!(u.pixel_count(), 100);
    }
}
