//! Perimeter generation module.
//!
//! Perimeters are the outlines that define the shape of each layer. They are
//! taken from the slice grids by offsetting inward and walking the contours
//! of the result:
//!
//! - Shell `i` (counting from the outside) is the contour of the slice shrunk
//!   by `(i + 0.5) × width`, so the outer edge of the outer bead sits on the
//!   slice boundary
//! - The region left for infill is the slice shrunk by
//!   `shells × width - infill_overlap`, so infill overlaps the inner shell
//!
//! Brims and shields are also outlines, so they are built here too.

use crate::config::PrintSettings;
use crate::geometry::{Point2D, Polygon, PolygonList, Rectangle};
use crate::grid::BooleanGridList;
use crate::CoordF;
use log::trace;

/// Builds outlines from slice grids.
#[derive(Debug, Clone, Copy)]
pub struct PerimeterGenerator<'a> {
    settings: &'a PrintSettings,
}

impl<'a> PerimeterGenerator<'a> {
    pub fn new(settings: &'a PrintSettings) -> Self {
        Self { settings }
    }

    /// Perimeter shells of a slice, outermost first.
    ///
    /// Stops early once a shell vanishes, so thin features get fewer shells.
    pub fn shells(&self, slice: &BooleanGridList) -> PolygonList {
        let settings = self.settings;
        let mut result = PolygonList::new();
        for i in 0..settings.vertical_shells {
            let k = i as CoordF + 0.5;
            let shrunk = slice.offset(|m| -k * settings.width(m), settings.saddle_policy);
            let outlines = shrunk.all_perimeters(settings.saddle_policy);
            if outlines.is_empty() {
                trace!("Shell {} vanished", i);
                break;
            }
            result.append(self.compensate(outlines));
        }
        result
    }

    /// The part of a slice left for infill inside the shells.
    pub fn infill_region(&self, slice: &BooleanGridList) -> BooleanGridList {
        let settings = self.settings;
        if settings.vertical_shells == 0 {
            return slice.clone();
        }
        let shells = settings.vertical_shells as CoordF;
        slice.offset(
            |m| -(shells * settings.width(m) - settings.infill_overlap),
            settings.saddle_policy,
        )
    }

    /// Brim outlines around a slice, outermost first.
    pub fn brim(&self, slice: &BooleanGridList) -> PolygonList {
        let settings = self.settings;
        let mut rings = Vec::new();
        for i in 0..settings.brim_lines {
            let k = i as CoordF + 0.5;
            let grown = slice.offset(|m| k * settings.width(m), settings.saddle_policy);
            rings.push(grown.all_perimeters(settings.saddle_policy));
        }
        let mut result = PolygonList::new();
        for ring in rings.into_iter().rev() {
            result.append(ring);
        }
        result
    }

    /// Closed rectangular wall `shield_gap` outside `bounds`.
    pub fn shield(&self, bounds: &Rectangle, material: &str) -> Option<Polygon> {
        if bounds.is_empty() {
            return None;
        }
        let r = bounds.offset(self.settings.shield_gap);
        let (sw, ne) = (r.sw(), r.ne());
        Some(Polygon::from_points(
            vec![
                sw,
                Point2D::new(ne.x, sw.y),
                ne,
                Point2D::new(sw.x, ne.y),
            ],
            material,
            true,
        ))
    }

    fn compensate(&self, outlines: PolygonList) -> PolygonList {
        let settings = self.settings;
        if settings.arc_compensation_factor <= 0.0 {
            return outlines;
        }
        outlines
            .iter()
            .map(|p| {
                p.arc_compensate(
                    settings.arc_compensation_factor,
                    settings.width(p.material()),
                    settings.arc_short_sides,
                )
            })
            .collect()
    }
}
