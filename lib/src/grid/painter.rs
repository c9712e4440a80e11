//! Quad-tree rasterisation of CSG expressions.
//!
//! Each cell is tested against the expression with interval arithmetic over
//! the rectangle spanned by its pixel centres. A cell the expression is
//! uniformly inside of is filled, one it is uniformly outside of is skipped,
//! and anything else is split into up to four quadrants with the expression
//! pruned to that cell first. Single pixels are decided by their centre.

use super::boolean_grid::BooleanGrid;
use super::integer::{IntPoint, IntRectangle};
use crate::csg::Csg2D;

/// Paint every pixel of `grid` whose centre is inside `csg`.
pub(crate) fn paint(grid: &mut BooleanGrid, csg: &Csg2D) {
    let rect = *grid.rect();
    paint_cell(grid, csg, rect);
}

fn paint_cell(grid: &mut BooleanGrid, csg: &Csg2D, cell: IntRectangle) {
    if cell.is_empty() {
        return;
    }
    let pixel_size = grid.pixel_size();

    if cell.width == 1 && cell.height == 1 {
        if csg.inside(&cell.sw.centre(pixel_size)) {
            grid.set(cell.sw, true);
        }
        return;
    }

    let pruned = csg.prune(&cell.centres(pixel_size));
    match pruned {
        Csg2D::Nothing => {}
        Csg2D::Universe => grid.fill(&cell, true),
        _ => {
            let hw = cell.width / 2;
            let hh = cell.height / 2;
            let quads = [
                IntRectangle::new(cell.sw, hw, hh),
                IntRectangle::new(IntPoint::new(cell.sw.x + hw, cell.sw.y), cell.width - hw, hh),
                IntRectangle::new(IntPoint::new(cell.sw.x, cell.sw.y + hh), hw, cell.height - hh),
                IntRectangle::new(
                    IntPoint::new(cell.sw.x + hw, cell.sw.y + hh),
                    cell.width - hw,
                    cell.height - hh,
                ),
            ];
            for q in quads {
                paint_cell(grid, &pruned, q);
            }
        }
    }
}
