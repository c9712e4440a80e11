//! Rasterised shapes.
//!
//! Exact CSG expressions are turned into [`BooleanGrid`] bitmaps at a fixed
//! pixel size, combined with cheap bitwise boolean operations, offset by
//! stamping, and turned back into polygons by marching squares or into infill
//! by hatching.
//!
//! ## Lattice
//!
//! Every grid lives on the same lattice anchored at the world origin (see
//! [`integer`]), so grids from different layers and objects can be combined
//! without resampling.
//!
//! ## Submodules
//!
//! - `integer` - pixel-space points, rectangles and contour loops
//! - `boolean_grid` - the bitmap type, components and statistics
//! - `painter` - quad-tree rasterisation of [`Csg2D`](crate::csg::Csg2D)
//! - `walker` - marching squares
//! - `math` - union, intersection, difference
//! - `offset` - dilation and erosion
//! - `hatch` - parallel infill lines
//! - `list` - per-material grid lists

mod boolean_grid;
mod hatch;
pub mod integer;
mod list;
mod math;
mod offset;
mod painter;
mod walker;

pub use boolean_grid::BooleanGrid;
pub use integer::{IntPoint, IntPolygon, IntRectangle};
pub use list::BooleanGridList;
pub use walker::SaddlePolicy;
