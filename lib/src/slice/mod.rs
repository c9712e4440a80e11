//! Slicing module - converts meshes into per-layer grids.
//!
//! This module contains the mesh side of the core:
//! - [`MeshObject`] / [`MeshPart`] - flat triangle buffers or analytic solids per material
//! - [`collect_edges`] - triangle-plane intersection into [`LineSegment`](crate::geometry::LineSegment)s
//! - [`stitch_segments`] - greedy reassembly of segments into closed polygons
//! - [`SliceCache`] - bounded ring of recent layer slices and supports
//! - [`ObjectSlicer`] - the [`SliceProvider`] that ties them together

mod cache;
mod edge_collector;
mod mesh;
mod slicer;
mod stitch;

pub use cache::SliceCache;
pub use edge_collector::{classify, collect_edges, cut_triangle};
pub use mesh::{scene_bounds, scene_height, BoundingBox3, MeshObject, MeshPart, Triangle};
pub use slicer::{ObjectSlicer, SliceProvider};
pub use stitch::stitch_segments;
