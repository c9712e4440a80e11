//! # Gridslice
//!
//! The geometry core of a layer slicer for additive manufacturing.
//!
//! This library turns triangle meshes (or analytic solids) into per-layer
//! polygon lists ready for a G-code writer:
//! - Plane intersection of triangle buffers and fragment stitching
//! - Exact CSG expressions over half-planes, rasterised by a quad-tree painter
//! - Bitmap shapes with boolean algebra, offsetting and marching-squares contours
//! - Perimeter shells, surface/sparse/bridge/support hatching, rafts and brims
//! - A bounded ring cache of layer slices for look-ahead and look-behind
//!
//! ## Example
//!
//! ```rust,ignore
//! use gridslice::{LayerProducer, MeshObject, MeshPart, PrintSettings};
//!
//! let part = MeshPart::cuboid("PLA", Point3D::new(0.0, 0.0, 0.0), Point3D::new(20.0, 20.0, 10.0));
//! let objects = vec![MeshObject::new("block", vec![part])];
//! let mut producer = LayerProducer::from_objects(objects, &PrintSettings::default())?;
//! let layers = producer.produce_all()?;
//! ```

// Core modules
pub mod bridge;
pub mod config;
pub mod csg;
pub mod geometry;
pub mod grid;
pub mod infill;
pub mod perimeter;
pub mod pipeline;
pub mod slice;

// Re-export commonly used types
pub use config::{ExtruderSettings, FillPattern, PrintSettings};
pub use csg::{Csg2D, Csg3D, HalfSpace};
pub use geometry::{
    HalfPlane, Interval, Line, LineSegment, Point2D, Point3D, Polygon, PolygonList, Rectangle,
};
pub use grid::{BooleanGrid, BooleanGridList, IntPoint, IntPolygon, IntRectangle, SaddlePolicy};

// Re-export slicing
pub use slice::{
    scene_bounds, BoundingBox3, MeshObject, MeshPart, ObjectSlicer, SliceCache, SliceProvider,
    Triangle,
};

// Re-export layer production
pub use bridge::{detect_bridges, Bridge, BridgeConfig};
pub use infill::{HatchedLayer, InFillPatterns};
pub use perimeter::PerimeterGenerator;
pub use pipeline::{LayerOutput, LayerProducer, LayerRules};

/// Floating-point coordinate type (millimetres).
pub type CoordF = f64;

/// Result type used throughout the slicer.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for slicer operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Mesh error: {0}")]
    Mesh(String),

    #[error("Slicing error: {0}")]
    Slicing(String),

    #[error("Invalid geometry: {0}")]
    Geometry(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Material error: {0}")]
    Material(String),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
