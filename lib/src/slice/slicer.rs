//! Per-object, per-layer slices backed by the slice cache.

use super::cache::SliceCache;
use super::edge_collector::collect_edges;
use super::mesh::{scene_bounds, MeshObject, MeshPart};
use super::stitch::stitch_segments;
use crate::config::PrintSettings;
use crate::csg::polygons_to_csg;
use crate::geometry::{Polygon, Rectangle};
use crate::grid::{BooleanGrid, BooleanGridList};
use crate::{CoordF, Result};
use log::{debug, trace};

/// Source of layer slices and supports for the infill and layer code.
///
/// Layers are numbered from 0 at the bottom of the model. Layers outside
/// `0..layer_count()` are empty.
pub trait SliceProvider {
    fn object_count(&self) -> usize;

    fn layer_count(&self) -> i32;

    /// Cross-section of object `stl` at model layer `layer`, one grid per
    /// material.
    fn slice(&mut self, stl: usize, layer: i32) -> Result<BooleanGridList>;

    /// Support needed under object `stl` at model layer `layer`, one grid per
    /// support material.
    fn support(&mut self, stl: usize, layer: i32) -> Result<BooleanGridList>;
}

/// Slices a set of mesh objects layer by layer.
pub struct ObjectSlicer {
    objects: Vec<MeshObject>,
    settings: PrintSettings,
    cache: SliceCache,
    z_min: CoordF,
    layer_count: i32,
    xy_bounds: Rectangle,
}

impl ObjectSlicer {
    /// Validate the objects and prepare an empty cache.
    pub fn new(objects: Vec<MeshObject>, settings: &PrintSettings) -> Result<Self> {
        for o in &objects {
            o.validate()?;
        }
        let (z_min, height, xy_bounds) = match scene_bounds(&objects) {
            Some(b) => (b.min.z, b.max.z - b.min.z, b.xy()),
            None => (0.0, 0.0, Rectangle::empty()),
        };
        let layer_count = (height / settings.layer_height).ceil().max(0.0) as i32;
        debug!(
            "Slicing {} objects, {} layers from z = {:.3}",
            objects.len(),
            layer_count,
            z_min
        );
        Ok(Self {
            cache: SliceCache::new(settings.cache_ring_size, objects.len()),
            objects,
            settings: settings.clone(),
            z_min,
            layer_count,
            xy_bounds,
        })
    }

    pub fn objects(&self) -> &[MeshObject] {
        &self.objects
    }

    pub fn settings(&self) -> &PrintSettings {
        &self.settings
    }

    /// XY extent of every object.
    pub fn xy_bounds(&self) -> Rectangle {
        self.xy_bounds
    }

    /// Cutting height of a model layer: the middle of the layer.
    pub fn z_for_layer(&self, layer: i32) -> CoordF {
        self.z_min + (layer as CoordF + 0.5) * self.settings.layer_height
    }

    fn slice_part(&self, part: &MeshPart, z: CoordF) -> Result<Option<BooleanGrid>> {
        let pixel_size = self.settings.resolved_pixel_size();
        let Some(bounds) = part.bounds() else {
            return Ok(None);
        };
        if z < bounds.min.z || z > bounds.max.z {
            return Ok(None);
        }
        let area = bounds.xy().offset(pixel_size);

        if let Some(solid) = &part.solid {
            let csg = solid.slice(z);
            return Ok(Some(BooleanGrid::from_csg(&csg, &area, pixel_size, part.material.clone())));
        }

        let edges = collect_edges(part, z)?;
        let polygons: Vec<Polygon> = stitch_segments(&edges);
        trace!(
            "{} at z = {:.3}: {} edges, {} polygons",
            part.material,
            z,
            edges.len(),
            polygons.len()
        );
        if polygons.is_empty() {
            return Ok(None);
        }
        let csg = polygons_to_csg(&polygons)?;
        Ok(Some(BooleanGrid::from_csg(&csg, &area, pixel_size, part.material.clone())))
    }

    fn compute_slice(&self, stl: usize, layer: i32) -> Result<BooleanGridList> {
        let mut list = BooleanGridList::new();
        if layer < 0 || layer >= self.layer_count {
            return Ok(list);
        }
        let z = self.z_for_layer(layer);
        for part in &self.objects[stl].parts {
            if let Some(grid) = self.slice_part(part, z)? {
                list.merge(grid);
            }
        }
        Ok(self.settings.printable(list))
    }

    /// Support for one layer given the support of the layer above.
    fn compute_support(
        &mut self,
        stl: usize,
        layer: i32,
        above_support: &BooleanGridList,
    ) -> Result<BooleanGridList> {
        let above = self.slice(stl, layer + 1)?;
        let current = self.slice(stl, layer)?;

        let mut needed = above_support.clone();
        for g in above.iter() {
            if let Some(support) = self.settings.support_material(g.material()) {
                let mut g = g.clone();
                g.set_material(support);
                needed.merge(g);
            }
        }
        if needed.is_empty() {
            return Ok(needed);
        }

        // Keep a gap of one extrusion width around the model
        let settings = &self.settings;
        let keep_out = current.offset(|m| settings.width(m), settings.saddle_policy);
        let mut result = BooleanGridList::new();
        for g in needed.iter() {
            let mut kept = g.clone();
            for k in keep_out.iter() {
                let mut k = k.clone();
                k.set_material(g.material());
                kept = kept.difference(&k);
            }
            result.push(kept);
        }
        Ok(result)
    }
}

impl SliceProvider for ObjectSlicer {
    fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn layer_count(&self) -> i32 {
        self.layer_count
    }

    fn slice(&mut self, stl: usize, layer: i32) -> Result<BooleanGridList> {
        if stl >= self.objects.len() {
            return Ok(BooleanGridList::new());
        }
        if let Some(cached) = self.cache.get_slice(layer, stl) {
            return Ok(cached.clone());
        }
        let list = self.compute_slice(stl, layer)?;
        self.cache.set_slice(list.clone(), layer, stl);
        Ok(list)
    }

    fn support(&mut self, stl: usize, layer: i32) -> Result<BooleanGridList> {
        if !self.settings.support_enabled
            || stl >= self.objects.len()
            || layer < 0
            || layer >= self.layer_count
        {
            return Ok(BooleanGridList::new());
        }
        if let Some(cached) = self.cache.get_support(layer, stl) {
            return Ok(cached.clone());
        }

        // Walk up to the nearest cached support (or the top), then back down
        let mut top = layer + 1;
        let mut above = BooleanGridList::new();
        while top < self.layer_count {
            if let Some(cached) = self.cache.get_support(top, stl) {
                above = cached.clone();
                break;
            }
            top += 1;
        }
        if top - layer > 1 {
            trace!("Support for layer {} computed from layer {} down", layer, top);
        }
        for l in (layer..top).rev() {
            let support = self.compute_support(stl, l, &above)?;
            self.cache.set_support(support.clone(), l, stl);
            above = support;
        }
        Ok(above)
    }
}
