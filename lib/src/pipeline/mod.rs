//! Pipeline module - turns sliced objects into per-layer polygon lists.
//!
//! The [`LayerProducer`] walks machine layers bottom-up and, for each one,
//! emits a [`LayerOutput`] holding the perimeter and infill polygons the
//! G-code writer consumes:
//!
//! - **Foundation layers** get a raft: the footprint of the first model layer
//!   and its support, grown by a few extrusion widths, hatched at support
//!   spacing (solid on the layer touching the model)
//! - **Model layers** get perimeter shells (plus a brim on layer 0 without a
//!   raft), bridge/surface/sparse hatches from [`InFillPatterns`], the support
//!   hatch for the layer and, when enabled, the shield wall
//!
//! Support for layer `L` is built from the support of `L + 1`, so it is
//! computed once in a top-down pre-pass before the first layer is produced.
//! The pre-pass keeps only the hatched polygons, so the grid cache stays
//! bounded whatever the model height.
//!
//! # Example
//!
//! ```rust,ignore
//! use gridslice::pipeline::LayerProducer;
//!
//! let mut producer = LayerProducer::from_objects(objects, &settings)?;
//! for layer in producer.produce_all()? {
//!     writer.emit(&layer.perimeters, &layer.infill);
//! }
//! ```

mod layer_rules;

pub use layer_rules::LayerRules;

use crate::config::PrintSettings;
use crate::geometry::{PolygonList, Rectangle};
use crate::grid::BooleanGridList;
use crate::infill::InFillPatterns;
use crate::perimeter::PerimeterGenerator;
use crate::slice::{scene_bounds, MeshObject, ObjectSlicer, SliceProvider};
use crate::{CoordF, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Raft margin around the first layer, in extrusion widths.
const FOUNDATION_MARGIN_WIDTHS: CoordF = 4.0;

/// Everything printed on one machine layer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LayerOutput {
    pub machine_layer: i32,
    /// Negative on foundation layers.
    pub model_layer: i32,
    /// Nozzle height above the bed (mm).
    pub z: CoordF,
    pub perimeters: PolygonList,
    pub infill: PolygonList,
}

impl LayerOutput {
    pub fn is_empty(&self) -> bool {
        self.perimeters.is_empty() && self.infill.is_empty()
    }

    pub fn polygon_count(&self) -> usize {
        self.perimeters.len() + self.infill.len()
    }
}

/// Produces layers from a [`SliceProvider`].
pub struct LayerProducer<P: SliceProvider = ObjectSlicer> {
    provider: P,
    settings: PrintSettings,
    rules: LayerRules,
    xy_bounds: Rectangle,
    /// Support hatch per model layer, filled by the pre-pass.
    support: Vec<PolygonList>,
    foundation: BooleanGridList,
    prepared: bool,
}

impl LayerProducer<ObjectSlicer> {
    /// Validate the settings and objects and set up an [`ObjectSlicer`].
    ///
    /// Parts in a material no extruder prints are logged and left out.
    pub fn from_objects(objects: Vec<MeshObject>, settings: &PrintSettings) -> Result<Self> {
        settings.validate()?;
        let z_min = scene_bounds(&objects).map_or(0.0, |b| b.min.z);
        let slicer = ObjectSlicer::new(objects, settings)?;
        let xy_bounds = slicer.xy_bounds();
        Ok(Self::new(slicer, settings, xy_bounds, z_min))
    }
}

impl<P: SliceProvider> LayerProducer<P> {
    /// Producer over any slice source. `xy_bounds` is the extent of all
    /// objects, used for the shield; `z_min` is the bottom of the model.
    pub fn new(provider: P, settings: &PrintSettings, xy_bounds: Rectangle, z_min: CoordF) -> Self {
        let rules = LayerRules::new(settings, provider.layer_count(), z_min);
        Self {
            provider,
            settings: settings.clone(),
            rules,
            xy_bounds,
            support: Vec::new(),
            foundation: BooleanGridList::new(),
            prepared: false,
        }
    }

    pub fn rules(&self) -> &LayerRules {
        &self.rules
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Number of machine layers.
    pub fn layer_count(&self) -> i32 {
        self.rules.machine_layer_count()
    }

    /// Top-down pass computing support for every model layer and the
    /// foundation footprint. Runs once; [`produce_layer`](Self::produce_layer)
    /// calls it on first use.
    pub fn prepare(&mut self) -> Result<()> {
        if self.prepared {
            return Ok(());
        }
        self.prepared = true;

        let layers = self.rules.model_layer_count();
        let objects = self.provider.object_count();
        let infill = InFillPatterns::new(&self.settings);
        self.support = vec![PolygonList::new(); layers.max(0) as usize];

        let mut bottom_support = BooleanGridList::new();
        if self.settings.support_enabled {
            for layer in (0..layers).rev() {
                let mut hatch = PolygonList::new();
                for stl in 0..objects {
                    let support = self.settings.printable(self.provider.support(stl, layer)?);
                    hatch.append(infill.hatch_support(&support, layer, &self.rules));
                    if layer == 0 {
                        bottom_support = bottom_support.union(&support);
                    }
                }
                self.support[layer as usize] = hatch;
            }
        }

        if self.rules.foundation_layer_count() > 0 && layers > 0 {
            let settings = &self.settings;
            let mut footprint = bottom_support;
            for stl in 0..objects {
                for mut g in settings.printable(self.provider.slice(stl, 0)?).into_grids() {
                    g.set_material(settings.foundation_material(g.material()).to_string());
                    footprint.merge(g);
                }
            }
            self.foundation = footprint.offset(
                |m| FOUNDATION_MARGIN_WIDTHS * settings.width(m),
                settings.saddle_policy,
            );
        }
        info!(
            "Prepared {} model layers, {} foundation layers",
            layers,
            self.rules.foundation_layer_count()
        );
        Ok(())
    }

    /// Produce one machine layer. Layers are expected in ascending order so
    /// the slice cache keeps the neighbours infill looks at.
    pub fn produce_layer(&mut self, machine_layer: i32) -> Result<LayerOutput> {
        self.prepare()?;
        let mut out = LayerOutput {
            machine_layer,
            model_layer: self.rules.model_layer(machine_layer),
            z: self.rules.machine_z(machine_layer),
            ..Default::default()
        };
        if machine_layer < 0 || machine_layer >= self.rules.machine_layer_count() {
            return Ok(out);
        }

        let settings = &self.settings;
        let infill = InFillPatterns::new(settings);
        if self.rules.is_foundation(machine_layer) {
            out.infill = infill.hatch_foundation(&self.foundation, machine_layer, &self.rules);
        } else {
            let layer = out.model_layer;
            let perimeters = PerimeterGenerator::new(settings);
            for stl in 0..self.provider.object_count() {
                let slice = settings.printable(self.provider.slice(stl, layer)?);
                if layer == 0 && settings.raft_layers == 0 {
                    out.perimeters.append(perimeters.brim(&slice));
                }
                out.perimeters.append(perimeters.shells(&slice));
                let hatched =
                    infill.compute_hatched_polygons(&mut self.provider, stl, layer, &self.rules)?;
                out.infill.append(hatched.into_polygons());
            }
            if let Some(support) = self.support.get(layer as usize) {
                out.infill.append(support.clone());
            }
            if settings.shield_enabled {
                let material = settings.extruders.first().map_or("", |e| e.material.as_str());
                if let Some(shield) = perimeters.shield(&self.xy_bounds, material) {
                    out.perimeters.push(shield);
                }
            }
        }

        if settings.path_optimize {
            out.infill.radical_reorder(settings.link_up_factor * self.max_width());
        }
        debug!(
            "Layer {} (model {}, cut at {:.3}) at z = {:.3}: {} perimeters, {} infill paths",
            machine_layer,
            out.model_layer,
            self.rules.model_z(out.model_layer),
            out.z,
            out.perimeters.len(),
            out.infill.len()
        );
        Ok(out)
    }

    /// Produce every machine layer, bottom-up.
    pub fn produce_all(&mut self) -> Result<Vec<LayerOutput>> {
        (0..self.layer_count())
            .map(|layer| self.produce_layer(layer))
            .collect()
    }

    fn max_width(&self) -> CoordF {
        self.settings
            .extruders
            .iter()
            .map(|e| e.width())
            .fold(0.0, CoordF::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtruderSettings;
    use crate::geometry::{Point2D, Point3D};
    use crate::slice::MeshPart;

    fn settings() -> PrintSettings {
        PrintSettings::default().pixel_size(0.1)
    }

    fn cube(size: CoordF) -> Vec<MeshObject> {
        vec![MeshObject::new(
            "cube",
            vec![MeshPart::cuboid(
                "PLA",
                Point3D::new(0.0, 0.0, 0.0),
                Point3D::new(size, size, size),
            )],
        )]
    }

    #[test]
    fn test_cube_layers() {
        let settings = settings().fill_density(0.5);
        let mut producer = LayerProducer::from_objects(cube(3.0), &settings).unwrap();
        let layers = producer.produce_all().unwrap();
        assert_eq!(layers.len(), 15);
        for (i, layer) in layers.iter().enumerate() {
            assert_eq!(layer.machine_layer, i as i32);
            assert_eq!(layer.model_layer, i as i32);
            assert_eq!(layer.perimeters.len(), 2);
            assert!(layer.perimeters.iter().all(|p| p.is_closed()));
            assert!(!layer.infill.is_empty());
        }
        assert!((layers[14].z - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_raft_under_cube() {
        let settings = settings().raft_layers(2).brim_lines(3);
        let mut producer = LayerProducer::from_objects(cube(2.0), &settings).unwrap();
        assert_eq!(producer.layer_count(), 12);
        let raft = producer.produce_layer(0).unwrap();
        assert_eq!(raft.model_layer, -2);
        assert!(raft.perimeters.is_empty());
        assert!(!raft.infill.is_empty());
        // The raft reaches past the model
        assert!(raft.infill.bbox().x.low < -1.0);

        // No brim on top of a raft
        let first = producer.produce_layer(2).unwrap();
        assert_eq!(first.perimeters.len(), 2);
    }

    #[test]
    fn test_brim_and_shield() {
        let settings = settings().brim_lines(2).shield(true);
        let mut producer = LayerProducer::from_objects(cube(2.0), &settings).unwrap();
        let first = producer.produce_layer(0).unwrap();
        // Brim, shells, shield
        assert_eq!(first.perimeters.len(), 5);
        let second = producer.produce_layer(1).unwrap();
        assert_eq!(second.perimeters.len(), 3);
        let shield = second.perimeters.get(2).bbox();
        assert!((shield.x.low + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_support_hatched_under_overhang() {
        let top = MeshPart::cuboid("PLA", Point3D::new(0.0, 0.0, 2.0), Point3D::new(6.0, 6.0, 3.0));
        let post = MeshPart::cuboid("PLA", Point3D::new(2.5, 2.5, 0.0), Point3D::new(3.5, 3.5, 2.0));
        let settings = settings().support(true).extruders(vec![
            ExtruderSettings::new("PLA").support_material("PVA"),
            ExtruderSettings::new("PVA"),
        ]);
        let objects = vec![MeshObject::new("table", vec![top, post])];
        let mut producer = LayerProducer::from_objects(objects, &settings).unwrap();
        let layer = producer.produce_layer(3).unwrap();
        let support = layer.infill.filter_material("PVA");
        assert!(!support.is_empty());
        // Support keeps clear of the post
        for line in support.iter() {
            for p in line.points() {
                assert!(p.distance(&Point2D::new(3.0, 3.0)) > 0.5);
            }
        }
        // Nothing above the table top needs support
        let top_layer = producer.produce_layer(14).unwrap();
        assert!(top_layer.infill.filter_material("PVA").is_empty());
    }

    #[test]
    fn test_unknown_material_skipped() {
        let objects = vec![MeshObject::new(
            "mixed",
            vec![
                MeshPart::cuboid("PLA", Point3D::new(0.0, 0.0, 0.0), Point3D::new(3.0, 3.0, 1.0)),
                MeshPart::cuboid("ABS", Point3D::new(5.0, 0.0, 0.0), Point3D::new(8.0, 3.0, 1.0)),
            ],
        )];
        let mut producer = LayerProducer::from_objects(objects, &settings()).unwrap();
        let layers = producer.produce_all().unwrap();
        assert_eq!(layers.len(), 5);
        for layer in &layers {
            // Both shells of the PLA block, nothing of the ABS one
            assert_eq!(layer.perimeters.len(), 2);
            assert!(layer.perimeters.iter().all(|p| p.material() == "PLA"));
            assert!(layer.infill.iter().all(|p| p.material() == "PLA"));
            assert!(layer.infill.bbox().is_empty() || layer.infill.bbox().x.high < 4.0);
        }
        assert!(!layers[0].infill.is_empty());
    }

    #[test]
    fn test_out_of_range_layer_is_empty() {
        let mut producer = LayerProducer::from_objects(cube(1.0), &settings()).unwrap();
        assert!(producer.produce_layer(-1).unwrap().is_empty());
        assert!(producer.produce_layer(100).unwrap().is_empty());
    }
}
