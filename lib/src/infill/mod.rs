//! Infill pattern generation module.
//!
//! Decides, per object and layer, which parts of a slice get which kind of
//! hatch, and hatches them.
//!
//! # Algorithm
//!
//! 1. Take `N` surface layers (the largest count of any material present)
//! 2. `above` is what stays solid through the `N` layers above, `below`
//!    likewise; `nothing_above` and `nothing_below` are the slice minus those
//! 3. `insides` is the slice minus both nothing-sets and gets sparse infill;
//!    `surfaces` is their union and gets solid infill
//! 4. Parts of `nothing_below` with no support material are bridges
//!    ([`crate::bridge`]) landing on the rest of the slice; their footprints
//!    come out of both `insides` and `surfaces` and are hatched along their
//!    own direction
//! 5. Everything is clipped to the infill region inside the perimeters
//!
//! # Spacing
//!
//! | Region | Spacing | Angle |
//! |---|---|---|
//! | Surface, bridge | extrusion width | layer angle / bridge angle |
//! | Sparse | width ÷ fill density | layer angle |
//! | Support | `support_spacing` | support angle |

use crate::bridge::{detect_bridges, Bridge, BridgeConfig};
use crate::config::PrintSettings;
use crate::geometry::PolygonList;
use crate::grid::{BooleanGrid, BooleanGridList};
use crate::perimeter::PerimeterGenerator;
use crate::pipeline::LayerRules;
use crate::slice::SliceProvider;
use crate::Result;
use log::debug;

/// Regions and hatches of one object on one layer.
#[derive(Debug, Clone, Default)]
pub struct HatchedLayer {
    /// Solid-infill region, bridges removed.
    pub surfaces: BooleanGridList,
    /// Sparse-infill region, bridges removed.
    pub insides: BooleanGridList,
    pub bridges: Vec<Bridge>,
    pub bridge_hatch: PolygonList,
    pub surface_hatch: PolygonList,
    pub sparse_hatch: PolygonList,
}

impl HatchedLayer {
    pub fn is_empty(&self) -> bool {
        self.bridge_hatch.is_empty() && self.surface_hatch.is_empty() && self.sparse_hatch.is_empty()
    }

    /// All hatches in print order: bridges first, while the layer below is
    /// freshest, then surfaces, then sparse infill.
    pub fn into_polygons(self) -> PolygonList {
        let mut result = self.bridge_hatch;
        result.append(self.surface_hatch);
        result.append(self.sparse_hatch);
        result
    }
}

/// Infill planner for a set of print settings.
#[derive(Debug, Clone, Copy)]
pub struct InFillPatterns<'a> {
    settings: &'a PrintSettings,
}

impl<'a> InFillPatterns<'a> {
    pub fn new(settings: &'a PrintSettings) -> Self {
        Self { settings }
    }

    /// Number of surface layers for a slice: the largest over the materials
    /// in it, or 1 for an empty slice.
    pub fn surface_layers(&self, slice: &BooleanGridList) -> i32 {
        slice
            .iter()
            .map(|g| self.settings.surface_layers(g.material()) as i32)
            .max()
            .unwrap_or(1)
    }

    /// Split a layer of object `stl` into bridge, surface and sparse regions
    /// and hatch them.
    pub fn compute_hatched_polygons<P>(
        &self,
        provider: &mut P,
        stl: usize,
        layer: i32,
        rules: &LayerRules,
    ) -> Result<HatchedLayer>
    where
        P: SliceProvider + ?Sized,
    {
        let settings = self.settings;
        let slice = settings.printable(provider.slice(stl, layer)?);
        if slice.is_empty() {
            return Ok(HatchedLayer::default());
        }

        let n = self.surface_layers(&slice);
        let mut above = slice.clone();
        let mut below = slice.clone();
        for k in 1..=n {
            above = above.intersection(&provider.slice(stl, layer + k)?);
            below = below.intersection(&provider.slice(stl, layer - k)?);
        }
        let nothing_above = slice.difference(&above);
        let nothing_below = slice.difference(&below);
        let mut insides = slice.difference(&nothing_above).difference(&nothing_below);
        let mut surfaces = nothing_above.union(&nothing_below);

        // Model layer 0 sits on the bed or the raft
        let bridges = if layer > 0 {
            self.find_bridges(&slice, &nothing_below)
        } else {
            Vec::new()
        };
        if !bridges.is_empty() {
            let mut footprints = BooleanGridList::new();
            for b in &bridges {
                footprints.merge(b.footprint.clone());
            }
            insides = insides.difference(&footprints);
            surfaces = surfaces.difference(&footprints);
        }

        let region = PerimeterGenerator::new(settings).infill_region(&slice);
        let angle = rules.fill_angle(layer);
        let stagger = rules.stagger(layer);

        let mut bridge_hatch = PolygonList::new();
        for b in &bridges {
            if let Some(r) = region.find(b.footprint.material()) {
                let width = settings.width(b.footprint.material());
                bridge_hatch.append(b.footprint.intersection(r).hatch(b.angle, width, false));
            }
        }
        let surface_hatch = surfaces
            .intersection(&region)
            .hatch(|m| Some((angle, settings.width(m))), stagger);
        let sparse_hatch = insides
            .intersection(&region)
            .hatch(|m| Some((angle, settings.width(m) / settings.fill_density)), stagger);

        debug!(
            "Object {} layer {}: {} surface layers, {} bridges, {} surface / {} sparse hatches",
            stl,
            layer,
            n,
            bridges.len(),
            surface_hatch.len(),
            sparse_hatch.len()
        );
        Ok(HatchedLayer {
            surfaces,
            insides,
            bridges,
            bridge_hatch,
            surface_hatch,
            sparse_hatch,
        })
    }

    /// Bridges over the `unsupported` part of `slice`, for materials that do
    /// not get support. The rest of the slice is where they land.
    fn find_bridges(&self, slice: &BooleanGridList, unsupported: &BooleanGridList) -> Vec<Bridge> {
        let supported = slice.difference(unsupported);
        let mut bridges = Vec::new();
        for g in unsupported.iter() {
            let material = g.material();
            if self.settings.support_material(material).is_some() {
                continue;
            }
            let Some(layer_grid) = slice.find(material) else {
                continue;
            };
            let nothing = BooleanGrid::nothing_there(g.pixel_size(), material);
            let landing = supported.find(material).unwrap_or(&nothing);
            let config = BridgeConfig::from_settings(self.settings, material);
            bridges.extend(detect_bridges(g, landing, layer_grid, &config));
        }
        bridges
    }

    /// Hatch the support of one layer.
    pub fn hatch_support(&self, support: &BooleanGridList, layer: i32, rules: &LayerRules) -> PolygonList {
        let angle = rules.support_angle(layer);
        let spacing = self.settings.support_spacing;
        support.hatch(|_| Some((angle, spacing)), false)
    }

    /// Hatch a foundation layer. The layer touching the model is solid so the
    /// model has a flat base; lower layers use support spacing.
    pub fn hatch_foundation(
        &self,
        footprint: &BooleanGridList,
        machine_layer: i32,
        rules: &LayerRules,
    ) -> PolygonList {
        let settings = self.settings;
        let angle = rules.foundation_angle(machine_layer);
        let top = machine_layer == rules.foundation_layer_count() - 1;
        footprint.hatch(
            |m| {
                let spacing = if top { settings.width(m) } else { settings.support_spacing };
                Some((angle, spacing))
            },
            false,
        )
    }
}
