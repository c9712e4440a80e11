//! Print settings types.
//!
//! [`PrintSettings`] holds everything the slicing core reads: layer geometry,
//! raster resolution, infill, support, adhesion and path options. Each
//! material is printed by the extruder whose [`ExtruderSettings`] names it.

use crate::grid::{BooleanGridList, SaddlePolicy};
use crate::{CoordF, Error, Result};
use log::error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of the machine resolution used as the default pixel size.
const PIXEL_SIZE_FACTOR: CoordF = 0.6;

/// Hatch direction behaviour across layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPattern {
    /// Direction turns by 90° on every other layer.
    #[default]
    Rectilinear,
    /// Direction stays fixed.
    Linear,
}

/// Settings for one extruder and the material it prints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtruderSettings {
    /// Material name; mesh parts are matched to extruders by it.
    pub material: String,
    /// Nozzle diameter (mm), used as the extrusion width.
    pub nozzle_diameter: CoordF,
    /// Solid layers under a top and over a bottom surface. Falls back to
    /// [`PrintSettings::horizontal_shells`] when unset.
    pub surface_layers: Option<u32>,
    /// Material that prints this material's supports. No support is
    /// generated for materials without one, and their unsupported regions
    /// are bridged instead.
    pub support_material: Option<String>,
    /// Retraction length (mm).
    pub retraction: CoordF,
    /// Z lift on travel (mm).
    pub lift: CoordF,
    /// Extrusion rate multiplier.
    pub extrusion_ratio: CoordF,
}

impl ExtruderSettings {
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            ..Self::default()
        }
    }

    pub fn nozzle_diameter(mut self, diameter: CoordF) -> Self {
        self.nozzle_diameter = diameter;
        self
    }

    pub fn surface_layers(mut self, layers: u32) -> Self {
        self.surface_layers = Some(layers);
        self
    }

    pub fn support_material(mut self, material: impl Into<String>) -> Self {
        self.support_material = Some(material.into());
        self
    }

    /// Extrusion width (mm).
    #[inline]
    pub fn width(&self) -> CoordF {
        self.nozzle_diameter
    }
}

impl Default for ExtruderSettings {
    fn default() -> Self {
        Self {
            material: "PLA".into(),
            nozzle_diameter: 0.4,
            surface_layers: None,
            support_material: None,
            retraction: 1.0,
            lift: 0.0,
            extrusion_ratio: 1.0,
        }
    }
}

/// Global print settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintSettings {
    // === Layers ===
    /// Layer height (mm).
    pub layer_height: CoordF,
    /// Smallest meaningful feature of the machine (mm).
    pub machine_resolution: CoordF,
    /// Raster pixel size (mm); `machine_resolution × 0.6` when unset.
    pub pixel_size: Option<CoordF>,
    /// Default number of solid surface layers.
    pub horizontal_shells: u32,
    /// Number of perimeter outlines.
    pub vertical_shells: u32,

    // === Infill ===
    /// Sparse infill density (0, 1].
    pub fill_density: CoordF,
    pub fill_pattern: FillPattern,
    /// Base infill angle (degrees).
    pub fill_angle: CoordF,
    /// Shift hatches by half a spacing on alternate layer pairs.
    pub stagger_hatches: bool,
    /// Overlap of infill onto the innermost perimeter (mm).
    pub infill_overlap: CoordF,
    pub perimeter_speed_ratio: CoordF,
    pub infill_speed_ratio: CoordF,

    // === Support ===
    pub support_enabled: bool,
    /// Support hatch spacing (mm).
    pub support_spacing: CoordF,
    pub support_pattern: FillPattern,
    /// Support hatch angle (degrees).
    pub support_angle: CoordF,

    // === Adhesion ===
    /// Foundation layers printed under the model.
    pub raft_layers: u32,
    /// Brim outlines around the first layer (ignored with a raft).
    pub brim_lines: u32,
    /// Print a wall around all objects.
    pub shield_enabled: bool,
    /// Gap between the objects and the shield (mm).
    pub shield_gap: CoordF,

    // === Paths ===
    /// Outward vertex shift factor on tight curves (0 disables).
    pub arc_compensation_factor: CoordF,
    /// Sides shorter than this (mm) count as part of a curve.
    pub arc_short_sides: CoordF,
    /// Join infill paths to shorten travel.
    pub path_optimize: bool,
    /// Join distance as a multiple of the extrusion width.
    pub link_up_factor: CoordF,

    // === Engine ===
    /// Layers held by the slice cache.
    pub cache_ring_size: usize,
    pub saddle_policy: SaddlePolicy,

    pub extruders: Vec<ExtruderSettings>,
}

impl PrintSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer_height(mut self, height: CoordF) -> Self {
        self.layer_height = height;
        self
    }

    pub fn pixel_size(mut self, size: CoordF) -> Self {
        self.pixel_size = Some(size);
        self
    }

    pub fn vertical_shells(mut self, shells: u32) -> Self {
        self.vertical_shells = shells;
        self
    }

    pub fn fill_density(mut self, density: CoordF) -> Self {
        self.fill_density = density;
        self
    }

    pub fn fill_pattern(mut self, pattern: FillPattern) -> Self {
        self.fill_pattern = pattern;
        self
    }

    pub fn support(mut self, enabled: bool) -> Self {
        self.support_enabled = enabled;
        self
    }

    pub fn raft_layers(mut self, layers: u32) -> Self {
        self.raft_layers = layers;
        self
    }

    pub fn brim_lines(mut self, lines: u32) -> Self {
        self.brim_lines = lines;
        self
    }

    pub fn shield(mut self, enabled: bool) -> Self {
        self.shield_enabled = enabled;
        self
    }

    pub fn saddle_policy(mut self, policy: SaddlePolicy) -> Self {
        self.saddle_policy = policy;
        self
    }

    pub fn extruders(mut self, extruders: Vec<ExtruderSettings>) -> Self {
        self.extruders = extruders;
        self
    }

    /// Effective raster pixel size (mm).
    pub fn resolved_pixel_size(&self) -> CoordF {
        self.pixel_size
            .unwrap_or(self.machine_resolution * PIXEL_SIZE_FACTOR)
    }

    /// Extruder printing `material`.
    pub fn extruder(&self, material: &str) -> Option<&ExtruderSettings> {
        self.extruders.iter().find(|e| e.material == material)
    }

    /// Extruder printing `material`, or [`Error::Material`] if there is none.
    pub fn require_extruder(&self, material: &str) -> Result<&ExtruderSettings> {
        self.extruder(material)
            .ok_or_else(|| Error::Material(format!("No extruder found for material {}", material)))
    }

    /// Drop the grids of materials no extruder prints. Each one is logged and
    /// skipped; the rest of the layer carries on.
    pub fn printable(&self, mut slice: BooleanGridList) -> BooleanGridList {
        slice.retain(|g| match self.require_extruder(g.material()) {
            Ok(_) => true,
            Err(e) => {
                error!("{}, skipping its shapes", e);
                false
            }
        });
        slice
    }

    /// Material the foundation under `material` is printed in: its support
    /// material if the extruder names one, otherwise itself.
    pub fn foundation_material<'a>(&'a self, material: &'a str) -> &'a str {
        self.extruder(material)
            .and_then(|e| e.support_material.as_deref())
            .unwrap_or(material)
    }

    /// Extrusion width for `material`, falling back to the first extruder.
    pub fn width(&self, material: &str) -> CoordF {
        self.extruder(material)
            .or_else(|| self.extruders.first())
            .map_or(ExtruderSettings::default().nozzle_diameter, |e| e.width())
    }

    /// Surface layer count for `material`.
    pub fn surface_layers(&self, material: &str) -> u32 {
        self.extruder(material)
            .and_then(|e| e.surface_layers)
            .unwrap_or(self.horizontal_shells)
    }

    /// Material printing the supports of `material`, if support is enabled
    /// and the extruder names one.
    pub fn support_material(&self, material: &str) -> Option<&str> {
        if !self.support_enabled {
            return None;
        }
        self.extruder(material)?.support_material.as_deref()
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: CoordF, name: &str| {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(Error::Config(format!("{} must be positive, got {}", name, v)))
            }
        };
        positive(self.layer_height, "Layer height")?;
        positive(self.machine_resolution, "Machine resolution")?;
        positive(self.resolved_pixel_size(), "Pixel size")?;
        positive(self.support_spacing, "Support spacing")?;
        if !(self.fill_density > 0.0 && self.fill_density <= 1.0) {
            return Err(Error::Config(format!(
                "Fill density must be in (0, 1], got {}",
                self.fill_density
            )));
        }
        if self.link_up_factor < 0.0 || self.infill_overlap < 0.0 || self.shield_gap < 0.0 {
            return Err(Error::Config(
                "Link-up factor, infill overlap and shield gap must not be negative".into(),
            ));
        }
        if self.extruders.is_empty() {
            return Err(Error::Config("At least one extruder is required".into()));
        }
        for (i, e) in self.extruders.iter().enumerate() {
            positive(e.nozzle_diameter, "Nozzle diameter")?;
            if self.extruders[..i].iter().any(|o| o.material == e.material) {
                return Err(Error::Config(format!(
                    "Material {} is assigned to more than one extruder",
                    e.material
                )));
            }
            if let Some(s) = &e.support_material {
                if self.extruder(s).is_none() {
                    return Err(Error::Config(format!(
                        "Support material {} for {} has no extruder",
                        s, e.material
                    )));
                }
            }
        }
        let deepest = self
            .extruders
            .iter()
            .map(|e| self.surface_layers(&e.material))
            .max()
            .unwrap_or(1) as usize;
        if self.cache_ring_size < 2 * deepest + 2 {
            return Err(Error::Config(format!(
                "Cache ring of {} layers cannot hold {} surface layers each side",
                self.cache_ring_size, deepest
            )));
        }
        Ok(())
    }
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            // Layers
            layer_height: 0.2,
            machine_resolution: 0.1,
            pixel_size: None,
            horizontal_shells: 1,
            vertical_shells: 2,

            // Infill
            fill_density: 0.2,
            fill_pattern: FillPattern::Rectilinear,
            fill_angle: 45.0,
            stagger_hatches: true,
            infill_overlap: 0.1,
            perimeter_speed_ratio: 1.0,
            infill_speed_ratio: 1.0,

            // Support
            support_enabled: false,
            support_spacing: 2.5,
            support_pattern: FillPattern::Linear,
            support_angle: 0.0,

            // Adhesion
            raft_layers: 0,
            brim_lines: 0,
            shield_enabled: false,
            shield_gap: 2.0,

            // Paths
            arc_compensation_factor: 0.0,
            arc_short_sides: 1.0,
            path_optimize: true,
            link_up_factor: 2.0,

            // Engine
            cache_ring_size: 10,
            saddle_policy: SaddlePolicy::Separate,

            extruders: vec![ExtruderSettings::default()],
        }
    }
}

impl fmt::Display for PrintSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PrintSettings(layer={:.2}mm, pixel={:.3}mm, density={:.0}%, extruders={})",
            self.layer_height,
            self.resolved_pixel_size(),
            self.fill_density * 100.0,
            self.extruders.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_settings_default() {
        let settings = PrintSettings::default();
        assert!((settings.layer_height - 0.2).abs() < 1e-6);
        assert!((settings.resolved_pixel_size() - 0.06).abs() < 1e-9);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_print_settings_builder() {
        let settings = PrintSettings::new()
            .layer_height(0.3)
            .pixel_size(0.1)
            .fill_density(0.5)
            .support(true)
            .brim_lines(3);
        assert!((settings.layer_height - 0.3).abs() < 1e-6);
        assert!((settings.resolved_pixel_size() - 0.1).abs() < 1e-9);
        assert!(settings.support_enabled);
        assert_eq!(settings.brim_lines, 3);
    }

    #[test]
    fn test_validation() {
        let mut settings = PrintSettings::default();
        settings.layer_height = 0.0;
        assert!(matches!(settings.validate(), Err(Error::Config(_))));

        let settings = PrintSettings::default().fill_density(1.5);
        assert!(settings.validate().is_err());

        let settings = PrintSettings::default().extruders(vec![
            ExtruderSettings::new("PLA"),
            ExtruderSettings::new("PLA"),
        ]);
        assert!(settings.validate().is_err());

        let settings = PrintSettings::default()
            .extruders(vec![ExtruderSettings::new("PLA").support_material("PVA")]);
        assert!(settings.validate().is_err());

        let mut settings = PrintSettings::default();
        settings.cache_ring_size = 3;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_extruder_lookup() {
        let settings = PrintSettings::default().support(true).extruders(vec![
            ExtruderSettings::new("PLA")
                .nozzle_diameter(0.5)
                .surface_layers(2)
                .support_material("PVA"),
            ExtruderSettings::new("PVA"),
        ]);
        assert!(settings.validate().is_ok());
        assert!((settings.width("PLA") - 0.5).abs() < 1e-9);
        assert!((settings.width("unknown") - 0.5).abs() < 1e-9);
        assert_eq!(settings.surface_layers("PLA"), 2);
        assert_eq!(settings.surface_layers("PVA"), 1);
        assert_eq!(settings.support_material("PLA"), Some("PVA"));
        assert_eq!(settings.support_material("PVA"), None);
        assert!(settings.extruder("ABS").is_none());

        let off = settings.clone().support(false);
        assert_eq!(off.support_material("PLA"), None);
        // The raft still goes down in the support material
        assert_eq!(off.foundation_material("PLA"), "PVA");
        assert_eq!(off.foundation_material("PVA"), "PVA");

        assert!(settings.require_extruder("PVA").is_ok());
        assert!(matches!(settings.require_extruder("ABS"), Err(Error::Material(_))));
    }

    #[test]
    fn test_default_surface_layers_is_one() {
        let settings = PrintSettings::default();
        assert_eq!(settings.surface_layers("PLA"), 1);
        assert_eq!(settings.surface_layers("ABS"), 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_printable_drops_unknown_materials() {
        use crate::grid::{BooleanGrid, IntPoint, IntRectangle};

        let r = IntRectangle::new(IntPoint::new(0, 0), 4, 4);
        let mut pla = BooleanGrid::new(r, 0.1, "PLA");
        pla.fill(&r, true);
        let mut abs = pla.clone();
        abs.set_material("ABS");
        let slice = BooleanGridList::from_grids(vec![pla, abs]);

        let kept = PrintSettings::default().printable(slice);
        assert_eq!(kept.materials(), vec!["PLA"]);
    }

    #[test]
    fn test_settings_from_json() {
        let json = r#"{ "layer_height": 0.25, "extruders": [ { "material": "ABS" } ] }"#;
        let settings: PrintSettings = serde_json::from_str(json).unwrap();
        assert!((settings.layer_height - 0.25).abs() < 1e-9);
        assert_eq!(settings.extruders[0].material, "ABS");
        assert!((settings.extruders[0].nozzle_diameter - 0.4).abs() < 1e-9);
        assert_eq!(settings.fill_pattern, FillPattern::Rectilinear);
    }
}
