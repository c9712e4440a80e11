//! Layer numbering and per-layer hatch rules.
//!
//! Machine layers count from the bed. The first `foundation_layers` machine
//! layers are raft; model layer `m` is machine layer `m + foundation_layers`,
//! so foundation layers have negative model numbers. Foundation layers are
//! computed top-down, from the one touching the model to the bed.

use crate::config::{FillPattern, PrintSettings};
use crate::CoordF;
use std::f64::consts::FRAC_PI_2;

#[derive(Debug, Clone)]
pub struct LayerRules {
    layer_height: CoordF,
    model_z_min: CoordF,
    model_layers: i32,
    foundation_layers: i32,
    fill_angle: CoordF,
    fill_pattern: FillPattern,
    support_angle: CoordF,
    support_pattern: FillPattern,
    stagger: bool,
}

impl LayerRules {
    /// Rules for a model of `model_layers` layers whose bottom is at
    /// `model_z_min`.
    pub fn new(settings: &PrintSettings, model_layers: i32, model_z_min: CoordF) -> Self {
        Self {
            layer_height: settings.layer_height,
            model_z_min,
            model_layers: model_layers.max(0),
            foundation_layers: settings.raft_layers as i32,
            fill_angle: settings.fill_angle.to_radians(),
            fill_pattern: settings.fill_pattern,
            support_angle: settings.support_angle.to_radians(),
            support_pattern: settings.support_pattern,
            stagger: settings.stagger_hatches,
        }
    }

    #[inline]
    pub fn model_layer_count(&self) -> i32 {
        self.model_layers
    }

    #[inline]
    pub fn foundation_layer_count(&self) -> i32 {
        self.foundation_layers
    }

    #[inline]
    pub fn machine_layer_count(&self) -> i32 {
        self.model_layers + self.foundation_layers
    }

    #[inline]
    pub fn model_layer(&self, machine_layer: i32) -> i32 {
        machine_layer - self.foundation_layers
    }

    #[inline]
    pub fn is_foundation(&self, machine_layer: i32) -> bool {
        machine_layer < self.foundation_layers
    }

    /// Nozzle height above the bed while printing a machine layer.
    pub fn machine_z(&self, machine_layer: i32) -> CoordF {
        (machine_layer + 1) as CoordF * self.layer_height
    }

    /// Height at which a model layer is cut from the model.
    pub fn model_z(&self, model_layer: i32) -> CoordF {
        self.model_z_min + (model_layer as CoordF + 0.5) * self.layer_height
    }

    /// Infill hatch angle (radians) for a layer. Rectilinear infill turns by
    /// a right angle on odd layers.
    pub fn fill_angle(&self, layer: i32) -> CoordF {
        alternate(self.fill_angle, self.fill_pattern, layer)
    }

    /// Support and foundation hatch angle (radians) for a layer.
    pub fn support_angle(&self, layer: i32) -> CoordF {
        alternate(self.support_angle, self.support_pattern, layer)
    }

    /// Foundation hatch angle (radians) for a machine layer. Raft layers
    /// always cross the one below.
    pub fn foundation_angle(&self, machine_layer: i32) -> CoordF {
        alternate(self.support_angle, FillPattern::Rectilinear, machine_layer)
    }

    /// Whether hatches on this layer are shifted by half a spacing. Shifting
    /// applies to every other pair of layers.
    pub fn stagger(&self, layer: i32) -> bool {
        self.stagger && (layer.div_euclid(2)).rem_euclid(2) == 1
    }
}

fn alternate(base: CoordF, pattern: FillPattern, layer: i32) -> CoordF {
    match pattern {
        FillPattern::Rectilinear if layer.rem_euclid(2) == 1 => base + FRAC_PI_2,
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbering_with_raft() {
        let settings = PrintSettings::default().raft_layers(2);
        let rules = LayerRules::new(&settings, 10, 0.0);
        assert_eq!(rules.machine_layer_count(), 12);
        assert_eq!(rules.model_layer(0), -2);
        assert!(rules.is_foundation(1));
        assert!(!rules.is_foundation(2));
    }

    #[test]
    fn test_heights() {
        let settings = PrintSettings::default().layer_height(0.25);
        let rules = LayerRules::new(&settings, 4, 1.0);
        assert!((rules.machine_z(0) - 0.25).abs() < 1e-12);
        assert!((rules.model_z(0) - 1.125).abs() < 1e-12);
        assert!((rules.model_z(3) - 1.875).abs() < 1e-12);
    }

    #[test]
    fn test_rectilinear_alternates() {
        let rules = LayerRules::new(&PrintSettings::default(), 4, 0.0);
        let a0 = rules.fill_angle(0);
        let a1 = rules.fill_angle(1);
        assert!((a0 - 45f64.to_radians()).abs() < 1e-12);
        assert!((a1 - a0 - FRAC_PI_2).abs() < 1e-12);
        assert!((rules.fill_angle(2) - a0).abs() < 1e-12);
        // Support defaults to a fixed direction
        assert_eq!(rules.support_angle(0), rules.support_angle(1));
        assert!((rules.foundation_angle(1) - rules.foundation_angle(0) - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_stagger_every_other_pair() {
        let rules = LayerRules::new(&PrintSettings::default(), 8, 0.0);
        let staggered: Vec<bool> = (0..8).map(|l| rules.stagger(l)).collect();
        assert_eq!(staggered, vec![false, false, true, true, false, false, true, true]);
        assert!(rules.stagger(-1));

        let mut settings = PrintSettings::default();
        settings.stagger_hatches = false;
        let rules = LayerRules::new(&settings, 8, 0.0);
        assert!(!rules.stagger(2));
    }
}
