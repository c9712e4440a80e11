//! Bridge detection and direction.
//!
//! A bridge is a connected piece of a layer with nothing under it that does
//! not get support material. It has to be printed as straight strands landing
//! on solid material at both ends, so the hatch direction matters.
//!
//! # Algorithm
//!
//! 1. **Components**: split the unsupported region into connected pieces.
//!    Pieces smaller than [`BridgeConfig::min_area`] are left to surface infill.
//!
//! 2. **Lands**: grow each piece by the landing overlap and intersect it with
//!    the supported part of the layer. Each connected piece of the result is a
//!    land.
//!
//! 3. **Direction**: take the vector between the centroids of the two largest
//!    lands (or from the bridge to its only land). Scan the bridge outline and
//!    hatch along the edge whose direction has the largest absolute dot
//!    product with that vector.
//!
//! The bridge footprint is the grown piece clipped back to the layer, so the
//! strands overlap the lands.

use crate::config::PrintSettings;
use crate::geometry::{Point2D, PolygonList};
use crate::grid::{BooleanGrid, SaddlePolicy};
use crate::CoordF;
use log::{debug, warn};

/// Configuration for bridge detection.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// How far a bridge reaches onto its lands (mm).
    pub landing: CoordF,
    /// Smallest unsupported area treated as a bridge (mm²).
    pub min_area: CoordF,
    pub saddle_policy: SaddlePolicy,
}

impl BridgeConfig {
    /// Landing overlap of one extrusion width for `material`.
    pub fn from_settings(settings: &PrintSettings, material: &str) -> Self {
        let width = settings.width(material);
        Self {
            landing: width,
            min_area: width * width,
            saddle_policy: settings.saddle_policy,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            landing: 0.4,
            min_area: 0.16,
            saddle_policy: SaddlePolicy::Separate,
        }
    }
}

/// One detected bridge.
#[derive(Debug, Clone)]
pub struct Bridge {
    /// The bridge plus its landing overlap, inside the layer.
    pub footprint: BooleanGrid,
    /// Number of lands found.
    pub lands: usize,
    /// Hatch direction (radians).
    pub angle: CoordF,
}

impl Bridge {
    /// Hatch direction as a unit vector.
    pub fn direction(&self) -> Point2D {
        Point2D::from_angle(self.angle)
    }

    pub fn is_well_anchored(&self) -> bool {
        self.lands >= 2
    }
}

/// Find the bridges in `unsupported`, landing on `supported`.
///
/// `layer` is the full slice of the same material; footprints never leave it.
pub fn detect_bridges(
    unsupported: &BooleanGrid,
    supported: &BooleanGrid,
    layer: &BooleanGrid,
    config: &BridgeConfig,
) -> Vec<Bridge> {
    let mut bridges = Vec::new();
    for piece in unsupported.components() {
        if piece.area() < config.min_area {
            continue;
        }
        let grown = piece.create_offset_grid(config.landing, config.saddle_policy);
        let mut lands = grown.intersection(supported).components();
        lands.sort_by(|a, b| b.pixel_count().cmp(&a.pixel_count()));

        let angle = match landing_vector(&piece, &lands) {
            Some(v) => {
                let outline = piece.all_perimeters(config.saddle_policy);
                bridge_direction(&outline, &v).unwrap_or_else(|| v.y.atan2(v.x))
            }
            None => 0.0,
        };
        debug!(
            "Bridge of {:.2} mm² with {} lands at {:.1}°",
            piece.area(),
            lands.len(),
            angle.to_degrees()
        );
        bridges.push(Bridge {
            footprint: grown.intersection(layer),
            lands: lands.len(),
            angle,
        });
    }
    bridges
}

/// Vector between the centroids of the two largest lands, or from the bridge
/// to its only land. `lands` must be sorted largest first.
pub fn landing_vector(bridge: &BooleanGrid, lands: &[BooleanGrid]) -> Option<Point2D> {
    let v = match lands {
        [] => {
            warn!("Bridge found with no land");
            None
        }
        [land] => {
            warn!("Bridge found with only one land");
            Some(land.centroid()? - bridge.centroid()?)
        }
        [first, second, ..] => Some(second.centroid()? - first.centroid()?),
    };
    v.filter(|v| v.length_squared() > 0.0)
}

/// Angle of the outline edge most nearly parallel to `v`.
pub fn bridge_direction(outline: &PolygonList, v: &Point2D) -> Option<CoordF> {
    let v = v.normalize();
    let mut best: Option<(CoordF, Point2D)> = None;
    for polygon in outline.iter() {
        for i in 0..polygon.edge_count() {
            let (a, b) = polygon.edge(i);
            let d = b - a;
            let len = d.length();
            if len <= 0.0 {
                continue;
            }
            let score = (d * (1.0 / len)).dot(&v).abs();
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, d));
            }
        }
    }
    best.map(|(_, d)| d.y.atan2(d.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::grid::{IntPoint, IntRectangle};

    const P: CoordF = 0.1;

    fn rect_grid(x0: CoordF, y0: CoordF, x1: CoordF, y1: CoordF) -> BooleanGrid {
        let sw = IntPoint::new((x0 / P).round() as i64, (y0 / P).round() as i64);
        let r = IntRectangle::new(
            sw,
            ((x1 - x0) / P).round() as i64,
            ((y1 - y0) / P).round() as i64,
        );
        let mut g = BooleanGrid::new(r, P, "PLA");
        g.fill(&r, true);
        g
    }

    #[test]
    fn test_span_between_two_pads() {
        let layer = rect_grid(0.0, 0.0, 10.0, 2.0);
        let supported = rect_grid(0.0, 0.0, 3.0, 2.0).union(&rect_grid(7.0, 0.0, 10.0, 2.0));
        let unsupported = layer.difference(&supported);

        let bridges = detect_bridges(&unsupported, &supported, &layer, &BridgeConfig::default());
        assert_eq!(bridges.len(), 1);
        let b = &bridges[0];
        assert!(b.is_well_anchored());
        // Strands run from pad to pad
        assert!(b.angle.sin().abs() < 1e-6);
        // Footprint reaches onto both pads but stays in the layer
        assert!(b.footprint.get_real(&Point2D::new(2.75, 1.0)));
        assert!(b.footprint.get_real(&Point2D::new(7.25, 1.0)));
        assert!(!b.footprint.get_real(&Point2D::new(2.0, 1.0)));
        assert!(!b.footprint.get_real(&Point2D::new(5.0, 2.2)));
    }

    #[test]
    fn test_direction_follows_lands_not_longest_edge() {
        // A wide, short bridge: the long edges run along x but the lands are
        // above and below it.
        let layer = rect_grid(0.0, 0.0, 8.0, 6.0);
        let supported = rect_grid(0.0, 0.0, 8.0, 2.0).union(&rect_grid(0.0, 4.0, 8.0, 6.0));
        let unsupported = layer.difference(&supported);

        let bridges = detect_bridges(&unsupported, &supported, &layer, &BridgeConfig::default());
        assert_eq!(bridges.len(), 1);
        assert!(bridges[0].angle.cos().abs() < 1e-6);
    }

    #[test]
    fn test_single_land_cantilever() {
        let layer = rect_grid(0.0, 0.0, 6.0, 2.0);
        let supported = rect_grid(0.0, 0.0, 3.0, 2.0);
        let unsupported = layer.difference(&supported);

        let bridges = detect_bridges(&unsupported, &supported, &layer, &BridgeConfig::default());
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].lands, 1);
        assert!(!bridges[0].is_well_anchored());
        assert!(bridges[0].angle.sin().abs() < 1e-6);
    }

    #[test]
    fn test_floating_piece_has_default_angle() {
        let layer = rect_grid(0.0, 0.0, 2.0, 2.0);
        let supported = BooleanGrid::nothing_there(P, "PLA");
        let bridges = detect_bridges(&layer, &supported, &layer, &BridgeConfig::default());
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].lands, 0);
        assert_eq!(bridges[0].angle, 0.0);
    }

    #[test]
    fn test_small_pieces_ignored() {
        let layer = rect_grid(0.0, 0.0, 0.2, 0.2);
        let supported = BooleanGrid::nothing_there(P, "PLA");
        let bridges = detect_bridges(&layer, &supported, &layer, &BridgeConfig::default());
        assert!(bridges.is_empty());
    }

    #[test]
    fn test_bridge_direction_picks_most_parallel_edge() {
        let outline: PolygonList = vec![Polygon::from_points(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(4.0, 1.0),
                Point2D::new(3.0, 5.0),
            ],
            "PLA",
            true,
        )]
        .into_iter()
        .collect();
        let angle = bridge_direction(&outline, &Point2D::new(1.0, 0.0)).unwrap();
        assert!((angle - (1.0f64).atan2(4.0)).abs() < 1e-9);
        assert!(bridge_direction(&PolygonList::new(), &Point2D::new(1.0, 0.0)).is_none());
    }
}
