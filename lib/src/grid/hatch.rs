//! Parallel hatch lines over a grid.
//!
//! Lines run at `angle` and are spaced `spacing` apart, measured along the
//! perpendicular. Line positions are multiples of `spacing` from the origin
//! (shifted by half a spacing when staggered), so hatches on neighbouring
//! layers line up. Each line is sampled every half pixel; every maximal run of
//! solid samples becomes one open two-point polygon. Consecutive lines run in
//! opposite directions.

use super::boolean_grid::BooleanGrid;
use crate::geometry::{Point2D, Polygon, PolygonList};
use crate::CoordF;

impl BooleanGrid {
    /// Hatch the solid pixels at `angle` radians with line pitch `spacing`.
    pub fn hatch(&self, angle: CoordF, spacing: CoordF, stagger: bool) -> PolygonList {
        let mut result = PolygonList::new();
        let bounds = self.bounds();
        if bounds.is_empty() || spacing <= 0.0 {
            return result;
        }

        let p = self.pixel_size();
        let d = Point2D::from_angle(angle);
        let n = d.perp();
        let corners = bounds.corners();
        let (smin, smax) = extent(&corners, &n);
        let (tmin, tmax) = extent(&corners, &d);

        let shift = if stagger { 0.5 * spacing } else { 0.0 };
        let step = 0.5 * p;
        let samples = ((tmax - tmin) / step).ceil() as usize;

        let mut s = ((smin - shift) / spacing).ceil() * spacing + shift;
        let mut reverse = false;
        while s <= smax {
            let base = n * s;
            let mut runs: Vec<(Point2D, Point2D)> = Vec::new();
            let mut run: Option<(Point2D, Point2D)> = None;
            for k in 0..samples {
                let q = base + d * (tmin + (k as CoordF + 0.5) * step);
                if self.get_real(&q) {
                    run = Some(match run {
                        Some((a, _)) => (a, q),
                        None => (q, q),
                    });
                } else if let Some(r) = run.take() {
                    runs.push(r);
                }
            }
            if let Some(r) = run {
                runs.push(r);
            }
            runs.retain(|(a, b)| a.distance(b) >= p);

            if !runs.is_empty() {
                if reverse {
                    runs.reverse();
                }
                for (a, b) in runs {
                    let pts = if reverse { vec![b, a] } else { vec![a, b] };
                    result.push(Polygon::from_points(pts, self.material(), false));
                }
                reverse = !reverse;
            }
            s += spacing;
        }
        result
    }
}

fn extent(points: &[Point2D], axis: &Point2D) -> (CoordF, CoordF) {
    points.iter().fold((CoordF::MAX, CoordF::MIN), |(lo, hi), p| {
        let v = p.dot(axis);
        (lo.min(v), hi.max(v))
    })
}
