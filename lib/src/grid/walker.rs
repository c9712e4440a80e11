//! Marching-squares contour extraction.
//!
//! Contours run along pixel edges on the corner lattice with the solid on
//! their left, so outlines come out anticlockwise and holes clockwise. At
//! lattice vertex `(x, y)` the four surrounding pixels form a code:
//!
//! ```text
//!   bit 1: (x-1, y)    bit 2: (x, y)
//!   bit 4: (x-1, y-1)  bit 8: (x, y-1)
//! ```
//!
//! Codes 6 and 9 are saddles where two diagonal pixels touch at a corner; how
//! they are resolved is chosen by [`SaddlePolicy`].

use super::boolean_grid::BooleanGrid;
use super::integer::{IntPoint, IntPolygon};
use crate::geometry::PolygonList;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Simplification tolerance for extracted perimeters, in pixels.
const PERIMETER_SIMPLIFY_PIXELS: f64 = 1.5;

/// How diagonal pixel pairs that only touch at a corner are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaddlePolicy {
    /// Treat the two pixels as disconnected; nothing is lost.
    #[default]
    Separate,
    /// Clear the pixel the trace is not following and carry on. The
    /// shape loses that pixel.
    DeletePixel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dir {
    E,
    N,
    W,
    S,
}

impl Dir {
    fn step(self) -> IntPoint {
        match self {
            Dir::E => IntPoint::new(1, 0),
            Dir::N => IntPoint::new(0, 1),
            Dir::W => IntPoint::new(-1, 0),
            Dir::S => IntPoint::new(0, -1),
        }
    }
}

struct Walker {
    work: BooleanGrid,
    visited: BooleanGrid,
    policy: SaddlePolicy,
}

impl Walker {
    fn new(grid: &BooleanGrid, policy: SaddlePolicy) -> Self {
        Self {
            work: grid.clone(),
            visited: BooleanGrid::new(*grid.rect(), grid.pixel_size(), ""),
            policy,
        }
    }

    fn code(&self, v: IntPoint) -> u8 {
        let mut c = 0;
        if self.work.get(IntPoint::new(v.x - 1, v.y)) {
            c |= 1;
        }
        if self.work.get(v) {
            c |= 2;
        }
        if self.work.get(IntPoint::new(v.x - 1, v.y - 1)) {
            c |= 4;
        }
        if self.work.get(IntPoint::new(v.x, v.y - 1)) {
            c |= 8;
        }
        c
    }

    /// Direction to leave `v` by after arriving heading `arrival`.
    fn next_direction(&mut self, v: IntPoint, arrival: Dir) -> Option<Dir> {
        let code = self.code(v);
        if code == 6 || code == 9 {
            // Keep following the pixel we arrived along
            let (keep, drop) = match (code, arrival) {
                (6, Dir::N) => (Dir::W, IntPoint::new(v.x, v.y)),
                (6, _) => (Dir::E, IntPoint::new(v.x - 1, v.y - 1)),
                (9, Dir::E) => (Dir::N, IntPoint::new(v.x, v.y - 1)),
                (_, _) => (Dir::S, IntPoint::new(v.x - 1, v.y)),
            };
            match self.policy {
                SaddlePolicy::Separate => {
                    debug!("Saddle code {} at {:?}, heading {:?}", code, v, keep);
                }
                SaddlePolicy::DeletePixel => {
                    warn!("Ambiguous saddle at {:?}: deleting pixel {:?}", v, drop);
                    self.work.set(drop, false);
                }
            }
            return Some(keep);
        }

        let ul = code & 1 != 0;
        let ur = code & 2 != 0;
        let ll = code & 4 != 0;
        let lr = code & 8 != 0;
        if ur && !lr {
            Some(Dir::E)
        } else if ul && !ur {
            Some(Dir::N)
        } else if ll && !ul {
            Some(Dir::W)
        } else if lr && !ll {
            Some(Dir::S)
        } else {
            None
        }
    }

    /// Trace the contour whose eastward edge starts at lattice vertex `start`.
    fn march_round(&mut self, start: IntPoint) -> IntPolygon {
        let mut poly = IntPolygon::new();
        poly.push(start);

        let limit = 4 * (self.work.rect().pixel_count() + 1);
        let mut v = start;
        let mut dir = Dir::E;
        for _ in 0..limit {
            if dir == Dir::E {
                self.visited.set(v, true);
            }
            v = v + dir.step();
            let next = match self.next_direction(v, dir) {
                Some(d) => d,
                None => {
                    warn!("Contour lost at {:?}, keeping {} vertices", v, poly.len());
                    return poly;
                }
            };
            if v == start && next == Dir::E {
                // The start vertex is only a corner if we arrive turning
                if dir == Dir::E {
                    poly.points.remove(0);
                }
                return poly;
            }
            if next != dir {
                poly.push(v);
            }
            dir = next;
        }

        warn!("Contour from {:?} did not close after {} steps", start, limit);
        poly
    }

    fn march_all(&mut self) -> Vec<IntPolygon> {
        let rect = *self.work.rect();
        let mut contours = Vec::new();
        for p in rect.pixels() {
            if self.work.get(p)
                && !self.work.get(IntPoint::new(p.x, p.y - 1))
                && !self.visited.get(p)
            {
                let c = self.march_round(p);
                if c.len() >= 3 {
                    contours.push(c);
                }
            }
        }
        contours
    }
}

impl BooleanGrid {
    /// Closed lattice contours of every solid region and hole.
    pub fn contours(&self, policy: SaddlePolicy) -> Vec<IntPolygon> {
        if self.rect().is_empty() {
            return Vec::new();
        }
        Walker::new(self, policy).march_all()
    }

    /// All outlines and holes as real polygons tagged with this grid's
    /// material, simplified to one and a half pixels.
    pub fn all_perimeters(&self, policy: SaddlePolicy) -> PolygonList {
        let p = self.pixel_size();
        let tolerance = PERIMETER_SIMPLIFY_PIXELS * p;
        self.contours(policy)
            .iter()
            .map(|c| c.to_polygon(p, self.material()).simplify(tolerance))
            .filter(|poly| poly.is_closed() && poly.len() >= 3)
            .collect()
    }
}
