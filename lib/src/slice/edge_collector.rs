//! Triangle-plane intersection.
//!
//! Each triangle is classified against the cutting plane by a three-bit
//! pattern with bit `i` set when vertex `i` lies strictly below the plane.
//! Patterns 0 and 7 miss the plane. Every other pattern has exactly one vertex
//! on its own side of the plane; the two edges leaving that vertex cross the
//! plane, and the crossing points joined give the cut segment.

use super::mesh::{MeshPart, Triangle};
use crate::geometry::LineSegment;
use crate::{CoordF, Error, Result};

/// Classification pattern of a triangle against the plane at `z`.
#[inline]
pub fn classify(t: &Triangle, z: CoordF) -> u8 {
    t.vertices
        .iter()
        .enumerate()
        .fold(0u8, |pat, (i, v)| if v.z < z { pat | (1 << i) } else { pat })
}

/// Segment where `t` crosses the plane at `z`, if it does.
pub fn cut_triangle(t: &Triangle, z: CoordF, material: &str) -> Result<Option<LineSegment>> {
    let pat = classify(t, z);
    let odd = match pat {
        0 | 7 => return Ok(None),
        1 | 6 => 0,
        2 | 5 => 1,
        3 | 4 => 2,
        _ => {
            return Err(Error::Slicing(format!(
                "impossible triangle classification pattern {} at z = {}",
                pat, z
            )))
        }
    };
    let v = &t.vertices;
    let a = v[odd].at_z(&v[(odd + 1) % 3], z);
    let b = v[odd].at_z(&v[(odd + 2) % 3], z);
    let segment = LineSegment::new(a, b, material);
    if segment.is_point() {
        return Ok(None);
    }
    Ok(Some(segment))
}

/// All cut segments of a part at height `z`.
pub fn collect_edges(part: &MeshPart, z: CoordF) -> Result<Vec<LineSegment>> {
    let mut edges = Vec::new();
    for t in &part.triangles {
        if !t.z_range().contains(z) {
            continue;
        }
        if let Some(s) = cut_triangle(t, z, &part.material)? {
            edges.push(s);
        }
    }
    Ok(edges)
}
