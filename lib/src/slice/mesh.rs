//! Flat triangle buffers for objects to be sliced.
//!
//! An object is a list of parts, each tagged with a material. A part is either
//! a triangle soup already placed in machine coordinates or an analytic
//! [`Csg3D`] solid with an explicit bounding box.

use crate::csg::Csg3D;
use crate::geometry::{Interval, Point3D, Rectangle};
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Point3D; 3],
}

impl Triangle {
    pub fn new(a: Point3D, b: Point3D, c: Point3D) -> Self {
        Self { vertices: [a, b, c] }
    }

    pub fn z_range(&self) -> Interval {
        let [a, b, c] = self.vertices;
        Interval::new(a.z.min(b.z).min(c.z), a.z.max(b.z).max(c.z))
    }
}

/// Axis-aligned 3D bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3 {
    pub min: Point3D,
    pub max: Point3D,
}

impl BoundingBox3 {
    pub fn new(a: Point3D, b: Point3D) -> Self {
        Self {
            min: Point3D::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3D::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn expand_to(&mut self, p: &Point3D) {
        self.min = Point3D::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3D::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn merge(&mut self, other: &BoundingBox3) {
        self.expand_to(&other.min);
        self.expand_to(&other.max);
    }

    pub fn xy(&self) -> Rectangle {
        Rectangle::new(self.min.xy(), self.max.xy())
    }
}

/// One material's share of an object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MeshPart {
    pub material: String,
    #[serde(default)]
    pub triangles: Vec<Triangle>,
    /// Analytic solid; sliced directly when present.
    #[serde(default)]
    pub solid: Option<Csg3D>,
    /// Required for analytic solids, computed for triangles otherwise.
    #[serde(default)]
    pub bounds: Option<BoundingBox3>,
}

impl MeshPart {
    pub fn from_triangles(material: impl Into<String>, triangles: Vec<Triangle>) -> Self {
        Self {
            material: material.into(),
            triangles,
            solid: None,
            bounds: None,
        }
    }

    pub fn from_solid(material: impl Into<String>, solid: Csg3D, bounds: BoundingBox3) -> Self {
        Self {
            material: material.into(),
            triangles: Vec::new(),
            solid: Some(solid),
            bounds: Some(bounds),
        }
    }

    /// Closed box made of twelve triangles with outward-facing winding.
    pub fn cuboid(material: impl Into<String>, a: Point3D, b: Point3D) -> Self {
        let bb = BoundingBox3::new(a, b);
        let (lo, hi) = (bb.min, bb.max);
        let v = |i: usize| {
            Point3D::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            )
        };
        let quads = [
            [0, 2, 3, 1], // bottom
            [4, 5, 7, 6], // top
            [0, 1, 5, 4], // front
            [2, 6, 7, 3], // back
            [0, 4, 6, 2], // left
            [1, 3, 7, 5], // right
        ];
        let mut triangles = Vec::with_capacity(12);
        for q in quads {
            triangles.push(Triangle::new(v(q[0]), v(q[1]), v(q[2])));
            triangles.push(Triangle::new(v(q[0]), v(q[2]), v(q[3])));
        }
        Self::from_triangles(material, triangles)
    }

    pub fn bounds(&self) -> Option<BoundingBox3> {
        if let Some(b) = self.bounds {
            return Some(b);
        }
        let first = self.triangles.first()?.vertices[0];
        let mut bb = BoundingBox3::new(first, first);
        for t in &self.triangles {
            for v in &t.vertices {
                bb.expand_to(v);
            }
        }
        Some(bb)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MeshObject {
    #[serde(default)]
    pub name: String,
    pub parts: Vec<MeshPart>,
}

impl MeshObject {
    pub fn new(name: impl Into<String>, parts: Vec<MeshPart>) -> Self {
        Self {
            name: name.into(),
            parts,
        }
    }

    pub fn bounds(&self) -> Option<BoundingBox3> {
        let mut result: Option<BoundingBox3> = None;
        for b in self.parts.iter().filter_map(|p| p.bounds()) {
            match result.as_mut() {
                Some(r) => r.merge(&b),
                None => result = Some(b),
            }
        }
        result
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.triangles.len()).sum()
    }

    /// Check the object can be sliced.
    pub fn validate(&self) -> Result<()> {
        if self.parts.is_empty() {
            return Err(Error::Mesh(format!("object '{}' has no parts", self.name)));
        }
        for part in &self.parts {
            if part.material.is_empty() {
                return Err(Error::Mesh(format!("object '{}' has a part without a material", self.name)));
            }
            if part.solid.is_some() && part.bounds.is_none() {
                return Err(Error::Mesh(format!(
                    "analytic part of '{}' ({}) needs explicit bounds",
                    self.name, part.material
                )));
            }
            if part.solid.is_none() && part.triangles.is_empty() {
                return Err(Error::Mesh(format!(
                    "part of '{}' ({}) has neither triangles nor a solid",
                    self.name, part.material
                )));
            }
            let finite = |p: &Point3D| p.x.is_finite() && p.y.is_finite() && p.z.is_finite();
            if part.triangles.iter().any(|t| !t.vertices.iter().all(finite)) {
                return Err(Error::Mesh(format!("object '{}' has non-finite vertices", self.name)));
            }
        }
        Ok(())
    }
}

/// Combined bounds of several objects.
pub fn scene_bounds(objects: &[MeshObject]) -> Option<BoundingBox3> {
    let mut result: Option<BoundingBox3> = None;
    for b in objects.iter().filter_map(|o| o.bounds()) {
        match result.as_mut() {
            Some(r) => r.merge(&b),
            None => result = Some(b),
        }
    }
    result
}

/// Height of a mesh, for layer counting.
pub fn scene_height(objects: &[MeshObject]) -> CoordF {
    scene_bounds(objects).map_or(0.0, |b| b.max.z - b.min.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_bounds() {
        let part = MeshPart::cuboid("PLA", Point3D::new(0.0, 0.0, 0.0), Point3D::new(2.0, 3.0, 4.0));
        assert_eq!(part.triangles.len(), 12);
        let b = part.bounds().unwrap();
        assert_eq!(b.min, Point3D::new(0.0, 0.0, 0.0));
        assert_eq!(b.max, Point3D::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_validate() {
        let ok = MeshObject::new(
            "box",
            vec![MeshPart::cuboid("PLA", Point3D::new(0.0, 0.0, 0.0), Point3D::new(1.0, 1.0, 1.0))],
        );
        assert!(ok.validate().is_ok());

        let empty = MeshObject::new("empty", vec![]);
        assert!(matches!(empty.validate(), Err(Error::Mesh(_))));

        let unbounded = MeshObject::new(
            "csg",
            vec![MeshPart {
                material: "PLA".into(),
                solid: Some(Csg3D::Universe),
                ..Default::default()
            }],
        );
        assert!(unbounded.validate().is_err());
    }

    #[test]
    fn test_scene_bounds() {
        let a = MeshObject::new(
            "a",
            vec![MeshPart::cuboid("PLA", Point3D::new(0.0, 0.0, 0.0), Point3D::new(1.0, 1.0, 1.0))],
        );
        let b = MeshObject::new(
            "b",
            vec![MeshPart::cuboid("PLA", Point3D::new(5.0, 0.0, 0.0), Point3D::new(6.0, 1.0, 3.0))],
        );
        let bb = scene_bounds(&[a, b]).unwrap();
        assert_eq!(bb.max, Point3D::new(6.0, 1.0, 3.0));
        assert!((scene_height(&[]) - 0.0).abs() < 1e-12);
    }
}
