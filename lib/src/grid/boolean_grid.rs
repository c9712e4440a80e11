//! The rasterised shape type.
//!
//! A [`BooleanGrid`] is a bitset over an [`IntRectangle`] of pixels on the
//! global lattice, tagged with a material. A pixel is set when its centre is
//! inside the shape. Pixels outside the rectangle are never set, so a grid with
//! an empty rectangle is the empty shape (the identity for union and the
//! right identity for difference).

use super::integer::{IntPoint, IntRectangle};
use super::painter::paint;
use crate::csg::Csg2D;
use crate::geometry::{Point2D, PolygonList, Rectangle};
use crate::{CoordF, Result};
use std::fmt;

const WORD_BITS: usize = 64;

#[derive(Clone)]
pub struct BooleanGrid {
    rect: IntRectangle,
    bits: Vec<u64>,
    pixel_size: CoordF,
    material: String,
}

impl BooleanGrid {
    /// All-clear grid over `rect`.
    pub fn new(rect: IntRectangle, pixel_size: CoordF, material: impl Into<String>) -> Self {
        let words = rect.pixel_count().div_ceil(WORD_BITS);
        Self {
            rect,
            bits: vec![0; words],
            pixel_size,
            material: material.into(),
        }
    }

    /// The empty shape.
    pub fn nothing_there(pixel_size: CoordF, material: impl Into<String>) -> Self {
        Self::new(IntRectangle::empty(), pixel_size, material)
    }

    /// Rasterise a CSG expression over the pixels covering `bounds`.
    pub fn from_csg(
        csg: &Csg2D,
        bounds: &Rectangle,
        pixel_size: CoordF,
        material: impl Into<String>,
    ) -> Self {
        let mut grid = Self::new(IntRectangle::covering(bounds, pixel_size), pixel_size, material);
        if !grid.rect.is_empty() {
            paint(&mut grid, csg);
        }
        grid
    }

    /// Rasterise the region enclosed by a set of closed polygons.
    pub fn from_polygons(
        polygons: &PolygonList,
        pixel_size: CoordF,
        material: impl Into<String>,
    ) -> Result<Self> {
        let csg = polygons.to_csg()?;
        let bounds = polygons.bbox().offset(pixel_size);
        Ok(Self::from_csg(&csg, &bounds, pixel_size, material))
    }

    #[inline]
    pub fn rect(&self) -> &IntRectangle {
        &self.rect
    }

    #[inline]
    pub fn pixel_size(&self) -> CoordF {
        self.pixel_size
    }

    #[inline]
    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn set_material(&mut self, material: impl Into<String>) {
        self.material = material.into();
    }

    #[inline]
    pub fn get(&self, p: IntPoint) -> bool {
        if !self.rect.contains(p) {
            return false;
        }
        let i = self.rect.index(p);
        self.bits[i / WORD_BITS] & (1u64 << (i % WORD_BITS)) != 0
    }

    /// Whether the pixel containing the real point `p` is set.
    #[inline]
    pub fn get_real(&self, p: &Point2D) -> bool {
        self.get(IntPoint::pixel_at(p, self.pixel_size))
    }

    /// Set or clear a pixel. Writes outside the rectangle are ignored.
    #[inline]
    pub fn set(&mut self, p: IntPoint, v: bool) {
        if !self.rect.contains(p) {
            return;
        }
        let i = self.rect.index(p);
        let mask = 1u64 << (i % WORD_BITS);
        if v {
            self.bits[i / WORD_BITS] |= mask;
        } else {
            self.bits[i / WORD_BITS] &= !mask;
        }
    }

    /// Set or clear every pixel of `r` that lies inside the grid.
    pub fn fill(&mut self, r: &IntRectangle, v: bool) {
        let r = r.intersection(&self.rect);
        for p in r.pixels() {
            self.set(p, v);
        }
    }

    /// No pixel set.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    pub fn pixel_count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Area of the set pixels in square millimetres.
    pub fn area(&self) -> CoordF {
        self.pixel_count() as CoordF * self.pixel_size * self.pixel_size
    }

    /// Mean of the set pixel centres.
    pub fn centroid(&self) -> Option<Point2D> {
        let mut n = 0usize;
        let mut sum = Point2D::zero();
        for p in self.set_pixels() {
            sum = sum + p.centre(self.pixel_size);
            n += 1;
        }
        if n == 0 {
            None
        } else {
            Some(sum * (1.0 / n as CoordF))
        }
    }

    /// Set pixels, row by row from the south-west.
    pub fn set_pixels(&self) -> impl Iterator<Item = IntPoint> + '_ {
        self.rect.pixels().filter(move |p| self.get(*p))
    }

    /// Smallest pixel rectangle holding every set pixel.
    pub fn tight_rect(&self) -> IntRectangle {
        let mut lo = IntPoint::new(i64::MAX, i64::MAX);
        let mut hi = IntPoint::new(i64::MIN, i64::MIN);
        for p in self.set_pixels() {
            lo = IntPoint::new(lo.x.min(p.x), lo.y.min(p.y));
            hi = IntPoint::new(hi.x.max(p.x), hi.y.max(p.y));
        }
        if lo.x > hi.x {
            return IntRectangle::empty();
        }
        IntRectangle::new(lo, hi.x - lo.x + 1, hi.y - lo.y + 1)
    }

    /// Real rectangle covered by the set pixels.
    pub fn bounds(&self) -> Rectangle {
        self.tight_rect().bounds(self.pixel_size)
    }

    /// Copy of this grid over a different rectangle. Pixels outside the new
    /// rectangle are lost.
    pub fn resized(&self, rect: IntRectangle) -> BooleanGrid {
        let mut out = BooleanGrid::new(rect, self.pixel_size, self.material.clone());
        if rect == self.rect {
            out.bits.copy_from_slice(&self.bits);
            return out;
        }
        for p in self.rect.intersection(&rect).pixels() {
            if self.get(p) {
                out.set(p, true);
            }
        }
        out
    }

    /// Copy trimmed to the tight rectangle of the set pixels.
    pub fn trimmed(&self) -> BooleanGrid {
        self.resized(self.tight_rect())
    }

    /// 4-connected components, each trimmed to its own rectangle.
    pub fn components(&self) -> Vec<BooleanGrid> {
        let mut seen = BooleanGrid::new(self.rect, self.pixel_size, "");
        let mut result = Vec::new();
        let mut stack = Vec::new();

        for start in self.rect.pixels() {
            if !self.get(start) || seen.get(start) {
                continue;
            }
            let mut component = BooleanGrid::new(self.rect, self.pixel_size, self.material.clone());
            stack.push(start);
            seen.set(start, true);
            while let Some(p) = stack.pop() {
                component.set(p, true);
                for d in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                    let q = IntPoint::new(p.x + d.0, p.y + d.1);
                    if self.get(q) && !seen.get(q) {
                        seen.set(q, true);
                        stack.push(q);
                    }
                }
            }
            result.push(component.trimmed());
        }
        result
    }

    pub(crate) fn words(&self) -> &[u64] {
        &self.bits
    }

    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        &mut self.bits
    }
}

impl fmt::Debug for BooleanGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BooleanGrid")
            .field("material", &self.material)
            .field("rect", &self.rect)
            .field("pixels", &self.pixel_count())
            .finish()
    }
}
