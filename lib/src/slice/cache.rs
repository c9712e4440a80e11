//! Bounded per-layer cache of slices and supports.
//!
//! The cache is a ring of slots, each holding one layer number and, for every
//! object, an optional slice and an optional support. Writing a layer that is
//! not resident takes over the oldest slot and clears everything in it, so at
//! most `ring_size` layers are resident at once whatever the model height.
//!
//! Callers walk layers in order (bottom up for slices, top down for supports)
//! and only look a few layers either side, so a ring a little deeper than the
//! look-ahead never misses. A miss is not an error: it returns `None` and the
//! caller recomputes or treats the layer as empty.

use crate::grid::BooleanGridList;
use log::trace;

#[derive(Clone, Debug, Default)]
struct Slot {
    layer: Option<i32>,
    slices: Vec<Option<BooleanGridList>>,
    supports: Vec<Option<BooleanGridList>>,
}

impl Slot {
    fn reset(&mut self, layer: i32, objects: usize) {
        self.layer = Some(layer);
        self.slices = vec![None; objects];
        self.supports = vec![None; objects];
    }
}

#[derive(Clone, Debug)]
pub struct SliceCache {
    ring: Vec<Slot>,
    ring_pointer: usize,
    objects: usize,
}

impl SliceCache {
    /// Cache `ring_size` layers (at least one) for `objects` objects.
    pub fn new(ring_size: usize, objects: usize) -> Self {
        let ring_size = ring_size.max(1);
        Self {
            ring: vec![Slot::default(); ring_size],
            ring_pointer: ring_size - 1,
            objects,
        }
    }

    #[inline]
    pub fn ring_size(&self) -> usize {
        self.ring.len()
    }

    /// Number of distinct layers currently resident.
    pub fn resident_layers(&self) -> usize {
        self.ring.iter().filter(|s| s.layer.is_some()).count()
    }

    /// Slot holding `layer`, scanning backwards from the newest.
    fn find_slot(&self, layer: i32) -> Option<usize> {
        let n = self.ring.len();
        (0..n)
            .map(|k| (self.ring_pointer + n - k) % n)
            .find(|&i| self.ring[i].layer == Some(layer))
    }

    /// Slot for `layer`, evicting the oldest if it is not resident.
    fn slot_for(&mut self, layer: i32) -> usize {
        if let Some(i) = self.find_slot(layer) {
            return i;
        }
        self.ring_pointer = (self.ring_pointer + 1) % self.ring.len();
        if let Some(old) = self.ring[self.ring_pointer].layer {
            trace!("Slice cache evicting layer {} for layer {}", old, layer);
        }
        let objects = self.objects;
        self.ring[self.ring_pointer].reset(layer, objects);
        self.ring_pointer
    }

    pub fn set_slice(&mut self, data: BooleanGridList, layer: i32, stl: usize) {
        if stl >= self.objects {
            return;
        }
        let i = self.slot_for(layer);
        self.ring[i].slices[stl] = Some(data);
    }

    pub fn set_support(&mut self, data: BooleanGridList, layer: i32, stl: usize) {
        if stl >= self.objects {
            return;
        }
        let i = self.slot_for(layer);
        self.ring[i].supports[stl] = Some(data);
    }

    pub fn get_slice(&self, layer: i32, stl: usize) -> Option<&BooleanGridList> {
        let i = self.find_slot(layer)?;
        self.ring[i].slices.get(stl)?.as_ref()
    }

    pub fn get_support(&self, layer: i32, stl: usize) -> Option<&BooleanGridList> {
        let i = self.find_slot(layer)?;
        self.ring[i].supports.get(stl)?.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BooleanGrid, IntPoint, IntRectangle};

    fn list(pixels: i64) -> BooleanGridList {
        let mut g = BooleanGrid::new(IntRectangle::new(IntPoint::new(0, 0), pixels, 1), 0.1, "PLA");
        g.fill(&IntRectangle::new(IntPoint::new(0, 0), pixels, 1), true);
        BooleanGridList::from_grids(vec![g])
    }

    #[test]
    fn test_eviction_after_ring_size_plus_one() {
        let mut cache = SliceCache::new(3, 1);
        for layer in 0..4 {
            cache.set_slice(list(layer as i64 + 1), layer, 0);
        }
        assert!(cache.get_slice(0, 0).is_none());
        for layer in 1..4 {
            assert_eq!(cache.get_slice(layer, 0).unwrap().pixel_count(), layer as usize + 1);
        }
    }

    #[test]
    fn test_same_layer_reuses_slot() {
        let mut cache = SliceCache::new(2, 2);
        cache.set_slice(list(1), 5, 0);
        cache.set_slice(list(2), 5, 1);
        cache.set_support(list(3), 5, 0);
        assert_eq!(cache.resident_layers(), 1);
        cache.set_slice(list(4), 6, 0);
        assert_eq!(cache.get_slice(5, 1).unwrap().pixel_count(), 2);
        assert_eq!(cache.get_support(5, 0).unwrap().pixel_count(), 3);
    }

    #[test]
    fn test_eviction_clears_all_objects() {
        let mut cache = SliceCache::new(1, 2);
        cache.set_slice(list(1), 0, 0);
        cache.set_support(list(1), 0, 1);
        cache.set_slice(list(1), 1, 0);
        assert!(cache.get_slice(0, 0).is_none());
        assert!(cache.get_support(1, 1).is_none());
        assert!(cache.get_slice(1, 1).is_none());
    }

    #[test]
    fn test_miss_is_none() {
        let cache = SliceCache::new(4, 1);
        assert!(cache.get_slice(0, 0).is_none());
        assert!(cache.get_slice(0, 7).is_none());
    }
}
