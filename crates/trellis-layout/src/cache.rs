// crates/trellis-layout/src/cache.rs

use serde::Serialize;
use trellis_core::Direction;

use crate::{MeasureMode, Size};

pub const MEASUREMENT_SLOTS: usize = 4;

/// Everything a node's computed size depends on besides its own subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheKey {
    pub available_width: Option<f32>,
    pub width_mode: MeasureMode,
    pub available_height: Option<f32>,
    pub height_mode: MeasureMode,
    pub owner_width: Option<f32>,
    pub owner_height: Option<f32>,
    pub parent_direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CacheEntry {
    key: CacheKey,
    size: Size,
    stamp: u64,
}

/// Per-node memo of recent results: one slot for the last full layout and
/// a few for measure-only passes.
#[derive(Debug, Clone, Default)]
pub struct LayoutCache {
    layout: Option<CacheEntry>,
    measurements: [Option<CacheEntry>; MEASUREMENT_SLOTS],
    clock: u64,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A full-layout request only matches the layout slot, since a
    /// measurement never positioned the children. A measure-only request
    /// may reuse either.
    pub fn lookup(&mut self, key: &CacheKey, perform_layout: bool) -> Option<Size> {
        self.clock += 1;
        let clock = self.clock;

        if let Some(entry) = self.layout.as_mut().filter(|entry| entry.key == *key) {
            entry.stamp = clock;
            return Some(entry.size);
        }
        if perform_layout {
            return None;
        }
        self.measurements
            .iter_mut()
            .flatten()
            .find(|entry| entry.key == *key)
            .map(|entry| {
                entry.stamp = clock;
                entry.size
            })
    }

    pub fn store(&mut self, key: CacheKey, size: Size, perform_layout: bool) {
        self.clock += 1;
        let entry = CacheEntry { key, size, stamp: self.clock };

        if perform_layout {
            self.layout = Some(entry);
            return;
        }

        let slot = match self
            .measurements
            .iter()
            .position(|slot| matches!(slot, Some(existing) if existing.key == key))
            .or_else(|| self.measurements.iter().position(Option::is_none))
        {
            Some(index) => index,
            None => self
                .measurements
                .iter()
                .enumerate()
                .min_by_key(|(_, slot)| slot.map(|entry| entry.stamp).unwrap_or(0))
                .map(|(index, _)| index)
                .unwrap_or(0),
        };
        self.measurements[slot] = Some(entry);
    }

    pub fn clear(&mut self) {
        self.layout = None;
        self.measurements = [None; MEASUREMENT_SLOTS];
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_none() && self.measurements.iter().all(Option::is_none)
    }

    pub fn measurement_count(&self) -> usize {
        self.measurements.iter().flatten().count()
    }
}

/// Counters for the most recent layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Calls made to the measure provider.
    pub measure_calls: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(width: f32) -> CacheKey {
        CacheKey {
            available_width: Some(width),
            width_mode: MeasureMode::AtMost,
            available_height: None,
            height_mode: MeasureMode::Undefined,
            owner_width: Some(width),
            owner_height: None,
            parent_direction: Direction::Ltr,
        }
    }

    #[test]
    fn test_layout_slot_serves_measurements() {
        let mut cache = LayoutCache::new();
        cache.store(key(100.0), Size::new(100.0, 20.0), true);
        assert_eq!(cache.lookup(&key(100.0), false), Some(Size::new(100.0, 20.0)));
        assert_eq!(cache.lookup(&key(100.0), true), Some(Size::new(100.0, 20.0)));
        assert_eq!(cache.lookup(&key(50.0), false), None);
    }

    #[test]
    fn test_measurement_does_not_satisfy_layout() {
        let mut cache = LayoutCache::new();
        cache.store(key(10.0), Size::new(10.0, 5.0), false);
        assert_eq!(cache.lookup(&key(10.0), false), Some(Size::new(10.0, 5.0)));
        assert_eq!(cache.lookup(&key(10.0), true), None);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = LayoutCache::new();
        for width in [1.0, 2.0, 3.0, 4.0] {
            cache.store(key(width), Size::new(width, 1.0), false);
        }
        assert!(cache.lookup(&key(1.0), false).is_some());
        cache.store(key(5.0), Size::new(5.0, 1.0), false);

        assert_eq!(cache.measurement_count(), MEASUREMENT_SLOTS);
        assert!(cache.lookup(&key(1.0), false).is_some());
        assert!(cache.lookup(&key(2.0), false).is_none());
        assert!(cache.lookup(&key(5.0), false).is_some());
    }

    #[test]
    fn test_clear() {
        let mut cache = LayoutCache::new();
        cache.store(key(1.0), Size::ZERO, true);
        cache.store(key(2.0), Size::ZERO, false);
        cache.clear();
        assert!(cache.is_empty());
    }
}
