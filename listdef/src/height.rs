use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use crate::key::KeyMap;

/// Capacity used by [`HeightCache::default`].
pub const DEFAULT_HEIGHT_CACHE_CAPACITY: usize = 1024;

/// Memoization key for a measured height: content signature plus available width.
///
/// The width is stored by bit pattern, so only bit-identical widths share an entry.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightKey {
    signature: String,
    width_bits: u32,
}

impl HeightKey {
    pub fn new(signature: impl Into<String>, width: f32) -> Self {
        Self {
            signature: signature.into(),
            // -0.0 and 0.0 measure the same.
            width_bits: if width == 0.0 { 0 } else { width.to_bits() },
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn width(&self) -> f32 {
        f32::from_bits(self.width_bits)
    }
}

/// Lookup counters, reset by [`HeightCache::clear`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeightCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// A bounded memo table of measured heights.
///
/// Entries are evicted first-in-first-out once `capacity` is reached. A capacity of `0`
/// disables storage entirely (every lookup measures).
#[derive(Clone, Debug)]
pub struct HeightCache {
    entries: KeyMap<HeightKey, f32>,
    order: VecDeque<HeightKey>,
    capacity: usize,
    stats: HeightCacheStats,
}

impl Default for HeightCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HEIGHT_CACHE_CAPACITY)
    }
}

impl HeightCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: KeyMap::new(),
            order: VecDeque::new(),
            capacity,
            stats: HeightCacheStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the capacity, evicting the oldest entries if the cache is now over it.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict_to_capacity();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> HeightCacheStats {
        self.stats
    }

    pub fn contains(&self, key: &HeightKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &HeightKey) -> Option<f32> {
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, key: HeightKey, height: f32) {
        if self.capacity == 0 {
            return;
        }
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = height;
            return;
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, height);
        self.evict_to_capacity();
    }

    /// Returns the cached height for `key`, or runs `measure` and stores its result.
    ///
    /// `measure` returning `None` means "no measurement available"; nothing is stored and the
    /// next lookup will try again.
    pub fn get_or_measure(
        &mut self,
        key: HeightKey,
        measure: impl FnOnce() -> Option<f32>,
    ) -> Option<f32> {
        if let Some(height) = self.entries.get(&key) {
            self.stats.hits = self.stats.hits.saturating_add(1);
            return Some(*height);
        }
        self.stats.misses = self.stats.misses.saturating_add(1);
        let height = measure()?;
        ltrace!(signature = key.signature(), height, "height measured");
        self.insert(key, height);
        Some(height)
    }

    pub fn remove(&mut self, key: &HeightKey) -> Option<f32> {
        let height = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(height)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats = HeightCacheStats::default();
    }

    /// Exports entries oldest first (useful for persistence).
    pub fn export(&self) -> Vec<(HeightKey, f32)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|h| (k.clone(), *h)))
            .collect()
    }

    /// Replaces the contents with `entries`, keeping insertion order for eviction.
    pub fn import(&mut self, entries: impl IntoIterator<Item = (HeightKey, f32)>) {
        self.entries.clear();
        self.order.clear();
        let mut n = 0usize;
        for (key, height) in entries {
            self.insert(key, height);
            n = n.saturating_add(1);
        }
        ldebug!(entries = n, kept = self.entries.len(), "height cache imported");
    }

    fn evict_to_capacity(&mut self) {
        while self.order.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions = self.stats.evictions.saturating_add(1);
            ltrace!(signature = oldest.signature(), "height evicted");
        }
    }
}
