//! Segment cache for repeated shaping calls
//!
//! Shaping the same text with the same font and features always gives the
//! same segment, so the result can be kept and handed out again. The key
//! captures every input that changes the output.

use glyphweave_core::cache::{CacheStats, LruStore};
use glyphweave_core::config::DEFAULT_CACHE_CAPACITY;
use glyphweave_core::types::{Direction, Tag};

use crate::plan::FeatureValues;
use crate::segment::Segment;

/// Everything a shaping result depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapingCacheKey {
    pub face_id: u64,
    /// Scale factor bits, so sizes compare exactly
    pub scale: u32,
    pub round_advances: bool,
    pub script: Tag,
    pub direction: Direction,
    pub features: FeatureValues,
    pub text: String,
}

/// Bounded LRU of shaped segments
pub struct ShapingCache {
    store: LruStore<ShapingCacheKey, Segment>,
}

impl ShapingCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: LruStore::new(capacity),
        }
    }

    pub fn get(&self, key: &ShapingCacheKey) -> Option<Segment> {
        self.store.get(key)
    }

    pub fn insert(&self, key: ShapingCacheKey, segment: Segment) {
        self.store.insert(key, segment);
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn hit_rate(&self) -> f64 {
        self.store.stats().hit_rate
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}

impl Default for ShapingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str) -> ShapingCacheKey {
        ShapingCacheKey {
            face_id: 1,
            scale: 0.02f32.to_bits(),
            round_advances: false,
            script: Tag::NONE,
            direction: Direction::LeftToRight,
            features: FeatureValues::default(),
            text: text.to_string(),
        }
    }

    #[test]
    fn hits_and_misses_are_counted() {
        let cache = ShapingCache::with_capacity(4);
        assert!(cache.get(&key("hello")).is_none());

        cache.insert(key("hello"), Segment::empty(Direction::LeftToRight));
        assert!(cache.get(&key("hello")).is_some());

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
        assert!((cache.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn direction_is_part_of_the_key() {
        let cache = ShapingCache::with_capacity(4);
        cache.insert(key("abc"), Segment::empty(Direction::LeftToRight));
        let rtl = ShapingCacheKey {
            direction: Direction::RightToLeft,
            ..key("abc")
        };
        assert!(cache.get(&rtl).is_none());
    }

    #[test]
    fn clear_empties_the_store() {
        let cache = ShapingCache::new();
        cache.insert(key("x"), Segment::empty(Direction::LeftToRight));
        cache.clear();
        assert_eq!(cache.stats().size, 0);
    }
}
