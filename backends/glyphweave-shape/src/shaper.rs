//! The rule-based shaper
//!
//! `RuleShaper` runs the whole pipeline: Unicode analysis, glyph mapping,
//! GSUB and GPOS rules, bidi reordering. Results can be cached; a cache hit
//! still checks that the font, face and settings are alive.

use std::sync::Arc;

use glyphweave_core::cache::CacheStats;
use glyphweave_core::config::is_caching_enabled;
use glyphweave_core::diagnostics::log_sink;
use glyphweave_core::types::{Direction, Tag};
use glyphweave_core::{Result, ShapingConfig, SharedSink};
use glyphweave_face::FeatureSettings;
use glyphweave_unicode::{resolve_direction, TextAnalyzer};

use crate::cache::{ShapingCache, ShapingCacheKey};
use crate::font::Font;
use crate::pipeline::{shape_analysis, Scaling};
use crate::plan::FeatureValues;
use crate::segment::Segment;
use crate::Shaper;

/// Shapes text with the substitution and positioning rules of the face
pub struct RuleShaper {
    analyzer: TextAnalyzer,
    cache: Option<Arc<ShapingCache>>,
    sink: SharedSink,
}

impl RuleShaper {
    /// A shaper without a cache, reporting diagnostics to the log
    pub fn new() -> Self {
        Self {
            analyzer: TextAnalyzer::new(),
            cache: None,
            sink: log_sink(),
        }
    }

    /// A shaper with its own segment cache
    pub fn with_cache(capacity: usize) -> Self {
        Self {
            cache: Some(Arc::new(ShapingCache::with_capacity(capacity))),
            ..Self::new()
        }
    }

    /// A shaper that shares a cache with other shapers
    pub fn with_shared_cache(cache: Arc<ShapingCache>) -> Self {
        Self {
            cache: Some(cache),
            ..Self::new()
        }
    }

    /// Caches only when caching is switched on globally
    pub fn from_config(config: &ShapingConfig) -> Self {
        if is_caching_enabled() {
            Self::with_cache(config.cache_capacity)
        } else {
            Self::new()
        }
    }

    /// Sends diagnostics to `sink` instead of the log
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }
}

impl Default for RuleShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl Shaper for RuleShaper {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn shape(
        &self,
        font: &Font,
        script: Tag,
        features: &FeatureSettings,
        text: &str,
        direction: Direction,
    ) -> Result<Segment> {
        let data = font.face_data()?;
        let values = FeatureValues::from_settings(features)?;
        let scaling = Scaling {
            scale: font.scale_x()?,
            round_advances: font.options()?.round_advances,
        };

        if text.is_empty() {
            return Ok(Segment::empty(resolve_direction(text, direction)));
        }

        let cache_key = self.cache.as_ref().map(|_| ShapingCacheKey {
            face_id: font.face_id(),
            scale: scaling.scale.to_bits(),
            round_advances: scaling.round_advances,
            script,
            direction,
            features: values.clone(),
            text: text.to_string(),
        });
        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            if let Some(segment) = cache.get(key) {
                log::trace!("Segment cache hit for {} chars", text.chars().count());
                return Ok(segment);
            }
        }

        let analysis = self.analyzer.analyze(text, direction, script);
        let slots = shape_analysis(&data, &analysis, &values, scaling, self.sink.as_ref())?;
        log::debug!(
            "Shaped {} chars into {} glyphs ({:?})",
            analysis.chars.len(),
            slots.len(),
            analysis.direction
        );
        let segment = Segment::new(slots, analysis.direction);

        if let (Some(cache), Some(key)) = (&self.cache, cache_key) {
            cache.insert(key, segment.clone());
        }
        Ok(segment)
    }

    fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphweave_core::diagnostics::{CollectingSink, Diagnostic};
    use glyphweave_core::Release;
    use glyphweave_face::{Face, FaceOptions};
    use glyphweave_test_fonts::test_font;

    fn setup() -> (Face, Font, FeatureSettings) {
        let face = Face::from_data(test_font(), FaceOptions::Default).unwrap();
        let font = Font::new(20.0, &face).unwrap();
        let settings = FeatureSettings::for_language(&face, "en").unwrap();
        (face, font, settings)
    }

    #[test]
    fn empty_text_gives_empty_segment() {
        let (_face, font, settings) = setup();
        let segment = RuleShaper::new()
            .shape(&font, Tag::NONE, &settings, "", Direction::Auto)
            .unwrap();
        assert!(segment.is_empty().unwrap());
        assert_eq!(segment.direction(), Direction::LeftToRight);
    }

    #[test]
    fn cache_serves_repeated_calls() {
        let (_face, font, settings) = setup();
        let shaper = RuleShaper::with_cache(16);
        let first = shaper
            .shape(&font, Tag::NONE, &settings, "hello", Direction::LeftToRight)
            .unwrap();
        let second = shaper
            .shape(&font, Tag::NONE, &settings, "hello", Direction::LeftToRight)
            .unwrap();
        assert_eq!(first, second);

        let stats = shaper.cache_stats().unwrap();
        assert_eq!((stats.hits, stats.misses), (1, 1));

        shaper.clear_cache();
        assert_eq!(shaper.cache_stats().unwrap().size, 0);
    }

    #[test]
    fn cache_hit_still_checks_the_face() {
        let (mut face, font, settings) = setup();
        let shaper = RuleShaper::with_cache(16);
        shaper
            .shape(&font, Tag::NONE, &settings, "hello", Direction::LeftToRight)
            .unwrap();
        face.release();
        let err = shaper
            .shape(&font, Tag::NONE, &settings, "hello", Direction::LeftToRight)
            .unwrap_err();
        assert!(err.is_released());
    }

    #[test]
    fn missing_glyphs_are_reported_not_fatal() {
        let (_face, font, settings) = setup();
        let sink = Arc::new(CollectingSink::new());
        let shaper = RuleShaper::new().with_sink(sink.clone());
        let segment = shaper
            .shape(&font, Tag::NONE, &settings, "hé", Direction::LeftToRight)
            .unwrap();

        assert_eq!(segment.glyph_ids().unwrap(), vec![4, 0]);
        assert_eq!(
            sink.take(),
            vec![Diagnostic::MissingGlyph {
                ch: 'é',
                cluster: 1
            }]
        );
    }

    #[test]
    fn uncached_shaper_has_no_stats() {
        let shaper = RuleShaper::default();
        assert!(shaper.cache_stats().is_none());
        assert!(!shaper.is_caching());
        assert_eq!(shaper.name(), "rules");
    }
}
