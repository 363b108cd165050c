//! Glyphweave - complex-text shaping in four calls
//!
//! Shaping text with Glyphweave follows one lifecycle:
//! 1. Load a [`Face`] from a font file
//! 2. Derive [`FeatureSettings`] for a language
//! 3. Bind the face to a size with [`create_font`]
//! 4. [`shape`] text into a [`Segment`] of positioned glyphs
//!
//! Every resource can be released early with [`release`]. Using it afterwards
//! fails with a `Released` error rather than reading freed data.
//!
//! # Example
//!
//! ```
//! use glyphweave::prelude::*;
//!
//! let face = Face::from_data(glyphweave_test_fonts::test_font(), FaceOptions::Default)?;
//! let features = glyphweave::features_for_language(&face, "en")?;
//! let font = glyphweave::create_font(&face, 20.0)?;
//!
//! let segment = glyphweave::shape(&font, Tag::NONE, &features, "hello", Direction::Auto)?;
//! assert_eq!(segment.len()?, 5);
//! # Ok::<(), GlyphweaveError>(())
//! ```
//!
//! # Configuration
//!
//! The free functions use an [`Engine`] built once from `GLYPHWEAVE_*`
//! environment variables. Build an [`Engine`] yourself to pass a config or a
//! diagnostics sink explicitly.
//!
//! # Feature Flags
//!
//! - `unicode`: re-export the Unicode analysis crate as [`unicode`]

use std::path::Path;
use std::sync::{Arc, OnceLock};

pub use glyphweave_core::{
    cache::CacheStats, diagnostics, error, lifecycle, types, Diagnostic, DiagnosticSink,
    GlyphweaveError, LanguageFallback, Release, Result, Scoped, ShapingConfig, SharedSink,
};
pub use glyphweave_face::{Face, FaceOptions, FeatureCatalog, FeatureSettings, TableBlob};
pub use glyphweave_shape::{Font, FontOptions, RuleShaper, Segment, Shaper, ShapingCache};

#[cfg(feature = "unicode")]
pub use glyphweave_unicode as unicode;

use glyphweave_core::diagnostics::log_sink;
use glyphweave_core::types::{Direction, Tag};

/// Common imports for typical usage
pub mod prelude {
    pub use glyphweave_core::{
        error::{GlyphweaveError, Result},
        lifecycle::{Release, Scoped},
        types::{Direction, Slot, Tag},
        ShapingConfig,
    };
    pub use glyphweave_face::{Face, FaceOptions, FeatureSettings};
    pub use glyphweave_shape::{Font, Segment, Shaper};

    pub use crate::Engine;
}

/// Configuration, diagnostics and a shaper, bundled
///
/// An engine is cheap to share between threads; its shaper cache is
/// internally synchronized.
pub struct Engine {
    config: ShapingConfig,
    shaper: RuleShaper,
    sink: SharedSink,
}

impl Engine {
    /// An engine reporting diagnostics to the log
    pub fn new(config: ShapingConfig) -> Self {
        Self::with_sink(config, log_sink())
    }

    pub fn with_sink(config: ShapingConfig, sink: SharedSink) -> Self {
        let shaper = RuleShaper::from_config(&config).with_sink(sink.clone());
        Self {
            config,
            shaper,
            sink,
        }
    }

    pub fn config(&self) -> &ShapingConfig {
        &self.config
    }

    pub fn shaper(&self) -> &RuleShaper {
        &self.shaper
    }

    /// Segment cache statistics, `None` when caching is off
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.shaper.cache_stats()
    }

    pub fn load_face(&self, path: impl AsRef<Path>, options: FaceOptions) -> Result<Face> {
        Face::load(path, options)
    }

    /// Feature values for `language`, following the configured fallback policy
    pub fn features_for_language(&self, face: &Face, language: &str) -> Result<FeatureSettings> {
        FeatureSettings::for_language_with(
            face,
            language,
            self.config.language_fallback,
            self.sink.as_ref(),
        )
    }

    /// A font at `point_size`, scaled with the configured pixels per point
    pub fn create_font(&self, face: &Face, point_size: f32) -> Result<Font> {
        Font::with_options(point_size, face, FontOptions::from_config(&self.config))
    }

    pub fn shape(
        &self,
        font: &Font,
        script: Tag,
        features: &FeatureSettings,
        text: &str,
        direction: Direction,
    ) -> Result<Segment> {
        self.shaper.shape(font, script, features, text, direction)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(ShapingConfig::default())
    }
}

static DEFAULT_ENGINE: OnceLock<Arc<Engine>> = OnceLock::new();

/// The engine behind the free functions
///
/// Built on first use from the environment. An invalid environment falls
/// back to the default configuration with a warning.
pub fn default_engine() -> Arc<Engine> {
    DEFAULT_ENGINE
        .get_or_init(|| {
            let config = ShapingConfig::from_env().unwrap_or_else(|err| {
                log::warn!("Ignoring environment configuration: {err}");
                ShapingConfig::default()
            });
            log::debug!("Default engine: {config:?}");
            Arc::new(Engine::new(config))
        })
        .clone()
}

/// Load a face from a font file
pub fn load_face(path: impl AsRef<Path>, options: FaceOptions) -> Result<Face> {
    default_engine().load_face(path, options)
}

/// Feature values `face` defines for `language`
pub fn features_for_language(face: &Face, language: &str) -> Result<FeatureSettings> {
    default_engine().features_for_language(face, language)
}

/// Bind `face` to a point size
pub fn create_font(face: &Face, point_size: f32) -> Result<Font> {
    default_engine().create_font(face, point_size)
}

/// Shape `text` into positioned glyphs
///
/// A zero `script` ([`Tag::NONE`]) detects the script of each run.
pub fn shape(
    font: &Font,
    script: Tag,
    features: &FeatureSettings,
    text: &str,
    direction: Direction,
) -> Result<Segment> {
    default_engine().shape(font, script, features, text, direction)
}

/// Release any resource. Releasing twice is a no-op.
pub fn release<R: Release + ?Sized>(resource: &mut R) {
    resource.release();
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphweave_core::diagnostics::CollectingSink;
    use glyphweave_test_fonts::{bare_font, test_font};

    #[test]
    fn strict_engine_refuses_featureless_faces() {
        let config = ShapingConfig {
            language_fallback: LanguageFallback::Strict,
            ..ShapingConfig::default()
        };
        let engine = Engine::new(config);
        let face = Face::from_data(bare_font(), FaceOptions::Default).unwrap();
        let err = engine.features_for_language(&face, "en").unwrap_err();
        assert!(matches!(err, GlyphweaveError::UnsupportedLanguage(_)));
    }

    #[test]
    fn lenient_engine_reports_the_fallback() {
        let sink = Arc::new(CollectingSink::new());
        let engine = Engine::with_sink(ShapingConfig::default(), sink.clone());
        let face = Face::from_data(bare_font(), FaceOptions::Default).unwrap();
        let settings = engine.features_for_language(&face, "en").unwrap();
        assert!(settings.is_empty().unwrap());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn pixels_per_point_scales_fonts() {
        let config = ShapingConfig {
            pixels_per_point: 2.0,
            ..ShapingConfig::default()
        };
        let face = Face::from_data(test_font(), FaceOptions::Default).unwrap();
        let single = Engine::default().create_font(&face, 10.0).unwrap();
        let double = Engine::new(config).create_font(&face, 10.0).unwrap();
        assert_eq!(double.scale_x().unwrap(), 2.0 * single.scale_x().unwrap());
    }

    #[test]
    fn release_is_idempotent() {
        let mut face = Face::from_data(test_font(), FaceOptions::Default).unwrap();
        release(&mut face);
        release(&mut face);
        assert!(face.is_released());
    }
}
