//! Glyphweave shaping: fonts, segments and the rules that connect them
//!
//! A [`Font`] binds a face to a size. A [`Shaper`] turns text into a
//! [`Segment`] of positioned glyphs using that font and a set of feature
//! values. [`RuleShaper`] is the shaper that applies the face's GSUB and
//! GPOS rules.
//!
//! ```
//! use glyphweave_core::types::{Direction, Tag};
//! use glyphweave_face::{Face, FaceOptions, FeatureSettings};
//! use glyphweave_shape::{Font, RuleShaper, Shaper};
//!
//! let face = Face::from_data(glyphweave_test_fonts::test_font(), FaceOptions::Default)?;
//! let font = Font::new(20.0, &face)?;
//! let features = FeatureSettings::for_language(&face, "en")?;
//!
//! let segment = RuleShaper::new().shape(&font, Tag::NONE, &features, "hello", Direction::LeftToRight)?;
//! assert_eq!(segment.len()?, 5);
//! # Ok::<(), glyphweave_core::GlyphweaveError>(())
//! ```

pub mod buffer;
pub mod cache;
pub mod font;
pub mod gpos;
pub mod gsub;
pub mod pipeline;
pub mod plan;
pub mod segment;
pub mod shaper;

#[cfg(test)]
mod proptests;

use glyphweave_core::types::{Direction, Tag};
use glyphweave_core::Result;
use glyphweave_face::FeatureSettings;

pub use cache::{ShapingCache, ShapingCacheKey};
pub use font::{Font, FontOptions};
pub use plan::FeatureValues;
pub use segment::Segment;
pub use shaper::RuleShaper;

/// Turns text into positioned glyphs
pub trait Shaper: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Shape `text` with `font` and `features`
    ///
    /// A zero `script` detects the script per run. Fails only when the font,
    /// its face or the settings have been released.
    fn shape(
        &self,
        font: &Font,
        script: Tag,
        features: &FeatureSettings,
        text: &str,
        direction: Direction,
    ) -> Result<Segment>;

    /// Drop any cached results
    fn clear_cache(&self) {}
}
