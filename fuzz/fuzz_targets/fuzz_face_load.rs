//! Malformed font files must fail to load or shape cleanly, never panic
//!
//! Arbitrary bytes go through face loading, feature catalog parsing (Feat,
//! Sill and GSUB feature lists) and one shaping call, so broken GSUB and
//! GPOS data is exercised as well.

#![no_main]

use glyphweave_core::diagnostics::NullSink;
use glyphweave_core::types::{Direction, Tag};
use glyphweave_core::LanguageFallback;
use glyphweave_face::{Face, FaceOptions, FeatureSettings};
use glyphweave_shape::{Font, RuleShaper, Shaper};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    // Nothing shorter than a table directory header parses
    if data.len() < 12 || data.len() > 1_000_000 {
        return;
    }

    for options in [FaceOptions::Default, FaceOptions::GlyphOnly] {
        let Ok(face) = Face::from_data(data.to_vec(), options) else {
            continue;
        };
        let _ = face.units_per_em();
        let _ = face.glyph_count();
        let _ = face.feature_catalog();
        let _ = face.table_lookup(Tag::new(b"GSUB"));

        let Ok(features) =
            FeatureSettings::for_language_with(&face, "de", LanguageFallback::Empty, &NullSink)
        else {
            continue;
        };
        let Ok(font) = Font::new(12.0, &face) else {
            continue;
        };
        let shaper = RuleShaper::new().with_sink(Arc::new(NullSink));
        let _ = shaper.shape(&font, Tag::NONE, &features, "office \u{0628}\u{0628}", Direction::Auto);
    }
});
