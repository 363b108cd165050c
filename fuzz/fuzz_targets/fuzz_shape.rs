//! Shape arbitrary text with the synthetic test font
//!
//! Checks the properties every segment keeps: no more glyphs than
//! characters, clusters inside the text, and a total advance equal to the
//! sum of the slot advances.

#![no_main]

use glyphweave_core::diagnostics::NullSink;
use glyphweave_core::types::{Direction, Tag};
use glyphweave_face::{Face, FaceOptions, FeatureSettings};
use glyphweave_shape::{Font, RuleShaper, Shaper};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let text = String::from_utf8_lossy(rest);
    if text.len() > 4_096 {
        return;
    }

    let direction = match selector % 3 {
        0 => Direction::LeftToRight,
        1 => Direction::RightToLeft,
        _ => Direction::Auto,
    };
    let language = ["en", "de", "tr", "ar"][usize::from(selector / 3) % 4];

    let face = Face::from_data(glyphweave_test_fonts::test_font(), FaceOptions::Default).unwrap();
    let features = FeatureSettings::for_language(&face, language).unwrap();
    let font = Font::new(16.0, &face).unwrap();
    let shaper = RuleShaper::new().with_sink(Arc::new(NullSink));

    let segment = shaper.shape(&font, Tag::NONE, &features, &text, direction).unwrap();
    let slots = segment.slots().unwrap();
    let chars = text.chars().count();
    assert!(slots.len() <= chars);
    assert!(slots.iter().all(|slot| (slot.cluster as usize) < chars));

    let sum: f32 = slots.iter().map(|slot| slot.advance).sum();
    assert_eq!(segment.total_advance().unwrap(), sum);
});
