use super::*;
use glyphweave_core::diagnostics::NullSink;
use glyphweave_face::{Face, FaceOptions};
use proptest::prelude::*;
use std::sync::Arc;

fn shaper() -> RuleShaper {
    RuleShaper::new().with_sink(Arc::new(NullSink))
}

fn fixture() -> (Face, Font, FeatureSettings) {
    let face = Face::from_data(glyphweave_test_fonts::test_font(), FaceOptions::Default).unwrap();
    let font = Font::new(20.0, &face).unwrap();
    let settings = FeatureSettings::for_language(&face, "en").unwrap();
    (face, font, settings)
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::LeftToRight),
        Just(Direction::RightToLeft),
        Just(Direction::Auto),
    ]
}

// Text drawn mostly from characters the test font covers
fn covered_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            'h', 'e', 'l', 'o', ' ', 'w', 'r', 'd', 'f', 'i', 'a', '(', ')', '\u{0301}',
            '\u{0627}', '\u{0628}', 'x', '1',
        ]),
        0..24,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

// Property: total advance is the sum of slot advances
proptest! {
    #[test]
    fn prop_total_advance_is_sum(text in covered_text(), dir in direction()) {
        let (_face, font, settings) = fixture();
        let segment = shaper().shape(&font, Tag::NONE, &settings, &text, dir).unwrap();
        let sum: f32 = segment.slots().unwrap().iter().map(|slot| slot.advance).sum();
        prop_assert_eq!(segment.total_advance().unwrap(), sum);
    }
}

// Property: identical inputs give bit-identical segments
proptest! {
    #[test]
    fn prop_shaping_is_deterministic(text in covered_text(), dir in direction()) {
        let (_face, font, settings) = fixture();
        let first = shaper().shape(&font, Tag::NONE, &settings, &text, dir).unwrap();
        let second = shaper().shape(&font, Tag::NONE, &settings, &text, dir).unwrap();
        prop_assert_eq!(first, second);
    }
}

// Property: never more glyphs than characters, and every cluster is a char index
proptest! {
    #[test]
    fn prop_slots_stay_within_text(text in "\\PC{0,30}", dir in direction()) {
        let (_face, font, settings) = fixture();
        let segment = shaper().shape(&font, Tag::NONE, &settings, &text, dir).unwrap();
        let chars = text.chars().count();
        prop_assert!(segment.len().unwrap() <= chars);
        for slot in segment.slots().unwrap() {
            prop_assert!((slot.cluster as usize) < chars.max(1));
        }
    }
}
