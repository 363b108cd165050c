//! Bidi levels, script runs and joining forms for any text
//!
//! Every analysis must cover each character once and give runs that tile
//! the text without gaps.

#![no_main]

use glyphweave_core::types::{Direction, Tag};
use glyphweave_unicode::{visual_order, TextAnalyzer};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if text.len() > 10_000 {
        return;
    }

    let analyzer = TextAnalyzer::new();
    for direction in [Direction::LeftToRight, Direction::RightToLeft, Direction::Auto] {
        let analysis = analyzer.analyze(&text, direction, Tag::NONE);
        assert_eq!(analysis.chars.len(), text.chars().count());

        let mut end = 0;
        for run in &analysis.runs {
            assert_eq!(run.range.start, end);
            end = run.range.end;
        }
        assert_eq!(end, analysis.chars.len());

        let levels: Vec<u8> = analysis.chars.iter().map(|info| info.level).collect();
        let mut order = visual_order(&levels);
        order.sort_unstable();
        assert!(order.iter().copied().eq(0..levels.len()));
    }
});
