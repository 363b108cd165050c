use super::*;
use proptest::prelude::*;

// Property: runs tile the text exactly, in order
proptest! {
    #[test]
    fn prop_runs_cover_every_char(s in "\\PC{0,40}") {
        let analysis = TextAnalyzer::new().analyze(&s, Direction::Auto, Tag::NONE);
        let mut expected_start = 0;
        for run in &analysis.runs {
            prop_assert_eq!(run.range.start, expected_start);
            prop_assert!(run.range.end > run.range.start);
            expected_start = run.range.end;
        }
        prop_assert_eq!(expected_start, s.chars().count());
    }
}

// Property: visual order is a permutation of logical indices
proptest! {
    #[test]
    fn prop_visual_order_is_permutation(levels in prop::collection::vec(0u8..4, 0..30)) {
        let mut order = visual_order(&levels);
        order.sort_unstable();
        prop_assert_eq!(order, (0..levels.len()).collect::<Vec<_>>());
    }
}

// Property: clusters never decrease and never point past their character
proptest! {
    #[test]
    fn prop_clusters_are_monotonic(s in "\\PC{0,40}") {
        let analysis = TextAnalyzer::new().analyze(&s, Direction::LeftToRight, Tag::NONE);
        let mut previous = 0u32;
        for (index, info) in analysis.chars.iter().enumerate() {
            prop_assert!(info.cluster >= previous);
            prop_assert!(info.cluster as usize <= index);
            previous = info.cluster;
        }
    }
}

// Property: Auto never survives resolution
proptest! {
    #[test]
    fn prop_auto_is_resolved(s in "\\PC{0,20}") {
        let resolved = resolve_direction(&s, Direction::Auto);
        prop_assert_ne!(resolved, Direction::Auto);
    }
}
