//! Paragraph direction, embedding levels and visual order

use glyphweave_core::types::Direction;
use icu_properties::props::BidiMirroringGlyph;
use icu_properties::CodePointMapData;
use unicode_bidi::{bidi_class, BidiClass, BidiInfo, Level};

/// Turns `Auto` into a concrete direction; explicit directions pass through
pub fn resolve_direction(text: &str, requested: Direction) -> Direction {
    match requested {
        Direction::Auto => dominant_direction(text),
        explicit => explicit,
    }
}

/// The direction most strong characters of `text` agree on
///
/// Left-to-right letters count against right-to-left and Arabic letters. A
/// tie goes to whichever strong character comes first; text without any
/// strong character is left-to-right.
pub fn dominant_direction(text: &str) -> Direction {
    let mut ltr = 0usize;
    let mut rtl = 0usize;
    let mut first_is_rtl = None;

    for ch in text.chars() {
        let is_rtl = match bidi_class(ch) {
            BidiClass::L => false,
            BidiClass::R | BidiClass::AL => true,
            _ => continue,
        };
        if is_rtl {
            rtl += 1;
        } else {
            ltr += 1;
        }
        first_is_rtl.get_or_insert(is_rtl);
    }

    if rtl > ltr || (rtl == ltr && first_is_rtl == Some(true)) {
        Direction::RightToLeft
    } else {
        Direction::LeftToRight
    }
}

/// The paragraph embedding level for a resolved direction
pub fn paragraph_level(direction: Direction) -> u8 {
    if direction.is_rtl() {
        1
    } else {
        0
    }
}

/// Resolved embedding level of every character, line rules applied
///
/// `direction` must already be resolved; `Auto` is treated as left-to-right.
/// Each paragraph of `text` is treated as a single line.
pub fn char_levels(text: &str, direction: Direction) -> Vec<u8> {
    if text.is_empty() {
        return Vec::new();
    }

    let base = if direction.is_rtl() {
        Level::rtl()
    } else {
        Level::ltr()
    };
    let info = BidiInfo::new(text, Some(base));

    let mut per_byte = info.levels.clone();
    for para in &info.paragraphs {
        let line = para.range.clone();
        let reordered = info.reordered_levels(para, line.clone());
        per_byte[line.clone()].copy_from_slice(&reordered[line]);
    }

    text.char_indices()
        .map(|(byte, _)| per_byte[byte].number())
        .collect()
}

/// Logical indices in visual order, rule L2 applied to `levels`
pub fn visual_order(levels: &[u8]) -> Vec<usize> {
    let levels: Vec<Level> = levels
        .iter()
        .map(|&number| Level::new(number).unwrap_or_else(|_| Level::ltr()))
        .collect();
    BidiInfo::reorder_visual(&levels)
}

/// The character drawn in place of `ch` on a right-to-left level
///
/// Follows the Unicode `Bidi_Mirroring_Glyph` property, so brackets,
/// relational operators and set symbols all flip.
pub fn mirrored(ch: char) -> Option<char> {
    CodePointMapData::<BidiMirroringGlyph>::new()
        .get(ch)
        .mirroring_glyph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_picks_the_majority() {
        assert_eq!(dominant_direction("hello"), Direction::LeftToRight);
        assert_eq!(dominant_direction("שלום a"), Direction::RightToLeft);
        assert_eq!(dominant_direction("ab שלום"), Direction::RightToLeft);
        assert_eq!(dominant_direction("123 !?"), Direction::LeftToRight);
    }

    #[test]
    fn ties_follow_the_first_strong_character() {
        assert_eq!(dominant_direction("ab של"), Direction::LeftToRight);
        assert_eq!(dominant_direction("של ab"), Direction::RightToLeft);
    }

    #[test]
    fn explicit_directions_are_kept() {
        assert_eq!(
            resolve_direction("שלום", Direction::LeftToRight),
            Direction::LeftToRight
        );
        assert_eq!(
            resolve_direction("hello", Direction::Auto),
            Direction::LeftToRight
        );
    }

    #[test]
    fn latin_in_rtl_paragraph_is_level_two() {
        let levels = char_levels("hello world", Direction::RightToLeft);
        assert_eq!(levels, vec![2; 11]);
        assert_eq!(visual_order(&levels), (0..11).collect::<Vec<_>>());
    }

    #[test]
    fn hebrew_in_ltr_paragraph_is_reversed() {
        let levels = char_levels("ab אבג", Direction::LeftToRight);
        assert_eq!(levels, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(visual_order(&levels), vec![0, 1, 2, 5, 4, 3]);
    }

    #[test]
    fn brackets_mirror_both_ways() {
        assert_eq!(mirrored('('), Some(')'));
        assert_eq!(mirrored('»'), Some('«'));
        assert_eq!(mirrored('a'), None);
    }

    #[test]
    fn operators_and_set_symbols_mirror() {
        for (ch, mirror) in [('≤', '≥'), ('∈', '∋'), ('⁅', '⁆'), ('⟨', '⟩'), ('⦃', '⦄')] {
            assert_eq!(mirrored(ch), Some(mirror), "{ch}");
            assert_eq!(mirrored(mirror), Some(ch), "{mirror}");
        }
    }
}
