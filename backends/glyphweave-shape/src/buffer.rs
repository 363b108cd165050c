//! Working storage for glyphs between pipeline stages
//!
//! Everything here is in font design units and in logical order. Scaling
//! and reordering happen only when the buffer is turned into slots.

use glyphweave_core::types::{GlyphId, Tag};
use glyphweave_unicode::JoiningForm;

/// A glyph while rules are being applied to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphInfo {
    pub glyph: GlyphId,
    pub cluster: u32,
    pub level: u8,
    pub script: Tag,
    pub form: Option<JoiningForm>,
    pub is_mark: bool,
    pub advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    /// Base glyph index and anchor delta for an attached mark
    pub attachment: Option<Attachment>,
}

/// Where a mark sits relative to its base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub base: usize,
    pub dx: i32,
    pub dy: i32,
}

impl GlyphInfo {
    pub fn new(glyph: GlyphId, cluster: u32, level: u8, script: Tag) -> Self {
        Self {
            glyph,
            cluster,
            level,
            script,
            form: None,
            is_mark: false,
            advance: 0,
            x_offset: 0,
            y_offset: 0,
            attachment: None,
        }
    }
}

/// Index of the next glyph at or after `from` that a lookup does not skip
pub fn next_unskipped(glyphs: &[GlyphInfo], from: usize, ignore_marks: bool) -> Option<usize> {
    (from..glyphs.len()).find(|&i| !(ignore_marks && glyphs[i].is_mark))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_are_skipped_only_when_asked() {
        let latn = Tag::new(b"latn");
        let mut glyphs = vec![
            GlyphInfo::new(9, 0, 0, latn),
            GlyphInfo::new(13, 0, 0, latn),
            GlyphInfo::new(10, 2, 0, latn),
        ];
        glyphs[1].is_mark = true;

        assert_eq!(next_unskipped(&glyphs, 1, true), Some(2));
        assert_eq!(next_unskipped(&glyphs, 1, false), Some(1));
        assert_eq!(next_unskipped(&glyphs, 3, true), None);
    }
}
