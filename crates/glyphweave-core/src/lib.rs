//! Glyphweave Core: the vocabulary every shaping stage speaks
//!
//! A face is loaded, feature values are derived for a language, a font binds
//! the face to a size, and a segment comes out of each shaping call. This
//! crate holds what those pieces share:
//!
//! - [`types`] - tags, directions and the [`types::Slot`] a segment is made of
//! - [`error`] - the error taxonomy (`ResourceError`, `InvalidArgument`, ...)
//! - [`diagnostics`] - where non-fatal shaping warnings go
//! - [`lifecycle`] - idempotent release and scoped acquisition
//! - [`config`] - runtime configuration, environment overrides included
//! - [`cache`] - the LRU store behind the segment cache
//!
//! ```
//! use glyphweave_core::types::{Direction, Tag};
//!
//! let liga = Tag::new(b"liga");
//! assert_eq!(liga.to_string(), "liga");
//! assert_eq!(Direction::default(), Direction::LeftToRight);
//! ```

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lifecycle;

pub use config::{LanguageFallback, ShapingConfig};
pub use diagnostics::{Diagnostic, DiagnosticSink, SharedSink};
pub use error::{GlyphweaveError, ResourceError, ResourceKind, Result};
pub use lifecycle::{Release, ResourceCell, Scoped};

/// The data structures shared by faces, fonts and segments
pub mod types {
    use std::fmt;
    use std::str::FromStr;

    use crate::error::GlyphweaveError;

    /// Unique identifier for a glyph within a face
    pub type GlyphId = u32;

    /// The glyph every face reserves for characters it cannot draw
    pub const NOTDEF: GlyphId = 0;

    /// A four byte code naming a table, feature, script or language
    ///
    /// OpenType tags are printable ASCII padded with spaces. Graphite feature
    /// ids may be plain numbers and language codes are padded with NUL bytes,
    /// so the tag stores the raw big-endian value and prints whichever form
    /// makes sense.
    #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Tag(u32);

    impl Tag {
        /// The zero tag, used as "auto-detect" for scripts
        pub const NONE: Tag = Tag(0);

        pub const fn new(bytes: &[u8; 4]) -> Self {
            Tag(u32::from_be_bytes(*bytes))
        }

        pub const fn from_u32(raw: u32) -> Self {
            Tag(raw)
        }

        pub const fn to_u32(self) -> u32 {
            self.0
        }

        pub const fn to_bytes(self) -> [u8; 4] {
            self.0.to_be_bytes()
        }

        pub const fn is_none(self) -> bool {
            self.0 == 0
        }

        /// Builds a tag from one to four ASCII characters, space padded
        pub fn parse(text: &str) -> Option<Tag> {
            Self::padded(text, b' ')
        }

        /// Builds a tag from one to four ASCII characters, padded with `pad`
        pub fn padded(text: &str, pad: u8) -> Option<Tag> {
            let bytes = text.as_bytes();
            if bytes.is_empty() || bytes.len() > 4 || !bytes.iter().all(u8::is_ascii_graphic) {
                return None;
            }
            let mut raw = [pad; 4];
            raw[..bytes.len()].copy_from_slice(bytes);
            Some(Tag::new(&raw))
        }

        fn is_printable(self) -> bool {
            let bytes = self.to_bytes();
            bytes[0].is_ascii_graphic()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_graphic() || *b == b' ' || *b == 0)
        }
    }

    impl fmt::Display for Tag {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if self.is_printable() {
                for byte in self.to_bytes().iter().filter(|b| **b != 0) {
                    write!(f, "{}", *byte as char)?;
                }
                Ok(())
            } else {
                write!(f, "0x{:08x}", self.0)
            }
        }
    }

    impl fmt::Debug for Tag {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Tag({self})")
        }
    }

    impl FromStr for Tag {
        type Err = GlyphweaveError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Tag::parse(s)
                .ok_or_else(|| GlyphweaveError::InvalidArgument(format!("invalid tag {s:?}")))
        }
    }

    /// Which way a paragraph flows
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub enum Direction {
        /// Paragraph level 0. Pure left-to-right text is never reordered.
        #[default]
        LeftToRight,
        /// Paragraph level 1
        RightToLeft,
        /// Resolved once from the dominant strong direction of the text
        Auto,
    }

    impl Direction {
        pub fn is_rtl(self) -> bool {
            matches!(self, Direction::RightToLeft)
        }
    }

    /// One positioned glyph inside a segment
    ///
    /// Values are in pixels. `x_offset`/`y_offset` move the glyph away from
    /// its pen position; `advance` moves the pen.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Slot {
        pub id: GlyphId,
        pub advance: f32,
        pub x_offset: f32,
        pub y_offset: f32,
        /// Index of the first source character (in code points) of this cluster
        pub cluster: u32,
        /// Resolved bidi embedding level; odd levels are right-to-left
        pub level: u8,
    }

    impl Slot {
        pub fn is_rtl(&self) -> bool {
            self.level % 2 == 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::types::*;

    #[test]
    fn tag_round_trips_through_text() {
        let tag: Tag = "kern".parse().unwrap();
        assert_eq!(tag, Tag::new(b"kern"));
        assert_eq!(tag.to_string(), "kern");
        assert_eq!(format!("{tag:?}"), "Tag(kern)");
    }

    #[test]
    fn short_tags_are_space_padded() {
        let tag = Tag::parse("ss").unwrap();
        assert_eq!(tag.to_bytes(), *b"ss  ");
        assert_eq!(Tag::padded("en", 0).unwrap().to_bytes(), *b"en\0\0");
    }

    #[test]
    fn numeric_tags_print_as_hex() {
        let tag = Tag::from_u32(1);
        assert_eq!(tag.to_string(), "0x00000001");
    }

    #[test]
    fn invalid_tags_are_rejected() {
        assert!(Tag::parse("").is_none());
        assert!(Tag::parse("toolong").is_none());
        assert!("l ga".parse::<Tag>().is_err());
    }

    #[test]
    fn slot_level_parity_gives_direction() {
        let slot = Slot {
            id: 1,
            advance: 10.0,
            x_offset: 0.0,
            y_offset: 0.0,
            cluster: 0,
            level: 1,
        };
        assert!(slot.is_rtl());
        assert!(!Slot { level: 2, ..slot }.is_rtl());
    }
}
