// this_file: crates/glyphweave-unicode/src/lib.rs

//! Unicode analysis ahead of glyph mapping.
//!
//! [`TextAnalyzer::analyze`] looks at a string once and returns everything
//! the shaping stages need per character: its cluster, its resolved bidi
//! level, its script, its joining form and whether it is a mark. It also cuts
//! the text into runs of uniform level and script.
//!
//! ```
//! use glyphweave_core::types::{Direction, Tag};
//! use glyphweave_unicode::TextAnalyzer;
//!
//! let analysis = TextAnalyzer::new().analyze("hello world", Direction::LeftToRight, Tag::NONE);
//! assert_eq!(analysis.runs.len(), 1);
//! assert_eq!(analysis.runs[0].script, Tag::new(b"latn"));
//! ```

pub mod bidi;
pub mod joining;
pub mod script;

use std::ops::Range;

use glyphweave_core::types::{Direction, Tag};
use icu_properties::props::{BidiMirroringGlyph, GeneralCategory, JoiningType, Script};
use icu_properties::{CodePointMapData, CodePointMapDataBorrowed};
use icu_segmenter::GraphemeClusterSegmenter;

pub use bidi::{char_levels, dominant_direction, mirrored, resolve_direction, visual_order};
pub use joining::{Joining, JoiningForm};
pub use script::{ot_script_tag, DEFAULT_SCRIPT};

/// What the shaping stages need to know about one character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharInfo {
    pub ch: char,
    /// Code point index of the first character of its grapheme cluster
    pub cluster: u32,
    /// Resolved embedding level
    pub level: u8,
    /// OpenType script tag of the run this character belongs to
    pub script: Tag,
    pub form: Option<JoiningForm>,
    /// Nonspacing or enclosing mark
    pub is_mark: bool,
    /// Mirrored counterpart, set only on right-to-left levels
    pub mirror: Option<char>,
}

/// A maximal stretch of characters sharing one level and one script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Code point indices into the analyzed text
    pub range: Range<usize>,
    pub level: u8,
    pub script: Tag,
}

impl Run {
    pub fn is_rtl(&self) -> bool {
        self.level % 2 == 1
    }
}

/// Result of [`TextAnalyzer::analyze`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// `Auto` already resolved to a concrete direction
    pub direction: Direction,
    pub chars: Vec<CharInfo>,
    pub runs: Vec<Run>,
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Looks up Unicode properties with ICU data baked in
pub struct TextAnalyzer {
    script_map: CodePointMapDataBorrowed<'static, Script>,
    joining_map: CodePointMapDataBorrowed<'static, JoiningType>,
    category_map: CodePointMapDataBorrowed<'static, GeneralCategory>,
    mirror_map: CodePointMapDataBorrowed<'static, BidiMirroringGlyph>,
}

impl TextAnalyzer {
    pub fn new() -> Self {
        Self {
            script_map: CodePointMapData::<Script>::new(),
            joining_map: CodePointMapData::<JoiningType>::new(),
            category_map: CodePointMapData::<GeneralCategory>::new(),
            mirror_map: CodePointMapData::<BidiMirroringGlyph>::new(),
        }
    }

    /// Analyze `text` for shaping
    ///
    /// `direction` may be `Auto`; it is resolved once for the whole text.
    /// A non-zero `script` overrides script detection for every run.
    pub fn analyze(&self, text: &str, direction: Direction, script: Tag) -> Analysis {
        let direction = resolve_direction(text, direction);
        if text.is_empty() {
            return Analysis {
                direction,
                chars: Vec::new(),
                runs: Vec::new(),
            };
        }

        let chars: Vec<char> = text.chars().collect();
        let levels = char_levels(text, direction);
        let clusters = grapheme_clusters(text);
        let scripts = if script.is_none() {
            self.resolve_scripts(&chars)
        } else {
            vec![script; chars.len()]
        };
        let joining: Vec<Joining> = chars
            .iter()
            .map(|&ch| Joining::from_icu(self.joining_map.get(ch)))
            .collect();
        let forms = joining::resolve_forms(&joining);

        let infos: Vec<CharInfo> = chars
            .iter()
            .enumerate()
            .map(|(i, &ch)| CharInfo {
                ch,
                cluster: clusters[i],
                level: levels[i],
                script: scripts[i],
                form: forms[i],
                is_mark: self.is_mark(ch),
                mirror: (levels[i] % 2 == 1).then(|| self.mirror_of(ch)).flatten(),
            })
            .collect();

        let runs = split_runs(&infos);
        log::debug!(
            "Analyzed {} chars into {} runs ({:?})",
            infos.len(),
            runs.len(),
            direction
        );

        Analysis {
            direction,
            chars: infos,
            runs,
        }
    }

    pub fn script_of(&self, ch: char) -> Script {
        self.script_map.get(ch)
    }

    /// `Bidi_Mirroring_Glyph` of `ch`
    pub fn mirror_of(&self, ch: char) -> Option<char> {
        self.mirror_map.get(ch).mirroring_glyph
    }

    pub fn is_mark(&self, ch: char) -> bool {
        matches!(
            self.category_map.get(ch),
            GeneralCategory::NonspacingMark | GeneralCategory::EnclosingMark
        )
    }

    /// OpenType script tag per character, neutrals absorbed by their neighbours
    fn resolve_scripts(&self, chars: &[char]) -> Vec<Tag> {
        let mut resolved: Vec<Option<Tag>> = chars
            .iter()
            .map(|&ch| {
                let script = self.script_map.get(ch);
                script::is_significant_script(script).then(|| ot_script_tag(script))
            })
            .collect();

        // Neutrals continue the run before them; leading neutrals take the
        // first real script that follows.
        let mut current = None;
        for slot in resolved.iter_mut() {
            match slot {
                Some(tag) => current = Some(*tag),
                None => *slot = current,
            }
        }
        let first = resolved.iter().flatten().next().copied();
        resolved
            .into_iter()
            .map(|tag| tag.or(first).unwrap_or(DEFAULT_SCRIPT))
            .collect()
    }
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Code point index of the grapheme cluster start for every character
fn grapheme_clusters(text: &str) -> Vec<u32> {
    let boundaries: Vec<usize> = GraphemeClusterSegmenter::new().segment_str(text).collect();
    let mut clusters = Vec::with_capacity(text.len());
    let mut next_boundary = boundaries.iter().peekable();
    let mut cluster = 0u32;

    for (index, (byte, _)) in text.char_indices().enumerate() {
        while let Some(&&boundary) = next_boundary.peek() {
            if boundary > byte {
                break;
            }
            if boundary == byte {
                cluster = index as u32;
            }
            next_boundary.next();
        }
        clusters.push(cluster);
    }
    clusters
}

fn split_runs(chars: &[CharInfo]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for (index, info) in chars.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.level == info.level && run.script == info.script => {
                run.range.end = index + 1;
            }
            _ => runs.push(Run {
                range: index..index + 1,
                level: info.level,
                script: info.script,
            }),
        }
    }
    runs
}


#[cfg(test)]
mod proptests;
