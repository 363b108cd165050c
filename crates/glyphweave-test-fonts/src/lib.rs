// this_file: crates/glyphweave-test-fonts/src/lib.rs

//! Deterministic fonts for tests, built in memory
//!
//! The fonts are tiny but real: a table directory, `head`, `hhea`, `maxp`,
//! `hmtx` and a format 4 `cmap`, plus GSUB and GPOS rules and the Graphite
//! `Feat` and `Sill` tables in the full variant. No outlines; shaping never
//! needs them.
//!
//! | Glyph | Id | Advance | Notes |
//! |---|---|---|---|
//! | `.notdef` | 0 | 500 | |
//! | space | 1 | 250 | |
//! | d e h l o r w | 2-8 | see [`ADVANCES`] | |
//! | f i | 9, 10 | 300, 250 | `liga` forms `f_i` (11) |
//! | `l_l` | 12 | 480 | `dlig` ligature of `l l` |
//! | acute U+0301 | 13 | 0 | attaches to e, o, a via `mark` |
//! | alef U+0627 | 14 | 250 | right-joining |
//! | beh U+0628 | 15 | 600 | `init`/`medi`/`fina` give 16/17/18 |
//! | a | 19 | 500 | |
//! | `e.alt` | 20 | 500 | `ss01` alternate of e |
//! | ( ) | 21, 22 | 300 | |
//!
//! `kern` moves `w o` closer by 40 units (glyph pairs) and `r l` by 20
//! (class pairs).

pub mod graphite;
mod layout;

use std::error::Error;
use std::io;
use std::ops::Range;
use std::path::PathBuf;

use write_fonts::tables::cmap::Cmap;
use write_fonts::tables::head::Head;
use write_fonts::tables::hhea::Hhea;
use write_fonts::tables::hmtx::{Hmtx, LongMetric};
use write_fonts::tables::maxp::Maxp;
use write_fonts::types::{FWord, GlyphId, Tag, UfWord};
use write_fonts::FontBuilder;

/// Glyph ids of the test fonts
pub mod gid {
    pub const NOTDEF: u16 = 0;
    pub const SPACE: u16 = 1;
    pub const D: u16 = 2;
    pub const E: u16 = 3;
    pub const H: u16 = 4;
    pub const L: u16 = 5;
    pub const O: u16 = 6;
    pub const R: u16 = 7;
    pub const W: u16 = 8;
    pub const F: u16 = 9;
    pub const I: u16 = 10;
    pub const F_I: u16 = 11;
    pub const L_L: u16 = 12;
    pub const ACUTE: u16 = 13;
    pub const ALEF: u16 = 14;
    pub const BEH: u16 = 15;
    pub const BEH_INIT: u16 = 16;
    pub const BEH_MEDI: u16 = 17;
    pub const BEH_FINA: u16 = 18;
    pub const A: u16 = 19;
    pub const E_ALT: u16 = 20;
    pub const PAREN_LEFT: u16 = 21;
    pub const PAREN_RIGHT: u16 = 22;
}

pub const UNITS_PER_EM: u16 = 1000;
pub const ASCENT: i16 = 800;
pub const DESCENT: i16 = -200;

/// Advance width of every glyph, indexed by glyph id
pub const ADVANCES: [u16; 23] = [
    500, 250, 550, 500, 550, 250, 550, 350, 750, 300, 250, 520, 480, 0, 250, 600, 300, 300, 600,
    500, 500, 300, 300,
];

/// Kerning between `w` and `o`, in font units
pub const KERN_W_O: i16 = -40;
/// Kerning between `r` and `l`, in font units
pub const KERN_R_L: i16 = -20;
/// Where the acute lands on its base, relative to the base origin
pub const MARK_ANCHOR_E: (i16, i16) = (250, 600);

const CHARACTERS: [(char, u16); 16] = [
    (' ', gid::SPACE),
    ('(', gid::PAREN_LEFT),
    (')', gid::PAREN_RIGHT),
    ('a', gid::A),
    ('d', gid::D),
    ('e', gid::E),
    ('f', gid::F),
    ('h', gid::H),
    ('i', gid::I),
    ('l', gid::L),
    ('o', gid::O),
    ('r', gid::R),
    ('w', gid::W),
    ('\u{0301}', gid::ACUTE),
    ('\u{0627}', gid::ALEF),
    ('\u{0628}', gid::BEH),
];

const GSUB: [u8; 4] = *b"GSUB";
const GPOS: [u8; 4] = *b"GPOS";
const FEAT: [u8; 4] = *b"Feat";
const SILL: [u8; 4] = *b"Sill";
const CMAP: [u8; 4] = *b"cmap";

/// Every optional table of the full font
const FULL: &[[u8; 4]] = &[GSUB, GPOS, FEAT, SILL];

/// Builds a font holding the core tables plus the `optional` ones
///
/// `cmap` counts as optional here so a font can be built without it.
fn assemble(optional: &[[u8; 4]], with_cmap: bool) -> Result<Vec<u8>, Box<dyn Error>> {
    let head = Head {
        units_per_em: UNITS_PER_EM,
        ..Default::default()
    };
    let hhea = Hhea {
        ascender: FWord::new(ASCENT),
        descender: FWord::new(DESCENT),
        line_gap: FWord::new(0),
        advance_width_max: UfWord::new(ADVANCES.iter().copied().max().unwrap_or_default()),
        caret_slope_rise: 1,
        number_of_h_metrics: ADVANCES.len() as u16,
        ..Default::default()
    };
    let maxp = Maxp {
        num_glyphs: ADVANCES.len() as u16,
        ..Default::default()
    };
    let hmtx = Hmtx {
        h_metrics: ADVANCES
            .iter()
            .map(|&advance| LongMetric {
                advance,
                side_bearing: 0,
            })
            .collect(),
        left_side_bearings: Vec::new(),
    };

    let mut builder = FontBuilder::new();
    builder
        .add_table(&head)?
        .add_table(&hhea)?
        .add_table(&maxp)?
        .add_table(&hmtx)?;
    if with_cmap {
        let mappings = CHARACTERS
            .iter()
            .map(|&(ch, id)| (ch, GlyphId::new(u32::from(id))));
        builder.add_table(&Cmap::from_mappings(mappings)?)?;
    }
    for &tag in optional {
        match tag {
            GSUB => {
                builder.add_table(&layout::gsub())?;
            }
            GPOS => {
                builder.add_table(&layout::gpos())?;
            }
            FEAT => {
                builder.add_raw(Tag::new(&tag), feat());
            }
            SILL => {
                builder.add_raw(Tag::new(&tag), sill());
            }
            _ => {}
        }
    }
    Ok(builder.build())
}

/// Unwraps an assembled font
///
/// # Panics
///
/// If a table fails to compile.
#[allow(clippy::panic)]
fn built(font: Result<Vec<u8>, Box<dyn Error>>) -> Vec<u8> {
    match font {
        Ok(data) => data,
        Err(err) => panic!("test font tables are inconsistent: {err}"),
    }
}

fn feat() -> Vec<u8> {
    graphite::feat(&[
        (*b"dlig", vec![0, 1]),
        (*b"kshd", vec![0, 1, 2, 3]),
        (*b"liga", vec![1, 0]),
        (*b"ss01", vec![0, 1]),
    ])
}

fn sill() -> Vec<u8> {
    graphite::sill(&[
        ("de", vec![(*b"kshd", 5), (*b"ss01", 1)]),
        ("tr", vec![(*b"liga", 0)]),
    ])
}

/// Core tables plus GSUB, GPOS, Feat and Sill
pub fn test_font() -> Vec<u8> {
    built(assemble(FULL, true))
}

/// Core tables plus GSUB and GPOS, no Graphite tables
pub fn opentype_font() -> Vec<u8> {
    built(assemble(&[GSUB, GPOS], true))
}

/// Core tables only: no features, no rules
pub fn bare_font() -> Vec<u8> {
    built(assemble(&[], true))
}

/// The full font with one table left out
///
/// Only `cmap` and the layout and Graphite tables can be left out.
pub fn font_without(tag: &[u8; 4]) -> Vec<u8> {
    let optional: Vec<[u8; 4]> = FULL.iter().filter(|t| *t != tag).copied().collect();
    built(assemble(&optional, tag != &CMAP))
}

/// A TrueType collection holding the full font then the bare one
///
/// `write-fonts` only writes single fonts, so each member is built on its
/// own and its table offsets are moved to where it lands in the file.
pub fn test_collection() -> Vec<u8> {
    let members = [test_font(), bare_font()];
    let header_len = 12 + 4 * members.len();

    let mut out = Vec::new();
    out.extend(b"ttcf");
    out.extend(1u16.to_be_bytes());
    out.extend(0u16.to_be_bytes());
    out.extend((members.len() as u32).to_be_bytes());

    let mut offset = header_len;
    let mut placed = Vec::new();
    for member in members {
        out.extend((offset as u32).to_be_bytes());
        let len = padded_len(member.len());
        placed.push(relocated(member, offset));
        offset += len;
    }
    for member in placed {
        let len = member.len();
        out.extend(member);
        out.resize(out.len() + padded_len(len) - len, 0);
    }
    out
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// Shifts every table offset of a single font by `base` bytes
fn relocated(mut font: Vec<u8>, base: usize) -> Vec<u8> {
    let num_tables = usize::from(u16::from_be_bytes([font[4], font[5]]));
    for record in 0..num_tables {
        let at = 12 + 16 * record + 8;
        let offset = u32::from_be_bytes([font[at], font[at + 1], font[at + 2], font[at + 3]]);
        font[at..at + 4].copy_from_slice(&(offset + base as u32).to_be_bytes());
    }
    font
}

/// Byte range of table `tag` inside a single font
pub fn table_range(font: &[u8], tag: &[u8; 4]) -> Option<Range<usize>> {
    let num_tables = usize::from(u16::from_be_bytes([*font.get(4)?, *font.get(5)?]));
    (0..num_tables).find_map(|record| {
        let at = 12 + 16 * record;
        let entry = font.get(at..at + 16)?;
        if &entry[..4] != tag {
            return None;
        }
        let offset = u32::from_be_bytes([entry[8], entry[9], entry[10], entry[11]]) as usize;
        let len = u32::from_be_bytes([entry[12], entry[13], entry[14], entry[15]]) as usize;
        Some(offset..offset + len)
    })
}

/// `font` with `bytes` written over table `tag`, starting `at` bytes in
///
/// Builds malformed fonts; `None` when the table is missing or too short.
pub fn patch_table(mut font: Vec<u8>, tag: &[u8; 4], at: usize, bytes: &[u8]) -> Option<Vec<u8>> {
    let table = table_range(&font, tag)?;
    let start = table.start + at;
    if start + bytes.len() > table.end {
        return None;
    }
    font.get_mut(start..start + bytes.len())?.copy_from_slice(bytes);
    Some(font)
}

/// Writes `data` into a fresh file under the system temp directory
pub fn write_temp_font(name: &str, data: &[u8]) -> io::Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("glyphweave-test-fonts-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(name);
    std::fs::write(&path, data)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use read_fonts::types::{GlyphId, Tag};
    use read_fonts::{FontRef, TableProvider};

    #[test]
    fn full_font_parses() {
        let data = test_font();
        let font = FontRef::new(&data).unwrap();
        assert_eq!(font.head().unwrap().units_per_em(), UNITS_PER_EM);
        assert_eq!(font.maxp().unwrap().num_glyphs(), ADVANCES.len() as u16);
        for tag in [b"GSUB", b"GPOS", b"Feat", b"Sill", b"cmap"] {
            assert!(font.table_data(Tag::new(tag)).is_some(), "missing {tag:?}");
        }
    }

    #[test]
    fn cmap_and_hmtx_agree_with_the_glyph_table() {
        let data = test_font();
        let font = FontRef::new(&data).unwrap();
        let cmap = font.cmap().unwrap();
        let hmtx = font.hmtx().unwrap();
        for (ch, gid) in CHARACTERS {
            assert_eq!(cmap.map_codepoint(ch), Some(GlyphId::new(gid as u32)), "{ch:?}");
            assert_eq!(
                hmtx.advance(GlyphId::new(gid as u32)),
                Some(ADVANCES[gid as usize])
            );
        }
        assert_eq!(cmap.map_codepoint('z'), None);
    }

    #[test]
    fn variants_differ_in_layout_tables() {
        let ot = opentype_font();
        let font = FontRef::new(&ot).unwrap();
        assert!(font.table_data(Tag::new(b"GSUB")).is_some());
        assert!(font.table_data(Tag::new(b"Feat")).is_none());

        let bare = bare_font();
        let font = FontRef::new(&bare).unwrap();
        assert!(font.table_data(Tag::new(b"GPOS")).is_none());
    }

    #[test]
    fn collection_members_are_addressable() {
        let data = test_collection();
        let second = FontRef::from_index(&data, 1).unwrap();
        assert!(second.table_data(Tag::new(b"GSUB")).is_none());
        let first = FontRef::from_index(&data, 0).unwrap();
        assert_eq!(first.head().unwrap().units_per_em(), UNITS_PER_EM);
        assert!(FontRef::from_index(&data, 2).is_err());
    }

    #[test]
    fn layout_tables_read_back() {
        use read_fonts::tables::layout::LookupFlag;

        let data = test_font();
        let font = FontRef::new(&data).unwrap();
        let gsub = font.gsub().unwrap();
        let lookups = gsub.lookup_list().unwrap();
        assert_eq!(lookups.lookup_count(), 6);
        let liga = lookups.lookups().get(0).unwrap();
        assert!(liga.lookup_flag().contains(LookupFlag::IGNORE_MARKS));

        let features = gsub.feature_list().unwrap();
        let tags: Vec<_> = features
            .feature_records()
            .iter()
            .map(|record| record.feature_tag())
            .collect();
        assert_eq!(tags.len(), 6);
        assert_eq!(tags[3], Tag::new(b"liga"));

        let gpos = font.gpos().unwrap();
        assert_eq!(gpos.lookup_list().unwrap().lookup_count(), 2);
        let scripts = gpos.script_list().unwrap();
        assert_eq!(scripts.script_records()[0].script_tag(), Tag::new(b"DFLT"));
    }

    #[test]
    fn patched_tables_keep_their_place() {
        let data = test_font();
        let gsub = table_range(&data, b"GSUB").unwrap();
        let patched = patch_table(data.clone(), b"GSUB", 4, &[0xFF, 0xF0]).unwrap();
        assert_eq!(patched.len(), data.len());
        assert_eq!(&patched[gsub.start + 4..gsub.start + 6], &[0xFF, 0xF0]);
        assert!(patch_table(data.clone(), b"glyf", 0, &[0]).is_none());
        assert!(patch_table(data, b"GSUB", gsub.len(), &[0]).is_none());
    }

    #[test]
    fn temp_fonts_round_trip_through_disk() {
        let path = write_temp_font("round-trip.ttf", &bare_font()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), bare_font());
    }
}
