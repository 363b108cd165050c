// this_file: crates/glyphweave-test-fonts/src/layout.rs

//! The GSUB and GPOS tables of the test fonts

use write_fonts::tables::gpos::{
    AnchorTable, BaseArray, BaseRecord, Class1Record, Class2Record, Gpos, MarkArray,
    MarkBasePosFormat1, MarkRecord, PairPos, PairSet, PairValueRecord, PositionLookup,
    ValueRecord,
};
use write_fonts::tables::gsub::{
    Gsub, Ligature, LigatureSet, LigatureSubstFormat1, SingleSubst, SubstitutionLookup,
};
use write_fonts::tables::layout::{
    ClassDef, CoverageTable, Feature, FeatureList, FeatureRecord, LangSys,
    LangSysRecord, Lookup, LookupFlag, LookupList, Script, ScriptList, ScriptRecord,
};
use write_fonts::types::{GlyphId16, Tag};
use write_fonts::{NullableOffsetMarker, OffsetMarker};

use crate::gid::*;
use crate::{KERN_R_L, KERN_W_O, MARK_ANCHOR_E};

/// One script: its default features and any language systems
struct ScriptDef {
    tag: [u8; 4],
    default_features: Vec<u16>,
    languages: Vec<([u8; 4], Vec<u16>)>,
}

fn glyph(id: u16) -> GlyphId16 {
    GlyphId16::new(id)
}

fn coverage(glyphs: &[u16]) -> CoverageTable {
    glyphs.iter().copied().map(glyph).collect()
}

fn class_def(classes: &[(u16, u16)]) -> ClassDef {
    classes
        .iter()
        .map(|&(id, class)| (glyph(id), class))
        .collect::<ClassDef>()
}

fn lang_sys(features: &[u16]) -> LangSys {
    LangSys {
        required_feature_index: 0xFFFF,
        feature_indices: features.to_vec(),
    }
}

fn script_list(scripts: &[ScriptDef]) -> ScriptList {
    let records = scripts
        .iter()
        .map(|script| ScriptRecord {
            script_tag: Tag::new(&script.tag),
            script: OffsetMarker::new(Script {
                default_lang_sys: NullableOffsetMarker::new(Some(lang_sys(
                    &script.default_features,
                ))),
                lang_sys_records: script
                    .languages
                    .iter()
                    .map(|(tag, features)| LangSysRecord {
                        lang_sys_tag: Tag::new(tag),
                        lang_sys: OffsetMarker::new(lang_sys(features)),
                    })
                    .collect(),
            }),
        })
        .collect();
    ScriptList::new(records)
}

fn feature_list(features: &[([u8; 4], Vec<u16>)]) -> FeatureList {
    let records = features
        .iter()
        .map(|(tag, lookups)| FeatureRecord::new(Tag::new(tag), Feature::new(None, lookups.clone())))
        .collect();
    FeatureList::new(records)
}

fn ligature(first: u16, rest: u16, ligature: u16) -> LigatureSubstFormat1 {
    LigatureSubstFormat1::new(
        coverage(&[first]),
        vec![LigatureSet::new(vec![Ligature::new(
            glyph(ligature),
            vec![glyph(rest)],
        )])],
    )
}

fn beh_form(delta: i16) -> SubstitutionLookup {
    SubstitutionLookup::Single(Lookup::new(
        LookupFlag::empty(),
        vec![SingleSubst::format_1(coverage(&[BEH]), delta)],
    ))
}

pub(crate) fn gsub() -> Gsub {
    let lookups = vec![
        SubstitutionLookup::Ligature(Lookup::new(
            LookupFlag::IGNORE_MARKS,
            vec![ligature(F, I, F_I)],
        )),
        SubstitutionLookup::Ligature(Lookup::new(LookupFlag::empty(), vec![ligature(L, L, L_L)])),
        SubstitutionLookup::Single(Lookup::new(
            LookupFlag::empty(),
            vec![SingleSubst::format_2(coverage(&[E]), vec![glyph(E_ALT)])],
        )),
        beh_form(1),
        beh_form(2),
        beh_form(3),
    ];
    // Feature indices: 0 dlig, 1 fina, 2 init, 3 liga, 4 medi, 5 ss01
    let features = [
        (*b"dlig", vec![1]),
        (*b"fina", vec![5]),
        (*b"init", vec![3]),
        (*b"liga", vec![0]),
        (*b"medi", vec![4]),
        (*b"ss01", vec![2]),
    ];
    let scripts = [
        ScriptDef {
            tag: *b"arab",
            default_features: vec![1, 2, 4],
            languages: Vec::new(),
        },
        ScriptDef {
            tag: *b"latn",
            default_features: vec![0, 3, 5],
            languages: vec![(*b"TRK ", vec![0, 5])],
        },
    ];
    Gsub::new(
        script_list(&scripts),
        feature_list(&features),
        LookupList::new(lookups),
    )
}

fn x_advance(units: i16) -> ValueRecord {
    ValueRecord::new().with_x_advance(units)
}

fn anchor((x, y): (i16, i16)) -> AnchorTable {
    AnchorTable::format_1(x, y)
}

pub(crate) fn gpos() -> Gpos {
    let glyph_pairs = PairPos::format_1(
        coverage(&[W]),
        vec![PairSet::new(vec![PairValueRecord::new(
            glyph(O),
            x_advance(KERN_W_O),
            ValueRecord::new(),
        )])],
    );
    // Class 1 on both sides; every other cell of the matrix is zero
    let class_pairs = PairPos::format_2(
        coverage(&[R]),
        class_def(&[(R, 1)]),
        class_def(&[(L, 1)]),
        vec![
            Class1Record::new(vec![
                Class2Record::new(x_advance(0), ValueRecord::new()),
                Class2Record::new(x_advance(0), ValueRecord::new()),
            ]),
            Class1Record::new(vec![
                Class2Record::new(x_advance(0), ValueRecord::new()),
                Class2Record::new(x_advance(KERN_R_L), ValueRecord::new()),
            ]),
        ],
    );
    let kern = PositionLookup::Pair(Lookup::new(
        LookupFlag::empty(),
        vec![glyph_pairs, class_pairs],
    ));

    // Bases in coverage order
    let bases = [(E, MARK_ANCHOR_E), (O, (275, 600)), (A, (250, 600))];
    let mark_to_base = MarkBasePosFormat1::new(
        coverage(&[ACUTE]),
        coverage(&bases.map(|(id, _)| id)),
        MarkArray::new(vec![MarkRecord::new(0, anchor((0, 0)))]),
        BaseArray::new(
            bases
                .iter()
                .map(|&(_, point)| BaseRecord::new(vec![Some(anchor(point))]))
                .collect(),
        ),
    );
    let mark = PositionLookup::MarkToBase(Lookup::new(LookupFlag::empty(), vec![mark_to_base]));

    let features = [(*b"kern", vec![0]), (*b"mark", vec![1])];
    let scripts = [
        ScriptDef {
            tag: *b"DFLT",
            default_features: vec![0, 1],
            languages: Vec::new(),
        },
        ScriptDef {
            tag: *b"latn",
            default_features: vec![0, 1],
            languages: Vec::new(),
        },
    ];
    Gpos::new(
        script_list(&scripts),
        feature_list(&features),
        LookupList::new(vec![kern, mark]),
    )
}
