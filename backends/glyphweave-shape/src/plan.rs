//! Choosing which lookups run
//!
//! A plan is computed per table, script and feature values: the language
//! system is picked from the script list, its features are filtered by
//! their values, and the lookups they reference are collected in lookup
//! list order. Joining form features only touch glyphs in their form.

use std::collections::BTreeMap;

use glyphweave_core::types::Tag;
use glyphweave_core::Result;
use glyphweave_face::catalog::is_default_on;
use glyphweave_face::FeatureSettings;
use glyphweave_unicode::JoiningForm;
use read_fonts::tables::layout::{FeatureList, LangSys, ScriptList};
use read_fonts::ReadError;

use crate::buffer::GlyphInfo;

/// Script tags tried after the requested one
const FALLBACK_SCRIPTS: [Tag; 3] = [Tag::new(b"DFLT"), Tag::new(b"dflt"), Tag::new(b"latn")];

/// Language system tags for the primary subtags we know
const LANGUAGE_SYSTEMS: [(&str, &[u8; 4]); 9] = [
    ("ar", b"ARA "),
    ("de", b"DEU "),
    ("en", b"ENG "),
    ("fa", b"FAR "),
    ("fr", b"FRA "),
    ("he", b"IWR "),
    ("my", b"BRM "),
    ("tr", b"TRK "),
    ("ur", b"URD "),
];

/// OpenType language system tag for a language code such as `"tr-TR"`
pub fn ot_language_tag(language: &str) -> Option<Tag> {
    let primary = language.split(['-', '_']).next()?.to_ascii_lowercase();
    LANGUAGE_SYSTEMS
        .iter()
        .find(|(code, _)| *code == primary)
        .map(|(_, tag)| Tag::new(tag))
}

/// Snapshot of the values a shaping call runs with
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FeatureValues {
    values: BTreeMap<Tag, i32>,
    language: Option<Tag>,
}

impl FeatureValues {
    pub fn from_settings(settings: &FeatureSettings) -> Result<Self> {
        Ok(Self {
            values: settings.iter()?.collect(),
            language: settings.language().and_then(ot_language_tag),
        })
    }

    /// Explicit value, else whether the feature is on by default
    pub fn value(&self, tag: Tag) -> i32 {
        self.values
            .get(&tag)
            .copied()
            .unwrap_or_else(|| i32::from(is_default_on(tag)))
    }

    pub fn is_enabled(&self, tag: Tag) -> bool {
        self.value(tag) > 0
    }

    pub fn language(&self) -> Option<Tag> {
        self.language
    }
}

/// One lookup and the glyphs it may touch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedLookup {
    pub index: u16,
    /// `None` applies to every glyph; otherwise only glyphs in these forms
    pub forms: Option<Vec<JoiningForm>>,
}

impl StagedLookup {
    pub fn applies_to(&self, glyph: &GlyphInfo) -> bool {
        match &self.forms {
            None => true,
            Some(forms) => glyph.form.is_some_and(|form| forms.contains(&form)),
        }
    }
}

/// Lookups enabled for `script`, ordered by lookup index
pub fn plan_lookups(
    scripts: &ScriptList<'_>,
    features: &FeatureList<'_>,
    script: Tag,
    values: &FeatureValues,
) -> std::result::Result<Vec<StagedLookup>, ReadError> {
    let Some(lang_sys) = find_lang_sys(scripts, script, values.language())? else {
        return Ok(Vec::new());
    };

    let mut feature_indices: Vec<u16> = Vec::new();
    let required = lang_sys.required_feature_index();
    if required != 0xFFFF {
        feature_indices.push(required);
    }
    feature_indices.extend(lang_sys.feature_indices().iter().map(|index| index.get()));

    let records = features.feature_records();
    let mut staged: BTreeMap<u16, Option<Vec<JoiningForm>>> = BTreeMap::new();
    for (position, &feature_index) in feature_indices.iter().enumerate() {
        let Some(record) = records.get(usize::from(feature_index)) else {
            continue;
        };
        let tag = Tag::new(&record.feature_tag().to_be_bytes());
        let is_required = required != 0xFFFF && position == 0;
        if !is_required && !values.is_enabled(tag) {
            continue;
        }

        let form = JoiningForm::from_feature_tag(tag);
        let feature = record.feature(features.offset_data())?;
        for lookup in feature.lookup_list_indices() {
            let entry = staged.entry(lookup.get()).or_insert_with(|| Some(Vec::new()));
            match form {
                None => *entry = None,
                Some(form) => {
                    if let Some(forms) = entry.as_mut() {
                        if !forms.contains(&form) {
                            forms.push(form);
                        }
                    }
                }
            }
        }
    }

    Ok(staged
        .into_iter()
        .map(|(index, forms)| StagedLookup { index, forms })
        .collect())
}

fn find_lang_sys<'a>(
    scripts: &ScriptList<'a>,
    script: Tag,
    language: Option<Tag>,
) -> std::result::Result<Option<LangSys<'a>>, ReadError> {
    let records = scripts.script_records();
    let record = std::iter::once(script)
        .chain(FALLBACK_SCRIPTS)
        .find_map(|wanted| {
            records
                .iter()
                .find(|record| record.script_tag().to_be_bytes() == wanted.to_bytes())
        });
    let Some(record) = record else {
        return Ok(None);
    };

    let script_table = record.script(scripts.offset_data())?;
    if let Some(language) = language {
        let found = script_table
            .lang_sys_records()
            .iter()
            .find(|record| record.lang_sys_tag().to_be_bytes() == language.to_bytes());
        if let Some(record) = found {
            return record.lang_sys(script_table.offset_data()).map(Some);
        }
    }
    script_table.default_lang_sys().transpose()
}
