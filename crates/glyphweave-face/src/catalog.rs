//! What features a face declares, and what each may be set to
//!
//! Graphite faces declare their features explicitly in `Feat`, with
//! per-language defaults in `Sill`. OpenType faces only list feature tags in
//! the GSUB and GPOS feature lists; each such feature is an on/off switch,
//! on by default for the features every shaper applies unasked.

use std::collections::BTreeMap;

use glyphweave_core::diagnostics::Diagnostic;
use glyphweave_core::types::Tag;
use read_fonts::tables::layout::FeatureList;
use read_fonts::{FontRef, ReadError, TableProvider};
use thiserror::Error;

use crate::graphite;

/// Features a shaper applies unless told otherwise
pub const DEFAULT_ON: [Tag; 18] = [
    Tag::new(b"abvm"),
    Tag::new(b"blwm"),
    Tag::new(b"calt"),
    Tag::new(b"ccmp"),
    Tag::new(b"clig"),
    Tag::new(b"curs"),
    Tag::new(b"dist"),
    Tag::new(b"fina"),
    Tag::new(b"init"),
    Tag::new(b"isol"),
    Tag::new(b"kern"),
    Tag::new(b"liga"),
    Tag::new(b"locl"),
    Tag::new(b"mark"),
    Tag::new(b"medi"),
    Tag::new(b"mkmk"),
    Tag::new(b"rclt"),
    Tag::new(b"rlig"),
];

pub fn is_default_on(tag: Tag) -> bool {
    DEFAULT_ON.binary_search(&tag).is_ok()
}

/// One declared feature and its legal values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDef {
    pub tag: Tag,
    pub default: i32,
    pub min: i32,
    pub max: i32,
    /// Declared settings, in declaration order
    pub settings: Vec<i32>,
}

impl FeatureDef {
    /// A feature whose first setting is the default
    ///
    /// A feature without settings is treated as a switch.
    pub fn from_settings(tag: Tag, settings: Vec<i32>) -> Self {
        let default = settings.first().copied().unwrap_or(0);
        let min = settings.iter().copied().min().unwrap_or(0);
        let max = settings.iter().copied().max().unwrap_or(default.max(1));
        Self {
            tag,
            default,
            min,
            max,
            settings,
        }
    }

    /// An on/off feature
    pub fn switch(tag: Tag, on: bool) -> Self {
        Self {
            tag,
            default: i32::from(on),
            min: 0,
            max: 1,
            settings: vec![0, 1],
        }
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

const FEAT: Tag = Tag::new(b"Feat");
const SILL: Tag = Tag::new(b"Sill");
const GSUB: Tag = Tag::new(b"GSUB");
const GPOS: Tag = Tag::new(b"GPOS");

/// A declaration table that could not be read
#[derive(Debug, Error)]
#[error("feature catalog unreadable: '{tag}': {source}")]
pub struct CatalogError {
    /// The table that failed
    pub tag: Tag,
    #[source]
    pub source: ReadError,
}

impl CatalogError {
    fn in_table(tag: Tag) -> impl Fn(ReadError) -> Self {
        move |source| Self { tag, source }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::MalformedTable {
            tag: self.tag,
            reason: format!("feature catalog unreadable: {}", self.source),
        }
    }
}

/// Where a catalog came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Graphite,
    OpenType,
    None,
}

/// Every feature a face declares, plus per-language defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCatalog {
    source: CatalogSource,
    features: Vec<FeatureDef>,
    languages: BTreeMap<Tag, Vec<(Tag, i32)>>,
}

impl FeatureCatalog {
    pub fn empty() -> Self {
        Self {
            source: CatalogSource::None,
            features: Vec::new(),
            languages: BTreeMap::new(),
        }
    }

    /// Reads the catalog of `font`, preferring Graphite declarations
    pub fn from_font(font: &FontRef<'_>) -> Result<Self, CatalogError> {
        if let Some(feat) = font.table_data(read_fonts::types::Tag::new(b"Feat")) {
            let features = graphite::parse_feat(feat).map_err(CatalogError::in_table(FEAT))?;
            let languages = match font.table_data(read_fonts::types::Tag::new(b"Sill")) {
                Some(sill) => graphite::parse_sill(sill).map_err(CatalogError::in_table(SILL))?,
                None => BTreeMap::new(),
            };
            return Ok(Self {
                source: CatalogSource::Graphite,
                features,
                languages,
            });
        }

        let mut tags = Vec::new();
        if font.table_data(read_fonts::types::Tag::new(b"GSUB")).is_some() {
            let list = font
                .gsub()
                .and_then(|gsub| gsub.feature_list())
                .map_err(CatalogError::in_table(GSUB))?;
            push_feature_tags(&list, &mut tags);
        }
        if font.table_data(read_fonts::types::Tag::new(b"GPOS")).is_some() {
            let list = font
                .gpos()
                .and_then(|gpos| gpos.feature_list())
                .map_err(CatalogError::in_table(GPOS))?;
            push_feature_tags(&list, &mut tags);
        }
        if tags.is_empty() {
            return Ok(Self::empty());
        }

        Ok(Self {
            source: CatalogSource::OpenType,
            features: tags
                .into_iter()
                .map(|tag| FeatureDef::switch(tag, is_default_on(tag)))
                .collect(),
            languages: BTreeMap::new(),
        })
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }

    pub fn features(&self) -> &[FeatureDef] {
        &self.features
    }

    pub fn get(&self, tag: Tag) -> Option<&FeatureDef> {
        self.features.iter().find(|def| def.tag == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Languages with their own defaults
    pub fn languages(&self) -> impl Iterator<Item = Tag> + '_ {
        self.languages.keys().copied()
    }

    /// Overrides for a language key from [`language_key`]
    pub fn language_overrides(&self, language: Tag) -> &[(Tag, i32)] {
        self.languages
            .get(&language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Distinct tags in first-seen order
fn push_feature_tags(list: &FeatureList<'_>, tags: &mut Vec<Tag>) {
    for record in list.feature_records() {
        let tag = Tag::new(&record.feature_tag().to_be_bytes());
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
}

/// Lookup key for a language: the primary subtag, lowercased, NUL padded
///
/// `"en"`, `"EN"` and `"en-US"` share one key. Codes that are not two to
/// four ASCII letters have none.
pub fn language_key(language: &str) -> Option<Tag> {
    let primary = language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if !(2..=4).contains(&primary.len()) || !primary.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }
    Tag::padded(&primary, 0)
}
