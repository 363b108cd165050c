//! Feature values for one face and one language
//!
//! Settings copy everything they need out of the face catalog (defaults and
//! legal ranges), so they stay usable after the face is released.

use std::collections::BTreeMap;

use glyphweave_core::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use glyphweave_core::types::Tag;
use glyphweave_core::{
    GlyphweaveError, LanguageFallback, Release, ResourceError, ResourceKind, Result,
};

use crate::catalog::{language_key, FeatureCatalog};
use crate::face::Face;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Values {
    values: BTreeMap<Tag, i32>,
    ranges: BTreeMap<Tag, (i32, i32)>,
}

/// Immutable map from feature tag to value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSettings {
    face_id: u64,
    language: Option<String>,
    inner: Option<Values>,
}

impl FeatureSettings {
    /// Feature values for `language`, defaults reported to the log
    pub fn for_language(face: &Face, language: &str) -> Result<Self> {
        Self::for_language_with(face, language, LanguageFallback::default(), &LogSink)
    }

    /// Feature values for `language`
    ///
    /// Each feature starts at its global default; language-specific defaults
    /// replace it where the face declares them. Values outside the declared
    /// range are clamped and reported.
    pub fn for_language_with(
        face: &Face,
        language: &str,
        fallback: LanguageFallback,
        sink: &dyn DiagnosticSink,
    ) -> Result<Self> {
        let catalog = face.feature_catalog()?;
        let language_name = (!language.is_empty()).then(|| language.to_string());

        if catalog.is_empty() {
            return match fallback {
                LanguageFallback::Strict => Err(GlyphweaveError::UnsupportedLanguage(format!(
                    "{language:?}: face {} declares no features",
                    face.source()
                ))),
                LanguageFallback::Empty => {
                    sink.report(&Diagnostic::LanguageFallback {
                        language: language.to_string(),
                    });
                    Ok(Self::empty(face.id(), language_name))
                }
            };
        }

        let mut settings = Self::from_catalog(face.id(), language_name, &catalog);
        if let Some(key) = language_key(language) {
            for &(tag, value) in catalog.language_overrides(key) {
                settings.set(tag, value, sink);
            }
        }

        log::debug!(
            "Derived {} feature values for {:?} on {}",
            settings.len().unwrap_or(0),
            language,
            face.source()
        );
        Ok(settings)
    }

    fn empty(face_id: u64, language: Option<String>) -> Self {
        Self {
            face_id,
            language,
            inner: Some(Values {
                values: BTreeMap::new(),
                ranges: BTreeMap::new(),
            }),
        }
    }

    fn from_catalog(face_id: u64, language: Option<String>, catalog: &FeatureCatalog) -> Self {
        let mut values = BTreeMap::new();
        let mut ranges = BTreeMap::new();
        for def in catalog.features() {
            values.insert(def.tag, def.default);
            ranges.insert(def.tag, (def.min, def.max));
        }
        Self {
            face_id,
            language,
            inner: Some(Values { values, ranges }),
        }
    }

    /// Apply one value; unknown tags are ignored
    fn set(&mut self, tag: Tag, requested: i32, sink: &dyn DiagnosticSink) {
        let Some(inner) = self.inner.as_mut() else {
            return;
        };
        let Some(&(min, max)) = inner.ranges.get(&tag) else {
            sink.report(&Diagnostic::UnsupportedFeature { tag });
            return;
        };
        let applied = requested.clamp(min, max);
        if applied != requested {
            sink.report(&Diagnostic::FeatureValueClamped {
                tag,
                requested,
                applied,
            });
        }
        inner.values.insert(tag, applied);
    }

    fn values(&self) -> Result<&Values> {
        self.inner
            .as_ref()
            .ok_or_else(|| ResourceError::Released(ResourceKind::FeatureSettings).into())
    }

    /// A copy with one value changed, diagnostics sent to the log
    pub fn with_value(&self, tag: Tag, value: i32) -> Result<Self> {
        self.with_value_in(tag, value, &LogSink)
    }

    /// A copy with one value changed
    ///
    /// The value is clamped to the feature's range. A tag the face does not
    /// declare leaves the copy unchanged and is reported as unsupported.
    pub fn with_value_in(&self, tag: Tag, value: i32, sink: &dyn DiagnosticSink) -> Result<Self> {
        self.values()?;
        let mut copy = self.clone();
        copy.set(tag, value, sink);
        Ok(copy)
    }

    pub fn get(&self, tag: Tag) -> Result<Option<i32>> {
        Ok(self.values()?.values.get(&tag).copied())
    }

    /// Declared `(min, max)` of a feature
    pub fn range(&self, tag: Tag) -> Result<Option<(i32, i32)>> {
        Ok(self.values()?.ranges.get(&tag).copied())
    }

    /// Values in tag order
    pub fn iter(&self) -> Result<impl Iterator<Item = (Tag, i32)> + '_> {
        Ok(self.values()?.values.iter().map(|(tag, value)| (*tag, *value)))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.values()?.values.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.values()?.values.is_empty())
    }

    /// Language these settings were derived for, if any
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Id of the face these settings were derived from
    pub fn face_id(&self) -> u64 {
        self.face_id
    }
}

impl Release for FeatureSettings {
    fn release(&mut self) {
        if self.inner.take().is_some() {
            log::debug!("Released feature settings for face {}", self.face_id);
        }
    }

    fn is_released(&self) -> bool {
        self.inner.is_none()
    }
}
