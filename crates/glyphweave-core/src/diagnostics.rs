//! Where non-fatal shaping warnings go
//!
//! Shaping is total: an unknown feature tag or a character the face cannot
//! draw never turns into an error. Each such event becomes a [`Diagnostic`]
//! handed to a [`DiagnosticSink`]. The default sink forwards to the `log`
//! facade; tests collect them instead.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::Tag;

/// A non-fatal event noticed while deriving features or shaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A feature tag the face does not declare; the request was ignored
    UnsupportedFeature { tag: Tag },
    /// A feature value outside the declared range; the nearest bound was used
    FeatureValueClamped { tag: Tag, requested: i32, applied: i32 },
    /// A character with no glyph in the face; the `.notdef` glyph was used
    MissingGlyph { ch: char, cluster: u32 },
    /// The face declares no features, so empty settings were returned
    LanguageFallback { language: String },
    /// A table that could not be read; shaping continued without it
    MalformedTable { tag: Tag, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnsupportedFeature { tag } => {
                write!(f, "unsupported feature '{tag}' ignored")
            }
            Diagnostic::FeatureValueClamped {
                tag,
                requested,
                applied,
            } => write!(f, "feature '{tag}' value {requested} clamped to {applied}"),
            Diagnostic::MissingGlyph { ch, cluster } => write!(
                f,
                "no glyph for U+{:04X} at cluster {cluster}, using .notdef",
                *ch as u32
            ),
            Diagnostic::LanguageFallback { language } => write!(
                f,
                "face declares no features, empty settings used for '{language}'"
            ),
            Diagnostic::MalformedTable { tag, reason } => {
                write!(f, "table '{tag}' skipped: {reason}")
            }
        }
    }
}

/// Receives diagnostics from any thread
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Shared handle to a sink
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// Forwards every diagnostic to `log::warn!`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: &Diagnostic) {
        log::warn!("{diagnostic}");
    }
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _diagnostic: &Diagnostic) {}
}

/// Keeps every diagnostic in arrival order
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of what has been collected so far
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Drain the collected diagnostics
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.entries.lock().push(diagnostic.clone());
    }
}

/// The sink used when callers do not provide one
pub fn log_sink() -> SharedSink {
    Arc::new(LogSink)
}
