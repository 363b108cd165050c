//! Error types for Glyphweave

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlyphweaveError>;

/// Main error type for Glyphweave
///
/// Shaping itself never fails on valid text. What can fail is acquiring a
/// resource, passing a bad argument, or touching something already released.
#[derive(Debug, Error)]
pub enum GlyphweaveError {
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlyphweaveError {
    /// True when the error comes from using a released resource
    pub fn is_released(&self) -> bool {
        matches!(self, GlyphweaveError::Resource(ResourceError::Released(_)))
    }
}

/// Failures tied to acquiring or using a resource
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("Font file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid font data: {0}")]
    InvalidData(String),

    #[error("Font not supported: {0}")]
    NotSupported(String),

    #[error("{0} used after release")]
    Released(ResourceKind),
}

/// The four resource kinds callers acquire and release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Face,
    Font,
    FeatureSettings,
    Segment,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Face => "face",
            ResourceKind::Font => "font",
            ResourceKind::FeatureSettings => "feature settings",
            ResourceKind::Segment => "segment",
        })
    }
}
