//! Where fonts come to life: faces and their features
//!
//! A [`Face`] owns the bytes of one font file and the tables parsed from it.
//! [`FeatureSettings`] are derived from a face for one language and carry a
//! value for every feature the face declares.
//!
//! ## Memory Management
//!
//! Faces store their raw data and create `FontRef` on demand for parsing.
//! Releasing a face frees the data right away even if fonts built on it are
//! still around; those fonts then report the face as released.

pub mod catalog;
pub mod face;
pub mod graphite;
pub mod settings;

pub use catalog::{CatalogError, CatalogSource, FeatureCatalog, FeatureDef};
pub use face::{Face, FaceData, FaceOptions, GlyphMetrics, TableBlob, WeakFace};
pub use settings::FeatureSettings;
