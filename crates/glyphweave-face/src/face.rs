//! Loading a font file into a face
//!
//! A face keeps the raw font bytes and creates `FontRef` on demand for
//! parsing, which also covers members of TrueType collections. The bytes
//! live in a [`ResourceCell`]: releasing the face empties the cell at once,
//! while fonts built on it only hold a weak reference and notice.

use std::fmt;
use std::fs;
use std::io;
use std::ops::{Deref, Range};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use glyphweave_core::types::{GlyphId, Tag};
use glyphweave_core::{GlyphweaveError, Release, ResourceCell, ResourceError, ResourceKind, Result};
use read_fonts::types::GlyphId as ReadGlyphId;
use read_fonts::tables::hmtx::Hmtx;
use read_fonts::{FontRef, TableProvider};
use skrifa::charmap::Charmap;
use skrifa::instance::{LocationRef, Size};
use skrifa::MetadataProvider;

use crate::catalog::FeatureCatalog;

static NEXT_FACE_ID: AtomicU64 = AtomicU64::new(1);

/// Tables a face cannot do without
const REQUIRED_TABLES: [&[u8; 4]; 5] = [b"head", b"maxp", b"hhea", b"hmtx", b"cmap"];

/// Tables skipped by [`FaceOptions::GlyphOnly`]
const LAYOUT_TABLES: [&[u8; 4]; 4] = [b"GSUB", b"GPOS", b"Feat", b"Sill"];

/// How much of a font file a face takes in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FaceOptions {
    /// Everything: metrics, character map and layout tables
    #[default]
    Default,
    /// Metrics and character map only; no features, no rules
    GlyphOnly,
}

/// Parsed, immutable contents of one face
pub struct FaceData {
    bytes: Vec<u8>,
    index: u32,
    options: FaceOptions,
    units_per_em: u16,
    ascent: f32,
    descent: f32,
    glyph_count: u32,
    catalog: Arc<FeatureCatalog>,
}

impl FaceData {
    fn parse(bytes: Vec<u8>, index: u32, options: FaceOptions) -> Result<Self> {
        let font = FontRef::from_index(&bytes, index)
            .map_err(|err| ResourceError::InvalidData(err.to_string()))?;

        for tag in REQUIRED_TABLES {
            if font.table_data(read_fonts::types::Tag::new(tag)).is_none() {
                return Err(ResourceError::NotSupported(format!(
                    "required table '{}' is missing",
                    Tag::new(tag)
                ))
                .into());
            }
        }

        let units_per_em = font
            .head()
            .map_err(|err| ResourceError::InvalidData(format!("head: {err}")))?
            .units_per_em();
        if units_per_em == 0 {
            return Err(ResourceError::InvalidData("units per em is zero".into()).into());
        }
        let glyph_count = u32::from(
            font.maxp()
                .map_err(|err| ResourceError::InvalidData(format!("maxp: {err}")))?
                .num_glyphs(),
        );

        let (ascent, descent) = match skrifa::FontRef::from_index(&bytes, index) {
            Ok(metrics_font) => {
                let metrics = metrics_font.metrics(Size::unscaled(), LocationRef::default());
                (metrics.ascent, metrics.descent)
            }
            Err(err) => return Err(ResourceError::InvalidData(err.to_string()).into()),
        };

        let catalog = match options {
            FaceOptions::GlyphOnly => FeatureCatalog::empty(),
            FaceOptions::Default => FeatureCatalog::from_font(&font).unwrap_or_else(|err| {
                log::warn!("{}", err.diagnostic());
                FeatureCatalog::empty()
            }),
        };

        Ok(Self {
            bytes,
            index,
            options,
            units_per_em,
            ascent,
            descent,
            glyph_count,
            catalog: Arc::new(catalog),
        })
    }

    /// Creates a `FontRef` on demand for parsing
    pub fn font_ref(&self) -> Result<FontRef<'_>> {
        FontRef::from_index(&self.bytes, self.index)
            .map_err(|err| ResourceError::InvalidData(err.to_string()).into())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn options(&self) -> FaceOptions {
        self.options
    }

    /// Whether GSUB/GPOS rules may be applied
    pub fn has_layout(&self) -> bool {
        self.options == FaceOptions::Default
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Ascender in font units
    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    /// Descender in font units, usually negative
    pub fn descent(&self) -> f32 {
        self.descent
    }

    pub fn glyph_count(&self) -> u32 {
        self.glyph_count
    }

    pub fn catalog(&self) -> &Arc<FeatureCatalog> {
        &self.catalog
    }

    /// Byte range of a table inside the font bytes
    fn table_range(&self, tag: Tag) -> Option<Range<usize>> {
        if !self.has_layout() && LAYOUT_TABLES.iter().any(|t| Tag::new(t) == tag) {
            return None;
        }
        let font = self.font_ref().ok()?;
        let wanted = read_fonts::types::Tag::from_be_bytes(tag.to_bytes());
        let record = font
            .table_directory
            .table_records()
            .iter()
            .find(|record| record.tag() == wanted)?;
        let start = record.offset() as usize;
        let end = start.checked_add(record.length() as usize)?;
        (start > 0 && end <= self.bytes.len()).then_some(start..end)
    }

    /// Character map and advances, parsed once for many lookups
    pub fn glyph_metrics(&self) -> Result<GlyphMetrics<'_>> {
        let font = self.font_ref()?;
        let charmap = skrifa::FontRef::from_index(&self.bytes, self.index)
            .map_err(|err| ResourceError::InvalidData(err.to_string()))?
            .charmap();
        Ok(GlyphMetrics {
            charmap,
            hmtx: font.hmtx().ok(),
        })
    }

    /// Finds which glyph draws this character
    pub fn glyph_for_char(&self, ch: char) -> Option<GlyphId> {
        self.glyph_metrics().ok()?.glyph_for_char(ch)
    }

    /// Advance width in font units
    pub fn advance_width(&self, glyph: GlyphId) -> Option<u16> {
        self.glyph_metrics().ok()?.advance_width(glyph)
    }
}

/// Borrowed character map and horizontal metrics of a face
///
/// Shaping maps every character and measures every glyph, so the tables are
/// parsed once here rather than per lookup.
pub struct GlyphMetrics<'a> {
    charmap: Charmap<'a>,
    hmtx: Option<Hmtx<'a>>,
}

impl GlyphMetrics<'_> {
    pub fn glyph_for_char(&self, ch: char) -> Option<GlyphId> {
        self.charmap.map(ch).map(|gid| gid.to_u32())
    }

    /// Advance width in font units
    pub fn advance_width(&self, glyph: GlyphId) -> Option<u16> {
        self.hmtx.as_ref()?.advance(ReadGlyphId::new(glyph))
    }
}

impl fmt::Debug for FaceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceData")
            .field("len", &self.bytes.len())
            .field("index", &self.index)
            .field("options", &self.options)
            .field("units_per_em", &self.units_per_em)
            .field("glyph_count", &self.glyph_count)
            .finish()
    }
}

/// Raw bytes of one table, kept alive independently of the face
#[derive(Clone)]
pub struct TableBlob {
    data: Arc<FaceData>,
    range: Range<usize>,
}

impl TableBlob {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

impl Deref for TableBlob {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data.bytes[self.range.clone()]
    }
}

impl fmt::Debug for TableBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableBlob({} bytes)", self.len())
    }
}

/// A loaded font face
///
/// Identity is the source (a path or `memory:<id>`) plus the options it was
/// loaded with.
pub struct Face {
    id: u64,
    source: String,
    options: FaceOptions,
    cell: Arc<ResourceCell<FaceData>>,
}

impl Face {
    /// Opens a font file
    pub fn load(path: impl AsRef<Path>, options: FaceOptions) -> Result<Self> {
        Self::load_index(path, 0, options)
    }

    /// Opens a specific face of a font file (for TTC collections)
    pub fn load_index(path: impl AsRef<Path>, index: u32, options: FaceOptions) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => {
                GlyphweaveError::from(ResourceError::FileNotFound(path.display().to_string()))
            }
            _ => GlyphweaveError::Io(err),
        })?;
        Self::build(bytes, index, options, Some(path.display().to_string()))
    }

    /// Turns raw font bytes into a face
    pub fn from_data(bytes: Vec<u8>, options: FaceOptions) -> Result<Self> {
        Self::from_data_index(bytes, 0, options)
    }

    /// Turns raw font bytes into a specific face (for TTC collections)
    pub fn from_data_index(bytes: Vec<u8>, index: u32, options: FaceOptions) -> Result<Self> {
        Self::build(bytes, index, options, None)
    }

    fn build(bytes: Vec<u8>, index: u32, options: FaceOptions, path: Option<String>) -> Result<Self> {
        let id = NEXT_FACE_ID.fetch_add(1, Ordering::Relaxed);
        let data = FaceData::parse(bytes, index, options)?;
        let source = path.unwrap_or_else(|| format!("memory:{id}"));

        log::debug!(
            "Loaded face {} ({} glyphs, {} upem, {:?})",
            source,
            data.glyph_count,
            data.units_per_em,
            options
        );

        Ok(Self {
            id,
            source,
            options,
            cell: Arc::new(ResourceCell::new(ResourceKind::Face, data)),
        })
    }

    /// Process-unique id of this face
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn options(&self) -> FaceOptions {
        self.options
    }

    /// Snapshot of the face data, valid even if the face is released later
    pub fn data(&self) -> Result<Arc<FaceData>> {
        Ok(self.cell.get()?)
    }

    /// A weak handle that does not keep the face alive
    pub fn downgrade(&self) -> WeakFace {
        WeakFace {
            id: self.id,
            cell: Arc::downgrade(&self.cell),
        }
    }

    /// Raw bytes of a table, `None` when the face does not have it
    pub fn table_lookup(&self, tag: Tag) -> Result<Option<TableBlob>> {
        let data = self.data()?;
        Ok(data
            .table_range(tag)
            .map(|range| TableBlob { data: data.clone(), range }))
    }

    pub fn has_table(&self, tag: Tag) -> Result<bool> {
        Ok(self.data()?.table_range(tag).is_some())
    }

    pub fn units_per_em(&self) -> Result<u16> {
        Ok(self.data()?.units_per_em())
    }

    pub fn ascent(&self) -> Result<f32> {
        Ok(self.data()?.ascent())
    }

    pub fn descent(&self) -> Result<f32> {
        Ok(self.data()?.descent())
    }

    pub fn glyph_count(&self) -> Result<u32> {
        Ok(self.data()?.glyph_count())
    }

    pub fn glyph_for_char(&self, ch: char) -> Result<Option<GlyphId>> {
        Ok(self.data()?.glyph_for_char(ch))
    }

    pub fn advance_width(&self, glyph: GlyphId) -> Result<Option<u16>> {
        Ok(self.data()?.advance_width(glyph))
    }

    pub fn feature_catalog(&self) -> Result<Arc<FeatureCatalog>> {
        Ok(self.data()?.catalog().clone())
    }
}

impl Release for Face {
    fn release(&mut self) {
        if self.cell.take() {
            log::debug!("Released face {}", self.source);
        }
    }

    fn is_released(&self) -> bool {
        !self.cell.is_live()
    }
}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Face")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("options", &self.options)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Weak back-reference from a font to its face
#[derive(Debug, Clone)]
pub struct WeakFace {
    id: u64,
    cell: Weak<ResourceCell<FaceData>>,
}

impl WeakFace {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The face data, if the face is neither released nor dropped
    pub fn data(&self) -> Result<Arc<FaceData>> {
        let cell = self
            .cell
            .upgrade()
            .ok_or(ResourceError::Released(ResourceKind::Face))?;
        Ok(cell.get()?)
    }

    pub fn is_live(&self) -> bool {
        self.cell.upgrade().is_some_and(|cell| cell.is_live())
    }
}
