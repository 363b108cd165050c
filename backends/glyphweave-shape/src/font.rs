//! A face bound to a size
//!
//! A [`Font`] never owns its face. It keeps a weak reference and checks it
//! on every use, so releasing the face first turns later shaping calls into
//! `Released(Face)` errors instead of dangling reads.

use std::fmt;
use std::sync::Arc;

use glyphweave_core::{
    GlyphweaveError, Release, ResourceError, ResourceKind, Result, ShapingConfig,
};
use glyphweave_face::{Face, FaceData, WeakFace};

/// Rendering hints that change how design units become pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontOptions {
    /// Device pixels per typographic point
    pub pixels_per_point: f32,
    /// Round every advance to whole pixels
    pub round_advances: bool,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            pixels_per_point: 1.0,
            round_advances: false,
        }
    }
}

impl FontOptions {
    pub fn from_config(config: &ShapingConfig) -> Self {
        Self {
            pixels_per_point: config.pixels_per_point,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
struct Sizing {
    point_size: f32,
    options: FontOptions,
    scale: f32,
}

/// Face + point size + rendering hints
pub struct Font {
    face: WeakFace,
    sizing: Option<Sizing>,
}

impl Font {
    /// A font at `point_size` with default hints
    pub fn new(point_size: f32, face: &Face) -> Result<Self> {
        Self::with_options(point_size, face, FontOptions::default())
    }

    pub fn with_options(point_size: f32, face: &Face, options: FontOptions) -> Result<Self> {
        if !point_size.is_finite() || point_size <= 0.0 {
            return Err(GlyphweaveError::InvalidArgument(format!(
                "point size must be positive and finite, got {point_size}"
            )));
        }
        if !options.pixels_per_point.is_finite() || options.pixels_per_point <= 0.0 {
            return Err(GlyphweaveError::InvalidArgument(format!(
                "pixels per point must be positive and finite, got {}",
                options.pixels_per_point
            )));
        }

        let upem = face.units_per_em()?;
        let scale = point_size * options.pixels_per_point / f32::from(upem);
        log::debug!(
            "Created font for {} at {point_size}pt (scale {scale})",
            face.source()
        );

        Ok(Self {
            face: face.downgrade(),
            sizing: Some(Sizing {
                point_size,
                options,
                scale,
            }),
        })
    }

    fn sizing(&self) -> Result<&Sizing> {
        self.sizing
            .as_ref()
            .ok_or_else(|| ResourceError::Released(ResourceKind::Font).into())
    }

    pub fn point_size(&self) -> Result<f32> {
        Ok(self.sizing()?.point_size)
    }

    pub fn options(&self) -> Result<FontOptions> {
        Ok(self.sizing()?.options)
    }

    /// Pixels per design unit on the horizontal axis
    pub fn scale_x(&self) -> Result<f32> {
        Ok(self.sizing()?.scale)
    }

    /// Pixels per design unit on the vertical axis
    pub fn scale_y(&self) -> Result<f32> {
        Ok(self.sizing()?.scale)
    }

    pub fn face_id(&self) -> u64 {
        self.face.id()
    }

    /// Whether the face behind this font is still loaded
    pub fn is_face_live(&self) -> bool {
        self.face.is_live()
    }

    /// Snapshot of the face data; fails once either side is released
    pub fn face_data(&self) -> Result<Arc<FaceData>> {
        self.sizing()?;
        self.face.data()
    }
}

impl Release for Font {
    fn release(&mut self) {
        if self.sizing.take().is_some() {
            log::debug!("Released font on face {}", self.face.id());
        }
    }

    fn is_released(&self) -> bool {
        self.sizing.is_none()
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("face", &self.face.id())
            .field("sizing", &self.sizing)
            .finish()
    }
}
