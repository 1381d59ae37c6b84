use std::path::Path;

use rusttype::{Font, Scale, point};

#[derive(Debug, thiserror::Error)]
pub enum TypefaceError {
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),
    #[error("font data could not be parsed")]
    UnsupportedFont,
    #[error("no usable sans-serif font found on this system")]
    NoSystemFont,
}

/// Tight pixel footprint of a single-line string at a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphExtent {
    pub width: u32,
    pub height: u32,
}

impl GlyphExtent {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Anti-aliased ink coverage of a rendered string: row-major alpha bytes,
/// `width * height` long, 255 fully inked.
#[derive(Debug, Clone)]
pub struct CoverageMap {
    pub width: u32,
    pub height: u32,
    pub alpha: Vec<u8>,
}

impl CoverageMap {
    pub fn blank(width: u32, height: u32) -> Self {
        CoverageMap {
            width,
            height,
            alpha: vec![0; (width * height) as usize],
        }
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.alpha[(y * self.width + x) as usize]
    }

    /// Quarter turn clockwise, for vertically laid-out words.
    pub fn rotate_quarter(&self) -> CoverageMap {
        let mut rotated = CoverageMap::blank(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                let rx = self.height - 1 - y;
                let ry = x;
                rotated.alpha[(ry * rotated.width + rx) as usize] = self.alpha_at(x, y);
            }
        }
        rotated
    }
}

/// Measures and rasterizes single-line strings.
///
/// The layout engine depends on this seam alone, so tests can substitute
/// deterministic glyph shapes and the production rasterizer can change
/// without touching placement logic. Implementations must keep `rasterize`
/// exactly the size `measure` reports for the same input.
pub trait Typeface: Send + Sync {
    fn measure(&self, text: &str, px: f32) -> GlyphExtent;
    fn rasterize(&self, text: &str, px: f32) -> CoverageMap;
}

/// Production implementation backed by a `rusttype` font.
pub struct FontTypeface {
    font: Font<'static>,
}

impl FontTypeface {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, TypefaceError> {
        let font = Font::try_from_vec(data).ok_or(TypefaceError::UnsupportedFont)?;
        Ok(FontTypeface { font })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TypefaceError> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Resolve a sans-serif face from the system font database.
    pub fn system() -> Result<Self, TypefaceError> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let query = fontdb::Query {
            families: &[fontdb::Family::SansSerif],
            ..fontdb::Query::default()
        };
        let id = db.query(&query).ok_or(TypefaceError::NoSystemFont)?;
        db.with_face_data(id, |data, index| {
            Font::try_from_vec_and_index(data.to_vec(), index)
        })
        .flatten()
        .map(|font| FontTypeface { font })
        .ok_or(TypefaceError::UnsupportedFont)
    }
}

impl Typeface for FontTypeface {
    fn measure(&self, text: &str, px: f32) -> GlyphExtent {
        if text.is_empty() || px <= 0.0 {
            return GlyphExtent {
                width: 0,
                height: 0,
            };
        }
        let scale = Scale::uniform(px);
        let v_metrics = self.font.v_metrics(scale);
        let width = self
            .font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .filter_map(|glyph| glyph.pixel_bounding_box())
            .map(|bb| bb.max.x.max(0) as u32)
            .max()
            .unwrap_or(0);
        let height = (v_metrics.ascent - v_metrics.descent).ceil().max(0.0) as u32;
        GlyphExtent { width, height }
    }

    fn rasterize(&self, text: &str, px: f32) -> CoverageMap {
        let extent = self.measure(text, px);
        let mut coverage = CoverageMap::blank(extent.width, extent.height);
        if extent.is_empty() {
            return coverage;
        }
        let scale = Scale::uniform(px);
        let v_metrics = self.font.v_metrics(scale);
        for glyph in self.font.layout(text, scale, point(0.0, v_metrics.ascent)) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    let x = gx as i32 + bb.min.x;
                    let y = gy as i32 + bb.min.y;
                    if x < 0 || y < 0 || x >= extent.width as i32 || y >= extent.height as i32 {
                        return;
                    }
                    let idx = (y as u32 * extent.width + x as u32) as usize;
                    let alpha = (v * 255.0) as u8;
                    coverage.alpha[idx] = coverage.alpha[idx].max(alpha);
                });
            }
        }
        coverage
    }
}

/// Deterministic implementation with rectangular glyph metrics: every
/// character inks a solid block `aspect * px` wide and `px` tall. Meant for
/// tests and font-free environments where exact, reproducible extents matter
/// more than legible output.
#[derive(Debug, Clone, Copy)]
pub struct BlockTypeface {
    aspect: f32,
}

impl BlockTypeface {
    pub fn new(aspect: f32) -> Self {
        BlockTypeface { aspect }
    }
}

impl Default for BlockTypeface {
    fn default() -> Self {
        BlockTypeface { aspect: 0.6 }
    }
}

impl Typeface for BlockTypeface {
    fn measure(&self, text: &str, px: f32) -> GlyphExtent {
        if text.is_empty() || px <= 0.0 {
            return GlyphExtent {
                width: 0,
                height: 0,
            };
        }
        let chars = text.chars().count() as f32;
        GlyphExtent {
            width: (chars * self.aspect * px).ceil() as u32,
            height: px.ceil() as u32,
        }
    }

    fn rasterize(&self, text: &str, px: f32) -> CoverageMap {
        let extent = self.measure(text, px);
        CoverageMap {
            width: extent.width,
            height: extent.height,
            alpha: vec![255; (extent.width * extent.height) as usize],
        }
    }
}
