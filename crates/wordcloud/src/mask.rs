use image::{GrayImage, Luma, RgbImage};

use crate::color::HexColor;

/// Binary placement region for the layout engine, derived from a color image
/// by key-color matching. Active pixels are paintable; everything else is
/// off-limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMask {
    width: u32,
    height: u32,
    active: Vec<bool>,
}

impl RegionMask {
    /// A pixel is active iff every channel sits within `tolerance` of the key
    /// color. Tolerance 0 is an exact match, which is the documented contract
    /// of the upload form: the fillable region is flooded with one flat color.
    /// A small tolerance absorbs anti-aliasing and JPEG ringing at the edges.
    pub fn from_key_color(image: &RgbImage, key: HexColor, tolerance: u8) -> Self {
        let (width, height) = image.dimensions();
        let active = image
            .pixels()
            .map(|pixel| {
                let [r, g, b] = pixel.0;
                r.abs_diff(key.r) <= tolerance
                    && g.abs_diff(key.g) <= tolerance
                    && b.abs_diff(key.b) <= tolerance
            })
            .collect();
        RegionMask {
            width,
            height,
            active,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Out-of-bounds coordinates are inactive.
    pub fn is_active(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.active[(y * self.width + x) as usize]
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    /// True when no pixel matched the key color at all.
    pub fn is_empty(&self) -> bool {
        !self.active.iter().any(|a| *a)
    }

    /// Export as 8-bit grayscale, 255 for active pixels. Handy for debugging
    /// and for tests that compare masks pixel by pixel.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.is_active(x, y) { 255 } else { 0 }])
        })
    }
}
