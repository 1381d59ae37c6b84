use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, Rgb, RgbImage};

use crate::color::HexColor;
use crate::error::WordCloudError;
use crate::frequency;
use crate::layout;
use crate::mask::RegionMask;
use crate::stopwords::StopwordSet;
use crate::typeface::{CoverageMap, Typeface};

/// Layout and paint knobs. The defaults mirror the production deployment:
/// a 5px black contour around the region, 8px font floor, collocations off
/// so the cloud stays single words.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub max_words: usize,
    pub min_font_size: u32,
    pub max_font_size: Option<u32>,
    pub font_step: u32,
    pub relative_scaling: f32,
    pub prefer_horizontal: f32,
    pub margin: u32,
    pub background: HexColor,
    pub contour_width: u32,
    pub contour_color: HexColor,
    pub collocations: bool,
    pub seed: Option<u64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            max_words: 200,
            min_font_size: 8,
            max_font_size: None,
            font_step: 1,
            relative_scaling: 0.5,
            prefer_horizontal: 0.9,
            margin: 2,
            background: HexColor::BLACK,
            contour_width: 5,
            contour_color: HexColor::BLACK,
            collocations: false,
            seed: None,
        }
    }
}

/// The rendering engine. Holds the typeface and options; each `generate`
/// call is independent, so one instance serves concurrent requests.
pub struct WordCloud {
    typeface: Arc<dyn Typeface>,
    options: RenderOptions,
}

impl WordCloud {
    pub fn new(typeface: Arc<dyn Typeface>) -> Self {
        Self::with_options(typeface, RenderOptions::default())
    }

    pub fn with_options(typeface: Arc<dyn Typeface>, options: RenderOptions) -> Self {
        WordCloud { typeface, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Lay the text out inside the mask's active region and paint it over a
    /// flat background, each word tinted with the average color the source
    /// image shows under its bounding box. An empty active region is not an
    /// error: the output is the bare background, logged as a warning, since
    /// the caller may have picked a key color absent from the image.
    pub fn generate(
        &self,
        text: &str,
        mask: &RegionMask,
        stopwords: &StopwordSet,
        color_source: &RgbImage,
    ) -> Result<RgbImage, WordCloudError> {
        let (width, height) = mask.dimensions();
        if color_source.dimensions() != (width, height) {
            return Err(WordCloudError::DimensionMismatch {
                mask_width: width,
                mask_height: height,
                image_width: color_source.width(),
                image_height: color_source.height(),
            });
        }

        let ranked = frequency::ranked_words(
            text,
            stopwords,
            self.options.collocations,
            self.options.max_words,
        );
        if ranked.is_empty() {
            return Err(WordCloudError::EmptyVocabulary);
        }

        let placements = if mask.is_empty() {
            tracing::warn!("mask_region_empty");
            Vec::new()
        } else {
            layout::place_words(&ranked, mask, self.typeface.as_ref(), &self.options)
        };
        if placements.is_empty() && !mask.is_empty() {
            tracing::warn!(words = ranked.len(), "no_words_placed");
        }

        let mut canvas = RgbImage::from_pixel(width, height, self.options.background.into());
        for (word, coverage) in &placements {
            let tint = average_color(color_source, word.x, word.y, coverage.width, coverage.height);
            blend_coverage(&mut canvas, coverage, word.x, word.y, tint);
        }
        if self.options.contour_width > 0 {
            draw_contour(
                &mut canvas,
                mask,
                self.options.contour_width,
                self.options.contour_color.into(),
            );
        }

        tracing::debug!(placed = placements.len(), width, height, "cloud_rendered");
        Ok(canvas)
    }
}

/// Encode to PNG in memory.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Mean RGB of the source image under the box, clipped to the canvas.
fn average_color(source: &RgbImage, x: u32, y: u32, box_w: u32, box_h: u32) -> Rgb<u8> {
    let x_end = (x + box_w).min(source.width());
    let y_end = (y + box_h).min(source.height());
    let (mut r, mut g, mut b, mut n) = (0u64, 0u64, 0u64, 0u64);
    for yy in y..y_end {
        for xx in x..x_end {
            let pixel = source.get_pixel(xx, yy);
            r += u64::from(pixel.0[0]);
            g += u64::from(pixel.0[1]);
            b += u64::from(pixel.0[2]);
            n += 1;
        }
    }
    if n == 0 {
        return Rgb([0, 0, 0]);
    }
    Rgb([(r / n) as u8, (g / n) as u8, (b / n) as u8])
}

fn blend_coverage(canvas: &mut RgbImage, coverage: &CoverageMap, x0: u32, y0: u32, color: Rgb<u8>) {
    for cy in 0..coverage.height {
        for cx in 0..coverage.width {
            let alpha = coverage.alpha_at(cx, cy);
            if alpha == 0 {
                continue;
            }
            let (x, y) = (x0 + cx, y0 + cy);
            if x >= canvas.width() || y >= canvas.height() {
                continue;
            }
            let dst = canvas.get_pixel_mut(x, y);
            let sa = f32::from(alpha) / 255.0;
            let inv = 1.0 - sa;
            for channel in 0..3 {
                dst.0[channel] =
                    (f32::from(color.0[channel]) * sa + f32::from(dst.0[channel]) * inv) as u8;
            }
        }
    }
}

/// Trace the active region's edge: boundary cells are active cells with an
/// inactive 4-neighbor (the canvas border counts as inactive), dilated to
/// half the contour width on each side.
fn draw_contour(canvas: &mut RgbImage, mask: &RegionMask, contour_width: u32, color: Rgb<u8>) {
    let (width, height) = mask.dimensions();
    let mut boundary = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if !mask.is_active(x, y) {
                continue;
            }
            let at_edge = x == 0
                || y == 0
                || x + 1 == width
                || y + 1 == height
                || !mask.is_active(x - 1, y)
                || !mask.is_active(x + 1, y)
                || !mask.is_active(x, y - 1)
                || !mask.is_active(x, y + 1);
            if at_edge {
                boundary.push((x, y));
            }
        }
    }

    let radius = (contour_width / 2) as i64;
    for (bx, by) in boundary {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let x = bx as i64 + dx;
                let y = by as i64 + dy;
                if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                    canvas.put_pixel(x as u32, y as u32, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeface::BlockTypeface;

    fn engine(options: RenderOptions) -> WordCloud {
        WordCloud::with_options(Arc::new(BlockTypeface::default()), options)
    }

    fn seeded(seed: u64) -> RenderOptions {
        RenderOptions {
            seed: Some(seed),
            max_font_size: Some(20),
            ..RenderOptions::default()
        }
    }

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(rgb))
    }

    fn full_mask(width: u32, height: u32) -> RegionMask {
        RegionMask::from_key_color(&solid(width, height, [255, 255, 255]), HexColor::WHITE, 0)
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let cloud = engine(seeded(1));
        let err = cloud
            .generate(
                "hello world",
                &full_mask(10, 10),
                &StopwordSet::empty(),
                &solid(5, 5, [0, 0, 0]),
            )
            .unwrap_err();
        assert_eq!(
            err,
            WordCloudError::DimensionMismatch {
                mask_width: 10,
                mask_height: 10,
                image_width: 5,
                image_height: 5,
            }
        );
    }

    #[test]
    fn text_with_no_usable_words_is_rejected() {
        let cloud = engine(seeded(1));
        let err = cloud
            .generate(
                "the and of 42",
                &full_mask(64, 64),
                &StopwordSet::bundled(),
                &solid(64, 64, [0, 0, 0]),
            )
            .unwrap_err();
        assert_eq!(err, WordCloudError::EmptyVocabulary);
    }

    #[test]
    fn output_matches_canvas_dimensions() {
        let cloud = engine(seeded(2));
        let rendered = cloud
            .generate(
                "hello world hello",
                &full_mask(80, 60),
                &StopwordSet::empty(),
                &solid(80, 60, [200, 10, 10]),
            )
            .unwrap();
        assert_eq!(rendered.dimensions(), (80, 60));
    }

    #[test]
    fn words_take_the_color_of_the_source_image() {
        let cloud = engine(seeded(3));
        let rendered = cloud
            .generate(
                "crimson crimson crimson",
                &full_mask(80, 60),
                &StopwordSet::empty(),
                &solid(80, 60, [255, 0, 0]),
            )
            .unwrap();
        let red_pixels = rendered.pixels().filter(|p| p.0 == [255, 0, 0]).count();
        assert!(red_pixels > 0, "no source-colored ink in the output");
    }

    #[test]
    fn background_fills_unpainted_pixels() {
        let options = RenderOptions {
            background: HexColor::new(0x11, 0x22, 0x33),
            contour_width: 0,
            ..seeded(4)
        };
        let rendered = engine(options)
            .generate(
                "dot",
                &full_mask(100, 100),
                &StopwordSet::empty(),
                &solid(100, 100, [255, 255, 255]),
            )
            .unwrap();
        // margin keeps ink off the canvas border, so the corner is untouched
        assert_eq!(rendered.get_pixel(0, 0).0, [0x11, 0x22, 0x33]);
    }

    #[test]
    fn empty_active_region_renders_bare_background() {
        let options = RenderOptions {
            background: HexColor::new(9, 9, 9),
            ..seeded(5)
        };
        let source = solid(40, 40, [1, 2, 3]);
        let mask = RegionMask::from_key_color(&source, HexColor::WHITE, 0);
        let rendered = engine(options)
            .generate("words words", &mask, &StopwordSet::empty(), &source)
            .unwrap();
        assert!(rendered.pixels().all(|p| p.0 == [9, 9, 9]));
    }

    #[test]
    fn contour_traces_the_region_edge() {
        let width = 60u32;
        let source = RgbImage::from_fn(width, 40, |x, _| {
            if x < width / 2 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let mask = RegionMask::from_key_color(&source, HexColor::WHITE, 0);
        let options = RenderOptions {
            contour_width: 2,
            contour_color: HexColor::new(255, 0, 0),
            ..seeded(6)
        };
        let rendered = engine(options)
            .generate("boundary", &mask, &StopwordSet::empty(), &source)
            .unwrap();

        // rightmost active column is boundary, far inactive side is not
        assert_eq!(rendered.get_pixel(width / 2 - 1, 20).0, [255, 0, 0]);
        assert_ne!(rendered.get_pixel(width - 1, 20).0, [255, 0, 0]);
    }

    #[test]
    fn seeded_renders_are_byte_identical() {
        let source = solid(90, 70, [80, 120, 200]);
        let mask = full_mask(90, 70);
        let stopwords = StopwordSet::bundled();
        let text = "pine oak pine birch oak pine";

        let first = engine(seeded(7))
            .generate(text, &mask, &stopwords, &source)
            .unwrap();
        let second = engine(seeded(7))
            .generate(text, &mask, &stopwords, &source)
            .unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn png_encoding_round_trips() {
        let rendered = engine(seeded(8))
            .generate(
                "ping pong ping",
                &full_mask(50, 30),
                &StopwordSet::empty(),
                &solid(50, 30, [0, 255, 0]),
            )
            .unwrap();
        let bytes = encode_png(&rendered).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (50, 30));
        assert_eq!(decoded.as_raw(), rendered.as_raw());
    }
}
