use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::frequency::WordCount;
use crate::mask::RegionMask;
use crate::render::RenderOptions;
use crate::typeface::{CoverageMap, Typeface};

/// A word committed to the canvas. `x, y` is the top-left corner of its ink
/// coverage, already offset inside the sampled box by half the margin.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedWord {
    pub text: String,
    pub font_px: u32,
    pub x: u32,
    pub y: u32,
    pub vertical: bool,
}

/// Occupancy tracking with O(1) free-rectangle queries via a summed-area
/// table over blocked cells. Cells outside the mask's active region start
/// blocked; committing a word blocks exactly the cells its coverage inks,
/// and the table is patched from the first dirtied row down rather than
/// rebuilt whole.
pub(crate) struct IntegralOccupancy {
    width: u32,
    height: u32,
    blocked: Vec<bool>,
    integral: Vec<u32>,
}

impl IntegralOccupancy {
    pub(crate) fn new(mask: &RegionMask) -> Self {
        let (width, height) = mask.dimensions();
        let mut blocked = vec![false; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                if !mask.is_active(x, y) {
                    blocked[(y * width + x) as usize] = true;
                }
            }
        }
        let mut occupancy = IntegralOccupancy {
            width,
            height,
            blocked,
            integral: vec![0; ((width + 1) * (height + 1)) as usize],
        };
        occupancy.rebuild_from_row(0);
        occupancy
    }

    fn rebuild_from_row(&mut self, from_row: u32) {
        let stride = self.width as usize + 1;
        for y in from_row as usize..self.height as usize {
            let row = (y + 1) * stride;
            let prev = y * stride;
            for x in 0..self.width as usize {
                let cell = u32::from(self.blocked[y * self.width as usize + x]);
                self.integral[row + x + 1] =
                    cell + self.integral[prev + x + 1] + self.integral[row + x]
                        - self.integral[prev + x];
            }
        }
    }

    /// Number of blocked cells inside the `box_w x box_h` rectangle whose
    /// top-left is `(x, y)`. The rectangle must lie within the canvas.
    fn blocked_in(&self, x: u32, y: u32, box_w: u32, box_h: u32) -> u32 {
        let stride = self.width as usize + 1;
        let (x, y) = (x as usize, y as usize);
        let (bw, bh) = (box_w as usize, box_h as usize);
        self.integral[(y + bh) * stride + x + bw] + self.integral[y * stride + x]
            - self.integral[y * stride + x + bw]
            - self.integral[(y + bh) * stride + x]
    }

    /// Uniformly sample a top-left position where a `box_w x box_h` box is
    /// entirely free, or None when no position qualifies. Two passes over the
    /// candidate grid: count the free positions, then walk to the chosen one.
    pub(crate) fn sample_position(
        &self,
        rng: &mut impl Rng,
        box_w: u32,
        box_h: u32,
    ) -> Option<(u32, u32)> {
        if box_w == 0 || box_h == 0 || box_w > self.width || box_h > self.height {
            return None;
        }
        let max_x = self.width - box_w;
        let max_y = self.height - box_h;

        let mut free = 0u64;
        for y in 0..=max_y {
            for x in 0..=max_x {
                if self.blocked_in(x, y, box_w, box_h) == 0 {
                    free += 1;
                }
            }
        }
        if free == 0 {
            return None;
        }

        let chosen = rng.gen_range(0..free);
        let mut seen = 0u64;
        for y in 0..=max_y {
            for x in 0..=max_x {
                if self.blocked_in(x, y, box_w, box_h) == 0 {
                    if seen == chosen {
                        return Some((x, y));
                    }
                    seen += 1;
                }
            }
        }
        None
    }

    /// Block every cell the coverage inks, clipped to the canvas.
    pub(crate) fn commit(&mut self, coverage: &CoverageMap, x: u32, y: u32) {
        for cy in 0..coverage.height {
            let row_y = y + cy;
            if row_y >= self.height {
                break;
            }
            for cx in 0..coverage.width {
                let col_x = x + cx;
                if col_x >= self.width {
                    break;
                }
                if coverage.alpha_at(cx, cy) > 0 {
                    self.blocked[(row_y * self.width + col_x) as usize] = true;
                }
            }
        }
        self.rebuild_from_row(y.min(self.height));
    }
}

/// Fit the ranked vocabulary into the mask, most frequent first.
///
/// Font size carries over from word to word, rescaled by the relative
/// scaling factor against the frequency of the previously placed word.
/// Each attempt rolls an orientation, and a word that finds no free box
/// shrinks by `font_step` until it fits; once a word falls below the
/// minimum size the whole layout stops, since later words are never more
/// frequent and would fail the same way.
pub(crate) fn place_words(
    ranked: &[WordCount],
    mask: &RegionMask,
    typeface: &dyn Typeface,
    options: &RenderOptions,
) -> Vec<(PlacedWord, CoverageMap)> {
    let (width, height) = mask.dimensions();
    if ranked.is_empty() || width == 0 || height == 0 {
        return Vec::new();
    }

    let mut occupancy = IntegralOccupancy::new(mask);
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let font_step = options.font_step.max(1);
    let prefer_horizontal = f64::from(options.prefer_horizontal).clamp(0.0, 1.0);
    let relative_scaling = options.relative_scaling.clamp(0.0, 1.0);
    let max_count = ranked[0].count as f32;
    let mut font_size = options.max_font_size.unwrap_or(height).clamp(1, height.max(1));
    let mut last_freq = 1.0f32;
    let mut placed = Vec::new();

    'words: for word in ranked {
        let freq = word.count as f32 / max_count;
        if relative_scaling > 0.0 {
            let factor = relative_scaling * (freq / last_freq) + (1.0 - relative_scaling);
            font_size = (factor * font_size as f32).round() as u32;
        }

        loop {
            if font_size < options.min_font_size {
                break 'words;
            }
            let extent = typeface.measure(&word.text, font_size as f32);
            if extent.is_empty() {
                continue 'words;
            }
            let vertical = !rng.gen_bool(prefer_horizontal);
            let (box_w, box_h) = if vertical {
                (extent.height, extent.width)
            } else {
                (extent.width, extent.height)
            };
            if let Some((slot_x, slot_y)) =
                occupancy.sample_position(&mut rng, box_w + options.margin, box_h + options.margin)
            {
                let coverage = if vertical {
                    typeface
                        .rasterize(&word.text, font_size as f32)
                        .rotate_quarter()
                } else {
                    typeface.rasterize(&word.text, font_size as f32)
                };
                let x = slot_x + options.margin / 2;
                let y = slot_y + options.margin / 2;
                occupancy.commit(&coverage, x, y);
                placed.push((
                    PlacedWord {
                        text: word.text.clone(),
                        font_px: font_size,
                        x,
                        y,
                        vertical,
                    },
                    coverage,
                ));
                last_freq = freq;
                continue 'words;
            }
            font_size = font_size.saturating_sub(font_step);
        }
    }

    tracing::debug!(
        requested = ranked.len(),
        placed = placed.len(),
        "layout_complete"
    );
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::HexColor;
    use crate::typeface::BlockTypeface;
    use image::{Rgb, RgbImage};

    fn open_mask(width: u32, height: u32) -> RegionMask {
        let image = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        RegionMask::from_key_color(&image, HexColor::WHITE, 0)
    }

    fn left_half_mask(width: u32, height: u32) -> RegionMask {
        let image = RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        RegionMask::from_key_color(&image, HexColor::WHITE, 0)
    }

    fn vocabulary(entries: &[(&str, usize)]) -> Vec<WordCount> {
        entries
            .iter()
            .map(|(text, count)| WordCount {
                text: text.to_string(),
                count: *count,
            })
            .collect()
    }

    fn seeded_options(seed: u64) -> RenderOptions {
        RenderOptions {
            seed: Some(seed),
            max_font_size: Some(20),
            ..RenderOptions::default()
        }
    }

    // ── IntegralOccupancy ────────────────────────────────────────────────

    #[test]
    fn inactive_mask_cells_start_blocked() {
        let occupancy = IntegralOccupancy::new(&left_half_mask(8, 4));
        assert_eq!(occupancy.blocked_in(0, 0, 4, 4), 0);
        assert_eq!(occupancy.blocked_in(4, 0, 4, 4), 16);
        assert_eq!(occupancy.blocked_in(2, 0, 4, 4), 8);
    }

    #[test]
    fn oversized_boxes_never_sample() {
        let occupancy = IntegralOccupancy::new(&open_mask(10, 10));
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(occupancy.sample_position(&mut rng, 11, 2), None);
        assert_eq!(occupancy.sample_position(&mut rng, 2, 11), None);
        assert_eq!(occupancy.sample_position(&mut rng, 0, 5), None);
    }

    #[test]
    fn fully_blocked_canvas_never_samples() {
        let image = RgbImage::from_pixel(6, 6, Rgb([0, 0, 0]));
        let mask = RegionMask::from_key_color(&image, HexColor::WHITE, 0);
        let occupancy = IntegralOccupancy::new(&mask);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(occupancy.sample_position(&mut rng, 1, 1), None);
    }

    #[test]
    fn commit_blocks_only_inked_cells() {
        let mut occupancy = IntegralOccupancy::new(&open_mask(6, 6));
        // 3x1 coverage with a transparent middle cell
        let coverage = CoverageMap {
            width: 3,
            height: 1,
            alpha: vec![255, 0, 90],
        };
        occupancy.commit(&coverage, 1, 2);

        assert_eq!(occupancy.blocked_in(1, 2, 1, 1), 1);
        assert_eq!(occupancy.blocked_in(2, 2, 1, 1), 0);
        assert_eq!(occupancy.blocked_in(3, 2, 1, 1), 1);
    }

    #[test]
    fn integral_table_matches_brute_force_after_commits() {
        let mut occupancy = IntegralOccupancy::new(&left_half_mask(9, 7));
        let coverage = CoverageMap {
            width: 2,
            height: 3,
            alpha: vec![255; 6],
        };
        occupancy.commit(&coverage, 1, 1);
        occupancy.commit(&coverage, 2, 4);

        for y in 0..7u32 {
            for x in 0..9u32 {
                for h in 1..=(7 - y) {
                    for w in 1..=(9 - x) {
                        let mut expected = 0;
                        for yy in y..y + h {
                            for xx in x..x + w {
                                if occupancy.blocked[(yy * 9 + xx) as usize] {
                                    expected += 1;
                                }
                            }
                        }
                        assert_eq!(
                            occupancy.blocked_in(x, y, w, h),
                            expected,
                            "rect ({x},{y}) {w}x{h}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn sampled_positions_are_always_free() {
        let mut occupancy = IntegralOccupancy::new(&open_mask(30, 30));
        let block = CoverageMap {
            width: 10,
            height: 10,
            alpha: vec![255; 100],
        };
        occupancy.commit(&block, 10, 10);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let (x, y) = occupancy.sample_position(&mut rng, 5, 5).unwrap();
            assert_eq!(occupancy.blocked_in(x, y, 5, 5), 0);
        }
    }

    // ── place_words ──────────────────────────────────────────────────────

    #[test]
    fn placements_stay_inside_the_canvas() {
        let mask = open_mask(120, 80);
        let words = vocabulary(&[("alpha", 4), ("beta", 3), ("gamma", 2)]);
        let placed = place_words(&words, &mask, &BlockTypeface::default(), &seeded_options(7));

        assert_eq!(placed.len(), 3);
        for (word, coverage) in &placed {
            assert!(word.x + coverage.width <= 120, "{word:?} overflows x");
            assert!(word.y + coverage.height <= 80, "{word:?} overflows y");
        }
    }

    #[test]
    fn ink_never_lands_outside_the_active_region() {
        let mask = left_half_mask(160, 60);
        let words = vocabulary(&[("hi", 5), ("yo", 3)]);
        let placed = place_words(&words, &mask, &BlockTypeface::default(), &seeded_options(11));

        assert!(!placed.is_empty());
        for (word, coverage) in &placed {
            for cy in 0..coverage.height {
                for cx in 0..coverage.width {
                    if coverage.alpha_at(cx, cy) > 0 {
                        assert!(
                            mask.is_active(word.x + cx, word.y + cy),
                            "{} inked inactive pixel ({}, {})",
                            word.text,
                            word.x + cx,
                            word.y + cy
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn placed_words_never_overlap() {
        let mask = open_mask(100, 100);
        let words = vocabulary(&[("one", 5), ("two", 4), ("three", 3), ("four", 2)]);
        let placed = place_words(&words, &mask, &BlockTypeface::default(), &seeded_options(5));

        assert!(placed.len() >= 2);
        let boxes: Vec<(u32, u32, u32, u32)> = placed
            .iter()
            .map(|(w, c)| (w.x, w.y, c.width, c.height))
            .collect();
        for (i, a) in boxes.iter().enumerate() {
            for b in boxes.iter().skip(i + 1) {
                let disjoint =
                    a.0 + a.2 <= b.0 || b.0 + b.2 <= a.0 || a.1 + a.3 <= b.1 || b.1 + b.3 <= a.1;
                assert!(disjoint, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn same_seed_reproduces_the_layout() {
        let mask = open_mask(140, 90);
        let words = vocabulary(&[("apple", 6), ("pear", 4), ("plum", 2)]);
        let face = BlockTypeface::default();

        let first: Vec<PlacedWord> = place_words(&words, &mask, &face, &seeded_options(42))
            .into_iter()
            .map(|(w, _)| w)
            .collect();
        let second: Vec<PlacedWord> = place_words(&words, &mask, &face, &seeded_options(42))
            .into_iter()
            .map(|(w, _)| w)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn font_sizes_never_grow_down_the_ranking() {
        let mask = open_mask(200, 120);
        let words = vocabulary(&[("first", 10), ("second", 6), ("third", 3), ("fourth", 1)]);
        let placed = place_words(&words, &mask, &BlockTypeface::default(), &seeded_options(9));

        assert!(!placed.is_empty());
        for pair in placed.windows(2) {
            assert!(pair[0].0.font_px >= pair[1].0.font_px);
        }
    }

    #[test]
    fn word_too_wide_for_the_canvas_is_abandoned() {
        let mask = open_mask(10, 10);
        let words = vocabulary(&[("enormous", 1)]);
        let placed = place_words(&words, &mask, &BlockTypeface::default(), &seeded_options(1));
        assert!(placed.is_empty());
    }

    #[test]
    fn empty_mask_places_nothing() {
        let image = RgbImage::from_pixel(50, 50, Rgb([1, 2, 3]));
        let mask = RegionMask::from_key_color(&image, HexColor::WHITE, 0);
        let words = vocabulary(&[("word", 1)]);
        let placed = place_words(&words, &mask, &BlockTypeface::default(), &seeded_options(1));
        assert!(placed.is_empty());
    }

    #[test]
    fn zero_preference_forces_vertical_layout() {
        let mask = open_mask(100, 100);
        let words = vocabulary(&[("tall", 3)]);
        let options = RenderOptions {
            prefer_horizontal: 0.0,
            ..seeded_options(2)
        };
        let placed = place_words(&words, &mask, &BlockTypeface::default(), &options);

        assert_eq!(placed.len(), 1);
        let (word, coverage) = &placed[0];
        assert!(word.vertical);
        assert!(coverage.height > coverage.width);
    }

    #[test]
    fn full_preference_keeps_everything_horizontal() {
        let mask = open_mask(140, 90);
        let words = vocabulary(&[("wide", 4), ("flat", 2)]);
        let options = RenderOptions {
            prefer_horizontal: 1.0,
            ..seeded_options(3)
        };
        let placed = place_words(&words, &mask, &BlockTypeface::default(), &options);

        assert_eq!(placed.len(), 2);
        assert!(placed.iter().all(|(w, _)| !w.vertical));
    }
}
