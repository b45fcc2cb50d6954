//! Zero-mean normalized cross-correlation on 8-bit luma.
//!
//! For a template `t` and a same-sized window `i` of `n` pixels:
//!
//! ```text
//!            n·Σti − Σt·Σi
//! score = ─────────────────────────────────────────
//!         sqrt((n·Σt² − (Σt)²) · (n·Σi² − (Σi)²))
//! ```
//!
//! Window sums come from a summed-area table, so only `Σti` is computed per
//! offset. All sums are exact integers; only the final division is floating
//! point. A zero variance on either side scores 0.

use image::GrayImage;

/// Template pixels plus the sums that do not depend on the window
#[derive(Debug, Clone)]
pub struct TemplateStats {
    pixels: GrayImage,
    sum: u64,
    sum_sq: u64,
}

impl TemplateStats {
    pub fn new(pixels: GrayImage) -> Self {
        let (sum, sum_sq) = pixels.as_raw().iter().fold((0u64, 0u64), |(s, s2), &p| {
            let p = p as u64;
            (s + p, s2 + p * p)
        });
        Self {
            pixels,
            sum,
            sum_sq,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &GrayImage {
        &self.pixels
    }

    fn len(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// `n·Σt² − (Σt)²`, i.e. `n²` times the variance
    fn spread(&self) -> i128 {
        self.len() as i128 * self.sum_sq as i128 - (self.sum as i128).pow(2)
    }

    /// A single-colour template correlates with nothing
    pub fn is_flat(&self) -> bool {
        self.spread() == 0
    }
}

/// Summed-area table of pixel values and squared pixel values.
///
/// Stored with a leading zero row and column so window sums need no bounds
/// special cases.
pub struct SummedAreaTable {
    stride: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl SummedAreaTable {
    pub fn new(image: &GrayImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0u64; stride * (h + 1)];
        let mut sum_sq = vec![0u64; stride * (h + 1)];
        let raw = image.as_raw();

        for y in 0..h {
            let mut row_sum = 0u64;
            let mut row_sum_sq = 0u64;
            for x in 0..w {
                let p = raw[y * w + x] as u64;
                row_sum += p;
                row_sum_sq += p * p;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sum_sq[idx] = sum_sq[idx - stride] + row_sum_sq;
            }
        }

        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    /// `(Σi, Σi²)` over the window with top-left `(x, y)` and size `w x h`
    pub fn window(&self, x: u32, y: u32, w: u32, h: u32) -> (u64, u64) {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        let at = |table: &[u64], x: usize, y: usize| table[y * self.stride + x];
        let rect = |table: &[u64]| {
            at(table, x1, y1) + at(table, x0, y0) - at(table, x0, y1) - at(table, x1, y0)
        };
        (rect(&self.sum), rect(&self.sum_sq))
    }

    /// True when every pixel of the window has the same value
    pub fn is_flat_window(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        let n = w as i128 * h as i128;
        let (sum, sum_sq) = self.window(x, y, w, h);
        n * sum_sq as i128 == (sum as i128).pow(2)
    }
}

/// ZNCC score of the template placed with its top-left corner at `(x, y)`.
///
/// The caller guarantees the template fits inside `frame` at that offset.
pub fn score_at(
    frame: &GrayImage,
    table: &SummedAreaTable,
    template: &TemplateStats,
    x: u32,
    y: u32,
) -> f32 {
    let (tw, th) = (template.width(), template.height());
    let n = template.len() as i128;
    if n == 0 {
        return 0.0;
    }

    let template_spread = template.spread();
    if template_spread == 0 {
        return 0.0;
    }

    let (window_sum, window_sum_sq) = table.window(x, y, tw, th);
    let window_spread = n * window_sum_sq as i128 - (window_sum as i128).pow(2);
    if window_spread == 0 {
        return 0.0;
    }

    let cross = cross_sum(frame, template, x, y);
    let numerator = n * cross as i128 - template.sum as i128 * window_sum as i128;
    let denominator = (template_spread as f64).sqrt() * (window_spread as f64).sqrt();

    ((numerator as f64 / denominator) as f32).clamp(0.0, 1.0)
}

/// `Σ t·i` over the template footprint at `(x, y)`
fn cross_sum(frame: &GrayImage, template: &TemplateStats, x: u32, y: u32) -> u64 {
    let fw = frame.width() as usize;
    let tw = template.width() as usize;
    let frame_raw = frame.as_raw();
    let template_raw = template.pixels.as_raw();

    let mut total = 0u64;
    for (row, template_row) in template_raw.chunks_exact(tw).enumerate() {
        let start = (y as usize + row) * fw + x as usize;
        let frame_row = &frame_raw[start..start + tw];
        total += template_row
            .iter()
            .zip(frame_row)
            .map(|(&t, &i)| t as u64 * i as u64)
            .sum::<u64>();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([((x * 7 + y * 13) % 251) as u8]))
    }

    #[test]
    fn test_summed_area_window_matches_direct_sum() {
        let img = gradient(17, 11);
        let table = SummedAreaTable::new(&img);
        let (x, y, w, h) = (3, 2, 9, 6);

        let mut sum = 0u64;
        let mut sum_sq = 0u64;
        for yy in y..y + h {
            for xx in x..x + w {
                let p = img.get_pixel(xx, yy)[0] as u64;
                sum += p;
                sum_sq += p * p;
            }
        }
        assert_eq!(table.window(x, y, w, h), (sum, sum_sq));
        assert_eq!(table.window(0, 0, 0, 0), (0, 0));
        assert!(!table.is_flat_window(x, y, w, h));
    }

    #[test]
    fn test_flat_window_detection() {
        let mut img = GrayImage::from_pixel(12, 12, Luma([120]));
        img.put_pixel(11, 11, Luma([121]));
        let table = SummedAreaTable::new(&img);
        assert!(table.is_flat_window(0, 0, 11, 11));
        assert!(!table.is_flat_window(1, 1, 11, 11));
    }

    #[test]
    fn test_identical_window_scores_one() {
        let img = gradient(20, 20);
        let template = TemplateStats::new(image::imageops::crop_imm(&img, 4, 5, 8, 6).to_image());
        let table = SummedAreaTable::new(&img);

        let score = score_at(&img, &table, &template, 4, 5);
        assert!((score - 1.0).abs() < 1e-6, "score was {score}");
    }

    #[test]
    fn test_brightness_and_contrast_invariance() {
        let base = gradient(10, 10);
        let brighter = GrayImage::from_fn(10, 10, |x, y| Luma([base.get_pixel(x, y)[0] / 2 + 60]));
        let template = TemplateStats::new(base);
        let table = SummedAreaTable::new(&brighter);

        let score = score_at(&brighter, &table, &template, 0, 0);
        assert!(score > 0.99, "score was {score}");
    }

    #[test]
    fn test_inverted_content_clamps_to_zero() {
        let base = gradient(10, 10);
        let inverted = GrayImage::from_fn(10, 10, |x, y| Luma([255 - base.get_pixel(x, y)[0]]));
        let template = TemplateStats::new(base);
        let table = SummedAreaTable::new(&inverted);

        assert_eq!(score_at(&inverted, &table, &template, 0, 0), 0.0);
    }

    #[test]
    fn test_flat_regions_score_zero() {
        let flat = GrayImage::from_pixel(10, 10, Luma([128]));
        let textured = gradient(10, 10);

        // Flat window under a textured template
        let template = TemplateStats::new(textured.clone());
        let table = SummedAreaTable::new(&flat);
        assert_eq!(score_at(&flat, &table, &template, 0, 0), 0.0);

        // Flat template over anything, including an identical flat window
        let flat_template = TemplateStats::new(flat.clone());
        assert!(flat_template.is_flat());
        assert_eq!(score_at(&flat, &table, &flat_template, 0, 0), 0.0);
        let table = SummedAreaTable::new(&textured);
        assert_eq!(score_at(&textured, &table, &flat_template, 0, 0), 0.0);
    }
}
