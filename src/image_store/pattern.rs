//! Reference images and the patterns built on them

use crate::geometry::{Location, Offset, Region};
use crate::matcher::zncc::TemplateStats;
use image::RgbImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A decoded reference image, shared read-only between patterns and threads
pub struct PatternImage {
    name: String,
    path: Option<PathBuf>,
    rgb: RgbImage,
    stats: TemplateStats,
}

impl PatternImage {
    pub fn new(name: impl Into<String>, path: Option<PathBuf>, rgb: RgbImage) -> Self {
        let stats = TemplateStats::new(image::imageops::grayscale(&rgb));
        Self {
            name: name.into(),
            path,
            rgb,
            stats,
        }
    }

    /// Name derived from the file stem (e.g. `ok_button` for `ok_button.png`)
    pub fn from_file(path: &Path, rgb: RgbImage) -> Self {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();
        Self::new(name, Some(path.to_path_buf()), rgb)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn rgb(&self) -> &RgbImage {
        &self.rgb
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    pub(crate) fn stats(&self) -> &TemplateStats {
        &self.stats
    }
}

impl fmt::Debug for PatternImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternImage")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// A search target: reference image, similarity threshold and click offset
#[derive(Debug, Clone)]
pub struct Pattern {
    image: Arc<PatternImage>,
    threshold: f32,
    target_offset: Option<Offset>,
}

impl Pattern {
    pub const DEFAULT_THRESHOLD: f32 = 0.8;
    pub const EXACT_THRESHOLD: f32 = 0.99;

    pub fn new(image: Arc<PatternImage>) -> Self {
        Self {
            image,
            threshold: Self::DEFAULT_THRESHOLD,
            target_offset: None,
        }
    }

    /// Pattern over an in-memory image that never touched the disk
    pub fn from_rgb(name: impl Into<String>, rgb: RgbImage) -> Self {
        Self::new(Arc::new(PatternImage::new(name, None, rgb)))
    }

    /// Set the minimum similarity, clamped to 0.0-1.0
    pub fn similar(mut self, threshold: f32) -> Self {
        self.threshold = if threshold.is_nan() {
            Self::DEFAULT_THRESHOLD
        } else {
            threshold.clamp(0.0, 1.0)
        };
        self
    }

    pub fn exact(self) -> Self {
        self.similar(Self::EXACT_THRESHOLD)
    }

    /// Click target relative to the match center
    pub fn target_offset(mut self, offset: Offset) -> Self {
        self.target_offset = Some(offset);
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn offset(&self) -> Option<Offset> {
        self.target_offset
    }

    pub fn image(&self) -> &Arc<PatternImage> {
        &self.image
    }

    pub fn name(&self) -> &str {
        self.image.name()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Search area hint embedded in the file name, e.g. `ok-[300,1682,50,50].png`
    pub fn search_region(&self) -> Option<Region> {
        Region::parse_from_filename(self.image.name())
    }

    /// Target location for a match covering `region`
    pub fn target_for(&self, region: &Region) -> Location {
        region
            .center()
            .offset(self.target_offset.unwrap_or_else(Offset::zero))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn pattern() -> Pattern {
        Pattern::from_rgb("ok_button", RgbImage::from_pixel(10, 10, Rgb([1, 2, 3])))
    }

    #[test]
    fn test_pattern_similarity() {
        assert_eq!(pattern().threshold(), Pattern::DEFAULT_THRESHOLD);
        assert_eq!(pattern().similar(0.9).threshold(), 0.9);
        assert_eq!(pattern().similar(1.5).threshold(), 1.0);
        assert_eq!(pattern().similar(-1.0).threshold(), 0.0);
        assert_eq!(pattern().similar(f32::NAN).threshold(), Pattern::DEFAULT_THRESHOLD);
        assert_eq!(pattern().exact().threshold(), 0.99);
    }

    #[test]
    fn test_target_for_region() {
        let region = Region::new(100, 100, 50, 50).unwrap();
        assert_eq!(pattern().target_for(&region), Location::new(125, 125));

        let shifted = pattern().target_offset(Offset::new(10, -5));
        assert_eq!(shifted.target_for(&region), Location::new(135, 120));
    }

    #[test]
    fn test_search_region_from_name() {
        let img = RgbImage::new(5, 5);
        let hinted = Pattern::from_rgb("ok-[300,1682,50,50]", img.clone());
        assert_eq!(hinted.search_region(), Some(Region::new(300, 1682, 50, 50).unwrap()));
        assert_eq!(Pattern::from_rgb("ok", img).search_region(), None);
    }

    #[test]
    fn test_clones_share_the_image() {
        let a = pattern();
        let b = a.clone().similar(0.5);
        assert!(Arc::ptr_eq(a.image(), b.image()));
        assert_ne!(a.threshold(), b.threshold());
    }
}
