//! Captured pixel buffers tagged with their screen region

use crate::error::{VisionError, VisionResult};
use crate::geometry::Region;
use image::{GrayImage, RgbImage};
use std::time::{Duration, Instant};

/// A single capture of a screen region.
///
/// Frames are not `Clone`: each one is moved into the match call that
/// consumes it and dropped afterwards.
#[derive(Debug)]
pub struct Frame {
    region: Region,
    image: RgbImage,
    captured_at: Instant,
}

impl Frame {
    /// Wrap a buffer captured from `region`. The buffer must be exactly the
    /// region's size.
    pub fn new(region: Region, image: RgbImage) -> VisionResult<Self> {
        if image.dimensions() != region.size() {
            return Err(VisionError::invalid_geometry(format!(
                "frame buffer is {}x{} but region {} was requested",
                image.width(),
                image.height(),
                region
            )));
        }
        Ok(Self {
            region,
            image,
            captured_at: Instant::now(),
        })
    }

    /// Frame for a standalone image, positioned at the screen origin
    pub fn from_image(image: RgbImage) -> VisionResult<Self> {
        let region = Region::from_size(image.width(), image.height())?;
        Self::new(region, image)
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn age(&self) -> Duration {
        self.captured_at.elapsed()
    }

    /// Luma plane used by the scoring metrics
    pub fn to_luma(&self) -> GrayImage {
        image::imageops::grayscale(&self.image)
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_frame_size_must_match_region() {
        let region = Region::new(100, 200, 4, 3).unwrap();
        let frame = Frame::new(region, RgbImage::new(4, 3)).unwrap();
        assert_eq!(frame.region(), region);
        assert_eq!((frame.width(), frame.height()), (4, 3));

        let err = Frame::new(region, RgbImage::new(3, 4)).unwrap_err();
        assert!(matches!(err, VisionError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_from_image_sits_at_origin() {
        let frame = Frame::from_image(RgbImage::from_pixel(5, 2, Rgb([9, 9, 9]))).unwrap();
        assert_eq!(frame.region(), Region::new(0, 0, 5, 2).unwrap());
        assert_eq!(frame.to_luma().dimensions(), (5, 2));
    }
}
