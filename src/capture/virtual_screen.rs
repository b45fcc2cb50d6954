//! In-memory display surface backed by an RGB image

use super::frame::Frame;
use super::types::{CaptureSource, check_region};
use crate::error::{VisionError, VisionResult};
use crate::geometry::{Location, Region};
use crate::image_store::decode_bytes;
use image::RgbImage;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// A screen whose pixels come from an image file or a buffer built in code.
///
/// The content can be swapped while waits are polling it, and the next `n`
/// captures can be made to fail with `CaptureUnavailable`.
pub struct VirtualScreen {
    origin: Location,
    image: Mutex<RgbImage>,
    pending_failures: AtomicU32,
    captures: AtomicU64,
}

impl VirtualScreen {
    pub fn new(image: RgbImage) -> Self {
        Self::with_origin(image, Location::new(0, 0))
    }

    /// Screen whose top-left pixel sits at `origin` in screen coordinates
    pub fn with_origin(image: RgbImage, origin: Location) -> Self {
        Self {
            origin,
            image: Mutex::new(image),
            pending_failures: AtomicU32::new(0),
            captures: AtomicU64::new(0),
        }
    }

    /// Screen showing the screenshot stored at `path`
    pub fn from_file(path: impl AsRef<Path>) -> VisionResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VisionError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                VisionError::Io {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        })?;
        let image = decode_bytes(&bytes, Some(path))?;
        log::debug!(
            "🖥️ Virtual screen {}x{} from {}",
            image.width(),
            image.height(),
            path.display()
        );
        Ok(Self::new(image))
    }

    /// Replace the displayed content. Must keep the same size.
    pub fn set_image(&self, image: RgbImage) -> VisionResult<()> {
        let mut current = self.image.lock().unwrap_or_else(PoisonError::into_inner);
        if image.dimensions() != current.dimensions() {
            return Err(VisionError::invalid_geometry(format!(
                "replacement image is {}x{}, screen is {}x{}",
                image.width(),
                image.height(),
                current.width(),
                current.height()
            )));
        }
        *current = image;
        Ok(())
    }

    /// Make the next `n` captures fail as if the display were unreadable
    pub fn fail_next(&self, n: u32) {
        self.pending_failures.store(n, Ordering::SeqCst);
    }

    /// Capture calls served so far, failed ones included
    pub fn capture_count(&self) -> u64 {
        self.captures.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl CaptureSource for VirtualScreen {
    fn capture(&self, region: Region) -> VisionResult<Frame> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            log::trace!("Injected capture failure for {}", region);
            return Err(VisionError::capture_unavailable(
                "virtual screen is not readable",
            ));
        }

        check_region(region, self.bounds()?)?;

        let image = self.image.lock().unwrap_or_else(PoisonError::into_inner);
        let (w, h) = region.size();
        let pixels = image::imageops::crop_imm(
            &*image,
            (region.x() - self.origin.x) as u32,
            (region.y() - self.origin.y) as u32,
            w,
            h,
        )
        .to_image();
        Frame::new(region, pixels)
    }

    fn bounds(&self) -> VisionResult<Region> {
        let image = self.image.lock().unwrap_or_else(PoisonError::into_inner);
        Region::new(
            self.origin.x,
            self.origin.y,
            image.width() as i32,
            image.height() as i32,
        )
    }

    fn name(&self) -> &str {
        "virtual"
    }
}

impl std::fmt::Debug for VirtualScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualScreen")
            .field("bounds", &self.bounds().ok())
            .field("captures", &self.capture_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{noise_image, png_bytes};
    use image::Rgb;

    #[test]
    fn test_capture_crops_region() {
        let img = noise_image(40, 30, 3);
        let screen = VirtualScreen::new(img.clone());
        let region = Region::new(5, 6, 10, 8).unwrap();

        let frame = screen.capture(region).unwrap();
        assert_eq!(frame.region(), region);
        assert_eq!(frame.image().get_pixel(0, 0), img.get_pixel(5, 6));
        assert_eq!(frame.image().get_pixel(9, 7), img.get_pixel(14, 13));
    }

    #[test]
    fn test_capture_respects_origin() {
        let img = noise_image(20, 20, 4);
        let screen = VirtualScreen::with_origin(img.clone(), Location::new(1920, 0));
        assert_eq!(screen.bounds().unwrap(), Region::new(1920, 0, 20, 20).unwrap());

        let frame = screen.capture(Region::new(1922, 3, 4, 4).unwrap()).unwrap();
        assert_eq!(frame.image().get_pixel(0, 0), img.get_pixel(2, 3));
        assert!(screen.capture(Region::new(0, 0, 4, 4).unwrap()).is_err());
    }

    #[test]
    fn test_out_of_bounds_and_empty_regions_rejected() {
        let screen = VirtualScreen::new(RgbImage::new(20, 10));
        let outside = screen.capture(Region::new(15, 0, 10, 5).unwrap()).unwrap_err();
        assert!(matches!(outside, VisionError::InvalidGeometry { .. }));

        let empty = screen.capture(Region::new(2, 2, 0, 5).unwrap()).unwrap_err();
        assert!(matches!(empty, VisionError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_injected_failures_are_transient() {
        let screen = VirtualScreen::new(RgbImage::new(8, 8));
        screen.fail_next(2);

        let full = screen.bounds().unwrap();
        assert!(screen.capture(full).unwrap_err().is_transient());
        assert!(screen.capture(full).unwrap_err().is_transient());
        assert!(screen.capture(full).is_ok());
        assert_eq!(screen.capture_count(), 3);
    }

    #[test]
    fn test_set_image_swaps_content() {
        let screen = VirtualScreen::new(RgbImage::new(4, 4));
        screen
            .set_image(RgbImage::from_pixel(4, 4, Rgb([9, 9, 9])))
            .unwrap();
        let frame = screen.capture_full().unwrap();
        assert_eq!(frame.image().get_pixel(3, 3), &Rgb([9, 9, 9]));

        assert!(screen.set_image(RgbImage::new(5, 4)).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("screen.png");
        std::fs::write(&path, png_bytes(&noise_image(16, 9, 1))).unwrap();

        let screen = VirtualScreen::from_file(&path).unwrap();
        assert_eq!(screen.bounds().unwrap(), Region::new(0, 0, 16, 9).unwrap());

        let missing = VirtualScreen::from_file(dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(missing, VisionError::NotFound { .. }));
    }
}
