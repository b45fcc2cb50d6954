//! Live desktop capture of the primary monitor through `xcap`

use super::frame::Frame;
use super::types::{CaptureSource, check_region};
use crate::error::{VisionError, VisionResult};
use crate::geometry::Region;
use image::DynamicImage;

/// Captures the primary monitor. Every platform failure is reported as
/// `CaptureUnavailable` so the wait loop can retry it.
#[derive(Debug, Default)]
pub struct ScreenCapture;

impl ScreenCapture {
    pub fn new() -> Self {
        Self
    }

    fn primary_monitor() -> VisionResult<xcap::Monitor> {
        let monitors = xcap::Monitor::all().map_err(|e| {
            VisionError::capture_unavailable(format!("Failed to get monitors: {}", e))
        })?;
        for monitor in monitors {
            match monitor.is_primary() {
                Ok(true) => return Ok(monitor),
                Ok(false) => continue,
                Err(e) => {
                    return Err(VisionError::capture_unavailable(format!(
                        "Error checking monitor primary status: {}",
                        e
                    )));
                }
            }
        }
        Err(VisionError::capture_unavailable(
            "Could not find primary monitor",
        ))
    }

    fn monitor_bounds(monitor: &xcap::Monitor) -> VisionResult<Region> {
        let unavailable = |e: xcap::XCapError| {
            VisionError::capture_unavailable(format!("Monitor geometry: {}", e))
        };
        Region::new(
            monitor.x().map_err(unavailable)?,
            monitor.y().map_err(unavailable)?,
            monitor.width().map_err(unavailable)? as i32,
            monitor.height().map_err(unavailable)? as i32,
        )
    }
}

impl CaptureSource for ScreenCapture {
    fn capture(&self, region: Region) -> VisionResult<Frame> {
        let start_time = std::time::Instant::now();
        let monitor = Self::primary_monitor()?;
        let bounds = Self::monitor_bounds(&monitor)?;
        check_region(region, bounds)?;

        let rgba = monitor.capture_image().map_err(|e| {
            VisionError::capture_unavailable(format!("Failed to capture screen: {}", e))
        })?;
        let full = DynamicImage::ImageRgba8(rgba).to_rgb8();

        // Scaled displays can report logical bounds smaller than the buffer
        let (w, h) = region.size();
        let (cx, cy) = ((region.x() - bounds.x()) as u32, (region.y() - bounds.y()) as u32);
        if cx + w > full.width() || cy + h > full.height() {
            return Err(VisionError::capture_unavailable(format!(
                "captured buffer {}x{} does not cover {}",
                full.width(),
                full.height(),
                region
            )));
        }
        let pixels = image::imageops::crop_imm(&full, cx, cy, w, h).to_image();

        log::trace!(
            "📸 Captured {} in {}ms",
            region,
            start_time.elapsed().as_millis()
        );
        Frame::new(region, pixels)
    }

    fn bounds(&self) -> VisionResult<Region> {
        Self::monitor_bounds(&Self::primary_monitor()?)
    }

    fn name(&self) -> &str {
        "desktop"
    }
}
