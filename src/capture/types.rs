// Core capture types and traits
use super::frame::Frame;
use crate::error::{VisionError, VisionResult};
use crate::geometry::Region;

// Trait defining a readable display surface (live desktop or in-memory screen)
pub trait CaptureSource: Send + Sync {
    /// Read the pixels of `region`, in screen coordinates.
    ///
    /// Fails with `CaptureUnavailable` when the surface cannot be read and
    /// with `InvalidGeometry` when `region` is empty or not inside `bounds()`.
    fn capture(&self, region: Region) -> VisionResult<Frame>;

    /// Extent of the display surface
    fn bounds(&self) -> VisionResult<Region>;

    // Default whole-surface capture
    fn capture_full(&self) -> VisionResult<Frame> {
        let bounds = self.bounds()?;
        self.capture(bounds)
    }

    fn name(&self) -> &str {
        "screen"
    }
}

/// Reject regions a source cannot serve
pub(crate) fn check_region(region: Region, bounds: Region) -> VisionResult<()> {
    if region.is_empty() {
        return Err(VisionError::invalid_geometry(format!(
            "cannot capture empty region {}",
            region
        )));
    }
    if !bounds.contains_region(&region) {
        return Err(VisionError::invalid_geometry(format!(
            "region {} is outside the display bounds {}",
            region, bounds
        )));
    }
    Ok(())
}
