//! Image-based screen matching for GUI automation.
//!
//! Load reference images, capture screen regions, locate the references by
//! normalized correlation and poll until they appear.

pub mod capture;
pub mod error;
pub mod finder;
pub mod geometry;
pub mod image_store;
pub mod matcher;
pub mod wait;

#[cfg(test)]
mod test_support;

pub use capture::{CaptureSource, Frame, VirtualScreen};
#[cfg(feature = "xcap")]
pub use capture::ScreenCapture;
pub use error::{VisionError, VisionResult};
pub use finder::{Finder, FinderConfig};
pub use geometry::{Location, Offset, Region};
pub use image_store::{ImageStore, Pattern, PatternImage};
pub use matcher::{Match, MatchConfig, MatchEngine, Metric};
pub use wait::{CancelToken, WaitConfig, WaitOutcome, WaitState};
