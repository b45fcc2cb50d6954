//! Screen capture: the `CaptureSource` seam, captured frames and the
//! available backends.

pub mod frame;
#[cfg(feature = "xcap")]
pub mod screen;
pub mod types;
pub mod virtual_screen;

pub use frame::Frame;
#[cfg(feature = "xcap")]
pub use screen::ScreenCapture;
pub use types::CaptureSource;
pub use virtual_screen::VirtualScreen;
