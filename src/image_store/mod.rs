//! Pattern images: content-sniffed decoding, a shared decode cache and the
//! `Pattern` search target.

pub mod cache;
pub mod decoder;
pub mod pattern;


pub use cache::ImageStore;
pub use decoder::{ImageKind, decode_bytes};
pub use pattern::{Pattern, PatternImage};
