//! Content-sniffed image decoding into RGB8 buffers

use crate::error::{VisionError, VisionResult};
use image::{ImageFormat, RgbImage};
use std::path::Path;

/// Raster formats accepted for pattern files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

impl ImageKind {
    /// Identify the format from the leading bytes of the file.
    ///
    /// The file extension is never consulted.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if bytes.starts_with(b"BM") && bytes.len() >= 14 {
            Some(ImageKind::Bmp)
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Some(ImageKind::Tiff)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageKind::WebP)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImageKind::Png => "PNG",
            ImageKind::Jpeg => "JPEG",
            ImageKind::Gif => "GIF",
            ImageKind::Bmp => "BMP",
            ImageKind::Tiff => "TIFF",
            ImageKind::WebP => "WebP",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::Gif => ImageFormat::Gif,
            ImageKind::Bmp => ImageFormat::Bmp,
            ImageKind::Tiff => ImageFormat::Tiff,
            ImageKind::WebP => ImageFormat::WebP,
        }
    }
}

/// Decode an encoded image held in memory, normalizing to RGB8 (alpha dropped)
pub fn decode_bytes(bytes: &[u8], path: Option<&Path>) -> VisionResult<RgbImage> {
    let kind = ImageKind::sniff(bytes).ok_or_else(|| VisionError::UnsupportedFormat {
        path: path.map(Path::to_path_buf),
    })?;

    log::trace!("Decoding {} image ({} bytes)", kind.name(), bytes.len());

    let decoded = image::load_from_memory_with_format(bytes, kind.image_format()).map_err(|e| {
        VisionError::DecodeError {
            path: path.map(Path::to_path_buf),
            format: kind.name(),
            reason: e.to_string(),
        }
    })?;

    Ok(decoded.to_rgb8())
}
