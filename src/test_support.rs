//! Synthetic screens and patterns shared by the unit tests

use image::{Rgb, RgbImage};

/// Deterministic per-pixel noise; any crop of it has a single sharp
/// correlation peak.
pub(crate) fn noise_image(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        Rgb([next(), next(), next()])
    })
}

/// Copy `src` into `dst` with its top-left corner at `(x, y)`
pub(crate) fn paste(dst: &mut RgbImage, src: &RgbImage, x: u32, y: u32) {
    image::imageops::replace(dst, src, x as i64, y as i64);
}

pub(crate) fn crop(src: &RgbImage, x: u32, y: u32, w: u32, h: u32) -> RgbImage {
    image::imageops::crop_imm(src, x, y, w, h).to_image()
}

/// Smooth radial blob on black; neighbouring offsets correlate strongly
pub(crate) fn blob(size: u32) -> RgbImage {
    let c = size as f32 / 2.0;
    RgbImage::from_fn(size, size, |x, y| {
        let (dx, dy) = (x as f32 - c, y as f32 - c);
        let v = (255.0 * (-(dx * dx + dy * dy) / (size as f32 * 2.5)).exp()) as u8;
        Rgb([v, v, v])
    })
}

/// Encode an image as PNG bytes
pub(crate) fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("PNG encoding of an in-memory buffer");
    buf.into_inner()
}
