//! # Preprocessing
//!
//! Turns a decoded source photograph into the single-channel canvas the
//! quantizer reads. Steps are ordered and must not be reordered:
//!
//! 1. Convert to single-channel luminance (the image crate's fixed BT.709
//!    weights; any fixed monotonic formula gives equivalent mosaics).
//! 2. Apply global histogram equalization to spread the tonal range, so a
//!    flat photo still uses all six pip counts.
//! 3. If `scale > 1`, upsample to `(W * scale, H * scale)` with Lanczos3.
//!
//! The tile edge length is derived from the *original* width, before any
//! scaling, so upscaling makes the mosaic finer relative to the content
//! instead of just enlarging each die.

use image::{DynamicImage, GrayImage};
use image::imageops::{self, FilterType};

use crate::tiles::MIN_TILE_SIZE;

/// Default number of dice across a full-width row used to derive tile size.
pub const DEFAULT_REFERENCE_TILE_WIDTH: u32 = 300;

/// Derive the tile edge length from the original (pre-scale) image width.
///
/// ```text
/// tile_size = max(20, floor(original_width / reference_tile_width))
/// ```
pub fn tile_size_for_width(original_width: u32, reference_tile_width: u32) -> u32 {
    (original_width / reference_tile_width.max(1)).max(MIN_TILE_SIZE)
}

/// Run the full preprocessing chain: luminance, equalization, upscale.
pub fn preprocess(source: &DynamicImage, scale: u32) -> GrayImage {
    let gray = source.to_luma8();
    let equalized = equalize(&gray);
    if scale > 1 {
        imageops::resize(
            &equalized,
            equalized.width() * scale,
            equalized.height() * scale,
            FilterType::Lanczos3,
        )
    } else {
        equalized
    }
}

/// Globally equalize the histogram of a grayscale image.
///
/// Uses the classic step-LUT construction: each output level gets an equal
/// share `step = (pixels - count_of_top_bin) / 255` of the cumulative
/// histogram, with a half-step offset so the mapping rounds to the nearest
/// level. Degenerate histograms (one occupied bin, or fewer pixels than
/// levels) map through an identity LUT.
pub fn equalize(img: &GrayImage) -> GrayImage {
    let mut histogram = [0u64; 256];
    for pixel in img.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }
    let lut = equalize_lut(&histogram);

    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }
    out
}

/// Build the equalization lookup table for a 256-bin histogram.
fn equalize_lut(histogram: &[u64; 256]) -> [u8; 256] {
    let mut identity = [0u8; 256];
    for (i, v) in identity.iter_mut().enumerate() {
        *v = i as u8;
    }

    let occupied: Vec<u64> = histogram.iter().copied().filter(|&c| c != 0).collect();
    if occupied.len() <= 1 {
        return identity;
    }

    let total: u64 = occupied.iter().sum();
    let step = (total - occupied[occupied.len() - 1]) / 255;
    if step == 0 {
        return identity;
    }

    let mut lut = [0u8; 256];
    let mut n = step / 2;
    for (i, v) in lut.iter_mut().enumerate() {
        *v = (n / step).min(255) as u8;
        n += histogram[i];
    }
    lut
}
