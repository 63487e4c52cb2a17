//! # Block Quantization
//!
//! Partitions the preprocessed canvas into a truncated grid of tile-sized
//! blocks, averages each block's luminance, and maps the mean to a pip
//! count 1-6.
//!
//! ## Pip Mapping
//!
//! ```text
//! pip = clamp( floor( (255 - mean) * 6 / 255 + 1 ), 1, 6 )
//! ```
//!
//! The mapping is inverted: dark blocks get many pips (more ink), bright
//! blocks get one. A uniform-white block (mean 255) maps to 1; a
//! uniform-black block (mean 0) maps to 7 before the clamp and lands on 6.
//!
//! ## Grid Truncation
//!
//! Block origins along an axis run `0, t, 2t, ...` strictly below
//! `extent - t`. A trailing strip that cannot hold a whole tile is excluded,
//! and so is the final block when the extent is an *exact* multiple of the
//! tile size. The exact-multiple case looks like an off-by-one, but it is
//! the established output contract: changing it shifts every downstream
//! tile count.

use image::GrayImage;
use rayon::prelude::*;

/// The truncated block grid over a canvas.
///
/// Derived from the canvas dimensions and tile size; never stored in the
/// result. Block `(bx, by)` covers the half-open square
/// `[bx*t, (bx+1)*t) x [by*t, (by+1)*t)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    cols: u32,
    rows: u32,
    tile_size: u32,
}

impl Grid {
    /// Compute the grid for a `width` x `height` canvas at `tile_size`.
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            cols: axis_blocks(width, tile_size),
            rows: axis_blocks(height, tile_size),
            tile_size,
        }
    }

    /// Number of block columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of block rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile edge length in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Total number of blocks in the grid.
    pub fn len(&self) -> u64 {
        self.cols as u64 * self.rows as u64
    }

    /// True when no whole block fits.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of whole blocks along one axis.
///
/// Origins are the multiples of `tile_size` strictly below
/// `extent - tile_size`.
fn axis_blocks(extent: u32, tile_size: u32) -> u32 {
    if extent <= tile_size {
        return 0;
    }
    (extent - tile_size).div_ceil(tile_size)
}

/// Arithmetic mean of the `tile_size * tile_size` samples of one block.
///
/// The block must lie fully inside the image; [`Grid`] guarantees that for
/// every block it yields.
pub fn block_mean(img: &GrayImage, x0: u32, y0: u32, tile_size: u32) -> f64 {
    let width = img.width() as usize;
    let raw = img.as_raw();
    let (x0, y0, t) = (x0 as usize, y0 as usize, tile_size as usize);

    let mut sum: u64 = 0;
    for row in 0..t {
        let start = (y0 + row) * width + x0;
        sum += raw[start..start + t].iter().map(|&v| v as u64).sum::<u64>();
    }
    sum as f64 / (t * t) as f64
}

/// Map a block's mean luminance to a pip count in 1..=6.
pub fn pip_for_mean(mean: f64) -> u8 {
    let pip = ((255.0 - mean) * 6.0 / 255.0 + 1.0).floor();
    pip.clamp(1.0, 6.0) as u8
}

/// Quantize one grid row, left to right.
///
/// Blocks are read-only and independent, so the column means are computed
/// in parallel. Side-effect free: same image and row always yield the same
/// pips.
pub fn quantize_row(img: &GrayImage, grid: &Grid, by: u32) -> Vec<u8> {
    let t = grid.tile_size();
    let y0 = by * t;
    (0..grid.cols())
        .into_par_iter()
        .map(|bx| pip_for_mean(block_mean(img, bx * t, y0, t)))
        .collect()
}
