//! # Compositing
//!
//! Assembles the output mosaic: a white single-channel canvas the exact size
//! of the preprocessed image, with the matching dice face pasted over every
//! grid block. Destination pixels are overwritten, never blended, and the
//! trailing strips that hold no whole block stay white.
//!
//! The scan is row-major. Each row is quantized (in parallel across columns),
//! then its tiles are pasted, then progress is reported; cancellation is
//! checked once per row so a cancelled run stops promptly and its canvas is
//! dropped on the floor.

use image::{GrayImage, Luma, imageops};

use crate::error::DadoError;
use crate::progress::{CancelToken, ProgressSink};
use crate::quantize::{Grid, quantize_row};
use crate::tiles::TileSet;

/// A finished mosaic canvas plus the number of tiles pasted into it.
#[derive(Debug)]
pub struct Composition {
    pub canvas: GrayImage,
    pub tile_count: u64,
}

/// Compose the mosaic for a preprocessed canvas.
///
/// Emits `floor(row / total_rows * 100)` before each row and a terminal
/// `100` once the canvas is complete; an empty grid emits only the terminal
/// `100`. Returns [`DadoError::Cancelled`] if `cancel` fires at a row
/// boundary.
pub fn compose(
    processed: &GrayImage,
    tiles: &TileSet,
    progress: Option<&dyn ProgressSink>,
    cancel: Option<&CancelToken>,
) -> Result<Composition, DadoError> {
    let tile_size = tiles.tile_size();
    let grid = Grid::new(processed.width(), processed.height(), tile_size);
    log::debug!(
        "composing {}x{} canvas: {}x{} blocks at tile size {}",
        processed.width(),
        processed.height(),
        grid.cols(),
        grid.rows(),
        tile_size,
    );

    let mut canvas = GrayImage::from_pixel(processed.width(), processed.height(), Luma([255]));
    let mut tile_count: u64 = 0;

    for by in 0..grid.rows() {
        if let Some(token) = cancel
            && token.is_cancelled()
        {
            log::info!("composition cancelled at row {by}/{}", grid.rows());
            return Err(DadoError::Cancelled);
        }
        if let Some(sink) = progress {
            sink.percent((by as u64 * 100 / grid.rows() as u64) as u8);
        }

        let y0 = by * tile_size;
        for (bx, &pip) in quantize_row(processed, &grid, by).iter().enumerate() {
            let x0 = bx as u32 * tile_size;
            imageops::replace(&mut canvas, tiles.face(pip), x0 as i64, y0 as i64);
            tile_count += 1;
        }
    }

    if let Some(sink) = progress {
        sink.percent(100);
    }
    debug_assert_eq!(tile_count, grid.len());
    Ok(Composition { canvas, tile_count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::bundled_tile_dir;
    use crate::progress::{ChannelSink, FnSink};
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;

    fn tiles(tile_size: u32) -> TileSet {
        TileSet::load(&bundled_tile_dir(), tile_size).expect("bundled faces should load")
    }

    fn uniform(width: u32, height: u32, level: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([level]))
    }

    #[test]
    fn test_canvas_matches_processed_dimensions() {
        let out = compose(&uniform(130, 90, 128), &tiles(20), None, None).unwrap();
        assert_eq!((out.canvas.width(), out.canvas.height()), (130, 90));
    }

    #[test]
    fn test_tile_count_matches_grid() {
        let grid = Grid::new(130, 90, 20);
        let out = compose(&uniform(130, 90, 128), &tiles(20), None, None).unwrap();
        assert_eq!(out.tile_count, grid.len());
        assert_eq!(out.tile_count, 6 * 4);
    }

    #[test]
    fn test_trailing_strips_stay_white() {
        // 130x90 at tile 20 covers x < 120, y < 80; the rest must be white
        // regardless of how dark the source is.
        let out = compose(&uniform(130, 90, 0), &tiles(20), None, None).unwrap();
        for y in 0..90 {
            for x in 120..130 {
                assert_eq!(out.canvas.get_pixel(x, y).0[0], 255, "at ({x},{y})");
            }
        }
        for y in 80..90 {
            for x in 0..130 {
                assert_eq!(out.canvas.get_pixel(x, y).0[0], 255, "at ({x},{y})");
            }
        }
    }

    #[test]
    fn test_white_input_pastes_pip_one() {
        // A pip-1 face has a single centered dot: the block's corner region
        // inside the die border is white, the block center is black.
        let set = tiles(20);
        let out = compose(&uniform(60, 60, 255), &set, None, None).unwrap();
        let face = set.face(1);
        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(
                    out.canvas.get_pixel(x, y).0[0],
                    face.get_pixel(x, y).0[0],
                    "block (0,0) should be an exact copy of face 1 at ({x},{y})"
                );
            }
        }
    }

    #[test]
    fn test_black_input_pastes_pip_six() {
        let set = tiles(20);
        let out = compose(&uniform(60, 60, 0), &set, None, None).unwrap();
        let face = set.face(6);
        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(
                    out.canvas.get_pixel(x + 20, y + 20).0[0],
                    face.get_pixel(x, y).0[0],
                    "block (1,1) should be an exact copy of face 6 at ({x},{y})"
                );
            }
        }
    }

    #[test]
    fn test_progress_monotonic_and_terminates_at_100() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);
        compose(&uniform(130, 130, 128), &tiles(20), Some(&sink), None).unwrap();
        drop(sink);

        let updates: Vec<u8> = rx.iter().collect();
        assert!(!updates.is_empty());
        assert!(updates.windows(2).all(|w| w[0] <= w[1]), "{updates:?}");
        assert_eq!(*updates.last().unwrap(), 100);
        // One update per row plus the terminal 100.
        let rows = Grid::new(130, 130, 20).rows() as usize;
        assert_eq!(updates.len(), rows + 1);
    }

    #[test]
    fn test_empty_grid_emits_only_terminal_100() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelSink::new(tx);
        let out = compose(&uniform(15, 15, 128), &tiles(20), Some(&sink), None).unwrap();
        drop(sink);

        assert_eq!(out.tile_count, 0);
        assert!(out.canvas.pixels().all(|p| p.0[0] == 255));
        let updates: Vec<u8> = rx.iter().collect();
        assert_eq!(updates, vec![100]);
    }

    #[test]
    fn test_cancel_before_first_row_discards_canvas() {
        let token = CancelToken::new();
        token.cancel();
        let err = compose(&uniform(130, 130, 128), &tiles(20), None, Some(&token)).unwrap_err();
        assert!(matches!(err, DadoError::Cancelled));
    }

    #[test]
    fn test_cancel_from_progress_sink_stops_mid_run() {
        // Cancel as soon as the first row reports; the run must error out
        // instead of finishing the scan.
        let token = CancelToken::new();
        let trigger = token.clone();
        let sink = FnSink::new(move |_pct| trigger.cancel());
        let err =
            compose(&uniform(130, 130, 128), &tiles(20), Some(&sink), Some(&token)).unwrap_err();
        assert!(matches!(err, DadoError::Cancelled));
    }

    #[test]
    fn test_compose_idempotent() {
        let mut img = GrayImage::new(130, 90);
        for (i, p) in img.pixels_mut().enumerate() {
            p.0[0] = (i % 241) as u8;
        }
        let set = tiles(20);
        let a = compose(&img, &set, None, None).unwrap();
        let b = compose(&img, &set, None, None).unwrap();
        assert_eq!(a.tile_count, b.tile_count);
        assert_eq!(a.canvas.as_raw(), b.canvas.as_raw());
    }

    #[test]
    fn test_gradient_uses_multiple_pips() {
        // Horizontal ramp from white to black should hit both end buckets.
        let mut img = GrayImage::new(260, 41);
        for y in 0..41 {
            for x in 0..260 {
                img.put_pixel(x, y, Luma([(255 - x.min(255)) as u8]));
            }
        }
        let grid = Grid::new(260, 41, 20);
        let pips = quantize_row(&img, &grid, 0);
        assert_eq!(pips.first(), Some(&1));
        assert_eq!(pips.last(), Some(&6));
    }
}
