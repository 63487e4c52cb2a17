//! # Pipeline Driver
//!
//! Orchestrates a full conversion: decode, tile sizing, tile set lookup,
//! preprocessing, quantize + composite, persist. One driver serves every
//! caller; progress reporting and cancellation are injected per run through
//! [`RunOptions`] instead of being baked into pipeline variants.
//!
//! ## Ordering Guarantees
//!
//! - The source is decoded before any tile resource is touched, so a missing
//!   image never loads tiles.
//! - The scale factor is validated before preprocessing begins.
//! - The canvas is fully built in memory before the single output write; no
//!   partial or corrupt file ever exists at the output path.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::compose::compose;
use crate::error::DadoError;
use crate::preprocess::{DEFAULT_REFERENCE_TILE_WIDTH, preprocess, tile_size_for_width};
use crate::progress::{CancelToken, ProgressSink};
use crate::tiles::TileCache;

/// Directory holding the bundled dice face bitmaps `1.png`..`6.png`.
pub fn bundled_tile_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join("dice")
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Path of the persisted mosaic, `<output_dir>/dice-<source file name>`.
    pub output_path: PathBuf,
    /// Number of dice pasted into the canvas.
    pub tile_count: u64,
}

/// Per-run hooks. Both are optional and purely observational: a run produces
/// the same mosaic whether or not they are wired up.
#[derive(Default)]
pub struct RunOptions<'a> {
    /// Receives completion percentages while rows are processed.
    pub progress: Option<&'a dyn ProgressSink>,
    /// Checked at row boundaries; a cancelled run persists nothing.
    pub cancel: Option<&'a CancelToken>,
}

/// Converts photographs into dice mosaics.
///
/// ## Example
///
/// ```no_run
/// use dado::ArtGenerator;
///
/// let generator = ArtGenerator::new("out")?;
/// let conversion = generator.convert("photo.jpg".as_ref(), 1)?;
/// println!("{} dice -> {}", conversion.tile_count, conversion.output_path.display());
/// # Ok::<(), dado::DadoError>(())
/// ```
pub struct ArtGenerator {
    output_dir: PathBuf,
    reference_tile_width: u32,
    tiles: TileCache,
}

impl ArtGenerator {
    /// Create a generator writing into `output_dir`, creating the directory
    /// if absent. Tiles load from the bundled asset directory by default.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, DadoError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            reference_tile_width: DEFAULT_REFERENCE_TILE_WIDTH,
            tiles: TileCache::new(bundled_tile_dir()),
        })
    }

    /// Load dice faces from `dir` instead of the bundled assets.
    pub fn with_tile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tiles = TileCache::new(dir);
        self
    }

    /// Override the reference tile width used to derive tile size
    /// (default 300). Zero is treated as 1.
    pub fn with_reference_tile_width(mut self, width: u32) -> Self {
        self.reference_tile_width = width.max(1);
        self
    }

    /// Convert with no progress reporting or cancellation.
    pub fn convert(&self, image_path: &Path, scale: u32) -> Result<Conversion, DadoError> {
        self.convert_with(image_path, scale, &RunOptions::default())
    }

    /// Convert `image_path` into a dice mosaic.
    ///
    /// `scale` is an integer upsampling factor applied after equalization;
    /// `0` is rejected with [`DadoError::InvalidScale`]. On success the
    /// mosaic is written as JPEG to `<output_dir>/dice-<source file name>`.
    pub fn convert_with(
        &self,
        image_path: &Path,
        scale: u32,
        opts: &RunOptions<'_>,
    ) -> Result<Conversion, DadoError> {
        if scale == 0 {
            return Err(DadoError::InvalidScale { scale });
        }
        if !image_path.is_file() {
            return Err(DadoError::ImageNotFound {
                path: image_path.to_path_buf(),
            });
        }
        let source = image::open(image_path).map_err(|e| DadoError::ImageDecode {
            path: image_path.to_path_buf(),
            source: e,
        })?;

        // Tile size comes from the original width; scaling never changes
        // which tile size applies to the content.
        let tile_size = tile_size_for_width(source.width(), self.reference_tile_width);
        let tiles = self.tiles.get(tile_size)?;

        log::info!(
            "converting {} ({}x{}, scale {scale}, tile size {tile_size})",
            image_path.display(),
            source.width(),
            source.height(),
        );

        let processed = preprocess(&source, scale);
        let composition = compose(&processed, &tiles, opts.progress, opts.cancel)?;

        let output_path = self.output_path_for(image_path);
        composition
            .canvas
            .save_with_format(&output_path, ImageFormat::Jpeg)
            .map_err(|e| DadoError::Persist {
                path: output_path.clone(),
                source: e,
            })?;

        log::info!(
            "wrote {} ({} dice)",
            output_path.display(),
            composition.tile_count
        );
        Ok(Conversion {
            output_path,
            tile_count: composition.tile_count,
        })
    }

    /// Output path for a source image: `<output_dir>/dice-<file name>`.
    fn output_path_for(&self, image_path: &Path) -> PathBuf {
        let name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        self.output_dir.join(format!("dice-{name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_prefixes_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ArtGenerator::new(dir.path()).unwrap();
        let path = generator.output_path_for(Path::new("/some/where/portrait.png"));
        assert_eq!(path, dir.path().join("dice-portrait.png"));
    }

    #[test]
    fn test_new_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ArtGenerator::new(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
