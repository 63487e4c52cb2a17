//! # Dice Tile Sets
//!
//! Loads the six dice face bitmaps and resamples them to the tile edge length
//! used by the current run. Faces are indexed by pip count (1-6), where pip 1
//! renders the brightest blocks and pip 6 the darkest.
//!
//! A [`TileSet`] is immutable once built and cheap to share, so the pipeline
//! keeps a [`TileCache`] keyed by tile size: concurrent runs over images of
//! the same width reuse one set instead of re-decoding the source PNGs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::GrayImage;
use image::imageops::{self, FilterType};

use crate::error::DadoError;

/// Smallest allowed tile edge length in pixels.
///
/// Below this the pips become unreadable blobs, so tile sizing clamps here.
pub const MIN_TILE_SIZE: u32 = 20;

/// Number of dice faces in a set.
pub const FACE_COUNT: u8 = 6;

/// The six dice face bitmaps for one tile size.
///
/// Immutable after construction; shared read-only across lookups.
#[derive(Debug)]
pub struct TileSet {
    tile_size: u32,
    /// Faces in pip order; index 0 holds pip 1.
    faces: Vec<GrayImage>,
}

impl TileSet {
    /// Load the six face bitmaps `1.png`..`6.png` from `dir` and resample
    /// each to `tile_size` x `tile_size` with Lanczos3.
    ///
    /// Fails with [`DadoError::ResourceMissing`] if any face cannot be
    /// located or decoded.
    pub fn load(dir: &Path, tile_size: u32) -> Result<Self, DadoError> {
        let mut faces = Vec::with_capacity(FACE_COUNT as usize);
        for pip in 1..=FACE_COUNT {
            let path = dir.join(format!("{pip}.png"));
            let face = image::open(&path).map_err(|e| DadoError::ResourceMissing {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let face = imageops::resize(
                &face.to_luma8(),
                tile_size,
                tile_size,
                FilterType::Lanczos3,
            );
            faces.push(face);
        }
        Ok(Self { tile_size, faces })
    }

    /// Tile edge length in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Get the face bitmap for a pip count.
    ///
    /// `pip` must be in 1..=6; the quantizer guarantees this.
    pub fn face(&self, pip: u8) -> &GrayImage {
        debug_assert!((1..=FACE_COUNT).contains(&pip), "pip {pip} out of range");
        &self.faces[(pip - 1) as usize]
    }
}

/// Shared cache of [`TileSet`]s keyed by tile size.
///
/// Sets are built once per size and handed out as `Arc`s; nothing is ever
/// mutated post-construction, so concurrent runs can hold the same set.
pub struct TileCache {
    dir: PathBuf,
    sets: Mutex<HashMap<u32, Arc<TileSet>>>,
}

impl TileCache {
    /// Create a cache that loads face bitmaps from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sets: Mutex::new(HashMap::new()),
        }
    }

    /// Directory the face bitmaps are loaded from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the tile set for `tile_size`, loading it on first use.
    pub fn get(&self, tile_size: u32) -> Result<Arc<TileSet>, DadoError> {
        let mut sets = self.sets.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(set) = sets.get(&tile_size) {
            return Ok(Arc::clone(set));
        }
        log::debug!("loading tile set for tile size {tile_size}");
        let set = Arc::new(TileSet::load(&self.dir, tile_size)?);
        sets.insert(tile_size, Arc::clone(&set));
        Ok(set)
    }
}
