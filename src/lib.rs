//! # Dado - Dice Mosaic Generator
//!
//! Dado renders a photograph as a mosaic of dice faces: the image is split
//! into a grid of square blocks and each block's mean luminance picks the
//! die face (pip count 1-6) pasted there. Darker blocks get more pips, so
//! the mosaic reads as the photo from a distance.
//!
//! ## Pipeline
//!
//! ```text
//! decode -> luminance -> equalize -> [upscale] -> block means -> pips -> paste -> JPEG
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use dado::ArtGenerator;
//!
//! let generator = ArtGenerator::new("out")?;
//! let conversion = generator.convert("photo.jpg".as_ref(), 2)?;
//! println!(
//!     "{} dice -> {}",
//!     conversion.tile_count,
//!     conversion.output_path.display(),
//! );
//! # Ok::<(), dado::DadoError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tiles`] | Dice face loading and per-size caching |
//! | [`preprocess`] | Luminance, equalization, upscaling, tile sizing |
//! | [`quantize`] | Block grid, mean luminance, pip mapping |
//! | [`compose`] | Canvas assembly from tiles |
//! | [`progress`] | Progress sinks and cancellation |
//! | [`pipeline`] | The [`ArtGenerator`] driver |
//! | [`error`] | Error types |

pub mod compose;
pub mod error;
pub mod pipeline;
pub mod preprocess;
pub mod progress;
pub mod quantize;
pub mod tiles;

// Re-exports for convenience
pub use error::DadoError;
pub use pipeline::{ArtGenerator, Conversion, RunOptions};
pub use progress::{CancelToken, ChannelSink, FnSink, NullSink, ProgressSink};
