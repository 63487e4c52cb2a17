//! # Dado CLI
//!
//! Command-line interface for the dice mosaic generator.
//!
//! ## Usage
//!
//! ```bash
//! # Convert a photo at its natural size
//! dado convert photo.jpg
//!
//! # Upscale 2x before tiling (finer mosaic relative to the content)
//! dado convert --scale 2 photo.jpg
//!
//! # Custom output directory and dice density
//! dado convert --output-dir mosaics --reference-width 200 photo.jpg
//! ```

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use dado::{ArtGenerator, ChannelSink, DadoError, RunOptions};

/// Dado - render photographs as dice mosaics
#[derive(Parser, Debug)]
#[command(name = "dado")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging (-v for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a photograph into a dice mosaic
    Convert {
        /// Source image path
        image: PathBuf,

        /// Integer upsampling factor applied before tiling
        #[arg(long, default_value = "1")]
        scale: u32,

        /// Directory the mosaic is written to (created if absent)
        #[arg(long, default_value = "out", value_name = "DIR")]
        output_dir: PathBuf,

        /// Dice per full-width row used to derive the tile size
        #[arg(long, default_value = "300")]
        reference_width: u32,

        /// Load dice face bitmaps from this directory instead of the
        /// bundled assets
        #[arg(long, value_name = "DIR")]
        tile_dir: Option<PathBuf>,

        /// Suppress the progress display
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), DadoError> {
    use std::io::Write;

    match cli.command {
        Commands::Convert {
            image,
            scale,
            output_dir,
            reference_width,
            tile_dir,
            quiet,
        } => {
            let mut generator =
                ArtGenerator::new(output_dir)?.with_reference_tile_width(reference_width);
            if let Some(dir) = tile_dir {
                generator = generator.with_tile_dir(dir);
            }

            // The pipeline runs on a worker thread; the only traffic back is
            // the progress channel drained here and the terminal result.
            let (tx, rx) = mpsc::channel();
            let conversion = thread::scope(|scope| {
                let worker = scope.spawn(|| {
                    let sink = ChannelSink::new(tx);
                    let opts = RunOptions {
                        progress: Some(&sink),
                        cancel: None,
                    };
                    generator.convert_with(&image, scale, &opts)
                });

                for pct in rx {
                    if !quiet {
                        print!("\r{pct:>3}%");
                        let _ = std::io::stdout().flush();
                    }
                }
                if !quiet {
                    println!();
                }

                match worker.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            })?;

            println!(
                "{} dice -> {}",
                conversion.tile_count,
                conversion.output_path.display()
            );
            Ok(())
        }
    }
}
