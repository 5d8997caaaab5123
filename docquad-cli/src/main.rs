mod exif_orientation;

use clap::{Parser, Subcommand, ValueEnum};
use docquad_core::{scan_downscaled, DetectionResult, DownscaleEnhancement, ScanConfig, ScanOutcome};
use image::{GenericImageView, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "docquad-cli", about = "Locate a paper document's corners in a photograph")]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// How `--max-dimension` should enhance an oversized image while shrinking
/// it, mirroring [`DownscaleEnhancement`].
#[derive(Clone, Copy, ValueEnum)]
enum DownscaleEnhancementArg {
    Clahe,
    Unsharp,
    Plain,
}

impl From<DownscaleEnhancementArg> for DownscaleEnhancement {
    fn from(arg: DownscaleEnhancementArg) -> Self {
        match arg {
            DownscaleEnhancementArg::Clahe => DownscaleEnhancement::Clahe,
            DownscaleEnhancementArg::Unsharp => DownscaleEnhancement::Unsharp,
            DownscaleEnhancementArg::Plain => DownscaleEnhancement::Plain,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a single image
    Single {
        /// Input image path
        input: PathBuf,

        /// Named preset: photo (default), flatbed, low-contrast
        #[arg(long)]
        preset: Option<String>,

        /// Minimum contour area in source pixels
        #[arg(long)]
        min_area: Option<u32>,

        /// Disable the Canny fallback/default strategies
        #[arg(long)]
        no_fallback: bool,

        /// Skip CLAHE in the Enhanced strategy
        #[arg(long)]
        skip_clahe: bool,

        /// Shrink images whose longer side exceeds this many pixels before
        /// detecting (0 disables downscaling)
        #[arg(long, default_value_t = 1500)]
        max_dimension: u32,

        /// Which fused kernel enhances the image while it's shrunk
        #[arg(long, value_enum, default_value = "clahe")]
        downscale_enhancement: DownscaleEnhancementArg,

        /// Save a copy of the image with the detected quadrilateral drawn on it
        #[arg(long)]
        debug_overlay: Option<PathBuf>,
    },

    /// Scan every image in a directory
    Batch {
        /// Input directory
        input_dir: PathBuf,

        /// Named preset: photo (default), flatbed, low-contrast
        #[arg(long)]
        preset: Option<String>,

        /// Shrink images whose longer side exceeds this many pixels before
        /// detecting (0 disables downscaling)
        #[arg(long, default_value_t = 1500)]
        max_dimension: u32,

        /// Which fused kernel enhances the image while it's shrunk
        #[arg(long, value_enum, default_value = "clahe")]
        downscale_enhancement: DownscaleEnhancementArg,

        /// Number of parallel jobs (default: number of CPUs)
        #[arg(long, short)]
        jobs: Option<usize>,
    },
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff"];

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn resolve_config(preset: &Option<String>, min_area: Option<u32>, no_fallback: bool, skip_clahe: bool) -> Result<ScanConfig, Box<dyn std::error::Error>> {
    let mut config = match preset {
        Some(name) => ScanConfig::from_preset(name).ok_or_else(|| format!("unknown preset '{}'", name))?,
        None => ScanConfig::default(),
    };
    if let Some(min_area) = min_area {
        config.min_area = min_area;
    }
    if no_fallback {
        config.use_fallback = false;
    }
    if skip_clahe {
        config.skip_clahe = true;
    }
    Ok(config)
}

fn load_gray(path: &Path) -> Result<image::GrayImage, Box<dyn std::error::Error>> {
    let img = image::open(path)?;
    let img = exif_orientation::apply_exif_orientation(img, path);
    Ok(img.to_luma8())
}

fn describe(result: &DetectionResult) -> String {
    let corners = result
        .corners
        .iter()
        .map(|p| format!("({:.1}, {:.1})", p.x, p.y))
        .collect::<Vec<_>>()
        .join(", ");
    match result.score {
        Some(score) => format!("strategy={} score={:.3} corners=[{}]", result.strategy.as_str(), score, corners),
        None => format!("strategy={} (raw contour fallback) corners=[{}]", result.strategy.as_str(), corners),
    }
}

fn save_debug_overlay(input: &Path, result: &DetectionResult, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let base = image::open(input)?;
    let mut rgb: RgbImage = base.to_rgb8();
    let color = Rgb([255, 0, 0]);
    let n = result.corners.len();
    for i in 0..n {
        let a = result.corners[i];
        let b = result.corners[(i + 1) % n];
        draw_line_segment_mut(&mut rgb, (a.x as f32, a.y as f32), (b.x as f32, b.y as f32), color);
    }
    rgb.save(output)?;
    Ok(())
}

fn cmd_single(
    input: &Path,
    config: &ScanConfig,
    max_dimension: u32,
    enhancement: DownscaleEnhancement,
    debug_overlay: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let gray = load_gray(input)?;
    info!(path = %input.display(), width = gray.width(), height = gray.height(), "scanning");

    let outcome = scan_downscaled(&gray, config, max_dimension, enhancement, None)?;
    match &outcome {
        ScanOutcome::Found(result) => {
            println!("{}: {}", input.display(), describe(result));
            if let Some(overlay_path) = debug_overlay {
                save_debug_overlay(input, result, overlay_path)?;
                println!("  overlay saved to {}", overlay_path.display());
            }
        }
        ScanOutcome::NotFound { cancelled } => {
            println!("{}: no document found (cancelled={})", input.display(), cancelled);
        }
    }
    Ok(())
}

fn cmd_batch(
    input_dir: &Path,
    config: &ScanConfig,
    max_dimension: u32,
    enhancement: DownscaleEnhancement,
    jobs: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let images: Vec<PathBuf> = std::fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();

    if images.is_empty() {
        println!("No images found in {}", input_dir.display());
        return Ok(());
    }

    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok();
    }

    info!(count = images.len(), "scanning batch");

    let results: Vec<(PathBuf, Result<ScanOutcome, Box<dyn std::error::Error + Send + Sync>>)> = images
        .par_iter()
        .map(|path| {
            let result = (|| -> Result<ScanOutcome, Box<dyn std::error::Error + Send + Sync>> {
                let gray = load_gray(path).map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { e.to_string().into() })?;
                scan_downscaled(&gray, config, max_dimension, enhancement, None)
                    .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })
            })();
            (path.clone(), result)
        })
        .collect();

    let mut found = 0usize;
    let mut not_found = 0usize;
    let mut failed = 0usize;

    for (path, result) in &results {
        match result {
            Ok(ScanOutcome::Found(detection)) => {
                found += 1;
                println!("{}: {}", path.display(), describe(detection));
            }
            Ok(ScanOutcome::NotFound { .. }) => {
                not_found += 1;
                println!("{}: no document found", path.display());
            }
            Err(e) => {
                failed += 1;
                error!(path = %path.display(), error = %e, "scan failed");
            }
        }
    }

    println!("\nDone. found={} not_found={} failed={}", found, not_found, failed);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .init();

    match cli.command {
        Commands::Single {
            input,
            preset,
            min_area,
            no_fallback,
            skip_clahe,
            max_dimension,
            downscale_enhancement,
            debug_overlay,
        } => {
            let config = resolve_config(&preset, min_area, no_fallback, skip_clahe)?;
            cmd_single(&input, &config, max_dimension, downscale_enhancement.into(), debug_overlay.as_deref())?;
        }
        Commands::Batch {
            input_dir,
            preset,
            max_dimension,
            downscale_enhancement,
            jobs,
        } => {
            let config = resolve_config(&preset, None, false, false)?;
            cmd_batch(&input_dir, &config, max_dimension, downscale_enhancement.into(), jobs)?;
        }
    }

    Ok(())
}
