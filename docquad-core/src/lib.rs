//! Multi-strategy detection of a rectangular paper document's corners in a
//! photograph.
//!
//! The crate is organized the way the pipeline runs: low-level numeric
//! kernels (`clahe`, `box_blur`, `adaptive_threshold`, `morphology`,
//! `unsharp`, `fused`) at the bottom, geometry and scoring (`geom`,
//! `polyapprox`, `corner_order`, `contour_filter`) in the middle, the
//! external Canny/contour-tracing wrappers (`external`) alongside them, and
//! the orchestration layer (`driver`) on top. `config` and `error` are
//! shared across all of it.
//!
//! Most callers only need [`scan`] and [`ScanConfig`].

pub mod adaptive_threshold;
pub mod box_blur;
pub mod clahe;
pub mod config;
pub mod contour_filter;
pub mod corner_order;
pub mod driver;
pub mod error;
pub mod external;
pub mod fused;
pub mod geom;
pub mod kernels;
pub mod morphology;
pub mod polyapprox;
pub mod unsharp;

pub use config::ScanConfig;
pub use driver::{CancellationToken, DetectionResult, MultiStrategyDriver, ScanOutcome, StrategyName};
pub use error::ScanError;
pub use geom::{Point, Quad};
pub use kernels::{KernelProvider, ReferenceKernels};
pub use polyapprox::{DouglasPeucker, PolygonApproximator};

use image::GrayImage;

/// Locate a document's four corners in `gray` using the crate's own
/// reference kernels and polygon approximator.
///
/// This is the convenience entry point; construct a [`MultiStrategyDriver`]
/// directly to supply a custom [`KernelProvider`] or [`PolygonApproximator`],
/// or to pass a cancellation token.
pub fn scan(gray: &GrayImage, config: &ScanConfig) -> Result<ScanOutcome, ScanError> {
    let kernels = ReferenceKernels;
    let approximator = DouglasPeucker;
    let driver = MultiStrategyDriver::new(config, &kernels, &approximator);
    driver.scan(gray, 1.0, None)
}

/// Which fused kernel (§4.5) to use when [`scan_downscaled`] shrinks an
/// oversized source image down to a processing resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownscaleEnhancement {
    /// CLAHE fused with the downscale. Pairs naturally with `skip_clahe`:
    /// the Enhanced strategy then skips its own CLAHE pass, since this one
    /// already ran at source resolution before the shrink.
    Clahe,
    /// Unsharp mask fused with the downscale; recovers detail a plain
    /// resize would blur away, without CLAHE's contrast remapping.
    Unsharp,
    /// Plain bilinear downscale, no enhancement.
    Plain,
}

/// Downscale `gray` so its longer side is at most `max_dimension` (a no-op
/// if it already is), enhancing it during the resize per `enhancement`,
/// then detect on the result and map the winning corners back to `gray`'s
/// original resolution.
///
/// Every strategy in [`MultiStrategyDriver::scan`] is `O(W*H)` and three
/// run per call, so detecting directly on a full-resolution phone photo
/// (commonly 3000+ px on a side) is needlessly slow; this is the intended
/// entry point for that case. `max_dimension` around 1000-1500 px is
/// typical. `cancellation` is forwarded to the underlying scan.
pub fn scan_downscaled(
    gray: &GrayImage,
    config: &ScanConfig,
    max_dimension: u32,
    enhancement: DownscaleEnhancement,
    cancellation: driver::CancellationToken<'_>,
) -> Result<ScanOutcome, ScanError> {
    let (src_w, src_h) = (gray.width(), gray.height());
    if src_w < 1 || src_h < 1 {
        return Err(ScanError::InvalidDimensions { width: src_w, height: src_h });
    }

    let kernels = ReferenceKernels;
    let approximator = DouglasPeucker;

    let longer = src_w.max(src_h);
    if longer <= max_dimension || max_dimension == 0 {
        let driver = MultiStrategyDriver::new(config, &kernels, &approximator);
        return driver.scan(gray, 1.0, cancellation);
    }

    let scale = max_dimension as f64 / longer as f64;
    let dst_w = ((src_w as f64 * scale).round() as u32).max(1);
    let dst_h = ((src_h as f64 * scale).round() as u32).max(1);
    let scale_factor = src_w as f64 / dst_w as f64;

    let raw: &[u8] = gray.as_raw();
    let (downscaled, already_clahed) = match enhancement {
        DownscaleEnhancement::Clahe => (
            kernels.clahe_and_downscale(raw, src_w, src_h, dst_w, dst_h, config.clahe.clip_limit, config.clahe.tile_grid),
            true,
        ),
        DownscaleEnhancement::Unsharp => (kernels.unsharp_mask_and_downscale(raw, src_w, src_h, dst_w, dst_h, 0.5, 2), false),
        DownscaleEnhancement::Plain => (fused::bilinear_downscale(raw, src_w, src_h, dst_w, dst_h), false),
    };
    let downscaled_image = GrayImage::from_raw(dst_w, dst_h, downscaled).expect("dimensions match the computed downscale target");

    let owned_config;
    let effective_config = if already_clahed && !config.skip_clahe {
        owned_config = ScanConfig { skip_clahe: true, ..config.clone() };
        &owned_config
    } else {
        config
    };

    let driver = MultiStrategyDriver::new(effective_config, &kernels, &approximator);
    let outcome = driver.scan(&downscaled_image, scale_factor, cancellation)?;
    Ok(rescale_outcome(outcome, scale_factor))
}

fn rescale_outcome(outcome: ScanOutcome, scale_factor: f64) -> ScanOutcome {
    match outcome {
        ScanOutcome::Found(mut result) => {
            for p in &mut result.corners {
                p.x *= scale_factor;
                p.y *= scale_factor;
            }
            ScanOutcome::Found(result)
        }
        not_found => not_found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn synthetic_document(width: u32, height: u32, margin: u32, doc_level: u8, bg_level: u8) -> GrayImage {
        let mut img = GrayImage::from_pixel(width, height, Luma([bg_level]));
        for y in margin..(height - margin) {
            for x in margin..(width - margin) {
                img.put_pixel(x, y, Luma([doc_level]));
            }
        }
        img
    }

    #[test]
    fn scan_rejects_a_zero_sized_image() {
        let img = GrayImage::new(0, 5);
        let result = scan(&img, &ScanConfig::default());
        assert!(matches!(result, Err(ScanError::InvalidDimensions { width: 0, height: 5 })));
    }

    #[test]
    fn scan_finds_a_synthetic_document_on_a_contrasting_background() {
        let img = synthetic_document(300, 300, 30, 235, 20);
        let outcome = scan(&img, &ScanConfig::default()).unwrap();
        assert!(outcome.success());
    }

    #[test]
    fn scan_downscaled_is_a_no_op_below_the_max_dimension() {
        let img = synthetic_document(300, 300, 30, 235, 20);
        let direct = scan(&img, &ScanConfig::default()).unwrap();
        let downscaled = scan_downscaled(&img, &ScanConfig::default(), 1000, DownscaleEnhancement::Clahe, None).unwrap();
        assert_eq!(direct.success(), downscaled.success());
    }

    #[test]
    fn scan_downscaled_finds_a_document_and_rescales_corners_to_source_resolution() {
        let img = synthetic_document(1600, 1200, 160, 235, 20);
        let outcome = scan_downscaled(&img, &ScanConfig::default(), 400, DownscaleEnhancement::Clahe, None).unwrap();
        match outcome {
            ScanOutcome::Found(result) => {
                assert_eq!(result.corners.len(), 4);
                for corner in &result.corners {
                    assert!(corner.x >= 0.0 && corner.x <= 1600.0);
                    assert!(corner.y >= 0.0 && corner.y <= 1200.0);
                }
            }
            ScanOutcome::NotFound { .. } => panic!("expected to find the downscaled synthetic document"),
        }
    }

    #[test]
    fn scan_downscaled_rejects_a_zero_sized_image() {
        let img = GrayImage::new(0, 5);
        let result = scan_downscaled(&img, &ScanConfig::default(), 1000, DownscaleEnhancement::Plain, None);
        assert!(matches!(result, Err(ScanError::InvalidDimensions { width: 0, height: 5 })));
    }
}
