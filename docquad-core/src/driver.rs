//! The multi-strategy driver (§4.7): runs the Enhanced, Canny-Fallback, and
//! Canny-Default strategies in order, pools whatever scored candidates
//! survive, and picks the best one.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use image::GrayImage;
use tracing::{debug, info, instrument, warn};

use crate::config::ScanConfig;
use crate::contour_filter::{Candidate, ContourFilter};
use crate::corner_order::order_corners;
use crate::error::ScanError;
use crate::external;
use crate::geom::Point;
use crate::kernels::KernelProvider;
use crate::polyapprox::PolygonApproximator;

/// Which of the three branches produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyName {
    Enhanced,
    CannyFallback,
    CannyDefault,
}

impl StrategyName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::Enhanced => "enhanced",
            StrategyName::CannyFallback => "canny-fallback",
            StrategyName::CannyDefault => "canny-default",
        }
    }
}

/// A successful detection: either a fully scored quadrilateral, or (in the
/// degenerate last-resort case) the largest unapproximated raw contour.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub corners: Vec<Point>,
    pub score: Option<f64>,
    pub strategy: StrategyName,
}

/// The outcome of one `scan` call: a found document, or "no document"
/// (optionally because a cancellation signal was observed mid-scan).
#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Found(DetectionResult),
    NotFound { cancelled: bool },
}

impl ScanOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ScanOutcome::Found(_))
    }
}

/// A caller-supplied cancellation check, polled between strategies (§5).
/// `None` means "never cancel".
pub type CancellationToken<'a> = Option<&'a AtomicBool>;

fn is_cancelled(token: CancellationToken<'_>) -> bool {
    token.map(|flag| flag.load(Ordering::Relaxed)).unwrap_or(false)
}

struct StrategyOutput {
    candidate: Option<Candidate>,
    raw_contours: Vec<Vec<Point>>,
}

/// Orchestrates the three strategies end-to-end over one grayscale image.
pub struct MultiStrategyDriver<'a> {
    config: &'a ScanConfig,
    kernels: &'a dyn KernelProvider,
    approximator: &'a dyn PolygonApproximator,
}

impl<'a> MultiStrategyDriver<'a> {
    pub fn new(config: &'a ScanConfig, kernels: &'a dyn KernelProvider, approximator: &'a dyn PolygonApproximator) -> Self {
        Self {
            config,
            kernels,
            approximator,
        }
    }

    /// Run all three strategies over `gray` (already at whatever
    /// processing resolution the caller wants) and return the best
    /// surviving candidate.
    ///
    /// `scale_factor` is the ratio of source resolution to `gray`'s
    /// resolution, used only to keep the minimum-area prefilter fixed in
    /// source-pixel terms (§4.7); pass `1.0` when `gray` already is the
    /// source image.
    #[instrument(skip(self, gray, cancellation), fields(width = gray.width(), height = gray.height()))]
    pub fn scan(&self, gray: &GrayImage, scale_factor: f64, cancellation: CancellationToken<'_>) -> Result<ScanOutcome, ScanError> {
        let (width, height) = (gray.width(), gray.height());
        if width < 1 || height < 1 {
            return Err(ScanError::InvalidDimensions { width, height });
        }

        let min_area_px = self.config.min_area as f64 / (scale_factor * scale_factor);

        let mut pool: Vec<(StrategyName, Candidate)> = Vec::new();
        let mut canny_raw_contours: Vec<(StrategyName, Vec<Vec<Point>>)> = Vec::new();

        // Strategy 1: Enhanced. Always attempted; `skip_clahe` only affects
        // whether CLAHE runs inside it (§4.7 step 1), not whether the
        // strategy itself runs.
        match catch_unwind(AssertUnwindSafe(|| self.run_enhanced(gray, min_area_px))) {
            Ok(output) => {
                if let Some(candidate) = output.candidate {
                    debug!(score = candidate.score, "enhanced strategy produced a candidate");
                    pool.push((StrategyName::Enhanced, candidate));
                }
            }
            Err(_) => warn!("enhanced strategy panicked; continuing with remaining strategies"),
        }

        if is_cancelled(cancellation) {
            info!("cancellation observed after enhanced strategy");
            return Ok(ScanOutcome::NotFound { cancelled: true });
        }

        if self.config.use_fallback {
            match catch_unwind(AssertUnwindSafe(|| self.run_canny(gray, min_area_px, self.config.fallback_canny.low_threshold, self.config.fallback_canny.high_threshold))) {
                Ok(output) => {
                    if let Some(candidate) = &output.candidate {
                        debug!(score = candidate.score, "canny-fallback strategy produced a candidate");
                    }
                    if let Some(candidate) = output.candidate {
                        pool.push((StrategyName::CannyFallback, candidate));
                    }
                    canny_raw_contours.push((StrategyName::CannyFallback, output.raw_contours));
                }
                Err(_) => warn!("canny-fallback strategy panicked; continuing with remaining strategies"),
            }

            if is_cancelled(cancellation) {
                info!("cancellation observed after canny-fallback strategy");
                return Ok(ScanOutcome::NotFound { cancelled: true });
            }

            match catch_unwind(AssertUnwindSafe(|| self.run_canny(gray, min_area_px, self.config.default_canny.low_threshold, self.config.default_canny.high_threshold))) {
                Ok(output) => {
                    if let Some(candidate) = &output.candidate {
                        debug!(score = candidate.score, "canny-default strategy produced a candidate");
                    }
                    if let Some(candidate) = output.candidate {
                        pool.push((StrategyName::CannyDefault, candidate));
                    }
                    canny_raw_contours.push((StrategyName::CannyDefault, output.raw_contours));
                }
                Err(_) => warn!("canny-default strategy panicked; continuing with remaining strategies"),
            }
        }

        pool.sort_by(|a, b| b.1.score.partial_cmp(&a.1.score).unwrap());

        if let Some((strategy, winner)) = pool.into_iter().next() {
            info!(strategy = strategy.as_str(), score = winner.score, "selected best candidate");
            let ordered = order_corners(&winner.points);
            return Ok(ScanOutcome::Found(DetectionResult {
                corners: ordered.to_vec(),
                score: Some(winner.score),
                strategy,
            }));
        }

        // Degenerate last resort: the single largest raw contour from
        // either Canny strategy, unapproximated (§4.7 Selection).
        let fallback = canny_raw_contours
            .into_iter()
            .flat_map(|(strategy, contours)| contours.into_iter().map(move |c| (strategy, c)))
            .max_by(|(_, a), (_, b)| crate::geom::polygon_area(a).partial_cmp(&crate::geom::polygon_area(b)).unwrap());

        match fallback {
            Some((strategy, contour)) => {
                info!(strategy = strategy.as_str(), "no scored candidate survived; falling back to largest raw contour");
                Ok(ScanOutcome::Found(DetectionResult {
                    corners: contour,
                    score: None,
                    strategy,
                }))
            }
            None => {
                info!("no document found");
                Ok(ScanOutcome::NotFound { cancelled: false })
            }
        }
    }

    fn run_enhanced(&self, gray: &GrayImage, min_area_px: f64) -> StrategyOutput {
        let (width, height) = (gray.width(), gray.height());
        let raw: &[u8] = gray.as_raw();

        let enhanced = if self.config.skip_clahe {
            raw.to_vec()
        } else {
            self.kernels.clahe(raw, width, height, self.config.clahe.clip_limit, self.config.clahe.tile_grid)
        };

        let blurred = self.kernels.box_blur(&enhanced, width, height, self.config.threshold.block_size);
        let binary = self.kernels.adaptive_threshold(&enhanced, &blurred, self.config.threshold.offset, true);
        let closed = self.kernels.morphological_close(
            &binary,
            width,
            height,
            self.config.morphology.kernel_size,
            self.config.morphology.iterations,
        );

        let closed_image = GrayImage::from_raw(width, height, closed).expect("dimensions match source image");
        let contours = external::trace(&closed_image);
        let contours = prefilter_by_area(contours, min_area_px);

        let filter = ContourFilter::new(&self.config.contour_filter, self.approximator);
        let candidate = filter.best_candidate(&contours, width, height);

        StrategyOutput {
            candidate,
            raw_contours: contours,
        }
    }

    fn run_canny(&self, gray: &GrayImage, min_area_px: f64, low: f32, high: f32) -> StrategyOutput {
        let (width, height) = (gray.width(), gray.height());
        let binary = external::canny(gray, low, high, 0, 0);
        let contours = external::trace(&binary);
        let contours = prefilter_by_area(contours, min_area_px);

        let filter = ContourFilter::new(&self.config.contour_filter, self.approximator);
        let candidate = filter.best_candidate(&contours, width, height);

        StrategyOutput {
            candidate,
            raw_contours: contours,
        }
    }
}

/// Drop contours whose raw pixel area is below the source-pixel-fixed
/// minimum (§4.7's minimum-area prefilter).
fn prefilter_by_area(contours: Vec<Vec<Point>>, min_area_px: f64) -> Vec<Vec<Point>> {
    contours
        .into_iter()
        .filter(|c| crate::geom::polygon_area(c) >= min_area_px)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::ReferenceKernels;
    use crate::polyapprox::DouglasPeucker;
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
    fn finds_a_high_contrast_document() {
        let config = ScanConfig::default();
        let kernels = ReferenceKernels;
        let approximator = DouglasPeucker;
        let driver = MultiStrategyDriver::new(&config, &kernels, &approximator);

        let img = synthetic_document(400, 300, 40, 230, 30);
        let outcome = driver.scan(&img, 1.0, None).unwrap();
        match outcome {
            ScanOutcome::Found(result) => {
                assert_eq!(result.corners.len(), 4);
            }
            ScanOutcome::NotFound { .. } => panic!("expected to find the synthetic document"),
        }
    }

    #[test]
    fn uniform_gray_image_reports_no_document() {
        let config = ScanConfig::default();
        let kernels = ReferenceKernels;
        let approximator = DouglasPeucker;
        let driver = MultiStrategyDriver::new(&config, &kernels, &approximator);

        let img = GrayImage::from_pixel(200, 200, Luma([128]));
        let outcome = driver.scan(&img, 1.0, None).unwrap();
        assert!(!outcome.success());
    }

    #[test]
    fn degenerate_one_by_one_image_is_rejected_at_the_boundary() {
        let config = ScanConfig::default();
        let kernels = ReferenceKernels;
        let approximator = DouglasPeucker;
        let driver = MultiStrategyDriver::new(&config, &kernels, &approximator);

        let img = GrayImage::new(1, 1);
        let outcome = driver.scan(&img, 1.0, None);
        assert!(outcome.is_ok());
        assert!(!outcome.unwrap().success());
    }

    #[test]
    fn zero_dimension_image_is_a_hard_error() {
        let config = ScanConfig::default();
        let kernels = ReferenceKernels;
        let approximator = DouglasPeucker;
        let driver = MultiStrategyDriver::new(&config, &kernels, &approximator);

        let img = GrayImage::new(0, 0);
        let outcome = driver.scan(&img, 1.0, None);
        assert!(matches!(outcome, Err(ScanError::InvalidDimensions { .. })));
    }

    #[test]
    fn cancellation_before_any_strategy_runs_short_circuits() {
        let config = ScanConfig::default();
        let kernels = ReferenceKernels;
        let approximator = DouglasPeucker;
        let driver = MultiStrategyDriver::new(&config, &kernels, &approximator);

        let flag = AtomicBool::new(true);
        let img = synthetic_document(400, 300, 40, 230, 30);
        let outcome = driver.scan(&img, 1.0, Some(&flag)).unwrap();
        match outcome {
            ScanOutcome::NotFound { cancelled } => assert!(cancelled),
            ScanOutcome::Found(_) => panic!("cancellation should have short-circuited before a result could be produced"),
        }
    }
}
