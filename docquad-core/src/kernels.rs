//! The kernel-provider capability set (§6, §9): a record of function
//! pointers (here, a trait object) so the driver can ask for a numeric
//! kernel without caring whether it's backed by this crate's own
//! reference implementation or some faster externally-supplied one.
//!
//! Every kernel returns a newly allocated buffer of the stated dimensions.
//! `ReferenceKernels` is the crate's own always-available implementation
//! and is what every strategy in the driver uses by default.

use crate::{adaptive_threshold, box_blur, clahe, fused, morphology, unsharp};

pub trait KernelProvider {
    fn clahe(&self, gray: &[u8], width: u32, height: u32, clip_limit: f64, tile_grid: (u32, u32)) -> Vec<u8>;

    fn box_blur(&self, gray: &[u8], width: u32, height: u32, k: u32) -> Vec<u8>;

    fn adaptive_threshold(&self, enhanced: &[u8], blurred: &[u8], offset: i32, invert: bool) -> Vec<u8>;

    fn dilate(&self, binary: &[u8], width: u32, height: u32, k: u32) -> Vec<u8>;

    fn erode(&self, binary: &[u8], width: u32, height: u32, k: u32) -> Vec<u8>;

    fn morphological_close(&self, binary: &[u8], width: u32, height: u32, k: u32, iterations: u32) -> Vec<u8>;

    fn unsharp_mask(&self, gray: &[u8], width: u32, height: u32, amount: f64, radius: u32) -> Vec<u8>;

    #[allow(clippy::too_many_arguments)]
    fn unsharp_mask_and_downscale(
        &self,
        gray: &[u8],
        src_w: u32,
        src_h: u32,
        dst_w: u32,
        dst_h: u32,
        amount: f64,
        radius: u32,
    ) -> Vec<u8>;

    #[allow(clippy::too_many_arguments)]
    fn clahe_and_downscale(
        &self,
        gray: &[u8],
        src_w: u32,
        src_h: u32,
        dst_w: u32,
        dst_h: u32,
        clip_limit: f64,
        tile_grid: (u32, u32),
    ) -> Vec<u8>;
}

/// The crate's in-language reference implementation of every kernel
/// (§6: "if a given kernel is unavailable, the core falls back to an
/// in-language reference implementation of the same contract"). No
/// faster/native backend is wired in, so this is also the only
/// implementation in practice — but the trait boundary stays, so an
/// embedder can supply one.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceKernels;

impl KernelProvider for ReferenceKernels {
    fn clahe(&self, gray: &[u8], width: u32, height: u32, clip_limit: f64, tile_grid: (u32, u32)) -> Vec<u8> {
        clahe::clahe(gray, width, height, clip_limit, tile_grid)
    }

    fn box_blur(&self, gray: &[u8], width: u32, height: u32, k: u32) -> Vec<u8> {
        box_blur::box_blur(gray, width, height, k)
    }

    fn adaptive_threshold(&self, enhanced: &[u8], blurred: &[u8], offset: i32, invert: bool) -> Vec<u8> {
        adaptive_threshold::adaptive_threshold(enhanced, blurred, offset, invert)
    }

    fn dilate(&self, binary: &[u8], width: u32, height: u32, k: u32) -> Vec<u8> {
        morphology::dilate(binary, width, height, k)
    }

    fn erode(&self, binary: &[u8], width: u32, height: u32, k: u32) -> Vec<u8> {
        morphology::erode(binary, width, height, k)
    }

    fn morphological_close(&self, binary: &[u8], width: u32, height: u32, k: u32, iterations: u32) -> Vec<u8> {
        morphology::morphological_close(binary, width, height, k, iterations)
    }

    fn unsharp_mask(&self, gray: &[u8], width: u32, height: u32, amount: f64, radius: u32) -> Vec<u8> {
        unsharp::unsharp_mask(gray, width, height, amount, radius)
    }

    fn unsharp_mask_and_downscale(
        &self,
        gray: &[u8],
        src_w: u32,
        src_h: u32,
        dst_w: u32,
        dst_h: u32,
        amount: f64,
        radius: u32,
    ) -> Vec<u8> {
        unsharp::unsharp_mask_and_downscale(gray, src_w, src_h, dst_w, dst_h, amount, radius)
    }

    fn clahe_and_downscale(
        &self,
        gray: &[u8],
        src_w: u32,
        src_h: u32,
        dst_w: u32,
        dst_h: u32,
        clip_limit: f64,
        tile_grid: (u32, u32),
    ) -> Vec<u8> {
        fused::clahe_and_downscale(gray, src_w, src_h, dst_w, dst_h, clip_limit, tile_grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_kernels_clahe_matches_the_free_function() {
        let gray = vec![100u8; 16 * 16];
        let via_trait = ReferenceKernels.clahe(&gray, 16, 16, 2.0, (4, 4));
        let direct = clahe::clahe(&gray, 16, 16, 2.0, (4, 4));
        assert_eq!(via_trait, direct);
    }
}
