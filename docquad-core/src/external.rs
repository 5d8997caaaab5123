//! The two out-of-scope "external collaborators" that do have a solid
//! ecosystem crate backing them (§1, §6): the Canny edge detector and
//! contour tracing. Both are thin wrappers over `imageproc` so the rest of
//! the crate can stay in terms of its own `geom::Point` and plain byte
//! buffers.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny as imageproc_canny;
use imageproc::morphology::dilate as imageproc_dilate;

use crate::geom::Point;

/// `canny(gray, W, H, lowThreshold, highThreshold, dilationKernelSize, dilationIterations) -> binary`.
///
/// The dilation step is applied after `imageproc`'s Canny (which has no
/// built-in post-dilation) using `imageproc`'s own morphology so edge
/// fragments can be closed up before tracing, same as the OpenCV contract
/// this interface is modelled on.
pub fn canny(
    gray: &GrayImage,
    low_threshold: f32,
    high_threshold: f32,
    dilation_kernel_size: u32,
    dilation_iterations: u32,
) -> GrayImage {
    let edges = imageproc_canny(gray, low_threshold, high_threshold);
    if dilation_kernel_size == 0 || dilation_iterations == 0 {
        return edges;
    }
    let mut current = edges;
    for _ in 0..dilation_iterations {
        current = imageproc_dilate(&current, Norm::LInf, dilation_kernel_size as u8);
    }
    current
}

/// `trace(binary, W, H) -> list of contours`, outer boundaries only (no
/// holes), each contour converted to a list of `geom::Point` in pixel
/// coordinates.
pub fn trace(binary: &GrayImage) -> Vec<Vec<Point>> {
    find_contours::<i32>(binary)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| c.points.iter().map(|p| Point::new(p.x as f64, p.y as f64)).collect())
        .collect()
}
