//! Boundary errors (§7, §11). Everything downstream of a valid image is
//! represented as data (`ScanOutcome`), never a thrown exception; only
//! rejection at the boundary produces a `ScanError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("image dimensions must be at least 1x1, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}
