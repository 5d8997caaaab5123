//! Read the EXIF orientation tag and rotate/flip a loaded image to match it.
//!
//! Phone cameras write orientation as metadata rather than rotating pixels;
//! skipping this step means the detector's angle/aspect checks see a
//! document that's actually sideways.

use image::DynamicImage;
use std::path::Path;

fn read_exif_orientation(path: &Path) -> Option<u32> {
    let file = std::fs::File::open(path).ok()?;
    let mut bufreader = std::io::BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader).ok()?;
    let orientation = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    orientation.value.get_uint(0)
}

/// Apply EXIF orientation correction. Returns the image unchanged if the
/// tag is missing or unreadable.
pub fn apply_exif_orientation(img: DynamicImage, path: &Path) -> DynamicImage {
    match read_exif_orientation(path) {
        Some(o) if (2..=8).contains(&o) => apply_orientation_transform(img, o),
        _ => img,
    }
}

fn apply_orientation_transform(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate270().fliph(),
        6 => img.rotate90(),
        7 => img.rotate90().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}
