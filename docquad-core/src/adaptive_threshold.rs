/// Per-pixel thresholding against a locally blurred mean minus a constant
/// offset. With `invert = true`, darker-than-background foreground (e.g.
/// white paper catching more light than a wooden table is *brighter* than,
/// so this is usually false for documents — invert flips which side becomes
/// white) maps to 255.
///
/// `blurred` must have already been computed by the caller (typically via
/// [`crate::box_blur::box_blur`]) over the same image and must share its
/// dimensions with `enhanced`.
pub fn adaptive_threshold(enhanced: &[u8], blurred: &[u8], offset: i32, invert: bool) -> Vec<u8> {
    debug_assert_eq!(enhanced.len(), blurred.len());

    enhanced
        .iter()
        .zip(blurred.iter())
        .map(|(&e, &b)| {
            let above = (e as i32) > (b as i32) - offset;
            if above ^ invert {
                0
            } else {
                255
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_strictly_binary() {
        let enhanced: Vec<u8> = (0..=255).collect();
        let blurred = vec![128u8; 256];
        let out = adaptive_threshold(&enhanced, &blurred, 12, true);
        assert!(out.iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_invert_flips_foreground_polarity() {
        let enhanced = vec![200u8];
        let blurred = vec![100u8];
        let normal = adaptive_threshold(&enhanced, &blurred, 0, false);
        let inverted = adaptive_threshold(&enhanced, &blurred, 0, true);
        assert_ne!(normal[0], inverted[0]);
    }

    #[test]
    fn test_flat_region_with_zero_offset_maps_to_background() {
        // e == b everywhere means `above` is false everywhere; with
        // invert=false that's background (255) regardless of pixel value.
        let binary = vec![0u8, 255, 255, 0];
        let out = adaptive_threshold(&binary, &binary, 0, false);
        assert_eq!(out, vec![255u8, 255, 255, 255]);
    }

    #[test]
    fn test_offset_widens_the_foreground_band() {
        let enhanced = vec![150u8];
        let blurred = vec![140u8];
        // enhanced - blurred == 10; offset 5 still admits it as foreground.
        let admitted = adaptive_threshold(&enhanced, &blurred, 5, false);
        // offset 20 rejects it.
        let rejected = adaptive_threshold(&enhanced, &blurred, 20, false);
        assert_eq!(admitted[0], 255);
        assert_eq!(rejected[0], 0);
    }
}
