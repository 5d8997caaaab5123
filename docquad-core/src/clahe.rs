/// Contrast Limited Adaptive Histogram Equalization (CLAHE).
///
/// Divides the image into a `tiles_x * tiles_y` grid, builds a clipped
/// histogram-equalization LUT per tile, then bilinearly blends between the
/// four nearest tile LUTs so tile boundaries don't show up as seams.

/// Apply CLAHE to a grayscale buffer of size `width * height`.
///
/// `clip_limit` of 0 (or a very large value) behaves as unclipped histogram
/// equalization. `tile_grid` is `(gx, gy)`, the tile counts in each axis.
pub fn clahe(gray: &[u8], width: u32, height: u32, clip_limit: f64, tile_grid: (u32, u32)) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    let (gx, gy) = (tile_grid.0.max(1) as usize, tile_grid.1.max(1) as usize);

    let tile_w = (w / gx).max(1);
    let tile_h = (h / gy).max(1);

    let mut luts = vec![[0u8; 256]; gx * gy];

    for ty in 0..gy {
        for tx in 0..gx {
            let x_start = (tx * tile_w).min(w);
            let y_start = (ty * tile_h).min(h);
            let x_end = if tx + 1 == gx { w } else { x_start + tile_w }.min(w);
            let y_end = if ty + 1 == gy { h } else { y_start + tile_h }.min(h);

            let mut hist = [0u32; 256];
            for y in y_start..y_end {
                for x in x_start..x_end {
                    hist[gray[y * w + x] as usize] += 1;
                }
            }
            let n: u32 = hist.iter().sum();

            let clip_count = ((clip_limit * n as f64) / 256.0).floor().max(1.0) as u32;
            clip_histogram(&mut hist, clip_count);

            luts[ty * gx + tx] = build_lut(&hist, n);
        }
    }

    let mut output = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let fy = (y as f64 / tile_h as f64 - 0.5).clamp(0.0, (gy - 1) as f64);
            let fx = (x as f64 / tile_w as f64 - 0.5).clamp(0.0, (gx - 1) as f64);

            let ty0 = fy.floor() as usize;
            let tx0 = fx.floor() as usize;
            let ty1 = (ty0 + 1).min(gy - 1);
            let tx1 = (tx0 + 1).min(gx - 1);
            let wy = fy - ty0 as f64;
            let wx = fx - tx0 as f64;

            let val = gray[y * w + x] as usize;
            let tl = luts[ty0 * gx + tx0][val] as f64;
            let tr = luts[ty0 * gx + tx1][val] as f64;
            let bl = luts[ty1 * gx + tx0][val] as f64;
            let br = luts[ty1 * gx + tx1][val] as f64;

            let top = tl * (1.0 - wx) + tr * wx;
            let bottom = bl * (1.0 - wx) + br * wx;
            let blended = top * (1.0 - wy) + bottom * wy;

            output[y * w + x] = round_half_away_from_zero(blended).clamp(0.0, 255.0) as u8;
        }
    }

    output
}

/// Build the [0, 255] remapping LUT for one tile's histogram.
///
/// `cdf_min` is the value of the CDF at the first bin with a positive count;
/// the identity mapping is used if `n - cdf_min` collapses to zero.
fn build_lut(hist: &[u32; 256], n: u32) -> [u8; 256] {
    let mut cdf = [0u32; 256];
    let mut running = 0u32;
    let mut cdf_min: Option<u32> = None;
    for (v, &count) in hist.iter().enumerate() {
        running += count;
        cdf[v] = running;
        if cdf_min.is_none() && running > 0 {
            cdf_min = Some(running);
        }
    }
    let cdf_min = cdf_min.unwrap_or(0);
    let denom = n.saturating_sub(cdf_min);

    let mut lut = [0u8; 256];
    if denom == 0 {
        for (v, slot) in lut.iter_mut().enumerate() {
            *slot = v as u8;
        }
        return lut;
    }
    for v in 0..256 {
        let scaled = ((cdf[v].saturating_sub(cdf_min)) as f64 / denom as f64) * 255.0;
        lut[v] = round_half_away_from_zero(scaled.clamp(0.0, 255.0)) as u8;
    }
    lut
}

#[inline]
fn round_half_away_from_zero(v: f64) -> f64 {
    if v >= 0.0 {
        (v + 0.5).floor()
    } else {
        (v - 0.5).ceil()
    }
}

/// Clip histogram bins at `limit`, redistributing the excess: an equal
/// share to every bin, then the remainder one count at a time starting
/// from bin 0 (matching the spec's single-pass redistribution, not an
/// iterative fixed point).
fn clip_histogram(hist: &mut [u32; 256], limit: u32) {
    let mut excess = 0u32;
    for h in hist.iter_mut() {
        if *h > limit {
            excess += *h - limit;
            *h = limit;
        }
    }
    if excess == 0 {
        return;
    }

    let avg_inc = excess / 256;
    if avg_inc > 0 {
        for h in hist.iter_mut() {
            *h += avg_inc;
        }
    }

    let remainder = (excess % 256) as usize;
    for h in hist.iter_mut().take(remainder) {
        *h += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_has_same_pixel_count_and_is_in_range() {
        let gray: Vec<u8> = (0..256).map(|v| v as u8).cycle().take(64 * 64).collect();
        let result = clahe(&gray, 64, 64, 2.0, (8, 8));
        assert_eq!(result.len(), gray.len());
        assert!(result.iter().all(|&v| v <= 255));
    }

    #[test]
    fn test_uniform_image_stays_uniform() {
        let gray = vec![128u8; 64 * 64];
        let result = clahe(&gray, 64, 64, 4.0, (8, 8));
        let first = result[0];
        assert!(result.iter().all(|&v| (v as i32 - first as i32).unsigned_abs() <= 1));
    }

    #[test]
    fn test_clip_histogram_respects_limit() {
        let mut hist = [0u32; 256];
        hist[0] = 1000;
        hist[1] = 500;
        clip_histogram(&mut hist, 100);
        assert!(hist.iter().all(|&v| v <= 100));
    }

    #[test]
    fn test_single_tile_grid_is_equivalent_to_global_equalization() {
        let mut gray = vec![0u8; 16];
        for (i, p) in gray.iter_mut().enumerate() {
            *p = (i * 16) as u8;
        }
        let result = clahe(&gray, 4, 4, 0.0, (1, 1));
        assert_eq!(result.len(), 16);
    }

    #[test]
    fn test_non_dividing_dimensions_cover_full_image() {
        // 10x10 image with a 3x3 tile grid: tile sizes floor to 3, so the
        // last row/column of tiles must still reach the far edge.
        let gray: Vec<u8> = (0..100).map(|v| (v % 256) as u8).collect();
        let result = clahe(&gray, 10, 10, 2.0, (3, 3));
        assert_eq!(result.len(), 100);
    }

    #[test]
    fn test_tile_grid_wider_than_image_does_not_panic() {
        // 6px-wide image with an 8-wide tile grid: tile_w floors to 0 then
        // clamps to 1, so naive tile bounds would walk past the buffer for
        // high tx. x_start/x_end must both clamp to w.
        let gray = vec![100u8; 6 * 3];
        let result = clahe(&gray, 6, 3, 2.0, (8, 8));
        assert_eq!(result.len(), 18);
    }
}
