/// Separable binary morphology: dilate (max), erode (min), and close
/// (dilate then erode, repeated).
///
/// Both operators are separable (horizontal pass, then vertical) over a
/// window of odd size `k`, clamping sample coordinates at the border
/// rather than padding with a fixed value.

pub fn dilate(binary: &[u8], width: u32, height: u32, k: u32) -> Vec<u8> {
    separable(binary, width, height, k, 0, u8::max)
}

pub fn erode(binary: &[u8], width: u32, height: u32, k: u32) -> Vec<u8> {
    separable(binary, width, height, k, 255, u8::min)
}

/// `iterations` repetitions of (dilate then erode), both with kernel `k`.
pub fn morphological_close(binary: &[u8], width: u32, height: u32, k: u32, iterations: u32) -> Vec<u8> {
    let mut current = binary.to_vec();
    for _ in 0..iterations {
        current = dilate(&current, width, height, k);
        current = erode(&current, width, height, k);
    }
    current
}

fn separable(
    buf: &[u8],
    width: u32,
    height: u32,
    k: u32,
    identity: u8,
    combine: fn(u8, u8) -> u8,
) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    let radius = (k / 2) as isize;

    let mut horizontal = vec![0u8; w * h];
    for y in 0..h {
        let row = &buf[y * w..(y + 1) * w];
        for x in 0..w {
            horizontal[y * w + x] = window_fold_1d(row, x as isize, radius, identity, combine);
        }
    }

    let mut output = vec![0u8; w * h];
    for x in 0..w {
        let col: Vec<u8> = (0..h).map(|y| horizontal[y * w + x]).collect();
        for y in 0..h {
            output[y * w + x] = window_fold_1d(&col, y as isize, radius, identity, combine);
        }
    }

    output
}

fn window_fold_1d(line: &[u8], center: isize, radius: isize, identity: u8, combine: fn(u8, u8) -> u8) -> u8 {
    let len = line.len() as isize;
    let lo = (center - radius).max(0);
    let hi = (center + radius).min(len - 1);
    let mut acc = identity;
    let mut i = lo;
    while i <= hi {
        acc = combine(acc, line[i as usize]);
        i += 1;
    }
    acc
}
