//! Polygon approximation (Douglas–Peucker), the out-of-scope "polygon
//! approximation operator" of §6. No crate in the ecosystem exposes this
//! narrow a contract, so the reference implementation lives in-crate,
//! behind the same capability-set-style trait as the numeric kernels, so
//! an embedder can still swap it out.

use crate::geom::Point;

/// `approximate(contour, epsilon) -> points`, where `epsilon` is a fraction
/// of the contour's perimeter (Douglas–Peucker style).
pub trait PolygonApproximator {
    fn approximate(&self, contour: &[Point], epsilon_fraction: f64) -> Vec<Point>;
}

/// The crate's own Douglas–Peucker implementation, treating the input as a
/// closed polygon (the contour tracer returns outer boundaries with no
/// repeated first/last point).
pub struct DouglasPeucker;

impl PolygonApproximator for DouglasPeucker {
    fn approximate(&self, contour: &[Point], epsilon_fraction: f64) -> Vec<Point> {
        douglas_peucker(contour, epsilon_fraction)
    }
}

/// Simplify a closed polygon with tolerance `epsilon_fraction * perimeter`.
pub fn douglas_peucker(contour: &[Point], epsilon_fraction: f64) -> Vec<Point> {
    if contour.len() < 3 {
        return contour.to_vec();
    }

    let perimeter = crate::geom::perimeter(contour);
    let epsilon = epsilon_fraction * perimeter;

    // Closed-polygon Douglas-Peucker: split at the two points farthest
    // apart, simplify each open arc, then stitch the two results.
    let (i, j) = farthest_pair(contour);
    let arc_a = ring_slice(contour, i, j);
    let arc_b = ring_slice(contour, j, i);

    let mut simplified_a = simplify_open(&arc_a, epsilon);
    let simplified_b = simplify_open(&arc_b, epsilon);

    // arc_a ends where arc_b starts and vice versa; drop the duplicated
    // shared endpoint from the second arc before splicing.
    simplified_a.pop();
    simplified_a.extend(simplified_b);
    simplified_a.pop();
    simplified_a
}

/// Points from index `from` to index `to` inclusive, walking forward
/// around the ring (wrapping if `to < from`).
fn ring_slice(points: &[Point], from: usize, to: usize) -> Vec<Point> {
    let n = points.len();
    let mut out = Vec::new();
    let mut i = from;
    loop {
        out.push(points[i]);
        if i == to {
            break;
        }
        i = (i + 1) % n;
    }
    out
}

fn farthest_pair(points: &[Point]) -> (usize, usize) {
    let n = points.len();
    let mut best = (0usize, 1usize);
    let mut best_dist = -1.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (points[i].x - points[j].x).powi(2) + (points[i].y - points[j].y).powi(2);
            if d > best_dist {
                best_dist = d;
                best = (i, j);
            }
        }
    }
    best
}

/// Standard open-polyline Douglas-Peucker: keeps both endpoints.
fn simplify_open(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut farthest_idx = 0;
    let mut farthest_dist = 0.0;
    for (idx, &p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let d = perpendicular_distance(p, first, last);
        if d > farthest_dist {
            farthest_dist = d;
            farthest_idx = idx;
        }
    }

    if farthest_dist <= epsilon {
        return vec![first, last];
    }

    let mut left = simplify_open(&points[..=farthest_idx], epsilon);
    let right = simplify_open(&points[farthest_idx..], epsilon);
    left.pop();
    left.extend(right);
    left
}

fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }
    let numerator = (dy * p.x - dx * p.y + b.x * a.y - b.y * a.x).abs();
    numerator / len_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_axis_aligned_rectangle_simplifies_to_its_four_corners() {
        // a rectangle with extra collinear points along each edge
        let contour = vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(100.0, 100.0),
            Point::new(50.0, 100.0),
            Point::new(0.0, 100.0),
            Point::new(0.0, 50.0),
        ];
        let simplified = douglas_peucker(&contour, 0.02);
        assert_eq!(simplified.len(), 4);
    }

    #[test]
    fn a_noisy_circle_is_reduced_but_not_to_a_point() {
        let n = 64;
        let contour: Vec<Point> = (0..n)
            .map(|i| {
                let theta = (i as f64) / (n as f64) * std::f64::consts::TAU;
                Point::new(100.0 + 50.0 * theta.cos(), 100.0 + 50.0 * theta.sin())
            })
            .collect();
        let simplified = douglas_peucker(&contour, 0.02);
        assert!(simplified.len() > 4);
        assert!(simplified.len() < n);
    }

    #[test]
    fn tiny_contours_pass_through_unchanged() {
        let contour = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert_eq!(douglas_peucker(&contour, 0.02), contour);
    }
}
