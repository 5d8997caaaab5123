//! Plain 2D geometry shared by the contour filter and the driver.
//!
//! Everything here operates in the processing-resolution frame: whatever
//! scale the caller handed the driver, these functions don't rescale.

/// A point in the processing-resolution frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Four corners of a candidate quadrilateral, in winding order as produced
/// by polygon approximation (not necessarily TL/TR/BR/BL until ordered).
pub type Quad = [Point; 4];

/// Shoelace formula; returns the unsigned area enclosed by an arbitrary
/// (possibly non-convex, non-closed-in-storage) polygon.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    (sum / 2.0).abs()
}

/// True if all non-zero consecutive-edge cross products share a sign, i.e.
/// the polygon never turns the "wrong way" (rejects self-intersecting
/// "bowtie" quadrilaterals).
pub fn is_convex(points: &[Point]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    let mut sign = 0.0f64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let (abx, aby) = (b.x - a.x, b.y - a.y);
        let (bcx, bcy) = (c.x - b.x, c.y - b.y);
        let cross = abx * bcy - aby * bcx;
        if cross.abs() < f64::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    // every edge pair degenerate (collinear) is not a real quadrilateral
    sign != 0.0
}

/// Interior angle at `b`, formed by the incoming edge `a->b` and the
/// outgoing edge `b->c`, in degrees.
pub fn interior_angle_degrees(a: Point, b: Point, c: Point) -> f64 {
    let (v1x, v1y) = (a.x - b.x, a.y - b.y);
    let (v2x, v2y) = (c.x - b.x, c.y - b.y);
    let dot = v1x * v2x + v1y * v2y;
    let mag1 = (v1x * v1x + v1y * v1y).sqrt();
    let mag2 = (v2x * v2x + v2y * v2y).sqrt();
    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }
    let cos_theta = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_theta.acos().to_degrees()
}

/// Euclidean length of the edge `a -> b`.
pub fn edge_length(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Perimeter of a closed polygon (wraps last point back to the first).
pub fn perimeter(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut total = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        total += edge_length(a, b);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ]
    }

    #[test]
    fn area_of_axis_aligned_square() {
        assert!((polygon_area(&square(10.0)) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn axis_aligned_rectangle_is_convex() {
        assert!(is_convex(&square(10.0)));
    }

    #[test]
    fn bowtie_is_not_convex() {
        let bowtie = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
        ];
        assert!(!is_convex(&bowtie));
    }

    #[test]
    fn right_angle_is_ninety_degrees() {
        let angle = interior_angle_degrees(Point::new(0.0, 1.0), Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn perimeter_of_unit_square() {
        assert!((perimeter(&square(1.0)) - 4.0).abs() < 1e-9);
    }
}
