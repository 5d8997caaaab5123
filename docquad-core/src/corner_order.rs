//! Corner ordering, the last of the out-of-scope "external collaborators"
//! named in §1/§6: given four points with unknown winding, label them
//! top-left/top-right/bottom-right/bottom-left.

use crate::geom::Point;

/// Order four points as `[top_left, top_right, bottom_right, bottom_left]`
/// using the common sum/difference heuristic: top-left has the smallest
/// `x + y`, bottom-right the largest; top-right has the smallest `y - x`,
/// bottom-left the largest.
pub fn order_corners(points: &[Point; 4]) -> [Point; 4] {
    let mut by_sum: Vec<Point> = points.to_vec();
    by_sum.sort_by(|a, b| (a.x + a.y).partial_cmp(&(b.x + b.y)).unwrap());
    let top_left = by_sum[0];
    let bottom_right = by_sum[3];

    let mut by_diff: Vec<Point> = points.to_vec();
    by_diff.sort_by(|a, b| (a.y - a.x).partial_cmp(&(b.y - b.x)).unwrap());
    let top_right = by_diff[0];
    let bottom_left = by_diff[3];

    [top_left, top_right, bottom_right, bottom_left]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_an_axis_aligned_square_correctly() {
        let points = [
            Point::new(100.0, 100.0), // bottom-right, given last
            Point::new(0.0, 0.0),     // top-left
            Point::new(100.0, 0.0),   // top-right
            Point::new(0.0, 100.0),   // bottom-left
        ];
        let ordered = order_corners(&points);
        assert_eq!(ordered[0], Point::new(0.0, 0.0));
        assert_eq!(ordered[1], Point::new(100.0, 0.0));
        assert_eq!(ordered[2], Point::new(100.0, 100.0));
        assert_eq!(ordered[3], Point::new(0.0, 100.0));
    }

    #[test]
    fn is_stable_regardless_of_input_winding() {
        let clockwise = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        let counterclockwise = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        ];
        assert_eq!(order_corners(&clockwise), order_corners(&counterclockwise));
    }
}
