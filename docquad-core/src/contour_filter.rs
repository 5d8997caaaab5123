//! Geometric validity filter and composite scorer (§4.6): turns a raw
//! traced contour into a scored quadrilateral candidate, or rejects it.

use crate::config::ContourFilterConfig;
use crate::geom::{self, Point, Quad};
use crate::polyapprox::PolygonApproximator;

/// A surviving quadrilateral candidate, carrying enough provenance to
/// compare it against candidates from other strategies and other epsilons.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub points: Quad,
    pub raw_contour: Vec<Point>,
    pub area: f64,
    pub epsilon_used: f64,
    pub angle_score: f64,
    pub score: f64,
}

pub struct ContourFilter<'a> {
    config: &'a ContourFilterConfig,
    approximator: &'a dyn PolygonApproximator,
}

impl<'a> ContourFilter<'a> {
    pub fn new(config: &'a ContourFilterConfig, approximator: &'a dyn PolygonApproximator) -> Self {
        Self { config, approximator }
    }

    /// Run the full per-contour procedure (§4.6) over every raw contour,
    /// returning the single best-scoring candidate across all of them, or
    /// `None` if nothing survived.
    pub fn best_candidate(&self, contours: &[Vec<Point>], image_width: u32, image_height: u32) -> Option<Candidate> {
        let image_area = image_width as f64 * image_height as f64;
        let mut best: Option<Candidate> = None;

        for contour in contours {
            if let Some(candidate) = self.best_candidate_for_contour(contour, image_area) {
                let replace = match &best {
                    None => true,
                    Some(current) => candidate.score > current.score,
                };
                if replace {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Try each epsilon in the configured sweep against one raw contour,
    /// early-exiting once a candidate with `score > 0.5` is found (§4.6
    /// step 8; preserved verbatim per the spec's open question about this
    /// biasing toward the first admissible epsilon rather than the best).
    fn best_candidate_for_contour(&self, contour: &[Point], image_area: f64) -> Option<Candidate> {
        if contour.len() < 4 {
            return None;
        }

        let mut best: Option<Candidate> = None;
        for epsilon in self.config.epsilon_sweep() {
            let approx = self.approximator.approximate(contour, epsilon);
            if approx.len() != 4 {
                continue;
            }

            let quad: Quad = [approx[0], approx[1], approx[2], approx[3]];
            let Some(candidate) = self.score_quad(&quad, contour, image_area, epsilon) else {
                continue;
            };

            let is_better = match &best {
                None => true,
                Some(current) => candidate.score > current.score,
            };
            if is_better {
                let early_exit = candidate.score > 0.5;
                best = Some(candidate);
                if early_exit {
                    break;
                }
            }
        }
        best
    }

    fn score_quad(&self, quad: &Quad, raw_contour: &[Point], image_area: f64, epsilon: f64) -> Option<Candidate> {
        let area = geom::polygon_area(quad);
        let ratio = if image_area > 0.0 { area / image_area } else { 0.0 };
        if ratio < self.config.min_area_ratio || ratio > self.config.max_area_ratio {
            return None;
        }

        if !geom::is_convex(quad) {
            return None;
        }

        let mut angle_deviations = [0.0; 4];
        for i in 0..4 {
            let a = quad[(i + 3) % 4];
            let b = quad[i];
            let c = quad[(i + 1) % 4];
            let angle = geom::interior_angle_degrees(a, b, c);
            if angle < self.config.min_angle || angle > self.config.max_angle {
                return None;
            }
            angle_deviations[i] = (angle - 90.0).abs();
        }

        let edges = [
            geom::edge_length(quad[0], quad[1]),
            geom::edge_length(quad[1], quad[2]),
            geom::edge_length(quad[2], quad[3]),
            geom::edge_length(quad[3], quad[0]),
        ];
        let width = (edges[0] + edges[2]) / 2.0;
        let height = (edges[1] + edges[3]) / 2.0;
        if height == 0.0 {
            return None;
        }
        let aspect = width / height;
        if aspect < self.config.min_aspect_ratio || aspect > self.config.max_aspect_ratio {
            return None;
        }

        let avg_deviation = angle_deviations.iter().sum::<f64>() / 4.0;
        let angle_score = (1.0 - avg_deviation / 30.0).max(0.0);

        let score = self.config.area_weight * ratio + self.config.angle_weight * angle_score;

        Some(Candidate {
            points: *quad,
            raw_contour: raw_contour.to_vec(),
            area,
            epsilon_used: epsilon,
            angle_score,
            score,
        })
    }
}
