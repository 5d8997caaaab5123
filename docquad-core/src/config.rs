//! The ~25 tunables cluster into five groups, each with its own `Default`
//! impl, following the same nested-struct-with-presets shape the teacher
//! uses for `DetailedParams`/`ComicParams`.

/// CLAHE parameters (§4.1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClaheConfig {
    pub clip_limit: f64,
    pub tile_grid: (u32, u32),
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tile_grid: (8, 8),
        }
    }
}

/// Adaptive-threshold parameters for the Enhanced strategy (§4.3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    pub block_size: u32,
    pub offset: i32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            block_size: 21,
            offset: 12,
        }
    }
}

/// Morphological close parameters (§4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphologyConfig {
    pub kernel_size: u32,
    pub iterations: u32,
}

impl Default for MorphologyConfig {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            iterations: 2,
        }
    }
}

/// Geometric admissibility and scoring parameters for the contour filter
/// (§4.6).
#[derive(Debug, Clone, PartialEq)]
pub struct ContourFilterConfig {
    pub min_area_ratio: f64,
    pub max_area_ratio: f64,
    pub min_angle: f64,
    pub max_angle: f64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    pub area_weight: f64,
    pub angle_weight: f64,
    pub epsilon: f64,
    pub epsilon_values: Option<Vec<f64>>,
}

impl Default for ContourFilterConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.15,
            max_area_ratio: 0.98,
            min_angle: 70.0,
            max_angle: 110.0,
            min_aspect_ratio: 0.3,
            max_aspect_ratio: 3.0,
            area_weight: 0.4,
            angle_weight: 0.6,
            epsilon: 0.02,
            epsilon_values: None,
        }
    }
}

impl ContourFilterConfig {
    /// The epsilon sweep to try per contour: the caller's explicit list if
    /// set, otherwise `[0.5, 0.75, 1.0, 1.5, 2.0] * epsilon`.
    pub fn epsilon_sweep(&self) -> Vec<f64> {
        match &self.epsilon_values {
            Some(values) => values.clone(),
            None => [0.5, 0.75, 1.0, 1.5, 2.0].iter().map(|m| m * self.epsilon).collect(),
        }
    }
}

/// Canny thresholds for strategy 2, the fallback pass (§4.7).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackCannyConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for FallbackCannyConfig {
    fn default() -> Self {
        Self {
            low_threshold: 30.0,
            high_threshold: 90.0,
        }
    }
}

/// Canny thresholds for strategy 3, the default pass (§4.7).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultCannyConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for DefaultCannyConfig {
    fn default() -> Self {
        Self {
            low_threshold: 75.0,
            high_threshold: 200.0,
        }
    }
}

/// Top-level configuration for a `scan` call. Every field has a default
/// matching the spec's configuration surface (§6).
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub min_area: u32,
    pub use_fallback: bool,
    pub skip_clahe: bool,
    pub clahe: ClaheConfig,
    pub threshold: ThresholdConfig,
    pub morphology: MorphologyConfig,
    pub contour_filter: ContourFilterConfig,
    pub fallback_canny: FallbackCannyConfig,
    pub default_canny: DefaultCannyConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_area: 1000,
            use_fallback: true,
            skip_clahe: false,
            clahe: ClaheConfig::default(),
            threshold: ThresholdConfig::default(),
            morphology: MorphologyConfig::default(),
            contour_filter: ContourFilterConfig::default(),
            fallback_canny: FallbackCannyConfig::default(),
            default_canny: DefaultCannyConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Tuned for phone photos of a document on a visibly different
    /// background (the common case: desk, floor, clipboard).
    pub fn photo() -> Self {
        Self::default()
    }

    /// Tuned for flatbed-scanner input: near-uniform lighting, document
    /// usually fills most of the frame, background is the scanner lid.
    pub fn flatbed() -> Self {
        Self {
            contour_filter: ContourFilterConfig {
                min_area_ratio: 0.4,
                ..ContourFilterConfig::default()
            },
            ..Self::default()
        }
    }

    /// Tuned for the low-contrast case this crate exists for: white paper
    /// on a light wooden table. Leans harder on CLAHE and a wider
    /// adaptive-threshold offset.
    pub fn low_contrast() -> Self {
        Self {
            clahe: ClaheConfig {
                clip_limit: 3.0,
                tile_grid: (8, 8),
            },
            threshold: ThresholdConfig {
                block_size: 25,
                offset: 8,
            },
            ..Self::default()
        }
    }

    pub fn from_preset(name: &str) -> Option<Self> {
        match name {
            "photo" => Some(Self::photo()),
            "flatbed" => Some(Self::flatbed()),
            "low-contrast" | "low_contrast" => Some(Self::low_contrast()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let cfg = ContourFilterConfig::default();
        assert!((cfg.area_weight + cfg.angle_weight - 1.0).abs() < 1e-9);
    }

    #[test]
    fn default_epsilon_sweep_matches_spec_multipliers() {
        let cfg = ContourFilterConfig::default();
        let sweep = cfg.epsilon_sweep();
        assert_eq!(sweep.len(), 5);
        assert!((sweep[0] - 0.01).abs() < 1e-9);
        assert!((sweep[4] - 0.04).abs() < 1e-9);
    }

    #[test]
    fn explicit_epsilon_values_override_the_sweep() {
        let cfg = ContourFilterConfig {
            epsilon_values: Some(vec![0.01, 0.05]),
            ..ContourFilterConfig::default()
        };
        assert_eq!(cfg.epsilon_sweep(), vec![0.01, 0.05]);
    }

    #[test]
    fn unknown_preset_name_returns_none() {
        assert!(ScanConfig::from_preset("nonexistent").is_none());
    }
}
