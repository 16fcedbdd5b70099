use std::path::Path;

use crate::classify::HeightConvention;
use crate::environment::EnvironmentConfig;
use crate::geometry::Side;
use crate::ArmrestError;

/// Progressive probabilistic Hough transform parameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    /// Distance resolution of the accumulator (pixels).
    pub rho: f64,
    /// Angle resolution of the accumulator (degrees).
    pub theta_deg: f64,
    /// Minimum accumulator votes for a line to be considered.
    pub threshold: u32,
    /// Minimum segment length (pixels).
    pub min_line_length: u32,
    /// Maximum gap between collinear pixels on the same segment (pixels).
    pub max_line_gap: u32,
    /// Seed for the random point visiting order.
    pub seed: u64,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta_deg: 1.0,
            threshold: 30,
            min_line_length: 100,
            max_line_gap: 10,
            seed: 0x5eed,
        }
    }
}

/// Edge/contour/line extraction inside one search region.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LineDetectConfig {
    /// Canny low gradient threshold (applied after Canny's own sigma 1.4 smoothing).
    pub canny_low: f32,
    /// Canny high gradient threshold.
    pub canny_high: f32,
    /// Contours with this many points or fewer are dropped.
    pub min_contour_points: usize,
    /// Stroke width used when rasterizing kept contours.
    pub mask_stroke: u32,
    pub hough: HoughConfig,
    /// Segments are kept when `|slope| < max_abs_slope`.
    pub max_abs_slope: f64,
    /// Height of emitted candidate boxes (pixels).
    pub box_height: i32,
    /// Boxes start this many pixels above the segment's mean row.
    pub box_y_offset: i32,
}

impl Default for LineDetectConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            min_contour_points: 100,
            mask_stroke: 2,
            hough: HoughConfig::default(),
            max_abs_slope: 0.5,
            box_height: 20,
            box_y_offset: 5,
        }
    }
}

/// Geometry of the two armrest search windows around the elbow.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ArmrestSearchConfig {
    /// Width of both search windows (pixels), centered on the elbow.
    pub region_width: u32,
    /// Height of the window starting at the elbow and extending down.
    pub below_height: u32,
    /// Floor for the above-elbow window height.
    pub above_min_height: u32,
}

impl Default for ArmrestSearchConfig {
    fn default() -> Self {
        Self {
            region_width: 300,
            below_height: 150,
            above_min_height: 50,
        }
    }
}

/// Desk line projection from the forearm.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Desk sits `arm_length / offset_divisor` below the wrist.
    pub offset_divisor: i32,
    /// The desk line starts this far left of the wrist.
    pub x_back_off: i32,
    /// Height of the desk rectangle.
    pub height: i32,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            offset_divisor: 5,
            x_back_off: 50,
            height: 10,
        }
    }
}

/// Rule constants of the ergonomic classifier.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Resting elbow sits `factor * |shoulder - elbow|` below the shoulder.
    pub resting_elbow_factor: f64,
    /// Tolerance band is `resting_elbow_y / margin_divisor` on each side.
    pub margin_divisor: f64,
    pub convention: HeightConvention,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            resting_elbow_factor: 1.1,
            margin_divisor: 10.0,
            convention: HeightConvention::default(),
        }
    }
}

/// Top-level assessment configuration.
///
/// Constructed once by the host and shared read-only across requests.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AssessConfig {
    /// Arm requested from the pose service.
    pub side: Side,
    pub environment: EnvironmentConfig,
    pub line_detect: LineDetectConfig,
    pub armrest_search: ArmrestSearchConfig,
    pub desk: DeskConfig,
    pub classifier: ClassifierConfig,
}

impl AssessConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ArmrestError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self, ArmrestError> {
        Ok(serde_json::from_str(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = AssessConfig::from_json_str(
            r#"{ "side": "left", "line_detect": { "hough": { "threshold": 12 } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.side, Side::Left);
        assert_eq!(cfg.line_detect.hough.threshold, 12);
        assert_eq!(cfg.line_detect.hough.min_line_length, 100);
        assert_eq!(cfg.line_detect.min_contour_points, 100);
        assert_eq!(cfg.armrest_search.region_width, 300);
        assert_eq!(cfg.desk.height, 10);
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = AssessConfig::from_json_str("{ side: ").unwrap_err();
        assert!(matches!(err, ArmrestError::Json(_)));
    }
}
