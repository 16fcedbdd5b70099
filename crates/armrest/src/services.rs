//! External model services.
//!
//! Pose estimation and object detection run outside this crate. The host
//! builds one implementation of each trait at startup and lends it to the
//! [`Assessor`](crate::Assessor). The `Static*` implementations replay
//! recorded model output from JSON and are used by the CLI and tests.

use std::path::Path;

use image::RgbImage;

use crate::environment::DetectedObject;
use crate::geometry::{ArmLandmarks, Joints, Side};
use crate::ArmrestError;

/// Arm pose for one frame.
pub trait PoseEstimator {
    /// Shoulder/elbow/wrist of the requested arm in frame pixels, or `None`
    /// when no person is found.
    fn arm_joints(&self, frame: &RgbImage, side: Side) -> Option<Joints>;
}

/// Labeled object boxes for one frame.
pub trait EnvironmentDetector {
    fn detect_objects(&self, frame: &RgbImage) -> Vec<DetectedObject>;
}

/// Recorded normalized landmarks per arm.
///
/// ```json
/// { "right": { "shoulder": { "x": 0.31, "y": 0.2 }, "elbow": { ... }, "wrist": { ... } } }
/// ```
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StaticPose {
    pub left: Option<ArmLandmarks>,
    pub right: Option<ArmLandmarks>,
}

impl StaticPose {
    pub fn from_json_file(path: &Path) -> Result<Self, ArmrestError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl PoseEstimator for StaticPose {
    fn arm_joints(&self, frame: &RgbImage, side: Side) -> Option<Joints> {
        let landmarks = match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }?;
        let (w, h) = frame.dimensions();
        Some(Joints::from_normalized(landmarks, w, h))
    }
}

/// Recorded detector boxes, serialized as a plain JSON array.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct StaticEnvironment {
    pub objects: Vec<DetectedObject>,
}

impl StaticEnvironment {
    pub fn new(objects: Vec<DetectedObject>) -> Self {
        Self { objects }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ArmrestError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl EnvironmentDetector for StaticEnvironment {
    fn detect_objects(&self, _frame: &RgbImage) -> Vec<DetectedObject> {
        self.objects.clone()
    }
}
