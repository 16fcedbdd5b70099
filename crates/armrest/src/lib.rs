//! armrest — armrest and desk height assessment from one side-profile photo.
//!
//! The pipeline stages are:
//!
//! 1. **Environment** – person/chair/desk flags from external object boxes.
//! 2. **Pose** – shoulder/elbow/wrist from an external pose service.
//! 3. **Crop** – two search windows below and above the elbow.
//! 4. **Lines** – Canny edges → external contours → probabilistic Hough →
//!    near-horizontal candidate boxes.
//! 5. **Fuse** – the longest candidate becomes the armrest estimate.
//! 6. **Desk** – desk line projected from the forearm when a desk is present.
//! 7. **Classify** – rule table against the resting elbow height.
//!
//! # Public API
//! - [`Assessor`] as the primary entry point, holding an [`AssessConfig`]
//!   and references to the injected [`PoseEstimator`] and
//!   [`EnvironmentDetector`] services
//! - [`classify`] / [`classify_record`] for stored [`AssessmentRecord`]s
//! - stage functions under [`detector`] for direct use

mod annotate;
mod api;
mod classify;
pub mod debug_dump;
pub mod detector;
mod environment;
mod geometry;
mod pipeline;
mod services;

#[cfg(test)]
pub(crate) mod test_utils;

pub use annotate::{annotate, Annotations};
pub use api::{Assessment, Assessor};
pub use classify::{
    classify, classify_record, BandPosition, ClassificationInput, ElbowReference,
    HeightConvention, Verdict,
};
pub use debug_dump::{DebugDump, DiagnosticSink, NoopSink, ScratchDir, Stage};
pub use detector::AssessConfig;
pub use environment::{
    analyze_environment, DetectedObject, EnvironmentConfig, EnvironmentFlags, EnvironmentReport,
    Posture,
};
pub use geometry::{
    ArmLandmarks, Candidate, DeskEstimate, Joints, NormalizedLandmark, Point2D, Region, Side,
};
pub use services::{EnvironmentDetector, PoseEstimator, StaticEnvironment, StaticPose};

/// Errors from the fallible edges of the crate (files, JSON, images).
///
/// The assessment itself never fails: missing inputs and empty detections
/// surface as [`Verdict::InsufficientData`] or absent estimates.
#[derive(Debug, thiserror::Error)]
pub enum ArmrestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result record for one frame.
///
/// This is the interchange format consumed by the classifier. Every key is
/// optional so that incomplete records (e.g. from other producers) can be
/// represented and classified as insufficient.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssessmentRecord {
    #[serde(rename = "isChair", default, skip_serializing_if = "Option::is_none")]
    pub is_chair: Option<bool>,
    #[serde(rename = "isDesk", default, skip_serializing_if = "Option::is_none")]
    pub is_desk: Option<bool>,
    #[serde(rename = "isPerson", default, skip_serializing_if = "Option::is_none")]
    pub is_person: Option<bool>,
    #[serde(rename = "isSitting", default, skip_serializing_if = "Option::is_none")]
    pub is_sitting: Option<bool>,
    #[serde(rename = "isStanding", default, skip_serializing_if = "Option::is_none")]
    pub is_standing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_landmarks_detected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Joints>,
    /// Fused armrest box; absent when no candidate was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armrest_box: Option<Candidate>,
    /// Desk line y, `-1` when not computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desk_y: Option<i32>,
}

impl AssessmentRecord {
    /// Record for a frame where pose estimation failed.
    pub fn without_landmarks(flags: EnvironmentFlags) -> Self {
        Self {
            arm_landmarks_detected: Some(false),
            ..Self::from_flags(flags)
        }
    }

    /// Record for a frame with joints and the fused estimates.
    pub fn with_estimates(
        flags: EnvironmentFlags,
        joints: Joints,
        armrest: Option<Candidate>,
        desk: Option<DeskEstimate>,
    ) -> Self {
        Self {
            arm_landmarks_detected: Some(true),
            landmarks: Some(joints),
            armrest_box: armrest,
            desk_y: Some(desk.map_or(detector::DESK_NOT_COMPUTED, |d| d.y)),
            ..Self::from_flags(flags)
        }
    }

    fn from_flags(flags: EnvironmentFlags) -> Self {
        Self {
            is_chair: Some(flags.is_chair),
            is_desk: Some(flags.is_desk),
            is_person: Some(flags.is_person),
            is_sitting: Some(flags.is_sitting),
            is_standing: Some(flags.is_standing),
            ..Self::default()
        }
    }

    /// Load a record from a JSON file.
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, ArmrestError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joints() -> Joints {
        Joints {
            shoulder: Point2D::new(100, 100),
            elbow: Point2D::new(110, 180),
            wrist: Point2D::new(190, 190),
        }
    }

    #[test]
    fn record_keys_match_interchange_schema() {
        let flags = EnvironmentFlags {
            is_chair: true,
            is_person: true,
            is_sitting: true,
            ..Default::default()
        };
        let rec = AssessmentRecord::with_estimates(flags, joints(), None, None);
        let v = serde_json::to_value(&rec).unwrap();
        for key in [
            "isChair",
            "isDesk",
            "isPerson",
            "isSitting",
            "isStanding",
            "arm_landmarks_detected",
            "landmarks",
            "desk_y",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert!(v.get("armrest_box").is_none());
        assert_eq!(v["desk_y"], -1);
        assert_eq!(v["landmarks"]["elbow"]["y"], 180);
    }

    #[test]
    fn record_without_landmarks_omits_geometry() {
        let rec = AssessmentRecord::without_landmarks(EnvironmentFlags::default());
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["arm_landmarks_detected"], false);
        assert!(v.get("landmarks").is_none());
        assert!(v.get("desk_y").is_none());
    }

    #[test]
    fn partial_record_deserializes() {
        let rec: AssessmentRecord =
            serde_json::from_str(r#"{ "isPerson": true, "isStanding": true }"#).unwrap();
        assert_eq!(rec.is_person, Some(true));
        assert_eq!(rec.is_chair, None);
        assert_eq!(rec.desk_y, None);
    }
}
