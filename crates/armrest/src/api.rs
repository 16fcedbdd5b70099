//! Public assessment API.

use image::RgbImage;

use crate::classify::Verdict;
use crate::debug_dump::{DebugDump, DiagnosticSink, NoopSink};
use crate::detector::{ArmrestSearch, AssessConfig};
use crate::environment::EnvironmentReport;
use crate::geometry::DeskEstimate;
use crate::services::{EnvironmentDetector, PoseEstimator};
use crate::AssessmentRecord;

/// Result of assessing one frame.
#[derive(Debug, Clone)]
pub struct Assessment {
    /// Interchange record consumed by the classifier.
    pub record: AssessmentRecord,
    pub verdict: Verdict,
    /// Copy of the input frame with boxes, joints and estimates drawn.
    pub annotated: RgbImage,
    pub environment: EnvironmentReport,
    /// Both search windows; `None` when no chair was detected or no joints were found.
    pub armrest_search: Option<ArmrestSearch>,
    pub desk: Option<DeskEstimate>,
}

/// Primary assessment interface.
///
/// Holds the configuration and borrows the pose and object detection
/// services. Create once, assess many frames.
///
/// # Examples
///
/// ```no_run
/// use armrest::{AssessConfig, Assessor, StaticEnvironment, StaticPose};
/// use std::path::Path;
///
/// let pose = StaticPose::from_json_file(Path::new("pose.json")).unwrap();
/// let env = StaticEnvironment::from_json_file(Path::new("objects.json")).unwrap();
/// let assessor = Assessor::new(AssessConfig::default(), &pose, &env);
/// let frame = image::open("seated.jpg").unwrap().to_rgb8();
/// let assessment = assessor.assess(&frame);
/// println!("{}", assessment.verdict);
/// ```
pub struct Assessor<'a> {
    config: AssessConfig,
    pose: &'a dyn PoseEstimator,
    environment: &'a dyn EnvironmentDetector,
}

impl<'a> Assessor<'a> {
    pub fn new(
        config: AssessConfig,
        pose: &'a dyn PoseEstimator,
        environment: &'a dyn EnvironmentDetector,
    ) -> Self {
        Self {
            config,
            pose,
            environment,
        }
    }

    pub fn config(&self) -> &AssessConfig {
        &self.config
    }

    /// Assess one frame without diagnostics.
    pub fn assess(&self, frame: &RgbImage) -> Assessment {
        self.assess_with_sink(frame, &NoopSink)
    }

    /// Assess one frame, handing intermediate images to `sink`.
    pub fn assess_with_sink(&self, frame: &RgbImage, sink: &dyn DiagnosticSink) -> Assessment {
        crate::pipeline::run(frame, &self.config, self.pose, self.environment, sink)
    }

    /// Assess one frame and collect a [`DebugDump`] of the intermediate results.
    pub fn assess_with_debug(
        &self,
        frame: &RgbImage,
        sink: &dyn DiagnosticSink,
    ) -> (Assessment, DebugDump) {
        let assessment = self.assess_with_sink(frame, sink);
        let dump = crate::pipeline::debug_dump(&assessment, &self.config);
        (assessment, dump)
    }
}
