//! Per-frame orchestration: environment → pose → armrest → desk → verdict.

use image::RgbImage;

use crate::annotate::{annotate, Annotations};
use crate::api::Assessment;
use crate::classify::{classify_record, ElbowReference};
use crate::debug_dump::{DebugDump, DiagnosticSink, ImageDebug, Stage, DEBUG_SCHEMA_V1};
use crate::detector::{estimate_desk_if_present, search_armrest, AssessConfig};
use crate::environment::analyze_environment;
use crate::geometry::Region;
use crate::services::{EnvironmentDetector, PoseEstimator};
use crate::AssessmentRecord;

fn full_frame(frame: &RgbImage) -> Region {
    let (w, h) = frame.dimensions();
    Region {
        x1: 0,
        y1: 0,
        x2: w,
        y2: h,
    }
}

pub(crate) fn run(
    frame: &RgbImage,
    config: &AssessConfig,
    pose: &dyn PoseEstimator,
    environment: &dyn EnvironmentDetector,
    sink: &dyn DiagnosticSink,
) -> Assessment {
    let (w, h) = frame.dimensions();
    let objects = environment.detect_objects(frame);
    let env = analyze_environment(&objects, &config.environment);

    let mut annotations = Annotations {
        boxes: env.boxes.clone(),
        ..Default::default()
    };
    let env_frame = annotate(frame, &annotations);
    sink.record_rgb(Stage::Environment, &full_frame(frame), &env_frame);

    let Some(joints) = pose.arm_joints(frame, config.side) else {
        tracing::info!("no {:?} arm landmarks in {}x{} frame", config.side, w, h);
        let record = AssessmentRecord::without_landmarks(env.flags);
        let verdict = classify_record(&record, &config.classifier);
        return Assessment {
            record,
            verdict,
            annotated: env_frame,
            environment: env,
            armrest_search: None,
            desk: None,
        };
    };
    tracing::debug!("joints {:?}", joints);

    let armrest_search = if env.flags.is_chair {
        Some(search_armrest(
            frame,
            &joints,
            &config.armrest_search,
            &config.line_detect,
            sink,
        ))
    } else {
        None
    };
    let armrest = armrest_search.as_ref().and_then(|s| s.best);
    let desk = estimate_desk_if_present(env.flags.is_desk, Some(&joints), w, h, &config.desk);

    let record = AssessmentRecord::with_estimates(env.flags, joints, armrest, desk);
    let verdict = classify_record(&record, &config.classifier);
    tracing::info!(
        "verdict {} (armrest={:?}, desk_y={:?})",
        verdict,
        armrest.map(|a| a.y),
        desk.map(|d| d.y)
    );

    annotations.joints = Some(joints);
    annotations.armrest = armrest;
    annotations.desk = desk;
    let annotated = annotate(frame, &annotations);
    sink.record_rgb(Stage::Annotated, &full_frame(frame), &annotated);

    Assessment {
        record,
        verdict,
        annotated,
        environment: env,
        armrest_search,
        desk,
    }
}

/// Collect the debug dump of a finished assessment.
pub(crate) fn debug_dump(assessment: &Assessment, config: &AssessConfig) -> DebugDump {
    let (width, height) = assessment.annotated.dimensions();
    let joints = assessment.record.landmarks;
    let mut notes = Vec::new();
    if !assessment.environment.setup_ok {
        notes.push(format!("setup incomplete: missing {:?}", assessment.environment.missing));
    }
    if joints.is_none() {
        notes.push("no arm landmarks".to_string());
    }
    if assessment.record.is_chair == Some(true) && assessment.record.armrest_box.is_none() {
        notes.push("chair detected but no armrest candidate".to_string());
    }

    DebugDump {
        schema_version: DEBUG_SCHEMA_V1.to_string(),
        image: ImageDebug {
            path: None,
            width,
            height,
        },
        config: config.clone(),
        environment: assessment.environment.clone(),
        joints,
        elbow_reference: joints
            .map(|j| ElbowReference::new(j.shoulder, j.elbow, &config.classifier)),
        regions: assessment
            .armrest_search
            .as_ref()
            .map(|s| s.regions.clone())
            .unwrap_or_default(),
        armrest: assessment.record.armrest_box,
        desk: assessment.desk,
        verdict: assessment.verdict,
        notes,
    }
}
