//! Scene flags from labeled object detections.
//!
//! The object detector is external; this module only interprets its boxes:
//! confidence gating, mapping desk-like objects onto `desk`, the setup pass
//! conditions, and posture inference.

use std::collections::BTreeSet;

const PERSON: &str = "person";
const CHAIR: &str = "chair";
const DESK: &str = "desk";

/// One box reported by the object detector.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f32,
    /// `[x1, y1, x2, y2]` in frame pixels.
    pub bbox: [f32; 4],
}

/// Object-detector interpretation settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Boxes below this confidence are ignored.
    pub min_confidence: f32,
    /// Labels that stand in for a desk (work surface clutter).
    pub desk_alternates: Vec<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.4,
            desk_alternates: [
                "laptop", "mouse", "bottle", "desktop", "keyboard", "monitor", "wallet",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Inferred body posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Posture {
    Sitting,
    Standing,
    Unknown,
}

/// Per-frame scene flags, named as in the result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct EnvironmentFlags {
    #[serde(rename = "isChair")]
    pub is_chair: bool,
    #[serde(rename = "isDesk")]
    pub is_desk: bool,
    #[serde(rename = "isPerson")]
    pub is_person: bool,
    #[serde(rename = "isSitting")]
    pub is_sitting: bool,
    #[serde(rename = "isStanding")]
    pub is_standing: bool,
}

/// Environment analysis for one frame.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EnvironmentReport {
    pub flags: EnvironmentFlags,
    pub posture: Posture,
    /// A person plus a chair or a desk was found.
    pub setup_ok: bool,
    /// Required labels that were not seen (empty when `setup_ok`).
    pub missing: Vec<String>,
    /// Confident person/chair/desk boxes, for annotation.
    pub boxes: Vec<DetectedObject>,
}

fn posture_from(labels: &BTreeSet<&str>) -> Posture {
    if !labels.contains(PERSON) {
        Posture::Unknown
    } else if labels.contains(CHAIR) {
        Posture::Sitting
    } else {
        Posture::Standing
    }
}

/// Interpret detector boxes into scene flags.
pub fn analyze_environment(objects: &[DetectedObject], cfg: &EnvironmentConfig) -> EnvironmentReport {
    let mut labels: BTreeSet<&str> = BTreeSet::new();
    let mut boxes = Vec::new();

    for obj in objects.iter().filter(|o| o.confidence >= cfg.min_confidence) {
        let label = obj.label.as_str();
        if cfg.desk_alternates.iter().any(|alt| alt == label) {
            labels.insert(DESK);
        }
        if matches!(label, PERSON | CHAIR | DESK) {
            labels.insert(label);
            boxes.push(obj.clone());
        }
    }

    let has = |l: &str| labels.contains(l);
    let setup_ok = has(PERSON) && (has(CHAIR) || has(DESK));
    let missing = if setup_ok {
        Vec::new()
    } else {
        [CHAIR, DESK, PERSON]
            .iter()
            .filter(|l| !has(l))
            .map(|l| l.to_string())
            .collect()
    };

    let posture = posture_from(&labels);
    let flags = EnvironmentFlags {
        is_chair: has(CHAIR),
        is_desk: has(DESK),
        is_person: has(PERSON),
        is_sitting: posture == Posture::Sitting,
        is_standing: posture == Posture::Standing,
    };

    if setup_ok {
        tracing::info!("setup detected {:?}, posture {:?}", labels, posture);
    } else {
        tracing::info!("setup incomplete, missing {:?}", missing);
    }

    EnvironmentReport {
        flags,
        posture,
        setup_ok,
        missing,
        boxes,
    }
}
