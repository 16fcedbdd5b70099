//! Ergonomic verdict from joint geometry and support-surface estimates.
//!
//! The classifier is a pure decision table. The reference height is the
//! *resting elbow*: the shoulder y plus `1.1x` the shoulder-to-elbow distance,
//! with a tolerance band of one tenth of that y on each side.
//!
//! Screen y grows downward. Under the default [`HeightConvention::Visual`] a
//! surface whose y is smaller than the band (physically above the resting
//! elbow) is [`Verdict::TooHigh`], and one whose y is larger is
//! [`Verdict::TooLow`].

use std::fmt;

use crate::detector::ClassifierConfig;
use crate::environment::EnvironmentFlags;
use crate::geometry::{Candidate, Joints, Point2D};
use crate::AssessmentRecord;

/// Classifier outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Verdict {
    #[serde(rename = "Optimal")]
    Optimal,
    #[serde(rename = "Too High")]
    TooHigh,
    #[serde(rename = "Too Low")]
    TooLow,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl Verdict {
    /// Label surfaced to users verbatim.
    pub fn label(self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::TooHigh => "Too High",
            Self::TooLow => "Too Low",
            Self::InsufficientData => "Insufficient Data",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a surface's position relative to the band maps onto verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightConvention {
    /// Smaller y is physically higher: above the band is `TooHigh`.
    #[default]
    Visual,
    /// Larger y is `TooHigh`, reproducing the legacy rule table.
    ImageAxis,
}

/// Where a surface sits relative to the tolerance band, in screen terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    /// y below the band's lower bound (visually above the resting elbow).
    Above,
    Within,
    /// y beyond the band's upper bound (visually below the resting elbow).
    Below,
}

impl HeightConvention {
    pub fn verdict(self, position: BandPosition) -> Verdict {
        match (self, position) {
            (_, BandPosition::Within) => Verdict::Optimal,
            (Self::Visual, BandPosition::Above) | (Self::ImageAxis, BandPosition::Below) => {
                Verdict::TooHigh
            }
            (Self::Visual, BandPosition::Below) | (Self::ImageAxis, BandPosition::Above) => {
                Verdict::TooLow
            }
        }
    }
}

/// Resting elbow height and its tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElbowReference {
    pub resting_elbow_y: f64,
    pub margin: f64,
}

impl ElbowReference {
    pub fn new(shoulder: Point2D, elbow: Point2D, cfg: &ClassifierConfig) -> Self {
        let elbow_shoulder_dist = shoulder.distance(elbow);
        let resting_elbow_y = f64::from(shoulder.y) + cfg.resting_elbow_factor * elbow_shoulder_dist;
        Self {
            resting_elbow_y,
            margin: resting_elbow_y / cfg.margin_divisor,
        }
    }

    pub fn lower(&self) -> f64 {
        self.resting_elbow_y - self.margin
    }

    pub fn upper(&self) -> f64 {
        self.resting_elbow_y + self.margin
    }

    /// Position of a surface at screen height `y`.
    pub fn position(&self, y: f64) -> BandPosition {
        if y > self.upper() {
            BandPosition::Below
        } else if y < self.lower() {
            BandPosition::Above
        } else {
            BandPosition::Within
        }
    }
}

/// Everything the classifier reads for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationInput {
    pub flags: EnvironmentFlags,
    pub joints: Joints,
    pub armrest: Option<Candidate>,
    /// Desk line y, `None` when not computed.
    pub desk_y: Option<i32>,
}

impl ClassificationInput {
    /// Build classifier input from a result record.
    ///
    /// Returns `None` when a required key (`isChair`, `isDesk`, `isPerson`,
    /// `arm_landmarks_detected`, `landmarks`) is missing or the landmarks are
    /// flagged as not detected. A negative `desk_y` is the "not computed"
    /// sentinel.
    pub fn from_record(record: &AssessmentRecord) -> Option<Self> {
        let is_chair = record.is_chair?;
        let is_desk = record.is_desk?;
        let is_person = record.is_person?;
        if !record.arm_landmarks_detected? {
            return None;
        }
        let joints = record.landmarks?;
        Some(Self {
            flags: EnvironmentFlags {
                is_chair,
                is_desk,
                is_person,
                is_sitting: record.is_sitting.unwrap_or(false),
                is_standing: record.is_standing.unwrap_or(false),
            },
            joints,
            armrest: record.armrest_box,
            desk_y: record.desk_y.filter(|y| *y >= 0),
        })
    }
}

/// Classify one frame.
pub fn classify(input: &ClassificationInput, cfg: &ClassifierConfig) -> Verdict {
    let flags = &input.flags;
    if !flags.is_person {
        return Verdict::InsufficientData;
    }

    let reference = ElbowReference::new(input.joints.shoulder, input.joints.elbow, cfg);
    let convention = cfg.convention;

    if flags.is_standing {
        return match input.desk_y {
            Some(desk_y) => convention.verdict(reference.position(f64::from(desk_y))),
            None => Verdict::InsufficientData,
        };
    }

    let armrest = match input.armrest {
        Some(a) if flags.is_chair => a,
        _ => return Verdict::InsufficientData,
    };
    let armrest_avg_y = armrest.center_y();

    if flags.is_desk {
        let Some(desk_y) = input.desk_y else {
            return Verdict::InsufficientData;
        };
        let position = if armrest_avg_y > reference.upper()
            || armrest_avg_y > f64::from(desk_y) + reference.margin
        {
            BandPosition::Below
        } else if armrest_avg_y < reference.lower() {
            BandPosition::Above
        } else {
            BandPosition::Within
        };
        return convention.verdict(position);
    }

    convention.verdict(reference.position(armrest_avg_y))
}

/// Classify a stored result record; missing keys give `InsufficientData`.
pub fn classify_record(record: &AssessmentRecord, cfg: &ClassifierConfig) -> Verdict {
    match ClassificationInput::from_record(record) {
        Some(input) => classify(&input, cfg),
        None => Verdict::InsufficientData,
    }
}
