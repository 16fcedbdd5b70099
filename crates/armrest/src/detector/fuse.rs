//! Armrest selection from the two elbow search windows.

use image::RgbImage;

use super::config::{ArmrestSearchConfig, LineDetectConfig};
use super::lines::{detect_in_region, LineDetection};
use crate::debug_dump::DiagnosticSink;
use crate::geometry::{Candidate, Joints, Region};

/// One searched window and what it produced.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RegionSearch {
    /// `"below"` or `"above"` the elbow.
    pub label: String,
    pub region: Region,
    pub detection: LineDetection,
}

/// Armrest search output: the fused estimate plus both windows.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ArmrestSearch {
    pub best: Option<Candidate>,
    pub regions: Vec<RegionSearch>,
}

/// Height of the window above the elbow.
///
/// Half the shoulder-to-elbow vertical span (the armrest cannot sit above the
/// shoulder), floored at `min_height`.
pub fn above_region_height(joints: &Joints, min_height: u32) -> u32 {
    let half_span = (joints.shoulder.y - joints.elbow.y).unsigned_abs() / 2;
    half_span.max(min_height)
}

/// Pick the candidate with the highest score; the first one wins ties.
pub fn select_best(candidates: &[Candidate]) -> Option<Candidate> {
    candidates.iter().fold(None, |best: Option<Candidate>, c| match best {
        Some(b) if b.score >= c.score => Some(b),
        _ => Some(*c),
    })
}

/// Search below and above the elbow and fuse both candidate lists.
pub fn search_armrest(
    frame: &RgbImage,
    joints: &Joints,
    search: &ArmrestSearchConfig,
    line_cfg: &LineDetectConfig,
    sink: &dyn DiagnosticSink,
) -> ArmrestSearch {
    let elbow = joints.elbow;

    let (below_region, below) = detect_in_region(
        frame,
        elbow.x,
        elbow.y,
        search.region_width,
        search.below_height,
        line_cfg,
        sink,
    );

    let above_h = above_region_height(joints, search.above_min_height);
    let (above_region, above) = detect_in_region(
        frame,
        elbow.x,
        elbow.y - above_h as i32,
        search.region_width,
        above_h,
        line_cfg,
        sink,
    );

    let all: Vec<Candidate> = below
        .candidates
        .iter()
        .chain(above.candidates.iter())
        .copied()
        .collect();
    let best = select_best(&all);

    tracing::info!(
        "armrest search: {} below + {} above candidates, best={:?}",
        below.candidates.len(),
        above.candidates.len(),
        best
    );

    ArmrestSearch {
        best,
        regions: vec![
            RegionSearch {
                label: "below".to_string(),
                region: below_region,
                detection: below,
            },
            RegionSearch {
                label: "above".to_string(),
                region: above_region,
                detection: above,
            },
        ],
    }
}
