//! Diagnostics: intermediate images and a versioned JSON debug dump.
//!
//! Diagnostics are never on the decision path. A [`DiagnosticSink`] receives
//! intermediate buffers from the detector; [`ScratchDir`] writes them as PNG
//! files and logs (but swallows) any write failure. [`DebugDump`] collects the
//! per-region stage statistics of one assessment.

use std::fs;
use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::classify::{ElbowReference, Verdict};
use crate::detector::{AssessConfig, RegionSearch};
use crate::environment::EnvironmentReport;
use crate::geometry::{Candidate, DeskEstimate, Joints, Region};
use crate::ArmrestError;

pub const DEBUG_SCHEMA_V1: &str = "armrest.debug.v1";

/// Intermediate stage a diagnostic image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Crop,
    Canny,
    ContourMask,
    Segments,
    Environment,
    Annotated,
}

impl Stage {
    fn suffix(self) -> &'static str {
        match self {
            Self::Crop => "cropped",
            Self::Canny => "candidate_canny",
            Self::ContourMask => "candidate_mask",
            Self::Segments => "candidates",
            Self::Environment => "env_annotated",
            Self::Annotated => "armrest_annotated",
        }
    }
}

/// Receiver of intermediate images.
///
/// `region` identifies the search window for per-region stages and is the
/// default region for whole-frame stages.
pub trait DiagnosticSink {
    fn record_gray(&self, stage: Stage, region: &Region, image: &GrayImage);
    fn record_rgb(&self, stage: Stage, region: &Region, image: &RgbImage);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record_gray(&self, _stage: Stage, _region: &Region, _image: &GrayImage) {}
    fn record_rgb(&self, _stage: Stage, _region: &Region, _image: &RgbImage) {}
}

/// Scratch directory of PNG artifacts named `{stem}_{stage}[_{x}_{y}].png`.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    dir: PathBuf,
    stem: String,
}

impl ScratchDir {
    /// Create the directory if needed. `base_name` is usually the input
    /// file name; its extension is dropped.
    pub fn new(dir: impl Into<PathBuf>, base_name: &str) -> Result<Self, ArmrestError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let stem = Path::new(base_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("frame")
            .to_string();
        Ok(Self { dir, stem })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove every entry of the scratch directory, creating it if absent.
    pub fn clean(dir: &Path) -> Result<(), ArmrestError> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            return Ok(());
        }
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Path of the artifact for `stage`; per-region stages carry the region origin.
    pub fn artifact_path(&self, stage: Stage, region: Option<&Region>) -> PathBuf {
        let name = match region {
            Some(r) => format!("{}_{}_{}_{}.png", self.stem, stage.suffix(), r.x1, r.y1),
            None => format!("{}_{}.png", self.stem, stage.suffix()),
        };
        self.dir.join(name)
    }

    fn per_region(stage: Stage) -> bool {
        !matches!(stage, Stage::Environment | Stage::Annotated)
    }

    fn save<F>(&self, stage: Stage, region: &Region, write: F)
    where
        F: FnOnce(&Path) -> image::ImageResult<()>,
    {
        if region.is_empty() && Self::per_region(stage) {
            return;
        }
        let path = self.artifact_path(stage, Self::per_region(stage).then_some(region));
        if let Err(e) = write(&path) {
            tracing::warn!("failed to write diagnostic {}: {}", path.display(), e);
        }
    }
}

impl DiagnosticSink for ScratchDir {
    fn record_gray(&self, stage: Stage, region: &Region, image: &GrayImage) {
        self.save(stage, region, |p| image.save(p));
    }

    fn record_rgb(&self, stage: Stage, region: &Region, image: &RgbImage) {
        self.save(stage, region, |p| image.save(p));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDebug {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// Versioned record of one assessment's intermediate results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugDump {
    pub schema_version: String,
    pub image: ImageDebug,
    pub config: AssessConfig,
    pub environment: EnvironmentReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joints: Option<Joints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elbow_reference: Option<ElbowReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<RegionSearch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armrest: Option<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desk: Option<DeskEstimate>,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl DebugDump {
    pub fn write_json(&self, path: &Path) -> Result<(), ArmrestError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("armrest-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn artifact_names_follow_stem_and_stage() {
        let dir = temp_dir("names");
        let sink = ScratchDir::new(&dir, "office_chair.jpg").unwrap();
        let r = Region {
            x1: 60,
            y1: 150,
            x2: 360,
            y2: 300,
        };
        assert_eq!(
            sink.artifact_path(Stage::Canny, Some(&r)),
            dir.join("office_chair_candidate_canny_60_150.png")
        );
        assert_eq!(
            sink.artifact_path(Stage::Annotated, None),
            dir.join("office_chair_armrest_annotated.png")
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn writes_and_cleans_artifacts() {
        let dir = temp_dir("clean");
        let sink = ScratchDir::new(&dir, "frame.png").unwrap();
        let r = Region {
            x1: 0,
            y1: 0,
            x2: 8,
            y2: 8,
        };
        sink.record_gray(Stage::ContourMask, &r, &GrayImage::new(8, 8));
        sink.record_rgb(Stage::Annotated, &r, &RgbImage::new(8, 8));
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2);

        ScratchDir::clean(&dir).unwrap();
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_regions_are_skipped() {
        let dir = temp_dir("empty");
        let sink = ScratchDir::new(&dir, "frame.png").unwrap();
        sink.record_gray(Stage::Canny, &Region::default(), &GrayImage::new(0, 0));
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_failure_does_not_panic() {
        let dir = temp_dir("gone");
        let sink = ScratchDir::new(&dir, "frame.png").unwrap();
        fs::remove_dir_all(&dir).unwrap();
        let r = Region {
            x1: 0,
            y1: 0,
            x2: 4,
            y2: 4,
        };
        sink.record_gray(Stage::Canny, &r, &GrayImage::new(4, 4));
        assert!(!dir.exists());
    }
}
