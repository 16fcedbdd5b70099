//! Geometry estimation primitives independent of orchestration.
//!
//! The `pipeline` module owns call order. This module provides the cropper,
//! the per-region line detector, the armrest fuser, the desk estimator, and
//! their shared configuration types.

pub(crate) mod config;
pub(crate) mod crop;
pub(crate) mod desk;
pub(crate) mod fuse;
pub(crate) mod hough;
pub(crate) mod lines;

pub use config::{
    ArmrestSearchConfig, AssessConfig, ClassifierConfig, DeskConfig, HoughConfig,
    LineDetectConfig,
};
pub use crop::{crop_below_point, region_below_point};
pub use desk::{estimate_desk, estimate_desk_if_present, DESK_NOT_COMPUTED};
pub use fuse::{above_region_height, search_armrest, select_best, ArmrestSearch, RegionSearch};
pub use hough::{hough_lines_p, LineSegment, VERTICAL_SLOPE};
pub use lines::{contour_mask, detect_in_gray, detect_in_region, edge_map, LineDetection};
