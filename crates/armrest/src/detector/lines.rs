//! Near-horizontal support-surface candidates inside one search region.
//!
//! Stages, all in region-local coordinates:
//!
//! 1. **Edges** – grayscale, Canny (with its built-in Gaussian smoothing).
//! 2. **Contours** – outermost borders of the edge map; short contours are
//!    dropped and the rest are rasterized into a binary mask.
//! 3. **Lines** – probabilistic Hough transform over the mask.
//! 4. **Candidates** – near-horizontal segments become fixed-height boxes in
//!    frame coordinates, scored by segment length.

use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::drawing::BresenhamLineIter;

use super::config::LineDetectConfig;
use super::hough::{hough_lines_p, LineSegment};
use crate::debug_dump::{DiagnosticSink, Stage};
use crate::geometry::{Candidate, Region};

/// Per-region detection output with stage statistics.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct LineDetection {
    /// Number of Canny edge pixels.
    pub n_edge_pixels: usize,
    /// External contours found in the edge map.
    pub n_contours: usize,
    /// Contours kept after the point-count filter.
    pub n_contours_kept: usize,
    /// All Hough segments, region-local.
    pub segments: Vec<LineSegment>,
    /// Candidates from near-horizontal segments, frame coordinates.
    pub candidates: Vec<Candidate>,
}

/// Canny edge map of a region.
///
/// `canny` applies its own sigma 1.4 Gaussian (the 7-tap kernel) first; the
/// region must not be smoothed again beforehand.
pub fn edge_map(gray: &GrayImage, cfg: &LineDetectConfig) -> GrayImage {
    imageproc::edges::canny(gray, cfg.canny_low, cfg.canny_high)
}

/// Rasterize the outermost contours of `edges` that have more than
/// `cfg.min_contour_points` points.
///
/// Returns the mask and `(total, kept)` contour counts.
pub fn contour_mask(edges: &GrayImage, cfg: &LineDetectConfig) -> (GrayImage, usize, usize) {
    let (w, h) = edges.dimensions();
    let mut mask = GrayImage::new(w, h);
    let external: Vec<_> = find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
        .collect();
    let total = external.len();
    let mut kept = 0;
    for contour in external
        .iter()
        .filter(|c| c.points.len() > cfg.min_contour_points)
    {
        kept += 1;
        let pts = &contour.points;
        for (i, a) in pts.iter().enumerate() {
            let b = pts[(i + 1) % pts.len()];
            let line = BresenhamLineIter::new((a.x as f32, a.y as f32), (b.x as f32, b.y as f32));
            for (x, y) in line {
                stamp(&mut mask, x, y, cfg.mask_stroke);
            }
        }
    }
    (mask, total, kept)
}

/// Paint a `stroke x stroke` square anchored at `(x, y)`, clipped to the mask.
fn stamp(mask: &mut GrayImage, x: i32, y: i32, stroke: u32) {
    let (w, h) = mask.dimensions();
    let s = stroke.max(1) as i32;
    let lo = -(s - 1) / 2;
    for dy in lo..lo + s {
        for dx in lo..lo + s {
            let (px, py) = (x + dx, y + dy);
            if px >= 0 && py >= 0 && (px as u32) < w && (py as u32) < h {
                mask.put_pixel(px as u32, py as u32, Luma([255]));
            }
        }
    }
}

/// Convert an accepted region-local segment into a frame-space candidate.
fn to_candidate(seg: &LineSegment, region: &Region, cfg: &LineDetectConfig) -> Candidate {
    let avg_y = f64::from(seg.y1 + seg.y2) / 2.0;
    Candidate {
        x: region.x1 as i32 + seg.x1,
        y: region.y1 as i32 + avg_y.trunc() as i32 - cfg.box_y_offset,
        w: seg.x2 - seg.x1,
        h: cfg.box_height,
        score: seg.length(),
    }
}

/// Detect support-surface candidates in an already cropped grayscale region.
///
/// `region` locates the crop inside the frame. Empty crops, crops without
/// edges, and crops without near-horizontal segments all yield no candidates.
pub fn detect_in_gray(
    gray: &GrayImage,
    region: &Region,
    cfg: &LineDetectConfig,
    sink: &dyn DiagnosticSink,
) -> LineDetection {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        tracing::debug!("region {:?} too small for edge detection", region);
        return LineDetection::default();
    }

    let edges = edge_map(gray, cfg);
    sink.record_gray(Stage::Canny, region, &edges);
    let n_edge_pixels = edges.as_raw().iter().filter(|&&v| v != 0).count();
    if n_edge_pixels == 0 {
        return LineDetection::default();
    }

    let (mask, n_contours, n_contours_kept) = contour_mask(&edges, cfg);
    sink.record_gray(Stage::ContourMask, region, &mask);

    let segments = if n_contours_kept > 0 {
        hough_lines_p(&mask, &cfg.hough)
    } else {
        Vec::new()
    };

    let mut plot = GrayImage::from_pixel(w, h, Luma([255]));
    let mut candidates = Vec::new();
    for seg in &segments {
        let slope = seg.slope();
        let accepted = slope > -cfg.max_abs_slope && slope < cfg.max_abs_slope;
        draw_segment(&mut plot, seg, if accepted { 0 } else { 200 });
        if accepted {
            candidates.push(to_candidate(seg, region, cfg));
        }
    }
    sink.record_gray(Stage::Segments, region, &plot);

    tracing::debug!(
        "region {:?}: {} edge px, {}/{} contours kept, {} segments, {} candidates",
        region,
        n_edge_pixels,
        n_contours_kept,
        n_contours,
        segments.len(),
        candidates.len()
    );

    LineDetection {
        n_edge_pixels,
        n_contours,
        n_contours_kept,
        segments,
        candidates,
    }
}

fn draw_segment(plot: &mut GrayImage, seg: &LineSegment, value: u8) {
    imageproc::drawing::draw_line_segment_mut(
        plot,
        (seg.x1 as f32, seg.y1 as f32),
        (seg.x2 as f32, seg.y2 as f32),
        Luma([value]),
    );
}

/// Crop the frame below `(anchor_x, anchor_y)` and detect candidates there.
pub fn detect_in_region(
    frame: &RgbImage,
    anchor_x: i32,
    anchor_y: i32,
    width: u32,
    height: u32,
    cfg: &LineDetectConfig,
    sink: &dyn DiagnosticSink,
) -> (Region, LineDetection) {
    let (crop, region) = super::crop::crop_below_point(frame, anchor_x, anchor_y, width, height);
    sink.record_rgb(Stage::Crop, &region, &crop);
    let gray = image::imageops::grayscale(&crop);
    let detection = detect_in_gray(&gray, &region, cfg, sink);
    (region, detection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_dump::NoopSink;
    use crate::test_utils::{draw_bar_frame, gray_with_bar};

    #[test]
    fn horizontal_bar_yields_candidate_near_its_edge() {
        let gray = gray_with_bar(300, 150, 60, 76, 200, 40);
        let region = Region {
            x1: 100,
            y1: 200,
            x2: 400,
            y2: 350,
        };
        let det = detect_in_gray(&gray, &region, &LineDetectConfig::default(), &NoopSink);
        assert!(det.n_edge_pixels > 0);
        assert!(det.n_contours_kept >= 1, "{det:?}");
        assert!(!det.candidates.is_empty(), "{det:?}");

        for c in &det.candidates {
            assert_eq!(c.h, 20);
            assert!(c.score >= 100.0);
            assert!(c.x >= 100 && c.x <= 400);
            let top = 200 + 60 - 5;
            let bottom = 200 + 76 - 5;
            assert!(
                c.y >= top - 4 && c.y <= bottom + 4,
                "candidate y {} outside bar edges",
                c.y
            );
        }
    }

    #[test]
    fn moderate_contrast_bar_is_detected() {
        let gray = gray_with_bar(300, 150, 60, 76, 160, 80);
        let cfg = LineDetectConfig::default();
        let edges = edge_map(&gray, &cfg);
        let single_pass = imageproc::edges::canny(&gray, cfg.canny_low, cfg.canny_high);
        assert_eq!(edges, single_pass);

        let det = detect_in_gray(&gray, &Region::default(), &cfg, &NoopSink);
        assert!(det.n_edge_pixels > 0, "{det:?}");
        assert!(!det.candidates.is_empty(), "{det:?}");
        for c in &det.candidates {
            assert!(c.y >= 60 - 5 - 4 && c.y <= 76 - 5 + 4, "{c:?}");
        }
    }

    #[test]
    fn uniform_region_yields_nothing() {
        let gray = GrayImage::from_pixel(300, 150, Luma([128]));
        let det = detect_in_gray(&gray, &Region::default(), &LineDetectConfig::default(), &NoopSink);
        assert_eq!(det.n_edge_pixels, 0);
        assert!(det.candidates.is_empty());
    }

    #[test]
    fn short_contours_are_filtered() {
        // A small blob produces one short contour that must not survive.
        let mut gray = GrayImage::from_pixel(200, 100, Luma([200]));
        for y in 40..50 {
            for x in 90..100 {
                gray.put_pixel(x, y, Luma([20]));
            }
        }
        let det = detect_in_gray(&gray, &Region::default(), &LineDetectConfig::default(), &NoopSink);
        assert!(det.n_contours >= 1);
        assert_eq!(det.n_contours_kept, 0);
        assert!(det.segments.is_empty());
        assert!(det.candidates.is_empty());
    }

    #[test]
    fn steep_segments_are_not_candidates() {
        // Vertical bar: long contours, but only steep segments.
        let mut gray = GrayImage::from_pixel(200, 200, Luma([200]));
        for y in 0..200 {
            for x in 90..106 {
                gray.put_pixel(x, y, Luma([30]));
            }
        }
        let det = detect_in_gray(&gray, &Region::default(), &LineDetectConfig::default(), &NoopSink);
        assert!(!det.segments.is_empty(), "{det:?}");
        assert!(det.candidates.is_empty(), "{det:?}");
    }

    #[test]
    fn degenerate_region_is_not_an_error() {
        let frame = draw_bar_frame(400, 300, 190, 206);
        let (region, det) = detect_in_region(
            &frame,
            200,
            900,
            300,
            150,
            &LineDetectConfig::default(),
            &NoopSink,
        );
        assert!(region.is_empty());
        assert!(det.candidates.is_empty());
    }

    #[test]
    fn candidate_translation_to_frame() {
        let cfg = LineDetectConfig::default();
        let region = Region {
            x1: 60,
            y1: 150,
            x2: 360,
            y2: 300,
        };
        let seg = LineSegment {
            x1: 10,
            y1: 41,
            x2: 250,
            y2: 42,
        };
        let c = to_candidate(&seg, &region, &cfg);
        assert_eq!((c.x, c.y, c.w, c.h), (70, 150 + 41 - 5, 240, 20));
        assert!((c.score - 240f64.hypot(1.0)).abs() < 1e-9);

        let reversed = LineSegment {
            x1: 250,
            y1: 42,
            x2: 10,
            y2: 41,
        };
        assert_eq!(to_candidate(&reversed, &region, &cfg).w, -240);
    }
}
