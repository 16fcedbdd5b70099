//! Anchored rectangular crops.
//!
//! A search window is horizontally centered on the anchor and extends
//! downward from it. Every bound is clamped into the frame, so anchors near or
//! outside the frame edges yield smaller (possibly empty) regions instead of
//! errors.

use image::{GenericImageView, ImageBuffer, Pixel};

use crate::geometry::Region;

/// Compute the clamped region for an anchor and a requested window size.
pub fn region_below_point(
    frame_width: u32,
    frame_height: u32,
    anchor_x: i32,
    anchor_y: i32,
    width: u32,
    height: u32,
) -> Region {
    let w = i64::from(frame_width);
    let h = i64::from(frame_height);
    let x1 = (i64::from(anchor_x) - i64::from(width / 2)).clamp(0, w);
    let y1 = i64::from(anchor_y).clamp(0, h);
    let x2 = (x1 + i64::from(width)).min(w);
    // Rows are intersected with the frame, never shifted past the anchor.
    let y2 = (i64::from(anchor_y) + i64::from(height)).clamp(0, h);
    Region {
        x1: x1 as u32,
        y1: y1 as u32,
        x2: x2 as u32,
        y2: y2 as u32,
    }
}

/// Crop `frame` below an anchor point.
///
/// Returns the copied pixels together with the region; `(region.x1,
/// region.y1)` translates crop-local coordinates back into the frame.
pub fn crop_below_point<P>(
    frame: &ImageBuffer<P, Vec<P::Subpixel>>,
    anchor_x: i32,
    anchor_y: i32,
    width: u32,
    height: u32,
) -> (ImageBuffer<P, Vec<P::Subpixel>>, Region)
where
    P: Pixel + 'static,
{
    let (fw, fh) = frame.dimensions();
    let region = region_below_point(fw, fh, anchor_x, anchor_y, width, height);
    let pixels = frame
        .view(region.x1, region.y1, region.width(), region.height())
        .to_image();
    (pixels, region)
}
