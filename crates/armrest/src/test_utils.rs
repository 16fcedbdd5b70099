//! Shared synthetic frames for image-based unit tests.

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::geometry::{Joints, Point2D};

/// Uniform gray image with a full-width horizontal bar over rows `y0..y1`.
pub(crate) fn gray_with_bar(w: u32, h: u32, y0: u32, y1: u32, bg: u8, bar: u8) -> GrayImage {
    GrayImage::from_fn(w, h, |_, y| {
        if y >= y0 && y < y1 {
            Luma([bar])
        } else {
            Luma([bg])
        }
    })
}

/// Light RGB frame with a dark full-width bar over rows `y0..y1`, standing in
/// for an armrest or desk edge seen side-on.
pub(crate) fn draw_bar_frame(w: u32, h: u32, y0: u32, y1: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |_, y| {
        if y >= y0 && y < y1 {
            Rgb([40, 40, 40])
        } else {
            Rgb([200, 200, 200])
        }
    })
}

/// Seated right arm: shoulder high, elbow bent, forearm roughly horizontal.
pub(crate) fn seated_joints(elbow_x: i32, elbow_y: i32) -> Joints {
    Joints {
        shoulder: Point2D::new(elbow_x - 10, elbow_y - 90),
        elbow: Point2D::new(elbow_x, elbow_y),
        wrist: Point2D::new(elbow_x + 90, elbow_y + 10),
    }
}
