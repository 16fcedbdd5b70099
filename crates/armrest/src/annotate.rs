//! Presentation overlay for an assessed frame.
//!
//! Drawing never mutates the input frame and never feeds back into the
//! classification.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::environment::DetectedObject;
use crate::geometry::{Candidate, DeskEstimate, Joints};

const BOX_COLOR: Rgb<u8> = Rgb([0, 200, 170]);
const JOINT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const ARMREST_COLOR: Rgb<u8> = Rgb([0, 180, 200]);
const DESK_COLOR: Rgb<u8> = Rgb([255, 100, 100]);

const BOX_STROKE: u32 = 2;
const JOINT_RADIUS: i32 = 8;
const SURFACE_STROKE: u32 = 4;

/// Everything drawn onto the output frame.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    pub boxes: Vec<DetectedObject>,
    pub joints: Option<Joints>,
    pub armrest: Option<Candidate>,
    pub desk: Option<DeskEstimate>,
}

/// Render `annotations` over a copy of `frame`.
pub fn annotate(frame: &RgbImage, annotations: &Annotations) -> RgbImage {
    let mut out = frame.clone();

    for obj in &annotations.boxes {
        let [x1, y1, x2, y2] = obj.bbox.map(|v| v as i32);
        draw_thick_rect(&mut out, x1, y1, x2 - x1, y2 - y1, BOX_STROKE, BOX_COLOR);
    }

    if let Some(joints) = &annotations.joints {
        for (_, p) in joints.named() {
            draw_filled_circle_mut(&mut out, (p.x, p.y), JOINT_RADIUS, JOINT_COLOR);
        }
    }

    if let Some(c) = &annotations.armrest {
        let (x, w) = c.normalized_span();
        draw_thick_rect(&mut out, x, c.y, w, c.h, SURFACE_STROKE, ARMREST_COLOR);
    }

    if let Some(d) = &annotations.desk {
        draw_thick_rect(&mut out, d.x, d.y, d.w, d.h, SURFACE_STROKE, DESK_COLOR);
    }

    out
}

/// Rectangle outline of `stroke` pixels centered on the nominal edges.
fn draw_thick_rect(img: &mut RgbImage, x: i32, y: i32, w: i32, h: i32, stroke: u32, color: Rgb<u8>) {
    let half = stroke as i32 / 2;
    for i in 0..stroke as i32 {
        let o = half - i;
        let (rw, rh) = (w + 2 * o, h + 2 * o);
        if rw <= 0 || rh <= 0 {
            continue;
        }
        draw_hollow_rect_mut(img, Rect::at(x - o, y - o).of_size(rw as u32, rh as u32), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::seated_joints;

    const BG: Rgb<u8> = Rgb([90, 90, 90]);

    #[test]
    fn input_frame_is_untouched() {
        let frame = RgbImage::from_pixel(200, 200, BG);
        let ann = Annotations {
            joints: Some(seated_joints(100, 120)),
            ..Default::default()
        };
        let out = annotate(&frame, &ann);
        assert!(frame.pixels().all(|p| *p == BG));
        assert_eq!(*out.get_pixel(100, 120), JOINT_COLOR);
        assert_eq!(*out.get_pixel(90, 30), JOINT_COLOR);
    }

    #[test]
    fn missing_estimates_leave_frame_outside_joints_untouched() {
        let frame = RgbImage::from_pixel(300, 300, BG);
        let joints = seated_joints(150, 160);
        let ann = Annotations {
            joints: Some(joints),
            armrest: None,
            desk: None,
            ..Default::default()
        };
        let out = annotate(&frame, &ann);
        for (x, y, p) in out.enumerate_pixels() {
            let near_joint = joints.named().iter().any(|(_, j)| {
                let (dx, dy) = (x as i32 - j.x, y as i32 - j.y);
                dx * dx + dy * dy <= (JOINT_RADIUS + 1) * (JOINT_RADIUS + 1)
            });
            if !near_joint {
                assert_eq!(*p, BG, "pixel ({x}, {y}) was drawn");
            }
        }
    }

    #[test]
    fn negative_width_armrest_is_drawn_from_left_edge() {
        let frame = RgbImage::from_pixel(300, 200, BG);
        let ann = Annotations {
            armrest: Some(Candidate {
                x: 250,
                y: 100,
                w: -150,
                h: 20,
                score: 150.0,
            }),
            ..Default::default()
        };
        let out = annotate(&frame, &ann);
        assert_eq!(*out.get_pixel(100, 100), ARMREST_COLOR);
        assert_eq!(*out.get_pixel(175, 100), ARMREST_COLOR);
        assert_eq!(*out.get_pixel(175, 110), BG);
        assert_eq!(*out.get_pixel(60, 100), BG);
    }

    #[test]
    fn desk_and_boxes_use_their_colors() {
        let frame = RgbImage::from_pixel(300, 300, BG);
        let ann = Annotations {
            boxes: vec![DetectedObject {
                label: "chair".to_string(),
                confidence: 0.8,
                bbox: [10.0, 10.0, 60.0, 80.0],
            }],
            desk: Some(DeskEstimate {
                x: 150,
                y: 200,
                w: 150,
                h: 10,
            }),
            ..Default::default()
        };
        let out = annotate(&frame, &ann);
        assert_eq!(*out.get_pixel(30, 10), BOX_COLOR);
        assert_eq!(*out.get_pixel(200, 200), DESK_COLOR);
        assert_eq!(*out.get_pixel(200, 205), BG);
    }

    #[test]
    fn off_frame_geometry_is_clipped() {
        let frame = RgbImage::from_pixel(50, 50, BG);
        let ann = Annotations {
            armrest: Some(Candidate {
                x: -40,
                y: 45,
                w: 200,
                h: 20,
                score: 200.0,
            }),
            ..Default::default()
        };
        let out = annotate(&frame, &ann);
        assert_eq!(*out.get_pixel(20, 45), ARMREST_COLOR);
    }
}
