//! Desk surface projection from the forearm.
//!
//! The desk line is placed a fixed fraction of the elbow-to-wrist length
//! below the wrist and spans from just behind the wrist to the right edge of
//! the frame.

use super::config::DeskConfig;
use crate::geometry::{DeskEstimate, Joints};

/// `desk_y` value recorded when no desk line was computed.
pub const DESK_NOT_COMPUTED: i32 = -1;

/// Project the desk rectangle for a `frame_width x frame_height` frame.
pub fn estimate_desk(
    joints: &Joints,
    frame_width: u32,
    frame_height: u32,
    cfg: &DeskConfig,
) -> DeskEstimate {
    let arm_length = joints.elbow.distance(joints.wrist).trunc() as i32;
    let desk_offset = arm_length / cfg.offset_divisor.max(1);
    let x = (joints.wrist.x - cfg.x_back_off).max(0);
    let y = (joints.wrist.y + desk_offset).min(frame_height as i32 - cfg.height);
    DeskEstimate {
        x,
        y,
        w: frame_width as i32 - x,
        h: cfg.height,
    }
}

/// Desk estimate when a desk was detected and joints exist, otherwise `None`.
pub fn estimate_desk_if_present(
    is_desk: bool,
    joints: Option<&Joints>,
    frame_width: u32,
    frame_height: u32,
    cfg: &DeskConfig,
) -> Option<DeskEstimate> {
    if !is_desk {
        return None;
    }
    let desk = estimate_desk(joints?, frame_width, frame_height, cfg);
    tracing::debug!("desk line at y={} from x={}", desk.y, desk.x);
    Some(desk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;

    fn joints(elbow: (i32, i32), wrist: (i32, i32)) -> Joints {
        Joints {
            shoulder: Point2D::new(elbow.0, elbow.1 - 100),
            elbow: Point2D::new(elbow.0, elbow.1),
            wrist: Point2D::new(wrist.0, wrist.1),
        }
    }

    #[test]
    fn offset_is_fifth_of_forearm() {
        // forearm = hypot(120, 50) = 130 -> offset 26
        let d = estimate_desk(&joints((200, 300), (320, 350)), 640, 480, &DeskConfig::default());
        assert_eq!(
            d,
            DeskEstimate {
                x: 270,
                y: 376,
                w: 370,
                h: 10
            }
        );
    }

    #[test]
    fn desk_clamped_into_frame() {
        let d = estimate_desk(&joints((10, 400), (30, 470)), 640, 480, &DeskConfig::default());
        assert_eq!(d.x, 0);
        assert_eq!(d.w, 640);
        assert_eq!(d.y, 470);
    }

    #[test]
    fn desk_bounds_hold_over_grid() {
        let cfg = DeskConfig::default();
        for ex in (0..640).step_by(97) {
            for wy in (0..480).step_by(53) {
                let d = estimate_desk(&joints((ex, 240), (ex / 2, wy)), 640, 480, &cfg);
                assert!(d.x >= 0);
                assert!(d.y <= 480 - 10);
                assert_eq!(d.x + d.w, 640);
            }
        }
    }

    #[test]
    fn preconditions_gate_estimate() {
        let j = joints((200, 300), (320, 350));
        let cfg = DeskConfig::default();
        assert!(estimate_desk_if_present(false, Some(&j), 640, 480, &cfg).is_none());
        assert!(estimate_desk_if_present(true, None, 640, 480, &cfg).is_none());
        assert!(estimate_desk_if_present(true, Some(&j), 640, 480, &cfg).is_some());
    }
}
