//! Pixel-space primitives shared by every stage.

/// Integer pixel coordinate in full-frame space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Point2D {
    pub x: i32,
    pub y: i32,
}

impl Point2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other` in pixels.
    pub fn distance(self, other: Point2D) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        dx.hypot(dy)
    }
}

/// Which arm the pose service should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    #[default]
    Right,
}

/// One landmark in normalized frame units (`[0, 1]` inside the frame).
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct NormalizedLandmark {
    pub x: f32,
    pub y: f32,
}

/// Normalized shoulder/elbow/wrist landmarks as returned by a pose model.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArmLandmarks {
    pub shoulder: NormalizedLandmark,
    pub elbow: NormalizedLandmark,
    pub wrist: NormalizedLandmark,
}

/// Arm joints for one frame, in pixels.
///
/// Either all three joints are known or the whole set is absent; there are
/// no partial joint sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Joints {
    pub shoulder: Point2D,
    pub elbow: Point2D,
    pub wrist: Point2D,
}

impl Joints {
    /// Denormalize pose landmarks against a `width x height` frame.
    ///
    /// Coordinates are truncated to whole pixels and clamped into the frame,
    /// since pose models may report landmarks slightly outside `[0, 1]`.
    pub fn from_normalized(landmarks: &ArmLandmarks, width: u32, height: u32) -> Self {
        let to_px = |p: NormalizedLandmark| {
            let x = (f64::from(p.x) * f64::from(width)).trunc();
            let y = (f64::from(p.y) * f64::from(height)).trunc();
            Point2D::new(
                x.clamp(0.0, f64::from(width)) as i32,
                y.clamp(0.0, f64::from(height)) as i32,
            )
        };
        Self {
            shoulder: to_px(landmarks.shoulder),
            elbow: to_px(landmarks.elbow),
            wrist: to_px(landmarks.wrist),
        }
    }

    /// Joints in drawing order, paired with their names.
    pub fn named(&self) -> [(&'static str, Point2D); 3] {
        [
            ("shoulder", self.shoulder),
            ("elbow", self.elbow),
            ("wrist", self.wrist),
        ]
    }
}

/// Axis-aligned crop bounds, `0 <= x1 <= x2 <= width` and likewise for y.
///
/// A region may be empty when its anchor falls outside the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Region {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Region {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Scored rectangle hypothesis for a support surface, in frame pixels.
///
/// `w` keeps the sign of the originating segment (`x2 - x1`) and is negative
/// for segments reported right-to-left.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candidate {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// Length of the originating line segment in pixels.
    pub score: f64,
}

impl Candidate {
    /// Vertical center of the box.
    pub fn center_y(&self) -> f64 {
        f64::from(self.y) + f64::from(self.h) / 2.0
    }

    /// Left edge and non-negative width, for rendering.
    pub fn normalized_span(&self) -> (i32, i32) {
        if self.w < 0 {
            (self.x + self.w, -self.w)
        } else {
            (self.x, self.w)
        }
    }
}

/// Inferred desk surface line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeskEstimate {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_is_euclidean() {
        let a = Point2D::new(100, 100);
        let b = Point2D::new(110, 180);
        assert_relative_eq!(a.distance(b), 6500f64.sqrt());
        assert_relative_eq!(b.distance(a), a.distance(b));
    }

    #[test]
    fn denormalize_truncates_and_clamps() {
        let lm = ArmLandmarks {
            shoulder: NormalizedLandmark { x: 0.5, y: 0.25 },
            elbow: NormalizedLandmark { x: 0.999, y: 0.6 },
            wrist: NormalizedLandmark { x: 1.2, y: -0.1 },
        };
        let j = Joints::from_normalized(&lm, 640, 480);
        assert_eq!(j.shoulder, Point2D::new(320, 120));
        assert_eq!(j.elbow, Point2D::new(639, 288));
        assert_eq!(j.wrist, Point2D::new(640, 0));
    }

    #[test]
    fn negative_width_candidate_normalizes_for_drawing() {
        let c = Candidate {
            x: 200,
            y: 50,
            w: -120,
            h: 20,
            score: 120.0,
        };
        assert_eq!(c.normalized_span(), (80, 120));
        assert_relative_eq!(c.center_y(), 60.0);
    }
}
