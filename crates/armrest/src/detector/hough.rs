//! Progressive probabilistic Hough transform.
//!
//! Points of a binary mask are visited in a random (seeded) order. Each point
//! votes in a rho/theta accumulator; once a bin reaches the vote threshold the
//! line through the point is walked in both directions, tolerating gaps of up
//! to `max_line_gap` pixels. Segments long enough are reported, and the votes
//! of every pixel consumed by a reported segment are retracted so the same
//! pixels cannot support a second line.

use image::GrayImage;

use super::config::HoughConfig;

const FIXED_SHIFT: i64 = 16;

/// Line segment in mask-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Slope reported for vertical segments; always outside any accepted band.
pub const VERTICAL_SLOPE: f64 = 9999.0;

impl LineSegment {
    /// `dy / dx`, or [`VERTICAL_SLOPE`] when `dx == 0`.
    pub fn slope(&self) -> f64 {
        let dx = self.x2 - self.x1;
        if dx == 0 {
            VERTICAL_SLOPE
        } else {
            f64::from(self.y2 - self.y1) / f64::from(dx)
        }
    }

    pub fn length(&self) -> f64 {
        f64::from(self.x2 - self.x1).hypot(f64::from(self.y2 - self.y1))
    }
}

struct Accumulator {
    votes: Vec<i32>,
    trig: Vec<(f64, f64)>,
    num_rho: usize,
}

impl Accumulator {
    fn new(width: u32, height: u32, cfg: &HoughConfig) -> Self {
        let theta = cfg.theta_deg.to_radians();
        let num_angle = (std::f64::consts::PI / theta).round().max(1.0) as usize;
        let num_rho = ((f64::from(width + height) * 2.0 + 1.0) / cfg.rho).round() as usize;
        let inv_rho = 1.0 / cfg.rho;
        let trig = (0..num_angle)
            .map(|n| {
                let t = n as f64 * theta;
                (t.cos() * inv_rho, t.sin() * inv_rho)
            })
            .collect();
        Self {
            votes: vec![0; num_angle * num_rho],
            trig,
            num_rho,
        }
    }

    fn bin(&self, n: usize, x: i32, y: i32) -> Option<usize> {
        let (c, s) = self.trig[n];
        let r = (f64::from(x) * c + f64::from(y) * s).round() as i64
            + (self.num_rho as i64 - 1) / 2;
        (0..self.num_rho as i64)
            .contains(&r)
            .then(|| n * self.num_rho + r as usize)
    }

    /// Add the votes of `(x, y)`; returns the strongest bin touched.
    fn vote(&mut self, x: i32, y: i32) -> (i32, usize) {
        let mut best = (0, 0);
        for n in 0..self.trig.len() {
            if let Some(idx) = self.bin(n, x, y) {
                self.votes[idx] += 1;
                if self.votes[idx] > best.0 {
                    best = (self.votes[idx], n);
                }
            }
        }
        best
    }

    fn retract(&mut self, x: i32, y: i32) {
        for n in 0..self.trig.len() {
            if let Some(idx) = self.bin(n, x, y) {
                self.votes[idx] -= 1;
            }
        }
    }
}

/// Fixed-point walker along the line with normal angle index `n`.
#[derive(Clone, Copy)]
struct Walker {
    x_major: bool,
    x0: i64,
    y0: i64,
    dx: i64,
    dy: i64,
}

impl Walker {
    fn new(acc: &Accumulator, n: usize, px: i32, py: i32) -> Self {
        let (c, s) = acc.trig[n];
        let a = -s;
        let b = c;
        let one = (1i64 << FIXED_SHIFT) as f64;
        let half = 1i64 << (FIXED_SHIFT - 1);
        if a.abs() > b.abs() {
            Self {
                x_major: true,
                x0: i64::from(px),
                y0: (i64::from(py) << FIXED_SHIFT) + half,
                dx: if a > 0.0 { 1 } else { -1 },
                dy: (b * one / a.abs()).round() as i64,
            }
        } else {
            Self {
                x_major: false,
                x0: (i64::from(px) << FIXED_SHIFT) + half,
                y0: i64::from(py),
                dx: (a * one / b.abs()).round() as i64,
                dy: if b > 0.0 { 1 } else { -1 },
            }
        }
    }

    /// Pixel positions starting at the seed point, heading forward or back.
    fn pixels(self, backward: bool, width: i32, height: i32) -> impl Iterator<Item = (i32, i32)> {
        let (dx, dy) = if backward {
            (-self.dx, -self.dy)
        } else {
            (self.dx, self.dy)
        };
        let (mut x, mut y) = (self.x0, self.y0);
        std::iter::from_fn(move || {
            let (px, py) = if self.x_major {
                (x, y >> FIXED_SHIFT)
            } else {
                (x >> FIXED_SHIFT, y)
            };
            if px < 0 || px >= i64::from(width) || py < 0 || py >= i64::from(height) {
                return None;
            }
            x += dx;
            y += dy;
            Some((px as i32, py as i32))
        })
    }
}

/// Detect line segments on the non-zero pixels of `mask`.
pub fn hough_lines_p(mask: &GrayImage, cfg: &HoughConfig) -> Vec<LineSegment> {
    use rand::prelude::*;

    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 || cfg.rho <= 0.0 || cfg.theta_deg <= 0.0 {
        return Vec::new();
    }
    let (w, h) = (width as i32, height as i32);
    let stride = width as usize;

    let mut on: Vec<bool> = mask.as_raw().iter().map(|&v| v != 0).collect();
    let mut order: Vec<(i32, i32)> = mask
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] != 0)
        .map(|(x, y, _)| (x as i32, y as i32))
        .collect();
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    order.shuffle(&mut rng);

    let mut acc = Accumulator::new(width, height, cfg);
    let threshold = cfg.threshold as i32;
    let max_gap = cfg.max_line_gap as i32;
    let min_len = cfg.min_line_length as i32;
    let mut segments = Vec::new();

    for (px, py) in order {
        if !on[py as usize * stride + px as usize] {
            continue;
        }
        let (max_votes, best_n) = acc.vote(px, py);
        if max_votes < threshold {
            continue;
        }

        let walker = Walker::new(&acc, best_n, px, py);
        let mut ends = [(px, py); 2];
        for (k, end) in ends.iter_mut().enumerate() {
            let mut gap = 0;
            for (x, y) in walker.pixels(k > 0, w, h) {
                if on[y as usize * stride + x as usize] {
                    gap = 0;
                    *end = (x, y);
                } else {
                    gap += 1;
                    if gap > max_gap {
                        break;
                    }
                }
            }
        }

        let good = (ends[1].0 - ends[0].0).abs() >= min_len
            || (ends[1].1 - ends[0].1).abs() >= min_len;

        for (k, end) in ends.iter().enumerate() {
            for (x, y) in walker.pixels(k > 0, w, h) {
                let idx = y as usize * stride + x as usize;
                if on[idx] {
                    if good {
                        acc.retract(x, y);
                    }
                    on[idx] = false;
                }
                if (x, y) == *end {
                    break;
                }
            }
        }

        if good {
            let seg = LineSegment {
                x1: ends[0].0,
                y1: ends[0].1,
                x2: ends[1].0,
                y2: ends[1].1,
            };
            tracing::trace!("hough segment {:?} len={:.1}", seg, seg.length());
            segments.push(seg);
        }
    }
    segments
}
