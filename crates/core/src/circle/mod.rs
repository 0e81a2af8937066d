use std::{collections::VecDeque, f32::consts::PI};

use crate::Vec2;

/// Trails shorter than this are geometrically unreliable.
pub const MIN_TRAIL_POINTS: usize = 35;
/// Mean radius below which a loop is treated as jitter, in pixels.
pub const MIN_RADIUS: f32 = 60.0;
const MIN_CIRCULARITY: f32 = 0.55;
const MIN_COVERAGE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedCircle {
    pub center: Vec2,
    pub radius: f32,
}

/// Bounded fingertip history used while a single hand is pointing.
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl Trail {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Appends a sample, dropping the oldest once the trail is full.
    pub fn push(&mut self, point: Vec2) {
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn tip(&self) -> Option<Vec2> {
        self.points.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> + '_ {
        self.points.iter()
    }

    /// Runs [`detect_circle`] over the current samples.
    pub fn detect(&mut self) -> Option<DetectedCircle> {
        detect_circle(self.points.make_contiguous())
    }
}

/// Recognizes a hand-drawn circle from an ordered point trail.
///
/// Two independent checks must pass: the shape check (`circularity`, one
/// minus the mean absolute radial deviation over the mean radius) and the
/// sweep check (`coverage`, accumulated signed angle around the centroid in
/// full turns). A back-and-forth stroke fails the sweep check however long
/// it is; a jagged loop fails the shape check however often it wraps.
pub fn detect_circle(trail: &[Vec2]) -> Option<DetectedCircle> {
    if trail.len() < MIN_TRAIL_POINTS {
        return None;
    }

    let count = trail.len() as f32;
    let sum = trail.iter().fold(Vec2::ZERO, |acc, point| acc + *point);
    let center = sum * (1.0 / count);

    let radius = trail.iter().map(|point| point.distance(center)).sum::<f32>() / count;
    if radius < MIN_RADIUS {
        return None;
    }

    let deviation = trail
        .iter()
        .map(|point| (point.distance(center) - radius).abs())
        .sum::<f32>()
        / count;
    let circularity = 1.0 - deviation / radius;

    let mut swept = 0.0;
    for pair in trail.windows(2) {
        let from = (pair[0].y - center.y).atan2(pair[0].x - center.x);
        let to = (pair[1].y - center.y).atan2(pair[1].x - center.x);
        swept += wrap_angle(to - from);
    }
    let coverage = swept.abs() / (2.0 * PI);

    (circularity > MIN_CIRCULARITY && coverage > MIN_COVERAGE)
        .then_some(DetectedCircle { center, radius })
}

/// Wraps an angle difference into (-π, π].
fn wrap_angle(mut delta: f32) -> f32 {
    if delta > PI {
        delta -= 2.0 * PI;
    }
    if delta <= -PI {
        delta += 2.0 * PI;
    }
    delta
}
