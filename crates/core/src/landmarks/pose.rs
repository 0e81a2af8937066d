use crate::{Gesture, Vec2};

use super::{HandLandmarks, HandSide, LANDMARK_COUNT};

/// Horizontal offsets of the index, middle, ring and pinky knuckles from the
/// palm centre.
const KNUCKLE_X: [f32; 4] = [-0.03, 0.0, 0.025, 0.05];
const KNUCKLE_Y: [f32; 4] = [0.0, 0.0, 0.005, 0.01];

/// Builds an upright, camera-facing hand in normalized landmark space.
///
/// Used by the scripted driver and by tests to stand in for the inference
/// pipeline. The palm centre is landmark 9 (middle knuckle).
#[derive(Debug, Clone)]
pub struct HandPose {
    side: HandSide,
    palm: Vec2,
    extended: [bool; 5],
    scale: f32,
}

impl HandPose {
    /// All five fingers extended, centred in the frame.
    pub fn open(side: HandSide) -> Self {
        Self {
            side,
            palm: Vec2::new(0.5, 0.5),
            extended: [true; 5],
            scale: 1.0,
        }
    }

    /// A pose whose finger vector classifies as `gesture`. [`Gesture::None`]
    /// has no pose of its own and is built as a fist.
    pub fn for_gesture(side: HandSide, gesture: Gesture) -> Self {
        let extended = match gesture {
            Gesture::None | Gesture::Fist => [false; 5],
            Gesture::Pointing => [false, true, false, false, false],
            Gesture::OpenPalm => [true; 5],
            Gesture::Peace => [false, true, true, false, false],
            Gesture::Partial => [true, true, false, false, false],
        };
        Self::open(side).fingers(extended)
    }

    /// Moves the palm centre to a normalized sensor position.
    pub fn at(mut self, palm: Vec2) -> Self {
        self.palm = palm;
        self
    }

    pub fn fingers(mut self, extended: [bool; 5]) -> Self {
        self.extended = extended;
        self
    }

    /// Uniformly scales the hand, e.g. to simulate distance from the camera.
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn build(&self) -> HandLandmarks {
        let at = |dx: f32, dy: f32| {
            Vec2::new(self.palm.x + dx * self.scale, self.palm.y + dy * self.scale)
        };
        let mut points = [Vec2::ZERO; LANDMARK_COUNT];

        points[0] = at(0.0, 0.15);
        points[1] = at(-0.04, 0.11);
        points[2] = at(-0.06, 0.08);
        if self.extended[0] {
            points[3] = at(-0.10, 0.05);
            points[4] = at(-0.13, 0.03);
        } else {
            points[3] = at(-0.05, 0.04);
            points[4] = at(-0.03, 0.03);
        }

        for finger in 0..4 {
            let base = 5 + finger * 4;
            let (kx, ky) = (KNUCKLE_X[finger], KNUCKLE_Y[finger]);
            let (pip, dip, tip) = if self.extended[finger + 1] {
                (-0.05, -0.08, -0.11)
            } else {
                (-0.03, -0.01, 0.01)
            };
            points[base] = at(kx, ky);
            points[base + 1] = at(kx, ky + pip);
            points[base + 2] = at(kx, ky + dip);
            points[base + 3] = at(kx, ky + tip);
        }

        HandLandmarks::new(self.side, points)
    }
}
