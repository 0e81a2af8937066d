//! Input boundary: per-frame hand landmarks as delivered by the external
//! inference pipeline.

mod pose;

use serde::{Deserialize, Serialize};

use crate::Vec2;

pub use pose::HandPose;

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Screen side a hand appears on after mirroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    /// Converts the handedness label reported by the inference model. The
    /// model labels hands from the camera's point of view, which is the
    /// mirror image of what the user sees.
    pub fn from_sensor_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("right") {
            HandSide::Left
        } else {
            HandSide::Right
        }
    }

    pub fn index(self) -> usize {
        match self {
            HandSide::Left => 0,
            HandSide::Right => 1,
        }
    }
}

/// One detected hand: 21 normalized points plus its side label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub side: HandSide,
    pub points: [Vec2; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(side: HandSide, points: [Vec2; LANDMARK_COUNT]) -> Self {
        Self { side, points }
    }

    pub fn point(&self, index: usize) -> Vec2 {
        self.points[index]
    }
}

/// Everything the inference collaborator reports for a single display
/// refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Elapsed time since the previous frame, before clamping.
    #[serde(default)]
    pub dt: f32,
    #[serde(default)]
    pub hands: Vec<HandLandmarks>,
}

impl LandmarkFrame {
    pub fn new(dt: f32, hands: Vec<HandLandmarks>) -> Self {
        Self { dt, hands }
    }

    /// First hand reported for `side`. Later entries with the same side in
    /// one frame are ignored rather than overwriting the earlier one.
    pub fn hand(&self, side: HandSide) -> Option<&HandLandmarks> {
        self.hands.iter().find(|hand| hand.side == side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_labels_are_mirrored() {
        assert_eq!(HandSide::from_sensor_label("Right"), HandSide::Left);
        assert_eq!(HandSide::from_sensor_label("Left"), HandSide::Right);
    }

    #[test]
    fn first_hand_per_side_wins() {
        let first = HandPose::open(HandSide::Left).build();
        let second = HandPose::open(HandSide::Left)
            .at(Vec2::new(0.2, 0.2))
            .build();
        let frame = LandmarkFrame::new(0.016, vec![first.clone(), second]);

        assert_eq!(frame.hand(HandSide::Left), Some(&first));
        assert!(frame.hand(HandSide::Right).is_none());
    }

    #[test]
    fn rejects_wrong_landmark_count() {
        let json = r#"{ "side": "left", "points": [{ "x": 0.0, "y": 0.0 }] }"#;
        assert!(serde_json::from_str::<HandLandmarks>(json).is_err());
    }
}
