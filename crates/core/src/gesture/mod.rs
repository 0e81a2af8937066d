use serde::{Deserialize, Serialize};

use crate::{
    landmarks::{
        HandLandmarks, HandSide, LandmarkFrame, INDEX_MCP, INDEX_PIP, INDEX_TIP, MIDDLE_MCP, MIDDLE_PIP,
        MIDDLE_TIP, PINKY_MCP, PINKY_PIP, PINKY_TIP, RING_PIP, RING_TIP, THUMB_MCP, THUMB_TIP,
        WRIST,
    },
    Vec2, ViewportConfig,
};

/// Thumb tip must sit this much further from the wrist than its base joint.
const THUMB_EXTENSION_RATIO: f32 = 1.2;
/// Normalized-unit margin a fingertip must clear above its PIP joint.
const FINGER_EXTENSION_MARGIN: f32 = 0.02;

const FINGER_JOINTS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gesture {
    #[default]
    None,
    Fist,
    Pointing,
    OpenPalm,
    Peace,
    Partial,
}

impl Gesture {
    /// Fixed-priority rule table over the extended-finger vector
    /// `[thumb, index, middle, ring, pinky]`.
    pub fn from_fingers(extended: [bool; 5]) -> Self {
        let count = extended.iter().filter(|finger| **finger).count();
        match (count, extended) {
            (0, _) => Gesture::Fist,
            (1, [_, true, ..]) => Gesture::Pointing,
            (n, _) if n >= 4 => Gesture::OpenPalm,
            (2, [_, true, true, ..]) => Gesture::Peace,
            _ => Gesture::Partial,
        }
    }
}

/// Per-tick interpretation of one hand, in viewport pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct HandDescriptor {
    pub side: HandSide,
    pub palm: Vec2,
    pub index_tip: Vec2,
    pub wrist: Vec2,
    /// Knuckle span in pixels; the only scale reference for gesture-sized
    /// effects.
    pub palm_size: f32,
    pub extended: [bool; 5],
    pub extended_count: usize,
    pub gesture: Gesture,
}

/// Descriptors for both hand slots in one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hands {
    pub left: Option<HandDescriptor>,
    pub right: Option<HandDescriptor>,
}

impl Hands {
    pub fn from_frame(frame: &LandmarkFrame, viewport: &ViewportConfig) -> Self {
        Self {
            left: describe(frame.hand(HandSide::Left), viewport),
            right: describe(frame.hand(HandSide::Right), viewport),
        }
    }

    pub fn get(&self, side: HandSide) -> Option<&HandDescriptor> {
        match side {
            HandSide::Left => self.left.as_ref(),
            HandSide::Right => self.right.as_ref(),
        }
    }

    pub fn both(&self) -> Option<(&HandDescriptor, &HandDescriptor)> {
        self.left.as_ref().zip(self.right.as_ref())
    }

    /// The hand that is present when the other one is not.
    pub fn only(&self) -> Option<&HandDescriptor> {
        match (&self.left, &self.right) {
            (Some(hand), None) | (None, Some(hand)) => Some(hand),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandDescriptor> + '_ {
        self.left.iter().chain(self.right.iter())
    }
}

/// Classifies a landmark set. Absent input yields no descriptor.
pub fn describe(hand: Option<&HandLandmarks>, viewport: &ViewportConfig) -> Option<HandDescriptor> {
    hand.map(|hand| classify(hand, viewport))
}

pub fn classify(hand: &HandLandmarks, viewport: &ViewportConfig) -> HandDescriptor {
    let extended = extended_fingers(hand);
    let extended_count = extended.iter().filter(|finger| **finger).count();

    let index_knuckle = hand.point(INDEX_MCP);
    let pinky_knuckle = hand.point(PINKY_MCP);
    let palm_size = ((index_knuckle.x - pinky_knuckle.x) * viewport.width)
        .hypot((index_knuckle.y - pinky_knuckle.y) * viewport.height);

    HandDescriptor {
        side: hand.side,
        palm: viewport.project(hand.point(MIDDLE_MCP)),
        index_tip: viewport.project(hand.point(INDEX_TIP)),
        wrist: viewport.project(hand.point(WRIST)),
        palm_size,
        extended,
        extended_count,
        gesture: Gesture::from_fingers(extended),
    }
}

fn extended_fingers(hand: &HandLandmarks) -> [bool; 5] {
    let wrist = hand.point(WRIST);
    // The thumb opens sideways, so only horizontal reach is compared.
    let thumb_reach = (hand.point(THUMB_TIP).x - wrist.x).abs();
    let thumb_base = (hand.point(THUMB_MCP).x - wrist.x).abs();

    let mut extended = [false; 5];
    extended[0] = thumb_reach > thumb_base * THUMB_EXTENSION_RATIO;
    for (slot, (tip, pip)) in extended[1..].iter_mut().zip(FINGER_JOINTS) {
        *slot = hand.point(tip).y < hand.point(pip).y - FINGER_EXTENSION_MARGIN;
    }
    extended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::HandPose;

    fn viewport() -> ViewportConfig {
        ViewportConfig::default()
    }

    #[test]
    fn rule_table_priority() {
        assert_eq!(Gesture::from_fingers([false; 5]), Gesture::Fist);
        assert_eq!(
            Gesture::from_fingers([false, true, false, false, false]),
            Gesture::Pointing
        );
        assert_eq!(
            Gesture::from_fingers([false, true, true, true, true]),
            Gesture::OpenPalm
        );
        assert_eq!(Gesture::from_fingers([true; 5]), Gesture::OpenPalm);
        assert_eq!(
            Gesture::from_fingers([false, true, true, false, false]),
            Gesture::Peace
        );
        assert_eq!(
            Gesture::from_fingers([true, true, false, false, false]),
            Gesture::Partial
        );
        assert_eq!(
            Gesture::from_fingers([true, false, false, false, false]),
            Gesture::Partial
        );
        assert_eq!(
            Gesture::from_fingers([true, true, true, false, false]),
            Gesture::Partial
        );
    }

    #[test]
    fn classifies_posed_hands() {
        for gesture in [
            Gesture::Fist,
            Gesture::Pointing,
            Gesture::OpenPalm,
            Gesture::Peace,
            Gesture::Partial,
        ] {
            let hand = HandPose::for_gesture(HandSide::Right, gesture).build();
            assert_eq!(classify(&hand, &viewport()).gesture, gesture, "{gesture:?}");
        }
    }

    #[test]
    fn jitter_inside_margin_does_not_extend_finger() {
        let mut hand = HandPose::for_gesture(HandSide::Left, Gesture::Fist).build();
        let pip = hand.point(INDEX_PIP);
        hand.points[INDEX_TIP] = Vec2::new(pip.x, pip.y - 0.015);

        let descriptor = classify(&hand, &viewport());
        assert!(!descriptor.extended[1]);
        assert_eq!(descriptor.gesture, Gesture::Fist);
    }

    #[test]
    fn positions_are_mirrored_and_scaled() {
        let hand = HandPose::open(HandSide::Left)
            .at(Vec2::new(0.25, 0.5))
            .build();
        let descriptor = classify(&hand, &viewport());

        assert_eq!(descriptor.palm, Vec2::new(960.0, 360.0));
        assert!(descriptor.index_tip.x > descriptor.palm.x);
        assert!(descriptor.wrist.y > descriptor.palm.y);
        assert!(descriptor.palm_size > 0.0);
    }

    #[test]
    fn classification_is_pure() {
        let hand = HandPose::for_gesture(HandSide::Right, Gesture::Peace)
            .at(Vec2::new(0.4, 0.6))
            .scale(1.3)
            .build();
        let first = classify(&hand, &viewport());
        let second = classify(&hand, &viewport());

        assert_eq!(first, second);
    }

    #[test]
    fn absent_hand_has_no_descriptor() {
        assert!(describe(None, &viewport()).is_none());
    }

    #[test]
    fn hands_split_by_side() {
        let frame = LandmarkFrame::new(
            0.016,
            vec![HandPose::for_gesture(HandSide::Right, Gesture::Pointing).build()],
        );
        let hands = Hands::from_frame(&frame, &viewport());

        assert!(hands.left.is_none());
        assert_eq!(hands.only().map(|hand| hand.gesture), Some(Gesture::Pointing));
        assert!(hands.both().is_none());
        assert_eq!(hands.iter().count(), 1);
    }
}
