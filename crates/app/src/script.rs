//! Scripted gesture session used by the `demo` command.

use std::f32::consts::TAU;

use gesture_fx_core::{
    landmarks::INDEX_TIP, Gesture, HandLandmarks, HandPose, HandSide, LandmarkFrame, Vec2,
    ViewportConfig,
};

const DT: f32 = 1.0 / 60.0;

/// Builds landmark frames in viewport pixel terms.
struct Script {
    viewport: ViewportConfig,
    frames: Vec<LandmarkFrame>,
}

impl Script {
    fn new(viewport: ViewportConfig) -> Self {
        Self {
            viewport,
            frames: Vec::new(),
        }
    }

    /// Hand whose palm center lands on `palm` after projection.
    fn hand(&self, side: HandSide, gesture: Gesture, palm: Vec2) -> HandLandmarks {
        HandPose::for_gesture(side, gesture)
            .at(self.viewport.unproject(palm))
            .build()
    }

    /// Pointing hand whose index fingertip lands on `tip` after projection.
    fn pointer(&self, tip: Vec2) -> HandLandmarks {
        let pose = HandPose::for_gesture(HandSide::Right, Gesture::Pointing);
        let origin = Vec2::new(0.5, 0.5);
        let offset = pose.clone().at(origin).build().point(INDEX_TIP) - origin;
        pose.at(self.viewport.unproject(tip) - offset).build()
    }

    fn push(&mut self, hands: Vec<HandLandmarks>) {
        self.frames.push(LandmarkFrame::new(DT, hands));
    }

    fn idle(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.push(Vec::new());
        }
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, ticks: usize) {
        for i in 0..ticks {
            let angle = i as f32 / ticks as f32 * TAU;
            let tip = center + Vec2::from_angle(angle) * radius;
            let hand = self.pointer(tip);
            self.push(vec![hand]);
        }
    }

    fn hold_palm(&mut self, palm: Vec2, ticks: usize) {
        for _ in 0..ticks {
            let hand = self.hand(HandSide::Left, Gesture::OpenPalm, palm);
            self.push(vec![hand]);
        }
    }

    /// Left palm held at `left` while the right palm moves from `from` to `to`
    /// pixels away along x over `ticks` frames.
    fn pull(&mut self, left: Vec2, from: f32, to: f32, ticks: usize) {
        for i in 0..=ticks {
            let distance = from + (to - from) * i as f32 / ticks.max(1) as f32;
            let right = left + Vec2::new(distance, 0.0);
            let hands = vec![
                self.hand(HandSide::Left, Gesture::Peace, left),
                self.hand(HandSide::Right, Gesture::Peace, right),
            ];
            self.push(hands);
        }
    }

    fn punch(&mut self, start: Vec2, step: f32, ticks: usize) {
        for i in 0..ticks {
            let palm = start + Vec2::new(step * i as f32, 0.0);
            let hand = self.hand(HandSide::Right, Gesture::Fist, palm);
            self.push(vec![hand]);
        }
    }
}

/// Circle, shield, pull-and-release, punch, each followed by a quiet spell so
/// the effects can play out.
pub fn demo_session(viewport: ViewportConfig) -> Vec<LandmarkFrame> {
    let center = Vec2::new(viewport.width / 2.0, viewport.height / 2.0);
    let mut script = Script::new(viewport);

    script.draw_circle(center, 150.0, 60);
    script.idle(90);

    script.hold_palm(center + Vec2::new(-200.0, 0.0), 60);
    script.idle(40);

    let anchor = center - Vec2::new(200.0, 0.0);
    script.pull(anchor, 80.0, 80.0, 10);
    script.pull(anchor, 80.0, 360.0, 30);
    script.pull(anchor, 360.0, 360.0, 20);
    // Right palm flung out at 45 px per tick.
    script.pull(anchor, 360.0, 720.0, 8);
    script.idle(60);

    script.punch(Vec2::new(300.0, center.y), 60.0, 12);
    script.idle(90);

    script.frames
}

#[cfg(test)]
mod tests {
    use gesture_fx_core::{AppConfig, ExplosionCause, SimEvent, Simulation};

    use super::*;

    #[test]
    fn demo_hits_every_gesture() {
        let config = AppConfig::default();
        let frames = demo_session(config.viewport);
        let mut sim = Simulation::new(config, 11);

        let events: Vec<SimEvent> = frames
            .iter()
            .flat_map(|frame| sim.tick(frame).events)
            .collect();

        let portals = events
            .iter()
            .filter(|event| matches!(event, SimEvent::PortalOpened { .. }))
            .count();
        assert_eq!(portals, 1);
        assert!(events
            .iter()
            .any(|event| matches!(event, SimEvent::ShieldRaised { .. })));
        assert!(events.iter().any(|event| matches!(
            event,
            SimEvent::Explosion {
                cause: ExplosionCause::PullRelease,
                ..
            }
        )));
        assert!(events.iter().any(|event| matches!(
            event,
            SimEvent::Explosion {
                cause: ExplosionCause::Punch,
                ..
            }
        )));
    }
}
