use std::collections::VecDeque;

use crate::{
    circle::Trail,
    effects::{Portal, Shield},
    entities::{Ember, EntityKind, LightningBolt, Particle, Spark},
    gesture::Hands,
    interaction::PullState,
    simulation::World,
    Result, Vec2,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingKind {
    Portal,
    Shield,
}

/// What a renderer needs to draw one entity or effect object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawPrimitive<'a> {
    /// Particle or ember.
    Glow {
        kind: EntityKind,
        position: Vec2,
        life: f32,
        size: f32,
        hue: f32,
    },
    /// Spark with its fading tail, oldest point first.
    Streak {
        position: Vec2,
        life: f32,
        size: f32,
        hue: f32,
        tail: &'a VecDeque<Vec2>,
    },
    Bolt {
        points: &'a [Vec2],
        life: f32,
        hue: f32,
    },
    Ring {
        kind: RingKind,
        position: Vec2,
        radius: f32,
        rotation: f32,
        life: f32,
    },
}

/// Draw contract implemented by every renderable object.
pub trait Drawable {
    fn primitive(&self) -> DrawPrimitive<'_>;
}

impl Drawable for Particle {
    fn primitive(&self) -> DrawPrimitive<'_> {
        DrawPrimitive::Glow {
            kind: EntityKind::Particle,
            position: self.position,
            life: self.life,
            size: self.size,
            hue: self.hue,
        }
    }
}

impl Drawable for Ember {
    fn primitive(&self) -> DrawPrimitive<'_> {
        DrawPrimitive::Glow {
            kind: EntityKind::Ember,
            position: self.position,
            life: self.life,
            size: self.size,
            hue: self.hue,
        }
    }
}

impl Drawable for Spark {
    fn primitive(&self) -> DrawPrimitive<'_> {
        DrawPrimitive::Streak {
            position: self.position,
            life: self.life,
            size: self.size,
            hue: self.hue,
            tail: &self.trail,
        }
    }
}

impl Drawable for LightningBolt {
    fn primitive(&self) -> DrawPrimitive<'_> {
        DrawPrimitive::Bolt {
            points: &self.points,
            life: self.life,
            hue: self.hue,
        }
    }
}

impl Drawable for Portal {
    fn primitive(&self) -> DrawPrimitive<'_> {
        DrawPrimitive::Ring {
            kind: RingKind::Portal,
            position: self.center,
            radius: self.radius,
            rotation: self.rotation,
            life: self.life,
        }
    }
}

impl Drawable for Shield {
    fn primitive(&self) -> DrawPrimitive<'_> {
        DrawPrimitive::Ring {
            kind: RingKind::Shield,
            position: self.center,
            radius: self.size,
            rotation: self.rotation,
            life: self.life,
        }
    }
}

/// Immutable view of one finished tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    world: &'a World,
    hands: &'a Hands,
    pub pull: &'a PullState,
    pub trail: &'a Trail,
    pub time: f32,
}

impl<'a> FrameSnapshot<'a> {
    pub(crate) fn new(
        world: &'a World,
        hands: &'a Hands,
        pull: &'a PullState,
        trail: &'a Trail,
        time: f32,
    ) -> Self {
        Self {
            world,
            hands,
            pull,
            trail,
            time,
        }
    }

    pub fn flash(&self) -> f32 {
        self.world.screen.flash
    }

    pub fn shake_offset(&self) -> Vec2 {
        self.world.screen.offset
    }

    /// Palm endpoints and energy of the stream drawn while pulling.
    pub fn energy_stream(&self) -> Option<(Vec2, Vec2, f32)> {
        if !self.pull.active {
            return None;
        }
        self.hands
            .both()
            .map(|(left, right)| (left.palm, right.palm, self.pull.energy))
    }

    /// Every primitive in back-to-front order.
    pub fn primitives(&self) -> impl Iterator<Item = DrawPrimitive<'a>> + 'a {
        let world = self.world;
        world
            .portals
            .iter()
            .map(Drawable::primitive)
            .chain(world.shields.iter().map(Drawable::primitive))
            .chain(world.pools.lightning.iter().map(Drawable::primitive))
            .chain(world.pools.embers.iter().map(Drawable::primitive))
            .chain(world.pools.sparks.iter().map(Drawable::primitive))
            .chain(world.pools.particles.iter().map(Drawable::primitive))
    }
}

/// Consumer of finished frames. Implementations must not feed anything back
/// into the simulation.
pub trait Renderer {
    fn draw(&mut self, frame: &FrameSnapshot<'_>) -> Result<()>;
}

/// Tally of what the last frame asked to be drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub glows: usize,
    pub streaks: usize,
    pub bolts: usize,
    pub rings: usize,
    pub trail_points: usize,
    pub streaming: bool,
    pub flash: f32,
}

/// Headless renderer that counts primitives instead of rasterising them.
#[derive(Debug, Default)]
pub struct RenderStats {
    frames: u64,
    last: FrameStats,
    peak_primitives: usize,
}

impl RenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last(&self) -> FrameStats {
        self.last
    }

    pub fn peak_primitives(&self) -> usize {
        self.peak_primitives
    }
}

impl Renderer for RenderStats {
    fn draw(&mut self, frame: &FrameSnapshot<'_>) -> Result<()> {
        let mut stats = FrameStats {
            trail_points: frame.trail.len(),
            streaming: frame.energy_stream().is_some(),
            flash: frame.flash(),
            ..FrameStats::default()
        };
        for primitive in frame.primitives() {
            match primitive {
                DrawPrimitive::Glow { .. } => stats.glows += 1,
                DrawPrimitive::Streak { .. } => stats.streaks += 1,
                DrawPrimitive::Bolt { .. } => stats.bolts += 1,
                DrawPrimitive::Ring { .. } => stats.rings += 1,
            }
        }

        let total = stats.glows + stats.streaks + stats.bolts + stats.rings;
        self.peak_primitives = self.peak_primitives.max(total);
        self.frames += 1;
        self.last = stats;
        tracing::trace!(frame = self.frames, total, ?stats, "frame drawn");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gesture::Gesture,
        landmarks::{HandPose, HandSide, LandmarkFrame},
        AppConfig, Simulation,
    };

    #[test]
    fn counts_every_live_object() {
        let mut sim = Simulation::new(AppConfig::default(), 4);
        for x in [0.3, 0.5, 0.3] {
            let fist = HandPose::for_gesture(HandSide::Left, Gesture::Fist)
                .at(Vec2::new(x, 0.5))
                .build();
            sim.tick(&LandmarkFrame::new(0.016, vec![fist]));
        }

        let mut renderer = RenderStats::new();
        renderer.draw(&sim.snapshot()).unwrap();

        let counts = sim.world().counts();
        let stats = renderer.last();
        assert_eq!(stats.glows, counts.particles + counts.embers);
        assert_eq!(stats.streaks, counts.sparks);
        assert_eq!(stats.bolts, counts.lightning);
        assert_eq!(stats.rings, counts.portals + counts.shields);
        assert!(stats.glows > 0);
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn stream_only_while_pulling() {
        let mut sim = Simulation::new(AppConfig::default(), 8);
        let left = HandPose::for_gesture(HandSide::Left, Gesture::Peace)
            .at(Vec2::new(0.65, 0.5))
            .build();
        let right = HandPose::for_gesture(HandSide::Right, Gesture::Peace)
            .at(Vec2::new(0.35, 0.5))
            .build();
        sim.tick(&LandmarkFrame::new(0.016, vec![left.clone(), right]));

        let (from, to, energy) = sim.snapshot().energy_stream().expect("pulling");
        assert!((from.distance(to) - 384.0).abs() < 1e-2);
        assert!(energy > 0.6 && energy < 0.7);

        sim.tick(&LandmarkFrame::new(0.016, vec![left]));
        assert!(sim.snapshot().energy_stream().is_none());
    }
}
