//! Simulation context owned by the frame driver.
//!
//! A tick always runs the same phases in order: clamp the frame delta,
//! classify hands, interpret gestures, integrate entities and effects. Once
//! [`Simulation::tick`] returns, the state is stable until the next call and
//! can be handed to a renderer through [`Simulation::snapshot`].

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::{
    circle::Trail,
    effects::{PortalSet, Shields},
    entities::{EntityKind, EntityPools},
    gesture::Hands,
    interaction::{InteractionStateMachine, PullState, SimEvent},
    landmarks::LandmarkFrame,
    render::FrameSnapshot,
    timeline::{FrameClock, ScreenEffects},
    AppConfig,
};

/// Everything the interaction stage may mutate besides its own state.
#[derive(Debug, Clone)]
pub struct World {
    pub pools: EntityPools,
    pub portals: PortalSet,
    pub shields: Shields,
    pub screen: ScreenEffects,
}

impl World {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            pools: EntityPools::new(&config.pools),
            portals: PortalSet::with_capacity(config.effects.max_portals),
            shields: Shields::new(),
            screen: ScreenEffects::default(),
        }
    }

    pub fn clear(&mut self) {
        self.pools.clear();
        self.portals.clear();
        self.shields.clear();
        self.screen.reset();
    }

    pub fn counts(&self) -> LiveCounts {
        LiveCounts {
            particles: self.pools.len(EntityKind::Particle),
            sparks: self.pools.len(EntityKind::Spark),
            embers: self.pools.len(EntityKind::Ember),
            lightning: self.pools.len(EntityKind::Lightning),
            portals: self.portals.len(),
            shields: self.shields.iter().count(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LiveCounts {
    pub particles: usize,
    pub sparks: usize,
    pub embers: usize,
    pub lightning: usize,
    pub portals: usize,
    pub shields: usize,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub tick: u64,
    /// Clamped step that was applied.
    pub dt: f32,
    pub events: Vec<SimEvent>,
    pub counts: LiveCounts,
}

#[derive(Debug)]
pub struct Simulation {
    config: AppConfig,
    seed: u64,
    rng: ChaCha8Rng,
    clock: FrameClock,
    ticks: u64,
    hands: Hands,
    interaction: InteractionStateMachine,
    world: World,
}

impl Simulation {
    pub fn new(config: AppConfig, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: FrameClock::new(config.timing.max_step),
            ticks: 0,
            hands: Hands::default(),
            interaction: InteractionStateMachine::new(config.effects.trail_capacity),
            world: World::new(&config),
            config,
            seed,
        }
    }

    /// Explicit restart: drops every entity and effect and reseeds.
    pub fn reset(&mut self) {
        tracing::debug!(seed = self.seed, "simulation reset");
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.clock.reset();
        self.ticks = 0;
        self.hands = Hands::default();
        self.interaction.reset();
        self.world.clear();
    }

    /// Classifies the frame's landmarks and advances one tick.
    pub fn tick(&mut self, frame: &LandmarkFrame) -> TickReport {
        let hands = Hands::from_frame(frame, &self.config.viewport);
        self.step(hands, frame.dt)
    }

    /// Advances one tick from already classified hands.
    pub fn step(&mut self, hands: Hands, dt: f32) -> TickReport {
        let dt = self.clock.advance(dt);
        self.hands = hands;

        let events = self
            .interaction
            .step(&self.hands, &mut self.world, &mut self.rng);

        self.world.pools.tick(dt);
        self.world
            .portals
            .update(dt, &mut self.world.pools.embers, &mut self.rng);
        self.world.screen.decay(&mut self.rng);

        self.ticks += 1;
        TickReport {
            tick: self.ticks,
            dt,
            events,
            counts: self.world.counts(),
        }
    }

    /// Read-only view for the render stage.
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot::new(
            &self.world,
            &self.hands,
            self.interaction.pull(),
            self.interaction.trail(),
            self.clock.time_seconds,
        )
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn pull(&self) -> &PullState {
        self.interaction.pull()
    }

    pub fn trail(&self) -> &Trail {
        self.interaction.trail()
    }

    pub fn hands(&self) -> &Hands {
        &self.hands
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.time_seconds
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::TAU;

    use super::*;
    use crate::{
        gesture::Gesture,
        landmarks::{HandPose, HandSide},
        Vec2,
    };

    const DT: f32 = 1.0 / 60.0;

    fn frame(hands: Vec<crate::HandLandmarks>) -> LandmarkFrame {
        LandmarkFrame::new(DT, hands)
    }

    /// Pointing hand whose fingertip sits at `tip` in viewport pixels.
    fn pointing_at(sim: &Simulation, tip: Vec2) -> crate::HandLandmarks {
        let viewport = sim.config().viewport;
        let pose = HandPose::for_gesture(HandSide::Right, Gesture::Pointing);
        let probe = pose.clone().at(Vec2::new(0.5, 0.5)).build();
        let offset = probe.point(crate::landmarks::INDEX_TIP) - Vec2::new(0.5, 0.5);
        let target = viewport.unproject(tip);
        pose.at(target - offset).build()
    }

    #[test]
    fn drawn_circle_opens_one_portal() {
        let mut sim = Simulation::new(AppConfig::default(), 5);
        let center = Vec2::new(640.0, 360.0);

        let mut opened_at = None;
        for i in 0..60 {
            let tip = center + Vec2::from_angle(i as f32 / 60.0 * TAU) * 150.0;
            let hand = pointing_at(&sim, tip);
            let report = sim.tick(&frame(vec![hand]));
            if report
                .events
                .iter()
                .any(|event| matches!(event, SimEvent::PortalOpened { .. }))
            {
                assert!(opened_at.is_none());
                assert!(sim.trail().is_empty());
                opened_at = Some(i);
            }
        }

        assert!(opened_at.is_some());
        assert_eq!(sim.world().portals.len(), 1);
        let portal = sim.world().portals.iter().next().unwrap();
        assert!(portal.center.distance(center) < 100.0);
    }

    #[test]
    fn open_palm_raises_shield_per_hand() {
        let mut sim = Simulation::new(AppConfig::default(), 9);
        let left = HandPose::open(HandSide::Left).at(Vec2::new(0.7, 0.5)).build();
        let right = HandPose::open(HandSide::Right).at(Vec2::new(0.65, 0.5)).build();

        let report = sim.tick(&frame(vec![left.clone(), right]));
        let raised = report
            .events
            .iter()
            .filter(|event| matches!(event, SimEvent::ShieldRaised { .. }))
            .count();
        assert_eq!(raised, 2);

        let report = sim.tick(&frame(vec![left]));
        assert_eq!(report.counts.shields, 2);
        assert!(sim.world().shields.get(HandSide::Right).is_some_and(|s| !s.active));

        for _ in 0..30 {
            sim.tick(&frame(Vec::new()));
        }
        assert_eq!(sim.world().counts().shields, 0);
    }

    #[test]
    fn pools_respect_capacity_under_sustained_bursts() {
        let mut config = AppConfig::default();
        config.pools.particles = 50;
        config.pools.sparks = 40;
        config.pools.lightning = 5;
        let mut sim = Simulation::new(config, 1);

        for i in 0..200 {
            let x = if i % 2 == 0 { 0.2 } else { 0.6 };
            let fist = HandPose::for_gesture(HandSide::Left, Gesture::Fist)
                .at(Vec2::new(x, 0.5))
                .build();
            let report = sim.tick(&frame(vec![fist]));
            assert!(report.counts.particles <= 50);
            assert!(report.counts.sparks <= 40);
            assert!(report.counts.lightning <= 5);
            assert!(report.counts.embers <= 150);
        }
        assert!(sim.world().pools.particles.evicted() > 0);
    }

    #[test]
    fn hitches_are_clamped() {
        let mut sim = Simulation::new(AppConfig::default(), 2);
        let report = sim.tick(&LandmarkFrame::new(3.0, Vec::new()));

        assert_eq!(report.dt, 0.05);
        assert_eq!(sim.elapsed(), 0.05);
    }

    #[test]
    fn same_seed_same_outcome() {
        let run = || {
            let mut sim = Simulation::new(AppConfig::default(), 77);
            let mut counts = Vec::new();
            for i in 0..40 {
                let x = 0.3 + 0.08 * (i % 2) as f32;
                let fist = HandPose::for_gesture(HandSide::Right, Gesture::Fist)
                    .at(Vec2::new(x, 0.5))
                    .build();
                counts.push(sim.tick(&frame(vec![fist])).counts);
            }
            counts
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn reset_restores_a_fresh_session() {
        let mut sim = Simulation::new(AppConfig::default(), 3);
        let open = HandPose::open(HandSide::Left).build();
        sim.tick(&frame(vec![open]));
        assert_eq!(sim.world().counts().shields, 1);

        sim.reset();
        assert_eq!(sim.world().counts(), LiveCounts::default());
        assert_eq!(sim.ticks(), 0);
        assert_eq!(sim.elapsed(), 0.0);
    }
}
