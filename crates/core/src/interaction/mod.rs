//! Turns hand descriptors into discrete events: portal circles, two-hand
//! pull/release and fist punches.

use std::f32::consts::TAU;

use rand::Rng;
use serde::Serialize;

use crate::{
    circle::{DetectedCircle, Trail},
    entities::{Ember, LightningBolt, Particle, Spark, TransientEntity},
    gesture::{Gesture, HandDescriptor, Hands},
    landmarks::HandSide,
    simulation::World,
    Vec2,
};

/// Below this palm distance the pull is re-armed with zero energy.
pub const REARM_DISTANCE: f32 = 120.0;
/// At or beyond this palm distance the pull is released.
pub const RELEASE_DISTANCE: f32 = 600.0;
const ENERGY_SPAN: f32 = 400.0;
const RELEASE_MIN_ENERGY: f32 = 0.3;
/// Palm speed, in pixels per tick, that turns a release into an explosion.
pub const RELEASE_MIN_SPEED: f32 = 20.0;
pub const PUNCH_MIN_SPEED: f32 = 40.0;
pub const PUNCH_POWER: f32 = 0.75;

const PULL_LIGHTNING_CHANCE: f32 = 0.12;
const STREAM_LIGHTNING_CHANCE: f32 = 0.18;
const STREAM_EMBER_CHANCE: f32 = 0.5;

const PORTAL_FLASH: f32 = 0.7;
const CELEBRATION_SPARKS: usize = 80;
const TRAIL_FIRE_MIN_POINTS: usize = 3;
const TRAIL_FIRE_POINTS: usize = 5;
const TRAIL_EMBER_CHANCE: f64 = 0.6;
const TRAIL_SPARK_CHANCE: f64 = 0.7;

const EXPLOSION_PARTICLES: f32 = 80.0;
const EXPLOSION_SPARKS: f32 = 60.0;
const EXPLOSION_BOLTS: usize = 10;

/// Shared two-hand pull record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PullState {
    pub active: bool,
    pub distance: f32,
    /// Always within `[0, 1]`.
    pub energy: f32,
    /// Palm distance recorded the last time the pull was re-armed.
    pub start_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplosionCause {
    PullRelease,
    Punch,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    PortalOpened { center: Vec2, radius: f32 },
    ShieldRaised { side: HandSide },
    Explosion {
        origin: Vec2,
        power: f32,
        cause: ExplosionCause,
    },
}

/// Per-side palm speed in pixels per tick.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    previous: [Option<Vec2>; 2],
}

impl VelocityTracker {
    /// Speed is zero on the first tick a hand reappears.
    pub fn update(&mut self, hands: &Hands) -> [f32; 2] {
        let mut speeds = [0.0; 2];
        for side in [HandSide::Left, HandSide::Right] {
            let slot = side.index();
            let palm = hands.get(side).map(|hand| hand.palm);
            if let (Some(now), Some(before)) = (palm, self.previous[slot]) {
                speeds[slot] = now.distance(before);
            }
            self.previous[slot] = palm;
        }
        speeds
    }

    pub fn reset(&mut self) {
        self.previous = [None, None];
    }
}

#[derive(Debug, Clone)]
pub struct InteractionStateMachine {
    trail: Trail,
    pull: PullState,
    velocity: VelocityTracker,
}

impl InteractionStateMachine {
    pub fn new(trail_capacity: usize) -> Self {
        Self {
            trail: Trail::with_capacity(trail_capacity),
            pull: PullState::default(),
            velocity: VelocityTracker::default(),
        }
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn pull(&self) -> &PullState {
        &self.pull
    }

    pub fn reset(&mut self) {
        self.trail.clear();
        self.pull = PullState::default();
        self.velocity.reset();
    }

    /// Runs one tick of gesture interpretation, mutating `world` and
    /// returning the events raised.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        hands: &Hands,
        world: &mut World,
        rng: &mut R,
    ) -> Vec<SimEvent> {
        let mut events = Vec::new();
        let speeds = self.velocity.update(hands);

        let drawing = self.trace_circle(hands, world, rng, &mut events);

        for side in [HandSide::Left, HandSide::Right] {
            if world
                .shields
                .drive(side, hands.get(side), &mut world.pools.embers, rng)
            {
                events.push(SimEvent::ShieldRaised { side });
            }
        }

        self.pull_hands(hands, speeds, world, rng, &mut events);

        if !self.pull.active && !drawing {
            for side in [HandSide::Left, HandSide::Right] {
                let Some(hand) = hands.get(side) else { continue };
                if hand.gesture == Gesture::Fist && speeds[side.index()] > PUNCH_MIN_SPEED {
                    events.push(explode(
                        world,
                        hand.palm,
                        PUNCH_POWER,
                        ExplosionCause::Punch,
                        rng,
                    ));
                }
            }
        }

        events
    }

    /// Extends the trail while exactly one hand is pointing. Returns whether a
    /// circle is being drawn this tick.
    fn trace_circle<R: Rng + ?Sized>(
        &mut self,
        hands: &Hands,
        world: &mut World,
        rng: &mut R,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        let Some(hand) = hands.only().filter(|hand| hand.gesture == Gesture::Pointing) else {
            self.trail.clear();
            return false;
        };

        self.trail.push(hand.index_tip);
        match self.trail.detect() {
            Some(circle) => {
                world.portals.open(&circle, rng);
                world.screen.flash = PORTAL_FLASH;
                celebrate(world, &circle, rng);
                self.trail.clear();
                events.push(SimEvent::PortalOpened {
                    center: circle.center,
                    radius: circle.radius,
                });
            }
            None => self.emit_trail_fire(world, rng),
        }
        true
    }

    fn emit_trail_fire<R: Rng + ?Sized>(&self, world: &mut World, rng: &mut R) {
        if self.trail.len() < TRAIL_FIRE_MIN_POINTS {
            return;
        }

        let skip = self.trail.len().saturating_sub(TRAIL_FIRE_POINTS);
        for point in self.trail.iter().skip(skip) {
            if rng.gen_bool(TRAIL_EMBER_CHANCE) {
                let position = *point + jitter(rng, 10.0);
                let velocity = Vec2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-7.0..-2.0));
                world
                    .pools
                    .spawn(TransientEntity::Ember(Ember::new(position, velocity, rng)));
            }
        }

        if let Some(tip) = self.trail.tip() {
            if rng.gen_bool(TRAIL_SPARK_CHANCE) {
                let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
                let velocity = direction * rng.gen_range(3.0..8.0) + Vec2::new(0.0, -2.0);
                let hue = rng.gen_range(40.0..55.0);
                let size = rng.gen_range(2.0..4.0);
                world
                    .pools
                    .spawn(TransientEntity::Spark(Spark::new(tip, velocity, hue, size, rng)));
            }
        }
    }

    fn pull_hands<R: Rng + ?Sized>(
        &mut self,
        hands: &Hands,
        speeds: [f32; 2],
        world: &mut World,
        rng: &mut R,
        events: &mut Vec<SimEvent>,
    ) {
        self.pull.active = false;
        let Some((left, right)) = hands.both() else {
            return;
        };

        let distance = left.palm.distance(right.palm);
        if distance < REARM_DISTANCE {
            self.pull.start_distance = distance;
            self.pull.energy = 0.0;
        } else if distance < RELEASE_DISTANCE {
            self.pull.active = true;
            self.pull.distance = distance;
            self.pull.energy = ((distance - REARM_DISTANCE) / ENERGY_SPAN).clamp(0.0, 1.0);
            stream_energy(world, left, right, self.pull.energy, rng);
        } else {
            let fast = speeds.iter().any(|speed| *speed > RELEASE_MIN_SPEED);
            if self.pull.energy > RELEASE_MIN_ENERGY && fast {
                let origin = left.palm.midpoint(right.palm);
                events.push(explode(
                    world,
                    origin,
                    self.pull.energy,
                    ExplosionCause::PullRelease,
                    rng,
                ));
            }
            self.pull.energy = 0.0;
        }
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, half: f32) -> Vec2 {
    Vec2::new(rng.gen_range(-half..half), rng.gen_range(-half..half))
}

fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f32) -> bool {
    rng.gen_bool(f64::from(probability.clamp(0.0, 1.0)))
}

/// Side effects of an active pull: arcs and cinders between the palms.
fn stream_energy<R: Rng + ?Sized>(
    world: &mut World,
    left: &HandDescriptor,
    right: &HandDescriptor,
    energy: f32,
    rng: &mut R,
) {
    if chance(rng, PULL_LIGHTNING_CHANCE * energy) {
        let bolt = LightningBolt::new(left.palm, right.palm, 3, rng);
        world.pools.spawn(TransientEntity::Lightning(bolt));
    }
    if chance(rng, STREAM_LIGHTNING_CHANCE * energy) {
        let bolt = LightningBolt::new(left.palm, right.palm, 4, rng);
        world.pools.spawn(TransientEntity::Lightning(bolt));
    }
    if chance(rng, STREAM_EMBER_CHANCE * energy) {
        let along = rng.gen_range(0.0..1.0);
        let position = left.palm + (right.palm - left.palm) * along + jitter(rng, 25.0);
        let velocity = Vec2::new(rng.gen_range(-2.0..2.0), rng.gen_range(-7.0..-3.0));
        world
            .pools
            .spawn(TransientEntity::Ember(Ember::new(position, velocity, rng)));
    }
}

fn celebrate<R: Rng + ?Sized>(world: &mut World, circle: &DetectedCircle, rng: &mut R) {
    for i in 0..CELEBRATION_SPARKS {
        let direction = Vec2::from_angle(i as f32 / CELEBRATION_SPARKS as f32 * TAU);
        let speed = rng.gen_range(6.0..14.0);
        let hue = rng.gen_range(35.0..55.0);
        let spark = Spark::new(
            circle.center + direction * circle.radius,
            direction * speed,
            hue,
            3.0,
            rng,
        );
        world.pools.spawn(TransientEntity::Spark(spark));
    }
}

/// Radial burst of particles, sparks and a ring of bolts, scaled by `power`.
pub fn explode<R: Rng + ?Sized>(
    world: &mut World,
    origin: Vec2,
    power: f32,
    cause: ExplosionCause,
    rng: &mut R,
) -> SimEvent {
    tracing::info!(x = origin.x, y = origin.y, power, ?cause, "explosion");

    let particles = (EXPLOSION_PARTICLES * power).floor() as usize;
    for i in 0..particles {
        let angle = i as f32 / particles as f32 * TAU + rng.gen_range(-0.3..0.3);
        let speed = rng.gen_range(12.0..37.0) * power;
        let size = rng.gen_range(25.0..60.0);
        let lifespan = rng.gen_range(1.2..1.7);
        let hue = rng.gen_range(25.0..55.0);
        let particle = Particle::new(
            origin,
            Vec2::from_angle(angle) * speed,
            size,
            lifespan,
            hue,
            rng,
        );
        world.pools.spawn(TransientEntity::Particle(particle));
    }

    let sparks = (EXPLOSION_SPARKS * power).floor() as usize;
    for _ in 0..sparks {
        let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
        let speed = rng.gen_range(12.0..42.0);
        let position = origin + jitter(rng, 15.0);
        let hue = rng.gen_range(35.0..55.0);
        let size = rng.gen_range(4.0..8.0);
        let spark = Spark::new(
            position,
            direction * speed + Vec2::new(0.0, -4.0),
            hue,
            size,
            rng,
        );
        world.pools.spawn(TransientEntity::Spark(spark));
    }

    for i in 0..EXPLOSION_BOLTS {
        let direction = Vec2::from_angle(i as f32 / EXPLOSION_BOLTS as f32 * TAU);
        let reach = rng.gen_range(180.0..300.0);
        let bolt = LightningBolt::new(origin, origin + direction * reach, 4, rng);
        world.pools.spawn(TransientEntity::Lightning(bolt));
    }

    world.screen.trigger(power);
    SimEvent::Explosion {
        origin,
        power,
        cause,
    }
}
