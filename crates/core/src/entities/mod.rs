//! Short-lived visual entities and the capacity-bounded pools that own them.
//!
//! Every entity carries a `life` scalar that starts at 1.0 and only ever
//! decreases; pools drop an entity on the tick its life reaches zero or its
//! kind-specific exit condition holds.

mod pool;

use std::{collections::VecDeque, f32::consts::TAU};

use rand::Rng;

use crate::Vec2;

pub use pool::{EntityPool, EntityPools};

const PARTICLE_GRAVITY: f32 = 0.25;
const PARTICLE_DAMPING: f32 = 0.96;

const SPARK_GRAVITY: f32 = 0.18;
const SPARK_DAMPING: f32 = 0.97;
/// Applied per tick regardless of frame time.
const SPARK_DECAY: f32 = 0.02;
pub const SPARK_TRAIL_LEN: usize = 15;

const EMBER_BUOYANCY: f32 = 0.05;
const EMBER_DRAG: f32 = 0.99;
const EMBER_WOBBLE: f32 = 0.5;
const EMBER_DECAY: f32 = 0.015;
/// Embers floating above this screen height have burnt out.
pub const EMBER_CEILING: f32 = -50.0;

const LIGHTNING_DECAY: f32 = 0.12;
/// Midpoint offset as a fraction of the segment's span on each axis.
const LIGHTNING_JAGGEDNESS: f32 = 0.5;

/// Shared per-tick capability of every transient entity.
pub trait Transient {
    fn tick(&mut self, dt: f32);
    fn is_alive(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Particle,
    Spark,
    Ember,
    Lightning,
}

/// Closed set of entity kinds, dispatched by variant.
#[derive(Debug, Clone)]
pub enum TransientEntity {
    Particle(Particle),
    Spark(Spark),
    Ember(Ember),
    Lightning(LightningBolt),
}

impl TransientEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            TransientEntity::Particle(_) => EntityKind::Particle,
            TransientEntity::Spark(_) => EntityKind::Spark,
            TransientEntity::Ember(_) => EntityKind::Ember,
            TransientEntity::Lightning(_) => EntityKind::Lightning,
        }
    }

    pub fn life(&self) -> f32 {
        match self {
            TransientEntity::Particle(particle) => particle.life,
            TransientEntity::Spark(spark) => spark.life,
            TransientEntity::Ember(ember) => ember.life,
            TransientEntity::Lightning(bolt) => bolt.life,
        }
    }
}

impl Transient for TransientEntity {
    fn tick(&mut self, dt: f32) {
        match self {
            TransientEntity::Particle(particle) => particle.tick(dt),
            TransientEntity::Spark(spark) => spark.tick(dt),
            TransientEntity::Ember(ember) => ember.tick(dt),
            TransientEntity::Lightning(bolt) => bolt.tick(dt),
        }
    }

    fn is_alive(&self) -> bool {
        match self {
            TransientEntity::Particle(particle) => particle.is_alive(),
            TransientEntity::Spark(spark) => spark.is_alive(),
            TransientEntity::Ember(ember) => ember.is_alive(),
            TransientEntity::Lightning(bolt) => bolt.is_alive(),
        }
    }
}

/// Burst debris: falls under gravity, fades over a wall-clock lifespan.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub hue: f32,
    pub life: f32,
    /// Seconds until `life` reaches zero.
    pub lifespan: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub flicker_phase: f32,
}

impl Particle {
    pub fn new<R: Rng + ?Sized>(
        position: Vec2,
        velocity: Vec2,
        size: f32,
        lifespan: f32,
        hue: f32,
        rng: &mut R,
    ) -> Self {
        Self {
            position,
            velocity,
            size,
            hue,
            life: 1.0,
            lifespan: lifespan.max(f32::EPSILON),
            rotation: rng.gen_range(0.0..TAU),
            rotation_speed: rng.gen_range(-0.1..0.1),
            flicker_phase: rng.gen_range(0.0..TAU),
        }
    }
}

impl Transient for Particle {
    fn tick(&mut self, dt: f32) {
        self.velocity.y += PARTICLE_GRAVITY;
        self.velocity = self.velocity * PARTICLE_DAMPING;
        self.position = self.position + self.velocity;
        self.rotation += self.rotation_speed;
        self.life -= dt / self.lifespan;
    }

    fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Bright fast streak with a short fading tail.
#[derive(Debug, Clone)]
pub struct Spark {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub hue: f32,
    pub life: f32,
    /// Oldest first, at most [`SPARK_TRAIL_LEN`] points.
    pub trail: VecDeque<Vec2>,
    pub flicker_speed: f32,
}

impl Spark {
    pub fn new<R: Rng + ?Sized>(
        position: Vec2,
        velocity: Vec2,
        hue: f32,
        size: f32,
        rng: &mut R,
    ) -> Self {
        let mut trail = VecDeque::with_capacity(SPARK_TRAIL_LEN + 1);
        trail.push_back(position);
        Self {
            position,
            velocity,
            size,
            hue,
            life: 1.0,
            trail,
            flicker_speed: rng.gen_range(5.0..15.0),
        }
    }
}

impl Transient for Spark {
    fn tick(&mut self, _dt: f32) {
        self.trail.push_back(self.position);
        if self.trail.len() > SPARK_TRAIL_LEN {
            self.trail.pop_front();
        }
        self.velocity.y += SPARK_GRAVITY;
        self.velocity = self.velocity * SPARK_DAMPING;
        self.position = self.position + self.velocity;
        self.life -= SPARK_DECAY;
    }

    fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Glowing cinder that floats upward with a sideways wobble.
#[derive(Debug, Clone)]
pub struct Ember {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub hue: f32,
    pub life: f32,
    pub wobble: f32,
    pub wobble_speed: f32,
}

impl Ember {
    pub fn new<R: Rng + ?Sized>(position: Vec2, velocity: Vec2, rng: &mut R) -> Self {
        Self {
            position,
            velocity,
            size: rng.gen_range(2.0..6.0),
            hue: rng.gen_range(25.0..55.0),
            life: 1.0,
            wobble: rng.gen_range(0.0..TAU),
            wobble_speed: rng.gen_range(2.0..5.0),
        }
    }
}

impl Transient for Ember {
    fn tick(&mut self, dt: f32) {
        self.wobble += self.wobble_speed * dt;
        self.position.x += self.velocity.x + self.wobble.sin() * EMBER_WOBBLE;
        self.position.y += self.velocity.y;
        self.velocity.y -= EMBER_BUOYANCY;
        self.velocity.x *= EMBER_DRAG;
        self.life -= EMBER_DECAY;
    }

    fn is_alive(&self) -> bool {
        self.life > 0.0 && self.position.y >= EMBER_CEILING
    }
}

/// Static jagged bolt; only its life changes after spawning.
#[derive(Debug, Clone)]
pub struct LightningBolt {
    pub points: Vec<Vec2>,
    pub hue: f32,
    pub life: f32,
}

impl LightningBolt {
    pub fn new<R: Rng + ?Sized>(from: Vec2, to: Vec2, depth: u32, rng: &mut R) -> Self {
        Self {
            points: lightning_path(from, to, depth, rng),
            hue: rng.gen_range(35.0..50.0),
            life: 1.0,
        }
    }
}

impl Transient for LightningBolt {
    fn tick(&mut self, _dt: f32) {
        self.life -= LIGHTNING_DECAY;
    }

    fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Recursive midpoint displacement between two endpoints.
///
/// Returns `2^depth + 1` points starting at `from` and ending at `to`.
pub fn lightning_path<R: Rng + ?Sized>(from: Vec2, to: Vec2, depth: u32, rng: &mut R) -> Vec<Vec2> {
    let mut points = Vec::with_capacity((1usize << depth.min(16)) + 1);
    points.push(from);
    displace(from, to, depth, rng, &mut points);
    points
}

fn displace<R: Rng + ?Sized>(from: Vec2, to: Vec2, depth: u32, rng: &mut R, out: &mut Vec<Vec2>) {
    if depth == 0 {
        out.push(to);
        return;
    }

    let span_x = (to.x - from.x).abs();
    let span_y = (to.y - from.y).abs();
    let mid = from.midpoint(to)
        + Vec2::new(
            (rng.gen::<f32>() - 0.5) * span_x * LIGHTNING_JAGGEDNESS,
            (rng.gen::<f32>() - 0.5) * span_y * LIGHTNING_JAGGEDNESS,
        );

    displace(from, mid, depth - 1, rng, out);
    displace(mid, to, depth - 1, rng, out);
}
