//! Longer-lived effect objects: portals opened by drawn circles and shields
//! raised by an open palm. Both feed embers into the shared ember pool while
//! they are alive.

use std::{collections::VecDeque, f32::consts::TAU};

use rand::Rng;

use crate::{
    circle::DetectedCircle,
    entities::{Ember, EntityPool},
    gesture::{Gesture, HandDescriptor},
    landmarks::HandSide,
    Vec2,
};

pub const PORTAL_MIN_RADIUS: f32 = 100.0;
pub const PORTAL_MAX_RADIUS: f32 = 250.0;
const PORTAL_EASE: f32 = 0.08;
const PORTAL_SPIN: f32 = 0.025;
/// Age after which a portal starts fading, in time units.
pub const PORTAL_MATURE_AGE: f32 = 8.0;
const PORTAL_FADE: f32 = 0.015;
const PORTAL_EMBER_CHANCE: f64 = 0.5;
const PORTAL_EMBER_MIN_LIFE: f32 = 0.3;

pub const SHIELD_MIN_SIZE: f32 = 140.0;
const SHIELD_PALM_SCALE: f32 = 2.8;
const SHIELD_SPIN: f32 = 0.05;
const SHIELD_EASE: f32 = 0.3;
const SHIELD_GROW: f32 = 0.2;
const SHIELD_FADE: f32 = 0.06;
const SHIELD_SHRINK: f32 = 0.92;
const SHIELD_INITIAL_LIFE: f32 = 0.8;
/// Shields smaller than this are invisible and count as gone.
pub const SHIELD_MIN_RENDER_SIZE: f32 = 10.0;
const SHIELD_EMBER_CHANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalPhase {
    Growing,
    Steady,
    Fading,
    Gone,
}

#[derive(Debug, Clone)]
pub struct Portal {
    pub center: Vec2,
    pub radius: f32,
    pub target_radius: f32,
    pub rotation: f32,
    pub life: f32,
    pub age: f32,
    /// Decorative offsets for the renderer's glyph rings.
    pub rune_offset: f32,
    pub symbol_offset: f32,
    pub pulse_phase: f32,
}

impl Portal {
    pub fn new<R: Rng + ?Sized>(center: Vec2, radius: f32, rng: &mut R) -> Self {
        Self {
            center,
            radius: 0.0,
            target_radius: radius.clamp(PORTAL_MIN_RADIUS, PORTAL_MAX_RADIUS),
            rotation: 0.0,
            life: 1.0,
            age: 0.0,
            rune_offset: rng.gen_range(0.0..1.0),
            symbol_offset: rng.gen_range(0.0..1.0),
            pulse_phase: rng.gen_range(0.0..TAU),
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, embers: &mut EntityPool<Ember>, rng: &mut R) {
        self.age += dt;
        self.rotation += PORTAL_SPIN;
        self.radius += (self.target_radius - self.radius) * PORTAL_EASE;
        if self.age > PORTAL_MATURE_AGE {
            self.life -= PORTAL_FADE;
        }

        if self.life > PORTAL_EMBER_MIN_LIFE && rng.gen_bool(PORTAL_EMBER_CHANCE) {
            let angle = rng.gen_range(0.0..TAU);
            let direction = Vec2::from_angle(angle);
            let distance = self.radius * rng.gen_range(0.9..1.2);
            let velocity = Vec2::new(
                direction.x * 2.0 + rng.gen_range(-1.0..1.0),
                direction.y * 2.0 - rng.gen_range(0.0..3.0),
            );
            embers.spawn(Ember::new(self.center + direction * distance, velocity, rng));
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn phase(&self) -> PortalPhase {
        if !self.is_alive() {
            PortalPhase::Gone
        } else if self.age > PORTAL_MATURE_AGE {
            PortalPhase::Fading
        } else if self.target_radius - self.radius > 1.0 {
            PortalPhase::Growing
        } else {
            PortalPhase::Steady
        }
    }
}

/// Capacity-bounded portal collection. Overflow evicts the oldest portal at
/// creation time.
#[derive(Debug, Clone)]
pub struct PortalSet {
    portals: VecDeque<Portal>,
    capacity: usize,
}

impl PortalSet {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            portals: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn open<R: Rng + ?Sized>(&mut self, circle: &DetectedCircle, rng: &mut R) {
        if self.portals.len() >= self.capacity {
            self.portals.pop_front();
        }
        let portal = Portal::new(circle.center, circle.radius, rng);
        tracing::debug!(
            x = circle.center.x,
            y = circle.center.y,
            radius = portal.target_radius,
            "portal opened"
        );
        self.portals.push_back(portal);
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, embers: &mut EntityPool<Ember>, rng: &mut R) {
        for portal in &mut self.portals {
            portal.update(dt, embers, rng);
        }
        self.portals.retain(Portal::is_alive);
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Portal> + '_ {
        self.portals.iter()
    }

    pub fn clear(&mut self) {
        self.portals.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldPhase {
    Appearing,
    Active,
    Fading,
    Gone,
}

/// Mandala shield held up by an open palm.
#[derive(Debug, Clone)]
pub struct Shield {
    pub side: HandSide,
    pub center: Vec2,
    pub size: f32,
    pub target_size: f32,
    pub rotation: f32,
    pub life: f32,
    pub active: bool,
    pub pulse_phase: f32,
}

impl Shield {
    /// Starts at half size and mostly visible so it appears without delay.
    pub fn new<R: Rng + ?Sized>(side: HandSide, center: Vec2, size: f32, rng: &mut R) -> Self {
        Self {
            side,
            center,
            size: size * 0.5,
            target_size: size,
            rotation: 0.0,
            life: SHIELD_INITIAL_LIFE,
            active: true,
            pulse_phase: rng.gen_range(0.0..TAU),
        }
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        center: Vec2,
        target_size: f32,
        active: bool,
        embers: &mut EntityPool<Ember>,
        rng: &mut R,
    ) {
        self.center = center;
        self.target_size = target_size;
        self.active = active;
        self.rotation += SHIELD_SPIN;

        if active {
            self.size += (self.target_size - self.size) * SHIELD_EASE;
            self.life = (self.life + SHIELD_GROW).min(1.0);
        } else {
            self.life -= SHIELD_FADE;
            self.size *= SHIELD_SHRINK;
        }

        if active && rng.gen_bool(SHIELD_EMBER_CHANCE) {
            let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
            embers.spawn(Ember::new(
                self.center + direction * (self.size * 0.95),
                Vec2::new(direction.x * 3.0, direction.y * 3.0 - 1.0),
                rng,
            ));
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0 && self.size >= SHIELD_MIN_RENDER_SIZE
    }

    pub fn phase(&self) -> ShieldPhase {
        if !self.is_alive() {
            ShieldPhase::Gone
        } else if !self.active {
            ShieldPhase::Fading
        } else if self.life < 1.0 {
            ShieldPhase::Appearing
        } else {
            ShieldPhase::Active
        }
    }
}

/// Shield size for a hand, scaled by its palm.
pub fn shield_size(palm_size: f32) -> f32 {
    (palm_size * SHIELD_PALM_SCALE).max(SHIELD_MIN_SIZE)
}

/// At most one shield per hand side.
#[derive(Debug, Clone, Default)]
pub struct Shields {
    slots: [Option<Shield>; 2],
}

impl Shields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drives the shield for `side` from this tick's descriptor. Returns
    /// `true` when a fresh shield was raised.
    pub fn drive<R: Rng + ?Sized>(
        &mut self,
        side: HandSide,
        hand: Option<&HandDescriptor>,
        embers: &mut EntityPool<Ember>,
        rng: &mut R,
    ) -> bool {
        let slot = &mut self.slots[side.index()];
        let mut raised = false;

        match hand.filter(|hand| hand.gesture == Gesture::OpenPalm) {
            Some(hand) => {
                let size = shield_size(hand.palm_size);
                match slot.as_mut().filter(|shield| shield.is_alive()) {
                    Some(shield) => shield.update(hand.palm, size, true, embers, rng),
                    None => {
                        tracing::debug!(?side, size, "shield raised");
                        *slot = Some(Shield::new(side, hand.palm, size, rng));
                        raised = true;
                    }
                }
            }
            None => {
                if let Some(shield) = slot.as_mut().filter(|shield| shield.is_alive()) {
                    let (center, size) = (shield.center, shield.size);
                    shield.update(center, size, false, embers, rng);
                }
            }
        }

        if slot.as_ref().is_some_and(|shield| !shield.is_alive()) {
            *slot = None;
        }
        raised
    }

    pub fn get(&self, side: HandSide) -> Option<&Shield> {
        self.slots[side.index()].as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shield> + '_ {
        self.slots.iter().flatten()
    }

    pub fn clear(&mut self) {
        self.slots = [None, None];
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    fn circle(radius: f32) -> DetectedCircle {
        DetectedCircle {
            center: Vec2::new(400.0, 300.0),
            radius,
        }
    }

    fn palm(side: HandSide, gesture: Gesture) -> HandDescriptor {
        HandDescriptor {
            side,
            palm: Vec2::new(500.0, 400.0),
            index_tip: Vec2::new(500.0, 320.0),
            wrist: Vec2::new(500.0, 500.0),
            palm_size: 100.0,
            extended: [true; 5],
            extended_count: 5,
            gesture,
        }
    }

    #[test]
    fn portal_radius_is_clamped() {
        let mut rng = rng();
        assert_eq!(Portal::new(Vec2::ZERO, 40.0, &mut rng).target_radius, 100.0);
        assert_eq!(Portal::new(Vec2::ZERO, 900.0, &mut rng).target_radius, 250.0);
        assert_eq!(Portal::new(Vec2::ZERO, 150.0, &mut rng).target_radius, 150.0);
    }

    #[test]
    fn portal_lifecycle_runs_to_gone() {
        let mut rng = rng();
        let mut embers = EntityPool::with_capacity(150);
        let mut portal = Portal::new(Vec2::new(400.0, 300.0), 150.0, &mut rng);
        assert_eq!(portal.phase(), PortalPhase::Growing);

        let dt = 0.05;
        let mut ticks = 0;
        while portal.age <= PORTAL_MATURE_AGE {
            portal.update(dt, &mut embers, &mut rng);
            ticks += 1;
            if portal.age <= PORTAL_MATURE_AGE {
                assert_eq!(portal.life, 1.0);
            }
        }
        assert!(ticks > 100);
        assert!((portal.radius - 150.0).abs() < 1.0);
        assert_eq!(portal.phase(), PortalPhase::Fading);

        while portal.is_alive() {
            portal.update(dt, &mut embers, &mut rng);
        }
        assert_eq!(portal.phase(), PortalPhase::Gone);
        assert!(!embers.is_empty());
    }

    #[test]
    fn portal_set_evicts_oldest_on_open() {
        let mut rng = rng();
        let mut portals = PortalSet::with_capacity(4);
        for radius in [110.0, 120.0, 130.0, 140.0, 150.0] {
            portals.open(&circle(radius), &mut rng);
        }

        assert_eq!(portals.len(), 4);
        let radii: Vec<f32> = portals.iter().map(|portal| portal.target_radius).collect();
        assert_eq!(radii, vec![120.0, 130.0, 140.0, 150.0]);
    }

    #[test]
    fn portal_set_drops_faded_portals() {
        let mut rng = rng();
        let mut embers = EntityPool::with_capacity(150);
        let mut portals = PortalSet::with_capacity(4);
        portals.open(&circle(150.0), &mut rng);

        for _ in 0..500 {
            portals.update(0.05, &mut embers, &mut rng);
        }
        assert!(portals.is_empty());
    }

    #[test]
    fn shield_raises_then_fades_and_is_recreated() {
        let mut rng = rng();
        let mut embers = EntityPool::with_capacity(150);
        let mut shields = Shields::new();
        let open = palm(HandSide::Left, Gesture::OpenPalm);

        assert!(shields.drive(HandSide::Left, Some(&open), &mut embers, &mut rng));
        let shield = shields.get(HandSide::Left).unwrap();
        assert_eq!(shield.size, 140.0);
        assert_eq!(shield.target_size, 280.0);
        assert_eq!(shield.phase(), ShieldPhase::Appearing);

        assert!(!shields.drive(HandSide::Left, Some(&open), &mut embers, &mut rng));
        let shield = shields.get(HandSide::Left).unwrap();
        assert_eq!(shield.life, 1.0);
        assert_eq!(shield.phase(), ShieldPhase::Active);
        assert!(shields.get(HandSide::Right).is_none());

        let fist = palm(HandSide::Left, Gesture::Fist);
        let mut ticks = 0;
        while shields.get(HandSide::Left).is_some() {
            shields.drive(HandSide::Left, Some(&fist), &mut embers, &mut rng);
            ticks += 1;
            assert!(ticks < 100);
        }
        assert_eq!(ticks, 17);

        assert!(shields.drive(HandSide::Left, Some(&open), &mut embers, &mut rng));
        assert_eq!(shields.get(HandSide::Left).unwrap().life, 0.8);
    }

    #[test]
    fn shield_sheds_embers_only_while_active() {
        let mut rng = rng();
        let mut embers = EntityPool::with_capacity(150);
        let mut shields = Shields::new();
        let open = palm(HandSide::Right, Gesture::OpenPalm);

        shields.drive(HandSide::Right, Some(&open), &mut embers, &mut rng);
        assert!(embers.is_empty());
        for _ in 0..20 {
            shields.drive(HandSide::Right, Some(&open), &mut embers, &mut rng);
        }
        let shed = embers.len();
        assert!(shed > 0 && shed <= 20, "{shed} embers");

        // Spawned on the rim while the shield eases from 140 to 280.
        for ember in embers.iter() {
            let reach = ember.position.distance(open.palm);
            assert!(reach > 0.95 * 140.0 - 1.0 && reach < 0.95 * 280.0 + 1.0, "{reach}");
        }

        while shields.get(HandSide::Right).is_some() {
            shields.drive(HandSide::Right, None, &mut embers, &mut rng);
        }
        assert_eq!(embers.len(), shed);
    }

    #[test]
    fn shield_size_has_floor() {
        assert_eq!(shield_size(10.0), SHIELD_MIN_SIZE);
        assert_eq!(shield_size(100.0), 280.0);
    }
}
