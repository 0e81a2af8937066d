use rand::Rng;

use crate::Vec2;

const FLASH_DECAY: f32 = 0.85;
const SHAKE_DECAY: f32 = 0.88;
/// Shake magnitudes at or below this produce no camera offset.
const SHAKE_THRESHOLD: f32 = 0.5;
const SHAKE_PER_POWER: f32 = 60.0;

/// Monotonic simulation clock. Frame deltas are clamped so a hitch in the
/// frame source cannot destabilise the physics.
#[derive(Debug, Clone)]
pub struct FrameClock {
    pub time_seconds: f32,
    max_step: f32,
}

impl FrameClock {
    pub fn new(max_step: f32) -> Self {
        Self {
            time_seconds: 0.0,
            max_step,
        }
    }

    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
    }

    /// Clamps `delta` into `[0, max_step]`, advances the clock and returns the
    /// step that was applied.
    pub fn advance(&mut self, delta: f32) -> f32 {
        let step = if delta.is_finite() {
            delta.clamp(0.0, self.max_step)
        } else {
            0.0
        };
        self.time_seconds += step;
        step
    }

    pub fn max_step(&self) -> f32 {
        self.max_step
    }
}

/// Screen-wide decaying scalars consumed by the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenEffects {
    pub flash: f32,
    pub shake: f32,
    /// Camera offset sampled for the current tick.
    pub offset: Vec2,
}

impl ScreenEffects {
    pub fn trigger(&mut self, power: f32) {
        self.flash = power;
        self.shake = SHAKE_PER_POWER * power;
    }

    pub fn decay<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.flash *= FLASH_DECAY;
        self.shake *= SHAKE_DECAY;
        self.offset = if self.shake > SHAKE_THRESHOLD {
            let half = self.shake * 0.5;
            Vec2::new(rng.gen_range(-half..half), rng.gen_range(-half..half))
        } else {
            Vec2::ZERO
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
