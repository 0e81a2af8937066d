use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{GestureFxError, Result, Vec2};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewport: ViewportConfig,
    pub pools: PoolConfig,
    pub effects: EffectConfig,
    pub timing: TimingConfig,
}

impl AppConfig {
    /// Parses a configuration from JSON. Missing sections fall back to their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(GestureFxError::InvalidInput(
                "viewport dimensions must be positive",
            ));
        }
        let pools = &self.pools;
        if pools.particles == 0 || pools.sparks == 0 || pools.embers == 0 || pools.lightning == 0 {
            return Err(GestureFxError::InvalidInput(
                "entity pool capacities must be non-zero",
            ));
        }
        if self.effects.max_portals == 0 {
            return Err(GestureFxError::InvalidInput("portal cap must be non-zero"));
        }
        if self.effects.trail_capacity == 0 {
            return Err(GestureFxError::InvalidInput(
                "trail capacity must be non-zero",
            ));
        }
        if !(self.timing.max_step > 0.0) {
            return Err(GestureFxError::InvalidInput("max step must be positive"));
        }
        Ok(())
    }
}

/// Size of the surface landmarks are projected onto, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl ViewportConfig {
    /// Maps a normalized sensor point to viewport pixels. The camera image is
    /// mirrored, so sensor X is flipped.
    pub fn project(&self, point: Vec2) -> Vec2 {
        Vec2::new((1.0 - point.x) * self.width, point.y * self.height)
    }

    /// Inverse of [`ViewportConfig::project`].
    pub fn unproject(&self, point: Vec2) -> Vec2 {
        Vec2::new(1.0 - point.x / self.width, point.y / self.height)
    }
}

/// Hard capacities of the four transient entity pools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub particles: usize,
    pub sparks: usize,
    pub embers: usize,
    pub lightning: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            particles: 300,
            sparks: 200,
            embers: 150,
            lightning: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub max_portals: usize,
    /// Maximum number of fingertip samples kept while drawing a circle.
    pub trail_capacity: usize,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            max_portals: 4,
            trail_capacity: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Upper bound applied to every frame delta before it reaches the physics.
    pub max_step: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { max_step: 0.05 }
    }
}
