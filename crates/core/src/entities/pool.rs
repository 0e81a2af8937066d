use std::collections::VecDeque;

use crate::PoolConfig;

use super::{Ember, EntityKind, LightningBolt, Particle, Spark, Transient, TransientEntity};

/// Fixed-capacity FIFO collection of one entity kind.
///
/// Inserting into a full pool evicts the oldest entity regardless of how much
/// life either entity has left, so spawning stays O(1).
#[derive(Debug, Clone)]
pub struct EntityPool<T> {
    entities: VecDeque<T>,
    capacity: usize,
    evicted: u64,
}

impl<T: Transient> EntityPool<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entities: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Inserts `entity`, returning the entity evicted to make room, if any.
    pub fn spawn(&mut self, entity: T) -> Option<T> {
        let evicted = if self.entities.len() >= self.capacity {
            self.evicted += 1;
            self.entities.pop_front()
        } else {
            None
        };
        self.entities.push_back(entity);
        evicted
    }

    /// Advances every entity and drops the ones that died this tick.
    pub fn tick(&mut self, dt: f32) {
        for entity in &mut self.entities {
            entity.tick(dt);
        }
        self.entities.retain(|entity| entity.is_alive());
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of entities displaced by capacity pressure.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entities.iter()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

/// The four transient pools of a simulation.
#[derive(Debug, Clone)]
pub struct EntityPools {
    pub particles: EntityPool<Particle>,
    pub sparks: EntityPool<Spark>,
    pub embers: EntityPool<Ember>,
    pub lightning: EntityPool<LightningBolt>,
}

impl EntityPools {
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            particles: EntityPool::with_capacity(config.particles),
            sparks: EntityPool::with_capacity(config.sparks),
            embers: EntityPool::with_capacity(config.embers),
            lightning: EntityPool::with_capacity(config.lightning),
        }
    }

    /// Routes an entity to the pool for its variant.
    pub fn spawn(&mut self, entity: TransientEntity) {
        let kind = entity.kind();
        let evicted = match entity {
            TransientEntity::Particle(particle) => self.particles.spawn(particle).is_some(),
            TransientEntity::Spark(spark) => self.sparks.spawn(spark).is_some(),
            TransientEntity::Ember(ember) => self.embers.spawn(ember).is_some(),
            TransientEntity::Lightning(bolt) => self.lightning.spawn(bolt).is_some(),
        };
        if evicted {
            tracing::trace!(?kind, "pool full, evicted oldest entity");
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.particles.tick(dt);
        self.sparks.tick(dt);
        self.embers.tick(dt);
        self.lightning.tick(dt);
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Particle => self.particles.len(),
            EntityKind::Spark => self.sparks.len(),
            EntityKind::Ember => self.embers.len(),
            EntityKind::Lightning => self.lightning.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.particles.len() + self.sparks.len() + self.embers.len() + self.lightning.len()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.sparks.clear();
        self.embers.clear();
        self.lightning.clear();
    }
}
