//! Transient entities: pointer bursts, skill waves and highlight sparks.
//!
//! Transients are appended after the persistent block of the entity list and
//! never reuse slots. Each carries a [`Life`](crate::entity::Life) that decays
//! by a fixed amount per tick; expired entries are pruned after the update.
//! The live count is capped, evicting the oldest transients first.
//!
//! | Emission | Spawn | Motion |
//! |----------|-------|--------|
//! | [`Emission::Burst`] | at the pointer | random angle, speed 1–4 |
//! | [`Emission::SkillWave`] | at a skill tag | steered to a target 40–120 away |
//! | [`Emission::Highlight`] | anywhere in the area | random drift |

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::palette::ColorPair;
use crate::profile::{PerformanceLevel, Profile};

/// Input device that triggered a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstSource {
    Mouse,
    Touch,
}

/// Transient tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Life lost per tick.
    pub decay: f32,
    /// Maximum live transients; the oldest are evicted beyond this.
    pub max_live: usize,
    /// Launch speed range of burst entities.
    pub speed: (f32, f32),
    /// Radius range of spawned entities.
    pub radius: (f32, f32),
    /// Burst sizes for mouse clicks `(level >= Mid, below)`.
    pub click_counts: (usize, usize),
    /// Burst sizes for taps `(level >= Mid, below)`.
    pub touch_counts: (usize, usize),
    /// Skill-wave target distance range.
    pub wave_distance: (f32, f32),
    /// Skill-wave sizes for `(level >= Mid, Low, VeryLow)`.
    pub wave_counts: (usize, usize, usize),
    /// Skill value per highlight spark.
    pub highlight_divisor: f32,
    /// Minimum time between skill hover interactions.
    pub hover_cooldown_ms: u32,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            decay: 0.01,
            max_live: 200,
            speed: (1.0, 4.0),
            radius: (1.0, 3.0),
            click_counts: (15, 5),
            touch_counts: (10, 3),
            wave_distance: (40.0, 120.0),
            wave_counts: (30, 15, 5),
            highlight_divisor: 20.0,
            hover_cooldown_ms: 500,
        }
    }
}

impl BurstConfig {
    /// Burst size for a pointer press at `level`.
    pub fn burst_count(&self, source: BurstSource, level: PerformanceLevel) -> usize {
        let (high, low) = match source {
            BurstSource::Mouse => self.click_counts,
            BurstSource::Touch => self.touch_counts,
        };
        if level >= PerformanceLevel::Mid { high } else { low }
    }

    /// Skill-wave size at `level`.
    pub fn wave_count(&self, level: PerformanceLevel) -> usize {
        match level {
            PerformanceLevel::Mid | PerformanceLevel::High => self.wave_counts.0,
            PerformanceLevel::Low => self.wave_counts.1,
            PerformanceLevel::VeryLow => self.wave_counts.2,
        }
    }

    /// Highlight sparks for a skill `value`: `floor(value / divisor) · factor`.
    pub fn highlight_count(&self, value: f32, profile: &Profile) -> usize {
        let steps = (value.max(0.0) / self.highlight_divisor.max(f32::EPSILON)).floor();
        (steps * profile.particle_count_factor).floor() as usize
    }
}

/// One transient spawn request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Emission {
    /// Explosive burst from `origin`.
    Burst { origin: Vec3, count: usize },
    /// Entities steered from `origin` to random targets around it.
    SkillWave { origin: Vec3, count: usize },
    /// Sparks at random positions inside `area` (from the origin).
    Highlight { area: Vec2, count: usize },
}

/// Outcome of an emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub spawned: usize,
    pub evicted: usize,
}

/// Manages the transient tail of an entity list.
#[derive(Debug, Clone)]
pub struct TransientPool {
    config: BurstConfig,
    persistent: usize,
}

impl TransientPool {
    /// Pool over entities past the first `persistent`.
    pub fn new(config: BurstConfig, persistent: usize) -> Self {
        Self { config, persistent }
    }

    pub fn config(&self) -> &BurstConfig {
        &self.config
    }

    /// Number of live transients in `entities`.
    pub fn live(&self, entities: &[Entity]) -> usize {
        entities.len().saturating_sub(self.persistent)
    }

    /// Append the entities for `emission`, then enforce the cap.
    pub fn emit<R: Rng + ?Sized>(
        &self,
        emission: Emission,
        entities: &mut Vec<Entity>,
        colors: ColorPair,
        rng: &mut R,
    ) -> EmitReport {
        let cfg = &self.config;
        let before = entities.len();
        match emission {
            Emission::Burst { origin, count } => {
                for _ in 0..count {
                    let angle = rng.gen_range(0.0..TAU);
                    let speed = rng.gen_range(cfg.speed.0..=cfg.speed.1);
                    let velocity = Vec3::new(angle.cos(), angle.sin(), 0.0) * speed;
                    let radius = rng.gen_range(cfg.radius.0..=cfg.radius.1);
                    entities.push(Entity::transient(origin, velocity, radius, colors.accent, cfg.decay));
                }
            }
            Emission::SkillWave { origin, count } => {
                for _ in 0..count {
                    let angle = rng.gen_range(0.0..TAU);
                    let distance = rng.gen_range(cfg.wave_distance.0..=cfg.wave_distance.1);
                    let target = origin + Vec3::new(angle.cos(), angle.sin(), 0.0) * distance;
                    let radius = rng.gen_range(cfg.radius.0..=cfg.radius.1);
                    let entity = Entity::transient(origin, Vec3::ZERO, radius, colors.accent, cfg.decay)
                        .with_wave_target(target);
                    entities.push(entity);
                }
            }
            Emission::Highlight { area, count } => {
                for _ in 0..count {
                    let position = Vec3::new(rng.gen::<f32>() * area.x, rng.gen::<f32>() * area.y, 0.0);
                    let velocity = Vec3::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5, 0.0) * 2.0;
                    let radius = rng.gen_range(cfg.radius.0..=cfg.radius.1);
                    entities.push(Entity::transient(position, velocity, radius, colors.accent, cfg.decay));
                }
            }
        }

        let spawned = entities.len() - before;
        let evicted = self.enforce_cap(entities);
        EmitReport { spawned, evicted }
    }

    /// Drop the oldest transients beyond `max_live`. Returns how many were dropped.
    pub fn enforce_cap(&self, entities: &mut Vec<Entity>) -> usize {
        let live = self.live(entities);
        if live <= self.config.max_live {
            return 0;
        }
        let excess = live - self.config.max_live;
        entities.drain(self.persistent..self.persistent + excess);
        debug!("evicted {} oldest transient entities (cap {})", excess, self.config.max_live);
        excess
    }

    /// Remove expired transients, keeping the order of the survivors.
    pub fn prune(&self, entities: &mut Vec<Entity>) -> usize {
        let before = entities.len();
        let mut index = 0;
        let persistent = self.persistent;
        entities.retain(|e| {
            let keep = index < persistent || !e.is_expired();
            index += 1;
            keep
        });
        before - entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::DEFAULT_PALETTES;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn persistent(n: usize) -> Vec<Entity> {
        (0..n).map(|_| Entity::new(Vec3::ZERO, 1.0, Vec3::ONE, 1.0)).collect()
    }

    #[test]
    fn test_burst_counts_by_level() {
        let cfg = BurstConfig::default();
        assert_eq!(cfg.burst_count(BurstSource::Mouse, PerformanceLevel::High), 15);
        assert_eq!(cfg.burst_count(BurstSource::Mouse, PerformanceLevel::Low), 5);
        assert_eq!(cfg.burst_count(BurstSource::Touch, PerformanceLevel::Mid), 10);
        assert_eq!(cfg.burst_count(BurstSource::Touch, PerformanceLevel::VeryLow), 3);
        assert_eq!(cfg.wave_count(PerformanceLevel::Low), 15);
    }

    #[test]
    fn test_highlight_count_uses_factor() {
        let cfg = BurstConfig::default();
        assert_eq!(cfg.highlight_count(90.0, &Profile::high()), 4);
        assert_eq!(cfg.highlight_count(90.0, &Profile::mid()), 3);
        assert_eq!(cfg.highlight_count(19.0, &Profile::high()), 0);
    }

    #[test]
    fn test_burst_spawns_after_persistent_block() {
        let mut rng = SmallRng::seed_from_u64(21);
        let pool = TransientPool::new(BurstConfig::default(), 10);
        let mut entities = persistent(10);
        let origin = Vec3::new(50.0, 60.0, 0.0);
        let report = pool.emit(Emission::Burst { origin, count: 15 }, &mut entities, DEFAULT_PALETTES[0], &mut rng);

        assert_eq!(report, EmitReport { spawned: 15, evicted: 0 });
        assert_eq!(pool.live(&entities), 15);
        for e in &entities[10..] {
            assert!(e.is_transient());
            assert_eq!(e.position, origin);
            let speed = e.velocity.length();
            assert!((1.0 - 1e-4..=4.0 + 1e-4).contains(&speed));
        }
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let mut rng = SmallRng::seed_from_u64(22);
        let cfg = BurstConfig { max_live: 20, ..Default::default() };
        let pool = TransientPool::new(cfg, 3);
        let mut entities = persistent(3);

        pool.emit(Emission::Burst { origin: Vec3::X, count: 15 }, &mut entities, DEFAULT_PALETTES[0], &mut rng);
        let report = pool.emit(Emission::Burst { origin: Vec3::Y, count: 15 }, &mut entities, DEFAULT_PALETTES[0], &mut rng);

        assert_eq!(report.evicted, 10);
        assert_eq!(pool.live(&entities), 20);
        // five of the first burst survive, then the whole second burst
        assert!(entities[3..8].iter().all(|e| e.position == Vec3::X));
        assert!(entities[8..].iter().all(|e| e.position == Vec3::Y));
    }

    #[test]
    fn test_prune_after_exact_lifespan() {
        let mut rng = SmallRng::seed_from_u64(23);
        let cfg = BurstConfig { decay: 0.3, ..Default::default() };
        let pool = TransientPool::new(cfg, 2);
        let mut entities = persistent(2);
        pool.emit(Emission::Burst { origin: Vec3::ZERO, count: 4 }, &mut entities, DEFAULT_PALETTES[1], &mut rng);

        for tick in 1..=4 {
            for e in entities.iter_mut() {
                if let Some(life) = e.life.as_mut() {
                    life.tick();
                }
            }
            let removed = pool.prune(&mut entities);
            if tick < 4 {
                assert_eq!(removed, 0, "removed early at tick {tick}");
            } else {
                assert_eq!(removed, 4);
            }
        }
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_skill_wave_targets_in_ring() {
        let mut rng = SmallRng::seed_from_u64(24);
        let pool = TransientPool::new(BurstConfig::default(), 0);
        let mut entities = Vec::new();
        let origin = Vec3::new(200.0, 100.0, 0.0);
        pool.emit(Emission::SkillWave { origin, count: 30 }, &mut entities, DEFAULT_PALETTES[0], &mut rng);
        for e in &entities {
            let d = (e.wave_target.unwrap() - origin).length();
            assert!((40.0 - 1e-3..=120.0 + 1e-3).contains(&d));
        }
    }
}
