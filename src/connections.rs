//! Proximity links between entities and from the pointer.
//!
//! The entity-to-entity pass buckets positions into a [`SpatialGrid`] and
//! emits a line for every pair closer than the connection distance, with
//! opacity `(1 - d/r) · opacity · alpha_a · alpha_b`. It is rate-limited by
//! the profile's redraw interval; between rebuilds the last link set is kept.
//!
//! The pointer pass runs every frame. It links the pointer to entities within
//! its radius (capped by the profile) and nudges every entity inside the
//! radius: a strong pull while pressed, a faint push otherwise.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::forces::PointerSample;
use crate::profile::Profile;
use crate::spatial::SpatialGrid;
use crate::time::IntervalGate;

/// Connection tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Draw entity-to-entity links at all.
    pub enabled: bool,
    pub distance: f32,
    /// Peak opacity of an entity-to-entity link.
    pub opacity: f32,
    pub redraw_interval_ms: u32,
    /// Draw pointer links and apply the pointer nudge.
    pub pointer_links: bool,
    pub pointer_radius: f32,
    pub pressed_radius: f32,
    pub pointer_opacity: f32,
    pub pointer_limit: usize,
    /// Velocity per unit offset toward the pointer while pressed.
    pub pressed_pull: f32,
    /// Velocity per unit offset away from the pointer otherwise.
    pub idle_push: f32,
    pub pointer_color: Vec3,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            distance: 100.0,
            opacity: 0.4,
            redraw_interval_ms: 30,
            pointer_links: true,
            pointer_radius: 100.0,
            pressed_radius: 150.0,
            pointer_opacity: 0.5,
            pointer_limit: 25,
            pressed_pull: 0.02,
            idle_push: 0.001,
            pointer_color: Vec3::ONE,
        }
    }
}

impl ConnectionConfig {
    /// Distances, intervals and limits taken from a performance profile.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            distance: profile.connection_distance,
            redraw_interval_ms: profile.connection_redraw_interval_ms,
            pointer_limit: profile.mouse_connection_limit,
            ..Default::default()
        }
    }
}

/// One line segment ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub from: Vec3,
    pub to: Vec3,
    pub color: Vec3,
    pub alpha: f32,
}

/// Cached link sets and the grid used to build them.
#[derive(Debug, Clone)]
pub struct ConnectionGraph {
    config: ConnectionConfig,
    grid: SpatialGrid,
    gate: IntervalGate,
    positions: Vec<Vec3>,
    links: Vec<Link>,
    pointer_links: Vec<Link>,
}

impl ConnectionGraph {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            grid: SpatialGrid::new(config.distance),
            gate: IntervalGate::new(config.redraw_interval_ms),
            positions: Vec::new(),
            links: Vec::new(),
            pointer_links: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Entity-to-entity links from the last rebuild.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Pointer links from the last pointer pass.
    pub fn pointer_links(&self) -> &[Link] {
        &self.pointer_links
    }

    /// Rebuild the entity links if the redraw interval has passed. Returns
    /// whether a rebuild happened.
    pub fn update(&mut self, entities: &[Entity], now_ms: f64) -> bool {
        if !self.config.enabled {
            self.links.clear();
            return false;
        }
        if !self.gate.ready(now_ms) {
            return false;
        }
        self.rebuild(entities);
        true
    }

    /// Rebuild the entity links unconditionally.
    pub fn rebuild(&mut self, entities: &[Entity]) {
        self.positions.clear();
        self.positions.extend(entities.iter().map(|e| e.position));
        self.grid.rebuild(&self.positions);

        let radius = self.grid.cell_size();
        self.links.clear();
        for pair in self.grid.pairs_within(&self.positions) {
            let (a, b) = (&entities[pair.a], &entities[pair.b]);
            let alpha = (1.0 - pair.distance / radius) * self.config.opacity * a.alpha * b.alpha;
            if alpha > 0.0 {
                self.links.push(Link { from: a.position, to: b.position, color: a.color, alpha });
            }
        }
    }

    /// Link the pointer to nearby entities and nudge them. `k` is the frame
    /// scale (`dt · 60`). Returns the number of links drawn.
    pub fn pointer_pass(&mut self, entities: &mut [Entity], pointer: Option<PointerSample>, k: f32) -> usize {
        self.pointer_links.clear();
        let Some(pointer) = pointer.filter(|_| self.config.pointer_links) else {
            return 0;
        };

        let radius = if pointer.pressed { self.config.pressed_radius } else { self.config.pointer_radius };
        let radius_sq = radius * radius;
        for entity in entities.iter_mut() {
            let offset = (entity.position - pointer.position).truncate();
            let d_sq = offset.length_squared();
            if d_sq >= radius_sq {
                continue;
            }

            if self.pointer_links.len() < self.config.pointer_limit {
                let alpha = (1.0 - d_sq.sqrt() / radius) * entity.alpha * self.config.pointer_opacity;
                self.pointer_links.push(Link {
                    from: pointer.position,
                    to: entity.position,
                    color: self.config.pointer_color,
                    alpha,
                });
            }

            let nudge = if pointer.pressed {
                -offset * self.config.pressed_pull
            } else {
                offset * self.config.idle_push
            };
            entity.velocity += nudge.extend(0.0) * k;
        }
        self.pointer_links.len()
    }
}
