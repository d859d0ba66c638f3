//! The simulated entity record.
//!
//! Every particle (or mesh-less point) in the engine is an [`Entity`]. The
//! persistent population is created once at construction; transient entities
//! (bursts, skill waves) carry a [`Life`] and are appended after the
//! persistent block, then pruned when their life runs out.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which part of a composite shape an entity belongs to.
///
/// Assigned by the shape generator and stored on the entity, so the
/// articulation policy never has to re-derive it from position or size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PartKind {
    Body,
    Leg,
    Antenna,
    Wing,
    /// Head, eyes, mandibles and anything not animated separately.
    #[default]
    Other,
}

/// Per-tick life bookkeeping for transient entities.
///
/// Life decays by a fixed amount per tick (not per second). The entity is
/// removed after exactly [`Life::lifespan_ticks`] ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Life {
    decay: f32,
    ticks_lived: u32,
    lifespan: u32,
}

impl Life {
    /// Start a fresh life at 1.0 that loses `decay` every tick.
    pub fn new(decay: f32) -> Self {
        let decay = decay.max(f32::EPSILON);
        Self {
            decay,
            ticks_lived: 0,
            lifespan: Self::lifespan_ticks(decay),
        }
    }

    /// Number of ticks a life decaying by `decay` per tick survives: `ceil(1/decay)`.
    pub fn lifespan_ticks(decay: f32) -> u32 {
        // absorb the f32 representation error of decay (0.01f32 is slightly below 0.01)
        let ticks = (1.0 / decay as f64 - 1e-6).ceil();
        ticks.max(1.0) as u32
    }

    /// Remaining life in `[0, 1]`.
    pub fn value(&self) -> f32 {
        (1.0 - self.ticks_lived as f32 * self.decay).max(0.0)
    }

    /// Age by one tick.
    pub fn tick(&mut self) {
        self.ticks_lived = self.ticks_lived.saturating_add(1);
    }

    pub fn is_expired(&self) -> bool {
        self.ticks_lived >= self.lifespan
    }

    pub fn ticks_lived(&self) -> u32 {
        self.ticks_lived
    }
}

/// One simulated particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Current rendered location.
    pub position: Vec3,
    /// Accumulated impulse, damped every tick.
    pub velocity: Vec3,
    /// Steady-state reference position (the last completed shape target).
    /// `None` for free-floating field entities.
    pub home: Option<Vec3>,
    /// Rendered size this tick.
    pub size: f32,
    /// Size assigned at generation; animated sizes are derived from it.
    pub base_size: f32,
    /// Linear RGB.
    pub color: Vec3,
    /// Rendered opacity this tick.
    pub alpha: f32,
    /// Opacity assigned at creation.
    pub base_alpha: f32,
    /// Per-entity phase for pulsing and float motion.
    pub phase: f32,
    /// Per-entity pulse rate (radians per tick).
    pub pulse_speed: f32,
    pub part: PartKind,
    /// Present only on transient entities.
    pub life: Option<Life>,
    /// One-shot destination for skill-wave entities.
    pub wave_target: Option<Vec3>,
}

impl Entity {
    /// A persistent entity at `position` with no home shape yet.
    pub fn new(position: Vec3, size: f32, color: Vec3, alpha: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            home: None,
            size,
            base_size: size,
            color,
            alpha,
            base_alpha: alpha,
            phase: 0.0,
            pulse_speed: 0.0,
            part: PartKind::Other,
            life: None,
            wave_target: None,
        }
    }

    /// A transient entity with a fresh life.
    pub fn transient(position: Vec3, velocity: Vec3, size: f32, color: Vec3, decay: f32) -> Self {
        Self {
            velocity,
            life: Some(Life::new(decay)),
            ..Self::new(position, size, color, 1.0)
        }
    }

    pub fn with_phase(mut self, phase: f32, pulse_speed: f32) -> Self {
        self.phase = phase;
        self.pulse_speed = pulse_speed;
        self
    }

    pub fn with_wave_target(mut self, target: Vec3) -> Self {
        self.wave_target = Some(target);
        self
    }

    #[inline]
    pub fn is_transient(&self) -> bool {
        self.life.is_some()
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.life.is_some_and(|l| l.is_expired())
    }
}
