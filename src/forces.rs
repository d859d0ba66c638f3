//! Per-frame force update.
//!
//! Every tick the [`ForceUpdater`] walks the entity set once. Persistent
//! entities get the idle motion of the current shape and are eased back
//! toward an anchor derived from their home position; transient entities
//! ignore the anchor, fade with their life and only feel forces.
//!
//! # Pipeline (per entity)
//!
//! 1. Idle motion: jitter/oscillation, or an animated anchor for the policy
//! 2. Forces: pointer push/pull, flow field, constant drift
//! 3. Integrate, then damp velocity
//! 4. Steer skill-wave entities toward their target
//! 5. Ease toward the anchor (persistent entities only)
//! 6. Boundary: wrap, reflect or ellipse confinement
//! 7. Alpha: pulse for persistent entities, `alpha = life` for transients
//!
//! All per-tick constants are tuned for 60 Hz and scaled by `k = dt·60`, so a
//! zero `dt` leaves the steady state exactly where it is.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, PartKind};
use crate::flow::FlowField;
use crate::shapes::{self, ShapeId, ShapeParams};

/// Reference frame rate the per-tick constants are expressed in.
pub const REFERENCE_FPS: f32 = 60.0;

/// Idle motion selected by the current shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdlePolicy {
    /// Position-phased sinusoidal bob plus jitter, strong pull-back.
    Oscillate,
    /// Per-index phased offsets around home with a size pulse.
    Undulate,
    /// Home follows the animated wave height field.
    Ripple,
    /// Per-part motion for composite creatures.
    Articulate,
    /// Free entities pushed by the flow field.
    Flow,
    /// Free entities on a slow phased circular drift.
    Wander,
}

impl IdlePolicy {
    /// Default policy for a shape.
    pub fn for_shape(shape: ShapeId) -> Self {
        match shape {
            ShapeId::Ribbon => IdlePolicy::Undulate,
            ShapeId::Wave => IdlePolicy::Ripple,
            ShapeId::Bug => IdlePolicy::Articulate,
            ShapeId::Sphere | ShapeId::Cube | ShapeId::Helix | ShapeId::Constellation => {
                IdlePolicy::Oscillate
            }
        }
    }

    /// Per-tick fraction of the distance to the anchor that is closed.
    pub fn pull_strength(&self) -> f32 {
        match self {
            IdlePolicy::Oscillate => 0.03,
            IdlePolicy::Undulate | IdlePolicy::Ripple | IdlePolicy::Articulate => 0.25,
            IdlePolicy::Flow | IdlePolicy::Wander => 0.0,
        }
    }
}

/// Pointer attraction/repulsion. A zero strength disables it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerForce {
    pub radius: f32,
    pub strength: f32,
}

impl Default for PointerForce {
    fn default() -> Self {
        Self { radius: 100.0, strength: 0.0 }
    }
}

impl PointerForce {
    /// Velocity delta for an entity at `position`. Pushes away, or pulls in
    /// while `pressed`, scaled by `(radius - distance) / radius`.
    pub fn impulse(&self, position: Vec3, pointer: Vec3, pressed: bool) -> Vec3 {
        if self.strength == 0.0 || self.radius <= 0.0 {
            return Vec3::ZERO;
        }
        let offset = position - pointer;
        let distance = offset.length();
        if distance >= self.radius || distance <= f32::EPSILON {
            return Vec3::ZERO;
        }
        let magnitude = (self.radius - distance) / self.radius * self.strength;
        let away = offset / distance * magnitude;
        if pressed { -away } else { away }
    }
}

/// Ellipse confinement with pulsing radii.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipseBounds {
    pub center: Vec2,
    pub radii: Vec2,
    /// Radius pulse rate in radians per second.
    pub pulse_speed: f32,
    /// Relative radius swing.
    pub pulse_amount: f32,
    /// Normalized distance where the soft inward force starts.
    pub soft_edge: f32,
    pub soft_force: f32,
    /// Normalized distance entities are clamped back to past the edge.
    pub clamp_to: f32,
    /// Velocity factor applied when clamped.
    pub bounce: f32,
}

impl Default for EllipseBounds {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            radii: Vec2::ONE,
            pulse_speed: 0.8,
            pulse_amount: 0.08,
            soft_edge: 0.85,
            soft_force: 0.05,
            clamp_to: 0.98,
            bounce: -0.5,
        }
    }
}

impl EllipseBounds {
    /// Ellipse inscribed in a `width × height` viewport (0.45w × 0.48h radii).
    pub fn for_viewport(width: f32, height: f32) -> Self {
        Self {
            center: Vec2::new(width * 0.5, height * 0.5),
            radii: Vec2::new(width * 0.45, height * 0.48),
            ..Default::default()
        }
    }

    /// Radii at `time` seconds.
    pub fn radii_at(&self, time: f32) -> Vec2 {
        self.radii * (1.0 + (time * self.pulse_speed).sin() * self.pulse_amount)
    }

    fn apply(&self, entity: &mut Entity, time: f32, k: f32) {
        let radii = self.radii_at(time).max(Vec2::splat(f32::EPSILON));
        let offset = entity.position.truncate() - self.center;
        let normalized = (offset / radii).length();
        let angle = offset.y.atan2(offset.x);
        let dir = Vec2::new(angle.cos(), angle.sin());

        if normalized > self.soft_edge {
            let force = (normalized - self.soft_edge) * self.soft_force * k;
            entity.velocity -= (dir * force).extend(0.0);
        }
        if normalized > 1.0 {
            let clamped = self.center + dir * radii * self.clamp_to;
            entity.position.x = clamped.x;
            entity.position.y = clamped.y;
            entity.velocity *= self.bounce;
        }
    }
}

/// Domain boundary handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    None,
    /// Toroidal wrap on the xy plane with a margin outside the area.
    Wrap { min: Vec2, max: Vec2, buffer: f32 },
    /// Reflect off the box faces, scaling the normal velocity by `restitution`.
    Reflect { min: Vec3, max: Vec3, restitution: f32 },
    Ellipse(EllipseBounds),
}

impl Boundary {
    /// Wrap over a `width × height` viewport with a 10 px margin.
    pub fn wrap_viewport(width: f32, height: f32) -> Self {
        Boundary::Wrap { min: Vec2::ZERO, max: Vec2::new(width, height), buffer: 10.0 }
    }

    /// Re-fit a viewport-relative boundary after a resize.
    pub fn resized(self, width: f32, height: f32) -> Self {
        match self {
            Boundary::Wrap { buffer, .. } => Boundary::Wrap { min: Vec2::ZERO, max: Vec2::new(width, height), buffer },
            Boundary::Ellipse(e) => {
                let fitted = EllipseBounds::for_viewport(width, height);
                Boundary::Ellipse(EllipseBounds { center: fitted.center, radii: fitted.radii, ..e })
            }
            other => other,
        }
    }

    fn apply(&self, entity: &mut Entity, time: f32, k: f32) {
        match self {
            Boundary::None => {}
            Boundary::Wrap { min, max, buffer } => {
                let p = &mut entity.position;
                if p.x < min.x - buffer {
                    p.x = max.x + buffer;
                } else if p.x > max.x + buffer {
                    p.x = min.x - buffer;
                }
                if p.y < min.y - buffer {
                    p.y = max.y + buffer;
                } else if p.y > max.y + buffer {
                    p.y = min.y - buffer;
                }
            }
            Boundary::Reflect { min, max, restitution } => {
                for axis in 0..3 {
                    if entity.position[axis] < min[axis] {
                        entity.position[axis] = min[axis];
                        entity.velocity[axis] = entity.velocity[axis].abs() * restitution;
                    } else if entity.position[axis] > max[axis] {
                        entity.position[axis] = max[axis];
                        entity.velocity[axis] = -entity.velocity[axis].abs() * restitution;
                    }
                }
            }
            Boundary::Ellipse(ellipse) => ellipse.apply(entity, time, k),
        }
    }
}

/// Force constants shared by every policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Velocity retained per 60 Hz tick.
    pub damping: f32,
    /// Overrides the policy's pull strength.
    pub pull: Option<f32>,
    /// Constant velocity added per tick.
    pub drift: Vec3,
    pub pointer: PointerForce,
    /// Fraction of the distance to a skill-wave target closed per tick.
    pub wave_steer: f32,
    /// Amplitude of the wander drift per tick.
    pub wander: f32,
    /// Alpha swing of pulsing entities.
    pub alpha_pulse: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            damping: 0.99,
            pull: None,
            drift: Vec3::ZERO,
            pointer: PointerForce::default(),
            wave_steer: 0.03,
            wander: 0.2,
            alpha_pulse: 0.1,
        }
    }
}

/// Pointer state as seen by the simulation, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Vec3,
    pub pressed: bool,
}

/// Everything a tick needs besides the entities.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    /// Simulation time in seconds.
    pub time: f32,
    /// Seconds since the previous tick (already clamped by the clock).
    pub dt: f32,
    pub pointer: Option<PointerSample>,
    pub flow: Option<&'a FlowField>,
}

/// Applies idle motion, forces and boundaries.
#[derive(Debug, Clone)]
pub struct ForceUpdater {
    config: ForceConfig,
    policy: IdlePolicy,
    boundary: Boundary,
    shape: ShapeParams,
    flow_force: f32,
    wave_multiplier: f32,
}

impl ForceUpdater {
    pub fn new(config: ForceConfig, policy: IdlePolicy, boundary: Boundary, shape: ShapeParams) -> Self {
        Self {
            config,
            policy,
            boundary,
            shape,
            flow_force: 0.01,
            wave_multiplier: 5.0,
        }
    }

    /// Flow force per tick and the skill-wave multiplier.
    pub fn with_flow(mut self, force: f32, wave_multiplier: f32) -> Self {
        self.flow_force = force;
        self.wave_multiplier = wave_multiplier;
        self
    }

    #[inline]
    pub fn policy(&self) -> IdlePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: IdlePolicy) {
        self.policy = policy;
    }

    #[inline]
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.boundary = boundary;
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Run one tick over `entities`.
    pub fn update<R: Rng + ?Sized>(&self, entities: &mut [Entity], frame: &FrameInputs<'_>, rng: &mut R) {
        let k = (frame.dt * REFERENCE_FPS).max(0.0);
        let damping = self.config.damping.clamp(0.0, 1.0).powf(k);
        let pull = frame_fraction(self.config.pull.unwrap_or_else(|| self.policy.pull_strength()), k);
        let steer = frame_fraction(self.config.wave_steer, k);

        for (i, entity) in entities.iter_mut().enumerate() {
            let anchor = if entity.is_transient() {
                None
            } else {
                self.idle_motion(i, entity, frame.time, k, rng)
            };

            // forces
            let mut impulse = self.config.drift;
            if let Some(pointer) = frame.pointer {
                impulse += self.config.pointer.impulse(entity.position, pointer.position, pointer.pressed);
            }
            if let Some(flow) = frame.flow {
                if entity.is_transient() || self.policy == IdlePolicy::Flow {
                    let strength = if entity.wave_target.is_some() {
                        self.flow_force * self.wave_multiplier
                    } else {
                        self.flow_force
                    };
                    impulse += flow.force_at(entity.position.truncate(), strength).extend(0.0);
                }
            }
            entity.velocity += impulse * k;

            entity.position += entity.velocity * k;
            entity.velocity *= damping;

            if let Some(target) = entity.wave_target {
                entity.position += (target - entity.position) * steer;
            }

            if let Some(anchor) = anchor {
                entity.position += (anchor - entity.position) * pull;
            }

            self.boundary.apply(entity, frame.time, k);

            match &mut entity.life {
                Some(life) => {
                    life.tick();
                    entity.alpha = life.value();
                }
                None if entity.pulse_speed > 0.0 => {
                    let swing = (frame.time * entity.pulse_speed + entity.phase).sin() * self.config.alpha_pulse;
                    entity.alpha = (entity.base_alpha + swing).max(0.0);
                }
                None => {}
            }
        }
    }

    /// Apply the policy's direct motion and return the anchor to ease toward.
    fn idle_motion<R: Rng + ?Sized>(
        &self,
        index: usize,
        entity: &mut Entity,
        time: f32,
        k: f32,
        rng: &mut R,
    ) -> Option<Vec3> {
        match self.policy {
            IdlePolicy::Oscillate => {
                let home = entity.home?;
                let factor = (time * 0.5 + entity.position.x * 0.1).sin() * 0.05;
                let jitter = Vec3::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * 0.01;
                entity.position += (jitter + Vec3::new(0.0, factor, 0.0)) * k;
                Some(home)
            }
            IdlePolicy::Undulate => {
                let home = entity.home?;
                let phase = index as f32 * 0.01;
                let offset = Vec3::new(
                    (time * 0.5 + phase).sin(),
                    (time * 0.4 + phase).cos(),
                    (time * 0.3 + phase).sin(),
                ) * 0.05;
                entity.size = entity.base_size * ((time + index as f32 * 0.1).sin() * 0.2 + 1.0);
                Some(home + offset)
            }
            IdlePolicy::Ripple => {
                let home = entity.home?;
                let y = shapes::wave_height(home.x, home.z, time * 1.5, &self.shape) + self.shape.y_offset;
                Some(Vec3::new(home.x, y, home.z))
            }
            IdlePolicy::Articulate => {
                let home = entity.home?;
                Some(self.articulate(home, entity.part, time, rng))
            }
            IdlePolicy::Wander => {
                let phase = time * 0.5 + entity.phase;
                let drift = Vec3::new(phase.sin(), phase.cos(), 0.0) * self.config.wander;
                entity.position += drift * k;
                None
            }
            IdlePolicy::Flow => None,
        }
    }

    fn articulate<R: Rng + ?Sized>(&self, home: Vec3, part: PartKind, time: f32, rng: &mut R) -> Vec3 {
        let scale = self.shape.scale.max(f32::EPSILON);
        match part {
            PartKind::Body => {
                let breath = (time * 1.5).sin() * 0.03 + 1.0;
                let bob = (time * 0.8).sin() * 0.05;
                Vec3::new(home.x * breath, home.y + bob, home.z)
            }
            PartKind::Leg => {
                let stride = (time * 2.0 + home.x * 2.0).cos() * 0.1;
                Vec3::new(home.x, home.y, home.z + stride)
            }
            PartKind::Antenna => {
                let wiggle = (time * 3.0 + home.z).sin() * 0.15 * (home.z / (7.0 * scale));
                Vec3::new(home.x + wiggle, home.y, home.z)
            }
            PartKind::Wing => {
                if flutter_active(time) {
                    Vec3::new(home.x, home.y + (time * 5.0).sin() * 0.12, home.z)
                } else {
                    home
                }
            }
            PartKind::Other => {
                let jitter = Vec3::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5);
                home + jitter * 0.02
            }
        }
    }
}

/// Per-tick fraction `p` stretched over `k` reference ticks: `1 - (1 - p)^k`.
#[inline]
pub fn frame_fraction(p: f32, k: f32) -> f32 {
    1.0 - (1.0 - p.clamp(0.0, 1.0)).powf(k.max(0.0))
}

/// Wings flutter during the first third of every 10 s cycle.
#[inline]
fn flutter_active(time: f32) -> bool {
    (time * 0.3).floor().rem_euclid(3.0) == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowConfig;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn settled(n: usize) -> Vec<Entity> {
        (0..n)
            .map(|i| {
                let home = Vec3::new(i as f32 * 0.5 - 5.0, 6.0, (i as f32 * 0.3).sin() * 4.0);
                let mut e = Entity::new(home, 1.0, Vec3::ONE, 1.0);
                e.home = Some(home);
                e.part = match i % 5 {
                    0 => PartKind::Body,
                    1 => PartKind::Leg,
                    2 => PartKind::Antenna,
                    3 => PartKind::Wing,
                    _ => PartKind::Other,
                };
                e
            })
            .collect()
    }

    fn frame(time: f32, dt: f32) -> FrameInputs<'static> {
        FrameInputs { time, dt, pointer: None, flow: None }
    }

    #[test]
    fn test_zero_dt_freezes_every_policy() {
        let mut rng = SmallRng::seed_from_u64(11);
        for policy in [
            IdlePolicy::Oscillate,
            IdlePolicy::Undulate,
            IdlePolicy::Ripple,
            IdlePolicy::Articulate,
            IdlePolicy::Flow,
            IdlePolicy::Wander,
        ] {
            let updater = ForceUpdater::new(ForceConfig::default(), policy, Boundary::None, ShapeParams::default());
            let mut entities = settled(40);
            let before: Vec<Vec3> = entities.iter().map(|e| e.position).collect();
            for _ in 0..100 {
                updater.update(&mut entities, &frame(3.7, 0.0), &mut rng);
            }
            for (e, b) in entities.iter().zip(&before) {
                assert_eq!(e.position, *b, "{policy:?} drifted at dt=0");
            }
        }
    }

    #[test]
    fn test_oscillation_stays_bounded_near_home() {
        let mut rng = SmallRng::seed_from_u64(12);
        let updater = ForceUpdater::new(ForceConfig::default(), IdlePolicy::Oscillate, Boundary::None, ShapeParams::default());
        let mut entities = settled(50);
        let dt = 1.0 / 60.0;
        for step in 0..2000 {
            updater.update(&mut entities, &frame(step as f32 * dt, dt), &mut rng);
        }
        for e in &entities {
            let home = e.home.unwrap();
            assert!((e.position - home).length() < 2.0, "drifted {:?}", e.position - home);
        }
    }

    #[test]
    fn test_ribbon_sizes_pulse_around_base() {
        let mut rng = SmallRng::seed_from_u64(14);
        let updater = ForceUpdater::new(ForceConfig::default(), IdlePolicy::Undulate, Boundary::None, ShapeParams::default());
        let mut entities = settled(30);
        for e in entities.iter_mut().step_by(2) {
            e.base_size = 2.0;
        }

        for time in [0.0, 1.3, 4.2] {
            updater.update(&mut entities, &frame(time, 1.0 / 60.0), &mut rng);
            for (i, e) in entities.iter().enumerate() {
                let expected = e.base_size * ((time + i as f32 * 0.1).sin() * 0.2 + 1.0);
                assert!((e.size - expected).abs() < 1e-5, "entity {i} at t={time}: {} vs {expected}", e.size);
                assert!(e.size >= e.base_size * 0.8 - 1e-5 && e.size <= e.base_size * 1.2 + 1e-5);
            }
        }

        // without a home there is nothing to undulate around
        let mut loose = vec![Entity::new(Vec3::ZERO, 1.5, Vec3::ONE, 1.0)];
        updater.update(&mut loose, &frame(0.7, 1.0 / 60.0), &mut rng);
        assert_eq!(loose[0].size, 1.5);
    }

    #[test]
    fn test_pointer_pushes_away_and_pulls_when_pressed() {
        let force = PointerForce { radius: 10.0, strength: 1.0 };
        let away = force.impulse(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO, false);
        assert!(away.x > 0.0);
        assert!((away.x - 0.5).abs() < 1e-6);
        let toward = force.impulse(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO, true);
        assert!(toward.x < 0.0);
        assert_eq!(force.impulse(Vec3::new(11.0, 0.0, 0.0), Vec3::ZERO, false), Vec3::ZERO);
        assert_eq!(force.impulse(Vec3::ZERO, Vec3::ZERO, false), Vec3::ZERO);
    }

    #[test]
    fn test_transient_fades_and_ignores_pull() {
        let mut rng = SmallRng::seed_from_u64(13);
        let updater = ForceUpdater::new(ForceConfig::default(), IdlePolicy::Oscillate, Boundary::None, ShapeParams::default());
        let mut burst = vec![Entity::transient(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 2.0, Vec3::ONE, 0.25)];
        burst[0].home = Some(Vec3::new(-100.0, 0.0, 0.0));

        let mut last_x = 0.0;
        for tick in 1..=4 {
            updater.update(&mut burst, &frame(0.0, 1.0 / 60.0), &mut rng);
            let e = &burst[0];
            assert!(e.position.x > last_x, "transient was pulled toward home");
            last_x = e.position.x;
            assert!((e.alpha - (1.0 - 0.25 * tick as f32)).abs() < 1e-5);
        }
        assert!(burst[0].is_expired());
    }

    #[test]
    fn test_wrap_boundary_with_buffer() {
        let boundary = Boundary::wrap_viewport(100.0, 50.0);
        let mut e = Entity::new(Vec3::new(111.0, -11.0, 0.0), 1.0, Vec3::ONE, 1.0);
        boundary.apply(&mut e, 0.0, 1.0);
        assert_eq!(e.position.x, -10.0);
        assert_eq!(e.position.y, 60.0);
    }

    #[test]
    fn test_reflect_boundary_flips_velocity() {
        let boundary = Boundary::Reflect { min: Vec3::splat(-1.0), max: Vec3::splat(1.0), restitution: 0.5 };
        let mut e = Entity::new(Vec3::new(1.5, 0.0, 0.0), 1.0, Vec3::ONE, 1.0);
        e.velocity = Vec3::new(2.0, 0.0, 0.0);
        boundary.apply(&mut e, 0.0, 1.0);
        assert_eq!(e.position.x, 1.0);
        assert_eq!(e.velocity.x, -1.0);
    }

    #[test]
    fn test_ellipse_clamps_escapees() {
        let ellipse = EllipseBounds { pulse_amount: 0.0, ..EllipseBounds::for_viewport(200.0, 100.0) };
        let boundary = Boundary::Ellipse(ellipse);
        let mut e = Entity::new(Vec3::new(250.0, 50.0, 0.0), 1.0, Vec3::ONE, 1.0);
        e.velocity = Vec3::new(4.0, 0.0, 0.0);
        boundary.apply(&mut e, 0.0, 1.0);
        assert!((e.position.x - (100.0 + 90.0 * 0.98)).abs() < 1e-3);
        assert!(e.velocity.x < 0.0);
    }

    #[test]
    fn test_flow_policy_moves_free_entities() {
        let mut rng = SmallRng::seed_from_u64(14);
        let mut field = FlowField::new(400.0, 400.0, FlowConfig::default());
        field.update();
        let updater = ForceUpdater::new(ForceConfig::default(), IdlePolicy::Flow, Boundary::wrap_viewport(400.0, 400.0), ShapeParams::default());
        let mut entities = vec![Entity::new(Vec3::new(210.0, 190.0, 0.0), 1.0, Vec3::ONE, 1.0)];
        let frame = FrameInputs { time: 0.0, dt: 1.0 / 60.0, pointer: None, flow: Some(&field) };
        updater.update(&mut entities, &frame, &mut rng);
        assert!(entities[0].velocity.length() > 0.0);
    }

    #[test]
    fn test_articulated_legs_walk_along_z() {
        let mut rng = SmallRng::seed_from_u64(15);
        let updater = ForceUpdater::new(ForceConfig::default(), IdlePolicy::Articulate, Boundary::None, ShapeParams::default());
        let home = Vec3::new(3.0, 4.0, 1.0);
        let anchor = updater.articulate(home, PartKind::Leg, 0.7, &mut rng);
        assert_eq!(anchor.x, home.x);
        assert_eq!(anchor.y, home.y);
        assert!((anchor.z - (home.z + (1.4f32 + 6.0).cos() * 0.1)).abs() < 1e-6);
    }

    #[test]
    fn test_policy_for_shape() {
        assert_eq!(IdlePolicy::for_shape(ShapeId::Helix), IdlePolicy::Oscillate);
        assert_eq!(IdlePolicy::for_shape(ShapeId::Ribbon), IdlePolicy::Undulate);
        assert_eq!(IdlePolicy::for_shape(ShapeId::Bug), IdlePolicy::Articulate);
        assert_eq!(IdlePolicy::for_shape(ShapeId::Wave), IdlePolicy::Ripple);
    }
}
