//! Engine configuration and section presets.
//!
//! One [`EngineConfig`] describes a complete animated section. The presets
//! reproduce the four decorative sections the engine was built for:
//!
//! | Preset | Entities | Motion | Extras |
//! |--------|----------|--------|--------|
//! | [`hero`](EngineConfig::hero) | 2000 | shape morphing, ribbon first | orbit drag |
//! | [`skills`](EngineConfig::skills) | from profile | flow field + drift | bursts, links, pointer links |
//! | [`about`](EngineConfig::about) | 60 | wander in a pulsing ellipse | faint links, alpha pulse |
//! | [`ambient`](EngineConfig::ambient) | 0 | floating meshes | scene spin |
//!
//! Configs round-trip through JSON so tuned variants can be shipped as data:
//!
//! ```ignore
//! let config = EngineConfig::from_json(&std::fs::read_to_string("skills.json")?)?;
//! let engine = Engine::new(config, backend)?;
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ambient::AmbientConfig;
use crate::burst::BurstConfig;
use crate::camera::{Camera, OrbitConfig};
use crate::connections::ConnectionConfig;
use crate::easing::Easing;
use crate::error::EngineError;
use crate::flow::{FlowConfig, FlowRefresh};
use crate::forces::{Boundary, EllipseBounds, ForceConfig, IdlePolicy, PointerForce};
use crate::palette::{ColorPair, DEFAULT_PALETTES};
use crate::profile::{classify_device, DeviceSignals, Profile};
use crate::shapes::{ShapeId, ShapeParams};
use crate::transition::DEFAULT_DURATION;

/// Where persistent entities start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnRegion {
    /// Uniform in a box around `center`.
    Box { center: Vec3, half_extent: Vec3 },
    /// Uniform over the container, z = 0.
    Viewport,
    /// Inside the ellipse fitted to the container, out to `fill` of its radii.
    Ellipse { fill: f32 },
}

/// Initial state of persistent entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub region: SpawnRegion,
    pub size: (f32, f32),
    pub alpha: (f32, f32),
    /// Initial velocity components are drawn from `±speed / 2`.
    pub speed: f32,
    /// Alpha pulse speed range in rad/s; `None` disables pulsing.
    pub pulse_speed: Option<(f32, f32)>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            region: SpawnRegion::Viewport,
            size: (1.0, 3.0),
            alpha: (0.5, 1.0),
            speed: 1.0,
            pulse_speed: None,
        }
    }
}

/// Everything needed to build an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Label used in log lines.
    pub name: String,
    pub profile: Profile,
    /// Persistent entity budget.
    pub particle_count: usize,
    pub spawn: SpawnConfig,
    pub shape: ShapeParams,
    /// Shape requested when the engine first becomes visible.
    pub initial_shape: Option<ShapeId>,
    pub transition_duration: f32,
    /// Curve the transition eases along.
    pub transition_easing: Easing,
    /// Fixed idle policy; `None` follows the current shape.
    pub idle_policy: Option<IdlePolicy>,
    pub forces: ForceConfig,
    pub boundary: Boundary,
    pub flow: Option<FlowConfig>,
    pub connections: ConnectionConfig,
    pub bursts: BurstConfig,
    /// Spawn a burst on every pointer press.
    pub pointer_bursts: bool,
    pub orbit: OrbitConfig,
    pub camera: Camera,
    pub ambient: Option<AmbientConfig>,
    pub palettes: Vec<ColorPair>,
    /// Multiplier from entity size to drawn sprite radius.
    pub point_scale: f32,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::skills(&Profile::default())
    }
}

impl EngineConfig {
    // ========== Presets ==========

    /// 3D morphing point cloud. Narrow containers get a smaller, lower shape.
    pub fn hero(signals: &DeviceSignals) -> Self {
        let narrow = signals.is_narrow();
        let shape = ShapeParams {
            scale: if narrow { 1.0 } else { 1.7 },
            y_offset: if narrow { 7.0 } else { 6.0 },
            ..Default::default()
        };
        Self {
            name: "hero".into(),
            profile: Profile { enable_mouse_glow: false, enable_particle_glow: false, ..classify_device(signals) },
            particle_count: 2000,
            spawn: SpawnConfig {
                region: SpawnRegion::Box { center: shape.center(), half_extent: Vec3::splat(15.0) },
                size: (0.5, 2.5),
                alpha: (0.85, 0.85),
                speed: 0.0,
                pulse_speed: None,
            },
            shape,
            initial_shape: Some(ShapeId::Ribbon),
            transition_duration: DEFAULT_DURATION,
            transition_easing: Easing::Quint,
            idle_policy: None,
            forces: ForceConfig {
                pointer: PointerForce { radius: 4.0, strength: 0.01 },
                ..Default::default()
            },
            boundary: Boundary::None,
            flow: None,
            connections: ConnectionConfig { enabled: false, pointer_links: false, ..Default::default() },
            bursts: BurstConfig::default(),
            pointer_bursts: false,
            orbit: OrbitConfig::default(),
            camera: Camera::perspective(75.0, 30.0),
            ambient: None,
            palettes: DEFAULT_PALETTES.to_vec(),
            point_scale: 0.25,
            seed: 0x6d6f_7270,
        }
    }

    /// 2D flow-field canvas with bursts, proximity links and pointer links.
    pub fn skills(profile: &Profile) -> Self {
        Self {
            name: "skills".into(),
            profile: profile.clone(),
            particle_count: profile.particle_count,
            spawn: SpawnConfig {
                region: SpawnRegion::Viewport,
                size: (1.0, profile.max_radius.max(1.0)),
                alpha: (0.5, 1.0),
                speed: 1.0,
                pulse_speed: None,
            },
            shape: ShapeParams::default(),
            initial_shape: None,
            transition_duration: DEFAULT_DURATION,
            transition_easing: Easing::Quint,
            idle_policy: Some(IdlePolicy::Flow),
            forces: ForceConfig {
                drift: Vec3::new(0.0, 0.005, 0.0),
                pointer: PointerForce { radius: 100.0, strength: 0.0 },
                ..Default::default()
            },
            boundary: Boundary::wrap_viewport(800.0, 600.0),
            flow: Some(FlowConfig { refresh: FlowRefresh::for_level(profile.level), ..Default::default() }),
            connections: ConnectionConfig::from_profile(profile),
            bursts: BurstConfig::default(),
            pointer_bursts: true,
            orbit: OrbitConfig { enabled: false, ..Default::default() },
            camera: Camera::screen(),
            ambient: None,
            palettes: DEFAULT_PALETTES.to_vec(),
            point_scale: 1.0,
            seed: 0x736b_696c,
        }
    }

    /// 2D wandering field inside a pulsing ellipse, drawn at about 30 fps.
    pub fn about() -> Self {
        let profile = Profile {
            particle_count: 60,
            connection_distance: 100.0,
            connection_redraw_interval_ms: 0,
            min_frame_interval_ms: 33,
            ..Profile::default()
        };
        Self {
            name: "about".into(),
            particle_count: profile.particle_count,
            spawn: SpawnConfig {
                region: SpawnRegion::Ellipse { fill: 0.7 },
                size: (1.0, 3.0),
                alpha: (0.3, 0.7),
                speed: 0.8,
                pulse_speed: Some((8.0, 23.0)),
            },
            shape: ShapeParams::default(),
            initial_shape: None,
            transition_duration: DEFAULT_DURATION,
            transition_easing: Easing::Quint,
            idle_policy: Some(IdlePolicy::Wander),
            forces: ForceConfig {
                damping: 0.98,
                pointer: PointerForce { radius: 100.0, strength: 0.0 },
                ..Default::default()
            },
            boundary: Boundary::Ellipse(EllipseBounds::for_viewport(800.0, 600.0)),
            flow: None,
            connections: ConnectionConfig {
                distance: profile.connection_distance,
                opacity: 0.2,
                redraw_interval_ms: 0,
                pointer_links: false,
                ..Default::default()
            },
            bursts: BurstConfig::default(),
            pointer_bursts: false,
            orbit: OrbitConfig { enabled: false, ..Default::default() },
            camera: Camera::screen(),
            ambient: None,
            palettes: DEFAULT_PALETTES.to_vec(),
            point_scale: 1.0,
            seed: 0x6162_6f75,
            profile,
        }
    }

    /// Floating geometric meshes, no point entities.
    pub fn ambient() -> Self {
        Self {
            name: "ambient".into(),
            particle_count: 0,
            connections: ConnectionConfig { enabled: false, pointer_links: false, ..Default::default() },
            idle_policy: Some(IdlePolicy::Wander),
            boundary: Boundary::None,
            flow: None,
            pointer_bursts: false,
            orbit: OrbitConfig { enabled: false, ..Default::default() },
            camera: Camera::perspective(75.0, 20.0),
            ambient: Some(AmbientConfig::default()),
            seed: 0x616d_6269,
            ..Self::skills(&Profile::default())
        }
    }

    // ========== Serialization ==========

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values outside their valid domain.
    pub fn validate(&self) -> Result<(), EngineError> {
        fn positive(name: &str, value: f32) -> Result<(), EngineError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(EngineError::InvalidConfig(format!("{name} must be positive, got {value}")))
            }
        }

        positive("transition_duration", self.transition_duration)?;
        positive("point_scale", self.point_scale)?;
        positive("shape.scale", self.shape.scale)?;
        positive("shape.cube_half_size", self.shape.cube_half_size)?;
        positive("connections.distance", self.connections.distance)?;
        positive("connections.pointer_radius", self.connections.pointer_radius)?;
        positive("connections.pressed_radius", self.connections.pressed_radius)?;
        positive("bursts.decay", self.bursts.decay)?;
        if let Some(flow) = &self.flow {
            positive("flow.cell_size", flow.cell_size)?;
            if let FlowRefresh::Partial { stride: 0 } = flow.refresh {
                return Err(EngineError::InvalidConfig("flow.refresh stride must be at least 1".into()));
            }
        }

        let (r_min, r_max) = self.shape.sphere_radius;
        if !(r_min >= 0.0 && r_min <= r_max) {
            return Err(EngineError::InvalidConfig(format!(
                "shape.sphere_radius must satisfy 0 <= min <= max, got ({r_min}, {r_max})"
            )));
        }
        if !(0.0..=1.0).contains(&self.forces.damping) {
            return Err(EngineError::InvalidConfig(format!(
                "forces.damping must be in [0, 1], got {}",
                self.forces.damping
            )));
        }
        if self.bursts.decay > 1.0 {
            return Err(EngineError::InvalidConfig(format!("bursts.decay must be at most 1, got {}", self.bursts.decay)));
        }
        let mut ranges = vec![
            ("spawn.size", self.spawn.size),
            ("spawn.alpha", self.spawn.alpha),
            ("bursts.speed", self.bursts.speed),
            ("bursts.radius", self.bursts.radius),
            ("bursts.wave_distance", self.bursts.wave_distance),
        ];
        if let Some(ambient) = &self.ambient {
            ranges.push(("ambient.float_speed", ambient.float_speed));
        }
        for (name, (lo, hi)) in ranges {
            if !(lo <= hi) {
                return Err(EngineError::InvalidConfig(format!("{name} range is inverted: ({lo}, {hi})")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::PerformanceLevel;

    #[test]
    fn test_presets_validate() {
        let desktop = DeviceSignals { is_mobile: false, heap_size_limit: None, viewport_width: 1440 };
        for config in [
            EngineConfig::hero(&desktop),
            EngineConfig::skills(&Profile::high()),
            EngineConfig::about(),
            EngineConfig::ambient(),
        ] {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_hero_scale_follows_width() {
        let phone = DeviceSignals { is_mobile: true, heap_size_limit: None, viewport_width: 390 };
        let desktop = DeviceSignals { is_mobile: false, heap_size_limit: None, viewport_width: 1440 };
        let small = EngineConfig::hero(&phone);
        let large = EngineConfig::hero(&desktop);
        assert_eq!((small.shape.scale, small.shape.y_offset), (1.0, 7.0));
        assert_eq!((large.shape.scale, large.shape.y_offset), (1.7, 6.0));
        assert_eq!(large.particle_count, 2000);
        assert_eq!(large.initial_shape, Some(ShapeId::Ribbon));
    }

    #[test]
    fn test_skills_takes_limits_from_profile() {
        let config = EngineConfig::skills(&Profile::high());
        assert_eq!(config.particle_count, 100);
        assert_eq!(config.connections.pointer_limit, 25);
        assert_eq!(config.flow.unwrap().refresh, FlowRefresh::Full);
        assert_eq!(config.profile.level, PerformanceLevel::High);
    }

    #[test]
    fn test_json_round_trip_and_defaults() {
        let config = EngineConfig::about();
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);

        let partial = EngineConfig::from_json(r#"{ "name": "tiny", "particle_count": 12 }"#).unwrap();
        assert_eq!(partial.particle_count, 12);
        assert_eq!(partial.transition_duration, DEFAULT_DURATION);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::about();
        config.transition_duration = 0.0;
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        let err = EngineConfig::from_json(r#"{ "connections": { "distance": -5.0 } }"#).unwrap_err();
        assert!(err.to_string().contains("connections.distance"));

        assert!(matches!(EngineConfig::from_json("{ nope"), Err(EngineError::Config(_))));

        for (json, field) in [
            (r#"{ "shape": { "cube_half_size": 0.0 } }"#, "shape.cube_half_size"),
            (r#"{ "shape": { "cube_half_size": -3.0 } }"#, "shape.cube_half_size"),
            (r#"{ "bursts": { "speed": [4.0, 1.0] } }"#, "bursts.speed"),
            (r#"{ "bursts": { "radius": [3.0, 1.0] } }"#, "bursts.radius"),
            (r#"{ "bursts": { "wave_distance": [120.0, 40.0] } }"#, "bursts.wave_distance"),
            (r#"{ "ambient": { "float_speed": [0.02, 0.01] } }"#, "ambient.float_speed"),
        ] {
            let err = EngineConfig::from_json(json).unwrap_err();
            assert!(matches!(err, EngineError::InvalidConfig(_)), "{json}");
            assert!(err.to_string().contains(field), "{json}: {err}");
        }

        let mut config = EngineConfig::ambient();
        config.ambient = None;
        config.bursts.speed = (2.0, 2.0);
        assert!(config.validate().is_ok());
    }
}
