//! The render driver.
//!
//! [`Engine`] owns the entity set and every pass that touches it. Hosts feed
//! it input events and call [`tick`](Engine::tick) once per display refresh;
//! each rendered tick runs in a fixed order:
//!
//! 1. Pointer presses become bursts, drags rotate the orbit
//! 2. Flow field refresh
//! 3. Transition interpolation *or* idle forces on the persistent entities
//!    (transients always get forces)
//! 4. Expired transients are pruned
//! 5. Proximity links (rate-limited) and the pointer pass
//! 6. Ambient meshes advance
//! 7. Upload and draw
//!
//! Nothing runs until the container is first reported visible.
//!
//! ```ignore
//! let mut engine = Engine::new(EngineConfig::skills(&profile), backend)?;
//! engine.on_visibility(true);
//! loop {
//!     match engine.tick(wall.lap()) {
//!         FrameOutcome::Rendered(stats) => log::trace!("{} links", stats.links),
//!         FrameOutcome::Throttled | FrameOutcome::Dormant => {}
//!     }
//! }
//! ```

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::ambient::AmbientField;
use crate::backend::{LinkVertex, MeshInstanceGpu, PointVertex, RenderBackend, Viewport};
use crate::burst::{BurstSource, EmitReport, Emission, TransientPool};
use crate::camera::{Camera, OrbitControl};
use crate::config::{EngineConfig, SpawnRegion};
use crate::connections::ConnectionGraph;
use crate::entity::Entity;
use crate::error::EngineError;
use crate::flow::FlowField;
use crate::forces::{Boundary, EllipseBounds, ForceUpdater, FrameInputs, IdlePolicy, PointerSample, REFERENCE_FPS};
use crate::palette::{ColorPair, PaletteSet};
use crate::pointer::{Pointer, PointerEvent, PointerKind};
use crate::profile::Profile;
use crate::shapes::ShapeId;
use crate::time::{FrameClock, IntervalGate};
use crate::transition::{TransitionController, TransitionStep};

/// Pointer halo radius, idle and pressed.
const MOUSE_GLOW_RADIUS: (f32, f32) = (20.0, 30.0);
const MOUSE_GLOW_ALPHA: f32 = 0.4;
/// Entities larger than this get a halo when particle glow is on.
const PARTICLE_GLOW_MIN_SIZE: f32 = 2.0;
const PARTICLE_GLOW_ALPHA: f32 = 0.2;

/// What one call to [`Engine::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// The container has not been visible yet.
    Dormant,
    /// The frame-rate cap held this refresh back.
    Throttled,
    Rendered(FrameStats),
}

/// Per-frame counters.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub dt: f32,
    pub transition: TransitionStep,
    pub entities: usize,
    pub transients: usize,
    pub spawned: usize,
    pub evicted: usize,
    pub pruned: usize,
    pub flow_cells: usize,
    pub links_rebuilt: bool,
    pub links: usize,
    pub pointer_links: usize,
    /// `false` if the backend reported a draw error.
    pub drawn: bool,
}

/// A running animated section.
pub struct Engine<B: RenderBackend> {
    config: EngineConfig,
    backend: B,
    viewport: Viewport,
    rng: SmallRng,

    entities: Vec<Entity>,
    persistent: usize,
    current_shape: Option<ShapeId>,

    palettes: PaletteSet,
    transition: TransitionController,
    forces: ForceUpdater,
    flow: Option<FlowField>,
    connections: ConnectionGraph,
    transients: TransientPool,
    ambient: Option<AmbientField>,

    pointer: Pointer,
    orbit: OrbitControl,
    camera: Camera,
    clock: FrameClock,
    hover_gate: IntervalGate,
    started: bool,

    points: Vec<PointVertex>,
    lines: Vec<LinkVertex>,
    meshes: Vec<MeshInstanceGpu>,
}

impl<B: RenderBackend> Engine<B> {
    /// Build an engine over `backend`.
    ///
    /// Fails without touching the backend's buffers if the config is invalid
    /// or the backend has no drawable surface.
    pub fn new(config: EngineConfig, backend: B) -> Result<Self, EngineError> {
        config.validate()?;
        let viewport = backend
            .viewport()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| EngineError::RenderBackendUnavailable(format!("{}: no drawable surface", config.name)))?;
        let (width, height) = (viewport.width as f32, viewport.height as f32);

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let palettes = PaletteSet::new(config.palettes.clone());
        let entities = spawn_entities(&config, width, height, palettes.current(), &mut rng);
        let persistent = entities.len();

        let mut camera = config.camera.clone();
        camera.set_viewport(width, height);

        let policy = config
            .idle_policy
            .or(config.initial_shape.map(IdlePolicy::for_shape))
            .unwrap_or(IdlePolicy::Oscillate);
        let mut forces =
            ForceUpdater::new(config.forces.clone(), policy, config.boundary.resized(width, height), config.shape.clone());
        if let Some(flow) = &config.flow {
            forces = forces.with_flow(flow.force, flow.wave_multiplier);
        }

        let flow = config.flow.clone().map(|f| FlowField::new(width, height, f));
        let ambient = config.ambient.clone().map(|a| AmbientField::new(a, palettes.current(), &mut rng));

        info!(
            "{}: performance level {}, {} particles, {}x{}",
            config.name, config.profile.level, persistent, viewport.width, viewport.height
        );

        Ok(Self {
            backend,
            viewport,
            entities,
            persistent,
            current_shape: None,
            transition: TransitionController::new(config.transition_duration).with_easing(config.transition_easing),
            forces,
            flow,
            connections: ConnectionGraph::new(config.connections.clone()),
            transients: TransientPool::new(config.bursts.clone(), persistent),
            ambient,
            pointer: Pointer::new(),
            orbit: OrbitControl::new(config.orbit.clone()),
            camera,
            clock: FrameClock::new(config.profile.min_frame_interval_ms),
            hover_gate: IntervalGate::new(config.bursts.hover_cooldown_ms),
            started: false,
            palettes,
            rng,
            points: Vec::new(),
            lines: Vec::new(),
            meshes: Vec::new(),
            config,
        })
    }

    // ========== Commands ==========

    /// Start a transition to `shape`.
    ///
    /// Rejected with [`EngineError::TransitionInProgress`] while another
    /// transition runs; the running one is not affected.
    pub fn request_shape(&mut self, shape: ShapeId) -> Result<(), EngineError> {
        let persistent = &mut self.entities[..self.persistent];
        match self.transition.request(shape, persistent, &self.config.shape, &mut self.rng) {
            Ok(()) => {
                info!("{}: transition to {} started", self.config.name, shape);
                Ok(())
            }
            Err(err) => {
                debug!("{}: {} rejected: {}", self.config.name, shape, err);
                Err(err)
            }
        }
    }

    /// [`request_shape`](Self::request_shape) by name. Unknown names fail
    /// with [`EngineError::UnknownShape`] and leave the engine unchanged.
    pub fn request_shape_named(&mut self, name: &str) -> Result<(), EngineError> {
        let shape: ShapeId = name.parse()?;
        self.request_shape(shape)
    }

    /// Switch to the next palette and recolour everything. Returns the new index.
    pub fn cycle_palette(&mut self) -> usize {
        let index = self.palettes.cycle();
        self.recolor();
        info!("{}: palette {} selected", self.config.name, index);
        index
    }

    pub fn set_palette(&mut self, index: usize) -> Result<(), EngineError> {
        if self.palettes.select(index).is_none() {
            return Err(EngineError::PaletteOutOfRange { index, len: self.palettes.len() });
        }
        self.recolor();
        info!("{}: palette {} selected", self.config.name, index);
        Ok(())
    }

    /// Send `count` skill-wave entities out from `origin` (container pixels).
    pub fn skill_wave(&mut self, origin: Vec2, count: usize) -> EmitReport {
        let origin = self.pointer_to_local(origin).unwrap_or(origin.extend(0.0));
        self.emit(Emission::SkillWave { origin, count })
    }

    /// Skill-wave size for the current performance level.
    pub fn default_wave_count(&self) -> usize {
        self.transients.config().wave_count(self.config.profile.level)
    }

    /// Scatter highlight sparks for a skill of `value` (0–100). Returns `None`
    /// while the hover cooldown is running.
    pub fn skill_hover(&mut self, value: f32) -> Option<EmitReport> {
        if !self.hover_gate.ready(self.clock.wall_ms()) {
            return None;
        }
        let count = self.transients.config().highlight_count(value, &self.config.profile);
        let area = Vec2::new(self.viewport.width as f32, self.viewport.height as f32);
        Some(self.emit(Emission::Highlight { area, count }))
    }

    /// Record a pointer event; it takes effect on the next tick.
    pub fn on_pointer(&mut self, event: PointerEvent) {
        self.pointer.handle(event);
    }

    /// Feed a winit window event to the pointer. Returns `true` if consumed.
    #[cfg(feature = "viewer")]
    pub fn on_window_event(&mut self, event: &winit::event::WindowEvent) -> bool {
        self.pointer.handle_window_event(event)
    }

    /// Start animating the first time the container becomes visible. Later
    /// signals are ignored.
    pub fn on_visibility(&mut self, visible: bool) {
        if !visible || self.started {
            return;
        }
        self.started = true;
        // presses made while hidden are dropped
        self.pointer.discard_pending();
        info!("{}: visible, starting", self.config.name);
        if let Some(shape) = self.config.initial_shape {
            if let Err(err) = self.request_shape(shape) {
                warn!("{}: initial shape failed: {}", self.config.name, err);
            }
        }
    }

    /// Re-measure after the container changed size. Zero sizes are ignored.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        if viewport.is_empty() || viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        let (w, h) = (width as f32, height as f32);
        self.camera.set_viewport(w, h);
        let boundary = self.forces.boundary().resized(w, h);
        self.forces.set_boundary(boundary);
        if let Some(flow) = &mut self.flow {
            flow.resize(w, h);
        }
        debug!("{}: resized to {}x{}", self.config.name, width, height);
    }

    // ========== Frame ==========

    /// Advance by `real_dt` seconds of wall time and draw if the frame cap allows.
    pub fn tick(&mut self, real_dt: f32) -> FrameOutcome {
        if !self.started {
            return FrameOutcome::Dormant;
        }
        let Some(dt) = self.clock.advance(real_dt) else {
            return FrameOutcome::Throttled;
        };
        let k = dt * REFERENCE_FPS;
        let time = self.clock.elapsed();
        let now_ms = self.clock.wall_ms();

        // input
        let drag = self.pointer.take_drag();
        self.orbit.drag(drag);
        self.orbit.update(self.pointer.is_pressed(), k);

        let mut report = EmitReport::default();
        for (position, kind) in self.pointer.take_presses() {
            if !self.config.pointer_bursts {
                continue;
            }
            let source = match kind {
                PointerKind::Mouse => BurstSource::Mouse,
                PointerKind::Touch => BurstSource::Touch,
            };
            let count = self.transients.config().burst_count(source, self.config.profile.level);
            let origin = self.pointer_to_local(position).unwrap_or(position.extend(0.0));
            let r = self.emit(Emission::Burst { origin, count });
            report.spawned += r.spawned;
            report.evicted += r.evicted;
        }
        let pointer = self.pointer_sample();

        // motion
        let flow_cells = self.flow.as_mut().map_or(0, |f| f.update());
        let frame = FrameInputs { time, dt, pointer, flow: self.flow.as_ref() };
        let step = self.transition.step(dt, &mut self.entities[..self.persistent]);
        match step {
            TransitionStep::Idle => self.forces.update(&mut self.entities, &frame, &mut self.rng),
            TransitionStep::Progress(_) => {
                self.forces.update(&mut self.entities[self.persistent..], &frame, &mut self.rng)
            }
            TransitionStep::Completed(shape) => {
                self.current_shape = Some(shape);
                if self.config.idle_policy.is_none() {
                    self.forces.set_policy(IdlePolicy::for_shape(shape));
                }
                info!("{}: transition to {} complete", self.config.name, shape);
                self.forces.update(&mut self.entities[self.persistent..], &frame, &mut self.rng);
            }
        }
        let pruned = self.transients.prune(&mut self.entities);

        // links
        let links_rebuilt = self.connections.update(&self.entities, now_ms);
        let pointer_links = self.connections.pointer_pass(&mut self.entities, pointer, k);

        if let Some(ambient) = &mut self.ambient {
            ambient.update(k);
        }

        let drawn = self.draw(pointer);

        FrameOutcome::Rendered(FrameStats {
            frame: self.clock.frame(),
            dt,
            transition: step,
            entities: self.entities.len(),
            transients: self.transients.live(&self.entities),
            spawned: report.spawned,
            evicted: report.evicted,
            pruned,
            flow_cells,
            links_rebuilt,
            links: self.connections.links().len(),
            pointer_links,
            drawn,
        })
    }

    fn draw(&mut self, pointer: Option<PointerSample>) -> bool {
        let scale = self.config.point_scale;
        let profile = &self.config.profile;

        self.points.clear();
        if profile.enable_particle_glow {
            for e in self.entities.iter().filter(|e| e.size > PARTICLE_GLOW_MIN_SIZE) {
                self.points.push(PointVertex::new(e.position, e.size * 2.0 * scale, e.color, PARTICLE_GLOW_ALPHA));
            }
        }
        self.points.extend(
            self.entities
                .iter()
                .map(|e| PointVertex::new(e.position, e.size * scale, e.color, e.alpha.clamp(0.0, 1.0))),
        );
        if let Some(p) = pointer.filter(|_| profile.enable_mouse_glow) {
            let radius = if p.pressed { MOUSE_GLOW_RADIUS.1 } else { MOUSE_GLOW_RADIUS.0 };
            self.points.push(PointVertex::new(p.position, radius, Vec3::ONE, MOUSE_GLOW_ALPHA));
        }

        self.lines.clear();
        for link in self.connections.links().iter().chain(self.connections.pointer_links()) {
            self.lines.extend(LinkVertex::segment(link));
        }

        self.meshes.clear();
        if let Some(ambient) = &self.ambient {
            let scene = ambient.scene_matrix();
            self.meshes.extend(ambient.instances().iter().map(|m| MeshInstanceGpu::from_instance(m, scene)));
        }

        self.backend.upload_points(&self.points);
        self.backend.upload_links(&self.lines);
        self.backend.upload_meshes(&self.meshes);
        match self.backend.draw(&self.camera, self.orbit.model_matrix()) {
            Ok(()) => true,
            Err(err) => {
                warn!("{}: {}", self.config.name, err);
                false
            }
        }
    }

    fn emit(&mut self, emission: Emission) -> EmitReport {
        let colors = self.palettes.current();
        self.transients.emit(emission, &mut self.entities, colors, &mut self.rng)
    }

    fn recolor(&mut self) {
        let colors = self.palettes.current();
        for entity in &mut self.entities[..self.persistent] {
            entity.color = colors.sample(&mut self.rng);
        }
        if let Some(ambient) = &mut self.ambient {
            ambient.recolor(colors, &mut self.rng);
        }
    }

    /// Map a container pixel into the rotated entity space.
    fn pointer_to_local(&self, pixel: Vec2) -> Option<Vec3> {
        let world = self.camera.screen_to_world(pixel, self.config.shape.center())?;
        Some(self.orbit.model_matrix().inverse().transform_point3(world))
    }

    fn pointer_sample(&self) -> Option<PointerSample> {
        let pixel = self.pointer.position()?;
        let position = self.pointer_to_local(pixel)?;
        Some(PointerSample { position, pressed: self.pointer.is_pressed() })
    }

    // ========== Queries ==========

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Size of the persistent prefix of [`entities`](Self::entities).
    #[inline]
    pub fn persistent_count(&self) -> usize {
        self.persistent
    }

    pub fn transient_count(&self) -> usize {
        self.transients.live(&self.entities)
    }

    /// Last shape a transition completed to.
    #[inline]
    pub fn current_shape(&self) -> Option<ShapeId> {
        self.current_shape
    }

    #[inline]
    pub fn is_transforming(&self) -> bool {
        self.transition.is_transforming()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.started
    }

    pub fn transition(&self) -> &TransitionController {
        &self.transition
    }

    pub fn idle_policy(&self) -> IdlePolicy {
        self.forces.policy()
    }

    #[inline]
    pub fn palette_index(&self) -> usize {
        self.palettes.current_index()
    }

    pub fn profile(&self) -> &Profile {
        &self.config.profile
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitControl {
        &self.orbit
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn connections(&self) -> &ConnectionGraph {
        &self.connections
    }

    pub fn ambient(&self) -> Option<&AmbientField> {
        self.ambient.as_ref()
    }

    /// Boundary in effect, re-fitted to the current viewport.
    pub fn boundary(&self) -> &Boundary {
        self.forces.boundary()
    }

    pub fn flow(&self) -> Option<&FlowField> {
        self.flow.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// Persistent entities in their spawn region.
fn spawn_entities<R: Rng + ?Sized>(
    config: &EngineConfig,
    width: f32,
    height: f32,
    colors: ColorPair,
    rng: &mut R,
) -> Vec<Entity> {
    let spawn = &config.spawn;
    let ellipse = EllipseBounds::for_viewport(width, height);
    (0..config.particle_count)
        .map(|_| {
            let position = match spawn.region {
                SpawnRegion::Box { center, half_extent } => {
                    let unit = Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>()) * 2.0 - Vec3::ONE;
                    center + unit * half_extent
                }
                SpawnRegion::Viewport => Vec3::new(rng.gen::<f32>() * width, rng.gen::<f32>() * height, 0.0),
                SpawnRegion::Ellipse { fill } => {
                    let angle = rng.gen_range(0.0..TAU);
                    let distance = rng.gen::<f32>() * fill;
                    let offset = Vec2::new(angle.cos(), angle.sin()) * ellipse.radii * distance;
                    (ellipse.center + offset).extend(0.0)
                }
            };
            let planar = !matches!(spawn.region, SpawnRegion::Box { .. });
            let mut velocity = Vec3::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * spawn.speed;
            if planar {
                velocity.z = 0.0;
            }
            let size = sample_range(spawn.size, rng);
            let alpha = sample_range(spawn.alpha, rng);
            let entity = Entity::new(position, size, colors.sample(rng), alpha);
            match spawn.pulse_speed {
                Some(range) => entity.with_phase(rng.gen_range(0.0..TAU), sample_range(range, rng)),
                None => entity.with_phase(rng.gen_range(0.0..TAU), 0.0),
            }
        })
        .collect()
}

#[inline]
fn sample_range<R: Rng + ?Sized>((lo, hi): (f32, f32), rng: &mut R) -> f32 {
    lo + rng.gen::<f32>() * (hi - lo)
}
