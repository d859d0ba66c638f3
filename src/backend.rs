//! Rendering backend seam.
//!
//! The engine never talks to a graphics API directly. Each rendered frame it
//! packs entities, links and mesh instances into the GPU-ready [`Pod`] records
//! below, uploads them to a [`RenderBackend`] and asks for one draw with the
//! current camera and model matrix.
//!
//! | Record | Layout | Used for |
//! |--------|--------|----------|
//! | [`PointVertex`] | 32 bytes | one point sprite per entity (plus halos) |
//! | [`LinkVertex`] | 32 bytes | two per line segment |
//! | [`MeshInstanceGpu`] | 96 bytes | floating mesh instances |
//! | [`CameraUniform`] | 144 bytes | per-draw uniform block |
//!
//! [`RecordingBackend`] keeps every upload in memory; it backs the headless
//! demo and the integration tests.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::ambient::MeshInstance;
use crate::camera::{Camera, Projection};
use crate::connections::Link;
use crate::error::BackendError;

/// Container size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-sized container cannot be drawn into.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// ========== GPU records ==========

/// One point sprite.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    /// Sprite radius in world units (pixels for screen cameras).
    pub size: f32,
    pub color: [f32; 4],
}

impl PointVertex {
    pub fn new(position: Vec3, size: f32, color: Vec3, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            size,
            color: color.extend(alpha).to_array(),
        }
    }
}

/// One end of a line segment.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LinkVertex {
    pub position: [f32; 3],
    pub _pad: f32,
    pub color: [f32; 4],
}

impl LinkVertex {
    pub fn new(position: Vec3, color: Vec3, alpha: f32) -> Self {
        Self {
            position: position.to_array(),
            _pad: 0.0,
            color: color.extend(alpha).to_array(),
        }
    }

    /// Both ends of `link`, ready for a line list.
    pub fn segment(link: &Link) -> [LinkVertex; 2] {
        [
            LinkVertex::new(link.from, link.color, link.alpha),
            LinkVertex::new(link.to, link.color, link.alpha),
        ]
    }
}

/// One floating mesh instance.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshInstanceGpu {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// [`MeshKind::index`](crate::ambient::MeshKind::index).
    pub kind: u32,
    pub wireframe: u32,
    pub _pad: [u32; 2],
}

impl MeshInstanceGpu {
    /// Pack `mesh`, pre-multiplied by the scene matrix.
    pub fn from_instance(mesh: &MeshInstance, scene: Mat4) -> Self {
        Self {
            model: (scene * mesh.model_matrix()).to_cols_array_2d(),
            color: mesh.color.extend(mesh.opacity).to_array(),
            kind: mesh.kind.index(),
            wireframe: mesh.wireframe as u32,
            _pad: [0; 2],
        }
    }
}

/// Per-draw uniform block shared by the point and line shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub viewport: [f32; 2],
    /// Pixels per world unit at distance 1 (1.0 for screen cameras).
    pub point_scale: f32,
    pub _pad: f32,
}

impl CameraUniform {
    pub fn new(camera: &Camera, model: Mat4) -> Self {
        let point_scale = match camera.projection {
            Projection::Perspective { fov_y_degrees } => {
                camera.viewport.y / (2.0 * (fov_y_degrees.to_radians() * 0.5).tan())
            }
            Projection::Screen => 1.0,
        };
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            viewport: camera.viewport.to_array(),
            point_scale,
            _pad: 0.0,
        }
    }
}

// ========== Backend trait ==========

/// What the engine needs from a renderer.
pub trait RenderBackend {
    /// Current container size, or `None` if there is no drawable surface.
    fn viewport(&self) -> Option<Viewport>;

    /// Replace the point sprite buffer.
    fn upload_points(&mut self, points: &[PointVertex]);

    /// Replace the line buffer (two vertices per segment).
    fn upload_links(&mut self, links: &[LinkVertex]);

    /// Replace the mesh instance buffer.
    fn upload_meshes(&mut self, meshes: &[MeshInstanceGpu]);

    /// Draw the uploaded scene. `model` rotates points and links.
    fn draw(&mut self, camera: &Camera, model: Mat4) -> Result<(), BackendError>;
}

/// In-memory backend that records the last upload of each kind.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    viewport: Option<Viewport>,
    points: Vec<PointVertex>,
    links: Vec<LinkVertex>,
    meshes: Vec<MeshInstanceGpu>,
    draws: u64,
    last_uniform: Option<CameraUniform>,
    fail_draws: bool,
}

impl RecordingBackend {
    /// A backend reporting a `width × height` container.
    pub fn new(width: u32, height: u32) -> Self {
        Self { viewport: Some(Viewport::new(width, height)), ..Default::default() }
    }

    /// A backend with no drawable surface.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Make every subsequent draw fail.
    pub fn set_failing(&mut self, fail: bool) {
        self.fail_draws = fail;
    }

    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    pub fn points(&self) -> &[PointVertex] {
        &self.points
    }

    pub fn links(&self) -> &[LinkVertex] {
        &self.links
    }

    pub fn meshes(&self) -> &[MeshInstanceGpu] {
        &self.meshes
    }

    /// Successful draws so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    pub fn last_uniform(&self) -> Option<&CameraUniform> {
        self.last_uniform.as_ref()
    }
}

impl RenderBackend for RecordingBackend {
    fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    fn upload_points(&mut self, points: &[PointVertex]) {
        self.points.clear();
        self.points.extend_from_slice(points);
    }

    fn upload_links(&mut self, links: &[LinkVertex]) {
        self.links.clear();
        self.links.extend_from_slice(links);
    }

    fn upload_meshes(&mut self, meshes: &[MeshInstanceGpu]) {
        self.meshes.clear();
        self.meshes.extend_from_slice(meshes);
    }

    fn draw(&mut self, camera: &Camera, model: Mat4) -> Result<(), BackendError> {
        if self.fail_draws {
            return Err(BackendError("injected draw failure".into()));
        }
        self.last_uniform = Some(CameraUniform::new(camera, model));
        self.draws += 1;
        Ok(())
    }
}
