//! Cameras and orbit rotation.
//!
//! [`Camera`] is either a perspective orbit camera for the 3D point cloud or
//! a pixel-space screen camera for 2D canvas fields. [`OrbitControl`]
//! rotates the point cloud itself: dragging sets a target rotation that the
//! cloud eases toward, and an idle cloud spins slowly around y.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use serde::{Deserialize, Serialize};

use crate::forces::frame_fraction;

/// How world coordinates reach the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Perspective with a vertical field of view in degrees.
    Perspective { fov_y_degrees: f32 },
    /// World units are container pixels, origin top-left, y down.
    Screen,
}

/// Fixed camera on the +z axis. Rotation is applied to the entities by
/// [`OrbitControl`], not to the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera looks at.
    pub target: Vec3,
    pub projection: Projection,
    /// Container size in pixels.
    pub viewport: Vec2,
}

impl Camera {
    /// Perspective camera looking down -z from `distance` away.
    pub fn perspective(fov_y_degrees: f32, distance: f32) -> Self {
        Self {
            distance,
            target: Vec3::ZERO,
            projection: Projection::Perspective { fov_y_degrees },
            viewport: Vec2::new(800.0, 600.0),
        }
    }

    /// Pixel-space camera for 2D fields.
    pub fn screen() -> Self {
        Self {
            projection: Projection::Screen,
            ..Self::perspective(75.0, 1.0)
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        self.target + Vec3::new(0.0, 0.0, self.distance)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { .. } => Mat4::look_at_rh(self.position(), self.target, Vec3::Y),
            Projection::Screen => Mat4::IDENTITY,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov_y_degrees } => {
                Mat4::perspective_rh(fov_y_degrees.to_radians(), self.aspect(), 0.1, 1000.0)
            }
            Projection::Screen => Mat4::orthographic_rh(0.0, self.viewport.x, self.viewport.y, 0.0, -1.0, 1.0),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a container pixel to the world plane through `plane_point` facing
    /// the camera. Screen cameras return the pixel itself.
    pub fn screen_to_world(&self, pixel: Vec2, plane_point: Vec3) -> Option<Vec3> {
        if self.projection == Projection::Screen {
            return Some(pixel.extend(0.0));
        }
        let ndc = Vec2::new(pixel.x / self.viewport.x * 2.0 - 1.0, 1.0 - pixel.y / self.viewport.y * 2.0);
        let inverse = self.view_projection().inverse();
        let near = inverse * ndc.extend(0.0).extend(1.0);
        let far = inverse * ndc.extend(1.0).extend(1.0);
        if near.w.abs() <= f32::EPSILON || far.w.abs() <= f32::EPSILON {
            return None;
        }
        let origin = near.xyz() / near.w;
        let dir = (far.xyz() / far.w - origin).normalize_or_zero();

        let normal = (self.position() - self.target).normalize_or_zero();
        let denom = dir.dot(normal);
        if denom.abs() <= f32::EPSILON {
            return None;
        }
        let t = (plane_point - origin).dot(normal) / denom;
        (t >= 0.0).then(|| origin + dir * t)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(75.0, 30.0)
    }
}

/// Orbit tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub enabled: bool,
    /// Radians of rotation per dragged pixel.
    pub drag_speed: f32,
    /// Fraction of the remaining rotation closed per tick while dragging.
    pub ease: f32,
    /// Spin around y per tick while not dragging.
    pub auto_spin: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self { enabled: true, drag_speed: 0.01 * 0.5, ease: 0.1, auto_spin: 0.001 }
    }
}

/// Drag-to-rotate state of the entity set.
#[derive(Debug, Clone, Default)]
pub struct OrbitControl {
    config: OrbitConfig,
    /// Current rotation (x = pitch, y = yaw).
    rotation: Vec2,
    target: Vec2,
}

impl OrbitControl {
    pub fn new(config: OrbitConfig) -> Self {
        Self { config, rotation: Vec2::ZERO, target: Vec2::ZERO }
    }

    /// Apply a pointer drag of `delta` pixels.
    pub fn drag(&mut self, delta: Vec2) {
        if !self.config.enabled {
            return;
        }
        self.target.y += delta.x * self.config.drag_speed;
        self.target.x = (self.target.x + delta.y * self.config.drag_speed).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Advance one tick. `k` is the frame scale (`dt · 60`).
    pub fn update(&mut self, dragging: bool, k: f32) {
        if !self.config.enabled {
            return;
        }
        if dragging {
            self.rotation += (self.target - self.rotation) * frame_fraction(self.config.ease, k);
        } else {
            self.rotation.y += self.config.auto_spin * k;
            self.target = self.rotation;
        }
    }

    #[inline]
    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    /// Model matrix for the rotated entity set.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x) * Mat4::from_rotation_y(self.rotation.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_position_on_z_axis() {
        let cam = Camera::perspective(75.0, 30.0);
        let pos = cam.position();
        assert!((pos - Vec3::new(0.0, 0.0, 30.0)).length() < 1e-5);
    }

    #[test]
    fn test_camera_follows_target_along_z() {
        let mut cam = Camera::perspective(75.0, 12.0);
        cam.target = Vec3::new(1.0, -2.0, 3.0);
        assert!((cam.position() - Vec3::new(1.0, -2.0, 15.0)).length() < 1e-5);

        let json = serde_json::to_value(&cam).unwrap();
        assert!(json.get("yaw").is_none() && json.get("pitch").is_none());
    }

    #[test]
    fn test_screen_center_hits_target() {
        let mut cam = Camera::perspective(75.0, 30.0);
        cam.set_viewport(800.0, 600.0);
        let hit = cam.screen_to_world(Vec2::new(400.0, 300.0), Vec3::ZERO).unwrap();
        assert!(hit.length() < 1e-3, "{hit:?}");

        // right half of the screen maps to +x
        let right = cam.screen_to_world(Vec2::new(700.0, 300.0), Vec3::ZERO).unwrap();
        assert!(right.x > 1.0);
        assert!(right.z.abs() < 1e-3);
    }

    #[test]
    fn test_screen_camera_is_identity_mapping() {
        let cam = Camera::screen();
        assert_eq!(cam.screen_to_world(Vec2::new(12.0, 34.0), Vec3::ZERO), Some(Vec3::new(12.0, 34.0, 0.0)));
    }

    #[test]
    fn test_orbit_drag_clamps_pitch() {
        let mut orbit = OrbitControl::new(OrbitConfig::default());
        orbit.drag(Vec2::new(0.0, 10_000.0));
        for _ in 0..500 {
            orbit.update(true, 1.0);
        }
        assert!((orbit.rotation().x - FRAC_PI_2).abs() < 1e-3);
    }

    #[test]
    fn test_orbit_auto_spins_when_idle() {
        let mut orbit = OrbitControl::new(OrbitConfig::default());
        for _ in 0..100 {
            orbit.update(false, 1.0);
        }
        assert!((orbit.rotation().y - 0.1).abs() < 1e-4);
        assert_eq!(orbit.rotation().x, 0.0);
    }
}
