//! Floating mesh field.
//!
//! A small fixed set of geometric instances (octahedra, tetrahedra,
//! icosahedra, tori, boxes) that spin, bob and drift sideways, wrapping at
//! the edges of the view while the whole scene turns slowly around y.
//!
//! | Parameter | Default |
//! |-----------|---------|
//! | instances | 25 |
//! | spawn box | ±17.5 × ±12.5 × ±10 |
//! | spin per tick | ±0.01, ±0.01, ±0.005 |
//! | float speed | 0.005–0.015 |
//! | wireframe | 50%, opacity 0.4 (solid 0.3) |
//! | wrap | \|x\| > 20, \|y\| > 15 |

use std::f32::consts::{PI, TAU};

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::palette::ColorPair;

/// Geometry of a mesh instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshKind {
    Octahedron,
    Tetrahedron,
    Icosahedron,
    Torus,
    Box,
}

impl MeshKind {
    pub const ALL: [MeshKind; 5] =
        [MeshKind::Octahedron, MeshKind::Tetrahedron, MeshKind::Icosahedron, MeshKind::Torus, MeshKind::Box];

    /// Index used by GPU instance records.
    pub fn index(&self) -> u32 {
        *self as u32
    }

    /// Edge list in local space, sized like the decorative meshes.
    pub fn edges(&self) -> Vec<[Vec3; 2]> {
        match self {
            MeshKind::Octahedron => {
                let r = 0.5;
                let axes = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z].map(|v| v * r);
                edges_at_distance(&axes, r * std::f32::consts::SQRT_2)
            }
            MeshKind::Tetrahedron => {
                let s = 0.6 / 3f32.sqrt();
                let verts = [
                    Vec3::new(1.0, 1.0, 1.0) * s,
                    Vec3::new(-1.0, -1.0, 1.0) * s,
                    Vec3::new(-1.0, 1.0, -1.0) * s,
                    Vec3::new(1.0, -1.0, -1.0) * s,
                ];
                edges_at_distance(&verts, verts[0].distance(verts[1]))
            }
            MeshKind::Icosahedron => {
                let phi = (1.0 + 5f32.sqrt()) * 0.5;
                let scale = 0.5 / (1.0 + phi * phi).sqrt();
                let mut verts = Vec::with_capacity(12);
                for a in [-1.0, 1.0] {
                    for b in [-phi, phi] {
                        verts.push(Vec3::new(0.0, a, b) * scale);
                        verts.push(Vec3::new(a, b, 0.0) * scale);
                        verts.push(Vec3::new(b, 0.0, a) * scale);
                    }
                }
                edges_at_distance(&verts, 2.0 * scale)
            }
            MeshKind::Torus => {
                let (major, minor) = (0.4, 0.15);
                let (rings, sides) = (16, 8);
                let point = |i: usize, j: usize| {
                    let u = i as f32 / rings as f32 * TAU;
                    let v = j as f32 / sides as f32 * TAU;
                    let r = major + minor * v.cos();
                    Vec3::new(r * u.cos(), r * u.sin(), minor * v.sin())
                };
                let mut edges = Vec::with_capacity(rings * sides * 2);
                for i in 0..rings {
                    for j in 0..sides {
                        edges.push([point(i, j), point((i + 1) % rings, j)]);
                        edges.push([point(i, j), point(i, (j + 1) % sides)]);
                    }
                }
                edges
            }
            MeshKind::Box => {
                let h = 0.3;
                let mut corners = Vec::with_capacity(8);
                for x in [-h, h] {
                    for y in [-h, h] {
                        for z in [-h, h] {
                            corners.push(Vec3::new(x, y, z));
                        }
                    }
                }
                edges_at_distance(&corners, 2.0 * h)
            }
        }
    }
}

/// Every vertex pair exactly `length` apart (within tolerance).
fn edges_at_distance(verts: &[Vec3], length: f32) -> Vec<[Vec3; 2]> {
    let mut edges = Vec::new();
    for i in 0..verts.len() {
        for j in (i + 1)..verts.len() {
            if (verts[i].distance(verts[j]) - length).abs() < 1e-3 {
                edges.push([verts[i], verts[j]]);
            }
        }
    }
    edges
}

/// One floating mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshInstance {
    pub kind: MeshKind,
    pub position: Vec3,
    /// Euler angles (x, y, z) in radians.
    pub rotation: Vec3,
    pub spin: Vec3,
    pub float_speed: f32,
    pub float_offset: f32,
    pub color: Vec3,
    pub wireframe: bool,
    pub opacity: f32,
}

impl MeshInstance {
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_rotation_translation(rotation, self.position)
    }
}

/// Mesh field tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub count: usize,
    /// Half extents of the spawn box.
    pub spawn_extent: Vec3,
    /// Maximum spin per tick on each axis.
    pub max_spin: Vec3,
    pub float_speed: (f32, f32),
    /// Sideways drift per tick.
    pub sway: f32,
    pub wireframe_chance: f32,
    pub wireframe_opacity: f32,
    pub solid_opacity: f32,
    /// Wrap limits on |x| and |y|.
    pub wrap_x: f32,
    pub wrap_y: f32,
    /// Field time advance per tick.
    pub time_step: f32,
    /// Whole-scene y rotation per tick.
    pub scene_spin: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            count: 25,
            spawn_extent: Vec3::new(17.5, 12.5, 10.0),
            max_spin: Vec3::new(0.01, 0.01, 0.005),
            float_speed: (0.005, 0.015),
            sway: 0.01,
            wireframe_chance: 0.5,
            wireframe_opacity: 0.4,
            solid_opacity: 0.3,
            wrap_x: 20.0,
            wrap_y: 15.0,
            time_step: 0.01,
            scene_spin: 0.0002,
        }
    }
}

/// The animated set of mesh instances.
#[derive(Debug, Clone)]
pub struct AmbientField {
    config: AmbientConfig,
    instances: Vec<MeshInstance>,
    time: f32,
    scene_rotation: f32,
}

impl AmbientField {
    pub fn new<R: Rng + ?Sized>(config: AmbientConfig, colors: ColorPair, rng: &mut R) -> Self {
        let instances = (0..config.count)
            .map(|_| {
                let kind = MeshKind::ALL[rng.gen_range(0..MeshKind::ALL.len())];
                let wireframe = rng.gen::<f32>() < config.wireframe_chance;
                let signed = |rng: &mut R| rng.gen::<f32>() * 2.0 - 1.0;
                MeshInstance {
                    kind,
                    position: Vec3::new(signed(rng), signed(rng), signed(rng)) * config.spawn_extent,
                    rotation: Vec3::ZERO,
                    spin: Vec3::new(signed(rng), signed(rng), signed(rng)) * config.max_spin,
                    float_speed: rng.gen_range(config.float_speed.0..=config.float_speed.1),
                    float_offset: rng.gen_range(0.0..TAU),
                    color: colors.sample(rng),
                    wireframe,
                    opacity: if wireframe { config.wireframe_opacity } else { config.solid_opacity },
                }
            })
            .collect();
        Self { config, instances, time: 0.0, scene_rotation: 0.0 }
    }

    pub fn instances(&self) -> &[MeshInstance] {
        &self.instances
    }

    /// Whole-scene rotation around y in radians.
    pub fn scene_rotation(&self) -> f32 {
        self.scene_rotation
    }

    /// Advance one tick. `k` is the frame scale (`dt · 60`).
    pub fn update(&mut self, k: f32) {
        let cfg = &self.config;
        self.time += cfg.time_step * k;
        let time = self.time;
        for mesh in &mut self.instances {
            mesh.rotation += mesh.spin * k;
            mesh.position.y += (time + mesh.float_offset).sin() * mesh.float_speed * k;
            mesh.position.x += (time * 0.5 + mesh.float_offset).cos() * cfg.sway * k;

            if mesh.position.y > cfg.wrap_y {
                mesh.position.y = -cfg.wrap_y;
            } else if mesh.position.y < -cfg.wrap_y {
                mesh.position.y = cfg.wrap_y;
            }
            if mesh.position.x > cfg.wrap_x {
                mesh.position.x = -cfg.wrap_x;
            } else if mesh.position.x < -cfg.wrap_x {
                mesh.position.x = cfg.wrap_x;
            }
        }
        self.scene_rotation = (self.scene_rotation + cfg.scene_spin * k) % (2.0 * PI);
    }

    /// Redraw every instance colour from `colors`.
    pub fn recolor<R: Rng + ?Sized>(&mut self, colors: ColorPair, rng: &mut R) {
        for mesh in &mut self.instances {
            mesh.color = colors.sample(rng);
        }
    }

    /// Scene matrix applied on top of each instance's model matrix.
    pub fn scene_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.scene_rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::DEFAULT_PALETTES;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_edge_counts() {
        assert_eq!(MeshKind::Octahedron.edges().len(), 12);
        assert_eq!(MeshKind::Tetrahedron.edges().len(), 6);
        assert_eq!(MeshKind::Icosahedron.edges().len(), 30);
        assert_eq!(MeshKind::Box.edges().len(), 12);
        assert_eq!(MeshKind::Torus.edges().len(), 256);
    }

    #[test]
    fn test_spawn_within_box_with_opacity_rule() {
        let mut rng = SmallRng::seed_from_u64(41);
        let field = AmbientField::new(AmbientConfig::default(), DEFAULT_PALETTES[0], &mut rng);
        assert_eq!(field.instances().len(), 25);
        for mesh in field.instances() {
            assert!(mesh.position.abs().cmple(Vec3::new(17.5, 12.5, 10.0)).all());
            assert!(mesh.spin.abs().cmple(Vec3::new(0.01, 0.01, 0.005)).all());
            let expected = if mesh.wireframe { 0.4 } else { 0.3 };
            assert_eq!(mesh.opacity, expected);
        }
    }

    #[test]
    fn test_update_wraps_and_spins_scene() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut field = AmbientField::new(AmbientConfig::default(), DEFAULT_PALETTES[1], &mut rng);
        field.instances[0].position = Vec3::new(25.0, -16.0, 0.0);
        field.update(1.0);
        let p = field.instances()[0].position;
        assert_eq!(p.x, -20.0);
        assert_eq!(p.y, 15.0);
        assert!((field.scene_rotation() - 0.0002).abs() < 1e-7);
    }
}
