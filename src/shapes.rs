//! Procedural shape generation.
//!
//! A shape maps `(index, total)` plus [`ShapeParams`] to a target position and
//! a size for every entity in the budget. Generation is pure apart from the
//! injected random source, so a seeded RNG reproduces a shape exactly.
//!
//! # Shape families
//!
//! | Shape | Construction |
//! |-------|--------------|
//! | [`ShapeId::Sphere`] | uniform directions, radius drawn from a band |
//! | [`ShapeId::Cube`] | uniform samples on the six faces of a box |
//! | [`ShapeId::Helix`] | `angle = (i/N)·8π`, constant radius, `y` linear in `i/N` |
//! | [`ShapeId::Wave`] | static height field `A·sin(f·x + φ)·cos(f·z)` |
//! | [`ShapeId::Bug`] | weighted parts: body, head, jointed legs, antennae, details |
//! | [`ShapeId::Ribbon`] | twisted band around a figure-eight curve |
//! | [`ShapeId::Constellation`] | anchor clusters, anchor-to-anchor lines, spiral arms |
//!
//! # Example
//!
//! ```ignore
//! use morphe::shapes::{generate_all, ShapeId, ShapeParams};
//!
//! let mut rng = rand::thread_rng();
//! let samples = generate_all(ShapeId::Helix, 2000, &ShapeParams::default(), &mut rng);
//! assert_eq!(samples.len(), 2000);
//! ```

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::PartKind;
use crate::error::EngineError;

/// Identifier of a target configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeId {
    Sphere,
    Cube,
    Helix,
    Wave,
    /// Articulated "computer bug" creature.
    Bug,
    Ribbon,
    Constellation,
}

impl ShapeId {
    /// Every supported shape, in menu order.
    pub const ALL: [ShapeId; 7] = [
        ShapeId::Sphere,
        ShapeId::Cube,
        ShapeId::Helix,
        ShapeId::Wave,
        ShapeId::Bug,
        ShapeId::Ribbon,
        ShapeId::Constellation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeId::Sphere => "sphere",
            ShapeId::Cube => "cube",
            ShapeId::Helix => "helix",
            ShapeId::Wave => "wave",
            ShapeId::Bug => "bug",
            ShapeId::Ribbon => "ribbon",
            ShapeId::Constellation => "constellation",
        }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ShapeId::ALL
            .into_iter()
            .find(|shape| shape.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EngineError::UnknownShape(s.to_string()))
    }
}

/// Global parameters shared by all shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeParams {
    /// Uniform scale applied to every shape's dimensions.
    pub scale: f32,
    /// Vertical offset of the shape centre.
    pub y_offset: f32,
    /// Radial band `[min, max)` for the sphere, before scaling.
    pub sphere_radius: (f32, f32),
    /// Half edge length of the cube, before scaling.
    pub cube_half_size: f32,
    pub helix_radius: f32,
    /// Helix sweep in full turns (4 turns = 8π).
    pub helix_turns: f32,
    pub helix_height: f32,
    pub wave_amplitude: f32,
    pub wave_frequency: f32,
    /// Half extent of the square the wave is sampled over.
    pub wave_half_extent: f32,
    /// Vertical squash of the constellation's spiral arms (1.0 = none).
    pub galaxy_flatten: f32,
    pub galaxy_arms: u32,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            y_offset: 0.0,
            sphere_radius: (12.0, 15.0),
            cube_half_size: 9.0,
            helix_radius: 7.0,
            helix_turns: 4.0,
            helix_height: 20.0,
            wave_amplitude: 3.0,
            wave_frequency: 3.0,
            wave_half_extent: 10.0,
            galaxy_flatten: 0.2,
            galaxy_arms: 3,
        }
    }
}

impl ShapeParams {
    /// Centre of the shape in world space.
    #[inline]
    pub fn center(&self) -> Vec3 {
        Vec3::new(0.0, self.y_offset, 0.0)
    }
}

/// Generated target for one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSample {
    pub position: Vec3,
    pub size: f32,
    pub part: PartKind,
}

impl ShapeSample {
    fn new(position: Vec3, size: f32) -> Self {
        Self { position, size, part: PartKind::Other }
    }

    fn part(mut self, part: PartKind) -> Self {
        self.part = part;
        self
    }
}

/// Generate the target of entity `index` out of `total` for `shape`.
pub fn generate<R: Rng + ?Sized>(
    shape: ShapeId,
    index: usize,
    total: usize,
    params: &ShapeParams,
    rng: &mut R,
) -> ShapeSample {
    let t = if total == 0 { 0.0 } else { index as f32 / total as f32 };
    match shape {
        ShapeId::Sphere => sphere(params, rng),
        ShapeId::Cube => cube(params, rng),
        ShapeId::Helix => helix(t, params, rng),
        ShapeId::Wave => wave(params, rng),
        ShapeId::Bug => bug(params, rng),
        ShapeId::Ribbon => ribbon(t, params, rng),
        ShapeId::Constellation => constellation(index, t, params, rng),
    }
}

/// Generate targets for the whole budget.
pub fn generate_all<R: Rng + ?Sized>(
    shape: ShapeId,
    total: usize,
    params: &ShapeParams,
    rng: &mut R,
) -> Vec<ShapeSample> {
    (0..total).map(|i| generate(shape, i, total, params, rng)).collect()
}

/// `Math.random() - 0.5` style symmetric noise in `[-0.5, 0.5)`.
#[inline]
fn centered<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() - 0.5
}

#[inline]
fn side(left: bool) -> f32 {
    if left { -1.0 } else { 1.0 }
}

// ========== Parametric surfaces ==========

fn sphere<R: Rng + ?Sized>(params: &ShapeParams, rng: &mut R) -> ShapeSample {
    let (r_min, r_max) = params.sphere_radius;
    let theta = rng.gen_range(0.0..TAU);
    let cos_phi: f32 = rng.gen_range(-1.0..=1.0);
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
    let radius = (r_min + rng.gen::<f32>() * (r_max - r_min)) * params.scale;

    let dir = Vec3::new(sin_phi * theta.cos(), cos_phi, sin_phi * theta.sin());
    ShapeSample::new(params.center() + dir * radius, rng.gen_range(0.5..2.0))
}

fn cube<R: Rng + ?Sized>(params: &ShapeParams, rng: &mut R) -> ShapeSample {
    let h = params.cube_half_size * params.scale;
    let face = rng.gen_range(0..6u32);
    let a = rng.gen_range(-h..h);
    let b = rng.gen_range(-h..h);
    let s = if face % 2 == 0 { h } else { -h };

    let local = match face / 2 {
        0 => Vec3::new(s, a, b),
        1 => Vec3::new(a, s, b),
        _ => Vec3::new(a, b, s),
    };
    ShapeSample::new(params.center() + local, rng.gen_range(0.5..2.0))
}

fn helix<R: Rng + ?Sized>(t: f32, params: &ShapeParams, rng: &mut R) -> ShapeSample {
    let angle = t * TAU * params.helix_turns;
    let radius = params.helix_radius * params.scale;
    let half = params.helix_height * 0.5;
    let y = (t * params.helix_height - half) * params.scale + params.y_offset;

    ShapeSample::new(
        Vec3::new(radius * angle.cos(), y, radius * angle.sin()),
        rng.gen_range(0.5..2.5),
    )
}

// ========== Field shapes ==========

fn wave<R: Rng + ?Sized>(params: &ShapeParams, rng: &mut R) -> ShapeSample {
    let extent = params.wave_half_extent * params.scale;
    let x = (rng.gen::<f32>() * 2.0 - 1.0) * extent;
    let z = (rng.gen::<f32>() * 2.0 - 1.0) * extent;
    let y = wave_height(x, z, 0.0, params) + params.y_offset;

    ShapeSample::new(Vec3::new(x, y, z), rng.gen_range(0.5..2.0))
}

/// Height of the wave field at `(x, z)` with phase `phase` (0 for the static shape).
pub fn wave_height(x: f32, z: f32, phase: f32, params: &ShapeParams) -> f32 {
    let amplitude = params.wave_amplitude * params.scale;
    let f = params.wave_frequency;
    amplitude * (f * x + FRAC_PI_2 + phase).sin() * (f * z + phase * 0.7).cos()
}

// ========== Composite creature ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BugPart {
    Body,
    Head,
    Legs,
    Antennae,
    Details,
}

/// Part weights; they sum to 1 and anything past the last band is `Details`.
const BUG_PARTS: [(BugPart, f32); 5] = [
    (BugPart::Body, 0.4),
    (BugPart::Head, 0.1),
    (BugPart::Legs, 0.3),
    (BugPart::Antennae, 0.1),
    (BugPart::Details, 0.1),
];

fn select_bug_part(selector: f32) -> BugPart {
    let mut threshold = 0.0;
    for (part, weight) in BUG_PARTS {
        threshold += weight;
        if selector < threshold {
            return part;
        }
    }
    BugPart::Details
}

/// Downward joint angles (radians) and lengths (fractions of body width)
/// of the three leg segments, from hip to foot.
const LEG_SEGMENTS: [(f32, f32); 3] = [(0.3, 0.6), (0.7, 0.7), (1.2, 0.4)];

fn bug<R: Rng + ?Sized>(params: &ShapeParams, rng: &mut R) -> ShapeSample {
    let body_length = 10.0 * params.scale;
    let body_width = 5.0 * params.scale;
    let body_height = 3.0 * params.scale;
    let yo = params.y_offset;

    match select_bug_part(rng.gen()) {
        BugPart::Body => {
            let u = rng.gen::<f32>() * TAU;
            let v = rng.gen::<f32>() * PI;
            let segments = 5;
            let segment = rng.gen_range(0..segments);
            let ratio = 0.8 + (segment as f32 / segments as f32) * 0.2;

            let x = u.cos() * v.sin() * body_width * 0.5 * ratio;
            let y = v.cos() * body_height * 0.5 * ratio + yo;
            let mut z = u.sin() * v.sin() * body_length * 0.5 * ratio;
            z -= (segment as f32 - segments as f32 / 2.0) * body_length * 0.1;

            ShapeSample::new(Vec3::new(x, y, z), rng.gen::<f32>() * 0.3 + 0.6).part(PartKind::Body)
        }
        BugPart::Head => {
            let u = rng.gen::<f32>() * TAU;
            let v = rng.gen::<f32>() * PI;
            let head_radius = body_height * 0.6;

            if rng.gen::<f32>() > 0.7 {
                // eye cluster
                let eye_offset = head_radius * 0.7;
                let eye_size = head_radius * 0.3;
                let x = centered(rng) * eye_size + if rng.gen::<bool>() { eye_offset } else { -eye_offset };
                let y = eye_size + yo + head_radius * 0.2;
                let z = body_length * 0.5 + head_radius * 0.7;
                return ShapeSample::new(Vec3::new(x, y, z), rng.gen::<f32>() * 0.2 + 0.3);
            }

            let pos = Vec3::new(
                u.cos() * v.sin() * head_radius,
                v.cos() * head_radius + yo,
                u.sin() * v.sin() * head_radius + body_length * 0.5,
            );
            ShapeSample::new(pos, 0.6)
        }
        BugPart::Legs => {
            let leg = rng.gen_range(0..6u32);
            let left = leg < 3;
            let dir = side(left);
            let z = ((leg % 3) as f32 - 1.0) * body_length * 0.25;

            // walk the joint chain up to the chosen segment
            let mut joint_x = dir * body_width * 0.5;
            let mut joint_y = -body_height * 0.2 + yo;
            let segment = rng.gen_range(0..LEG_SEGMENTS.len());
            for &(angle, length) in &LEG_SEGMENTS[..segment] {
                joint_x += dir * body_width * length * angle.cos();
                joint_y -= body_width * length * angle.sin();
            }

            let (angle, length) = LEG_SEGMENTS[segment];
            let along = rng.gen::<f32>() * body_width * length;
            let x = joint_x + dir * along * angle.cos();
            let y = joint_y - along * angle.sin();

            ShapeSample::new(Vec3::new(x, y, z), rng.gen::<f32>() * 0.2 + 0.4).part(PartKind::Leg)
        }
        BugPart::Antennae => {
            let dir = side(rng.gen::<bool>());
            let base = Vec3::new(
                dir * body_height * 0.3,
                body_height * 0.7 + yo,
                body_length * 0.5 + body_height * 0.5,
            );
            let t = rng.gen::<f32>();
            let antenna_length = body_length * 0.7;
            let curve = Vec3::new(
                base.x + dir * t * body_width * 0.3,
                base.y + (t * PI).sin() * body_height * 0.8,
                base.z + t * antenna_length,
            );
            let spread = t * 0.5;
            let jitter = Vec3::new(centered(rng), centered(rng), centered(rng)) * spread;

            ShapeSample::new(curve + jitter, (1.0 - t) * 0.3 + 0.1).part(PartKind::Antenna)
        }
        BugPart::Details => {
            if rng.gen::<f32>() < 0.7 {
                let dir = side(rng.gen::<bool>());
                let wing_offset = body_width * 0.3;
                let wing_length = body_length * 0.6;
                let wing_width = body_width * 0.8;
                let u = rng.gen::<f32>();
                let v = rng.gen::<f32>();

                let x = dir * (wing_offset + v * wing_width * 0.8 * (u * PI).sin());
                let y = body_height * 0.5 + yo + (v * PI).sin() * body_height * 0.1;
                let z = -body_length * 0.2 + u * wing_length;

                ShapeSample::new(Vec3::new(x, y, z), rng.gen::<f32>() * 0.3 + 0.2).part(PartKind::Wing)
            } else {
                // mandibles
                let dir = side(rng.gen::<bool>());
                let mandible_length = body_height * 0.4;
                let t = rng.gen::<f32>();
                let x = dir * body_height * 0.3 * (1.0 - t);
                let y = -body_height * 0.2 * t + yo;
                let z = body_length * 0.5 + body_height * 0.5 + mandible_length * t;

                ShapeSample::new(Vec3::new(x, y, z), rng.gen::<f32>() * 0.2 + 0.2)
            }
        }
    }
}

// ========== Curve-following ribbon ==========

fn ribbon<R: Rng + ?Sized>(t: f32, params: &ShapeParams, rng: &mut R) -> ShapeSample {
    let width = 10.0 * params.scale;
    let height = 6.0 * params.scale;
    let twists = 1.0;

    let u = t * TAU;
    let major = width * 0.8;
    let minor = height * 0.5;
    let base = Vec3::new(u.sin() * major, (u * 2.0).sin() * minor, u.cos() * major * 0.5);

    let thickness = 0.1;
    let offset = centered(rng) * width * thickness;
    let cross = rng.gen::<f32>();
    let twist = u * twists;

    let pos = Vec3::new(
        base.x + twist.cos() * offset * cross,
        base.y + params.y_offset,
        base.z + twist.sin() * offset * cross,
    );
    ShapeSample::new(pos, rng.gen::<f32>() * 1.5 + 0.5)
}

// ========== Constellation / galaxy ==========

/// Named anchor stars, in unscaled world units around the shape centre.
pub const CONSTELLATION_ANCHORS: [(&str, Vec3); 7] = [
    ("alkaid", Vec3::new(-11.0, 3.0, -2.0)),
    ("mizar", Vec3::new(-7.0, 4.5, 0.0)),
    ("alioth", Vec3::new(-3.5, 4.0, 1.0)),
    ("megrez", Vec3::new(0.0, 3.0, 0.0)),
    ("phecda", Vec3::new(1.0, -1.0, 1.5)),
    ("merak", Vec3::new(6.0, -1.5, 0.5)),
    ("dubhe", Vec3::new(6.5, 3.5, -1.0)),
];

/// Population fractions: anchor clusters, then connecting lines, rest spiral.
const CLUSTER_FRACTION: f32 = 0.35;
const LINE_FRACTION: f32 = 0.25;

fn constellation<R: Rng + ?Sized>(index: usize, t: f32, params: &ShapeParams, rng: &mut R) -> ShapeSample {
    let scale = params.scale;
    let center = params.center();
    let anchor = |i: usize| center + CONSTELLATION_ANCHORS[i].1 * scale;

    if t < CLUSTER_FRACTION {
        let a = anchor(index % CONSTELLATION_ANCHORS.len());
        let theta = rng.gen_range(0.0..TAU);
        let cos_phi: f32 = rng.gen_range(-1.0..=1.0);
        let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
        let r = rng.gen::<f32>().cbrt() * 1.2 * scale;
        let offset = Vec3::new(sin_phi * theta.cos(), cos_phi, sin_phi * theta.sin()) * r;

        ShapeSample::new(a + offset, rng.gen_range(0.8..1.8))
    } else if t < CLUSTER_FRACTION + LINE_FRACTION {
        let n = CONSTELLATION_ANCHORS.len();
        let from = rng.gen_range(0..n);
        let to = (from + rng.gen_range(1..n)) % n;
        let along = rng.gen::<f32>();
        let noise = Vec3::new(centered(rng), centered(rng), centered(rng)) * 0.6 * scale;

        ShapeSample::new(anchor(from).lerp(anchor(to), along) + noise, rng.gen_range(0.3..0.8))
    } else {
        // logarithmic spiral arms: r = a·e^(b·θ)
        let arms = params.galaxy_arms.max(1);
        let arm = (index as u32) % arms;
        let a = 1.5 * scale;
        let b = 0.25;
        let r = rng.gen_range(a..14.0 * scale.max(0.2));
        let theta = (r / a).ln() / b + arm as f32 * TAU / arms as f32;
        let spread = 0.15 * r;
        let pos = Vec3::new(
            r * theta.cos() + centered(rng) * spread,
            centered(rng) * spread * params.galaxy_flatten,
            r * theta.sin() + centered(rng) * spread,
        );

        ShapeSample::new(center + pos, rng.gen_range(0.4..1.2))
    }
}
