//! WGSL sources for the point and line renderer.
//!
//! Both shaders share the [`CameraUniform`](crate::backend::CameraUniform)
//! block at `@group(0) @binding(0)`. Points are drawn as instanced quads
//! (six vertices per [`PointVertex`](crate::backend::PointVertex) instance)
//! with a soft round falloff; links are a plain line list of
//! [`LinkVertex`](crate::backend::LinkVertex) pairs.

/// Uniform block declaration shared by both shaders.
const CAMERA_BLOCK: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    viewport: vec2<f32>,
    point_scale: f32,
    _pad: f32,
};

@group(0) @binding(0)
var<uniform> camera: Camera;
"#;

const POINT_BODY: &str = r#"
struct PointOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) local: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec4<f32>,
) -> PointOut {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let corner = corners[vertex_index % 6u];

    let center = camera.view_proj * camera.model * vec4<f32>(position, 1.0);
    // size * point_scale / w pixels, expressed in clip space (w cancels)
    let offset = corner * size * camera.point_scale * 2.0 / camera.viewport;

    var out: PointOut;
    out.clip_position = center + vec4<f32>(offset, 0.0, 0.0);
    out.color = color;
    out.local = corner;
    return out;
}

@fragment
fn fs_main(in: PointOut) -> @location(0) vec4<f32> {
    let d = length(in.local);
    if d > 1.0 {
        discard;
    }
    let falloff = 1.0 - smoothstep(0.6, 1.0, d);
    return vec4<f32>(in.color.rgb, in.color.a * falloff);
}
"#;

const LINE_BODY: &str = r#"
struct LineOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
) -> LineOut {
    var out: LineOut;
    out.clip_position = camera.view_proj * camera.model * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: LineOut) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Point sprite shader.
pub fn point_shader() -> String {
    format!("{CAMERA_BLOCK}{POINT_BODY}")
}

/// Line list shader for links and mesh edges.
pub fn line_shader() -> String {
    format!("{CAMERA_BLOCK}{LINE_BODY}")
}
