//! wgpu implementation of [`RenderBackend`].
//!
//! Two pipelines share one uniform buffer: instanced point sprites and a line
//! list. Mesh instances are expanded to their edge lists on upload and drawn
//! through the line pipeline. Vertex buffers grow to the next power of two
//! when an upload outgrows them.

use std::borrow::Cow;
use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};
use log::debug;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::ambient::MeshKind;
use crate::backend::{CameraUniform, LinkVertex, MeshInstanceGpu, PointVertex, RenderBackend, Viewport};
use crate::camera::Camera;
use crate::error::{BackendError, EngineError};
use crate::shaders;

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.02, g: 0.02, b: 0.05, a: 1.0 };

/// A vertex buffer that grows on demand.
struct DynamicBuffer {
    label: &'static str,
    buffer: wgpu::Buffer,
    capacity: u64,
    count: u32,
}

impl DynamicBuffer {
    fn new(device: &wgpu::Device, label: &'static str, capacity: u64) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { label, buffer, capacity, count: 0 }
    }

    fn write<T: bytemuck::Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, items: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(items);
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            debug!("growing {} to {} bytes", self.label, capacity);
            self.buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(self.label),
                contents: &{
                    let mut padded = bytes.to_vec();
                    padded.resize(capacity as usize, 0);
                    padded
                },
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
            self.capacity = capacity;
        } else if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
        self.count = items.len() as u32;
    }
}

/// Window-backed renderer.
pub struct GpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    point_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    points: DynamicBuffer,
    lines: DynamicBuffer,
    link_vertices: Vec<LinkVertex>,
    mesh_vertices: Vec<LinkVertex>,
    edges: Vec<Vec<[Vec3; 2]>>,
}

impl GpuBackend {
    /// Set up a surface on `window`.
    ///
    /// Fails with [`EngineError::RenderBackendUnavailable`] if no adapter,
    /// device or surface can be created.
    pub async fn new(window: Arc<Window>) -> Result<Self, EngineError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window).map_err(|e| unavailable("surface", e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| EngineError::RenderBackendUnavailable("no compatible adapter".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| unavailable("device", e))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| EngineError::RenderBackendUnavailable("surface reports no formats".into()))?;
        let alpha_mode = surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::bytes_of(&CameraUniform::new(&Camera::default(), Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let point_attributes = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x4];
        let point_pipeline = create_pipeline(
            &device,
            &layout,
            "Point",
            &shaders::point_shader(),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &point_attributes,
            },
            wgpu::PrimitiveTopology::TriangleList,
            surface_format,
        );

        let line_attributes = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];
        let line_pipeline = create_pipeline(
            &device,
            &layout,
            "Line",
            &shaders::line_shader(),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LinkVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[line_attributes[0], wgpu::VertexAttribute { offset: 16, ..line_attributes[1] }],
            },
            wgpu::PrimitiveTopology::LineList,
            surface_format,
        );

        let points = DynamicBuffer::new(&device, "Point Buffer", 4096 * std::mem::size_of::<PointVertex>() as u64);
        let lines = DynamicBuffer::new(&device, "Line Buffer", 8192 * std::mem::size_of::<LinkVertex>() as u64);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            point_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            points,
            lines,
            link_vertices: Vec::new(),
            mesh_vertices: Vec::new(),
            edges: MeshKind::ALL.iter().map(|k| k.edges()).collect(),
        })
    }

    /// Reconfigure the surface. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }
}

impl RenderBackend for GpuBackend {
    fn viewport(&self) -> Option<Viewport> {
        Some(Viewport::new(self.config.width, self.config.height))
    }

    fn upload_points(&mut self, points: &[PointVertex]) {
        self.points.write(&self.device, &self.queue, points);
    }

    fn upload_links(&mut self, links: &[LinkVertex]) {
        self.link_vertices.clear();
        self.link_vertices.extend_from_slice(links);
    }

    fn upload_meshes(&mut self, meshes: &[MeshInstanceGpu]) {
        self.mesh_vertices.clear();
        for mesh in meshes {
            let model = Mat4::from_cols_array_2d(&mesh.model);
            let color = Vec4::from_array(mesh.color);
            let Some(edges) = self.edges.get(mesh.kind as usize) else {
                continue;
            };
            for [a, b] in edges {
                for p in [a, b] {
                    self.mesh_vertices.push(LinkVertex::new(model.transform_point3(*p), color.truncate(), color.w));
                }
            }
        }
    }

    fn draw(&mut self, camera: &Camera, model: Mat4) -> Result<(), BackendError> {
        let mut all_lines = std::mem::take(&mut self.link_vertices);
        all_lines.extend_from_slice(&self.mesh_vertices);
        self.lines.write(&self.device, &self.queue, &all_lines);
        all_lines.clear();
        self.link_vertices = all_lines;

        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&CameraUniform::new(camera, model)));

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(&self.device, &self.config);
                return Err(BackendError(format!("surface reconfigured: {e}")));
            }
            Err(e) => return Err(BackendError(e.to_string())),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            if self.lines.count > 0 {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.lines.buffer.slice(..));
                render_pass.draw(0..self.lines.count, 0..1);
            }
            if self.points.count > 0 {
                render_pass.set_pipeline(&self.point_pipeline);
                render_pass.set_vertex_buffer(0, self.points.buffer.slice(..));
                render_pass.draw(0..6, 0..self.points.count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn unavailable(what: &str, err: impl std::fmt::Display) -> EngineError {
    EngineError::RenderBackendUnavailable(format!("{what}: {err}"))
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    label: &str,
    source: &str,
    buffer: wgpu::VertexBufferLayout<'_>,
    topology: wgpu::PrimitiveTopology,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_main"),
            buffers: &[buffer],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
