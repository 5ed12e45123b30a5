//! wgpu rendering host.
//!
//! Draws the particle cloud as round, additively blended point sprites and
//! the bolt segments as a fixed-size green line list. Both layers share one
//! uniform buffer holding `view_proj * model`.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use winit::window::Window;

use crate::effects::Segment;
use crate::error::HostError;
use crate::field::Particle;
use crate::host::{FrameView, RenderHost};

/// WGSL source for both pipelines.
pub const BACKDROP_SHADER: &str = include_str!("backdrop.wgsl");

const QUAD_VERTICES: u32 = 6;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    mvp: [[f32; 4]; 4],
    viewport: [f32; 2],
    _padding: [f32; 2],
}

/// Per-instance particle data, 32 bytes.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PointInstance {
    position: [f32; 3],
    size: f32,
    color: [f32; 3],
    _pad: f32,
}

impl From<&Particle> for PointInstance {
    fn from(p: &Particle) -> Self {
        Self {
            position: p.position.to_array(),
            size: p.size,
            color: p.color.to_array(),
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LineVertex {
    position: [f32; 3],
    _pad: f32,
}

impl LineVertex {
    fn pair(segment: &Segment) -> [LineVertex; 2] {
        [
            LineVertex {
                position: segment.start.to_array(),
                _pad: 0.0,
            },
            LineVertex {
                position: segment.end.to_array(),
                _pad: 0.0,
            },
        ]
    }
}

const POINT_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x3];
const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

/// Additive blending, matching how overlapping flashes should read.
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Window-backed [`RenderHost`].
pub struct GpuHost {
    surface: Option<wgpu::Surface<'static>>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    point_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    line_buffer: wgpu::Buffer,
    instances: Vec<PointInstance>,
    lines: Vec<LineVertex>,
    particle_capacity: usize,
    segment_capacity: usize,
}

impl GpuHost {
    /// Create the surface, device and both pipelines for a window.
    ///
    /// `particle_capacity` and `segment_capacity` size the vertex buffers; frames
    /// with more particles or segments than that are truncated.
    pub async fn new(
        window: Arc<Window>,
        particle_capacity: usize,
        segment_capacity: usize,
    ) -> Result<Self, HostError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(HostError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Backdrop Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| HostError::Other("surface reports no texture formats".into()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

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

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Backdrop Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let particle_capacity = particle_capacity.max(1);
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Instance Buffer"),
            size: (particle_capacity * std::mem::size_of::<PointInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let segment_capacity = segment_capacity.max(1);
        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bolt Line Buffer"),
            size: (segment_capacity * 2 * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Backdrop Uniform Bind Group Layout"),
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
            label: Some("Backdrop Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Backdrop Shader"),
            source: wgpu::ShaderSource::Wgsl(BACKDROP_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Backdrop Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let point_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            PipelineKind::Points,
        );
        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            surface_format,
            PipelineKind::Lines,
        );

        tracing::info!(
            adapter = %adapter.get_info().name,
            width = config.width,
            height = config.height,
            "render host ready"
        );

        Ok(Self {
            surface: Some(surface),
            device,
            queue,
            config,
            point_pipeline,
            line_pipeline,
            uniform_buffer,
            uniform_bind_group,
            instance_buffer,
            line_buffer,
            instances: Vec::with_capacity(particle_capacity),
            lines: Vec::with_capacity(segment_capacity * 2),
            particle_capacity,
            segment_capacity,
        })
    }

    /// Current surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn upload(&mut self, frame: &FrameView<'_>) {
        let uniforms = Uniforms {
            mvp: (frame.view_proj * frame.model).to_cols_array_2d(),
            viewport: [self.config.width as f32, self.config.height as f32],
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        self.instances.clear();
        self.instances.extend(
            frame
                .particles
                .iter()
                .take(self.particle_capacity)
                .map(PointInstance::from),
        );
        if !self.instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
        }

        self.lines.clear();
        if frame.segments_visible {
            self.lines.extend(
                frame
                    .segments
                    .iter()
                    .take(self.segment_capacity)
                    .flat_map(LineVertex::pair),
            );
        }
        if !self.lines.is_empty() {
            self.queue
                .write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&self.lines));
        }
    }
}

impl RenderHost for GpuHost {
    fn present(&mut self, frame: &FrameView<'_>) -> Result<(), HostError> {
        self.upload(frame);

        let surface = self
            .surface
            .as_ref()
            .ok_or_else(|| HostError::Other("render host is detached".into()))?;
        let output = surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Backdrop Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Backdrop Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            if !self.instances.is_empty() {
                render_pass.set_pipeline(&self.point_pipeline);
                render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
                render_pass.draw(0..QUAD_VERTICES, 0..self.instances.len() as u32);
            }

            if !self.lines.is_empty() {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                render_pass.draw(0..self.lines.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
    }

    fn detach(&mut self) {
        if self.surface.take().is_some() {
            tracing::debug!("render surface released");
        }
    }
}

#[derive(Clone, Copy)]
enum PipelineKind {
    Points,
    Lines,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    kind: PipelineKind,
) -> wgpu::RenderPipeline {
    let (label, vs, fs, topology, buffer) = match kind {
        PipelineKind::Points => (
            "Particle Pipeline",
            "vs_point",
            "fs_point",
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &POINT_ATTRIBUTES,
            },
        ),
        PipelineKind::Lines => (
            "Bolt Pipeline",
            "vs_line",
            "fs_line",
            wgpu::PrimitiveTopology::LineList,
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &LINE_ATTRIBUTES,
            },
        ),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            buffers: &[buffer],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(ADDITIVE),
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
