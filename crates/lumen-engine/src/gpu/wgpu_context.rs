use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

use crate::draw::Color;

use super::surface;
use super::{Attribute, GpuContext, GpuInit, PresentOutcome, Primitive, Program, TextureId};

const MIN_BUFFER_BYTES: u64 = 64 * 1024;

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];
const TEXCOORD_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];

fn attribute_layout(attribute: Attribute) -> wgpu::VertexBufferLayout<'static> {
    let attributes: &'static [wgpu::VertexAttribute] = match attribute {
        Attribute::Position => &POSITION_ATTRS,
        Attribute::Color => &COLOR_ATTRS,
        Attribute::TexCoord => &TEXCOORD_ATTRS,
    };
    wgpu::VertexBufferLayout {
        array_stride: (attribute.components() * size_of::<f32>()) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

// ── staging ───────────────────────────────────────────────────────────────

/// CPU-side data for one attribute channel, accumulated over a frame and
/// written to its vertex buffer once at present time.
struct Channel {
    attribute: Attribute,
    staged: Vec<f32>,
    /// First vertex of the most recent upload.
    base: u32,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
}

impl Channel {
    fn new(attribute: Attribute) -> Self {
        Self { attribute, staged: Vec::new(), base: 0, buffer: None, capacity: 0 }
    }

    fn stride(&self) -> u64 {
        (self.attribute.components() * size_of::<f32>()) as u64
    }

    fn push(&mut self, data: &[f32]) {
        self.base = (self.staged.len() / self.attribute.components()) as u32;
        self.staged.extend_from_slice(data);
    }

    fn reset(&mut self) {
        self.staged.clear();
        self.base = 0;
    }

    fn staged_bytes(&self) -> u64 {
        (self.staged.len() * size_of::<f32>()) as u64
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, label: &str) {
        let required = self.staged_bytes();
        if required <= self.capacity && self.buffer.is_some() {
            return;
        }
        let capacity = required.next_power_of_two().max(MIN_BUFFER_BYTES);
        if let Some(old) = self.buffer.take() {
            old.destroy();
        }
        log::debug!("growing {label} vertex buffer to {capacity} bytes");
        self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.capacity = capacity;
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, label: &str) {
        if self.staged.is_empty() {
            return;
        }
        self.ensure_capacity(device, label);
        if let Some(buffer) = self.buffer.as_ref() {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&self.staged));
        }
    }

    /// Slice covering `count` vertices after `base + first`.
    fn slice(&self, base: u32, first: u32, count: u32) -> Option<wgpu::BufferSlice<'_>> {
        let buffer = self.buffer.as_ref()?;
        let start = u64::from(base + first) * self.stride();
        let end = start + u64::from(count) * self.stride();
        (end <= self.staged_bytes()).then(|| buffer.slice(start..end))
    }

    fn destroy(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            buffer.destroy();
        }
        self.capacity = 0;
        self.reset();
    }
}

/// A draw recorded during the frame and replayed in the render pass.
#[derive(Debug, Copy, Clone)]
struct DrawOp {
    program: Program,
    primitive: Primitive,
    texture: Option<TextureId>,
    position_base: u32,
    color_base: u32,
    texcoord_base: u32,
    first: u32,
    count: u32,
}

struct Pipelines {
    shape_lines: wgpu::RenderPipeline,
    shape_triangles: wgpu::RenderPipeline,
    textured: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
}

impl Pipelines {
    fn select(&self, program: Program, primitive: Primitive) -> Option<&wgpu::RenderPipeline> {
        match (program, primitive) {
            (Program::Shape, Primitive::Lines) => Some(&self.shape_lines),
            (Program::Shape, Primitive::Triangles) => Some(&self.shape_triangles),
            (Program::Texture, Primitive::Triangles) => Some(&self.textured),
            (Program::Texture, Primitive::Lines) => None,
        }
    }
}

// ── context ───────────────────────────────────────────────────────────────

/// [`GpuContext`] backed by wgpu and a window surface.
///
/// Uploads and draws are recorded during the frame. `present` writes each
/// attribute channel to its vertex buffer once, replays the recorded draws in
/// a single render pass that clears to the `begin_frame` color, and presents.
pub struct WgpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    preferred_present_mode: wgpu::PresentMode,

    pipelines: Option<Pipelines>,
    sampler: Option<wgpu::Sampler>,
    textures: HashMap<TextureId, wgpu::Texture>,
    bind_groups: HashMap<TextureId, wgpu::BindGroup>,
    next_texture: u32,

    positions: Channel,
    colors: Channel,
    texcoords: Channel,

    program: Program,
    bound_texture: Option<TextureId>,
    ops: Vec<DrawOp>,
    clear: Color,

    disposed: bool,
    warned_disposed: bool,
}

impl WgpuContext {
    /// Creates a context rendering into `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: Arc<Window>, init: GpuInit, vsync: bool) -> Result<Self> {
        let size = window.inner_size();

        let GpuInit {
            power_preference,
            prefer_srgb,
            vsync_present_mode: present_mode,
            alpha_mode,
            required_features,
            required_limits,
            frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, prefer_srgb)
            .context("no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: surface::present_mode(vsync, present_mode),
            alpha_mode: surface::choose_alpha_mode(&caps, alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: frame_latency,
        };
        if size.width > 0 && size.height > 0 {
            surface.configure(&device, &config);
        }

        log::info!(
            "gpu ready: {:?} ({:?}), surface {format:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            size.width,
            size.height,
        );

        let pipelines = create_pipelines(&device, format);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            preferred_present_mode: present_mode,
            pipelines: Some(pipelines),
            sampler: Some(sampler),
            textures: HashMap::new(),
            bind_groups: HashMap::new(),
            next_texture: 0,
            positions: Channel::new(Attribute::Position),
            colors: Channel::new(Attribute::Color),
            texcoords: Channel::new(Attribute::TexCoord),
            program: Program::Shape,
            bound_texture: None,
            ops: Vec::new(),
            clear: Color::BLACK,
            disposed: false,
            warned_disposed: false,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn alive(&mut self) -> bool {
        if self.disposed && !self.warned_disposed {
            log::warn!("gpu context used after dispose; call ignored");
            self.warned_disposed = true;
        }
        !self.disposed
    }

    fn reset_frame(&mut self) {
        self.positions.reset();
        self.colors.reset();
        self.texcoords.reset();
        self.ops.clear();
        self.bound_texture = None;
    }

    fn render(&mut self, target: &wgpu::TextureView) {
        self.positions.write(&self.device, &self.queue, "lumen positions");
        self.colors.write(&self.device, &self.queue, "lumen colors");
        self.texcoords.write(&self.device, &self.queue, "lumen texcoords");

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lumen frame encoder"),
        });

        let [r, g, b, a] = self.clear.to_array().map(f64::from);
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some(pipelines) = self.pipelines.as_ref() {
                for op in &self.ops {
                    let Some(pipeline) = pipelines.select(op.program, op.primitive) else {
                        continue;
                    };
                    let Some(positions) = self.positions.slice(op.position_base, op.first, op.count) else {
                        continue;
                    };
                    let Some(colors) = self.colors.slice(op.color_base, op.first, op.count) else {
                        continue;
                    };

                    rpass.set_pipeline(pipeline);
                    rpass.set_vertex_buffer(0, positions);
                    rpass.set_vertex_buffer(1, colors);

                    if op.program == Program::Texture {
                        let Some(bind_group) = op.texture.and_then(|t| self.bind_groups.get(&t)) else {
                            continue;
                        };
                        let Some(uvs) = self.texcoords.slice(op.texcoord_base, op.first, op.count) else {
                            continue;
                        };
                        rpass.set_vertex_buffer(2, uvs);
                        rpass.set_bind_group(0, bind_group, &[]);
                    }

                    rpass.draw(0..op.count, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl GpuContext for WgpuContext {
    fn use_program(&mut self, program: Program) {
        if self.alive() {
            self.program = program;
        }
    }

    fn upload(&mut self, attribute: Attribute, data: &[f32]) {
        if !self.alive() {
            return;
        }
        match attribute {
            Attribute::Position => self.positions.push(data),
            Attribute::Color => self.colors.push(data),
            Attribute::TexCoord => self.texcoords.push(data),
        }
    }

    fn bind_texture(&mut self, texture: TextureId) {
        if self.alive() {
            self.bound_texture = Some(texture);
        }
    }

    fn draw(&mut self, primitive: Primitive, first: u32, count: u32) {
        if !self.alive() || count == 0 {
            return;
        }
        if self.program == Program::Texture && primitive == Primitive::Lines {
            log::warn!("textured line draws are not supported; skipped");
            return;
        }
        self.ops.push(DrawOp {
            program: self.program,
            primitive,
            texture: self.bound_texture,
            position_base: self.positions.base,
            color_base: self.colors.base,
            texcoord_base: self.texcoords.base,
            first,
            count,
        });
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        if !self.alive() {
            return id;
        }
        if width == 0 || height == 0 || rgba.len() != (width as usize) * (height as usize) * 4 {
            log::warn!("rejected texture {width}x{height} with {} bytes", rgba.len());
            return id;
        }
        let (Some(pipelines), Some(sampler)) = (self.pipelines.as_ref(), self.sampler.as_ref()) else {
            return id;
        };

        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lumen texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_rgba(&self.queue, &texture, 0, 0, width, height, rgba);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen texture bind group"),
            layout: &pipelines.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        log::debug!("created texture {id:?} ({width}x{height})");
        self.textures.insert(id, texture);
        self.bind_groups.insert(id, bind_group);
        id
    }

    fn update_texture(&mut self, texture: TextureId, x: u32, y: u32, width: u32, height: u32, rgba: &[u8]) {
        if !self.alive() || width == 0 || height == 0 {
            return;
        }
        let Some(target) = self.textures.get(&texture) else {
            log::warn!("update of unknown texture {texture:?}");
            return;
        };
        if x + width > target.width() || y + height > target.height() {
            log::warn!("texture update {x},{y} {width}x{height} outside {texture:?}");
            return;
        }
        write_rgba(&self.queue, target, x, y, width, height, rgba);
    }

    fn release_texture(&mut self, texture: TextureId) {
        if !self.alive() {
            return;
        }
        self.bind_groups.remove(&texture);
        if let Some(t) = self.textures.remove(&texture) {
            t.destroy();
        }
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
    }

    fn begin_frame(&mut self, clear: Color) {
        if self.alive() {
            self.reset_frame();
            self.clear = clear;
        }
    }

    fn present(&mut self) -> PresentOutcome {
        if !self.alive() {
            return PresentOutcome::Skipped;
        }
        if self.config.width == 0 || self.config.height == 0 {
            self.reset_frame();
            return PresentOutcome::Skipped;
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("surface error: {err:?}");
                self.reset_frame();
                return surface::map_surface_error(&self.surface, &self.device, &self.config, err);
            }
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.render(&view);
        frame.present();

        self.reset_frame();
        PresentOutcome::Presented
    }

    fn resize(&mut self, width: u32, height: u32) {
        if !self.alive() {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        // wgpu cannot configure a 0x0 surface; present skips until the next resize.
        if width > 0 && height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn set_vsync(&mut self, enabled: bool) {
        if !self.alive() {
            return;
        }
        self.config.present_mode = surface::present_mode(enabled, self.preferred_present_mode);
        if self.config.width > 0 && self.config.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.reset_frame();

        self.bind_groups.clear();
        self.sampler = None;

        for (_, texture) in self.textures.drain() {
            texture.destroy();
        }
        self.positions.destroy();
        self.colors.destroy();
        self.texcoords.destroy();

        self.pipelines = None;

        self.disposed = true;
        log::debug!("gpu resources released");
    }
}

fn write_rgba(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    rgba: &[u8],
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x, y, z: 0 },
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
    );
}

// ── pipelines ─────────────────────────────────────────────────────────────

fn create_pipelines(device: &wgpu::Device, format: wgpu::TextureFormat) -> Pipelines {
    let shape_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("lumen shape shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shape.wgsl").into()),
    });
    let texture_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("lumen texture shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/texture.wgsl").into()),
    });

    let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("lumen texture bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let shape_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("lumen shape pipeline layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });
    let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("lumen texture pipeline layout"),
        bind_group_layouts: &[&texture_layout],
        immediate_size: 0,
    });

    let shape_buffers = [attribute_layout(Attribute::Position), attribute_layout(Attribute::Color)];
    let textured_buffers = [
        attribute_layout(Attribute::Position),
        attribute_layout(Attribute::Color),
        attribute_layout(Attribute::TexCoord),
    ];

    Pipelines {
        shape_lines: build_pipeline(
            device,
            format,
            PipelineDesc {
                label: "lumen shape lines pipeline",
                layout: &shape_layout,
                shader: &shape_shader,
                buffers: &shape_buffers,
                topology: wgpu::PrimitiveTopology::LineList,
            },
        ),
        shape_triangles: build_pipeline(
            device,
            format,
            PipelineDesc {
                label: "lumen shape triangles pipeline",
                layout: &shape_layout,
                shader: &shape_shader,
                buffers: &shape_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
            },
        ),
        textured: build_pipeline(
            device,
            format,
            PipelineDesc {
                label: "lumen texture pipeline",
                layout: &textured_layout,
                shader: &texture_shader,
                buffers: &textured_buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
            },
        ),
        texture_layout,
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
}

fn build_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    desc: PipelineDesc<'_>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: desc.buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: desc.topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
