use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use wirequad_engine::device::diagnostics;
use wirequad_engine::render::{RenderCtx, RenderTarget};

use crate::rotation::Rotation;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const fn v(x: f32, y: f32) -> Vertex {
    Vertex { position: [x, y, 0.0] }
}

/// Square outline as a line list: each corner appears twice so every pair
/// of vertices is one edge.
#[rustfmt::skip]
pub const SQUARE_VERTICES: [Vertex; 8] = [
    v(-0.5,  0.5), v( 0.5,  0.5), // top
    v( 0.5,  0.5), v( 0.5, -0.5), // right
    v( 0.5, -0.5), v(-0.5, -0.5), // bottom
    v(-0.5, -0.5), v(-0.5,  0.5), // left
];

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TransformUniform {
    rotation: [[f32; 4]; 4],
}

/// Wireframe square renderer.
///
/// GPU resources are created on first use and rebuilt if the surface format
/// changes. If the shader fails to compile the errors are logged once and the
/// square is not drawn; frames are still cleared and presented.
#[derive(Default)]
pub struct SquareRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    transform_ubo: Option<wgpu::Buffer>,

    vertex_buffer: Option<wgpu::Buffer>,
}

impl SquareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the square outline rotated by `rotation` into `target`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        rotation: &Rotation,
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_vertex_buffer(ctx);
        self.ensure_bindings(ctx);

        let Some(ubo) = self.transform_ubo.as_ref() else { return };
        let uniform = TransformUniform {
            rotation: rotation.to_uniform(),
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniform));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else { return };

        let mut rpass = target.begin_pass("wirequad square pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
        rpass.draw(0..SQUARE_VERTICES.len() as u32, 0..1);
    }

    /// `pipeline_format` is recorded even when the build fails, so a broken
    /// shader is not recompiled every frame.
    fn needs_pipeline(&self, format: wgpu::TextureFormat) -> bool {
        self.pipeline_format != Some(format)
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if !self.needs_pipeline(ctx.surface_format) {
            return;
        }

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = None;
        self.bind_group_layout = None;
        self.bind_group = None;
        self.transform_ubo = None;

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("wirequad square shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/square.wgsl").into()),
        });
        if !diagnostics::check_shader("square shader", &shader) {
            log::error!("square pipeline not built; only the clear color will be drawn");
            return;
        }

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("wirequad square bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<TransformUniform>() as u64,
                            ),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("wirequad square pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("wirequad square pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
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
        });

        log::debug!("square pipeline built for {:?}", ctx.surface_format);

        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.transform_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let transform_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wirequad square transform ubo"),
            size: std::mem::size_of::<TransformUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("wirequad square bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_ubo.as_entire_binding(),
            }],
        });

        self.transform_ubo = Some(transform_ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_vertex_buffer(&mut self, ctx: &RenderCtx<'_>) {
        if self.vertex_buffer.is_some() {
            return;
        }

        self.vertex_buffer = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("wirequad square vbo"),
            contents: bytemuck::cast_slice(&SQUARE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));
    }
}
