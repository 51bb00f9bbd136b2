//! Draw programs: the seam between the scene graph and the GPU.
//!
//! Scene traversal happens before a render pass exists, so [`ShaderProgram`]
//! records each draw together with the context state at that moment and
//! replays the queue when the viewer calls [`ShaderProgram::flush`].

use std::cell::RefCell;
use std::rc::Rc;

use wgpu::util::DeviceExt;

use crate::geometry::Geometry;
use crate::gpu::{DEPTH_FORMAT, GpuContext};
use crate::mesh::Vertex3d;
use crate::scene::RenderingContext;
use crate::texture::Texture;

/// Something that can draw a piece of geometry with the context's current
/// matrices and ambient state.
pub trait Program {
    fn render(&self, geometry: &Rc<Geometry>, ctx: &RenderingContext);
}

/// Per-draw uniforms, laid out to match the `Draw` struct in the shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniforms {
    pub mvp: [[f32; 4]; 4],
    pub mv: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub light_dir: [f32; 3],
    pub time: f32,
}

impl DrawUniforms {
    pub fn capture(ctx: &RenderingContext) -> Self {
        Self {
            mvp: ctx.mvp().to_cols_array_2d(),
            mv: ctx.mv().to_cols_array_2d(),
            color: ctx.color.to_array(),
            light_dir: ctx.light_dir.to_array(),
            time: ctx.elapsed_time_seconds as f32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgramKind {
    /// Flat fill with the context color.
    Monochrome,
    /// Context texture (white when none is bound) tinted by the context color.
    Textured,
    /// Context color lit by the context light direction.
    FlatShading,
}

impl ProgramKind {
    fn source(self) -> &'static str {
        match self {
            ProgramKind::Monochrome => include_str!("shaders/monochrome.wgsl"),
            ProgramKind::Textured => include_str!("shaders/textured.wgsl"),
            ProgramKind::FlatShading => include_str!("shaders/flat.wgsl"),
        }
    }

    fn label(self) -> &'static str {
        match self {
            ProgramKind::Monochrome => "Monochrome",
            ProgramKind::Textured => "Textured",
            ProgramKind::FlatShading => "Flat Shading",
        }
    }
}

struct QueuedDraw {
    geometry: Rc<Geometry>,
    uniforms: DrawUniforms,
    texture: Option<Rc<Texture>>,
}

/// A wgpu pipeline plus the draws queued against it this frame.
pub struct ShaderProgram {
    kind: ProgramKind,
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    default_texture: Texture,
    queue: RefCell<Vec<QueuedDraw>>,
}

impl ShaderProgram {
    pub fn new(gpu: &GpuContext, kind: ProgramKind) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} Shader", kind.label())),
            source: wgpu::ShaderSource::Wgsl(kind.source().into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniforms Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Texture Layout"),
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

        let textured_layouts = [&uniform_layout, &texture_layout];
        let bind_group_layouts: &[&wgpu::BindGroupLayout] = match kind {
            ProgramKind::Textured => &textured_layouts,
            ProgramKind::Monochrome | ProgramKind::FlatShading => &textured_layouts[..1],
        };

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", kind.label())),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Pipeline", kind.label())),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // No culling: the same quads are seen from above and below.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::debug!("created {} program", kind.label());

        Self {
            kind,
            pipeline,
            uniform_layout,
            texture_layout,
            default_texture: Texture::white(gpu),
            queue: RefCell::new(Vec::new()),
        }
    }

    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    /// Number of draws waiting for [`flush`](Self::flush).
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Drops queued draws without rendering them.
    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }

    /// Replays and clears the queued draws into `pass`.
    pub fn flush(&self, gpu: &GpuContext, pass: &mut wgpu::RenderPass<'_>) {
        let draws = std::mem::take(&mut *self.queue.borrow_mut());
        if draws.is_empty() {
            return;
        }

        pass.set_pipeline(&self.pipeline);
        for draw in &draws {
            // One buffer per draw: every draw in the pass keeps its own matrices.
            let buffer = gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Draw Uniforms"),
                    contents: bytemuck::bytes_of(&draw.uniforms),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
            let uniforms = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Draw Uniforms Bind Group"),
                layout: &self.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            pass.set_bind_group(0, &uniforms, &[]);

            if self.kind == ProgramKind::Textured {
                let texture = draw.texture.as_deref().unwrap_or(&self.default_texture);
                let bind_group = self.texture_bind_group(gpu, texture);
                pass.set_bind_group(1, &bind_group, &[]);
            }

            draw.geometry.gpu_mesh(gpu).draw(pass);
        }
    }

    fn texture_bind_group(&self, gpu: &GpuContext, texture: &Texture) -> wgpu::BindGroup {
        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Texture Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }
}

impl Program for ShaderProgram {
    fn render(&self, geometry: &Rc<Geometry>, ctx: &RenderingContext) {
        if geometry.is_empty() {
            return;
        }
        self.queue.borrow_mut().push(QueuedDraw {
            geometry: Rc::clone(geometry),
            uniforms: DrawUniforms::capture(ctx),
            texture: ctx.texture.clone(),
        });
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::{Ref, RefCell};
    use std::rc::Rc;

    use glam::Mat4;

    use super::Program;
    use crate::color::Color;
    use crate::geometry::Geometry;
    use crate::scene::RenderingContext;

    #[derive(Clone)]
    pub struct RecordedDraw {
        pub geometry: Rc<Geometry>,
        pub mvp: Mat4,
        pub mv: Mat4,
        pub color: Color,
    }

    /// Remembers every draw request instead of touching a GPU.
    #[derive(Default)]
    pub struct RecordingProgram {
        draws: RefCell<Vec<RecordedDraw>>,
    }

    impl RecordingProgram {
        pub fn draws(&self) -> Ref<'_, Vec<RecordedDraw>> {
            self.draws.borrow()
        }
    }

    impl Program for RecordingProgram {
        fn render(&self, geometry: &Rc<Geometry>, ctx: &RenderingContext) {
            self.draws.borrow_mut().push(RecordedDraw {
                geometry: Rc::clone(geometry),
                mvp: ctx.mvp(),
                mv: ctx.mv(),
                color: ctx.color,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::color::Color;

    #[test]
    fn uniforms_match_the_shader_layout() {
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 160);
    }

    #[test]
    fn capture_reads_context_state() {
        let mut ctx = RenderingContext::new();
        ctx.color = Color::rgb(0.5, 0.25, 1.0);
        ctx.elapsed_time_seconds = 2.5;
        ctx.push(Mat4::from_translation(Vec3::new(4.0, 5.0, 6.0)));

        let uniforms = DrawUniforms::capture(&ctx);
        assert_eq!(uniforms.color, [0.5, 0.25, 1.0, 1.0]);
        assert_eq!(uniforms.time, 2.5);
        assert_eq!(uniforms.mvp[3], [4.0, 5.0, 6.0, 1.0]);
        assert_eq!(uniforms.mv, uniforms.mvp);
    }
}
