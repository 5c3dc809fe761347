//! wgpu layer compositor shared by the web and native hosts.

use crate::compositor::{BlendDesc, BlendFactor, BlendOp, FramePlan, LayerUniforms};
use crate::constants::{MAX_LAYERS, UNIFORM_SLOT_SIZE};
use crate::layer::BlendMode;
use anyhow::anyhow;

fn factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::Src => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrc => wgpu::BlendFactor::OneMinusSrc,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::Dst => wgpu::BlendFactor::Dst,
    }
}

fn blend_state(d: BlendDesc) -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: factor(d.src),
        dst_factor: factor(d.dst),
        operation: match d.op {
            BlendOp::Add => wgpu::BlendOperation::Add,
            BlendOp::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
        },
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

/// Draws a [`FramePlan`]: one pipeline per blend mode, one 256-byte uniform
/// slot per layer, all layers in a single pass.
pub struct LayerRenderer {
    pipelines: Vec<wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    staging: Vec<u8>,
}

impl LayerRenderer {
    pub async fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> anyhow::Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("layers_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::LAYERS_WGSL.into()),
        });
        let uniform_size = std::mem::size_of::<LayerUniforms>() as u64;
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("layers_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniform_size),
                },
                count: None,
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("layers_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipelines = BlendMode::ALL
            .iter()
            .map(|b| {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(b.as_str()),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs_fullscreen"),
                        buffers: &[],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    primitive: wgpu::PrimitiveState::default(),
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some("fs_layer"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: Some(blend_state(b.desc())),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    cache: None,
                    multiview: None,
                })
            })
            .collect();
        if let Some(err) = device.pop_error_scope().await {
            return Err(anyhow!("layer shader failed to build: {}", err));
        }

        let total = UNIFORM_SLOT_SIZE * MAX_LAYERS as u64;
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("layer_uniforms"),
            size: total,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("layers_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(uniform_size),
                }),
            }],
        });
        log::info!("[gpu] layer compositor ready ({:?})", format);
        Ok(Self {
            pipelines,
            uniform_buffer,
            bind_group,
            staging: vec![0; total as usize],
        })
    }

    /// Clear `target` to black and paint every planned layer back to front.
    pub fn render(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        plan: &FramePlan,
    ) {
        let slot = UNIFORM_SLOT_SIZE as usize;
        for (i, draw) in plan.draws.iter().enumerate() {
            let bytes = bytemuck::bytes_of(&draw.uniforms);
            self.staging[i * slot..i * slot + bytes.len()].copy_from_slice(bytes);
        }
        if !plan.draws.is_empty() {
            queue.write_buffer(
                &self.uniform_buffer,
                0,
                &self.staging[..plan.draws.len() * slot],
            );
        }

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("layers_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
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
        for (i, draw) in plan.draws.iter().enumerate() {
            rpass.set_pipeline(&self.pipelines[draw.blend.index()]);
            rpass.set_bind_group(0, &self.bind_group, &[(i * slot) as u32]);
            rpass.draw(0..3, 0..1);
        }
    }
}
