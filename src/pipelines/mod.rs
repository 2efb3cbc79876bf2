//! Render pipelines for the three mesh kinds: the waving flag plane, the
//! gently wobbling script plane, and the matcap-shaded extruded text.
//!
//! All three share the same bind group layouts (camera, per-mesh uniform,
//! texture) and vertex layout; they differ only in shader and culling. The
//! planes are visible from both sides, so they skip back-face culling.

use crate::geometry::MeshVertex;
use crate::mesh;
use crate::texture::{self, Texture};

pub struct Pipelines {
    pub flag: wgpu::RenderPipeline,
    pub script: wgpu::RenderPipeline,
    pub matcap: wgpu::RenderPipeline,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform_layout = mesh::uniform_layout(device);
        let texture_layout = texture::texture_layout(device);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[camera_layout, &uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let flag = mk_render_pipeline(
            device,
            &layout,
            config.format,
            None,
            wgpu::ShaderModuleDescriptor {
                label: Some("Flag Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("flag.wgsl").into()),
            },
        );
        let script = mk_render_pipeline(
            device,
            &layout,
            config.format,
            None,
            wgpu::ShaderModuleDescriptor {
                label: Some("Script Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("script.wgsl").into()),
            },
        );
        let matcap = mk_render_pipeline(
            device,
            &layout,
            config.format,
            Some(wgpu::Face::Back),
            wgpu::ShaderModuleDescriptor {
                label: Some("Matcap Shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("matcap.wgsl").into()),
            },
        );

        Self {
            flag,
            script,
            matcap,
            uniform_layout,
            texture_layout,
        }
    }
}

fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    cull_mode: Option<wgpu::Face>,
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[MeshVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState {
                    alpha: wgpu::BlendComponent::REPLACE,
                    color: wgpu::BlendComponent::REPLACE,
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
