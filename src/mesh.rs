//! GPU-side mesh resources.
//!
//! A [`GpuMesh`] owns the vertex/index buffers, the per-mesh uniform buffer
//! (model matrix + material parameters) and the bind groups tying them to a
//! pipeline. The uniform buffer is rewritten every frame from the CPU scene
//! state.

use wgpu::util::DeviceExt;

use crate::geometry::MeshData;
use crate::scene::{Transform, WaveParams};
use crate::texture::Texture;

/// Per-mesh uniforms in GPU layout: model matrix, display colour, the 2D
/// frequency vector and the elapsed-time scalar.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    model: [[f32; 4]; 4],
    color: [f32; 4],
    frequency: [f32; 2],
    time: f32,
    _pad: f32,
}

impl MeshUniform {
    pub fn new(transform: &Transform, params: &WaveParams) -> Self {
        Self {
            model: transform.matrix().into(),
            color: [params.color[0], params.color[1], params.color[2], 1.0],
            frequency: [params.frequency.x, params.frequency.y],
            time: params.time,
            _pad: 0.0,
        }
    }
}

pub fn uniform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
        label: Some("mesh uniform_bind_group_layout"),
    })
}

#[derive(Debug)]
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    pub uniform_bind_group: wgpu::BindGroup,
    pub texture_bind_group: wgpu::BindGroup,
}

impl GpuMesh {
    pub fn new(
        device: &wgpu::Device,
        data: &MeshData,
        texture: &Texture,
        uniform_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        transform: &Transform,
        params: &WaveParams,
        label: &str,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vertex_buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} index_buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniform = MeshUniform::new(transform, params);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} uniform_buffer")),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some(&format!("{label} uniform_bind_group")),
        });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: texture_layout,
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
            label: Some(&format!("{label} texture_bind_group")),
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
        }
    }

    /// Re-upload the per-mesh uniforms from live state.
    pub fn write_uniform(&self, queue: &wgpu::Queue, transform: &Transform, params: &WaveParams) {
        let uniform = MeshUniform::new(transform, params);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.uniform_bind_group, &[]);
        pass.set_bind_group(2, &self.texture_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
