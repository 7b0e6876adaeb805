use crate::prelude::*;

use encase::ShaderType;
use wgpu::util::DeviceExt;

/// Surface appearance of a mesh. The emissive colour is added on top of the
/// lit colour and is unaffected by lighting.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub base_color: [f32; 3],
    pub emissive: [f32; 3],
}

impl Material {
    pub fn new(base_color: [f32; 3]) -> Self {
        Self {
            base_color,
            emissive: [0.0, 0.0, 0.0],
        }
    }

    pub fn with_emissive(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = emissive;
        self
    }

    fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: Vector3::from(self.base_color),
            emissive: Vector3::from(self.emissive),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new([0.8, 0.8, 0.8])
    }
}

#[derive(ShaderType)]
struct MaterialUniform {
    base_color: Vector3<f32>,
    emissive: Vector3<f32>,
}

impl MaterialUniform {
    fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = encase::UniformBuffer::new(Vec::new());
        if let Err(e) = buffer.write(self) {
            log::error!("Failed to encode material uniform: {}", e);
        }
        buffer.into_inner()
    }
}

#[derive(Component)]
pub struct GpuMaterial {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl GpuComponent for Material {
    type UserComponent = Material;
    type GpuVariant = GpuMaterial;
}

impl GpuInitialize for Material {
    type Dependencies = ();

    fn initialize(
        user: &Self::UserComponent,
        _dependencies: Option<&Self::Dependencies>,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
        context: &GpuContext,
    ) -> Self::GpuVariant {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Buffer"),
            contents: &user.uniform().to_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &context.material_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("material_bind_group"),
        });

        GpuMaterial { buffer, bind_group }
    }
}

impl GpuUpdate for Material {
    fn update(
        user: &Self::UserComponent,
        gpu: &mut Self::GpuVariant,
        _dependencies: Option<&()>,
        _device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) {
        queue.write_buffer(&gpu.buffer, 0, &user.uniform().to_bytes());
    }
}
