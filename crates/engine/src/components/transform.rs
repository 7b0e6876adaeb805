use crate::prelude::*;

use wgpu::util::DeviceExt;

#[derive(Component, Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Model matrix: scale, then rotate, then translate.
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position.coords)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Inverse transpose of the model matrix, for transforming normals under
    /// non-uniform scale.
    pub fn normal_matrix(&self) -> Matrix4<f32> {
        self.matrix()
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity)
    }

    fn uniform(&self) -> TransformUniform {
        TransformUniform {
            model: self.matrix(),
            normal: self.normal_matrix(),
        }
    }
}

#[derive(Component)]
pub struct GpuTransform {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct TransformUniform {
    model: Matrix4<f32>,
    normal: Matrix4<f32>,
}

impl GpuComponent for Transform {
    type UserComponent = Transform;
    type GpuVariant = GpuTransform;
}

impl GpuInitialize for Transform {
    type Dependencies = ();

    fn initialize(
        user: &Self::UserComponent,
        _dependencies: Option<&Self::Dependencies>,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
        context: &GpuContext,
    ) -> Self::GpuVariant {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Transform Buffer"),
            contents: bytemuck::cast_slice(&[user.uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &context.transform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("transform_bind_group"),
        });

        GpuTransform { buffer, bind_group }
    }
}

impl GpuUpdate for Transform {
    fn update(
        user: &Self::UserComponent,
        gpu: &mut Self::GpuVariant,
        _dependencies: Option<&()>,
        _device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) {
        queue.write_buffer(&gpu.buffer, 0, bytemuck::cast_slice(&[user.uniform()]));
    }
}
