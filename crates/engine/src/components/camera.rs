use crate::prelude::*;

use encase::ShaderType;

#[derive(Component, Clone, Debug, PartialEq)]
pub struct Camera {
    pub is_main: bool,
    pub target: Point3<f32>,
    /// Vertical field of view in radians
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

#[rustfmt::skip]
pub const OPENGL_TO_WGPU: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

impl Camera {
    pub fn view(&self, transform: &Transform) -> Matrix4<f32> {
        // Compute the up vector from the rotation quaternion
        let up = transform.rotation * Vector3::y_axis();
        Isometry3::look_at_rh(&transform.position, &self.target, &up).to_homogeneous()
    }

    pub fn projection(&self, aspect: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU * Perspective3::new(aspect, self.fovy, self.znear, self.zfar).to_homogeneous()
    }

    pub fn view_projection(&self, transform: &Transform, aspect: f32) -> Matrix4<f32> {
        self.projection(aspect) * self.view(transform)
    }
}

#[derive(Component)]
pub struct GpuCamera {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub aspect: f32,
}

/// Per-camera scene constants: projection plus the light the scene is lit by.
#[derive(ShaderType, Debug, Clone, Copy)]
pub struct SceneUniform {
    pub view_projection: Matrix4<f32>,
    pub eye: Vector3<f32>,
    pub light_direction: Vector3<f32>,
    pub light_color: Vector3<f32>,
    pub ambient: Vector3<f32>,
}

impl SceneUniform {
    pub fn new(
        camera: &Camera,
        transform: &Transform,
        aspect: f32,
        light: Option<(&Light, &Transform)>,
    ) -> Self {
        let (light_direction, light_color, ambient) = match light {
            Some((light, light_transform)) => (
                Light::direction(light_transform),
                light.radiance(),
                Vector3::from(light.ambient),
            ),
            None => (-Vector3::y(), Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0)),
        };

        Self {
            view_projection: camera.view_projection(transform, aspect),
            eye: transform.position.coords,
            light_direction,
            light_color,
            ambient,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = encase::UniformBuffer::new(Vec::new());
        if let Err(e) = buffer.write(self) {
            log::error!("Failed to encode scene uniform: {}", e);
        }
        buffer.into_inner()
    }
}

#[derive(Component)]
pub struct RenderTarget {}

#[derive(Component)]
pub struct GpuRenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

#[derive(Component)]
pub struct GpuDepthTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}
