use crate::prelude::*;

use wgpu::util::DeviceExt;

fn first_light<'a>(
    lights: &'a Query<(&Light, &Transform)>,
) -> Option<(&'a Light, &'a Transform)> {
    lights.iter().next()
}

pub fn initialize_camera_buffers(
    mut commands: Commands,
    device: Res<GpuDevice>,
    context: Res<GpuContext>,
    window_size: Res<WindowSize>,
    query: Query<(Entity, &Camera, &Transform), Without<GpuCamera>>,
    lights: Query<(&Light, &Transform)>,
) {
    let device = &device.0;
    let aspect = window_size.aspect();

    for (entity, camera, transform) in query.iter() {
        let uniform = SceneUniform::new(camera, transform, aspect, first_light(&lights));

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: &uniform.to_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &context.camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        commands.entity(entity).insert(GpuCamera {
            buffer,
            bind_group,
            aspect,
        });

        log::debug!("Created GpuCamera for Entity {:?}", entity);
    }
}

/// The camera moves nearly every frame, so the scene uniform is rewritten
/// unconditionally.
pub fn update_camera_buffers(
    queue: Res<GpuQueue>,
    query: Query<(&Camera, &Transform, &GpuCamera)>,
    lights: Query<(&Light, &Transform)>,
) {
    let light = first_light(&lights);

    for (camera, transform, gpu_camera) in query.iter() {
        let uniform = SceneUniform::new(camera, transform, gpu_camera.aspect, light);
        queue.0.write_buffer(&gpu_camera.buffer, 0, &uniform.to_bytes());
    }
}

fn create_render_target(device: &wgpu::Device, size: WindowSize) -> GpuRenderTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Camera Render Target"),
        size: wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: RENDER_TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    GpuRenderTarget { texture, view }
}

fn create_depth_texture(device: &wgpu::Device, size: WindowSize) -> GpuDepthTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    GpuDepthTexture { texture, view }
}

pub fn initialize_render_targets(
    mut commands: Commands,
    device: Res<GpuDevice>,
    window_size: Res<WindowSize>,
    query: Query<Entity, (With<RenderTarget>, Without<GpuRenderTarget>)>,
) {
    for entity in query.iter() {
        commands.entity(entity).insert((
            create_render_target(&device.0, *window_size),
            create_depth_texture(&device.0, *window_size),
        ));
    }
}

/// Reallocates render targets at the new backing-store size and updates the
/// projection aspect ratio. Nothing else about the camera changes.
pub fn update_render_targets(
    mut commands: Commands,
    device: Res<GpuDevice>,
    window_size: Res<WindowSize>,
    mut query: Query<(Entity, &mut GpuCamera, Option<&GpuRenderTarget>), With<RenderTarget>>,
) {
    if !window_size.is_changed() {
        return;
    }

    let aspect = window_size.aspect();

    for (entity, mut camera, gpu_target) in query.iter_mut() {
        // Only update aspect if it actually changed (avoid triggering change detection unnecessarily)
        if (camera.aspect - aspect).abs() > f32::EPSILON {
            camera.aspect = aspect;
        }

        let size_differs = gpu_target.is_some_and(|target| {
            target.texture.width() != window_size.width
                || target.texture.height() != window_size.height
        });

        if size_differs {
            commands.entity(entity).insert((
                create_render_target(&device.0, *window_size),
                create_depth_texture(&device.0, *window_size),
            ));
            log::debug!(
                "Resized render target to {}x{}",
                window_size.width,
                window_size.height
            );
        }
    }
}
