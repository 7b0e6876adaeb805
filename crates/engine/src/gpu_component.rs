use crate::prelude::*;

/// Marker trait that associates a user-facing component with its GPU variant
pub trait GpuComponent {
    /// The user-facing component type (e.g., Mesh)
    type UserComponent: Component;

    /// The GPU-resident component type (e.g., GpuMesh)
    type GpuVariant: Component;
}

/// Trait for components that can be initialized to GPU variants
pub trait GpuInitialize: GpuComponent {
    /// Bundle of sibling components this GPU component depends on.
    /// Use () for no dependencies
    type Dependencies: Bundle;

    fn initialize(
        user: &Self::UserComponent,
        dependencies: Option<&Self::Dependencies>,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        context: &GpuContext,
    ) -> Self::GpuVariant;
}

/// Trait for GPU components that support incremental updates
pub trait GpuUpdate: GpuComponent {
    /// Update an existing GPU component when the user component changes
    fn update(
        user: &Self::UserComponent,
        gpu: &mut Self::GpuVariant,
        dependencies: Option<&<Self as GpuInitialize>::Dependencies>,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) where
        Self: GpuInitialize;
}

/// Bind group layouts shared by every pipeline
#[derive(Resource)]
pub struct GpuContext {
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
    pub transform_bind_group_layout: wgpu::BindGroupLayout,
    pub material_bind_group_layout: wgpu::BindGroupLayout,
}

impl GpuContext {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            camera_bind_group_layout: uniform_layout(
                device,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                "camera_bind_group_layout",
            ),
            transform_bind_group_layout: uniform_layout(
                device,
                wgpu::ShaderStages::VERTEX,
                "transform_bind_group_layout",
            ),
            material_bind_group_layout: uniform_layout(
                device,
                wgpu::ShaderStages::FRAGMENT,
                "material_bind_group_layout",
            ),
        }
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    visibility: wgpu::ShaderStages,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

/// Creates GPU components for user components that do not have one yet
pub fn gpu_initialize_system<T>(
    mut commands: Commands,
    device: Res<GpuDevice>,
    queue: Res<GpuQueue>,
    context: Res<GpuContext>,
    query: Query<(Entity, &T::UserComponent), Without<T::GpuVariant>>,
) where
    T: GpuInitialize<Dependencies = ()>,
{
    for (entity, user_component) in query.iter() {
        let gpu_component = T::initialize(user_component, None, &device.0, &queue.0, &context);

        commands.entity(entity).insert(gpu_component);
        log::debug!("Initialized GPU component for Entity {:?}", entity);
    }
}

/// Pushes changed user components to their existing GPU components
pub fn gpu_update_system<T>(
    device: Res<GpuDevice>,
    queue: Res<GpuQueue>,
    mut query: Query<(Entity, &T::UserComponent, &mut T::GpuVariant), Changed<T::UserComponent>>,
) where
    T: GpuUpdate + GpuInitialize<Dependencies = ()>,
    T::GpuVariant: Component<Mutability = bevy_ecs::component::Mutable>,
{
    for (entity, user_component, mut gpu_component) in query.iter_mut() {
        T::update(user_component, &mut gpu_component, None, &device.0, &queue.0);

        log::trace!("Updated GPU component for Entity {:?}", entity);
    }
}
