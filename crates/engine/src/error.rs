use bevy_ecs::prelude::*;

/// Failures while bringing up the graphics stack or wiring layers together.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to create a rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open the graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("the surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("resource {0} is missing, check the layer order")]
    MissingResource(&'static str),

    #[error("{0} was already claimed by another layer")]
    AlreadyTaken(&'static str),
}

/// Fetch a resource that an earlier layer is expected to have inserted.
pub fn require<R: Resource>(world: &World) -> Result<&R, EngineError> {
    world
        .get_resource::<R>()
        .ok_or(EngineError::MissingResource(std::any::type_name::<R>()))
}

pub fn require_mut<R: Resource>(world: &mut World) -> Result<Mut<'_, R>, EngineError> {
    world
        .get_resource_mut::<R>()
        .ok_or(EngineError::MissingResource(std::any::type_name::<R>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Resource)]
    struct Present(u32);

    #[derive(Resource)]
    struct Absent;

    #[test]
    fn require_finds_inserted_resource() {
        let mut world = World::new();
        world.insert_resource(Present(7));

        assert_eq!(require::<Present>(&world).map(|p| p.0).ok(), Some(7));
    }

    #[test]
    fn require_names_missing_resource() {
        let world = World::new();

        let err = require::<Absent>(&world).err().map(|e| e.to_string());
        assert!(err.is_some_and(|msg| msg.contains("Absent")));
    }
}
