use crate::prelude::*;

/// Layer that initializes the GPU device, queue, and surface.
/// This must run before RenderLayer but doesn't need to do anything during frame rendering.
pub struct DeviceLayer;

impl DeviceLayer {
    pub fn new(context: &LayerContext) -> std::result::Result<Self, EngineError> {
        let size = context.window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(context.window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
            required_limits: if cfg!(target_arch = "wasm32") {
                wgpu::Limits::downlevel_webgl2_defaults()
            } else {
                wgpu::Limits::default()
            },
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        }))?;

        // Store everything in world resources
        let mut world = context.world();
        world.insert_resource(GpuContext::new(&device));
        world.insert_resource(GpuDevice(device));
        world.insert_resource(GpuQueue(queue));
        world.insert_resource(GpuAdapter(Some(adapter)));
        world.insert_resource(GpuSurface(Some(surface)));
        world.insert_resource(WindowSize {
            width: size.width.max(1),
            height: size.height.max(1),
        });

        Ok(Self)
    }
}

impl Layer for DeviceLayer {
    fn frame(&mut self, _context: &LayerContext) -> crate::Result<()> {
        Ok(())
    }

    fn detach(&mut self, context: &LayerContext) {
        let mut world = context.world();
        world.remove_resource::<GpuSurface>();
        world.remove_resource::<GpuAdapter>();
    }
}
