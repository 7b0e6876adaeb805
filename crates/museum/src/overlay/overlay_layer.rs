use crate::prelude::*;

use super::{
    overlay_state::OverlayState,
    overlay_ui::{self, OverlayView},
};

/// Presents the camera's render target on the window with the museum UI
/// drawn on top. Owns the window surface.
pub struct OverlayLayer {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
    is_surface_configured: bool,
    viewport_texture_id: Option<egui::TextureId>,

    // egui state
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    overlay_state: OverlayState,
}

impl OverlayLayer {
    pub fn new(context: &LayerContext) -> std::result::Result<Self, EngineError> {
        let size = context.window.inner_size();

        // Retrieve everything from world resources (set by DeviceLayer)
        let (device, queue, adapter, surface) = {
            let mut world = context.world();
            let device = require::<GpuDevice>(&world)?.0.clone();
            let queue = require::<GpuQueue>(&world)?.0.clone();

            let adapter = require_mut::<GpuAdapter>(&mut world)?
                .0
                .take()
                .ok_or(EngineError::AlreadyTaken("adapter"))?;
            let surface = require_mut::<GpuSurface>(&mut world)?
                .0
                .take()
                .ok_or(EngineError::AlreadyTaken("surface"))?;

            (device, queue, adapter, surface)
        };

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(EngineError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let is_surface_configured = size.width > 0 && size.height > 0;
        if is_surface_configured {
            surface.configure(&device, &config);
        }

        // Initialize egui
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &context.window,
            None,
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &device,
            surface_format,
            egui_wgpu::RendererOptions::default(),
        );

        log::debug!("Overlay presenting as {:?}", surface_format);

        Ok(Self {
            surface,
            config,
            device,
            queue,
            is_surface_configured,
            viewport_texture_id: None,
            egui_ctx,
            egui_state,
            egui_renderer,
            overlay_state: OverlayState::new(),
        })
    }

    fn resize(&mut self, context: &LayerContext, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.is_surface_configured = true;

        // Camera targets follow the backing store size
        let mut world = context.world();
        let size = WindowSize { width, height };
        if world.get_resource::<WindowSize>() != Some(&size) {
            world.insert_resource(size);
        }
    }

    /// Point egui at the main camera's render target. Targets are recreated
    /// on resize, so the registration is refreshed every frame.
    fn update_viewport_texture(&mut self, world: &mut World) {
        let mut cameras = world.query::<(&Camera, &GpuRenderTarget)>();
        let Some((_, target)) = cameras.iter(world).find(|(camera, _)| camera.is_main) else {
            return;
        };

        match self.viewport_texture_id {
            Some(texture_id) => self.egui_renderer.update_egui_texture_from_wgpu_texture(
                &self.device,
                &target.view,
                wgpu::FilterMode::Linear,
                texture_id,
            ),
            None => {
                self.viewport_texture_id = Some(self.egui_renderer.register_native_texture(
                    &self.device,
                    &target.view,
                    wgpu::FilterMode::Linear,
                ));
            }
        }
    }
}

impl Layer for OverlayLayer {
    fn frame(&mut self, context: &LayerContext) -> mathaf_engine::Result<()> {
        if !self.is_surface_configured {
            return Ok(());
        }

        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let overlay_view = {
            let mut world = context.world();
            self.update_viewport_texture(&mut world);
            OverlayView::gather(&world)
        };

        let raw_input = self.egui_state.take_egui_input(&context.window);
        let viewport_texture_id = self.viewport_texture_id;
        let mut close_requested = false;

        let egui_output = self.egui_ctx.run(raw_input, |ctx| {
            close_requested =
                overlay_ui::draw_ui(ctx, &overlay_view, viewport_texture_id, &self.overlay_state);
        });

        if close_requested {
            let mut world = context.world();
            if let Some(mut controller) = world.get_resource_mut::<MuseumController>() {
                controller.close_overlay();
            }
        }

        self.egui_state
            .handle_platform_output(&context.window, egui_output.platform_output);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Overlay Encoder"),
            });

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let primitives = self
            .egui_ctx
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);

        for (id, image_delta) in &egui_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &primitives[..],
            &screen_descriptor,
        );

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // egui requires a 'static lifetime for the render pass
            let mut render_pass = render_pass.forget_lifetime();
            self.egui_renderer
                .render(&mut render_pass, &primitives, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();

        Ok(())
    }

    fn detach(&mut self, _context: &LayerContext) {
        if let Some(texture_id) = self.viewport_texture_id.take() {
            self.egui_renderer.free_texture(&texture_id);
        }
    }

    fn event(&mut self, context: &LayerContext, event: LayerEvent) {
        match event {
            LayerEvent::WindowEvent(window_event) => {
                let response = self
                    .egui_state
                    .on_window_event(&context.window, &window_event);

                if let winit::event::WindowEvent::Resized(physical_size) = *window_event {
                    self.resize(context, physical_size.width, physical_size.height);
                }

                if response.repaint {
                    context.window.request_redraw();
                }
            }
            LayerEvent::Input(InputEvent::KeyDown(KeyCode::KeyH)) => {
                self.overlay_state.toggle_controls();
            }
            LayerEvent::Input(_) => {}
        }
    }
}
