pub use bevy_ecs::world::World;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use winit::{application::ApplicationHandler, event::WindowEvent, window::Window};

use crate::input::{InputEvent, InputState};
pub type Result<T> = anyhow::Result<T>;

pub mod components;
pub mod error;
pub mod gpu_component;
pub mod input;
pub mod layers;
pub mod prelude;

pub trait Layer: 'static {
    fn frame(&mut self, context: &LayerContext) -> Result<()>;
    fn detach(&mut self, context: &LayerContext);
    fn event(&mut self, _context: &LayerContext, _event: LayerEvent) {}
}

pub trait LayerFactory: 'static {
    fn create(&self, context: &LayerContext) -> Result<Box<dyn Layer>>;
}

pub struct LayerContext {
    pub window: Arc<Window>,
    pub world: Arc<Mutex<World>>,
}

impl LayerContext {
    /// Lock the shared world. A layer that panicked while holding the lock
    /// does not take the others down with it.
    pub fn world(&self) -> MutexGuard<'_, World> {
        lock_world(&self.world)
    }
}

pub fn lock_world(world: &Mutex<World>) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone)]
pub enum LayerEvent {
    WindowEvent(Arc<WindowEvent>),
    /// Pointer and keyboard input, already resolved against the tracked
    /// cursor position.
    Input(InputEvent),
}

pub struct ApplicationBuilder {
    title: String,
    layer_factories: Vec<Box<dyn LayerFactory>>,
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            title: String::from("mathaf"),
            layer_factories: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn add_layer_factory(mut self, factory: impl LayerFactory) -> Self {
        self.layer_factories.push(Box::new(factory));
        self
    }

    pub fn add_layer<F, L>(mut self, factory_fn: F) -> Self
    where
        F: Fn(&LayerContext) -> Result<L> + 'static,
        L: Layer,
    {
        self.layer_factories
            .push(Box::new(ClosureLayerFactory::new(factory_fn)));
        self
    }

    pub fn build(self) -> Application {
        let mut world = World::new();
        world.insert_resource(InputState::new());

        Application {
            title: self.title,
            layer_factories: self.layer_factories,
            state: None,
            world: Arc::new(Mutex::new(world)),
            inert: false,
        }
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct ClosureLayerFactory<F> {
    factory_fn: F,
}

impl<F> ClosureLayerFactory<F> {
    fn new(factory_fn: F) -> Self {
        Self { factory_fn }
    }
}

impl<F, L> LayerFactory for ClosureLayerFactory<F>
where
    F: Fn(&LayerContext) -> Result<L> + 'static,
    L: Layer,
{
    fn create(&self, context: &LayerContext) -> Result<Box<dyn Layer>> {
        let layer = (self.factory_fn)(context)?;
        Ok(Box::new(layer))
    }
}

pub struct Application {
    title: String,
    layer_factories: Vec<Box<dyn LayerFactory>>,
    state: Option<ApplicationState>,
    world: Arc<Mutex<World>>,
    /// Set when a layer failed to initialize. The window stays open but
    /// nothing is attached for the rest of the session.
    inert: bool,
}

pub struct ApplicationState {
    window: Arc<Window>,
    layers: Vec<Box<dyn Layer>>,
    last_frame_time: Instant,
}

impl Application {
    fn redraw(&mut self) {
        if self.inert {
            return;
        }

        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        let now = Instant::now();
        let delta_time = now.duration_since(state.last_frame_time);
        state.last_frame_time = now;

        lock_world(&self.world).insert_resource(components::Time(delta_time));

        let context = LayerContext {
            window: state.window.clone(),
            world: self.world.clone(),
        };

        let errors = run_frames(&mut state.layers, |layer| layer.frame(&context));

        let mut world = lock_world(&self.world);
        if !errors.is_empty() {
            world
                .get_resource_or_init::<components::FrameErrors>()
                .0
                .extend(errors);
        }
        world.clear_trackers();
    }

    pub fn spawn<B: bevy_ecs::bundle::Bundle>(&mut self, label: impl Into<String>, bundle: B) {
        use crate::prelude::*;
        let bundle = (
            Tag {
                label: label.into(),
            },
            bundle,
        );
        lock_world(&self.world).spawn(bundle);
    }

    pub fn insert_resource<R: bevy_ecs::prelude::Resource>(&mut self, resource: R) {
        lock_world(&self.world).insert_resource(resource);
    }

    pub fn world(&self) -> Arc<Mutex<World>> {
        self.world.clone()
    }

    /// Whether a window is up with layers attached and frames should run
    fn is_live(&self) -> bool {
        !self.inert && self.state.is_some()
    }

    /// Whether `resumed` should create the window and layers. Never true
    /// again once initialization has failed.
    fn can_attach(&self) -> bool {
        self.state.is_none() && !self.inert
    }

    fn mark_inert(&mut self, error: &anyhow::Error) {
        log::error!("Initialization failed, the scene is disabled: {:#}", error);
        self.inert = true;
    }

    /// Detach layers in reverse order of attachment and drop the window.
    fn detach_layers(&mut self) {
        if let Some(state) = &mut self.state {
            let context = LayerContext {
                window: state.window.clone(),
                world: self.world.clone(),
            };

            for layer in state.layers.iter_mut().rev() {
                layer.detach(&context);
            }
        }
        self.state = None;
    }

    fn fail_initialization(&mut self, window: &Window, error: &anyhow::Error) {
        self.mark_inert(error);

        window.set_title(&format!("{} (unavailable)", self.title));

        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title(&self.title)
            .set_description(format!("The scene could not be started.\n\n{:#}", error))
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

impl ApplicationHandler for Application {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        // No retry once initialization has failed.
        if !self.can_attach() {
            return;
        }

        let window_attributes = Window::default_attributes().with_title(self.title.clone());
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Unable to create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let context = LayerContext {
            window: window.clone(),
            world: self.world.clone(),
        };

        let attached = attach_layers(
            &self.layer_factories,
            |factory| factory.create(&context),
            |layer| layer.detach(&context),
        );
        let layers = match attached {
            Ok(layers) => layers,
            Err(e) => {
                self.fail_initialization(&window, &e);
                Vec::new()
            }
        };

        self.state = Some(ApplicationState {
            window,
            layers,
            last_frame_time: Instant::now(),
        });
    }

    fn suspended(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        self.detach_layers();
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            self.detach_layers();
            event_loop.exit();
            return;
        }

        let input = {
            let mut world = lock_world(&self.world);
            world
                .get_resource_mut::<InputState>()
                .and_then(|mut input_state| input_state.translate(&event))
        };

        if let WindowEvent::RedrawRequested = event {
            self.redraw();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        let context = LayerContext {
            window: state.window.clone(),
            world: self.world.clone(),
        };

        let event = Arc::new(event);
        for layer in &mut state.layers {
            layer.event(&context, LayerEvent::WindowEvent(event.clone()));
            if let Some(input) = &input {
                layer.event(&context, LayerEvent::Input(input.clone()));
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        // An inert app only wakes up for window events
        if !self.is_live() {
            return;
        }

        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

/// Run one frame on every layer. A failing layer only costs that layer its
/// frame. Lost or outdated surfaces are skipped, every other error is
/// returned as a message.
fn run_frames<L>(layers: &mut [L], mut frame: impl FnMut(&mut L) -> Result<()>) -> Vec<String> {
    let mut errors = Vec::new();
    for layer in layers {
        let Err(e) = frame(layer) else {
            continue;
        };

        match e.downcast_ref::<wgpu::SurfaceError>() {
            Some(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Skipping frame, surface is out of date");
            }
            _ => {
                log::error!("Frame failed: {:#}", e);
                errors.push(format!("{:#}", e));
            }
        }
    }
    errors
}

/// Create a layer from each factory in order. On the first failure the
/// layers created so far are detached in reverse order and the error is
/// returned.
fn attach_layers<F, L>(
    factories: &[F],
    mut create: impl FnMut(&F) -> Result<L>,
    mut detach: impl FnMut(&mut L),
) -> Result<Vec<L>> {
    let mut layers = Vec::with_capacity(factories.len());
    for factory in factories {
        match create(factory) {
            Ok(layer) => layers.push(layer),
            Err(e) => {
                for layer in layers.iter_mut().rev() {
                    detach(layer);
                }
                return Err(e);
            }
        }
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct StubLayer {
        frames: usize,
        error: Option<fn() -> anyhow::Error>,
    }

    impl StubLayer {
        fn ok() -> Self {
            Self {
                frames: 0,
                error: None,
            }
        }

        fn failing(error: fn() -> anyhow::Error) -> Self {
            Self {
                frames: 0,
                error: Some(error),
            }
        }

        fn frame(&mut self) -> Result<()> {
            self.frames += 1;
            match self.error {
                Some(error) => Err(error()),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn failing_layer_does_not_stop_the_ones_after_it() {
        let mut layers = vec![
            StubLayer::ok(),
            StubLayer::failing(|| anyhow!("shader missing")),
            StubLayer::ok(),
        ];

        let errors = run_frames(&mut layers, StubLayer::frame);

        assert_eq!(errors, vec![String::from("shader missing")]);
        assert!(layers.iter().all(|layer| layer.frames == 1));
    }

    #[test]
    fn lost_and_outdated_surfaces_are_skipped_silently() {
        let mut layers = vec![
            StubLayer::failing(|| wgpu::SurfaceError::Lost.into()),
            StubLayer::failing(|| wgpu::SurfaceError::Outdated.into()),
            StubLayer::ok(),
        ];

        let errors = run_frames(&mut layers, StubLayer::frame);

        assert!(errors.is_empty());
        assert_eq!(layers[2].frames, 1);
    }

    #[test]
    fn other_surface_errors_are_recorded() {
        let mut layers = vec![StubLayer::failing(|| wgpu::SurfaceError::Timeout.into())];

        let errors = run_frames(&mut layers, StubLayer::frame);

        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn factory_failure_detaches_earlier_layers_in_reverse() {
        let factories = ["device", "scene", "broken", "overlay"];
        let mut created = Vec::new();
        let mut detached = Vec::new();

        let result = attach_layers(
            &factories,
            |name| {
                created.push(*name);
                match *name {
                    "broken" => Err(anyhow!("no adapter")),
                    name => Ok(name),
                }
            },
            |layer| detached.push(*layer),
        );

        assert_eq!(result.unwrap_err().to_string(), "no adapter");
        assert_eq!(created, vec!["device", "scene", "broken"]);
        assert_eq!(detached, vec!["scene", "device"]);
    }

    #[test]
    fn all_factories_succeeding_keeps_every_layer() {
        let factories = [1, 2, 3];

        let layers = attach_layers(&factories, |n| Ok(*n * 10), |_| {}).unwrap();

        assert_eq!(layers, vec![10, 20, 30]);
    }

    #[test]
    fn inert_application_never_reattaches_or_redraws() {
        let mut app = ApplicationBuilder::new().build();
        assert!(app.can_attach());

        app.mark_inert(&anyhow!("no adapter"));

        assert!(!app.can_attach());
        assert!(!app.is_live());

        app.redraw();
        assert!(lock_world(&app.world).get_resource::<components::Time>().is_none());
    }
}
