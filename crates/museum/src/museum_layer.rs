use crate::config::ControllerConfig;
use crate::prelude::*;
use crate::systems::{expire_notices, sync_camera, tick_controller, update_hover};

/// Owns the visitor's controller for as long as the layer is attached.
///
/// The controller and highlight table are inserted when the layer is created
/// and removed again on detach, so no input handling or highlight outlives it.
pub struct MuseumLayer {
    schedule: Schedule,
}

impl MuseumLayer {
    pub fn new(context: &LayerContext, settings: ControllerConfig) -> Self {
        let size = context.window.inner_size();

        {
            let mut world = context.world();

            let mut controller = MuseumController::new(settings);
            controller.resize(size.width, size.height);

            world.insert_resource(controller);
            world.insert_resource(HighlightTable::new());
            world.init_resource::<Notices>();
        }

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                tick_controller,
                sync_camera,
                update_hover,
                expire_notices,
            )
                .chain(),
        );

        Self { schedule }
    }
}

impl Layer for MuseumLayer {
    fn frame(&mut self, context: &LayerContext) -> mathaf_engine::Result<()> {
        let mut world = context.world();

        // Errors from the previous frame become notices for the visitor
        let errors = world
            .get_resource_mut::<FrameErrors>()
            .map(|mut errors| errors.take())
            .unwrap_or_default();
        if !errors.is_empty() {
            let mut notices = require_mut::<Notices>(&mut world)?;
            for error in errors {
                notices.error(error);
            }
        }

        self.schedule.run(&mut world);

        Ok(())
    }

    fn detach(&mut self, context: &LayerContext) {
        let mut world = context.world();

        if let Some(mut highlights) = world.remove_resource::<HighlightTable>() {
            highlights.restore_all(&mut world);
        }
        world.remove_resource::<MuseumController>();
    }

    fn event(&mut self, context: &LayerContext, event: LayerEvent) {
        let LayerEvent::Input(input) = event else {
            return;
        };

        let mut world = context.world();
        let Some(mut controller) = world.get_resource_mut::<MuseumController>() else {
            return;
        };

        if let Some(entity) = controller.handle_input(&input) {
            let title = world
                .get::<Exhibit>(entity)
                .map(|exhibit| exhibit.title.clone())
                .unwrap_or_default();
            log::info!("Opened exhibit \"{}\"", title);
        }
    }
}
