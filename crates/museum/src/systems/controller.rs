use crate::prelude::*;

/// Walk the viewpoint by the frame's elapsed time
pub fn tick_controller(mut controller: ResMut<MuseumController>, time: Res<Time>) {
    controller.tick(time.delta_seconds());
}

/// Copy the controller's viewpoint onto the main camera
pub fn sync_camera(
    controller: Res<MuseumController>,
    mut cameras: Query<(&mut Transform, &mut Camera)>,
) {
    let position = controller.position();
    let rotation = controller.orientation();
    let target = controller.look_target();

    for (mut transform, mut camera) in cameras.iter_mut() {
        if !camera.is_main {
            continue;
        }

        // Only write on change so the GPU transform is not re-uploaded every frame
        if transform.position != position || transform.rotation != rotation {
            transform.position = position;
            transform.rotation = rotation;
        }
        if camera.target != target {
            camera.target = target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use std::time::Duration;

    fn world_with_camera() -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(MuseumController::new(ControllerConfig::default()));
        world.insert_resource(Time(Duration::from_millis(500)));
        let camera = world
            .spawn((
                Transform::default(),
                Camera {
                    is_main: true,
                    target: Point3::origin(),
                    fovy: 1.0,
                    znear: 0.1,
                    zfar: 100.0,
                },
            ))
            .id();
        (world, camera)
    }

    #[test]
    fn held_key_moves_the_main_camera() {
        let (mut world, camera) = world_with_camera();
        world
            .resource_mut::<MuseumController>()
            .on_key_down(KeyCode::KeyW);

        let mut schedule = Schedule::default();
        schedule.add_systems((tick_controller, sync_camera).chain());
        schedule.run(&mut world);

        let controller = world.resource::<MuseumController>();
        let transform = world.get::<Transform>(camera).unwrap();
        let start = ControllerConfig::default().start_position;

        assert_eq!(transform.position, controller.position());
        assert!((transform.position.z - (start[1] - 2.0)).abs() < 1e-5);
        assert_eq!(
            world.get::<Camera>(camera).unwrap().target,
            controller.look_target()
        );
    }

    #[test]
    fn secondary_cameras_are_left_alone() {
        let (mut world, camera) = world_with_camera();
        world.get_mut::<Camera>(camera).unwrap().is_main = false;

        let mut schedule = Schedule::default();
        schedule.add_systems(sync_camera);
        schedule.run(&mut world);

        assert_eq!(world.get::<Transform>(camera).unwrap(), &Transform::default());
    }
}
