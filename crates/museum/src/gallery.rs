use crate::config::{ExhibitConfig, MuseumConfig, RoomConfig, ShapeConfig};
use crate::prelude::*;

use mathaf_engine::Application;
use std::f32::consts::{FRAC_PI_2, PI};

const SPHERE_SECTORS: u32 = 32;
const SPHERE_STACKS: u32 = 16;
/// Margin the pedestal top extends past the piece on each side
const PEDESTAL_MARGIN: f32 = 0.12;

/// Spawn the hall, its lighting, the visitor camera and every exhibit.
pub fn build(app: &mut Application, config: &MuseumConfig) {
    spawn_room(app, &config.room);
    spawn_light(app, config);
    spawn_camera(app, config);

    for exhibit in &config.exhibits {
        spawn_exhibit(app, &config.room, exhibit);
    }

    log::info!(
        "Built gallery \"{}\" with {} exhibits",
        config.title,
        config.exhibits.len()
    );
}

fn spawn_room(app: &mut Application, room: &RoomConfig) {
    let half_width = room.width / 2.0;
    let half_depth = room.depth / 2.0;
    let half_height = room.height / 2.0;

    app.spawn(
        "Floor",
        (
            Transform::default(),
            Mesh::plane(half_width, half_depth),
            Material::new(room.floor_color),
        ),
    );

    app.spawn(
        "Ceiling",
        (
            Transform::from_position(Point3::new(0.0, room.height, 0.0))
                .with_rotation(UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI)),
            Mesh::plane(half_width, half_depth),
            Material::new(room.ceiling_color),
        ),
    );

    // Planes face +Y; each wall is rotated to face into the hall
    let walls = [
        (
            "North Wall",
            Point3::new(0.0, half_height, -half_depth),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2),
            (half_width, half_height),
        ),
        (
            "South Wall",
            Point3::new(0.0, half_height, half_depth),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2),
            (half_width, half_height),
        ),
        (
            "West Wall",
            Point3::new(-half_width, half_height, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -FRAC_PI_2),
            (half_height, half_depth),
        ),
        (
            "East Wall",
            Point3::new(half_width, half_height, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
            (half_height, half_depth),
        ),
    ];

    for (label, position, rotation, (half_u, half_v)) in walls {
        app.spawn(
            label,
            (
                Transform::from_position(position).with_rotation(rotation),
                Mesh::plane(half_u, half_v),
                Material::new(room.wall_color),
            ),
        );
    }
}

fn spawn_light(app: &mut Application, config: &MuseumConfig) {
    let light = &config.light;
    let direction = Vector3::from(light.direction)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(|| -Vector3::y());

    // Directional lights shine from their position towards the origin
    app.spawn(
        "Main Light",
        (
            Light {
                intensity: light.intensity,
                color: light.color,
                ambient: light.ambient,
            },
            Transform::from_position(Point3::from(-direction * 10.0)),
        ),
    );
}

fn spawn_camera(app: &mut Application, config: &MuseumConfig) {
    let controller = MuseumController::new(config.controller.clone());

    app.spawn(
        "Camera",
        (
            Transform::from_position(controller.position()).with_rotation(controller.orientation()),
            Camera {
                is_main: true,
                target: controller.look_target(),
                fovy: config.camera.fovy_degrees.to_radians(),
                znear: config.camera.znear,
                zfar: config.camera.zfar,
            },
            RenderTarget {},
        ),
    );
}

fn spawn_exhibit(app: &mut Application, room: &RoomConfig, exhibit: &ExhibitConfig) {
    let [x, z] = exhibit.position;

    let base = if exhibit.pedestal {
        let footprint = match exhibit.shape {
            ShapeConfig::Box { size } => Vector3::new(size[0], 0.0, size[2]),
            ShapeConfig::Sphere { radius } => Vector3::new(radius * 2.0, 0.0, radius * 2.0),
        };
        let half_extents = Vector3::new(
            footprint.x / 2.0 + PEDESTAL_MARGIN,
            room.pedestal_height / 2.0,
            footprint.z / 2.0 + PEDESTAL_MARGIN,
        );

        app.spawn(
            format!("{} Pedestal", exhibit.title),
            (
                Transform::from_position(Point3::new(x, room.pedestal_height / 2.0, z)),
                Mesh::cuboid(half_extents),
                Material::new(room.pedestal_color),
            ),
        );

        room.pedestal_height
    } else {
        0.0
    };

    let centre = Point3::new(x, base + exhibit.elevation + exhibit.shape.half_height(), z);

    let (mesh, interactable) = match exhibit.shape {
        ShapeConfig::Box { size } => {
            let half_extents = Vector3::from(size) / 2.0;
            (Mesh::cuboid(half_extents), Interactable::cuboid(half_extents))
        }
        ShapeConfig::Sphere { radius } => (
            Mesh::uv_sphere(radius, SPHERE_SECTORS, SPHERE_STACKS),
            Interactable::sphere(radius),
        ),
    };

    app.spawn(
        exhibit.title.clone(),
        (
            Transform::from_position(centre),
            mesh,
            Material::new(exhibit.color).with_emissive(exhibit.emissive),
            interactable,
            Exhibit {
                title: exhibit.title.clone(),
                origin: exhibit.origin.clone(),
                era: exhibit.era.clone(),
                description: exhibit.description.clone(),
            },
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathaf_engine::ApplicationBuilder;

    fn built_gallery() -> (Application, MuseumConfig) {
        let config = MuseumConfig::builtin().unwrap();
        let mut app = ApplicationBuilder::new().build();
        build(&mut app, &config);
        (app, config)
    }

    #[test]
    fn every_catalog_entry_becomes_an_interactable_exhibit() {
        let (app, config) = built_gallery();
        let world = app.world();
        let mut world = lock_world(&world);

        let titles: Vec<String> = world
            .query_filtered::<&Exhibit, With<Interactable>>()
            .iter(&world)
            .map(|exhibit| exhibit.title.clone())
            .collect();

        assert_eq!(titles.len(), config.exhibits.len());
        assert!(titles.iter().any(|title| title == "Dallah"));
    }

    #[test]
    fn exhibit_rests_on_its_pedestal() {
        let (app, config) = built_gallery();
        let world = app.world();
        let mut world = lock_world(&world);

        let dallah = world
            .query::<(&Exhibit, &Transform)>()
            .iter(&world)
            .find(|(exhibit, _)| exhibit.title == "Dallah")
            .map(|(_, transform)| transform.position)
            .unwrap();

        assert!((dallah.y - (config.room.pedestal_height + 0.3)).abs() < 1e-5);
    }

    #[test]
    fn single_main_camera_starts_at_eye_height() {
        let (app, config) = built_gallery();
        let world = app.world();
        let mut world = lock_world(&world);

        let cameras: Vec<(Camera, Transform)> = world
            .query::<(&Camera, &Transform)>()
            .iter(&world)
            .map(|(camera, transform)| (camera.clone(), transform.clone()))
            .collect();

        assert_eq!(cameras.len(), 1);
        assert!(cameras[0].0.is_main);
        assert_eq!(cameras[0].1.position.y, config.controller.eye_height);
    }

    #[test]
    fn walls_face_into_the_hall() {
        let (app, _) = built_gallery();
        let world = app.world();
        let mut world = lock_world(&world);

        for (tag, transform) in world.query::<(&Tag, &Transform)>().iter(&world) {
            if !tag.label.ends_with("Wall") {
                continue;
            }
            let normal = transform.rotation * Vector3::y();
            let to_centre = Point3::new(0.0, transform.position.y, 0.0) - transform.position;
            assert!(normal.dot(&to_centre) > 0.0, "{} faces outwards", tag.label);
        }
    }
}
