use crate::config::ControllerConfig;
use crate::prelude::*;
use crate::utils::raycast::pick_nearest;

use std::collections::HashSet;

/// Direction a held key asks the viewpoint to walk in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementIntent {
    Forward,
    Backward,
    Left,
    Right,
}

impl MovementIntent {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(Self::Forward),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(Self::Backward),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(Self::Left),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(Self::Right),
            _ => None,
        }
    }
}

/// Hover transition produced by one picking pass. `left` must have its
/// highlight cleared before `entered` is highlighted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverChange {
    pub entered: Option<Entity>,
    pub left: Option<Entity>,
}

impl HoverChange {
    pub fn is_empty(&self) -> bool {
        self.entered.is_none() && self.left.is_none()
    }
}

#[derive(Clone, Copy, Debug)]
struct Drag {
    start: (f32, f32),
    last: (f32, f32),
}

/// First-person viewpoint driven by pointer drags and movement keys.
///
/// Owns every piece of mutable interaction state: orientation, position,
/// held keys, the drag in progress, the hovered exhibit and whether a detail
/// overlay currently blocks look and movement.
#[derive(Resource, Debug)]
pub struct MuseumController {
    settings: ControllerConfig,
    yaw: f32,
    pitch: f32,
    position: Point3<f32>,
    held_keys: HashSet<KeyCode>,
    drag: Option<Drag>,
    hovered: Option<Entity>,
    selected: Option<Entity>,
    blocked: bool,
    viewport: (u32, u32),
}

impl MuseumController {
    pub fn new(settings: ControllerConfig) -> Self {
        let [x, z] = settings.start_position;
        let position = Point3::new(x, settings.eye_height, z);
        let yaw = settings.start_yaw_degrees.to_radians();

        Self {
            settings,
            yaw,
            pitch: 0.0,
            position,
            held_keys: HashSet::new(),
            drag: None,
            hovered: None,
            selected: None,
            blocked: false,
            viewport: (1, 1),
        }
    }

    pub fn settings(&self) -> &ControllerConfig {
        &self.settings
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn hovered(&self) -> Option<Entity> {
        self.hovered
    }

    /// Exhibit whose detail overlay is open
    pub fn selected(&self) -> Option<Entity> {
        self.selected
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn intents(&self) -> HashSet<MovementIntent> {
        self.held_keys
            .iter()
            .filter_map(|key| MovementIntent::from_key(*key))
            .collect()
    }

    pub fn orientation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch)
    }

    pub fn view_direction(&self) -> Vector3<f32> {
        self.orientation() * -Vector3::z()
    }

    pub fn view_ray(&self) -> Ray {
        Ray::new(self.position, self.view_direction())
    }

    /// Point one unit ahead along the view direction
    pub fn look_target(&self) -> Point3<f32> {
        self.position + self.view_direction()
    }

    fn max_pitch(&self) -> f32 {
        self.settings.max_pitch_degrees.to_radians()
    }

    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        if self.blocked {
            return;
        }
        self.drag = Some(Drag {
            start: (x, y),
            last: (x, y),
        });
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.blocked {
            return;
        }
        let Some(drag) = &mut self.drag else {
            return;
        };

        let dx = x - drag.last.0;
        let dy = y - drag.last.1;
        drag.last = (x, y);

        let max_pitch = self.max_pitch();
        self.yaw -= dx * self.settings.look_sensitivity;
        self.pitch = (self.pitch - dy * self.settings.look_sensitivity).clamp(-max_pitch, max_pitch);
    }

    /// Ends the drag. A release close to where the press started, with an
    /// exhibit hovered, selects that exhibit and blocks further input.
    pub fn on_pointer_up(&mut self, x: f32, y: f32) -> Option<Entity> {
        let drag = self.drag.take()?;
        if self.blocked {
            return None;
        }

        let displacement = (x - drag.start.0).hypot(y - drag.start.1);
        if displacement >= self.settings.click_threshold_px {
            return None;
        }

        let entity = self.hovered?;
        self.selected = Some(entity);
        self.blocked = true;
        log::debug!("Selected exhibit {:?}", entity);

        Some(entity)
    }

    /// Keys are tracked while blocked so a release during the overlay is not
    /// lost. Escape closes the overlay.
    pub fn on_key_down(&mut self, key: KeyCode) {
        if key == KeyCode::Escape && self.blocked {
            self.close_overlay();
            return;
        }
        self.held_keys.insert(key);
    }

    pub fn on_key_up(&mut self, key: KeyCode) {
        self.held_keys.remove(&key);
    }

    /// Drops held keys and the drag, used when the window loses focus and
    /// releases would never arrive.
    pub fn release_all(&mut self) {
        self.held_keys.clear();
        self.drag = None;
    }

    /// Forward and right directions projected onto the floor plane
    fn horizontal_basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let orientation = self.orientation();
        let flatten = |v: Vector3<f32>| Vector3::new(v.x, 0.0, v.z).try_normalize(f32::EPSILON);

        let yaw_only = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw);
        let forward = flatten(orientation * -Vector3::z()).unwrap_or_else(|| yaw_only * -Vector3::z());
        let right = flatten(orientation * Vector3::x()).unwrap_or_else(|| yaw_only * Vector3::x());

        (forward, right)
    }

    /// Advance the walk by `dt` seconds. Directions are summed without
    /// normalization, so diagonal movement is faster than straight movement.
    pub fn tick(&mut self, dt: f32) {
        if self.blocked {
            return;
        }

        let intents = self.intents();
        if intents.is_empty() {
            return;
        }

        let (forward, right) = self.horizontal_basis();
        let step = self.settings.move_speed * dt;

        let mut movement = Vector3::zeros();
        for intent in intents {
            movement += match intent {
                MovementIntent::Forward => forward,
                MovementIntent::Backward => -forward,
                MovementIntent::Left => -right,
                MovementIntent::Right => right,
            } * step;
        }

        self.position += movement;
    }

    /// Re-run picking for the current view ray. At most one entity is ever
    /// hovered; the returned change says which highlight to clear and apply.
    pub fn update_hover<'a, I>(&mut self, targets: I) -> HoverChange
    where
        I: IntoIterator<Item = (Entity, &'a Interactable, &'a Transform)>,
    {
        let hit = pick_nearest(&self.view_ray(), targets, self.settings.pick_distance)
            .map(|(entity, _)| entity);

        if hit == self.hovered {
            return HoverChange::default();
        }

        let change = HoverChange {
            entered: hit,
            left: self.hovered,
        };
        self.hovered = hit;
        change
    }

    /// Close the detail overlay and resume look and movement
    pub fn close_overlay(&mut self) {
        self.blocked = false;
        self.selected = None;
        self.drag = None;
    }

    /// Store the new viewport and return its aspect ratio. Zero-sized
    /// viewports (minimized windows) are ignored.
    ///
    /// Only the viewport is recorded here. The projection follows the
    /// engine's `WindowSize` resource.
    pub fn resize(&mut self, width: u32, height: u32) -> Option<f32> {
        if width == 0 || height == 0 {
            return None;
        }
        self.viewport = (width, height);
        Some(width as f32 / height as f32)
    }

    /// Route an input event. Returns the exhibit selected by it, if any.
    pub fn handle_input(&mut self, event: &InputEvent) -> Option<Entity> {
        match *event {
            InputEvent::PointerDown {
                button: MouseButton::Left,
                x,
                y,
            } => self.on_pointer_down(x, y),
            InputEvent::PointerMove { x, y } => self.on_pointer_move(x, y),
            InputEvent::PointerUp {
                button: MouseButton::Left,
                x,
                y,
            } => return self.on_pointer_up(x, y),
            InputEvent::KeyDown(key) => self.on_key_down(key),
            InputEvent::KeyUp(key) => self.on_key_up(key),
            InputEvent::Resized { width, height } => {
                if let Some(aspect) = self.resize(width, height) {
                    log::debug!("Viewport {}x{}, aspect {:.3}", width, height, aspect);
                }
            }
            InputEvent::FocusLost => self.release_all(),
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn controller() -> MuseumController {
        MuseumController::new(ControllerConfig {
            start_position: [0.0, 0.0],
            start_yaw_degrees: 0.0,
            ..ControllerConfig::default()
        })
    }

    /// Sphere straight ahead of the default viewpoint
    fn exhibit_ahead(world: &mut World, distance: f32) -> (Entity, Interactable, Transform) {
        let entity = world.spawn_empty().id();
        let transform = Transform::from_position(Point3::new(0.0, 1.6, -distance));
        (entity, Interactable::sphere(0.5), transform)
    }

    fn hover(controller: &mut MuseumController, target: &(Entity, Interactable, Transform)) -> HoverChange {
        controller.update_hover([(target.0, &target.1, &target.2)])
    }

    fn drag(controller: &mut MuseumController, from: (f32, f32), to: (f32, f32)) {
        controller.on_pointer_down(from.0, from.1);
        controller.on_pointer_move(to.0, to.1);
        controller.on_pointer_up(to.0, to.1);
    }

    #[test]
    fn pitch_stays_within_limit_for_any_drag() {
        let mut controller = controller();
        let limit = 85f32.to_radians() + 1e-6;

        for dy in [-10_000.0, -37.0, 3.0, 250.0, 10_000.0, -1.0, 99_999.0] {
            drag(&mut controller, (0.0, 0.0), (0.0, dy));
            assert!(controller.pitch().abs() <= limit, "pitch {}", controller.pitch());
        }

        drag(&mut controller, (0.0, 0.0), (0.0, 1_000_000.0));
        assert!((controller.pitch() + 85f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut controller = controller();
        for _ in 0..10 {
            drag(&mut controller, (0.0, 0.0), (-1000.0, 0.0));
        }
        assert!((controller.yaw() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn look_requires_a_drag() {
        let mut controller = controller();
        controller.on_pointer_move(500.0, 500.0);

        assert_eq!(controller.yaw(), 0.0);
        assert_eq!(controller.pitch(), 0.0);
    }

    #[test]
    fn walking_never_changes_altitude() {
        let mut controller = controller();
        drag(&mut controller, (0.0, 0.0), (120.0, -400.0));
        assert!(controller.pitch() > 1.0);

        let start_height = controller.position().y;
        for key in [KeyCode::KeyW, KeyCode::KeyA] {
            controller.on_key_down(key);
        }
        for _ in 0..120 {
            controller.tick(DT);
        }

        assert_eq!(controller.position().y, start_height);
        assert!((controller.position() - Point3::new(0.0, start_height, 0.0)).norm() > 1.0);
    }

    #[test]
    fn walking_forward_follows_yaw_at_move_speed() {
        let mut controller = controller();
        controller.on_key_down(KeyCode::KeyW);
        controller.tick(0.5);

        let moved = controller.position() - Point3::new(0.0, 1.6, 0.0);
        assert!((moved - Vector3::new(0.0, 0.0, -2.0)).norm() < 1e-5);
    }

    #[test]
    fn diagonal_movement_is_not_normalized() {
        let mut controller = controller();
        controller.on_key_down(KeyCode::KeyW);
        controller.on_key_down(KeyCode::KeyD);
        controller.tick(1.0);

        let moved = controller.position() - Point3::new(0.0, 1.6, 0.0);
        assert!((moved.norm() - 4.0 * 2f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn arrow_key_keeps_intent_when_letter_key_released() {
        let mut controller = controller();
        controller.on_key_down(KeyCode::KeyW);
        controller.on_key_down(KeyCode::ArrowUp);
        controller.on_key_up(KeyCode::KeyW);

        assert_eq!(
            controller.intents(),
            HashSet::from([MovementIntent::Forward])
        );
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut controller = controller();
        controller.on_key_down(KeyCode::KeyA);
        controller.on_key_down(KeyCode::KeyD);
        controller.tick(1.0);

        assert!((controller.position() - Point3::new(0.0, 1.6, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn nearest_exhibit_is_the_only_one_hovered() {
        let mut world = World::new();
        let near = exhibit_ahead(&mut world, 3.0);
        let far = exhibit_ahead(&mut world, 5.0);
        let mut controller = controller();

        let change = controller.update_hover([
            (far.0, &far.1, &far.2),
            (near.0, &near.1, &near.2),
        ]);

        assert_eq!(change.entered, Some(near.0));
        assert_eq!(change.left, None);
        assert_eq!(controller.hovered(), Some(near.0));
    }

    #[test]
    fn hover_reports_each_transition_once() {
        let mut world = World::new();
        let target = exhibit_ahead(&mut world, 3.0);
        let mut controller = controller();

        assert_eq!(hover(&mut controller, &target).entered, Some(target.0));
        assert!(hover(&mut controller, &target).is_empty());

        drag(&mut controller, (0.0, 0.0), (-600.0, 0.0));
        let change = hover(&mut controller, &target);
        assert_eq!(change.entered, None);
        assert_eq!(change.left, Some(target.0));
        assert_eq!(controller.hovered(), None);
    }

    #[test]
    fn exhibit_beyond_pick_distance_is_ignored() {
        let mut world = World::new();
        let target = exhibit_ahead(&mut world, 20.0);
        let mut controller = controller();

        assert!(hover(&mut controller, &target).is_empty());
        assert_eq!(controller.hovered(), None);
    }

    #[test]
    fn click_on_hovered_exhibit_selects_and_blocks() {
        let mut world = World::new();
        let target = exhibit_ahead(&mut world, 3.0);
        let mut controller = controller();
        hover(&mut controller, &target);

        controller.on_pointer_down(100.0, 100.0);
        let selection = controller.on_pointer_up(103.0, 102.0);

        assert_eq!(selection, Some(target.0));
        assert_eq!(controller.selected(), Some(target.0));
        assert!(controller.is_blocked());
    }

    #[test]
    fn drag_past_threshold_never_selects() {
        let mut world = World::new();
        let target = exhibit_ahead(&mut world, 3.0);
        let mut controller = controller();
        hover(&mut controller, &target);

        // Still over the exhibit on release, but travelled past the threshold
        controller.on_pointer_down(100.0, 100.0);
        controller.on_pointer_move(110.0, 100.0);
        assert_eq!(controller.on_pointer_up(110.0, 100.0), None);
        assert!(!controller.is_blocked());
    }

    #[test]
    fn click_without_hover_selects_nothing() {
        let mut controller = controller();
        controller.on_pointer_down(10.0, 10.0);

        assert_eq!(controller.on_pointer_up(10.0, 10.0), None);
        assert!(!controller.is_blocked());
    }

    #[test]
    fn blocked_controller_ignores_held_keys_and_drags() {
        let mut world = World::new();
        let target = exhibit_ahead(&mut world, 3.0);
        let mut controller = controller();
        hover(&mut controller, &target);

        controller.on_key_down(KeyCode::KeyW);
        controller.on_pointer_down(0.0, 0.0);
        controller.on_pointer_up(0.0, 0.0);
        assert!(controller.is_blocked());

        let position = controller.position();
        let (yaw, pitch) = (controller.yaw(), controller.pitch());

        for frame in 0..240 {
            controller.tick(DT);
            controller.on_pointer_down(0.0, 0.0);
            controller.on_pointer_move(frame as f32 * 10.0, frame as f32 * 7.0);
            controller.on_pointer_up(frame as f32 * 10.0, frame as f32 * 7.0);
        }

        assert_eq!(controller.position(), position);
        assert_eq!(controller.yaw(), yaw);
        assert_eq!(controller.pitch(), pitch);
    }

    #[test]
    fn closing_overlay_resumes_movement_with_keys_held_during_block() {
        let mut world = World::new();
        let target = exhibit_ahead(&mut world, 3.0);
        let mut controller = controller();
        hover(&mut controller, &target);
        controller.on_pointer_down(0.0, 0.0);
        controller.on_pointer_up(0.0, 0.0);

        controller.on_key_down(KeyCode::KeyS);
        controller.on_key_down(KeyCode::Escape);
        assert!(!controller.is_blocked());
        assert_eq!(controller.selected(), None);

        let before = controller.position();
        controller.tick(DT);
        assert!(controller.position().z > before.z);
    }

    #[test]
    fn focus_loss_releases_keys_and_drag() {
        let mut controller = controller();
        controller.on_key_down(KeyCode::KeyW);
        controller.on_pointer_down(0.0, 0.0);

        controller.handle_input(&InputEvent::FocusLost);

        assert!(controller.intents().is_empty());
        assert!(!controller.is_dragging());
    }

    #[test]
    fn resize_only_touches_viewport() {
        let mut controller = controller();
        let position = controller.position();

        assert_eq!(controller.resize(1920, 1080), Some(1920.0 / 1080.0));
        assert_eq!(controller.resize(0, 1080), None);
        assert_eq!(controller.viewport(), (1920, 1080));
        assert_eq!(controller.position(), position);
    }

    #[test]
    fn resize_events_record_the_viewport() {
        let mut controller = controller();

        controller.handle_input(&InputEvent::Resized {
            width: 800,
            height: 600,
        });
        controller.handle_input(&InputEvent::Resized {
            width: 0,
            height: 0,
        });

        assert_eq!(controller.viewport(), (800, 600));
    }

    #[test]
    fn only_primary_button_drives_the_drag() {
        let mut controller = controller();
        controller.handle_input(&InputEvent::PointerDown {
            button: MouseButton::Right,
            x: 0.0,
            y: 0.0,
        });
        controller.handle_input(&InputEvent::PointerMove { x: 300.0, y: 0.0 });

        assert_eq!(controller.yaw(), 0.0);
    }
}
