use bevy_ecs::prelude::*;
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Input derived from window events. Pointer events carry the cursor position
/// at the time they happened, which winit only reports on `CursorMoved`.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { button: MouseButton, x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { button: MouseButton, x: f32, y: f32 },
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    Resized { width: u32, height: u32 },
    /// The window lost focus; every held key and button was released.
    FocusLost,
}

/// Resource that tracks keyboard and pointer state
#[derive(Resource, Default, Debug)]
pub struct InputState {
    /// Currently pressed keys
    pub keys_pressed: HashSet<KeyCode>,
    /// Currently pressed pointer buttons
    pub buttons_pressed: HashSet<MouseButton>,
    /// Pointer position in window coordinates
    pub pointer_position: (f32, f32),
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a key is currently pressed
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Update the tracked state from a window event and return the input it
    /// represents, if any.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                let PhysicalKey::Code(keycode) = key_event.physical_key else {
                    return None;
                };
                match key_event.state {
                    ElementState::Pressed => self.press_key(keycode, key_event.repeat),
                    ElementState::Released => self.release_key(keycode),
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.press_button(*button),
                ElementState::Released => self.release_button(*button),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.move_pointer(position.x as f32, position.y as f32)
            }
            WindowEvent::Resized(size) => Some(InputEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::Focused(false) => self.lose_focus(),
            _ => None,
        }
    }

    /// Handle key press. Auto-repeat is not a new press.
    pub fn press_key(&mut self, key: KeyCode, repeat: bool) -> Option<InputEvent> {
        let newly_pressed = self.keys_pressed.insert(key);
        (newly_pressed && !repeat).then_some(InputEvent::KeyDown(key))
    }

    /// Handle key release
    pub fn release_key(&mut self, key: KeyCode) -> Option<InputEvent> {
        self.keys_pressed
            .remove(&key)
            .then_some(InputEvent::KeyUp(key))
    }

    pub fn press_button(&mut self, button: MouseButton) -> Option<InputEvent> {
        self.buttons_pressed.insert(button);
        let (x, y) = self.pointer_position;
        Some(InputEvent::PointerDown { button, x, y })
    }

    pub fn release_button(&mut self, button: MouseButton) -> Option<InputEvent> {
        if !self.buttons_pressed.remove(&button) {
            return None;
        }
        let (x, y) = self.pointer_position;
        Some(InputEvent::PointerUp { button, x, y })
    }

    /// Update pointer position
    pub fn move_pointer(&mut self, x: f32, y: f32) -> Option<InputEvent> {
        self.pointer_position = (x, y);
        Some(InputEvent::PointerMove { x, y })
    }

    pub fn lose_focus(&mut self) -> Option<InputEvent> {
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
        Some(InputEvent::FocusLost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_and_release_updates_state() {
        let mut input = InputState::new();

        assert_eq!(
            input.press_key(KeyCode::KeyW, false),
            Some(InputEvent::KeyDown(KeyCode::KeyW))
        );
        assert!(input.is_key_pressed(KeyCode::KeyW));

        assert_eq!(
            input.release_key(KeyCode::KeyW),
            Some(InputEvent::KeyUp(KeyCode::KeyW))
        );
        assert!(!input.is_key_pressed(KeyCode::KeyW));
    }

    #[test]
    fn auto_repeat_is_not_reported_twice() {
        let mut input = InputState::new();

        assert!(input.press_key(KeyCode::KeyD, false).is_some());
        assert_eq!(input.press_key(KeyCode::KeyD, true), None);
        assert!(input.is_key_pressed(KeyCode::KeyD));
    }

    #[test]
    fn pointer_buttons_carry_last_cursor_position() {
        let mut input = InputState::new();

        input.move_pointer(120.0, 48.5);
        assert_eq!(
            input.press_button(MouseButton::Left),
            Some(InputEvent::PointerDown {
                button: MouseButton::Left,
                x: 120.0,
                y: 48.5
            })
        );

        input.move_pointer(130.0, 50.0);
        assert_eq!(
            input.release_button(MouseButton::Left),
            Some(InputEvent::PointerUp {
                button: MouseButton::Left,
                x: 130.0,
                y: 50.0
            })
        );
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut input = InputState::new();

        assert_eq!(input.release_button(MouseButton::Left), None);
        assert_eq!(input.release_key(KeyCode::KeyA), None);
    }

    #[test]
    fn losing_focus_releases_everything() {
        let mut input = InputState::new();
        input.press_key(KeyCode::KeyW, false);
        input.press_button(MouseButton::Left);

        assert_eq!(input.lose_focus(), Some(InputEvent::FocusLost));
        assert!(input.keys_pressed.is_empty());
        assert!(input.buttons_pressed.is_empty());
    }
}
