pub use crate::components::*;
pub use crate::error::{EngineError, require, require_mut};
pub use crate::gpu_component::*;
pub use crate::input::{InputEvent, InputState};
pub use crate::{Layer, LayerContext, LayerEvent, lock_world};

pub use bevy_ecs::prelude::*;
pub use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Unit, UnitQuaternion, Vector3};
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
