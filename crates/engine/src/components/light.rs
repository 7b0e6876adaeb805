use crate::prelude::*;

/// Directional light. The position of its `Transform` is treated as the
/// direction the light comes from, looking at the origin.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub intensity: f32,
    pub color: [f32; 3],
    /// Flat fill applied to every surface regardless of orientation
    pub ambient: [f32; 3],
}

impl Default for Light {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            color: [1.0, 1.0, 1.0],
            ambient: [0.2, 0.2, 0.2],
        }
    }
}

impl Light {
    /// Direction the light travels in, from its position towards the origin.
    pub fn direction(transform: &Transform) -> Vector3<f32> {
        (-transform.position.coords)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vector3::y())
    }

    pub fn radiance(&self) -> Vector3<f32> {
        Vector3::from(self.color) * self.intensity
    }
}
