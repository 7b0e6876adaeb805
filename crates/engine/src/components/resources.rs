use crate::prelude::*;

use std::time::Duration;

#[derive(Resource)]
pub struct GpuDevice(pub wgpu::Device);

#[derive(Resource)]
pub struct GpuQueue(pub wgpu::Queue);

#[derive(Resource)]
pub struct GpuSurface(pub Option<wgpu::Surface<'static>>);

#[derive(Resource)]
pub struct GpuAdapter(pub Option<wgpu::Adapter>);

/// Elapsed time of the previous frame
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct Time(pub Duration);

impl Time {
    pub fn delta_seconds(&self) -> f32 {
        self.0.as_secs_f32()
    }
}

/// Size of the backing store every render target is allocated at
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// Format all camera render targets are created with
pub const RENDER_TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Background colour camera targets are cleared to
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct ClearColor(pub [f32; 3]);

impl Default for ClearColor {
    fn default() -> Self {
        Self([0.02, 0.02, 0.03])
    }
}

impl ClearColor {
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.0[0] as f64,
            g: self.0[1] as f64,
            b: self.0[2] as f64,
            a: 1.0,
        }
    }
}

/// Frame errors reported by layers, kept until a layer takes them
#[derive(Resource, Debug, Default)]
pub struct FrameErrors(pub Vec<String>);

impl FrameErrors {
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.0)
    }
}
