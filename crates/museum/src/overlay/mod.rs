mod overlay_layer;
mod overlay_state;
mod overlay_ui;

pub use overlay_layer::OverlayLayer;
