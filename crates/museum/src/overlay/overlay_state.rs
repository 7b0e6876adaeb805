/// UI state owned by the overlay itself, not shared through the world
#[derive(Debug)]
pub struct OverlayState {
    pub show_controls: bool,
}

impl OverlayState {
    pub fn new() -> Self {
        Self {
            show_controls: true,
        }
    }

    pub fn toggle_controls(&mut self) {
        self.show_controls = !self.show_controls;
    }
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::new()
    }
}
