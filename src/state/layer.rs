//! Overlay toggle state.

/// Toggles controlled from the top bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerState {
    /// Show the radar tile overlay
    pub radar: bool,

    /// Show live lightning strikes
    pub lightning: bool,

    /// Play thunder when new strikes render
    pub sound: bool,

    /// Only render strikes inside the configured bounding box
    pub filter_to_bounds: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            radar: true,
            lightning: true,
            sound: false,
            filter_to_bounds: false,
        }
    }
}

impl LayerState {
    pub fn toggle_lightning(&mut self) {
        self.lightning = !self.lightning;
    }

    pub fn toggle_sound(&mut self) {
        self.sound = !self.sound;
    }
}
