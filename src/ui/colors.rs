//! Centralized color constants for the UI.
//!
//! This module provides consistent colors across all UI panels.

use eframe::egui::Color32;

/// General UI colors for labels and values.
pub mod ui {
    use super::Color32;

    /// Muted gray for labels.
    pub const LABEL: Color32 = Color32::from_rgb(100, 100, 100);
    /// Slightly brighter for values.
    pub const VALUE: Color32 = Color32::from_rgb(160, 160, 160);
    /// Emphasized color for active toggles.
    pub const ACTIVE: Color32 = Color32::from_rgb(100, 180, 255);
    /// Error state (no radar imagery, feed closed).
    pub const ERROR: Color32 = Color32::from_rgb(255, 80, 80);
}

/// Colors for lightning feed status.
pub mod feed {
    use super::Color32;

    /// Orange - connecting or reconnecting.
    pub const CONNECTING: Color32 = Color32::from_rgb(255, 180, 50);
    /// Green - receiving strikes.
    pub const LIVE: Color32 = Color32::from_rgb(100, 200, 100);
    /// Gray - off or closed.
    pub const OFF: Color32 = Color32::from_rgb(120, 120, 130);
}

/// Colors for the map canvas.
pub mod canvas {
    use super::Color32;

    /// Background color.
    pub const BACKGROUND: Color32 = Color32::from_rgb(20, 20, 35);
    /// Strike marker outline.
    pub const STRIKE_STROKE: Color32 = Color32::from_rgb(40, 20, 10);

    /// Graticule line color - requires alpha, use function.
    pub fn graticule() -> Color32 {
        Color32::from_rgba_unmultiplied(60, 80, 60, 120)
    }

    /// Graticule label color - requires alpha, use function.
    pub fn graticule_label() -> Color32 {
        Color32::from_rgba_unmultiplied(120, 140, 120, 200)
    }

    /// Outline for tiles without imagery - requires alpha, use function.
    pub fn tile_outline() -> Color32 {
        Color32::from_rgba_unmultiplied(80, 100, 140, 90)
    }
}
