//! Visualization state (map view and radar mode selection).

use crate::geo::MapProjection;
use crate::radar::RadarMode;

/// State for the map view.
pub struct VizState {
    /// Map center and zoom
    pub projection: MapProjection,

    /// Radar product shown by the tile overlay
    pub radar_mode: RadarMode,
}

impl Default for VizState {
    fn default() -> Self {
        Self {
            projection: MapProjection::new(39.0, -98.0, 4.0),
            radar_mode: RadarMode::default(),
        }
    }
}

impl VizState {
    /// Switches the radar mode. Returns true if it changed.
    pub fn set_radar_mode(&mut self, mode: RadarMode) -> bool {
        if self.radar_mode == mode {
            return false;
        }
        log::info!("Radar mode: {} -> {}", self.radar_mode.label(), mode.label());
        self.radar_mode = mode;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_radar_mode_reports_change() {
        let mut viz = VizState::default();
        assert!(!viz.set_radar_mode(RadarMode::Reflectivity));
        assert!(viz.set_radar_mode(RadarMode::EchoTops));
        assert_eq!(viz.radar_mode, RadarMode::EchoTops);
    }
}
