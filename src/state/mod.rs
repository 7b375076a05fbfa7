//! Application state management.
//!
//! This module contains the state structures shared between the update loop
//! and the UI panels.

mod layer;
mod settings;
pub mod url_state;
mod viz;

pub use layer::LayerState;
pub use settings::ViewerSettings;
pub use viz::VizState;

use crate::lightning::FeedStatus;
use crate::radar::{PollerStatus, RadarMode};

/// Root application state containing all sub-states.
#[derive(Default)]
pub struct AppState {
    /// Map view and radar mode
    pub viz_state: VizState,

    /// Overlay toggles
    pub layer_state: LayerState,

    /// Radar freshness status for the timestamp display
    pub radar_status: PollerStatus,

    /// Lightning feed connection status
    pub feed_status: FeedStatus,

    /// Number of strike markers on the map
    pub strike_count: usize,

    /// Mode chosen in the top bar this frame, applied by the update loop
    pub requested_mode: Option<RadarMode>,

    /// Application status message displayed in top bar
    pub status_message: String,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            status_message: "Ready".to_string(),
            ..Default::default()
        }
    }

    /// Applies URL parameters on top of the defaults.
    pub fn apply_url_params(&mut self, params: &url_state::UrlParams) {
        if let Some(mode) = params.mode {
            self.viz_state.radar_mode = mode;
        }
        if let Some(lightning) = params.lightning {
            self.layer_state.lightning = lightning;
        }
        let projection = &mut self.viz_state.projection;
        if let Some(lat) = params.lat {
            projection.center_lat = lat.clamp(-85.0, 85.0);
        }
        if let Some(lon) = params.lon {
            projection.center_lon = lon;
        }
        if let Some(zoom) = params.zoom {
            projection.zoom = zoom.clamp(crate::geo::MIN_ZOOM, crate::geo::MAX_ZOOM);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_params_override_defaults() {
        let mut state = AppState::new();
        state.apply_url_params(&url_state::parse_query("mode=eet&lightning=off&zoom=40"));
        assert_eq!(state.viz_state.radar_mode, RadarMode::EchoTops);
        assert!(!state.layer_state.lightning);
        assert_eq!(state.viz_state.projection.zoom, crate::geo::MAX_ZOOM);
    }
}
