//! Viewer settings.
//!
//! Settings are persisted to localStorage in the browser (and to a JSON
//! file next to the binary on native builds) so they survive reloads.
//! Missing fields take their default values; unreadable settings fall back
//! to the defaults entirely.

use crate::error::SettingsError;
use crate::geo::{BoundingBox, TileId};
use crate::radar::{PollerConfig, TileTemplate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable parameters for the radar poller and lightning overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Time-partitioned tile URL template
    pub tile_template: TileTemplate,
    /// Tile server publication interval in minutes
    pub interval_minutes: i64,
    /// Candidates probed per freshness check
    pub candidate_count: usize,
    /// Minutes subtracted from "now" before rounding
    pub lag_minutes: i64,
    /// Tile probed for existence
    pub probe_tile: (u8, u32, u32),
    /// Seconds between freshness checks
    pub recheck_secs: u64,
    /// Radar overlay opacity (0.0 - 1.0)
    pub radar_opacity: f32,

    /// Lightning feed WebSocket URL
    pub feed_url: String,
    /// Reconnect attempts before giving up
    pub reconnect_attempts: u32,
    /// Seconds between reconnect attempts
    pub reconnect_delay_secs: u64,
    /// Strikes older than this are removed
    pub max_strike_age_secs: i64,
    /// Seconds between marker age sweeps
    pub sweep_secs: u64,
    /// Box used when strike filtering is enabled
    pub strike_bounds: BoundingBox,

    /// Thunder sound URL
    pub sound_url: String,
    /// Minimum seconds between thunder sounds
    pub sound_interval_secs: u64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            tile_template: TileTemplate::default(),
            interval_minutes: 5,
            candidate_count: 12,
            lag_minutes: 0,
            probe_tile: (4, 3, 6),
            recheck_secs: 60,
            radar_opacity: 0.7,
            feed_url: "wss://lightning.example.net/strikes".to_string(),
            reconnect_attempts: 5,
            reconnect_delay_secs: 5,
            max_strike_age_secs: 15 * 60,
            sweep_secs: 1,
            strike_bounds: BoundingBox::conus(),
            sound_url: "assets/thunder.mp3".to_string(),
            sound_interval_secs: 3,
        }
    }
}

impl ViewerSettings {
    /// localStorage key (and native file stem) for persisted settings.
    const STORAGE_KEY: &'static str = "stormwatch_settings";

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            template: self.tile_template.clone(),
            interval: chrono::Duration::minutes(self.interval_minutes),
            candidate_count: self.candidate_count,
            lag: chrono::Duration::minutes(self.lag_minutes),
        }
    }

    pub fn probe_tile(&self) -> TileId {
        let (z, x, y) = self.probe_tile;
        TileId::new(z, x, y)
    }

    pub fn recheck_interval(&self) -> Duration {
        Duration::from_secs(self.recheck_secs.max(1))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_secs.max(1))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn max_strike_age_ms(&self) -> i64 {
        self.max_strike_age_secs * 1000
    }

    pub fn sound_interval(&self) -> Duration {
        Duration::from_secs(self.sound_interval_secs)
    }

    /// Parses settings JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings, falling back to defaults on any failure.
    pub fn load() -> Self {
        match Self::read_stored() {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded viewer settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse viewer settings: {}", e);
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Failed to read viewer settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings, logging failures.
    pub fn save(&self) {
        let result = self.to_json().and_then(|json| Self::write_stored(&json));
        match result {
            Ok(()) => log::info!("Saved viewer settings"),
            Err(e) => log::warn!("Failed to save viewer settings: {}", e),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn local_storage() -> Result<web_sys::Storage, SettingsError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(SettingsError::Unavailable)
    }

    #[cfg(target_arch = "wasm32")]
    fn read_stored() -> Result<Option<String>, SettingsError> {
        Self::local_storage()?
            .get_item(Self::STORAGE_KEY)
            .map_err(|_| SettingsError::Unavailable)
    }

    #[cfg(target_arch = "wasm32")]
    fn write_stored(json: &str) -> Result<(), SettingsError> {
        Self::local_storage()?
            .set_item(Self::STORAGE_KEY, json)
            .map_err(|_| SettingsError::Unavailable)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn settings_path() -> std::path::PathBuf {
        std::path::PathBuf::from(format!("{}.json", Self::STORAGE_KEY))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn read_stored() -> Result<Option<String>, SettingsError> {
        match std::fs::read_to_string(Self::settings_path()) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn write_stored(json: &str) -> Result<(), SettingsError> {
        Ok(std::fs::write(Self::settings_path(), json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            ViewerSettings::from_json(r#"{"candidate_count": 6, "feed_url": "wss://feed"}"#)
                .unwrap();
        assert_eq!(settings.candidate_count, 6);
        assert_eq!(settings.feed_url, "wss://feed");
        assert_eq!(settings.interval_minutes, 5);
        assert_eq!(settings.strike_bounds, BoundingBox::conus());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            ViewerSettings::from_json("{not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut settings = ViewerSettings::default();
        settings.reconnect_attempts = 9;
        let json = settings.to_json().unwrap();
        assert_eq!(ViewerSettings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_derived_values() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.poller_config().interval, chrono::Duration::minutes(5));
        assert_eq!(settings.probe_tile(), TileId::new(4, 3, 6));
        assert_eq!(settings.max_strike_age_ms(), 900_000);
        assert_eq!(settings.recheck_interval(), Duration::from_secs(60));
    }
}
