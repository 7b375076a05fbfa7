//! Error types shared by the radar poller, lightning feed and settings.

use thiserror::Error;

/// Errors raised while talking to the lightning feed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// A feed message could not be parsed as a strike batch.
    #[error("malformed feed message: {0}")]
    Malformed(String),
    /// The socket could not be created or reported an error.
    #[error("socket error: {0}")]
    Socket(String),
    /// Streaming is not available on this platform.
    #[error("lightning streaming is not available on this platform")]
    Unsupported,
}

/// Errors raised by a single tile existence probe.
///
/// Probes never propagate these to the UI; a failed probe is simply a
/// candidate that was not found. They exist so the failure reason can be
/// logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("image failed to load")]
    ImageLoad,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    #[error("timed out")]
    Timeout,
}

/// Errors raised while loading or saving viewer settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings storage unavailable")]
    Unavailable,
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
}
