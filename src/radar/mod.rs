//! Radar imagery freshness poller.
//!
//! This module provides functionality for:
//! - Generating time candidates aligned to the tile server's interval
//! - Probing candidate tiles for existence in parallel
//! - Selecting the newest available image and applying it as a tile overlay

mod candidates;
mod mode;
mod poller;
mod probe;
mod template;
mod tiles;

pub use mode::RadarMode;
pub use poller::{CheckOutcome, FreshnessPoller, PollerConfig, PollerStatus};
pub use probe::{ProbeChannel, ProbeResult};
pub use template::TileTemplate;
pub use tiles::TileLayer;
