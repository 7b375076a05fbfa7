//! Live lightning overlay.
//!
//! This module provides functionality for:
//! - Streaming strike batches from the lightning feed with capped reconnects
//! - Filtering strikes to unseen (and optionally in-box) events
//! - Aging markers by color/opacity and evicting them past a maximum age
//! - Playing a thunder sound when new strikes render

mod feed;
mod overlay;
mod sound;
mod strike;

pub use feed::{FeedEvent, FeedStatus, LightningFeed};
pub use overlay::StrikeOverlay;
pub use sound::ThunderSound;
