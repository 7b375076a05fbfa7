//! Geographic helpers for the map canvas.
//!
//! This module provides the Web Mercator projection used by the canvas,
//! slippy tile addressing for the radar overlay, and the bounding box used
//! to filter lightning strikes.

mod projection;
pub mod tile_math;

pub use projection::{MapProjection, MAX_ZOOM, MIN_ZOOM};
pub use tile_math::{tiles_covering, TileId};

use serde::{Deserialize, Serialize};

/// Inclusive latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Checks whether a point lies inside the box (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Continental United States.
    pub fn conus() -> Self {
        Self::new(24.0, 50.0, -125.0, -66.0)
    }
}
