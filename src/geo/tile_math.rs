//! Slippy-map tile addressing (Web Mercator, 256px tiles).
//!
//! World coordinates are normalized to `0.0..1.0` on both axes, with the
//! origin at the north-west corner.

use super::BoundingBox;
use std::f64::consts::PI;

/// Tile edge length in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator projection.
const MAX_LAT: f64 = 85.051_128_78;

/// A single map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Tile containing the given coordinate at zoom `z`.
    pub fn containing(lat: f64, lon: f64, z: u8) -> Self {
        let n = tiles_per_axis(z);
        let max = n.saturating_sub(1);
        let x = (lon_to_world_x(lon) * n as f64).floor().clamp(0.0, max as f64) as u32;
        let y = (lat_to_world_y(lat) * n as f64).floor().clamp(0.0, max as f64) as u32;
        Self { z, x, y }
    }

    /// Geographic bounds covered by this tile.
    pub fn bounds(&self) -> BoundingBox {
        let n = tiles_per_axis(self.z) as f64;
        BoundingBox {
            min_lon: world_x_to_lon(self.x as f64 / n),
            max_lon: world_x_to_lon((self.x + 1) as f64 / n),
            max_lat: world_y_to_lat(self.y as f64 / n),
            min_lat: world_y_to_lat((self.y + 1) as f64 / n),
        }
    }
}

fn tiles_per_axis(z: u8) -> u32 {
    1u32 << z.min(30)
}

pub fn lon_to_world_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

pub fn lat_to_world_y(lat: f64) -> f64 {
    let lat = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0
}

pub fn world_x_to_lon(x: f64) -> f64 {
    x * 360.0 - 180.0
}

pub fn world_y_to_lat(y: f64) -> f64 {
    let n = PI * (1.0 - 2.0 * y);
    n.sinh().atan().to_degrees()
}

/// All tiles at zoom `z` that intersect `bounds`, row by row.
pub fn tiles_covering(bounds: &BoundingBox, z: u8) -> Vec<TileId> {
    let top_left = TileId::containing(bounds.max_lat, bounds.min_lon, z);
    let bottom_right = TileId::containing(bounds.min_lat, bounds.max_lon, z);

    let mut tiles = Vec::new();
    for y in top_left.y..=bottom_right.y {
        for x in top_left.x..=bottom_right.x {
            tiles.push(TileId::new(z, x, y));
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_zero_is_single_tile() {
        assert_eq!(TileId::containing(40.0, -100.0, 0), TileId::new(0, 0, 0));
    }

    #[test]
    fn test_known_tile() {
        // Des Moines, IA at zoom 4
        assert_eq!(TileId::containing(41.6, -93.6, 4), TileId::new(4, 3, 5));
    }

    #[test]
    fn test_tile_bounds_contain_source_point() {
        let tile = TileId::containing(35.2, -97.4, 7);
        assert!(tile.bounds().contains(35.2, -97.4));
    }

    #[test]
    fn test_world_lat_roundtrip() {
        for lat in [-60.0, -12.5, 0.0, 33.3, 70.0] {
            let back = world_y_to_lat(lat_to_world_y(lat));
            assert!((back - lat).abs() < 1e-9);
        }
    }

    #[test]
    fn test_tiles_covering_box() {
        let bounds = BoundingBox {
            min_lat: 30.0,
            max_lat: 45.0,
            min_lon: -110.0,
            max_lon: -85.0,
        };
        let tiles = tiles_covering(&bounds, 4);
        assert!(tiles.contains(&TileId::new(4, 3, 5)));
        assert!(tiles.iter().all(|t| t.z == 4));
        assert_eq!(tiles.len(), 4);
    }
}
