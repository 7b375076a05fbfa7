//! Map projection and coordinate transformation.
//!
//! Handles converting between geographic coordinates (lat/lon) and
//! screen coordinates for rendering on the canvas. The projection is
//! spherical Web Mercator so the time-stamped radar tiles line up with
//! strike markers without resampling.

use super::tile_math::{lat_to_world_y, lon_to_world_x, world_x_to_lon, world_y_to_lat, TILE_SIZE};
use super::BoundingBox;
use eframe::egui::{Pos2, Rect, Vec2};
use geo_types::Coord;

/// Lowest zoom the canvas allows.
pub const MIN_ZOOM: f64 = 2.0;
/// Highest zoom the canvas allows.
pub const MAX_ZOOM: f64 = 12.0;

/// Map projection for converting geographic to screen coordinates.
#[derive(Debug, Clone)]
pub struct MapProjection {
    /// Center latitude of the view
    pub center_lat: f64,
    /// Center longitude of the view
    pub center_lon: f64,
    /// Continuous zoom level (tile zoom 4 == 4.0)
    pub zoom: f64,
    /// Screen rectangle for the canvas
    pub screen_rect: Rect,
}

impl Default for MapProjection {
    fn default() -> Self {
        Self {
            // Default to center of continental US
            center_lat: 39.0,
            center_lon: -98.0,
            zoom: 4.0,
            screen_rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0)),
        }
    }
}

impl MapProjection {
    /// Creates a new projection centered on the given location.
    pub fn new(center_lat: f64, center_lon: f64, zoom: f64) -> Self {
        Self {
            center_lat,
            center_lon,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..Default::default()
        }
    }

    /// Updates the projection with the current canvas rectangle.
    pub fn update(&mut self, screen_rect: Rect) {
        self.screen_rect = screen_rect;
    }

    /// World size in pixels at the current zoom.
    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    fn center_world(&self) -> (f64, f64) {
        let size = self.world_size();
        (
            lon_to_world_x(self.center_lon) * size,
            lat_to_world_y(self.center_lat) * size,
        )
    }

    /// Converts geographic coordinates (lon, lat) to screen position.
    pub fn geo_to_screen(&self, coord: Coord<f64>) -> Pos2 {
        let size = self.world_size();
        let (cx, cy) = self.center_world();
        let wx = lon_to_world_x(coord.x) * size;
        let wy = lat_to_world_y(coord.y) * size;
        let center = self.screen_rect.center();

        Pos2::new(
            center.x + (wx - cx) as f32,
            center.y + (wy - cy) as f32,
        )
    }

    /// Converts screen position to geographic coordinates (lon, lat).
    pub fn screen_to_geo(&self, pos: Pos2) -> Coord<f64> {
        let size = self.world_size();
        let (cx, cy) = self.center_world();
        let center = self.screen_rect.center();
        let wx = cx + (pos.x - center.x) as f64;
        let wy = cy + (pos.y - center.y) as f64;

        Coord {
            x: world_x_to_lon(wx / size),
            y: world_y_to_lat(wy / size),
        }
    }

    /// Returns the visible geographic bounds.
    pub fn visible_bounds(&self) -> BoundingBox {
        let top_left = self.screen_to_geo(self.screen_rect.left_top());
        let bottom_right = self.screen_to_geo(self.screen_rect.right_bottom());

        BoundingBox {
            min_lat: bottom_right.y.min(top_left.y),
            max_lat: bottom_right.y.max(top_left.y),
            min_lon: top_left.x.min(bottom_right.x),
            max_lon: top_left.x.max(bottom_right.x),
        }
    }

    /// Moves the view by a screen-space drag delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        let center = self.screen_rect.center();
        let new_center = self.screen_to_geo(center - delta);
        self.center_lon = new_center.x;
        self.center_lat = new_center.y.clamp(-85.0, 85.0);
    }

    /// Zooms by `delta` levels keeping the geographic point under `anchor`
    /// stationary on screen.
    pub fn zoom_around(&mut self, delta: f64, anchor: Pos2) {
        let offset = anchor - self.screen_rect.center();
        let size = self.world_size();
        let (cx, cy) = self.center_world();
        let anchor_x = (cx + offset.x as f64) / size;
        let anchor_y = (cy + offset.y as f64) / size;

        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);

        let size = self.world_size();
        self.center_lon = world_x_to_lon(anchor_x - offset.x as f64 / size);
        self.center_lat = world_y_to_lat(anchor_y - offset.y as f64 / size).clamp(-85.0, 85.0);
    }
}
