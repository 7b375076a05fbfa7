//! Radar tile layer drawn on the map canvas.
//!
//! Holds one egui texture per visible tile of the currently applied
//! overlay. Applying a new overlay drops every texture from the previous
//! one; results of loads started for an older overlay are discarded.

use super::poller::AppliedOverlay;
use crate::geo::{tiles_covering, MapProjection, TileId};
use eframe::egui::{self, Color32, Painter, Pos2, Rect, Stroke, TextureHandle};
use geo_types::Coord;
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, rc::Rc};

/// Highest tile zoom the composite tile server publishes.
const MAX_TILE_ZOOM: u8 = 8;

/// More tiles than this are not requested in one view.
const MAX_VISIBLE_TILES: usize = 64;

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
enum TileSlot {
    Loading,
    Ready(TextureHandle),
    Failed,
}

/// A decoded tile waiting to be uploaded as a texture.
#[cfg(target_arch = "wasm32")]
struct DecodedTile {
    generation: u64,
    tile: TileId,
    image: Option<egui::ColorImage>,
}

/// Texture-backed radar tile overlay.
pub struct TileLayer {
    overlay: Option<AppliedOverlay>,
    slots: HashMap<TileId, TileSlot>,
    /// Bumped on every apply so stale loads can be recognised
    generation: u64,
    opacity: f32,
    #[cfg(target_arch = "wasm32")]
    decoded: Rc<RefCell<Vec<DecodedTile>>>,
}

impl TileLayer {
    pub fn new(opacity: f32) -> Self {
        Self {
            overlay: None,
            slots: HashMap::new(),
            generation: 0,
            opacity: opacity.clamp(0.0, 1.0),
            #[cfg(target_arch = "wasm32")]
            decoded: Rc::new(RefCell::new(Vec::new())),
        }
    }

    #[allow(dead_code)]
    pub fn overlay(&self) -> Option<&AppliedOverlay> {
        self.overlay.as_ref()
    }

    /// Replaces the overlay shown on the map.
    pub fn apply(&mut self, overlay: AppliedOverlay) {
        log::debug!(
            "Tile layer now showing {} ({} textures dropped)",
            overlay.template.as_str(),
            self.slots.len()
        );
        self.generation += 1;
        self.slots.clear();
        self.overlay = Some(overlay);
    }

    /// Number of tiles with an uploaded texture.
    #[allow(dead_code)]
    pub fn ready_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| matches!(slot, TileSlot::Ready(_)))
            .count()
    }

    /// Tile zoom used for the current map zoom.
    pub fn display_zoom(map_zoom: f64) -> u8 {
        map_zoom.floor().clamp(0.0, MAX_TILE_ZOOM as f64) as u8
    }

    fn visible_tiles(projection: &MapProjection) -> Vec<TileId> {
        let zoom = Self::display_zoom(projection.zoom);
        let mut tiles = tiles_covering(&projection.visible_bounds(), zoom);
        if tiles.len() > MAX_VISIBLE_TILES {
            log::warn!(
                "{} radar tiles visible, limiting to {}",
                tiles.len(),
                MAX_VISIBLE_TILES
            );
            tiles.truncate(MAX_VISIBLE_TILES);
        }
        tiles
    }

    /// Drops textures and pending loads for tiles that scrolled out of view.
    fn retain_visible(&mut self, visible: &[TileId]) {
        let before = self.slots.len();
        self.slots.retain(|tile, _| visible.contains(tile));
        let evicted = before - self.slots.len();
        if evicted > 0 {
            log::debug!("Evicted {} radar tiles out of view", evicted);
        }
    }

    /// Uploads finished loads and starts loads for visible tiles.
    #[cfg(target_arch = "wasm32")]
    pub fn update(&mut self, ctx: &egui::Context, projection: &MapProjection) {
        let visible = Self::visible_tiles(projection);

        let finished: Vec<DecodedTile> = self.decoded.borrow_mut().drain(..).collect();
        for decoded in finished {
            if decoded.generation != self.generation || !visible.contains(&decoded.tile) {
                continue;
            }
            let slot = match decoded.image {
                Some(image) => {
                    let name = format!("radar_tile_{}_{}_{}", decoded.tile.z, decoded.tile.x, decoded.tile.y);
                    TileSlot::Ready(ctx.load_texture(name, image, egui::TextureOptions::LINEAR))
                }
                None => TileSlot::Failed,
            };
            self.slots.insert(decoded.tile, slot);
        }

        self.retain_visible(&visible);

        let Some(overlay) = &self.overlay else {
            return;
        };

        for tile in visible {
            if self.slots.contains_key(&tile) {
                continue;
            }
            self.slots.insert(tile, TileSlot::Loading);

            let url = overlay.template.tile_url(tile);
            let generation = self.generation;
            let decoded = self.decoded.clone();
            let ctx = ctx.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let image = match decode_tile(&url).await {
                    Ok(image) => Some(image),
                    Err(e) => {
                        log::debug!("Radar tile {} failed: {}", url, e);
                        None
                    }
                };
                decoded.borrow_mut().push(DecodedTile {
                    generation,
                    tile,
                    image,
                });
                ctx.request_repaint();
            });
        }
    }

    /// Native builds have no image decoder; visible tiles are tracked so
    /// the canvas can outline them.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn update(&mut self, _ctx: &egui::Context, projection: &MapProjection) {
        if self.overlay.is_none() {
            return;
        }
        let visible = Self::visible_tiles(projection);
        self.retain_visible(&visible);
        for tile in visible {
            self.slots.entry(tile).or_insert(TileSlot::Failed);
        }
    }

    /// Paints the visible tiles.
    pub fn paint(&self, painter: &Painter, projection: &MapProjection) {
        if self.overlay.is_none() {
            return;
        }

        let tint = Color32::from_white_alpha((self.opacity * 255.0) as u8);
        let outline = Stroke::new(1.0, crate::ui::colors::canvas::tile_outline());
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));

        for tile in Self::visible_tiles(projection) {
            let rect = tile_screen_rect(tile, projection);
            match self.slots.get(&tile) {
                Some(TileSlot::Ready(texture)) => {
                    painter.image(texture.id(), rect, uv, tint);
                }
                Some(TileSlot::Failed) => {
                    painter.rect_stroke(rect, 0.0, outline, egui::StrokeKind::Inside);
                }
                Some(TileSlot::Loading) | None => {}
            }
        }
    }
}

/// Screen rectangle covered by a tile.
fn tile_screen_rect(tile: TileId, projection: &MapProjection) -> Rect {
    let bounds = tile.bounds();
    let top_left = projection.geo_to_screen(Coord {
        x: bounds.min_lon,
        y: bounds.max_lat,
    });
    let bottom_right = projection.geo_to_screen(Coord {
        x: bounds.max_lon,
        y: bounds.min_lat,
    });
    Rect::from_min_max(top_left, bottom_right)
}

/// Loads a tile image and reads its pixels back through an offscreen canvas.
#[cfg(target_arch = "wasm32")]
async fn decode_tile(url: &str) -> Result<egui::ColorImage, crate::error::ProbeError> {
    use crate::error::ProbeError;
    use wasm_bindgen::JsCast;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

    let image = super::probe::web::load_image(url).await?;
    let (width, height) = (image.natural_width(), image.natural_height());

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(ProbeError::ImageLoad)?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|_| ProbeError::ImageLoad)?
        .dyn_into()
        .map_err(|_| ProbeError::ImageLoad)?;
    canvas.set_width(width);
    canvas.set_height(height);

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .ok_or(ProbeError::ImageLoad)?
        .dyn_into()
        .map_err(|_| ProbeError::ImageLoad)?;
    context
        .draw_image_with_html_image_element(&image, 0.0, 0.0)
        .map_err(|_| ProbeError::ImageLoad)?;
    let data = context
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(|_| ProbeError::ImageLoad)?;

    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [width as usize, height as usize],
        &data.data().0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radar::{RadarMode, TileTemplate};
    use chrono::{TimeZone, Utc};

    fn overlay(minute: u32) -> AppliedOverlay {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap();
        AppliedOverlay {
            time,
            mode: RadarMode::Reflectivity,
            template: TileTemplate::default().at_time(time, "N0Q"),
        }
    }

    #[test]
    fn test_display_zoom_clamped() {
        assert_eq!(TileLayer::display_zoom(4.7), 4);
        assert_eq!(TileLayer::display_zoom(11.0), MAX_TILE_ZOOM);
        assert_eq!(TileLayer::display_zoom(-1.0), 0);
    }

    #[test]
    fn test_apply_replaces_overlay() {
        let mut layer = TileLayer::new(0.7);
        assert!(layer.overlay().is_none());

        layer.apply(overlay(0));
        layer.apply(overlay(5));
        assert_eq!(layer.overlay(), Some(&overlay(5)));
        assert_eq!(layer.generation, 2);
        assert_eq!(layer.ready_count(), 0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_panning_evicts_tiles_out_of_view() {
        let ctx = egui::Context::default();
        let mut layer = TileLayer::new(0.7);
        layer.apply(overlay(0));

        let mut projection = MapProjection::new(39.0, -98.0, 8.0);
        projection.update(Rect::from_min_size(Pos2::ZERO, egui::Vec2::new(800.0, 600.0)));
        layer.update(&ctx, &projection);
        let first_view = TileLayer::visible_tiles(&projection);
        assert_eq!(layer.slots.len(), first_view.len());

        projection.pan_by(egui::Vec2::new(-4000.0, 0.0));
        layer.update(&ctx, &projection);
        let second_view = TileLayer::visible_tiles(&projection);
        assert_eq!(layer.slots.len(), second_view.len());
        assert!(layer.slots.keys().all(|tile| second_view.contains(tile)));
        assert!(first_view.iter().all(|tile| !layer.slots.contains_key(tile)));
    }
}
