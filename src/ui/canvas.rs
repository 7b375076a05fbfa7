//! Central canvas UI: radar tiles and lightning markers over a graticule.

use super::colors;
use crate::geo::MapProjection;
use crate::lightning::StrikeOverlay;
use crate::radar::TileLayer;
use crate::state::AppState;
use eframe::egui::{self, Painter, Pos2, Rect, RichText, Sense, Stroke, Vec2};
use geo_types::Coord;

/// Marker radius for a fresh strike; older markers shrink slightly.
const STRIKE_RADIUS: f32 = 4.0;

/// Render the map canvas.
pub fn render_canvas(
    ctx: &egui::Context,
    state: &mut AppState,
    tiles: &mut TileLayer,
    strikes: &StrikeOverlay,
    now_ms: i64,
) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let available_size = ui.available_size();

            // Allocate the full available space for the canvas
            let (response, painter) =
                ui.allocate_painter(available_size, Sense::click_and_drag());
            let rect = response.rect;

            painter.rect_filled(rect, 0.0, colors::canvas::BACKGROUND);

            let projection = &mut state.viz_state.projection;
            projection.update(rect);

            draw_graticule(&painter, projection);

            if state.layer_state.radar {
                tiles.update(ctx, projection);
                tiles.paint(&painter, projection);
            }

            if state.layer_state.lightning {
                draw_strikes(&painter, projection, strikes, now_ms);
            }

            draw_overlay_info(ui, &rect, projection);

            handle_canvas_interaction(&response, projection);
        });
}

/// Lat/lon lines every few degrees, spacing chosen by zoom.
fn draw_graticule(painter: &Painter, projection: &MapProjection) {
    let bounds = projection.visible_bounds();
    let step = if projection.zoom >= 7.0 {
        1.0
    } else if projection.zoom >= 5.0 {
        5.0
    } else {
        10.0
    };
    let stroke = Stroke::new(0.5, colors::canvas::graticule());
    let font_id = egui::FontId::proportional(10.0);
    let rect = projection.screen_rect;

    let mut lon = (bounds.min_lon / step).floor() * step;
    while lon <= bounds.max_lon {
        let x = projection.geo_to_screen(Coord { x: lon, y: 0.0 }).x;
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            stroke,
        );
        painter.text(
            Pos2::new(x + 2.0, rect.bottom() - 2.0),
            egui::Align2::LEFT_BOTTOM,
            format!("{:.0}°", lon),
            font_id.clone(),
            colors::canvas::graticule_label(),
        );
        lon += step;
    }

    let mut lat = (bounds.min_lat / step).floor() * step;
    while lat <= bounds.max_lat {
        let y = projection.geo_to_screen(Coord { x: 0.0, y: lat }).y;
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            stroke,
        );
        painter.text(
            Pos2::new(rect.left() + 2.0, y - 2.0),
            egui::Align2::LEFT_BOTTOM,
            format!("{:.0}°", lat),
            font_id.clone(),
            colors::canvas::graticule_label(),
        );
        lat += step;
    }
}

/// Strike markers, oldest first so fresh strikes draw on top.
fn draw_strikes(
    painter: &Painter,
    projection: &MapProjection,
    strikes: &StrikeOverlay,
    now_ms: i64,
) {
    let clip = projection.screen_rect.expand(STRIKE_RADIUS);

    for (strike, style) in strikes.styled_markers(now_ms) {
        let pos = projection.geo_to_screen(Coord {
            x: strike.lon,
            y: strike.lat,
        });
        if !clip.contains(pos) {
            continue;
        }
        let radius = STRIKE_RADIUS * (0.6 + 0.4 * style.opacity);
        painter.circle_filled(pos, radius, style.color);
        painter.circle_stroke(
            pos,
            radius,
            Stroke::new(
                0.5,
                colors::canvas::STRIKE_STROKE.gamma_multiply(style.opacity),
            ),
        );
    }
}

fn draw_overlay_info(ui: &mut egui::Ui, rect: &Rect, projection: &MapProjection) {
    let overlay_pos = rect.left_top() + Vec2::new(10.0, 10.0);
    let overlay_rect = Rect::from_min_size(overlay_pos, Vec2::new(180.0, 40.0));

    ui.scope_builder(egui::UiBuilder::new().max_rect(overlay_rect), |ui| {
        ui.vertical(|ui| {
            ui.label(
                RichText::new(format!(
                    "{:.3}, {:.3}",
                    projection.center_lat, projection.center_lon
                ))
                .monospace()
                .size(12.0)
                .color(colors::ui::VALUE),
            );
            ui.label(
                RichText::new(format!("Zoom {:.1}", projection.zoom))
                    .monospace()
                    .size(12.0)
                    .color(colors::ui::VALUE),
            );
        });
    });
}

fn handle_canvas_interaction(response: &egui::Response, projection: &mut MapProjection) {
    // Handle dragging for panning
    if response.dragged() {
        projection.pan_by(response.drag_delta());
    }

    // Handle scroll for zooming relative to cursor position
    if response.hovered() {
        let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.y != 0.0 {
            let anchor = response
                .hover_pos()
                .unwrap_or_else(|| projection.screen_rect.center());
            projection.zoom_around(scroll_delta.y as f64 * 0.005, anchor);
        }
    }

    // Zoom in one level on double-click
    if response.double_clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            projection.zoom_around(1.0, pos);
        }
    }
}
