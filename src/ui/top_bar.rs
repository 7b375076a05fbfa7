//! Top bar UI: overlay toggles, radar mode switch and timestamp display.

use super::colors;
use crate::lightning::FeedStatus;
use crate::radar::RadarMode;
use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};
use egui_phosphor::regular as icons;

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                // App title
                ui.label(
                    RichText::new("Stormwatch")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                render_mode_buttons(ui, state);

                ui.separator();

                render_toggles(ui, state);

                ui.separator();

                // Timestamp display
                let status = state.radar_status;
                let color = if status.is_error() {
                    colors::ui::ERROR
                } else {
                    colors::ui::VALUE
                };
                ui.label(
                    RichText::new(status.display_text())
                        .monospace()
                        .size(13.0)
                        .color(color),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        RichText::new(&state.status_message)
                            .size(12.0)
                            .color(Color32::GRAY),
                    );
                });
            });
        });
}

fn render_mode_buttons(ui: &mut egui::Ui, state: &mut AppState) {
    for mode in RadarMode::all() {
        let selected = state.viz_state.radar_mode == *mode;
        if ui.selectable_label(selected, mode.label()).clicked() && !selected {
            state.requested_mode = Some(*mode);
        }
    }
}

fn render_toggles(ui: &mut egui::Ui, state: &mut AppState) {
    let layers = &mut state.layer_state;

    ui.checkbox(&mut layers.radar, "Radar");

    let lightning_color = if layers.lightning {
        colors::ui::ACTIVE
    } else {
        colors::ui::LABEL
    };
    if ui
        .button(RichText::new(format!("{} Lightning", icons::LIGHTNING)).color(lightning_color))
        .on_hover_text("Show live lightning strikes")
        .clicked()
    {
        layers.toggle_lightning();
    }

    let (sound_icon, sound_color) = if layers.sound {
        (icons::SPEAKER_HIGH, colors::ui::ACTIVE)
    } else {
        (icons::SPEAKER_SLASH, colors::ui::LABEL)
    };
    if ui
        .button(RichText::new(format!("{} Sound", sound_icon)).color(sound_color))
        .on_hover_text("Play thunder when new strikes arrive")
        .clicked()
    {
        layers.toggle_sound();
    }

    ui.checkbox(&mut layers.filter_to_bounds, "Limit to region");

    if layers.lightning {
        let feed_color = match state.feed_status {
            FeedStatus::Connected => colors::feed::LIVE,
            FeedStatus::Connecting | FeedStatus::Reconnecting => colors::feed::CONNECTING,
            FeedStatus::Idle | FeedStatus::Closed => colors::feed::OFF,
        };
        ui.label(
            RichText::new(format!(
                "{} · {} strikes",
                state.feed_status.label(),
                state.strike_count
            ))
            .size(12.0)
            .color(feed_color),
        );
    }
}
