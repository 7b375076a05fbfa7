#![warn(clippy::all)]

//! Stormwatch - a web-based weather radar map with a live lightning overlay.
//!
//! The radar overlay is found by probing a time-partitioned tile server for
//! the newest published image and re-checking every minute. Lightning
//! strikes stream in over a WebSocket and fade out as they age.

mod error;
mod geo;
mod lightning;
mod radar;
mod state;
mod timer;
mod ui;

use eframe::egui;
use lightning::{FeedEvent, FeedStatus, LightningFeed, StrikeOverlay, ThunderSound};
use radar::{CheckOutcome, FreshnessPoller, ProbeChannel, ProbeResult, TileLayer};
use state::{AppState, ViewerSettings};
use timer::Ticker;

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Stormwatch",
        native_options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("app_canvas")
            .expect("Failed to find app_canvas")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("app_canvas was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(ViewerApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The app has crashed. See the developer console for details.</p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Current wall-clock time in epoch milliseconds.
fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Main application state and logic.
pub struct ViewerApp {
    /// UI-facing state
    state: AppState,

    /// Persisted tunables
    settings: ViewerSettings,

    /// Radar "seek and find" cycle
    poller: FreshnessPoller,

    /// Channel for async tile existence probes
    probe_channel: ProbeChannel,

    /// Textures for the applied radar overlay
    tile_layer: TileLayer,

    /// Rendered lightning markers
    strikes: StrikeOverlay,

    /// Channel for the lightning stream
    feed: LightningFeed,

    /// Thunder playback
    thunder: ThunderSound,

    /// One-second strike age sweep
    sweep_timer: Ticker,

    /// Sixty-second radar freshness re-check
    recheck_timer: Ticker,

    /// Lightning toggle as of the previous frame, to detect changes
    lightning_was_on: bool,
}

impl ViewerApp {
    /// Creates a new ViewerApp instance.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let settings = ViewerSettings::load();
        // Write back so newly added fields appear in the stored settings.
        settings.save();

        let mut state = AppState::new();
        state.apply_url_params(&state::url_state::parse_from_url());

        log::info!(
            "Radar template {}, lightning feed {}",
            settings.tile_template.as_str(),
            settings.feed_url
        );

        Self {
            state,
            poller: FreshnessPoller::new(settings.poller_config()),
            probe_channel: ProbeChannel::new(settings.tile_template.clone(), settings.probe_tile()),
            tile_layer: TileLayer::new(settings.radar_opacity),
            strikes: StrikeOverlay::new(settings.max_strike_age_ms()),
            feed: LightningFeed::new(
                settings.feed_url.clone(),
                settings.reconnect_attempts,
                settings.reconnect_delay(),
            ),
            thunder: ThunderSound::new(settings.sound_url.clone(), settings.sound_interval()),
            sweep_timer: Ticker::new(settings.sweep_interval()),
            recheck_timer: Ticker::new(settings.recheck_interval()),
            lightning_was_on: false,
            settings,
        }
    }

    /// Starts a freshness check if one is due and none is in flight.
    fn drive_radar_checks(&mut self, ctx: &egui::Context, now: web_time::Instant) {
        if !self.state.layer_state.radar {
            return;
        }

        let elapsed = self.recheck_timer.remaining(now).is_zero();
        if !self.poller.should_check(elapsed) {
            return;
        }
        self.recheck_timer.reset(now);

        let mode = self.state.viz_state.radar_mode;
        if let Some(request) = self.poller.begin_check(chrono::Utc::now(), mode) {
            self.probe_channel.probe(ctx.clone(), request);
        }
    }

    /// Handle a completed probe batch.
    fn handle_probe_result(&mut self, result: ProbeResult) {
        match self.poller.complete_check(&result.candidates, result.mode) {
            CheckOutcome::Apply(overlay) => {
                self.state.status_message = format!(
                    "Radar updated: {} {}",
                    overlay.mode.label(),
                    overlay.time.format("%H:%M UTC")
                );
                self.tile_layer.apply(overlay);
            }
            CheckOutcome::Unchanged => {}
            CheckOutcome::NotFound => {
                self.state.status_message = "Radar server has no recent imagery".to_string();
            }
        }
    }

    /// Start or stop the feed when the lightning toggle changes.
    fn sync_lightning_toggle(&mut self, ctx: &egui::Context) {
        let on = self.state.layer_state.lightning;
        if on == self.lightning_was_on {
            return;
        }
        self.lightning_was_on = on;

        if on {
            log::info!("Lightning overlay enabled");
            self.state.feed_status = FeedStatus::Connecting;
            self.feed.start(ctx.clone());
        } else {
            log::info!("Lightning overlay disabled");
            self.feed.stop();
            self.strikes.clear();
            self.state.feed_status = FeedStatus::Idle;
        }
    }

    /// Handle a lightning feed event.
    fn handle_feed_event(&mut self, event: FeedEvent, now: web_time::Instant) {
        if !self.state.layer_state.lightning {
            return;
        }
        self.state.feed_status = self.state.feed_status.on_event(&event);

        match event {
            FeedEvent::Connected => {
                self.state.status_message = "Lightning feed connected".to_string();
            }
            FeedEvent::Strikes(batch) => {
                let bounds = self
                    .state
                    .layer_state
                    .filter_to_bounds
                    .then_some(self.settings.strike_bounds);
                self.strikes.set_bounds(bounds);

                let rendered = self.strikes.ingest(&batch, now_ms());
                if rendered > 0 && self.state.layer_state.sound {
                    self.thunder.trigger(now);
                }
            }
            FeedEvent::Disconnected { attempt, retry_in } => {
                self.state.status_message = format!(
                    "Lightning feed lost, retry {} in {}s",
                    attempt,
                    retry_in.as_secs()
                );
            }
            FeedEvent::GaveUp => {
                self.state.status_message = "Lightning feed unavailable".to_string();
            }
            FeedEvent::Error(msg) => {
                log::error!("Lightning feed error: {}", msg);
                self.state.status_message = format!("Lightning error: {}", msg);
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = web_time::Instant::now();

        // Apply a mode switch from the previous frame's top bar
        if let Some(mode) = self.state.requested_mode.take() {
            if self.state.viz_state.set_radar_mode(mode) {
                self.poller.request_recheck();
            }
        }

        // Radar freshness
        self.drive_radar_checks(ctx, now);
        while let Some(result) = self.probe_channel.try_recv() {
            self.handle_probe_result(result);
        }
        self.state.radar_status = self.poller.status();

        // Lightning
        self.sync_lightning_toggle(ctx);
        while let Some(event) = self.feed.try_recv() {
            self.handle_feed_event(event, now);
        }
        if self.sweep_timer.due(now) {
            let removed = self.strikes.sweep(now_ms());
            if removed > 0 {
                log::debug!("Swept {} expired strikes", removed);
            }
        }
        self.state.strike_count = self.strikes.len();

        // Render UI panels in the correct order for egui layout
        // Top panel must be rendered before CentralPanel
        ui::render_top_bar(ctx, &mut self.state);
        ui::render_canvas(
            ctx,
            &mut self.state,
            &mut self.tile_layer,
            &self.strikes,
            now_ms(),
        );

        // Wake up for the next timer even without input
        let next = self
            .sweep_timer
            .remaining(now)
            .min(self.recheck_timer.remaining(now));
        ctx.request_repaint_after(next);
    }
}
