//! Tile existence probes.
//!
//! Probes are async but egui's update() is synchronous. This channel runs
//! one existence check per candidate in parallel and passes the probed
//! batch back to the UI thread.

use super::candidates::Candidate;
use super::mode::RadarMode;
use super::poller::ProbeRequest;
use super::template::TileTemplate;
use crate::geo::TileId;
use eframe::egui;
use std::sync::mpsc::{channel, Receiver, Sender};

#[cfg(not(target_arch = "wasm32"))]
use crate::error::ProbeError;

/// A probed candidate batch.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub mode: RadarMode,
    pub candidates: Vec<Candidate>,
}

/// Channel-based prober for time-stamped radar tiles.
pub struct ProbeChannel {
    sender: Sender<ProbeResult>,
    receiver: Receiver<ProbeResult>,
    template: TileTemplate,
    reference_tile: TileId,
}

impl ProbeChannel {
    pub fn new(template: TileTemplate, reference_tile: TileId) -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            template,
            reference_tile,
        }
    }

    /// URL probed for a candidate.
    pub fn probe_url(&self, candidate: &Candidate, mode: RadarMode) -> String {
        self.template
            .url(candidate.time, mode.product_code(), self.reference_tile)
    }

    /// Spawns the probes for every candidate in `request`.
    #[cfg(target_arch = "wasm32")]
    pub fn probe(&self, ctx: egui::Context, request: ProbeRequest) {
        let sender = self.sender.clone();
        let urls: Vec<String> = request
            .candidates
            .iter()
            .map(|c| self.probe_url(c, request.mode))
            .collect();

        wasm_bindgen_futures::spawn_local(async move {
            let outcomes =
                futures_util::future::join_all(urls.iter().map(|url| web::load_image(url))).await;

            let candidates = request
                .candidates
                .iter()
                .zip(urls.iter().zip(outcomes))
                .map(|(candidate, (url, outcome))| match outcome {
                    Ok(_) => candidate.with_result(true),
                    Err(e) => {
                        log::debug!("Probe miss for {}: {}", url, e);
                        candidate.with_result(false)
                    }
                })
                .collect();

            let _ = sender.send(ProbeResult {
                mode: request.mode,
                candidates,
            });
            ctx.request_repaint();
        });
    }

    /// Native probes use blocking HTTP requests, one scoped thread each.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn probe(&self, ctx: egui::Context, request: ProbeRequest) {
        let sender = self.sender.clone();
        let urls: Vec<String> = request
            .candidates
            .iter()
            .map(|c| self.probe_url(c, request.mode))
            .collect();

        std::thread::spawn(move || {
            let client = reqwest::blocking::Client::new();
            let outcomes: Vec<bool> = std::thread::scope(|scope| {
                let handles: Vec<_> = urls
                    .iter()
                    .map(|url| {
                        let client = &client;
                        scope.spawn(move || match tile_exists(client, url) {
                            Ok(()) => true,
                            Err(e) => {
                                log::debug!("Probe miss for {}: {}", url, e);
                                false
                            }
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap_or(false))
                    .collect()
            });

            let candidates = request
                .candidates
                .iter()
                .zip(outcomes)
                .map(|(candidate, found)| candidate.with_result(found))
                .collect();

            let _ = sender.send(ProbeResult {
                mode: request.mode,
                candidates,
            });
            ctx.request_repaint();
        });
    }

    /// Non-blocking check for a completed probe batch.
    pub fn try_recv(&self) -> Option<ProbeResult> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn tile_exists(client: &reqwest::blocking::Client, url: &str) -> Result<(), ProbeError> {
    let response = client
        .get(url)
        .send()
        .map_err(|e| ProbeError::Request(e.to_string()))?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ProbeError::Status(status.as_u16()))
    }
}

/// Browser image loading shared by the probes and the tile layer.
#[cfg(target_arch = "wasm32")]
pub(crate) mod web {
    use crate::error::ProbeError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlImageElement;

    /// Loads that neither finish nor fail within this time are abandoned.
    const LOAD_TIMEOUT_MS: u32 = 15_000;

    /// Loads `url` into an image element; resolves once the browser fires
    /// `load` or `error`, or after `LOAD_TIMEOUT_MS`.
    pub async fn load_image(url: &str) -> Result<HtmlImageElement, ProbeError> {
        let image = HtmlImageElement::new().map_err(|_| ProbeError::ImageLoad)?;
        image.set_cross_origin(Some("anonymous"));

        let (tx, rx) = futures_channel::oneshot::channel::<bool>();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let on_load = {
            let tx = tx.clone();
            Closure::<dyn FnMut()>::new(move || {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(true);
                }
            })
        };
        let on_error = Closure::<dyn FnMut()>::new(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(false);
            }
        });

        image.set_onload(Some(on_load.as_ref().unchecked_ref()));
        image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        image.set_src(url);

        let outcome =
            crate::timer::with_timeout(rx, crate::timer::sleep_ms(LOAD_TIMEOUT_MS)).await;

        image.set_onload(None);
        image.set_onerror(None);
        drop(on_load);
        drop(on_error);

        match outcome {
            Some(Ok(true)) => Ok(image),
            Some(_) => Err(ProbeError::ImageLoad),
            None => {
                // Stop the stalled request
                image.set_src("");
                Err(ProbeError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_probe_url_uses_reference_tile_and_mode() {
        let channel = ProbeChannel::new(TileTemplate::default(), TileId::new(4, 3, 6));
        let candidate = Candidate::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 5, 0).unwrap());
        let url = channel.probe_url(&candidate, RadarMode::EchoTops);
        assert!(url.ends_with("USCOMP-EET-202405011205/4/3/6.png"));
    }

    #[test]
    fn test_try_recv_empty() {
        let channel = ProbeChannel::new(TileTemplate::default(), TileId::new(4, 3, 6));
        assert!(channel.try_recv().is_none());
    }
}
