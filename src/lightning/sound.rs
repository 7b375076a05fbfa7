//! Thunder sound played when new strikes appear.

use std::time::Duration;
use web_time::Instant;

/// Rate-limited thunder playback.
pub struct ThunderSound {
    url: String,
    min_interval: Duration,
    last_played: Option<Instant>,
}

impl ThunderSound {
    pub fn new(url: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            url: url.into(),
            min_interval,
            last_played: None,
        }
    }

    /// Whether a sound may play at `now` under the rate limit.
    pub fn ready(&self, now: Instant) -> bool {
        self.last_played
            .map_or(true, |last| now.saturating_duration_since(last) >= self.min_interval)
    }

    /// Plays the sound if the rate limit allows it. Returns true if played.
    pub fn trigger(&mut self, now: Instant) -> bool {
        if !self.ready(now) {
            return false;
        }
        self.last_played = Some(now);
        self.play();
        true
    }

    #[cfg(target_arch = "wasm32")]
    fn play(&self) {
        match web_sys::HtmlAudioElement::new_with_src(&self.url) {
            Ok(audio) => {
                // Autoplay can be refused until the user interacts with the page.
                if let Err(e) = audio.play() {
                    log::debug!("Thunder playback refused: {:?}", e);
                }
            }
            Err(e) => log::warn!("Failed to create audio element: {:?}", e),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn play(&self) {
        log::debug!("Thunder ({}) not played on native builds", self.url);
    }
}
