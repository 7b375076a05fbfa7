//! Periodic tick helper for the egui update loop.
//!
//! egui calls `update()` whenever it repaints, so periodic work (the strike
//! age sweep, the radar freshness re-check) is driven by comparing the
//! current instant against the last time each job ran.

use futures_util::future::{select, Either};
use std::future::Future;
use std::time::Duration;
use web_time::Instant;

/// Fires at most once per `interval`.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    last: Option<Instant>,
}

impl Ticker {
    /// Creates a ticker that is due immediately on its first check.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns true (and records `now`) if the interval has elapsed since the
    /// last time this returned true.
    pub fn due(&mut self, now: Instant) -> bool {
        let fire = match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        };
        if fire {
            self.last = Some(now);
        }
        fire
    }

    /// Restart the interval from `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last = Some(now);
    }

    /// Time remaining until the next firing, for `request_repaint_after`.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }
}

/// Runs `work` until it finishes or `timeout` resolves, whichever is first.
///
/// Returns `None` if the timeout won.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub async fn with_timeout<F: Future>(
    work: F,
    timeout: impl Future<Output = ()>,
) -> Option<F::Output> {
    let work = std::pin::pin!(work);
    let timeout = std::pin::pin!(timeout);
    match select(work, timeout).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

/// Resolves after `ms` milliseconds using the browser's `setTimeout`.
#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u32) {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_name = setTimeout)]
        fn set_timeout(closure: &Closure<dyn FnMut()>, millis: u32) -> i32;
    }

    let (tx, rx) = futures_channel::oneshot::channel::<()>();
    let closure = Closure::once(move || {
        let _ = tx.send(());
    });
    set_timeout(&closure, ms);
    let _ = rx.await;
}
