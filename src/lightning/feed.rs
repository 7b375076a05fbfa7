//! Real-time lightning feed channel.
//!
//! Keeps a WebSocket open to the strike feed and queues parsed batches and
//! lifecycle events for the UI loop. Closed connections are retried after a
//! fixed delay up to a capped number of attempts, then abandoned.

use super::strike::{FeedMessage, Strike};
use crate::error::FeedError;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use eframe::egui;

/// Events emitted by the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Socket opened
    Connected,
    /// A parsed strike batch
    Strikes(Vec<Strike>),
    /// Socket closed; a reconnect is scheduled after `retry_in`
    Disconnected { attempt: u32, retry_in: Duration },
    /// Reconnect attempts exhausted; the feed stays closed
    GaveUp,
    /// Error that stops the feed
    Error(String),
}

/// Capped fixed-delay reconnection.
#[derive(Debug, Clone)]
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub struct ReconnectPolicy {
    max_attempts: u32,
    delay: Duration,
    attempts: u32,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl ReconnectPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            attempts: 0,
        }
    }

    /// Registers a closed connection. Returns the attempt number and delay
    /// before reconnecting, or `None` once the cap is reached.
    pub fn next_attempt(&mut self) -> Option<(u32, Duration)> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some((self.attempts, self.delay))
    }

    /// Called after a successful open.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Connection status shown in the top bar.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    #[default]
    Idle,
    Connecting,
    Connected,
    Reconnecting,
    Closed,
}

impl FeedStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FeedStatus::Idle => "Off",
            FeedStatus::Connecting => "Connecting",
            FeedStatus::Connected => "Live",
            FeedStatus::Reconnecting => "Reconnecting",
            FeedStatus::Closed => "Closed",
        }
    }

    /// Applies an event to the status.
    pub fn on_event(self, event: &FeedEvent) -> Self {
        match event {
            FeedEvent::Connected | FeedEvent::Strikes(_) => FeedStatus::Connected,
            FeedEvent::Disconnected { .. } => FeedStatus::Reconnecting,
            FeedEvent::GaveUp | FeedEvent::Error(_) => FeedStatus::Closed,
        }
    }
}

/// Internal state shared with the connection task.
#[derive(Default)]
struct FeedState {
    events: Vec<FeedEvent>,
    active: bool,
    /// Bumped by `start` and `stop`; a connection task exits once the
    /// session it was started for is no longer current
    session: u64,
}

impl FeedState {
    fn cancelled(&self, session: u64) -> bool {
        self.session != session
    }

    /// Queues an event from the socket of `session`. Events from a stopped
    /// or replaced session are dropped. Returns whether it was queued.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn push_from(&mut self, session: u64, event: FeedEvent) -> bool {
        if self.cancelled(session) {
            return false;
        }
        self.events.push(event);
        true
    }
}

/// Channel for the lightning strike stream.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub struct LightningFeed {
    state: Rc<RefCell<FeedState>>,
    url: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl LightningFeed {
    pub fn new(url: impl Into<String>, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            state: Rc::new(RefCell::new(FeedState::default())),
            url: url.into(),
            max_attempts,
            retry_delay,
        }
    }

    #[allow(dead_code)]
    pub fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    #[cfg(target_arch = "wasm32")]
    pub fn start(&self, ctx: egui::Context) {
        let session = {
            let mut state = self.state.borrow_mut();
            if state.active {
                return;
            }
            state.active = true;
            state.session += 1;
            state.events.clear();
            state.session
        };

        let state = self.state.clone();
        let url = self.url.clone();
        let policy = ReconnectPolicy::new(self.max_attempts, self.retry_delay);

        wasm_bindgen_futures::spawn_local(async move {
            connection_loop(ctx, url, state, session, policy).await;
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn start(&self, _ctx: eframe::egui::Context) {
        let mut state = self.state.borrow_mut();
        log::warn!("Lightning feed {} not available natively", self.url);
        state
            .events
            .push(FeedEvent::Error(FeedError::Unsupported.to_string()));
    }

    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        state.session += 1;
        state.active = false;
    }

    pub fn try_recv(&self) -> Option<FeedEvent> {
        let mut state = self.state.borrow_mut();
        if state.events.is_empty() {
            None
        } else {
            Some(state.events.remove(0))
        }
    }
}

/// Parses a text frame, logging and dropping malformed messages.
pub fn parse_frame(text: &str) -> Option<Vec<Strike>> {
    match FeedMessage::parse(text) {
        Ok(message) => Some(message.strokes),
        Err(e) => {
            log::warn!("Dropping lightning message: {}", e);
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
async fn connection_loop(
    ctx: egui::Context,
    url: String,
    state: Rc<RefCell<FeedState>>,
    session: u64,
    mut policy: ReconnectPolicy,
) {
    log::info!("Connecting to lightning feed: {}", url);

    loop {
        if state.borrow().cancelled(session) {
            log::info!("Lightning feed stopped");
            break;
        }

        match run_socket(&ctx, &url, &state, session).await {
            Ok(opened) => {
                if opened {
                    policy.reset();
                }
            }
            Err(e) => {
                log::error!("Lightning feed error: {}", e);
                state.borrow_mut().events.push(FeedEvent::Error(e.to_string()));
                ctx.request_repaint();
                break;
            }
        }

        if state.borrow().cancelled(session) {
            log::info!("Lightning feed stopped");
            break;
        }

        match policy.next_attempt() {
            Some((attempt, delay)) => {
                log::info!(
                    "Lightning feed closed, reconnect attempt {} in {:?}",
                    attempt,
                    delay
                );
                state.borrow_mut().events.push(FeedEvent::Disconnected {
                    attempt,
                    retry_in: delay,
                });
                ctx.request_repaint();
                crate::timer::sleep_ms(delay.as_millis() as u32).await;
            }
            None => {
                log::info!(
                    "Lightning feed closed after {} reconnect attempts, giving up",
                    policy.attempts()
                );
                state.borrow_mut().events.push(FeedEvent::GaveUp);
                ctx.request_repaint();
                break;
            }
        }
    }

    let mut state = state.borrow_mut();
    if !state.cancelled(session) {
        state.active = false;
    }
}

/// Runs one socket until it closes. Returns whether it ever opened.
#[cfg(target_arch = "wasm32")]
async fn run_socket(
    ctx: &egui::Context,
    url: &str,
    state: &Rc<RefCell<FeedState>>,
    session: u64,
) -> Result<bool, FeedError> {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys::{MessageEvent, WebSocket};

    let socket = WebSocket::new(url).map_err(|e| FeedError::Socket(format!("{:?}", e)))?;

    let opened = Rc::new(RefCell::new(false));
    let (close_tx, close_rx) = futures_channel::oneshot::channel::<()>();
    let close_tx = Rc::new(RefCell::new(Some(close_tx)));

    let on_open = {
        let opened = opened.clone();
        let state = state.clone();
        let ctx = ctx.clone();
        Closure::<dyn FnMut()>::new(move || {
            *opened.borrow_mut() = true;
            if state.borrow_mut().push_from(session, FeedEvent::Connected) {
                log::info!("Lightning feed connected");
                ctx.request_repaint();
            }
        })
    };

    let on_message = {
        let state = state.clone();
        let ctx = ctx.clone();
        Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let Some(text) = event.data().as_string() else {
                log::warn!("Ignoring non-text lightning message");
                return;
            };
            if let Some(strikes) = parse_frame(&text) {
                if !strikes.is_empty()
                    && state
                        .borrow_mut()
                        .push_from(session, FeedEvent::Strikes(strikes))
                {
                    ctx.request_repaint();
                }
            }
        })
    };

    let on_close = Closure::<dyn FnMut()>::new(move || {
        if let Some(tx) = close_tx.borrow_mut().take() {
            let _ = tx.send(());
        }
    });

    socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
    socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
    socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

    // Wait for close, checking the stop flag periodically.
    let mut close_rx = close_rx;
    loop {
        if state.borrow().cancelled(session) {
            let _ = socket.close();
            break;
        }
        match close_rx.try_recv() {
            Ok(Some(())) | Err(_) => break,
            Ok(None) => crate::timer::sleep_ms(250).await,
        }
    }

    socket.set_onopen(None);
    socket.set_onmessage(None);
    socket.set_onclose(None);

    let opened = *opened.borrow();
    Ok(opened)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_attempts_are_capped() {
        let mut policy = ReconnectPolicy::new(3, Duration::from_secs(5));
        assert_eq!(policy.next_attempt(), Some((1, Duration::from_secs(5))));
        assert_eq!(policy.next_attempt(), Some((2, Duration::from_secs(5))));
        assert_eq!(policy.next_attempt(), Some((3, Duration::from_secs(5))));
        assert_eq!(policy.next_attempt(), None);
        assert_eq!(policy.next_attempt(), None);
    }

    #[test]
    fn test_reset_after_successful_open() {
        let mut policy = ReconnectPolicy::new(2, Duration::from_secs(1));
        policy.next_attempt();
        policy.next_attempt();
        assert_eq!(policy.next_attempt(), None);

        policy.reset();
        assert_eq!(policy.attempts(), 0);
        assert_eq!(policy.next_attempt(), Some((1, Duration::from_secs(1))));
    }

    #[test]
    fn test_zero_attempts_gives_up_immediately() {
        let mut policy = ReconnectPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.next_attempt(), None);
    }

    #[test]
    fn test_parse_frame_drops_malformed() {
        assert_eq!(parse_frame("{oops"), None);
        assert_eq!(
            parse_frame(r#"{"strokes":[{"lat":1.0,"lon":2.0,"time":3}]}"#),
            Some(vec![Strike::new(1.0, 2.0, 3)])
        );
    }

    #[test]
    fn test_status_transitions() {
        let status = FeedStatus::Connecting.on_event(&FeedEvent::Connected);
        assert_eq!(status, FeedStatus::Connected);
        let status = status.on_event(&FeedEvent::Disconnected {
            attempt: 1,
            retry_in: Duration::from_secs(5),
        });
        assert_eq!(status, FeedStatus::Reconnecting);
        assert_eq!(status.on_event(&FeedEvent::GaveUp), FeedStatus::Closed);
    }

    #[test]
    fn test_stopped_session_events_are_dropped() {
        let feed = LightningFeed::new("wss://example.invalid/strikes", 3, Duration::from_secs(5));
        let old_session = feed.state.borrow().session;
        assert!(feed
            .state
            .borrow_mut()
            .push_from(old_session, FeedEvent::Connected));

        feed.stop();
        let batch = FeedEvent::Strikes(vec![Strike::new(35.0, -97.0, 1_714_564_800_000)]);
        assert!(!feed.state.borrow_mut().push_from(old_session, batch));

        assert_eq!(feed.try_recv(), Some(FeedEvent::Connected));
        assert!(feed.try_recv().is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_native_start_reports_unsupported() {
        let feed = LightningFeed::new("wss://example.invalid/strikes", 3, Duration::from_secs(5));
        feed.start(eframe::egui::Context::default());
        assert!(matches!(feed.try_recv(), Some(FeedEvent::Error(_))));
        assert!(feed.try_recv().is_none());
        assert!(!feed.is_active());
    }
}
