//! Radar freshness poller.
//!
//! Drives the "seek and find" cycle: generate time candidates, hand them to
//! the probe channel, pick the newest one that exists and decide whether
//! the tile overlay needs to be reapplied.

use super::candidates::{generate_candidates, select_winner, Candidate};
use super::mode::RadarMode;
use super::template::TileTemplate;
use chrono::{DateTime, Duration, Utc};

/// Parameters of the probe cycle.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Tile URL template
    pub template: TileTemplate,
    /// Server publication interval
    pub interval: Duration,
    /// Number of candidates probed per check
    pub candidate_count: usize,
    /// Delay subtracted from "now" before rounding
    pub lag: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            template: TileTemplate::default(),
            interval: Duration::minutes(5),
            candidate_count: 12,
            lag: Duration::zero(),
        }
    }
}

/// The radar imagery currently applied to the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedOverlay {
    pub time: DateTime<Utc>,
    pub mode: RadarMode,
    /// Template with time and product resolved; only `{z}/{x}/{y}` remain
    pub template: TileTemplate,
}

/// A batch of candidates waiting to be probed.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub mode: RadarMode,
    pub candidates: Vec<Candidate>,
}

/// Result of completing a freshness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// A newer image (or a different mode) was found; apply this overlay.
    Apply(AppliedOverlay),
    /// The winner matches what is already on the map.
    Unchanged,
    /// No candidate exists on the server.
    NotFound,
}

/// Poller status shown in the timestamp display.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerStatus {
    #[default]
    Idle,
    Searching,
    Showing(DateTime<Utc>),
    NoImagery,
}

impl PollerStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, PollerStatus::NoImagery)
    }

    pub fn display_text(&self) -> String {
        match self {
            PollerStatus::Idle => "Radar idle".to_string(),
            PollerStatus::Searching => "Searching for radar imagery...".to_string(),
            PollerStatus::Showing(time) => format!("Radar {}", time.format("%Y-%m-%d %H:%M UTC")),
            PollerStatus::NoImagery => "No radar imagery available".to_string(),
        }
    }
}

/// State of the freshness check cycle.
pub struct FreshnessPoller {
    config: PollerConfig,
    /// Guard flag: set while a probe batch is outstanding
    in_flight: bool,
    applied: Option<AppliedOverlay>,
    status: PollerStatus,
    recheck_requested: bool,
}

impl FreshnessPoller {
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            in_flight: false,
            applied: None,
            status: PollerStatus::Idle,
            recheck_requested: true,
        }
    }

    #[allow(dead_code)]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    #[allow(dead_code)]
    pub fn applied(&self) -> Option<&AppliedOverlay> {
        self.applied.as_ref()
    }

    pub fn status(&self) -> PollerStatus {
        self.status
    }

    /// Ask for a check on the next update regardless of the timer (e.g.
    /// after a mode switch).
    pub fn request_recheck(&mut self) {
        self.recheck_requested = true;
    }

    /// Consumes a pending recheck request.
    pub fn take_recheck_request(&mut self) -> bool {
        std::mem::take(&mut self.recheck_requested)
    }

    /// Decides whether a check should start now.
    ///
    /// Nothing starts while a check is in flight; a pending recheck request
    /// is kept until then. Otherwise a check starts when the re-check period
    /// has elapsed or a recheck was requested, consuming the request.
    pub fn should_check(&mut self, period_elapsed: bool) -> bool {
        if self.in_flight {
            return false;
        }
        let forced = self.take_recheck_request();
        forced || period_elapsed
    }

    /// Starts a check, returning the candidates to probe.
    ///
    /// Returns `None` if a previous check has not completed yet.
    pub fn begin_check(&mut self, now: DateTime<Utc>, mode: RadarMode) -> Option<ProbeRequest> {
        if self.in_flight {
            log::debug!("Radar check already in flight, skipping");
            return None;
        }

        let candidates = generate_candidates(
            now,
            self.config.interval,
            self.config.candidate_count,
            self.config.lag,
        );
        if candidates.is_empty() {
            self.status = PollerStatus::NoImagery;
            return None;
        }

        self.in_flight = true;
        if self.applied.is_none() {
            self.status = PollerStatus::Searching;
        }
        log::debug!(
            "Probing {} radar candidates for {} starting at {}",
            candidates.len(),
            mode.label(),
            candidates[0].time
        );
        Some(ProbeRequest { mode, candidates })
    }

    /// Finishes a check with probed candidates.
    pub fn complete_check(&mut self, probed: &[Candidate], mode: RadarMode) -> CheckOutcome {
        self.in_flight = false;

        let Some(winner) = select_winner(probed) else {
            log::warn!(
                "No radar imagery found among {} candidates for {}",
                probed.len(),
                mode.label()
            );
            self.status = PollerStatus::NoImagery;
            return CheckOutcome::NotFound;
        };

        self.status = PollerStatus::Showing(winner.time);

        let unchanged = self
            .applied
            .as_ref()
            .is_some_and(|applied| applied.time == winner.time && applied.mode == mode);
        if unchanged {
            log::debug!("Radar imagery unchanged at {}", winner.time);
            return CheckOutcome::Unchanged;
        }

        let overlay = AppliedOverlay {
            time: winner.time,
            mode,
            template: self.config.template.at_time(winner.time, mode.product_code()),
        };
        log::info!("Applying radar overlay {} at {}", mode.label(), winner.time);
        self.applied = Some(overlay.clone());
        CheckOutcome::Apply(overlay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 7, 42).unwrap()
    }

    fn probe(request: &ProbeRequest, found_at: Option<usize>) -> Vec<Candidate> {
        request
            .candidates
            .iter()
            .enumerate()
            .map(|(i, c)| c.with_result(Some(i) == found_at))
            .collect()
    }

    #[test]
    fn test_guard_flag_blocks_overlapping_checks() {
        let mut poller = FreshnessPoller::new(PollerConfig::default());
        let request = poller.begin_check(now(), RadarMode::Reflectivity);
        assert!(request.is_some());
        assert!(poller.is_in_flight());
        assert!(poller.begin_check(now(), RadarMode::Reflectivity).is_none());

        let request = request.unwrap();
        poller.complete_check(&probe(&request, Some(0)), request.mode);
        assert!(!poller.is_in_flight());
        assert!(poller.begin_check(now(), RadarMode::Reflectivity).is_some());
    }

    #[test]
    fn test_selects_candidate_at_index_k() {
        let mut poller = FreshnessPoller::new(PollerConfig::default());
        let request = poller.begin_check(now(), RadarMode::Reflectivity).unwrap();
        let expected = request.candidates[3].time;

        match poller.complete_check(&probe(&request, Some(3)), request.mode) {
            CheckOutcome::Apply(overlay) => {
                assert_eq!(overlay.time, expected);
                assert!(overlay.template.as_str().contains("N0Q-202405011150"));
            }
            other => panic!("expected Apply, got {:?}", other),
        }
        assert_eq!(poller.status(), PollerStatus::Showing(expected));
    }

    #[test]
    fn test_unchanged_winner_does_not_reapply() {
        let mut poller = FreshnessPoller::new(PollerConfig::default());

        let request = poller.begin_check(now(), RadarMode::Reflectivity).unwrap();
        let first = poller.complete_check(&probe(&request, Some(1)), request.mode);
        assert!(matches!(first, CheckOutcome::Apply(_)));

        let request = poller.begin_check(now(), RadarMode::Reflectivity).unwrap();
        let second = poller.complete_check(&probe(&request, Some(1)), request.mode);
        assert_eq!(second, CheckOutcome::Unchanged);
    }

    #[test]
    fn test_mode_change_reapplies_same_time() {
        let mut poller = FreshnessPoller::new(PollerConfig::default());

        let request = poller.begin_check(now(), RadarMode::Reflectivity).unwrap();
        poller.complete_check(&probe(&request, Some(0)), request.mode);

        let request = poller.begin_check(now(), RadarMode::EchoTops).unwrap();
        match poller.complete_check(&probe(&request, Some(0)), request.mode) {
            CheckOutcome::Apply(overlay) => assert_eq!(overlay.mode, RadarMode::EchoTops),
            other => panic!("expected Apply, got {:?}", other),
        }
    }

    #[test]
    fn test_total_failure_sets_error_state() {
        let mut poller = FreshnessPoller::new(PollerConfig::default());
        let request = poller.begin_check(now(), RadarMode::Reflectivity).unwrap();
        assert_eq!(poller.status(), PollerStatus::Searching);

        let outcome = poller.complete_check(&probe(&request, None), request.mode);
        assert_eq!(outcome, CheckOutcome::NotFound);
        assert!(poller.status().is_error());
        assert!(!poller.is_in_flight());
    }

    #[test]
    fn test_recheck_waits_for_in_flight_check() {
        let mut poller = FreshnessPoller::new(PollerConfig::default());
        assert!(poller.should_check(false));
        let request = poller.begin_check(now(), RadarMode::Reflectivity).unwrap();

        // Mode switch while probing: neither the request nor the timer starts a check
        poller.request_recheck();
        assert!(!poller.should_check(false));
        assert!(!poller.should_check(true));

        poller.complete_check(&probe(&request, Some(0)), request.mode);
        assert!(poller.should_check(false));
        assert!(!poller.should_check(false));
        assert!(poller.should_check(true));
    }

    #[test]
    fn test_recheck_request_is_consumed() {
        let mut poller = FreshnessPoller::new(PollerConfig::default());
        assert!(poller.take_recheck_request());
        assert!(!poller.take_recheck_request());
        poller.request_recheck();
        assert!(poller.take_recheck_request());
    }
}
