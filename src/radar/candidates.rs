//! Time candidates for the radar freshness probe.
//!
//! The tile server partitions imagery by valid time at a fixed interval, so
//! the newest image is found by stepping backwards from "now" one interval
//! at a time and asking which of those timestamps exists.

use chrono::{DateTime, Duration, DurationRound, Utc};

/// A time-stamped tile the probe will check for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Valid time of the imagery, aligned to the server interval
    pub time: DateTime<Utc>,
    /// Probe outcome; `None` until the probe resolves
    pub found: Option<bool>,
}

impl Candidate {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self { time, found: None }
    }

    pub fn with_result(self, found: bool) -> Self {
        Self {
            found: Some(found),
            ..self
        }
    }

    pub fn exists(&self) -> bool {
        self.found == Some(true)
    }
}

/// Floors `time` to a multiple of `interval` (sub-seconds cleared).
///
/// A non-positive interval leaves the time truncated to whole seconds.
pub fn round_down(time: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    let whole_seconds = time
        .duration_trunc(Duration::seconds(1))
        .unwrap_or(time);
    if interval <= Duration::zero() {
        return whole_seconds;
    }
    whole_seconds.duration_trunc(interval).unwrap_or(whole_seconds)
}

/// Generates `count` strictly decreasing candidates spaced by `interval`,
/// starting at `now - lag` rounded down to the interval.
pub fn generate_candidates(
    now: DateTime<Utc>,
    interval: Duration,
    count: usize,
    lag: Duration,
) -> Vec<Candidate> {
    if interval <= Duration::zero() {
        log::warn!("Refusing to generate radar candidates with a non-positive interval");
        return Vec::new();
    }

    let newest = round_down(now - lag, interval);
    (0..count)
        .map(|i| Candidate::new(newest - interval * i as i32))
        .collect()
}

/// Picks the newest candidate whose probe succeeded.
pub fn select_winner(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates
        .iter()
        .filter(|c| c.exists())
        .max_by_key(|c| c.time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_round_down_to_five_minutes() {
        assert_eq!(round_down(utc(12, 7, 42), Duration::minutes(5)), utc(12, 5, 0));
        assert_eq!(round_down(utc(12, 5, 0), Duration::minutes(5)), utc(12, 5, 0));
        assert_eq!(round_down(utc(0, 4, 59), Duration::minutes(5)), utc(0, 0, 0));
    }

    #[test]
    fn test_candidates_strictly_decreasing() {
        let candidates =
            generate_candidates(utc(12, 7, 42), Duration::minutes(5), 4, Duration::zero());
        let times: Vec<_> = candidates.iter().map(|c| c.time).collect();
        assert_eq!(
            times,
            vec![utc(12, 5, 0), utc(12, 0, 0), utc(11, 55, 0), utc(11, 50, 0)]
        );
        assert!(candidates.iter().all(|c| c.found.is_none()));
    }

    #[test]
    fn test_candidates_apply_lag() {
        let candidates =
            generate_candidates(utc(12, 7, 42), Duration::minutes(5), 1, Duration::minutes(5));
        assert_eq!(candidates[0].time, utc(12, 0, 0));
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert!(generate_candidates(utc(12, 0, 0), Duration::minutes(5), 0, Duration::zero())
            .is_empty());
    }

    #[test]
    fn test_winner_is_success_at_index_k() {
        let base = generate_candidates(utc(12, 7, 42), Duration::minutes(5), 6, Duration::zero());
        for k in 0..base.len() {
            let probed: Vec<_> = base
                .iter()
                .enumerate()
                .map(|(i, c)| c.with_result(i == k))
                .collect();
            let winner = select_winner(&probed).expect("one candidate exists");
            assert_eq!(winner.time, base[k].time);
        }
    }

    #[test]
    fn test_winner_prefers_newest_success() {
        let base = generate_candidates(utc(12, 7, 42), Duration::minutes(5), 5, Duration::zero());
        // Older images exist too; the newest available one must win.
        let probed: Vec<_> = base
            .iter()
            .enumerate()
            .map(|(i, c)| c.with_result(i >= 2))
            .collect();
        assert_eq!(select_winner(&probed).map(|c| c.time), Some(base[2].time));
    }

    #[test]
    fn test_no_winner_when_all_fail() {
        let probed: Vec<_> =
            generate_candidates(utc(12, 7, 42), Duration::minutes(5), 3, Duration::zero())
                .into_iter()
                .map(|c| c.with_result(false))
                .collect();
        assert!(select_winner(&probed).is_none());
    }
}
